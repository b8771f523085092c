//! Timing reports for protocol steps.
//!
//! Session code never prints. It hands each named duration to a [`Reporter`]; the
//! CLI collects them into a [`TimingTable`] and prints that, library users can pass
//! [`NoopReporter`].

use std::fmt;
use std::time::{Duration, Instant};

use log::debug;

/// Receives named step timings.
pub trait Reporter {
    fn record(&mut self, step: &str, elapsed: Duration);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn record(&mut self, _step: &str, _elapsed: Duration) {}
}

/// Run `f`, report its wall-clock time under `step`, return its result.
pub fn measure<T, R, F>(reporter: &mut R, step: &str, f: F) -> T
where
    R: Reporter + ?Sized,
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let out = f();
    let elapsed = start.elapsed();
    debug!("{step}: {elapsed:?}");
    reporter.record(step, elapsed);
    out
}

/// Name/time table in recording order.
#[derive(Debug, Clone)]
pub struct TimingTable {
    title: String,
    rows: Vec<(String, Duration)>,
}

impl TimingTable {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[(String, Duration)] {
        &self.rows
    }

    pub fn total(&self) -> Duration {
        self.rows.iter().map(|(_, d)| *d).sum()
    }
}

impl Reporter for TimingTable {
    fn record(&mut self, step: &str, elapsed: Duration) {
        self.rows.push((step.to_string(), elapsed));
    }
}

impl fmt::Display for TimingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name_width = self
            .rows
            .iter()
            .map(|(name, _)| name.len())
            .chain(["Name".len(), "Total".len()])
            .max()
            .unwrap_or(4)
            + 2;
        let time_width = 16;
        let separator = format!("{}|{}", "-".repeat(name_width), "-".repeat(time_width));

        writeln!(f, "{:^width$}", self.title, width = name_width + time_width + 1)?;
        writeln!(f, "{separator}")?;
        writeln!(f, "{:^name_width$}|{:^time_width$}", "Name", "Time (us)")?;
        writeln!(f, "{separator}")?;
        for (name, elapsed) in &self.rows {
            writeln!(f, "{name:<name_width$}|{:>time_width$}", elapsed.as_micros())?;
        }
        writeln!(f, "{separator}")?;
        write!(f, "{:<name_width$}|{:>time_width$}", "Total", self.total().as_micros())
    }
}
