//! dhmqv: parameter generation, local demos, and a one-shot listener/initiator pair.

#![forbid(unsafe_code)]

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use dhmqv::config::{DEFAULT_PORT, DEFAULT_PRIMALITY_ROUNDS};
use dhmqv::exchange::KeyPair;
use dhmqv::report::measure;
use dhmqv::{
    Agreement, Channel, DomainParameters, GroupConfig, KeyGenConfig, MqvParty, Protocol, Role,
    Session, SessionConfig, TimingTable,
};

const FULL_GROUP_FILE: &str = "multiplicative_params.txt";
const SUBGROUP_FILE: &str = "cyclic_params.txt";

#[derive(Parser, Debug)]
#[command(name = "dhmqv")]
#[command(about = "Diffie-Hellman and MQV key agreement over safe-prime groups")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct SessionArgs {
    /// Parameter file (p, q, g as hex lines)
    #[arg(long)]
    params: PathBuf,

    /// dh, mqv or mqv-sha256-salsa20
    #[arg(long, default_value = "dh")]
    protocol: Protocol,

    #[arg(long, default_value_t = DEFAULT_PORT, env = "DHMQV_PORT")]
    port: u16,

    /// Socket read/write timeout in seconds; blocks forever when unset
    #[arg(long)]
    timeout: Option<u64>,

    /// Miller-Rabin rounds used to validate the parameter file
    #[arg(long, default_value_t = DEFAULT_PRIMALITY_ROUNDS)]
    rounds: usize,
}

impl SessionArgs {
    fn config(&self) -> SessionConfig {
        SessionConfig {
            port: self.port,
            io_timeout: self.timeout.map(Duration::from_secs),
            primality_rounds: self.rounds,
            ..SessionConfig::default()
        }
    }

    fn load_params(&self) -> Result<DomainParameters> {
        let params = DomainParameters::load(&self.params, self.rounds)
            .with_context(|| format!("loading parameters from {}", self.params.display()))?;
        info!(
            "loaded {} parameters, p is {} bits",
            params.kind(),
            params.p.bits()
        );
        Ok(params)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a safe prime and write both parameter files
    Generate {
        /// Bit length of q
        #[arg(long, default_value_t = 256)]
        q_bits: usize,

        /// Directory for multiplicative_params.txt and cyclic_params.txt
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Seed for reproducible parameters
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run a protocol between two local parties and compare their secrets
    Demo {
        #[arg(long)]
        params: PathBuf,

        #[arg(long, default_value = "mqv")]
        protocol: Protocol,
    },

    /// Wait for one peer and run the protocol as the listener
    Serve {
        #[command(flatten)]
        session: SessionArgs,

        /// Where to write the decrypted file (mqv-sha256-salsa20 only)
        #[arg(long, default_value = "received.txt")]
        output: PathBuf,
    },

    /// Connect to a listener and run the protocol as the initiator
    Connect {
        #[command(flatten)]
        session: SessionArgs,

        /// Listener host name or address
        #[arg(long)]
        server: String,

        /// File to encrypt and send (mqv-sha256-salsa20 only)
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.command {
        Command::Generate {
            q_bits,
            out_dir,
            seed,
        } => generate(q_bits, out_dir, seed),
        Command::Demo { params, protocol } => demo(params, protocol),
        Command::Serve { session, output } => serve(&session, output),
        Command::Connect {
            session,
            server,
            file,
        } => connect(&session, &server, file),
    }
}

fn generate(q_bits: usize, out_dir: PathBuf, seed: Option<u64>) -> Result<()> {
    let config = GroupConfig {
        q_bits,
        seed,
        ..GroupConfig::default()
    };
    let mut table = TimingTable::new(format!("Parameter generation ({q_bits}-bit q)"));
    let set = measure(&mut table, "Safe prime + generators", || {
        DomainParameters::generate_set(&config)
    })?;

    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let full_path = out_dir.join(FULL_GROUP_FILE);
    let sub_path = out_dir.join(SUBGROUP_FILE);
    set.full_group
        .save(&full_path)
        .with_context(|| format!("writing {}", full_path.display()))?;
    set.subgroup
        .save(&sub_path)
        .with_context(|| format!("writing {}", sub_path.display()))?;

    println!("p = {}", set.subgroup.p.to_str_radix(16));
    println!("q = {}", set.subgroup.q.to_str_radix(16));
    println!("g (full group) = {}", set.full_group.g.to_str_radix(16));
    println!("g (subgroup)   = {}", set.subgroup.g.to_str_radix(16));
    println!("Wrote {} and {}", full_path.display(), sub_path.display());
    println!();
    println!("{table}");
    Ok(())
}

fn demo(path: PathBuf, protocol: Protocol) -> Result<()> {
    let params = DomainParameters::load(&path, DEFAULT_PRIMALITY_ROUNDS)
        .with_context(|| format!("loading parameters from {}", path.display()))?;
    let keygen = KeyGenConfig::default();
    let mut table = TimingTable::new(format!("{protocol} demo ({} group)", params.kind()));

    let (alice, bob) = match protocol {
        Protocol::Dh => {
            let a = measure(&mut table, "Alice key pair", || {
                KeyPair::generate(&params, &keygen)
            });
            let b = measure(&mut table, "Bob key pair", || KeyPair::generate(&params, &keygen));
            let alice = measure(&mut table, "Alice secret", || {
                a.dh_shared_secret(&b.public_key, &params)
            });
            let bob = measure(&mut table, "Bob secret", || {
                b.dh_shared_secret(&a.public_key, &params)
            });
            (alice, bob)
        }
        Protocol::Mqv | Protocol::MqvSha256Salsa20 => {
            let a = measure(&mut table, "Alice keys", || MqvParty::generate(&params, &keygen));
            let b = measure(&mut table, "Bob keys", || MqvParty::generate(&params, &keygen));
            let alice = measure(&mut table, "Alice secret", || {
                a.shared_secret(&b.public_keys(), &params)
            });
            let bob = measure(&mut table, "Bob secret", || {
                b.shared_secret(&a.public_keys(), &params)
            });
            (alice, bob)
        }
    };

    println!("Alice: {}", alice.to_str_radix(16));
    println!("Bob:   {}", bob.to_str_radix(16));
    println!("Secrets match: {}", alice == bob);

    if protocol == Protocol::MqvSha256Salsa20 {
        let a = measure(&mut table, "Alice derive", || {
            dhmqv::kdf::derive_from_secret(&alice)
        });
        let b = measure(&mut table, "Bob derive", || dhmqv::kdf::derive_from_secret(&bob));
        println!("Hashed secret: {}", a.hashed_secret);
        println!("Key material matches: {}", a == b);
    }
    println!();
    println!("{table}");
    Ok(())
}

/// Run the key agreement half of a session.
fn agree<S: std::io::Read + std::io::Write>(
    session: &mut Session<S>,
    protocol: Protocol,
    table: &mut TimingTable,
) -> Result<Agreement> {
    let agreement = match protocol {
        Protocol::Dh => session.dh(table)?,
        Protocol::Mqv | Protocol::MqvSha256Salsa20 => {
            let params = session.params().clone();
            let static_keys = measure(table, "Static key", || {
                KeyPair::generate(&params, &KeyGenConfig::default())
            });
            session.mqv(&static_keys, table)?
        }
    };
    println!("Shared secret: {}", agreement.secret_hex());
    Ok(agreement)
}

fn serve(args: &SessionArgs, output: PathBuf) -> Result<()> {
    let params = args.load_params()?;
    let config = args.config();
    let channel = Channel::listen(&config).context("waiting for a peer")?;
    let mut session = Session::new(channel, params, Role::Listener, &config)?;

    let mut table = TimingTable::new(format!("{} protocol ({})", args.protocol, Role::Listener));
    let agreement = agree(&mut session, args.protocol, &mut table)?;

    if args.protocol == Protocol::MqvSha256Salsa20 {
        let (plaintext, material) = session.receive_encrypted(&agreement, &mut table)?;
        println!("Hashed secret: {}", material.hashed_secret);
        fs::write(&output, &plaintext)
            .with_context(|| format!("writing {}", output.display()))?;
        println!("Wrote {} bytes to {}", plaintext.len(), output.display());
    }
    println!();
    println!("{table}");
    Ok(())
}

fn connect(args: &SessionArgs, server: &str, file: Option<PathBuf>) -> Result<()> {
    let plaintext = match (&file, args.protocol) {
        (Some(path), Protocol::MqvSha256Salsa20) => {
            fs::read(path).with_context(|| format!("reading {}", path.display()))?
        }
        (None, Protocol::MqvSha256Salsa20) => {
            anyhow::bail!("--file is required for mqv-sha256-salsa20")
        }
        _ => Vec::new(),
    };

    let params = args.load_params()?;
    let config = args.config();
    let channel = Channel::connect((server, config.port), &config)
        .with_context(|| format!("connecting to {server}:{}", config.port))?;
    let mut session = Session::new(channel, params, Role::Initiator, &config)?;

    let mut table = TimingTable::new(format!("{} protocol ({})", args.protocol, Role::Initiator));
    let agreement = agree(&mut session, args.protocol, &mut table)?;

    if args.protocol == Protocol::MqvSha256Salsa20 {
        let material = session.send_encrypted(&agreement, &plaintext, &mut table)?;
        println!("Hashed secret: {}", material.hashed_secret);
        println!("Sent {} bytes", plaintext.len());
    }
    println!();
    println!("{table}");
    Ok(())
}
