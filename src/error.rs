//! Error type shared by every stage of a key-agreement session.
//!
//! Parameter problems, malformed values and transport failures all surface as one
//! [`Error`] at the call site that started the exchange. A secret mismatch between
//! the two parties is *not* an error here: nothing in the protocol can detect it.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Domain parameters failed validation (non-prime, wrong relation, bad generator).
    #[error("invalid domain parameters: {0}")]
    InvalidParameters(String),

    /// A hex value could not be parsed, either from a parameter file or from the wire.
    #[error("malformed {field}: {reason}")]
    Malformed { field: &'static str, reason: String },

    /// A peer's public value is outside the group.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The channel failed while performing a protocol step.
    #[error("transport failure while {during}: {source}")]
    Transport {
        during: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The peer hung up in the middle of a message.
    #[error("connection closed by peer while {during}")]
    ConnectionClosed { during: &'static str },

    #[error("payload of {len} bytes exceeds the limit of {max} bytes")]
    PayloadTooLarge { len: u64, max: u64 },

    /// The safe-prime search hit the configured attempt cap.
    #[error("parameter generation gave up after {attempts} attempts")]
    GenerationExhausted { attempts: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    /// File I/O outside the channel (parameter files, payload files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_parameters(msg: impl std::fmt::Display) -> Self {
        Self::InvalidParameters(msg.to_string())
    }

    pub(crate) fn malformed(field: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Malformed {
            field,
            reason: reason.to_string(),
        }
    }

    /// Map an I/O error raised during a protocol step, folding unexpected EOF into
    /// [`Error::ConnectionClosed`].
    pub(crate) fn transport(during: &'static str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::ConnectionClosed { during }
        } else {
            Self::Transport { during, source }
        }
    }

    /// True for failures of the channel itself, as opposed to bad values or parameters.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::ConnectionClosed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_unexpected_eof_maps_to_connection_closed() {
        let err = Error::transport(
            "receiving a value",
            io::Error::new(io::ErrorKind::UnexpectedEof, "eof"),
        );
        assert!(matches!(err, Error::ConnectionClosed { during } if during == "receiving a value"));
        assert!(err.is_transport());
    }

    #[test]
    fn test_other_io_errors_stay_transport() {
        let err = Error::transport(
            "sending a value",
            io::Error::new(io::ErrorKind::BrokenPipe, "pipe"),
        );
        assert!(matches!(err, Error::Transport { .. }));
        assert!(err.to_string().contains("sending a value"));
    }

    #[test]
    fn test_parameter_errors_are_not_transport() {
        assert!(!Error::invalid_parameters("p is not prime").is_transport());
        assert!(!Error::malformed("p", "empty line").is_transport());
    }
}
