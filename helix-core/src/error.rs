//! Error types for Helix core operations.
//!
//! Following `TigerStyle`: all errors must be handled explicitly.
//! No silent failures, no ignored errors.

use std::fmt;

/// The result type for Helix operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Helix operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A resource limit was exceeded.
    LimitExceeded {
        /// Which limit was exceeded.
        limit: &'static str,
        /// The maximum allowed value.
        max: u64,
        /// The actual value that exceeded the limit.
        actual: u64,
    },

    /// An invalid argument was provided.
    InvalidArgument {
        /// The name of the argument.
        name: &'static str,
        /// Why it was invalid.
        reason: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LimitExceeded { limit, max, actual } => {
                write!(f, "limit exceeded: {limit} (max={max}, actual={actual})")
            }
            Self::InvalidArgument { name, reason } => {
                write!(f, "invalid argument '{name}': {reason}")
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display() {
        let err = Error::InvalidArgument {
            name: "max_chain_depth",
            reason: "must be positive",
        };
        assert_eq!(
            format!("{err}"),
            "invalid argument 'max_chain_depth': must be positive"
        );
    }

    #[test]
    fn test_limit_exceeded_display() {
        let err = Error::LimitExceeded {
            limit: "max_chain_depth",
            max: 4096,
            actual: 10_000,
        };
        let msg = format!("{err}");
        assert!(msg.contains("max_chain_depth"));
        assert!(msg.contains("4096"));
        assert!(msg.contains("10000"));
    }
}
