//! System limits and configuration bounds.
//!
//! Following TigerStyle: put limits on everything.
//! Error chains arrive from remote peers and are walked recursively, so the
//! walk has an explicit maximum depth. Encoded signals are bounded too.

/// Default maximum number of error nodes visited while searching a chain.
pub const CHAIN_DEPTH_DEFAULT: u32 = 128;

/// Hard ceiling on the configurable chain depth.
pub const CHAIN_DEPTH_MAX: u32 = 4096;

/// Default maximum length of an encoded relocation signal in bytes.
///
/// A DNS name is at most 253 bytes; the rest is markers and the port.
pub const ENCODED_SIGNAL_BYTES_DEFAULT: u32 = 1024;

/// Hard ceiling on the configurable encoded signal length.
pub const ENCODED_SIGNAL_BYTES_MAX: u32 = 64 * 1024;

/// Limits applied to relocation signalling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of error nodes visited in one search, counting both
    /// causal links and recursion into unwrapped remote errors.
    pub max_chain_depth: u32,
    /// Maximum length of a text that is scanned for relocation fields.
    pub max_encoded_bytes: u32,
}

impl Limits {
    /// Creates limits with safe defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_chain_depth: CHAIN_DEPTH_DEFAULT,
            max_encoded_bytes: ENCODED_SIGNAL_BYTES_DEFAULT,
        }
    }

    /// Sets the maximum chain depth.
    #[must_use]
    pub const fn with_max_chain_depth(mut self, depth: u32) -> Self {
        self.max_chain_depth = depth;
        self
    }

    /// Sets the maximum encoded signal length.
    #[must_use]
    pub const fn with_max_encoded_bytes(mut self, bytes: u32) -> Self {
        self.max_encoded_bytes = bytes;
        self
    }

    /// Validates that all limits are internally consistent.
    ///
    /// # Errors
    /// Returns an error if any limit is zero or above its hard ceiling.
    pub const fn validate(&self) -> crate::Result<()> {
        if self.max_chain_depth == 0 {
            return Err(crate::Error::InvalidArgument {
                name: "max_chain_depth",
                reason: "must be positive",
            });
        }
        if self.max_chain_depth > CHAIN_DEPTH_MAX {
            return Err(crate::Error::LimitExceeded {
                limit: "max_chain_depth",
                max: CHAIN_DEPTH_MAX as u64,
                actual: self.max_chain_depth as u64,
            });
        }

        // The shortest well-formed signal is "hostname=x port=0." (18 bytes).
        if self.max_encoded_bytes < 18 {
            return Err(crate::Error::InvalidArgument {
                name: "max_encoded_bytes",
                reason: "too small to hold any encoded signal",
            });
        }
        if self.max_encoded_bytes > ENCODED_SIGNAL_BYTES_MAX {
            return Err(crate::Error::LimitExceeded {
                limit: "max_encoded_bytes",
                max: ENCODED_SIGNAL_BYTES_MAX as u64,
                actual: self.max_encoded_bytes as u64,
            });
        }

        Ok(())
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_are_valid() {
        let limits = Limits::default();
        assert!(limits.validate().is_ok());
        assert_eq!(limits.max_chain_depth, CHAIN_DEPTH_DEFAULT);
    }

    #[test]
    fn test_zero_depth_rejected() {
        let limits = Limits::new().with_max_chain_depth(0);
        assert!(matches!(
            limits.validate(),
            Err(crate::Error::InvalidArgument { name: "max_chain_depth", .. })
        ));
    }

    #[test]
    fn test_depth_above_ceiling_rejected() {
        let limits = Limits::new().with_max_chain_depth(CHAIN_DEPTH_MAX + 1);
        assert!(matches!(
            limits.validate(),
            Err(crate::Error::LimitExceeded { limit: "max_chain_depth", .. })
        ));
    }

    #[test]
    fn test_encoded_bytes_bounds() {
        assert!(Limits::new().with_max_encoded_bytes(17).validate().is_err());
        assert!(Limits::new().with_max_encoded_bytes(18).validate().is_ok());
        assert!(Limits::new()
            .with_max_encoded_bytes(ENCODED_SIGNAL_BYTES_MAX + 1)
            .validate()
            .is_err());
    }
}
