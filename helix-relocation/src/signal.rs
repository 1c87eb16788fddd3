//! Relocation signal carrier.
//!
//! When a server no longer hosts an entity group it answers with a
//! [`NotServingError`]. If it also knows where the group went, the error is
//! the [`NotServingError::Moved`] specialization carrying an
//! [`EntityGroupMoved`], so the client can go straight to the new server
//! instead of asking the coordinator.

use std::fmt;

use crate::codec::{self, SignalCodec, TextCodec};

/// Port value of a signal whose port could not be recovered.
pub const UNKNOWN_PORT: i32 = -1;

/// The entity group now lives on another server.
///
/// A signal is only usable when [`is_valid`](Self::is_valid) holds. Signals
/// rebuilt from text may be invalid; the finder never hands those out.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityGroupMoved {
    /// Host now serving the entity group, if known.
    hostname: Option<String>,
    /// Port on that host; negative when unknown.
    port: i32,
}

impl EntityGroupMoved {
    /// Name the carrier is registered under for remote transport.
    pub const CLASS_NAME: &'static str = "EntityGroupMoved";

    /// Creates a signal pointing at `hostname:port`.
    ///
    /// An empty hostname is stored as absent.
    #[must_use]
    pub fn new(hostname: impl Into<String>, port: i32) -> Self {
        let hostname = hostname.into();
        Self::from_parts((!hostname.is_empty()).then_some(hostname), port)
    }

    /// Rebuilds a signal from its canonical text using the default codec.
    ///
    /// Never fails: unparseable fields are logged and left unknown.
    #[must_use]
    pub fn from_message(message: &str) -> Self {
        TextCodec::new().decode(message)
    }

    /// Rebuilds a signal from text with the given codec.
    #[must_use]
    pub fn parse_with<C: SignalCodec + ?Sized>(message: &str, codec: &C) -> Self {
        codec.decode(message)
    }

    pub(crate) const fn from_parts(hostname: Option<String>, port: i32) -> Self {
        Self { hostname, port }
    }

    /// Returns the new host, if known.
    #[must_use]
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    /// Returns the new port, or a negative value if unknown.
    #[must_use]
    pub const fn port(&self) -> i32 {
        self.port
    }

    /// Returns true if both the host and the port are known.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.port >= 0 && self.hostname.as_deref().is_some_and(|h| !h.is_empty())
    }

    /// Returns `host:port` for a valid signal.
    #[must_use]
    pub fn address(&self) -> Option<String> {
        if !self.is_valid() {
            return None;
        }
        self.hostname
            .as_deref()
            .map(|hostname| format!("{hostname}:{}", self.port))
    }
}

impl fmt::Display for EntityGroupMoved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        codec::write_canonical(f, self.hostname.as_deref().unwrap_or(""), self.port)
    }
}

impl std::error::Error for EntityGroupMoved {}

/// The server does not serve the addressed entity group.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotServingError {
    /// Not served here, and no new location is known.
    #[error("{message}")]
    NotServing {
        /// Description from the server.
        message: String,
    },

    /// Not served here because the group moved.
    #[error(transparent)]
    Moved(#[from] EntityGroupMoved),
}

impl NotServingError {
    /// Name the plain not-serving error is registered under.
    pub const CLASS_NAME: &'static str = "NotServingEntityGroup";

    /// Creates a plain not-serving error.
    #[must_use]
    pub fn not_serving(message: impl Into<String>) -> Self {
        Self::NotServing {
            message: message.into(),
        }
    }

    /// Returns the transport class name of this error.
    #[must_use]
    pub const fn class_name(&self) -> &'static str {
        match self {
            Self::NotServing { .. } => Self::CLASS_NAME,
            Self::Moved(_) => EntityGroupMoved::CLASS_NAME,
        }
    }

    /// Returns the relocation signal if this is the moved specialization.
    #[must_use]
    pub const fn as_moved(&self) -> Option<&EntityGroupMoved> {
        match self {
            Self::Moved(moved) => Some(moved),
            Self::NotServing { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_canonical() {
        let moved = EntityGroupMoved::new("dn1.cluster.local", 9090);
        assert_eq!(
            moved.to_string(),
            "EntityGroup moved to: hostname=dn1.cluster.local port=9090."
        );
    }

    #[test]
    fn test_validity() {
        assert!(EntityGroupMoved::new("dn1", 0).is_valid());
        assert!(!EntityGroupMoved::new("dn1", UNKNOWN_PORT).is_valid());
        assert!(!EntityGroupMoved::new("", 9090).is_valid());
        assert!(!EntityGroupMoved::from_parts(Some(String::new()), 9090).is_valid());
    }

    #[test]
    fn test_empty_hostname_is_absent() {
        let moved = EntityGroupMoved::new("", 9090);
        assert_eq!(moved.hostname(), None);
        assert_eq!(moved.to_string(), "EntityGroup moved to: hostname= port=9090.");
    }

    #[test]
    fn test_address() {
        assert_eq!(
            EntityGroupMoved::new("dn1.cluster.local", 9090).address().as_deref(),
            Some("dn1.cluster.local:9090")
        );
        assert_eq!(EntityGroupMoved::new("dn1", -5).address(), None);
    }

    #[test]
    fn test_from_message_roundtrip() {
        let moved = EntityGroupMoved::new("dn7.cluster.local", 60020);
        assert_eq!(EntityGroupMoved::from_message(&moved.to_string()), moved);
    }

    #[test]
    fn test_from_message_garbage() {
        let moved = EntityGroupMoved::from_message("garbage");
        assert_eq!(moved.hostname(), None);
        assert_eq!(moved.port(), UNKNOWN_PORT);
        assert!(!moved.is_valid());
    }

    #[test]
    fn test_not_serving_class_names() {
        let err = NotServingError::not_serving("group users,42 is not online");
        assert_eq!(err.class_name(), NotServingError::CLASS_NAME);
        assert!(err.as_moved().is_none());
        assert_eq!(err.to_string(), "group users,42 is not online");

        let err = NotServingError::from(EntityGroupMoved::new("dn2", 9091));
        assert_eq!(err.class_name(), EntityGroupMoved::CLASS_NAME);
        assert_eq!(err.as_moved().map(EntityGroupMoved::port), Some(9091));
        assert_eq!(err.to_string(), "EntityGroup moved to: hostname=dn2 port=9091.");
    }
}
