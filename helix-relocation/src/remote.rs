//! Remote transport wrapper.
//!
//! The RPC layer cannot ship typed errors. A server-side error crosses the
//! wire as its class name plus its message, and arrives on the client as a
//! [`RemoteError`]. The client can try to rebuild the typed error from those
//! two strings:
//!
//! - [`RemoteUnwrap::unwrap_as`] rebuilds only if the wrapper declares the
//!   requested class.
//! - [`RemoteUnwrap::unwrap_declared`] rebuilds whatever class the wrapper
//!   declares, if the [`ErrorRegistry`] knows it.
//!
//! Both return `None` when nothing could be rebuilt.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::chain::ErrorNode;
use crate::codec::{SignalCodec, TextCodec};
use crate::signal::{EntityGroupMoved, NotServingError};

/// A remote-call failure that can be unwrapped into a typed error.
pub trait RemoteUnwrap: fmt::Debug + Send + Sync {
    /// Class name of the server-side error.
    fn class_name(&self) -> &str;

    /// Message of the server-side error.
    fn message(&self) -> &str;

    /// The error that caused this failure on the calling side, if any.
    fn cause(&self) -> Option<&ErrorNode>;

    /// Rebuilds the server-side error if it was of class `class_name`.
    fn unwrap_as(&self, class_name: &str) -> Option<ErrorNode>;

    /// Rebuilds the server-side error as whatever class it declares.
    fn unwrap_declared(&self) -> Option<ErrorNode>;
}

type Reconstructor = Arc<dyn Fn(&str) -> ErrorNode + Send + Sync>;

/// Class name to error reconstructor table.
#[derive(Clone)]
pub struct ErrorRegistry {
    reconstructors: HashMap<String, Reconstructor>,
}

impl ErrorRegistry {
    /// Creates a registry that knows no classes.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            reconstructors: HashMap::new(),
        }
    }

    /// Creates a registry for the not-serving errors, decoding relocation
    /// signals with `codec`.
    #[must_use]
    pub fn with_codec(codec: Arc<dyn SignalCodec>) -> Self {
        let mut registry = Self::empty();
        registry.register(EntityGroupMoved::CLASS_NAME, move |message| {
            ErrorNode::from(codec.decode(message))
        });
        registry.register(NotServingError::CLASS_NAME, |message| {
            ErrorNode::NotServing(NotServingError::not_serving(message))
        });
        registry
    }

    /// Registers how to rebuild errors of `class_name` from their message.
    ///
    /// Replaces any previous entry for the class.
    pub fn register<F>(&mut self, class_name: impl Into<String>, reconstruct: F)
    where
        F: Fn(&str) -> ErrorNode + Send + Sync + 'static,
    {
        self.reconstructors
            .insert(class_name.into(), Arc::new(reconstruct));
    }

    /// Returns true if `class_name` can be rebuilt.
    #[must_use]
    pub fn contains(&self, class_name: &str) -> bool {
        self.reconstructors.contains_key(class_name)
    }

    /// Returns the number of registered classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reconstructors.len()
    }

    /// Returns true if no class is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reconstructors.is_empty()
    }

    /// Rebuilds an error of `class_name` from `message`.
    #[must_use]
    pub fn reconstruct(&self, class_name: &str, message: &str) -> Option<ErrorNode> {
        self.reconstructors
            .get(class_name)
            .map(|reconstruct| reconstruct(message))
    }
}

impl Default for ErrorRegistry {
    fn default() -> Self {
        Self::with_codec(Arc::new(TextCodec::new()))
    }
}

impl fmt::Debug for ErrorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut classes: Vec<&str> = self.reconstructors.keys().map(String::as_str).collect();
        classes.sort_unstable();
        f.debug_struct("ErrorRegistry")
            .field("classes", &classes)
            .finish()
    }
}

/// A server-side error delivered by class name and message.
#[derive(Debug, Clone)]
pub struct RemoteError {
    class_name: String,
    message: String,
    cause: Option<Box<ErrorNode>>,
    registry: Arc<ErrorRegistry>,
}

impl RemoteError {
    /// Creates a remote error resolved against the default registry.
    #[must_use]
    pub fn new(class_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_registry(class_name, message, Arc::new(ErrorRegistry::default()))
    }

    /// Creates a remote error resolved against `registry`.
    #[must_use]
    pub fn with_registry(
        class_name: impl Into<String>,
        message: impl Into<String>,
        registry: Arc<ErrorRegistry>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            message: message.into(),
            cause: None,
            registry,
        }
    }

    /// Serializes a server-side error for transport.
    #[must_use]
    pub fn wrap(error: &ErrorNode, registry: Arc<ErrorRegistry>) -> Self {
        Self::with_registry(error.class_name(), error.message(), registry)
    }

    /// Attaches the calling-side cause of the failure.
    #[must_use]
    pub fn with_cause(mut self, cause: ErrorNode) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Returns the registry used to unwrap this error.
    #[must_use]
    pub const fn registry(&self) -> &Arc<ErrorRegistry> {
        &self.registry
    }
}

impl RemoteUnwrap for RemoteError {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn cause(&self) -> Option<&ErrorNode> {
        self.cause.as_deref()
    }

    fn unwrap_as(&self, class_name: &str) -> Option<ErrorNode> {
        if self.class_name != class_name {
            return None;
        }
        self.registry.reconstruct(class_name, &self.message)
    }

    fn unwrap_declared(&self) -> Option<ErrorNode> {
        self.registry.reconstruct(&self.class_name, &self.message)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.class_name, self.message)
    }
}

impl std::error::Error for RemoteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}
