//! Error chains as a closed set of tagged nodes.
//!
//! Errors reaching a client are wrapped in two ways: ordinary causal
//! chaining, and the RPC layer's remote wrapper. [`ErrorNode`] names every
//! shape the relocation search has to handle, so the search dispatches on the
//! variant instead of probing runtime types.
//!
//! Errors from elsewhere enter through [`ErrorNode::capture`], which is the
//! one place that inspects concrete types.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use helix_core::CHAIN_DEPTH_DEFAULT;

use crate::remote::{RemoteError, RemoteUnwrap};
use crate::signal::{EntityGroupMoved, NotServingError};

/// Class name reported for errors that carry no type of their own.
pub const PLAIN_CLASS_NAME: &str = "Error";

/// One node of an error chain.
#[derive(Debug, Clone)]
pub enum ErrorNode {
    /// An error with no cause.
    Plain {
        /// Error message.
        message: String,
    },

    /// An error caused by another error.
    Caused {
        /// Error message.
        message: String,
        /// The underlying error.
        cause: Box<ErrorNode>,
    },

    /// A failure reported by the RPC layer on behalf of a remote server.
    Remote(Arc<dyn RemoteUnwrap>),

    /// The server does not serve the entity group. The
    /// [`NotServingError::Moved`] case carries a relocation signal.
    NotServing(NotServingError),
}

impl ErrorNode {
    /// Creates an error with no cause.
    #[must_use]
    pub fn plain(message: impl Into<String>) -> Self {
        Self::Plain {
            message: message.into(),
        }
    }

    /// Creates an error caused by `cause`.
    #[must_use]
    pub fn caused(message: impl Into<String>, cause: Self) -> Self {
        Self::Caused {
            message: message.into(),
            cause: Box::new(cause),
        }
    }

    /// Creates a remote failure node.
    #[must_use]
    pub fn remote(remote: impl RemoteUnwrap + 'static) -> Self {
        Self::Remote(Arc::new(remote))
    }

    /// Creates a relocation carrier pointing at `hostname:port`.
    #[must_use]
    pub fn moved(hostname: impl Into<String>, port: i32) -> Self {
        Self::from(EntityGroupMoved::new(hostname, port))
    }

    /// Creates a plain not-serving error.
    #[must_use]
    pub fn not_serving(message: impl Into<String>) -> Self {
        Self::NotServing(NotServingError::not_serving(message))
    }

    /// Returns the class name this error travels under.
    #[must_use]
    pub fn class_name(&self) -> &str {
        match self {
            Self::Plain { .. } | Self::Caused { .. } => PLAIN_CLASS_NAME,
            Self::Remote(remote) => remote.class_name(),
            Self::NotServing(err) => err.class_name(),
        }
    }

    /// Returns the message this error travels with.
    #[must_use]
    pub fn message(&self) -> Cow<'_, str> {
        match self {
            Self::Plain { message } | Self::Caused { message, .. } => {
                Cow::Borrowed(message.as_str())
            }
            Self::Remote(remote) => Cow::Borrowed(remote.message()),
            Self::NotServing(err) => Cow::Owned(err.to_string()),
        }
    }

    /// Returns the next error along the causal chain.
    #[must_use]
    pub fn cause(&self) -> Option<&Self> {
        match self {
            Self::Plain { .. } | Self::NotServing(_) => None,
            Self::Caused { cause, .. } => Some(&**cause),
            Self::Remote(remote) => remote.cause(),
        }
    }

    /// Returns the relocation signal if this node carries one.
    #[must_use]
    pub const fn as_moved(&self) -> Option<&EntityGroupMoved> {
        match self {
            Self::NotServing(err) => err.as_moved(),
            _ => None,
        }
    }

    /// Returns the remote wrapper if this node is one.
    #[must_use]
    pub fn as_remote(&self) -> Option<&dyn RemoteUnwrap> {
        match self {
            Self::Remote(remote) => Some(remote.as_ref()),
            _ => None,
        }
    }

    /// Converts a standard error chain into nodes.
    ///
    /// At most [`CHAIN_DEPTH_DEFAULT`] levels are captured.
    #[must_use]
    pub fn capture(error: &(dyn StdError + 'static)) -> Self {
        Self::capture_bounded(error, CHAIN_DEPTH_DEFAULT)
    }

    /// Converts a standard error chain into nodes, keeping at most
    /// `max_depth` levels.
    ///
    /// Errors of this crate's types are kept as they are, together with the
    /// chain they already own. Anything else becomes a `Plain` or `Caused`
    /// node holding its display message.
    #[must_use]
    pub fn capture_bounded(error: &(dyn StdError + 'static), max_depth: u32) -> Self {
        let mut messages = Vec::new();
        let mut tail = None;
        let mut current = Some(error);

        while let Some(err) = current {
            if messages.len() >= max_depth as usize {
                break;
            }
            if let Some(node) = Self::recognize(err) {
                tail = Some(node);
                break;
            }
            messages.push(err.to_string());
            current = err.source();
        }

        messages
            .into_iter()
            .rev()
            .fold(tail, |cause, message| {
                Some(match cause {
                    Some(cause) => Self::caused(message, cause),
                    None => Self::plain(message),
                })
            })
            .unwrap_or_else(|| Self::plain(error.to_string()))
    }

    fn recognize(err: &(dyn StdError + 'static)) -> Option<Self> {
        if let Some(node) = err.downcast_ref::<Self>() {
            return Some(node.clone());
        }
        if let Some(remote) = err.downcast_ref::<RemoteError>() {
            return Some(Self::remote(remote.clone()));
        }
        if let Some(not_serving) = err.downcast_ref::<NotServingError>() {
            return Some(Self::NotServing(not_serving.clone()));
        }
        err.downcast_ref::<EntityGroupMoved>()
            .map(|moved| Self::from(moved.clone()))
    }
}

impl From<EntityGroupMoved> for ErrorNode {
    fn from(moved: EntityGroupMoved) -> Self {
        Self::NotServing(NotServingError::Moved(moved))
    }
}

impl From<NotServingError> for ErrorNode {
    fn from(err: NotServingError) -> Self {
        Self::NotServing(err)
    }
}

impl From<RemoteError> for ErrorNode {
    fn from(remote: RemoteError) -> Self {
        Self::remote(remote)
    }
}

impl fmt::Display for ErrorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain { message } | Self::Caused { message, .. } => f.write_str(message),
            Self::Remote(remote) => write!(f, "{}: {}", remote.class_name(), remote.message()),
            Self::NotServing(err) => write!(f, "{err}"),
        }
    }
}

impl StdError for ErrorNode {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause().map(|cause| cause as &(dyn StdError + 'static))
    }
}
