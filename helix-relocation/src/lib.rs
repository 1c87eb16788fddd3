//! Helix Relocation - Tell clients where a moved entity group lives now.
//!
//! When a server receives a request for an entity group it no longer hosts,
//! but knows which server took it over, it answers with an
//! [`EntityGroupMoved`] error. The client finds that error in whatever it got
//! back and retries directly against the new server, skipping the
//! coordinator.
//!
//! The RPC layer only carries an error's class name and message, so the
//! signal travels as text (see [`codec`]) and is rebuilt on the client from a
//! [`RemoteError`]. [`RelocationFinder`] digs it out of causal chains and
//! remote wrappers alike.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use helix_relocation::{find_relocation, ErrorNode, ErrorRegistry, RemoteError};
//!
//! // Server side: the entity group moved to dn2:9090.
//! let moved = ErrorNode::moved("dn2.cluster.local", 9090);
//! let on_the_wire = RemoteError::wrap(&moved, Arc::new(ErrorRegistry::default()));
//!
//! // Client side: the RPC failure is wrapped by the caller.
//! let received = ErrorNode::caused("put failed", ErrorNode::from(on_the_wire));
//! let target = find_relocation(&received).unwrap();
//! assert_eq!(target.address().as_deref(), Some("dn2.cluster.local:9090"));
//! ```
//!
//! # Design (`TigerStyle`)
//!
//! - **Never fatal**: every failure degrades to "no relocation found"
//! - **Explicit limits**: chain traversal and decoding are bounded
//! - **Tagged shapes**: error chains are a closed enum, not runtime type checks

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod chain;
pub mod codec;
mod finder;
mod remote;
mod signal;

pub use chain::{ErrorNode, PLAIN_CLASS_NAME};
pub use codec::{
    Field, FieldError, ParseDiagnostics, SignalCodec, TextCodec, TracingDiagnostics,
};
pub use finder::{find_relocation, FinderConfig, RelocationFinder};
pub use remote::{ErrorRegistry, RemoteError, RemoteUnwrap};
pub use signal::{EntityGroupMoved, NotServingError, UNKNOWN_PORT};
