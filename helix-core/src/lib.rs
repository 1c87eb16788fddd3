//! Helix Core - Shared error types and limits for Helix.
//!
//! This crate provides the pieces every other Helix crate agrees on: the
//! core error type used when validating configuration, and the explicit
//! bounds placed on error-chain traversal and signal encoding.
//!
//! # Design Principles (TigerStyle)
//!
//! - **Explicit limits**: Every traversal and buffer has a bounded maximum
//! - **Explicit types**: Use u32/u64, not usize
//! - **No unsafe code**: Safety > Performance

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod limits;

pub use error::{Error, Result};
pub use limits::{
    Limits, CHAIN_DEPTH_DEFAULT, CHAIN_DEPTH_MAX, ENCODED_SIGNAL_BYTES_DEFAULT,
    ENCODED_SIGNAL_BYTES_MAX,
};
