//! Relocation finder - locates a relocation signal in an error chain.
//!
//! # Search order
//!
//! Starting from the given error, each node is examined in turn:
//!
//! 1. A relocation carrier ends the search. The carrier is the candidate.
//! 2. A remote wrapper is unwrapped, first as a relocation carrier, then as
//!    whatever class it declares. Anything rebuilt is searched on its own;
//!    a valid signal found there is the result.
//! 3. The search moves on to the node's cause.
//!
//! A candidate is only returned if it is valid. An invalid carrier met
//! directly in the chain ends the search with no result, while an invalid
//! signal rebuilt from a remote wrapper lets the search carry on along the
//! wrapper's cause.
//!
//! One search visits at most [`FinderConfig::max_depth`] nodes in total,
//! counting cause links and nodes inside rebuilt errors alike. Once the
//! budget is spent the search yields nothing, even if unvisited causes
//! remain.

use std::error::Error as StdError;

use helix_core::{Limits, CHAIN_DEPTH_MAX};
use tracing::debug;

use crate::chain::ErrorNode;
use crate::signal::EntityGroupMoved;

/// Configuration for the relocation finder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinderConfig {
    /// Maximum number of nodes one search visits.
    pub max_depth: u32,
}

impl FinderConfig {
    /// Creates a configuration from system limits.
    #[must_use]
    pub const fn from_limits(limits: &Limits) -> Self {
        Self {
            max_depth: limits.max_chain_depth,
        }
    }

    /// Sets the maximum search depth.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the depth is zero or above [`CHAIN_DEPTH_MAX`].
    pub const fn validate(&self) -> helix_core::Result<()> {
        if self.max_depth == 0 {
            return Err(helix_core::Error::InvalidArgument {
                name: "max_depth",
                reason: "must be positive",
            });
        }
        if self.max_depth > CHAIN_DEPTH_MAX {
            return Err(helix_core::Error::LimitExceeded {
                limit: "max_depth",
                max: CHAIN_DEPTH_MAX as u64,
                actual: self.max_depth as u64,
            });
        }
        Ok(())
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self::from_limits(&Limits::default())
    }
}

/// Finds relocation signals in error chains.
#[derive(Debug, Clone, Default)]
pub struct RelocationFinder {
    config: FinderConfig,
}

impl RelocationFinder {
    /// Creates a finder with the given configuration.
    #[must_use]
    pub const fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Creates a finder after validating its configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn try_new(config: FinderConfig) -> helix_core::Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Returns the finder configuration.
    #[must_use]
    pub const fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Returns the valid relocation signal embedded in `error`, if any.
    #[must_use]
    pub fn find(&self, error: Option<&ErrorNode>) -> Option<EntityGroupMoved> {
        let mut budget = self.config.max_depth;
        self.find_from(error?, &mut budget)
    }

    /// Returns the valid relocation signal embedded in a standard error
    /// chain, if any.
    #[must_use]
    pub fn find_in(&self, error: &(dyn StdError + 'static)) -> Option<EntityGroupMoved> {
        let node = ErrorNode::capture_bounded(error, self.config.max_depth);
        let mut budget = self.config.max_depth;
        self.find_from(&node, &mut budget)
    }

    fn find_from(&self, error: &ErrorNode, budget: &mut u32) -> Option<EntityGroupMoved> {
        let candidate = self.search(error, budget)?;
        if candidate.is_valid() {
            return Some(candidate);
        }
        debug!(
            hostname = ?candidate.hostname(),
            port = candidate.port(),
            "Discarding unparseable relocation signal"
        );
        None
    }

    /// Walks the chain from `error`, spending one unit of `budget` per node.
    fn search(&self, error: &ErrorNode, budget: &mut u32) -> Option<EntityGroupMoved> {
        let mut current = Some(error);

        while let Some(node) = current {
            if *budget == 0 {
                debug!(
                    max_depth = self.config.max_depth,
                    "Visit budget spent, giving up relocation search"
                );
                return None;
            }
            *budget -= 1;

            if let Some(moved) = node.as_moved() {
                return Some(moved.clone());
            }

            if let Some(remote) = node.as_remote() {
                let unwrapped = remote
                    .unwrap_as(EntityGroupMoved::CLASS_NAME)
                    .or_else(|| remote.unwrap_declared());
                let found = unwrapped.and_then(|inner| self.find_from(&inner, &mut *budget));
                if found.is_some() {
                    return found;
                }
                if *budget == 0 {
                    return None;
                }
            }

            current = node.cause();
        }

        None
    }
}

/// Returns the valid relocation signal embedded in `error`, using the
/// default search depth.
#[must_use]
pub fn find_relocation(error: &ErrorNode) -> Option<EntityGroupMoved> {
    RelocationFinder::default().find(Some(error))
}
