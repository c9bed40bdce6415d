//! Error types for tree operations and construction-time validation

use thiserror::Error;

/// Errors raised by tree mutations and invalid construction arguments
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Easing curve name did not match any known curve
    #[error("unknown easing curve `{0}`")]
    UnknownEasing(String),

    /// Node id is stale or was never part of this tree
    #[error("node does not exist in this tree")]
    UnknownNode,

    /// The root node cannot be removed or re-parented
    #[error("the root node cannot be removed or re-parented")]
    RootRemoval,

    /// Attaching would make a node its own ancestor
    #[error("attaching would create a cycle in the tree")]
    CycleDetected,

    /// Child index outside `0..=len`
    #[error("child index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Result alias for tree operations
pub type Result<T> = std::result::Result<T, Error>;
