//! Error taxonomy for stack generation.
//!
//! Every failure is local to one generation pass: the caller gets no new
//! result and retries on the next evaluation.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::types::NodeId;

/// Errors raised while laying out or materializing a stack.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StackError {
    /// The bottom row must hold at least one item.
    #[error("base count must be at least 1, got {0}")]
    InvalidShape(i32),

    /// Growing the triangular array or the scene arena failed.
    #[error("allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    /// `generate` was called before a successful `initialize`.
    #[error("stack generator is not initialized")]
    NotInitialized,

    /// Parameters reference a path but no matching curve was supplied.
    #[error("base path {0} is not available")]
    MissingPath(NodeId),

    /// The arc-length table for the path could not be built.
    #[error("arc-length table could not be built: {0}")]
    DegeneratePath(&'static str),

    /// A node id does not name a live node.
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, StackError>;
