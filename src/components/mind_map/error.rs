//! Errors raised by graph mutations.

use thiserror::Error;

/// Failure of a [`GraphStore`](super::store::GraphStore) operation.
///
/// Callers take ids from the current snapshot, so hitting one of these means
/// the caller is out of sync with the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
	/// The operation named a node id that is not in the graph.
	#[error("no node with id `{0}`")]
	InvalidReference(String),
}

/// Result of a graph operation.
pub type Result<T, E = GraphError> = std::result::Result<T, E>;
