//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use vocab_core::model::EntryError;

/// Errors emitted by `VocabService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VocabError {
    #[error(transparent)]
    Entry(#[from] EntryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
