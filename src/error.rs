use thiserror::Error;

use crate::edit::MutationError;
use crate::store::StoreError;

/// Errors that abort a file, a wave, or the whole run
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing a file's content failed
    #[error("Failed to access '{file}': {source}")]
    Store {
        file: String,
        #[source]
        source: StoreError,
    },

    /// A mutation could not be applied to a file
    #[error("Failed to mutate '{file}': {source}")]
    Mutation {
        file: String,
        #[source]
        source: MutationError,
    },

    /// The wave producer failed to deliver a wave
    #[error("Failed to produce wave: {0}")]
    Producer(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Run cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
