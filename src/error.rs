//! Error types for training and querying word2vec models

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a train or run session
#[derive(Error, Debug)]
pub enum Error {
    /// Reading the corpus or writing/reading a model failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A corpus file was listed but could not be read
    #[error("cannot read file {}: {source}", path.display())]
    ReadFile { path: PathBuf, source: std::io::Error },

    /// The corpus walk produced no training examples
    #[error("no tokens found in directory {}", dir.display())]
    EmptyCorpus { dir: PathBuf },

    /// Every token fell below the minimum frequency
    #[error("no token occurs at least {min_count} times, vocabulary is empty")]
    EmptyVocabulary { min_count: usize },

    /// The model file to load does not exist
    #[error("model {} doesn't exist", .0.display())]
    ModelNotFound(PathBuf),

    /// The model file decoded but its contents are inconsistent
    #[error("corrupt model: {0}")]
    CorruptModel(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("cannot build training thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Training parameters out of range
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}
