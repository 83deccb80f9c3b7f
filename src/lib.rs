//! Train word2vec embeddings (CBOW or skip-gram) over a directory of text files,
//! and look up the most similar words of a trained model.
//!
//! ```text
//! train:  directory -> Corpus -> Vocab -> Train -> Model -> model-vs..-w..-e..-a...bin
//! run:    model file -> Model -> Similarity -> Session (stdin / stdout)
//! ```

pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod logging;
pub mod model;
pub mod query;
pub mod similarity;
pub mod train;
pub mod vocab;
mod run;

pub use error::{Error, Result};
pub use model::Model;
pub use run::Run;
pub use similarity::{Lookup, Similarity};
