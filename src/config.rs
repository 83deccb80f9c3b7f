
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// tokens seen fewer times than this are dropped from the vocabulary
pub const MIN_COUNT: usize = 5;
/// number of training threads
pub const WORKERS: usize = 8;

/// The word2vec training objective, selected by `0` (CBOW) or `1` (skip-gram) on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    Cbow,
    SkipGram,
}

impl Algorithm {
    /// numeric selector used on the command line and in model file names
    pub fn code(self) -> u8 {
        match self {
            Algorithm::Cbow => 0,
            Algorithm::SkipGram => 1,
        }
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(Algorithm::Cbow),
            "1" => Ok(Algorithm::SkipGram),
            other => Err(format!("training algorithm must be 1 for skip-gram or 0 for CBOW, got '{}'", other)),
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::Cbow => write!(f, "CBOW"),
            Algorithm::SkipGram => write!(f, "skip-gram"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainParams {
    pub vector_size: usize,
    pub window: usize,
    pub epochs: usize,
    pub algorithm: Algorithm,
    pub min_count: usize,
    pub workers: usize,
    pub negative: usize,   // noise words drawn per positive example
    pub alpha: f32,        // initial learning rate
    pub min_alpha: f32,    // learning rate reached at the end of the last epoch
    pub sample: f64,       // down-sampling threshold for frequent words
    pub seed: u64,
    pub batch_words: usize // target number of words in one training job
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            vector_size: 50,
            window: 10,
            epochs: 20,
            algorithm: Algorithm::Cbow,
            min_count: MIN_COUNT,
            workers: WORKERS,
            negative: 5,
            alpha: 0.025,
            min_alpha: 0.0001,
            sample: 1e-3,
            seed: 1,
            batch_words: 10000,
        }
    }
}

impl Display for TrainParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "vectorsize: {}, window: {}, epochs: {}, algorithm: {} ({}), min_count: {}, workers: {}",
        self.vector_size, self.window, self.epochs, self.algorithm.code(), self.algorithm, self.min_count, self.workers
        )
    }
}

impl TrainParams {

    /// Builds the parameters for one run from the four tunable values, the rest keep their defaults.
    pub fn new(vector_size: usize, window: usize, epochs: usize, algorithm: Algorithm) -> Result<TrainParams> {
        let params = Self {
            vector_size,
            window,
            epochs,
            algorithm,
            ..Default::default()
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("vectorsize", self.vector_size),
            ("window", self.window),
            ("epochs", self.epochs),
            ("workers", self.workers),
            ("batch_words", self.batch_words),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(Error::InvalidParams(format!("{} must be positive", name)));
            }
        }
        if !(self.min_alpha <= self.alpha) {
            return Err(Error::InvalidParams(format!("min_alpha {} is above alpha {}", self.min_alpha, self.alpha)));
        }
        Ok(())
    }

    /// `model-vs{vectorsize}-w{window}-e{epochs}-a{algorithm}.bin`
    pub fn model_file_name(&self) -> String {
        format!("model-vs{}-w{}-e{}-a{}.bin", self.vector_size, self.window, self.epochs, self.algorithm.code())
    }

    pub fn model_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(self.model_file_name())
    }
}
