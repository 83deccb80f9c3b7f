
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TrainParams;
use crate::error::{Error, Result};

/// A trained embedding: one row of `vectors` per entry of `words`.
///
/// On disk the model is a gzip stream holding its bincode encoding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Model {
    words: Vec<String>,
    counts: Vec<usize>,
    vectors: Array2<f32>,
    params: TrainParams,
}

impl Model {

    pub fn new(words: Vec<String>, counts: Vec<usize>, vectors: Array2<f32>, params: TrainParams) -> Result<Model> {
        let model = Self { words, counts, vectors, params };
        model.check_shapes()?;
        Ok(model)
    }

    fn check_shapes(&self) -> Result<()> {
        let (rows, cols) = self.vectors.dim();
        if rows != self.words.len() || self.counts.len() != self.words.len() {
            return Err(Error::CorruptModel(format!(
                "{} words, {} counts and {} vectors",
                self.words.len(), self.counts.len(), rows
            )));
        }
        if cols != self.params.vector_size {
            return Err(Error::CorruptModel(format!("vectors of size {} but vectorsize is {}", cols, self.params.vector_size)));
        }
        Ok(())
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn vectors(&self) -> &Array2<f32> {
        &self.vectors
    }

    pub fn params(&self) -> &TrainParams {
        &self.params
    }

    /// vocabulary size
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let f = BufWriter::new(File::create(path)?);
        let mut writer = GzEncoder::new(f, Compression::default());
        bincode::serialize_into(&mut writer, self)?;
        writer.finish()?.flush()?;
        debug!("saved {} vectors to {}", self.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Model> {
        if !path.exists() {
            return Err(Error::ModelNotFound(path.to_path_buf()));
        }
        let reader = GzDecoder::new(BufReader::new(File::open(path)?));
        let model: Model = bincode::deserialize_from(reader)?;
        model.check_shapes()?;
        Ok(model)
    }
}
