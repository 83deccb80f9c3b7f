
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::info;

use crate::config::TrainParams;
use crate::corpus::Corpus;
use crate::error::Result;
use crate::model::Model;
use crate::query::{Session, Termination};
use crate::similarity::Similarity;
use crate::train::Train;

pub struct Run {}

impl Run {

    // train mode:
    // -> read the corpus
    // -> train
    // -> save the model under its parameter derived name in `output_dir`
    pub fn train(train_dir: &Path, extension: &str, params: &TrainParams, output_dir: &Path) -> Result<PathBuf> {

        info!("training configuration: {}", params);
        let corpus = Corpus::load(train_dir, extension)?;

        info!("creating word2vec model");
        let timer = Instant::now();
        let model = Train::run(corpus.sentences(), params)?;
        let elapsed = timer.elapsed();

        let model_path = params.model_path(output_dir);
        model.save(&model_path)?;
        info!("model {} trained in {:.2?}", model_path.display(), elapsed);
        info!("training is done");

        Ok(model_path)
    }

    // run mode: load the model, then answer queries from `input` until exit or end of input
    pub fn query<R: BufRead, W: Write>(model_path: &Path, input: R, output: W) -> Result<Termination> {

        info!("loading model {}", model_path.display());
        let model = Model::load(model_path)?;
        info!("model loaded {}", model.len());

        let similarity = Similarity::new(&model);
        let mut session = Session::new(&similarity, output);
        let termination = session.run(input)?;
        Ok(termination)
    }
}
