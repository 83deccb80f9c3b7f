//! Command line schema.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::config::{Algorithm, TrainParams};
use crate::error::Result;
use crate::logging::{LogConfig, LogFormat, LogLevel};

/// The mode chosen on the command line, exactly one per process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Train(PathBuf),
    Run(PathBuf),
}

#[derive(Parser, Debug)]
#[command(name = "word2vec_sim")]
#[command(about = "Train word2vec models on a directory of text files and search the most similar words")]
#[command(group(ArgGroup::new("mode").required(true).args(["train", "run"])))]
pub struct Cli {
    /// Directory of the training set
    #[arg(short, long, value_name = "DIR")]
    pub train: Option<PathBuf>,

    /// Model file to load for interactive queries
    #[arg(short, long, value_name = "MODEL_FILE")]
    pub run: Option<PathBuf>,

    /// Context window size
    #[arg(short = 'w', long = "windowsize", visible_alias = "window", default_value_t = 10, value_parser = positive)]
    pub window: usize,

    /// Dimension of the word vectors
    #[arg(short = 'v', long = "vectorsize", default_value_t = 50, value_parser = positive)]
    pub vector_size: usize,

    /// Number of epochs
    #[arg(short = 'e', long = "epoch", visible_alias = "epochs", default_value_t = 20, value_parser = positive)]
    pub epochs: usize,

    /// Only read files whose name ends with this (e.g. txt), any file by default
    #[arg(short = 'x', long)]
    pub extension: Option<String>,

    /// 1 for skip-gram, 0 for CBOW
    #[arg(short, long, default_value = "0")]
    pub algorithm: Algorithm,

    /// 0: not set, 10: debug, 20: info, 30: warning, 40: error, 50: critical
    #[arg(short, long = "loglevel", default_value = "20")]
    pub loglevel: LogLevel,

    /// Layout of the log lines written to stderr
    #[arg(long = "logformat", value_enum, default_value_t = LogFormat::Text)]
    pub logformat: LogFormat,
}

fn positive(s: &str) -> std::result::Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be a positive integer".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl Cli {

    pub fn mode(&self) -> Mode {
        match (&self.train, &self.run) {
            (Some(dir), None) => Mode::Train(dir.clone()),
            (None, Some(model)) => Mode::Run(model.clone()),
            _ => unreachable!("clap requires exactly one of --train and --run"),
        }
    }

    pub fn extension(&self) -> &str {
        self.extension.as_deref().unwrap_or("")
    }

    pub fn train_params(&self) -> Result<TrainParams> {
        TrainParams::new(self.vector_size, self.window, self.epochs, self.algorithm)
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.loglevel,
            format: self.logformat,
        }
    }
}
