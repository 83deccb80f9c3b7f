use std::env;
use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};
use word2vec_sim::cli::{Cli, Mode};
use word2vec_sim::Run;

fn main() -> ExitCode {

    let cli = Cli::parse();

    // the log context lives for the whole program, no global subscriber is installed
    let dispatch = cli.log_config().dispatch();
    tracing::dispatcher::with_default(&dispatch, || execute(&cli))
}

/// Runs the selected mode, any error is logged and turns into a failing exit status.
fn execute(cli: &Cli) -> ExitCode {
    debug!("arguments {:?}", cli);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> word2vec_sim::Result<()> {
    match cli.mode() {
        Mode::Train(train_dir) => {
            let params = cli.train_params()?;
            Run::train(&train_dir, cli.extension(), &params, &env::current_dir()?)?;
        }
        Mode::Run(model_path) => {
            Run::query(&model_path, io::stdin().lock(), io::stdout().lock())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {

    use std::fs;
    use std::io;
    use std::process::ExitCode;
    use std::sync::{Arc, Mutex};

    use clap::error::ErrorKind;
    use clap::Parser;
    use tracing_subscriber::fmt::MakeWriter;
    use word2vec_sim::cli::Cli;

    use super::execute;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Buffer {
        type Writer = Buffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn execute_logged(args: &[&str]) -> (ExitCode, String) {
        let cli = Cli::try_parse_from(args).unwrap();
        let buffer = Buffer::default();
        let dispatch = cli.log_config().dispatch_to(buffer.clone());
        let code = tracing::dispatcher::with_default(&dispatch, || execute(&cli));
        let log = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        (code, log)
    }

    fn assert_failed(code: ExitCode) {
        assert_eq!(format!("{:?}", code), format!("{:?}", ExitCode::FAILURE));
    }

    fn error_lines(log: &str) -> Vec<&str> {
        log.lines().filter(|line| line.contains(":: ERROR")).collect()
    }

    #[test]
    fn empty_corpus_fails_with_logged_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.md"), "words that are not training text").unwrap();
        let root = dir.path().to_str().unwrap();

        let (code, log) = execute_logged(&["word2vec_sim", "-t", root, "-x", "txt"]);

        assert_failed(code);
        let errors = error_lines(&log);
        assert_eq!(errors.len(), 1, "{}", log);
        assert!(errors[0].contains("no tokens found in directory"), "{}", errors[0]);
        assert!(errors[0].contains(root), "{}", errors[0]);
    }

    #[test]
    fn missing_model_fails_with_logged_error() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model-vs50-w10-e20-a0.bin");

        let (code, log) = execute_logged(&["word2vec_sim", "-r", model.to_str().unwrap()]);

        assert_failed(code);
        let errors = error_lines(&log);
        assert_eq!(errors.len(), 1, "{}", log);
        assert!(errors[0].contains("doesn't exist"), "{}", errors[0]);
    }

    #[test]
    fn silenced_log_still_fails() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("absent.bin");

        let (code, log) = execute_logged(&["word2vec_sim", "-r", model.to_str().unwrap(), "-l", "50"]);

        assert_failed(code);
        assert!(log.is_empty(), "{}", log);
    }

    #[test]
    fn usage_errors_exit_with_two() {
        let err = Cli::try_parse_from(["word2vec_sim", "-t", "corpus", "-r", "model.bin"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
        assert_eq!(err.exit_code(), 2);

        let err = Cli::try_parse_from(["word2vec_sim"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
