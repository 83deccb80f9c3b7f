
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Training examples gathered from a directory tree, one tokenized line per example.
pub struct Corpus {
    sentences: Vec<Vec<String>>,
}

// split on any run of whitespace
fn tokenize(sequence: &str) -> Vec<String> {
    sequence.split_whitespace().map(|x| x.to_string()).collect()
}

impl Corpus {

    /// Walks `root` recursively and reads every file whose name ends with `extension`
    /// (an empty extension keeps every file).
    ///
    /// Directories that cannot be listed and files that are not valid UTF-8 are skipped.
    /// A root that is not a directory, or a walk that yields no example at all, is an empty corpus.
    pub fn load(root: &Path, extension: &str) -> Result<Corpus> {

        debug!("training directory is {}", root.display());

        let mut sentences = Vec::new();
        if root.is_dir() {
            for file in Corpus::walk(root, extension) {
                Corpus::read_file(&file, &mut sentences)?;
            }
        } else {
            info!("{} is not a directory", root.display());
        }
        info!("number of training examples: {}", sentences.len());

        if sentences.is_empty() {
            return Err(Error::EmptyCorpus { dir: root.to_path_buf() });
        }

        Ok(Self { sentences })
    }

    pub fn sentences(&self) -> &[Vec<String>] {
        &self.sentences
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    // depth first, files of a directory before its sub directories, both sorted by name
    fn walk(root: &Path, extension: &str) -> Vec<PathBuf> {
        WalkDir::new(root)
            .sort_by(|a, b| {
                a.file_type().is_dir()
                    .cmp(&b.file_type().is_dir())
                    .then_with(|| a.file_name().cmp(b.file_name()))
            })
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    info!("cannot list {}", e);
                    None
                }
            })
            .filter(|entry| !entry.file_type().is_dir() && entry.path().is_file())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(extension))
            .map(|entry| entry.into_path())
            .collect()
    }

    fn read_file(path: &Path, sentences: &mut Vec<Vec<String>>) -> Result<()> {

        let bytes = fs::read(path).map_err(|source| Error::ReadFile { path: path.to_path_buf(), source })?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => {
                info!("cannot read file {}", path.display());
                return Ok(());
            }
        };

        for line in text.lines() {
            let tokens = tokenize(line);
            if !tokens.is_empty() {
                sentences.push(tokens);
            }
        }
        debug!("read {}", path.display());
        Ok(())
    }
}


#[cfg(test)]
mod tests {

    use std::fs;
    use std::path::Path;

    use super::{tokenize, Corpus};
    use crate::error::Error;

    fn write(path: &Path, content: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn tokenize_on_whitespace() {
        assert_eq!(tokenize("  the cat\tsat \r"), vec!["the", "cat", "sat"]);
        assert!(tokenize(" \t ").is_empty());
    }

    #[test]
    fn load_nested_directories_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("b.txt"), b"second file\n");
        write(&dir.path().join("a.txt"), b"first line\n\nthird  line here\n");
        write(&dir.path().join("sub/deeper/c.txt"), b"nested file");

        let corpus = Corpus::load(dir.path(), "").unwrap();
        let expected: Vec<Vec<String>> = vec![
            vec!["first".into(), "line".into()],
            vec!["third".into(), "line".into(), "here".into()],
            vec!["second".into(), "file".into()],
            vec!["nested".into(), "file".into()],
        ];
        assert_eq!(corpus.sentences(), expected.as_slice());
        assert_eq!(corpus.len(), 4);
    }

    #[test]
    fn extension_filter() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("keep.txt"), b"kept words");
        write(&dir.path().join("skip.md"), b"skipped words");
        write(&dir.path().join("sub/also.txt"), b"also kept");

        let corpus = Corpus::load(dir.path(), "txt").unwrap();
        assert_eq!(corpus.len(), 2);
        assert!(corpus.sentences().iter().flatten().all(|tok| tok != "skipped"));
    }

    #[test]
    fn undecodable_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("binary.txt"), &[0xff, 0xfe, 0x00, 0x9f]);
        write(&dir.path().join("text.txt"), b"readable line");

        let corpus = Corpus::load(dir.path(), ".txt").unwrap();
        assert_eq!(corpus.sentences(), &[vec!["readable".to_string(), "line".to_string()]]);
    }

    #[test]
    fn no_matching_files_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("notes.md"), b"some words");

        match Corpus::load(dir.path(), "txt") {
            Err(Error::EmptyCorpus { dir: reported }) => assert_eq!(reported, dir.path()),
            other => panic!("expected empty corpus, got {:?}", other.map(|c| c.len())),
        }
    }

    #[test]
    fn blank_files_are_an_empty_corpus() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("blank.txt"), b"\n   \n\t\n");
        assert!(matches!(Corpus::load(dir.path(), ""), Err(Error::EmptyCorpus { .. })));
    }

    #[test]
    fn missing_root_is_an_empty_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("absent");
        match Corpus::load(&absent, "") {
            Err(Error::EmptyCorpus { dir: reported }) => assert_eq!(reported, absent),
            other => panic!("expected empty corpus, got {:?}", other.map(|c| c.len())),
        }
    }

    #[test]
    fn file_root_is_an_empty_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.md");
        write(&file, b"words in a file given as the root");

        let err = Corpus::load(&file, "").err().expect("a file is not a training directory");
        assert!(matches!(&err, Error::EmptyCorpus { dir } if dir == &file));
        assert!(err.to_string().contains("a.md"), "{}", err);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_links_are_left_out() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("ok.txt"), b"fine words");
        symlink(dir.path().join("gone"), dir.path().join("link.txt")).unwrap();

        // dangling links are not regular files, so the walk leaves them out
        let corpus = Corpus::load(dir.path(), "txt").unwrap();
        assert_eq!(corpus.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directories_are_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("a.txt"), b"kept words");
        write(&dir.path().join("locked/b.txt"), b"hidden words");
        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let loaded = Corpus::load(dir.path(), "txt");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        // privileged users can still list the directory
        let corpus = loaded.unwrap();
        assert_eq!(corpus.sentences()[0], vec!["kept", "words"]);
    }

    #[test]
    fn files_come_before_sub_directories() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("a/inner.txt"), b"inner");
        write(&dir.path().join("b.txt"), b"outer");

        let corpus = Corpus::load(dir.path(), "").unwrap();
        let first: Vec<&str> = corpus.sentences().iter().map(|s| s[0].as_str()).collect();
        assert_eq!(first, vec!["outer", "inner"]);
    }
}
