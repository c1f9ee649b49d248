//! Loading interview transcripts from disk

use crate::model::{Corpus, Transcript};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const TRANSCRIPT_PREFIX: &str = "interview_";
pub const TRANSCRIPT_EXTENSION: &str = "txt";

#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("cannot read transcript directory {}: {source}", .path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Transcripts that loaded, plus the files that could not be read
#[derive(Debug, Default)]
pub struct CorpusLoad {
    pub corpus: Corpus,
    pub unreadable: Vec<(PathBuf, std::io::Error)>,
}

fn is_transcript(path: &Path) -> bool {
    let stem_ok = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.starts_with(TRANSCRIPT_PREFIX))
        .unwrap_or(false);
    let ext_ok = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(TRANSCRIPT_EXTENSION))
        .unwrap_or(false);
    stem_ok && ext_ok && path.is_file()
}

/// Read every `interview_*.txt` in `dir`, sorted by file name.
///
/// The file stem becomes the transcript id. A file that exists but can't be
/// read is logged and reported in [`CorpusLoad::unreadable`] instead of
/// failing the whole load.
pub fn load_corpus<P: AsRef<Path>>(dir: P) -> Result<CorpusLoad, CorpusError> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|source| CorpusError::Directory {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| is_transcript(p))
        .collect();
    paths.sort();

    let mut load = CorpusLoad::default();
    for path in paths {
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        match fs::read_to_string(&path) {
            Ok(text) => load.corpus.push(Transcript::new(id, text)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable transcript");
                load.unreadable.push((path, e));
            }
        }
    }

    Ok(load)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_loads_sorted_transcripts() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("interview_02.txt"), "PARTICIPANT: second").unwrap();
        fs::write(dir.path().join("interview_01.txt"), "PARTICIPANT: first").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a transcript").unwrap();
        fs::write(dir.path().join("interview_03.md"), "wrong extension").unwrap();
        fs::create_dir(dir.path().join("interview_04.txt")).unwrap();

        let load = load_corpus(dir.path()).unwrap();
        let ids: Vec<&str> = load.corpus.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["interview_01", "interview_02"]);
        assert_eq!(load.corpus[0].text, "PARTICIPANT: first");
        assert!(load.unreadable.is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_unreadable_not_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("interview_01.txt"), [0xff, 0xfe, 0x00]).unwrap();
        fs::write(dir.path().join("interview_02.txt"), "PARTICIPANT: fine").unwrap();

        let load = load_corpus(dir.path()).unwrap();
        assert_eq!(load.corpus.len(), 1);
        assert_eq!(load.unreadable.len(), 1);
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            load_corpus(&missing),
            Err(CorpusError::Directory { .. })
        ));
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert!(load_corpus(dir.path()).unwrap().corpus.is_empty());
    }
}
