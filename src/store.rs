//! Reading and writing system output, and the small key files a run needs.
//!
//! System output lives one JSON file per document in a directory:
//!
//! ```text
//! system_output/
//!   NYT_ENG_20130101.0001.json
//!   AFP_ENG_20130102.0042.json
//! ```
//!
//! Document id lists have one id per line; id-to-file maps have
//! `docid<whitespace>path` per line. Blank lines and `#` comments are skipped.

use crate::response::DocumentSystemOutput;
use crate::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// A source of per-document system output.
pub trait SystemOutputStore {
    /// Ids of every document present in the store.
    fn doc_ids(&self) -> Result<BTreeSet<String>>;

    /// Output for `doc_id`, or `None` if the store has no such document.
    fn read(&self, doc_id: &str) -> Result<Option<DocumentSystemOutput>>;

    /// Output for `doc_id`, empty if the store has no such document.
    fn read_or_empty(&self, doc_id: &str) -> Result<DocumentSystemOutput> {
        match self.read(doc_id)? {
            Some(output) => Ok(output),
            None => {
                log::warn!("No system output for {}; scoring it as empty", doc_id);
                Ok(DocumentSystemOutput::empty(doc_id))
            }
        }
    }

    /// Persist output for one document.
    fn write(&mut self, output: &DocumentSystemOutput) -> Result<()>;

    /// Release the store. Further use is undefined.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Directory of `<docid>.json` files.
#[derive(Debug, Clone)]
pub struct JsonSystemOutputStore {
    dir: PathBuf,
}

impl JsonSystemOutputStore {
    /// Open an existing store directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::invalid_input(format!(
                "system output directory {} does not exist",
                dir.display()
            )));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, doc_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", doc_id))
    }
}

impl SystemOutputStore for JsonSystemOutputStore {
    fn doc_ids(&self) -> Result<BTreeSet<String>> {
        let mut ids = BTreeSet::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.insert(stem.to_string());
            }
        }
        Ok(ids)
    }

    fn read(&self, doc_id: &str) -> Result<Option<DocumentSystemOutput>> {
        let path = self.path_for(doc_id);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| {
            Error::invalid_input(format!("cannot read system output {}: {}", path.display(), e))
        })?;
        let output: DocumentSystemOutput = serde_json::from_str(&content)?;
        if output.doc_id != doc_id {
            return Err(Error::corrupt_input(format!(
                "{} contains output for document {}",
                path.display(),
                output.doc_id
            )));
        }
        output.validate()?;
        Ok(Some(output))
    }

    fn write(&mut self, output: &DocumentSystemOutput) -> Result<()> {
        output.validate()?;
        let path = self.path_for(&output.doc_id);
        let json = serde_json::to_string_pretty(output)?;
        fs::write(&path, json).map_err(|e| Error::write(&path, e))
    }
}

fn content_lines(path: &Path) -> Result<Vec<(usize, String)>> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::invalid_input(format!("cannot read {}: {}", path.display(), e))
    })?;
    Ok(content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim().to_string()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .collect())
}

/// Load a list of document ids, one per line.
pub fn load_doc_id_list(path: impl AsRef<Path>) -> Result<BTreeSet<String>> {
    Ok(content_lines(path.as_ref())?
        .into_iter()
        .map(|(_, line)| line)
        .collect())
}

/// Load a `docid<whitespace>path` map.
///
/// Relative paths are resolved against the map file's directory.
pub fn load_doc_id_to_file_map(path: impl AsRef<Path>) -> Result<BTreeMap<String, PathBuf>> {
    let path = path.as_ref();
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let mut map = BTreeMap::new();
    for (line_no, line) in content_lines(path)? {
        let mut parts = line.splitn(2, char::is_whitespace);
        let (Some(doc_id), Some(file)) = (parts.next(), parts.next().map(str::trim)) else {
            return Err(Error::invalid_input(format!(
                "{}:{}: expected `docid path`, got {:?}",
                path.display(),
                line_no,
                line
            )));
        };
        let file = PathBuf::from(file);
        let file = if file.is_relative() { base.join(file) } else { file };
        if map.insert(doc_id.to_string(), file).is_some() {
            return Err(Error::invalid_input(format!(
                "{}:{}: duplicate document id {}",
                path.display(),
                line_no,
                doc_id
            )));
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offset::CharSpan;
    use crate::response::{Response, ResponseLinking, ResponseSet};

    #[test]
    fn test_store_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonSystemOutputStore::open(dir.path()).unwrap();
        let output = DocumentSystemOutput::new(
            "d1",
            vec![Response::new("r1", "Life.Die", "Victim", CharSpan::new(3, 9))],
            ResponseLinking::new(vec![ResponseSet::new("s1", ["r1"])]),
        );
        store.write(&output).unwrap();

        assert_eq!(store.doc_ids().unwrap().into_iter().collect::<Vec<_>>(), vec!["d1"]);
        assert_eq!(store.read("d1").unwrap(), Some(output));
        assert_eq!(store.read("missing").unwrap(), None);
        assert!(store.read_or_empty("missing").unwrap().responses.is_empty());
        store.close().unwrap();
    }

    #[test]
    fn test_open_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(JsonSystemOutputStore::open(dir.path().join("nope")).is_err());
    }

    #[test]
    fn test_read_rejects_mismatched_doc_id() {
        let dir = tempfile::tempdir().unwrap();
        let body = serde_json::to_string(&DocumentSystemOutput::empty("other")).unwrap();
        std::fs::write(dir.path().join("d1.json"), body).unwrap();
        let store = JsonSystemOutputStore::open(dir.path()).unwrap();
        assert!(matches!(store.read("d1"), Err(Error::CorruptInput(_))));
    }

    #[test]
    fn test_load_doc_id_list_skips_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        std::fs::write(&path, "# ids\nd2\n\n  d1  \n").unwrap();
        let ids = load_doc_id_list(&path).unwrap();
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["d1", "d2"]);
    }

    #[test]
    fn test_load_doc_id_to_file_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.txt");
        std::fs::write(&path, "d1\tgold/d1.json\nd2 /abs/d2.json\n").unwrap();
        let map = load_doc_id_to_file_map(&path).unwrap();
        assert_eq!(map["d1"], dir.path().join("gold/d1.json"));
        assert_eq!(map["d2"], PathBuf::from("/abs/d2.json"));
    }

    #[test]
    fn test_load_doc_id_to_file_map_rejects_bad_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.txt");
        std::fs::write(&path, "d1\n").unwrap();
        assert!(load_doc_id_to_file_map(&path).is_err());
        std::fs::write(&path, "d1 a.json\nd1 b.json\n").unwrap();
        assert!(load_doc_id_to_file_map(&path).is_err());
    }
}
