//! Error logger sink: per-document lists of missed and spurious items.

use super::aligner::Alignment;
use super::network::Inspector;
use super::write_artifact;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fmt::{Display, Write as _};
use std::path::PathBuf;

#[derive(Debug, Default)]
struct DocumentErrors {
    missed: Vec<String>,
    spurious: Vec<String>,
}

/// Writes `<output_dir>/errors/<docid>.txt` for every document at finish.
///
/// Contributes no score. Documents whose alignment is empty cannot be
/// attributed and are skipped.
pub struct ErrorLoggerSink<T> {
    output_dir: PathBuf,
    doc_id_fn: Box<dyn Fn(&T) -> String>,
    inspected: usize,
    documents: BTreeMap<String, DocumentErrors>,
}

impl<T> ErrorLoggerSink<T> {
    /// Sink writing under `<output_dir>/errors`, attributing items to a
    /// document with `doc_id_fn`.
    pub fn new(output_dir: impl Into<PathBuf>, doc_id_fn: impl Fn(&T) -> String + 'static) -> Self {
        Self {
            output_dir: output_dir.into().join("errors"),
            doc_id_fn: Box::new(doc_id_fn),
            inspected: 0,
            documents: BTreeMap::new(),
        }
    }
}

impl<T: Ord + Clone + Display> Inspector<Alignment<T>> for ErrorLoggerSink<T> {
    fn inspect(&mut self, alignment: &Alignment<T>) -> Result<()> {
        self.inspected += 1;
        let Some(any) = alignment
            .matched
            .iter()
            .chain(&alignment.gold_only)
            .chain(&alignment.system_only)
            .next()
        else {
            return Ok(());
        };
        let errors = self.documents.entry((self.doc_id_fn)(any)).or_default();
        errors
            .missed
            .extend(alignment.gold_only.iter().map(ToString::to_string));
        errors
            .spurious
            .extend(alignment.system_only.iter().map(ToString::to_string));
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.inspected == 0 {
            return Err(Error::finish_before_inspect("error logger"));
        }
        for (doc_id, errors) in &self.documents {
            let mut out = String::new();
            let _ = writeln!(out, "False negatives ({}):", errors.missed.len());
            for item in &errors.missed {
                let _ = writeln!(out, "  {}", item);
            }
            let _ = writeln!(out, "False positives ({}):", errors.spurious.len());
            for item in &errors.spurious {
                let _ = writeln!(out, "  {}", item);
            }
            write_artifact(&self.output_dir.join(format!("{}.txt", doc_id)), &out)?;
        }
        log::debug!(
            "Wrote error logs for {} documents to {}",
            self.documents.len(),
            self.output_dir.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocLevelEventArg;
    use std::collections::BTreeSet;

    fn arg(doc: &str, entity: &str) -> DocLevelEventArg {
        DocLevelEventArg::new(doc, "Life.Die", "Victim", entity)
    }

    #[test]
    fn test_writes_missed_and_spurious() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ErrorLoggerSink::new(dir.path(), |a: &DocLevelEventArg| a.doc_id.clone());
        let gold: BTreeSet<_> = [arg("d1", "E1"), arg("d1", "E2")].into_iter().collect();
        let system: BTreeSet<_> = [arg("d1", "E1"), arg("d1", "E9")].into_iter().collect();
        sink.inspect(&Alignment::of(&gold, &system)).unwrap();
        sink.inspect(&Alignment::of(&BTreeSet::new(), &BTreeSet::new()))
            .unwrap();
        sink.finish().unwrap();

        let text = std::fs::read_to_string(dir.path().join("errors/d1.txt")).unwrap();
        assert!(text.contains("False negatives (1):\n  d1/Life.Die/Victim/E2"));
        assert!(text.contains("False positives (1):\n  d1/Life.Die/Victim/E9"));
        assert!(!text.contains("/E1"));
    }

    #[test]
    fn test_finish_before_inspect_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ErrorLoggerSink::new(dir.path(), |a: &DocLevelEventArg| a.doc_id.clone());
        assert!(matches!(sink.finish(), Err(Error::FinishBeforeInspect(_))));
    }
}
