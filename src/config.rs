//! Scoring and run configuration.
//!
//! A run is described by a TOML file. Scoring options sit at the top level
//! next to the run's paths:
//!
//! ```toml
//! doc_ids_to_score = "docids.txt"
//! gold_doc_map = "gold.map"
//! system_output = "system/"
//! output_dir = "scores/"
//! parse_doc_map = "parses.map"
//!
//! relax_alignment_using_auxiliary_parse = true
//! bootstrap_rounds = 1000
//! bootstrap_seed = 0
//! banned_roles = ["Time", "Crime", "Position", "Fine", "Sentence"]
//! ```
//!
//! Relative paths are resolved against the config file's directory.

use crate::align::AlignmentOptions;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Roles excluded from scoring unless configured otherwise.
pub const DEFAULT_BANNED_ROLES: [&str; 5] = ["Time", "Crime", "Position", "Fine", "Sentence"];

/// Options that change how documents are scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Fall back to head-token matching against an auxiliary parse
    pub relax_alignment_using_auxiliary_parse: bool,
    /// Under relaxation, only use constituents with exactly the given offsets
    pub require_exact_offsets_under_relaxation: bool,
    /// Bootstrap resampling rounds
    pub bootstrap_rounds: usize,
    /// Bootstrap RNG seed
    pub bootstrap_seed: u64,
    /// Canonical roles removed from both sides before extraction
    pub banned_roles: BTreeSet<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            relax_alignment_using_auxiliary_parse: false,
            require_exact_offsets_under_relaxation: false,
            bootstrap_rounds: 1000,
            bootstrap_seed: 0,
            banned_roles: DEFAULT_BANNED_ROLES.iter().map(|r| r.to_string()).collect(),
        }
    }
}

impl ScoringConfig {
    /// Alignment switches implied by this configuration.
    #[must_use]
    pub fn alignment_options(&self) -> AlignmentOptions {
        AlignmentOptions {
            relax_using_parse: self.relax_alignment_using_auxiliary_parse,
            require_exact_offsets: self.relax_alignment_using_auxiliary_parse
                && self.require_exact_offsets_under_relaxation,
        }
    }

    /// Reject unusable settings and normalise ineffective ones.
    pub fn validate(&mut self) -> Result<()> {
        if self.bootstrap_rounds == 0 {
            return Err(Error::config("bootstrap_rounds must be at least 1"));
        }
        if self.require_exact_offsets_under_relaxation
            && !self.relax_alignment_using_auxiliary_parse
        {
            log::warn!(
                "require_exact_offsets_under_relaxation has no effect without \
                 relax_alignment_using_auxiliary_parse"
            );
            self.require_exact_offsets_under_relaxation = false;
        }
        Ok(())
    }
}

/// Everything a scoring run needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// File listing the documents to score, one id per line
    pub doc_ids_to_score: PathBuf,
    /// File mapping document ids to gold document files
    pub gold_doc_map: PathBuf,
    /// Directory of per-document system output
    pub system_output: PathBuf,
    /// Directory reports are written to
    pub output_dir: PathBuf,
    /// File mapping document ids to auxiliary parse files
    #[serde(default)]
    pub parse_doc_map: Option<PathBuf>,
    /// TOML ontology table replacing the built-in mapping
    #[serde(default)]
    pub ontology_mapping: Option<PathBuf>,
    /// Scoring options
    #[serde(flatten)]
    pub scoring: ScoringConfig,
}

impl RunConfig {
    /// Run configuration from explicit paths and default scoring options.
    pub fn new(
        doc_ids_to_score: impl Into<PathBuf>,
        gold_doc_map: impl Into<PathBuf>,
        system_output: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            doc_ids_to_score: doc_ids_to_score.into(),
            gold_doc_map: gold_doc_map.into(),
            system_output: system_output.into(),
            output_dir: output_dir.into(),
            parse_doc_map: None,
            ontology_mapping: None,
            scoring: ScoringConfig::default(),
        }
    }

    /// Load from a TOML file, resolving relative paths against its directory.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read config {}: {}", path.display(), e))
        })?;
        let mut config: RunConfig = toml::from_str(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.doc_ids_to_score);
        resolve(&mut self.gold_doc_map);
        resolve(&mut self.system_output);
        resolve(&mut self.output_dir);
        if let Some(p) = self.parse_doc_map.as_mut() {
            resolve(p);
        }
        if let Some(p) = self.ontology_mapping.as_mut() {
            resolve(p);
        }
    }

    /// Check inputs exist and scoring options are usable.
    pub fn validate(&mut self) -> Result<()> {
        self.scoring.validate()?;
        for (what, path) in [
            ("doc_ids_to_score", &self.doc_ids_to_score),
            ("gold_doc_map", &self.gold_doc_map),
        ] {
            if !path.is_file() {
                return Err(Error::config(format!("{} {} is not a file", what, path.display())));
            }
        }
        if !self.system_output.is_dir() {
            return Err(Error::config(format!(
                "system_output {} is not a directory",
                self.system_output.display()
            )));
        }
        if let Some(map) = &self.parse_doc_map {
            if !map.is_file() {
                return Err(Error::config(format!("parse_doc_map {} is not a file", map.display())));
            }
        } else if self.scoring.relax_alignment_using_auxiliary_parse {
            return Err(Error::config(
                "relax_alignment_using_auxiliary_parse requires parse_doc_map",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScoringConfig::default();
        assert_eq!(config.bootstrap_rounds, 1000);
        assert_eq!(config.bootstrap_seed, 0);
        assert!(config.banned_roles.contains("Time"));
        assert_eq!(config.banned_roles.len(), 5);
        assert_eq!(config.alignment_options(), AlignmentOptions::exact());
    }

    #[test]
    fn test_exact_offsets_without_relaxation_is_normalised() {
        let mut config = ScoringConfig {
            require_exact_offsets_under_relaxation: true,
            ..ScoringConfig::default()
        };
        config.validate().unwrap();
        assert!(!config.require_exact_offsets_under_relaxation);
        assert!(!config.alignment_options().require_exact_offsets);
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let mut config = ScoringConfig {
            bootstrap_rounds: 0,
            ..ScoringConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_run_config_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(
            &path,
            r#"
doc_ids_to_score = "ids.txt"
gold_doc_map = "gold.map"
system_output = "/abs/system"
output_dir = "out"
relax_alignment_using_auxiliary_parse = true
require_exact_offsets_under_relaxation = true
bootstrap_seed = 7
banned_roles = ["Time"]
"#,
        )
        .unwrap();
        let config = RunConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.doc_ids_to_score, dir.path().join("ids.txt"));
        assert_eq!(config.system_output, PathBuf::from("/abs/system"));
        assert_eq!(config.scoring.bootstrap_seed, 7);
        assert_eq!(config.scoring.bootstrap_rounds, 1000);
        assert_eq!(config.scoring.banned_roles.len(), 1);
        assert_eq!(config.scoring.alignment_options(), AlignmentOptions::relaxed(true));
        assert!(config.parse_doc_map.is_none());
    }

    #[test]
    fn test_validate_requires_parse_map_for_relaxation() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ids.txt"), "d1\n").unwrap();
        std::fs::write(dir.path().join("gold.map"), "d1 d1.json\n").unwrap();
        let mut config = RunConfig::new(
            dir.path().join("ids.txt"),
            dir.path().join("gold.map"),
            dir.path(),
            dir.path().join("out"),
        );
        config.validate().unwrap();
        config.scoring.relax_alignment_using_auxiliary_parse = true;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
