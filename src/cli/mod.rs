//! CLI library modules for the eal-score binary.
//!
//! Argument handling lives here rather than in the binary so it can be
//! tested without spawning a process.

pub mod parser;

pub use parser::Cli;

use crate::config::RunConfig;
use crate::{Error, Result};
use std::path::PathBuf;

/// Default log filter for the verbosity flags.
#[must_use]
pub fn log_filter(cli: &Cli) -> &'static str {
    if cli.quiet {
        return "error";
    }
    match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn required(value: Option<PathBuf>, flag: &str) -> Result<PathBuf> {
    value.ok_or_else(|| Error::config(format!("{} is required without --config", flag)))
}

/// Build the run configuration: the config file if given, then flag overrides.
pub fn run_config(cli: &Cli) -> Result<RunConfig> {
    let mut config = match &cli.config {
        Some(path) => RunConfig::from_toml_file(path)?,
        None => RunConfig::new(
            required(cli.doc_ids.clone(), "--doc-ids")?,
            required(cli.gold_map.clone(), "--gold-map")?,
            required(cli.system_output.clone(), "--system-output")?,
            required(cli.output_dir.clone(), "--output-dir")?,
        ),
    };

    if let Some(p) = &cli.doc_ids {
        config.doc_ids_to_score = p.clone();
    }
    if let Some(p) = &cli.gold_map {
        config.gold_doc_map = p.clone();
    }
    if let Some(p) = &cli.system_output {
        config.system_output = p.clone();
    }
    if let Some(p) = &cli.output_dir {
        config.output_dir = p.clone();
    }
    if cli.parse_map.is_some() {
        config.parse_doc_map = cli.parse_map.clone();
    }
    if cli.ontology.is_some() {
        config.ontology_mapping = cli.ontology.clone();
    }

    let scoring = &mut config.scoring;
    if cli.relax_using_parse {
        scoring.relax_alignment_using_auxiliary_parse = true;
    }
    if cli.require_exact_offsets {
        scoring.require_exact_offsets_under_relaxation = true;
    }
    if let Some(rounds) = cli.bootstrap_rounds {
        scoring.bootstrap_rounds = rounds;
    }
    if let Some(seed) = cli.bootstrap_seed {
        scoring.bootstrap_seed = seed;
    }
    if cli.no_banned_roles {
        scoring.banned_roles.clear();
    } else if !cli.banned_roles.is_empty() {
        scoring.banned_roles = cli.banned_roles.iter().cloned().collect();
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_flags_without_config() {
        let cli = Cli::parse_from([
            "eal-score",
            "--doc-ids",
            "ids.txt",
            "--gold-map",
            "gold.map",
            "--system-output",
            "sys",
            "--output-dir",
            "out",
            "--banned-role",
            "Time",
            "--bootstrap-seed",
            "3",
            "-vv",
        ]);
        let config = run_config(&cli).unwrap();
        assert_eq!(config.doc_ids_to_score, PathBuf::from("ids.txt"));
        assert_eq!(config.scoring.bootstrap_seed, 3);
        assert_eq!(config.scoring.bootstrap_rounds, 1000);
        assert_eq!(config.scoring.banned_roles.len(), 1);
        assert_eq!(log_filter(&cli), "debug");
    }

    #[test]
    fn test_missing_paths_without_config() {
        let cli = Cli::parse_from(["eal-score", "--doc-ids", "ids.txt"]);
        assert!(matches!(run_config(&cli), Err(Error::Config(_))));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(
            &path,
            "doc_ids_to_score = \"ids.txt\"\n\
             gold_doc_map = \"gold.map\"\n\
             system_output = \"sys\"\n\
             output_dir = \"out\"\n\
             bootstrap_rounds = 50\n",
        )
        .unwrap();
        let cli = Cli::parse_from([
            "eal-score",
            "--config",
            path.to_str().unwrap(),
            "--output-dir",
            "/tmp/elsewhere",
            "--no-banned-roles",
            "-q",
        ]);
        let config = run_config(&cli).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/elsewhere"));
        assert_eq!(config.gold_doc_map, dir.path().join("gold.map"));
        assert_eq!(config.scoring.bootstrap_rounds, 50);
        assert!(config.scoring.banned_roles.is_empty());
        assert_eq!(log_filter(&cli), "error");
    }
}
