//! CLI argument parsing and structure definitions

use clap::Parser;
use std::path::PathBuf;

/// Score event argument extraction output against gold annotation
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "eal-score")]
#[command(
    author,
    version,
    about = "Score event argument and linking output against ERE-style gold annotation",
    long_about = r#"
eal-score - event argument and linking scorer

INPUTS:
  • document id list      one document id per line
  • gold document map     `docid<TAB>path` per line, gold documents as JSON
  • system output         directory of <docid>.json files
  • parse map (optional)  `docid<TAB>path` per line, parses as JSON

OUTPUTS (under --output-dir):
  aggregateF.txt / aggregateF.json                 argument P/R/F1
  EventType.bootstrapped.txt / .json               per-event-type bootstrap breakdown
  linkingF.txt                                     pairwise linking P/R/F1
  errors/<docid>.txt                               missed and spurious arguments

EXAMPLES:
  eal-score --config run.toml
  eal-score --doc-ids ids.txt --gold-map gold.map --system-output sys/ --output-dir scores/
  eal-score --config run.toml --relax-using-parse --parse-map parses.map -v
"#
)]
pub struct Cli {
    /// TOML run configuration; other flags override its values
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Documents to score, one id per line
    #[arg(long, value_name = "FILE")]
    pub doc_ids: Option<PathBuf>,

    /// Document id to gold document file map
    #[arg(long, value_name = "FILE")]
    pub gold_map: Option<PathBuf>,

    /// Directory of per-document system output
    #[arg(long, value_name = "DIR")]
    pub system_output: Option<PathBuf>,

    /// Directory to write reports to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Document id to auxiliary parse file map
    #[arg(long, value_name = "FILE")]
    pub parse_map: Option<PathBuf>,

    /// TOML ontology table replacing the built-in ERE to KBP mapping
    #[arg(long, value_name = "FILE")]
    pub ontology: Option<PathBuf>,

    /// Fall back to head-token matching against the auxiliary parse
    #[arg(long)]
    pub relax_using_parse: bool,

    /// Under relaxation, only use constituents with exactly the given offsets
    #[arg(long)]
    pub require_exact_offsets: bool,

    /// Bootstrap resampling rounds
    #[arg(long, value_name = "N")]
    pub bootstrap_rounds: Option<usize>,

    /// Bootstrap RNG seed
    #[arg(long, value_name = "SEED")]
    pub bootstrap_seed: Option<u64>,

    /// Role to exclude from scoring (repeatable; replaces the configured set)
    #[arg(long = "banned-role", value_name = "ROLE")]
    pub banned_roles: Vec<String>,

    /// Score every role
    #[arg(long, conflicts_with = "banned_roles")]
    pub no_banned_roles: bool,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
