//! eal-score: event argument and linking scorer.

use clap::Parser;
use eal_scorer::cli::{log_filter, run_config, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(&cli)))
        .format_timestamp(None)
        .init();

    let result = run_config(&cli).and_then(|config| eal_scorer::run(&config));

    match result {
        Ok(summary) => {
            println!("{}", summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
