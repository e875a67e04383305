//! CLI command definitions and handlers

mod init;
mod matching;
mod stability;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// ashwam-eval - run-to-run stability analysis for journal extraction
#[derive(Parser, Debug)]
#[command(name = "ashwam-eval")]
#[command(
    version,
    about = "Measure how stable LLM journal extraction is across repeated runs",
    long_about = "ashwam-eval aligns the items produced by repeated extraction runs over the \
same journal, reports agreement, polarity flips and bucket drift, and writes a \
majority-vote stable output per journal.",
    after_help = "\
Examples:
  ashwam-eval stability --data data --out out           Evaluate every journal in data/llm_runs
  ashwam-eval stability --data data --out out -f json   JSON summary for scripting
  ashwam-eval stability --data data --out out --validate   Drop items whose evidence is not in the text
  ashwam-eval match --gold gold.json --pred pred.json   Precision/recall against a gold list
  ashwam-eval init data                                 Write an example ashwam.toml"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate run-to-run stability for every journal in a data directory
    #[command(after_help = "\
Data layout:
  <data>/journals.jsonl               {\"journal_id\", \"text\"} per line (needed for --validate)
  <data>/llm_runs/<journal>.<run>.json   {\"items\": [...]} per run
                                      (a file without a run id, like j1.json, is an error)
  <data>/ashwam.toml                  optional configuration

Outputs (in --out):
  stable_outputs.jsonl, per_journal_stability.jsonl, stability_summary.json")]
    Stability {
        /// Data directory containing llm_runs/ (and journals.jsonl)
        #[arg(long, env = "ASHWAM_DATA")]
        data: PathBuf,

        /// Output directory (created if missing)
        #[arg(long, env = "ASHWAM_OUT")]
        out: PathBuf,

        /// Console format: text, json, markdown (or md) [default: text]
        #[arg(long, short = 'f', value_parser = ["text", "json", "markdown", "md"])]
        format: Option<String>,

        /// Drop items that fail schema or evidence validation before aligning
        #[arg(long)]
        validate: bool,

        /// How global flip/drift event totals are counted [default: exact]
        #[arg(long, value_parser = ["exact", "legacy"])]
        event_counting: Option<String>,

        /// Number of parallel workers (1-64)
        #[arg(long, value_parser = parse_workers)]
        workers: Option<usize>,

        /// Hide the progress bar
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Match a prediction list against a gold list (precision, recall, F1)
    Match {
        /// Gold items: {"items": [...]} or a bare JSON array
        #[arg(long)]
        gold: PathBuf,

        /// Predicted items: {"items": [...]} or a bare JSON array
        #[arg(long)]
        pred: PathBuf,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Write an example ashwam.toml into a data directory
    Init {
        /// Data directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Stability {
            data,
            out,
            format,
            validate,
            event_counting,
            workers,
            quiet,
        } => stability::run(stability::StabilityArgs {
            data,
            out,
            format,
            validate,
            event_counting,
            workers,
            quiet,
        }),

        Commands::Match { gold, pred, format } => matching::run(&gold, &pred, &format),

        Commands::Init { path } => init::run(&path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_workers_bounds() {
        assert_eq!(parse_workers("4"), Ok(4));
        assert!(parse_workers("0").is_err());
        assert!(parse_workers("65").is_err());
        assert!(parse_workers("many").is_err());
    }

    #[test]
    fn test_cli_parses_stability() {
        let cli = Cli::try_parse_from([
            "ashwam-eval",
            "stability",
            "--data",
            "d",
            "--out",
            "o",
            "--event-counting",
            "legacy",
            "--workers",
            "2",
        ])
        .unwrap();
        match cli.command {
            Commands::Stability {
                event_counting,
                workers,
                validate,
                ..
            } => {
                assert_eq!(event_counting.as_deref(), Some("legacy"));
                assert_eq!(workers, Some(2));
                assert!(!validate);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        let parsed = Cli::try_parse_from([
            "ashwam-eval", "stability", "--data", "d", "--out", "o", "--format", "sarif",
        ]);
        assert!(parsed.is_err());
    }
}
