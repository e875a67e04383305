//! Stability command - align runs, compute metrics, write stable outputs

use anyhow::{Context, Result};
use ashwam_eval::config::{load_project_config, EventCounting, ProjectConfig};
use ashwam_eval::loader::{load_journals, load_runs_dir, JournalRuns, JOURNALS_FILE, RUNS_DIR};
use ashwam_eval::report::{write_outputs, StabilityReport};
use ashwam_eval::reporters;
use ashwam_eval::schema::{validate_runs, SchemaViolation};
use ashwam_eval::stability::{evaluate_journal, JournalEvaluation, Runs};
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;
use tracing::{info, warn};

const DEFAULT_FORMAT: &str = "text";

/// Flags as given on the command line; `None` means "not given"
#[derive(Debug)]
pub struct StabilityArgs {
    pub data: PathBuf,
    pub out: PathBuf,
    pub format: Option<String>,
    pub validate: bool,
    pub event_counting: Option<String>,
    pub workers: Option<usize>,
    pub quiet: bool,
}

/// Settings after layering flags over the project config over defaults
#[derive(Debug, PartialEq)]
struct Settings {
    format: String,
    validate: bool,
    event_counting: EventCounting,
    workers: Option<usize>,
}

fn apply_config_defaults(args: &StabilityArgs, config: &ProjectConfig) -> Result<Settings> {
    let event_counting = match &args.event_counting {
        Some(s) => EventCounting::from_str(s)?,
        None => config.stability.event_counting,
    };

    Ok(Settings {
        format: args
            .format
            .clone()
            .or_else(|| config.defaults.format.clone())
            .unwrap_or_else(|| DEFAULT_FORMAT.to_string()),
        validate: args.validate || config.stability.validate_items,
        event_counting,
        workers: args.workers.or(config.defaults.workers),
    })
}

/// Drop invalid items from every journal; returns how many were dropped
fn validate_all(data: &std::path::Path, journal_runs: JournalRuns) -> Result<(JournalRuns, usize)> {
    let journals = load_journals(&data.join(JOURNALS_FILE))?;

    let mut rejected = 0;
    let mut validated = JournalRuns::with_capacity(journal_runs.len());
    for (journal_id, runs) in journal_runs {
        let filtered = match journals.get(&journal_id) {
            Some(journal) => {
                let (filtered, dropped) = validate_runs(&runs, &journal.text);
                rejected += dropped;
                filtered
            }
            None => {
                let dropped: usize = runs.values().map(Vec::len).sum();
                warn!(
                    "{} ({} items dropped)",
                    SchemaViolation::UnknownJournal(journal_id.clone()),
                    dropped
                );
                rejected += dropped;
                runs.into_iter().map(|(run_id, _)| (run_id, Vec::new())).collect::<Runs>()
            }
        };
        validated.insert(journal_id, filtered);
    }

    info!("Validation dropped {} items", rejected);
    Ok((validated, rejected))
}

fn progress_bar(len: usize, quiet: bool) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    if quiet {
        bar.set_draw_target(ProgressDrawTarget::hidden());
    }
    if let Ok(bar_style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        bar.set_style(bar_style.progress_chars("█▓▒░  "));
    }
    bar.set_message("Evaluating journals...");
    bar
}

/// Evaluate every journal, in parallel, keeping input order
fn evaluate_all(
    journal_runs: &JournalRuns,
    workers: Option<usize>,
    quiet: bool,
) -> Result<Vec<JournalEvaluation>> {
    use rayon::prelude::*;

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(n) = workers {
        pool = pool.num_threads(n);
    }
    let pool = pool.build().context("Failed to start worker pool")?;

    let bar = progress_bar(journal_runs.len(), quiet);
    let journals: Vec<(&String, &Runs)> = journal_runs.iter().collect();

    let evaluations = pool.install(|| {
        journals
            .par_iter()
            .map(|(journal_id, runs)| {
                let eval = evaluate_journal(journal_id, runs);
                bar.inc(1);
                eval
            })
            .collect::<Vec<_>>()
    });

    bar.finish_and_clear();
    Ok(evaluations)
}

/// Run the stability command
pub fn run(args: StabilityArgs) -> Result<()> {
    let start = Instant::now();

    if !args.data.is_dir() {
        anyhow::bail!("Data directory does not exist: {}", args.data.display());
    }

    let config = load_project_config(&args.data);
    let settings = apply_config_defaults(&args, &config)?;
    info!("Settings: {:?}", settings);

    let journal_runs = load_runs_dir(&args.data.join(RUNS_DIR))?;
    let (journal_runs, rejected) = if settings.validate {
        validate_all(&args.data, journal_runs)?
    } else {
        (journal_runs, 0)
    };

    let evaluations = evaluate_all(&journal_runs, settings.workers, args.quiet)?;
    let report = StabilityReport::new(&evaluations, settings.event_counting, rejected);

    let paths = write_outputs(&args.out, &config.output, &evaluations, &report.summary)?;

    let rendered = reporters::report(&report, &settings.format)?;
    println!("{}", rendered);

    if settings.format == DEFAULT_FORMAT {
        println!(
            "{} Wrote {}, {}, {} {}",
            style("✓").green(),
            style(paths.stable_outputs.display()).cyan(),
            style(paths.per_journal.display()).cyan(),
            style(paths.summary.display()).cyan(),
            style(format!("({:.2?})", start.elapsed())).dim()
        );
    }

    Ok(())
}
