//! Stability results: per-journal rows, the global summary and output files
//!
//! Per-journal results are folded into a `StabilitySummary` explicitly; no
//! running totals live outside the fold.

use crate::config::{EventCounting, OutputConfig};
use crate::models::StableItem;
use crate::stability::metrics::rate;
use crate::stability::JournalEvaluation;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Stability metrics for one journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalStability {
    pub journal_id: String,
    pub agreement_rate: f64,
    pub polarity_flip_rate: f64,
    pub bucket_drift_rate: f64,
    pub total_clusters: usize,
    pub stable_clusters: usize,
}

/// Totals across every journal in a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StabilitySummary {
    pub total_clusters: usize,
    pub stable_clusters: usize,
    pub overall_agreement_rate: f64,
    pub polarity_flip_events: usize,
    pub bucket_drift_events: usize,
}

impl StabilitySummary {
    /// Fold one journal's evaluation into the totals.
    pub fn accumulate(mut self, eval: &JournalEvaluation, counting: EventCounting) -> Self {
        let row = &eval.stability;
        self.total_clusters += row.total_clusters;
        self.stable_clusters += row.stable_clusters;

        let (flips, drifts) = match counting {
            EventCounting::Exact => (eval.polarity_flips.events, eval.bucket_drifts.events),
            // rate * cluster count, truncated
            EventCounting::Legacy => (
                (row.polarity_flip_rate * row.total_clusters as f64) as usize,
                (row.bucket_drift_rate * row.total_clusters as f64) as usize,
            ),
        };
        self.polarity_flip_events += flips;
        self.bucket_drift_events += drifts;

        self.overall_agreement_rate = rate(self.stable_clusters, self.total_clusters);
        self
    }

    pub fn from_evaluations(evaluations: &[JournalEvaluation], counting: EventCounting) -> Self {
        evaluations
            .iter()
            .fold(Self::default(), |summary, eval| summary.accumulate(eval, counting))
    }
}

/// Everything the console reporters render
#[derive(Debug, Clone, Serialize)]
pub struct StabilityReport {
    pub summary: StabilitySummary,
    pub journals: Vec<JournalStability>,
    pub event_counting: EventCounting,
    pub total_journals: usize,
    /// Items dropped by schema validation (0 when validation is off)
    pub rejected_items: usize,
}

impl StabilityReport {
    pub fn new(
        evaluations: &[JournalEvaluation],
        counting: EventCounting,
        rejected_items: usize,
    ) -> Self {
        Self {
            summary: StabilitySummary::from_evaluations(evaluations, counting),
            journals: evaluations.iter().map(|e| e.stability.clone()).collect(),
            event_counting: counting,
            total_journals: evaluations.len(),
            rejected_items,
        }
    }
}

/// One line of the stable output stream
#[derive(Debug, Serialize)]
pub struct StableRecord<'a> {
    pub journal_id: &'a str,
    pub items: &'a [StableItem],
}

/// Where the output files ended up
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub stable_outputs: PathBuf,
    pub summary: PathBuf,
    pub per_journal: PathBuf,
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn write_jsonl<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<()> {
    let mut writer = create(path)?;
    for row in rows {
        serde_json::to_writer(&mut writer, &row)?;
        writer.write_all(b"\n")?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Write the stable outputs, per-journal rows and summary into `out_dir`.
///
/// Existing files are replaced, not appended to.
pub fn write_outputs(
    out_dir: &Path,
    names: &OutputConfig,
    evaluations: &[JournalEvaluation],
    summary: &StabilitySummary,
) -> Result<OutputPaths> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let paths = OutputPaths {
        stable_outputs: out_dir.join(&names.stable_outputs),
        summary: out_dir.join(&names.summary),
        per_journal: out_dir.join(&names.per_journal),
    };

    write_jsonl(
        &paths.stable_outputs,
        evaluations.iter().map(|e| StableRecord {
            journal_id: &e.stability.journal_id,
            items: &e.stable_items,
        }),
    )?;
    write_jsonl(&paths.per_journal, evaluations.iter().map(|e| &e.stability))?;

    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(&paths.summary, json)
        .with_context(|| format!("Failed to write {}", paths.summary.display()))?;

    tracing::info!(
        "Wrote {} journals to {}",
        evaluations.len(),
        out_dir.display()
    );

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stability::tests::runs_from;
    use crate::stability::{evaluate_journal, EventCount};
    use serde_json::json;

    fn evaluation(
        total: usize,
        stable: usize,
        flips: EventCount,
        drifts: EventCount,
    ) -> JournalEvaluation {
        JournalEvaluation {
            stability: JournalStability {
                journal_id: "j".into(),
                agreement_rate: rate(stable, total),
                polarity_flip_rate: flips.rate(),
                bucket_drift_rate: drifts.rate(),
                total_clusters: total,
                stable_clusters: stable,
            },
            stable_items: Vec::new(),
            polarity_flips: flips,
            bucket_drifts: drifts,
        }
    }

    #[test]
    fn test_summary_exact_counts() {
        let evals = vec![
            evaluation(3, 1, EventCount { events: 1, evaluated: 2 }, EventCount { events: 2, evaluated: 3 }),
            evaluation(1, 1, EventCount { events: 0, evaluated: 1 }, EventCount { events: 1, evaluated: 1 }),
        ];
        let summary = StabilitySummary::from_evaluations(&evals, EventCounting::Exact);

        assert_eq!(summary.total_clusters, 4);
        assert_eq!(summary.stable_clusters, 2);
        assert_eq!(summary.overall_agreement_rate, 0.5);
        assert_eq!(summary.polarity_flip_events, 1);
        assert_eq!(summary.bucket_drift_events, 3);
    }

    #[test]
    fn test_summary_legacy_counts_truncate() {
        // flip rate 0.5 over 3 clusters -> trunc(1.5) = 1
        // drift rate 0.6667 over 3 clusters -> trunc(2.0001) = 2
        let evals = vec![evaluation(
            3,
            0,
            EventCount { events: 1, evaluated: 2 },
            EventCount { events: 2, evaluated: 3 },
        )];
        let summary = StabilitySummary::from_evaluations(&evals, EventCounting::Legacy);
        assert_eq!(summary.polarity_flip_events, 1);
        assert_eq!(summary.bucket_drift_events, 2);

        // 1/3 rounds to 0.3333; 0.3333 * 3 truncates to 0
        let lossy = vec![evaluation(
            3,
            0,
            EventCount { events: 1, evaluated: 3 },
            EventCount::default(),
        )];
        assert_eq!(
            StabilitySummary::from_evaluations(&lossy, EventCounting::Legacy).polarity_flip_events,
            0
        );
        assert_eq!(
            StabilitySummary::from_evaluations(&lossy, EventCounting::Exact).polarity_flip_events,
            1
        );
    }

    #[test]
    fn test_empty_summary() {
        let summary = StabilitySummary::from_evaluations(&[], EventCounting::Exact);
        assert_eq!(summary, StabilitySummary::default());
        assert_eq!(summary.overall_agreement_rate, 0.0);
    }

    #[test]
    fn test_write_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let runs = runs_from(vec![
            ("r1", vec![json!({"domain": "symptom", "evidence_span": "headache", "polarity": "present"})]),
            ("r2", vec![json!({"domain": "symptom", "evidence_span": "headache", "polarity": "present"})]),
        ]);
        let evals = vec![evaluate_journal("j1", &runs)];
        let summary = StabilitySummary::from_evaluations(&evals, EventCounting::Exact);

        let out = dir.path().join("nested").join("out");
        let paths = write_outputs(&out, &OutputConfig::default(), &evals, &summary).unwrap();

        let stable = std::fs::read_to_string(&paths.stable_outputs).unwrap();
        let line: serde_json::Value = serde_json::from_str(stable.lines().next().unwrap()).unwrap();
        assert_eq!(line["journal_id"], "j1");
        assert_eq!(line["items"][0]["polarity"], "present");

        let rows = std::fs::read_to_string(&paths.per_journal).unwrap();
        let row: JournalStability = serde_json::from_str(rows.trim()).unwrap();
        assert_eq!(row.agreement_rate, 1.0);

        let written: StabilitySummary =
            serde_json::from_str(&std::fs::read_to_string(&paths.summary).unwrap()).unwrap();
        assert_eq!(written, summary);

        // A second write replaces rather than appends.
        write_outputs(&out, &OutputConfig::default(), &evals, &summary).unwrap();
        let stable = std::fs::read_to_string(&paths.stable_outputs).unwrap();
        assert_eq!(stable.lines().count(), 1);
    }
}
