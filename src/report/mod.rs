//! Report data assembled from the index and the aggregator
//!
//! Both renderers consume a [`Report`]; neither recomputes a score.

pub mod columns;
mod html;
mod text;

pub use html::render_html;
pub use text::render_text;

use crate::cli::CompareConfig;
use crate::eval::aggregate::{
    self, ComboRanking, DeltaRow, Field, GroupAxis, GroupMean, ModeSummary,
};
use crate::eval::{Catalog, IdentityKey, MetricValue, ResultIndex};
use crate::scoring::{CompositeScore, Grade};
use chrono::{DateTime, Utc};
use columns::SCORE_COLUMNS;
use serde::Serialize;
use std::path::Path;

/// Metric the mode impact table compares
pub const DELTA_METRIC: &str = "health";

#[derive(Debug, Clone, Serialize)]
pub struct SignatureRow {
    pub combo: String,
    pub cli_version: Option<String>,
    pub model: Option<String>,
}

/// Composite shown in the overview for one combo on one task
#[derive(Debug, Clone, Serialize)]
pub struct HeadlineCell {
    pub mode: String,
    pub total: u32,
    pub grade: Grade,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverviewRow {
    pub task: String,
    /// One cell per overview combo
    pub cells: Vec<Option<HeadlineCell>>,
}

/// Mean of the headline totals of one combo
#[derive(Debug, Clone, Serialize)]
pub struct OverviewAverage {
    pub mean: f64,
    pub grade: Grade,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreakdownRow {
    pub combo: String,
    pub score: CompositeScore,
}

/// Baseline-mode category breakdown of every combo on one task
#[derive(Debug, Clone, Serialize)]
pub struct TaskBreakdown {
    pub task: String,
    pub rows: Vec<BreakdownRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricRow {
    pub combo: String,
    pub mode: String,
    /// One value per [`SCORE_COLUMNS`] entry
    pub values: Vec<Option<MetricValue>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskMetrics {
    pub task: String,
    pub rows: Vec<MetricRow>,
}

/// Everything the renderers show
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub catalog: Catalog,
    /// Distinct (combo, mode, task) entries
    pub evaluations: usize,
    pub skipped_files: usize,
    pub evaluator_version: Option<String>,
    pub signatures: Vec<SignatureRow>,
    /// Combos with at least one composite score
    pub overview_combos: Vec<String>,
    pub overview: Vec<OverviewRow>,
    /// One entry per overview combo
    pub overview_averages: Vec<Option<OverviewAverage>>,
    pub breakdowns: Vec<TaskBreakdown>,
    pub rankings: Vec<ComboRanking>,
    /// Baseline-mode composite mean per task group and combo
    pub group_summary: Vec<GroupMean>,
    /// Baseline-mode composite mean per task group over all combos
    pub group_totals: Vec<GroupMean>,
    pub task_metrics: Vec<TaskMetrics>,
    pub mode_summaries: Vec<ModeSummary>,
    pub delta_metric: String,
    pub mode_deltas: Vec<DeltaRow>,
}

impl Report {
    pub fn build(
        index: &ResultIndex,
        catalog: &Catalog,
        config: &CompareConfig,
        skipped_files: usize,
    ) -> Self {
        let signatures = catalog
            .combos
            .iter()
            .filter_map(|combo| {
                index.signature(combo).map(|s| SignatureRow {
                    combo: combo.clone(),
                    cli_version: s.cli_version.clone(),
                    model: s.model.clone(),
                })
            })
            .collect();

        let overview_combos: Vec<String> = catalog
            .combos
            .iter()
            .filter(|combo| index.composites().any(|(k, _)| &k.combo == *combo))
            .cloned()
            .collect();

        let overview: Vec<OverviewRow> = catalog
            .tasks
            .iter()
            .map(|task| OverviewRow {
                task: task.clone(),
                cells: overview_combos
                    .iter()
                    .map(|combo| {
                        aggregate::headline_composite(index, catalog, combo, task).map(
                            |(mode, score)| HeadlineCell {
                                mode: mode.to_string(),
                                total: score.total,
                                grade: score.grade,
                            },
                        )
                    })
                    .collect(),
            })
            .collect();

        let overview_averages = (0..overview_combos.len())
            .map(|i| {
                let totals = overview
                    .iter()
                    .filter_map(|row| row.cells[i].as_ref())
                    .map(|cell| cell.total as f64);
                aggregate::mean(totals).map(|mean| OverviewAverage {
                    mean,
                    grade: Grade::from_score(mean),
                })
            })
            .collect();

        let breakdowns = catalog
            .tasks
            .iter()
            .map(|task| TaskBreakdown {
                task: task.clone(),
                rows: overview_combos
                    .iter()
                    .filter_map(|combo| {
                        index
                            .composite(&IdentityKey::new(combo, &catalog.baseline_mode, task))
                            .map(|score| BreakdownRow {
                                combo: combo.clone(),
                                score: score.clone(),
                            })
                    })
                    .collect(),
            })
            .filter(|b| !b.rows.is_empty())
            .collect();

        let task_metrics = catalog
            .tasks
            .iter()
            .map(|task| {
                let mut rows = Vec::new();
                for combo in &catalog.combos {
                    for mode in &catalog.modes {
                        let Some(metrics) = index.metrics(&IdentityKey::new(combo, mode, task))
                        else {
                            continue;
                        };
                        rows.push(MetricRow {
                            combo: combo.clone(),
                            mode: mode.clone(),
                            values: SCORE_COLUMNS
                                .iter()
                                .map(|c| metrics.get(c.field).cloned())
                                .collect(),
                        });
                    }
                }
                TaskMetrics {
                    task: task.clone(),
                    rows,
                }
            })
            .collect();

        Self {
            title: config.title.clone(),
            generated_at: Utc::now(),
            catalog: catalog.clone(),
            evaluations: index.len(),
            skipped_files,
            evaluator_version: index.evaluator_version().map(str::to_string),
            signatures,
            overview_combos,
            overview,
            overview_averages,
            breakdowns,
            rankings: aggregate::rank_combos(index, catalog),
            group_summary: aggregate::group_means(
                index,
                GroupAxis::GroupCombo,
                &Field::CompositeTotal,
                Some(&catalog.baseline_mode),
            ),
            group_totals: aggregate::group_means(
                index,
                GroupAxis::Group,
                &Field::CompositeTotal,
                Some(&catalog.baseline_mode),
            ),
            task_metrics,
            mode_summaries: aggregate::mode_summaries(index, catalog),
            delta_metric: DELTA_METRIC.to_string(),
            mode_deltas: aggregate::mode_deltas(index, catalog, &Field::metric(DELTA_METRIC)),
        }
    }

    /// Save the report data as JSON
    pub fn save_json(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
