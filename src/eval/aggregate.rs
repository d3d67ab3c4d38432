//! Group-wise averages, deltas and rankings over a built index
//!
//! Absent values never count as zero: they are skipped, and a group where
//! nothing contributes reports `None` ("no data").

use super::{Catalog, IdentityKey, ResultIndex};
use crate::scoring::{Category, CompositeScore, Grade};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How index entries are grouped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupAxis {
    Combo,
    ComboMode,
    Mode,
    /// Task group (category of task)
    Group,
    GroupCombo,
}

/// Numeric value read from an index entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Raw metric by name
    Metric(String),
    /// Composite total
    CompositeTotal,
    /// Points of one composite category
    Category(Category),
}

impl Field {
    pub fn metric(name: &str) -> Self {
        Field::Metric(name.to_string())
    }

    pub fn value(&self, index: &ResultIndex, key: &IdentityKey) -> Option<f64> {
        match self {
            Field::Metric(name) => index.metrics(key).and_then(|m| m.number(name)),
            Field::CompositeTotal => index.composite(key).map(|c| c.total as f64),
            Field::Category(category) => index
                .composite(key)
                .and_then(|c| c.points(*category))
                .map(f64::from),
        }
    }
}

/// Mean of the values, `None` for an empty input
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Sum of the values, `None` for an empty input
pub fn sum<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    values.into_iter().fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

/// Average of one field over a group of entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMean {
    /// Group key parts, in axis order
    pub group: Vec<String>,
    /// Entries in the group
    pub entries: usize,
    /// Entries where the field was present
    pub contributing: usize,
    pub mean: Option<f64>,
}

impl GroupMean {
    /// Grade of the mean, for composite-total groups
    pub fn grade(&self) -> Option<Grade> {
        self.mean.map(Grade::from_score)
    }
}

fn group_key(index: &ResultIndex, key: &IdentityKey, axis: GroupAxis) -> Vec<String> {
    let group = || index.group_of(&key.task).unwrap_or_default().to_string();
    match axis {
        GroupAxis::Combo => vec![key.combo.clone()],
        GroupAxis::ComboMode => vec![key.combo.clone(), key.mode.clone()],
        GroupAxis::Mode => vec![key.mode.clone()],
        GroupAxis::Group => vec![group()],
        GroupAxis::GroupCombo => vec![group(), key.combo.clone()],
    }
}

/// Mean of `field` per group, optionally restricted to one mode
pub fn group_means(
    index: &ResultIndex,
    axis: GroupAxis,
    field: &Field,
    mode: Option<&str>,
) -> Vec<GroupMean> {
    let mut groups: BTreeMap<Vec<String>, (usize, Vec<f64>)> = BTreeMap::new();

    for key in index.keys() {
        if mode.is_some_and(|m| m != key.mode) {
            continue;
        }
        let entry = groups.entry(group_key(index, key, axis)).or_default();
        entry.0 += 1;
        if let Some(value) = field.value(index, key) {
            entry.1.push(value);
        }
    }

    groups
        .into_iter()
        .map(|(group, (entries, values))| GroupMean {
            group,
            entries,
            contributing: values.len(),
            mean: mean(values),
        })
        .collect()
}

/// Per-task deltas of one combo's comparison mode against the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaRow {
    pub combo: String,
    pub mode: String,
    /// `comparison - baseline` per catalog task, `None` when either side is missing
    pub deltas: Vec<(String, Option<f64>)>,
    /// Mean over the tasks present in both modes
    pub mean: Option<f64>,
}

/// Delta of `field` between two modes for one combo and task
pub fn delta(
    index: &ResultIndex,
    field: &Field,
    combo: &str,
    baseline: &str,
    comparison: &str,
    task: &str,
) -> Option<f64> {
    let base = field.value(index, &IdentityKey::new(combo, baseline, task))?;
    let other = field.value(index, &IdentityKey::new(combo, comparison, task))?;
    Some(other - base)
}

/// Deltas of every non-baseline mode against the baseline, per combo.
///
/// Rows without a single comparable task are left out.
pub fn mode_deltas(index: &ResultIndex, catalog: &Catalog, field: &Field) -> Vec<DeltaRow> {
    let mut rows = Vec::new();

    for combo in &catalog.combos {
        for mode in catalog.comparison_modes() {
            let deltas: Vec<(String, Option<f64>)> = catalog
                .tasks
                .iter()
                .map(|task| {
                    let d = delta(index, field, combo, &catalog.baseline_mode, mode, task);
                    (task.clone(), d)
                })
                .collect();

            let row_mean = mean(deltas.iter().filter_map(|(_, d)| *d));
            if row_mean.is_none() {
                continue;
            }

            rows.push(DeltaRow {
                combo: combo.clone(),
                mode: mode.clone(),
                deltas,
                mean: row_mean,
            });
        }
    }

    rows
}

/// Baseline-mode averages of one combo, ranked against the others
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboRanking {
    pub combo: String,
    /// 1 = best
    pub rank: u32,
    /// Tasks with a composite score
    pub tasks: usize,
    pub mean_total: f64,
    pub grade: Grade,
    /// Mean points per category; categories no score reported are missing
    pub category_means: BTreeMap<Category, f64>,
}

/// Rank combos by mean composite total in the baseline mode
pub fn rank_combos(index: &ResultIndex, catalog: &Catalog) -> Vec<ComboRanking> {
    let mut rankings: Vec<ComboRanking> = catalog
        .combos
        .iter()
        .filter_map(|combo| {
            let keys: Vec<IdentityKey> = catalog
                .tasks
                .iter()
                .map(|task| IdentityKey::new(combo, &catalog.baseline_mode, task))
                .filter(|key| index.composite(key).is_some())
                .collect();

            let mean_total = mean(
                keys.iter()
                    .filter_map(|key| Field::CompositeTotal.value(index, key)),
            )?;

            let category_means = Category::ALL
                .iter()
                .filter_map(|category| {
                    let field = Field::Category(*category);
                    mean(keys.iter().filter_map(|key| field.value(index, key)))
                        .map(|m| (*category, m))
                })
                .collect();

            Some(ComboRanking {
                combo: combo.clone(),
                rank: 0,
                tasks: keys.len(),
                mean_total,
                grade: Grade::from_score(mean_total),
                category_means,
            })
        })
        .collect();

    rankings.sort_by(|a, b| {
        b.mean_total
            .partial_cmp(&a.mean_total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.combo.cmp(&b.combo))
    });

    for (i, ranking) in rankings.iter_mut().enumerate() {
        ranking.rank = (i + 1) as u32;
    }

    rankings
}

/// Raw-metric summary of one combo in one mode across all tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeSummary {
    pub combo: String,
    pub mode: String,
    pub tasks: usize,
    pub avg_health: Option<f64>,
    pub dead_total: Option<f64>,
    pub avg_complexity: Option<f64>,
    pub cycles_total: Option<f64>,
    /// Tasks whose quality gate passed
    pub gate_passes: usize,
}

/// Summaries per combo and mode; pairs without any task are left out
pub fn mode_summaries(index: &ResultIndex, catalog: &Catalog) -> Vec<ModeSummary> {
    let mut summaries = Vec::new();

    for combo in &catalog.combos {
        for mode in &catalog.modes {
            let entries: Vec<_> = catalog
                .tasks
                .iter()
                .filter_map(|task| index.metrics(&IdentityKey::new(combo, mode, task)))
                .collect();

            if entries.is_empty() {
                continue;
            }

            summaries.push(ModeSummary {
                combo: combo.clone(),
                mode: mode.clone(),
                tasks: entries.len(),
                avg_health: mean(entries.iter().filter_map(|m| m.number("health"))),
                dead_total: sum(entries.iter().filter_map(|m| m.number("dead_symbols"))),
                avg_complexity: mean(entries.iter().filter_map(|m| m.number("avg_complexity"))),
                cycles_total: sum(entries.iter().filter_map(|m| m.number("cycle_count"))),
                gate_passes: entries
                    .iter()
                    .filter(|m| m.flag("gate_passed") == Some(true))
                    .count(),
            });
        }
    }

    summaries
}

/// The composite shown for a combo on a task: baseline mode first, then
/// the other modes in catalog order
pub fn headline_composite<'a>(
    index: &'a ResultIndex,
    catalog: &'a Catalog,
    combo: &str,
    task: &str,
) -> Option<(&'a str, &'a CompositeScore)> {
    std::iter::once(&catalog.baseline_mode)
        .chain(catalog.comparison_modes())
        .find_map(|mode| {
            index
                .composite(&IdentityKey::new(combo, mode, task))
                .map(|score| (mode.as_str(), score))
        })
}
