//! Identity index over loaded evaluation records

use super::{EvaluationRecord, RawMetrics, Signature};
use crate::cli::CompareConfig;
use crate::scoring::{resolve_composite, CompositeScore, ScoreSource};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

/// Natural key of an evaluation record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IdentityKey {
    pub combo: String,
    pub mode: String,
    pub task: String,
}

impl IdentityKey {
    pub fn new(combo: &str, mode: &str, task: &str) -> Self {
        Self {
            combo: combo.to_string(),
            mode: mode.to_string(),
            task: task.to_string(),
        }
    }

    pub fn of(record: &EvaluationRecord) -> Self {
        Self::new(record.combo(), record.mode(), record.task())
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.combo, self.mode, self.task)
    }
}

/// Lookups built once from a record list and only read afterwards
#[derive(Debug, Clone, Default)]
pub struct ResultIndex {
    metrics: BTreeMap<IdentityKey, RawMetrics>,
    composites: BTreeMap<IdentityKey, CompositeScore>,
    signatures: BTreeMap<String, Signature>,
    task_groups: BTreeMap<String, String>,
}

impl ResultIndex {
    /// Index `records` in order. A later record replaces an earlier one
    /// with the same key; signatures keep the first one seen per combo.
    pub fn build(records: &[EvaluationRecord], source: ScoreSource, default_group: &str) -> Self {
        let mut index = ResultIndex::default();

        for record in records {
            let key = IdentityKey::of(record);

            match resolve_composite(record, source) {
                Some(composite) => {
                    index.composites.insert(key.clone(), composite);
                }
                None => {
                    index.composites.remove(&key);
                }
            }

            if let (Some(combo), Some(signature)) = (&record.combo_id, &record.signature) {
                index
                    .signatures
                    .entry(combo.clone())
                    .or_insert_with(|| signature.clone());
            }

            index.task_groups.insert(
                record.task().to_string(),
                record.group_or(default_group).to_string(),
            );

            if index.metrics.insert(key.clone(), record.raw_metrics.clone()).is_some() {
                debug!("{} replaced by a later record", key);
            }
        }

        index
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &IdentityKey> {
        self.metrics.keys()
    }

    pub fn metrics(&self, key: &IdentityKey) -> Option<&RawMetrics> {
        self.metrics.get(key)
    }

    pub fn composite(&self, key: &IdentityKey) -> Option<&CompositeScore> {
        self.composites.get(key)
    }

    pub fn composites(&self) -> impl Iterator<Item = (&IdentityKey, &CompositeScore)> {
        self.composites.iter()
    }

    pub fn signature(&self, combo: &str) -> Option<&Signature> {
        self.signatures.get(combo)
    }

    /// Version of the analysis tool, taken from the first signature carrying one
    pub fn evaluator_version(&self) -> Option<&str> {
        self.signatures
            .values()
            .find_map(|s| s.roam_version.as_deref())
    }

    pub fn group_of(&self, task: &str) -> Option<&str> {
        self.task_groups.get(task).map(String::as_str)
    }
}

/// The combos, modes, tasks and groups present in an index, in display order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub combos: Vec<String>,
    pub modes: Vec<String>,
    pub tasks: Vec<String>,
    pub groups: Vec<String>,
    pub baseline_mode: String,
    combo_names: BTreeMap<String, String>,
    task_names: BTreeMap<String, String>,
}

/// Preferred ids that are present, then the rest in sorted order
fn ordered(preferred: &[String], mut discovered: BTreeSet<String>) -> Vec<String> {
    let mut result = Vec::with_capacity(discovered.len());
    for id in preferred {
        if discovered.remove(id) {
            result.push(id.clone());
        }
    }
    result.extend(discovered);
    result
}

impl Catalog {
    /// Discover the catalog from the index contents
    pub fn discover(index: &ResultIndex, config: &CompareConfig) -> Self {
        let combos: BTreeSet<String> = index.keys().map(|k| k.combo.clone()).collect();
        let modes: BTreeSet<String> = index.keys().map(|k| k.mode.clone()).collect();
        let tasks: BTreeSet<String> = index.keys().map(|k| k.task.clone()).collect();
        let groups: BTreeSet<String> = index.task_groups.values().cloned().collect();

        let combo_names = combos
            .iter()
            .map(|combo| {
                let name = config
                    .combo_display
                    .get(combo)
                    .cloned()
                    .or_else(|| index.signature(combo).and_then(|s| s.display.clone()))
                    .unwrap_or_else(|| combo.clone());
                (combo.clone(), name)
            })
            .collect();

        let task_names = tasks
            .iter()
            .map(|task| {
                let name = config
                    .task_display
                    .get(task)
                    .cloned()
                    .unwrap_or_else(|| task.clone());
                (task.clone(), name)
            })
            .collect();

        Self {
            combos: ordered(&config.combo_order, combos),
            modes: ordered(&config.preferred_modes(), modes),
            tasks: ordered(&config.task_order, tasks),
            groups: ordered(&[config.default_group.clone()], groups),
            baseline_mode: config.baseline_mode.clone(),
            combo_names,
            task_names,
        }
    }

    pub fn combo_name<'a>(&'a self, combo: &'a str) -> &'a str {
        self.combo_names.get(combo).map_or(combo, String::as_str)
    }

    pub fn task_name<'a>(&'a self, task: &'a str) -> &'a str {
        self.task_names.get(task).map_or(task, String::as_str)
    }

    /// Modes other than the baseline
    pub fn comparison_modes(&self) -> impl Iterator<Item = &String> {
        self.modes.iter().filter(move |m| **m != self.baseline_mode)
    }
}
