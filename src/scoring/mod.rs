// Scoring module - the composite formula lives in composite.rs
// This module decides where a record's composite comes from

mod composite;

pub use composite::{score, Category, CompositeScore, Grade};

use crate::eval::EvaluationRecord;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Where the composite score of a record is taken from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreSource {
    /// Only scores embedded in the result files
    Embedded,
    /// Embedded score when valid, computed otherwise
    #[default]
    PreferEmbedded,
    /// Always recompute from the raw metrics
    Recompute,
}

/// Compute the composite of a record from its raw metrics
pub fn score_record(record: &EvaluationRecord) -> CompositeScore {
    score(
        &record.raw_metrics,
        record.file_stats.as_ref(),
        record.structure.as_ref(),
        record.tool_meta.as_ref(),
    )
}

/// Resolve the composite of a record under the given policy.
///
/// Returns `None` only for `ScoreSource::Embedded` when the record has no
/// usable embedded score.
pub fn resolve_composite(record: &EvaluationRecord, source: ScoreSource) -> Option<CompositeScore> {
    let embedded = record.embedded_composite().and_then(|parsed| {
        match parsed.and_then(|cached| cached.validate().map(|()| cached)) {
            Ok(cached) => Some(cached),
            Err(reason) => {
                warn!(
                    "Ignoring embedded score for ({}, {}, {}): {}",
                    record.combo(),
                    record.mode(),
                    record.task(),
                    reason
                );
                None
            }
        }
    });

    match source {
        ScoreSource::Embedded => embedded,
        ScoreSource::PreferEmbedded => Some(embedded.unwrap_or_else(|| score_record(record))),
        ScoreSource::Recompute => Some(score_record(record)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record_with_cache(cache: Option<CompositeScore>) -> EvaluationRecord {
        let mut record: EvaluationRecord = serde_json::from_str(
            r#"{"agent": "codex", "mode": "vanilla", "task": "t1", "scores": {"health": 100}}"#,
        )
        .unwrap();
        record.composite = cache.map(|c| serde_json::to_value(c).unwrap());
        record
    }

    fn cached(total_health: u32) -> CompositeScore {
        let mut breakdown = BTreeMap::new();
        breakdown.insert(Category::Health, total_health);
        CompositeScore::from_breakdown(breakdown)
    }

    #[test]
    fn test_prefer_embedded_uses_cache() {
        let record = record_with_cache(Some(cached(7)));
        let resolved = resolve_composite(&record, ScoreSource::PreferEmbedded).unwrap();
        assert_eq!(resolved.total, 7);
    }

    #[test]
    fn test_prefer_embedded_computes_without_cache() {
        let record = record_with_cache(None);
        let resolved = resolve_composite(&record, ScoreSource::PreferEmbedded).unwrap();
        // 35 health + 20 quality + 15 architecture + 10 algorithms
        assert_eq!(resolved.total, 80);
    }

    #[test]
    fn test_embedded_only_leaves_gaps() {
        assert!(resolve_composite(&record_with_cache(None), ScoreSource::Embedded).is_none());
    }

    #[test]
    fn test_recompute_ignores_cache() {
        let record = record_with_cache(Some(cached(7)));
        let resolved = resolve_composite(&record, ScoreSource::Recompute).unwrap();
        assert_eq!(resolved.total, 80);
    }

    #[test]
    fn test_invalid_cache_is_recomputed() {
        let mut bad = cached(7);
        bad.total = 99;
        let record = record_with_cache(Some(bad));
        assert_eq!(
            resolve_composite(&record, ScoreSource::PreferEmbedded).unwrap().total,
            80
        );
        assert!(resolve_composite(&record, ScoreSource::Embedded).is_none());
    }

    #[test]
    fn test_malformed_cache_is_recomputed() {
        for cache in [
            serde_json::json!({}),
            serde_json::json!({"aqs": 7, "grade": "F", "breakdown": {"health": 7, "security": 0}}),
            serde_json::json!({"grade": "F"}),
        ] {
            let mut record = record_with_cache(None);
            record.composite = Some(cache);
            assert_eq!(
                resolve_composite(&record, ScoreSource::PreferEmbedded).unwrap().total,
                80
            );
            assert!(resolve_composite(&record, ScoreSource::Embedded).is_none());
        }
    }
}
