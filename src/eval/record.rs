use crate::scoring::CompositeScore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder used for an identity field the record does not carry
pub const UNKNOWN_ID: &str = "unknown";

/// A single raw metric as produced by the analysis tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl MetricValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetricValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Named raw metrics of one run.
///
/// `null` and a missing key are both reported as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawMetrics(pub BTreeMap<String, Option<MetricValue>>);

impl RawMetrics {
    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.0.get(name).and_then(|v| v.as_ref())
    }

    /// Numeric value of a metric, if present and numeric
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(MetricValue::as_number)
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(MetricValue::as_bool)
    }

}

impl<S: Into<String>> FromIterator<(S, MetricValue)> for RawMetrics {
    fn from_iter<I: IntoIterator<Item = (S, MetricValue)>>(iter: I) -> Self {
        RawMetrics(iter.into_iter().map(|(k, v)| (k.into(), Some(v))).collect())
    }
}

/// File counts of the evaluated project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileStats {
    #[serde(default)]
    pub total_files: Option<u64>,

    /// Per-language or per-kind counts we only pass through
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Test discovery facts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestInfo {
    #[serde(default)]
    pub tests_found: Option<bool>,
    #[serde(default)]
    pub test_file_count: Option<u64>,
}

/// Build configuration facts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildInfo {
    #[serde(default)]
    pub has_build_config: Option<bool>,
}

/// Structural checks over the evaluated project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    #[serde(default)]
    pub readme: Option<bool>,
    #[serde(default)]
    pub tests: Option<TestInfo>,
    #[serde(default)]
    pub build: Option<BuildInfo>,
}

impl Structure {
    pub fn tests_found(&self) -> bool {
        self.tests
            .as_ref()
            .and_then(|t| t.tests_found)
            .unwrap_or(false)
    }

    pub fn test_file_count(&self) -> Option<u64> {
        self.tests.as_ref().and_then(|t| t.test_file_count)
    }

    pub fn has_build_config(&self) -> bool {
        self.build
            .as_ref()
            .and_then(|b| b.has_build_config)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InitInfo {
    #[serde(default)]
    pub success: Option<bool>,
}

/// Metadata reported by the analysis tool itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolMeta {
    #[serde(default)]
    pub init: Option<InitInfo>,
}

impl ToolMeta {
    pub fn init_succeeded(&self) -> bool {
        self.init.as_ref().and_then(|i| i.success).unwrap_or(false)
    }
}

/// Version information of the agent that produced a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub cli_version: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub display: Option<String>,
    /// Version of the analysis tool that evaluated the run
    #[serde(default)]
    pub roam_version: Option<String>,
}

/// One evaluation result document: a single (combo, mode, task) run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Agent/tool configuration under test
    #[serde(default, rename = "agent")]
    pub combo_id: Option<String>,

    #[serde(default)]
    pub mode: Option<String>,

    #[serde(default, rename = "task")]
    pub task_id: Option<String>,

    /// Coarse task category
    #[serde(default)]
    pub group: Option<String>,

    #[serde(default, rename = "scores")]
    pub raw_metrics: RawMetrics,

    #[serde(default)]
    pub file_stats: Option<FileStats>,

    #[serde(default)]
    pub structure: Option<Structure>,

    #[serde(default, rename = "roam")]
    pub tool_meta: Option<ToolMeta>,

    #[serde(default)]
    pub signature: Option<Signature>,

    /// Previously computed composite score, kept as written until resolved
    #[serde(default, rename = "aqs")]
    pub composite: Option<serde_json::Value>,
}

impl EvaluationRecord {
    pub fn combo(&self) -> &str {
        self.combo_id.as_deref().unwrap_or(UNKNOWN_ID)
    }

    pub fn mode(&self) -> &str {
        self.mode.as_deref().unwrap_or(UNKNOWN_ID)
    }

    pub fn task(&self) -> &str {
        self.task_id.as_deref().unwrap_or(UNKNOWN_ID)
    }

    /// Embedded composite score.
    ///
    /// `None` when the record carries none (absent, `null` or `{}`), an
    /// error message when the value does not have the composite shape.
    pub fn embedded_composite(&self) -> Option<Result<CompositeScore, String>> {
        match &self.composite {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::Object(fields)) if fields.is_empty() => None,
            Some(value) => Some(CompositeScore::deserialize(value).map_err(|e| e.to_string())),
        }
    }

    /// Task group, or `default_group` when the record has none
    pub fn group_or<'a>(&'a self, default_group: &'a str) -> &'a str {
        self.group.as_deref().unwrap_or(default_group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_record() {
        let json = r#"{
            "agent": "codex",
            "mode": "vanilla",
            "task": "react-todo",
            "group": "standard",
            "scores": {"health": 82, "tangle_ratio": 0.12, "gate_passed": true, "dead_symbols": null},
            "file_stats": {"total_files": 14, "by_ext": {".ts": 9}},
            "structure": {"readme": true, "tests": {"tests_found": true, "test_file_count": 2}, "build": {"has_build_config": true}},
            "roam": {"init": {"success": true}},
            "signature": {"cli_version": "0.9.1", "model": "gpt-5.3"}
        }"#;

        let record: EvaluationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.combo(), "codex");
        assert_eq!(record.raw_metrics.number("health"), Some(82.0));
        assert_eq!(record.raw_metrics.number("tangle_ratio"), Some(0.12));
        assert_eq!(record.raw_metrics.flag("gate_passed"), Some(true));
        assert_eq!(record.raw_metrics.get("dead_symbols"), None);
        assert_eq!(record.file_stats.as_ref().unwrap().total_files, Some(14));
        assert!(record.file_stats.as_ref().unwrap().extra.contains_key("by_ext"));
        assert!(record.structure.as_ref().unwrap().tests_found());
        assert!(record.tool_meta.as_ref().unwrap().init_succeeded());
        assert!(record.embedded_composite().is_none());
    }

    #[test]
    fn test_embedded_composite_shapes() {
        let parse = |aqs: &str| -> EvaluationRecord {
            serde_json::from_str(&format!(r#"{{"agent": "a", "aqs": {}}}"#, aqs)).unwrap()
        };

        assert!(parse("null").embedded_composite().is_none());
        assert!(parse("{}").embedded_composite().is_none());

        let ok = parse(r#"{"aqs": 35, "grade": "F", "breakdown": {"health": 35}}"#);
        assert_eq!(ok.embedded_composite().unwrap().unwrap().total, 35);

        let unknown = parse(r#"{"aqs": 35, "grade": "F", "breakdown": {"health": 35, "security": 0}}"#);
        assert!(unknown.embedded_composite().unwrap().unwrap_err().contains("security"));

        assert!(parse("42").embedded_composite().unwrap().is_err());
    }

    #[test]
    fn test_missing_identity_falls_back() {
        let record: EvaluationRecord = serde_json::from_str(r#"{"scores": {}}"#).unwrap();
        assert_eq!(record.combo(), UNKNOWN_ID);
        assert_eq!(record.mode(), UNKNOWN_ID);
        assert_eq!(record.task(), UNKNOWN_ID);
        assert_eq!(record.group_or("standard"), "standard");
    }

    #[test]
    fn test_absent_is_not_zero() {
        let metrics: RawMetrics = serde_json::from_str(r#"{"health": null, "dead_symbols": 0}"#).unwrap();
        assert_eq!(metrics.number("health"), None);
        assert_eq!(metrics.number("dead_symbols"), Some(0.0));
        assert_eq!(metrics.number("missing"), None);
    }
}
