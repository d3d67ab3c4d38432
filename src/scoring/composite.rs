//! Agent Quality Score (AQS)
//!
//! Reduces one run's raw metrics and structural facts into a 0-100 score
//! split over six fixed categories:
//!
//! | Category     | Points |
//! |--------------|--------|
//! | Health       | 35     |
//! | Quality      | 20     |
//! | Architecture | 15     |
//! | Algorithms   | 10     |
//! | Testing      | 15     |
//! | Completeness | 5      |
//!
//! A metric that is absent contributes neither a penalty nor a credit.

use crate::eval::{FileStats, RawMetrics, Structure, ToolMeta};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Scoring category of the composite
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Health,
    Quality,
    Architecture,
    Algorithms,
    Testing,
    Completeness,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Health,
        Category::Quality,
        Category::Architecture,
        Category::Algorithms,
        Category::Testing,
        Category::Completeness,
    ];

    /// Point budget of the category
    pub fn max_points(&self) -> u32 {
        match self {
            Category::Health => 35,
            Category::Quality => 20,
            Category::Architecture => 15,
            Category::Algorithms => 10,
            Category::Testing => 15,
            Category::Completeness => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::Health => "health",
            Category::Quality => "quality",
            Category::Architecture => "architecture",
            Category::Algorithms => "algorithms",
            Category::Testing => "testing",
            Category::Completeness => "completeness",
        }
    }

    /// Short column label
    pub fn label(&self) -> &'static str {
        match self {
            Category::Health => "Health",
            Category::Quality => "Quality",
            Category::Architecture => "Arch",
            Category::Algorithms => "Algo",
            Category::Testing => "Testing",
            Category::Completeness => "Complete",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Letter grade derived from a total score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Grade for a score on the 0-100 scale. Works on group means too.
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::A
        } else if score >= 80.0 {
            Grade::B
        } else if score >= 70.0 {
            Grade::C
        } else if score >= 60.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Composite quality score of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeScore {
    #[serde(rename = "aqs")]
    pub total: u32,
    pub grade: Grade,
    pub breakdown: BTreeMap<Category, u32>,
    /// Always written, ignored when read back
    #[serde(default = "max_points", skip_deserializing)]
    pub max_points: BTreeMap<Category, u32>,
}

fn max_points() -> BTreeMap<Category, u32> {
    Category::ALL.iter().map(|c| (*c, c.max_points())).collect()
}

impl CompositeScore {
    /// Build a score from category points, clamping each to its budget
    pub fn from_breakdown(breakdown: BTreeMap<Category, u32>) -> Self {
        let breakdown: BTreeMap<Category, u32> = breakdown
            .into_iter()
            .map(|(c, v)| (c, v.min(c.max_points())))
            .collect();
        let total = breakdown.values().sum::<u32>().min(100);
        Self {
            total,
            grade: Grade::from_score(total as f64),
            breakdown,
            max_points: max_points(),
        }
    }

    pub fn points(&self, category: Category) -> Option<u32> {
        self.breakdown.get(&category).copied()
    }

    /// Check an embedded score against the composite invariants.
    ///
    /// Returns a description of the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        for (category, points) in &self.breakdown {
            if *points > category.max_points() {
                return Err(format!(
                    "{} has {} points, max is {}",
                    category,
                    points,
                    category.max_points()
                ));
            }
        }
        let sum = self.breakdown.values().sum::<u32>().min(100);
        if sum != self.total {
            return Err(format!(
                "total {} does not match breakdown sum {}",
                self.total, sum
            ));
        }
        let expected = Grade::from_score(self.total as f64);
        if expected != self.grade {
            return Err(format!(
                "grade {} does not match total {} (expected {})",
                self.grade, self.total, expected
            ));
        }
        Ok(())
    }

    /// Readable category bar chart
    pub fn format_report(&self) -> String {
        const BAR_LEN: u32 = 20;

        let mut out = String::new();
        out.push_str(&format!(
            "Agent Quality Score: {}/100  (Grade: {})\n\n",
            self.total, self.grade
        ));
        for category in Category::ALL {
            let Some(points) = self.points(category) else {
                continue;
            };
            let max = category.max_points();
            let filled = ((points as f64 / max as f64) * BAR_LEN as f64).round() as u32;
            let filled = filled.min(BAR_LEN);
            out.push_str(&format!(
                "  {:<15} [{}{}] {:>2}/{}\n",
                category.name(),
                "#".repeat(filled as usize),
                ".".repeat((BAR_LEN - filled) as usize),
                points,
                max
            ));
        }
        out
    }
}

/// Penalty of `per_unit * count`, never negative and never above `cap`
fn capped(count: Option<f64>, per_unit: f64, cap: f64) -> f64 {
    match count {
        Some(n) if n > 0.0 => (n * per_unit).min(cap),
        _ => 0.0,
    }
}

/// Penalty for a value above `threshold`, one point per unit over
fn over(value: Option<f64>, threshold: f64, cap: f64) -> f64 {
    match value {
        Some(v) if v > threshold => (v - threshold).min(cap),
        _ => 0.0,
    }
}

/// Round once and clamp into the category budget
fn finish(category: Category, raw: f64) -> u32 {
    let max = category.max_points() as f64;
    raw.round().clamp(0.0, max) as u32
}

fn health(metrics: &RawMetrics) -> f64 {
    // Scale 0-100 onto the budget; `h * 0.35` would put 90 at 31.4999...
    let max = Category::Health.max_points() as f64;
    metrics.number("health").map_or(0.0, |h| h * max / 100.0)
}

fn quality(metrics: &RawMetrics) -> f64 {
    let mut score = Category::Quality.max_points() as f64;
    score -= capped(metrics.number("dead_symbols"), 2.0, 8.0);
    score -= over(metrics.number("avg_complexity"), 5.0, 6.0);
    score -= over(metrics.number("p90_complexity"), 15.0, 4.0);
    score -= capped(metrics.number("high_complexity_count"), 2.0, 5.0);
    score
}

fn architecture(metrics: &RawMetrics, file_stats: Option<&FileStats>) -> f64 {
    let mut score = Category::Architecture.max_points() as f64;
    score -= capped(metrics.number("tangle_ratio"), 10.0, 5.0);
    score -= capped(metrics.number("critical_issues"), 3.0, 10.0);
    if let Some(total_files) = file_stats.and_then(|s| s.total_files) {
        if total_files < 5 {
            score -= 3.0;
        }
    }
    score
}

fn algorithms(metrics: &RawMetrics) -> f64 {
    let mut score = Category::Algorithms.max_points() as f64;
    // Only scored when the analysis produced an antipattern summary
    if metrics.number("antipattern_total").is_some() {
        let weighted = [
            ("antipattern_high", 3.0),
            ("antipattern_medium", 2.0),
            ("antipattern_low", 1.0),
        ]
        .iter()
        .map(|(name, weight)| capped(metrics.number(name), *weight, f64::MAX))
        .sum::<f64>();
        score -= weighted.min(10.0);
    }
    score
}

fn testing(structure: Option<&Structure>) -> f64 {
    let Some(structure) = structure else {
        return 0.0;
    };
    let mut score = 0.0;
    if structure.tests_found() {
        score += 5.0;
    }
    let files = structure.test_file_count().unwrap_or(0) as f64;
    score += (files * 2.0).min(8.0);
    if files >= 3.0 {
        score += 2.0;
    }
    score
}

fn completeness(structure: Option<&Structure>, tool_meta: Option<&ToolMeta>) -> f64 {
    let mut score = 0.0;
    if let Some(structure) = structure {
        if structure.readme.unwrap_or(false) {
            score += 2.0;
        }
        if structure.has_build_config() {
            score += 2.0;
        }
    }
    if tool_meta.is_some_and(ToolMeta::init_succeeded) {
        score += 1.0;
    }
    score
}

/// Compute the composite score of one run. Pure and deterministic.
pub fn score(
    metrics: &RawMetrics,
    file_stats: Option<&FileStats>,
    structure: Option<&Structure>,
    tool_meta: Option<&ToolMeta>,
) -> CompositeScore {
    let raw = [
        (Category::Health, health(metrics)),
        (Category::Quality, quality(metrics)),
        (Category::Architecture, architecture(metrics, file_stats)),
        (Category::Algorithms, algorithms(metrics)),
        (Category::Testing, testing(structure)),
        (Category::Completeness, completeness(structure, tool_meta)),
    ];

    CompositeScore::from_breakdown(raw.into_iter().map(|(c, v)| (c, finish(c, v))).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::record::{BuildInfo, InitInfo, TestInfo};
    use crate::eval::MetricValue;

    fn clean_metrics() -> RawMetrics {
        [
            ("health", 90.0),
            ("avg_complexity", 5.0),
            ("dead_symbols", 0.0),
            ("p90_complexity", 10.0),
            ("high_complexity_count", 0.0),
            ("tangle_ratio", 0.0),
            ("critical_issues", 0.0),
            ("antipattern_total", 0.0),
        ]
        .into_iter()
        .map(|(k, v)| (k, MetricValue::Number(v)))
        .collect()
    }

    fn set(metrics: &mut RawMetrics, name: &str, value: f64) {
        metrics.0.insert(name.to_string(), Some(MetricValue::Number(value)));
    }

    fn full_structure(test_files: u64) -> Structure {
        Structure {
            readme: Some(true),
            tests: Some(TestInfo {
                tests_found: Some(true),
                test_file_count: Some(test_files),
            }),
            build: Some(BuildInfo {
                has_build_config: Some(true),
            }),
        }
    }

    fn files(n: u64) -> FileStats {
        FileStats {
            total_files: Some(n),
            ..Default::default()
        }
    }

    fn init_ok() -> ToolMeta {
        ToolMeta {
            init: Some(InitInfo {
                success: Some(true),
            }),
        }
    }

    fn score_clean(metrics: &RawMetrics) -> CompositeScore {
        score(metrics, Some(&files(12)), Some(&full_structure(4)), Some(&init_ok()))
    }

    #[test]
    fn test_clean_project_scores_97() {
        let result = score_clean(&clean_metrics());
        assert_eq!(result.points(Category::Health), Some(32));
        assert_eq!(result.points(Category::Quality), Some(20));
        assert_eq!(result.points(Category::Architecture), Some(15));
        assert_eq!(result.points(Category::Algorithms), Some(10));
        assert_eq!(result.points(Category::Testing), Some(15));
        assert_eq!(result.points(Category::Completeness), Some(5));
        assert_eq!(result.total, 97);
        assert_eq!(result.grade, Grade::A);
    }

    #[test]
    fn test_dead_code_and_complexity_penalties() {
        let mut metrics = clean_metrics();
        set(&mut metrics, "dead_symbols", 10.0);
        set(&mut metrics, "avg_complexity", 15.0);

        let result = score_clean(&metrics);
        assert_eq!(result.points(Category::Quality), Some(6));
        assert_eq!(result.total, 83);
        assert_eq!(result.grade, Grade::B);
    }

    #[test]
    fn test_dead_symbol_penalty_saturates() {
        let mut previous = u32::MAX;
        let mut at_five = None;
        for dead in 0..=12 {
            let mut metrics = clean_metrics();
            set(&mut metrics, "dead_symbols", dead as f64);
            let quality = score_clean(&metrics).points(Category::Quality).unwrap();
            assert!(quality <= previous);
            previous = quality;
            if dead == 5 {
                at_five = Some(quality);
            }
        }
        assert_eq!(at_five, Some(12));
        assert_eq!(previous, 12);
    }

    #[test]
    fn test_missing_health_scores_zero() {
        let mut metrics = clean_metrics();
        metrics.0.remove("health");
        let result = score_clean(&metrics);
        assert_eq!(result.points(Category::Health), Some(0));
        assert_eq!(result.total, 65);
    }

    #[test]
    fn test_empty_inputs_degrade_gracefully() {
        let result = score(&RawMetrics::default(), None, None, None);
        assert_eq!(result.points(Category::Health), Some(0));
        assert_eq!(result.points(Category::Quality), Some(20));
        assert_eq!(result.points(Category::Architecture), Some(15));
        assert_eq!(result.points(Category::Algorithms), Some(10));
        assert_eq!(result.points(Category::Testing), Some(0));
        assert_eq!(result.points(Category::Completeness), Some(0));
        assert_eq!(result.total, 45);
        assert_eq!(result.grade, Grade::F);
    }

    #[test]
    fn test_small_project_architecture_penalty() {
        let result = score(&clean_metrics(), Some(&files(3)), None, None);
        assert_eq!(result.points(Category::Architecture), Some(12));
    }

    #[test]
    fn test_architecture_penalties_capped() {
        let mut metrics = clean_metrics();
        set(&mut metrics, "tangle_ratio", 0.9);
        set(&mut metrics, "critical_issues", 7.0);
        let result = score(&metrics, Some(&files(2)), None, None);
        // 15 - 5 - 10 - 3 clamps at zero
        assert_eq!(result.points(Category::Architecture), Some(0));
    }

    #[test]
    fn test_antipatterns_only_scored_with_summary() {
        let mut metrics = clean_metrics();
        set(&mut metrics, "antipattern_high", 1.0);
        set(&mut metrics, "antipattern_medium", 2.0);
        set(&mut metrics, "antipattern_low", 1.0);
        assert_eq!(score_clean(&metrics).points(Category::Algorithms), Some(2));

        metrics.0.remove("antipattern_total");
        assert_eq!(score_clean(&metrics).points(Category::Algorithms), Some(10));

        set(&mut metrics, "antipattern_total", 9.0);
        set(&mut metrics, "antipattern_high", 9.0);
        assert_eq!(score_clean(&metrics).points(Category::Algorithms), Some(0));
    }

    #[test]
    fn test_testing_credit() {
        let one = score(&RawMetrics::default(), None, Some(&full_structure(1)), None);
        assert_eq!(one.points(Category::Testing), Some(7));

        let three = score(&RawMetrics::default(), None, Some(&full_structure(3)), None);
        assert_eq!(three.points(Category::Testing), Some(13));

        let many = score(&RawMetrics::default(), None, Some(&full_structure(40)), None);
        assert_eq!(many.points(Category::Testing), Some(15));
    }

    #[test]
    fn test_negative_counts_do_not_reward() {
        let mut metrics = clean_metrics();
        set(&mut metrics, "dead_symbols", -4.0);
        set(&mut metrics, "critical_issues", -2.0);
        let result = score_clean(&metrics);
        assert_eq!(result.points(Category::Quality), Some(20));
        assert_eq!(result.points(Category::Architecture), Some(15));
    }

    #[test]
    fn test_breakdown_invariants_hold() {
        let mut metrics = clean_metrics();
        set(&mut metrics, "health", 250.0);
        set(&mut metrics, "avg_complexity", 40.0);
        set(&mut metrics, "p90_complexity", 90.0);
        set(&mut metrics, "high_complexity_count", 12.0);
        let result = score_clean(&metrics);

        for category in Category::ALL {
            let points = result.points(category).unwrap();
            assert!(points <= category.max_points());
        }
        let sum: u32 = result.breakdown.values().sum();
        assert_eq!(result.total, sum.min(100));
        assert!(result.total <= 100);
        assert!(result.validate().is_ok());
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let metrics = clean_metrics();
        assert_eq!(score_clean(&metrics), score_clean(&metrics));
    }

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(Grade::from_score(100.0), Grade::A);
        assert_eq!(Grade::from_score(90.0), Grade::A);
        assert_eq!(Grade::from_score(89.0), Grade::B);
        assert_eq!(Grade::from_score(80.0), Grade::B);
        assert_eq!(Grade::from_score(79.0), Grade::C);
        assert_eq!(Grade::from_score(70.0), Grade::C);
        assert_eq!(Grade::from_score(69.0), Grade::D);
        assert_eq!(Grade::from_score(60.0), Grade::D);
        assert_eq!(Grade::from_score(59.0), Grade::F);
        assert_eq!(Grade::from_score(0.0), Grade::F);
    }

    #[test]
    fn test_validate_rejects_inconsistent_cache() {
        let json = r#"{"aqs": 90, "grade": "A", "breakdown": {"health": 35, "quality": 20}}"#;
        let embedded: CompositeScore = serde_json::from_str(json).unwrap();
        assert!(embedded.validate().is_err());

        let json = r#"{"aqs": 55, "grade": "A", "breakdown": {"health": 35, "quality": 20}}"#;
        let embedded: CompositeScore = serde_json::from_str(json).unwrap();
        assert!(embedded.validate().unwrap_err().contains("grade"));
    }

    #[test]
    fn test_format_report_bars() {
        let report = score_clean(&clean_metrics()).format_report();
        assert!(report.starts_with("Agent Quality Score: 97/100  (Grade: A)"));
        assert!(report.contains("quality         [####################] 20/20"));
        assert!(report.contains("completeness"));
    }
}
