//! Raw metric columns and how their values are displayed

use crate::eval::MetricValue;
use crate::scoring::{Category, Grade};

/// Numeric display format of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    /// Whole numbers; fractional values keep their fraction
    Integer,
    OneDecimal,
    TwoDecimals,
}

impl NumberFormat {
    pub fn format(&self, value: f64) -> String {
        match self {
            NumberFormat::Integer => format!("{}", value),
            NumberFormat::OneDecimal => format!("{:.1}", value),
            NumberFormat::TwoDecimals => format!("{:.2}", value),
        }
    }
}

/// Display hint only; never used for scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

impl Direction {
    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::HigherIsBetter => "\u{2191}",
            Direction::LowerIsBetter => "\u{2193}",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MetricColumn {
    pub field: &'static str,
    pub label: &'static str,
    pub format: NumberFormat,
    pub direction: Direction,
}

const fn column(
    field: &'static str,
    label: &'static str,
    format: NumberFormat,
    direction: Direction,
) -> MetricColumn {
    MetricColumn {
        field,
        label,
        format,
        direction,
    }
}

/// Raw metric columns of the per-task tables, in display order
pub const SCORE_COLUMNS: [MetricColumn; 9] = [
    column("health", "Health", NumberFormat::Integer, Direction::HigherIsBetter),
    column("dead_symbols", "Dead", NumberFormat::Integer, Direction::LowerIsBetter),
    column("avg_complexity", "AvgCx", NumberFormat::OneDecimal, Direction::LowerIsBetter),
    column("p90_complexity", "P90Cx", NumberFormat::OneDecimal, Direction::LowerIsBetter),
    column("high_complexity_count", "HiCx", NumberFormat::Integer, Direction::LowerIsBetter),
    column("tangle_ratio", "Tangle", NumberFormat::TwoDecimals, Direction::LowerIsBetter),
    column("hidden_coupling", "HidCoup", NumberFormat::Integer, Direction::LowerIsBetter),
    column("critical_issues", "Crit", NumberFormat::Integer, Direction::LowerIsBetter),
    column("warning_issues", "Warn", NumberFormat::Integer, Direction::LowerIsBetter),
];

/// A metric value ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayValue {
    Missing,
    Pass,
    Fail,
    Text(String),
}

impl MetricColumn {
    pub fn display(&self, value: Option<&MetricValue>) -> DisplayValue {
        match value {
            None => DisplayValue::Missing,
            Some(MetricValue::Bool(true)) => DisplayValue::Pass,
            Some(MetricValue::Bool(false)) => DisplayValue::Fail,
            Some(MetricValue::Number(n)) => DisplayValue::Text(self.format.format(*n)),
            Some(MetricValue::Text(s)) => DisplayValue::Text(s.clone()),
        }
    }
}

/// CSS class of a grade badge
pub fn grade_class(grade: Grade) -> &'static str {
    match grade {
        Grade::A => "grade-a",
        Grade::B => "grade-b",
        Grade::C => "grade-c",
        Grade::D => "grade-d",
        Grade::F => "grade-f",
    }
}

/// CSS class of a category bar
pub fn bar_class(category: Category) -> &'static str {
    match category {
        Category::Health => "bar-health",
        Category::Quality => "bar-quality",
        Category::Architecture => "bar-arch",
        Category::Algorithms => "bar-algo",
        Category::Testing => "bar-testing",
        Category::Completeness => "bar-complete",
    }
}

/// Signed delta, whole numbers without a fraction
pub fn signed(value: f64, decimals: usize) -> String {
    let sign = if value > 0.0 { "+" } else { "" };
    if decimals == 0 && value.fract() == 0.0 {
        format!("{}{}", sign, value)
    } else {
        format!("{}{:.*}", sign, decimals.max(1), value)
    }
}
