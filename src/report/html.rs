//! Self-contained HTML rendering of a report
//!
//! Tables are built as typed rows and rendered through askama templates,
//! which escape every piece of text.

use super::columns::{bar_class, grade_class, signed, DisplayValue, SCORE_COLUMNS};
use super::Report;
use crate::eval::aggregate::GroupMean;
use crate::scoring::{Category, Grade};
use askama::Template;

/// Width of a full category bar in pixels
const BAR_MAX_PX: u32 = 60;

struct Bar {
    class: &'static str,
    width: u32,
}

struct Cell {
    text: String,
    class: &'static str,
    badge: Option<&'static str>,
    strong: bool,
    bar: Option<Bar>,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            class: "",
            badge: None,
            strong: false,
            bar: None,
        }
    }

    fn with_class(mut self, class: &'static str) -> Self {
        self.class = class;
        self
    }

    fn strong(mut self) -> Self {
        self.strong = true;
        self
    }

    fn muted() -> Self {
        Self::plain("--").with_class("muted")
    }

    fn grade(grade: Grade, score: impl std::fmt::Display) -> Self {
        Self {
            badge: Some(grade_class(grade)),
            ..Self::plain(format!("{} ({})", score, grade)).with_class("c")
        }
    }

    fn delta(value: f64, decimals: usize) -> Self {
        let class = if value > 0.0 {
            "c pos"
        } else if value < 0.0 {
            "c neg"
        } else {
            "c"
        };
        Self::plain(signed(value, decimals)).with_class(class)
    }
}

struct Head {
    text: String,
    class: &'static str,
}

fn head(text: impl Into<String>, class: &'static str) -> Head {
    Head {
        text: text.into(),
        class,
    }
}

struct Row {
    class: &'static str,
    cells: Vec<Cell>,
}

impl Row {
    fn new(cells: Vec<Cell>) -> Self {
        Self { class: "", cells }
    }
}

#[derive(Template)]
#[template(path = "table.html")]
struct Table {
    head: Vec<Head>,
    rows: Vec<Row>,
}

struct Section {
    heading: String,
    table: Table,
}

#[derive(Template)]
#[template(path = "report.html")]
struct ReportPage<'a> {
    title: &'a str,
    meta: String,
    generated_at: String,
    baseline_mode: &'a str,
    overview: Table,
    breakdowns: Vec<Section>,
    averages: Table,
    groups: Table,
    signatures: Option<Table>,
    evaluator_version: Option<&'a str>,
    metrics: Vec<Section>,
    delta_metric: &'a str,
    deltas: Option<Table>,
}

fn overview_table(report: &Report) -> Table {
    let mut head_cells = vec![head("Task", "")];
    head_cells.extend(
        report
            .overview_combos
            .iter()
            .map(|c| head(report.catalog.combo_name(c), "c")),
    );

    let mut rows: Vec<Row> = report
        .overview
        .iter()
        .map(|row| {
            let mut cells = vec![Cell::plain(report.catalog.task_name(&row.task)).strong()];
            cells.extend(row.cells.iter().map(|cell| match cell {
                Some(cell) => Cell::grade(cell.grade, cell.total),
                None => Cell::muted(),
            }));
            Row::new(cells)
        })
        .collect();

    let mut cells = vec![Cell::plain("Average").strong()];
    cells.extend(report.overview_averages.iter().map(|avg| match avg {
        Some(avg) => Cell::grade(avg.grade, format!("{:.0}", avg.mean)),
        None => Cell::muted(),
    }));
    rows.push(Row {
        class: "summary",
        cells,
    });

    Table {
        head: head_cells,
        rows,
    }
}

fn category_cell(category: Category, points: Option<u32>) -> Cell {
    match points {
        Some(points) => {
            let ratio = points as f64 / category.max_points() as f64;
            Cell {
                bar: Some(Bar {
                    class: bar_class(category),
                    width: (ratio * BAR_MAX_PX as f64).round() as u32,
                }),
                ..Cell::plain(points.to_string()).with_class("r")
            }
        }
        None => Cell::muted(),
    }
}

fn breakdown_sections(report: &Report) -> Vec<Section> {
    report
        .breakdowns
        .iter()
        .map(|breakdown| {
            let mut head_cells = vec![head("Agent", ""), head("AQS", "c")];
            head_cells.extend(
                Category::ALL
                    .iter()
                    .map(|c| head(format!("{} /{}", c.label(), c.max_points()), "r")),
            );

            let rows = breakdown
                .rows
                .iter()
                .map(|row| {
                    let mut cells = vec![
                        Cell::plain(report.catalog.combo_name(&row.combo)),
                        Cell::grade(row.score.grade, row.score.total),
                    ];
                    cells.extend(
                        Category::ALL
                            .iter()
                            .map(|c| category_cell(*c, row.score.points(*c))),
                    );
                    Row::new(cells)
                })
                .collect();

            Section {
                heading: report.catalog.task_name(&breakdown.task).to_string(),
                table: Table {
                    head: head_cells,
                    rows,
                },
            }
        })
        .collect()
}

fn averages_table(report: &Report) -> Table {
    let mut head_cells = vec![head("Rank", "c"), head("Agent", ""), head("Avg AQS", "c")];
    head_cells.extend(
        Category::ALL
            .iter()
            .map(|c| head(format!("Avg {}", c.label()), "r")),
    );

    let rows = report
        .rankings
        .iter()
        .map(|ranking| {
            let mut cells = vec![
                Cell::plain(format!("#{}", ranking.rank)).with_class("c"),
                Cell::plain(report.catalog.combo_name(&ranking.combo)),
                Cell::grade(ranking.grade, format!("{:.0}", ranking.mean_total)),
            ];
            cells.extend(Category::ALL.iter().map(|c| {
                match ranking.category_means.get(c) {
                    Some(mean) => {
                        Cell::plain(format!("{:.1}/{}", mean, c.max_points())).with_class("r")
                    }
                    None => Cell::muted(),
                }
            }));
            Row::new(cells)
        })
        .collect();

    Table {
        head: head_cells,
        rows,
    }
}

fn groups_table(report: &Report) -> Table {
    let row = |group: &GroupMean, agent: String| {
        let score = match (group.mean, group.grade()) {
            (Some(mean), Some(grade)) => Cell::grade(grade, format!("{:.1}", mean)),
            _ => Cell::plain("no data").with_class("muted"),
        };
        Row::new(vec![
            Cell::plain(group.group.first().cloned().unwrap_or_default()),
            Cell::plain(agent),
            Cell::plain(group.contributing.to_string()).with_class("r"),
            score,
        ])
    };

    let mut rows: Vec<Row> = report
        .group_summary
        .iter()
        .map(|group| {
            let combo = group.group.get(1).map(String::as_str).unwrap_or_default();
            row(group, report.catalog.combo_name(combo).to_string())
        })
        .collect();
    rows.extend(report.group_totals.iter().map(|group| Row {
        class: "summary",
        ..row(group, "All agents".to_string())
    }));

    Table {
        head: vec![
            head("Group", ""),
            head("Agent", ""),
            head("Tasks", "r"),
            head("Avg AQS", "c"),
        ],
        rows,
    }
}

fn signatures_table(report: &Report) -> Option<Table> {
    if report.signatures.is_empty() {
        return None;
    }
    let na = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/A".to_string());
    Some(Table {
        head: vec![head("Agent", ""), head("CLI Version", ""), head("Model", "")],
        rows: report
            .signatures
            .iter()
            .map(|sig| {
                Row::new(vec![
                    Cell::plain(report.catalog.combo_name(&sig.combo)),
                    Cell::plain(na(&sig.cli_version)),
                    Cell::plain(na(&sig.model)),
                ])
            })
            .collect(),
    })
}

fn metric_sections(report: &Report) -> Vec<Section> {
    report
        .task_metrics
        .iter()
        .filter(|task| !task.rows.is_empty())
        .map(|task| {
            let mut head_cells = vec![head("Agent", ""), head("Mode", "")];
            head_cells.extend(
                SCORE_COLUMNS
                    .iter()
                    .map(|c| head(format!("{} {}", c.label, c.direction.arrow()), "r")),
            );

            let rows = task
                .rows
                .iter()
                .map(|row| {
                    let mut cells = vec![
                        Cell::plain(report.catalog.combo_name(&row.combo)),
                        Cell::plain(row.mode.clone()),
                    ];
                    cells.extend(SCORE_COLUMNS.iter().zip(&row.values).map(|(column, value)| {
                        match column.display(value.as_ref()) {
                            DisplayValue::Missing => Cell::muted(),
                            DisplayValue::Pass => Cell {
                                badge: Some("badge-pass"),
                                ..Cell::plain("PASS").with_class("c")
                            },
                            DisplayValue::Fail => Cell {
                                badge: Some("badge-fail"),
                                ..Cell::plain("FAIL").with_class("c")
                            },
                            DisplayValue::Text(text) => Cell::plain(text).with_class("r"),
                        }
                    }));
                    Row::new(cells)
                })
                .collect();

            Section {
                heading: report.catalog.task_name(&task.task).to_string(),
                table: Table {
                    head: head_cells,
                    rows,
                },
            }
        })
        .collect()
}

fn deltas_table(report: &Report) -> Option<Table> {
    if report.mode_deltas.is_empty() {
        return None;
    }

    let mut head_cells = vec![head("Agent", ""), head("Mode", "")];
    head_cells.extend(report.catalog.tasks.iter().map(|t| {
        let name: String = report.catalog.task_name(t).chars().take(12).collect();
        head(name, "c")
    }));
    head_cells.push(head("AVG", "c"));

    let rows = report
        .mode_deltas
        .iter()
        .map(|row| {
            let mut cells = vec![
                Cell::plain(report.catalog.combo_name(&row.combo)),
                Cell::plain(row.mode.clone()),
            ];
            cells.extend(row.deltas.iter().map(|(_, delta)| match delta {
                Some(d) => Cell::delta(*d, 0),
                None => Cell::muted(),
            }));
            cells.push(match row.mean {
                Some(mean) => Cell::delta(mean, 1).strong(),
                None => Cell::muted(),
            });
            Row::new(cells)
        })
        .collect();

    Some(Table {
        head: head_cells,
        rows,
    })
}

/// Render the report as a standalone HTML document
pub fn render_html(report: &Report) -> Result<String, askama::Error> {
    let meta = format!(
        "{} tasks \u{b7} {} agents \u{b7} {} evaluations",
        report.catalog.tasks.len(),
        report.overview_combos.len(),
        report.evaluations
    );

    let page = ReportPage {
        title: &report.title,
        meta,
        generated_at: report.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        baseline_mode: &report.catalog.baseline_mode,
        overview: overview_table(report),
        breakdowns: breakdown_sections(report),
        averages: averages_table(report),
        groups: groups_table(report),
        signatures: signatures_table(report),
        evaluator_version: report.evaluator_version.as_deref(),
        metrics: metric_sections(report),
        delta_metric: &report.delta_metric,
        deltas: deltas_table(report),
    };

    page.render()
}
