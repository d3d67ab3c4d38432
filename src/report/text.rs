//! Fixed-width text rendering of a report

use super::columns::{signed, DisplayValue, SCORE_COLUMNS};
use super::{Report, TaskMetrics};

const RULE_WIDTH: usize = 80;

fn banner(out: &mut String, title: &str) {
    out.push_str(&format!("\n{}\n", "=".repeat(RULE_WIDTH)));
    out.push_str(&format!("  {}\n", title));
    out.push_str(&format!("{}\n", "=".repeat(RULE_WIDTH)));
}

fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| "N/A".to_string())
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn signatures(out: &mut String, report: &Report) {
    if report.signatures.is_empty() {
        return;
    }
    banner(out, "AGENT SIGNATURES");
    out.push_str(&format!("{:<20} {:<25} {:<30}\n", "Agent", "CLI Version", "Model"));
    out.push_str(&format!("{}\n", "-".repeat(RULE_WIDTH)));
    for sig in &report.signatures {
        out.push_str(&format!(
            "{:<20} {:<25} {:<30}\n",
            sig.combo,
            or_na(sig.cli_version.clone()),
            or_na(sig.model.clone())
        ));
    }
    if let Some(version) = &report.evaluator_version {
        out.push_str(&format!("\nEvaluator: roam-code {}\n", version));
    }
}

fn task_table(out: &mut String, task: &TaskMetrics) {
    banner(out, &format!("TASK: {}", task.task));

    let mut header = format!("{:<14} {:<10}", "Agent", "Mode");
    for column in &SCORE_COLUMNS {
        header.push_str(&format!(" {:>8}", column.label));
    }
    out.push_str(&format!("{}\n", header));
    out.push_str(&format!("{}\n", "-".repeat(header.chars().count())));

    for row in &task.rows {
        let mut line = format!("{:<14} {:<10}", row.combo, row.mode);
        for (column, value) in SCORE_COLUMNS.iter().zip(&row.values) {
            let text = match column.display(value.as_ref()) {
                DisplayValue::Missing => "N/A".to_string(),
                DisplayValue::Pass => "PASS".to_string(),
                DisplayValue::Fail => "FAIL".to_string(),
                DisplayValue::Text(text) => truncate(&text, 8),
            };
            line.push_str(&format!(" {:>8}", text));
        }
        out.push_str(&format!("{}\n", line));
    }
}

fn overview(out: &mut String, report: &Report) {
    if report.overview_combos.is_empty() {
        return;
    }
    banner(out, "AGENT QUALITY SCORE");

    let mut header = format!("{:<20}", "Task");
    for combo in &report.overview_combos {
        header.push_str(&format!(" {:>12}", truncate(combo, 12)));
    }
    out.push_str(&format!("{}\n", header));
    out.push_str(&format!("{}\n", "-".repeat(header.chars().count())));

    for row in &report.overview {
        let mut line = format!("{:<20}", truncate(report.catalog.task_name(&row.task), 20));
        for cell in &row.cells {
            let text = match cell {
                Some(cell) => format!("{} ({})", cell.total, cell.grade),
                None => "--".to_string(),
            };
            line.push_str(&format!(" {:>12}", text));
        }
        out.push_str(&format!("{}\n", line));
    }

    let mut line = format!("{:<20}", "Average");
    for average in &report.overview_averages {
        let text = match average {
            Some(avg) => format!("{:.0} ({})", avg.mean, avg.grade),
            None => "no data".to_string(),
        };
        line.push_str(&format!(" {:>12}", text));
    }
    out.push_str(&format!("{}\n", line));
}

fn rankings(out: &mut String, report: &Report) {
    if report.rankings.is_empty() {
        return;
    }
    banner(
        out,
        &format!("AGENT RANKINGS ({} mode)", report.catalog.baseline_mode),
    );
    for ranking in &report.rankings {
        out.push_str(&format!(
            "  #{} {:<20} {:>5.1} ({}) over {} task(s)\n",
            ranking.rank,
            report.catalog.combo_name(&ranking.combo),
            ranking.mean_total,
            ranking.grade,
            ranking.tasks
        ));
    }
}

fn group_summary(out: &mut String, report: &Report) {
    if report.group_summary.is_empty() {
        return;
    }
    banner(out, "SUMMARY BY GROUP");
    out.push_str(&format!("{:<14} {:<20} {:>7} {:>10} {:>6}\n", "Group", "Agent", "Tasks", "Avg AQS", "Grade"));
    out.push_str(&format!("{}\n", "-".repeat(61)));
    let all_agents = report.group_totals.iter().map(|g| (g, "(all agents)"));
    let per_agent = report.group_summary.iter().map(|g| {
        (g, g.group.get(1).map(String::as_str).unwrap_or_default())
    });
    for (group, agent) in per_agent.chain(all_agents) {
        let (avg, grade) = match (group.mean, group.grade()) {
            (Some(mean), Some(grade)) => (format!("{:.1}", mean), grade.to_string()),
            _ => ("no data".to_string(), "--".to_string()),
        };
        out.push_str(&format!(
            "{:<14} {:<20} {:>7} {:>10} {:>6}\n",
            group.group.first().map(String::as_str).unwrap_or_default(),
            agent,
            group.contributing,
            avg,
            grade
        ));
    }
}

fn mode_summaries(out: &mut String, report: &Report) {
    banner(out, "AGENT SUMMARIES");
    let mut current: Option<&str> = None;
    for summary in &report.mode_summaries {
        if current != Some(summary.combo.as_str()) {
            out.push_str(&format!("\n--- {} ---\n", summary.combo));
            current = Some(summary.combo.as_str());
        }
        out.push_str(&format!(
            "  {:<10}  avg_health={:>5}  dead={:>3}  avg_cx={:>5}  cycles={:>2}  gates={}/{}\n",
            summary.mode,
            or_na(summary.avg_health.map(|h| format!("{:.1}", h))),
            or_na(summary.dead_total.map(|d| format!("{}", d))),
            or_na(summary.avg_complexity.map(|c| format!("{:.1}", c))),
            or_na(summary.cycles_total.map(|c| format!("{}", c))),
            summary.gate_passes,
            summary.tasks
        ));
    }
}

fn mode_impact(out: &mut String, report: &Report) {
    banner(
        out,
        &format!(
            "MODE IMPACT -- {} delta (mode - {})",
            report.delta_metric, report.catalog.baseline_mode
        ),
    );

    if report.mode_deltas.is_empty() {
        out.push_str("No tasks were run in both the baseline and another mode.\n");
        return;
    }

    let mut header = format!("{:<14} {:<10}", "Agent", "Mode");
    for task in &report.catalog.tasks {
        header.push_str(&format!(" {:>12}", truncate(task, 10)));
    }
    header.push_str(&format!(" {:>8}", "AVG"));
    out.push_str(&format!("{}\n", header));
    out.push_str(&format!("{}\n", "-".repeat(header.chars().count())));

    for row in &report.mode_deltas {
        let mut line = format!("{:<14} {:<10}", row.combo, row.mode);
        for (_, delta) in &row.deltas {
            let text = delta.map_or_else(|| "N/A".to_string(), |d| signed(d, 0));
            line.push_str(&format!(" {:>12}", text));
        }
        let avg = row.mean.map_or_else(|| "N/A".to_string(), |m| signed(m, 1));
        line.push_str(&format!(" {:>8}", avg));
        out.push_str(&format!("{}\n", line));
    }
}

/// Render the full text report
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Loaded {} evaluations ({} file(s) skipped).\n",
        report.evaluations, report.skipped_files
    ));

    signatures(&mut out, report);
    for task in &report.task_metrics {
        if !task.rows.is_empty() {
            task_table(&mut out, task);
        }
    }
    overview(&mut out, report);
    rankings(&mut out, report);
    group_summary(&mut out, report);
    mode_summaries(&mut out, report);
    mode_impact(&mut out, report);

    out
}
