mod cli;
mod eval;
mod report;
mod scoring;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Args, Command, CompareConfig};
use eval::{Catalog, ResultIndex};
use report::Report;
use std::path::Path;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging; stdout is reserved for the report
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Compare(compare_args) => compare(compare_args),
        Command::Score(score_args) => score_file(score_args),
        Command::Init(init_args) => generate_sample_config(init_args),
    }
}

fn compare(args: cli::CompareArgs) -> Result<()> {
    let config = CompareConfig::load_or_default(args.config.as_deref())?;

    let loaded = eval::load_records(&args.results_dir)
        .with_context(|| format!("Cannot load results from {:?}", args.results_dir))?;
    let skipped = loaded.skipped.len();

    let mut records = loaded.records;
    if let Some(group) = &args.group {
        records.retain(|r| r.group_or(&config.default_group) == group.as_str());
        info!("Restricted to group '{}': {} records", group, records.len());
    }

    if records.is_empty() {
        bail!("No result files found in {:?}", args.results_dir);
    }

    info!(
        "Loaded {} result files ({} skipped)",
        records.len(),
        skipped
    );

    let index = ResultIndex::build(&records, args.score_source, &config.default_group);
    let catalog = Catalog::discover(&index, &config);
    let report = Report::build(&index, &catalog, &config, skipped);

    print!("{}", report::render_text(&report));

    if let Some(path) = &args.report {
        write_html(&report, path)?;
    }

    if args.emit_site {
        write_html(&report, &config.site_path)?;
    }

    if let Some(path) = &args.json {
        create_parent(path)?;
        report
            .save_json(path)
            .with_context(|| format!("Failed to write JSON report: {:?}", path))?;
        info!("JSON report saved to: {:?}", path);
    }

    Ok(())
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    Ok(())
}

fn write_html(report: &Report, path: &Path) -> Result<()> {
    let html = report::render_html(report).context("Failed to render HTML report")?;
    create_parent(path)?;
    std::fs::write(path, html)
        .with_context(|| format!("Failed to write HTML report: {:?}", path))?;
    info!("HTML report saved to: {:?}", path);
    Ok(())
}

fn score_file(args: cli::ScoreArgs) -> Result<()> {
    let record = eval::load_record(&args.file)
        .with_context(|| format!("Cannot score {:?}", args.file))?;

    if record.embedded_composite().is_some() {
        warn!("{:?} already embeds a score; recomputing from raw metrics", args.file);
    }

    let composite = scoring::score_record(&record);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&composite)?);
    } else {
        println!(
            "{} / {} / {}\n",
            record.combo(),
            record.mode(),
            record.task()
        );
        print!("{}", composite.format_report());
    }

    Ok(())
}

fn generate_sample_config(args: cli::InitArgs) -> Result<()> {
    let config = CompareConfig::sample();

    config.save(&args.output)?;
    println!("Generated sample config at: {:?}", args.output);

    Ok(())
}
