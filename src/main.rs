// src/main.rs

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, OutputType};
use indicatif::ProgressBar;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vcs_churn::{analyzer, measures, output, report};
use vcs_churn::{BugClassifier, Changeset, ChangesetProcessor, WorkItem};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let start_time = Instant::now();

    let bugs = BugClassifier::new(args.bug_regexes.as_deref()).context("Invalid bug regexes")?;
    let work_items = match &args.work_items {
        Some(path) => vcs_churn::group_work_items(read_json::<Vec<WorkItem>>(path)?),
        None => Default::default(),
    };

    let changesets = match (&args.repo, &args.changesets) {
        (Some(repo), _) => analyzer::read_history(repo)
            .with_context(|| format!("Failed to read history of {}", repo.display()))?,
        (None, Some(path)) => read_json::<Vec<Changeset>>(path)?,
        (None, None) => anyhow::bail!("either --repo or --changesets is required"),
    };

    let mut processor = ChangesetProcessor::new(bugs, work_items);
    let bar = ProgressBar::new(changesets.len() as u64);
    bar.set_message("Processing changesets");
    for changeset in &changesets {
        processor.process_changeset(changeset);
        bar.inc(1);
    }
    bar.finish_with_message("Processing complete");

    info!(
        "Processed {} changesets in {:.2?}: {} days, {} with bugs, {} renames tracked.",
        changesets.len(),
        start_time.elapsed(),
        processor.output().len(),
        processor.changesets_with_bugs(),
        processor.renames().len()
    );

    let writer = output::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    match args.output_type {
        OutputType::Daily => output::write_daily_churn(writer, processor.output()),
        OutputType::Measures => {
            let measures = report::generate_measures(processor.output(), measures::REGISTRY);
            output::write_measures(writer, &measures)
        }
    }
    .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!("Total time: {:.2?}", start_time.elapsed());
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file)).with_context(|| format!("Failed to parse {}", path.display()))
}
