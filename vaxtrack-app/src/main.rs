use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use vaxtrack_common::observability::{LogConfig, init_logging};
use vaxtrack_config::{VaxtrackConfig, VaxtrackConfigLoader};
use vaxtrack_store::{CsvStore, RecordStore, WriteOutcome};

use cli::{Cli, DEFAULT_CONFIG_FILE};
use pipeline::{build_sources, reference_date, run};

mod cli;
mod pipeline;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins), then CLI overrides
    let loader = match &cli.config {
        Some(path) => VaxtrackConfigLoader::new().with_file(path),
        None => VaxtrackConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    let mut cfg: VaxtrackConfig = loader.load().context("loading configuration")?;
    if let Some(dir) = &cli.output_dir {
        cfg.output.dir = dir.clone();
    }

    let log_path = init_logging(LogConfig {
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.stderr || cli.verbose,
        format: cfg.logging.format,
        default_filter: cfg.logging.filter.clone(),
        ..LogConfig::default()
    })?;

    let date = reference_date(cli.date, cfg.timezone, Utc::now())?;
    tracing::info!(
        %date,
        timezone = %cfg.timezone,
        output_dir = %cfg.output.dir.display(),
        dry_run = cli.dry_run,
        log_path = %log_path.display(),
        "vaxtrack.start"
    );

    let sources = build_sources(&cfg, cli.source.as_deref())?;
    let store = CsvStore::new(&cfg.output.dir);
    let sink = (!cli.dry_run).then_some(&store as &dyn RecordStore);

    let runs = run(&sources, date, sink).await.inspect_err(|e| {
        tracing::error!(error = %format!("{e:#}"), %date, "vaxtrack.failed");
    })?;

    for r in &runs {
        match r.outcome {
            None => println!("{}", serde_json::to_string_pretty(&r.record)?),
            Some(WriteOutcome::Stale { stored_max }) => println!(
                "{}: skipped {} ({} doses is below stored {})",
                r.source_id, r.record.date, r.record.total_vaccinations, stored_max
            ),
            Some(outcome) => println!(
                "{}: {:?} {} in {}",
                r.source_id,
                outcome,
                r.record.date,
                store.path_for(&r.record.location).display()
            ),
        }
    }
    tracing::info!(sources = runs.len(), %date, "vaxtrack.done");
    Ok(())
}
