//! batchren: preview and apply batch renames from the command line.
//!
//! The rule comes from the subcommand (or the settings file for `run`).
//! The batch is previewed with highlighted groups; `--apply` performs the
//! renames once the batch checks out clean.

mod cli;
mod render;

use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use batchren_core::{
    collect_entries, CoreError, EntryChange, PreviewSession, Processor, RenameProcessor, Settings,
    ShellRunner, XattrSource,
};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{BatchArgs, Cli};
use crate::render::Report;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr so the report on stdout stays parseable.
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("BATCHREN_LOG")
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config_path = cli.config.clone().unwrap_or_else(Settings::default_path);
    let mut settings = load_settings(&config_path)?;
    if let Some(rule) = cli.command.rule_config() {
        settings.rule = rule;
    }
    let batch = cli.command.batch();
    batch.apply_to(&mut settings.general);

    if batch.save {
        settings
            .save(&config_path)
            .with_context(|| format!("saving settings to {}", config_path.display()))?;
        tracing::info!("settings saved to {}", config_path.display());
    }

    run(&settings, batch).await
}

/// Loads the settings file; a missing file means defaults.
fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    match Settings::load(path) {
        Ok(settings) => Ok(settings),
        Err(CoreError::NotFound(_)) => {
            tracing::debug!("no settings at {}, using defaults", path.display());
            Ok(Settings::default())
        }
        Err(e) => Err(e).with_context(|| format!("loading settings from {}", path.display())),
    }
}

async fn run(settings: &Settings, batch: &BatchArgs) -> anyhow::Result<ExitCode> {
    let general = &settings.general;
    let entries = collect_entries(&batch.paths, general.recursive, general.file_type)
        .context("collecting entries")?;
    let changes: Vec<EntryChange> = entries.into_iter().map(EntryChange::Added).collect();

    let mut session = PreviewSession::new(general.replacement_mode, general.name_policy);
    session.apply_changes(&changes);

    let rule = settings.rule.build();
    let processor = Processor::new(
        Arc::new(XattrSource),
        ShellRunner::new(settings.processor.shell.clone()),
    );
    let (worker, mut replies) = RenameProcessor::spawn(processor);

    if let Some(request) = session.evaluate(&rule) {
        worker.submit(request)?;
        while let Some(reply) = replies.recv().await {
            if session.apply_reply(reply) {
                break;
            }
        }
    }
    drop(worker);

    if batch.hide_unchanged {
        session.remove_unchanged();
    }

    let mut report = Report::from_session(&session);
    if batch.apply && report.ready {
        report.summary = Some(session.rename_all());
    } else if batch.apply {
        tracing::warn!("batch has errors or nothing to rename; no entries renamed");
    }

    let color = io::stdout().is_terminal();
    let mut stdout = io::stdout().lock();
    if batch.json {
        serde_json::to_writer_pretty(&mut stdout, &report)?;
        writeln!(stdout)?;
    } else {
        report.write_text(&mut stdout, color)?;
    }

    let failed = report
        .summary
        .as_ref()
        .is_some_and(|summary| !summary.failed.is_empty());
    if report.errors > 0 || failed {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
