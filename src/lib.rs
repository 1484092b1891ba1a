//! dupesweep - duplicate file finder with ZIP member scanning.
//!
//! Files (and, optionally, the members of ZIP archives) are fingerprinted
//! with SHA-256 and grouped by fingerprint. Groups can then be remediated by
//! deleting, trashing, relocating or hard-linking the selected copies.
//!
//! The library entry points are [`orchestrator::Orchestrator`] for scans and
//! remediation and [`actions::selection`] for building selections; the
//! binary is a thin wrapper around [`run_app`].

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::actions::{selection, ArchiveTool, RemediationStrategy, Remediator};
use crate::cli::{CleanArgs, Cli, Commands, OutputFormat, ScanArgs, SelectMode};
use crate::config::Config;
use crate::duplicates::ScanSummary;
use crate::error::ExitCode;
use crate::orchestrator::Orchestrator;
use crate::output::{CsvOutput, JsonOutput, TextOutput};
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::LogicalPath;
use crate::signal::ShutdownHandler;

/// Run the parsed command line and return the process exit code.
///
/// # Errors
///
/// Returns an error for invalid configuration, a scan that could not run
/// (missing root, Ctrl+C) or a failure to write the output.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = load_config(cli.config.as_deref())?;
    let handler = signal::install_handler();
    let ctx = RunContext {
        config,
        handler,
        quiet: cli.quiet,
        color: !cli.no_color && io::stdout().is_terminal(),
    };

    match cli.command {
        Commands::Scan(args) => run_scan(&ctx, &args),
        Commands::Clean(args) => run_clean(&ctx, &args),
    }
}

struct RunContext {
    config: Config,
    handler: ShutdownHandler,
    quiet: bool,
    color: bool,
}

impl RunContext {
    fn progress(&self) -> Option<Arc<dyn ProgressCallback>> {
        (!self.quiet).then(|| Arc::new(Progress::new(false)) as Arc<dyn ProgressCallback>)
    }
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let loaded = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            Config::load_from(Some(path))
        }
        None => Config::load(),
    };
    loaded.context("Invalid configuration")
}

/// Scan on a background task and publish the result.
fn scan(
    ctx: &RunContext,
    args: &ScanArgs,
    remediator: Remediator,
) -> Result<(Orchestrator, ScanSummary)> {
    let filter = args.filter(ctx.config.scan_filter());
    log::debug!("Scan filter: {:?}", filter);

    let mut orchestrator = Orchestrator::new(filter)
        .with_remediator(remediator)
        .with_shutdown_flag(ctx.handler.get_flag());
    if let Some(progress) = ctx.progress() {
        orchestrator = orchestrator.with_progress_callback(progress);
    }

    let (result, summary) = orchestrator
        .start_scan(args.roots())?
        .wait()
        .context("Scan failed")?;

    if summary.has_errors() {
        log::warn!("{} item(s) could not be read", summary.scan_errors.len());
    }
    orchestrator.publish(result);

    Ok((orchestrator, summary))
}

fn scan_exit_code(orchestrator: &Orchestrator, summary: &ScanSummary) -> ExitCode {
    if summary.has_errors() {
        ExitCode::PartialSuccess
    } else if orchestrator.result().is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    }
}

fn run_scan(ctx: &RunContext, args: &ScanArgs) -> Result<ExitCode> {
    let (orchestrator, summary) = scan(ctx, args, Remediator::default())?;
    let code = scan_exit_code(&orchestrator, &summary);

    write_listing(ctx, args.output, &orchestrator, &summary, code)?;
    Ok(code)
}

fn write_listing(
    ctx: &RunContext,
    format: OutputFormat,
    orchestrator: &Orchestrator,
    summary: &ScanSummary,
    code: ExitCode,
) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Text => TextOutput::new(orchestrator.result())
            .with_scan_errors(&summary.scan_errors)
            .with_color(ctx.color)
            .write_to(&mut out)?,
        OutputFormat::Json => {
            JsonOutput::new(orchestrator.result(), summary, code).write_to(&mut out)?
        }
        OutputFormat::Csv => {
            CsvOutput::new(orchestrator.result().groups()).write_to(&mut out)?;
            write_scan_errors(summary)?;
        }
    }
    Ok(())
}

/// Report unreadable items on stderr, bypassing the log level so `-q`
/// cannot hide them.
fn write_scan_errors(summary: &ScanSummary) -> Result<()> {
    let stderr = io::stderr();
    let mut err = stderr.lock();
    for error in &summary.scan_errors {
        writeln!(err, "skipped: {}", error)?;
    }
    Ok(())
}

fn select(orchestrator: &Orchestrator, args: &CleanArgs) -> Result<Vec<LogicalPath>> {
    let result = orchestrator.result();
    let folder = || {
        args.folder
            .as_deref()
            .context("--folder is required for this selection")
    };

    Ok(match args.select {
        SelectMode::AllButFirst => selection::all_but_first(result),
        SelectMode::InFolder => selection::in_folder(result, folder()?),
        SelectMode::OutsideFolder => selection::outside_folder(result, folder()?),
        SelectMode::Under => selection::under_prefix(result, folder()?),
        SelectMode::FolderContains => {
            selection::folder_containing(result, &folder()?.to_string_lossy())
        }
    })
}

fn run_clean(ctx: &RunContext, args: &CleanArgs) -> Result<ExitCode> {
    let strategy: RemediationStrategy = args
        .strategy
        .unwrap_or(ctx.config.strategy)
        .into_strategy(args.dest.as_deref().or(ctx.config.destination.as_deref()));
    strategy.validate().context("Invalid remediation strategy")?;

    let tool = args
        .archive_tool
        .clone()
        .unwrap_or_else(|| ctx.config.archive_tool.clone());
    let mut remediator = Remediator::new(ArchiveTool::new(tool));
    if let Some(progress) = ctx.progress() {
        remediator = remediator.with_progress_callback(progress);
    }

    let (mut orchestrator, summary) = scan(ctx, &args.scan, remediator)?;
    let selected = select(&orchestrator, args)?;

    if !args.yes {
        let code = scan_exit_code(&orchestrator, &summary);
        write_listing(ctx, args.scan.output, &orchestrator, &summary, code)?;
        write_preview(args.scan.output, &strategy, &selected)?;
        return Ok(code);
    }

    if selected.is_empty() {
        log::info!("Nothing selected");
    }

    let report = orchestrator
        .remediate(&strategy, &selected)
        .context("Remediation failed")?;

    let code = if report.all_succeeded() && !summary.has_errors() {
        ExitCode::Success
    } else {
        ExitCode::PartialSuccess
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.scan.output {
        OutputFormat::Text => {
            let text = TextOutput::new(orchestrator.result())
                .with_scan_errors(&summary.scan_errors)
                .with_color(ctx.color);
            text.write_report(&report, &mut out)?;
            writeln!(out)?;
            text.write_to(&mut out)?;
        }
        OutputFormat::Json => JsonOutput::new(orchestrator.result(), &summary, code)
            .with_remediation(strategy.name(), &report)
            .write_to(&mut out)?,
        OutputFormat::Csv => {
            CsvOutput::new(orchestrator.result().groups()).write_to(&mut out)?;
            write_scan_errors(&summary)?;
            eprintln!("{}", report.summary());
        }
    }

    Ok(code)
}

/// List what `--yes` would act on. Goes to stderr for machine formats so
/// stdout stays parseable.
fn write_preview(
    format: OutputFormat,
    strategy: &RemediationStrategy,
    selected: &[LogicalPath],
) -> Result<()> {
    let mut lines = Vec::with_capacity(selected.len() + 1);
    for path in selected {
        lines.push(format!("would {}: {}", strategy, path));
    }
    lines.push(format!(
        "{} item(s) selected; re-run with --yes to apply",
        selected.len()
    ));

    if format == OutputFormat::Text {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        writeln!(out)?;
        for line in &lines {
            writeln!(out, "{}", line)?;
        }
    } else {
        let stderr = io::stderr();
        let mut err = stderr.lock();
        for line in &lines {
            writeln!(err, "{}", line)?;
        }
    }
    Ok(())
}
