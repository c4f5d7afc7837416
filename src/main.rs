//! Firm-Harvest main entry point
//!
//! This is the command-line interface for the Firm-Harvest directory sweeper.

use anyhow::Context;
use clap::Parser;
use firm_harvest::config::profile::{delete_profile, list_profiles, save_profile};
use firm_harvest::config::{load_config_with_hash, load_profile, Config, ProfileSettings, RunMode};
use firm_harvest::crawler::{run_harvest, HarvestSummary, TracingObserver};
use firm_harvest::output::print_metrics;
use firm_harvest::stealth::StealthLevel;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Firm-Harvest: a paced directory sweeper and profile extractor
///
/// Probes a numeric identifier range for firm profile pages, then extracts a fixed
/// record from every confirmed profile into a spreadsheet. Discovery can be stopped with
/// Ctrl-C and resumed later.
#[derive(Parser, Debug)]
#[command(name = "firm-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A paced directory sweeper and profile extractor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Debug verbosity: 1 = crate debug, 2 = crate trace, 3 = trace everything
    #[arg(long, value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(1..=3))]
    debug_level: Option<u8>,

    /// Start a new discovery run, discarding saved progress
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Resume discovery from saved progress
    #[arg(long, conflicts_with = "fresh")]
    resume: bool,

    /// Validate config and show the effective settings without sending requests
    #[arg(long, group = "action")]
    dry_run: bool,

    /// List saved stealth profiles and exit
    #[arg(long, group = "action")]
    list_profiles: bool,

    /// Save the effective stealth settings as a named profile and exit
    #[arg(long, value_name = "NAME", group = "action")]
    save_profile: Option<String>,

    /// Delete a named stealth profile and exit
    #[arg(long, value_name = "NAME", group = "action")]
    delete_profile: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    let verbosity = match (cli.debug, cli.debug_level) {
        (_, Some(level)) => level,
        (true, None) => 1,
        (false, None) => 0,
    };
    let _guard = setup_logging(verbosity, Path::new(&config.output.log_directory))?;
    tracing::info!(
        "Configuration loaded from {} (hash: {})",
        cli.config.display(),
        config_hash
    );

    if cli.fresh {
        config.run.mode = RunMode::New;
    } else if cli.resume {
        config.run.mode = RunMode::Resume;
    }

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.list_profiles {
        handle_list_profiles(&config)?;
    } else if let Some(name) = &cli.save_profile {
        handle_save_profile(&config, name)?;
    } else if let Some(name) = &cli.delete_profile {
        let dir = Path::new(&config.output.profiles_directory);
        if delete_profile(dir, name)? {
            println!("✓ Deleted profile '{}'", name);
        } else {
            println!("No profile named '{}' in {}", name, dir.display());
        }
    } else {
        handle_harvest(config).await?;
    }

    Ok(())
}

fn log_filter(verbosity: u8) -> EnvFilter {
    match verbosity {
        0 => EnvFilter::new("firm_harvest=info,warn"),
        1 => EnvFilter::new("firm_harvest=debug,info"),
        2 => EnvFilter::new("firm_harvest=trace,debug"),
        _ => EnvFilter::new("trace"),
    }
}

/// Sets up console logging plus a timestamped log file in `log_dir`
///
/// The returned guard flushes the file writer and must live until exit.
fn setup_logging(verbosity: u8, log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_name = format!("harvest_{}.log", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let appender = tracing_appender::rolling::never(log_dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_filter(log_filter(verbosity));

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .with_filter(log_filter(verbosity));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Firm-Harvest Dry Run ===\n");

    println!("Run:");
    println!("  Mode: {:?}", config.run.mode);
    println!(
        "  Range: {} - {}",
        config.run.range_start, config.run.range_end
    );
    if let Some(test_count) = config.run.test_count {
        println!("  Test run up to ID: {}", test_count);
    }

    println!("\nTarget:");
    println!("  URL template: {}", config.target.url_template);
    println!("  Timeout: {}s", config.target.request_timeout_secs);
    println!("  Marker: {}", config.target.marker_selector);

    println!("\nStealth:");
    match StealthLevel::from_number(config.stealth.level) {
        Some(level) => println!("  Level: {}", level),
        None => println!("  Level: {} (unknown)", config.stealth.level),
    }
    if let Some(profile) = &config.stealth.profile {
        println!("  Custom profile: {}", profile);
    }
    println!("  Work/rest cycling: {}", config.stealth.work_rest_cycling);
    println!("  Time unit: {}ms", config.pacing.time_unit_ms);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.save_directory);
    println!("  File name: {}.xlsx", config.output.file_name);
    println!("  Ranking year: {}", config.extraction.ranking_year);

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would probe {} identifiers",
        config
            .run
            .upper_bound()
            .saturating_sub(config.run.range_start)
            + 1
    );
}

/// Handles the --list-profiles mode
fn handle_list_profiles(config: &Config) -> anyhow::Result<()> {
    let dir = Path::new(&config.output.profiles_directory);
    let names = list_profiles(dir)?;

    if names.is_empty() {
        println!("No saved profiles in {}", dir.display());
    } else {
        println!("Profiles in {}:", dir.display());
        for name in names {
            println!("  - {}", name);
        }
    }
    Ok(())
}

/// Handles the --save-profile mode: stores the effective settings under `name`
fn handle_save_profile(config: &Config, name: &str) -> anyhow::Result<()> {
    let settings = match &config.stealth.profile {
        Some(path) => load_profile(Path::new(path))?,
        None => {
            let level = StealthLevel::from_number(config.stealth.level)
                .context("stealth level must be between 1 and 4")?;
            ProfileSettings::from_level(level)
        }
    };

    let path = save_profile(Path::new(&config.output.profiles_directory), name, &settings)?;
    println!("✓ Saved profile '{}' to {}", name, path.display());
    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received; stopping after the current request");
            ctrl_c.cancel();
        }
    });

    let worker =
        tokio::spawn(async move { run_harvest(&config, cancel, &TracingObserver).await });

    match worker.await? {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}

fn print_summary(summary: &HarvestSummary) {
    println!();
    print_metrics(&summary.metrics);

    println!("\n=== Harvest Summary ===\n");
    println!("  Discovery: {}", summary.discovery);
    match summary.extraction {
        Some(state) => println!("  Extraction: {}", state),
        None => println!("  Extraction: not run"),
    }
    println!("  Profiles discovered: {}", summary.discovered);
    println!("  Records extracted: {}", summary.records);
    println!("  Failed URLs: {}", summary.failures);

    if let Some(files) = &summary.files {
        println!("  Results: {}", files.records.display());
        if let Some(failures) = &files.failures {
            println!("  Failures: {}", failures.display());
        }
    }
}
