//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - resolves and loads the persisted configuration
//! - loads or generates raw samples
//! - runs the batch pipeline and prints reports
//! - writes optional exports

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};

use crate::cli::{AnalyzeArgs, Cli, Command, ConfigCommand, ConfigOverrides, DemoArgs};
use crate::data::{generate_batch, TensileCurveSpec};
use crate::domain::{AnalysisConfig, RawSample, TestMode};
use crate::error::AppError;
use crate::io::{load_config, load_samples, reset_config, resolve_config_path, save_config, write_results_json};

pub mod pipeline;

/// Entry point for the `ecc` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = resolve_config_path(cli.config.as_deref())?;
    debug!(path = %config_path.display(), "resolved config path");

    match cli.command {
        Command::Analyze(args) => handle_analyze(args, &config_path),
        Command::Demo(args) => handle_demo(args, &config_path),
        Command::Config(cmd) => handle_config(cmd, &config_path),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_analyze(args: AnalyzeArgs, config_path: &std::path::Path) -> Result<(), AppError> {
    let config = effective_config(&args.overrides, config_path)?;

    let mut samples: Vec<RawSample> = Vec::new();
    for path in &args.files {
        samples.extend(load_samples(path, args.layout)?);
    }
    info!(files = args.files.len(), samples = samples.len(), "input loaded");

    report_batch(&samples, args.mode, &config, args.export.as_deref())
}

fn handle_demo(args: DemoArgs, config_path: &std::path::Path) -> Result<(), AppError> {
    let config = effective_config(&args.overrides, config_path)?;

    let base = TensileCurveSpec {
        crack_drops: args.crack_drops,
        noise_sd: args.noise,
        ..TensileCurveSpec::default()
    };
    let mut samples = Vec::with_capacity(args.groups * args.count);
    for g in 0..args.groups {
        let label = format!("Mix{}", g + 1);
        let group_seed = args.seed.wrapping_add(1000 * g as u64);
        samples.extend(generate_batch(&label, args.count, &base, group_seed)?);
    }

    report_batch(&samples, TestMode::Tension, &config, args.export.as_deref())
}

fn report_batch(
    samples: &[RawSample],
    mode: TestMode,
    config: &AnalysisConfig,
    export: Option<&std::path::Path>,
) -> Result<(), AppError> {
    let output = pipeline::analyze_batch(samples, mode, config)?;
    for r in &output.results {
        debug!(sample = %r.name, "{}", crate::report::describe_result(&r.result));
    }
    let groups = pipeline::summarize_groups(&output);

    println!("{}", crate::report::format_report(&output, &groups, config));

    if let Some(path) = export {
        write_results_json(path, &output, &groups, config)?;
    }

    if output.results.is_empty() && !output.failures.is_empty() {
        return Err(AppError::new(3, "Every sample failed analysis."));
    }
    Ok(())
}

fn handle_config(cmd: ConfigCommand, config_path: &std::path::Path) -> Result<(), AppError> {
    match cmd {
        ConfigCommand::Show => {
            let config = load_config(config_path)?;
            let text = serde_json::to_string_pretty(&config)
                .map_err(|e| AppError::new(4, format!("Failed to serialize config: {e}")))?;
            println!("{text}");
        }
        ConfigCommand::Reset => {
            reset_config(config_path)?;
            println!("Configuration reset to defaults: {}", config_path.display());
        }
        ConfigCommand::Path => println!("{}", config_path.display()),
    }
    Ok(())
}

/// Loaded configuration with CLI overrides applied; saved when `--save` is set.
fn effective_config(overrides: &ConfigOverrides, config_path: &std::path::Path) -> Result<AnalysisConfig, AppError> {
    let config = config_from_args(load_config(config_path)?, overrides);
    config
        .validate()
        .map_err(|msg| AppError::new(2, format!("Invalid analysis configuration: {msg}")))?;

    if overrides.save {
        save_config(config_path, &config)?;
        info!(path = %config_path.display(), "configuration saved");
    }
    Ok(config)
}

pub fn config_from_args(base: AnalysisConfig, overrides: &ConfigOverrides) -> AnalysisConfig {
    AnalysisConfig {
        smooth_window: overrides.smooth_window.unwrap_or(base.smooth_window),
        elastic_lower_ratio: overrides.elastic_lower.unwrap_or(base.elastic_lower_ratio),
        elastic_upper_ratio: overrides.elastic_upper.unwrap_or(base.elastic_upper_ratio),
        ultimate_strain_ratio: overrides.ultimate_ratio.unwrap_or(base.ultimate_strain_ratio),
        gauge_length_mm: overrides.gauge_length.unwrap_or(base.gauge_length_mm),
        crack_tolerance_base: overrides.crack_tolerance.unwrap_or(base.crack_tolerance_base),
    }
}
