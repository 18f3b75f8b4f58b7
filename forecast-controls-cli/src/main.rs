//! Forecast Controls CLI Application
//!
//! Command-line driver for the forecast-controls library. It adds:
//! - TOML configuration of widget defaults and backend access
//! - Scripted replay of user actions through the controller
//! - Blocking HTTP calls to the forecast backend
//! - Report generation (TXT/JSON)

use anyhow::{Context, Result};
use clap::Parser;
use forecast_controls::Controller;
use std::fs;
use std::path::PathBuf;

mod backend;
mod config;
mod report;
mod session;

use backend::Backend;
use config::{AppConfig, OutputFormat};
use report::Report;
use session::{Action, Session};

/// Forecast Controls - Replay control sessions against a forecast backend
#[derive(Parser, Debug)]
#[command(name = "forecast-controls-cli")]
#[command(about = "Drive forecast viewer controls from a script", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file (config.toml) with the action script
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend base URL, overrides [backend] base_url
    #[arg(short, long, value_name = "URL")]
    backend: Option<String>,

    /// Restore the previous backend session before replaying
    #[arg(long)]
    resume: bool,

    /// Report format, overrides [output] format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file for the report (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Forecast Controls CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using controls library v{}", forecast_controls::VERSION);

    if args.print_config {
        print!("{}", toml::to_string_pretty(&AppConfig::default())?);
    } else if let Some(config_path) = &args.config {
        replay_mode(config_path, &args)?;
    } else {
        // No arguments - show help
        println!("Forecast Controls - No configuration specified");
        println!("\nQuick Start:");
        println!("  forecast-controls-cli --print-config > session.toml");
        println!("  forecast-controls-cli --config session.toml");
        println!("\nWith a live backend:");
        println!("  forecast-controls-cli --config session.toml --backend http://localhost:5000 --resume");
        println!("\nUse --help for more options");
    }

    Ok(())
}

/// Replay mode - build the controls, run the script, write the report
fn replay_mode(config_path: &PathBuf, args: &Args) -> Result<()> {
    log::info!("Loading configuration from: {:?}", config_path);
    let mut config = config::load_config(config_path)?;
    log::debug!("Configuration loaded successfully");

    if let Some(url) = &args.backend {
        config.backend.base_url = Some(url.clone());
    }

    let controller =
        Controller::new(&config.controls).context("Invalid control configuration")?;
    let backend = match &config.backend.base_url {
        Some(url) => Some(
            Backend::new(url, config.backend.timeout())
                .with_context(|| format!("Failed to create HTTP client for {url}"))?,
        ),
        None => {
            log::info!("No backend configured, running offline");
            None
        }
    };

    let mut session = Session::new(controller, backend);
    if args.resume {
        session.run(&[Action::Resume]);
    }
    log::info!("Replaying {} action(s)", config.script.len());
    session.run(&config.script);

    if session.failures() > 0 {
        log::warn!("{} step(s) failed", session.failures());
    }

    let report = Report::new(&session, config.output.include_features);
    let text = match args.format.unwrap_or(config.output.format) {
        OutputFormat::Txt => report.to_string(),
        OutputFormat::Json => report.to_json()?,
    };

    match args.output.as_ref().or(config.output.output_file.as_ref()) {
        Some(path) => {
            fs::write(path, text)
                .with_context(|| format!("Failed to write report to {:?}", path))?;
            log::info!("Report written to {:?}", path);
        }
        None => print!("{text}"),
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
