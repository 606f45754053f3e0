//! dialctl - dial pad input monitor
//!
//! Decodes live or captured dial pad reports, runs the inertial wheel model
//! and prints events and direction tokens.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod capture;
mod device;
mod error;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialflow_engine::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::CliError;
use crate::output::ConsoleSink;

#[derive(Parser)]
#[command(name = "dialctl")]
#[command(about = "Dial pad input monitor - decode reports and drive inertial wheel output")]
#[command(version)]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(long, global = true, help = "Output in JSON format for machine parsing")]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode live reports from a device until interrupted
    Monitor {
        /// Vendor ID (hex, e.g. 0x046D)
        #[arg(long, value_parser = parse_hex_u16, default_value_t = VENDOR_ID_LOGITECH)]
        vid: u16,
        /// Product ID (hex, e.g. 0xBC00)
        #[arg(long, value_parser = parse_hex_u16, default_value_t = PRODUCT_ID_MX_DIALPAD)]
        pid: u16,
        /// Engine configuration file (JSON)
        #[arg(long, env = "DIALCTL_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Replay a capture file on a simulated clock
    Replay {
        /// Capture file (JSON)
        capture: PathBuf,
        /// Engine configuration file (JSON)
        #[arg(long, env = "DIALCTL_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Decode reports given as hex strings, in order
    Decode {
        /// Reports such as "00 08 00 00 00 00 00 00"
        #[arg(required = true)]
        reports: Vec<String>,
        /// Engine configuration file (JSON)
        #[arg(long, env = "DIALCTL_CONFIG")]
        config: Option<PathBuf>,
    },
}

fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let s = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(s, 16).map_err(|e| format!("invalid hex value '{s}': {e}"))
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .map_err(CliError::from)
            .with_context(|| format!("Failed to load config '{}'", path.display())),
        None => Ok(EngineConfig::mx_dialpad()),
    }
}

fn build_engine(config: &EngineConfig, json: bool) -> Arc<DialEngine> {
    let sink = Arc::new(ConsoleSink::new(json));
    Arc::new(
        DialEngine::new(config.clone())
            .with_event_sink(sink.clone())
            .with_output_sink(sink),
    )
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    format!(
                        "dialctl={log_level},dialflow_engine={log_level},\
                         dialflow_physics={log_level},dialflow_report={log_level}"
                    )
                    .into()
                }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute_command(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }
            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(code)
        }
    }
}

async fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Monitor { vid, pid, config } => {
            let config = load_config(config.as_deref())?;
            let engine = build_engine(&config, cli.json);
            let api = hidapi::HidApi::new().context("Failed to initialize HidApi")?;
            let source = device::HidReportSource::open(&api, *vid, *pid)?;
            device::monitor(engine, source, config.tick_period()).await
        }
        Commands::Replay { capture, config } => {
            let config = load_config(config.as_deref())?;
            let engine = build_engine(&config, cli.json);
            let file = capture::CaptureFile::load(capture)
                .with_context(|| format!("Failed to read capture '{}'", capture.display()))?;
            let summary = capture::replay(&engine, &file, config.tick_period(), Instant::now())?;
            if cli.json {
                println!("{}", serde_json::to_string(&summary)?);
            } else {
                println!(
                    "Replayed {} report(s): {} event(s), {} token(s), {} rejected",
                    summary.reports, summary.events, summary.tokens, summary.rejected
                );
            }
            Ok(())
        }
        Commands::Decode { reports, config } => {
            let config = load_config(config.as_deref())?;
            let engine = build_engine(&config, cli.json);
            decode_all(&engine, reports)?;
            Ok(())
        }
    }
}

/// Decode hex reports in order within one session.
fn decode_all(engine: &DialEngine, reports: &[String]) -> Result<Vec<DecodedReport>, CliError> {
    let payloads = reports
        .iter()
        .map(|text| parse_hex(text).ok_or_else(|| CliError::InvalidReport(text.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    engine.connect();
    let mut decoded = Vec::with_capacity(payloads.len());
    for (sequence, bytes) in payloads.into_iter().enumerate() {
        decoded.push(engine.process_report(&Report::new(sequence as u64, bytes))?);
    }
    engine.disconnect();
    Ok(decoded)
}

// ── BDD-style scenario tests ────────────────────────────────────────────────
