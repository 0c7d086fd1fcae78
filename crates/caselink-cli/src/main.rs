#![forbid(unsafe_code)]

mod author;
mod cmd;
mod output;

use caselink_core::ErrorCode;
use caselink_core::config::resolve_config;
use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "caselink",
    author,
    version,
    about = "caselink: attach comments and alerts to incident cases",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output (shorthand for `--format json`).
    #[arg(long, global = true)]
    json: bool,

    /// Output format. Overrides `--json`, `FORMAT` and config.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Override author identity (skips env and config resolution).
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Attach comments or alerts to a case",
        long_about = "Attach one request object (single create) or a JSON array of requests \
                      (bulk create). Alerts already on the case or earlier in the batch are \
                      skipped.",
        after_help = "EXAMPLES:\n    # Attach a single comment\n    echo '{\"type\":\"user\",\"comment\":\"triage started\",\"owner\":\"soc\"}' | caselink attach case-1\n\n    # Bulk attach from a file\n    caselink attach case-1 --file batch.json\n\n    # Emit machine-readable output\n    caselink attach case-1 --file batch.json --json"
    )]
    Attach(cmd::attach::AttachArgs),

    #[command(
        about = "List attachments stored for a case",
        after_help = "EXAMPLES:\n    # Show attachments in creation order\n    caselink list case-1\n\n    # As JSON\n    caselink list case-1 --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        about = "Show alert ids already attached to a case",
        after_help = "EXAMPLES:\n    # Sorted alert ids\n    caselink alerts case-1"
    )]
    Alerts(cmd::list::AlertsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CASELINK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "caselink=debug,info"
        } else {
            "caselink=info,warn"
        })
    });

    let format = env::var("CASELINK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output; logs go to stderr.
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = env::current_dir()?;
    let config = match resolve_config(&project_root, cli.json) {
        Ok(config) => config,
        Err(err) => {
            let fallback = cli.format.unwrap_or(if cli.json {
                OutputMode::Json
            } else {
                OutputMode::Text
            });
            render_error(
                fallback,
                &CliError::from_code(format!("{err:#}"), ErrorCode::ConfigParseError),
            )?;
            return Err(err);
        }
    };
    let output = resolve_output_mode(cli.format, &config.resolved_output);

    match cli.command {
        Commands::Attach(ref args) => {
            cmd::attach::run_attach(args, cli.user.as_deref(), output, &config)
        }
        Commands::List(ref args) => cmd::list::run_list(args, output, &config),
        Commands::Alerts(ref args) => cmd::list::run_alerts(args, output, &config),
    }
}
