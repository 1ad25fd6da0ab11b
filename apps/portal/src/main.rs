use std::{io, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use consent::ConsentRegistry;
use records::{RecordFilter, RecordStore};
use shared::domain::HospitalId;
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod render;

use commands::{
    run_access_log, run_consents, run_emergency, run_hospitals, run_sources, run_timeline,
    ConsentToggle,
};
use config::{load_settings, OutputFormat};
use render::TerminalRenderer;

#[derive(Parser, Debug)]
#[command(about = "Patient portal: emergency access, medical records, consent and hospital access")]
struct Cli {
    /// Settings file (defaults to ./portal.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured output format (text or json).
    #[arg(long)]
    output: Option<OutputFormat>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Activate emergency access and follow the fifteen minute countdown.
    Emergency {
        /// Deactivate manually after this many seconds.
        #[arg(long)]
        cancel_after: Option<u64>,
    },
    /// Toggle record-sharing consents, e.g. `--set consent-2=on`.
    Consents {
        #[arg(long = "set")]
        set: Vec<ConsentToggle>,
    },
    /// Grant or revoke hospital access.
    Hospitals {
        #[arg(long)]
        grant: Vec<HospitalId>,
        #[arg(long)]
        revoke: Vec<HospitalId>,
    },
    /// Show who accessed the records, newest first.
    AccessLog,
    /// Medical history grouped by month, newest first.
    Timeline {
        /// all, diagnosis, medication, test, consultation or imaging.
        #[arg(long, default_value = "all")]
        filter: RecordFilter,
    },
    /// Records received from other hospitals and the formats they arrived in.
    Sources,
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("portal: unable to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(output) = cli.output {
        settings.output = output;
    }

    let filter = EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter '{}': {err}", settings.log_filter);
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let renderer = Arc::new(TerminalRenderer::new(io::stdout(), settings.output));
    renderer.header(&settings);
    let mut registry = ConsentRegistry::seeded();

    match cli.command {
        Command::Emergency { cancel_after } => {
            run_emergency(
                renderer,
                cancel_after.map(Duration::from_secs),
                shutdown_signal(),
            )
            .await?;
        }
        Command::Consents { set } => {
            run_consents(&renderer, &mut registry, &set, Utc::now().date_naive())?;
        }
        Command::Hospitals { grant, revoke } => {
            run_hospitals(&renderer, &mut registry, &grant, &revoke, Utc::now())?;
        }
        Command::AccessLog => run_access_log(&renderer, &registry),
        Command::Timeline { filter } => run_timeline(&renderer, &RecordStore::seeded(), filter),
        Command::Sources => run_sources(&renderer, &RecordStore::seeded()),
    }

    Ok(())
}
