//! Simulated Device Host
//!
//! Loads a simulation document, keeps the device's attributes updating in the
//! background and answers commands read from stdin. Responses go to stdout;
//! logs go to stderr.

mod console;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use devsim_engine::SimulatedDevice;
use devsim_model::document::load_config;
use devsim_model::SimulationConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Simulation document describing attributes and command responses,
    /// either the legacy document or output of `--dump-config`
    #[arg(short, long = "config", value_name = "FILE")]
    config: PathBuf,

    /// Seed for rule-driven responses, for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Print the loaded configuration as JSON and exit; the output is
    /// accepted back by `--config`
    #[arg(long)]
    dump_config: bool,

    /// Print every attribute update as `name=value`
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "devsim=info,devsim_engine=info,devsim_model=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let text = std::fs::read_to_string(&args.config)
        .with_context(|| format!("failed to read {}", args.config.display()))?;
    let config = load_config(&text)
        .with_context(|| format!("invalid simulation document {}", args.config.display()))?;

    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    run(config, &args).await
}

async fn run(config: SimulationConfig, args: &Args) -> anyhow::Result<()> {
    let mut device = match args.seed {
        Some(seed) => SimulatedDevice::with_seed(config, seed),
        None => SimulatedDevice::new(config),
    };

    if args.watch {
        let mut updates = device.store().subscribe();
        tokio::spawn(async move {
            loop {
                match updates.recv().await {
                    Ok(update) => println!("{}={}", update.attribute, update.value),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Watcher fell behind, skipped {} updates", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    device.start();
    info!("Ready: {}", device.command_names().join(", "));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    info!("Input closed");
                    break;
                };
                if let Some(request) = console::parse_line(&line) {
                    println!("{}", console::execute(&device, &request));
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    for exit in device.shutdown().await {
        info!("{} stopped: {}", exit.attribute, exit.reason);
    }
    Ok(())
}
