//! # Saorsa Sketch Replay
//!
//! Replays a synthetic drawing and prints the interpreted scene.

use anyhow::Context;
use clap::Parser;
use sketch_replay::{render, replay, CliArgs, ReplayConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sketch_core=debug,sketch_replay=debug"));

    // Logs go to stderr so stdout stays clean for the scene output.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // Use JSON format when RUST_LOG_FORMAT=json
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ReplayConfig::from(CliArgs::parse());
    tracing::info!(shape = ?config.shape, "Starting Saorsa Sketch replay");

    let document = match &config.config_path {
        Some(path) => {
            tracing::info!("Loading recognizer config from {}", path.display());
            Some(
                std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?,
            )
        }
        None => None,
    };
    let sketch = config.sketch_config(document.as_deref())?;

    let interp = replay(config.shape, &sketch)?;
    print!("{}", render(interp.scene(), config.json)?);
    if config.json {
        println!();
    }
    Ok(())
}
