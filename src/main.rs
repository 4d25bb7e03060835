//! midi-surface host runner
//!
//! Drives the control surface core from a desktop: MIDI goes through midir
//! ports, inputs come from a replay script and LEDs are drawn in the terminal.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use midi_surface::config::AppConfig;
use midi_surface::drivers::{midi_port, MidirTransport, ScriptedInputs, TerminalLeds};
use midi_surface::surface::ControlSurface;

type HostSurface = ControlSurface<ScriptedInputs, MidirTransport, TerminalLeds>;

/// USB-MIDI control surface: sliders, knobs and buttons to MIDI with LED feedback
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// CSV input script (tick,pin,level) to replay instead of idle inputs
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Stop after this many poll cycles
    #[arg(long)]
    ticks: Option<u64>,

    /// List available MIDI ports
    #[arg(long)]
    list_ports: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let _log_guard = init_logging(&args.log_level, args.log_file.as_deref())?;

    if args.list_ports {
        midi_port::print_ports()?;
        return Ok(());
    }

    info!("Starting midi-surface...");
    info!("Configuration file: {}", args.config);

    let config = AppConfig::load(&args.config).await?;

    let inputs = match &args.script {
        Some(path) => {
            let inputs = ScriptedInputs::from_path(path)?;
            info!("Replaying {} input changes from {}", inputs.len(), path.display());
            inputs
        }
        None => ScriptedInputs::idle(),
    };

    let transport = MidirTransport::connect(&config.midi)?;
    let leds = TerminalLeds::new(config.leds.count, config.leds.brightness);

    let surface = ControlSurface::new(
        config.surface.layout.clone(),
        config.quantizer()?,
        config.surface.channel,
        inputs,
        transport,
        leds,
    );

    run(
        surface,
        Duration::from_millis(config.poll_interval_ms),
        args.ticks,
        shutdown_signal(),
    )
    .await;

    info!("midi-surface shutdown complete");
    Ok(())
}

async fn run(
    mut surface: HostSurface,
    period: Duration,
    max_ticks: Option<u64>,
    shutdown: impl std::future::Future<Output = ()>,
) {
    info!("Polling every {:?}", period);

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut sent = 0usize;
    let mut script_done = surface.pins().is_finished();

    loop {
        tokio::select! {
            _ = interval.tick() => {
                surface.pins_mut().advance();
                sent += surface.tick().sent.len();

                if !script_done && surface.pins().is_finished() {
                    info!("Input script finished after {} ticks", surface.ticks());
                    script_done = true;
                }

                if max_ticks.is_some_and(|max| surface.ticks() >= max) {
                    info!("Reached tick limit");
                    break;
                }
            }

            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping poll loop");
                break;
            }
        }
    }

    info!("Ran {} ticks, sent {} messages", surface.ticks(), sent);
}

fn init_logging(level: &str, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .with_context(|| format!("Invalid log file path: {}", path.display()))?;
            let directory = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
