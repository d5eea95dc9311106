/// meshview - interactive terminal viewer for OBJ models
///
/// Controls:
///   - WASD / Arrow Keys: Move on X and Y
///   - PgUp/PgDn: Move on Z
///   - I/K, J/L, U/O: Rotate about X, Y, Z
///   - +/-: Scale
///   - R: Reload the model from disk
///   - Q/ESC: Quit
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use meshview_core::obj;
use meshview_terminal::{describe, Controls, TerminalApp};
use tracing::info;

/// Interactive terminal viewer for OBJ models
#[derive(Parser, Debug)]
#[command(name = "meshview")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the OBJ file to load
    path: PathBuf,

    /// Translation per key press, in model units
    #[arg(long, default_value_t = 0.1)]
    move_step: f32,

    /// Rotation per key press, in degrees
    #[arg(long, default_value_t = 5.0)]
    rotate_step: f32,

    /// Scale factor per key press (must be greater than 1)
    #[arg(long, default_value_t = 1.1)]
    scale_step: f32,

    /// Write logs to this file; the terminal is taken over by the viewer
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print model statistics and exit without opening the viewer
    #[arg(long)]
    info: bool,
}

impl Args {
    fn controls(&self) -> Result<Controls> {
        anyhow::ensure!(
            self.scale_step.is_finite() && self.scale_step > 1.0,
            "--scale-step must be greater than 1, got {}",
            self.scale_step
        );
        Ok(Controls {
            move_step: self.move_step,
            rotate_step: self.rotate_step,
            scale_step: self.scale_step,
        })
    }
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_ref())?;
    let controls = args.controls()?;

    // Validate the model before taking over the terminal
    let mesh = obj::parse_file(&args.path)
        .with_context(|| format!("failed to load {}", args.path.display()))?;
    println!("{}: {}", args.path.display(), describe(&mesh));
    if args.info {
        return Ok(());
    }

    let mut app = TerminalApp::for_terminal(controls)?;
    app.open(&args.path)
        .with_context(|| format!("failed to load {}", args.path.display()))?;
    info!(path = %args.path.display(), "starting viewer");
    app.run()?;

    Ok(())
}
