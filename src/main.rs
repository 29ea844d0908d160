// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};

mod cli;

#[derive(Parser)]
#[command(name = "blackspot")]
#[command(about = "Black object detection with terminal preview and LED feedback")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run detection against a camera (default)
    Run {
        /// Capture device path (default: from config, /dev/video0)
        #[arg(short, long)]
        device: Option<String>,

        /// Stop after this many frames instead of running until quit
        #[arg(long)]
        max_frames: Option<u64>,

        /// Do not drive the status LEDs
        #[arg(long)]
        no_leds: bool,
    },

    /// Replay a synthetic scene without camera or detector hardware
    Simulate {
        /// Number of frames to replay
        #[arg(short, long, default_value = "300")]
        frames: u64,
    },

    /// List available V4L2 capture devices
    List,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=blackspot=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run {
            device,
            max_frames,
            no_leds,
        }) => cli::run_detection(device, max_frames, no_leds),
        Some(Commands::Simulate { frames }) => cli::run_simulation(frames),
        Some(Commands::List) => cli::list_devices(),
        None => cli::run_detection(None, None, false),
    }
}
