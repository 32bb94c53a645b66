use anyhow::{Context, Result};
use clap::Parser;
use jump_bot::{classify, DebugSink, Session, SessionOptions, TokioSleeper};
use jump_capture::{AdbBridge, DeviceBridge, ReplayBridge};
use jump_data::{CalibrationStore, DEFAULT_RESOLUTION};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{BufRead, IsTerminal};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, info};

/// Plays the jump game on an Android phone over adb
#[derive(Debug, Parser)]
#[command(name = "jump-bot", version)]
struct Args {
    /// adb executable
    #[arg(long, env = "JUMP_ADB", default_value = "adb")]
    adb: String,

    /// Directory holding one `<width>x<height>.json` calibration per resolution
    #[arg(long, env = "JUMP_CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Use this calibration file instead of looking one up by resolution
    #[arg(long)]
    calibration: Option<PathBuf>,

    /// Save an annotated screenshot of every jump
    #[arg(long)]
    debug: bool,

    #[arg(long, env = "JUMP_DEBUG_DIR", default_value = "debug")]
    debug_dir: PathBuf,

    /// Replay PNG screenshots from a directory instead of driving a device
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Stop after this many jumps
    #[arg(long)]
    jumps: Option<u64>,

    /// Do not jump when the piece cannot be found
    #[arg(long)]
    skip_on_miss: bool,

    /// Seed for pacing and touch jitter
    #[arg(long)]
    seed: Option<u64>,

    /// Start without waiting for confirmation
    #[arg(short, long)]
    yes: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    jump_bot::init_tracing(args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("\n{}", classify(&e).message());
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let bridge: Box<dyn DeviceBridge> = match &args.replay {
        Some(dir) => Box::new(ReplayBridge::open(dir)?),
        None => Box::new(AdbBridge::new(args.adb.clone())),
    };
    let bridge = Arc::new(bridge);

    if !args.yes && std::io::stdin().is_terminal() {
        println!(
            "Make sure that 1. adb is installed 2. developer options are enabled on the phone \
             3. the phone is connected 4. the game is open and started (Enter)"
        );
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read confirmation")?;
    }

    let device = bridge.device_info()?;
    println!("Manufacturer:\t{}", device.manufacturer);
    println!("Version:\t{}", device.version);
    println!("Resolution:\t{}", device.screen_size);
    println!("Host:\t\t{} {}\n", std::env::consts::OS, std::env::consts::ARCH);

    let calibration = match &args.calibration {
        Some(path) => CalibrationStore::load_file(path)?,
        None => {
            let resolution = bridge
                .screen_size()?
                .unwrap_or_else(|| DEFAULT_RESOLUTION.to_string());
            CalibrationStore::new(&args.config_dir).load(&resolution)?
        }
    };

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut session = Session::new(bridge, calibration, TokioSleeper, rng).with_options(
        SessionOptions {
            skip_on_miss: args.skip_on_miss,
            max_jumps: args.jumps,
        },
    );
    if args.debug {
        let sink = DebugSink::create(&args.debug_dir)?;
        info!("Saving debug screenshots to {}", sink.dir().display());
        session = session.with_debug_sink(sink);
    }

    let stop = session.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Stopping after the current jump");
            stop.store(true, Ordering::Relaxed);
        }
    });

    let summary = session.run().await?;
    println!("Played {} rounds", summary.jumps);
    Ok(())
}
