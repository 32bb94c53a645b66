use anyhow::{Context, Result};
use jump_capture::{DeviceBridge, Swipe};
use jump_data::Calibration;
use jump_state::{Pacer, PacingPolicy, Pause};
use jump_vision::{Coordinates, Detection, Raster};
use rand::Rng;
use std::future::Future;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::debug_sink::DebugSink;
use crate::timing::{press_coefficient, press_duration};

/// Waits between jumps. Abstracted so tests can run a session without real time passing.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Where a session is within its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Capturing,
    Locating,
    Jumping,
    Pacing,
}

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Do not swipe when no piece was found. Off by default: a miss still
    /// sends a shortest-possible press, which is the long-standing behavior.
    pub skip_on_miss: bool,
    /// Stop after this many cycles
    pub max_jumps: Option<u64>,
}

/// Result of one capture → locate → jump cycle
#[derive(Debug, Clone)]
pub struct Jump {
    pub detection: Detection,
    pub coordinates: Coordinates,
    pub distance: f64,
    pub duration_ms: u32,
    /// `None` when the swipe was skipped
    pub swipe: Option<Swipe>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub jumps: u64,
    pub misses: u64,
}

/// Plays jumps one after another until stopped or a device call fails
pub struct Session<B, S, R> {
    bridge: Arc<B>,
    calibration: Calibration,
    pacer: Pacer,
    sleeper: S,
    rng: R,
    debug_sink: Option<DebugSink>,
    options: SessionOptions,
    stop: Arc<AtomicBool>,
    state: SessionState,
}

impl<B, S, R> Session<B, S, R>
where
    B: DeviceBridge + 'static,
    S: Sleeper,
    R: Rng,
{
    pub fn new(bridge: Arc<B>, calibration: Calibration, sleeper: S, mut rng: R) -> Self {
        let pacer = Pacer::new(PacingPolicy::default(), &mut rng);
        Self {
            bridge,
            calibration,
            pacer,
            sleeper,
            rng,
            debug_sink: None,
            options: SessionOptions::default(),
            stop: Arc::new(AtomicBool::new(false)),
            state: SessionState::Idle,
        }
    }

    pub fn with_pacing(mut self, policy: PacingPolicy) -> Self {
        self.pacer = Pacer::new(policy, &mut self.rng);
        self
    }

    pub fn with_debug_sink(mut self, sink: DebugSink) -> Self {
        self.debug_sink = Some(sink);
        self
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Flag that ends the session before its next cycle or during a rest
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn set_state(&mut self, state: SessionState) {
        debug!("Session {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Run cycles until stopped, the jump limit is reached, or an error occurs.
    /// Any error ends the session; nothing is retried.
    pub async fn run(mut self) -> Result<SessionSummary> {
        let mut summary = SessionSummary::default();
        info!("Session started");

        while !self.stopped() {
            let jump = self.run_cycle().await?;
            summary.jumps += 1;
            if !jump.detection.is_found() {
                summary.misses += 1;
            }

            if self
                .options
                .max_jumps
                .is_some_and(|max| summary.jumps >= max)
            {
                info!("Reached {} jumps", summary.jumps);
                break;
            }

            self.pace().await;
        }

        self.set_state(SessionState::Idle);
        info!(
            "Session finished after {} jumps ({} without a piece)",
            summary.jumps, summary.misses
        );
        Ok(summary)
    }

    /// Capture a screenshot, locate piece and board, and jump
    pub async fn run_cycle(&mut self) -> Result<Jump> {
        self.set_state(SessionState::Capturing);
        let bridge = self.bridge.clone();
        let image = tokio::task::spawn_blocking(move || bridge.capture())
            .await
            .context("Capture task panicked")?
            .context("Failed to capture screenshot")?;
        let raster = Raster::new(image);

        self.set_state(SessionState::Locating);
        let scan = jump_vision::scan(&raster, &self.calibration);
        let detection = scan.detection();
        let touch = self
            .calibration
            .touch_point_for(raster.width(), raster.height());

        let coordinates = detection.coordinates();
        let distance = coordinates.distance();
        let duration_ms = press_duration(distance, &self.calibration);

        info!(
            "Piece ({},{}) | Board ({},{}) | distance {:.1}px | coefficient {:.4} | press {}ms",
            coordinates.piece_x,
            coordinates.piece_y,
            coordinates.board_x,
            coordinates.board_y,
            distance,
            press_coefficient(distance, &self.calibration),
            duration_ms
        );

        let mut jump = Jump {
            detection,
            coordinates,
            distance,
            duration_ms,
            swipe: None,
        };

        if !detection.is_found() {
            if self.options.skip_on_miss {
                warn!("No piece found, skipping this jump");
                return Ok(jump);
            }
            warn!("No piece found, jumping with the shortest press");
        }

        self.set_state(SessionState::Jumping);
        let (dx, dy) = self.pacer.jitter(&mut self.rng);
        let swipe = Swipe {
            x1: touch.x,
            y1: touch.y,
            x2: touch.x + dx,
            y2: touch.y + dy,
            duration_ms,
        };
        let bridge = self.bridge.clone();
        tokio::task::spawn_blocking(move || bridge.swipe(&swipe))
            .await
            .context("Swipe task panicked")?
            .context("Failed to send swipe")?;
        jump.swipe = Some(swipe);

        if let Some(sink) = &self.debug_sink {
            sink.save(&raster, &scan)?;
        }

        Ok(jump)
    }

    /// Wait before the next cycle, taking a rest break when one is due
    async fn pace(&mut self) {
        self.set_state(SessionState::Pacing);
        match self.pacer.next_pause(&mut self.rng) {
            Pause::Short(duration) => {
                debug!("Next jump in {:?}", duration);
                self.sleeper.sleep(duration).await;
            }
            Pause::Rest { seconds, plays } => {
                println!("\nPlayed {} rounds already, taking a break~", plays);
                for remaining in (1..=seconds).rev() {
                    if self.stopped() {
                        break;
                    }
                    countdown(&format!("{}s until the next round...", remaining));
                    self.sleeper.sleep(Duration::from_secs(1)).await;
                }
                countdown("Come on ...\n\n");
            }
        }
    }
}

/// Erase the current terminal line and start over at its first column
const CLEAR_LINE: &str = "\r\x1b[2K";

fn overwrite_line(out: &mut impl Write, text: &str) -> std::io::Result<()> {
    write!(out, "{}{}", CLEAR_LINE, text)?;
    out.flush()
}

/// Rest countdown status on stdout. Write failures are only logged
fn countdown(text: &str) {
    if let Err(e) = overwrite_line(&mut std::io::stdout().lock(), text) {
        debug!("Failed to update countdown: {}", e);
    }
}
