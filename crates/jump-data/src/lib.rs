use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Resolution key used when the device reports nothing parseable.
pub const DEFAULT_RESOLUTION: &str = "default";

/// Screen point in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub x: i32,
    pub y: i32,
}

/// Inclusive band of accepted values for one color channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelBand {
    pub min: u8,
    pub max: u8,
}

impl ChannelBand {
    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: u8) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Pixel thresholds of the detector.
///
/// None of these have a principled derivation: they were tuned by hand
/// against screenshots of the game on a 1080x1920 device. Anti-aliased piece
/// edges fall outside the piece bands on purpose, and the board contrast is
/// the smallest value that ignores the background gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectorTuning {
    /// Row stride of the playfield scan
    pub scan_stride: u32,
    pub piece_red: ChannelBand,
    pub piece_green: ChannelBand,
    pub piece_blue: ChannelBand,
    /// The board reference color is sampled at `width / reference_column_divisor`
    pub reference_column_divisor: u32,
    /// Summed channel difference above which a pixel belongs to the board
    pub board_contrast: u32,
    /// Dot rendered at the target center after a perfect jump
    pub marker_color: [u8; 3],
    pub marker_tolerance: u32,
    /// Rows scanned below the board top vertex when looking for the marker
    pub marker_search_depth: u32,
}

impl Default for DetectorTuning {
    fn default() -> Self {
        Self {
            scan_stride: 50,
            piece_red: ChannelBand::new(51, 59),
            piece_green: ChannelBand::new(54, 62),
            piece_blue: ChannelBand::new(96, 109),
            reference_column_divisor: 8,
            board_contrast: 20,
            marker_color: [245, 245, 245],
            marker_tolerance: 0,
            marker_search_depth: 200,
        }
    }
}

impl DetectorTuning {
    pub fn is_piece_color(&self, rgb: [u8; 3]) -> bool {
        self.piece_red.contains(rgb[0])
            && self.piece_green.contains(rgb[1])
            && self.piece_blue.contains(rgb[2])
    }
}

/// Constants of the press-duration model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimingTuning {
    /// Distance at which the configured coefficient applies unchanged
    pub reference_distance: f64,
    /// Coefficient decrease per pixel beyond the reference distance.
    /// Longer presses overshoot slightly, so the coefficient shrinks with distance.
    pub coefficient_decay: f64,
    /// Shortest press ever sent, in milliseconds
    pub min_press_ms: f64,
    /// Touch point height on a screen `reference_height` pixels tall
    pub touch_y: u32,
    pub reference_height: u32,
}

impl Default for TimingTuning {
    fn default() -> Self {
        Self {
            reference_distance: 480.0,
            coefficient_decay: 0.00065,
            min_press_ms: 200.0,
            touch_y: 1584,
            reference_height: 1920,
        }
    }
}

/// Per-resolution calibration of a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Calibration {
    /// Rows above this offset belong to the score UI
    pub under_game_score_y: u32,
    pub press_coefficient: f64,
    /// Height of the piece base; the logical center sits half of it above the lowest piece row
    pub piece_base_height: u32,
    /// Columns closer than this to the piece center are never treated as board
    pub piece_body_width: u32,
    pub swipe: TouchPoint,
    pub detector: DetectorTuning,
    pub timing: TimingTuning,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            under_game_score_y: 300,
            press_coefficient: 1.392,
            piece_base_height: 40,
            piece_body_width: 70,
            swipe: TouchPoint { x: 500, y: 1600 },
            detector: DetectorTuning::default(),
            timing: TimingTuning::default(),
        }
    }
}

impl Calibration {
    /// Touch point for a screen of the given size: horizontally centered,
    /// at the same relative height as on the reference 1920px screen.
    pub fn touch_point_for(&self, width: u32, height: u32) -> TouchPoint {
        TouchPoint {
            x: (width / 2) as i32,
            y: (self.timing.touch_y as u64 * height as u64
                / self.timing.reference_height.max(1) as u64) as i32,
        }
    }
}

/// Resolves device resolutions to calibration files in a directory.
///
/// Expects `dir/{resolution}.json`, e.g. `config/1080x1920.json`.
#[derive(Debug, Clone)]
pub struct CalibrationStore {
    dir: PathBuf,
}

impl CalibrationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, resolution: &str) -> PathBuf {
        self.dir.join(format!("{}.json", resolution))
    }

    /// Load the calibration for a resolution string such as `"1080x1920"`
    pub fn load(&self, resolution: &str) -> Result<Calibration> {
        let path = self.path_for(resolution);
        let calibration = Self::load_file(&path)
            .with_context(|| format!("No calibration for resolution {}", resolution))?;
        tracing::info!("Loaded calibration {}", path.display());
        Ok(calibration)
    }

    /// Load a single calibration file
    pub fn load_file(path: &Path) -> Result<Calibration> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}
