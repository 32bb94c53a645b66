use anyhow::{Context, Result};
use jump_vision::{render_overlay, Raster, Scan};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes annotated screenshots of each jump for offline inspection
#[derive(Debug, Clone)]
pub struct DebugSink {
    dir: PathBuf,
}

impl DebugSink {
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create debug directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save the screenshot with piece, board and jump drawn on it.
    /// Files are named after the local time, one per second.
    pub fn save(&self, raster: &Raster, scan: &Scan) -> Result<PathBuf> {
        let name = chrono::Local::now().format("%Y-%m-%d-%H-%M-%S").to_string();
        let path = self.dir.join(format!("{}.png", name));

        render_overlay(raster, scan)
            .save(&path)
            .with_context(|| format!("Failed to save {}", path.display()))?;

        debug!("Debug screenshot saved to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use jump_vision::{Board, Piece};

    #[test]
    fn test_save_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DebugSink::create(dir.path().join("nested")).unwrap();
        let raster = Raster::new(RgbImage::new(40, 60));
        let scan = Scan {
            start_y: 0,
            piece: Some(Piece {
                x: 10,
                y: 50,
                pixel_count: 1,
            }),
            board: Some(Board {
                x: 30,
                y: 20,
                top_y: 5,
                marker_hit: false,
            }),
        };

        let path = sink.save(&raster, &scan).unwrap();
        assert!(path.starts_with(sink.dir()));
        assert_eq!(path.extension().unwrap(), "png");

        let saved = image::open(&path).unwrap().to_rgb8();
        assert_eq!(saved.dimensions(), (40, 60));
        assert_eq!(saved.get_pixel(10, 0).0, [255, 0, 0]);
        // Ring on the board's top vertex
        assert_eq!(saved.get_pixel(35, 5).0, [255, 255, 0]);
    }
}
