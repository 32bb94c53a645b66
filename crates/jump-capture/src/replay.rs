use crate::{BridgeError, DeviceBridge, Swipe};
use anyhow::{Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Stands in for a device by replaying saved screenshots.
///
/// Captures cycle through the PNG files of a directory in name order.
/// Swipes are only logged, so a whole session can be dry-run offline.
#[derive(Debug)]
pub struct ReplayBridge {
    frames: Vec<PathBuf>,
    next: AtomicUsize,
    screen_size: (u32, u32),
}

impl ReplayBridge {
    pub fn open(dir: &Path) -> Result<Self> {
        let mut frames: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read replay directory {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .map(|ext| ext.eq_ignore_ascii_case("png"))
                    .unwrap_or(false)
            })
            .collect();
        frames.sort();

        let first = frames
            .first()
            .ok_or_else(|| anyhow::anyhow!("No PNG screenshots in {}", dir.display()))?;
        let screen_size = image::image_dimensions(first)
            .with_context(|| format!("Failed to read {}", first.display()))?;

        info!(
            "Replaying {} screenshot(s) from {} ({}x{})",
            frames.len(),
            dir.display(),
            screen_size.0,
            screen_size.1
        );

        Ok(Self {
            frames,
            next: AtomicUsize::new(0),
            screen_size,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl DeviceBridge for ReplayBridge {
    fn capture(&self) -> Result<RgbImage, BridgeError> {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.frames.len();
        let path = &self.frames[index];
        let image = image::open(path)
            .map_err(|e| BridgeError::Replay(format!("{}: {}", path.display(), e)))?;
        Ok(image.to_rgb8())
    }

    fn swipe(&self, swipe: &Swipe) -> Result<(), BridgeError> {
        info!(
            "[replay] swipe ({},{}) -> ({},{}) for {}ms",
            swipe.x1, swipe.y1, swipe.x2, swipe.y2, swipe.duration_ms
        );
        Ok(())
    }

    fn shell(&self, args: &[&str]) -> Result<String, BridgeError> {
        Ok(match args {
            ["wm", "size"] => format!(
                "Physical size: {}x{}\n",
                self.screen_size.0, self.screen_size.1
            ),
            ["getprop", _] => "replay\n".to_string(),
            _ => String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_frame(dir: &Path, name: &str, color: [u8; 3]) {
        RgbImage::from_pixel(12, 20, image::Rgb(color))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn test_replay_cycles_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(dir.path(), "b.png", [0, 0, 255]);
        write_frame(dir.path(), "a.png", [255, 0, 0]);
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let bridge = ReplayBridge::open(dir.path()).unwrap();
        assert_eq!(bridge.frame_count(), 2);

        assert_eq!(bridge.capture().unwrap().get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(bridge.capture().unwrap().get_pixel(0, 0).0, [0, 0, 255]);
        assert_eq!(bridge.capture().unwrap().get_pixel(0, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_replay_reports_frame_size() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(dir.path(), "only.png", [10, 10, 10]);

        let bridge = ReplayBridge::open(dir.path()).unwrap();
        assert_eq!(bridge.screen_size().unwrap().as_deref(), Some("12x20"));
    }

    #[test]
    fn test_empty_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ReplayBridge::open(dir.path()).is_err());
    }
}
