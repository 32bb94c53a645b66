use crate::{BridgeError, DeviceBridge, Swipe};
use image::{ImageFormat, RgbImage};
use std::process::Command;
use tracing::debug;

/// Drives an Android device through the `adb` command line tool
#[derive(Debug, Clone)]
pub struct AdbBridge {
    program: String,
}

impl AdbBridge {
    /// `program` is the adb executable, either a name on `PATH` or a full path
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run adb with the given arguments and return raw stdout
    fn run(&self, args: &[&str]) -> Result<Vec<u8>, BridgeError> {
        debug!("{} {}", self.program, args.join(" "));
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| BridgeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(BridgeError::Exit {
                command: format!("{} {}", self.program, args.join(" ")),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

impl DeviceBridge for AdbBridge {
    fn capture(&self) -> Result<RgbImage, BridgeError> {
        // exec-out keeps the PNG bytes intact; `shell` would translate line endings on old devices
        let png = self.run(&["exec-out", "screencap", "-p"])?;
        let image = image::load_from_memory_with_format(&png, ImageFormat::Png)?;
        Ok(image.to_rgb8())
    }

    fn swipe(&self, swipe: &Swipe) -> Result<(), BridgeError> {
        let args = swipe_args(swipe);
        let mut command = vec!["shell", "input", "swipe"];
        command.extend(args.iter().map(String::as_str));
        self.run(&command)?;
        Ok(())
    }

    fn shell(&self, args: &[&str]) -> Result<String, BridgeError> {
        let mut command = vec!["shell"];
        command.extend_from_slice(args);
        let stdout = self.run(&command)?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }
}

/// Arguments of `input swipe`: start, end, then duration in milliseconds
fn swipe_args(swipe: &Swipe) -> [String; 5] {
    [
        swipe.x1.to_string(),
        swipe.y1.to_string(),
        swipe.x2.to_string(),
        swipe.y2.to_string(),
        swipe.duration_ms.to_string(),
    ]
}
