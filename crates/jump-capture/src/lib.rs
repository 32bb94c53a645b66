use image::RgbImage;
use regex::Regex;
use std::process::ExitStatus;
use std::sync::OnceLock;

pub mod adb;
pub mod replay;

pub use adb::AdbBridge;
pub use replay::ReplayBridge;

/// Failure of the device-control bridge.
///
/// Every variant means the device could not be driven; none of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("failed to run `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {status}: {stderr}")]
    Exit {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("failed to decode screenshot")]
    Decode(#[from] image::ImageError),
    #[error("replay source: {0}")]
    Replay(String),
}

/// A touch-hold gesture from one screen point to another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swipe {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub duration_ms: u32,
}

/// Properties reported by the device
#[derive(Debug, Clone, Default)]
pub struct DeviceInfo {
    pub manufacturer: String,
    pub version: String,
    pub screen_size: String,
}

/// Something that can screenshot a device and inject touches into it.
///
/// All calls block until the device has answered.
pub trait DeviceBridge: Send + Sync {
    /// Take a screenshot
    fn capture(&self) -> Result<RgbImage, BridgeError>;

    /// Inject a swipe gesture
    fn swipe(&self, swipe: &Swipe) -> Result<(), BridgeError>;

    /// Run a shell command on the device and return its stdout
    fn shell(&self, args: &[&str]) -> Result<String, BridgeError>;

    /// Screen resolution as `"<width>x<height>"`, `None` if the device reported nothing parseable
    fn screen_size(&self) -> Result<Option<String>, BridgeError> {
        let output = self.shell(&["wm", "size"])?;
        Ok(parse_resolution(&output))
    }

    fn device_info(&self) -> Result<DeviceInfo, BridgeError> {
        Ok(DeviceInfo {
            manufacturer: self.shell(&["getprop", "ro.fota.oem"])?.trim().to_string(),
            version: self
                .shell(&["getprop", "ro.build.software.version"])?
                .trim()
                .to_string(),
            screen_size: self.shell(&["wm", "size"])?.trim().to_string(),
        })
    }
}

impl<B: DeviceBridge + ?Sized> DeviceBridge for Box<B> {
    fn capture(&self) -> Result<RgbImage, BridgeError> {
        (**self).capture()
    }

    fn swipe(&self, swipe: &Swipe) -> Result<(), BridgeError> {
        (**self).swipe(swipe)
    }

    fn shell(&self, args: &[&str]) -> Result<String, BridgeError> {
        (**self).shell(args)
    }
}

/// Extract the first `WxH` token from `wm size` output.
///
/// `wm size` prints the physical size first and an override size after it,
/// so the physical size wins.
pub fn parse_resolution(output: &str) -> Option<String> {
    static SIZE: OnceLock<Regex> = OnceLock::new();
    let re = SIZE.get_or_init(|| Regex::new(r"(\d+)x(\d+)").expect("valid regex"));
    re.find(output).map(|m| m.as_str().to_string())
}
