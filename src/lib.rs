pub mod debug_sink;
pub mod failure;
pub mod session;
pub mod timing;

pub use debug_sink::DebugSink;
pub use failure::{classify, FailureKind};
pub use session::{
    Jump, Session, SessionOptions, SessionState, SessionSummary, Sleeper, TokioSleeper,
};
pub use timing::{press_coefficient, press_duration};

/// Install the tracing subscriber. `RUST_LOG` wins over the built-in default.
pub fn init_tracing(verbose: bool) {
    let default = if verbose {
        "jump_bot=debug,jump_capture=debug,jump_vision=debug,jump_state=debug,jump_data=debug"
    } else {
        "jump_bot=info,jump_capture=info,jump_vision=info,jump_data=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use jump_data::{CalibrationStore, TimingTuning};
    use std::path::Path;

    const SHIPPED: [&str; 4] = ["default", "720x1280", "1080x1920", "1440x2560"];

    fn store() -> CalibrationStore {
        CalibrationStore::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("config"))
    }

    #[test]
    fn test_shipped_calibrations_parse() {
        for resolution in SHIPPED {
            let calibration = store().load(resolution).unwrap();
            assert!(calibration.press_coefficient > 0.0, "{}", resolution);
            assert!(calibration.piece_body_width > 0, "{}", resolution);
        }

        let large = store().load("1440x2560").unwrap();
        assert_eq!(large.timing.reference_distance, 480.0);
        assert_eq!(large.detector.scan_stride, 50);
    }

    #[test]
    fn test_shipped_calibrations_keep_timing_model() {
        let defaults = TimingTuning::default();
        for resolution in SHIPPED {
            let calibration = store().load(resolution).unwrap();
            assert_eq!(calibration.timing.reference_distance, defaults.reference_distance);
            assert_eq!(calibration.timing.coefficient_decay, defaults.coefficient_decay);
            assert_eq!(
                press_coefficient(480.0, &calibration),
                calibration.press_coefficient,
                "{}",
                resolution
            );
            assert_eq!(
                press_duration(480.0, &calibration),
                (480.0 * calibration.press_coefficient) as u32,
                "{}",
                resolution
            );
        }

        let small = store().load("720x1280").unwrap();
        assert_eq!(press_duration(480.0, &small), 1002);
    }
}
