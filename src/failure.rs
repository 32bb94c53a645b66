use jump_capture::BridgeError;

/// Operator-facing category of a fatal error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// adb missing, device disconnected or not authorized
    Bridge,
    Other,
}

impl FailureKind {
    pub fn message(&self) -> &'static str {
        match self {
            FailureKind::Bridge => {
                "adb failed! Make sure that 1. adb is installed 2. developer options \
                 and USB debugging are enabled on the phone 3. the phone is connected"
            }
            FailureKind::Other => "The program crashed. Make sure adb is installed.",
        }
    }
}

/// Categorize a fatal error by looking for a bridge failure anywhere in its chain
pub fn classify(error: &anyhow::Error) -> FailureKind {
    if error.chain().any(|cause| cause.is::<BridgeError>()) {
        FailureKind::Bridge
    } else {
        FailureKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_bridge_error_in_chain() {
        let result: anyhow::Result<()> = Err(BridgeError::Replay("gone".into()))
            .context("Screenshot failed")
            .context("Cycle failed");
        let error = result.unwrap_err();
        assert_eq!(classify(&error), FailureKind::Bridge);
    }

    #[test]
    fn test_other_error() {
        let error = anyhow::anyhow!("No calibration for resolution 1x1");
        assert_eq!(classify(&error), FailureKind::Other);
        assert_ne!(FailureKind::Bridge.message(), FailureKind::Other.message());
    }
}
