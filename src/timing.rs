use jump_data::Calibration;

/// Press coefficient for a jump of `distance` pixels.
///
/// The configured coefficient is exact at the reference distance and shrinks
/// linearly beyond it.
pub fn press_coefficient(distance: f64, calibration: &Calibration) -> f64 {
    let timing = &calibration.timing;
    calibration.press_coefficient
        - (distance - timing.reference_distance) * timing.coefficient_decay
}

/// How long to hold the touch, in milliseconds, to jump `distance` pixels
pub fn press_duration(distance: f64, calibration: &Calibration) -> u32 {
    let coefficient = press_coefficient(distance, calibration);
    (distance * coefficient).max(calibration.timing.min_press_ms) as u32
}
