use crate::Raster;
use tracing::debug;

/// Find the top row of the playfield.
///
/// Every row of the game background is a single color, so the first sampled
/// row below `offset` that is not uniform holds part of the piece or a board.
/// Rows are sampled every `stride` pixels and the result backs up one stride,
/// since the real transition lies somewhere between the two samples.
///
/// Returns 0 when every sampled row is uniform.
pub fn find_start_y(raster: &Raster, offset: u32, stride: u32) -> u32 {
    let (w, h) = (raster.width(), raster.height());
    let stride = stride.max(1);

    for y in (offset..h).step_by(stride as usize) {
        let first = raster.rgb(0, y);
        if (1..w).any(|x| raster.rgb(x, y) != first) {
            let start_y = y.saturating_sub(stride);
            debug!("Playfield starts near y={} (first mixed row {})", start_y, y);
            return start_y;
        }
    }

    debug!("No playfield transition below y={}", offset);
    0
}
