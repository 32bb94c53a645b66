use crate::{Piece, Raster, Rgb};
use jump_data::Calibration;
use serde::Serialize;
use tracing::debug;

/// Located landing board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Board {
    pub x: i32,
    pub y: i32,
    /// First row that contained board pixels, i.e. the board's top vertex
    pub top_y: i32,
    /// Whether the center marker of a perfect jump fixed `y`
    pub marker_hit: bool,
}

/// Find the next board relative to the piece.
///
/// The board is the first thing below `start_y` that differs from the row's
/// background color. Only its top row is measured: the top vertex sits
/// straight above the board center, so the centroid of that row gives X.
/// Y follows from the 30° grid the boards are laid out on, unless the
/// center marker of a perfect previous jump pins it exactly.
pub fn locate_board(
    raster: &Raster,
    start_y: u32,
    piece: &Piece,
    calibration: &Calibration,
) -> Board {
    let (w, h) = (raster.width(), raster.height());
    let tuning = &calibration.detector;
    let body_width = calibration.piece_body_width as i32;
    let reference_x = w / tuning.reference_column_divisor.max(1);

    // Scan only the board's side of the piece; the music note sprite can sit on the other one
    let (x_start, x_end) = if piece.x < (w / 2) as i32 {
        (piece.x.max(0) as u32, w.saturating_sub(1))
    } else {
        (0, (piece.x as u32).min(w.saturating_sub(1)))
    };

    let mut edge: Option<(i32, i32)> = None;

    for y in start_y..h {
        let background = raster.rgb(reference_x, y);
        let mut x_sum = 0u64;
        let mut count = 0u32;

        for x in x_start..=x_end {
            // A piece taller than the next board would otherwise be taken for it
            if (x as i32 - piece.x).abs() < body_width {
                continue;
            }
            if raster.rgb(x, y).distance(background) > tuning.board_contrast {
                x_sum += x as u64;
                count += 1;
            }
        }

        if count > 0 {
            edge = Some(((x_sum / count as u64) as i32, y as i32));
            break;
        }
    }

    // No edge: board falls back to column 0, row 0
    let (board_x, top_y) = edge.unwrap_or_else(|| {
        debug!("No board edge found below y={}", start_y);
        (0, 0)
    });

    let mut board = Board {
        x: board_x,
        y: diagonal_y(piece.x, piece.y, board_x),
        top_y,
        marker_hit: false,
    };

    if let Some(y) = find_marker(raster, board.x, board.top_y, calibration) {
        board.y = y;
        board.marker_hit = true;
    }

    debug!(
        "Board at ({}, {}), top vertex y={}, marker {}",
        board.x,
        board.y,
        board.top_y,
        if board.marker_hit { "hit" } else { "absent" }
    );
    board
}

/// Board center Y from the piece position: boards sit on 30° diagonals, so
/// the vertical offset is the horizontal one times tan(30°).
pub fn diagonal_y(piece_x: i32, piece_y: i32, board_x: i32) -> i32 {
    let dx = (board_x - piece_x).abs() as f64;
    (piece_y as f64 - dx / 3f64.sqrt()) as i32
}

/// Scan down the board's center column for the marker color
fn find_marker(raster: &Raster, x: i32, top_y: i32, calibration: &Calibration) -> Option<i32> {
    let tuning = &calibration.detector;
    let (w, h) = (raster.width(), raster.height());
    if x < 0 || x as u32 >= w || top_y < 0 || top_y as u32 >= h {
        return None;
    }

    let marker = Rgb(tuning.marker_color);
    let first = top_y as u32;
    let last = first.saturating_add(tuning.marker_search_depth).min(h - 1);

    (first..=last)
        .find(|&y| raster.rgb(x as u32, y).distance(marker) <= tuning.marker_tolerance)
        .map(|y| y as i32)
}
