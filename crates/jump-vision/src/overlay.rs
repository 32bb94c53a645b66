use crate::{Raster, Scan};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};

const PIECE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const BOARD_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const JUMP_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Copy of the screenshot with crosshairs through the piece (red) and the
/// board (yellow), a ring on the board's top vertex and the jump between them (green)
pub fn render_overlay(raster: &Raster, scan: &Scan) -> RgbImage {
    let mut image = raster.image().clone();
    let (w, h) = (image.width() as f32, image.height() as f32);

    let coordinates = scan.detection().coordinates();
    let piece = (coordinates.piece_x as f32, coordinates.piece_y as f32);
    let board = (coordinates.board_x as f32, coordinates.board_y as f32);

    draw_line_segment_mut(&mut image, (0.0, piece.1), (w, piece.1), PIECE_COLOR);
    draw_line_segment_mut(&mut image, (piece.0, 0.0), (piece.0, h), PIECE_COLOR);

    draw_line_segment_mut(&mut image, (0.0, board.1), (w, board.1), BOARD_COLOR);
    draw_line_segment_mut(&mut image, (board.0, 0.0), (board.0, h), BOARD_COLOR);
    if let Some(located) = scan.board {
        draw_hollow_circle_mut(&mut image, (located.x, located.top_y), 5, BOARD_COLOR);
    }

    draw_line_segment_mut(&mut image, board, piece, JUMP_COLOR);

    image
}
