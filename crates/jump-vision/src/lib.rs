use jump_data::Calibration;
use serde::Serialize;
use tracing::debug;

pub mod board;
pub mod overlay;
pub mod piece;
pub mod playfield;
pub mod raster;

pub use board::{locate_board, Board};
pub use overlay::render_overlay;
pub use piece::{locate_piece, Piece};
pub use playfield::find_start_y;
pub use raster::{Raster, Rgb};

/// Piece and board centers in screen pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Coordinates {
    pub piece_x: i32,
    pub piece_y: i32,
    pub board_x: i32,
    pub board_y: i32,
}

impl Coordinates {
    /// Euclidean distance between piece and board
    pub fn distance(&self) -> f64 {
        let dx = (self.board_x - self.piece_x) as f64;
        let dy = (self.board_y - self.piece_y) as f64;
        dx.hypot(dy)
    }
}

/// Outcome of locating piece and board in one screenshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    Found(Coordinates),
    /// No piece pixel matched
    NotFound,
}

impl Detection {
    pub fn is_found(&self) -> bool {
        matches!(self, Detection::Found(_))
    }

    /// Coordinates to act on; `NotFound` degrades to all zeros
    pub fn coordinates(&self) -> Coordinates {
        match self {
            Detection::Found(coordinates) => *coordinates,
            Detection::NotFound => Coordinates::default(),
        }
    }
}

/// Everything found while scanning one screenshot
#[derive(Debug, Clone, Serialize)]
pub struct Scan {
    pub start_y: u32,
    pub piece: Option<Piece>,
    pub board: Option<Board>,
}

impl Scan {
    pub fn detection(&self) -> Detection {
        match (self.piece, self.board) {
            (Some(piece), Some(board)) => Detection::Found(Coordinates {
                piece_x: piece.x,
                piece_y: piece.y,
                board_x: board.x,
                board_y: board.y,
            }),
            _ => Detection::NotFound,
        }
    }
}

/// Run playfield, piece and board detection on a screenshot
pub fn scan(raster: &Raster, calibration: &Calibration) -> Scan {
    let start_y = find_start_y(
        raster,
        calibration.under_game_score_y,
        calibration.detector.scan_stride,
    );
    let piece = locate_piece(raster, start_y, calibration);
    let board = piece.map(|p| locate_board(raster, start_y, &p, calibration));

    debug!(
        "Scan of {}x{}: start_y={}, piece={:?}, board={:?}",
        raster.width(),
        raster.height(),
        start_y,
        piece,
        board
    );

    Scan {
        start_y,
        piece,
        board,
    }
}

/// Locate piece and board. Deterministic for a given raster and calibration.
pub fn locate(raster: &Raster, calibration: &Calibration) -> Detection {
    scan(raster, calibration).detection()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    /// Score area on top, uniform background, a piece on the left and a board on the right
    fn make_frame() -> Raster {
        let mut image = RgbImage::from_pixel(1080, 1920, image::Rgb([210, 200, 230]));

        // Score digits
        for y in 100..160 {
            for x in 80..200 {
                image.put_pixel(x, y, image::Rgb([40, 40, 40]));
            }
        }

        // Board: top vertex row 760, columns 700..=800
        for y in 760..900 {
            for x in 700..801 {
                image.put_pixel(x, y, image::Rgb([150, 150, 150]));
            }
        }

        // Piece body: columns 280..=320, bottom row 1219
        for y in 1100..1220 {
            for x in 280..321 {
                image.put_pixel(x, y, image::Rgb([54, 60, 102]));
            }
        }

        Raster::new(image)
    }

    #[test]
    fn test_locate_full_frame() {
        let raster = make_frame();
        let calibration = Calibration::default();

        let scan = scan(&raster, &calibration);
        // Sampled rows 300, 350, ... 750 are uniform, 800 crosses the board
        assert_eq!(scan.start_y, 750);

        let coordinates = scan.detection().coordinates();
        assert_eq!(coordinates.piece_x, 300);
        assert_eq!(coordinates.piece_y, 1219 - 20);
        assert_eq!(coordinates.board_x, 750);
        assert_eq!(scan.board.unwrap().top_y, 760);
        // 1199 - 450 / sqrt(3) = 939.19
        assert_eq!(coordinates.board_y, 939);
    }

    #[test]
    fn test_locate_is_deterministic() {
        let raster = make_frame();
        let calibration = Calibration::default();
        let first = locate(&raster, &calibration);
        for _ in 0..3 {
            assert_eq!(locate(&raster, &calibration), first);
        }
    }

    #[test]
    fn test_no_piece_is_all_zero() {
        let raster = Raster::new(RgbImage::from_pixel(200, 400, image::Rgb([210, 200, 230])));
        let detection = locate(&raster, &Calibration::default());
        assert_eq!(detection, Detection::NotFound);
        assert_eq!(detection.coordinates(), Coordinates::default());
        assert_eq!(detection.coordinates().distance(), 0.0);
    }

    #[test]
    fn test_distance() {
        let coordinates = Coordinates {
            piece_x: 0,
            piece_y: 0,
            board_x: 300,
            board_y: 400,
        };
        assert_eq!(coordinates.distance(), 500.0);
    }
}
