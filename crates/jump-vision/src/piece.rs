use crate::Raster;
use jump_data::Calibration;
use serde::Serialize;
use tracing::debug;

/// Located piece: horizontal centroid and logical center row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Piece {
    pub x: i32,
    pub y: i32,
    /// Number of pixels that matched the piece color
    pub pixel_count: u32,
}

/// Find the piece by its body color in rows `start_y..height`.
///
/// The X centroid of all matching pixels is the piece center. The lowest
/// matching row is the bottom of the piece base; the center sits half a
/// base height above it.
///
/// Returns `None` when no pixel matches.
pub fn locate_piece(raster: &Raster, start_y: u32, calibration: &Calibration) -> Option<Piece> {
    let (w, h) = (raster.width(), raster.height());
    let tuning = &calibration.detector;

    let mut x_sum = 0u64;
    let mut count = 0u32;
    let mut y_max = 0u32;

    for y in start_y..h {
        for x in 0..w {
            if tuning.is_piece_color(raster.rgb(x, y).0) {
                x_sum += x as u64;
                count += 1;
                y_max = y_max.max(y);
            }
        }
    }

    if count == 0 {
        debug!("No piece pixels below y={}", start_y);
        return None;
    }

    let piece = Piece {
        x: (x_sum / count as u64) as i32,
        y: y_max as i32 - (calibration.piece_base_height / 2) as i32,
        pixel_count: count,
    };
    debug!(
        "Piece at ({}, {}) from {} pixels, base row {}",
        piece.x, piece.y, count, y_max
    );
    Some(piece)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    const PIECE: image::Rgb<u8> = image::Rgb([55, 58, 100]);

    fn frame_with_piece(x0: u32, x1: u32, y0: u32, y1: u32) -> Raster {
        let mut image = RgbImage::from_pixel(400, 600, image::Rgb([220, 220, 230]));
        for y in y0..y1 {
            for x in x0..x1 {
                image.put_pixel(x, y, PIECE);
            }
        }
        Raster::new(image)
    }

    #[test]
    fn test_rectangle_centroid_and_base() {
        // Columns 100..121 -> mean 110, bottom row 449
        let raster = frame_with_piece(100, 121, 380, 450);
        let calibration = Calibration::default();

        let piece = locate_piece(&raster, 0, &calibration).unwrap();
        assert_eq!(piece.x, 110);
        assert_eq!(piece.y, 449 - 20);
        assert_eq!(piece.pixel_count, 21 * 70);
    }

    #[test]
    fn test_centroid_uses_integer_division() {
        // Columns 10 and 11 -> 21 / 2 = 10
        let raster = frame_with_piece(10, 12, 300, 301);
        let piece = locate_piece(&raster, 0, &Calibration::default()).unwrap();
        assert_eq!(piece.x, 10);
    }

    #[test]
    fn test_rows_above_start_are_ignored() {
        let raster = frame_with_piece(100, 121, 100, 150);
        assert!(locate_piece(&raster, 200, &Calibration::default()).is_none());
        assert!(locate_piece(&raster, 120, &Calibration::default()).is_some());
    }

    #[test]
    fn test_anti_aliased_edge_not_piece() {
        let mut image = RgbImage::from_pixel(50, 50, image::Rgb([220, 220, 230]));
        // Just outside every band
        image.put_pixel(5, 5, image::Rgb([50, 58, 100]));
        image.put_pixel(6, 5, image::Rgb([55, 63, 100]));
        image.put_pixel(7, 5, image::Rgb([55, 58, 110]));
        let raster = Raster::new(image);
        assert!(locate_piece(&raster, 0, &Calibration::default()).is_none());
    }
}
