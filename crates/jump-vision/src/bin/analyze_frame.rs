//! CLI tool to run piece and board detection on a saved screenshot.
//! Usage: cargo run -p jump-vision --features cli --bin analyze_frame -- <screenshot.png> [calibration.json] [output_dir]

use jump_data::{Calibration, CalibrationStore};
use jump_vision::{render_overlay, scan, Raster};
use std::path::PathBuf;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage: {} <screenshot.png> [calibration.json] [output_dir]",
            args[0]
        );
        std::process::exit(1);
    }

    let input_path = PathBuf::from(&args[1]);
    let calibration = match args.get(2) {
        Some(path) => CalibrationStore::load_file(&PathBuf::from(path)).unwrap_or_else(|e| {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }),
        None => Calibration::default(),
    };
    let output_dir = args
        .get(3)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./debug_output"));
    let _ = std::fs::create_dir_all(&output_dir);

    println!("Loading image: {}", input_path.display());
    let img = image::open(&input_path)
        .expect("Failed to open image")
        .to_rgb8();
    let raster = Raster::new(img);
    println!("Image size: {}x{}", raster.width(), raster.height());

    println!("\n=== Detection ===");
    let result = scan(&raster, &calibration);
    println!("Playfield start: y={}", result.start_y);

    match result.piece {
        Some(piece) => println!(
            "Piece: ({}, {}) from {} pixels",
            piece.x, piece.y, piece.pixel_count
        ),
        None => println!("Piece: NOT FOUND"),
    }
    if let Some(board) = result.board {
        println!(
            "Board: ({}, {}), top vertex y={}, center marker {}",
            board.x,
            board.y,
            board.top_y,
            if board.marker_hit { "found" } else { "not found" }
        );
    }

    let coordinates = result.detection().coordinates();
    println!("Distance: {:.1}px", coordinates.distance());

    match serde_json::to_string_pretty(&result) {
        Ok(json) => {
            let _ = std::fs::write(output_dir.join("scan.json"), json);
        }
        Err(e) => eprintln!("Failed to serialize scan: {}", e),
    }

    let overlay = render_overlay(&raster, &result);
    let overlay_path = output_dir.join("overlay.png");
    if let Err(e) = overlay.save(&overlay_path) {
        eprintln!("Failed to save {}: {}", overlay_path.display(), e);
    }

    println!("\nDebug output saved to: {}", output_dir.display());
}
