//! # Object Mask Extraction Library
//!
//! Best-effort segmentation of the main object in an everyday photo, without a
//! learned model. Four classical strategies each propose a mask, a scorer rates
//! every proposal against the photo, and the best one wins.
//!
//! ## Core Features
//!
//! - **Four strategies**: Otsu threshold, adaptive threshold, Canny-contour fill
//!   and a rectangle-seeded colour graph cut
//! - **Shared post-processing**: every proposal is cleaned morphologically and
//!   reduced to one solid region
//! - **Scoring**: edge alignment, area plausibility and centredness
//! - **Trait-based generators**: plug custom strategies into the selector
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use object_mask::get_object_mask;
//!
//! let photo = image::open("mug.jpg")?.to_rgb8();
//! let mask = get_object_mask(&photo);
//! mask.save("mug_mask.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Selector
//!
//! ```rust,no_run
//! use object_mask::{MaskSelector, SegmentationConfig, Strategy};
//!
//! let mut config = SegmentationConfig::default();
//! config.graph_cut.iterations = 2;
//!
//! let selector = MaskSelector::builder()
//!     .with_config(config)
//!     .with_strategies([Strategy::Otsu, Strategy::GraphCut])
//!     .build();
//!
//! let photo = image::open("mug.jpg")?.to_rgb8();
//! let selection = selector.select(&photo);
//! println!("{} won with {:.3}", selection.generator, selection.score);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod config;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod scoring;
pub mod pipeline;

// Re-exports for convenience
pub use error::{MaskError, Result};
pub use config::*;
pub use types::*;
pub use traits::*;
pub use algorithms::*;
pub use scoring::{MaskScorer, REJECTED_SCORE, ScoreBreakdown};
pub use pipeline::{MaskSelector, builder::MaskSelectorBuilder};

use image::{GrayImage, RgbImage};

/// Binary (0/255) mask of the main object, same size as `image`.
///
/// Runs all four strategies with the default configuration.
pub fn get_object_mask(image: &RgbImage) -> GrayImage {
    MaskSelector::default().extract(image)
}

/// Load an image file and convert it to RGB
pub fn load_rgb<P: AsRef<std::path::Path>>(path: P) -> Result<RgbImage> {
    Ok(image::open(path)?.to_rgb8())
}

/// Decode an in-memory image (e.g. an upload) and convert it to RGB
pub fn load_rgb_from_bytes(bytes: &[u8]) -> Result<RgbImage> {
    Ok(image::load_from_memory(bytes)?.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use imageproc::region_labelling::{Connectivity, connected_components};

    fn create_test_image() -> RgbImage {
        RgbImage::from_fn(120, 90, |x, y| {
            let (dx, dy) = (x as f32 - 60.0, y as f32 - 45.0);
            if (dx / 30.0).powi(2) + (dy / 20.0).powi(2) <= 1.0 {
                Rgb([30, 90, 200])
            } else {
                Rgb([235, 230, 220])
            }
        })
    }

    #[test]
    fn test_mask_shape_and_values() {
        let image = create_test_image();
        let mask = get_object_mask(&image);

        assert_eq!(mask.dimensions(), image.dimensions());
        assert!(mask.pixels().all(|p| p[0] == BACKGROUND || p[0] == FOREGROUND));

        let labels = connected_components(&mask, Connectivity::Eight, image::Luma([0u8]));
        assert!(labels.pixels().map(|p| p[0]).max().unwrap_or(0) <= 1);
    }

    #[test]
    fn test_selection_report() {
        let selection = MaskSelector::default().select(&create_test_image());
        let report = selection.report();

        assert_eq!(report.candidates.len(), 4);
        assert_eq!(report.width, 120);
        assert!(Strategy::names().contains(&report.winner.as_str()));
        assert!(report.score > REJECTED_SCORE);

        let json = report.to_json().expect("Should serialize");
        let parsed: SelectionReport = serde_json::from_str(&json).expect("Should parse");
        assert_eq!(parsed.winner, report.winner);
        assert_eq!(parsed.candidates.len(), 4);
    }

    #[test]
    fn test_load_from_bytes() {
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(create_test_image())
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("Should encode");

        let decoded = load_rgb_from_bytes(&bytes).expect("Should decode");
        assert_eq!(decoded.dimensions(), (120, 90));
        assert!(matches!(load_rgb_from_bytes(b"not an image"), Err(MaskError::ImageLoad(_))));
    }
}
