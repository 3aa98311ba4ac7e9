use image::{DynamicImage, GrayImage, RgbImage, RgbaImage, imageops::{self, FilterType}};
use object_mask::MaskStats;
use tracing::debug;

use crate::{
    assets::FaceAssets,
    color::{dominant_color, tint_overlay},
    config::CharacterConfig,
    error::{CharacterError, Result},
};

/// Where the face layers land on the canvas (origins may be negative or off-canvas).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacePlacement {
    pub eyes_origin: (i64, i64),
    pub eyes_size: (u32, u32),
    pub mouth_origin: (i64, i64),
    pub mouth_size: (u32, u32),
}

/// Size and place the face parts around the object's centroid.
///
/// An empty mask is treated as a full-frame object centred on the image.
pub fn face_placement(mask: &GrayImage, config: &CharacterConfig) -> FacePlacement {
    let (width, height) = mask.dimensions();
    let stats = MaskStats::from_mask(mask);
    let ((cx, cy), (x1, y1, x2, y2)) = match (stats.centroid, stats.bounds) {
        (Some([cx, cy]), Some(([x1, y1], [x2, y2]))) => ((cx as i64, cy as i64), (x1, y1, x2, y2)),
        _ => (
            ((width / 2) as i64, (height / 2) as i64),
            (0, 0, width.saturating_sub(1), height.saturating_sub(1)),
        ),
    };
    let object_width = (x2 - x1).max(1) as f64;
    let object_height = (y2 - y1).max(1) as f64;

    let scaled = |[fw, fh]: [f64; 2], [min_w, min_h]: [u32; 2]| {
        (
            ((object_width * fw) as u32).max(min_w),
            ((object_height * fh) as u32).max(min_h),
        )
    };
    let eyes_size = scaled(config.eyes_scale, config.min_eyes_size);
    let mouth_size = scaled(config.mouth_scale, config.min_mouth_size);

    let lift = if object_height / object_width > config.tall_ratio {
        (object_height * config.tall_lift) as i64
    } else {
        0
    };

    FacePlacement {
        eyes_origin: (
            cx - (eyes_size.0 / 2) as i64,
            cy - (object_height * config.eyes_rise) as i64 - lift,
        ),
        eyes_size,
        mouth_origin: (
            cx - (mouth_size.0 / 2) as i64,
            cy + (object_height * config.mouth_drop) as i64 - lift,
        ),
        mouth_size,
    }
}

/// Tint the object with the photo's dominant colour and draw a face on it.
///
/// The photo is first resized to the mask's dimensions; the result has those
/// dimensions too.
pub fn compose_character(
    original: &RgbImage,
    mask: &GrayImage,
    faces: &FaceAssets,
    config: &CharacterConfig,
) -> Result<RgbaImage> {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 || original.width() == 0 || original.height() == 0 {
        return Err(CharacterError::EmptyMask {
            mask_width: width,
            mask_height: height,
        });
    }

    let resized = if original.dimensions() == (width, height) {
        original.clone()
    } else {
        imageops::resize(original, width, height, FilterType::Triangle)
    };
    let color = dominant_color(&resized);
    let mut canvas = DynamicImage::ImageRgb8(resized).to_rgba8();
    imageops::overlay(&mut canvas, &tint_overlay(mask, color, config.overlay_opacity), 0, 0);

    let placement = face_placement(mask, config);
    debug!(?placement, ?color, "placing face");

    let (ew, eh) = placement.eyes_size;
    let eyes = imageops::resize(&faces.eyes, ew, eh, FilterType::Triangle);
    imageops::overlay(&mut canvas, &eyes, placement.eyes_origin.0, placement.eyes_origin.1);

    let (mw, mh) = placement.mouth_size;
    let mouth = imageops::resize(&faces.mouth, mw, mh, FilterType::Triangle);
    imageops::overlay(&mut canvas, &mouth, placement.mouth_origin.0, placement.mouth_origin.1);

    Ok(canvas)
}
