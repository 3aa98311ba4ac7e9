use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_ellipse_mut};
use rand::Rng;
use tracing::{debug, info};

use crate::{
    error::{CharacterError, Result},
    style::Style,
};

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];
const SIMPLE_FACE_SIZE: (u32, u32) = (140, 100);
const STROKE_RADIUS: i32 = 2;
const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Eye and mouth layers composited onto a character.
#[derive(Debug, Clone)]
pub struct FaceAssets {
    pub eyes: RgbaImage,
    pub mouth: RgbaImage,
}

impl FaceAssets {
    /// Procedurally drawn face on a transparent 140x100 canvas: two filled eyes
    /// and a style-dependent mouth stroke.
    pub fn simple(style: Style) -> Self {
        let (w, h) = SIMPLE_FACE_SIZE;
        let (w, h) = (w as i32, h as i32);
        let mut eyes = RgbaImage::new(w as u32, h as u32);
        let mut mouth = RgbaImage::new(w as u32, h as u32);

        let r = h / 4;
        let gap = w / 6;
        let eye_y = h / 4 + r / 2;
        draw_filled_ellipse_mut(&mut eyes, (gap + r / 2, eye_y), r / 2, r / 2, INK);
        draw_filled_ellipse_mut(&mut eyes, (w - gap - r / 2, eye_y), r / 2, r / 2, INK);

        match style {
            Style::Cute => stroke_arc(&mut mouth, (w / 3, h / 4, 2 * w / 3, 3 * h / 4), 0, 180),
            Style::Calm => {
                for x in w / 3..=2 * w / 3 {
                    draw_filled_circle_mut(&mut mouth, (x, h / 2), STROKE_RADIUS, INK);
                }
            }
            Style::Action => stroke_arc(&mut mouth, (w / 3, h / 3, 2 * w / 3, h), 200, 340),
        }

        Self { eyes, mouth }
    }
}

/// Stroke the arc of the ellipse inscribed in `(x0, y0, x1, y1)`.
///
/// Angles are degrees clockwise from three o'clock, so 0..180 is the lower half.
fn stroke_arc(canvas: &mut RgbaImage, (x0, y0, x1, y1): (i32, i32, i32, i32), start: u32, end: u32) {
    let cx = (x0 + x1) as f32 / 2.0;
    let cy = (y0 + y1) as f32 / 2.0;
    let rx = (x1 - x0) as f32 / 2.0;
    let ry = (y1 - y0) as f32 / 2.0;
    for degree in start..=end {
        let theta = (degree as f32).to_radians();
        let point = (
            (cx + rx * theta.cos()).round() as i32,
            (cy + ry * theta.sin()).round() as i32,
        );
        draw_filled_circle_mut(canvas, point, STROKE_RADIUS, INK);
    }
}

/// Directory of face parts laid out as `<root>/eyes/*` and `<root>/mouths/*`.
///
/// Files named `<style>_*` (e.g. `cute_round.png`) are preferred for that style.
#[derive(Debug, Clone, Default)]
pub struct AssetLibrary {
    root: Option<PathBuf>,
}

impl AssetLibrary {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: Some(root.into()) }
    }

    /// Library without files; every pick draws the simple face
    pub fn procedural() -> Self {
        Self { root: None }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn eyes_dir(&self) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join("eyes"))
    }

    pub fn mouths_dir(&self) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join("mouths"))
    }

    /// Choose one eye and one mouth image for `style`.
    ///
    /// Falls back to [`FaceAssets::simple`] unless both directories hold images.
    pub fn pick<R: Rng + ?Sized>(&self, style: Style, rng: &mut R) -> Result<FaceAssets> {
        let (Some(eyes_dir), Some(mouths_dir)) = (self.eyes_dir(), self.mouths_dir()) else {
            return Ok(FaceAssets::simple(style));
        };
        let eyes = list_images(&eyes_dir)?;
        let mouths = list_images(&mouths_dir)?;
        if eyes.is_empty() || mouths.is_empty() {
            debug!(eyes = eyes.len(), mouths = mouths.len(), "face assets incomplete, drawing simple face");
            return Ok(FaceAssets::simple(style));
        }

        let key = style.asset_key();
        let eyes_path = choose(&preferred(&eyes, key), rng);
        let mouth_path = choose(&preferred(&mouths, key), rng);
        info!(eyes = %eyes_path.display(), mouth = %mouth_path.display(), %style, "picked face assets");

        Ok(FaceAssets {
            eyes: load_rgba(eyes_path)?,
            mouth: load_rgba(mouth_path)?,
        })
    }
}

/// Image files (png/jpg/jpeg, any case) in `dir`, sorted by name.
///
/// A missing directory has no images.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries = std::fs::read_dir(dir).map_err(|source| CharacterError::AssetDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Files whose name starts with `<key>_`, or all files when none do
fn preferred<'a>(files: &'a [PathBuf], key: &str) -> Vec<&'a PathBuf> {
    let prefix = format!("{key}_");
    let matching: Vec<&PathBuf> = files
        .iter()
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.to_lowercase().starts_with(&prefix))
        })
        .collect();

    if matching.is_empty() {
        files.iter().collect()
    } else {
        matching
    }
}

// callers guarantee a non-empty slice
fn choose<'a, R: Rng + ?Sized>(candidates: &[&'a PathBuf], rng: &mut R) -> &'a PathBuf {
    candidates[rng.random_range(0..candidates.len())]
}

fn load_rgba(path: &Path) -> Result<RgbaImage> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|source| CharacterError::Asset {
            path: path.to_path_buf(),
            source,
        })
}
