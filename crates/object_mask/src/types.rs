use image::GrayImage;
use serde::{Deserialize, Serialize};

/// Foreground value of a binary mask.
pub const FOREGROUND: u8 = 255;
/// Background value of a binary mask.
pub const BACKGROUND: u8 = 0;

/// Summary statistics of a binary mask (any non-zero pixel counts as foreground).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaskStats {
    pub foreground_pixels: u64,
    pub total_pixels: u64,
    /// Mean (x, y) of the foreground pixels
    pub centroid: Option<[f64; 2]>,
    /// Inclusive (min, max) corners of the foreground
    pub bounds: Option<([u32; 2], [u32; 2])>,
}

impl MaskStats {
    pub fn from_mask(mask: &GrayImage) -> Self {
        let mut count = 0u64;
        let (mut sum_x, mut sum_y) = (0f64, 0f64);
        let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
        let (mut max_x, mut max_y) = (0u32, 0u32);

        for (x, y, p) in mask.enumerate_pixels() {
            if p[0] == BACKGROUND {
                continue;
            }
            count += 1;
            sum_x += x as f64;
            sum_y += y as f64;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        let (centroid, bounds) = if count > 0 {
            (
                Some([sum_x / count as f64, sum_y / count as f64]),
                Some(([min_x, min_y], [max_x, max_y])),
            )
        } else {
            (None, None)
        };

        Self {
            foreground_pixels: count,
            total_pixels: mask.width() as u64 * mask.height() as u64,
            centroid,
            bounds,
        }
    }

    /// Foreground pixels over total pixels; 0 for an empty image.
    pub fn area_fraction(&self) -> f64 {
        if self.total_pixels == 0 {
            return 0.0;
        }
        self.foreground_pixels as f64 / self.total_pixels as f64
    }

    pub fn is_empty(&self) -> bool {
        self.foreground_pixels == 0
    }
}

/// All-zero mask with the given dimensions.
pub fn empty_mask(width: u32, height: u32) -> GrayImage {
    GrayImage::new(width, height)
}

/// One scored generator output.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub generator: String,
    pub score: f64,
    pub mask: GrayImage,
    /// Set when the generator failed and `mask` is the all-zero fallback.
    pub failure: Option<String>,
}

/// Serializable view of a candidate, without the pixels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateReport {
    pub generator: String,
    pub score: f64,
    pub area_fraction: f64,
    pub failure: Option<String>,
}

impl From<&Candidate> for CandidateReport {
    fn from(candidate: &Candidate) -> Self {
        Self {
            generator: candidate.generator.clone(),
            score: candidate.score,
            area_fraction: MaskStats::from_mask(&candidate.mask).area_fraction(),
            failure: candidate.failure.clone(),
        }
    }
}

/// Result of running every generator and keeping the best-scoring mask.
#[derive(Debug, Clone)]
pub struct Selection {
    pub mask: GrayImage,
    pub generator: String,
    pub score: f64,
    /// Every candidate in evaluation order, winner included
    pub candidates: Vec<CandidateReport>,
}

impl Selection {
    pub fn report(&self) -> SelectionReport {
        SelectionReport {
            winner: self.generator.clone(),
            score: self.score,
            width: self.mask.width(),
            height: self.mask.height(),
            candidates: self.candidates.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectionReport {
    pub winner: String,
    pub score: f64,
    pub width: u32,
    pub height: u32,
    pub candidates: Vec<CandidateReport>,
}

impl SelectionReport {
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_stats_of_rectangle() {
        let mut mask = GrayImage::new(10, 10);
        for y in 2..4 {
            for x in 4..8 {
                mask.put_pixel(x, y, Luma([FOREGROUND]));
            }
        }

        let stats = MaskStats::from_mask(&mask);
        assert_eq!(stats.foreground_pixels, 8);
        assert!((stats.area_fraction() - 0.08).abs() < 1e-12);
        assert_eq!(stats.centroid, Some([5.5, 2.5]));
        assert_eq!(stats.bounds, Some(([4, 2], [7, 3])));
    }

    #[test]
    fn test_stats_of_empty_mask() {
        let stats = MaskStats::from_mask(&empty_mask(4, 3));
        assert!(stats.is_empty());
        assert_eq!(stats.total_pixels, 12);
        assert_eq!(stats.centroid, None);
        assert_eq!(stats.bounds, None);
        assert_eq!(MaskStats::from_mask(&empty_mask(0, 0)).area_fraction(), 0.0);
    }
}
