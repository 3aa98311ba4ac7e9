use image::{GrayImage, RgbImage};
use imageproc::{distance_transform::Norm, edges::canny, morphology};
use serde::{Deserialize, Serialize};
use crate::{
    algorithms::preprocessing::to_gray,
    config::{CannyConfig, ScoringConfig, SegmentationConfig},
    types::{BACKGROUND, MaskStats},
};

/// Score given to candidates whose area fraction is out of range.
pub const REJECTED_SCORE: f64 = -1e9;

/// Terms of a non-rejected score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub area_fraction: f64,
    pub edge_alignment: f64,
    pub centering_penalty: f64,
    pub total: f64,
}

/// Rates how plausible a mask is as "the object" of a photo.
///
/// Rewards boundaries that follow image edges and areas near a typical object
/// size; penalizes off-centre masks.
#[derive(Debug, Clone, Default)]
pub struct MaskScorer {
    pub config: ScoringConfig,
    pub canny: CannyConfig,
}

impl MaskScorer {
    pub fn new(config: ScoringConfig, canny: CannyConfig) -> Self {
        Self { config, canny }
    }

    pub fn from_config(config: &SegmentationConfig) -> Self {
        Self::new(config.scoring.clone(), config.canny.clone())
    }

    /// Edge map of the original photo, shared by every candidate of one image
    pub fn edge_map(&self, image: &RgbImage) -> GrayImage {
        canny(&to_gray(image), self.canny.low, self.canny.high)
    }

    pub fn score(&self, mask: &GrayImage, image: &RgbImage) -> f64 {
        if mask.width() == 0 || mask.height() == 0 {
            return REJECTED_SCORE;
        }
        self.score_with_edges(mask, &self.edge_map(image))
    }

    pub fn score_with_edges(&self, mask: &GrayImage, edges: &GrayImage) -> f64 {
        match self.breakdown(mask, edges) {
            Some(breakdown) if breakdown.total.is_finite() => breakdown.total,
            _ => REJECTED_SCORE,
        }
    }

    /// Individual terms, or `None` when the area fraction rejects the mask
    pub fn breakdown(&self, mask: &GrayImage, edges: &GrayImage) -> Option<ScoreBreakdown> {
        let stats = MaskStats::from_mask(mask);
        let area_fraction = stats.area_fraction();
        if stats.total_pixels == 0
            || area_fraction < self.config.min_area
            || area_fraction > self.config.max_area
        {
            return None;
        }
        let [cx, cy] = stats.centroid?;

        let edge_alignment = self.edge_alignment(mask, edges);

        let half_width = mask.width() as f64 / 2.0;
        let half_height = mask.height() as f64 / 2.0;
        let dx = (cx - half_width).abs() / half_width;
        let dy = (cy - half_height).abs() / half_height;
        let centering_penalty = self.config.centering_weight * (dx + dy);

        let total = self.config.edge_weight * edge_alignment
            + self.config.area_weight * (1.0 - (area_fraction - self.config.target_area).abs())
            - centering_penalty;

        Some(ScoreBreakdown {
            area_fraction,
            edge_alignment,
            centering_penalty,
            total,
        })
    }

    /// Fraction of the mask's boundary band that lies on a detected image edge
    pub fn edge_alignment(&self, mask: &GrayImage, edges: &GrayImage) -> f64 {
        let boundary = self.boundary(mask);
        let mut band = 0u64;
        let mut hits = 0u64;
        for (b, e) in boundary.pixels().zip(edges.pixels()) {
            if b[0] != BACKGROUND {
                band += 1;
                if e[0] != BACKGROUND {
                    hits += 1;
                }
            }
        }
        hits as f64 / band.max(1) as f64
    }

    /// Morphological gradient (dilation minus erosion)
    pub fn boundary(&self, mask: &GrayImage) -> GrayImage {
        let radius = self.config.boundary_radius;
        let dilated = morphology::dilate(mask, Norm::LInf, radius);
        let eroded = morphology::erode(mask, Norm::LInf, radius);
        GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
            let d = dilated.get_pixel(x, y)[0];
            let e = eroded.get_pixel(x, y)[0];
            image::Luma([d.saturating_sub(e)])
        })
    }
}
