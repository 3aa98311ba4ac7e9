pub mod builder;


use image::{GrayImage, RgbImage};
use tracing::{debug, info, warn};
use crate::{
    scoring::MaskScorer,
    traits::MaskGenerator,
    types::{Candidate, CandidateReport, Selection, empty_mask},
};

/// Runs every mask generator over a photo and keeps the best-scoring mask
pub struct MaskSelector {
    generators: Vec<Box<dyn MaskGenerator>>,
    scorer: MaskScorer,
}

impl MaskSelector {
    /// Create a new selector builder
    pub fn builder() -> builder::MaskSelectorBuilder {
        builder::MaskSelectorBuilder::new()
    }

    /// Generators are evaluated, and ties broken, in the given order
    pub fn new(generators: Vec<Box<dyn MaskGenerator>>, scorer: MaskScorer) -> Self {
        Self { generators, scorer }
    }

    /// Every generator's scored output, in evaluation order.
    ///
    /// A failing generator contributes an all-zero mask.
    pub fn candidates(&self, image: &RgbImage) -> Vec<Candidate> {
        let (width, height) = image.dimensions();
        let edges = if width == 0 || height == 0 {
            GrayImage::new(width, height)
        } else {
            self.scorer.edge_map(image)
        };

        self.generators
            .iter()
            .map(|generator| {
                let (mask, failure) = match generator.generate(image) {
                    Ok(mask) if mask.dimensions() == (width, height) => (mask, None),
                    Ok(mask) => {
                        let reason = format!(
                            "mask is {}x{}, expected {width}x{height}",
                            mask.width(),
                            mask.height()
                        );
                        warn!(generator = generator.name(), %reason, "discarding mask");
                        (empty_mask(width, height), Some(reason))
                    }
                    Err(e) => {
                        warn!(generator = generator.name(), error = %e, "generator failed, using empty mask");
                        (empty_mask(width, height), Some(e.to_string()))
                    }
                };
                let score = self.scorer.score_with_edges(&mask, &edges);
                debug!(generator = generator.name(), score, "scored candidate");

                Candidate {
                    generator: generator.name().to_string(),
                    score,
                    mask,
                    failure,
                }
            })
            .collect()
    }

    /// Highest-scoring mask; on equal scores the earliest generator wins.
    ///
    /// Never fails: with no usable candidate the result is an all-zero mask.
    pub fn select(&self, image: &RgbImage) -> Selection {
        let candidates = self.candidates(image);
        let reports: Vec<CandidateReport> = candidates.iter().map(CandidateReport::from).collect();

        let mut best: Option<Candidate> = None;
        for candidate in candidates {
            match &best {
                Some(current) if candidate.score <= current.score => {}
                _ => best = Some(candidate),
            }
        }

        match best {
            Some(winner) => {
                info!(generator = %winner.generator, score = winner.score, "selected mask");
                Selection {
                    mask: winner.mask,
                    generator: winner.generator,
                    score: winner.score,
                    candidates: reports,
                }
            }
            None => {
                warn!("no mask generators configured");
                Selection {
                    mask: empty_mask(image.width(), image.height()),
                    generator: String::new(),
                    score: crate::scoring::REJECTED_SCORE,
                    candidates: reports,
                }
            }
        }
    }

    /// Just the winning mask
    pub fn extract(&self, image: &RgbImage) -> GrayImage {
        self.select(image).mask
    }

    pub fn generator_names(&self) -> Vec<&str> {
        self.generators.iter().map(|g| g.name()).collect()
    }

    /// Get information about the selector configuration
    pub fn info(&self) -> String {
        format!("MaskSelector: [{}]", self.generator_names().join(", "))
    }
}

impl Default for MaskSelector {
    fn default() -> Self {
        builder::MaskSelectorBuilder::new().build()
    }
}
