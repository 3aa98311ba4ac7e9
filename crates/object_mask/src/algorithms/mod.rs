pub mod preprocessing;
pub mod extraction;
pub mod postprocessing;
pub mod thresholding;
pub mod edges;
pub mod graph_cut;

pub use preprocessing::*;
pub use extraction::*;
pub use postprocessing::*;
pub use thresholding::*;
pub use edges::*;
pub use graph_cut::GraphCutGenerator;

use serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr, VariantNames};
use crate::{config::SegmentationConfig, traits::MaskGenerator};

/// The fixed set of segmentation strategies, in default evaluation order.
#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq, Hash
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Strategy {
    /// Global Otsu threshold
    Otsu,
    /// Gaussian-weighted local threshold
    Adaptive,
    /// Filled outline of dilated Canny edges
    CannyContour,
    /// Rectangle-seeded colour graph cut
    GraphCut,
}

impl Strategy {
    /// All strategies in evaluation order
    pub fn all() -> Vec<Strategy> {
        Self::iter().collect()
    }

    pub fn names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Otsu => "Global Otsu threshold of the blurred grayscale image",
            Self::Adaptive => "Local Gaussian-weighted threshold, robust to uneven lighting",
            Self::CannyContour => "Largest closed outline of dilated Canny edges, filled",
            Self::GraphCut => "Colour-model graph cut seeded from the central rectangle",
        }
    }

    pub fn generator(&self, config: &SegmentationConfig) -> Box<dyn MaskGenerator> {
        match self {
            Self::Otsu => Box::new(OtsuGenerator::from_config(config)),
            Self::Adaptive => Box::new(AdaptiveGenerator::from_config(config)),
            Self::CannyContour => Box::new(CannyContourGenerator::from_config(config)),
            Self::GraphCut => Box::new(GraphCutGenerator::from_config(config)),
        }
    }
}
