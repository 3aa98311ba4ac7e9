use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tunables for every mask generator, the shared post-processor and the scorer.
///
/// Defaults are tuned for centred objects in phone photos; every field can be overridden
/// from a TOML or JSON run configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Side length of the square Gaussian kernel applied before thresholding.
    pub blur_kernel_size: u32,
    /// What to do when a threshold marks most of the frame as foreground.
    pub inversion: InversionPolicy,
    pub adaptive: AdaptiveConfig,
    pub canny: CannyConfig,
    /// Chebyshev radius used to thicken Canny edges before contour search.
    pub edge_dilation_radius: u8,
    pub post: PostProcessConfig,
    pub graph_cut: GraphCutConfig,
    pub scoring: ScoringConfig,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            blur_kernel_size: 5,
            inversion: InversionPolicy::default(),
            adaptive: AdaptiveConfig::default(),
            canny: CannyConfig::default(),
            edge_dilation_radius: 2,
            post: PostProcessConfig::default(),
            graph_cut: GraphCutConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

/// Foreground inversion rule for the threshold generators.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InversionPolicy {
    /// Assume the object is the minority class: invert when the foreground
    /// fraction exceeds `max_foreground_fraction`.
    MinorityForeground { max_foreground_fraction: f64 },
    /// Keep the thresholded polarity as is.
    Never,
}

impl Default for InversionPolicy {
    fn default() -> Self {
        Self::MinorityForeground { max_foreground_fraction: 0.6 }
    }
}

impl InversionPolicy {
    pub fn should_invert(&self, foreground_fraction: f64) -> bool {
        match self {
            Self::MinorityForeground { max_foreground_fraction } => {
                foreground_fraction > *max_foreground_fraction
            }
            Self::Never => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct AdaptiveConfig {
    /// Side length of the Gaussian-weighted neighbourhood (odd).
    pub block_size: u32,
    /// Constant subtracted from the local mean.
    pub offset: f32,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self { block_size: 31, offset: 2.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct CannyConfig {
    pub low: f32,
    pub high: f32,
}

impl Default for CannyConfig {
    fn default() -> Self {
        Self { low: 60.0, high: 160.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct PostProcessConfig {
    /// Chebyshev radius of the square structuring element (2 => 5x5).
    pub kernel_radius: u8,
    pub close_iterations: u8,
    pub open_iterations: u8,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            kernel_radius: 2,
            close_iterations: 2,
            open_iterations: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct GraphCutConfig {
    /// Fraction of width/height left as definite background on each side.
    #[schemars(range(min = 0.0, max = 0.5))]
    pub margin: f64,
    pub iterations: usize,
    /// Gaussian components per colour model.
    pub components: usize,
    /// Smoothness weight of the neighbour links.
    pub gamma: f64,
    /// Longer side of the working copy the graph is built on; `None` keeps full resolution.
    pub max_side: Option<u32>,
}

impl Default for GraphCutConfig {
    fn default() -> Self {
        Self {
            margin: 0.08,
            iterations: 4,
            components: 5,
            gamma: 50.0,
            max_side: Some(400),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub min_area: f64,
    pub max_area: f64,
    /// Area fraction of a "typical" object.
    pub target_area: f64,
    pub edge_weight: f64,
    pub area_weight: f64,
    pub centering_weight: f64,
    /// Chebyshev radius of the boundary gradient element (1 => 3x3).
    pub boundary_radius: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_area: 0.03,
            max_area: 0.95,
            target_area: 0.25,
            edge_weight: 1.5,
            area_weight: 0.4,
            centering_weight: 0.25,
            boundary_radius: 1,
        }
    }
}
