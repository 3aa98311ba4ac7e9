//! Rectangle-seeded colour graph cut (GrabCut without user strokes).
//!
//! The frame border is fixed background and the central rectangle starts as
//! probable foreground. Each iteration re-fits a Gaussian mixture per class,
//! builds an 8-neighbour graph weighted by colour similarity and relabels the
//! probable pixels from the minimum cut.

pub mod gmm;
pub mod max_flow;

use image::{GrayImage, Luma, RgbImage, imageops::FilterType};
use tracing::debug;
use crate::{
    algorithms::postprocessing::MaskPostProcessor,
    config::{GraphCutConfig, SegmentationConfig},
    error::{MaskError, Result},
    traits::MaskGenerator,
    types::{BACKGROUND, FOREGROUND},
};
use gmm::{Color, ColorModel, kmeans};
use max_flow::FlowNetwork;

const KMEANS_ITERATIONS: usize = 10;

/// Per-pixel label of the segmentation state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedLabel {
    Background,
    Foreground,
    ProbableBackground,
    ProbableForeground,
}

impl SeedLabel {
    pub fn is_foreground(self) -> bool {
        matches!(self, Self::Foreground | Self::ProbableForeground)
    }

    pub fn is_fixed(self) -> bool {
        matches!(self, Self::Foreground | Self::Background)
    }
}

/// Seed rectangle `(x, y, width, height)` leaving `margin` of each side as background.
///
/// `None` when the rectangle is empty.
pub fn seed_rectangle(width: u32, height: u32, margin: f64) -> Option<(u32, u32, u32, u32)> {
    let margin = margin.clamp(0.0, 0.5);
    let x = (width as f64 * margin) as u32;
    let y = (height as f64 * margin) as u32;
    let rect_width = ((width as f64 * (1.0 - 2.0 * margin)) as u32).min(width.saturating_sub(x));
    let rect_height = ((height as f64 * (1.0 - 2.0 * margin)) as u32).min(height.saturating_sub(y));

    if rect_width == 0 || rect_height == 0 {
        return None;
    }
    Some((x, y, rect_width, rect_height))
}

/// Run the iterative graph cut and return the final label of every pixel (row-major).
pub fn segment(image: &RgbImage, config: &GraphCutConfig) -> Result<Vec<SeedLabel>> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(MaskError::EmptyImage);
    }
    let (rx, ry, rw, rh) = seed_rectangle(width, height, config.margin)
        .ok_or_else(|| MaskError::DegenerateInput("graph cut seed rectangle is empty".into()))?;

    let mut labels: Vec<SeedLabel> = image
        .enumerate_pixels()
        .map(|(x, y, _)| {
            if x >= rx && x < rx + rw && y >= ry && y < ry + rh {
                SeedLabel::ProbableForeground
            } else {
                SeedLabel::Background
            }
        })
        .collect();
    let colors: Vec<Color> = image
        .pixels()
        .map(|p| [p[0] as f64, p[1] as f64, p[2] as f64])
        .collect();

    let components = config.components.max(1);
    let (background, foreground) = split_by_class(&colors, &labels);
    if background.len() < components || foreground.len() < components {
        return Err(MaskError::DegenerateInput(format!(
            "graph cut needs at least {components} seed pixels per class, got {} background and {} foreground",
            background.len(),
            foreground.len()
        )));
    }
    let mut background_model =
        ColorModel::fit(&background, &kmeans(&background, components, KMEANS_ITERATIONS), components);
    let mut foreground_model =
        ColorModel::fit(&foreground, &kmeans(&foreground, components, KMEANS_ITERATIONS), components);

    let smoothness = NeighbourWeights::new(image, config.gamma);
    let lambda = 9.0 * config.gamma;

    for iteration in 0..config.iterations {
        let (background, foreground) = split_by_class(&colors, &labels);
        if foreground.is_empty() {
            debug!(iteration, "graph cut converged to an empty foreground");
            break;
        }
        background_model = refit(&background_model, &background);
        foreground_model = refit(&foreground_model, &foreground);

        let mut network = FlowNetwork::with_capacity(labels.len(), labels.len() * 5);
        for (node, (label, color)) in labels.iter().zip(&colors).enumerate() {
            let (to_source, to_sink) = match label {
                SeedLabel::Background => (0.0, lambda),
                SeedLabel::Foreground => (lambda, 0.0),
                _ => (
                    -background_model.likelihood(color).max(f64::MIN_POSITIVE).ln(),
                    -foreground_model.likelihood(color).max(f64::MIN_POSITIVE).ln(),
                ),
            };
            network.add_terminal_weights(node, to_source, to_sink);
        }
        smoothness.add_to(&mut network);

        let flow = network.max_flow();
        let source_side = network.source_side();
        for (label, in_source) in labels.iter_mut().zip(source_side) {
            if !label.is_fixed() {
                *label = if in_source {
                    SeedLabel::ProbableForeground
                } else {
                    SeedLabel::ProbableBackground
                };
            }
        }
        debug!(iteration, flow, "graph cut iteration");
    }

    Ok(labels)
}

fn split_by_class(colors: &[Color], labels: &[SeedLabel]) -> (Vec<Color>, Vec<Color>) {
    let mut background = Vec::new();
    let mut foreground = Vec::new();
    for (color, label) in colors.iter().zip(labels) {
        if label.is_foreground() {
            foreground.push(*color);
        } else {
            background.push(*color);
        }
    }
    (background, foreground)
}

/// Reassign samples to their most likely component and fit a new mixture
fn refit(model: &ColorModel, samples: &[Color]) -> ColorModel {
    let assignment: Vec<usize> = samples
        .iter()
        .map(|color| model.most_likely_component(color))
        .collect();
    ColorModel::fit(samples, &assignment, model.component_count())
}

/// Contrast-sensitive smoothness weights towards the left, up-left, up and up-right neighbours
struct NeighbourWeights {
    width: usize,
    height: usize,
    weights: Vec<[f64; 4]>,
}

impl NeighbourWeights {
    const OFFSETS: [(i64, i64); 4] = [(-1, 0), (-1, -1), (0, -1), (1, -1)];

    fn new(image: &RgbImage, gamma: f64) -> Self {
        let (width, height) = (image.width() as usize, image.height() as usize);
        let diff = |x: usize, y: usize, (dx, dy): (i64, i64)| -> Option<f64> {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx < 0 || ny < 0 || nx >= width as i64 {
                return None;
            }
            let a = image.get_pixel(x as u32, y as u32);
            let b = image.get_pixel(nx as u32, ny as u32);
            Some(
                (0..3)
                    .map(|c| (a[c] as f64 - b[c] as f64).powi(2))
                    .sum(),
            )
        };

        let mut total = 0.0;
        let mut pairs = 0usize;
        for y in 0..height {
            for x in 0..width {
                for offset in Self::OFFSETS {
                    if let Some(d) = diff(x, y, offset) {
                        total += d;
                        pairs += 1;
                    }
                }
            }
        }
        let beta = if total <= f64::EPSILON || pairs == 0 {
            0.0
        } else {
            1.0 / (2.0 * total / pairs as f64)
        };

        let diagonal_gamma = gamma / std::f64::consts::SQRT_2;
        let mut weights = vec![[0.0; 4]; width * height];
        for y in 0..height {
            for x in 0..width {
                for (i, offset) in Self::OFFSETS.into_iter().enumerate() {
                    if let Some(d) = diff(x, y, offset) {
                        let g = if offset.0 != 0 && offset.1 != 0 { diagonal_gamma } else { gamma };
                        weights[y * width + x][i] = g * (-beta * d).exp();
                    }
                }
            }
        }

        Self { width, height, weights }
    }

    fn add_to(&self, network: &mut FlowNetwork) {
        for y in 0..self.height {
            for x in 0..self.width {
                let node = y * self.width + x;
                for (i, (dx, dy)) in Self::OFFSETS.into_iter().enumerate() {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= self.width as i64 {
                        continue;
                    }
                    let neighbour = ny as usize * self.width + nx as usize;
                    let w = self.weights[node][i];
                    network.add_edge(node, neighbour, w, w);
                }
            }
        }
    }
}

/// Graph-cut mask generator seeded from the central rectangle
#[derive(Debug, Clone)]
pub struct GraphCutGenerator {
    pub config: GraphCutConfig,
    pub postprocessor: MaskPostProcessor,
}

impl GraphCutGenerator {
    pub fn from_config(config: &SegmentationConfig) -> Self {
        Self {
            config: config.graph_cut.clone(),
            postprocessor: MaskPostProcessor::new(config.post.clone()),
        }
    }

    /// Raw foreground labels as a 0/255 image at the input resolution
    pub fn foreground(&self, image: &RgbImage) -> Result<GrayImage> {
        let (width, height) = image.dimensions();
        let working = match self.config.max_side {
            Some(max_side) if max_side > 0 && width.max(height) > max_side => {
                let scale = max_side as f64 / width.max(height) as f64;
                let w = ((width as f64 * scale).round() as u32).max(1);
                let h = ((height as f64 * scale).round() as u32).max(1);
                image::imageops::resize(image, w, h, FilterType::Triangle)
            }
            _ => image.clone(),
        };

        let labels = segment(&working, &self.config)?;
        let working_width = working.width() as usize;
        let binary = GrayImage::from_fn(working.width(), working.height(), |x, y| {
            if labels[y as usize * working_width + x as usize].is_foreground() {
                Luma([FOREGROUND])
            } else {
                Luma([BACKGROUND])
            }
        });

        if binary.dimensions() == (width, height) {
            Ok(binary)
        } else {
            Ok(image::imageops::resize(&binary, width, height, FilterType::Nearest))
        }
    }
}

impl Default for GraphCutGenerator {
    fn default() -> Self {
        Self::from_config(&SegmentationConfig::default())
    }
}

impl MaskGenerator for GraphCutGenerator {
    fn name(&self) -> &str {
        "graph_cut"
    }

    fn generate(&self, image: &RgbImage) -> Result<GrayImage> {
        Ok(self.postprocessor.process(&self.foreground(image)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use crate::types::MaskStats;

    fn bright_square(size: u32) -> RgbImage {
        let (lo, hi) = (size * 3 / 10, size * 7 / 10);
        RgbImage::from_fn(size, size, |x, y| {
            if (lo..hi).contains(&x) && (lo..hi).contains(&y) {
                Rgb([230, 200, 40])
            } else {
                Rgb([30, 40, 90])
            }
        })
    }

    #[test]
    fn test_seed_rectangle() {
        assert_eq!(seed_rectangle(100, 50, 0.08), Some((8, 4, 84, 42)));
        assert_eq!(seed_rectangle(1, 1, 0.08), None);
        assert_eq!(seed_rectangle(0, 10, 0.08), None);
    }

    #[test]
    fn test_segments_contrasting_object() {
        let mask = GraphCutGenerator::default()
            .generate(&bright_square(60))
            .expect("Graph cut should run");

        assert_eq!(mask.get_pixel(30, 30)[0], FOREGROUND);
        assert_eq!(mask.get_pixel(10, 10)[0], BACKGROUND);
        assert_eq!(mask.get_pixel(50, 8)[0], BACKGROUND);
        let area = MaskStats::from_mask(&mask).area_fraction();
        assert!((0.1..0.25).contains(&area), "area {area}");
    }

    #[test]
    fn test_working_resolution_cap_keeps_output_size() {
        let generator = GraphCutGenerator {
            config: GraphCutConfig { max_side: Some(40), ..GraphCutConfig::default() },
            ..GraphCutGenerator::default()
        };
        let mask = generator.generate(&bright_square(100)).expect("Graph cut should run");
        assert_eq!(mask.dimensions(), (100, 100));
        assert_eq!(mask.get_pixel(50, 50)[0], FOREGROUND);
        assert_eq!(mask.get_pixel(5, 95)[0], BACKGROUND);
    }

    #[test]
    fn test_uniform_image_gives_empty_foreground() {
        let image = RgbImage::from_pixel(30, 20, Rgb([255, 255, 255]));
        let mask = GraphCutGenerator::default().generate(&image).expect("Graph cut should run");
        assert!(MaskStats::from_mask(&mask).is_empty());
    }

    #[test]
    fn test_degenerate_inputs_fail() {
        let generator = GraphCutGenerator::default();
        assert!(matches!(generator.generate(&RgbImage::new(0, 0)), Err(MaskError::EmptyImage)));
        assert!(matches!(
            generator.generate(&RgbImage::from_pixel(3, 3, Rgb([9, 9, 9]))),
            Err(MaskError::DegenerateInput(_))
        ));

        let no_border = GraphCutGenerator {
            config: GraphCutConfig { margin: 0.0, ..GraphCutConfig::default() },
            ..GraphCutGenerator::default()
        };
        assert!(matches!(
            no_border.generate(&bright_square(20)),
            Err(MaskError::DegenerateInput(_))
        ));
    }
}
