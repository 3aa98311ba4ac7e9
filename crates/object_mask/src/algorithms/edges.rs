use image::{GrayImage, RgbImage};
use imageproc::{distance_transform::Norm, edges::canny, morphology};
use crate::{
    algorithms::{
        extraction::fill_largest_contour, postprocessing::MaskPostProcessor,
        preprocessing::{require_pixels, smoothed_gray},
    },
    config::{CannyConfig, SegmentationConfig},
    error::Result,
    traits::MaskGenerator,
};

/// Fills the largest closed outline traced by thickened Canny edges
#[derive(Debug, Clone)]
pub struct CannyContourGenerator {
    pub blur_kernel_size: u32,
    pub canny: CannyConfig,
    pub dilation_radius: u8,
    pub postprocessor: MaskPostProcessor,
}

impl CannyContourGenerator {
    pub fn from_config(config: &SegmentationConfig) -> Self {
        Self {
            blur_kernel_size: config.blur_kernel_size,
            canny: config.canny.clone(),
            dilation_radius: config.edge_dilation_radius,
            postprocessor: MaskPostProcessor::new(config.post.clone()),
        }
    }

    /// Canny edges of the blurred image, dilated to bridge small breaks
    pub fn edge_map(&self, image: &RgbImage) -> GrayImage {
        let blurred = smoothed_gray(image, self.blur_kernel_size);
        let edges = canny(&blurred, self.canny.low, self.canny.high);
        if self.dilation_radius == 0 {
            return edges;
        }
        morphology::dilate(&edges, Norm::LInf, self.dilation_radius)
    }
}

impl Default for CannyContourGenerator {
    fn default() -> Self {
        Self::from_config(&SegmentationConfig::default())
    }
}

impl MaskGenerator for CannyContourGenerator {
    fn name(&self) -> &str {
        "canny_contour"
    }

    fn generate(&self, image: &RgbImage) -> Result<GrayImage> {
        require_pixels(image)?;
        let edges = self.edge_map(image);
        match fill_largest_contour(&edges) {
            Some(filled) => Ok(self.postprocessor.process(&filled)),
            // nothing to post-process
            None => Ok(GrayImage::new(image.width(), image.height())),
        }
    }
}
