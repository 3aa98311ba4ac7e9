use image::{GrayImage, RgbImage};
use imageproc::contrast::{otsu_level, threshold};
use tracing::trace;
use crate::{
    algorithms::{
        postprocessing::MaskPostProcessor,
        preprocessing::{adaptive_threshold, apply_inversion, require_pixels, smoothed_gray},
    },
    config::{AdaptiveConfig, InversionPolicy, SegmentationConfig},
    error::Result,
    traits::MaskGenerator,
};

/// Global Otsu threshold over the blurred grayscale image
#[derive(Debug, Clone)]
pub struct OtsuGenerator {
    pub blur_kernel_size: u32,
    pub inversion: InversionPolicy,
    pub postprocessor: MaskPostProcessor,
}

impl OtsuGenerator {
    pub fn from_config(config: &SegmentationConfig) -> Self {
        Self {
            blur_kernel_size: config.blur_kernel_size,
            inversion: config.inversion,
            postprocessor: MaskPostProcessor::new(config.post.clone()),
        }
    }

    /// Thresholded (and possibly inverted) image before post-processing
    pub fn binarize(&self, image: &RgbImage) -> GrayImage {
        let blurred = smoothed_gray(image, self.blur_kernel_size);
        let level = otsu_level(&blurred);
        let mut binary = threshold(&blurred, level);
        let inverted = apply_inversion(&mut binary, &self.inversion);
        trace!(level, inverted, "otsu threshold");
        binary
    }
}

impl Default for OtsuGenerator {
    fn default() -> Self {
        Self::from_config(&SegmentationConfig::default())
    }
}

impl MaskGenerator for OtsuGenerator {
    fn name(&self) -> &str {
        "otsu"
    }

    fn generate(&self, image: &RgbImage) -> Result<GrayImage> {
        require_pixels(image)?;
        Ok(self.postprocessor.process(&self.binarize(image)))
    }
}

/// Gaussian-weighted local threshold, robust to lighting gradients
#[derive(Debug, Clone)]
pub struct AdaptiveGenerator {
    pub blur_kernel_size: u32,
    pub adaptive: AdaptiveConfig,
    pub inversion: InversionPolicy,
    pub postprocessor: MaskPostProcessor,
}

impl AdaptiveGenerator {
    pub fn from_config(config: &SegmentationConfig) -> Self {
        Self {
            blur_kernel_size: config.blur_kernel_size,
            adaptive: config.adaptive.clone(),
            inversion: config.inversion,
            postprocessor: MaskPostProcessor::new(config.post.clone()),
        }
    }

    pub fn binarize(&self, image: &RgbImage) -> GrayImage {
        let blurred = smoothed_gray(image, self.blur_kernel_size);
        let mut binary = adaptive_threshold(&blurred, self.adaptive.block_size, self.adaptive.offset);
        let inverted = apply_inversion(&mut binary, &self.inversion);
        trace!(inverted, "adaptive threshold");
        binary
    }
}

impl Default for AdaptiveGenerator {
    fn default() -> Self {
        Self::from_config(&SegmentationConfig::default())
    }
}

impl MaskGenerator for AdaptiveGenerator {
    fn name(&self) -> &str {
        "adaptive"
    }

    fn generate(&self, image: &RgbImage) -> Result<GrayImage> {
        require_pixels(image)?;
        Ok(self.postprocessor.process(&self.binarize(image)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use crate::{
        config::InversionPolicy,
        error::MaskError,
        types::{BACKGROUND, FOREGROUND, MaskStats},
    };

    fn square_on_background(object: [u8; 3], background: [u8; 3]) -> RgbImage {
        RgbImage::from_fn(100, 80, |x, y| {
            if (35..65).contains(&x) && (25..55).contains(&y) { Rgb(object) } else { Rgb(background) }
        })
    }

    #[test]
    fn test_otsu_finds_bright_object() {
        let image = square_on_background([230, 230, 230], [20, 20, 20]);
        let mask = OtsuGenerator::default().generate(&image).expect("Otsu never fails");

        assert_eq!(mask.get_pixel(50, 40)[0], FOREGROUND);
        assert_eq!(mask.get_pixel(5, 5)[0], BACKGROUND);
        let area = MaskStats::from_mask(&mask).area_fraction();
        assert!((0.08..0.16).contains(&area), "area {area}");
    }

    #[test]
    fn test_otsu_inverts_dark_object_on_bright_background() {
        let image = square_on_background([15, 15, 15], [240, 240, 240]);
        let mask = OtsuGenerator::default().generate(&image).expect("Otsu never fails");
        assert_eq!(mask.get_pixel(50, 40)[0], FOREGROUND);
        assert_eq!(mask.get_pixel(95, 75)[0], BACKGROUND);

        let literal = OtsuGenerator {
            inversion: InversionPolicy::Never,
            ..OtsuGenerator::default()
        };
        let binary = literal.binarize(&image);
        assert_eq!(binary.get_pixel(95, 75)[0], FOREGROUND);
        assert_eq!(binary.get_pixel(50, 40)[0], BACKGROUND);
    }

    #[test]
    fn test_adaptive_outlines_object() {
        let image = square_on_background([15, 15, 15], [240, 240, 240]);
        let mask = AdaptiveGenerator::default().generate(&image).expect("Adaptive never fails");

        assert_eq!(mask.get_pixel(50, 40)[0], FOREGROUND);
        assert_eq!(mask.get_pixel(3, 3)[0], BACKGROUND);
    }

    #[test]
    fn test_uniform_image_yields_empty_mask() {
        for value in [0u8, 255] {
            let image = RgbImage::from_pixel(40, 30, Rgb([value; 3]));
            for mask in [
                OtsuGenerator::default().generate(&image).expect("Otsu never fails"),
                AdaptiveGenerator::default().generate(&image).expect("Adaptive never fails"),
            ] {
                assert!(MaskStats::from_mask(&mask).is_empty(), "value {value}");
            }
        }
    }

    #[test]
    fn test_zero_sized_image_is_an_error() {
        for image in [RgbImage::new(0, 5), RgbImage::new(7, 0)] {
            assert!(matches!(OtsuGenerator::default().generate(&image), Err(MaskError::EmptyImage)));
            assert!(matches!(AdaptiveGenerator::default().generate(&image), Err(MaskError::EmptyImage)));
        }
    }
}
