use image::GrayImage;
use imageproc::{distance_transform::Norm, morphology};
use crate::{
    algorithms::{extraction::fill_largest_contour, preprocessing::binarize},
    config::PostProcessConfig,
};

/// Turns any per-pixel response into a clean single-region mask.
///
/// Steps: binarize (`> 0` => 255), close to fill small gaps, open to strip
/// thin protrusions, then keep the largest outer contour filled solid.
#[derive(Debug, Clone, Default)]
pub struct MaskPostProcessor {
    pub config: PostProcessConfig,
}

impl MaskPostProcessor {
    pub fn new(config: PostProcessConfig) -> Self {
        Self { config }
    }

    pub fn process(&self, response: &GrayImage) -> GrayImage {
        let binary = binarize(response);
        let cleaned = self.open(&self.close(&binary));

        fill_largest_contour(&cleaned)
            .unwrap_or_else(|| GrayImage::new(response.width(), response.height()))
    }

    /// Repeated closing with a square element: `n` dilations followed by `n` erosions,
    /// which is a single dilation/erosion pair with an `n`-times larger radius.
    fn close(&self, binary: &GrayImage) -> GrayImage {
        let radius = self.repeated_radius(self.config.close_iterations);
        if radius == 0 {
            return binary.clone();
        }
        morphology::erode(&morphology::dilate(binary, Norm::LInf, radius), Norm::LInf, radius)
    }

    fn open(&self, binary: &GrayImage) -> GrayImage {
        let radius = self.repeated_radius(self.config.open_iterations);
        if radius == 0 {
            return binary.clone();
        }
        morphology::dilate(&morphology::erode(binary, Norm::LInf, radius), Norm::LInf, radius)
    }

    fn repeated_radius(&self, iterations: u8) -> u8 {
        self.config.kernel_radius.saturating_mul(iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::region_labelling::{Connectivity, connected_components};
    use crate::types::{FOREGROUND, MaskStats};

    fn disc(width: u32, height: u32, cx: f32, cy: f32, radius: f32, value: u8) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            let (dx, dy) = (x as f32 - cx, y as f32 - cy);
            if dx * dx + dy * dy <= radius * radius { Luma([value]) } else { Luma([0]) }
        })
    }

    #[test]
    fn test_output_is_binary_single_component() {
        // faint response values, a speck of noise and a second smaller blob
        let mut response = disc(80, 80, 40.0, 40.0, 20.0, 7);
        response.put_pixel(2, 2, Luma([90]));
        for y in 5..12 {
            for x in 60..70 {
                response.put_pixel(x, y, Luma([3]));
            }
        }

        let mask = MaskPostProcessor::default().process(&response);
        assert!(mask.pixels().all(|p| p[0] == 0 || p[0] == FOREGROUND));

        let labels = connected_components(&mask, Connectivity::Eight, Luma([0u8]));
        assert_eq!(labels.pixels().map(|p| p[0]).max(), Some(1));
        assert_eq!(mask.get_pixel(40, 40)[0], FOREGROUND);
        assert_eq!(mask.get_pixel(2, 2)[0], 0);
        assert_eq!(mask.get_pixel(65, 8)[0], 0);
    }

    #[test]
    fn test_closing_fills_small_gaps() {
        let mut response = disc(80, 80, 40.0, 40.0, 20.0, 255);
        // two-pixel slit through the disc
        for y in 15..66 {
            for x in 39..41 {
                response.put_pixel(x, y, Luma([0]));
            }
        }

        let mask = MaskPostProcessor::default().process(&response);
        assert_eq!(mask.get_pixel(40, 40)[0], FOREGROUND);
        assert_eq!(mask.get_pixel(30, 40)[0], FOREGROUND);
        assert_eq!(mask.get_pixel(50, 40)[0], FOREGROUND);
    }

    #[test]
    fn test_empty_response_gives_empty_mask() {
        let mask = MaskPostProcessor::default().process(&GrayImage::new(33, 21));
        assert_eq!(mask.dimensions(), (33, 21));
        assert!(MaskStats::from_mask(&mask).is_empty());
    }
}
