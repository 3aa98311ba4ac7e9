use image::{GrayImage, Luma, RgbImage};
use imageproc::filter::separable_filter_equal;
use crate::{
    config::InversionPolicy,
    error::{MaskError, Result},
    types::{BACKGROUND, FOREGROUND},
};

/// Fails with [`MaskError::EmptyImage`] when the photo has no pixels
pub fn require_pixels(image: &RgbImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(MaskError::EmptyImage);
    }
    Ok(())
}

/// Luma conversion of an RGB photo
pub fn to_gray(image: &RgbImage) -> GrayImage {
    image::imageops::grayscale(image)
}

/// Normalized 1-D Gaussian kernel of odd length `size`.
///
/// Sigma follows the usual size-derived default `0.3 * ((size - 1) / 2 - 1) + 0.8`.
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let size = size.max(1) | 1;
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let half = (size / 2) as i32;

    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);
    kernel
}

/// Separable Gaussian blur with a square `size x size` kernel
pub fn gaussian_smooth(image: &GrayImage, size: u32) -> GrayImage {
    if image.width() == 0 || image.height() == 0 {
        return image.clone();
    }
    separable_filter_equal(image, &gaussian_kernel(size))
}

/// Grayscale + Gaussian blur, the shared front half of the threshold and edge generators
pub fn smoothed_gray(image: &RgbImage, blur_kernel_size: u32) -> GrayImage {
    gaussian_smooth(&to_gray(image), blur_kernel_size)
}

/// Strict 0/255 image: every non-zero pixel becomes foreground
pub fn binarize(image: &GrayImage) -> GrayImage {
    imageproc::contrast::threshold(image, BACKGROUND)
}

/// Fraction of pixels that are non-zero
pub fn foreground_fraction(image: &GrayImage) -> f64 {
    let total = image.width() as u64 * image.height() as u64;
    if total == 0 {
        return 0.0;
    }
    let foreground = image.pixels().filter(|p| p[0] != BACKGROUND).count() as u64;
    foreground as f64 / total as f64
}

/// Invert `binary` in place when the policy says the object cannot be the majority class
pub fn apply_inversion(binary: &mut GrayImage, policy: &InversionPolicy) -> bool {
    let invert = policy.should_invert(foreground_fraction(binary));
    if invert {
        image::imageops::invert(binary);
    }
    invert
}

/// Locally adaptive binarization.
///
/// A pixel is foreground when it is brighter than the Gaussian-weighted mean of
/// its `block_size x block_size` neighbourhood minus `offset`.
pub fn adaptive_threshold(image: &GrayImage, block_size: u32, offset: f32) -> GrayImage {
    let local_mean = gaussian_smooth(image, block_size);
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let value = image.get_pixel(x, y)[0] as f32;
        let mean = local_mean.get_pixel(x, y)[0] as f32;
        if value > mean - offset {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_kernel_is_normalized_and_symmetric() {
        for size in [3, 5, 31] {
            let kernel = gaussian_kernel(size);
            assert_eq!(kernel.len(), size as usize);
            let sum: f32 = kernel.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
            assert!((kernel[0] - kernel[size as usize - 1]).abs() < 1e-7);
            assert!(kernel[size as usize / 2] >= kernel[0]);
        }
        // even sizes are rounded up to the next odd size
        assert_eq!(gaussian_kernel(4).len(), 5);
    }

    #[test]
    fn test_zero_sized_images() {
        for (w, h) in [(0, 5), (5, 0), (0, 0)] {
            let blurred = smoothed_gray(&RgbImage::new(w, h), 5);
            assert_eq!(blurred.dimensions(), (w, h));
            assert_eq!(adaptive_threshold(&GrayImage::new(w, h), 31, 2.0).dimensions(), (w, h));
            assert!(matches!(require_pixels(&RgbImage::new(w, h)), Err(MaskError::EmptyImage)));
        }
        assert!(require_pixels(&RgbImage::new(1, 1)).is_ok());
    }

    #[test]
    fn test_binarize() {
        let image = GrayImage::from_raw(4, 1, vec![0, 1, 128, 255]).expect("valid buffer");
        let binary = binarize(&image);
        assert_eq!(binary.into_raw(), vec![0, 255, 255, 255]);
    }

    #[test]
    fn test_inversion_when_foreground_is_majority() {
        let mut binary = GrayImage::from_raw(5, 1, vec![255, 255, 255, 255, 0]).expect("valid buffer");
        assert!(apply_inversion(&mut binary, &InversionPolicy::default()));
        assert_eq!(binary.into_raw(), vec![0, 0, 0, 0, 255]);

        let mut minority = GrayImage::from_raw(5, 1, vec![255, 0, 0, 0, 0]).expect("valid buffer");
        assert!(!apply_inversion(&mut minority, &InversionPolicy::default()));
        assert_eq!(minority.into_raw(), vec![255, 0, 0, 0, 0]);
    }

    #[test]
    fn test_adaptive_threshold_marks_dark_side_of_step() {
        // dark left half, bright right half
        let image = GrayImage::from_fn(64, 16, |x, _| if x < 32 { Luma([40]) } else { Luma([200]) });
        let binary = adaptive_threshold(&image, 31, 2.0);

        // flat regions far from the step sit above mean - offset
        assert_eq!(binary.get_pixel(2, 8)[0], FOREGROUND);
        assert_eq!(binary.get_pixel(61, 8)[0], FOREGROUND);
        // dark pixels next to the bright side fall below their local mean
        assert_eq!(binary.get_pixel(31, 8)[0], BACKGROUND);
    }
}
