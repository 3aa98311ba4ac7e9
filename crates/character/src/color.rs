use image::{GrayImage, Rgb, RgbImage, Rgba, RgbaImage, imageops::FilterType};
use object_mask::BACKGROUND;

const SAMPLE_SIDE: u32 = 50;

/// Mean colour of the photo after shrinking it to 50x50, truncated per channel.
///
/// Black for an image without pixels.
pub fn dominant_color(image: &RgbImage) -> Rgb<u8> {
    if image.width() == 0 || image.height() == 0 {
        return Rgb([0, 0, 0]);
    }
    let small = image::imageops::resize(image, SAMPLE_SIDE, SAMPLE_SIDE, FilterType::Triangle);

    let mut sums = [0u64; 3];
    for pixel in small.pixels() {
        for (sum, channel) in sums.iter_mut().zip(pixel.0) {
            *sum += channel as u64;
        }
    }
    let count = (SAMPLE_SIDE * SAMPLE_SIDE) as u64;
    Rgb(sums.map(|sum| (sum / count) as u8))
}

/// Silhouette of `mask` painted in `color` with alpha `255 * opacity`.
///
/// Pixels outside the mask are fully transparent.
pub fn tint_overlay(mask: &GrayImage, color: Rgb<u8>, opacity: f32) -> RgbaImage {
    let alpha = (255.0 * opacity.clamp(0.0, 1.0)) as u8;
    let [r, g, b] = color.0;
    RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
        if mask.get_pixel(x, y)[0] != BACKGROUND {
            Rgba([r, g, b, alpha])
        } else {
            Rgba([r, g, b, 0])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_dominant_color_of_flat_image() {
        let image = RgbImage::from_pixel(200, 120, Rgb([200, 40, 10]));
        assert_eq!(dominant_color(&image), Rgb([200, 40, 10]));
        assert_eq!(dominant_color(&RgbImage::new(0, 0)), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_dominant_color_averages_halves() {
        let image = RgbImage::from_fn(100, 100, |x, _| {
            if x < 50 { Rgb([0, 0, 0]) } else { Rgb([200, 100, 50]) }
        });
        let Rgb([r, g, b]) = dominant_color(&image);
        assert!((95..=105).contains(&r), "red {r}");
        assert!((45..=55).contains(&g), "green {g}");
        assert!((20..=30).contains(&b), "blue {b}");
    }

    #[test]
    fn test_tint_overlay_alpha() {
        let mask = GrayImage::from_fn(4, 4, |x, _| Luma([if x < 2 { 255 } else { 0 }]));
        let overlay = tint_overlay(&mask, Rgb([10, 20, 30]), 0.25);

        assert_eq!(*overlay.get_pixel(0, 0), Rgba([10, 20, 30, 63]));
        assert_eq!(overlay.get_pixel(3, 3)[3], 0);
        assert_eq!(tint_overlay(&mask, Rgb([0, 0, 0]), 1.0).get_pixel(1, 2)[3], 255);
    }
}
