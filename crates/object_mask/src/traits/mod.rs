use image::{GrayImage, RgbImage};
use crate::error::Result;

/// A segmentation strategy turning an RGB photo into a binary object mask
pub trait MaskGenerator: Send + Sync {
    /// Stable identifier used in logs and reports
    fn name(&self) -> &str;

    /// Produce a 0/255 mask with the dimensions of `image`.
    ///
    /// An `Err` means the strategy could not run on this input; callers treat
    /// it as an all-zero mask.
    fn generate(&self, image: &RgbImage) -> Result<GrayImage>;
}
