use image::{GrayImage, Rgb, RgbImage, RgbaImage};
use object_mask::{MaskSelector, MaskSelectorBuilder, SegmentationConfig, SelectionReport};
use rand::Rng;
use tracing::{info, instrument};

use crate::{
    assets::AssetLibrary,
    color::dominant_color,
    compose::compose_character,
    config::CharacterConfig,
    error::Result,
    persona::generate_persona_in,
    style::Style,
};

/// A finished character: composited image plus the data it was made from.
#[derive(Debug, Clone)]
pub struct Character {
    pub image: RgbaImage,
    pub mask: GrayImage,
    pub style: Style,
    pub dominant_color: Rgb<u8>,
    pub persona: String,
    pub report: SelectionReport,
}

/// Photo-to-character pipeline: segment, compose a face, write a persona.
pub struct CharacterStudio {
    selector: MaskSelector,
    assets: AssetLibrary,
    config: CharacterConfig,
}

impl CharacterStudio {
    pub fn new(selector: MaskSelector, assets: AssetLibrary, config: CharacterConfig) -> Self {
        Self { selector, assets, config }
    }

    pub fn from_config(segmentation: SegmentationConfig, assets: AssetLibrary, config: CharacterConfig) -> Self {
        Self::new(MaskSelectorBuilder::build_with_config(segmentation), assets, config)
    }

    pub fn with_assets(mut self, assets: AssetLibrary) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_config(mut self, config: CharacterConfig) -> Self {
        self.config = config;
        self
    }

    /// Turn a photo into a character; `rng` only drives face-asset choice.
    #[instrument(skip(self, image, rng), fields(width = image.width(), height = image.height()))]
    pub fn create<R: Rng + ?Sized>(&self, image: &RgbImage, style: Style, rng: &mut R) -> Result<Character> {
        let selection = self.selector.select(image);
        let report = selection.report();
        let faces = self.assets.pick(style, rng)?;
        let composed = compose_character(image, &selection.mask, &faces, &self.config)?;

        let color = dominant_color(image);
        let persona = generate_persona_in(style, color, self.config.persona_language);
        info!(generator = %report.winner, score = report.score, ?color, "character created");

        Ok(Character {
            image: composed,
            mask: selection.mask,
            style,
            dominant_color: color,
            persona,
            report,
        })
    }
}

impl Default for CharacterStudio {
    fn default() -> Self {
        Self::new(MaskSelector::default(), AssetLibrary::procedural(), CharacterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use object_mask::{MaskStats, Strategy};
    use crate::persona::PersonaLanguage;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn mug() -> RgbImage {
        RgbImage::from_fn(120, 100, |x, y| {
            let (dx, dy) = ((x as f32 - 60.0) / 28.0, (y as f32 - 50.0) / 32.0);
            if dx * dx + dy * dy <= 1.0 { Rgb([210, 60, 40]) } else { Rgb([235, 235, 230]) }
        })
    }

    #[test]
    fn test_create_character() {
        let studio = CharacterStudio::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let character = studio.create(&mug(), Style::Cute, &mut rng).expect("Should create");

        assert_eq!(character.image.dimensions(), (120, 100));
        assert_eq!(character.mask.dimensions(), (120, 100));
        assert_eq!(character.report.candidates.len(), 4);
        assert!(!MaskStats::from_mask(&character.mask).is_empty());
        // the red body tips the mean towards the red channel
        assert!(character.persona.contains("warm"));
        assert!(character.persona.contains("smile"));
    }

    #[test]
    fn test_create_with_asset_directory() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        for sub in ["eyes", "mouths"] {
            std::fs::create_dir(dir.path().join(sub)).expect("Should create dir");
            RgbaImage::from_pixel(16, 8, Rgba([0, 0, 0, 255]))
                .save(dir.path().join(sub).join("calm_plain.png"))
                .expect("Should write asset");
        }

        let studio = CharacterStudio::from_config(
            SegmentationConfig::default(),
            AssetLibrary::new(dir.path()),
            CharacterConfig::default(),
        );
        let character = studio
            .create(&mug(), Style::Calm, &mut Pcg32::seed_from_u64(9))
            .expect("Should create");
        assert_eq!(character.style, Style::Calm);
        assert!(Strategy::names().contains(&character.report.winner.as_str()));
    }

    #[test]
    fn test_flat_photo_still_yields_character() {
        let flat = RgbImage::from_pixel(40, 30, Rgb([20, 160, 20]));
        let character = CharacterStudio::default()
            .create(&flat, Style::Action, &mut Pcg32::seed_from_u64(0))
            .expect("Should create");

        assert!(MaskStats::from_mask(&character.mask).is_empty());
        assert_eq!(character.image.dimensions(), (40, 30));
        assert_eq!(character.dominant_color, Rgb([20, 160, 20]));
        assert!(character.persona.contains("steady"));
    }

    #[test]
    fn test_persona_language_from_config() {
        let config = CharacterConfig {
            persona_language: PersonaLanguage::Korean,
            ..CharacterConfig::default()
        };
        let studio = CharacterStudio::default().with_config(config);
        let character = studio
            .create(&mug(), Style::Action, &mut Pcg32::seed_from_u64(3))
            .expect("Should create");
        assert!(character.persona.starts_with("이 사물은 따뜻하고 적극적인"));
        assert!(character.persona.contains("모험"));
    }
}
