use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use crate::persona::PersonaLanguage;

/// Compositing parameters; sizes and offsets are fractions of the object's bounding box.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct CharacterConfig {
    /// Opacity of the dominant-colour tint laid over the object.
    pub overlay_opacity: f32,
    /// Eye layer size as (width, height) fractions of the object.
    pub eyes_scale: [f64; 2],
    /// Mouth layer size as (width, height) fractions of the object.
    pub mouth_scale: [f64; 2],
    pub min_eyes_size: [u32; 2],
    pub min_mouth_size: [u32; 2],
    /// Eyes sit this fraction of the object height above the centroid.
    pub eyes_rise: f64,
    /// Mouth sits this fraction of the object height below the centroid.
    pub mouth_drop: f64,
    /// Height/width ratio above which an object counts as tall.
    pub tall_ratio: f64,
    /// Extra upward shift for tall objects, as a fraction of the object height.
    pub tall_lift: f64,
    /// Language of the generated persona text.
    pub persona_language: PersonaLanguage,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            overlay_opacity: 0.25,
            eyes_scale: [0.45, 0.18],
            mouth_scale: [0.28, 0.14],
            min_eyes_size: [30, 20],
            min_mouth_size: [20, 15],
            eyes_rise: 0.18,
            mouth_drop: 0.05,
            tall_ratio: 1.2,
            tall_lift: 0.08,
            persona_language: PersonaLanguage::English,
        }
    }
}
