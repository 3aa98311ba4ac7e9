use image::Rgb;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use crate::style::Style;

/// Language of the persona text
#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter,
    PartialEq, Eq, Hash
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum PersonaLanguage {
    #[default]
    #[serde(alias = "en")]
    #[strum(to_string = "english", serialize = "en")]
    English,
    #[serde(alias = "ko")]
    #[strum(to_string = "korean", serialize = "ko")]
    Korean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Red,
    Green,
    Blue,
}

/// Ties favour red, then green
fn dominant_channel(color: Rgb<u8>) -> Channel {
    let [r, g, b] = color.0;
    if r >= g && r >= b {
        Channel::Red
    } else if g >= r && g >= b {
        Channel::Green
    } else {
        Channel::Blue
    }
}

/// Temperament derived from the dominant colour channel
pub fn tone(color: Rgb<u8>, language: PersonaLanguage) -> &'static str {
    match (dominant_channel(color), language) {
        (Channel::Red, PersonaLanguage::English) => "warm and outgoing",
        (Channel::Green, PersonaLanguage::English) => "steady and easygoing",
        (Channel::Blue, PersonaLanguage::English) => "calm and thoughtful",
        (Channel::Red, PersonaLanguage::Korean) => "따뜻하고 적극적인",
        (Channel::Green, PersonaLanguage::Korean) => "안정적이고 편안한",
        (Channel::Blue, PersonaLanguage::Korean) => "차분하고 깊이 있는",
    }
}

pub fn mood(style: Style, language: PersonaLanguage) -> &'static str {
    match language {
        PersonaLanguage::English => match style {
            Style::Cute => "a cute character who offers a small smile to everyone it meets",
            Style::Calm => "a dependable character who quietly holds its place and watches over its surroundings",
            Style::Action => "an energetic character, always ready to jump out and set off on an adventure",
        },
        PersonaLanguage::Korean => match style {
            Style::Cute => "사람들을 볼 때마다 작은 웃음을 건네는 귀여운 캐릭터입니다.",
            Style::Calm => "조용히 자기 자리를 지키며 주변을 지켜보는 든든한 캐릭터입니다.",
            Style::Action => "언제든지 튀어나와 모험을 떠날 준비가 되어 있는 에너지 넘치는 캐릭터입니다.",
        },
    }
}

/// One-sentence personality blurb for an object of the given colour and style
pub fn generate_persona(style: Style, color: Rgb<u8>) -> String {
    generate_persona_in(style, color, PersonaLanguage::English)
}

pub fn generate_persona_in(style: Style, color: Rgb<u8>, language: PersonaLanguage) -> String {
    let (tone, mood) = (tone(color, language), mood(style, language));
    match language {
        PersonaLanguage::English => format!("This object has a {tone} presence: {mood}."),
        PersonaLanguage::Korean => format!("이 사물은 {tone} 분위기를 가진 존재로, {mood}"),
    }
}
