use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, VariantNames};

/// Personality of the generated character.
///
/// Parses both the English keys and the Korean labels (`귀여움`, `잔잔함`, `액션`).
#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames,
    PartialEq, Eq, Hash
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Style {
    #[default]
    #[serde(alias = "귀여움")]
    #[strum(to_string = "cute", serialize = "귀여움")]
    Cute,
    #[serde(alias = "잔잔함")]
    #[strum(to_string = "calm", serialize = "잔잔함")]
    Calm,
    #[serde(alias = "액션")]
    #[strum(to_string = "action", serialize = "액션")]
    Action,
}

impl Style {
    pub fn all() -> Vec<Style> {
        Self::iter().collect()
    }

    pub fn names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    /// File-name prefix (`<key>_`) of face assets drawn for this style
    pub fn asset_key(&self) -> &'static str {
        match self {
            Self::Cute => "cute",
            Self::Calm => "calm",
            Self::Action => "action",
        }
    }

    pub fn korean_label(&self) -> &'static str {
        match self {
            Self::Cute => "귀여움",
            Self::Calm => "잔잔함",
            Self::Action => "액션",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_english_and_korean() {
        assert_eq!(Style::from_str("cute").ok(), Some(Style::Cute));
        assert_eq!(Style::from_str("Action").ok(), Some(Style::Action));
        assert_eq!(Style::from_str("잔잔함").ok(), Some(Style::Calm));
        assert_eq!(Style::from_str("액션").ok(), Some(Style::Action));
        assert!(Style::from_str("grumpy").is_err());
    }

    #[test]
    fn test_display_and_keys_agree() {
        for style in Style::all() {
            assert_eq!(style.to_string(), style.asset_key());
            assert_eq!(Style::from_str(style.korean_label()).ok(), Some(style));
        }
    }

    #[test]
    fn test_serde_accepts_korean_alias() {
        let style: Style = serde_json::from_str("\"귀여움\"").expect("Should parse alias");
        assert_eq!(style, Style::Cute);
        assert_eq!(serde_json::to_string(&Style::Calm).expect("Should serialize"), "\"calm\"");
    }
}
