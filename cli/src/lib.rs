use character::CharacterConfig;
use object_mask::SegmentationConfig;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersonaCliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// Everything a run can tune; every section is optional in the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub segmentation: SegmentationConfig,
    pub character: CharacterConfig,
    /// Directory holding `eyes/` and `mouths/` face images
    pub assets_dir: Option<PathBuf>,
}

impl RunConfig {
    /// Load RunConfig from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, PersonaCliError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, PersonaCliError> {
        Ok(toml::from_str(content)?)
    }

    /// Load RunConfig from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, PersonaCliError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, PersonaCliError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PersonaCliError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(PersonaCliError::UnsupportedFileFormat),
        }
    }

    pub fn to_toml(&self) -> Result<String, PersonaCliError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    pub fn to_json(&self) -> Result<String, PersonaCliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    /// Save RunConfig to a TOML or JSON file, chosen by extension
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PersonaCliError> {
        let path_ref = path.as_ref();
        let content = match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => self.to_toml()?,
            Some("json") => self.to_json()?,
            _ => return Err(PersonaCliError::UnsupportedFileFormat),
        };
        fs::write(path_ref, content)?;
        Ok(())
    }

    /// JSON schema of the configuration file
    pub fn schema_json() -> Result<String, PersonaCliError> {
        Ok(serde_json::to_string_pretty(&schemars::schema_for!(RunConfig))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_mask::InversionPolicy;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RunConfig::from_toml(
            r#"
assets_dir = "assets"

[segmentation]
blur_kernel_size = 7

[segmentation.graph_cut]
iterations = 2

[segmentation.inversion]
type = "never"

[character]
overlay_opacity = 0.4
persona_language = "ko"
"#,
        )
        .expect("Should parse");

        assert_eq!(config.segmentation.blur_kernel_size, 7);
        assert_eq!(config.segmentation.graph_cut.iterations, 2);
        assert_eq!(config.segmentation.graph_cut.components, 5);
        assert_eq!(config.segmentation.inversion, InversionPolicy::Never);
        assert_eq!(config.character.overlay_opacity, 0.4);
        assert_eq!(config.character.persona_language, character::PersonaLanguage::Korean);
        assert_eq!(config.assets_dir, Some(PathBuf::from("assets")));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let mut config = RunConfig::default();
        config.segmentation.canny.low = 40.0;
        config.assets_dir = Some(PathBuf::from("faces"));

        for name in ["run.toml", "run.json"] {
            let path = dir.path().join(name);
            config.to_file(&path).expect("Should save");
            let loaded = RunConfig::from_file(&path).expect("Should load");
            assert_eq!(loaded.segmentation.canny.low, 40.0);
            assert_eq!(loaded.assets_dir, config.assets_dir);
        }

        assert!(matches!(
            RunConfig::from_file(dir.path().join("run.yaml")),
            Err(PersonaCliError::UnsupportedFileFormat)
        ));
    }

    #[test]
    fn test_schema_lists_sections() {
        let schema = RunConfig::schema_json().expect("Should generate schema");
        for key in ["segmentation", "character", "assets_dir", "graph_cut"] {
            assert!(schema.contains(key), "schema misses {key}");
        }
    }
}
