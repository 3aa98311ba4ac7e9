use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CharacterError {
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Failed to read face asset {path}: {source}")]
    Asset {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to list asset directory {path}: {source}")]
    AssetDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot compose onto a {mask_width}x{mask_height} mask")]
    EmptyMask { mask_width: u32, mask_height: u32 },
}

pub type Result<T> = std::result::Result<T, CharacterError>;
