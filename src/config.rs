use crate::error::{BatchError, Result};
use crate::paths::DEFAULT_EXTENSIONS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Resize and normalization settings for [`crate::preprocess::ImageTransform`].
///
/// Defaults follow the `OpenAI` CLIP preprocessing at 224px.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    pub image_size: u32,
    pub mean: [f32; 3],
    pub std: [f32; 3],
    pub interpolation: String,
    pub resize_mode: String,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            image_size: 224,
            mean: [0.481_454_66, 0.457_827_5, 0.408_210_73],
            std: [0.268_629_54, 0.261_302_6, 0.275_777_1],
            interpolation: "bicubic".to_string(),
            resize_mode: "shortest".to_string(),
        }
    }
}

impl PreprocessConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.image_size == 0 {
            return Err(BatchError::Config("image_size must be positive".into()));
        }
        if self.std.iter().any(|&s| s == 0.0) {
            return Err(BatchError::Config("std must not contain zeros".into()));
        }
        Ok(())
    }
}

/// Settings for a [`crate::loader::FolderLoader`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// File name suffixes, dot included. Matched case-sensitively.
    pub extensions: Vec<String>,
    /// Keep the decodable part of files whose data ends early.
    pub tolerate_truncated: bool,
    /// How many failures the skip summary lists individually.
    pub max_reported_failures: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
            tolerate_truncated: true,
            max_reported_failures: 5,
        }
    }
}

impl LoaderConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        if config.extensions.iter().any(String::is_empty) {
            return Err(BatchError::Config("extensions must not be empty strings".into()));
        }
        Ok(config)
    }
}
