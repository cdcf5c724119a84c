use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Preprocess(#[from] anyhow::Error),
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
    #[error("No images found in {}", folder.display())]
    NoImagesFound { folder: PathBuf },
    #[error(
        "All images failed to load in {}. First error: ({}, {cause})",
        folder.display(),
        path.display()
    )]
    AllImagesFailed {
        folder: PathBuf,
        path: PathBuf,
        cause: String,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Device error: {0}")]
    Device(String),
}

impl BatchError {
    /// Whether this error means the folder produced no usable batch at all.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NoImagesFound { .. } | Self::AllImagesFailed { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, BatchError>;
