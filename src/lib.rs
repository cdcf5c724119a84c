#![allow(clippy::missing_errors_doc)]
pub mod config;
pub mod decode;
pub mod device;
pub mod error;
pub mod loader;
pub mod paths;
pub mod preprocess;

pub use config::{LoaderConfig, PreprocessConfig};
pub use device::{Cpu, Device};
pub use error::{BatchError, Result};
pub use loader::{load_images_as_tensor, FailureRecord, FolderLoader, LoadReport};
pub use paths::{list_image_paths, DEFAULT_EXTENSIONS};
pub use preprocess::{ImageTransform, Preprocess};
