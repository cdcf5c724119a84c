use crate::config::LoaderConfig;
use crate::decode::{decode_rgb, DecodeOptions};
use crate::device::Device;
use crate::error::{BatchError, Result};
use crate::paths::list_image_paths;
use crate::preprocess::Preprocess;
use ndarray::{ArrayD, Axis};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A file that could not be turned into a sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub path: PathBuf,
    pub error: String,
}

/// What happened during one load.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub folder: PathBuf,
    pub attempted: usize,
    pub failures: Vec<FailureRecord>,
    max_listed: usize,
}

impl LoadReport {
    #[must_use]
    pub fn loaded(&self) -> usize {
        self.attempted - self.failures.len()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[load_images_as_tensor] Skipped {}/{} broken images in {}",
            self.failures.len(),
            self.attempted,
            self.folder.display()
        )?;
        for failure in self.failures.iter().take(self.max_listed) {
            write!(f, "\n  - {} {}", failure.path.display(), failure.error)?;
        }
        Ok(())
    }
}

/// Loads every image in one folder into a single batch.
#[derive(Debug, Clone)]
pub struct FolderLoader {
    folder: PathBuf,
    config: LoaderConfig,
}

impl FolderLoader {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self::with_config(folder, LoaderConfig::default())
    }

    pub fn with_config(folder: impl Into<PathBuf>, config: LoaderConfig) -> Self {
        Self {
            folder: folder.into(),
            config,
        }
    }

    #[must_use]
    pub fn with_extensions<S: AsRef<str>>(mut self, extensions: &[S]) -> Self {
        self.config.extensions = extensions.iter().map(|e| e.as_ref().to_string()).collect();
        self
    }

    #[must_use]
    pub fn tolerate_truncated(mut self, tolerate: bool) -> Self {
        self.config.tolerate_truncated = tolerate;
        self
    }

    #[must_use]
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    #[must_use]
    pub fn list_paths(&self) -> Vec<PathBuf> {
        list_image_paths(&self.folder, self.config.extensions.as_slice())
    }

    /// Load the folder and hand the batch to `device`.
    pub fn load<P, D>(&self, preprocess: &P, device: &D) -> Result<D::Tensor>
    where
        P: Preprocess + ?Sized,
        D: Device,
    {
        self.load_with_report(preprocess, device)
            .map(|(tensor, _)| tensor)
    }

    /// Like [`FolderLoader::load`], also returning which files were skipped.
    ///
    /// When some files fail, the skip summary is printed to stdout.
    pub fn load_with_report<P, D>(
        &self,
        preprocess: &P,
        device: &D,
    ) -> Result<(D::Tensor, LoadReport)>
    where
        P: Preprocess + ?Sized,
        D: Device,
    {
        let paths = self.list_paths();
        if paths.is_empty() {
            return Err(BatchError::NoImagesFound {
                folder: self.folder.clone(),
            });
        }

        let options = DecodeOptions {
            tolerate_truncated: self.config.tolerate_truncated,
        };
        let mut samples = Vec::with_capacity(paths.len());
        let mut failures = Vec::new();
        for path in &paths {
            match load_sample(path, &options, preprocess) {
                Ok(sample) => samples.push(sample),
                Err(failure) => {
                    debug!("Skipping {}: {}", failure.path.display(), failure.error);
                    failures.push(failure);
                }
            }
        }

        if samples.is_empty() {
            let first = failures.into_iter().next();
            return Err(BatchError::AllImagesFailed {
                folder: self.folder.clone(),
                path: first.as_ref().map(|f| f.path.clone()).unwrap_or_default(),
                cause: first.map_or_else(|| "unknown".to_string(), |f| f.error),
            });
        }

        let report = LoadReport {
            folder: self.folder.clone(),
            attempted: paths.len(),
            failures,
            max_listed: self.config.max_reported_failures,
        };
        if report.has_failures() {
            warn!(
                "Skipped {}/{} images in {}",
                report.failures.len(),
                report.attempted,
                report.folder.display()
            );
            println!("{report}");
        }

        let views: Vec<_> = samples.iter().map(|s| s.view()).collect();
        let batch = ndarray::stack(Axis(0), &views)?;

        info!(
            "Loaded batch of shape {:?} from {} onto {}",
            batch.shape(),
            self.folder.display(),
            device.name()
        );
        let tensor = device.transfer(batch)?;
        Ok((tensor, report))
    }
}

fn load_sample<P>(
    path: &Path,
    options: &DecodeOptions,
    preprocess: &P,
) -> std::result::Result<ArrayD<f32>, FailureRecord>
where
    P: Preprocess + ?Sized,
{
    let fail = |error: BatchError| FailureRecord {
        path: path.to_owned(),
        error: error.to_string(),
    };
    let image = decode_rgb(path, options).map_err(fail)?;
    preprocess
        .preprocess(&image)
        .map_err(|e| fail(BatchError::Preprocess(e)))
}

/// Load every image in `folder` with the default extensions.
///
/// Unreadable files are skipped and summarized on stdout. Fails when the
/// folder has no matching files, when every file fails, or when samples
/// differ in shape.
pub fn load_images_as_tensor<P, D>(
    folder: impl AsRef<Path>,
    preprocess: &P,
    device: &D,
) -> Result<D::Tensor>
where
    P: Preprocess + ?Sized,
    D: Device,
{
    FolderLoader::new(folder.as_ref()).load(preprocess, device)
}
