use crate::config::PreprocessConfig;
use crate::error::Result;
use anyhow::{bail, ensure};
use image::{imageops, imageops::FilterType, RgbImage};
use ndarray::{Array3, ArrayD, Axis};

/// Turns one decoded image into one fixed-shape sample.
pub trait Preprocess {
    fn preprocess(&self, image: &RgbImage) -> anyhow::Result<ArrayD<f32>>;
}

impl<F> Preprocess for F
where
    F: Fn(&RgbImage) -> anyhow::Result<ArrayD<f32>>,
{
    fn preprocess(&self, image: &RgbImage) -> anyhow::Result<ArrayD<f32>> {
        self(image)
    }
}

/// Resize, crop and normalize into a `(3, size, size)` CHW sample.
#[derive(Debug, Clone, Default)]
pub struct ImageTransform {
    pub config: PreprocessConfig,
}

impl ImageTransform {
    pub fn new(config: PreprocessConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    fn filter(&self) -> FilterType {
        match self.config.interpolation.as_str() {
            "bicubic" => FilterType::CatmullRom,
            "bilinear" => FilterType::Triangle,
            _ => FilterType::Nearest,
        }
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn resize(&self, image: &RgbImage) -> RgbImage {
        let size = self.config.image_size;
        let interp = self.filter();
        match self.config.resize_mode.as_str() {
            "squash" => imageops::resize(image, size, size, interp),
            _ => {
                let (width, height) = image.dimensions();
                let scale = size as f32 / width.min(height) as f32;
                let scaled_width = ((width as f32 * scale).round() as u32).max(size);
                let scaled_height = ((height as f32 * scale).round() as u32).max(size);
                let resized = imageops::resize(image, scaled_width, scaled_height, interp);
                let x = ((scaled_width - size) as f32 / 2.0).round() as u32;
                let y = ((scaled_height - size) as f32 / 2.0).round() as u32;
                imageops::crop_imm(&resized, x, y, size, size).to_image()
            }
        }
    }
}

impl Preprocess for ImageTransform {
    fn preprocess(&self, image: &RgbImage) -> anyhow::Result<ArrayD<f32>> {
        let (width, height) = image.dimensions();
        ensure!(width > 0 && height > 0, "image has no pixels ({width}x{height})");

        let resized = self.resize(image);
        let size = self.config.image_size as usize;
        let (mean, std) = (self.config.mean, self.config.std);

        let pixels = resized.as_raw();
        let channel_len = size * size;
        if pixels.len() != channel_len * 3 {
            bail!("resized image has {} bytes, expected {}", pixels.len(), channel_len * 3);
        }

        let mut out = Array3::<f32>::zeros((3, size, size));
        for c in 0..3 {
            let channel = out.index_axis_mut(Axis(0), c);
            let flat = channel
                .into_slice()
                .ok_or_else(|| anyhow::anyhow!("Layout mismatch"))?;
            for i in 0..channel_len {
                let val = f32::from(pixels[i * 3 + c]) / 255.0;
                flat[i] = (val - mean[c]) / std[c];
            }
        }

        Ok(out.into_dyn())
    }
}
