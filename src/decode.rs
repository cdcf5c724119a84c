use crate::error::{BatchError, Result};
use image::{
    ColorType, DynamicImage, ImageBuffer, ImageDecoder, ImageError, ImageFormat, ImageReader,
    RgbImage,
};
use std::fs;
use std::io::{self, Cursor, ErrorKind};
use std::path::Path;
use tracing::debug;

const PNG_TRAILER: &[u8] = &[0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82];
const JPEG_EOI: &[u8] = &[0xFF, 0xD9];
const GIF_TRAILER: u8 = 0x3B;

/// Options applied while decoding a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Keep the rows that decoded before the data ended instead of failing.
    /// The missing remainder is left black.
    pub tolerate_truncated: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            tolerate_truncated: true,
        }
    }
}

/// Decode `path` into 8-bit RGB. The format is detected from content.
///
/// The file is read in one go, so its handle is closed before decoding starts.
pub fn decode_rgb(path: &Path, options: &DecodeOptions) -> Result<RgbImage> {
    let bytes = fs::read(path)?;
    let reader = ImageReader::new(Cursor::new(bytes.as_slice())).with_guessed_format()?;
    let format = reader.format();
    match reader.decode() {
        Ok(image) => Ok(image.into_rgb8()),
        Err(err) if options.tolerate_truncated && is_truncation(&err, format, &bytes) => {
            debug!("{} is truncated, keeping the decoded part", path.display());
            decode_partial(&bytes).map_err(|_| BatchError::from(err))
        }
        Err(err) => Err(err.into()),
    }
}

/// A decode failure counts as truncation when the reader hit the end of the
/// data, or when a decoding error comes from a file missing its end marker.
fn is_truncation(err: &ImageError, format: Option<ImageFormat>, bytes: &[u8]) -> bool {
    match err {
        ImageError::IoError(e) => e.kind() == ErrorKind::UnexpectedEof,
        ImageError::Decoding(e) => {
            source_is_eof(e) || format.is_some_and(|format| ends_early(format, bytes))
        }
        _ => false,
    }
}

fn source_is_eof(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = err.source();
    while let Some(e) = source {
        if e.downcast_ref::<io::Error>()
            .is_some_and(|io| io.kind() == ErrorKind::UnexpectedEof)
        {
            return true;
        }
        source = e.source();
    }
    false
}

/// Whether `bytes` lacks the trailer every complete file of `format` ends with.
/// Formats without a fixed trailer are never reported as ending early.
fn ends_early(format: ImageFormat, bytes: &[u8]) -> bool {
    match format {
        ImageFormat::Png => !bytes.ends_with(PNG_TRAILER),
        ImageFormat::Jpeg => !bytes.ends_with(JPEG_EOI),
        ImageFormat::Gif => bytes.last() != Some(&GIF_TRAILER),
        _ => false,
    }
}

/// Decode into a zero-filled buffer and keep whatever the decoder wrote
/// before it ran out of data.
fn decode_partial(bytes: &[u8]) -> Result<RgbImage> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let format = reader.format();
    let decoder = reader.into_decoder()?;
    let (width, height) = decoder.dimensions();
    let color = decoder.color_type();
    let len = usize::try_from(decoder.total_bytes())
        .map_err(|_| BatchError::Config("image is too large to decode".into()))?;

    let mut buf = vec![0u8; len];
    if let Err(err) = decoder.read_image(&mut buf) {
        if !is_truncation(&err, format, bytes) {
            return Err(err.into());
        }
    }

    rgb_from_raw(width, height, color, format, buf).ok_or_else(|| {
        BatchError::Config(format!("cannot recover a partial {color:?} image"))
    })
}

/// Rebuild an image from a partially written decoder buffer.
///
/// 16-bit samples are only recovered for PNG, whose decoder leaves them
/// big-endian until the whole frame is read. Other deep layouts are refused.
fn rgb_from_raw(
    width: u32,
    height: u32,
    color: ColorType,
    format: Option<ImageFormat>,
    buf: Vec<u8>,
) -> Option<RgbImage> {
    let png = format == Some(ImageFormat::Png);
    let image = match color {
        ColorType::L8 => DynamicImage::ImageLuma8(ImageBuffer::from_raw(width, height, buf)?),
        ColorType::La8 => DynamicImage::ImageLumaA8(ImageBuffer::from_raw(width, height, buf)?),
        ColorType::Rgb8 => DynamicImage::ImageRgb8(ImageBuffer::from_raw(width, height, buf)?),
        ColorType::Rgba8 => DynamicImage::ImageRgba8(ImageBuffer::from_raw(width, height, buf)?),
        ColorType::L16 => DynamicImage::ImageLuma16(ImageBuffer::from_raw(width, height, png_u16(png, &buf)?)?),
        ColorType::La16 => DynamicImage::ImageLumaA16(ImageBuffer::from_raw(width, height, png_u16(png, &buf)?)?),
        ColorType::Rgb16 => DynamicImage::ImageRgb16(ImageBuffer::from_raw(width, height, png_u16(png, &buf)?)?),
        ColorType::Rgba16 => DynamicImage::ImageRgba16(ImageBuffer::from_raw(width, height, png_u16(png, &buf)?)?),
        _ => return None,
    };
    Some(image.into_rgb8())
}

fn png_u16(png: bool, buf: &[u8]) -> Option<Vec<u16>> {
    png.then(|| {
        buf.chunks_exact(2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .collect()
    })
}
