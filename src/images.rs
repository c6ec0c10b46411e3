//! Product image download and normalization.

use crate::amazon::links::path_extension;
use crate::amazon::PageFetcher;
use crate::config::Config;
use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extensions longer than this (dot included) are treated as bogus.
const MAX_EXTENSION_LEN: usize = 5;

/// Encoded output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Jpeg,
    Png,
    Webp,
}

/// Output extension and format chosen from an image URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTarget {
    /// File extension including the dot, as spelled in the URL
    pub extension: String,
    pub format: TargetFormat,
}

impl ImageTarget {
    /// Picks the target from the URL path extension; anything unrecognized becomes `.jpg`.
    pub fn for_url(url: &str) -> Self {
        let extension = path_extension(url).filter(|ext| ext.len() <= MAX_EXTENSION_LEN);

        let format = match extension.as_deref() {
            Some(".jpg") | Some(".jpeg") => Some(TargetFormat::Jpeg),
            Some(".png") => Some(TargetFormat::Png),
            Some(".webp") => Some(TargetFormat::Webp),
            _ => None,
        };

        match (extension, format) {
            (Some(extension), Some(format)) => Self { extension, format },
            _ => Self { extension: ".jpg".to_string(), format: TargetFormat::Jpeg },
        }
    }

    /// Filename for a record id, e.g. `grab_bar.jpg`.
    pub fn filename(&self, id: &str) -> String {
        format!("{}{}", id, self.extension)
    }
}

/// Downloads images and writes bounded, re-encoded copies into the images directory.
#[derive(Debug, Clone)]
pub struct ImageProvisioner {
    images_dir: PathBuf,
    max_dimension: u32,
    quality: u8,
}

impl ImageProvisioner {
    pub fn new(images_dir: impl Into<PathBuf>, max_dimension: u32, quality: u8) -> Self {
        Self { images_dir: images_dir.into(), max_dimension, quality }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.images_dir, config.max_image_dimension, config.image_quality)
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Downloads `url`, normalizes it and saves it as `<id><ext>`, overwriting
    /// any existing file. Returns the saved filename.
    pub async fn provision<F>(&self, fetcher: &F, url: &str, id: &str) -> Result<String>
    where
        F: PageFetcher + ?Sized,
    {
        let target = ImageTarget::for_url(url);
        info!("Downloading product image from {}", url);

        let bytes = fetcher.fetch_image(url).await?;
        let optimized = self.normalize(&bytes, target.format)?;

        std::fs::create_dir_all(&self.images_dir).with_context(|| {
            format!("Failed to create images directory: {}", self.images_dir.display())
        })?;

        let filename = target.filename(id);
        let path = self.images_dir.join(&filename);
        std::fs::write(&path, optimized)
            .with_context(|| format!("Failed to write image: {}", path.display()))?;

        debug!("Saved {}", path.display());
        Ok(filename)
    }

    /// Decodes, applies EXIF orientation, fits within the bounding box and re-encodes.
    pub fn normalize(&self, bytes: &[u8], format: TargetFormat) -> Result<Vec<u8>> {
        let mut decoder = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .context("Failed to read image data")?
            .into_decoder()
            .context("Unsupported image format")?;

        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
        let mut image = DynamicImage::from_decoder(decoder).context("Failed to decode image")?;
        image.apply_orientation(orientation);

        let image = self.fit(image);
        debug!("Encoding {}x{} image as {:?}", image.width(), image.height(), format);
        self.encode(&image, format)
    }

    /// Shrinks to fit the bounding box, preserving aspect ratio. Never upscales.
    fn fit(&self, image: DynamicImage) -> DynamicImage {
        if image.width() <= self.max_dimension && image.height() <= self.max_dimension {
            return image;
        }
        image.resize(self.max_dimension, self.max_dimension, FilterType::Lanczos3)
    }

    fn encode(&self, image: &DynamicImage, format: TargetFormat) -> Result<Vec<u8>> {
        let mut buf = Vec::new();

        match format {
            TargetFormat::Jpeg => {
                let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
                rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, self.quality))
            }
            TargetFormat::Png => image.write_with_encoder(PngEncoder::new(&mut buf)),
            TargetFormat::Webp => {
                let rgba = image.to_rgba8();
                let encoded = webp::Encoder::from_rgba(&rgba, rgba.width(), rgba.height())
                    .encode(f32::from(self.quality));
                return Ok(encoded.to_vec());
            }
        }
        .context("Failed to encode image")?;

        Ok(buf)
    }
}
