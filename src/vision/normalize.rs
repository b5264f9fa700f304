// Upload validation and JPEG normalization
// Author: kelexine (https://github.com/kelexine)

use super::models::{ImageFormat, NormalizedImage, UploadedImage};
use crate::config::PipelineConfig;
use crate::error::{LabelError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

/// Knobs taken from [`PipelineConfig`].
#[derive(Debug, Clone)]
pub struct NormalizerOptions {
    pub normalize: bool,
    pub enforce_size_limit: bool,
    pub max_upload_bytes: usize,
    pub max_dimension: Option<u32>,
    pub jpeg_quality: u8,
    pub allowed_extensions: Vec<String>,
}

impl From<&PipelineConfig> for NormalizerOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            normalize: config.normalize,
            enforce_size_limit: config.enforce_size_limit,
            max_upload_bytes: config.max_upload_bytes,
            max_dimension: config.max_dimension,
            jpeg_quality: config.jpeg_quality,
            allowed_extensions: config.allowed_extensions.clone(),
        }
    }
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

/// Validates uploads and produces the bytes sent to the interpreter.
#[derive(Debug, Clone, Default)]
pub struct ImageNormalizer {
    options: NormalizerOptions,
}

impl ImageNormalizer {
    pub fn new(options: NormalizerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NormalizerOptions {
        &self.options
    }

    /// Cheap checks that need no decoding: size ceiling, then extension.
    pub fn validate(&self, upload: &UploadedImage) -> Result<()> {
        if self.options.enforce_size_limit && upload.size() > self.options.max_upload_bytes {
            return Err(LabelError::FileTooLarge {
                size: upload.size(),
                limit: self.options.max_upload_bytes,
            });
        }

        match upload.extension() {
            Some(ext) => {
                if !self.is_allowed(&ext) {
                    return Err(LabelError::UnsupportedImageFormat(format!(
                        "file extension .{} is not accepted (allowed: {})",
                        ext,
                        self.options.allowed_extensions.join(", ")
                    )));
                }
            }
            // Nameless uploads are held to the same list via the declared or sniffed type
            None => {
                if let Some(format) = declared_or_sniffed(upload) {
                    if !format.extensions().iter().any(|ext| self.is_allowed(ext)) {
                        return Err(LabelError::UnsupportedImageFormat(format!(
                            "{} uploads are not accepted (allowed: {})",
                            format.mime_type(),
                            self.options.allowed_extensions.join(", ")
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    fn is_allowed(&self, ext: &str) -> bool {
        self.options
            .allowed_extensions
            .iter()
            .any(|a| a.eq_ignore_ascii_case(ext))
    }

    /// Validate and convert an upload.
    ///
    /// Decoding is CPU-bound; async callers should run this on the blocking pool.
    pub fn normalize(&self, upload: &UploadedImage) -> Result<NormalizedImage> {
        self.validate(upload)?;

        if self.options.normalize {
            self.reencode(upload)
        } else {
            self.passthrough(upload)
        }
    }

    fn reencode(&self, upload: &UploadedImage) -> Result<NormalizedImage> {
        let decoded = image::load_from_memory(&upload.bytes)
            .map_err(|e| LabelError::UnsupportedImageFormat(e.to_string()))?;
        let (orig_w, orig_h) = (decoded.width(), decoded.height());

        let mut rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());
        if let Some(bound) = self.options.max_dimension {
            if rgb.width() > bound || rgb.height() > bound {
                // resize() fits inside bound x bound and keeps the aspect ratio
                rgb = rgb.resize(bound, bound, FilterType::Triangle);
            }
        }
        let rgb = rgb.to_rgb8();

        let mut bytes = Vec::new();
        rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, self.options.jpeg_quality))
            .map_err(|e| LabelError::Internal(format!("JPEG encoding failed: {}", e)))?;

        debug!(
            "Normalized {}x{} upload ({} bytes) to {}x{} JPEG ({} bytes)",
            orig_w,
            orig_h,
            upload.size(),
            rgb.width(),
            rgb.height(),
            bytes.len()
        );

        Ok(NormalizedImage {
            bytes,
            mime_type: ImageFormat::Jpeg.mime_type().to_string(),
            dimensions: Some((rgb.width(), rgb.height())),
        })
    }

    fn passthrough(&self, upload: &UploadedImage) -> Result<NormalizedImage> {
        let format = upload
            .extension()
            .and_then(|ext| ImageFormat::from_extension(&ext))
            .or_else(|| declared_or_sniffed(upload))
            .ok_or_else(|| {
                LabelError::UnsupportedImageFormat(
                    "could not determine the image type from the file name, declared type or contents"
                        .to_string(),
                )
            })?;

        debug!("Passing {} byte upload through as {}", upload.size(), format.mime_type());

        Ok(NormalizedImage {
            bytes: upload.bytes.to_vec(),
            mime_type: format.mime_type().to_string(),
            dimensions: None,
        })
    }
}

/// Declared `Content-Type` first, then magic bytes.
fn declared_or_sniffed(upload: &UploadedImage) -> Option<ImageFormat> {
    upload
        .content_type
        .as_deref()
        .and_then(ImageFormat::from_mime_type)
        .or_else(|| ImageFormat::sniff(&upload.bytes))
}
