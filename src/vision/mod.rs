//! Upload validation and image normalization.
//!
//! Turns the raw bytes of an uploaded label photo into the single encoding
//! sent to the interpreter: RGB, bounded dimensions, JPEG. A passthrough mode
//! forwards the original bytes with a guessed MIME type instead.
//!
//! # Submodules
//!
//! - `models`: Upload/output types, supported formats and MIME detection.
//! - `normalize`: The size check, decode, resize and re-encode steps.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod models;
pub mod normalize;

pub use models::{ImageFormat, NormalizedImage, UploadedImage};
pub use normalize::{ImageNormalizer, NormalizerOptions};
