//! Text-to-speech for the narration.
//!
//! # Submodules
//!
//! - `chunk`: Splits narration into request-sized pieces.
//! - `google`: Google Translate TTS client (`batchexecute` protocol).
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod chunk;
pub mod google;

pub use chunk::split_text;
pub use google::GoogleTts;

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Synthesized narration.
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// MP3 stream.
    pub bytes: Bytes,
    /// Spoken locale, e.g. `zh-TW`.
    pub locale: String,
}

impl AudioClip {
    pub const MIME_TYPE: &'static str = "audio/mpeg";

    pub fn mime_type(&self) -> &'static str {
        Self::MIME_TYPE
    }
}

/// Converts text into playable audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Any failure is reported as `LabelError::SynthesisFailed`.
    async fn synthesize(&self, text: &str) -> Result<AudioClip>;

    fn locale(&self) -> &str;
}
