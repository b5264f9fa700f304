// Gemini API client module
// Author: kelexine (https://github.com/kelexine)

mod client;
pub mod prompt;

pub use client::{extract_text, GeminiClient};

use crate::error::Result;
use crate::vision::NormalizedImage;
use async_trait::async_trait;

/// Reads a label image and explains it in natural language.
///
/// Implemented by [`GeminiClient`]; tests substitute fakes.
#[async_trait]
pub trait LabelInterpreter: Send + Sync {
    /// Send one image with the instruction text and return the model's answer.
    async fn interpret(&self, image: &NormalizedImage, prompt: &str) -> Result<String>;

    /// Model identifier, for logs and health output.
    fn model(&self) -> &str;
}
