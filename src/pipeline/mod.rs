//! Label reading pipeline.
//!
//! Sequences validate → normalize → interpret → extract summary → synthesize.
//! The first three steps are fatal: any failure halts the pipeline and no
//! later step runs. Synthesis is not: its failure is recorded in the report
//! next to the already produced text.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::config::PipelineConfig;
use crate::error::{LabelError, Result};
use crate::gemini::{prompt::label_prompt, LabelInterpreter};
use crate::speech::{AudioClip, SpeechSynthesizer};
use crate::summary::extract_summary;
use crate::vision::{ImageNormalizer, NormalizerOptions, UploadedImage};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// The three switches that used to be separate end-to-end flows.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PipelineOptions {
    pub normalize: bool,
    pub enforce_size_limit: bool,
    pub extract_summary: bool,
}

impl From<&PipelineConfig> for PipelineOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            normalize: config.normalize,
            enforce_size_limit: config.enforce_size_limit,
            extract_summary: config.extract_summary,
        }
    }
}

/// Everything produced for one upload.
#[derive(Debug)]
pub struct LabelReport {
    /// Full interpreter answer, shown to the user.
    pub text: String,
    /// The passage that was sent to speech synthesis.
    pub narration: String,
    /// `true` when summary extraction found no marker and used the default sentence.
    pub summary_fallback: bool,
    /// Audio outcome, independent of the text.
    pub audio: Result<AudioClip>,
}

pub struct Pipeline {
    normalizer: ImageNormalizer,
    interpreter: Arc<dyn LabelInterpreter>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    options: PipelineOptions,
    prompt: String,
}

impl Pipeline {
    pub fn new(
        config: &PipelineConfig,
        interpreter: Arc<dyn LabelInterpreter>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        let options = PipelineOptions::from(config);
        Self {
            normalizer: ImageNormalizer::new(NormalizerOptions::from(config)),
            interpreter,
            synthesizer,
            prompt: label_prompt(options.extract_summary),
            options,
        }
    }

    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    pub fn interpreter(&self) -> &dyn LabelInterpreter {
        self.interpreter.as_ref()
    }

    pub fn synthesizer(&self) -> &dyn SpeechSynthesizer {
        self.synthesizer.as_ref()
    }

    /// Run the whole pipeline for one upload.
    ///
    /// `Err` means the pipeline halted before any text was produced.
    pub async fn run(&self, upload: UploadedImage) -> Result<LabelReport> {
        info!(
            "Processing upload: name={:?} size={} bytes",
            upload.file_name,
            upload.size()
        );

        // 1. Size/extension checks happen before any decode work is scheduled
        self.normalizer
            .validate(&upload)
            .map_err(|e| halt("validate", e))?;

        // 2. Decode and re-encode off the async workers
        let normalizer = self.normalizer.clone();
        let image = tokio::task::spawn_blocking(move || normalizer.normalize(&upload))
            .await
            .map_err(|e| LabelError::Internal(format!("image task failed: {}", e)))?
            .map_err(|e| halt("normalize", e))?;

        // 3. Interpret
        let text = self
            .interpreter
            .interpret(&image, &self.prompt)
            .await
            .map_err(|e| halt("interpret", e))?;
        drop(image);

        info!("Interpreter returned {} chars", text.chars().count());

        // 4. Choose what to read aloud
        let (narration, summary_fallback) = if self.options.extract_summary {
            let summary = extract_summary(&text);
            if summary.fallback {
                warn!("No summary paragraph in interpreter output, using default sentence");
                crate::metrics::record_summary_fallback(self.interpreter.model());
            }
            (summary.text, summary.fallback)
        } else {
            (text.clone(), false)
        };

        // 5. Synthesize; a failure here keeps the text
        let audio = self
            .synthesizer
            .synthesize(&narration)
            .await
            .map_err(|e| match e {
                LabelError::SynthesisFailed(_) => e,
                other => LabelError::SynthesisFailed(other.to_string()),
            });

        if let Err(e) = &audio {
            warn!("Speech synthesis failed, returning text only: {}", e);
            crate::metrics::record_pipeline_failure("synthesize", e.error_type());
        }

        Ok(LabelReport {
            text,
            narration,
            summary_fallback,
            audio,
        })
    }
}

fn halt(stage: &str, e: LabelError) -> LabelError {
    error!("Pipeline halted at {}: {}", stage, e);
    crate::metrics::record_pipeline_failure(stage, e.error_type());
    e
}
