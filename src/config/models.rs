//! Configuration data structures for label-helper.
//!
//! This module defines the schema for the application settings, including
//! server parameters, the Gemini credential, speech synthesis and the
//! pipeline toggles that select between normalizing and passthrough uploads.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port, workers).
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream Gemini API settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Text-to-speech settings.
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Upload handling and response post-processing toggles.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `8080`
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads for the Tokio runtime.
    /// Default: Number of logical CPU cores.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// Gemini API key.
///
/// Serialized as a plain string so it can travel through the layered config
/// sources, but never printed by `Debug` and wiped from memory on drop.
#[derive(Clone, Default, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            f.write_str("ApiKey(<unset>)")
        } else {
            f.write_str("ApiKey([REDACTED])")
        }
    }
}

/// Settings for the upstream Gemini API connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Base URL for the public Generative Language API.
    /// Default: `https://generativelanguage.googleapis.com/v1`
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Model used to read the label.
    /// Default: `gemini-1.5-flash`
    #[serde(default = "default_model")]
    pub model: String,

    /// API key, sent as the `key` query parameter.
    /// Falls back to the `GEMINI_API_KEY` environment variable when unset.
    #[serde(default)]
    pub api_key: ApiKey,

    /// Request timeout in seconds.
    /// Default: `60`
    #[serde(default = "default_gemini_timeout")]
    pub timeout_seconds: u64,
}

/// Settings for the Google Translate text-to-speech endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Base URL of the translate web frontend.
    /// Default: `https://translate.google.com`
    #[serde(default = "default_speech_base_url")]
    pub base_url: String,

    /// Spoken language / locale.
    /// Default: `zh-TW`
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Request slower speech.
    /// Default: `false`
    #[serde(default)]
    pub slow: bool,

    /// Maximum characters per synthesis request.
    /// Default: `100`
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// Per-chunk request timeout in seconds.
    /// Default: `30`
    #[serde(default = "default_speech_timeout")]
    pub timeout_seconds: u64,
}

/// Settings that select the upload handling variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Decode, convert to RGB, bound and re-encode as JPEG.
    /// When `false` the raw upload is forwarded as-is.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub normalize: bool,

    /// Reject uploads larger than `max_upload_bytes`.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub enforce_size_limit: bool,

    /// Narrate only the marked summary paragraph instead of the full text.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub extract_summary: bool,

    /// Upload size ceiling in bytes.
    /// Default: `5242880` (5 MiB)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Longest side after normalization, `None` keeps the original size.
    /// Default: `1024`
    #[serde(default = "default_max_dimension")]
    pub max_dimension: Option<u32>,

    /// JPEG quality used when re-encoding (1-100).
    /// Default: `85`
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Accepted file extensions (lowercase, without the dot).
    /// Default: `["jpg", "jpeg", "png"]`
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default trait implementations linking to custom logic

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            model: default_model(),
            api_key: ApiKey::default(),
            timeout_seconds: default_gemini_timeout(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base_url: default_speech_base_url(),
            lang: default_lang(),
            slow: false,
            max_chunk_chars: default_max_chunk_chars(),
            timeout_seconds: default_speech_timeout(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            normalize: true,
            enforce_size_limit: true,
            extract_summary: true,
            max_upload_bytes: default_max_upload_bytes(),
            max_dimension: default_max_dimension(),
            jpeg_quality: default_jpeg_quality(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Helper functions for serde defaults and shared constants
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_true() -> bool {
    true
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1".to_string()
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_gemini_timeout() -> u64 {
    60
}

fn default_speech_base_url() -> String {
    "https://translate.google.com".to_string()
}

fn default_lang() -> String {
    "zh-TW".to_string()
}

fn default_max_chunk_chars() -> usize {
    100
}

fn default_speech_timeout() -> u64 {
    30
}

fn default_max_upload_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_max_dimension() -> Option<u32> {
    Some(1024)
}

fn default_jpeg_quality() -> u8 {
    85
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
