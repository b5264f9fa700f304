// Google Translate text-to-speech client
// Author: kelexine (https://github.com/kelexine)

use super::{split_text, AudioClip, SpeechSynthesizer};
use crate::config::SpeechConfig;
use crate::error::{LabelError, Result};
use async_trait::async_trait;
use base64::Engine;
use regex::Regex;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, warn};

/// RPC id of the translate frontend's speech call.
const TTS_RPC_ID: &str = "jQ1olc";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; WOW64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/47.0.2526.106 Safari/537.36";

/// Lazily initialized regex for the base64 audio payload
static AUDIO_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_audio_regex() -> &'static Regex {
    AUDIO_REGEX.get_or_init(|| {
        Regex::new(r#"jQ1olc","\[\\"(.*)\\"]"#).expect("Invalid regex pattern")
    })
}

/// Speech synthesizer backed by the Google Translate web frontend.
///
/// Narration is split into chunks of at most `max_chunk_chars` characters,
/// each chunk is one `batchexecute` call, and the returned MP3 segments are
/// concatenated in order.
pub struct GoogleTts {
    http_client: Client,
    config: SpeechConfig,
}

impl GoogleTts {
    pub fn new(config: &SpeechConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .use_rustls_tls()
            .build()
            .map_err(|e| LabelError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config: config.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/_/TranslateWebserverUi/data/batchexecute",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Synthesize one chunk.
    async fn synthesize_chunk(&self, chunk: &str) -> Result<Vec<u8>> {
        let body = package_rpc(chunk, &self.config.lang, self.config.slow);

        let response = self
            .http_client
            .post(self.endpoint())
            .header("Referer", "http://translate.google.com/")
            .header(
                "Content-Type",
                "application/x-www-form-urlencoded;charset=utf-8",
            )
            .body(body)
            .send()
            .await
            .map_err(|e| {
                crate::metrics::record_tts_call("error");
                LabelError::SynthesisFailed(format!("HTTP error: {}", e))
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            crate::metrics::record_tts_call("error");
            LabelError::SynthesisFailed(format!("Failed to read response body: {}", e))
        })?;

        if !status.is_success() {
            crate::metrics::record_tts_call("error");
            return Err(LabelError::SynthesisFailed(format!(
                "HTTP {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        crate::metrics::record_tts_call("success");
        parse_audio(&text)
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(&self, text: &str) -> Result<AudioClip> {
        let chunks = split_text(text, self.config.max_chunk_chars);
        if chunks.is_empty() {
            return Err(LabelError::SynthesisFailed(
                "nothing to synthesize".to_string(),
            ));
        }

        debug!(
            "Synthesizing {} chars in {} chunk(s), lang={}",
            text.chars().count(),
            chunks.len(),
            self.config.lang
        );

        let mut audio = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let segment = self.synthesize_chunk(chunk).await.map_err(|e| {
                warn!("TTS chunk {}/{} failed: {}", i + 1, chunks.len(), e);
                e
            })?;
            audio.extend_from_slice(&segment);
        }

        info!("Synthesized {} bytes of audio", audio.len());

        Ok(AudioClip {
            bytes: audio.into(),
            locale: self.config.lang.clone(),
        })
    }

    fn locale(&self) -> &str {
        &self.config.lang
    }
}

/// Build the form body for one `batchexecute` speech call.
fn package_rpc(text: &str, lang: &str, slow: bool) -> String {
    let speed = if slow { Value::Bool(true) } else { Value::Null };
    let parameter = json!([text, lang, speed, "null"]).to_string();
    let rpc = json!([[[TTS_RPC_ID, parameter, Value::Null, "generic"]]]).to_string();
    format!("f.req={}&", urlencoding::encode(&rpc))
}

/// Find the base64 MP3 payload in a `batchexecute` response.
fn parse_audio(body: &str) -> Result<Vec<u8>> {
    let line = body
        .lines()
        .find(|line| line.contains(TTS_RPC_ID))
        .ok_or_else(|| {
            LabelError::SynthesisFailed("no speech payload in response".to_string())
        })?;

    let encoded = get_audio_regex()
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            LabelError::SynthesisFailed("speech payload carries no audio".to_string())
        })?;

    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| LabelError::SynthesisFailed(format!("invalid audio encoding: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_rpc() {
        let body = package_rpc("你好", "zh-TW", false);
        assert!(body.starts_with("f.req="));
        assert!(body.ends_with('&'));

        let decoded = urlencoding::decode(&body["f.req=".len()..body.len() - 1]).unwrap();
        let rpc: Value = serde_json::from_str(&decoded).unwrap();
        assert_eq!(rpc[0][0][0], "jQ1olc");
        assert_eq!(rpc[0][0][3], "generic");

        let parameter: Value = serde_json::from_str(rpc[0][0][1].as_str().unwrap()).unwrap();
        assert_eq!(parameter, json!(["你好", "zh-TW", null, "null"]));
    }

    #[test]
    fn test_package_rpc_slow() {
        let body = package_rpc("a", "zh-TW", true);
        let decoded = urlencoding::decode(&body["f.req=".len()..body.len() - 1]).unwrap();
        let rpc: Value = serde_json::from_str(&decoded).unwrap();
        let parameter: Value = serde_json::from_str(rpc[0][0][1].as_str().unwrap()).unwrap();
        assert_eq!(parameter[2], json!(true));
    }

    #[test]
    fn test_parse_audio() {
        let body = concat!(
            ")]}'\n\n",
            "104\n",
            r#"[["wrb.fr","jQ1olc","[\"SUQzBAAA\"]",null,null,null,"generic"],["di",42]]"#,
            "\n"
        );
        assert_eq!(parse_audio(body).unwrap(), b"ID3\x04\x00\x00");
    }

    #[test]
    fn test_parse_audio_missing_payload() {
        let err = parse_audio(")]}'\n\n[[\"wrb.fr\",\"jQ1olc\",null]]").unwrap_err();
        assert!(matches!(err, LabelError::SynthesisFailed(_)));

        let err = parse_audio("<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, LabelError::SynthesisFailed(_)));
    }
}
