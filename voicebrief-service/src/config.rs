//! Static service configuration, loaded once at startup.
//! API keys are required fields: a missing key fails deserialization and
//! stops the service before it binds.

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct StaticConfig {
    #[serde(default = "default_server")]
    pub server: ServerConfig,

    #[serde(default = "default_storage")]
    pub storage: StorageConfig,

    pub summarizer: SummarizerConfig,

    pub sarvam: SarvamConfig,

    #[serde(default = "default_limits")]
    pub limits: LimitsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Scratch directories for uploaded PDFs and generated audio clips.
/// Uploads are removed after each request; audio clips accumulate until
/// cleaned externally.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,
}

/// Summarization API (Gemini-style generateContent endpoint)
#[derive(Debug, Clone, Deserialize)]
pub struct SummarizerConfig {
    pub api_key: String,

    #[serde(default = "default_summarizer_base_url")]
    pub base_url: String,

    #[serde(default = "default_summarizer_model")]
    pub model: String,

    #[serde(default = "default_max_summary_chars")]
    pub max_summary_chars: usize,

    #[serde(default = "default_summarizer_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Sarvam translation / text-to-speech API
#[derive(Debug, Clone, Deserialize)]
pub struct SarvamConfig {
    pub api_key: String,

    #[serde(default = "default_sarvam_base_url")]
    pub base_url: String,

    #[serde(default = "default_sarvam_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Request size limits
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

// ==================== Default Value Functions ====================

pub(crate) fn default_server() -> ServerConfig {
    ServerConfig {
        host: default_host(),
        port: default_port(),
    }
}

pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    8080
}

pub(crate) fn default_storage() -> StorageConfig {
    StorageConfig {
        upload_dir: default_upload_dir(),
        audio_dir: default_audio_dir(),
    }
}

pub(crate) fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

pub(crate) fn default_audio_dir() -> PathBuf {
    PathBuf::from("./static/audio")
}

pub(crate) fn default_summarizer_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

pub(crate) fn default_summarizer_model() -> String {
    "gemini-2.5-pro".to_string()
}

pub(crate) fn default_max_summary_chars() -> usize {
    1200
}

pub(crate) fn default_summarizer_timeout_secs() -> u64 {
    120
}

pub(crate) fn default_sarvam_base_url() -> String {
    "https://api.sarvam.ai".to_string()
}

pub(crate) fn default_sarvam_timeout_secs() -> u64 {
    60
}

pub(crate) fn default_limits() -> LimitsConfig {
    LimitsConfig {
        max_upload_bytes: default_max_upload_bytes(),
    }
}

pub(crate) fn default_max_upload_bytes() -> u64 {
    25 * 1024 * 1024
}
