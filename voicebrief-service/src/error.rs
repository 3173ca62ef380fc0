use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Main service error type
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Text extraction failed")]
    Extraction(#[from] ExtractError),

    #[error("Summarization failed")]
    Summarization(#[from] SummarizeError),

    #[error("Translation failed")]
    Translation(#[source] SarvamError),

    #[error("Speech synthesis failed")]
    Synthesis(#[source] SarvamError),

    #[error("Audio clip not found: {filename}")]
    AudioNotFound { filename: String },

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// PDF text extraction errors
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("PDFium library unavailable")]
    Library {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to open PDF")]
    Open {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to extract text from page {page}")]
    Page {
        page: u32,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("No extractable text in document")]
    Empty,
}

/// Summarization API errors
#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("Connection failed to summarization API at {url}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Summarization API rate limit exceeded")]
    RateLimited,

    #[error("Summarization failed (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response from summarization API: {message}")]
    InvalidResponse { message: String },
}

impl SummarizeError {
    /// Rate limits are the one failure kind worth retrying.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SummarizeError::RateLimited)
    }
}

/// Sarvam translation / text-to-speech API errors
#[derive(Error, Debug)]
pub enum SarvamError {
    #[error("Connection failed to Sarvam API at {url}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Sarvam API call failed (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response from Sarvam API")]
    InvalidResponse {
        #[source]
        source: reqwest::Error,
    },

    #[error("Response contained no audio data")]
    NoAudio,

    #[error("Audio payload was not valid base64")]
    InvalidAudio {
        #[source]
        source: base64::DecodeError,
    },
}

impl ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            // A missing PDFium library is a deployment problem, not a bad upload
            ServiceError::Extraction(ExtractError::Library { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServiceError::Extraction(_) => StatusCode::BAD_REQUEST,
            ServiceError::AudioNotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short human-readable message for the response body. Underlying causes
    /// stay in the server logs.
    fn user_message(&self) -> String {
        match self {
            ServiceError::InvalidRequest { message } => message.clone(),
            ServiceError::Extraction(ExtractError::Library { .. }) => {
                "Internal server error.".to_string()
            }
            ServiceError::Extraction(_) => {
                "Could not extract text from the PDF. It might be empty or scanned.".to_string()
            }
            ServiceError::Summarization(_) => {
                "Could not generate a summary. The service may be temporarily unavailable or rate limited."
                    .to_string()
            }
            ServiceError::Translation(_) => "Could not translate the summary.".to_string(),
            ServiceError::Synthesis(_) => "Could not generate the audio clip.".to_string(),
            ServiceError::AudioNotFound { .. } => "Audio clip not found.".to_string(),
            ServiceError::Io(_) | ServiceError::Internal { .. } => {
                "Internal server error.".to_string()
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        } else {
            tracing::warn!(error = ?self, "Request rejected");
        }

        (status, self.user_message()).into_response()
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
