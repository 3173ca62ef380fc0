//! Summarization client for a Gemini-style generateContent API.
//!
//! The one upstream here that is routinely rate limited, so requests go
//! through a bounded retry: rate-limit failures back off and retry, every
//! other failure kind aborts immediately.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, warn};

use crate::config::SummarizerConfig;
use crate::error::{ServiceError, SummarizeError};

/// Total attempts against a rate-limited upstream before giving up.
const MAX_ATTEMPTS: usize = 5;

/// Summarization API client
pub struct SummarizerClient {
    client: Client,
    config: SummarizerConfig,
}

impl SummarizerClient {
    pub fn new(config: SummarizerConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ServiceError::Internal {
                message: format!("Failed to build summarizer HTTP client: {e}"),
            })?;

        Ok(Self { client, config })
    }

    /// Summarize `text` into a single short English paragraph.
    pub async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        let prompt = build_prompt(text, self.config.max_summary_chars);
        let summary = retry_rate_limited(|| self.request_summary(&prompt)).await?;
        debug!(chars = summary.len(), "Summary generated");
        Ok(summary)
    }

    async fn request_summary(&self, prompt: &str) -> Result<String, SummarizeError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SummarizeError::Connection {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SummarizeError::RateLimited);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SummarizeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| SummarizeError::InvalidResponse {
                    message: e.to_string(),
                })?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| SummarizeError::InvalidResponse {
                message: "no candidate text in response".to_string(),
            })
    }
}

/// The length bound, single-paragraph shape, output language, and
/// no-commentary constraint all live in the instruction.
fn build_prompt(text: &str, max_chars: usize) -> String {
    format!(
        "Summarize the following document in only 1 paragraph in less than \
         {max_chars} characters strictly. Provide ONLY the English summary. \
         Do not add any other introductory text or formatting.\n\n\
         Document:\n{text}"
    )
}

/// Retry `op` while it fails with a rate-limit error. Delays between
/// attempts double from 2s: 2, 4, 8, 16 (from_millis(2) scaled by 1000).
/// Any other error, or exhaustion, surfaces the last error.
async fn retry_rate_limited<T, F, Fut>(op: F) -> Result<T, SummarizeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SummarizeError>>,
{
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(1000)
        .take(MAX_ATTEMPTS - 1);

    RetryIf::spawn(strategy, op, |e: &SummarizeError| {
        let retrying = e.is_rate_limited();
        if retrying {
            warn!(max_attempts = MAX_ATTEMPTS, "Summarization rate limited, backing off");
        }
        retrying
    })
    .await
}

// Internal generateContent API types

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_prompt_carries_the_constraints() {
        let prompt = build_prompt("the document body", 1200);
        assert!(prompt.contains("1200 characters"));
        assert!(prompt.contains("only 1 paragraph"));
        assert!(prompt.contains("ONLY the English summary"));
        assert!(prompt.ends_with("the document body"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_retries_five_times_with_doubling_backoff() {
        let start = tokio::time::Instant::now();
        let attempts = Cell::new(0u32);

        let result: Result<(), SummarizeError> = retry_rate_limited(|| {
            attempts.set(attempts.get() + 1);
            async { Err(SummarizeError::RateLimited) }
        })
        .await;

        assert!(matches!(result, Err(SummarizeError::RateLimited)));
        assert_eq!(attempts.get(), 5);
        // 2 + 4 + 8 + 16 seconds of (paused-clock) backoff
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_failures_abort_without_retry() {
        let start = tokio::time::Instant::now();
        let attempts = Cell::new(0u32);

        let result: Result<(), SummarizeError> = retry_rate_limited(|| {
            attempts.set(attempts.get() + 1);
            async {
                Err(SummarizeError::Api {
                    status: 500,
                    message: "boom".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(SummarizeError::Api { status: 500, .. })));
        assert_eq!(attempts.get(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_rate_limits_is_returned() {
        let attempts = Cell::new(0u32);

        let result = retry_rate_limited(|| {
            attempts.set(attempts.get() + 1);
            let attempt = attempts.get();
            async move {
                if attempt < 3 {
                    Err(SummarizeError::RateLimited)
                } else {
                    Ok("a summary".to_string())
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "a summary");
        assert_eq!(attempts.get(), 3);
    }
}
