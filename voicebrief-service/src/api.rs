//! HTTP surface for the Voicebrief service.
//!
//! Three routes do the work: the upload form, the pipeline submission, and
//! the generated-audio download. `/health` reports liveness.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::StaticConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::pages;
use crate::pipeline::{self, Upload};
use crate::sarvam::SarvamClient;
use crate::summarize::SummarizerClient;

/// Language used when the form does not send a code.
const DEFAULT_LANGUAGE: &str = "hi";

/// Application state
pub struct AppState {
    pub config: StaticConfig,
    pub summarizer: SummarizerClient,
    pub sarvam: SarvamClient,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: StaticConfig) -> ServiceResult<Self> {
        let summarizer = SummarizerClient::new(config.summarizer.clone())?;
        let sarvam = SarvamClient::new(config.sarvam.clone())?;

        Ok(Self {
            config,
            summarizer,
            sarvam,
            start_time: Instant::now(),
        })
    }
}

/// Build the router
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let max_body = state.config.limits.max_upload_bytes as usize;

    Router::new()
        .route(
            "/",
            get(index_handler)
                .post(submit_handler)
                .layer(DefaultBodyLimit::max(max_body)),
        )
        .route("/static/audio/{filename}", get(audio_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the upload form
async fn index_handler() -> Html<String> {
    Html(pages::upload_form())
}

/// Accept a PDF upload and run the pipeline
async fn submit_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Html<String>, ServiceError> {
    let mut upload: Option<Upload> = None;
    let mut language_code: Option<String> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name().unwrap_or("") {
            "pdf_file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ServiceError::InvalidRequest {
                        message: e.to_string(),
                    })?;
                upload = Some(Upload {
                    filename,
                    data: data.to_vec(),
                });
            }
            "language_code" => {
                let code = field
                    .text()
                    .await
                    .map_err(|e| ServiceError::InvalidRequest {
                        message: e.to_string(),
                    })?;
                if !code.is_empty() {
                    language_code = Some(code);
                }
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| ServiceError::InvalidRequest {
        message: "No file part in the request.".to_string(),
    })?;
    let language_code = language_code.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    let output = pipeline::run(&state, upload, &language_code).await?;

    let audio_url = format!("/static/audio/{}", output.audio_filename);
    Ok(Html(pages::result_page(&output.summary, &audio_url)))
}

/// Serve a previously generated audio clip
async fn audio_handler(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, ServiceError> {
    if !is_safe_audio_filename(&filename) {
        return Err(ServiceError::InvalidRequest {
            message: "Invalid audio filename.".to_string(),
        });
    }

    let path = state.config.storage.audio_dir.join(&filename);
    let data = match std::fs::read(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ServiceError::AudioNotFound { filename });
        }
        Err(e) => return Err(ServiceError::Io(e)),
    };

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "audio/mpeg")],
        data,
    )
        .into_response())
}

/// Served names are always generated by us (uuid token + language + .mp3);
/// anything that could escape the audio directory is rejected outright.
fn is_safe_audio_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains(['/', '\\'])
        && !filename.contains("..")
        && filename.ends_with(".mp3")
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt as _;

    const BOUNDARY: &str = "voicebrief-test-boundary";

    fn test_state(dir: &std::path::Path) -> Arc<AppState> {
        let config: StaticConfig = serde_json::from_value(serde_json::json!({
            "storage": {
                "upload_dir": dir.join("uploads"),
                "audio_dir": dir.join("audio"),
            },
            "summarizer": { "api_key": "test-key" },
            "sarvam": { "api_key": "test-key" },
        }))
        .unwrap();

        std::fs::create_dir_all(&config.storage.upload_dir).unwrap();
        std::fs::create_dir_all(&config.storage.audio_dir).unwrap();

        Arc::new(AppState::new(config).unwrap())
    }

    fn multipart_upload(filename: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"pdf_file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        );

        Request::post("/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_form_is_served() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(test_state(dir.path()));

        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_non_pdf_upload_is_rejected_before_any_work() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let app = router(state.clone());

        let response = app
            .oneshot(multipart_upload("notes.txt", "not a pdf"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        // Nothing may reach the audio directory on a rejected upload
        let audio_entries = std::fs::read_dir(&state.config.storage.audio_dir)
            .unwrap()
            .count();
        assert_eq!(audio_entries, 0);
    }

    #[tokio::test]
    async fn test_request_without_file_part_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(test_state(dir.path()));

        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"language_code\"\r\n\r\n\
             hi\r\n\
             --{BOUNDARY}--\r\n"
        );
        let request = Request::post("/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generated_audio_is_served_back() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        std::fs::write(
            state.config.storage.audio_dir.join("tok_summary_hi.mp3"),
            b"mp3 bytes",
        )
        .unwrap();
        let app = router(state);

        let response = app
            .oneshot(
                Request::get("/static/audio/tok_summary_hi.mp3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "audio/mpeg"
        );
    }

    #[tokio::test]
    async fn test_unknown_audio_clip_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(test_state(dir.path()));

        let response = app
            .oneshot(
                Request::get("/static/audio/missing_summary_hi.mp3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_audio_filename_safety() {
        assert!(is_safe_audio_filename("tok_summary_hi.mp3"));
        assert!(!is_safe_audio_filename(""));
        assert!(!is_safe_audio_filename("../secrets.mp3"));
        assert!(!is_safe_audio_filename("a/b.mp3"));
        assert!(!is_safe_audio_filename("a\\b.mp3"));
        assert!(!is_safe_audio_filename("clip.wav"));
    }
}
