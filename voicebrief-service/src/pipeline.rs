//! The per-request pipeline: extract → summarize → translate → synthesize.
//!
//! Strictly sequential; the first failing stage aborts the request. The
//! uploaded PDF lives in the upload directory only for the duration of one
//! request and is removed on every exit path.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use uuid::Uuid;

use crate::api::AppState;
use crate::error::{ServiceError, ServiceResult};
use crate::extract;

/// A file pulled out of the multipart request body.
pub struct Upload {
    pub filename: String,
    pub data: Vec<u8>,
}

/// What a successful pipeline run hands back to the handler.
pub struct PipelineOutput {
    pub summary: String,
    pub audio_filename: String,
}

/// Run the full pipeline for one upload.
pub async fn run(
    state: &AppState,
    upload: Upload,
    language_code: &str,
) -> ServiceResult<PipelineOutput> {
    validate_upload(&upload)?;

    let token = Uuid::new_v4().to_string();

    let saved = SavedUpload::write(
        &state.config.storage.upload_dir,
        &token,
        &upload.filename,
        &upload.data,
    )?;
    info!(token = %token, filename = %upload.filename, "Upload saved, starting pipeline");

    // PDFium parsing is synchronous; keep it off the async workers.
    let pdf_path = saved.path().to_path_buf();
    let text = tokio::task::spawn_blocking(move || extract::extract_text(&pdf_path))
        .await
        .map_err(|e| ServiceError::Internal {
            message: format!("Extraction task failed: {e}"),
        })??;
    info!(token = %token, chars = text.len(), "Text extracted");

    let summary = state.summarizer.summarize(&text).await?;
    info!(token = %token, chars = summary.len(), "Summary generated");

    let translated = state
        .sarvam
        .translate(&summary, language_code)
        .await
        .map_err(ServiceError::Translation)?;
    info!(token = %token, language = language_code, "Summary translated");

    let audio = state
        .sarvam
        .synthesize(&translated, language_code)
        .await
        .map_err(ServiceError::Synthesis)?;

    let audio_filename = audio_filename(&token, language_code);
    write_audio(&state.config.storage.audio_dir, &audio_filename, &audio)?;
    info!(
        token = %token,
        filename = %audio_filename,
        bytes = audio.len(),
        "Audio clip written"
    );

    Ok(PipelineOutput {
        summary: translated,
        audio_filename,
    })
}

/// Reject uploads before any file is written. Extension check only; the PDF
/// parser is the arbiter of whether the content is actually a PDF.
fn validate_upload(upload: &Upload) -> ServiceResult<()> {
    if upload.filename.is_empty() {
        return Err(ServiceError::InvalidRequest {
            message: "No file selected.".to_string(),
        });
    }

    let is_pdf = Path::new(&upload.filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf {
        return Err(ServiceError::InvalidRequest {
            message: "Only .pdf uploads are supported.".to_string(),
        });
    }

    if upload.data.is_empty() {
        return Err(ServiceError::InvalidRequest {
            message: "The uploaded file is empty.".to_string(),
        });
    }

    Ok(())
}

/// Audio clip name, unique per request. Concurrent requests for the same
/// language must never race on one path, so the request token is part of
/// the name; the `summary_{lang}.mp3` suffix is kept for readability.
fn audio_filename(token: &str, language_code: &str) -> String {
    format!("{token}_summary_{language_code}.mp3")
}

/// Write the audio clip next to its final location, then rename into place,
/// so a partially written clip is never served.
fn write_audio(dir: &Path, filename: &str, data: &[u8]) -> ServiceResult<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(dir.join(filename))
        .map_err(|e| ServiceError::Io(e.error))?;
    Ok(())
}

/// Scratch copy of the uploaded PDF. Removal is tied to the guard going out
/// of scope, so the file is cleaned up on success and on every failure path.
struct SavedUpload {
    path: PathBuf,
}

impl SavedUpload {
    fn write(dir: &Path, token: &str, filename: &str, data: &[u8]) -> ServiceResult<Self> {
        let path = dir.join(format!("{token}_{}", sanitize_filename(filename)));
        std::fs::write(&path, data)?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SavedUpload {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to remove uploaded file");
        }
    }
}

/// Sanitize a client-supplied name for use as a filename
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect::<String>()
        .trim_matches('_')
        .to_string()
}
