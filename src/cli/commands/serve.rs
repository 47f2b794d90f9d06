//! HTTP web form for uploading and transcribing audio.
//!
//! Serves an embedded upload page plus JSON endpoints for transcription and
//! DOCX export. The API key arrives with each request and is never stored.

use crate::audio::AudioAsset;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::SkrivError;
use crate::export::{to_docx, DOCX_FILE_NAME, DOCX_MIME};
use crate::pipeline::Pipeline;
use crate::summary::{summarize, SUMMARY_WORD_BUDGET};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

/// Uploads may exceed the 25 MiB split threshold by a wide margin.
const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

/// Shared application state.
struct AppState {
    settings: Settings,
}

/// Run the HTTP server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    std::fs::create_dir_all(settings.temp_dir())?;

    let state = Arc::new(AppState { settings });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/transcribe", post(transcribe))
        .route("/export", post(export))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Skriv Web");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Upload form", "GET  /");
    Output::kv("Health", "GET  /health");
    Output::kv("Transcribe", "POST /transcribe");
    Output::kv("Export DOCX", "POST /export");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Serialize)]
struct TranscribeResponse {
    file_name: String,
    chunk_count: usize,
    summary: String,
    transcript: String,
}

#[derive(Deserialize)]
struct ExportRequest {
    text: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Map the error taxonomy onto HTTP statuses.
fn error_status(err: &SkrivError) -> StatusCode {
    match err {
        SkrivError::Validation(_) | SkrivError::Config(_) => StatusCode::BAD_REQUEST,
        SkrivError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SkrivError::Service { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: SkrivError) -> axum::response::Response {
    (
        error_status(&err),
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn transcribe(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut api_key: Option<String> = None;
    let mut upload: Option<(String, Vec<u8>)> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => match field.name().map(str::to_string).as_deref() {
                Some("api_key") => match field.text().await {
                    Ok(text) => api_key = Some(text),
                    Err(e) => {
                        return error_response(SkrivError::Validation(format!(
                            "Malformed form field: {e}"
                        )))
                    }
                },
                Some("file") => {
                    let name = field
                        .file_name()
                        .map(str::to_string)
                        .unwrap_or_else(|| "upload".to_string());
                    match field.bytes().await {
                        Ok(bytes) => upload = Some((name, bytes.to_vec())),
                        Err(e) => {
                            return error_response(SkrivError::Validation(format!(
                                "Upload failed: {e}"
                            )))
                        }
                    }
                }
                _ => {}
            },
            Ok(None) => break,
            Err(e) => {
                return error_response(SkrivError::Validation(format!(
                    "Malformed multipart body: {e}"
                )))
            }
        }
    }

    let api_key = match api_key {
        Some(key) if !key.is_empty() => key,
        _ => return error_response(SkrivError::Config("Missing API key".to_string())),
    };
    let (file_name, bytes) = match upload {
        Some(upload) => upload,
        None => return error_response(SkrivError::Validation("Missing audio file".to_string())),
    };

    // Validate before touching the disk
    if !AudioAsset::is_supported(&file_name) {
        return error_response(SkrivError::Validation(format!(
            "Unsupported audio format '{}'. Please upload only MP3 or WAV files.",
            file_name
        )));
    }

    // Request-scoped copy of the upload; the original name is kept for its
    // extension, a uuid prefix avoids collisions between requests.
    let safe_name = Path::new(&file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.mp3");
    let path = state
        .settings
        .temp_dir()
        .join(format!("{}_{}", Uuid::new_v4(), safe_name));

    if let Err(e) = tokio::fs::write(&path, &bytes).await {
        return error_response(e.into());
    }

    let result = match AudioAsset::from_path(&path) {
        Ok(asset) => {
            let pipeline = Pipeline::new(&api_key, &state.settings);
            pipeline.process(&asset).await
        }
        Err(e) => Err(e),
    };

    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!("Failed to cleanup upload {}: {}", path.display(), e);
    }

    match result {
        Ok(outcome) => Json(TranscribeResponse {
            file_name,
            chunk_count: outcome.chunk_count,
            summary: summarize(&outcome.transcript, SUMMARY_WORD_BUDGET),
            transcript: outcome.transcript,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn export(Json(req): Json<ExportRequest>) -> impl IntoResponse {
    match to_docx(&req.text) {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, DOCX_MIME.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", DOCX_FILE_NAME),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Embedded upload page.
const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Skriv - Audio Transcriber</title>
<style>
  body { font-family: sans-serif; max-width: 640px; margin: 2rem auto; padding: 0 1rem; }
  label { display: block; margin-top: 1rem; font-weight: bold; }
  input, button { margin-top: .4rem; }
  button { padding: .5rem 1.2rem; cursor: pointer; }
  #status { margin-top: 1rem; color: #555; }
  .error { color: #b00; }
  pre { white-space: pre-wrap; background: #f6f6f6; padding: 1rem; }
</style>
</head>
<body>
<h1>Skriv</h1>
<p>Upload an <strong>MP3</strong> or <strong>WAV</strong> voice note and it will be
transcribed with AssemblyAI. Large files are split into chunks automatically.</p>

<label for="api_key">AssemblyAI API key</label>
<input type="password" id="api_key" size="40">

<label for="file">Audio file</label>
<input type="file" id="file" accept=".mp3,.wav">

<p><button id="go">Start Transcription</button></p>
<div id="status"></div>
<div id="result" hidden>
  <h2>Short Summary</h2>
  <pre id="summary"></pre>
  <h2>Full Transcript</h2>
  <pre id="transcript"></pre>
  <p><button id="download">Download Transcript (Word)</button></p>
</div>

<script>
const el = (id) => document.getElementById(id);

el('go').addEventListener('click', async () => {
  const file = el('file').files[0];
  const key = el('api_key').value;
  if (!key || !file) {
    el('status').innerHTML = '<span class="error">Please provide an API key and a file.</span>';
    return;
  }

  el('status').textContent = 'Processing... this can take a while for large files.';
  el('result').hidden = true;

  const form = new FormData();
  form.append('api_key', key);
  form.append('file', file);

  try {
    const resp = await fetch('/transcribe', { method: 'POST', body: form });
    const body = await resp.json();
    if (!resp.ok) {
      el('status').innerHTML = '<span class="error">' + body.error + '</span>';
      return;
    }
    el('status').textContent = 'Done (' + body.chunk_count + ' chunk' + (body.chunk_count === 1 ? '' : 's') + ').';
    el('summary').textContent = body.summary;
    el('transcript').textContent = body.transcript;
    el('result').hidden = false;
  } catch (e) {
    el('status').innerHTML = '<span class="error">' + e + '</span>';
  }
});

el('download').addEventListener('click', async () => {
  const resp = await fetch('/export', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ text: el('transcript').textContent }),
  });
  const blob = await resp.blob();
  const a = document.createElement('a');
  a.href = URL.createObjectURL(blob);
  a.download = 'transcript.docx';
  a.click();
  URL.revokeObjectURL(a.href);
});
</script>
</body>
</html>
"#;
