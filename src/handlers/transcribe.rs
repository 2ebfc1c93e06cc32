//! # Chunk Transcription Handler
//!
//! `POST /transcribe_chunk` — the relay's main operation. The pipeline is
//! strictly linear:
//!
//! 1. Read the multipart form into memory
//! 2. Short-circuit chunks under 2 KiB with an empty transcript
//! 3. Parse the `config` field, falling back to defaults on bad JSON
//! 4. Pick mimetype from the filename extension; repair WebM chunks
//! 5. Forward to Deepgram and map the outcome onto the wire contract
//!
//! Every handled path, including both failure tiers, answers HTTP 200;
//! the browser client reads only the `status` field of the body.

use crate::audio::{self, webm};
use crate::error::RelayError;
use crate::handlers::form::read_chunk_form;
use crate::state::AppState;
use crate::transcription::PrerecordedOptions;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

/// Chunks below this size are assumed to carry no meaningful audio and are
/// acknowledged without a provider call. A size policy, not a format check.
pub const MIN_CHUNK_BYTES: usize = 2048;

/// How many leading bytes to hex dump for header diagnostics.
const HEXDUMP_BYTES: usize = 128;

/// Per-request options parsed from the `config` form field.
///
/// Only `model` and `language` are recognized; unknown keys are ignored
/// and anything that fails to deserialize yields the defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    pub model: String,
    pub language: String,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            model: crate::transcription::deepgram::DEFAULT_MODEL.to_string(),
            language: crate::transcription::deepgram::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Parse the `config` field. Bad JSON is a logged fallback, never a
/// request failure; the browser sends this field straight from user
/// settings storage and must not be able to break transcription with it.
pub fn parse_chunk_config(raw: &str) -> ChunkConfig {
    match serde_json::from_str(raw) {
        Ok(config) => config,
        Err(_) => {
            warn!("Using default config");
            ChunkConfig::default()
        }
    }
}

/// Entry point for `POST /transcribe_chunk`.
pub async fn transcribe_chunk(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> HttpResponse {
    match process_chunk(&state, &mut payload).await {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(err) => {
            error!(tier = err.kind(), "Transcription failed: {}", err.details());
            state.record_relay_error(err.kind());
            HttpResponse::Ok().json(err.to_body())
        }
    }
}

async fn process_chunk(state: &AppState, payload: &mut Multipart) -> Result<Value, RelayError> {
    let upload = read_chunk_form(payload).await?;
    let (chunk, filename, config) = upload.into_chunk()?;

    if chunk.len() < MIN_CHUNK_BYTES {
        info!("Skipping small chunk ({} bytes)", chunk.len());
        return Ok(json!({ "status": "success", "text": "" }));
    }

    let config = parse_chunk_config(config.as_deref().unwrap_or("{}"));

    // Diagnostics refer to the chunk as uploaded, before any repair
    let chunk_size = chunk.len();
    let header_dump = webm::hexdump(&chunk, HEXDUMP_BYTES);

    let (mimetype, buffer) = if audio::is_wav_filename(filename.as_deref()) {
        (audio::WAV_MIMETYPE, chunk)
    } else {
        (audio::WEBM_MIMETYPE, webm::validate_and_repair(chunk))
    };

    let options = PrerecordedOptions::new(config.model, config.language);

    info!("Chunk size={} bytes", chunk_size);
    info!("Header hexdump (first {}B): {}", HEXDUMP_BYTES, header_dump);

    let response = state.deepgram().transcribe(buffer, mimetype, &options).await?;

    let transcript = response.first_transcript().ok_or_else(|| {
        RelayError::Handler("provider response missing transcript structure".to_string())
    })?;
    info!("Transcription success: {} characters", transcript.len());

    Ok(json!({
        "status": "success",
        "text": transcript,
        "model": options.model,
        "language": options.language,
        "duration": response.duration_seconds(),
    }))
}
