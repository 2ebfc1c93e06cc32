//! # Health Ping Handler
//!
//! `POST /health_ping` — forwards a tiny uploaded payload to Deepgram so
//! the browser client can light its status LEDs. Two independent signals:
//!
//! - `python_ok`: the relay received and read the request body. The field
//!   name survives from the original backend and is baked into the client.
//! - `llm_ok`: the Deepgram call returned without an error.
//!
//! Unlike `/transcribe_chunk` there is no size gate and no WebM repair;
//! the point is to exercise the network path with the payload exactly as
//! uploaded, not to get a usable transcript back.

use crate::audio;
use crate::error::RelayError;
use crate::handlers::form::read_chunk_form;
use crate::state::AppState;
use crate::transcription::PrerecordedOptions;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::error;

/// Entry point for `POST /health_ping`.
pub async fn health_ping(state: web::Data<AppState>, mut payload: Multipart) -> HttpResponse {
    let form = read_chunk_form(&mut payload)
        .await
        .and_then(|upload| upload.into_chunk());

    let (chunk, filename, _config) = match form {
        Ok(parts) => parts,
        Err(err) => {
            error!("/health_ping failed: {}", err.details());
            state.record_relay_error(err.kind());
            return HttpResponse::Ok().json(json!({
                "status": "error",
                "python_ok": false,
                "llm_ok": false,
                "details": err.details(),
            }));
        }
    };

    // Body read and parsed; first signal is green from here on
    let mimetype = if audio::is_wav_filename(filename.as_deref()) {
        audio::WAV_MIMETYPE
    } else {
        audio::WEBM_MIMETYPE
    };

    // Fixed options; the health check is not configurable
    let options = PrerecordedOptions::default();

    match state.deepgram().transcribe(chunk, mimetype, &options).await {
        Ok(_) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "python_ok": true,
            "llm_ok": true,
        })),
        Err(err) => {
            let err = RelayError::from(err);
            error!("Health LLM call failed: {}", err.details());
            state.record_relay_error(err.kind());
            HttpResponse::Ok().json(json!({
                "status": "error",
                "python_ok": true,
                "llm_ok": false,
                "details": err.details(),
            }))
        }
    }
}
