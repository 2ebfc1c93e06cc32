//! # Transcription Module
//!
//! Speech-to-text via the Deepgram prerecorded API. Unlike a local model
//! pipeline there is nothing to load or warm up here: the relay holds one
//! HTTP client for the lifetime of the process and performs a single
//! blocking round-trip per chunk.
//!
//! ## Key Components:
//! - **DeepgramClient**: Thin reqwest wrapper around `POST /v1/listen`
//! - **PrerecordedOptions**: Model/language plus the always-on punctuation
//!   and smart-formatting flags
//! - **PrerecordedResponse**: The subset of Deepgram's response the relay
//!   reads (first transcript alternative and the audio duration)
//!
//! ## Failure model:
//! The relay imposes no timeout, retry, or cancellation of its own; the
//! call runs to completion or returns a [`ProviderError`]. Retrying is the
//! browser client's job.

pub mod deepgram;

pub use deepgram::{
    DeepgramClient, PrerecordedOptions, PrerecordedResponse, ProviderError,
};
