//! # Audio Payload Handling
//!
//! Everything the relay knows about the bytes it forwards lives here, which
//! is deliberately very little: a 4-byte magic check with a best-effort
//! header repair for WebM chunks, and a hex dump helper for the logs.
//!
//! ## Key Components:
//! - **WebM repair**: Prepends a synthetic EBML header to headerless chunks
//! - **Mimetype detection**: Picks `audio/wav` vs. `audio/webm;codecs=opus`
//!   from the uploaded filename extension

pub mod webm;

use std::path::Path;

/// Mimetype for WAV uploads (repair is skipped for these).
pub const WAV_MIMETYPE: &str = "audio/wav";

/// Mimetype for everything else; browser MediaRecorder chunks arrive as
/// Opus in WebM.
pub const WEBM_MIMETYPE: &str = "audio/webm;codecs=opus";

/// Returns true when the filename carries a `.wav` extension,
/// case-insensitively. A missing filename or extension counts as WebM.
pub fn is_wav_filename(filename: Option<&str>) -> bool {
    filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("wav"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_extension_lowercase() {
        assert!(is_wav_filename(Some("clip.wav")));
    }

    #[test]
    fn test_wav_extension_uppercase() {
        assert!(is_wav_filename(Some("PING.WAV")));
        assert!(is_wav_filename(Some("clip.Wav")));
    }

    #[test]
    fn test_webm_extension() {
        assert!(!is_wav_filename(Some("clip.webm")));
    }

    #[test]
    fn test_missing_extension() {
        assert!(!is_wav_filename(Some("clip")));
    }

    #[test]
    fn test_missing_filename() {
        assert!(!is_wav_filename(None));
    }

    #[test]
    fn test_wav_must_be_the_final_extension() {
        assert!(!is_wav_filename(Some("wav.webm")));
        assert!(!is_wav_filename(Some("clip.wav.webm")));
    }
}
