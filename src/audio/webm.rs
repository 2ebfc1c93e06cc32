//! # WebM Container Validation and Repair
//!
//! MediaRecorder in the browser only emits a full EBML header on the first
//! chunk of a recording; later chunks are bare clusters that Deepgram
//! rejects as unrecognized input. This module patches such chunks by
//! prepending a synthetic EBML header so they look like standalone WebM
//! files.
//!
//! ## What this is NOT:
//! There is no structural parse, no checksum, and no guarantee the patched
//! chunk is a valid WebM document. The header is a fixed byte constant and
//! the check is a 4-byte magic comparison. Chunks the provider still cannot
//! decode surface as provider errors and are handled by the caller.

use tracing::warn;

/// First four bytes of every EBML document (WebM, Matroska).
pub const EBML_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];

/// Synthetic EBML header prepended to headerless chunks.
///
/// Magic, a fabricated header size, a "webm" doc type element, and a
/// segment info element. The size and element payloads are static values,
/// not computed from the chunk.
pub const EBML_HEADER: [u8; 16] = [
    0x1A, 0x45, 0xDF, 0xA3, // EBML magic
    0x01, 0x00, 0x00, 0x00, // Header size
    0x42, 0x86, 0x81, 0x01, // Doc type = "webm"
    0x18, 0x53, 0x80, 0x67, // Segment info
];

/// Returns true when the chunk already begins with the EBML magic.
pub fn has_ebml_header(chunk: &[u8]) -> bool {
    chunk.len() >= 4 && chunk[..4] == EBML_MAGIC
}

/// Ensure the chunk has an EBML header, prepending the synthetic one when
/// the magic is missing. Infallible; never inspects anything beyond the
/// first four bytes.
pub fn validate_and_repair(chunk: Vec<u8>) -> Vec<u8> {
    if has_ebml_header(&chunk) {
        return chunk;
    }

    warn!("WebM header missing - repairing");
    let mut repaired = Vec::with_capacity(EBML_HEADER.len() + chunk.len());
    repaired.extend_from_slice(&EBML_HEADER);
    repaired.extend_from_slice(&chunk);
    repaired
}

/// Space-separated uppercase hex of the first `length` bytes, for
/// diagnosing header issues in the logs.
pub fn hexdump(bytes: &[u8], length: usize) -> String {
    bytes
        .iter()
        .take(length)
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
