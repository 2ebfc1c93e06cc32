//! Multipart form reading shared by the relay endpoints.
//!
//! Both endpoints accept the same browser-side form: a binary `file` field
//! (the audio chunk) and, for `/transcribe_chunk`, an optional `config`
//! text field holding a JSON string. Unknown fields are drained and
//! ignored. Any stream error while reading is a handler-tier failure.

use crate::error::RelayError;
use actix_multipart::Multipart;
use futures_util::stream::StreamExt;

/// The fields extracted from one uploaded form.
#[derive(Debug, Default)]
pub struct ChunkUpload {
    /// Bytes of the `file` field, if present
    pub file: Option<Vec<u8>>,

    /// Filename from the `file` field's content disposition
    pub filename: Option<String>,

    /// Raw contents of the `config` field, if present
    pub config: Option<String>,
}

impl ChunkUpload {
    /// The uploaded chunk, or a handler-tier error when the `file` field
    /// was absent.
    pub fn into_chunk(self) -> Result<(Vec<u8>, Option<String>, Option<String>), RelayError> {
        match self.file {
            Some(file) => Ok((file, self.filename, self.config)),
            None => Err(RelayError::Handler(
                "missing required form field 'file'".to_string(),
            )),
        }
    }
}

/// Read the full multipart payload into memory.
pub async fn read_chunk_form(payload: &mut Multipart) -> Result<ChunkUpload, RelayError> {
    let mut upload = ChunkUpload::default();

    while let Some(item) = payload.next().await {
        let mut field = item?;

        let Some(disposition) = field.content_disposition() else {
            continue;
        };
        let Some(name) = disposition.get_name().map(str::to_string) else {
            continue;
        };
        let filename = disposition.get_filename().map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            bytes.extend_from_slice(&chunk?);
        }

        match name.as_str() {
            "file" => {
                upload.filename = filename;
                upload.file = Some(bytes);
            }
            "config" => {
                upload.config = Some(String::from_utf8_lossy(&bytes).into_owned());
            }
            _ => {}
        }
    }

    Ok(upload)
}
