//! Deepgram prerecorded API client.
//!
//! One authenticated `POST /v1/listen` per chunk, audio bytes in the raw
//! request body, options as query parameters. No retries and no
//! client-side timeout: the round-trip either completes or surfaces as a
//! [`ProviderError`] for the handler to classify.

use serde::Deserialize;
use std::fmt;

const LISTEN_PATH: &str = "/v1/listen";

/// Default Deepgram endpoint; overridable through configuration so tests
/// can point the client at a dead address.
pub const DEFAULT_BASE_URL: &str = "https://api.deepgram.com";

/// Model used when the caller's config omits one.
pub const DEFAULT_MODEL: &str = "nova-2";

/// Language used when the caller's config omits one.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Options sent with a prerecorded transcription request.
///
/// Punctuation and smart formatting are always requested; the browser
/// client renders transcripts verbatim and has no formatting of its own.
#[derive(Debug, Clone)]
pub struct PrerecordedOptions {
    pub model: String,
    pub language: String,
    pub punctuate: bool,
    pub smart_format: bool,
}

impl Default for PrerecordedOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            punctuate: true,
            smart_format: true,
        }
    }
}

impl PrerecordedOptions {
    pub fn new(model: String, language: String) -> Self {
        Self {
            model,
            language,
            ..Self::default()
        }
    }

    /// Query parameters for the listen endpoint.
    fn query_params(&self) -> [(&'static str, String); 4] {
        [
            ("model", self.model.clone()),
            ("language", self.language.clone()),
            ("punctuate", self.punctuate.to_string()),
            ("smart_format", self.smart_format.to_string()),
        ]
    }
}

/// Errors raised by the provider round-trip itself.
///
/// Anything in here means "we reached the handler but Deepgram failed" and
/// maps to the provider tier of the response contract. A structurally
/// incomplete but well-formed response is NOT an error at this layer; see
/// [`PrerecordedResponse::first_transcript`].
#[derive(Debug)]
pub enum ProviderError {
    /// Connection, DNS, or TLS failure before a response arrived
    Network(String),

    /// Deepgram answered with a non-success status (bad key, rejected audio)
    Api { status: u16, body: String },

    /// Deepgram answered 2xx but the body was not parseable JSON
    Decode(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Network(msg) => write!(f, "network error: {}", msg),
            ProviderError::Api { status, body } => {
                write!(f, "deepgram returned status {}: {}", status, body)
            }
            ProviderError::Decode(msg) => write!(f, "unreadable deepgram response: {}", msg),
        }
    }
}

/// The slices of Deepgram's prerecorded response the relay actually reads.
///
/// Every level is optional or defaulted: a response that deserializes but
/// lacks the expected structure is reported by `first_transcript` returning
/// `None`, which the handler treats as a relay-level failure rather than a
/// provider one.
#[derive(Debug, Default, Deserialize)]
pub struct PrerecordedResponse {
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub results: Option<Results>,
}

#[derive(Debug, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub duration: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Results {
    #[serde(default)]
    pub channels: Vec<Channel>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Alternative {
    #[serde(default)]
    pub transcript: String,
}

impl PrerecordedResponse {
    /// Transcript of the first alternative of the first channel, or `None`
    /// when that path through the response is absent.
    pub fn first_transcript(&self) -> Option<&str> {
        self.results
            .as_ref()?
            .channels
            .first()?
            .alternatives
            .first()
            .map(|alt| alt.transcript.as_str())
    }

    /// Audio duration in seconds, when Deepgram reports one.
    pub fn duration_seconds(&self) -> Option<f64> {
        self.metadata.as_ref()?.duration
    }
}

/// Deepgram API client, constructed once at startup from the
/// environment-sourced credential and shared by every request handler.
#[derive(Debug, Clone)]
pub struct DeepgramClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl DeepgramClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit an audio buffer for transcription and parse the response.
    pub async fn transcribe(
        &self,
        buffer: Vec<u8>,
        mimetype: &str,
        options: &PrerecordedOptions,
    ) -> Result<PrerecordedResponse, ProviderError> {
        let url = format!("{}{}", self.base_url, LISTEN_PATH);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Content-Type", mimetype)
            .query(&options.query_params())
            .body(buffer)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<PrerecordedResponse>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = PrerecordedOptions::default();
        assert_eq!(options.model, "nova-2");
        assert_eq!(options.language, "en-US");
        assert!(options.punctuate);
        assert!(options.smart_format);
    }

    #[test]
    fn test_custom_model_keeps_formatting_flags_on() {
        let options = PrerecordedOptions::new("nova-3".to_string(), "de".to_string());
        assert_eq!(options.model, "nova-3");
        assert_eq!(options.language, "de");
        assert!(options.punctuate);
        assert!(options.smart_format);
    }

    #[test]
    fn test_query_params_cover_all_options() {
        let params = PrerecordedOptions::default().query_params();
        assert_eq!(params[0], ("model", "nova-2".to_string()));
        assert_eq!(params[1], ("language", "en-US".to_string()));
        assert_eq!(params[2], ("punctuate", "true".to_string()));
        assert_eq!(params[3], ("smart_format", "true".to_string()));
    }

    #[test]
    fn test_base_url_trailing_slash_is_stripped() {
        let client = DeepgramClient::new("key".to_string(), "http://127.0.0.1:9/".to_string());
        assert_eq!(client.base_url(), "http://127.0.0.1:9");
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "metadata": { "duration": 2.5 },
            "results": {
                "channels": [
                    { "alternatives": [ { "transcript": "Hello, world." } ] }
                ]
            }
        }"#;

        let response: PrerecordedResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.first_transcript(), Some("Hello, world."));
        assert_eq!(response.duration_seconds(), Some(2.5));
    }

    #[test]
    fn test_response_without_duration() {
        let json = r#"{
            "results": {
                "channels": [
                    { "alternatives": [ { "transcript": "hi" } ] }
                ]
            }
        }"#;

        let response: PrerecordedResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.first_transcript(), Some("hi"));
        assert_eq!(response.duration_seconds(), None);
    }

    #[test]
    fn test_empty_response_has_no_transcript() {
        let response: PrerecordedResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.first_transcript(), None);
        assert_eq!(response.duration_seconds(), None);
    }

    #[test]
    fn test_empty_channel_list_has_no_transcript() {
        let json = r#"{ "results": { "channels": [] } }"#;
        let response: PrerecordedResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.first_transcript(), None);
    }

    #[test]
    fn test_empty_alternatives_have_no_transcript() {
        let json = r#"{ "results": { "channels": [ { "alternatives": [] } ] } }"#;
        let response: PrerecordedResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.first_transcript(), None);
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::Api {
            status: 401,
            body: "invalid credentials".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("401"));
        assert!(text.contains("invalid credentials"));
    }

    #[tokio::test]
    async fn test_transcribe_against_dead_endpoint_is_a_network_error() {
        // Port 9 (discard) is never listening locally
        let client = DeepgramClient::new("key".to_string(), "http://127.0.0.1:9".to_string());
        let result = client
            .transcribe(vec![0u8; 32], "audio/wav", &PrerecordedOptions::default())
            .await;

        match result {
            Err(ProviderError::Network(_)) => {}
            other => panic!("Expected network error, got: {:?}", other),
        }
    }
}
