use reqwest::StatusCode;
use thiserror::Error;

/// The ambient location capability could not produce coordinates.
///
/// The `Display` text is shown to the user as-is. A terminal has no
/// permission prompt, so a withheld location is configured as `off` and
/// reported as [`LocationUnavailable::Unsupported`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationUnavailable {
    #[error("이 환경은 위치 정보를 지원하지 않습니다.")]
    Unsupported,

    #[error("위치 정보를 가져오지 못했습니다: {0}")]
    Lookup(String),
}

/// A call to the generative-search service failed.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Failed to reach {provider}: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} request failed with status {status}: {body}")]
    Status {
        provider: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to parse {provider} response JSON: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Shorten a response body for error messages without splitting a character.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
