use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    error::{GatewayError, truncate_body},
    gateway::{GenerativeSearch, GroundingChunk, SearchRequest, SearchResponse, WebCitation},
};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const PROVIDER: &str = "gemini";

/// Grounded answers are slow; a stalled call still has to end as an error.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Google Gemini `generateContent` over REST.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    timeout: Duration,
    http: Client,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            http: Client::new(),
        }
    }

    /// Point the client at another host, e.g. a proxy or a mock server.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Upper bound for one whole request, response body included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<RawChunk>,
}

#[derive(Debug, Deserialize)]
struct RawChunk {
    web: Option<RawWeb>,
}

#[derive(Debug, Deserialize)]
struct RawWeb {
    uri: Option<String>,
    title: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, thought parts excluded. `None` if there is none.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;

        let mut text: Option<String> = None;
        for part in parts.iter().filter(|p| !p.thought) {
            if let Some(t) = &part.text {
                text.get_or_insert_with(String::new).push_str(t);
            }
        }
        text
    }

    fn into_search_response(self) -> SearchResponse {
        let text = self.text();

        let chunks = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.grounding_metadata)
            .map(|m| m.grounding_chunks)
            .unwrap_or_default()
            .into_iter()
            .map(|chunk| GroundingChunk {
                web: chunk.web.map(|w| WebCitation { title: w.title, uri: w.uri }),
            })
            .collect();

        SearchResponse { text, chunks }
    }
}

#[async_trait]
impl GenerativeSearch for GeminiClient {
    async fn generate(&self, request: &SearchRequest) -> Result<SearchResponse, GatewayError> {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: &request.prompt }],
            }],
            tools: if request.web_search_grounding {
                vec![Tool { google_search: GoogleSearch {} }]
            } else {
                Vec::new()
            },
        };

        let res = self
            .http
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|source| GatewayError::Transport { provider: PROVIDER, source })?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|source| GatewayError::Transport { provider: PROVIDER, source })?;

        if !status.is_success() {
            return Err(GatewayError::Status {
                provider: PROVIDER,
                status,
                body: truncate_body(&text),
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|source| GatewayError::Decode { provider: PROVIDER, source })?;

        Ok(parsed.into_search_response())
    }
}
