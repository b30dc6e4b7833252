use crate::{
    Config, GatewayError,
    gateway::gemini::GeminiClient,
    model::{FALLBACK_FORECAST, LocationContext, Source, WeatherReport},
    prompt::build_prompt,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{fmt::Debug, sync::Arc};

pub mod gemini;

/// Model used when the config does not name one.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// One request to a generative-search service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub model: String,
    pub prompt: String,
    pub web_search_grounding: bool,
}

/// A cited web page inside a grounding chunk. Members may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebCitation {
    pub title: Option<String>,
    pub uri: Option<String>,
}

/// One entry of the grounding metadata. Only entries with `web` become sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundingChunk {
    pub web: Option<WebCitation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResponse {
    pub text: Option<String>,
    pub chunks: Vec<GroundingChunk>,
}

/// A hosted model that answers a prompt, optionally grounded in live web search.
#[async_trait]
pub trait GenerativeSearch: Send + Sync + Debug {
    async fn generate(&self, request: &SearchRequest) -> Result<SearchResponse, GatewayError>;
}

/// Turns a location into a [`WeatherReport`] with a single model call.
#[derive(Debug, Clone)]
pub struct AnalysisGateway {
    search: Arc<dyn GenerativeSearch>,
    model: String,
}

impl AnalysisGateway {
    pub fn new(search: Arc<dyn GenerativeSearch>, model: impl Into<String>) -> Self {
        Self { search, model: model.into() }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn fetch_report(&self, location: &LocationContext) -> Result<WeatherReport, GatewayError> {
        self.fetch_report_at(location, Utc::now()).await
    }

    /// Same as [`fetch_report`](Self::fetch_report) with an explicit clock.
    ///
    /// No retry: a failed call is returned to the caller as-is.
    pub async fn fetch_report_at(
        &self,
        location: &LocationContext,
        now: DateTime<Utc>,
    ) -> Result<WeatherReport, GatewayError> {
        let request = SearchRequest {
            model: self.model.clone(),
            prompt: build_prompt(location, now),
            web_search_grounding: true,
        };

        tracing::debug!(model = %self.model, location = location.label(), "requesting weather analysis");

        let response = self.search.generate(&request).await.inspect_err(|err| {
            tracing::debug!(error = %err, "weather analysis call failed");
        })?;

        let report = into_report(location, response);
        tracing::info!(
            location = %report.location,
            sources = report.sources.len(),
            "weather analysis received"
        );

        Ok(report)
    }
}

/// Normalize a raw model response. Empty text degrades to [`FALLBACK_FORECAST`].
pub fn into_report(location: &LocationContext, response: SearchResponse) -> WeatherReport {
    let forecast_text = response
        .text
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| FALLBACK_FORECAST.to_string());

    let sources = response
        .chunks
        .into_iter()
        .filter_map(|chunk| chunk.web)
        .map(|web| Source {
            title: web.title.unwrap_or_default(),
            uri: web.uri.unwrap_or_default(),
        })
        .collect();

    WeatherReport::new(location.label(), forecast_text, sources)
}

/// Construct the Gemini-backed gateway from config.
pub fn gateway_from_config(config: &Config) -> anyhow::Result<AnalysisGateway> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No Gemini API key configured.\n\
             Hint: run `caster configure` or set GEMINI_API_KEY."
        )
    })?;

    let mut client = GeminiClient::new(api_key.to_owned());
    if let Some(endpoint) = config.endpoint.as_deref() {
        client = client.with_base_url(endpoint);
    }

    Ok(AnalysisGateway::new(Arc::new(client), config.model_id()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{Coordinates, MY_LOCATION_LABEL, PLACEHOLDER_CONDITION, PLACEHOLDER_READING};
    use reqwest::StatusCode;
    use std::sync::Mutex;

    /// Replays a canned answer and records what it was asked.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedSearch {
        pub answer: Mutex<Option<Result<SearchResponse, GatewayError>>>,
        pub seen: Mutex<Vec<SearchRequest>>,
    }

    impl ScriptedSearch {
        pub(crate) fn answering(answer: Result<SearchResponse, GatewayError>) -> Arc<Self> {
            Arc::new(Self { answer: Mutex::new(Some(answer)), seen: Mutex::default() })
        }
    }

    #[async_trait]
    impl GenerativeSearch for ScriptedSearch {
        async fn generate(&self, request: &SearchRequest) -> Result<SearchResponse, GatewayError> {
            self.seen.lock().expect("lock").push(request.clone());
            self.answer
                .lock()
                .expect("lock")
                .take()
                .unwrap_or_else(|| Ok(SearchResponse::default()))
        }
    }

    fn web(title: &str, uri: &str) -> GroundingChunk {
        GroundingChunk {
            web: Some(WebCitation { title: Some(title.into()), uri: Some(uri.into()) }),
        }
    }

    #[tokio::test]
    async fn text_and_citations_become_report() {
        let search = ScriptedSearch::answering(Ok(SearchResponse {
            text: Some("T".into()),
            chunks: vec![web("A", "u1")],
        }));
        let gateway = AnalysisGateway::new(search.clone(), DEFAULT_MODEL);

        let report = gateway
            .fetch_report(&LocationContext::City("서울".into()))
            .await
            .expect("success");

        assert_eq!(report.location, "서울");
        assert_eq!(report.forecast_text, "T");
        assert_eq!(report.sources, vec![Source { title: "A".into(), uri: "u1".into() }]);
        assert_eq!(report.temperature, PLACEHOLDER_READING);
        assert_eq!(report.condition, PLACEHOLDER_CONDITION);
        assert_eq!(report.humidity, PLACEHOLDER_READING);
        assert_eq!(report.wind_speed, PLACEHOLDER_READING);
    }

    #[tokio::test]
    async fn coordinates_report_uses_my_location_label() {
        let search = ScriptedSearch::answering(Ok(SearchResponse {
            text: Some("T".into()),
            chunks: vec![],
        }));
        let gateway = AnalysisGateway::new(search, DEFAULT_MODEL);

        let ctx = LocationContext::Coordinates(Coordinates { lat: 37.5, lng: 127.0 });
        let report = gateway.fetch_report(&ctx).await.expect("success");

        assert_eq!(report.location, MY_LOCATION_LABEL);
        assert!(report.sources.is_empty());
    }

    #[tokio::test]
    async fn request_asks_for_grounding_once() {
        let search = ScriptedSearch::answering(Ok(SearchResponse::default()));
        let gateway = AnalysisGateway::new(search.clone(), "some-model");

        gateway
            .fetch_report(&LocationContext::City("부산".into()))
            .await
            .expect("success");

        let seen = search.seen.lock().expect("lock");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "some-model");
        assert!(seen[0].web_search_grounding);
        assert!(seen[0].prompt.contains("부산"));
    }

    #[tokio::test]
    async fn empty_text_falls_back_without_error() {
        for text in [None, Some(String::new())] {
            let search = ScriptedSearch::answering(Ok(SearchResponse { text, chunks: vec![] }));
            let gateway = AnalysisGateway::new(search, DEFAULT_MODEL);

            let report = gateway
                .fetch_report(&LocationContext::City("대전".into()))
                .await
                .expect("empty text is not an error");

            assert_eq!(report.forecast_text, FALLBACK_FORECAST);
        }
    }

    #[test]
    fn chunks_without_web_are_dropped_in_order() {
        let response = SearchResponse {
            text: Some("T".into()),
            chunks: vec![
                web("A", "u1"),
                GroundingChunk { web: None },
                web("B", "u2"),
                GroundingChunk { web: None },
            ],
        };
        let chunk_count = response.chunks.len();

        let report = into_report(&LocationContext::City("광주".into()), response);

        assert!(report.sources.len() <= chunk_count);
        let titles: Vec<_> = report.sources.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["A", "B"]);
    }

    #[test]
    fn missing_citation_members_become_empty_strings() {
        let response = SearchResponse {
            text: Some("T".into()),
            chunks: vec![GroundingChunk {
                web: Some(WebCitation { title: None, uri: Some("u".into()) }),
            }],
        };

        let report = into_report(&LocationContext::City("울산".into()), response);
        assert_eq!(report.sources, vec![Source { title: String::new(), uri: "u".into() }]);
    }

    #[tokio::test]
    async fn failure_is_propagated_unchanged() {
        let search = ScriptedSearch::answering(Err(GatewayError::Status {
            provider: "gemini",
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "overloaded".into(),
        }));
        let gateway = AnalysisGateway::new(search, DEFAULT_MODEL);

        let err = gateway
            .fetch_report(&LocationContext::City("인천".into()))
            .await
            .unwrap_err();

        match err {
            GatewayError::Status { provider, status, body } => {
                assert_eq!(provider, "gemini");
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "overloaded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn gateway_from_config_errors_without_api_key() {
        let cfg = Config::default();
        let err = gateway_from_config(&cfg).unwrap_err();

        assert!(err.to_string().contains("No Gemini API key configured"));
        assert!(err.to_string().contains("caster configure"));
    }

    #[test]
    fn gateway_from_config_uses_configured_model() {
        let cfg = Config {
            api_key: Some("KEY".into()),
            model: Some("gemini-custom".into()),
            ..Config::default()
        };

        let gateway = gateway_from_config(&cfg).expect("configured");
        assert_eq!(gateway.model(), "gemini-custom");
    }
}
