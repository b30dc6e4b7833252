use serde::{Deserialize, Serialize};

/// Label used for reports requested by coordinates.
pub const MY_LOCATION_LABEL: &str = "나의 위치";

/// Narrative used when the model answers with no text at all.
pub const FALLBACK_FORECAST: &str = "날씨 정보를 가져오는 데 실패했습니다.";

/// Placeholder for the reserved numeric readings.
pub const PLACEHOLDER_READING: &str = "--";

/// Placeholder for the reserved condition field.
pub const PLACEHOLDER_CONDITION: &str = "분석 완료";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// What a single weather query is about: a coordinate pair or a city name, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationContext {
    Coordinates(Coordinates),
    City(String),
}

impl LocationContext {
    /// Build a city context from user input. Blank input yields `None`.
    pub fn city(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(LocationContext::City(trimmed.to_string()))
        }
    }

    /// Human-readable name shown as the report's location.
    pub fn label(&self) -> &str {
        match self {
            LocationContext::City(city) => city,
            LocationContext::Coordinates(_) => MY_LOCATION_LABEL,
        }
    }
}

impl From<Coordinates> for LocationContext {
    fn from(value: Coordinates) -> Self {
        LocationContext::Coordinates(value)
    }
}

/// A web page the model cited while answering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

/// Reserved. Never populated; the narrative carries the recommendations instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendations {
    pub clothing: String,
    pub activities: String,
    pub precautions: String,
}

/// Normalized result of one analysis request.
///
/// Only `location`, `forecast_text` and `sources` carry real content. The
/// structured reading fields are reserved for a parsing step that does not
/// exist yet and always hold the fixed placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub location: String,
    pub forecast_text: String,
    pub sources: Vec<Source>,

    /// Reserved, always [`PLACEHOLDER_READING`].
    pub temperature: String,
    /// Reserved, always [`PLACEHOLDER_CONDITION`].
    pub condition: String,
    /// Reserved, always [`PLACEHOLDER_READING`].
    pub humidity: String,
    /// Reserved, always [`PLACEHOLDER_READING`].
    pub wind_speed: String,
    /// Reserved, always empty.
    pub recommendations: Recommendations,
}

impl WeatherReport {
    pub fn new(location: impl Into<String>, forecast_text: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            location: location.into(),
            forecast_text: forecast_text.into(),
            sources,
            temperature: PLACEHOLDER_READING.to_string(),
            condition: PLACEHOLDER_CONDITION.to_string(),
            humidity: PLACEHOLDER_READING.to_string(),
            wind_speed: PLACEHOLDER_READING.to_string(),
            recommendations: Recommendations::default(),
        }
    }
}
