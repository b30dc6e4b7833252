//! Approximate position from the public IP address, via ip-api.com.
//! Free, no API key required.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{error::LocationUnavailable, location::LocationSource, model::Coordinates};

pub const IP_API_URL: &str = "http://ip-api.com/json/";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct IpLocator {
    endpoint: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpLocator {
    pub fn new() -> Self {
        Self::with_endpoint(IP_API_URL)
    }

    pub fn with_endpoint(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            http: Client::new(),
        }
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocationSource for IpLocator {
    async fn current_position(&self) -> Result<Coordinates, LocationUnavailable> {
        let res = self
            .http
            .get(&self.endpoint)
            .query(&[("fields", "status,message,lat,lon")])
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| {
                tracing::debug!("IP location request failed: {}", e);
                LocationUnavailable::Lookup(e.to_string())
            })?;

        if !res.status().is_success() {
            return Err(LocationUnavailable::Lookup(format!(
                "lookup service returned status {}",
                res.status()
            )));
        }

        let body: IpApiResponse = res.json().await.map_err(|e| {
            tracing::debug!("IP location parse error: {}", e);
            LocationUnavailable::Lookup(e.to_string())
        })?;

        if body.status != "success" {
            let reason = body.message.unwrap_or_else(|| "unknown error".to_string());
            return Err(LocationUnavailable::Lookup(reason));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lng)) => {
                tracing::debug!(lat, lng, "located via IP");
                Ok(Coordinates { lat, lng })
            }
            _ => Err(LocationUnavailable::Lookup("response had no coordinates".to_string())),
        }
    }
}
