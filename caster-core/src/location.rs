use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{
    config::LocationConfig,
    error::LocationUnavailable,
    location::ip::IpLocator,
    model::{Coordinates, LocationContext},
};

pub mod ip;

/// The ambient "where am I" capability.
#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, LocationUnavailable>;
}

/// Always answers with the same coordinates.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationSource for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationUnavailable> {
        Ok(self.0)
    }
}

/// No location capability at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationSource for NoLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationUnavailable> {
        Err(LocationUnavailable::Unsupported)
    }
}

pub fn source_from_config(config: &LocationConfig) -> Arc<dyn LocationSource> {
    match config {
        LocationConfig::Ip { endpoint } => {
            let locator = match endpoint.as_deref() {
                Some(url) => IpLocator::with_endpoint(url),
                None => IpLocator::new(),
            };
            Arc::new(locator)
        }
        LocationConfig::Fixed { lat, lng } => Arc::new(FixedLocation(Coordinates { lat: *lat, lng: *lng })),
        LocationConfig::Off => Arc::new(NoLocation),
    }
}

/// Turn search-box text into a city context; blank text is ignored.
pub fn resolve_search(text: &str) -> Option<LocationContext> {
    LocationContext::city(text)
}
