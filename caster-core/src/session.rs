//! The request-state container owned by the presentation layer.
//!
//! Every fetch is issued a [`Ticket`] from a monotonically increasing
//! counter. A completion is only applied if its ticket is the latest one
//! issued, so a slow older request can never overwrite a newer result.

use crate::{
    error::{GatewayError, LocationUnavailable},
    location::resolve_search,
    model::{Coordinates, LocationContext, WeatherReport},
};

/// Identifies one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestState {
    Idle,
    Resolving,
    Fetching,
    Success(WeatherReport),
    Failed(String),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Resolving | RequestState::Fetching)
    }
}

#[derive(Debug)]
pub struct Session {
    state: RequestState,
    mounted: bool,
    issued: u64,
    position: Option<Coordinates>,
    location_error: Option<LocationUnavailable>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: RequestState::Idle,
            mounted: false,
            issued: 0,
            position: None,
            location_error: None,
        }
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    /// Last known device coordinates, if geolocation succeeded.
    pub fn position(&self) -> Option<Coordinates> {
        self.position
    }

    pub fn location_error(&self) -> Option<&LocationUnavailable> {
        self.location_error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Start geolocation. Only the first call has an effect.
    pub fn mount(&mut self) -> bool {
        if self.mounted {
            return false;
        }
        self.mounted = true;
        self.state = RequestState::Resolving;
        true
    }

    /// Geolocation succeeded. Returns a ticket if the result should be fetched,
    /// which is only the case while nothing newer was requested.
    pub fn location_resolved(&mut self, coords: Coordinates) -> Option<Ticket> {
        self.position = Some(coords);
        self.location_error = None;

        if self.state != RequestState::Resolving {
            tracing::debug!("geolocation arrived after a search; not fetching");
            return None;
        }

        Some(self.issue())
    }

    pub fn location_failed(&mut self, error: LocationUnavailable) {
        tracing::warn!(reason = %error, "location unavailable");
        self.location_error = Some(error);

        if self.state == RequestState::Resolving {
            self.state = RequestState::Idle;
        }
    }

    /// Submit the search form. Blank text changes nothing.
    pub fn submit_search(&mut self, text: &str) -> Option<(Ticket, LocationContext)> {
        let location = resolve_search(text)?;
        Some((self.issue(), location))
    }

    /// Apply the outcome of a fetch. Returns `false` if the ticket is stale
    /// and the outcome was discarded.
    pub fn complete(&mut self, ticket: Ticket, outcome: Result<WeatherReport, GatewayError>) -> bool {
        if ticket.0 != self.issued {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.issued,
                "discarding stale weather result"
            );
            return false;
        }

        self.state = match outcome {
            Ok(report) => RequestState::Success(report),
            Err(err) => {
                tracing::error!(error = %err, "weather analysis failed");
                RequestState::Failed(err.to_string())
            }
        };
        true
    }

    fn issue(&mut self) -> Ticket {
        self.issued += 1;
        self.state = RequestState::Fetching;
        Ticket(self.issued)
    }
}
