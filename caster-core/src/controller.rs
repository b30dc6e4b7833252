//! Drives a [`Session`] from async geolocation and fetch tasks.
//!
//! Tasks run on the tokio runtime and report back through a channel; only
//! the controller mutates the session. A fetch superseded by a newer one is
//! cancelled, and its result would be discarded by ticket anyway.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{GatewayError, LocationUnavailable},
    gateway::AnalysisGateway,
    location::LocationSource,
    model::{Coordinates, LocationContext, WeatherReport},
    session::{RequestState, Session, Ticket},
};

#[derive(Debug)]
pub enum Event {
    Located(Result<Coordinates, LocationUnavailable>),
    Completed(Ticket, Result<WeatherReport, GatewayError>),
}

#[derive(Debug)]
pub struct Controller {
    session: Session,
    gateway: Arc<AnalysisGateway>,
    locator: Arc<dyn LocationSource>,
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
    in_flight: Option<CancellationToken>,
}

impl Controller {
    pub fn new(gateway: Arc<AnalysisGateway>, locator: Arc<dyn LocationSource>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session: Session::new(),
            gateway,
            locator,
            tx,
            rx,
            in_flight: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> &RequestState {
        self.session.state()
    }

    /// Start the one-time geolocation lookup.
    pub fn mount(&mut self) {
        if !self.session.mount() {
            return;
        }

        let locator = Arc::clone(&self.locator);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = locator.current_position().await;
            // The receiver lives as long as the controller; a send error means it is gone.
            let _ = tx.send(Event::Located(result));
        });
    }

    /// Submit the search form. Returns `false` for blank text, which does nothing.
    pub fn search(&mut self, text: &str) -> bool {
        match self.session.submit_search(text) {
            Some((ticket, location)) => {
                self.spawn_fetch(ticket, location);
                true
            }
            None => false,
        }
    }

    pub fn apply(&mut self, event: Event) {
        match event {
            Event::Located(Ok(coords)) => {
                if let Some(ticket) = self.session.location_resolved(coords) {
                    self.spawn_fetch(ticket, LocationContext::Coordinates(coords));
                }
            }
            Event::Located(Err(err)) => self.session.location_failed(err),
            Event::Completed(ticket, outcome) => {
                self.session.complete(ticket, outcome);
            }
        }
    }

    /// Wait for the next task to report back.
    pub async fn next_event(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Process events until nothing is loading any more.
    pub async fn settle(&mut self) -> &RequestState {
        while self.session.is_loading() {
            match self.rx.recv().await {
                Some(event) => self.apply(event),
                None => break,
            }
        }
        self.session.state()
    }

    fn spawn_fetch(&mut self, ticket: Ticket, location: LocationContext) {
        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
        }

        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());

        let gateway = Arc::clone(&self.gateway);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!(ticket = ticket.sequence(), "fetch superseded");
                }
                outcome = gateway.fetch_report(&location) => {
                    let _ = tx.send(Event::Completed(ticket, outcome));
                }
            }
        });
    }
}
