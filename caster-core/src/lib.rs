//! Core library for the AI Caster weather app.
//!
//! This crate defines:
//! - Location resolution (IP lookup, fixed coordinates, city search)
//! - Prompt construction anchored to Korea Standard Time
//! - The analysis gateway over a grounded generative-search model
//! - The request-state container and its async controller
//! - Configuration & credentials handling
//!
//! It is used by `caster-cli`, but can also be reused by other front ends.

pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod location;
pub mod model;
pub mod prompt;
pub mod session;

pub use config::{Config, LocationConfig};
pub use controller::{Controller, Event};
pub use error::{GatewayError, LocationUnavailable};
pub use gateway::{AnalysisGateway, GenerativeSearch, gateway_from_config};
pub use location::{LocationSource, source_from_config};
pub use model::{Coordinates, LocationContext, Source, WeatherReport};
pub use session::{RequestState, Session, Ticket};
