//! Core library for the TerraClima humidity service.
//!
//! This crate defines:
//! - Request validation and the humidity severity classifier
//! - Interchangeable humidity providers behind a factory
//! - The weather service and the framework-free HTTP endpoint contract
//! - Configuration & credentials handling
//!
//! It is used by `terraclima-cli`, but can also be embedded in other servers.

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod service;
pub mod severity;
pub mod validation;

pub use api::{ApiResponse, handle};
pub use config::{Config, ProviderConfig, ServerConfig};
pub use error::{FieldErrors, HumidityError};
pub use model::{Coordinate, HumidityReading, ResultEnvelope, WeatherQuery};
pub use provider::{HumidityProvider, Provider, ProviderFactory, ProviderId};
pub use service::WeatherService;
pub use severity::SeverityTier;
