//! Core library for the `tempest` CLI.
//!
//! This crate defines:
//! - Configuration & station credentials handling
//! - Current conditions and station status
//! - The history pipeline (time windows, resolution, downsampling)
//! - Observation sources: the WeatherFlow cloud API and a local `tempestd`
//! - Shared domain models and unit conversion
//!
//! It is used by `tempest-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod current;
pub mod error;
pub mod forecast;
pub mod history;
pub mod http;
pub mod model;
pub mod source;
pub mod status;
pub mod units;

pub use config::{Config, StationConfig};
pub use current::{Current, fetch_current};
pub use error::{ErrorKind, TempestError, TransportFailure};
pub use history::{DateFlags, History, HistoryRequest, Resolution, TimeWindow, fetch_history};
pub use http::HttpClient;
pub use model::{Forecast, ForecastDay, Observation, Station};
pub use reqwest::Url;
pub use source::{ObservationSource, SourceKind, source_for};
pub use status::{StationStatus, station_statuses};
pub use units::UnitSystem;
