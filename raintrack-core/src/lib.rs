//! Core library for the `raintrack` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather source port and its OpenWeatherMap adapter
//! - Normalization of provider payloads, with fallback data on failure
//! - The days-since-rain state machine and its persisted state
//! - A cancellable recurring refresh
//!
//! It is used by `raintrack-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod display;
pub mod error;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod schedule;
pub mod service;
pub mod state;
pub mod storage;
pub mod tracker;

pub use config::{Config, Location};
pub use error::{FallbackReason, StorageError};
pub use model::{RainFacts, RainStatus, Reading, RefreshReport, Trend, WeatherReading};
pub use normalize::normalize;
pub use provider::{OpenWeatherSource, WeatherSource};
pub use schedule::RefreshTask;
pub use service::RainService;
pub use state::RainDayState;
pub use storage::{FileStore, KeyValueStore, MemoryStore, RainDayStore};
pub use tracker::advance;
