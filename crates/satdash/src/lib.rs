//! `satdash` - Terminal dashboard for a satellite-tracking backend
//!
//! This library provides the pieces behind the `satdash` binary: a typed client
//! for the backend's HTTP API, the searchable and sortable satellite list, the
//! refresh control and an orthographic globe that plots live positions.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod api;
pub mod atlas;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod globe;
pub mod logging;
pub mod model;
pub mod refresh;
pub mod render;
pub mod tui;

pub use api::{HttpApi, SatelliteApi};
pub use config::Config;
pub use dashboard::{Dashboard, PositionSink, SortKey};
pub use error::{Error, Result};
pub use globe::Globe;
pub use logging::init_logging;
pub use refresh::{RefreshControl, RefreshOutcome};
