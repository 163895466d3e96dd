//! Backend API access.
//!
//! [`SatelliteApi`] is the seam between the dashboard and the network: the
//! terminal UI and CLI talk to [`HttpApi`], tests talk to an in-memory double.

mod http;
#[cfg(test)]
pub(crate) mod mock;

pub use http::HttpApi;

use crate::error::Result;
use crate::model::{
    HealthStatus, PositionBatch, RefreshStatus, Satellite, SatelliteList, SatelliteQuery,
};

/// Endpoint paths, relative to the configured base URL.
pub mod endpoints {
    /// Liveness check.
    pub const HEALTH: &str = "/api/health";
    /// Manual refresh trigger.
    pub const REFRESH: &str = "/api/refresh";
    /// Satellite list; `/<norad_id>` appended for a single record.
    pub const SATELLITES: &str = "/api/satellites";
    /// Batched positions.
    pub const POSITIONS: &str = "/api/satellites/positions";
}

/// Operations offered by the tracking backend.
#[async_trait::async_trait]
pub trait SatelliteApi: Send + Sync + std::fmt::Debug {
    /// `GET /api/health`.
    async fn health(&self) -> Result<HealthStatus>;

    /// `POST /api/refresh`.
    ///
    /// A failed refresh that still carries a status payload resolves to
    /// `Ok` with that payload.
    async fn refresh(&self) -> Result<RefreshStatus>;

    /// `GET /api/satellites`.
    async fn satellites(&self, query: &SatelliteQuery) -> Result<SatelliteList>;

    /// `GET /api/satellites/<norad_id>`; `None` when the backend has no such record.
    async fn satellite(&self, norad_id: u32) -> Result<Option<Satellite>>;

    /// `GET /api/satellites/positions?norad_ids=...`.
    async fn positions(&self, norad_ids: &[u32]) -> Result<PositionBatch>;
}

/// Render identifiers as the comma-separated list the positions endpoint expects.
#[must_use]
pub fn join_ids(norad_ids: &[u32]) -> String {
    norad_ids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
