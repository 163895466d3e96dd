//! In-memory [`SatelliteApi`] for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{endpoints, SatelliteApi};
use crate::error::{Error, Result};
use crate::model::{
    HealthStatus, Position, PositionBatch, RefreshStatus, Satellite, SatelliteList, SatelliteQuery,
};

/// A recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Health,
    Refresh,
    Satellites,
    Satellite(u32),
    Positions(Vec<u32>),
}

/// Scripted backend. Unset responses fail with HTTP 503.
#[derive(Debug, Default)]
pub(crate) struct MockApi {
    list: Mutex<Option<SatelliteList>>,
    positions: Mutex<Option<Vec<Position>>>,
    refresh_status: Mutex<Option<String>>,
    calls: Mutex<Vec<Call>>,
}

impl MockApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_satellites(self, satellites: Vec<Satellite>) -> Self {
        let count = satellites.len();
        *self.list.lock().unwrap() = Some(SatelliteList {
            satellites,
            updated: None,
            count,
        });
        self
    }

    pub(crate) fn with_positions(self, positions: Vec<Position>) -> Self {
        *self.positions.lock().unwrap() = Some(positions);
        self
    }

    pub(crate) fn with_refresh_status(self, status: &str) -> Self {
        *self.refresh_status.lock().unwrap() = Some(status.to_string());
        self
    }

    /// Make the satellite list endpoint fail from now on.
    pub(crate) fn fail_satellites(&self) {
        *self.list.lock().unwrap() = None;
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    pub(crate) fn satellite_fetches(&self) -> usize {
        self.count(|c| matches!(c, Call::Satellites))
    }

    pub(crate) fn position_requests(&self) -> Vec<Vec<u32>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                Call::Positions(ids) => Some(ids.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl SatelliteApi for MockApi {
    async fn health(&self) -> Result<HealthStatus> {
        self.record(Call::Health);
        Ok(HealthStatus {
            status: "ok".to_string(),
            timestamp: None,
        })
    }

    async fn refresh(&self) -> Result<RefreshStatus> {
        self.record(Call::Refresh);
        let status = self.refresh_status.lock().unwrap().clone();
        status
            .map(|status| RefreshStatus {
                status,
                count: None,
                time: None,
                message: None,
            })
            .ok_or_else(|| Error::status(endpoints::REFRESH, 503))
    }

    async fn satellites(&self, _query: &SatelliteQuery) -> Result<SatelliteList> {
        self.record(Call::Satellites);
        self.list
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::status(endpoints::SATELLITES, 503))
    }

    async fn satellite(&self, norad_id: u32) -> Result<Option<Satellite>> {
        self.record(Call::Satellite(norad_id));
        Ok(self.list.lock().unwrap().as_ref().and_then(|list| {
            list.satellites
                .iter()
                .find(|s| s.norad_id == norad_id)
                .cloned()
        }))
    }

    async fn positions(&self, norad_ids: &[u32]) -> Result<PositionBatch> {
        self.record(Call::Positions(norad_ids.to_vec()));
        let positions = self
            .positions
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::status(endpoints::POSITIONS, 503))?;
        Ok(PositionBatch {
            timestamp: None,
            positions: positions
                .into_iter()
                .filter(|p| norad_ids.contains(&p.norad_id))
                .collect(),
        })
    }
}

/// Backend that never answers.
#[derive(Debug, Default)]
pub(crate) struct StalledApi {
    refreshes: AtomicUsize,
}

impl StalledApi {
    /// Number of refresh requests started.
    pub(crate) fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SatelliteApi for StalledApi {
    async fn health(&self) -> Result<HealthStatus> {
        std::future::pending().await
    }

    async fn refresh(&self) -> Result<RefreshStatus> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }

    async fn satellites(&self, _query: &SatelliteQuery) -> Result<SatelliteList> {
        std::future::pending().await
    }

    async fn satellite(&self, _norad_id: u32) -> Result<Option<Satellite>> {
        std::future::pending().await
    }

    async fn positions(&self, _norad_ids: &[u32]) -> Result<PositionBatch> {
        std::future::pending().await
    }
}
