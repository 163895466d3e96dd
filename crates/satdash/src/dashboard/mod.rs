//! Dashboard manager.
//!
//! Owns the satellite list, applies search and ordering, keeps the rendered
//! list entries current and forwards position batches to a [`PositionSink`].
//!
//! Fetches come in two shapes. [`Dashboard::fetch_satellites`] and
//! [`Dashboard::update_positions`] run a request to completion and suit
//! one-shot commands. The terminal UI instead uses the split-phase
//! `begin_*`/`apply_*` pairs so requests can run in spawned tasks while the
//! event loop keeps ownership of the dashboard.

pub mod query;
pub mod sequence;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

pub use query::SortKey;
pub use sequence::{Sequencer, Ticket};

use crate::api::SatelliteApi;
use crate::error::Result;
use crate::model::{Position, PositionBatch, Satellite, SatelliteList, SatelliteQuery};
use crate::render::ListEntry;

/// Default cap on identifiers per position request.
pub const DEFAULT_POSITION_BATCH_LIMIT: usize = 100;

/// Receives each applied position batch.
pub trait PositionSink: Send {
    /// Replace the displayed positions.
    fn update_satellites(&mut self, positions: Vec<Position>);
}

impl<F> PositionSink for F
where
    F: FnMut(Vec<Position>) + Send,
{
    fn update_satellites(&mut self, positions: Vec<Position>) {
        self(positions);
    }
}

/// A position request ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionRequest {
    /// Ordering ticket for the response.
    pub ticket: Ticket,
    /// Identifiers to request, never more than the batch limit.
    pub norad_ids: Vec<u32>,
}

/// Satellite list state and its fetch cycle.
pub struct Dashboard {
    api: Arc<dyn SatelliteApi>,
    sink: Box<dyn PositionSink>,
    satellites: Vec<Satellite>,
    filtered: Vec<Satellite>,
    entries: Vec<ListEntry>,
    search: String,
    sort: SortKey,
    active_count: usize,
    last_update: Option<DateTime<Utc>>,
    batch_limit: usize,
    metadata_seq: Sequencer,
    position_seq: Sequencer,
}

impl fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dashboard")
            .field("api", &self.api)
            .field("satellites", &self.satellites.len())
            .field("filtered", &self.filtered.len())
            .field("search", &self.search)
            .field("sort", &self.sort)
            .field("active_count", &self.active_count)
            .field("last_update", &self.last_update)
            .field("batch_limit", &self.batch_limit)
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    /// Create an empty dashboard.
    ///
    /// A zero `batch_limit` is raised to 1.
    pub fn new(
        api: Arc<dyn SatelliteApi>,
        sink: impl PositionSink + 'static,
        batch_limit: usize,
    ) -> Self {
        Self {
            api,
            sink: Box::new(sink),
            satellites: Vec::new(),
            filtered: Vec::new(),
            entries: Vec::new(),
            search: String::new(),
            sort: SortKey::default(),
            active_count: 0,
            last_update: None,
            batch_limit: batch_limit.max(1),
            metadata_seq: Sequencer::new(),
            position_seq: Sequencer::new(),
        }
    }

    /// The backend this dashboard polls.
    #[must_use]
    pub fn api(&self) -> Arc<dyn SatelliteApi> {
        Arc::clone(&self.api)
    }

    /// Every satellite from the last applied fetch, in backend order.
    #[must_use]
    pub fn satellites(&self) -> &[Satellite] {
        &self.satellites
    }

    /// The searched and ordered subset.
    #[must_use]
    pub fn filtered(&self) -> &[Satellite] {
        &self.filtered
    }

    /// Rendered rows of the filtered subset.
    #[must_use]
    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    /// Current search text.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Current ordering.
    #[must_use]
    pub fn sort(&self) -> SortKey {
        self.sort
    }

    /// Count reported by the backend with the last list.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Backend timestamp of the last list.
    #[must_use]
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    /// Maximum identifiers per position request.
    #[must_use]
    pub fn batch_limit(&self) -> usize {
        self.batch_limit
    }

    /// Change the search text and refilter.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.filter_satellites();
    }

    /// Change the ordering and resort.
    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.sort_satellites();
    }

    /// Rebuild the filtered subset from the search text, then sort and render.
    pub fn filter_satellites(&mut self) {
        self.filtered = query::filter(&self.satellites, &self.search);
        self.sort_satellites();
    }

    /// Order the filtered subset, then render.
    pub fn sort_satellites(&mut self) {
        query::sort(&mut self.filtered, self.sort);
        self.render_satellite_list();
    }

    /// Rebuild the list entries from the filtered subset.
    pub fn render_satellite_list(&mut self) {
        self.entries = self.filtered.iter().map(ListEntry::from).collect();
    }

    /// Start a metadata fetch.
    pub fn begin_fetch_satellites(&mut self) -> Ticket {
        self.metadata_seq.issue()
    }

    /// Apply a metadata response.
    ///
    /// Returns `true` when the list was replaced, in which case the caller
    /// should follow up with a position update. Failures are logged and
    /// leave the current list in place.
    pub fn apply_satellites(&mut self, ticket: Ticket, result: Result<SatelliteList>) -> bool {
        let list = match result {
            Ok(list) => list,
            Err(e) => {
                error!(error = %e, "Failed to fetch satellites");
                return false;
            }
        };
        if !self.metadata_seq.accept(ticket) {
            debug!(ticket = ticket.get(), "Discarding stale satellite list");
            return false;
        }

        info!(count = list.count, received = list.satellites.len(), "Satellite list updated");
        self.active_count = list.count;
        self.last_update = list.updated;
        self.satellites = list.satellites;
        self.filter_satellites();
        true
    }

    /// Start a position update for the head of the filtered list.
    ///
    /// Returns `None` when there is nothing to request.
    pub fn begin_update_positions(&mut self) -> Option<PositionRequest> {
        let norad_ids = query::position_batch(&self.filtered, self.batch_limit);
        if norad_ids.is_empty() {
            debug!("No satellites listed, skipping position update");
            return None;
        }
        Some(PositionRequest {
            ticket: self.position_seq.issue(),
            norad_ids,
        })
    }

    /// Apply a position response, forwarding it to the sink.
    ///
    /// Returns `true` when the batch reached the sink.
    pub fn apply_positions(&mut self, ticket: Ticket, result: Result<PositionBatch>) -> bool {
        let batch = match result {
            Ok(batch) => batch,
            Err(e) => {
                error!(error = %e, "Failed to fetch positions");
                return false;
            }
        };
        if !self.position_seq.accept(ticket) {
            debug!(ticket = ticket.get(), "Discarding stale positions");
            return false;
        }

        debug!(count = batch.positions.len(), "Positions updated");
        self.sink.update_satellites(batch.positions);
        true
    }

    /// Fetch the satellite list and, on success, their positions.
    pub async fn fetch_satellites(&mut self) {
        let ticket = self.begin_fetch_satellites();
        let result = self.api.satellites(&SatelliteQuery::default()).await;
        if self.apply_satellites(ticket, result) {
            self.update_positions().await;
        }
    }

    /// Fetch the satellite list matching `query` and apply it, without a
    /// position update.
    ///
    /// # Errors
    ///
    /// Returns the request error; the current list is left in place.
    pub async fn load_satellites(&mut self, query: &SatelliteQuery) -> Result<()> {
        let ticket = self.begin_fetch_satellites();
        let list = self.api.satellites(query).await?;
        self.apply_satellites(ticket, Ok(list));
        Ok(())
    }

    /// Fetch positions for the head of the filtered list.
    pub async fn update_positions(&mut self) {
        let Some(request) = self.begin_update_positions() else {
            return;
        };
        let result = self.api.positions(&request.norad_ids).await;
        self.apply_positions(request.ticket, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::error::Error;
    use chrono::TimeZone;
    use std::sync::Mutex;

    type Received = Arc<Mutex<Vec<Vec<Position>>>>;

    fn at(y: i32, m: u32, d: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap())
    }

    fn position(norad_id: u32) -> Position {
        Position {
            norad_id,
            lon: 10.0,
            lat: 20.0,
            alt_km: 400.0,
        }
    }

    fn dashboard(api: &Arc<MockApi>) -> (Dashboard, Received) {
        let received: Received = Arc::default();
        let sink = {
            let received = Arc::clone(&received);
            move |positions: Vec<Position>| received.lock().unwrap().push(positions)
        };
        let api: Arc<dyn SatelliteApi> = Arc::clone(api) as Arc<dyn SatelliteApi>;
        (Dashboard::new(api, sink, DEFAULT_POSITION_BATCH_LIMIT), received)
    }

    fn iss_and_hubble() -> Vec<Satellite> {
        vec![
            Satellite::new(25544, "ISS", at(2024, 1, 1)),
            Satellite::new(20580, "Hubble", at(2024, 2, 1)),
        ]
    }

    fn names(dashboard: &Dashboard) -> Vec<&str> {
        dashboard.entries().iter().map(|e| e.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_fetch_then_sort_and_search() {
        let api = Arc::new(
            MockApi::new()
                .with_satellites(iss_and_hubble())
                .with_positions(vec![position(25544), position(20580)]),
        );
        let (mut dash, received) = dashboard(&api);

        dash.set_sort(SortKey::from_select("updated"));
        dash.fetch_satellites().await;

        assert_eq!(dash.active_count(), 2);
        assert_eq!(names(&dash), vec!["Hubble", "ISS"]);
        assert_eq!(dash.entries()[0].href, "/satellite/20580");

        dash.set_search("iss");
        assert_eq!(names(&dash), vec!["ISS"]);

        // The metadata fetch triggered one position update for both ids.
        assert_eq!(api.position_requests(), vec![vec![20580, 25544]]);
        assert_eq!(received.lock().unwrap().len(), 1);
        assert_eq!(received.lock().unwrap()[0].len(), 2);
    }

    #[tokio::test]
    async fn test_positions_follow_filtered_order() {
        let api = Arc::new(
            MockApi::new()
                .with_satellites(iss_and_hubble())
                .with_positions(vec![position(25544)]),
        );
        let (mut dash, received) = dashboard(&api);
        dash.fetch_satellites().await;

        dash.set_search("iss");
        dash.update_positions().await;

        let requests = api.position_requests();
        assert_eq!(requests.last(), Some(&vec![25544]));
        assert_eq!(received.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_position_request_is_capped() {
        let many: Vec<Satellite> = (1..=150)
            .map(|i| Satellite::new(i, format!("SAT {i:03}"), None))
            .collect();
        let api = Arc::new(MockApi::new().with_satellites(many).with_positions(Vec::new()));
        let (mut dash, _) = dashboard(&api);
        dash.fetch_satellites().await;

        let requests = api.position_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].len(), 100);
        assert_eq!(requests[0][0], 1);
    }

    #[tokio::test]
    async fn test_empty_list_skips_positions() {
        let api = Arc::new(MockApi::new().with_satellites(Vec::new()));
        let (mut dash, received) = dashboard(&api);
        dash.fetch_satellites().await;

        assert_eq!(api.satellite_fetches(), 1);
        assert!(api.position_requests().is_empty());
        assert!(received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_with_no_match_skips_positions() {
        let api = Arc::new(MockApi::new().with_satellites(iss_and_hubble()));
        let (mut dash, _) = dashboard(&api);
        dash.set_search("no such satellite");
        dash.fetch_satellites().await;

        assert!(dash.entries().is_empty());
        assert!(api.position_requests().is_empty());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_list() {
        let api = Arc::new(
            MockApi::new()
                .with_satellites(iss_and_hubble())
                .with_positions(Vec::new()),
        );
        let (mut dash, _) = dashboard(&api);
        dash.fetch_satellites().await;
        assert_eq!(dash.satellites().len(), 2);

        api.fail_satellites();
        dash.fetch_satellites().await;

        assert_eq!(dash.satellites().len(), 2);
        assert_eq!(dash.entries().len(), 2);
        assert_eq!(api.satellite_fetches(), 2);
        // No position update follows a failed fetch.
        assert_eq!(api.position_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_load_satellites_reports_failure() {
        let api = Arc::new(MockApi::new().with_satellites(iss_and_hubble()));
        let (mut dash, _) = dashboard(&api);
        let query = SatelliteQuery {
            limit: Some(10),
            ..SatelliteQuery::default()
        };
        dash.load_satellites(&query).await.unwrap();
        assert_eq!(dash.active_count(), 2);
        assert!(api.position_requests().is_empty());

        api.fail_satellites();
        let err = dash.load_satellites(&query).await.unwrap_err();
        assert!(matches!(err, Error::Status { status: 503, .. }));
        assert_eq!(dash.satellites().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_positions_leave_sink_untouched() {
        let api = Arc::new(MockApi::new().with_satellites(iss_and_hubble()));
        let (mut dash, received) = dashboard(&api);
        dash.fetch_satellites().await;

        assert_eq!(api.position_requests().len(), 1);
        assert!(received.lock().unwrap().is_empty());
    }

    #[test]
    fn test_stale_satellite_list_is_discarded() {
        let api = Arc::new(MockApi::new());
        let (mut dash, _) = dashboard(&api);

        let older = dash.begin_fetch_satellites();
        let newer = dash.begin_fetch_satellites();

        let fresh = SatelliteList {
            satellites: iss_and_hubble(),
            updated: at(2024, 3, 1),
            count: 2,
        };
        let stale = SatelliteList {
            satellites: vec![Satellite::new(1, "OLD", None)],
            updated: at(2023, 1, 1),
            count: 1,
        };

        assert!(dash.apply_satellites(newer, Ok(fresh)));
        assert!(!dash.apply_satellites(older, Ok(stale)));
        assert_eq!(dash.active_count(), 2);
        assert_eq!(dash.last_update(), at(2024, 3, 1));
    }

    #[test]
    fn test_stale_positions_are_discarded() {
        let api = Arc::new(MockApi::new());
        let (mut dash, received) = dashboard(&api);
        let list = SatelliteList {
            satellites: iss_and_hubble(),
            updated: None,
            count: 2,
        };
        let ticket = dash.begin_fetch_satellites();
        assert!(dash.apply_satellites(ticket, Ok(list)));

        let older = dash.begin_update_positions().unwrap();
        let newer = dash.begin_update_positions().unwrap();
        let batch = |ids: &[u32]| PositionBatch {
            timestamp: None,
            positions: ids.iter().copied().map(position).collect(),
        };

        assert!(dash.apply_positions(newer.ticket, Ok(batch(&[25544, 20580]))));
        assert!(!dash.apply_positions(older.ticket, Ok(batch(&[25544]))));

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].len(), 2);
    }

    #[test]
    fn test_failed_response_does_not_block_older_one() {
        let api = Arc::new(MockApi::new());
        let (mut dash, _) = dashboard(&api);
        let older = dash.begin_fetch_satellites();
        let newer = dash.begin_fetch_satellites();

        assert!(!dash.apply_satellites(newer, Err(Error::status("/api/satellites", 500))));
        let list = SatelliteList {
            satellites: iss_and_hubble(),
            updated: None,
            count: 2,
        };
        assert!(dash.apply_satellites(older, Ok(list)));
    }

    #[test]
    fn test_sort_changes_rerender() {
        let api = Arc::new(MockApi::new());
        let (mut dash, _) = dashboard(&api);
        let ticket = dash.begin_fetch_satellites();
        dash.apply_satellites(
            ticket,
            Ok(SatelliteList {
                satellites: iss_and_hubble(),
                updated: None,
                count: 2,
            }),
        );

        assert_eq!(names(&dash), vec!["Hubble", "ISS"]);
        dash.set_sort(SortKey::Norad);
        assert_eq!(names(&dash), vec!["Hubble", "ISS"]);
        dash.set_sort(SortKey::Unsorted);
        // Resorting an already ordered list keeps it; refiltering restores backend order.
        dash.filter_satellites();
        assert_eq!(names(&dash), vec!["ISS", "Hubble"]);
    }

    #[test]
    fn test_zero_batch_limit_is_raised() {
        let api: Arc<dyn SatelliteApi> = Arc::new(MockApi::new());
        let dash = Dashboard::new(api, |_: Vec<Position>| {}, 0);
        assert_eq!(dash.batch_limit(), 1);
    }
}
