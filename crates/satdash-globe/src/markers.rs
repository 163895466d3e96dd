//! Keyed satellite markers.
//!
//! Markers are joined against each new batch of samples by identifier:
//! new identifiers enter, missing ones exit, and the rest are updated in
//! place so any per-marker state survives a redraw.

use std::collections::BTreeMap;

use crate::geo::{GeoPoint, ScreenPoint};
use crate::projection::Orthographic;
use crate::visibility::Visibility;

/// Frames during which a newly entered marker counts as fresh.
pub const FRESH_FRAMES: u32 = 20;

/// Altitude, in kilometres, that maps to a ring scale of 1.
const RING_ALTITUDE_UNIT_KM: f64 = 1000.0;

/// One position sample to be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerSample {
    /// Identifier used as the join key.
    pub id: u32,
    /// Sub-satellite point.
    pub point: GeoPoint,
    /// Altitude above the surface in kilometres.
    pub alt_km: f64,
}

/// A drawn marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Join key.
    pub id: u32,
    /// Latest sub-satellite point.
    pub point: GeoPoint,
    /// Latest altitude in kilometres.
    pub alt_km: f64,
    /// Projected position, if any.
    pub screen: Option<ScreenPoint>,
    /// Whether the marker passed the visibility check on the last layout.
    pub visible: bool,
    /// Number of layouts since the marker entered.
    pub age: u32,
}

impl Marker {
    fn enter(sample: MarkerSample) -> Self {
        Self {
            id: sample.id,
            point: sample.point,
            alt_km: sample.alt_km,
            screen: None,
            visible: false,
            age: 0,
        }
    }

    /// Scale factor for the altitude ring.
    #[must_use]
    pub fn ring_scale(&self) -> f64 {
        (self.alt_km / RING_ALTITUDE_UNIT_KM).max(0.0)
    }

    /// Check whether the marker entered recently.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.age < FRESH_FRAMES
    }
}

/// Outcome of a join, as identifier lists in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinSummary {
    /// Identifiers that got a new marker.
    pub entered: Vec<u32>,
    /// Identifiers whose marker was updated in place.
    pub updated: Vec<u32>,
    /// Identifiers whose marker was removed.
    pub exited: Vec<u32>,
}

/// The set of markers currently on the globe.
#[derive(Debug, Clone, Default)]
pub struct MarkerLayer {
    markers: BTreeMap<u32, Marker>,
}

impl MarkerLayer {
    /// Create an empty layer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Join a batch of samples against the current markers.
    ///
    /// When an identifier appears more than once, the last sample wins.
    pub fn join<I>(&mut self, samples: I) -> JoinSummary
    where
        I: IntoIterator<Item = MarkerSample>,
    {
        let mut incoming: BTreeMap<u32, MarkerSample> = BTreeMap::new();
        for sample in samples {
            incoming.insert(sample.id, sample);
        }

        let mut summary = JoinSummary::default();
        self.markers.retain(|id, _| {
            let keep = incoming.contains_key(id);
            if !keep {
                summary.exited.push(*id);
            }
            keep
        });

        for (id, sample) in incoming {
            match self.markers.get_mut(&id) {
                Some(marker) => {
                    marker.point = sample.point;
                    marker.alt_km = sample.alt_km;
                    summary.updated.push(id);
                }
                None => {
                    self.markers.insert(id, Marker::enter(sample));
                    summary.entered.push(id);
                }
            }
        }
        summary
    }

    /// Reproject every marker and apply the visibility strategy.
    pub fn layout(&mut self, projection: &Orthographic, visibility: Visibility) {
        for marker in self.markers.values_mut() {
            marker.screen = projection.project(marker.point);
            marker.visible = visibility.is_visible(projection, marker.point, marker.screen);
            marker.age = marker.age.saturating_add(1);
        }
    }

    /// Look up a marker by identifier.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&Marker> {
        self.markers.get(&id)
    }

    /// Iterate over all markers in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.values()
    }

    /// Iterate over markers that passed the last visibility check.
    pub fn visible(&self) -> impl Iterator<Item = &Marker> {
        self.markers.values().filter(|m| m.visible)
    }

    /// Number of markers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Check whether the layer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
