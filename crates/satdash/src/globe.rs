//! The interactive globe view.
//!
//! [`Globe`] ties the projection, the rotation state machine and the marker
//! layer together and flattens everything into a [`Scene`] of screen-space
//! primitives after every frame or position batch. Drawing the scene is left
//! to the caller.

use satdash_globe::{
    project_line, GeoPoint, GlobeEvent, GlobeState, Graticule, JoinSummary, MarkerLayer,
    MarkerSample, Orthographic, Rotation, ScreenPoint, Viewport, Visibility,
};
use tracing::trace;

use crate::atlas::Ring;
use crate::config::GlobeConfig;
use crate::model::Position;

/// Radius of a satellite marker in screen units.
pub const MARKER_RADIUS: f64 = 3.0;

/// Display switches and tuning for the globe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobeOptions {
    /// Spin speed in degrees per 50 ms.
    pub rotation_speed: f64,
    /// Drag sensitivity, divided by the globe radius.
    pub drag_sensitivity: f64,
    /// Marker culling strategy.
    pub visibility: Visibility,
    /// Draw the latitude/longitude grid.
    pub show_graticule: bool,
    /// Draw altitude rings around markers.
    pub show_altitude_rings: bool,
}

impl Default for GlobeOptions {
    fn default() -> Self {
        Self::from(&GlobeConfig::default())
    }
}

impl From<&GlobeConfig> for GlobeOptions {
    fn from(config: &GlobeConfig) -> Self {
        Self {
            rotation_speed: config.rotation_speed,
            drag_sensitivity: config.drag_sensitivity,
            visibility: config.visibility,
            show_graticule: config.show_graticule,
            show_altitude_rings: config.show_altitude_rings,
        }
    }
}

/// A marker ready to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneMarker {
    /// NORAD catalog number.
    pub norad_id: u32,
    /// Screen position.
    pub at: ScreenPoint,
    /// Altitude ring radius, when rings are shown.
    pub ring_radius: Option<f64>,
    /// Whether the marker appeared recently.
    pub fresh: bool,
}

/// Screen-space primitives of one globe frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    /// Centre of the globe disc.
    pub center: ScreenPoint,
    /// Radius of the globe disc.
    pub radius: f64,
    /// Visible landmass outline runs.
    pub land: Vec<Vec<ScreenPoint>>,
    /// Visible graticule runs.
    pub graticule: Vec<Vec<ScreenPoint>>,
    /// Visible markers in identifier order.
    pub markers: Vec<SceneMarker>,
}

/// Rotating, draggable orthographic globe with satellite markers.
#[derive(Debug, Clone)]
pub struct Globe {
    projection: Orthographic,
    state: GlobeState,
    options: GlobeOptions,
    land: Vec<Ring>,
    graticule: Vec<Vec<GeoPoint>>,
    positions: Vec<Position>,
    markers: MarkerLayer,
    scene: Scene,
}

impl Globe {
    /// Create a globe fitted to `viewport`, without land or satellites.
    #[must_use]
    pub fn new(viewport: Viewport, options: GlobeOptions) -> Self {
        let projection = Orthographic::fit(viewport);
        let state = GlobeState::new(
            options.rotation_speed,
            GlobeState::drag_factor(options.drag_sensitivity, projection.scale()),
        );
        let mut globe = Self {
            projection,
            state,
            options,
            land: Vec::new(),
            graticule: Graticule::default().lines(),
            positions: Vec::new(),
            markers: MarkerLayer::new(),
            scene: Scene::default(),
        };
        globe.update_visualization();
        globe
    }

    /// The last built scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Current rotation.
    #[must_use]
    pub fn rotation(&self) -> Rotation {
        self.state.rotation
    }

    /// Current interaction state.
    #[must_use]
    pub fn state(&self) -> &GlobeState {
        &self.state
    }

    /// The projection as of the last scene.
    #[must_use]
    pub fn projection(&self) -> &Orthographic {
        &self.projection
    }

    /// The markers, including hidden ones.
    #[must_use]
    pub fn markers(&self) -> &MarkerLayer {
        &self.markers
    }

    /// Positions from the last batch.
    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Display options.
    #[must_use]
    pub fn options(&self) -> &GlobeOptions {
        &self.options
    }

    /// Replace the landmass rings.
    pub fn set_land(&mut self, land: Vec<Ring>) {
        self.land = land;
        self.update_visualization();
    }

    /// Toggle the graticule.
    pub fn set_show_graticule(&mut self, show: bool) {
        self.options.show_graticule = show;
        self.update_visualization();
    }

    /// Refit to a new viewport, keeping the rotation.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport == self.projection.viewport() {
            return;
        }
        self.projection.resize(viewport);
        self.state.degrees_per_unit =
            GlobeState::drag_factor(self.options.drag_sensitivity, self.projection.scale());
        self.update_visualization();
    }

    /// Replace the satellite positions and redraw.
    pub fn update_satellites(&mut self, positions: Vec<Position>) -> JoinSummary {
        let summary = self.markers.join(positions.iter().map(MarkerSample::from));
        trace!(
            entered = summary.entered.len(),
            updated = summary.updated.len(),
            exited = summary.exited.len(),
            "Joined positions"
        );
        self.positions = positions;
        self.update_visualization();
        summary
    }

    /// Advance the spin by one frame and redraw. Markers age even while the
    /// rotation is held by a drag.
    pub fn advance(&mut self, elapsed_ms: f64) {
        self.state = self.state.step(GlobeEvent::Frame { elapsed_ms });
        self.update_visualization();
    }

    /// Start a drag if `at` lies on the globe disc. Returns whether it did.
    pub fn pointer_down(&mut self, at: ScreenPoint) -> bool {
        if !self.projection.disc_contains(at) {
            return false;
        }
        self.apply(GlobeEvent::PointerDown(at));
        true
    }

    /// Follow the pointer while dragging.
    pub fn pointer_move(&mut self, at: ScreenPoint) {
        self.apply(GlobeEvent::PointerMove(at));
    }

    /// End a drag.
    pub fn pointer_up(&mut self) {
        self.apply(GlobeEvent::PointerUp);
    }

    fn apply(&mut self, event: GlobeEvent) {
        let next = self.state.step(event);
        let changed = next != self.state;
        self.state = next;
        if changed {
            self.update_visualization();
        }
    }

    /// Reproject land, graticule and markers for the current rotation.
    pub fn update_visualization(&mut self) {
        self.projection.set_rotation(self.state.rotation);
        let projection = &self.projection;

        let land = self
            .land
            .iter()
            .flat_map(|ring| project_line(projection, ring, true))
            .collect();
        let graticule = if self.options.show_graticule {
            self.graticule
                .iter()
                .flat_map(|line| project_line(projection, line, false))
                .collect()
        } else {
            Vec::new()
        };

        self.markers.layout(projection, self.options.visibility);
        let show_rings = self.options.show_altitude_rings;
        let markers = self
            .markers
            .visible()
            .filter_map(|marker| {
                marker.screen.map(|at| SceneMarker {
                    norad_id: marker.id,
                    at,
                    ring_radius: show_rings.then(|| MARKER_RADIUS * (1.0 + marker.ring_scale())),
                    fresh: marker.is_fresh(),
                })
            })
            .collect();

        self.scene = Scene {
            center: projection.translate(),
            radius: projection.scale(),
            land,
            graticule,
            markers,
        };
    }
}
