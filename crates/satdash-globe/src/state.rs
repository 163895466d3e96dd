//! Rotation and drag interaction for the globe.
//!
//! The globe is either spinning on its own or following the pointer. All
//! transitions go through [`GlobeState::step`], which consumes the old state
//! and returns the new one.

use crate::geo::{wrap_longitude, ScreenPoint};
use crate::projection::Rotation;

/// Default spin speed, in degrees per 50 ms.
pub const DEFAULT_ROTATION_SPEED: f64 = 0.2;

/// Default drag sensitivity; divided by the globe radius to get degrees per
/// screen unit.
pub const DEFAULT_DRAG_SENSITIVITY: f64 = 75.0;

/// Milliseconds that make up one speed unit.
const SPEED_PERIOD_MS: f64 = 50.0;

/// Tilt limit in degrees.
const MAX_TILT: f64 = 90.0;

/// What currently drives the rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    /// The globe spins at a constant angular velocity.
    Rotating,
    /// The globe follows the pointer.
    Dragging {
        /// Last pointer position seen during the drag.
        last: ScreenPoint,
    },
}

/// Input to the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GlobeEvent {
    /// An animation frame, `elapsed_ms` after the previous one.
    Frame {
        /// Time since the previous frame, in milliseconds.
        elapsed_ms: f64,
    },
    /// Pointer pressed on the globe surface.
    PointerDown(ScreenPoint),
    /// Pointer moved.
    PointerMove(ScreenPoint),
    /// Pointer released.
    PointerUp,
}

/// Owned globe interaction state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobeState {
    /// Current projection rotation.
    pub rotation: Rotation,
    /// Current mode.
    pub mode: Mode,
    /// Spin speed in degrees per 50 ms.
    pub speed: f64,
    /// Degrees of rotation per screen unit of pointer travel.
    pub degrees_per_unit: f64,
}

impl GlobeState {
    /// Create a rotating state.
    #[must_use]
    pub fn new(speed: f64, degrees_per_unit: f64) -> Self {
        Self {
            rotation: Rotation::default(),
            mode: Mode::Rotating,
            speed,
            degrees_per_unit,
        }
    }

    /// Degrees per screen unit for a globe of radius `scale`.
    #[must_use]
    pub fn drag_factor(sensitivity: f64, scale: f64) -> f64 {
        if scale > 0.0 {
            sensitivity / scale
        } else {
            0.0
        }
    }

    /// Check whether the pointer currently drives the rotation.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.mode, Mode::Dragging { .. })
    }

    /// Apply one event and return the resulting state.
    #[must_use]
    pub fn step(self, event: GlobeEvent) -> Self {
        match (self.mode, event) {
            (Mode::Rotating, GlobeEvent::Frame { elapsed_ms }) => {
                let advance = self.speed * elapsed_ms.max(0.0) / SPEED_PERIOD_MS;
                Self {
                    rotation: Rotation {
                        lambda: wrap_longitude(self.rotation.lambda + advance),
                        ..self.rotation
                    },
                    ..self
                }
            }
            (_, GlobeEvent::PointerDown(at)) => Self {
                mode: Mode::Dragging { last: at },
                ..self
            },
            (Mode::Dragging { last }, GlobeEvent::PointerMove(at)) => {
                let k = self.degrees_per_unit;
                let lambda = wrap_longitude(self.rotation.lambda + (at.x - last.x) * k);
                let phi = (self.rotation.phi - (at.y - last.y) * k).clamp(-MAX_TILT, MAX_TILT);
                Self {
                    rotation: Rotation {
                        lambda,
                        phi,
                        ..self.rotation
                    },
                    mode: Mode::Dragging { last: at },
                    ..self
                }
            }
            (_, GlobeEvent::PointerUp) => Self {
                mode: Mode::Rotating,
                ..self
            },
            // Frames while dragging and moves while rotating change nothing.
            (Mode::Dragging { .. }, GlobeEvent::Frame { .. })
            | (Mode::Rotating, GlobeEvent::PointerMove(_)) => self,
        }
    }
}

impl Default for GlobeState {
    fn default() -> Self {
        Self::new(DEFAULT_ROTATION_SPEED, 1.0)
    }
}
