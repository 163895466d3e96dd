//! Orthographic projection with three-axis rotation.
//!
//! Rotation follows the usual web-mapping convention: `lambda` is added to
//! every longitude first, then the sphere is tilted by `phi` about the
//! east-west axis and rolled by `gamma` about the view axis. The point at the
//! centre of the view is therefore `(-lambda, -phi)` whatever `gamma` is.

use nalgebra::{Rotation3, Vector3};

use crate::geo::{on_hemisphere, wrap_longitude, GeoPoint, ScreenPoint, Viewport};

/// Ratio between viewport height and globe radius.
const FIT_RATIO: f64 = 2.1;

/// Rotation angles of the projection, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    /// Spin about the polar axis.
    pub lambda: f64,
    /// Tilt towards or away from the viewer.
    pub phi: f64,
    /// Roll about the view axis.
    pub gamma: f64,
}

impl Rotation {
    /// Create a new rotation.
    #[must_use]
    pub const fn new(lambda: f64, phi: f64, gamma: f64) -> Self {
        Self { lambda, phi, gamma }
    }

    /// The rotation as a matrix acting on earth-centred unit vectors:
    /// spin about `z`, then tilt about `y`, then roll about `x`.
    #[must_use]
    pub fn matrix(&self) -> Rotation3<f64> {
        let spin = Rotation3::from_axis_angle(&Vector3::z_axis(), self.lambda.to_radians());
        let tilt = Rotation3::from_axis_angle(&Vector3::y_axis(), -self.phi.to_radians());
        let roll = Rotation3::from_axis_angle(&Vector3::x_axis(), self.gamma.to_radians());
        roll * tilt * spin
    }
}

/// An orthographic projection fitted to a viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct Orthographic {
    rotation: Rotation,
    scale: f64,
    viewport: Viewport,
}

impl Orthographic {
    /// Create a projection whose globe fills the viewport height with a small margin.
    #[must_use]
    pub fn fit(viewport: Viewport) -> Self {
        Self {
            rotation: Rotation::default(),
            scale: viewport.height / FIT_RATIO,
            viewport,
        }
    }

    /// Refit the projection to a new viewport, keeping the rotation.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.scale = viewport.height / FIT_RATIO;
    }

    /// Current rotation.
    #[must_use]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Replace the rotation.
    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    /// Builder-style variant of [`Orthographic::set_rotation`].
    #[must_use]
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Globe radius in screen units.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// The viewport the projection is fitted to.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Screen position of the globe centre.
    #[must_use]
    pub fn translate(&self) -> ScreenPoint {
        self.viewport.center()
    }

    /// The geographic point currently at the centre of the view.
    #[must_use]
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(wrap_longitude(-self.rotation.lambda), -self.rotation.phi)
    }

    /// Apply the projection rotation to a point, returning rotated degrees.
    #[must_use]
    pub fn rotate(&self, point: GeoPoint) -> GeoPoint {
        GeoPoint::from_vector(&(self.rotation.matrix() * point.to_unit_vector()))
    }

    /// Project a geographic point to screen coordinates.
    ///
    /// Points on the far side of the globe still project (onto the disc);
    /// hemisphere culling is left to the visibility strategy. Returns `None`
    /// only when the input or the result is not a finite number.
    #[must_use]
    pub fn project(&self, point: GeoPoint) -> Option<ScreenPoint> {
        if !point.is_finite() {
            return None;
        }
        // The viewer looks down the rotated x axis, with y to the right and z up.
        let v = self.rotation.matrix() * point.to_unit_vector();
        let t = self.translate();
        let projected = ScreenPoint::new(t.x + v.y * self.scale, t.y - v.z * self.scale);
        (projected.x.is_finite() && projected.y.is_finite()).then_some(projected)
    }

    /// Check whether a geographic point faces the viewer.
    #[must_use]
    pub fn is_front(&self, point: GeoPoint) -> bool {
        on_hemisphere(self.center(), point)
    }

    /// Check whether a screen point lies on the globe disc.
    #[must_use]
    pub fn disc_contains(&self, point: ScreenPoint) -> bool {
        self.translate().distance_to(point) <= self.scale
    }
}
