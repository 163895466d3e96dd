//! Geographic and screen coordinate primitives.

use std::f64::consts::FRAC_PI_2;

use nalgebra::Vector3;

/// A point on the sphere, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Longitude in degrees, east positive.
    pub lon: f64,
    /// Latitude in degrees, north positive.
    pub lat: f64,
}

impl GeoPoint {
    /// Create a new geographic point.
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Earth-centred unit vector: `x` towards (0, 0), `z` towards the north pole.
    #[must_use]
    pub fn to_unit_vector(self) -> Vector3<f64> {
        let (sin_lon, cos_lon) = self.lon.to_radians().sin_cos();
        let (sin_lat, cos_lat) = self.lat.to_radians().sin_cos();
        Vector3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
    }

    /// Inverse of [`GeoPoint::to_unit_vector`]; `v` need not be normalised.
    #[must_use]
    pub fn from_vector(v: &Vector3<f64>) -> Self {
        let lon = v.y.atan2(v.x);
        let lat = v.z.atan2(v.x.hypot(v.y));
        Self::new(lon.to_degrees(), lat.to_degrees())
    }

    /// Check that both components are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// A point in screen space. `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    /// Horizontal offset from the left edge.
    pub x: f64,
    /// Vertical offset from the top edge.
    pub y: f64,
}

impl ScreenPoint {
    /// Create a new screen point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another screen point.
    #[must_use]
    pub fn distance_to(&self, other: ScreenPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The rectangle the globe is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in screen units.
    pub width: f64,
    /// Height in screen units.
    pub height: f64,
}

impl Viewport {
    /// Create a new viewport.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The centre of the viewport.
    #[must_use]
    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width / 2.0, self.height / 2.0)
    }

    /// Check whether a screen point falls inside the rectangle (edges included).
    #[must_use]
    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }
}

/// Great-circle angular distance between two points, in radians.
///
/// Taken as the atan2 of the cross and dot products of the unit vectors,
/// which stays accurate for both tiny and antipodal separations.
#[must_use]
pub fn angular_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let (u, v) = (a.to_unit_vector(), b.to_unit_vector());
    u.cross(&v).norm().atan2(u.dot(&v))
}

/// Check whether `point` lies on the hemisphere centred on `center`.
#[must_use]
pub fn on_hemisphere(center: GeoPoint, point: GeoPoint) -> bool {
    angular_distance(center, point) <= FRAC_PI_2
}

/// Wrap a longitude into `(-180, 180]`.
#[must_use]
pub fn wrap_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}
