//! Reprojection of geographic polylines onto the visible hemisphere.

use crate::geo::{GeoPoint, ScreenPoint};
use crate::projection::Orthographic;

/// Bisection steps used to locate a limb crossing.
const LIMB_ITERATIONS: u32 = 12;

/// Project a polyline, splitting it wherever it passes behind the globe.
///
/// Each returned run contains only front-facing points, extended to the limb
/// where the line crosses it. Runs with fewer than two points are dropped.
/// With `closed` set, the last point is joined back to the first.
#[must_use]
pub fn project_line(
    projection: &Orthographic,
    points: &[GeoPoint],
    closed: bool,
) -> Vec<Vec<ScreenPoint>> {
    let mut runs = Vec::new();
    let mut current: Vec<ScreenPoint> = Vec::new();
    let mut previous: Option<(GeoPoint, bool)> = None;

    let tail = if closed && points.len() > 2 { points.first() } else { None };
    for &point in points.iter().chain(tail) {
        let front = point.is_finite() && projection.is_front(point);

        if let Some((prev, prev_front)) = previous {
            if prev_front != front {
                if let Some(limb) = limb_crossing(projection, prev, point, prev_front) {
                    if let Some(screen) = projection.project(limb) {
                        current.push(screen);
                    }
                }
            }
        }

        if front {
            if let Some(screen) = projection.project(point) {
                current.push(screen);
            }
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
        previous = Some((point, front));
    }
    if !current.is_empty() {
        runs.push(current);
    }

    runs.retain(|run| run.len() > 1);
    runs
}

/// Locate the point where the segment `a -> b` crosses the limb.
///
/// Interpolates linearly in longitude/latitude, which is adequate for the
/// short segments of map data. Segments that wrap across the antimeridian
/// are skipped.
fn limb_crossing(
    projection: &Orthographic,
    a: GeoPoint,
    b: GeoPoint,
    a_front: bool,
) -> Option<GeoPoint> {
    if !a.is_finite() || !b.is_finite() || (a.lon - b.lon).abs() > 180.0 {
        return None;
    }
    let lerp = |t: f64| GeoPoint::new(a.lon + (b.lon - a.lon) * t, a.lat + (b.lat - a.lat) * t);

    // Invariant: lerp(front_t) faces the viewer, lerp(back_t) does not.
    let (mut front_t, mut back_t) = if a_front { (0.0, 1.0) } else { (1.0, 0.0) };
    for _ in 0..LIMB_ITERATIONS {
        let mid = (front_t + back_t) / 2.0;
        if projection.is_front(lerp(mid)) {
            front_t = mid;
        } else {
            back_t = mid;
        }
    }
    Some(lerp(front_t))
}
