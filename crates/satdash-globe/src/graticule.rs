//! Latitude/longitude reference grid.

use crate::geo::GeoPoint;

/// Generator for a regular graticule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Graticule {
    /// Spacing between lines, in degrees.
    pub step: f64,
    /// Sampling interval along each line, in degrees.
    pub precision: f64,
    /// Latitude beyond which minor meridians stop, in degrees.
    pub polar_cap: f64,
}

impl Default for Graticule {
    fn default() -> Self {
        Self {
            step: 10.0,
            precision: 2.5,
            polar_cap: 80.0,
        }
    }
}

impl Graticule {
    /// Generate all grid lines as polylines of geographic points.
    ///
    /// Meridians on multiples of 90 degrees run pole to pole; the others stop
    /// at the polar cap so the poles do not turn into a solid blot.
    #[must_use]
    pub fn lines(&self) -> Vec<Vec<GeoPoint>> {
        let mut lines = self.meridians();
        lines.extend(self.parallels());
        lines
    }

    fn meridians(&self) -> Vec<Vec<GeoPoint>> {
        stops(-180.0, 180.0, self.step, false)
            .into_iter()
            .map(|lon| {
                let cap = if (lon % 90.0).abs() < f64::EPSILON {
                    90.0
                } else {
                    self.polar_cap
                };
                stops(-cap, cap, self.precision, true)
                    .into_iter()
                    .map(|lat| GeoPoint::new(lon, lat))
                    .collect()
            })
            .collect()
    }

    fn parallels(&self) -> Vec<Vec<GeoPoint>> {
        stops(-self.polar_cap, self.polar_cap, self.step, true)
            .into_iter()
            .map(|lat| {
                stops(-180.0, 180.0, self.precision, true)
                    .into_iter()
                    .map(|lon| GeoPoint::new(lon, lat))
                    .collect()
            })
            .collect()
    }
}

/// Evenly spaced values from `start` towards `end`.
fn stops(start: f64, end: f64, step: f64, inclusive: bool) -> Vec<f64> {
    if step <= 0.0 || end < start {
        return Vec::new();
    }
    let mut values = Vec::new();
    let mut i = 0_u32;
    loop {
        let value = start + f64::from(i) * step;
        let past_end = if inclusive {
            value > end + 1e-9
        } else {
            value >= end - 1e-9
        };
        if past_end {
            break;
        }
        values.push(value);
        i += 1;
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_line_counts() {
        let g = Graticule::default();
        // 36 meridians (-180..170) and 17 parallels (-80..80).
        assert_eq!(g.meridians().len(), 36);
        assert_eq!(g.parallels().len(), 17);
        assert_eq!(g.lines().len(), 53);
    }

    #[test]
    fn test_major_meridians_reach_poles() {
        let g = Graticule::default();
        for line in g.meridians() {
            let lon = line[0].lon;
            let top = line.last().unwrap().lat;
            if (lon % 90.0).abs() < f64::EPSILON {
                assert!((top - 90.0).abs() < 1e-9, "lon {lon} top {top}");
            } else {
                assert!((top - 80.0).abs() < 1e-9, "lon {lon} top {top}");
            }
        }
    }

    #[test]
    fn test_parallels_span_full_circle() {
        let g = Graticule::default();
        for line in g.parallels() {
            assert!((line[0].lon - -180.0).abs() < 1e-9);
            assert!((line.last().unwrap().lon - 180.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_stops() {
        assert_eq!(stops(0.0, 10.0, 5.0, true), vec![0.0, 5.0, 10.0]);
        assert_eq!(stops(0.0, 10.0, 5.0, false), vec![0.0, 5.0]);
        assert!(stops(0.0, 10.0, 0.0, true).is_empty());
        assert!(stops(10.0, 0.0, 1.0, true).is_empty());
    }
}
