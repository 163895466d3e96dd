//! World landmass outlines from a TopoJSON atlas.
//!
//! Only what the globe needs is decoded: the arcs (optionally quantised and
//! delta-encoded) and the polygon geometries of one named object. Each
//! polygon ring comes back as a closed list of lon/lat points.

use std::collections::HashMap;

use reqwest::Client;
use satdash_globe::GeoPoint;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Name of the merged landmass object in `world-atlas` files.
pub const LAND_OBJECT: &str = "land";

/// A closed ring of lon/lat points.
pub type Ring = Vec<GeoPoint>;

#[derive(Debug, Deserialize)]
struct Topology {
    #[serde(default)]
    transform: Option<Transform>,
    objects: HashMap<String, Geometry>,
    arcs: Vec<Vec<Vec<f64>>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon {
        arcs: Vec<Vec<i64>>,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
    },
    GeometryCollection {
        geometries: Vec<Geometry>,
    },
    #[serde(other)]
    Other,
}

/// Decode the `land` object of a TopoJSON document.
///
/// # Errors
///
/// Returns an error if the document does not parse, has no `land` object,
/// or references an arc that does not exist.
pub fn decode_land(json: &str) -> Result<Vec<Ring>> {
    decode_object(json, LAND_OBJECT)
}

/// Decode the polygon rings of the named object.
///
/// # Errors
///
/// Returns an error if the document does not parse, has no such object,
/// or references an arc that does not exist.
pub fn decode_object(json: &str, name: &str) -> Result<Vec<Ring>> {
    let topology: Topology =
        serde_json::from_str(json).map_err(|e| Error::atlas(format!("invalid TopoJSON: {e}")))?;
    let object = topology
        .objects
        .get(name)
        .ok_or_else(|| Error::atlas(format!("no object named {name:?}")))?;

    let arcs = decode_arcs(&topology.arcs, topology.transform)?;
    let mut rings = Vec::new();
    collect_rings(object, &arcs, &mut rings)?;
    Ok(rings)
}

/// Download and decode the landmass rings.
///
/// # Errors
///
/// Returns an error if the request fails, the server answers with a
/// non-success status, or the body does not decode.
pub async fn fetch_land(client: &Client, url: &str) -> Result<Vec<Ring>> {
    debug!(url, "Fetching world atlas");
    let response = client.get(url).send().await.map_err(|e| Error::http(url, e))?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::status(url, status.as_u16()));
    }
    let body = response.text().await.map_err(|e| Error::http(url, e))?;
    let rings = decode_land(&body)?;
    info!(rings = rings.len(), "World atlas loaded");
    Ok(rings)
}

/// Absolute lon/lat points of every arc.
fn decode_arcs(arcs: &[Vec<Vec<f64>>], transform: Option<Transform>) -> Result<Vec<Vec<GeoPoint>>> {
    arcs.iter()
        .enumerate()
        .map(|(index, arc)| {
            let (mut x, mut y) = (0.0, 0.0);
            arc.iter()
                .map(|position| {
                    let [px, py] = match position.as_slice() {
                        [px, py, ..] => [*px, *py],
                        _ => return Err(Error::atlas(format!("arc {index} has a short position"))),
                    };
                    Ok(match transform {
                        Some(t) => {
                            x += px;
                            y += py;
                            GeoPoint::new(
                                x * t.scale[0] + t.translate[0],
                                y * t.scale[1] + t.translate[1],
                            )
                        }
                        None => GeoPoint::new(px, py),
                    })
                })
                .collect()
        })
        .collect()
}

fn collect_rings(geometry: &Geometry, arcs: &[Vec<GeoPoint>], rings: &mut Vec<Ring>) -> Result<()> {
    match geometry {
        Geometry::Polygon { arcs: polygon } => {
            for ring in polygon {
                rings.push(stitch_ring(ring, arcs)?);
            }
        }
        Geometry::MultiPolygon { arcs: polygons } => {
            for ring in polygons.iter().flatten() {
                rings.push(stitch_ring(ring, arcs)?);
            }
        }
        Geometry::GeometryCollection { geometries } => {
            for child in geometries {
                collect_rings(child, arcs, rings)?;
            }
        }
        Geometry::Other => {}
    }
    Ok(())
}

/// Join a ring's arcs. A negative index `!i` walks arc `i` backwards, and
/// consecutive arcs share their joining point.
fn stitch_ring(indices: &[i64], arcs: &[Vec<GeoPoint>]) -> Result<Ring> {
    let mut points: Ring = Vec::new();
    for &index in indices {
        let reversed = index < 0;
        let resolved = if reversed { !index } else { index };
        let arc = usize::try_from(resolved)
            .ok()
            .and_then(|i| arcs.get(i))
            .ok_or_else(|| Error::atlas(format!("arc index {index} out of range")))?;

        points.pop();
        if reversed {
            points.extend(arc.iter().rev().copied());
        } else {
            points.extend(arc.iter().copied());
        }
    }
    if let Some(&first) = points.first() {
        if points.len() < 4 {
            points.push(first);
        }
    }
    Ok(points)
}
