//! `satdash-globe` - Orthographic globe geometry for satdash
//!
//! This crate holds the parts of the globe that do no I/O: projection math,
//! hemisphere culling, the rotate/drag state machine, keyed markers, the
//! graticule and polyline reprojection. Rendering lives in the `satdash` crate.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod geo;
pub mod graticule;
pub mod markers;
pub mod path;
pub mod projection;
pub mod state;
pub mod visibility;

pub use geo::{angular_distance, GeoPoint, ScreenPoint, Viewport};
pub use graticule::Graticule;
pub use markers::{JoinSummary, Marker, MarkerLayer, MarkerSample};
pub use path::project_line;
pub use projection::{Orthographic, Rotation};
pub use state::{GlobeEvent, GlobeState, Mode};
pub use visibility::Visibility;
