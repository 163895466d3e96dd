//! Marker visibility strategies.

use serde::{Deserialize, Serialize};

use crate::geo::{GeoPoint, ScreenPoint};
use crate::projection::Orthographic;

/// How to decide whether a projected marker should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Draw points whose great-circle distance from the view centre is at
    /// most 90 degrees.
    #[default]
    Hemisphere,
    /// Draw points whose projection falls inside the viewport rectangle.
    ///
    /// An orthographic projection maps the far hemisphere onto the same disc,
    /// so this strategy also draws points behind the globe. Kept for
    /// comparison only.
    ScreenBounds,
}

impl Visibility {
    /// Decide visibility of `point`, whose projection is `screen`.
    ///
    /// A point without a projected coordinate is never visible.
    #[must_use]
    pub fn is_visible(
        self,
        projection: &Orthographic,
        point: GeoPoint,
        screen: Option<ScreenPoint>,
    ) -> bool {
        let Some(screen) = screen else {
            return false;
        };
        match self {
            Self::Hemisphere => projection.is_front(point),
            Self::ScreenBounds => projection.viewport().contains(screen),
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hemisphere => write!(f, "hemisphere"),
            Self::ScreenBounds => write!(f, "screen_bounds"),
        }
    }
}
