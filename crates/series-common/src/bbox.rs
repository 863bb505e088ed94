//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A lon/lat rectangle in degrees.
///
/// Used for polygon bounds and overlap tests. Longitudes may be in either
/// the geographic (-180..180) or raster (0..360) convention; the box itself
/// does not care, but both operands of a comparison must agree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Bounding box of a set of (lon, lat) points, or `None` if empty.
    pub fn of_points<'a>(points: impl IntoIterator<Item = &'a (f64, f64)>) -> Option<Self> {
        let mut iter = points.into_iter();
        let &(lon, lat) = iter.next()?;
        let mut bbox = Self::new(lon, lat, lon, lat);
        for &(lon, lat) in iter {
            bbox.min_lon = bbox.min_lon.min(lon);
            bbox.max_lon = bbox.max_lon.max(lon);
            bbox.min_lat = bbox.min_lat.min(lat);
            bbox.max_lat = bbox.max_lat.max(lat);
        }
        Some(bbox)
    }

    /// Width in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Height in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Check if this bbox overlaps another. Touching edges count as overlap.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_lon <= other.max_lon
            && self.max_lon >= other.min_lon
            && self.min_lat <= other.max_lat
            && self.max_lat >= other.min_lat
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    /// Check if a point is contained within this bbox (edges inclusive).
    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Shift the box along the longitude axis.
    pub fn translate_lon(&self, offset: f64) -> BoundingBox {
        BoundingBox {
            min_lon: self.min_lon + offset,
            max_lon: self.max_lon + offset,
            ..*self
        }
    }
}
