//! Polygon geometry in (lon, lat) degrees.
//!
//! Containment is strict: a point lying exactly on an exterior or hole edge
//! is NOT contained. Every mask in the workspace relies on this one rule.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::error::GeometryError;

/// Tolerance (degrees) for treating a point as lying on an edge.
const EDGE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RingPosition {
    Inside,
    Outside,
    Boundary,
}

/// A polygon with an exterior ring and optional holes.
///
/// Rings are stored closed (first vertex repeated at the end).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    exterior: Vec<(f64, f64)>,
    holes: Vec<Vec<(f64, f64)>>,
}

impl Polygon {
    /// Create a polygon, closing open rings and rejecting degenerate ones.
    pub fn new(
        exterior: Vec<(f64, f64)>,
        holes: Vec<Vec<(f64, f64)>>,
    ) -> Result<Self, GeometryError> {
        let exterior = close_ring(exterior)?;
        if ring_area(&exterior) == 0.0 {
            return Err(GeometryError::ZeroArea);
        }
        let holes = holes
            .into_iter()
            .map(close_ring)
            .collect::<Result<Vec<_>, _>>()?;
        if holes.iter().any(|hole| ring_area(hole) == 0.0) {
            return Err(GeometryError::ZeroArea);
        }
        Ok(Self { exterior, holes })
    }

    /// Axis-aligned rectangle, handy for tests and simple regions.
    pub fn rectangle(
        min_lon: f64,
        min_lat: f64,
        max_lon: f64,
        max_lat: f64,
    ) -> Result<Self, GeometryError> {
        Self::new(
            vec![
                (min_lon, min_lat),
                (max_lon, min_lat),
                (max_lon, max_lat),
                (min_lon, max_lat),
            ],
            Vec::new(),
        )
    }

    pub fn exterior(&self) -> &[(f64, f64)] {
        &self.exterior
    }

    pub fn holes(&self) -> &[Vec<(f64, f64)>] {
        &self.holes
    }

    pub fn bbox(&self) -> BoundingBox {
        // A closed ring always has at least 4 vertices
        BoundingBox::of_points(&self.exterior)
            .unwrap_or_else(|| BoundingBox::new(0.0, 0.0, 0.0, 0.0))
    }

    /// Shift every vertex along the longitude axis.
    pub fn translate_lon(&self, offset: f64) -> Polygon {
        let shift = |ring: &Vec<(f64, f64)>| -> Vec<(f64, f64)> {
            ring.iter().map(|&(x, y)| (x + offset, y)).collect()
        };
        Polygon {
            exterior: shift(&self.exterior),
            holes: self.holes.iter().map(shift).collect(),
        }
    }

    /// Strict interior containment test.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        if classify(&self.exterior, lon, lat) != RingPosition::Inside {
            return false;
        }
        self.holes
            .iter()
            .all(|hole| classify(hole, lon, lat) == RingPosition::Outside)
    }
}

/// One or more polygons treated as a single region geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPolygon {
    polygons: Vec<Polygon>,
}

impl MultiPolygon {
    pub fn new(polygons: Vec<Polygon>) -> Result<Self, GeometryError> {
        if polygons.is_empty() {
            return Err(GeometryError::EmptyGeometry);
        }
        Ok(Self { polygons })
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn bbox(&self) -> BoundingBox {
        let mut iter = self.polygons.iter().map(Polygon::bbox);
        let first = iter.next().unwrap_or_else(|| BoundingBox::new(0.0, 0.0, 0.0, 0.0));
        iter.fold(first, |acc, b| acc.union(&b))
    }

    pub fn translate_lon(&self, offset: f64) -> MultiPolygon {
        MultiPolygon {
            polygons: self.polygons.iter().map(|p| p.translate_lon(offset)).collect(),
        }
    }

    /// True if any member polygon strictly contains the point.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.polygons.iter().any(|p| p.contains(lon, lat))
    }

    /// Parse a WKT `POLYGON` or `MULTIPOLYGON`.
    ///
    /// Accepts formats:
    /// - `POLYGON((lon1 lat1, lon2 lat2, lon3 lat3, lon1 lat1))`
    /// - `POLYGON((outer...),(hole...))`
    /// - `MULTIPOLYGON(((ring1)),((ring2)))`
    pub fn from_wkt(wkt: &str) -> Result<Self, GeometryError> {
        let wkt = wkt.trim();
        let upper = wkt.to_uppercase();

        let (is_multi, keyword_len) = if upper.starts_with("MULTIPOLYGON") {
            (true, "MULTIPOLYGON".len())
        } else if upper.starts_with("POLYGON") {
            (false, "POLYGON".len())
        } else {
            return Err(GeometryError::InvalidWkt(
                "Expected POLYGON or MULTIPOLYGON format".to_string(),
            ));
        };

        let body = split_groups(wkt[keyword_len..].trim())?;
        let body = match body.as_slice() {
            [single] => *single,
            _ => {
                return Err(GeometryError::InvalidWkt(
                    "Expected a single outer parenthesis group".to_string(),
                ))
            }
        };

        let polygons = if is_multi {
            split_groups(body)?
                .into_iter()
                .map(parse_wkt_polygon)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            vec![parse_wkt_polygon(body)?]
        };

        Self::new(polygons)
    }
}

impl From<Polygon> for MultiPolygon {
    fn from(polygon: Polygon) -> Self {
        Self {
            polygons: vec![polygon],
        }
    }
}

/// Parse the inside of a polygon group: `(ring),(ring)...`
fn parse_wkt_polygon(body: &str) -> Result<Polygon, GeometryError> {
    let mut rings = split_groups(body)?
        .into_iter()
        .map(parse_ring)
        .collect::<Result<Vec<_>, _>>()?;
    if rings.is_empty() {
        return Err(GeometryError::InvalidWkt("Polygon has no rings".to_string()));
    }
    let exterior = rings.remove(0);
    Polygon::new(exterior, rings)
}

/// Split `(a),(b),(c)` into the inner contents `a`, `b`, `c`.
fn split_groups(s: &str) -> Result<Vec<&str>, GeometryError> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, ch) in s.char_indices() {
        match ch {
            '(' => {
                if depth == 0 {
                    start = i + 1;
                }
                depth += 1;
            }
            ')' => {
                if depth == 0 {
                    return Err(GeometryError::InvalidWkt(
                        "Unbalanced closing parenthesis".to_string(),
                    ));
                }
                depth -= 1;
                if depth == 0 {
                    groups.push(s[start..i].trim());
                }
            }
            ',' if depth == 0 => {}
            c if depth == 0 && !c.is_whitespace() => {
                return Err(GeometryError::InvalidWkt(format!(
                    "Unexpected character '{}' outside parentheses",
                    c
                )));
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(GeometryError::InvalidWkt(
            "Missing closing parenthesis".to_string(),
        ));
    }
    Ok(groups)
}

/// Parse `lon lat, lon lat, ...`
fn parse_ring(coords: &str) -> Result<Vec<(f64, f64)>, GeometryError> {
    coords
        .split(',')
        .map(|pair| {
            let pair = pair.trim();
            let parts: Vec<&str> = pair.split_whitespace().collect();
            if parts.len() != 2 {
                return Err(GeometryError::InvalidWkt(format!(
                    "Expected 'lon lat' format, got '{}'",
                    pair
                )));
            }
            let lon: f64 = parts[0]
                .parse()
                .map_err(|_| GeometryError::InvalidCoordinate(parts[0].to_string()))?;
            let lat: f64 = parts[1]
                .parse()
                .map_err(|_| GeometryError::InvalidCoordinate(parts[1].to_string()))?;
            validate_coordinate(lon, lat)?;
            Ok((lon, lat))
        })
        .collect()
}

/// Longitudes may be geographic (-180..180) or already raster-shifted (..360).
pub(crate) fn validate_coordinate(lon: f64, lat: f64) -> Result<(), GeometryError> {
    if !(-180.0..=360.0).contains(&lon) {
        return Err(GeometryError::InvalidCoordinate(format!(
            "longitude {} out of range",
            lon
        )));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(GeometryError::InvalidCoordinate(format!(
            "latitude {} out of range",
            lat
        )));
    }
    Ok(())
}

fn close_ring(mut ring: Vec<(f64, f64)>) -> Result<Vec<(f64, f64)>, GeometryError> {
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    let mut distinct = ring.clone();
    distinct.dedup();
    if distinct.len() < 3 {
        return Err(GeometryError::TooFewVertices(distinct.len()));
    }
    if let Some(&first) = ring.first() {
        ring.push(first);
    }
    Ok(ring)
}

/// Absolute shoelace area of a closed ring.
fn ring_area(ring: &[(f64, f64)]) -> f64 {
    let twice: f64 = ring
        .windows(2)
        .map(|w| w[0].0 * w[1].1 - w[1].0 * w[0].1)
        .sum();
    (twice / 2.0).abs()
}

fn on_segment(a: (f64, f64), b: (f64, f64), x: f64, y: f64) -> bool {
    let cross = (b.0 - a.0) * (y - a.1) - (b.1 - a.1) * (x - a.0);
    let length = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
    if cross.abs() > EDGE_EPSILON * length.max(1.0) {
        return false;
    }
    x >= a.0.min(b.0) - EDGE_EPSILON
        && x <= a.0.max(b.0) + EDGE_EPSILON
        && y >= a.1.min(b.1) - EDGE_EPSILON
        && y <= a.1.max(b.1) + EDGE_EPSILON
}

/// Ray casting with an explicit boundary check first.
fn classify(ring: &[(f64, f64)], x: f64, y: f64) -> RingPosition {
    let mut inside = false;
    for w in ring.windows(2) {
        let (a, b) = (w[0], w[1]);
        if on_segment(a, b, x, y) {
            return RingPosition::Boundary;
        }
        if ((a.1 > y) != (b.1 > y)) && (x < (b.0 - a.0) * (y - a.1) / (b.1 - a.1) + a.0) {
            inside = !inside;
        }
    }
    if inside {
        RingPosition::Inside
    } else {
        RingPosition::Outside
    }
}
