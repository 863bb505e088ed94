//! Identified region geometries.

use std::collections::HashSet;

use serde_json::Value;

use crate::bbox::BoundingBox;
use crate::error::{ConfigError, GeometryError};
use crate::extent::Extent;
use crate::geometry::{validate_coordinate, MultiPolygon, Polygon};

/// A named polygon/multipolygon in geographic coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    id: String,
    geometry: MultiPolygon,
}

impl Region {
    pub fn new(id: impl Into<String>, geometry: impl Into<MultiPolygon>) -> Self {
        Self {
            id: id.into(),
            geometry: geometry.into(),
        }
    }

    /// Region from a WKT `POLYGON` / `MULTIPOLYGON` string.
    pub fn from_wkt(id: impl Into<String>, wkt: &str) -> Result<Self, GeometryError> {
        Ok(Self::new(id, MultiPolygon::from_wkt(wkt)?))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn geometry(&self) -> &MultiPolygon {
        &self.geometry
    }

    pub fn bbox(&self) -> BoundingBox {
        self.geometry.bbox()
    }
}

/// Default identifier for the region at `index` when none is supplied.
pub fn default_region_id(index: usize) -> String {
    format!("S_{:02}", index)
}

/// Non-empty ordered collection of regions with unique identifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSet {
    regions: Vec<Region>,
}

impl RegionSet {
    pub fn new(regions: Vec<Region>) -> Result<Self, ConfigError> {
        if regions.is_empty() {
            return Err(ConfigError::EmptyRegionSet);
        }
        let mut seen = HashSet::new();
        for region in &regions {
            if !seen.insert(region.id()) {
                return Err(ConfigError::DuplicateRegionId(region.id().to_string()));
            }
        }
        Ok(Self { regions })
    }

    /// Regions named `S_00`, `S_01`, ... in input order.
    pub fn from_geometries(geometries: Vec<MultiPolygon>) -> Result<Self, ConfigError> {
        Self::new(
            geometries
                .into_iter()
                .enumerate()
                .map(|(i, g)| Region::new(default_region_id(i), g))
                .collect(),
        )
    }

    /// Parse a GeoJSON `FeatureCollection`, `Feature` or bare geometry.
    ///
    /// Identifiers come from `id_property` when given (string or number),
    /// otherwise default to `S_{index:02}`. Only `Polygon` and
    /// `MultiPolygon` geometries in EPSG:4326 are accepted.
    pub fn from_geojson(text: &str, id_property: Option<&str>) -> Result<Self, RegionLoadError> {
        let root: Value = serde_json::from_str(text)
            .map_err(|e| GeometryError::InvalidGeoJson(e.to_string()))?;

        let features: Vec<&Value> = match root.get("type").and_then(Value::as_str) {
            Some("FeatureCollection") => root
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| geojson_error("FeatureCollection without 'features' array"))?
                .iter()
                .collect(),
            Some("Feature") => vec![&root],
            Some("Polygon") | Some("MultiPolygon") => vec![&root],
            Some(other) => {
                return Err(geojson_error(format!("unsupported type '{}'", other)).into())
            }
            None => return Err(geojson_error("missing 'type'").into()),
        };

        let mut regions = Vec::with_capacity(features.len());
        for (index, feature) in features.into_iter().enumerate() {
            let geometry = match feature.get("type").and_then(Value::as_str) {
                Some("Feature") => feature
                    .get("geometry")
                    .ok_or_else(|| geojson_error("Feature without 'geometry'"))?,
                _ => feature,
            };

            let id = match id_property {
                Some(name) => feature_property(feature, name)
                    .ok_or_else(|| geojson_error(format!("feature {} has no '{}'", index, name)))?,
                None => default_region_id(index),
            };

            regions.push(Region::new(id, parse_geojson_geometry(geometry)?));
        }

        Ok(Self::new(regions)?)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id() == id)
    }

    /// The only region, for single-region mode.
    pub fn single(&self) -> Result<&Region, ConfigError> {
        match self.regions.as_slice() {
            [region] => Ok(region),
            _ => Err(ConfigError::RegionCount {
                expected: 1,
                found: self.regions.len(),
            }),
        }
    }

    /// Union of all region bounds.
    pub fn bbox(&self) -> BoundingBox {
        let mut iter = self.regions.iter().map(Region::bbox);
        let first = iter
            .next()
            .unwrap_or_else(|| BoundingBox::new(0.0, 0.0, 0.0, 0.0));
        iter.fold(first, |acc, b| acc.union(&b))
    }

    /// Geographic extent covering every region.
    pub fn extent(&self) -> Result<Extent, ConfigError> {
        Extent::from_bounds(&self.bbox())
    }
}

impl<'a> IntoIterator for &'a RegionSet {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

/// Either half of a region load can fail.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum RegionLoadError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn geojson_error(msg: impl Into<String>) -> GeometryError {
    GeometryError::InvalidGeoJson(msg.into())
}

fn feature_property(feature: &Value, name: &str) -> Option<String> {
    match feature.get("properties")?.get(name)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_geojson_geometry(geometry: &Value) -> Result<MultiPolygon, GeometryError> {
    let coords = geometry
        .get("coordinates")
        .ok_or_else(|| geojson_error("geometry without 'coordinates'"))?;

    match geometry.get("type").and_then(Value::as_str) {
        Some("Polygon") => Ok(parse_geojson_polygon(coords)?.into()),
        Some("MultiPolygon") => {
            let polygons = coords
                .as_array()
                .ok_or_else(|| geojson_error("MultiPolygon coordinates must be an array"))?
                .iter()
                .map(parse_geojson_polygon)
                .collect::<Result<Vec<_>, _>>()?;
            MultiPolygon::new(polygons)
        }
        Some(other) => Err(geojson_error(format!("unsupported geometry '{}'", other))),
        None => Err(geojson_error("geometry without 'type'")),
    }
}

fn parse_geojson_polygon(coords: &Value) -> Result<Polygon, GeometryError> {
    let mut rings = coords
        .as_array()
        .ok_or_else(|| geojson_error("Polygon coordinates must be an array of rings"))?
        .iter()
        .map(parse_geojson_ring)
        .collect::<Result<Vec<_>, _>>()?;
    if rings.is_empty() {
        return Err(geojson_error("Polygon has no rings"));
    }
    let exterior = rings.remove(0);
    Polygon::new(exterior, rings)
}

fn parse_geojson_ring(ring: &Value) -> Result<Vec<(f64, f64)>, GeometryError> {
    ring.as_array()
        .ok_or_else(|| geojson_error("ring must be an array of positions"))?
        .iter()
        .map(|pos| {
            let lon = pos.get(0).and_then(Value::as_f64);
            let lat = pos.get(1).and_then(Value::as_f64);
            match (lon, lat) {
                (Some(lon), Some(lat)) => {
                    validate_coordinate(lon, lat)?;
                    Ok((lon, lat))
                }
                _ => Err(GeometryError::InvalidCoordinate(pos.to_string())),
            }
        })
        .collect()
}
