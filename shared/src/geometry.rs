use std::collections::HashMap;

use geo::{Coord, LineString, MultiPolygon, Polygon, Rect};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::LoadError;

/// A named map region. Identity is the name.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    /// Longitude/latitude in degrees.
    pub boundary: MultiPolygon<f64>,
}

/// Parsed regions, in source order, with lookup by name.
#[derive(Debug, Clone, Default)]
pub struct GeometryStore {
    regions: Vec<Region>,
    by_name: HashMap<String, usize>,
}

impl GeometryStore {
    pub fn new(regions: Vec<Region>) -> Self {
        let by_name = regions
            .iter()
            .enumerate()
            .map(|(i, r)| (r.name.clone(), i))
            .collect();
        Self { regions, by_name }
    }

    /// Parse a TopoJSON topology (regions taken from `object`) or a GeoJSON
    /// feature collection.
    pub fn parse(text: &str, object: &str) -> Result<Self, LoadError> {
        let doc: Value = serde_json::from_str(text)?;
        let regions = match doc.get("type").and_then(Value::as_str) {
            Some("Topology") => {
                let topology: Topology = serde_json::from_value(doc)?;
                topology.regions(object)?
            }
            Some("FeatureCollection") => geojson_regions(doc)?,
            other => {
                return Err(LoadError::UnsupportedGeometry(format!(
                    "document type {}",
                    other.unwrap_or("<missing>")
                )));
            }
        };
        if regions.is_empty() {
            return Err(LoadError::Empty("geometry"));
        }
        tracing::debug!(regions = regions.len(), "parsed geometry");
        Ok(Self::new(regions))
    }

    pub fn get(&self, name: &str) -> Option<&Region> {
        self.by_name.get(name).map(|&i| &self.regions[i])
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Lon/lat bounding box over every region.
    pub fn extent(&self) -> Option<Rect<f64>> {
        extent_of(&self.regions)
    }
}

/// Bounding box of the exterior rings of `regions`.
pub fn extent_of(regions: &[Region]) -> Option<Rect<f64>> {
    let mut coords = regions
        .iter()
        .flat_map(|r| r.boundary.iter())
        .flat_map(|p| p.exterior().coords());
    let first = *coords.next()?;
    let (mut min, mut max) = (first, first);
    for c in coords {
        min.x = min.x.min(c.x);
        min.y = min.y.min(c.y);
        max.x = max.x.max(c.x);
        max.y = max.y.max(c.y);
    }
    Some(Rect::new(min, max))
}

fn feature_name(properties: Option<&Map<String, Value>>) -> Option<String> {
    properties?
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
}

// --- GeoJSON ---

fn geojson_regions(doc: Value) -> Result<Vec<Region>, LoadError> {
    let collection = geojson::FeatureCollection::try_from(doc)?;
    let mut regions = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let Some(name) = feature_name(feature.properties.as_ref()) else {
            tracing::debug!("skipping feature without a name");
            continue;
        };
        let Some(geometry) = feature.geometry else {
            continue;
        };
        let boundary = match geo::Geometry::<f64>::try_from(geometry.value)? {
            geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
            geo::Geometry::MultiPolygon(m) => m,
            _ => {
                tracing::debug!(%name, "skipping non-polygon feature");
                continue;
            }
        };
        regions.push(Region { name, boundary });
    }
    Ok(regions)
}

// --- TopoJSON ---

#[derive(Debug, Deserialize)]
struct Topology {
    #[serde(default)]
    transform: Option<TopoTransform>,
    arcs: Vec<Vec<Vec<f64>>>,
    objects: HashMap<String, TopoGeometry>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct TopoTransform {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum TopoGeometry {
    GeometryCollection {
        geometries: Vec<TopoGeometry>,
    },
    Polygon {
        arcs: Vec<Vec<i64>>,
        #[serde(default)]
        properties: Option<Map<String, Value>>,
    },
    MultiPolygon {
        arcs: Vec<Vec<Vec<i64>>>,
        #[serde(default)]
        properties: Option<Map<String, Value>>,
    },
    #[serde(other)]
    Unsupported,
}

impl Topology {
    fn regions(&self, object: &str) -> Result<Vec<Region>, LoadError> {
        let root = self
            .objects
            .get(object)
            .ok_or_else(|| LoadError::MissingObject(object.to_string()))?;
        let arcs = self.decoded_arcs();
        let mut regions = Vec::new();
        collect_regions(root, &arcs, &mut regions)?;
        Ok(regions)
    }

    /// Absolute coordinates per arc, undoing quantization when present.
    fn decoded_arcs(&self) -> Vec<Vec<Coord<f64>>> {
        self.arcs
            .iter()
            .map(|arc| {
                let (mut x, mut y) = (0.0, 0.0);
                arc.iter()
                    .filter(|p| p.len() >= 2)
                    .map(|p| match self.transform {
                        Some(t) => {
                            x += p[0];
                            y += p[1];
                            Coord {
                                x: x * t.scale[0] + t.translate[0],
                                y: y * t.scale[1] + t.translate[1],
                            }
                        }
                        None => Coord { x: p[0], y: p[1] },
                    })
                    .collect()
            })
            .collect()
    }
}

fn collect_regions(
    geometry: &TopoGeometry,
    arcs: &[Vec<Coord<f64>>],
    out: &mut Vec<Region>,
) -> Result<(), LoadError> {
    match geometry {
        TopoGeometry::GeometryCollection { geometries } => {
            for g in geometries {
                collect_regions(g, arcs, out)?;
            }
        }
        TopoGeometry::Polygon { arcs: rings, properties } => {
            let Some(name) = feature_name(properties.as_ref()) else {
                tracing::debug!("skipping polygon without a name");
                return Ok(());
            };
            let polygon = stitch_polygon(rings, arcs)?;
            out.push(Region {
                name,
                boundary: MultiPolygon::new(vec![polygon]),
            });
        }
        TopoGeometry::MultiPolygon { arcs: polygons, properties } => {
            let Some(name) = feature_name(properties.as_ref()) else {
                tracing::debug!("skipping multipolygon without a name");
                return Ok(());
            };
            let polygons = polygons
                .iter()
                .map(|rings| stitch_polygon(rings, arcs))
                .collect::<Result<Vec<_>, _>>()?;
            out.push(Region {
                name,
                boundary: MultiPolygon::new(polygons),
            });
        }
        TopoGeometry::Unsupported => {
            tracing::debug!("skipping unsupported topology geometry");
        }
    }
    Ok(())
}

fn stitch_polygon(rings: &[Vec<i64>], arcs: &[Vec<Coord<f64>>]) -> Result<Polygon<f64>, LoadError> {
    let mut rings = rings.iter().map(|ring| stitch_ring(ring, arcs));
    let exterior = rings.next().transpose()?.unwrap_or_else(|| LineString::new(Vec::new()));
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Join arcs into one ring. Consecutive arcs share their joint point, so the
/// last point of the accumulated ring is dropped before appending the next arc.
/// A negative index `i` refers to arc `!i` traversed backwards.
fn stitch_ring(indices: &[i64], arcs: &[Vec<Coord<f64>>]) -> Result<LineString<f64>, LoadError> {
    let mut points: Vec<Coord<f64>> = Vec::new();
    for &index in indices {
        let (arc_idx, reversed) = if index < 0 {
            (!index, true)
        } else {
            (index, false)
        };
        let arc = usize::try_from(arc_idx)
            .ok()
            .and_then(|i| arcs.get(i))
            .ok_or(LoadError::ArcOutOfRange(index))?;
        points.pop();
        if reversed {
            points.extend(arc.iter().rev().copied());
        } else {
            points.extend(arc.iter().copied());
        }
    }
    Ok(LineString::new(points))
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Two unit squares side by side sharing one edge, plus a nameless
    /// polygon and a point that must both be skipped.
    pub const TOPOLOGY: &str = r#"{
        "type": "Topology",
        "arcs": [
            [[1, 0], [0, 0], [0, 1], [1, 1]],
            [[1, 1], [1, 0]],
            [[1, 0], [2, 0], [2, 1], [1, 1]]
        ],
        "objects": {
            "collection": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Polygon", "arcs": [[0, 1]], "properties": {"name": "W"}},
                    {"type": "Polygon", "arcs": [[2, -2]], "properties": {"name": "E"}},
                    {"type": "Polygon", "arcs": [[0, 1]]},
                    {"type": "Point", "coordinates": [0, 0], "properties": {"name": "P"}}
                ]
            }
        }
    }"#;
}

#[cfg(test)]
mod tests {
    use super::fixtures::TOPOLOGY;
    use super::*;

    fn ring(region: &Region) -> Vec<(f64, f64)> {
        region.boundary.0[0]
            .exterior()
            .coords()
            .map(|c| (c.x, c.y))
            .collect()
    }

    #[test]
    fn stitches_shared_arcs_into_closed_rings() {
        let store = GeometryStore::parse(TOPOLOGY, "collection").expect("parse");
        let names: Vec<&str> = store.names().collect();
        assert_eq!(names, vec!["W", "E"]);

        let west = store.get("W").expect("west");
        assert_eq!(
            ring(west),
            vec![(1.0, 0.0), (0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]
        );

        // Arc -2 is arc 1 reversed: (1,0) -> (1,1).
        let east = store.get("E").expect("east");
        assert_eq!(
            ring(east),
            vec![(1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (1.0, 0.0)]
        );
    }

    #[test]
    fn quantized_arcs_are_delta_decoded() {
        let text = r#"{
            "type": "Topology",
            "transform": {"scale": [0.5, 2.0], "translate": [10.0, 20.0]},
            "arcs": [[[0, 0], [2, 0], [0, 1], [-2, 0], [0, -1]]],
            "objects": {"collection": {"type": "GeometryCollection", "geometries": [
                {"type": "MultiPolygon", "arcs": [[[0]]], "properties": {"name": "Q"}}
            ]}}
        }"#;
        let store = GeometryStore::parse(text, "collection").expect("parse");
        let coords = ring(store.get("Q").expect("region"));
        assert_eq!(
            coords,
            vec![(10.0, 20.0), (11.0, 20.0), (11.0, 22.0), (10.0, 22.0), (10.0, 20.0)]
        );
    }

    #[test]
    fn missing_object_is_a_load_error() {
        let err = GeometryStore::parse(TOPOLOGY, "regions").expect_err("must fail");
        assert!(matches!(err, LoadError::MissingObject(ref o) if o == "regions"));
    }

    #[test]
    fn out_of_range_arc_is_a_load_error() {
        let text = r#"{"type": "Topology", "arcs": [], "objects": {"collection":
            {"type": "Polygon", "arcs": [[3]], "properties": {"name": "X"}}}}"#;
        let err = GeometryStore::parse(text, "collection").expect_err("must fail");
        assert!(matches!(err, LoadError::ArcOutOfRange(3)));
    }

    #[test]
    fn parses_geojson_feature_collections() {
        let text = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"name": "N"}, "geometry":
                {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}},
            {"type": "Feature", "properties": {"name": "L"}, "geometry":
                {"type": "LineString", "coordinates": [[0,0],[1,1]]}}
        ]}"#;
        let store = GeometryStore::parse(text, "ignored").expect("parse");
        assert_eq!(store.len(), 1);
        assert!(store.get("N").is_some());
        assert!(store.get("L").is_none());
    }

    #[test]
    fn rejects_unknown_documents_and_empty_sources() {
        let err = GeometryStore::parse(r#"{"type": "Point"}"#, "collection").expect_err("fail");
        assert!(matches!(err, LoadError::UnsupportedGeometry(_)));

        let empty = r#"{"type": "FeatureCollection", "features": []}"#;
        let err = GeometryStore::parse(empty, "collection").expect_err("fail");
        assert!(matches!(err, LoadError::Empty("geometry")));

        let err = GeometryStore::parse("not json", "collection").expect_err("fail");
        assert!(matches!(err, LoadError::Json(_)));
    }

    #[test]
    fn extent_covers_all_regions() {
        let store = GeometryStore::parse(TOPOLOGY, "collection").expect("parse");
        let extent = store.extent().expect("extent");
        assert_eq!(extent.min(), Coord { x: 0.0, y: 0.0 });
        assert_eq!(extent.max(), Coord { x: 2.0, y: 1.0 });
    }
}
