use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use geo::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon,
};
use serde_json::{json, Map, Value};

use crate::region::SourceRegion;
use crate::score::Scores;

/// Read source regions from a GeoJSON FeatureCollection file.
/// See `read_regions_from_geojson_bytes`.
pub fn read_regions_from_geojson(path: &Path, id_property: Option<&str>) -> Result<Vec<SourceRegion>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read GeoJSON file: {}", path.display()))?;
    read_regions_from_geojson_bytes(&bytes, id_property)
}

/// Read source regions from GeoJSON FeatureCollection bytes.
///
/// The region id is taken from `properties[id_property]` when given, else the
/// feature `id`, else the feature's position. Numeric properties (and numeric
/// strings) become attributes; nulls are treated as absent. Non-areal
/// geometries are kept as-is so that later stages can skip and report them.
pub fn read_regions_from_geojson_bytes(bytes: &[u8], id_property: Option<&str>) -> Result<Vec<SourceRegion>> {
    let value: Value = serde_json::from_slice(bytes).context("Failed to parse GeoJSON bytes")?;
    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("GeoJSON is not a FeatureCollection (missing 'features')"))?;

    let mut regions = Vec::with_capacity(features.len());
    for (idx, feature) in features.iter().enumerate() {
        let geometry = parse_geometry(&feature["geometry"])
            .with_context(|| format!("Invalid geometry in feature {idx}"))?;
        let properties = feature["properties"].as_object();

        let id = id_property
            .and_then(|key| properties.and_then(|p| p.get(key)))
            .or_else(|| feature.get("id"))
            .and_then(id_text)
            .unwrap_or_else(|| idx.to_string());

        let mut region = SourceRegion::new(id, geometry);
        for (key, value) in properties.into_iter().flatten() {
            if Some(key.as_str()) == id_property { continue }
            if let Some(number) = numeric(value) { region.set_attribute(key.clone(), number) }
        }
        regions.push(region);
    }
    Ok(regions)
}

/// Write scored cells to a GeoJSON FeatureCollection file.
pub fn write_scores_to_geojson(path: &Path, scores: &Scores<'_>) -> Result<()> {
    let bytes = write_scores_to_geojson_bytes(scores)?;
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write GeoJSON file: {}", path.display()))
}

/// Scored cells as GeoJSON bytes: one Polygon feature per cell, with
/// `cell_id`, `area`, `total`, `score` and every attribute amount as properties.
pub fn write_scores_to_geojson_bytes(scores: &Scores<'_>) -> Result<Vec<u8>> {
    let features: Vec<Value> = scores.cells.iter().map(|scored| {
        let id = scored.cell.id().to_string();
        let mut properties = Map::new();
        properties.insert("cell_id".to_string(), json!(id));
        properties.insert("area".to_string(), json!(scored.cell.area()));
        properties.insert("total".to_string(), json!(scored.total));
        properties.insert("score".to_string(), json!(scored.score));
        for (name, amount) in scores.attributes.iter().zip(scored.amounts.iter()) {
            properties.insert(name.clone(), json!(amount));
        }

        json!({
            "type": "Feature",
            "id": id,
            "geometry": polygon_to_geojson(scored.cell.polygon()),
            "properties": properties,
        })
    }).collect();

    let feature_collection = json!({
        "type": "FeatureCollection",
        "method": scores.method.name(),
        "label": scores.label,
        "features": features,
    });

    serde_json::to_vec(&feature_collection).context("Failed to serialize GeoJSON to bytes")
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Helper to convert a Polygon to a serde_json::Value representing GeoJSON Geometry.
fn polygon_to_geojson(polygon: &Polygon<f64>) -> Value {
    let rings: Vec<Vec<[f64; 2]>> = std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
        .collect();
    json!({ "type": "Polygon", "coordinates": rings })
}

/// Parse a GeoJSON geometry object. A null geometry becomes an empty collection.
fn parse_geometry(value: &Value) -> Result<Geometry<f64>> {
    if value.is_null() { return Ok(Geometry::GeometryCollection(GeometryCollection(vec![]))) }

    let ty = value["type"].as_str()
        .ok_or_else(|| anyhow!("Geometry is missing its 'type'"))?;
    if ty == "GeometryCollection" {
        let members = value["geometries"].as_array()
            .ok_or_else(|| anyhow!("GeometryCollection is missing 'geometries'"))?;
        return Ok(Geometry::GeometryCollection(GeometryCollection(
            members.iter().map(parse_geometry).collect::<Result<_>>()?
        )))
    }

    let coords = &value["coordinates"];
    Ok(match ty {
        "Point" => Geometry::Point(Point(parse_coord(coords)?)),
        "MultiPoint" => Geometry::MultiPoint(MultiPoint(
            array(coords)?.iter().map(|c| parse_coord(c).map(Point)).collect::<Result<_>>()?
        )),
        "LineString" => Geometry::LineString(parse_line(coords)?),
        "MultiLineString" => Geometry::MultiLineString(MultiLineString(
            array(coords)?.iter().map(parse_line).collect::<Result<_>>()?
        )),
        "Polygon" => Geometry::Polygon(parse_polygon(coords)?),
        "MultiPolygon" => Geometry::MultiPolygon(MultiPolygon(
            array(coords)?.iter().map(parse_polygon).collect::<Result<_>>()?
        )),
        other => bail!("Unknown GeoJSON geometry type '{other}'"),
    })
}

fn array(value: &Value) -> Result<&Vec<Value>> {
    value.as_array().ok_or_else(|| anyhow!("Expected a coordinate array, found {value}"))
}

/// Parse polygon rings: exterior first, then holes. Rings are closed by `Polygon::new`.
fn parse_polygon(value: &Value) -> Result<Polygon<f64>> {
    let mut rings = array(value)?.iter().map(parse_line);
    let exterior = rings.next()
        .ok_or_else(|| anyhow!("Invalid Polygon: missing exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn parse_line(value: &Value) -> Result<LineString<f64>> {
    Ok(LineString(array(value)?.iter().map(parse_coord).collect::<Result<_>>()?))
}

fn parse_coord(value: &Value) -> Result<Coord<f64>> {
    let pair = array(value)?;
    let (Some(x), Some(y)) = (pair.first().and_then(Value::as_f64), pair.get(1).and_then(Value::as_f64)) else {
        bail!("Invalid coordinate {value}: expected [x, y] numbers")
    };
    Ok(Coord { x, y })
}
