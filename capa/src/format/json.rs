//! Lecture GeoJSON et export streaming avec geozero

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use geo::{Geometry, MultiPolygon};
use geojson::GeoJson;
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{AttributeValue, CapaError, Crs, Feature, FeatureCollection};

/// CRS implicite d'un GeoJSON sans membre `crs` (RFC 7946)
const DEFAULT_EPSG: u32 = 4326;

/// Lit une FeatureCollection GeoJSON
pub fn read(path: &Path) -> Result<FeatureCollection, CapaError> {
    let file = File::open(path)?;
    let geojson = GeoJson::from_reader(BufReader::new(file))?;

    let fc = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => {
            return Err(CapaError::UnsupportedFormat(format!(
                "{}: GeoJSON must be a FeatureCollection",
                path.display()
            )))
        }
    };

    let crs = fc
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("crs"))
        .and_then(parse_crs_member)
        .unwrap_or_else(|| Crs::from_epsg(DEFAULT_EPSG));

    let mut collection = FeatureCollection::new(Some(crs));

    for (index, feature) in fc.features.into_iter().enumerate() {
        let geometry = match feature.geometry {
            Some(geometry) => value_to_multipolygon(index, geometry.value)?,
            None => MultiPolygon::new(vec![]),
        };

        let mut properties = HashMap::new();
        for (name, value) in feature.properties.unwrap_or_default() {
            collection.add_field(&name);
            properties.insert(name, json_to_attribute(value));
        }

        collection.features.push(Feature {
            geometry,
            properties,
        });
    }

    debug!(
        path = %path.display(),
        features = collection.len(),
        "GeoJSON lu"
    );

    Ok(collection)
}

/// Exporte une couche en GeoJSON (streaming avec geozero)
pub fn write(collection: &FeatureCollection, path: &Path) -> Result<(), CapaError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    write!(writer, r#"{{"type":"FeatureCollection","#)?;
    if let Some(epsg) = collection.crs.as_ref().and_then(|c| c.epsg()) {
        write!(
            writer,
            r#""crs":{{"type":"name","properties":{{"name":"urn:ogc:def:crs:EPSG::{}"}}}},"#,
            epsg
        )?;
    }
    write!(writer, r#""features":["#)?;

    for (i, feature) in collection.features.iter().enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        write_feature(&mut writer, feature, &collection.fields)?;
    }

    write!(writer, "]}}")?;
    writer.flush()?;

    Ok(())
}

/// Écrit une feature GeoJSON
fn write_feature<W: Write>(
    writer: &mut W,
    feature: &Feature,
    fields: &[String],
) -> Result<(), CapaError> {
    write!(writer, r#"{{"type":"Feature","geometry":"#)?;

    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    Geometry::MultiPolygon(feature.geometry.clone()).process_geom(&mut geom_writer)?;
    writer.write_all(&geom_buf)?;

    let properties: Map<String, Value> = fields
        .iter()
        .map(|name| (name.clone(), attribute_to_json(feature.property(name))))
        .collect();

    write!(writer, r#","properties":"#)?;
    serde_json::to_writer(&mut *writer, &properties)?;
    write!(writer, "}}")?;

    Ok(())
}

/// `{"type":"name","properties":{"name":"urn:ogc:def:crs:EPSG::3116"}}`
fn parse_crs_member(member: &Value) -> Option<Crs> {
    member
        .get("properties")
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .and_then(Crs::parse)
}

fn value_to_multipolygon(
    index: usize,
    value: geojson::Value,
) -> Result<MultiPolygon<f64>, CapaError> {
    let geometry: Geometry<f64> = value.try_into()?;
    match geometry {
        Geometry::Polygon(p) => Ok(MultiPolygon::new(vec![p])),
        Geometry::MultiPolygon(mp) => Ok(mp),
        other => Err(CapaError::unsupported_geometry(index, geometry_kind(&other))),
    }
}

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

fn json_to_attribute(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null,
        Value::Bool(b) => AttributeValue::Boolean(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => AttributeValue::Integer(i),
            None => n
                .as_f64()
                .map(AttributeValue::Number)
                .unwrap_or(AttributeValue::Null),
        },
        Value::String(s) => AttributeValue::Text(s),
        other => AttributeValue::Text(other.to_string()),
    }
}

fn attribute_to_json(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::Text(s) => Value::String(s.clone()),
        AttributeValue::Integer(i) => Value::from(*i),
        AttributeValue::Number(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AttributeValue::Boolean(b) => Value::Bool(*b),
        AttributeValue::Null => Value::Null,
    }
}
