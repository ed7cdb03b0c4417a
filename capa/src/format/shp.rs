//! Lecture/écriture ESRI Shapefile via le crate `shapefile`
//!
//! Le `.prj` (WKT) est lu et écrit à côté du `.shp`. L'ordre des champs est
//! lu directement dans l'en-tête du `.dbf`, le `Record` dbase étant une map.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use geo::{Coord, LineString, MultiPolygon};
use shapefile::dbase::{self, FieldName, FieldValue, TableWriterBuilder};
use shapefile::{PolygonRing, Shape};
use tracing::{debug, warn};

use crate::{AttributeValue, CapaError, Crs, Feature, FeatureCollection};

/// Longueur maximale d'un nom de champ DBF
const DBF_NAME_LEN: usize = 10;

/// Longueur maximale d'un champ caractère DBF
const DBF_CHAR_MAX: usize = 254;

/// Nom et nombre de décimales d'un champ de l'en-tête DBF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbfField {
    pub name: String,
    pub decimals: u8,
}

/// Lit une couche Shapefile avec son `.prj` éventuel
pub fn read(path: &Path) -> Result<FeatureCollection, CapaError> {
    let mut reader = shapefile::Reader::from_path(path)?;
    let dbf_fields = read_dbf_fields(&path.with_extension("dbf"))?;
    let decimals: HashMap<&str, u8> = dbf_fields
        .iter()
        .map(|f| (f.name.as_str(), f.decimals))
        .collect();

    let mut collection = FeatureCollection::new(read_prj(path)?);
    collection.fields = dbf_fields.iter().map(|f| f.name.clone()).collect();

    for (index, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result?;
        let geometry = shape_to_multipolygon(index, shape)?;

        let properties = HashMap::<String, FieldValue>::from(record)
            .into_iter()
            .map(|(name, value)| {
                let integral = decimals.get(name.as_str()) == Some(&0);
                let value = field_to_attribute(value, integral);
                (name, value)
            })
            .collect();

        collection.features.push(Feature {
            geometry,
            properties,
        });
    }

    debug!(
        path = %path.display(),
        features = collection.len(),
        fields = collection.fields.len(),
        "Shapefile lu"
    );

    Ok(collection)
}

/// Écrit une couche en Shapefile (+ `.prj` si le WKT est connu)
pub fn write(collection: &FeatureCollection, path: &Path) -> Result<(), CapaError> {
    let columns = plan_columns(collection);

    let mut builder = TableWriterBuilder::new();
    for column in &columns {
        let name = FieldName::try_from(column.name.as_str())
            .map_err(|e| CapaError::Dbase(format!("invalid field name {}: {:?}", column.name, e)))?;
        builder = match column.kind {
            ColumnKind::Integer => builder.add_numeric_field(name, 18, 0),
            ColumnKind::Number => builder.add_numeric_field(name, 24, 15),
            ColumnKind::Boolean => builder.add_logical_field(name),
            ColumnKind::Text(length) => builder.add_character_field(name, length),
            ColumnKind::RowIndex => builder.add_numeric_field(name, 10, 0),
        };
    }

    let mut writer = shapefile::Writer::from_path(path, builder)?;

    for (index, feature) in collection.features.iter().enumerate() {
        let shape = multipolygon_to_shape(&feature.geometry);

        let mut record = dbase::Record::default();
        for column in &columns {
            let value = match column.kind {
                ColumnKind::RowIndex => FieldValue::Numeric(Some(index as f64)),
                kind => to_field_value(feature.property(&column.source), kind),
            };
            record.insert(column.name.clone(), value);
        }

        writer.write_shape_and_record(&shape, &record)?;
    }

    write_prj(collection.crs.as_ref(), path)?;

    debug!(
        path = %path.display(),
        features = collection.len(),
        "Shapefile écrit"
    );

    Ok(())
}

/// Lit les champs de l'en-tête DBF dans l'ordre du fichier
///
/// Le `Record` dbase ne conserve ni l'ordre ni le nombre de décimales,
/// seul ce dernier distingue un numérique entier d'un réel.
pub fn read_dbf_fields(path: &Path) -> Result<Vec<DbfField>, CapaError> {
    let file_label = path.display().to_string();
    let mut file = File::open(path)?;

    let mut header = [0u8; 32];
    file.read_exact(&mut header)?;
    let header_len = u16::from_le_bytes([header[8], header[9]]) as usize;
    if header_len < 33 {
        return Err(CapaError::invalid_dbf(
            file_label,
            format!("header length {} too short", header_len),
        ));
    }

    let mut descriptors = vec![0u8; header_len - 32];
    file.read_exact(&mut descriptors)?;

    let mut fields = Vec::new();
    for chunk in descriptors.chunks(32) {
        // 0x0D termine la liste des descripteurs
        if chunk[0] == 0x0D {
            break;
        }
        if chunk.len() < 32 {
            return Err(CapaError::invalid_dbf(file_label, "truncated field descriptor"));
        }

        let name_end = chunk[..11].iter().position(|&b| b == 0).unwrap_or(11);
        let name = String::from_utf8_lossy(&chunk[..name_end]).trim().to_string();

        fields.push(DbfField {
            name,
            decimals: chunk[17],
        });
    }

    Ok(fields)
}

fn read_prj(path: &Path) -> Result<Option<Crs>, CapaError> {
    let prj_path = path.with_extension("prj");
    if !prj_path.exists() {
        debug!(path = %path.display(), "Pas de fichier .prj");
        return Ok(None);
    }

    let wkt = fs::read_to_string(&prj_path)?;
    Ok(Crs::parse(&wkt))
}

fn write_prj(crs: Option<&Crs>, path: &Path) -> Result<(), CapaError> {
    match crs {
        Some(crs) => match crs.wkt() {
            Some(wkt) => fs::write(path.with_extension("prj"), wkt)?,
            None => warn!(
                crs = %crs,
                path = %path.display(),
                "WKT inconnu, fichier .prj non écrit"
            ),
        },
        None => debug!(path = %path.display(), "Couche sans CRS, fichier .prj non écrit"),
    }
    Ok(())
}

fn shape_to_multipolygon(index: usize, shape: Shape) -> Result<MultiPolygon<f64>, CapaError> {
    let geometry: MultiPolygon<f64> = match shape {
        Shape::NullShape => MultiPolygon::new(vec![]),
        Shape::Polygon(polygon) => polygon
            .try_into()
            .map_err(|e| CapaError::unsupported_geometry(index, format!("{:?}", e)))?,
        Shape::PolygonM(polygon) => polygon
            .try_into()
            .map_err(|e| CapaError::unsupported_geometry(index, format!("{:?}", e)))?,
        Shape::PolygonZ(polygon) => polygon
            .try_into()
            .map_err(|e| CapaError::unsupported_geometry(index, format!("{:?}", e)))?,
        other => {
            return Err(CapaError::unsupported_geometry(
                index,
                format!("{:?}", other.shapetype()),
            ))
        }
    };
    Ok(geometry)
}

fn multipolygon_to_shape(geometry: &MultiPolygon<f64>) -> shapefile::Polygon {
    let mut rings = Vec::new();
    for polygon in &geometry.0 {
        rings.push(PolygonRing::Outer(ring_points(polygon.exterior())));
        for interior in polygon.interiors() {
            rings.push(PolygonRing::Inner(ring_points(interior)));
        }
    }
    shapefile::Polygon::with_rings(rings)
}

fn ring_points(ring: &LineString<f64>) -> Vec<shapefile::Point> {
    ring.coords()
        .map(|&Coord { x, y }| shapefile::Point::new(x, y))
        .collect()
}

fn field_to_attribute(value: FieldValue, integral: bool) -> AttributeValue {
    match value {
        FieldValue::Character(Some(s)) => AttributeValue::Text(s.trim_end().to_string()),
        FieldValue::Numeric(Some(n)) if integral && n.fract() == 0.0 => {
            AttributeValue::Integer(n as i64)
        }
        FieldValue::Numeric(Some(n)) => AttributeValue::Number(n),
        FieldValue::Float(Some(f)) => AttributeValue::Number(f as f64),
        FieldValue::Integer(i) => AttributeValue::Integer(i as i64),
        FieldValue::Double(d) => AttributeValue::Number(d),
        FieldValue::Currency(c) => AttributeValue::Number(c),
        FieldValue::Logical(Some(b)) => AttributeValue::Boolean(b),
        FieldValue::Date(Some(d)) => {
            AttributeValue::Text(format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day()))
        }
        FieldValue::Memo(s) => AttributeValue::Text(s),
        FieldValue::Character(None)
        | FieldValue::Numeric(None)
        | FieldValue::Float(None)
        | FieldValue::Logical(None)
        | FieldValue::Date(None) => AttributeValue::Null,
        other => {
            debug!(value = ?other, "Type DBF non géré, valeur ignorée");
            AttributeValue::Null
        }
    }
}

/// Type de colonne DBF déduit des valeurs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Integer,
    Number,
    Boolean,
    Text(u8),
    /// Colonne FID ajoutée quand la couche n'a aucun attribut
    RowIndex,
}

#[derive(Debug)]
struct Column {
    /// Nom de l'attribut dans la couche
    source: String,
    /// Nom du champ DBF (10 caractères max, unique)
    name: String,
    kind: ColumnKind,
}

fn plan_columns(collection: &FeatureCollection) -> Vec<Column> {
    let mut used: Vec<String> = Vec::new();
    let mut columns = Vec::with_capacity(collection.fields.len());

    for source in &collection.fields {
        let name = dbf_field_name(source, &used);
        used.push(name.clone());
        columns.push(Column {
            source: source.clone(),
            name,
            kind: infer_kind(collection, source),
        });
    }

    if columns.is_empty() {
        columns.push(Column {
            source: String::new(),
            name: "FID".to_string(),
            kind: ColumnKind::RowIndex,
        });
    }

    columns
}

fn infer_kind(collection: &FeatureCollection, field: &str) -> ColumnKind {
    let values: Vec<&AttributeValue> = collection
        .features
        .iter()
        .map(|f| f.property(field))
        .filter(|v| !v.is_null())
        .collect();

    if values.is_empty() {
        return ColumnKind::Text(1);
    }
    if values.iter().all(|v| matches!(v, AttributeValue::Integer(_))) {
        return ColumnKind::Integer;
    }
    if values
        .iter()
        .all(|v| matches!(v, AttributeValue::Integer(_) | AttributeValue::Number(_)))
    {
        return ColumnKind::Number;
    }
    if values.iter().all(|v| matches!(v, AttributeValue::Boolean(_))) {
        return ColumnKind::Boolean;
    }

    let longest = values.iter().map(|v| v.to_string().len()).max().unwrap_or(1);
    ColumnKind::Text(longest.clamp(1, DBF_CHAR_MAX) as u8)
}

fn to_field_value(value: &AttributeValue, kind: ColumnKind) -> FieldValue {
    match (kind, value) {
        (ColumnKind::Integer | ColumnKind::Number, v) => FieldValue::Numeric(v.as_f64()),
        (ColumnKind::Boolean, AttributeValue::Boolean(b)) => FieldValue::Logical(Some(*b)),
        (ColumnKind::Boolean, _) => FieldValue::Logical(None),
        (_, AttributeValue::Null) => FieldValue::Character(None),
        (_, v) => {
            let mut text = v.to_string();
            truncate_bytes(&mut text, DBF_CHAR_MAX);
            FieldValue::Character(Some(text))
        }
    }
}

/// Tronque le nom à 10 octets et le rend unique avec un suffixe `_N`
fn dbf_field_name(source: &str, used: &[String]) -> String {
    let mut base = source.to_string();
    truncate_bytes(&mut base, DBF_NAME_LEN);
    if !used.contains(&base) {
        return base;
    }

    let mut n = 1;
    loop {
        let suffix = format!("_{}", n);
        let mut candidate = source.to_string();
        truncate_bytes(&mut candidate, DBF_NAME_LEN - suffix.len());
        candidate.push_str(&suffix);
        if !used.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn truncate_bytes(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}
