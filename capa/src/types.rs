//! Types de données pour le crate capa

use std::collections::HashMap;
use std::fmt;

use geo::MultiPolygon;

use crate::Crs;

/// Valeur d'un attribut de la table
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Null,
}

impl AttributeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Valeur numérique (entier ou flottant)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Number(n) => write!(f, "{}", n),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Null => Ok(()),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

/// Une entité surfacique avec ses attributs
#[derive(Debug, Clone)]
pub struct Feature {
    /// Géométrie (un Polygon est promu en MultiPolygon, une forme nulle est vide)
    pub geometry: MultiPolygon<f64>,

    /// Attributs de l'entité (nom -> valeur)
    pub properties: HashMap<String, AttributeValue>,
}

impl Feature {
    pub fn new(geometry: MultiPolygon<f64>) -> Self {
        Self {
            geometry,
            properties: HashMap::new(),
        }
    }

    /// Ajoute un attribut (builder)
    pub fn with_property(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.properties.insert(name.to_string(), value.into());
        self
    }

    /// Valeur d'un attribut, `Null` si absent
    pub fn property(&self, name: &str) -> &AttributeValue {
        self.properties.get(name).unwrap_or(&AttributeValue::Null)
    }
}

/// Couche vectorielle : entités ordonnées partageant un même CRS
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    /// Schéma attributaire dans l'ordre de la source
    pub fields: Vec<String>,

    /// Entités dans l'ordre de la source
    pub features: Vec<Feature>,

    /// Système de coordonnées (absent si la source n'en déclare pas)
    pub crs: Option<Crs>,
}

impl FeatureCollection {
    pub fn new(crs: Option<Crs>) -> Self {
        Self {
            fields: Vec::new(),
            features: Vec::new(),
            crs,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }

    /// Ajoute une entité en complétant le schéma avec ses attributs inconnus
    pub fn push(&mut self, feature: Feature) {
        let mut names: Vec<&String> = feature
            .properties
            .keys()
            .filter(|k| !self.fields.contains(k))
            .collect();
        names.sort();
        let names: Vec<String> = names.into_iter().cloned().collect();
        self.fields.extend(names);
        self.features.push(feature);
    }

    /// Déclare un champ dans le schéma s'il n'y est pas encore
    pub fn add_field(&mut self, name: &str) {
        if !self.has_field(name) {
            self.fields.push(name.to_string());
        }
    }
}
