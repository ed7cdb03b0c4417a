//! Systèmes de coordonnées : détection EPSG depuis le WKT des fichiers `.prj`
//!
//! Les `.prj` produits par ArcGIS ne portent en général pas d'`AUTHORITY`.
//! Dans ce cas le code EPSG est retrouvé via le nom ESRI du système
//! (table des systèmes utilisés en Colombie + UTM WGS84).

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Nature du système de coordonnées
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrsKind {
    /// Coordonnées angulaires (degrés)
    Geographic,
    /// Coordonnées planes (mètres, pieds)
    Projected,
    /// Non déterminable
    Unknown,
}

/// Systèmes connus : (EPSG, nom ESRI normalisé, nature)
const KNOWN_CRS: &[(u32, &str, CrsKind)] = &[
    (4326, "gcs_wgs_1984", CrsKind::Geographic),
    (4686, "gcs_magna", CrsKind::Geographic),
    (3857, "wgs_1984_web_mercator_auxiliary_sphere", CrsKind::Projected),
    (3114, "magna_colombia_oeste_oeste", CrsKind::Projected),
    (3115, "magna_colombia_oeste", CrsKind::Projected),
    (3116, "magna_colombia_bogota", CrsKind::Projected),
    (3117, "magna_colombia_este_central", CrsKind::Projected),
    (3118, "magna_colombia_este", CrsKind::Projected),
    (9377, "magna_sirgas_origen_nacional", CrsKind::Projected),
];

/// Système de coordonnées d'une couche
#[derive(Debug, Clone)]
pub struct Crs {
    epsg: Option<u32>,
    wkt: Option<String>,
}

impl Crs {
    /// Crée un CRS depuis un code EPSG
    pub fn from_epsg(epsg: u32) -> Self {
        Self {
            epsg: Some(epsg),
            wkt: None,
        }
    }

    /// Crée un CRS depuis un WKT (contenu d'un `.prj`), avec détection de l'EPSG
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        let wkt = wkt.into().trim().to_string();
        let epsg = detect_epsg(&wkt);
        Self {
            epsg,
            wkt: Some(wkt),
        }
    }

    /// Parse une référence textuelle : `EPSG:n`, `urn:ogc:def:crs:EPSG::n`, ou WKT
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Some(code) = text
            .rsplit(':')
            .next()
            .filter(|_| text.to_ascii_uppercase().contains("EPSG:"))
            .and_then(|c| c.parse::<u32>().ok())
        {
            return Some(Self::from_epsg(code));
        }
        if text.to_ascii_uppercase().contains("CRS84") {
            return Some(Self::from_epsg(4326));
        }
        Some(Self::from_wkt(text))
    }

    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    pub fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    /// Nature du système (depuis la racine du WKT, sinon depuis la table EPSG)
    pub fn kind(&self) -> CrsKind {
        if let Some(wkt) = &self.wkt {
            let root = wkt.trim_start().to_ascii_uppercase();
            if root.starts_with("PROJCS") || root.starts_with("PROJCRS") {
                return CrsKind::Projected;
            }
            if root.starts_with("GEOGCS")
                || root.starts_with("GEOGCRS")
                || root.starts_with("GEODCRS")
            {
                return CrsKind::Geographic;
            }
        }

        match self.epsg {
            Some(code) if is_utm_epsg(code) => CrsKind::Projected,
            Some(code) => KNOWN_CRS
                .iter()
                .find(|(epsg, _, _)| *epsg == code)
                .map(|(_, _, kind)| *kind)
                .unwrap_or(CrsKind::Unknown),
            None => CrsKind::Unknown,
        }
    }

    pub fn is_geographic(&self) -> bool {
        self.kind() == CrsKind::Geographic
    }

    /// Compare deux CRS : codes EPSG si connus des deux côtés, sinon WKT
    pub fn same_as(&self, other: &Crs) -> bool {
        match (self.epsg, other.epsg) {
            (Some(a), Some(b)) => a == b,
            _ => match (&self.wkt, &other.wkt) {
                (Some(a), Some(b)) => normalize_wkt(a) == normalize_wkt(b),
                _ => false,
            },
        }
    }

    /// Définition acceptée par PROJ (`EPSG:n` ou WKT brut)
    pub fn definition(&self) -> String {
        match (self.epsg, &self.wkt) {
            (Some(code), _) => format!("EPSG:{}", code),
            (None, Some(wkt)) => wkt.clone(),
            (None, None) => String::new(),
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.epsg, wkt_name(self.wkt.as_deref().unwrap_or(""))) {
            (Some(code), Some(name)) => write!(f, "EPSG:{} ({})", code, name),
            (Some(code), None) => write!(f, "EPSG:{}", code),
            (None, Some(name)) => write!(f, "{}", name),
            (None, None) => write!(f, "unknown CRS"),
        }
    }
}

fn authority_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)(?:AUTHORITY|ID)\[\s*"EPSG"\s*,\s*"?(\d+)"?\s*\]"#)
            .expect("static regex")
    })
}

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*[A-Za-z]+\[\s*"([^"]+)""#).expect("static regex")
    })
}

/// Détecte le code EPSG d'un WKT
///
/// L'autorité de premier niveau est la dernière du texte (WKT1 comme WKT2).
fn detect_epsg(wkt: &str) -> Option<u32> {
    if let Some(code) = authority_regex()
        .captures_iter(wkt)
        .last()
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
    {
        return Some(code);
    }

    let name = normalize_name(&wkt_name(wkt)?);
    if let Some((code, _, _)) = KNOWN_CRS.iter().find(|(_, n, _)| *n == name) {
        return Some(*code);
    }
    utm_epsg_from_name(&name)
}

/// Nom du système à la racine du WKT
fn wkt_name(wkt: &str) -> Option<String> {
    name_regex()
        .captures(wkt)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// `WGS 84 / UTM zone 18N` ou `WGS_1984_UTM_Zone_18N` → 32618
fn utm_epsg_from_name(name: &str) -> Option<u32> {
    let rest = name
        .strip_prefix("wgs_1984_utm_zone_")
        .or_else(|| name.strip_prefix("wgs_84_utm_zone_"))?;
    let (zone, hemisphere) = rest.split_at(rest.len().checked_sub(1)?);
    let zone: u32 = zone.parse().ok()?;
    if !(1..=60).contains(&zone) {
        return None;
    }
    match hemisphere {
        "n" => Some(32600 + zone),
        "s" => Some(32700 + zone),
        _ => None,
    }
}

fn is_utm_epsg(code: u32) -> bool {
    (32601..=32660).contains(&code) || (32701..=32760).contains(&code)
}

fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

fn normalize_wkt(wkt: &str) -> String {
    wkt.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOGOTA_ESRI: &str = r#"PROJCS["MAGNA_Colombia_Bogota",GEOGCS["GCS_MAGNA",DATUM["D_MAGNA",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],PARAMETER["False_Easting",1000000.0],PARAMETER["False_Northing",1000000.0],PARAMETER["Central_Meridian",-74.07750791666666],PARAMETER["Scale_Factor",1.0],PARAMETER["Latitude_Of_Origin",4.596200416666666],UNIT["Meter",1.0]]"#;

    const UTM18_OGC: &str = r#"PROJCS["WGS 84 / UTM zone 18N",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4326"]],PROJECTION["Transverse_Mercator"],PARAMETER["latitude_of_origin",0],PARAMETER["central_meridian",-75],PARAMETER["scale_factor",0.9996],PARAMETER["false_easting",500000],PARAMETER["false_northing",0],UNIT["metre",1,AUTHORITY["EPSG","9001"]],AUTHORITY["EPSG","32618"]]"#;

    #[test]
    fn test_top_level_authority_wins() {
        let crs = Crs::from_wkt(UTM18_OGC);
        assert_eq!(crs.epsg(), Some(32618));
        assert_eq!(crs.kind(), CrsKind::Projected);
    }

    #[test]
    fn test_esri_name_lookup() {
        let crs = Crs::from_wkt(BOGOTA_ESRI);
        assert_eq!(crs.epsg(), Some(3116));
        assert_eq!(crs.kind(), CrsKind::Projected);
        assert_eq!(crs.to_string(), "EPSG:3116 (MAGNA_Colombia_Bogota)");
    }

    #[test]
    fn test_utm_name_without_authority() {
        let crs = Crs::from_wkt(r#"PROJCS["WGS_1984_UTM_Zone_19S",GEOGCS["GCS_WGS_1984"]]"#);
        assert_eq!(crs.epsg(), Some(32719));
    }

    #[test]
    fn test_geographic_kind() {
        let crs = Crs::from_wkt(r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984"]]"#);
        assert_eq!(crs.epsg(), Some(4326));
        assert!(crs.is_geographic());
        assert!(Crs::from_epsg(4686).is_geographic());
        assert_eq!(Crs::from_epsg(32618).kind(), CrsKind::Projected);
        assert_eq!(Crs::from_epsg(2000).kind(), CrsKind::Unknown);
    }

    #[test]
    fn test_same_as() {
        assert!(Crs::from_wkt(BOGOTA_ESRI).same_as(&Crs::from_epsg(3116)));
        assert!(!Crs::from_epsg(3116).same_as(&Crs::from_epsg(4326)));

        let a = Crs::from_wkt(r#"LOCAL_CS["site", UNIT["m",1]]"#);
        let b = Crs::from_wkt(r#"LOCAL_CS["site",UNIT["m",1]]"#);
        assert_eq!(a.epsg(), None);
        assert!(a.same_as(&b));
    }

    #[test]
    fn test_parse_references() {
        assert_eq!(
            Crs::parse("urn:ogc:def:crs:EPSG::9377").and_then(|c| c.epsg()),
            Some(9377)
        );
        assert_eq!(Crs::parse("EPSG:4326").and_then(|c| c.epsg()), Some(4326));
        assert_eq!(
            Crs::parse("urn:ogc:def:crs:OGC:1.3:CRS84").and_then(|c| c.epsg()),
            Some(4326)
        );
        assert!(Crs::parse("  ").is_none());
    }

    #[test]
    fn test_definition() {
        assert_eq!(Crs::from_epsg(3116).definition(), "EPSG:3116");
        let local = Crs::from_wkt(r#"LOCAL_CS["site"]"#);
        assert_eq!(local.definition(), r#"LOCAL_CS["site"]"#);
    }
}
