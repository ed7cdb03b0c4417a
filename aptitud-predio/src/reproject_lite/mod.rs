//! Reprojection légère en Rust pur (sans dépendances externes)
//!
//! Supporte les systèmes courants pour les données colombiennes :
//! - WGS84 (EPSG:4326) et MAGNA-SIRGAS géographique (EPSG:4686)
//! - Web Mercator (EPSG:3857)
//! - UTM WGS84 (EPSG:326xx, 327xx)
//! - MAGNA-SIRGAS / Colombia (EPSG:3114-3118)
//! - MAGNA-SIRGAS / Origen-Nacional (EPSG:9377)
//!
//! Toute conversion passe par les coordonnées géographiques. Les datums
//! MAGNA-SIRGAS et WGS84 sont considérés identiques (écart centimétrique).

mod ellipsoid;
mod mercator;
mod smart;
mod transverse_mercator;

pub use smart::SmartReprojector;
pub use transverse_mercator::TransverseMercator;

use anyhow::{bail, Result};
use geo::{Coord, MapCoords, MultiPolygon};

/// Point en coordonnées géographiques (radians)
#[derive(Debug, Clone, Copy)]
pub struct Geographic {
    /// Longitude en radians
    pub lon: f64,
    /// Latitude en radians
    pub lat: f64,
}

impl Geographic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Convertit en degrés
    pub fn to_degrees(self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }

    /// Crée depuis des degrés
    pub fn from_degrees(lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            lon: lon_deg.to_radians(),
            lat: lat_deg.to_radians(),
        }
    }
}

/// Méthode de projection associée à un code EPSG
#[derive(Debug, Clone, Copy)]
enum Projection {
    Geographic,
    WebMercator,
    TransverseMercator(TransverseMercator),
}

impl Projection {
    fn from_epsg(epsg: u32) -> Option<Self> {
        let projection = match epsg {
            4326 | 4686 => Self::Geographic,
            3857 => Self::WebMercator,
            32601..=32660 => Self::TransverseMercator(TransverseMercator::utm(epsg - 32600, false)),
            32701..=32760 => Self::TransverseMercator(TransverseMercator::utm(epsg - 32700, true)),
            3114..=3118 => {
                // Oeste Oeste (-80.08°) ... Este (-68.08°), pas de 3°
                let offset = (epsg - 3114) as f64 * 3.0;
                Self::TransverseMercator(TransverseMercator::magna_colombia(
                    -80.07750791666666 + offset,
                ))
            }
            9377 => Self::TransverseMercator(TransverseMercator::origen_nacional()),
            _ => return None,
        };
        Some(projection)
    }

    fn to_geographic(self, x: f64, y: f64) -> Geographic {
        match self {
            Self::Geographic => Geographic::from_degrees(x, y),
            Self::WebMercator => mercator::web_mercator_to_geographic(x, y),
            Self::TransverseMercator(tm) => tm.inverse(x, y),
        }
    }

    fn from_geographic(self, geo: Geographic) -> (f64, f64) {
        match self {
            Self::Geographic => geo.to_degrees(),
            Self::WebMercator => mercator::geographic_to_web_mercator(geo),
            Self::TransverseMercator(tm) => tm.forward(geo),
        }
    }
}

/// Reprojection légère entre systèmes colombiens / WGS84
pub struct ReprojectorLite {
    source: Projection,
    target: Projection,
}

impl ReprojectorLite {
    /// Crée un nouveau reprojector
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self> {
        let Some(source) = Projection::from_epsg(source_epsg) else {
            bail!(
                "EPSG:{} non supporté. Supportés: 4326, 4686, 3857, 3114-3118, 9377, 326xx, 327xx",
                source_epsg
            );
        };
        let Some(target) = Projection::from_epsg(target_epsg) else {
            bail!(
                "EPSG:{} non supporté. Supportés: 4326, 4686, 3857, 3114-3118, 9377, 326xx, 327xx",
                target_epsg
            );
        };

        Ok(Self { source, target })
    }

    /// Vérifie si l'EPSG est supporté
    pub fn is_supported_epsg(epsg: u32) -> bool {
        Projection::from_epsg(epsg).is_some()
    }

    /// Vérifie si la reprojection est supportée
    pub fn is_supported(source: u32, target: u32) -> bool {
        Self::is_supported_epsg(source) && Self::is_supported_epsg(target)
    }

    /// Transforme un point (x, y) de la source vers la cible
    pub fn transform_point(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let geo = self.source.to_geographic(x, y);
        let (tx, ty) = self.target.from_geographic(geo);

        if !tx.is_finite() || !ty.is_finite() {
            bail!("Coordonnée hors domaine de la projection: ({}, {})", x, y);
        }
        Ok((tx, ty))
    }

    /// Transforme un multipolygone coordonnée par coordonnée
    pub fn transform_multipolygon(&self, geom: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
        geom.try_map_coords(|c| {
            let (x, y) = self.transform_point(c.x, c.y)?;
            Ok(Coord { x, y })
        })
    }
}
