//! Projection Web Mercator (EPSG:3857)
//!
//! Aussi connu sous le nom de Pseudo-Mercator ou Spherical Mercator.

use super::ellipsoid::Ellipsoid;
use super::Geographic;

/// Latitude limite de la projection
const MAX_LAT_DEG: f64 = 85.06;

/// Convertit coordonnées géographiques vers Web Mercator (EPSG:3857)
pub fn geographic_to_web_mercator(geo: Geographic) -> (f64, f64) {
    // Web Mercator utilise un modèle sphérique avec le rayon équatorial
    let r = Ellipsoid::WGS84.a;

    // Limiter la latitude pour éviter l'infini
    let lat = geo
        .lat
        .clamp(-MAX_LAT_DEG.to_radians(), MAX_LAT_DEG.to_radians());

    let x = r * geo.lon;
    let y = r * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();

    (x, y)
}

/// Convertit Web Mercator vers coordonnées géographiques
pub fn web_mercator_to_geographic(x: f64, y: f64) -> Geographic {
    let r = Ellipsoid::WGS84.a;

    let lon = x / r;
    let lat = 2.0 * (y / r).exp().atan() - std::f64::consts::FRAC_PI_2;

    Geographic::new(lon, lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tunja_to_web_mercator() {
        // Tunja: -73.36°E, 5.535°N
        let geo = Geographic::from_degrees(-73.36, 5.535);
        let (x, y) = geographic_to_web_mercator(geo);

        // X ≈ -8 166 400, Y ≈ 617 000
        assert!((x - (-8_166_400.0)).abs() < 1000.0, "x={}", x);
        assert!((y - 617_000.0).abs() < 2000.0, "y={}", y);
    }

    #[test]
    fn test_roundtrip() {
        let geo = Geographic::from_degrees(-73.36, 5.535);
        let (x, y) = geographic_to_web_mercator(geo);
        let (lon, lat) = web_mercator_to_geographic(x, y).to_degrees();

        assert!((lon - (-73.36)).abs() < 1e-9, "lon={}", lon);
        assert!((lat - 5.535).abs() < 1e-9, "lat={}", lat);
    }
}
