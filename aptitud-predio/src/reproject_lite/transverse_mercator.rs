//! Projection Transverse Mercator (séries de Snyder)
//!
//! Systèmes supportés:
//! - UTM WGS84 nord/sud (EPSG:32601-32660, 32701-32760)
//! - MAGNA-SIRGAS / Colombia zones Oeste Oeste à Este (EPSG:3114-3118)
//! - MAGNA-SIRGAS / Origen-Nacional, CTM12 (EPSG:9377)

use super::ellipsoid::Ellipsoid;
use super::Geographic;

/// Latitude d'origine des zones MAGNA-SIRGAS Colombia
const MAGNA_LAT0_DEG: f64 = 4.596200416666666;

/// Paramètres d'une projection Transverse Mercator
#[derive(Debug, Clone, Copy)]
pub struct TransverseMercator {
    /// Demi-grand axe de l'ellipsoïde
    a: f64,
    /// Première excentricité au carré
    e2: f64,
    /// Méridien central (radians)
    lon0: f64,
    /// Latitude d'origine (radians)
    lat0: f64,
    /// Facteur d'échelle sur le méridien central
    k0: f64,
    /// False easting
    x0: f64,
    /// False northing
    y0: f64,
}

impl TransverseMercator {
    /// Zone UTM sur WGS84
    pub fn utm(zone: u32, south: bool) -> Self {
        Self {
            a: Ellipsoid::WGS84.a,
            e2: Ellipsoid::WGS84.e2(),
            lon0: ((zone as f64 - 1.0) * 6.0 - 180.0 + 3.0).to_radians(),
            lat0: 0.0,
            k0: 0.9996,
            x0: 500000.0,
            y0: if south { 10000000.0 } else { 0.0 },
        }
    }

    /// Zone MAGNA-SIRGAS / Colombia (origine Bogotá décalée de 3° par zone)
    pub fn magna_colombia(central_meridian_deg: f64) -> Self {
        Self {
            a: Ellipsoid::GRS80.a,
            e2: Ellipsoid::GRS80.e2(),
            lon0: central_meridian_deg.to_radians(),
            lat0: MAGNA_LAT0_DEG.to_radians(),
            k0: 1.0,
            x0: 1000000.0,
            y0: 1000000.0,
        }
    }

    /// MAGNA-SIRGAS / Origen-Nacional (CTM12)
    pub fn origen_nacional() -> Self {
        Self {
            a: Ellipsoid::GRS80.a,
            e2: Ellipsoid::GRS80.e2(),
            lon0: (-73.0_f64).to_radians(),
            lat0: 4.0_f64.to_radians(),
            k0: 0.9992,
            x0: 5000000.0,
            y0: 2000000.0,
        }
    }

    fn ep2(&self) -> f64 {
        self.e2 / (1.0 - self.e2)
    }

    /// Longueur de l'arc de méridien depuis l'équateur
    fn meridian_arc(&self, lat: f64) -> f64 {
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;

        self.a
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * lat).sin())
    }

    /// Coordonnées géographiques → projetées
    pub fn forward(&self, geo: Geographic) -> (f64, f64) {
        let ep2 = self.ep2();
        let (lon, lat) = (geo.lon, geo.lat);

        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let tan_lat = lat.tan();

        let n = self.a / (1.0 - self.e2 * sin_lat.powi(2)).sqrt();
        let t = tan_lat.powi(2);
        let c = ep2 * cos_lat.powi(2);
        let a = (lon - self.lon0) * cos_lat;
        let m = self.meridian_arc(lat);
        let m0 = self.meridian_arc(self.lat0);

        let x = self.x0
            + self.k0
                * n
                * (a + (1.0 - t + c) * a.powi(3) / 6.0
                    + (5.0 - 18.0 * t + t.powi(2) + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0);

        let y = self.y0
            + self.k0
                * (m - m0
                    + n * tan_lat
                        * (a.powi(2) / 2.0
                            + (5.0 - t + 9.0 * c + 4.0 * c.powi(2)) * a.powi(4) / 24.0
                            + (61.0 - 58.0 * t + t.powi(2) + 600.0 * c - 330.0 * ep2)
                                * a.powi(6)
                                / 720.0));

        (x, y)
    }

    /// Coordonnées projetées → géographiques
    pub fn inverse(&self, x: f64, y: f64) -> Geographic {
        let a = self.a;
        let e2 = self.e2;
        let ep2 = self.ep2();

        // Coordonnées réduites
        let x = x - self.x0;
        let m = self.meridian_arc(self.lat0) + (y - self.y0) / self.k0;

        // Calcul du footprint latitude
        let mu = m / (a * (1.0 - e2 / 4.0 - 3.0 * e2.powi(2) / 64.0 - 5.0 * e2.powi(3) / 256.0));
        let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let sin_phi1 = phi1.sin();
        let cos_phi1 = phi1.cos();
        let tan_phi1 = phi1.tan();

        let n1 = a / (1.0 - e2 * sin_phi1.powi(2)).sqrt();
        let t1 = tan_phi1.powi(2);
        let c1 = ep2 * cos_phi1.powi(2);
        let r1 = a * (1.0 - e2) / (1.0 - e2 * sin_phi1.powi(2)).powf(1.5);
        let d = x / (n1 * self.k0);

        let lat = phi1
            - (n1 * tan_phi1 / r1)
                * (d.powi(2) / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1.powi(2) - 9.0 * ep2) * d.powi(4)
                        / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1.powi(2)
                        - 252.0 * ep2
                        - 3.0 * c1.powi(2))
                        * d.powi(6)
                        / 720.0);

        let lon = self.lon0
            + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1.powi(2) + 8.0 * ep2 + 24.0 * t1.powi(2))
                    * d.powi(5)
                    / 120.0)
                / cos_phi1;

        Geographic::new(lon, lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tunja (plaza de Bolívar) approximativement
    const TUNJA: (f64, f64) = (-73.36, 5.535);

    #[test]
    fn test_tunja_magna_bogota() {
        let tm = TransverseMercator::magna_colombia(-74.07750791666666);
        let (x, y) = tm.forward(Geographic::from_degrees(TUNJA.0, TUNJA.1));

        assert!((x - 1_079_504.7).abs() < 1.0, "x={}", x);
        assert!((y - 1_103_863.3).abs() < 1.0, "y={}", y);
    }

    #[test]
    fn test_tunja_utm_18n() {
        let tm = TransverseMercator::utm(18, false);
        let (x, y) = tm.forward(Geographic::from_degrees(TUNJA.0, TUNJA.1));

        assert!((x - 681_670.2).abs() < 1.0, "x={}", x);
        assert!((y - 612_053.7).abs() < 1.0, "y={}", y);
    }

    #[test]
    fn test_origen_nacional_roundtrip() {
        let tm = TransverseMercator::origen_nacional();
        let (x, y) = tm.forward(Geographic::from_degrees(TUNJA.0, TUNJA.1));
        assert!((x - 4_960_142.2).abs() < 1.0, "x={}", x);

        let (lon, lat) = tm.inverse(x, y).to_degrees();
        assert!((lon - TUNJA.0).abs() < 1e-8, "lon={}", lon);
        assert!((lat - TUNJA.1).abs() < 1e-8, "lat={}", lat);
    }

    #[test]
    fn test_southern_hemisphere_roundtrip() {
        // Leticia (Amazonas), UTM 19S
        let tm = TransverseMercator::utm(19, true);
        let (x, y) = tm.forward(Geographic::from_degrees(-69.94, -4.21));
        assert!(y < 10_000_000.0 && y > 9_000_000.0, "y={}", y);

        let (lon, lat) = tm.inverse(x, y).to_degrees();
        assert!((lon - (-69.94)).abs() < 1e-8, "lon={}", lon);
        assert!((lat - (-4.21)).abs() < 1e-8, "lat={}", lat);
    }
}
