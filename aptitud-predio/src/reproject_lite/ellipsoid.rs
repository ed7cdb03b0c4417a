//! Ellipsoïdes de référence

/// Ellipsoïde défini par son demi-grand axe et son aplatissement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Demi-grand axe (rayon équatorial) en mètres
    pub a: f64,
    /// Aplatissement
    pub f: f64,
}

impl Ellipsoid {
    /// WGS84 (UTM, Web Mercator)
    pub const WGS84: Self = Self {
        a: 6378137.0,
        f: 1.0 / 298.257223563,
    };

    /// GRS80, support de MAGNA-SIRGAS (écart avec WGS84 < 0.1 mm)
    pub const GRS80: Self = Self {
        a: 6378137.0,
        f: 1.0 / 298.257222101,
    };

    /// Première excentricité au carré
    pub fn e2(&self) -> f64 {
        2.0 * self.f - self.f * self.f
    }
}
