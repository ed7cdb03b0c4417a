//! Reprojection de géométries avec PROJ
//!
//! Ce module est disponible uniquement avec le feature `reproject`.

#[cfg(feature = "reproject")]
use anyhow::{Context, Result};
#[cfg(feature = "reproject")]
use geo::{Coord, LineString, MultiPolygon, Polygon};
#[cfg(feature = "reproject")]
use proj::Proj;

/// Reprojection de géométries entre deux systèmes de coordonnées
#[cfg(feature = "reproject")]
pub struct Reprojector {
    proj: Proj,
}

#[cfg(feature = "reproject")]
impl Reprojector {
    /// Crée un reprojector entre deux définitions PROJ (`EPSG:n` ou WKT)
    pub fn new(source: &str, target: &str) -> Result<Self> {
        let proj = Proj::new_known_crs(source, target, None)
            .context(format!("Failed to create projection from {} to {}", source, target))?;

        Ok(Self { proj })
    }

    /// Transforme un multipolygone
    pub fn transform_multipolygon(&self, geom: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
        let polys: Result<Vec<Polygon>> = geom.0.iter().map(|p| self.transform_polygon(p)).collect();
        Ok(MultiPolygon::new(polys?))
    }

    /// Transforme une LineString (optimisé avec batch conversion)
    fn transform_linestring(&self, ls: &LineString) -> Result<LineString> {
        // Copier les coordonnées pour transformation in-place
        let mut coords: Vec<(f64, f64)> = ls.0.iter().map(|c| (c.x, c.y)).collect();

        // Transformation batch - beaucoup plus rapide que point par point
        self.proj
            .convert_array(&mut coords)
            .context("Batch coordinate transformation failed")?;

        let result: Vec<Coord> = coords.into_iter().map(|(x, y)| Coord { x, y }).collect();
        Ok(LineString::new(result))
    }

    /// Transforme un Polygon
    fn transform_polygon(&self, p: &Polygon) -> Result<Polygon> {
        let exterior = self.transform_linestring(p.exterior())?;
        let interiors: Result<Vec<LineString>> = p
            .interiors()
            .iter()
            .map(|ls| self.transform_linestring(ls))
            .collect();
        Ok(Polygon::new(exterior, interiors?))
    }
}

#[cfg(feature = "reproject")]
#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn test_wgs84_to_magna_bogota() {
        let reprojector = Reprojector::new("EPSG:4326", "EPSG:3116").unwrap();

        // Tunja, ordre (lon, lat) normalisé par new_known_crs
        let square = MultiPolygon::new(vec![polygon![
            (x: -73.36, y: 5.535),
            (x: -73.359, y: 5.535),
            (x: -73.359, y: 5.536),
            (x: -73.36, y: 5.536),
        ]]);
        let result = reprojector.transform_multipolygon(&square).unwrap();

        let first = result.0[0].exterior().0[0];
        assert!((first.x - 1_079_504.0).abs() < 100.0, "x={}", first.x);
        assert!((first.y - 1_103_863.0).abs() < 100.0, "y={}", first.y);
        assert_eq!(result.0[0].exterior().0.len(), 5);
    }

    #[test]
    fn test_invalid_definition() {
        let result = Reprojector::new("EPSG:99999", "EPSG:4326");
        assert!(result.is_err());
    }
}

/// Vérifie si la reprojection PROJ est disponible
pub fn is_available() -> bool {
    cfg!(feature = "reproject")
}
