//! Mise en cohérence des systèmes de coordonnées
//!
//! Le CRS de la couche d'aptitudes est la référence : le predio est
//! reprojeté dans ce CRS. La fonction ne modifie jamais son entrée.

use anyhow::{Context, Result};
use capa::{Crs, Feature, FeatureCollection};
use tracing::{debug, info, warn};

use crate::error::AnalysisError;
use crate::reproject_lite::SmartReprojector;

/// Retourne une copie du predio exprimée dans le CRS `target`
pub fn reconcile(parcel: &FeatureCollection, target: Option<&Crs>) -> Result<FeatureCollection> {
    match (parcel.crs.as_ref(), target) {
        (None, None) => {
            warn!("Aucune des deux couches ne déclare de CRS, repère commun supposé");
            Ok(parcel.clone())
        }
        (None, Some(_)) => Err(AnalysisError::UndefinedCrs { layer: "predio" }.into()),
        (Some(_), None) => Err(AnalysisError::UndefinedCrs { layer: "aptitudes" }.into()),
        (Some(source), Some(target)) => reproject_collection(parcel, source, target),
    }
}

fn reproject_collection(
    parcel: &FeatureCollection,
    source: &Crs,
    target: &Crs,
) -> Result<FeatureCollection> {
    let reprojector = SmartReprojector::new(source, target)?;

    if matches!(reprojector, SmartReprojector::Identity) {
        debug!(crs = %target, "CRS identiques, pas de reprojection");
        return Ok(parcel.clone());
    }

    info!(
        source = %source,
        target = %target,
        method = reprojector.description(),
        "Reprojection du predio"
    );

    let mut features = Vec::with_capacity(parcel.len());
    for (index, feature) in parcel.features.iter().enumerate() {
        let geometry = reprojector
            .transform_multipolygon(&feature.geometry)
            .context(format!("Failed to reproject parcel record {}", index))?;
        features.push(Feature {
            geometry,
            properties: feature.properties.clone(),
        });
    }

    Ok(FeatureCollection {
        fields: parcel.fields.clone(),
        features,
        crs: Some(target.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn parcel(crs: Option<Crs>) -> FeatureCollection {
        let mut fc = FeatureCollection::new(crs);
        fc.push(
            Feature::new(MultiPolygon::new(vec![polygon![
                (x: -73.36, y: 5.535),
                (x: -73.359, y: 5.535),
                (x: -73.359, y: 5.536),
                (x: -73.36, y: 5.536),
            ]]))
            .with_property("Nombre", "La Esperanza"),
        );
        fc
    }

    #[test]
    fn test_same_crs_is_unchanged() {
        let input = parcel(Some(Crs::from_epsg(4326)));
        let output = reconcile(&input, Some(&Crs::from_epsg(4326))).unwrap();

        assert_eq!(output.features[0].geometry, input.features[0].geometry);
        assert_eq!(output.crs.unwrap().epsg(), Some(4326));
    }

    #[test]
    fn test_reprojects_into_target() {
        let input = parcel(Some(Crs::from_epsg(4326)));
        let output = reconcile(&input, Some(&Crs::from_epsg(3116))).unwrap();

        let first = output.features[0].geometry.0[0].exterior().0[0];
        assert!((first.x - 1_079_504.7).abs() < 1.0, "x={}", first.x);
        assert_eq!(output.crs.as_ref().and_then(Crs::epsg), Some(3116));
        assert_eq!(output.fields, vec!["Nombre".to_string()]);

        // Entrée intacte
        assert_eq!(input.crs.as_ref().and_then(Crs::epsg), Some(4326));
        assert!((input.features[0].geometry.0[0].exterior().0[0].x + 73.36).abs() < 1e-12);
    }

    #[test]
    fn test_both_missing_proceeds() {
        let input = parcel(None);
        let output = reconcile(&input, None).unwrap();
        assert!(output.crs.is_none());
        assert_eq!(output.len(), 1);
    }

    #[test]
    fn test_one_missing_fails() {
        let err = reconcile(&parcel(None), Some(&Crs::from_epsg(3116))).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::UndefinedCrs { layer: "predio" })
        ));

        let err = reconcile(&parcel(Some(Crs::from_epsg(4326))), None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::UndefinedCrs { layer: "aptitudes" })
        ));
    }
}
