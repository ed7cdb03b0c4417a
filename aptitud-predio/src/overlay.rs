//! Opérations d'overlay entre le predio et les zones d'aptitude
//!
//! - [`unify`] : union de toutes les zones (région d'aptitude)
//! - [`is_within`] : test d'inclusion, frontière comprise (DE-9IM)
//! - [`intersection`] : découpage entité par entité avec fusion des attributs
//! - [`annotate_area`] : ajout de la surface planimétrique de chaque entité

use capa::{AttributeValue, Feature, FeatureCollection};
use geo::{Area, BooleanOps, BoundingRect, Intersects, MultiPolygon, Polygon, Relate};
use tracing::debug;

/// Suffixe des attributs du côté gauche (predio) en cas de collision
const LEFT_SUFFIX: &str = "_1";
/// Suffixe des attributs du côté droit (aptitudes) en cas de collision
const RIGHT_SUFFIX: &str = "_2";

/// Union de toutes les géométries d'une couche
pub fn unify(collection: &FeatureCollection) -> MultiPolygon<f64> {
    collection
        .features
        .iter()
        .fold(MultiPolygon::new(Vec::new()), |acc, feature| {
            if acc.0.is_empty() {
                feature.geometry.clone()
            } else if feature.geometry.0.is_empty() {
                acc
            } else {
                acc.union(&feature.geometry)
            }
        })
}

/// Vrai si `geometry` est incluse dans `region`, contact de frontière compris
pub fn is_within(geometry: &MultiPolygon<f64>, region: &MultiPolygon<f64>) -> bool {
    if geometry.0.is_empty() || region.0.is_empty() {
        return false;
    }
    geometry.relate(region).is_within()
}

/// Intersection de toutes les paires (gauche × droite)
///
/// L'ordre de sortie suit la gauche puis la droite. Seuls les fragments de
/// surface non nulle sont conservés : un simple contact de frontière ne
/// produit rien. Les attributs présents des deux côtés sont suffixés
/// `_1` (gauche) et `_2` (droite). Le CRS du résultat est celui de la droite.
pub fn intersection(left: &FeatureCollection, right: &FeatureCollection) -> FeatureCollection {
    let left_names = output_names(&left.fields, &right.fields, LEFT_SUFFIX);
    let right_names = output_names(&right.fields, &left.fields, RIGHT_SUFFIX);

    let mut result = FeatureCollection::new(right.crs.clone().or_else(|| left.crs.clone()));
    result.fields = left_names
        .iter()
        .chain(right_names.iter())
        .map(|(_, out)| out.clone())
        .collect();

    let right_boxes: Vec<_> = right
        .features
        .iter()
        .map(|f| f.geometry.bounding_rect())
        .collect();

    let mut skipped = 0usize;
    for l in &left.features {
        let Some(l_box) = l.geometry.bounding_rect() else {
            continue;
        };

        for (r, r_box) in right.features.iter().zip(&right_boxes) {
            match r_box {
                Some(r_box) if l_box.intersects(r_box) => {}
                _ => {
                    skipped += 1;
                    continue;
                }
            }

            let clipped = positive_area(l.geometry.intersection(&r.geometry));
            if clipped.0.is_empty() {
                continue;
            }

            let mut feature = Feature::new(clipped);
            copy_properties(l, &left_names, &mut feature);
            copy_properties(r, &right_names, &mut feature);
            result.push(feature);
        }
    }

    debug!(
        left = left.len(),
        right = right.len(),
        skipped_by_bbox = skipped,
        fragments = result.len(),
        "Overlay terminé"
    );

    result
}

/// Ajoute l'attribut surface (unités du CRS au carré) à chaque entité
pub fn annotate_area(collection: &mut FeatureCollection, area_field: &str) {
    collection.add_field(area_field);
    for feature in &mut collection.features {
        let area = feature.geometry.unsigned_area();
        feature
            .properties
            .insert(area_field.to_string(), AttributeValue::Number(area));
    }
}

/// Associe chaque champ à son nom de sortie, suffixé s'il existe de l'autre côté
fn output_names(fields: &[String], other: &[String], suffix: &str) -> Vec<(String, String)> {
    fields
        .iter()
        .map(|name| {
            let out = if other.contains(name) {
                format!("{}{}", name, suffix)
            } else {
                name.clone()
            };
            (name.clone(), out)
        })
        .collect()
}

fn copy_properties(source: &Feature, names: &[(String, String)], target: &mut Feature) {
    for (name, out) in names {
        target
            .properties
            .insert(out.clone(), source.property(name).clone());
    }
}

/// Retire les polygones dégénérés (surface nulle)
fn positive_area(geometry: MultiPolygon<f64>) -> MultiPolygon<f64> {
    let polygons: Vec<Polygon<f64>> = geometry
        .0
        .into_iter()
        .filter(|p| p.unsigned_area() > 0.0)
        .collect();
    MultiPolygon::new(polygons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use capa::Crs;
    use geo::polygon;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0),
            (x: x1, y: y0),
            (x: x1, y: y1),
            (x: x0, y: y1),
        ]])
    }

    /// Deux zones : A à gauche de x=50, B à droite
    fn zones() -> FeatureCollection {
        let mut fc = FeatureCollection::new(Some(Crs::from_epsg(3116)));
        fc.push(Feature::new(rect(0.0, 0.0, 50.0, 100.0)).with_property("Descripcio", "A"));
        fc.push(Feature::new(rect(50.0, 0.0, 100.0, 100.0)).with_property("Descripcio", "B"));
        fc
    }

    fn parcel(geometry: MultiPolygon<f64>) -> FeatureCollection {
        let mut fc = FeatureCollection::new(Some(Crs::from_epsg(3116)));
        fc.push(Feature::new(geometry).with_property("Predio", 7i64));
        fc
    }

    #[test]
    fn test_unify_covers_all_zones() {
        let region = unify(&zones());
        assert!((region.unsigned_area() - 10_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_unify_empty() {
        let region = unify(&FeatureCollection::default());
        assert!(region.0.is_empty());
    }

    #[test]
    fn test_within_is_boundary_inclusive() {
        let region = unify(&zones());

        assert!(is_within(&rect(10.0, 10.0, 20.0, 20.0), &region));
        // Parcelle collée au bord de la région
        assert!(is_within(&rect(0.0, 0.0, 10.0, 10.0), &region));
        // Parcelle à cheval sur les deux zones
        assert!(is_within(&rect(40.0, 0.0, 60.0, 10.0), &region));
        assert!(!is_within(&rect(200.0, 200.0, 210.0, 210.0), &region));
        assert!(!is_within(&rect(95.0, 0.0, 105.0, 10.0), &region));
    }

    #[test]
    fn test_contained_parcel() {
        let result = intersection(&parcel(rect(10.0, 10.0, 20.0, 20.0)), &zones());

        assert_eq!(result.len(), 1);
        assert!((result.features[0].geometry.unsigned_area() - 100.0).abs() < 1e-9);
        assert_eq!(
            result.features[0].property("Descripcio"),
            &AttributeValue::Text("A".to_string())
        );
        assert_eq!(result.features[0].property("Predio"), &AttributeValue::Integer(7));
        assert_eq!(result.fields, vec!["Predio".to_string(), "Descripcio".to_string()]);
    }

    #[test]
    fn test_straddling_parcel() {
        let input = parcel(rect(40.0, 0.0, 60.0, 10.0));
        let result = intersection(&input, &zones());

        assert_eq!(result.len(), 2);
        let areas: Vec<f64> = result
            .features
            .iter()
            .map(|f| f.geometry.unsigned_area())
            .collect();
        assert!((areas[0] - 100.0).abs() < 1e-9);
        assert!((areas[1] - 100.0).abs() < 1e-9);
        assert_eq!(result.features[0].property("Descripcio").as_str(), Some("A"));
        assert_eq!(result.features[1].property("Descripcio").as_str(), Some("B"));

        // Chaque fragment reste dans le predio
        let outline = &input.features[0].geometry;
        for feature in &result.features {
            assert!(is_within(&feature.geometry, outline));
        }
    }

    #[test]
    fn test_boundary_contact_is_empty() {
        // Touche la zone B uniquement par son bord x=100
        let result = intersection(&parcel(rect(100.0, 0.0, 110.0, 10.0)), &zones());
        assert!(result.is_empty());
    }

    #[test]
    fn test_disjoint_is_empty() {
        let result = intersection(&parcel(rect(500.0, 500.0, 510.0, 510.0)), &zones());
        assert!(result.is_empty());
        assert_eq!(result.crs.unwrap().epsg(), Some(3116));
    }

    #[test]
    fn test_attribute_collision_suffixes() {
        let mut left = FeatureCollection::new(None);
        left.push(
            Feature::new(rect(10.0, 10.0, 20.0, 20.0))
                .with_property("Descripcio", "Predio rural")
                .with_property("Codigo", "15001"),
        );

        let result = intersection(&left, &zones());

        assert_eq!(
            result.fields,
            vec![
                "Codigo".to_string(),
                "Descripcio_1".to_string(),
                "Descripcio_2".to_string(),
            ]
        );
        let feature = &result.features[0];
        assert_eq!(feature.property("Descripcio_1").as_str(), Some("Predio rural"));
        assert_eq!(feature.property("Descripcio_2").as_str(), Some("A"));
        assert!(feature.property("Descripcio").is_null());
    }

    #[test]
    fn test_annotate_area() {
        let mut result = intersection(&parcel(rect(40.0, 0.0, 60.0, 10.0)), &zones());
        annotate_area(&mut result, "area");

        assert_eq!(result.fields.last().map(String::as_str), Some("area"));
        let total: f64 = result
            .features
            .iter()
            .filter_map(|f| f.property("area").as_f64())
            .sum();
        assert!((total - 200.0).abs() < 1e-9);
    }
}
