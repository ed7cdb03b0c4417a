//! Rapport des surfaces d'aptitude
//!
//! Collecte la surface de chaque fragment de l'intersection et
//! affiche le tableau récapitulatif sur la console.

use std::path::Path;

use capa::FeatureCollection;
use geo::Area;
use serde::Serialize;

/// Une ligne du tableau : un fragment de l'intersection
#[derive(Debug, Clone, Serialize)]
pub struct AreaRow {
    /// Position de l'entité dans l'intersection
    pub index: usize,
    /// Catégorie d'aptitude (absente si l'attribut est nul)
    pub category: Option<String>,
    /// Surface planimétrique en unités du CRS au carré
    pub area: f64,
}

/// Rapport complet des surfaces
#[derive(Debug, Clone, Serialize)]
pub struct AreaReport {
    /// Nom de l'attribut catégorie
    pub category_field: String,
    /// Lignes dans l'ordre de l'intersection
    pub rows: Vec<AreaRow>,
    /// Somme des surfaces
    pub total: f64,
}

impl AreaReport {
    /// Construit le rapport depuis une intersection annotée
    ///
    /// La surface est lue dans `area_field`; si l'attribut manque elle est
    /// recalculée depuis la géométrie.
    pub fn from_collection(
        collection: &FeatureCollection,
        category_field: &str,
        area_field: &str,
    ) -> Self {
        let rows: Vec<AreaRow> = collection
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| {
                let category = feature.property(category_field);
                AreaRow {
                    index,
                    category: (!category.is_null()).then(|| category.to_string()),
                    area: feature
                        .property(area_field)
                        .as_f64()
                        .unwrap_or_else(|| feature.geometry.unsigned_area()),
                }
            })
            .collect();

        let total = rows.iter().map(|r| r.area).sum();

        Self {
            category_field: category_field.to_string(),
            rows,
            total,
        }
    }

    /// Ligne de total affichée sous le tableau
    pub fn total_line(&self) -> String {
        format!("Total suitable area in parcel: {:.2} (CRS units)", self.total)
    }

    /// Affiche le rapport sur la console
    pub fn display(&self, output_image: &Path) {
        println!("\n{}", "=".repeat(60));
        println!("SUITABLE AREA TABLE FOR THE PARCEL");
        println!("{}", "=".repeat(60));

        let width = self
            .rows
            .iter()
            .filter_map(|r| r.category.as_ref().map(|c| c.chars().count()))
            .chain(std::iter::once(self.category_field.chars().count()))
            .max()
            .unwrap_or(0);

        println!(
            "{:>5}  {:<width$}  {:>16}",
            "",
            self.category_field,
            "area",
            width = width
        );
        for row in &self.rows {
            println!(
                "{:>5}  {:<width$}  {:>16.2}",
                row.index,
                row.category.as_deref().unwrap_or(""),
                row.area,
                width = width
            );
        }

        println!("\n{}", self.total_line());
        println!("PNG map saved to: {}", output_image.display());
        println!("{}", "=".repeat(60));
    }

    /// Affichage compact pour les logs
    pub fn summary(&self) -> String {
        format!("{} fragments, total {:.2}", self.rows.len(), self.total)
    }
}
