//! Configuration de l'analyse et du rendu

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration principale
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Attribut portant la catégorie d'aptitude (couleur et légende)
    pub category_field: String,

    /// Nom de l'attribut surface ajouté aux entités de l'intersection
    pub area_field: String,

    /// Paramètres du rendu PNG
    pub render: RenderConfig,
}

/// Paramètres du rendu de la carte
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Largeur de l'image en pixels
    pub width: u32,

    /// Hauteur de l'image en pixels
    pub height: u32,

    /// Titre affiché en haut de la carte
    pub title: String,

    /// Opacité du remplissage des polygones (0..1)
    pub fill_alpha: f32,

    /// Couleur de fond (#rrggbb)
    pub background: String,

    /// Couleur du cadre et du texte (#rrggbb)
    pub frame_color: String,

    /// Facteur d'agrandissement des glyphes 8x8
    pub glyph_scale: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            category_field: "Descripcio".to_string(),
            area_field: "area".to_string(),
            render: RenderConfig::default(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
            title: "Intersección entre el predio y aptitudes de Tunja".to_string(),
            fill_alpha: 0.5,
            background: "#ffffff".to_string(),
            frame_color: "#333333".to_string(),
            glyph_scale: 2,
        }
    }
}

impl AnalysisConfig {
    /// Charge une configuration depuis un fichier JSON
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "tunja" => Self::load_embedded(include_str!("presets/tunja.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: tunja", preset),
        }
    }

    /// Preset embarqué (nom) ou chemin vers un fichier JSON
    pub fn resolve(name_or_path: &str) -> Result<Self> {
        let path = Path::new(name_or_path);
        if path.extension().map_or(false, |ext| ext == "json") {
            Self::load(path)
        } else {
            Self::from_preset(name_or_path)
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_matches_default() {
        let preset = AnalysisConfig::from_preset("tunja").unwrap();
        let default = AnalysisConfig::default();

        assert_eq!(preset.category_field, default.category_field);
        assert_eq!(preset.render.width, 1000);
        assert_eq!(preset.render.height, 1000);
        assert_eq!(preset.render.title, default.render.title);
    }

    #[test]
    fn test_unknown_preset() {
        assert!(AnalysisConfig::from_preset("bogota").is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"category_field":"Aptitud","render":{"width":640}}"#)
                .unwrap();

        assert_eq!(config.category_field, "Aptitud");
        assert_eq!(config.area_field, "area");
        assert_eq!(config.render.width, 640);
        assert_eq!(config.render.height, 1000);
        assert!((config.render.fill_alpha - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_resolve_missing_file() {
        assert!(AnalysisConfig::resolve("/nonexistent/config.json").is_err());
    }
}
