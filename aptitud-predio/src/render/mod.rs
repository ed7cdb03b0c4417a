//! Rendu de l'intersection en carte raster
//!
//! Polygones remplis par catégorie (viridis, semi-transparents), titre,
//! cadre de la carte et légende. Le format de sortie suit l'extension
//! du fichier (PNG par défaut).

mod colormap;
mod raster;
mod text;

pub use colormap::{category_colors, hex_to_rgba, viridis};

use std::collections::BTreeSet;
use std::path::Path;

use capa::FeatureCollection;
use geo::{coord, BoundingRect, Rect};
use image::{Rgba, RgbaImage};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::RenderConfig;
use raster::{PlotArea, ViewTransform};

/// Erreurs du rendu
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Category field '{field}' not found in the intersection result")]
    MissingCategory { field: String },

    #[error("Nothing to draw: the intersection result has no extent")]
    EmptyExtent,

    #[error("Invalid image size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Dessine la carte et l'enregistre dans `path`
pub fn render_map(
    collection: &FeatureCollection,
    category_field: &str,
    config: &RenderConfig,
    path: &Path,
) -> Result<(), RenderError> {
    let image = draw_map(collection, category_field, config)?;
    image.save(path)?;

    info!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "Carte enregistrée"
    );
    Ok(())
}

/// Dessine la carte en mémoire
pub fn draw_map(
    collection: &FeatureCollection,
    category_field: &str,
    config: &RenderConfig,
) -> Result<RgbaImage, RenderError> {
    if !collection.has_field(category_field) {
        return Err(RenderError::MissingCategory {
            field: category_field.to_string(),
        });
    }
    if config.width == 0 || config.height == 0 {
        return Err(RenderError::InvalidSize {
            width: config.width,
            height: config.height,
        });
    }
    let extent = collection_extent(collection).ok_or(RenderError::EmptyExtent)?;

    let categories: Vec<String> = collection
        .features
        .iter()
        .map(|f| f.property(category_field))
        .filter(|v| !v.is_null())
        .map(|v| v.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let colors = category_colors(categories.len());
    debug!(categories = categories.len(), "Catégories de la légende");

    let background = hex_to_rgba(&config.background);
    let ink = hex_to_rgba(&config.frame_color);
    let scale = config.glyph_scale.max(1);

    let layout = Layout::new(config, &categories, scale);
    let transform = ViewTransform::fit(extent, layout.plot).ok_or(RenderError::EmptyExtent)?;
    let mut image = RgbaImage::from_pixel(config.width, config.height, background);

    for feature in &collection.features {
        let value = feature.property(category_field);
        if value.is_null() {
            continue;
        }
        let label = value.to_string();
        let Ok(i) = categories.binary_search(&label) else {
            continue;
        };
        raster::fill_multipolygon(&mut image, &feature.geometry, &transform, colors[i], config.fill_alpha);
    }

    let plot = layout.plot;
    raster::draw_rectangle(
        &mut image,
        plot.left - 1,
        plot.top - 1,
        plot.right() + 1,
        plot.bottom() + 1,
        ink,
    );

    let title_x = (config.width as i32 - text::text_width(&config.title, scale) as i32) / 2;
    text::draw_text(&mut image, title_x.max(0), layout.title_y, &config.title, scale, ink);

    draw_legend(&mut image, &layout, &categories, &colors, config, background, ink);

    Ok(image)
}

/// Position des éléments de la carte
struct Layout {
    plot: PlotArea,
    title_y: i32,
    legend_left: i32,
    legend_top: i32,
    legend_width: i32,
    line: i32,
}

impl Layout {
    fn new(config: &RenderConfig, categories: &[String], scale: u32) -> Self {
        let (width, height) = (config.width as i32, config.height as i32);
        let line = (text::GLYPH_SIZE * scale) as i32;
        let margin = 2 * line;

        let label_width = categories
            .iter()
            .map(|c| text::text_width(c, scale) as i32)
            .max()
            .unwrap_or(0);
        let legend_width = if categories.is_empty() {
            0
        } else {
            line + label_width + 3 * (line / 2)
        };

        let title_y = margin / 2;
        let top = title_y + line + margin / 2;
        let left = margin;
        let right = width - margin - legend_width - if legend_width > 0 { margin / 2 } else { 0 };
        let bottom = height - margin;

        let plot = PlotArea {
            left: left.clamp(0, (width - 1).max(0)),
            top: top.clamp(0, (height - 1).max(0)),
            width: (right - left + 1).max(1),
            height: (bottom - top + 1).max(1),
        };

        Self {
            plot,
            title_y,
            legend_left: width - margin - legend_width,
            legend_top: top,
            legend_width,
            line,
        }
    }
}

fn draw_legend(
    image: &mut RgbaImage,
    layout: &Layout,
    categories: &[String],
    colors: &[Rgba<u8>],
    config: &RenderConfig,
    background: Rgba<u8>,
    ink: Rgba<u8>,
) {
    if categories.is_empty() {
        return;
    }
    let scale = config.glyph_scale.max(1);
    let line = layout.line;
    let gap = line / 2;
    let (left, top) = (layout.legend_left, layout.legend_top);
    let bottom = top + gap + categories.len() as i32 * (line + gap);

    raster::fill_rect(image, left, top, left + layout.legend_width, bottom, background);
    raster::draw_rectangle(image, left, top, left + layout.legend_width, bottom, ink);

    for (i, (label, color)) in categories.iter().zip(colors).enumerate() {
        let y = top + gap + i as i32 * (line + gap);
        let swatch = raster::blend(background, *color, config.fill_alpha);
        raster::fill_rect(image, left + gap, y, left + gap + line - 1, y + line - 1, swatch);
        raster::draw_rectangle(image, left + gap, y, left + gap + line - 1, y + line - 1, ink);
        text::draw_text(image, left + 2 * gap + line, y, label, scale, ink);
    }
}

/// Emprise de toutes les géométries de la couche
fn collection_extent(collection: &FeatureCollection) -> Option<Rect<f64>> {
    collection
        .features
        .iter()
        .filter_map(|f| f.geometry.bounding_rect())
        .reduce(|a, b| {
            Rect::new(
                coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use capa::{AttributeValue, Feature};
    use geo::{polygon, MultiPolygon};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0),
            (x: x1, y: y0),
            (x: x1, y: y1),
            (x: x0, y: y1),
        ]])
    }

    fn two_zones() -> FeatureCollection {
        let mut fc = FeatureCollection::new(None);
        fc.push(Feature::new(rect(0.0, 0.0, 50.0, 100.0)).with_property("Descripcio", "Apta"));
        fc.push(Feature::new(rect(50.0, 0.0, 100.0, 100.0)).with_property("Descripcio", "No apta"));
        fc
    }

    fn pixel_at(image: &RgbaImage, layout: &Layout, extent: Rect<f64>, x: f64, y: f64) -> Rgba<u8> {
        let t = ViewTransform::fit(extent, layout.plot).unwrap();
        let (px, py) = t.to_pixel(x, y);
        *image.get_pixel(px as u32, py as u32)
    }

    #[test]
    fn test_pixels_carry_category_color() {
        let fc = two_zones();
        let config = RenderConfig::default();
        let image = draw_map(&fc, "Descripcio", &config).unwrap();

        let categories = vec!["Apta".to_string(), "No apta".to_string()];
        let layout = Layout::new(&config, &categories, config.glyph_scale);
        let extent = collection_extent(&fc).unwrap();
        let white = Rgba([255, 255, 255, 255]);

        assert_eq!(
            pixel_at(&image, &layout, extent, 25.0, 50.0),
            raster::blend(white, viridis(0.0), 0.5)
        );
        assert_eq!(
            pixel_at(&image, &layout, extent, 75.0, 50.0),
            raster::blend(white, viridis(1.0), 0.5)
        );
        assert_eq!(*image.get_pixel(1, config.height - 2), white);
    }

    #[test]
    fn test_null_category_is_not_drawn() {
        let mut fc = FeatureCollection::new(None);
        fc.push(Feature::new(rect(0.0, 0.0, 10.0, 10.0)).with_property("Descripcio", AttributeValue::Null));
        fc.push(Feature::new(rect(20.0, 0.0, 30.0, 10.0)).with_property("Descripcio", "Apta"));

        let config = RenderConfig::default();
        let image = draw_map(&fc, "Descripcio", &config).unwrap();

        let layout = Layout::new(&config, &["Apta".to_string()], config.glyph_scale);
        let extent = collection_extent(&fc).unwrap();
        assert_eq!(pixel_at(&image, &layout, extent, 5.0, 5.0), Rgba([255, 255, 255, 255]));
        assert_ne!(pixel_at(&image, &layout, extent, 25.0, 5.0), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_missing_category_field() {
        let err = draw_map(&two_zones(), "Aptitud", &RenderConfig::default()).unwrap_err();
        assert!(matches!(err, RenderError::MissingCategory { field } if field == "Aptitud"));
    }

    #[test]
    fn test_empty_extent() {
        let mut fc = FeatureCollection::new(None);
        fc.add_field("Descripcio");
        let err = draw_map(&fc, "Descripcio", &RenderConfig::default()).unwrap_err();
        assert!(matches!(err, RenderError::EmptyExtent));
    }

    #[test]
    fn test_invalid_size() {
        let config = RenderConfig {
            width: 0,
            ..RenderConfig::default()
        };
        let err = draw_map(&two_zones(), "Descripcio", &config).unwrap_err();
        assert!(matches!(err, RenderError::InvalidSize { width: 0, .. }));
    }

    #[test]
    fn test_render_map_writes_png() {
        let path = std::env::temp_dir().join("aptitud_predio_render_test.png");
        let _ = std::fs::remove_file(&path);

        render_map(&two_zones(), "Descripcio", &RenderConfig::default(), &path).unwrap();

        let written = image::open(&path).unwrap();
        assert_eq!(written.width(), 1000);
        assert_eq!(written.height(), 1000);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_unknown_extension_fails() {
        let path = std::env::temp_dir().join("aptitud_predio_render_test.xyz");
        let err = render_map(&two_zones(), "Descripcio", &RenderConfig::default(), &path).unwrap_err();
        assert!(matches!(err, RenderError::Image(_)));
    }
}
