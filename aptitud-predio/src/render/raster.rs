//! Primitives raster : transformation monde → pixel, remplissage de
//! polygones par balayage, rectangles et mélange alpha

use geo::{MultiPolygon, Rect};
use image::{Rgba, RgbaImage};

/// Zone de l'image réservée à la carte (pixels)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl PlotArea {
    pub fn right(&self) -> i32 {
        self.left + self.width - 1
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height - 1
    }
}

/// Transformation coordonnées CRS → pixels, rapport d'aspect conservé, axe y inversé
#[derive(Debug, Clone, Copy)]
pub struct ViewTransform {
    scale: f64,
    origin_x: f64,
    origin_y: f64,
    min_x: f64,
    max_y: f64,
}

impl ViewTransform {
    /// Centre l'emprise dans la zone de carte. `None` si l'emprise est un point.
    pub fn fit(extent: Rect<f64>, area: PlotArea) -> Option<Self> {
        let (dx, dy) = (extent.width(), extent.height());
        let sx = if dx > 0.0 { area.width as f64 / dx } else { f64::INFINITY };
        let sy = if dy > 0.0 { area.height as f64 / dy } else { f64::INFINITY };
        let scale = sx.min(sy);
        if !scale.is_finite() || scale <= 0.0 {
            return None;
        }

        Some(Self {
            scale,
            origin_x: area.left as f64 + (area.width as f64 - dx * scale) / 2.0,
            origin_y: area.top as f64 + (area.height as f64 - dy * scale) / 2.0,
            min_x: extent.min().x,
            max_y: extent.max().y,
        })
    }

    pub fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.origin_x + (x - self.min_x) * self.scale,
            self.origin_y + (self.max_y - y) * self.scale,
        )
    }
}

/// Mélange `color` sur `base` avec l'opacité `alpha`
pub fn blend(base: Rgba<u8>, color: Rgba<u8>, alpha: f32) -> Rgba<u8> {
    let alpha = alpha.clamp(0.0, 1.0);
    let mix = |b: u8, c: u8| (b as f32 * (1.0 - alpha) + c as f32 * alpha).round() as u8;
    Rgba([
        mix(base[0], color[0]),
        mix(base[1], color[1]),
        mix(base[2], color[2]),
        255,
    ])
}

/// Remplit un multipolygone (règle pair-impair, trous compris)
///
/// Un pixel est rempli lorsque son centre est à l'intérieur.
pub fn fill_multipolygon(
    image: &mut RgbaImage,
    geometry: &MultiPolygon<f64>,
    transform: &ViewTransform,
    color: Rgba<u8>,
    alpha: f32,
) {
    let mut edges: Vec<((f64, f64), (f64, f64))> = Vec::new();
    for polygon in &geometry.0 {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            let points: Vec<(f64, f64)> = ring.0.iter().map(|c| transform.to_pixel(c.x, c.y)).collect();
            for pair in points.windows(2) {
                edges.push((pair[0], pair[1]));
            }
        }
    }
    if edges.is_empty() {
        return;
    }

    let (width, height) = (image.width() as i32, image.height() as i32);
    let y_min = edges.iter().map(|(a, b)| a.1.min(b.1)).fold(f64::INFINITY, f64::min);
    let y_max = edges.iter().map(|(a, b)| a.1.max(b.1)).fold(f64::NEG_INFINITY, f64::max);
    let row_start = (y_min.floor() as i32).max(0);
    let row_end = (y_max.ceil() as i32).min(height - 1);

    let mut crossings: Vec<f64> = Vec::new();
    for row in row_start..=row_end {
        let yc = row as f64 + 0.5;
        crossings.clear();
        for &((x0, y0), (x1, y1)) in &edges {
            // Demi-ouvert pour ne pas compter deux fois un sommet
            if (y0 <= yc && y1 > yc) || (y1 <= yc && y0 > yc) {
                crossings.push(x0 + (yc - y0) / (y1 - y0) * (x1 - x0));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));

        for span in crossings.chunks_exact(2) {
            let start = ((span[0] - 0.5).ceil() as i32).max(0);
            let end = ((span[1] - 0.5).floor() as i32).min(width - 1);
            for col in start..=end {
                let pixel = image.get_pixel_mut(col as u32, row as u32);
                *pixel = blend(*pixel, color, alpha);
            }
        }
    }
}

/// Remplit un rectangle (bornes incluses, découpé à l'image)
pub fn fill_rect(image: &mut RgbaImage, left: i32, top: i32, right: i32, bottom: i32, color: Rgba<u8>) {
    let width = image.width() as i32;
    let height = image.height() as i32;
    let left = left.clamp(0, width.saturating_sub(1));
    let right = right.clamp(0, width.saturating_sub(1));
    let top = top.clamp(0, height.saturating_sub(1));
    let bottom = bottom.clamp(0, height.saturating_sub(1));

    for y in top..=bottom {
        for x in left..=right {
            *image.get_pixel_mut(x as u32, y as u32) = color;
        }
    }
}

/// Trace le contour d'un rectangle (bornes incluses, découpé à l'image)
pub fn draw_rectangle(
    image: &mut RgbaImage,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
    color: Rgba<u8>,
) {
    let width = image.width() as i32;
    let height = image.height() as i32;
    let left = left.clamp(0, width.saturating_sub(1));
    let right = right.clamp(0, width.saturating_sub(1));
    let top = top.clamp(0, height.saturating_sub(1));
    let bottom = bottom.clamp(0, height.saturating_sub(1));

    for x in left..=right {
        *image.get_pixel_mut(x as u32, top as u32) = color;
        *image.get_pixel_mut(x as u32, bottom as u32) = color;
    }
    for y in top..=bottom {
        *image.get_pixel_mut(left as u32, y as u32) = color;
        *image.get_pixel_mut(right as u32, y as u32) = color;
    }
}
