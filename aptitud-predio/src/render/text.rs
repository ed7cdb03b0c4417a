//! Texte en glyphes bitmap 8x8 (ASCII et Latin-1)

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgba, RgbaImage};

/// Côté d'un glyphe en pixels avant agrandissement
pub const GLYPH_SIZE: u32 = 8;

fn glyph(ch: char) -> Option<[u8; 8]> {
    BASIC_FONTS.get(ch).or_else(|| LATIN_FONTS.get(ch))
}

/// Largeur en pixels d'un texte
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_SIZE * scale
}

/// Dessine `text` avec son coin haut-gauche en (x, y)
///
/// Les caractères sans glyphe laissent une case vide.
pub fn draw_text(image: &mut RgbaImage, x: i32, y: i32, text: &str, scale: u32, color: Rgba<u8>) {
    let scale = scale.max(1) as i32;
    let step = GLYPH_SIZE as i32 * scale;
    let (width, height) = (image.width() as i32, image.height() as i32);

    for (n, ch) in text.chars().enumerate() {
        let Some(rows) = glyph(ch) else {
            continue;
        };
        let origin_x = x + n as i32 * step;

        for (row, bits) in rows.iter().enumerate() {
            for col in 0..8 {
                // bit 0 = pixel le plus à gauche
                if bits & (1u8 << col) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let px = origin_x + col * scale + dx;
                        let py = y + row as i32 * scale + dy;
                        if px >= 0 && px < width && py >= 0 && py < height {
                            image.put_pixel(px as u32, py as u32, color);
                        }
                    }
                }
            }
        }
    }
}
