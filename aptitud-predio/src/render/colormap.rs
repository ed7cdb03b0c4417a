//! Palette viridis et conversion des couleurs

use image::Rgba;

/// Points de contrôle de viridis (0, 0.25, 0.5, 0.75, 1)
const VIRIDIS: [[f64; 3]; 5] = [
    [68.0, 1.0, 84.0],
    [59.0, 82.0, 139.0],
    [33.0, 145.0, 140.0],
    [94.0, 201.0, 98.0],
    [253.0, 231.0, 37.0],
];

/// Couleur viridis pour `t` dans [0, 1] (interpolation linéaire)
pub fn viridis(t: f64) -> Rgba<u8> {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - i as f64;

    let (lo, hi) = (VIRIDIS[i], VIRIDIS[i + 1]);
    let channel = |c: usize| (lo[c] + (hi[c] - lo[c]) * frac).round() as u8;
    Rgba([channel(0), channel(1), channel(2), 255])
}

/// Une couleur par catégorie : la i-ème des n reçoit viridis(i / (n - 1))
pub fn category_colors(count: usize) -> Vec<Rgba<u8>> {
    match count {
        0 => Vec::new(),
        1 => vec![viridis(0.0)],
        n => (0..n).map(|i| viridis(i as f64 / (n - 1) as f64)).collect(),
    }
}

/// Convertit `#rrggbb` en couleur opaque (canal illisible = 0)
pub fn hex_to_rgba(hex: &str) -> Rgba<u8> {
    let hex = hex.trim_start_matches('#');
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    Rgba([channel(0), channel(2), channel(4), 255])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viridis_endpoints() {
        assert_eq!(viridis(0.0), Rgba([68, 1, 84, 255]));
        assert_eq!(viridis(1.0), Rgba([253, 231, 37, 255]));
        assert_eq!(viridis(0.5), Rgba([33, 145, 140, 255]));
        assert_eq!(viridis(-3.0), viridis(0.0));
    }

    #[test]
    fn test_category_colors() {
        assert!(category_colors(0).is_empty());
        assert_eq!(category_colors(1), vec![viridis(0.0)]);

        let three = category_colors(3);
        assert_eq!(three[0], viridis(0.0));
        assert_eq!(three[1], viridis(0.5));
        assert_eq!(three[2], viridis(1.0));
    }

    #[test]
    fn test_hex_to_rgba() {
        assert_eq!(hex_to_rgba("#ffffff"), Rgba([255, 255, 255, 255]));
        assert_eq!(hex_to_rgba("333333"), Rgba([51, 51, 51, 255]));
        assert_eq!(hex_to_rgba("#12"), Rgba([18, 0, 0, 255]));
    }
}
