use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, Srgb};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Rgb – backend-neutral colour
// ---------------------------------------------------------------------------

/// An sRGB colour. Serialises as `"#rrggbb"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const GRAY: Rgb = Rgb(160, 160, 160);
    pub const LINE: Rgb = Rgb(99, 110, 250);

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hex())
    }
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Rgb(
                (rgb.red * 255.0).round() as u8,
                (rgb.green * 255.0).round() as u8,
                (rgb.blue * 255.0).round() as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Year → colour mapping
// ---------------------------------------------------------------------------

/// Maps each distinct year to a colour, in ascending year order.
#[derive(Debug, Clone)]
pub struct YearColorMap {
    mapping: BTreeMap<i32, Rgb>,
}

impl YearColorMap {
    pub fn new(years: impl IntoIterator<Item = i32>) -> Self {
        let unique: std::collections::BTreeSet<i32> = years.into_iter().collect();
        let palette = generate_palette(unique.len());
        YearColorMap {
            mapping: unique.into_iter().zip(palette).collect(),
        }
    }

    pub fn color_for(&self, year: i32) -> Rgb {
        self.mapping.get(&year).copied().unwrap_or(Rgb::GRAY)
    }

    /// Legend entries (year label → colour).
    pub fn legend_entries(&self) -> Vec<(String, Rgb)> {
        self.mapping
            .iter()
            .map(|(y, c)| (y.to_string(), *c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_is_distinct() {
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        for i in 0..p.len() {
            for j in (i + 1)..p.len() {
                assert_ne!(p[i], p[j]);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn test_year_map_is_stable_and_sorted() {
        let a = YearColorMap::new([2019, 2017, 2018, 2017]);
        let b = YearColorMap::new([2017, 2018, 2019]);
        let labels: Vec<String> = a.legend_entries().into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, ["2017", "2018", "2019"]);
        assert_eq!(a.color_for(2018), b.color_for(2018));
        assert_eq!(a.color_for(1999), Rgb::GRAY);
    }

    #[test]
    fn test_hex() {
        assert_eq!(Rgb(255, 0, 16).hex(), "#ff0010");
    }
}
