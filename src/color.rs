use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Team colours
// ---------------------------------------------------------------------------

/// Stable team → colour assignment for the whole dataset, so a club keeps
/// its colour when the filter changes.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    pub fn new(teams: &[String]) -> Self {
        let mapping = teams
            .iter()
            .cloned()
            .zip(generate_palette(teams.len()))
            .collect();
        ColorMap { mapping }
    }

    pub fn color_for(&self, team: &str) -> Color32 {
        self.mapping.get(team).copied().unwrap_or(Color32::GRAY)
    }
}
