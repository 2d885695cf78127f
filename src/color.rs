use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Outcome;
use crate::view::SlicePalette;

/// Sequential blue ramp, light to dark, for the all-sites pie.
pub const BLUES: [Color32; 9] = [
    Color32::from_rgb(247, 251, 255),
    Color32::from_rgb(222, 235, 247),
    Color32::from_rgb(198, 219, 239),
    Color32::from_rgb(158, 202, 225),
    Color32::from_rgb(107, 174, 214),
    Color32::from_rgb(66, 146, 198),
    Color32::from_rgb(33, 113, 181),
    Color32::from_rgb(8, 81, 156),
    Color32::from_rgb(8, 48, 107),
];

pub const SUCCESS_COLOR: Color32 = Color32::from_rgb(0x00, 0xE5, 0xFF);
pub const FAILURE_COLOR: Color32 = Color32::from_rgb(0x16, 0x32, 0x4A);

pub fn outcome_color(outcome: Outcome) -> Color32 {
    match outcome {
        Outcome::Success => SUCCESS_COLOR,
        Outcome::Failure => FAILURE_COLOR,
    }
}

/// Colour for the `index`-th slice of a pie.
pub fn slice_color(palette: SlicePalette, index: usize, label: &str) -> Color32 {
    match palette {
        SlicePalette::SequentialBlues => BLUES[index % BLUES.len()],
        SlicePalette::Outcome if label == Outcome::Failure.label() => FAILURE_COLOR,
        SlicePalette::Outcome => SUCCESS_COLOR,
    }
}

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
// Color mapping: booster category → Color32
// ---------------------------------------------------------------------------

/// Maps booster version categories to distinct colours. Built once per
/// dataset so a category keeps its colour while filters change.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new(categories: &BTreeSet<String>) -> Self {
        let palette = generate_palette(categories.len());
        let mapping = categories.iter().cloned().zip(palette).collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, category: &str) -> Color32 {
        self.mapping
            .get(category)
            .copied()
            .unwrap_or(self.default_color)
    }
}
