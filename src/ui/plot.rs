use std::collections::BTreeMap;
use std::f64::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Color32, ScrollArea, Stroke, Ui};
use egui_plot::{
    HLine, Legend, LineStyle, MarkerShape, Plot, PlotPoint, PlotPoints, Points, Polygon, Text,
};

use crate::color::{slice_color, ColorMap};
use crate::data::model::Outcome;
use crate::state::AppState;
use crate::view::{PieChartSpec, ScatterChartSpec};

const PIE_HEIGHT: f32 = 360.0;
const SCATTER_HEIGHT: f32 = 520.0;

/// Angular resolution of a full donut ring.
const RING_SEGMENTS: f64 = 96.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render both charts, pie above scatter.
pub fn charts(ui: &mut Ui, state: &AppState) {
    let Some(view) = state.view() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a launch table to begin  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            pie_chart(ui, &view.pie);
            ui.weak(
                "Distribution of successful launches across sites, \
                 or success vs failure for the selected site.",
            );
            ui.separator();

            scatter_chart(ui, &view.scatter, state.color_map.as_ref());
            ui.weak("Payload mass against mission outcome. Colour = booster version category.");
        });
}

// ---------------------------------------------------------------------------
// Pie (donut) chart
// ---------------------------------------------------------------------------

fn polar(radius: f64, angle: f64) -> [f64; 2] {
    [radius * angle.cos(), radius * angle.sin()]
}

/// Split an annular sector into convex quads, walking clockwise from
/// `start`. egui only fills convex polygons correctly.
fn donut_segments(start: f64, sweep: f64, inner: f64, outer: f64) -> Vec<[[f64; 2]; 4]> {
    let steps = ((sweep / TAU) * RING_SEGMENTS).ceil().max(1.0) as usize;
    let step = sweep / steps as f64;
    (0..steps)
        .map(|i| {
            let a0 = start - step * i as f64;
            let a1 = a0 - step;
            [
                polar(outer, a0),
                polar(outer, a1),
                polar(inner, a1),
                polar(inner, a0),
            ]
        })
        .collect()
}

pub fn pie_chart(ui: &mut Ui, spec: &PieChartSpec) {
    ui.heading(spec.title.as_str());

    let total = spec.model.total();
    if total == 0 {
        ui.label("No launches match this site.");
        return;
    }
    let hole = f64::from(spec.hole);
    let label_radius = (hole + 1.0) / 2.0;

    Plot::new("success_pie")
        .height(PIE_HEIGHT)
        .data_aspect(1.0)
        .include_x(-1.1)
        .include_x(1.1)
        .include_y(-1.1)
        .include_y(1.1)
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            // Start at twelve o'clock, clockwise.
            let mut start = FRAC_PI_2;
            for (i, slice) in spec.model.slices().iter().enumerate() {
                let share = slice.count as f64 / total as f64;
                let sweep = TAU * share;
                let color = slice_color(spec.palette, i, &slice.label);

                for quad in donut_segments(start, sweep, hole, 1.0) {
                    let polygon = Polygon::new(PlotPoints::new(quad.to_vec()))
                        .fill_color(color)
                        .stroke(Stroke::new(1.0, color))
                        .name(&slice.label);
                    plot_ui.polygon(polygon);
                }

                let [x, y] = polar(label_radius, start - sweep / 2.0);
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(x, y),
                        format!("{}\n{:.1}%", slice.label, share * 100.0),
                    )
                    .color(label_color(color)),
                );

                start -= sweep;
            }
        });
}

/// Dark text on light slices, light text on dark ones.
fn label_color(fill: Color32) -> Color32 {
    let luma = 0.299 * f32::from(fill.r()) + 0.587 * f32::from(fill.g()) + 0.114 * f32::from(fill.b());
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

// ---------------------------------------------------------------------------
// Scatter chart
// ---------------------------------------------------------------------------

fn marker_for(outcome: Outcome) -> MarkerShape {
    match outcome {
        Outcome::Success => MarkerShape::Circle,
        Outcome::Failure => MarkerShape::Diamond,
    }
}

pub fn scatter_chart(ui: &mut Ui, spec: &ScatterChartSpec, color_map: Option<&ColorMap>) {
    ui.heading(spec.title.as_str());

    // One series per (category, outcome): colour by category, shape by outcome.
    // Both outcomes share the category name so the legend shows one entry.
    let mut series: BTreeMap<(&str, Outcome), Vec<[f64; 2]>> = BTreeMap::new();
    for p in &spec.model.points {
        series
            .entry((p.booster_version_category.as_str(), p.outcome))
            .or_default()
            .push([p.payload_mass_kg, p.outcome.class_value()]);
    }

    let ticks = spec.y_ticks;
    let threshold = spec.reference_line_y;

    Plot::new("payload_scatter")
        .height(SCATTER_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(spec.x_label)
        .y_axis_label(spec.y_label)
        .include_x(0.0)
        .include_y(-0.25)
        .include_y(1.25)
        .y_axis_formatter(move |mark, _range| {
            ticks
                .iter()
                .find(|t| (t.value - mark.value).abs() < 1e-9)
                .map(|t| t.label.to_string())
                .unwrap_or_default()
        })
        .label_formatter(move |name, value| {
            if name.is_empty() {
                return String::new();
            }
            let outcome = if value.y >= threshold {
                Outcome::Success
            } else {
                Outcome::Failure
            };
            format!("{name}\n{:.0} kg\n{outcome}", value.x)
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.hline(
                HLine::new(spec.reference_line_y)
                    .style(LineStyle::dashed_loose())
                    .color(Color32::from_white_alpha(40)),
            );

            for ((category, outcome), points) in series {
                let color = color_map
                    .map(|cm| cm.color_for(category))
                    .unwrap_or(Color32::LIGHT_BLUE);
                plot_ui.points(
                    Points::new(PlotPoints::new(points))
                        .name(category)
                        .color(color)
                        .shape(marker_for(outcome))
                        .filled(true)
                        .radius(5.0),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f64; 2], b: [f64; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-9 && (a[1] - b[1]).abs() < 1e-9
    }

    #[test]
    fn full_ring_closes() {
        let quads = donut_segments(FRAC_PI_2, TAU, 0.4, 1.0);
        assert_eq!(quads.len(), RING_SEGMENTS as usize);
        let first = quads.first().unwrap();
        let last = quads.last().unwrap();
        // Last segment ends where the first began.
        assert!(close(last[1], first[0]));
        assert!(close(first[0], [0.0, 1.0]));
    }

    #[test]
    fn small_slice_still_drawn() {
        let quads = donut_segments(0.0, 0.001, 0.35, 1.0);
        assert_eq!(quads.len(), 1);
        for q in &quads[0][2..] {
            let r = (q[0] * q[0] + q[1] * q[1]).sqrt();
            assert!((r - 0.35).abs() < 1e-9);
        }
    }

    #[test]
    fn labels_contrast_with_fill() {
        assert_eq!(label_color(Color32::from_rgb(247, 251, 255)), Color32::BLACK);
        assert_eq!(label_color(Color32::from_rgb(8, 48, 107)), Color32::WHITE);
    }
}
