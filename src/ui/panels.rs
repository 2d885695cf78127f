use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, SliderClamping, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::outcome_color;
use crate::data::filter::{PayloadRange, SiteSelection};
use crate::data::model::{DatasetSummary, Outcome, SLIDER_STEP_KG};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – controls and summary
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Controls");
    ui.separator();

    let Some(dashboard) = &state.dashboard else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state below.
    let sites = dashboard.dataset().sites().to_vec();
    let selection = dashboard.selection().clone();
    let slider_max = dashboard.dataset().bounds().slider_max();
    let summary = dashboard.summary().clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Site dropdown ----
            ui.strong("Launch Site");
            let mut site = selection.site.clone();
            egui::ComboBox::from_id_salt("site_dropdown")
                .selected_text(site.label().to_string())
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    ui.selectable_value(&mut site, SiteSelection::All, SiteSelection::All.label());
                    for s in &sites {
                        ui.selectable_value(&mut site, SiteSelection::Site(s.clone()), s.as_str());
                    }
                });
            if site != selection.site {
                state.select_site(site);
            }
            ui.add_space(8.0);

            // ---- Payload range: two handles that cannot cross ----
            // Clamp and snap only on edits, so an off-grid initial bound is
            // left alone until the user moves it.
            ui.strong("Payload range (kg)");
            let PayloadRange { mut low, mut high } = selection.payload_range;
            let low_changed = ui
                .add(
                    Slider::new(&mut low, 0.0..=slider_max)
                        .step_by(SLIDER_STEP_KG)
                        .clamping(SliderClamping::Edits)
                        .text("from"),
                )
                .changed();
            let high_changed = ui
                .add(
                    Slider::new(&mut high, 0.0..=slider_max)
                        .step_by(SLIDER_STEP_KG)
                        .clamping(SliderClamping::Edits)
                        .text("to"),
                )
                .changed();
            if low_changed || high_changed {
                if low > high {
                    if low_changed {
                        high = low;
                    } else {
                        low = high;
                    }
                }
                state.set_payload_range(low, high);
            }

            ui.add_space(4.0);
            if ui.button("Reset filters").clicked() {
                state.reset_selection();
            }
            ui.add_space(4.0);
            ui.weak("Pick a site to focus on it, and narrow the payload range to zoom in.");
            ui.separator();

            summary_table(ui, &summary);
        });
}

fn summary_table(ui: &mut Ui, summary: &DatasetSummary) {
    ui.strong("Summary");
    ui.label(format!(
        "{} launches, {} successful ({:.1}%)",
        summary.launches,
        summary.successes,
        summary.success_rate() * 100.0
    ));
    ui.label(format!(
        "Payload {:.0} to {:.0} kg",
        summary.bounds.min, summary.bounds.max
    ));
    ui.add_space(4.0);

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::remainder())
        .columns(Column::auto(), 3)
        .header(20.0, |mut header| {
            for title in ["Site", "Launches", "Successes", "Rate"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for site in &summary.per_site {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(site.site.as_str());
                    });
                    row.col(|ui| {
                        ui.label(site.launches.to_string());
                    });
                    row.col(|ui| {
                        ui.label(
                            RichText::new(site.successes.to_string())
                                .color(outcome_color(Outcome::Success)),
                        );
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.0}%", site.success_rate() * 100.0));
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.dashboard.is_some(), egui::Button::new("Export view…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(dashboard) = &state.dashboard {
            ui.label(format!(
                "{} launches loaded, {} in scatter",
                dashboard.dataset().len(),
                dashboard.view().scatter.model.len()
            ));
        }
        if let Some(path) = &state.data_path {
            ui.label(RichText::new(path.display().to_string()).weak());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open launch records")
        .add_filter("Supported files", &["csv", "tsv", "parquet", "pq"])
        .add_filter("CSV", &["csv", "tsv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(&path);
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export current view")
        .add_filter("JSON", &["json"])
        .set_file_name("launch-dash-view.json")
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_view(&path) {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
