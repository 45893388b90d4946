use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::cleaner::{CleanReport, DropReason};
use crate::data::filter::{BinCount, DateRange};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – interaction controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Controls");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Posting date range ----
            ui.strong("Posting date");
            date_range_controls(ui, state);
            ui.separator();

            // ---- Table ----
            ui.checkbox(&mut state.show_full_table, "Show full table");
            ui.separator();

            // ---- Histogram ----
            ui.strong("Histogram bins");
            let mut bins = state.bins.get();
            if ui
                .add(egui::Slider::new(&mut bins, BinCount::MIN..=BinCount::MAX))
                .changed()
            {
                state.set_bins(bins);
            }
            ui.separator();

            if ui.button("Show quick conclusion").clicked() {
                state.reveal_conclusion();
            }
            ui.separator();

            summary(ui, state);
        });
}

fn date_range_controls(ui: &mut Ui, state: &mut AppState) {
    let Some((first, last)) = state.dataset.as_ref().and_then(|ds| ds.date_span()) else {
        ui.label(RichText::new("No posting dates in this dataset.").weak());
        return;
    };

    let mut start = state.date_range.start.unwrap_or(first);
    let mut end = state.date_range.end.unwrap_or(last);
    let mut changed = false;

    egui::Grid::new("date_range")
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            ui.label("From");
            changed |= ui
                .add(DatePickerButton::new(&mut start).id_salt("date_start"))
                .changed();
            ui.end_row();

            ui.label("To");
            changed |= ui
                .add(DatePickerButton::new(&mut end).id_salt("date_end"))
                .changed();
            ui.end_row();
        });

    if changed {
        state.set_date_range(DateRange::new(start, end));
    }
    if ui.small_button("Full range").clicked() {
        state.reset_date_range();
    }
}

fn summary(ui: &mut Ui, state: &AppState) {
    let Some(s) = state.view().and_then(|v| v.summary()) else {
        ui.label(RichText::new("No listings in the selected range.").weak());
        return;
    };

    ui.strong("Summary");
    egui::Grid::new("view_summary")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            let mut row = |label: &str, value: String| {
                ui.label(label);
                ui.label(value);
                ui.end_row();
            };
            row("Listings", s.count.to_string());
            row("Min price", format!("${:.0}", s.price_min));
            row("Median price", format!("${:.0}", s.price_median));
            row("Mean price", format!("${:.0}", s.price_mean));
            row("Max price", format!("${:.0}", s.price_max));
            row("Mean odometer", format!("{:.0}", s.odometer_mean));
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
                .add_enabled(state.source_path.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                if let Err(e) = state.reload() {
                    log::error!("Failed to reload: {e:#}");
                    state.status_message = Some(format!("Error: {e:#}"));
                }
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} listings loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
            ui.separator();
            let report = &ds.report;
            ui.label(RichText::new(format!("{} rows dropped", report.dropped_total())).weak())
                .on_hover_ui(|ui: &mut Ui| drop_report(ui, report));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

fn drop_report(ui: &mut Ui, report: &CleanReport) {
    ui.label(format!("Kept {} of {} rows", report.kept, report.raw_rows));
    egui::Grid::new("drop_report")
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            for reason in DropReason::ALL {
                let n = report.count(reason);
                if n > 0 {
                    ui.label(reason.to_string());
                    ui.label(n.to_string());
                    ui.end_row();
                }
            }
        });
    if report.unparsed_dates > 0 {
        ui.label(format!("{} unparsable posting dates cleared", report.unparsed_dates));
    }
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open vehicle listings")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.load_source(&path) {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
