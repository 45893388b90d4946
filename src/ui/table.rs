use eframe::egui::{Align, Layout, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{CellValue, VehicleListing};

const ROW_HEIGHT: f32 = 18.0;
const MAX_TABLE_HEIGHT: f32 = 320.0;

/// Draw listings as a striped table with a leading row-number column.
pub fn listings_table(ui: &mut Ui, columns: &[String], rows: &[&VehicleListing]) {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(MAX_TABLE_HEIGHT)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::auto().at_least(32.0))
        .columns(Column::auto().at_least(60.0).clip(true), columns.len())
        .header(22.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            for name in columns {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                let idx = row.index();
                let listing = rows[idx];
                row.col(|ui| {
                    ui.label(RichText::new(idx.to_string()).weak());
                });
                for cell in &listing.cells {
                    row.col(|ui| {
                        if matches!(cell, CellValue::Null) {
                            ui.label(RichText::new("–").weak());
                        } else {
                            ui.label(cell.to_string());
                        }
                    });
                }
            });
        });
}
