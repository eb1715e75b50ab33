use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::model::Table;

const ROW_HEIGHT: f32 = 18.0;

/// Scrollable preview of the rows behind a chart.
pub fn rows_table(ui: &mut Ui, table: &Table) {
    if table.columns.is_empty() || table.is_empty() {
        ui.weak("No rows.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(200.0)
        .columns(Column::auto().at_least(60.0), table.columns.len())
        .header(ROW_HEIGHT + 2.0, |mut header| {
            for name in &table.columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(name.as_str());
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, table.len(), |mut row| {
                let i = row.index();
                for j in 0..table.columns.len() {
                    row.col(|ui: &mut Ui| {
                        ui.label(table.cell(i, j).to_string());
                    });
                }
            });
        });
}
