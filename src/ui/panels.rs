use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::loader::Upload;
use crate::data::model::{CellValue, DatasetKind};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – controls
// ---------------------------------------------------------------------------

/// Render the left settings panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Settings");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Spaceflight duration ----
            ui.strong("Spaceflight Duration (days)");
            let mut days = state.days_in_space;
            let slider = egui::Slider::new(&mut days, 0..=state.config.max_days);
            if ui.add(slider).changed() {
                state.set_days(days);
            }
            ui.add_space(4.0);

            // ---- Source mode ----
            let mut use_uploader = state.use_uploader;
            if ui.checkbox(&mut use_uploader, "Use CSV Uploader").changed() {
                state.set_use_uploader(use_uploader);
            }
            if state.use_uploader {
                for kind in [DatasetKind::GeneExpression, DatasetKind::OxidativeStress] {
                    upload_row(ui, state, kind);
                }
            }

            for warning in &state.source_warnings {
                ui.colored_label(Color32::from_rgb(230, 160, 30), warning.as_str());
            }
            ui.separator();

            // ---- Variable selection ----
            egui::CollapsingHeader::new(RichText::new("Select Variables").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    selector(ui, state, DatasetKind::GeneExpression, "Select Gene");
                    selector(ui, state, DatasetKind::OxidativeStress, "Select Oxidative Marker");
                });
        });
}

/// Pick / clear button pair for one dataset in upload mode.
fn upload_row(ui: &mut Ui, state: &mut AppState, kind: DatasetKind) {
    ui.horizontal(|ui: &mut Ui| {
        if ui.button(format!("Upload {} CSV…", kind.label())).clicked() {
            open_upload_dialog(state, kind);
        }
        if state.upload(kind).is_some() && ui.small_button("Clear").clicked() {
            state.set_upload(kind, None);
        }
    });
    match state.upload(kind) {
        Some(upload) => ui.label(format!("  {}", upload.name)),
        None => ui.weak("  no file"),
    };
}

/// Combo box over the distinct category values of one dataset.
fn selector(ui: &mut Ui, state: &mut AppState, kind: DatasetKind, label: &str) {
    let Some(dash) = &state.dashboard else {
        return;
    };
    let panel = match kind {
        DatasetKind::GeneExpression => &dash.gene,
        DatasetKind::OxidativeStress => &dash.stress,
    };
    // Clone what we need so we can mutate state on click.
    let options: Vec<CellValue> = panel.options.clone();
    let current = panel.selected.clone();
    let current_text = current.as_ref().map(|v| v.to_string()).unwrap_or_default();

    ui.label(label);
    let mut picked = None;
    egui::ComboBox::from_id_salt(kind.category_column())
        .selected_text(current_text)
        .width(ui.available_width() - 8.0)
        .show_ui(ui, |ui: &mut Ui| {
            for value in &options {
                let is_current = current.as_ref() == Some(value);
                if ui.selectable_label(is_current, value.to_string()).clicked() && !is_current {
                    picked = Some(value.clone());
                }
            }
        });
    if options.is_empty() {
        ui.weak(format!("'{}' column missing", kind.category_column()));
    }
    if let Some(value) = picked {
        state.select(kind, value);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Reload data").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(dash) = &state.dashboard {
            ui.label(format!(
                "{} gene rows, {} marker rows up to day {}",
                dash.gene.rows.len(),
                dash.stress.rows.len(),
                dash.days_in_space
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg.as_str()).color(Color32::RED));
        }
    });
    ui.heading("Gene Expression & Oxidative Stress vs Spaceflight Duration");
}

// ---------------------------------------------------------------------------
// Footer
// ---------------------------------------------------------------------------

pub fn footer(ui: &mut Ui) {
    ui.label(
        RichText::new(
            "Prepare 'gene_expression.csv' with columns ['Timepoint','Twin','Gene','Expression'] \
             and 'oxidative_stress.csv' with ['Timepoint','Marker','Value'].",
        )
        .italics(),
    );
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_upload_dialog(state: &mut AppState, kind: DatasetKind) {
    let file = rfd::FileDialog::new()
        .set_title(format!("Upload {} CSV", kind.label()))
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    let Some(path) = file else {
        return;
    };
    match Upload::from_path(&path) {
        Ok(upload) => {
            log::info!("Picked {} for {}", upload.name, kind.label());
            state.set_upload(kind, Some(upload));
        }
        Err(e) => {
            log::error!("Failed to read upload: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
