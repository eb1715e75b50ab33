use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::color::ColorMap;
use crate::pipeline::{ChartSpec, Panel};
use crate::ui::table;

const PLOT_HEIGHT: f32 = 360.0;

// ---------------------------------------------------------------------------
// Chart panels (central area, one per dataset)
// ---------------------------------------------------------------------------

/// Render one dashboard panel: subheader, chart or error, data preview.
pub fn chart_panel(ui: &mut Ui, panel: &Panel) {
    ui.heading(panel.subheader.as_str());

    match &panel.chart {
        Ok(spec) => {
            ui.label(RichText::new(spec.title.as_str()).strong());
            if spec.point_count() == 0 {
                ui.weak("No data points in the selected range.");
            }
            line_chart(ui, kind_id(panel), spec);
        }
        Err(e) => {
            ui.colored_label(Color32::RED, e.to_string());
            return;
        }
    }

    ui.add_space(4.0);
    egui::CollapsingHeader::new(format!("Data ({} rows)", panel.rows.len()))
        .id_salt(("rows", kind_id(panel)))
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            table::rows_table(ui, &panel.rows);
        });
}

fn kind_id(panel: &Panel) -> &'static str {
    panel.kind.category_column()
}

/// Draw every series as a line with a marker at each point.
fn line_chart(ui: &mut Ui, id: &str, spec: &ChartSpec) {
    let color_map = ColorMap::new(spec.series.iter().filter_map(|s| s.name.as_deref()));
    let named = spec.series.iter().any(|s| s.name.is_some());

    let mut plot = Plot::new(("chart", id))
        .height(PLOT_HEIGHT)
        .x_axis_label(spec.x_label.as_str())
        .y_axis_label(spec.y_label.as_str())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    if named {
        plot = plot.legend(Legend::default());
    }

    plot.show(ui, |plot_ui| {
        for series in &spec.series {
            let color = color_map.color_for(series.name.as_deref());
            let name = series.name.clone().unwrap_or_default();

            let line = Line::new(PlotPoints::from(series.points.clone()))
                .name(&name)
                .color(color)
                .width(1.5);
            plot_ui.line(line);

            let markers = Points::new(PlotPoints::from(series.points.clone()))
                .name(&name)
                .color(color)
                .radius(3.0);
            plot_ui.points(markers);
        }
    });
}
