use eframe::egui::{self, Color32, Ui};

use crate::config::AppConfig;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TwinsViewerApp {
    pub state: AppState,
}

impl TwinsViewerApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for TwinsViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar and title ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: controls ----
        egui::SidePanel::left("settings_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: footer ----
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            panels::footer(ui);
        });

        // ---- Central panel: two charts side by side ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(dash) = &self.state.dashboard else {
                let text = self
                    .state
                    .notice
                    .as_deref()
                    .or(self.state.status_message.as_deref())
                    .unwrap_or("No data loaded.");
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.colored_label(Color32::from_rgb(230, 160, 30), text);
                });
                return;
            };

            egui::ScrollArea::vertical().show(ui, |ui: &mut Ui| {
                ui.columns(2, |cols| {
                    plot::chart_panel(&mut cols[0], &dash.gene);
                    plot::chart_panel(&mut cols[1], &dash.stress);
                });
            });
        });
    }
}
