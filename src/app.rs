use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::panels;
use crate::ui::render::{render_dashboard, EguiRenderer};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct VehicleDashboardApp {
    pub state: AppState,
}

impl VehicleDashboardApp {
    /// Build the app and load the configured source right away.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        state.load_configured_source();
        Self { state }
    }
}

impl eframe::App for VehicleDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: controls ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: table and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.dataset.is_none() {
                empty_dashboard(ui, &self.state);
                return;
            }
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    ui.heading("Used vehicle listings");
                    ui.label(
                        "Listings were cleaned to keep consistent prices, mileages and model \
                         years. Use the controls on the left to explore how price relates to \
                         age and mileage.",
                    );
                    ui.add_space(8.0);
                    render_dashboard(&self.state, &mut EguiRenderer { ui });
                });
        });
    }
}

fn empty_dashboard(ui: &mut Ui, state: &AppState) {
    ui.centered_and_justified(|ui: &mut Ui| match &state.status_message {
        Some(msg) => {
            ui.label(RichText::new(msg).color(Color32::RED).size(16.0));
        }
        None => {
            ui.heading("Open a listings file to begin  (File → Open…)");
        }
    });
}
