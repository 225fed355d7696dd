use eframe::egui;

use crate::binder::ReactiveBinder;
use crate::state::{AppState, Tab};
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    /// Wire the binder to the window: every publish schedules a repaint.
    pub fn new(cc: &eframe::CreationContext<'_>, mut binder: ReactiveBinder) -> Self {
        let ctx = cc.egui_ctx.clone();
        binder.subscribe(move |_charts| ctx.request_repaint());
        Self {
            state: AppState::new(binder),
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: header and tabs ----
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            panels::header(ui, &mut self.state);
        });

        // ---- Bottom panel: status ----
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            panels::status_bar(ui, &self.state);
        });

        // ---- Central panel: filters and charts ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.tab {
            Tab::Analysis => panels::analysis_tab(ui, &mut self.state),
            Tab::OwnAnalysis => panels::own_analysis_tab(ui),
        });
    }
}
