use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::binder::BinderState;
use crate::config::{HEADER_DESCRIPTION, HEADER_TITLE};
use crate::state::{AppState, Tab};
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Header and tabs
// ---------------------------------------------------------------------------

pub fn header(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(RichText::new(HEADER_TITLE).size(32.0).strong());
        ui.label(HEADER_DESCRIPTION);
    });
    ui.add_space(6.0);
    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(&mut state.tab, Tab::Analysis, "Analysis");
        ui.selectable_value(&mut state.tab, Tab::OwnAnalysis, "Make your own analysis");
    });
}

// ---------------------------------------------------------------------------
// Filter menu – region, type, date range
// ---------------------------------------------------------------------------

/// Render the three filter controls in a row.
pub fn filter_menu(ui: &mut Ui, state: &mut AppState) {
    // Clone what we need so we can mutate state inside the closures.
    let dataset = state.binder.dataset().clone();
    let filter = state.binder.filter().clone();

    ui.horizontal(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.strong("Region");
            egui::ComboBox::from_id_salt("region-filter")
                .selected_text(&filter.city)
                .show_ui(ui, |ui: &mut Ui| {
                    ScrollArea::vertical().max_height(300.0).show(ui, |ui: &mut Ui| {
                        for city in dataset.cities() {
                            if ui.selectable_label(filter.city == *city, city).clicked() {
                                state.select_city(city);
                            }
                        }
                    });
                });
        });

        ui.add_space(16.0);

        ui.vertical(|ui: &mut Ui| {
            ui.strong("Type");
            egui::ComboBox::from_id_salt("type-filter")
                .selected_text(&filter.organic)
                .show_ui(ui, |ui: &mut Ui| {
                    for organic in dataset.organic_types() {
                        if ui.selectable_label(filter.organic == *organic, organic).clicked() {
                            state.select_organic(organic);
                        }
                    }
                });
        });

        ui.add_space(16.0);

        ui.vertical(|ui: &mut Ui| {
            ui.strong("Date Range");
            ui.horizontal(|ui: &mut Ui| {
                let mut start = filter.start_date;
                if ui
                    .add(DatePickerButton::new(&mut start).id_salt("start-date"))
                    .changed()
                {
                    state.set_start_date(start);
                }
                ui.label("→");
                let mut end = filter.end_date;
                if ui
                    .add(DatePickerButton::new(&mut end).id_salt("end-date"))
                    .changed()
                {
                    state.set_end_date(end);
                }
            });
            ui.small(format!("{} .. {}", dataset.min_date(), dataset.max_date()));
        });
    });
}

// ---------------------------------------------------------------------------
// Tab bodies
// ---------------------------------------------------------------------------

pub fn analysis_tab(ui: &mut Ui, state: &mut AppState) {
    filter_menu(ui, state);
    ui.separator();

    let charts = state.charts().clone();
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.group(|ui: &mut Ui| {
                if charts.price_chart.is_empty() {
                    ui.label("No prices for the current filters.");
                }
                plot::chart_plot(ui, "price-chart", &charts.price_chart, 280.0);
            });
            ui.add_space(8.0);
            ui.group(|ui: &mut Ui| {
                plot::scatter_with_marginals(ui, "volume-chart", &charts.volume_chart, 360.0);
            });
        });
}

pub fn own_analysis_tab(ui: &mut Ui) {
    ui.heading("Make your own analysis");
}

// ---------------------------------------------------------------------------
// Status bar
// ---------------------------------------------------------------------------

pub fn status_bar(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(state.status_line());
        if let BinderState::Recomputing(generation) = state.binder.state() {
            ui.separator();
            ui.label(RichText::new(format!("recomputing {generation}")).color(Color32::YELLOW));
        }
    });
}
