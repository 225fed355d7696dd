use std::ops::RangeInclusive;

use eframe::egui::{Color32, Id, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotBounds,
    PlotPoint, PlotPoints, Points,
};

use crate::chart::spec::{date_from_days, AxisId, ChartSpec, Marginal, Mark, Scale};
use crate::color::Rgb;

const MARGIN_SIZE: f32 = 110.0;

fn color32(c: Rgb) -> Color32 {
    Color32::from_rgb(c.0, c.1, c.2)
}

fn date_tick(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    date_from_days(mark.value)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Main chart area (line or scatter)
// ---------------------------------------------------------------------------

/// Draw the series of a chart spec into a plot of the given height and return
/// the bounds it was shown with.
pub fn chart_plot(ui: &mut Ui, id: &str, spec: &ChartSpec, height: f32) -> PlotBounds {
    let mut plot = Plot::new(id)
        .height(height)
        .legend(Legend::default())
        .x_axis_label(spec.x_axis.label.clone())
        .y_axis_label(spec.y_axis.label.clone())
        .link_axis(Id::new(id).with("x"), [true, false])
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    if spec.x_axis.scale == Scale::Time {
        let x_label = spec.x_axis.label.clone();
        plot = plot
            .x_axis_formatter(date_tick)
            .label_formatter(move |name: &str, value: &PlotPoint| {
                let day = date_from_days(value.x)
                    .map(|d| d.to_string())
                    .unwrap_or_default();
                if name.is_empty() {
                    format!("{x_label}: {day}\n{:.3}", value.y)
                } else {
                    format!("{name}\n{x_label}: {day}\n{:.3}", value.y)
                }
            });
    }

    let response = plot.show(ui, |plot_ui| {
        for series in &spec.series {
            let points: PlotPoints = series
                .points
                .iter()
                .map(|p| [p.x.as_f64(), p.y])
                .collect();
            match series.mark {
                Mark::Line => plot_ui.line(
                    Line::new(points)
                        .name(&series.name)
                        .color(color32(series.color))
                        .width(1.5),
                ),
                Mark::Point => plot_ui.points(
                    Points::new(points)
                        .name(&series.name)
                        .color(color32(series.color))
                        .radius(3.0),
                ),
            }
        }
    });
    *response.transform.bounds()
}

/// Bounds for the violin strip: the main plot's y range, one unit of x per trace.
///
/// egui_plot keeps a single link group per plot and the main plot's is taken
/// by the histogram's x link, so the y range is copied over explicitly.
fn violin_bounds(main: &PlotBounds, traces: usize) -> Option<PlotBounds> {
    if !main.is_valid_y() {
        return None;
    }
    let y = main.range_y();
    Some(PlotBounds::from_min_max(
        [-0.5, *y.start()],
        [traces.max(1) as f64 - 0.5, *y.end()],
    ))
}

// ---------------------------------------------------------------------------
// Scatter with marginals
// ---------------------------------------------------------------------------

/// Histogram strip above the scatter, violin strip to its right.
pub fn scatter_with_marginals(ui: &mut Ui, id: &str, spec: &ChartSpec, height: f32) {
    if let Some(title) = &spec.title {
        ui.strong(title);
    }
    if spec.is_empty() {
        ui.label("No rows match the current filters.");
    }

    let group = Id::new(id).with("x");

    if let Some(Marginal::Histogram { traces, .. }) = spec.marginal(AxisId::X) {
        Plot::new(format!("{id}_hist"))
            .height(MARGIN_SIZE)
            .width((ui.available_width() - MARGIN_SIZE).max(100.0))
            .link_axis(group, [true, false])
            .show_x(false)
            .allow_drag(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                let mut charts: Vec<BarChart> = Vec::new();
                for trace in traces {
                    let bars: Vec<Bar> = trace
                        .bins
                        .iter()
                        .map(|b| {
                            Bar::new((b.start + b.end) / 2.0, b.count as f64)
                                .width(b.end - b.start)
                                .fill(color32(trace.color))
                        })
                        .collect();
                    let chart = {
                        let below: Vec<&BarChart> = charts.iter().collect();
                        BarChart::new(bars)
                            .name(&trace.name)
                            .color(color32(trace.color))
                            .stack_on(&below)
                    };
                    charts.push(chart);
                }
                for chart in charts {
                    plot_ui.bar_chart(chart);
                }
            });
    }

    ui.horizontal(|ui: &mut Ui| {
        let main_width = (ui.available_width() - MARGIN_SIZE).max(100.0);
        let main_bounds = ui
            .allocate_ui(eframe::egui::vec2(main_width, height), |ui: &mut Ui| {
                chart_plot(ui, id, spec, height)
            })
            .inner;

        if let Some(Marginal::Violin { traces, .. }) = spec.marginal(AxisId::Y) {
            Plot::new(format!("{id}_violin"))
                .height(height)
                .width(MARGIN_SIZE)
                .show_y(false)
                .allow_drag(false)
                .allow_scroll(false)
                .allow_zoom(false)
                .allow_boxed_zoom(false)
                .allow_double_click_reset(false)
                .show(ui, |plot_ui| {
                    if let Some(bounds) = violin_bounds(&main_bounds, traces.len()) {
                        plot_ui.set_plot_bounds(bounds);
                    }
                    for (i, trace) in traces.iter().enumerate() {
                        let center = i as f64;
                        let color = color32(trace.color);
                        let peak = trace
                            .density
                            .iter()
                            .map(|d| d.density)
                            .fold(0.0_f64, f64::max);

                        if peak > 0.0 && trace.density.len() > 1 {
                            for side in [-1.0, 1.0] {
                                let outline: PlotPoints = trace
                                    .density
                                    .iter()
                                    .map(|d| [center + side * 0.4 * d.density / peak, d.value])
                                    .collect();
                                plot_ui.line(Line::new(outline).color(color).width(1.0));
                            }
                        }

                        let elem = BoxElem::new(
                            center,
                            BoxSpread::new(trace.min, trace.q1, trace.median, trace.q3, trace.max),
                        )
                        .box_width(0.15)
                        .fill(color.gamma_multiply(0.5))
                        .name(&trace.name);
                        plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&trace.name).color(color));
                    }
                });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violin_shares_main_y_range() {
        let main = PlotBounds::from_min_max([17_000.0, 0.8], [18_000.0, 3.2]);
        let violin = violin_bounds(&main, 3).unwrap();
        assert_eq!(violin.range_y(), main.range_y());
        assert_eq!(violin.range_x(), -0.5..=2.5);
    }

    #[test]
    fn test_violin_bounds_skip_invalid_main_range() {
        assert!(violin_bounds(&PlotBounds::NOTHING, 2).is_none());
    }
}
