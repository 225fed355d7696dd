use std::collections::BTreeMap;

use super::spec::{
    Axis, AxisId, ChartKind, ChartSpec, DensityPoint, HistogramBin, HistogramTrace, Legend,
    LegendEntry, Marginal, Mark, Point, Series, ViolinTrace, XValue,
};
use crate::color::{Rgb, YearColorMap};
use crate::data::query::{PriceSeries, ScatterPoint, ScatterView};

pub const PRICE_X_LABEL: &str = "Date";
pub const PRICE_Y_LABEL: &str = "AveragePrice";

pub const VOLUME_TITLE: &str = "Perbandingan Harga Rata - Rata Alpukat Dengan Volume Penjualan";
pub const VOLUME_X_LABEL: &str = "Harga Rata - Rata";
pub const VOLUME_Y_LABEL: &str = "Volume Penjualan";
pub const COLOR_FIELD: &str = "Year";

/// Number of grid points each violin density is evaluated on.
pub const VIOLIN_GRID_POINTS: usize = 50;

// ---------------------------------------------------------------------------
// Price chart
// ---------------------------------------------------------------------------

/// Line chart of mean price over time: one series, x = date, y = mean price.
pub fn render_price_chart(series: &PriceSeries) -> ChartSpec {
    let points = series
        .points
        .iter()
        .map(|p| Point {
            x: XValue::Date(p.date),
            y: p.mean_price,
        })
        .collect();

    ChartSpec {
        kind: ChartKind::Line,
        title: None,
        x_axis: Axis::time(PRICE_X_LABEL),
        y_axis: Axis::linear(PRICE_Y_LABEL),
        series: vec![Series {
            name: PRICE_Y_LABEL.to_string(),
            mark: Mark::Line,
            color: Rgb::LINE,
            points,
        }],
        marginals: Vec::new(),
        legend: None,
    }
}

// ---------------------------------------------------------------------------
// Volume chart
// ---------------------------------------------------------------------------

/// Scatter of price against sales volume, coloured by year, with a histogram
/// of prices on the x margin and a violin of volumes on the y margin.
///
/// One series (and one marginal trace each) per year, ascending. An empty view
/// yields a chart with axes and title but no series or marginals.
pub fn render_volume_chart(view: &ScatterView) -> ChartSpec {
    let mut by_year: BTreeMap<i32, Vec<ScatterPoint>> = BTreeMap::new();
    for p in &view.points {
        by_year.entry(p.year).or_default().push(*p);
    }
    let colors = YearColorMap::new(by_year.keys().copied());

    let series: Vec<Series> = by_year
        .iter()
        .map(|(year, pts)| Series {
            name: year.to_string(),
            mark: Mark::Point,
            color: colors.color_for(*year),
            points: pts
                .iter()
                .map(|p| Point {
                    x: XValue::Number(p.average_price),
                    y: p.sales_volume,
                })
                .collect(),
        })
        .collect();

    let mut marginals = Vec::new();
    if !view.points.is_empty() {
        let prices: Vec<f64> = view.points.iter().map(|p| p.average_price).collect();
        let edges = bin_edges(&prices);

        let histograms = by_year
            .iter()
            .map(|(year, pts)| {
                let values: Vec<f64> = pts.iter().map(|p| p.average_price).collect();
                HistogramTrace {
                    name: year.to_string(),
                    color: colors.color_for(*year),
                    bins: histogram(&values, &edges),
                }
            })
            .collect();
        marginals.push(Marginal::Histogram {
            axis: AxisId::X,
            traces: histograms,
        });

        let violins = by_year
            .iter()
            .filter_map(|(year, pts)| {
                let values: Vec<f64> = pts.iter().map(|p| p.sales_volume).collect();
                violin(&year.to_string(), colors.color_for(*year), &values)
            })
            .collect();
        marginals.push(Marginal::Violin {
            axis: AxisId::Y,
            traces: violins,
        });
    }

    let legend = (!by_year.is_empty()).then(|| Legend {
        field: COLOR_FIELD.to_string(),
        entries: colors
            .legend_entries()
            .into_iter()
            .map(|(label, color)| LegendEntry { label, color })
            .collect(),
    });

    ChartSpec {
        kind: ChartKind::Scatter,
        title: Some(VOLUME_TITLE.to_string()),
        x_axis: Axis::linear(VOLUME_X_LABEL),
        y_axis: Axis::linear(VOLUME_Y_LABEL),
        series,
        marginals,
        legend,
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Equal-width bin edges spanning `values`, bin count by Sturges' rule.
/// A single distinct value gets one unit-wide bin centred on it.
pub fn bin_edges(values: &[f64]) -> Vec<f64> {
    let (min, max) = min_max(values);
    if values.is_empty() {
        return Vec::new();
    }
    if max <= min {
        return vec![min - 0.5, max + 0.5];
    }
    let bins = ((values.len() as f64).log2().ceil() as usize + 1).max(1);
    let width = (max - min) / bins as f64;
    (0..=bins).map(|i| min + width * i as f64).collect()
}

/// Count `values` into the bins described by `edges`. Bins are half-open
/// except the last, which includes its upper edge.
pub fn histogram(values: &[f64], edges: &[f64]) -> Vec<HistogramBin> {
    if edges.len() < 2 {
        return Vec::new();
    }
    let n = edges.len() - 1;
    let mut counts = vec![0usize; n];
    for &v in values {
        if v < edges[0] || v > edges[n] {
            continue;
        }
        let idx = edges[1..].partition_point(|&e| e <= v).min(n - 1);
        counts[idx] += 1;
    }
    edges
        .windows(2)
        .zip(counts)
        .map(|(w, count)| HistogramBin {
            start: w[0],
            end: w[1],
            count,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Violin (quartiles + Gaussian KDE)
// ---------------------------------------------------------------------------

/// Summary and density of one group; `None` for an empty group.
pub fn violin(name: &str, color: Rgb, values: &[f64]) -> Option<ViolinTrace> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let (min, max) = (sorted[0], sorted[sorted.len() - 1]);
    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);

    let bandwidth = silverman_bandwidth(&sorted, q3 - q1);
    let density = if bandwidth > 0.0 {
        let lo = min - 2.0 * bandwidth;
        let hi = max + 2.0 * bandwidth;
        let step = (hi - lo) / (VIOLIN_GRID_POINTS - 1) as f64;
        (0..VIOLIN_GRID_POINTS)
            .map(|i| {
                let value = lo + step * i as f64;
                DensityPoint {
                    value,
                    density: gaussian_kde(&sorted, bandwidth, value),
                }
            })
            .collect()
    } else {
        // Every value identical: a point mass.
        vec![DensityPoint {
            value: min,
            density: 1.0,
        }]
    };

    Some(ViolinTrace {
        name: name.to_string(),
        color,
        min,
        q1,
        median,
        q3,
        max,
        bandwidth,
        density,
    })
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Silverman's rule of thumb. Zero when the sample has no spread.
fn silverman_bandwidth(values: &[f64], iqr: f64) -> f64 {
    let n = values.len() as f64;
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let sd = var.sqrt();
    let spread = match (sd > 0.0, iqr > 0.0) {
        (true, true) => sd.min(iqr / 1.34),
        (true, false) => sd,
        (false, true) => iqr / 1.34,
        (false, false) => return 0.0,
    };
    0.9 * spread * n.powf(-0.2)
}

fn gaussian_kde(values: &[f64], bandwidth: f64, at: f64) -> f64 {
    let norm = 1.0 / (values.len() as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    values
        .iter()
        .map(|v| {
            let u = (at - v) / bandwidth;
            (-0.5 * u * u).exp()
        })
        .sum::<f64>()
        * norm
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::query::PricePoint;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scatter(points: &[(f64, f64, i32)]) -> ScatterView {
        ScatterView {
            indices: (0..points.len()).collect(),
            points: points
                .iter()
                .map(|&(average_price, sales_volume, year)| ScatterPoint {
                    average_price,
                    sales_volume,
                    year,
                })
                .collect(),
        }
    }

    #[test]
    fn test_price_chart() {
        let series = PriceSeries {
            points: vec![
                PricePoint { date: date(2018, 1, 1), mean_price: 2.0, mean_sales_volume: 150.0, rows: 2 },
                PricePoint { date: date(2018, 1, 8), mean_price: 1.5, mean_sales_volume: 10.0, rows: 1 },
            ],
        };
        let spec = render_price_chart(&series);
        assert_eq!(spec.kind, ChartKind::Line);
        assert_eq!(spec.x_axis.label, "Date");
        assert_eq!(spec.y_axis.label, "AveragePrice");
        assert_eq!(spec.series.len(), 1);
        assert_eq!(spec.series[0].points[0].x, XValue::Date(date(2018, 1, 1)));
        assert_eq!(spec.series[0].points[1].y, 1.5);
    }

    #[test]
    fn test_empty_inputs_give_empty_charts() {
        let price = render_price_chart(&PriceSeries::default());
        assert!(price.is_empty());
        let volume = render_volume_chart(&ScatterView::default());
        assert!(volume.is_empty());
        assert!(volume.series.is_empty());
        assert!(volume.marginals.is_empty());
        assert!(volume.legend.is_none());
        assert_eq!(volume.title.as_deref(), Some(VOLUME_TITLE));
    }

    #[test]
    fn test_volume_chart_splits_by_year() {
        let spec = render_volume_chart(&scatter(&[
            (1.0, 100.0, 2019),
            (3.0, 200.0, 2018),
            (2.0, 150.0, 2019),
        ]));
        let names: Vec<&str> = spec.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["2018", "2019"]);
        assert_eq!(spec.point_count(), 3);
        assert_ne!(spec.series[0].color, spec.series[1].color);
        assert_eq!(spec.x_axis.label, VOLUME_X_LABEL);
        assert_eq!(spec.y_axis.label, VOLUME_Y_LABEL);

        let legend = spec.legend.as_ref().unwrap();
        assert_eq!(legend.field, "Year");
        assert_eq!(legend.entries.len(), 2);

        match spec.marginal(AxisId::X) {
            Some(Marginal::Histogram { traces, .. }) => {
                assert_eq!(traces.len(), 2);
                let total: usize = traces.iter().flat_map(|t| &t.bins).map(|b| b.count).sum();
                assert_eq!(total, 3);
                assert_eq!(traces[0].bins.len(), traces[1].bins.len());
            }
            other => panic!("expected x histogram, got {other:?}"),
        }
        assert!(matches!(spec.marginal(AxisId::Y), Some(Marginal::Violin { traces, .. }) if traces.len() == 2));
    }

    #[rstest]
    #[case(1, 2)]
    #[case(2, 3)]
    #[case(8, 5)]
    #[case(9, 6)]
    fn test_sturges_edges(#[case] n: usize, #[case] expected_edges: usize) {
        let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
        assert_eq!(bin_edges(&values).len(), expected_edges);
    }

    #[test]
    fn test_histogram_includes_max_in_last_bin() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0];
        let edges = bin_edges(&values);
        let bins = histogram(&values, &edges);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 5);
        assert!(bins.last().unwrap().count >= 1);
        assert_eq!(bins.first().unwrap().start, 0.0);
        assert_eq!(bins.last().unwrap().end, 4.0);
    }

    #[test]
    fn test_quantiles() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.0), 1.0);
        assert_eq!(quantile(&sorted, 0.5), 2.5);
        assert_eq!(quantile(&sorted, 0.25), 1.75);
        assert_eq!(quantile(&sorted, 1.0), 4.0);
    }

    #[test]
    fn test_violin_density_is_normalised() {
        let values: Vec<f64> = (0..40).map(|i| (i as f64 * 0.37).sin() * 10.0 + 50.0).collect();
        let v = violin("2018", Rgb::GRAY, &values).unwrap();
        assert_eq!(v.density.len(), VIOLIN_GRID_POINTS);
        assert!(v.min <= v.q1 && v.q1 <= v.median && v.median <= v.q3 && v.q3 <= v.max);
        // Trapezoidal integral over min-2h..max+2h is close to, but below, one.
        let area: f64 = v
            .density
            .windows(2)
            .map(|w| (w[1].value - w[0].value) * (w[0].density + w[1].density) / 2.0)
            .sum();
        assert!(area > 0.9 && area < 1.01, "area = {area}");
    }

    #[test]
    fn test_violin_degenerate_samples() {
        let single = violin("x", Rgb::GRAY, &[5.0]).unwrap();
        assert_eq!(single.bandwidth, 0.0);
        assert_eq!(single.density.len(), 1);
        assert_eq!(single.median, 5.0);

        let same = violin("x", Rgb::GRAY, &[2.0, 2.0, 2.0]).unwrap();
        assert_eq!(same.density.len(), 1);
        assert!(violin("x", Rgb::GRAY, &[]).is_none());
    }
}
