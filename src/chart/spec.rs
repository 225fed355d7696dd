use chrono::NaiveDate;
use serde::Serialize;

use crate::color::Rgb;

// ---------------------------------------------------------------------------
// Axes and data points
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    Linear,
    Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisId {
    X,
    Y,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub label: String,
    pub scale: Scale,
}

impl Axis {
    pub fn linear(label: &str) -> Self {
        Axis {
            label: label.to_string(),
            scale: Scale::Linear,
        }
    }

    pub fn time(label: &str) -> Self {
        Axis {
            label: label.to_string(),
            scale: Scale::Time,
        }
    }
}

/// An x coordinate: a calendar date on time axes, a number otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum XValue {
    Date(NaiveDate),
    Number(f64),
}

impl XValue {
    /// Numeric position; dates map to days since 1970-01-01.
    pub fn as_f64(&self) -> f64 {
        match self {
            XValue::Number(v) => *v,
            XValue::Date(d) => days_since_epoch(*d) as f64,
        }
    }
}

pub fn days_since_epoch(date: NaiveDate) -> i64 {
    (date - NaiveDate::default()).num_days()
}

/// Inverse of [`days_since_epoch`], rounding to the nearest day.
pub fn date_from_days(days: f64) -> Option<NaiveDate> {
    if !days.is_finite() || days.abs() > 3.0e6 {
        return None;
    }
    NaiveDate::default().checked_add_signed(chrono::TimeDelta::days(days.round() as i64))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: XValue,
    pub y: f64,
}

// ---------------------------------------------------------------------------
// Series, marginals, legend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    Line,
    Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub mark: Mark,
    pub color: Rgb,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Counts of one group over bin edges shared by every trace of the marginal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramTrace {
    pub name: String,
    pub color: Rgb,
    pub bins: Vec<HistogramBin>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DensityPoint {
    pub value: f64,
    pub density: f64,
}

/// Distribution summary of one group: five-number summary plus a kernel
/// density estimate evaluated on a grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolinTrace {
    pub name: String,
    pub color: Rgb,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub bandwidth: f64,
    pub density: Vec<DensityPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Marginal {
    Histogram {
        axis: AxisId,
        traces: Vec<HistogramTrace>,
    },
    Violin {
        axis: AxisId,
        traces: Vec<ViolinTrace>,
    },
}

impl Marginal {
    pub fn axis(&self) -> AxisId {
        match self {
            Marginal::Histogram { axis, .. } | Marginal::Violin { axis, .. } => *axis,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgb,
}

/// Colour legend for the field that splits the series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub field: String,
    pub entries: Vec<LegendEntry>,
}

// ---------------------------------------------------------------------------
// ChartSpec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Scatter,
}

/// A declarative, backend-agnostic chart: axes, data and encodings, no pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: Option<String>,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub series: Vec<Series>,
    pub marginals: Vec<Marginal>,
    pub legend: Option<Legend>,
}

impl ChartSpec {
    /// Total number of data points across all series.
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    /// True when there is nothing to plot (a valid state, e.g. empty selection).
    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }

    pub fn marginal(&self, axis: AxisId) -> Option<&Marginal> {
        self.marginals.iter().find(|m| m.axis() == axis)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_days_roundtrip() {
        let d = NaiveDate::from_ymd_opt(2018, 1, 7).unwrap();
        let x = XValue::Date(d).as_f64();
        assert_eq!(x, 17538.0);
        assert_eq!(date_from_days(x), Some(d));
        assert_eq!(date_from_days(f64::NAN), None);
    }

    #[test]
    fn test_json_shape() {
        let spec = ChartSpec {
            kind: ChartKind::Line,
            title: None,
            x_axis: Axis::time("Date"),
            y_axis: Axis::linear("AveragePrice"),
            series: vec![Series {
                name: "AveragePrice".into(),
                mark: Mark::Line,
                color: Rgb(1, 2, 3),
                points: vec![Point {
                    x: XValue::Date(NaiveDate::from_ymd_opt(2018, 1, 1).unwrap()),
                    y: 2.0,
                }],
            }],
            marginals: vec![],
            legend: None,
        };
        let json: serde_json::Value = serde_json::from_str(&spec.to_json().unwrap()).unwrap();
        assert_eq!(json["kind"], "line");
        assert_eq!(json["x_axis"]["scale"], "time");
        assert_eq!(json["series"][0]["color"], "#010203");
        assert_eq!(json["series"][0]["points"][0]["x"], "2018-01-01");
        assert_eq!(json["series"][0]["points"][0]["y"], 2.0);
        assert!(!spec.is_empty());
    }
}
