use chrono::NaiveDate;
use serde::Serialize;

use super::filter::FilterState;
use super::model::Dataset;

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

/// Per-date means over the selected rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    /// Mean `AveragePrice` over rows of this date that have a price.
    pub mean_price: f64,
    /// Mean `SalesVolume` over all selected rows of this date.
    pub mean_sales_volume: f64,
    /// Number of selected rows on this date.
    pub rows: usize,
}

/// Strictly increasing by date.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PriceSeries {
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A single plottable row of the scatter view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub average_price: f64,
    pub sales_volume: f64,
    pub year: i32,
}

/// The selected rows, unchanged, for point plotting.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScatterView {
    /// Dataset indices of every selected row, ascending.
    pub indices: Vec<usize>,
    /// One point per selected row that has a price, in `indices` order.
    pub points: Vec<ScatterPoint>,
}

impl ScatterView {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Output of [`filter_and_aggregate`]. Both views empty is a valid result.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct QueryResult {
    pub price_series: PriceSeries,
    pub scatter: ScatterView,
}

// ---------------------------------------------------------------------------
// Selection and aggregation
// ---------------------------------------------------------------------------

/// Return indices of rows matching city, type and the inclusive date interval.
///
/// Only the date-bounded slice of the (date-sorted) dataset is scanned.
pub fn selected_indices(dataset: &Dataset, filter: &FilterState) -> Vec<usize> {
    let range = dataset.date_range(filter.start_date, filter.end_date);
    let records = dataset.records();
    range
        .filter(|&i| filter.matches(&records[i]))
        .collect()
}

/// Select the matching rows and build the price series and scatter view.
///
/// Rows with a missing price are skipped when averaging and when plotting, but
/// still count towards the per-date volume mean. A date on which no selected
/// row has a price does not appear in the series.
pub fn filter_and_aggregate(dataset: &Dataset, filter: &FilterState) -> QueryResult {
    let indices = selected_indices(dataset, filter);
    let records = dataset.records();

    let points: Vec<ScatterPoint> = indices
        .iter()
        .map(|&i| &records[i])
        .filter_map(|r| {
            r.average_price.map(|price| ScatterPoint {
                average_price: price,
                sales_volume: r.sales_volume(),
                year: r.year,
            })
        })
        .collect();

    // Indices are ascending and the dataset is date-sorted, so equal dates are
    // adjacent and a single pass groups them.
    let mut series: Vec<PricePoint> = Vec::new();
    let mut group = GroupAccumulator::default();
    let mut current: Option<NaiveDate> = None;

    for &i in &indices {
        let r = &records[i];
        if current != Some(r.date) {
            if let Some(date) = current {
                series.extend(group.finish(date));
            }
            group = GroupAccumulator::default();
            current = Some(r.date);
        }
        group.push(r.average_price, r.sales_volume());
    }
    if let Some(date) = current {
        series.extend(group.finish(date));
    }

    QueryResult {
        price_series: PriceSeries { points: series },
        scatter: ScatterView { indices, points },
    }
}

#[derive(Default)]
struct GroupAccumulator {
    price_sum: f64,
    price_count: usize,
    volume_sum: f64,
    rows: usize,
}

impl GroupAccumulator {
    fn push(&mut self, price: Option<f64>, volume: f64) {
        if let Some(p) = price.filter(|p| !p.is_nan()) {
            self.price_sum += p;
            self.price_count += 1;
        }
        self.volume_sum += volume;
        self.rows += 1;
    }

    fn finish(&self, date: NaiveDate) -> Option<PricePoint> {
        if self.price_count == 0 {
            return None;
        }
        Some(PricePoint {
            date,
            mean_price: self.price_sum / self.price_count as f64,
            mean_sales_volume: self.volume_sum / self.rows as f64,
            rows: self.rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Record, TypeVolumes};
    use std::collections::BTreeSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(d: NaiveDate, city: &str, organic: &str, price: Option<f64>, vol: f64) -> Record {
        let volumes = TypeVolumes::from_array([vol, 0.0, 0.0, 0.0, 0.0, 0.0]);
        Record::new(d, city, organic, price, volumes, 2018)
    }

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            rec(date(2018, 1, 8), "Jakarta", "organic", Some(2.0), 50.0),
            rec(date(2018, 1, 1), "Jakarta", "organic", Some(1.0), 100.0),
            rec(date(2018, 1, 1), "Jakarta", "organic", Some(3.0), 200.0),
            rec(date(2018, 1, 1), "Jakarta", "conventional", Some(9.0), 1.0),
            rec(date(2018, 1, 1), "Bandung", "organic", Some(9.0), 1.0),
            rec(date(2018, 1, 15), "Jakarta", "organic", None, 10.0),
            rec(date(2018, 1, 22), "Jakarta", "organic", Some(4.0), 30.0),
            rec(date(2018, 1, 22), "Jakarta", "organic", None, 70.0),
        ])
        .unwrap()
    }

    fn filter(start: NaiveDate, end: NaiveDate) -> FilterState {
        FilterState {
            city: "Jakarta".into(),
            organic: "organic".into(),
            start_date: start,
            end_date: end,
        }
    }

    #[test]
    fn test_group_mean_per_date() {
        let ds = dataset();
        let result = filter_and_aggregate(&ds, &filter(date(2018, 1, 1), date(2018, 1, 1)));
        assert_eq!(result.price_series.points.len(), 1);
        let p = &result.price_series.points[0];
        assert_eq!(p.date, date(2018, 1, 1));
        assert!((p.mean_price - 2.0).abs() < 1e-12);
        assert!((p.mean_sales_volume - 150.0).abs() < 1e-12);
        assert_eq!(p.rows, 2);
        assert_eq!(result.scatter.points.len(), 2);
    }

    #[test]
    fn test_series_dates_strictly_increasing() {
        let ds = dataset();
        let result = filter_and_aggregate(&ds, &filter(ds.min_date(), ds.max_date()));
        let dates: Vec<NaiveDate> = result.price_series.points.iter().map(|p| p.date).collect();
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(dates, vec![date(2018, 1, 1), date(2018, 1, 8), date(2018, 1, 22)]);
    }

    #[test]
    fn test_missing_prices_are_dropped() {
        let ds = dataset();
        let result = filter_and_aggregate(&ds, &filter(date(2018, 1, 15), date(2018, 1, 22)));
        // 2018-01-15 only has a missing price, so it is omitted.
        assert_eq!(result.price_series.points.len(), 1);
        let p = &result.price_series.points[0];
        assert!((p.mean_price - 4.0).abs() < 1e-12);
        assert!((p.mean_sales_volume - 50.0).abs() < 1e-12);
        assert_eq!(result.scatter.indices.len(), 3);
        assert_eq!(result.scatter.points.len(), 1);
    }

    #[test]
    fn test_empty_selection_is_not_an_error() {
        let ds = dataset();
        let mut f = filter(ds.min_date(), ds.max_date());
        f.city = "Medan".into();
        let result = filter_and_aggregate(&ds, &f);
        assert!(result.price_series.is_empty());
        assert!(result.scatter.is_empty());
    }

    #[test]
    fn test_narrowing_range_is_monotonic() {
        let ds = dataset();
        let wide: BTreeSet<usize> =
            selected_indices(&ds, &filter(date(2018, 1, 1), date(2018, 1, 22)))
                .into_iter()
                .collect();
        for (a, b) in [
            (date(2018, 1, 1), date(2018, 1, 8)),
            (date(2018, 1, 8), date(2018, 1, 15)),
            (date(2018, 1, 2), date(2018, 1, 21)),
            (date(2018, 1, 22), date(2018, 1, 22)),
        ] {
            let narrow: BTreeSet<usize> = selected_indices(&ds, &filter(a, b)).into_iter().collect();
            assert!(narrow.is_subset(&wide), "[{a}, {b}] not contained");
        }
    }

    #[test]
    fn test_idempotent() {
        let ds = dataset();
        let f = filter(ds.min_date(), ds.max_date());
        assert_eq!(filter_and_aggregate(&ds, &f), filter_and_aggregate(&ds, &f));
    }
}
