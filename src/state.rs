use chrono::NaiveDate;

use crate::binder::{ChartSet, ReactiveBinder};
use crate::data::filter::FilterEvent;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Analysis,
    OwnAnalysis,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Filter selection and the charts published for it.
    pub binder: ReactiveBinder,

    /// Which tab is showing.
    pub tab: Tab,
}

impl AppState {
    pub fn new(binder: ReactiveBinder) -> Self {
        Self {
            binder,
            tab: Tab::Analysis,
        }
    }

    pub fn charts(&self) -> &ChartSet {
        self.binder.charts()
    }

    /// Region selector changed.
    pub fn select_city(&mut self, city: &str) {
        self.binder.handle(FilterEvent::RegionChanged(city.to_string()));
    }

    /// Type selector changed.
    pub fn select_organic(&mut self, organic: &str) {
        self.binder.handle(FilterEvent::TypeChanged(organic.to_string()));
    }

    pub fn set_start_date(&mut self, date: NaiveDate) {
        self.binder.handle(FilterEvent::StartDateChanged(date));
    }

    pub fn set_end_date(&mut self, date: NaiveDate) {
        self.binder.handle(FilterEvent::EndDateChanged(date));
    }

    /// Text for the status bar.
    pub fn status_line(&self) -> String {
        format!(
            "{} rows loaded, {} selected",
            self.binder.dataset().len(),
            self.charts().selected_rows
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Dataset, Record, TypeVolumes};
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state() -> AppState {
        let records = vec![
            Record::new(date(2017, 1, 1), "Jakarta", "organic", Some(1.0), TypeVolumes::default(), 2017),
            Record::new(date(2018, 1, 1), "Jakarta", "organic", Some(2.0), TypeVolumes::default(), 2018),
            Record::new(date(2018, 1, 1), "Medan", "conventional", Some(2.0), TypeVolumes::default(), 2018),
        ];
        let ds = Arc::new(Dataset::from_records(records).unwrap());
        AppState::new(ReactiveBinder::new(ds, "organic"))
    }

    #[test]
    fn test_controls_drive_charts() {
        let mut s = state();
        assert_eq!(s.status_line(), "3 rows loaded, 2 selected");

        s.set_start_date(date(2017, 6, 1));
        assert_eq!(s.charts().selected_rows, 1);

        s.select_city("Medan");
        s.select_organic("conventional");
        assert_eq!(s.charts().selected_rows, 1);
        assert_eq!(s.charts().filter.city, "Medan");
    }

    #[test]
    fn test_inverted_dates_are_corrected() {
        let mut s = state();
        s.set_end_date(date(2016, 1, 1));
        let f = &s.charts().filter;
        assert!(f.start_date <= f.end_date);
        assert_eq!(f.start_date, date(2017, 1, 1));
        assert_eq!(f.end_date, date(2017, 1, 1));
    }

    #[test]
    fn test_picked_dates_outside_dataset_snap_to_bounds() {
        let mut s = state();
        s.set_start_date(date(2030, 3, 1));
        let f = &s.charts().filter;
        assert_eq!((f.start_date, f.end_date), (date(2018, 1, 1), date(2018, 1, 1)));

        s.set_end_date(date(1990, 3, 1));
        let f = &s.charts().filter;
        assert_eq!((f.start_date, f.end_date), (date(2017, 1, 1), date(2017, 1, 1)));
        assert_eq!(s.binder.filter(), f);
    }
}
