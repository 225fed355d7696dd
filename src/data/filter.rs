use chrono::NaiveDate;
use serde::Serialize;

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Filter state: region, type and date interval
// ---------------------------------------------------------------------------

/// The current selection driving the charts.
///
/// Replaced wholesale on every interaction: the `with_*` methods return a new
/// state and never mutate in place. `start_date <= end_date` always holds for a
/// state produced by [`FilterState::clamped`] or the `with_*` methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterState {
    pub city: String,
    pub organic: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// One user interaction with the filter controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEvent {
    RegionChanged(String),
    TypeChanged(String),
    StartDateChanged(NaiveDate),
    EndDateChanged(NaiveDate),
    DateRangeChanged(NaiveDate, NaiveDate),
}

impl FilterState {
    /// Default selection: first city alphabetically, the preferred type when the
    /// dataset has it (otherwise the first discovered type), full date range.
    pub fn initial(dataset: &Dataset, preferred_organic: &str) -> Self {
        let city = dataset.cities().first().cloned().unwrap_or_default();
        let organic = dataset
            .organic_types()
            .iter()
            .find(|t| t.as_str() == preferred_organic)
            .or_else(|| dataset.organic_types().first())
            .cloned()
            .unwrap_or_default();

        FilterState {
            city,
            organic,
            start_date: dataset.min_date(),
            end_date: dataset.max_date(),
        }
    }

    /// Clamp both dates into the dataset bounds. An inverted interval collapses
    /// onto its start date.
    pub fn clamped(mut self, dataset: &Dataset) -> Self {
        let (min, max) = (dataset.min_date(), dataset.max_date());
        self.start_date = self.start_date.clamp(min, max);
        self.end_date = self.end_date.clamp(min, max);
        if self.start_date > self.end_date {
            self.end_date = self.start_date;
        }
        self
    }

    /// Apply one interaction and return the resulting state.
    ///
    /// A start date past the end date drags the end date along; an end date
    /// before the start date drags the start date along.
    pub fn apply(&self, event: &FilterEvent, dataset: &Dataset) -> Self {
        let mut next = self.clone();
        match event {
            FilterEvent::RegionChanged(city) => next.city = city.clone(),
            FilterEvent::TypeChanged(organic) => next.organic = organic.clone(),
            FilterEvent::StartDateChanged(start) => {
                next.start_date = *start;
                if next.end_date < next.start_date {
                    next.end_date = next.start_date;
                }
            }
            FilterEvent::EndDateChanged(end) => {
                next.end_date = *end;
                if next.start_date > next.end_date {
                    next.start_date = next.end_date;
                }
            }
            FilterEvent::DateRangeChanged(start, end) => {
                next.start_date = *start;
                next.end_date = *end;
            }
        }
        next.clamped(dataset)
    }

    /// Whether `record` passes all three predicates.
    pub fn matches(&self, record: &Record) -> bool {
        record.city == self.city
            && record.organic == self.organic
            && self.start_date <= record.date
            && record.date <= self.end_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::TypeVolumes;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset() -> Dataset {
        let rows = [
            (date(2017, 1, 1), "Surabaya", "conventional"),
            (date(2018, 6, 1), "Jakarta", "organic"),
            (date(2020, 12, 31), "Bandung", "organic"),
        ];
        Dataset::from_records(
            rows.iter()
                .map(|(d, c, o)| Record::new(*d, *c, *o, Some(1.0), TypeVolumes::default(), 2018))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_initial_state() {
        let ds = dataset();
        let state = FilterState::initial(&ds, "organic");
        assert_eq!(state.city, "Bandung");
        assert_eq!(state.organic, "organic");
        assert_eq!(state.start_date, date(2017, 1, 1));
        assert_eq!(state.end_date, date(2020, 12, 31));
    }

    #[test]
    fn test_initial_state_falls_back_to_first_type() {
        let ds = dataset();
        let state = FilterState::initial(&ds, "hass");
        assert_eq!(state.organic, "conventional");
    }

    #[rstest]
    #[case(date(2010, 1, 1), date(2030, 1, 1), date(2017, 1, 1), date(2020, 12, 31))]
    #[case(date(2019, 1, 1), date(2018, 1, 1), date(2019, 1, 1), date(2019, 1, 1))]
    #[case(date(2018, 1, 1), date(2019, 1, 1), date(2018, 1, 1), date(2019, 1, 1))]
    #[case(date(2025, 1, 1), date(2026, 1, 1), date(2020, 12, 31), date(2020, 12, 31))]
    fn test_clamping(
        #[case] start: NaiveDate,
        #[case] end: NaiveDate,
        #[case] want_start: NaiveDate,
        #[case] want_end: NaiveDate,
    ) {
        let ds = dataset();
        let state = FilterState {
            city: "Jakarta".into(),
            organic: "organic".into(),
            start_date: start,
            end_date: end,
        }
        .clamped(&ds);
        assert_eq!((state.start_date, state.end_date), (want_start, want_end));
    }

    #[test]
    fn test_apply_replaces_without_mutating() {
        let ds = dataset();
        let before = FilterState::initial(&ds, "organic");
        let after = before.apply(&FilterEvent::RegionChanged("Jakarta".into()), &ds);
        assert_eq!(before.city, "Bandung");
        assert_eq!(after.city, "Jakarta");
        assert_eq!(after.organic, before.organic);
        assert_eq!(after.start_date, before.start_date);
    }

    #[test]
    fn test_start_after_end_drags_end() {
        let ds = dataset();
        let state = FilterState::initial(&ds, "organic")
            .apply(&FilterEvent::EndDateChanged(date(2018, 1, 1)), &ds)
            .apply(&FilterEvent::StartDateChanged(date(2019, 1, 1)), &ds);
        assert_eq!(state.start_date, date(2019, 1, 1));
        assert_eq!(state.end_date, date(2019, 1, 1));
    }

    #[test]
    fn test_end_before_start_drags_start() {
        let ds = dataset();
        let state = FilterState::initial(&ds, "organic")
            .apply(&FilterEvent::StartDateChanged(date(2019, 1, 1)), &ds)
            .apply(&FilterEvent::EndDateChanged(date(2018, 1, 1)), &ds);
        assert_eq!(state.start_date, date(2018, 1, 1));
        assert_eq!(state.end_date, date(2018, 1, 1));
    }

    #[test]
    fn test_matches_all_predicates() {
        let ds = dataset();
        let state = FilterState {
            city: "Jakarta".into(),
            organic: "organic".into(),
            start_date: date(2018, 1, 1),
            end_date: date(2018, 12, 31),
        };
        let hits: Vec<&Record> = ds.records().iter().filter(|r| state.matches(r)).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].date, date(2018, 6, 1));
    }
}
