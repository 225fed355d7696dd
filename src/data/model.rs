use std::collections::BTreeSet;
use std::ops::Range;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::LoadError;

// ---------------------------------------------------------------------------
// TypeVolumes – the six per-type sales volume columns
// ---------------------------------------------------------------------------

/// Volume counts per avocado type. The source data has no `TypeF` column.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TypeVolumes {
    pub type_a: f64,
    pub type_b: f64,
    pub type_c: f64,
    pub type_d: f64,
    pub type_e: f64,
    pub type_g: f64,
}

impl TypeVolumes {
    /// Header names, in the order the loader reads them.
    pub const COLUMNS: [&'static str; 6] = ["TypeA", "TypeB", "TypeC", "TypeD", "TypeE", "TypeG"];

    pub fn from_array(v: [f64; 6]) -> Self {
        TypeVolumes {
            type_a: v[0],
            type_b: v[1],
            type_c: v[2],
            type_d: v[3],
            type_e: v[4],
            type_g: v[5],
        }
    }

    pub fn total(&self) -> f64 {
        self.type_a + self.type_b + self.type_c + self.type_d + self.type_e + self.type_g
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the dataset
// ---------------------------------------------------------------------------

/// One normalised row. `sales_volume` is fixed at construction and always
/// equals `volumes.total()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub date: NaiveDate,
    pub city: String,
    pub organic: String,
    /// `None` when the source cell was empty.
    pub average_price: Option<f64>,
    pub volumes: TypeVolumes,
    pub year: i32,
    sales_volume: f64,
}

impl Record {
    pub fn new(
        date: NaiveDate,
        city: impl Into<String>,
        organic: impl Into<String>,
        average_price: Option<f64>,
        volumes: TypeVolumes,
        year: i32,
    ) -> Self {
        Record {
            date,
            city: city.into(),
            organic: organic.into(),
            average_price,
            volumes,
            year,
            sales_volume: volumes.total(),
        }
    }

    pub fn sales_volume(&self) -> f64 {
        self.sales_volume
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The loaded dataset: rows sorted ascending by date, plus the option tables
/// used to populate the region and type selectors.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    cities: Vec<String>,
    organic_types: Vec<String>,
    min_date: NaiveDate,
    max_date: NaiveDate,
}

impl Dataset {
    /// Sort the rows by date and discover the option tables.
    ///
    /// The sort is stable, so rows sharing a date keep their file order.
    pub fn from_records(mut records: Vec<Record>) -> Result<Self, LoadError> {
        records.sort_by_key(|r| r.date);

        let (min_date, max_date) = match (records.first(), records.last()) {
            (Some(first), Some(last)) => (first.date, last.date),
            _ => return Err(LoadError::EmptyDataset),
        };

        let cities: Vec<String> = records
            .iter()
            .map(|r| r.city.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        // First-appearance order, not sorted.
        let mut organic_types: Vec<String> = Vec::new();
        for r in &records {
            if !organic_types.contains(&r.organic) {
                organic_types.push(r.organic.clone());
            }
        }

        Ok(Dataset {
            records,
            cities,
            organic_types,
            min_date,
            max_date,
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Distinct regions, sorted alphabetically.
    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    /// Distinct type labels in order of first appearance.
    pub fn organic_types(&self) -> &[String] {
        &self.organic_types
    }

    pub fn min_date(&self) -> NaiveDate {
        self.min_date
    }

    pub fn max_date(&self) -> NaiveDate {
        self.max_date
    }

    /// Index range of rows with `start <= date <= end`. Empty when `start > end`.
    pub fn date_range(&self, start: NaiveDate, end: NaiveDate) -> Range<usize> {
        let lo = self.records.partition_point(|r| r.date < start);
        let hi = self.records.partition_point(|r| r.date <= end);
        lo..hi.max(lo)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for a successfully built dataset.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
