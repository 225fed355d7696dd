//! Avocado price and sales analytics: a date-sorted in-memory dataset, a
//! region/type/date filter, and two charts recomputed whenever the filter changes.

pub mod app;
pub mod binder;
pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod state;
pub mod ui;

pub use binder::{BinderState, ChartSet, ReactiveBinder};
pub use data::filter::{FilterEvent, FilterState};
pub use data::loader::{load_file, LoadOptions};
pub use data::model::{Dataset, Record};
pub use data::query::{filter_and_aggregate, PriceSeries, QueryResult, ScatterView};
pub use error::{LoadError, ParseError};
