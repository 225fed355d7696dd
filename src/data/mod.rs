/// Data layer: records, loading, filter state and the query engine.
///
/// Architecture:
/// ```text
///  .csv (;) / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse rows, coerce dates, SalesVolume
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record> sorted by date, option tables
///   └──────────┘
///        │        ◄── FilterState (region, type, date range)
///        ▼
///   ┌──────────┐
///   │  query    │  select rows → PriceSeries + ScatterView
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod query;
