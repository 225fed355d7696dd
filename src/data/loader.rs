use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Date64Type, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{Dataset, Record, TypeVolumes};
use crate::error::{LoadError, ParseError};

// ---------------------------------------------------------------------------
// Load options
// ---------------------------------------------------------------------------

pub const DATE_COLUMN: &str = "Date";
pub const CITY_COLUMN: &str = "City";
pub const PRICE_COLUMN: &str = "AveragePrice";
pub const YEAR_COLUMN: &str = "Year";
/// Accepted names for the category column, in lookup order.
pub const ORGANIC_COLUMNS: [&str; 2] = ["Organic", "type"];

/// How to read delimited text. Parquet files ignore the delimiter.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub delimiter: u8,
    /// `chrono` format string for the date column.
    pub date_format: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            delimiter: b';',
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – delimited text with a header row (semicolon by default)
/// * `.parquet` / `.pq` – the same columns stored as Parquet
///
/// The returned dataset is sorted by date with `SalesVolume` computed per row.
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" | "txt" => load_delimited(path, options)?,
        "parquet" | "pq" => load_parquet(path, options)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    let dataset = Dataset::from_records(records)?;
    log::info!(
        "Loaded {} rows from {}: {} regions, types {:?}, {} .. {}",
        dataset.len(),
        path.display(),
        dataset.cities().len(),
        dataset.organic_types(),
        dataset.min_date(),
        dataset.max_date()
    );
    Ok(dataset)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Column lookup
// ---------------------------------------------------------------------------

/// Positions of the required columns within a header. Extra columns (such as an
/// unnamed leading index column) are ignored.
struct ColumnIndex {
    date: usize,
    city: usize,
    organic: usize,
    price: usize,
    volumes: [usize; 6],
    year: usize,
}

impl ColumnIndex {
    fn from_headers<'a>(headers: impl Iterator<Item = &'a str> + Clone) -> Result<Self, LoadError> {
        let find = |name: &str| -> Result<usize, LoadError> {
            headers
                .clone()
                .position(|h| h.trim() == name)
                .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
        };

        let date = find(DATE_COLUMN)?;
        let city = find(CITY_COLUMN)?;
        let organic = ORGANIC_COLUMNS
            .iter()
            .find_map(|&name| find(name).ok())
            .ok_or_else(|| LoadError::MissingColumn(ORGANIC_COLUMNS[0].to_string()))?;
        let price = find(PRICE_COLUMN)?;

        let mut volumes = [0usize; 6];
        for (slot, name) in volumes.iter_mut().zip(TypeVolumes::COLUMNS) {
            *slot = find(name)?;
        }

        Ok(ColumnIndex {
            date,
            city,
            organic,
            price,
            volumes,
            year: find(YEAR_COLUMN)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

/// Parse a date with `format`. A trailing time component (`2018-01-01 00:00:00`
/// or `2018-01-01T00:00:00`) is accepted and dropped.
pub fn parse_date(value: &str, format: &str, row: usize) -> Result<NaiveDate, ParseError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, format)
        .or_else(|err| match value.split_once(|c: char| c == ' ' || c == 'T') {
            Some((day, _)) => NaiveDate::parse_from_str(day, format),
            None => Err(err),
        })
        .map_err(|_| ParseError::Date {
            row,
            value: value.to_string(),
            format: format.to_string(),
        })
}

fn parse_number(value: &str, column: &str, row: usize) -> Result<f64, ParseError> {
    value.trim().parse::<f64>().map_err(|_| ParseError::Number {
        row,
        column: column.to_string(),
        value: value.to_string(),
    })
}

/// Empty cells are missing prices; anything else must be numeric.
fn parse_price(value: &str, row: usize) -> Result<Option<f64>, ParseError> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    parse_number(value, PRICE_COLUMN, row).map(Some)
}

/// Integers written as floats (`2018.0`) are accepted.
fn parse_year(value: &str, row: usize) -> Result<i32, ParseError> {
    let value = value.trim();
    let err = || ParseError::Integer {
        row,
        column: YEAR_COLUMN.to_string(),
        value: value.to_string(),
    };
    value.parse::<i32>().or_else(|_| {
        let f = value.parse::<f64>().map_err(|_| err())?;
        if f.fract() == 0.0 && f.abs() < i32::MAX as f64 {
            Ok(f as i32)
        } else {
            Err(err())
        }
    })
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Layout: header row, then one record per line, `options.delimiter` between
/// fields. Row numbers in errors are 1-based and exclude the header.
fn load_delimited(path: &Path, options: &LoadOptions) -> Result<Vec<Record>, LoadError> {
    let file = open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    let cols = ColumnIndex::from_headers(headers.iter())?;

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let line = result?;
        let cell = |idx: usize| line.get(idx).unwrap_or("");

        let mut volumes = [0.0f64; 6];
        for ((slot, &idx), name) in volumes.iter_mut().zip(&cols.volumes).zip(TypeVolumes::COLUMNS) {
            *slot = parse_number(cell(idx), name, row)?;
        }

        records.push(Record::new(
            parse_date(cell(cols.date), &options.date_format, row)?,
            cell(cols.city),
            cell(cols.organic),
            parse_price(cell(cols.price), row)?,
            TypeVolumes::from_array(volumes),
            parse_year(cell(cols.year), row)?,
        ));
    }

    log::debug!("Parsed {} delimited rows from {}", records.len(), path.display());
    Ok(records)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the same columns as the delimited format.
///
/// `Date` may be a Date32/Date64/Timestamp column or a string column parsed with
/// `options.date_format`. Numeric columns of any integer/float width are cast
/// to the required type. A null price is a missing price; other nulls fail.
fn load_parquet(path: &Path, options: &LoadOptions) -> Result<Vec<Record>, LoadError> {
    let file = open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let offset = records.len();
        read_batch(&batch, options, offset, &mut records)?;
    }

    log::debug!("Parsed {} parquet rows from {}", records.len(), path.display());
    Ok(records)
}

fn read_batch(
    batch: &RecordBatch,
    options: &LoadOptions,
    offset: usize,
    out: &mut Vec<Record>,
) -> Result<(), LoadError> {
    let schema = batch.schema();
    let cols = ColumnIndex::from_headers(schema.fields().iter().map(|f| f.name().as_str()))?;

    let as_f64 = |idx: usize| cast(batch.column(idx), &DataType::Float64);
    let as_str = |idx: usize| cast(batch.column(idx), &DataType::Utf8);

    let date_col = date_column(batch.column(cols.date))?;
    let city = as_str(cols.city)?;
    let organic = as_str(cols.organic)?;
    let price = as_f64(cols.price)?;
    let year = cast(batch.column(cols.year), &DataType::Int64)?;
    let volumes: Vec<ArrayRef> = cols
        .volumes
        .iter()
        .map(|&idx| as_f64(idx))
        .collect::<Result<_, _>>()?;

    let null_cell = |row: usize, column: &str| ParseError::Number {
        row,
        column: column.to_string(),
        value: "null".to_string(),
    };

    for i in 0..batch.num_rows() {
        let row = offset + i + 1;

        let date = read_date(&date_col, i, row, options)?;

        let mut v = [0.0f64; 6];
        for ((slot, arr), name) in v.iter_mut().zip(&volumes).zip(TypeVolumes::COLUMNS) {
            if arr.is_null(i) {
                return Err(null_cell(row, name).into());
            }
            *slot = arr.as_primitive::<Float64Type>().value(i);
        }

        let average_price = if price.is_null(i) {
            None
        } else {
            Some(price.as_primitive::<Float64Type>().value(i)).filter(|p| !p.is_nan())
        };

        if year.is_null(i) {
            return Err(null_cell(row, YEAR_COLUMN).into());
        }
        let year_value = year.as_primitive::<Int64Type>().value(i);
        let year_value = i32::try_from(year_value).map_err(|_| ParseError::Integer {
            row,
            column: YEAR_COLUMN.to_string(),
            value: year_value.to_string(),
        })?;

        out.push(Record::new(
            date,
            string_cell(&city, i),
            string_cell(&organic, i),
            average_price,
            TypeVolumes::from_array(v),
            year_value,
        ));
    }
    Ok(())
}

fn string_cell(arr: &ArrayRef, i: usize) -> String {
    if arr.is_null(i) {
        String::new()
    } else {
        arr.as_string::<i32>().value(i).to_string()
    }
}

/// Timestamps (pandas writes datetime64 this way) are truncated to Date32;
/// other types pass through unchanged.
fn date_column(col: &ArrayRef) -> Result<ArrayRef, LoadError> {
    match col.data_type() {
        DataType::Timestamp(..) => Ok(cast(col, &DataType::Date32)?),
        _ => Ok(col.clone()),
    }
}

fn read_date(
    col: &ArrayRef,
    i: usize,
    row: usize,
    options: &LoadOptions,
) -> Result<NaiveDate, LoadError> {
    let bad = |value: String| ParseError::Date {
        row,
        value,
        format: options.date_format.clone(),
    };
    if col.is_null(i) {
        return Err(bad("null".to_string()).into());
    }
    let date = match col.data_type() {
        DataType::Date32 => col.as_primitive::<Date32Type>().value_as_date(i),
        DataType::Date64 => col.as_primitive::<Date64Type>().value_as_date(i),
        DataType::Utf8 => {
            return Ok(parse_date(col.as_string::<i32>().value(i), &options.date_format, row)?)
        }
        DataType::LargeUtf8 => {
            return Ok(parse_date(col.as_string::<i64>().value(i), &options.date_format, row)?)
        }
        other => {
            return Err(LoadError::ColumnType {
                column: DATE_COLUMN.to_string(),
                data_type: format!("{other:?}"),
            })
        }
    };
    date.ok_or_else(|| bad(format!("{:?}", col.data_type())).into())
}
