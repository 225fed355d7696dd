use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate, TimeDelta};
use parquet::arrow::ArrowWriter;

const CITIES: [(&str, f64); 8] = [
    ("Bandung", 1.00),
    ("Denpasar", 1.18),
    ("Jakarta", 1.12),
    ("Makassar", 0.92),
    ("Medan", 0.95),
    ("Semarang", 0.97),
    ("Surabaya", 1.05),
    ("Yogyakarta", 0.90),
];
const TYPES: [(&str, f64, f64); 2] = [("organic", 1.55, 0.08), ("conventional", 1.10, 1.0)];
const VOLUME_COLUMNS: [&str; 6] = ["TypeA", "TypeB", "TypeC", "TypeD", "TypeE", "TypeG"];
const VOLUME_SHARES: [f64; 6] = [0.32, 0.38, 0.05, 0.15, 0.08, 0.02];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Row {
    date: NaiveDate,
    price: f64,
    volumes: [f64; 6],
    organic: &'static str,
    year: i32,
    city: &'static str,
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    let first = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap_or_default();
    let last = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap_or_default();

    let mut rows = Vec::new();
    let mut date = first;
    while date <= last {
        // Yearly seasonality: prices peak around September.
        let season = (2.0 * std::f64::consts::PI * (date.ordinal() as f64 - 75.0) / 365.0).sin();
        for &(city, city_factor) in &CITIES {
            for &(organic, base_price, volume_factor) in &TYPES {
                let price = (base_price * city_factor + 0.15 * season + rng.gauss(0.0, 0.06)).max(0.4);
                let total = (250_000.0 * city_factor * volume_factor / price) * rng.gauss(1.0, 0.12).max(0.2);
                let mut volumes = [0.0; 6];
                for (v, share) in volumes.iter_mut().zip(VOLUME_SHARES) {
                    *v = (total * share * rng.gauss(1.0, 0.05).max(0.0)).round();
                }
                rows.push(Row {
                    date,
                    price: (price * 100.0).round() / 100.0,
                    volumes,
                    organic,
                    year: date.year(),
                    city,
                });
            }
        }
        date += TimeDelta::days(7);
    }
    rows
}

/// Semicolon-delimited with a leading unnamed index column.
fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec!["", "Date", "AveragePrice"];
    header.extend(VOLUME_COLUMNS);
    header.extend(["Organic", "Year", "City"]);
    writer.write_record(&header)?;

    for (i, r) in rows.iter().enumerate() {
        let mut record = vec![i.to_string(), r.date.to_string(), format!("{:.2}", r.price)];
        record.extend(r.volumes.iter().map(|v| format!("{v:.0}")));
        record.extend([r.organic.to_string(), r.year.to_string(), r.city.to_string()]);
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let epoch = NaiveDate::default();

    let mut fields = vec![
        Field::new("Date", DataType::Date32, false),
        Field::new("AveragePrice", DataType::Float64, true),
    ];
    fields.extend(VOLUME_COLUMNS.iter().map(|name| Field::new(*name, DataType::Float64, false)));
    fields.extend([
        Field::new("Organic", DataType::Utf8, false),
        Field::new("Year", DataType::Int64, false),
        Field::new("City", DataType::Utf8, false),
    ]);
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(Date32Array::from_iter_values(
            rows.iter().map(|r| (r.date - epoch).num_days() as i32),
        )),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.price))),
    ];
    for j in 0..VOLUME_COLUMNS.len() {
        columns.push(Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.volumes[j]))));
    }
    columns.push(Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.organic))));
    columns.push(Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.year as i64))));
    columns.push(Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.city))));

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    let dir = Path::new("data_input");
    std::fs::create_dir_all(dir).context("creating data_input/")?;

    let csv_path = dir.join("alpukat_fix.csv");
    write_csv(&csv_path, &rows)?;
    let parquet_path = dir.join("alpukat_fix.parquet");
    write_parquet(&parquet_path, &rows)?;

    println!(
        "Wrote {} rows ({} regions x {} types, weekly 2017-2020) to {} and {}",
        rows.len(),
        CITIES.len(),
        TYPES.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
