use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// One generated row.
struct Row {
    work_year: i64,
    experience_level: &'static str,
    employment_type: &'static str,
    job_title: &'static str,
    salary_in_usd: f64,
    remote_ratio: &'static str,
    company_size: &'static str,
    employee_residence_iso3: &'static str,
}

const YEARS: [i64; 4] = [2022, 2023, 2024, 2025];
// (level, salary multiplier)
const LEVELS: [(&str, f64); 4] = [
    ("junior", 0.6),
    ("pleno", 0.9),
    ("senior", 1.25),
    ("executivo", 1.7),
];
const EMPLOYMENT: [&str; 3] = ["integral", "contrato", "parcial"];
const MODALITIES: [&str; 3] = ["presencial", "hibrido", "remoto"];
const SIZES: [&str; 3] = ["pequena", "media", "grande"];
// (title, base salary in USD)
const JOBS: [(&str, f64); 12] = [
    ("Data Scientist", 140_000.0),
    ("Data Engineer", 135_000.0),
    ("Data Analyst", 95_000.0),
    ("Machine Learning Engineer", 160_000.0),
    ("Research Scientist", 170_000.0),
    ("Analytics Engineer", 125_000.0),
    ("Data Architect", 150_000.0),
    ("BI Developer", 90_000.0),
    ("Applied Scientist", 175_000.0),
    ("Head of Data", 210_000.0),
    ("Data Manager", 120_000.0),
    ("AI Engineer", 165_000.0),
];
// (ISO3, cost factor)
const COUNTRIES: [(&str, f64); 8] = [
    ("USA", 1.0),
    ("CAN", 0.85),
    ("GBR", 0.8),
    ("DEU", 0.78),
    ("ESP", 0.6),
    ("BRA", 0.35),
    ("IND", 0.3),
    ("PRT", 0.55),
];

fn generate_rows(n: usize, rng: &mut SimpleRng) -> Vec<Row> {
    (0..n)
        .map(|_| {
            let work_year = *rng.pick(&YEARS);
            let &(experience_level, level_factor) = rng.pick(&LEVELS);
            let &(job_title, base) = rng.pick(&JOBS);
            let &(iso3, country_factor) = rng.pick(&COUNTRIES);
            let year_factor = 1.0 + 0.04 * (work_year - YEARS[0]) as f64;
            let mean = base * level_factor * country_factor * year_factor;
            let salary = rng.gauss(mean, mean * 0.15).max(15_000.0).round();

            Row {
                work_year,
                experience_level,
                employment_type: *rng.pick(&EMPLOYMENT),
                job_title,
                salary_in_usd: salary,
                remote_ratio: *rng.pick(&MODALITIES),
                company_size: *rng.pick(&SIZES),
                employee_residence_iso3: iso3,
            }
        })
        .collect()
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("work_year", DataType::Int64, false),
        Field::new("experience_level", DataType::Utf8, false),
        Field::new("employment_type", DataType::Utf8, false),
        Field::new("job_title", DataType::Utf8, false),
        Field::new("salary_in_usd", DataType::Float64, false),
        Field::new("remote_ratio", DataType::Utf8, false),
        Field::new("company_size", DataType::Utf8, false),
        Field::new("employee_residence_iso3", DataType::Utf8, false),
    ]));

    let strings = |f: fn(&Row) -> &str| StringArray::from(rows.iter().map(f).collect::<Vec<_>>());

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(rows.iter().map(|r| r.work_year).collect::<Vec<_>>())),
            Arc::new(strings(|r| r.experience_level)),
            Arc::new(strings(|r| r.employment_type)),
            Arc::new(strings(|r| r.job_title)),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.salary_in_usd).collect::<Vec<_>>(),
            )),
            Arc::new(strings(|r| r.remote_ratio)),
            Arc::new(strings(|r| r.company_size)),
            Arc::new(strings(|r| r.employee_residence_iso3)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV output")?;
    writer.write_record([
        "work_year",
        "experience_level",
        "employment_type",
        "job_title",
        "salary_in_usd",
        "remote_ratio",
        "company_size",
        "employee_residence_iso3",
    ])?;
    for r in rows {
        writer.write_record([
            r.work_year.to_string(),
            r.experience_level.to_string(),
            r.employment_type.to_string(),
            r.job_title.to_string(),
            format!("{}", r.salary_in_usd),
            r.remote_ratio.to_string(),
            r.company_size.to_string(),
            r.employee_residence_iso3.to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(2_000, &mut rng);

    write_parquet(&rows, "sample_salaries.parquet")?;
    write_csv(&rows, "sample_salaries.csv")?;

    println!(
        "Wrote {} salary records to sample_salaries.parquet and sample_salaries.csv",
        rows.len()
    );
    Ok(())
}
