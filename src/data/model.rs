use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// CellValue – a single categorical cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
/// Selections live in `BTreeSet`s so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl CellValue {
    /// Guess the type of a textual cell (CSV field, command-line value).
    pub fn infer(s: &str) -> Self {
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Text form used for string-typed columns (job title, country code).
    /// Numbers are rendered as-is; `Null` becomes the empty string.
    pub fn into_text(self) -> String {
        match self {
            CellValue::String(s) => s,
            CellValue::Null => String::new(),
            other => other.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// FilterColumn – the four filterable attributes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterColumn {
    WorkYear,
    ExperienceLevel,
    RemoteRatio,
    CompanySize,
}

impl FilterColumn {
    pub const ALL: [FilterColumn; 4] = [
        FilterColumn::WorkYear,
        FilterColumn::ExperienceLevel,
        FilterColumn::RemoteRatio,
        FilterColumn::CompanySize,
    ];

    /// Column name in the source file.
    pub fn column_name(self) -> &'static str {
        match self {
            FilterColumn::WorkYear => "work_year",
            FilterColumn::ExperienceLevel => "experience_level",
            FilterColumn::RemoteRatio => "remote_ratio",
            FilterColumn::CompanySize => "company_size",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterColumn::WorkYear => "Work Year",
            FilterColumn::ExperienceLevel => "Experience Level",
            FilterColumn::RemoteRatio => "Remote Ratio",
            FilterColumn::CompanySize => "Company Size",
        }
    }

    pub fn value_of(self, record: &SalaryRecord) -> &CellValue {
        match self {
            FilterColumn::WorkYear => &record.work_year,
            FilterColumn::ExperienceLevel => &record.experience_level,
            FilterColumn::RemoteRatio => &record.remote_ratio,
            FilterColumn::CompanySize => &record.company_size,
        }
    }
}

impl fmt::Display for FilterColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

pub const SALARY_COLUMN: &str = "salary_in_usd";
pub const JOB_TITLE_COLUMN: &str = "job_title";
pub const RESIDENCE_COLUMN: &str = "employee_residence_iso3";

/// Columns every dataset must provide, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "work_year",
    "experience_level",
    "remote_ratio",
    "company_size",
    SALARY_COLUMN,
    JOB_TITLE_COLUMN,
    RESIDENCE_COLUMN,
];

// ---------------------------------------------------------------------------
// Schema errors raised while turning rows into records
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum LoadError {
    #[error("row {row}: missing required column '{column}'")]
    MissingColumn { row: usize, column: &'static str },

    #[error("row {row}: salary_in_usd '{value}' is not a number")]
    NonNumericSalary { row: usize, value: String },

    #[error("row {row}: salary_in_usd {value} is not finite")]
    NonFiniteSalary { row: usize, value: f64 },

    #[error("row {row}: salary_in_usd {value} is negative")]
    NegativeSalary { row: usize, value: f64 },
}

// ---------------------------------------------------------------------------
// SalaryRecord – one row of the dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SalaryRecord {
    pub work_year: CellValue,
    pub experience_level: CellValue,
    pub remote_ratio: CellValue,
    pub company_size: CellValue,
    pub salary_in_usd: f64,
    pub job_title: String,
    pub employee_residence_iso3: String,
    /// Any further columns of the source file, kept for the data table.
    pub extra: BTreeMap<String, CellValue>,
}

impl SalaryRecord {
    /// Build a record from a generic `column → value` row.
    pub fn from_row(row: usize, mut cells: BTreeMap<String, CellValue>) -> Result<Self, LoadError> {
        let mut take = |column: &'static str| {
            cells
                .remove(column)
                .ok_or(LoadError::MissingColumn { row, column })
        };

        let work_year = take("work_year")?;
        let experience_level = take("experience_level")?;
        let remote_ratio = take("remote_ratio")?;
        let company_size = take("company_size")?;
        let salary = take(SALARY_COLUMN)?;
        let job_title = take(JOB_TITLE_COLUMN)?.into_text();
        let employee_residence_iso3 = take(RESIDENCE_COLUMN)?.into_text();

        let salary_in_usd = salary.as_f64().ok_or_else(|| LoadError::NonNumericSalary {
            row,
            value: salary.to_string(),
        })?;
        if !salary_in_usd.is_finite() {
            return Err(LoadError::NonFiniteSalary {
                row,
                value: salary_in_usd,
            });
        }
        if salary_in_usd < 0.0 {
            return Err(LoadError::NegativeSalary {
                row,
                value: salary_in_usd,
            });
        }

        Ok(SalaryRecord {
            work_year,
            experience_level,
            remote_ratio,
            company_size,
            salary_in_usd,
            job_title,
            employee_residence_iso3,
            extra: cells,
        })
    }

    /// Render a column for tabular display.
    pub fn display_cell(&self, column: &str) -> String {
        match column {
            "work_year" => self.work_year.to_string(),
            "experience_level" => self.experience_level.to_string(),
            "remote_ratio" => self.remote_ratio.to_string(),
            "company_size" => self.company_size.to_string(),
            SALARY_COLUMN => format!("{}", self.salary_in_usd),
            JOB_TITLE_COLUMN => self.job_title.clone(),
            RESIDENCE_COLUMN => self.employee_residence_iso3.clone(),
            other => self
                .extra
                .get(other)
                .map(|v| v.to_string())
                .unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// SalaryDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with the distinct values of each filter column.
#[derive(Debug, Clone)]
pub struct SalaryDataset {
    records: Vec<SalaryRecord>,
    /// Column names in source order (required columns first when unknown).
    column_names: Vec<String>,
    /// For each filter column the sorted set of distinct values.
    unique_values: BTreeMap<FilterColumn, BTreeSet<CellValue>>,
}

impl SalaryDataset {
    pub fn new(records: Vec<SalaryRecord>, column_names: Vec<String>) -> Self {
        let mut unique_values: BTreeMap<FilterColumn, BTreeSet<CellValue>> = FilterColumn::ALL
            .iter()
            .map(|&col| (col, BTreeSet::new()))
            .collect();

        for rec in &records {
            for col in FilterColumn::ALL {
                unique_values
                    .entry(col)
                    .or_default()
                    .insert(col.value_of(rec).clone());
            }
        }

        SalaryDataset {
            records,
            column_names,
            unique_values,
        }
    }

    /// Build a dataset whose columns are the required ones plus every extra
    /// column found in the records (sorted).
    pub fn from_records(records: Vec<SalaryRecord>) -> Self {
        let extras: BTreeSet<String> = records
            .iter()
            .flat_map(|r| r.extra.keys().cloned())
            .collect();
        let column_names = REQUIRED_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(extras)
            .collect();
        Self::new(records, column_names)
    }

    pub fn records(&self) -> &[SalaryRecord] {
        &self.records
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn unique_values(&self, column: FilterColumn) -> &BTreeSet<CellValue> {
        // Every filter column is seeded in `new`.
        &self.unique_values[&column]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(
        year: i64,
        experience: &str,
        remote: &str,
        size: &str,
        salary: f64,
        job: &str,
        country: &str,
    ) -> SalaryRecord {
        SalaryRecord {
            work_year: CellValue::Integer(year),
            experience_level: experience.into(),
            remote_ratio: remote.into(),
            company_size: size.into(),
            salary_in_usd: salary,
            job_title: job.to_string(),
            employee_residence_iso3: country.to_string(),
            extra: BTreeMap::new(),
        }
    }

    fn row(pairs: &[(&str, CellValue)]) -> BTreeMap<String, CellValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn full_row(salary: CellValue) -> BTreeMap<String, CellValue> {
        row(&[
            ("work_year", CellValue::Integer(2024)),
            ("experience_level", "senior".into()),
            ("remote_ratio", "remote".into()),
            ("company_size", "M".into()),
            ("salary_in_usd", salary),
            ("job_title", "Data Engineer".into()),
            ("employee_residence_iso3", "BRA".into()),
            ("salary_currency", "BRL".into()),
        ])
    }

    #[test]
    fn test_infer_types() {
        assert_eq!(CellValue::infer(""), CellValue::Null);
        assert_eq!(CellValue::infer("2023"), CellValue::Integer(2023));
        assert_eq!(CellValue::infer("1.5"), CellValue::Float(1.5));
        assert_eq!(CellValue::infer("true"), CellValue::Bool(true));
        assert_eq!(CellValue::infer("senior"), CellValue::from("senior"));
    }

    #[test]
    fn test_ordering_groups_by_type_then_value() {
        let mut values = vec![
            CellValue::from("b"),
            CellValue::Integer(2),
            CellValue::Null,
            CellValue::from("a"),
            CellValue::Integer(1),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                CellValue::Null,
                CellValue::Integer(1),
                CellValue::Integer(2),
                CellValue::from("a"),
                CellValue::from("b"),
            ]
        );
    }

    #[test]
    fn test_from_row_keeps_extra_columns() {
        let rec = SalaryRecord::from_row(0, full_row(CellValue::Integer(120_000))).unwrap();
        assert_eq!(rec.salary_in_usd, 120_000.0);
        assert_eq!(rec.job_title, "Data Engineer");
        assert_eq!(rec.extra.get("salary_currency"), Some(&CellValue::from("BRL")));
        assert_eq!(rec.display_cell("salary_currency"), "BRL");
        assert_eq!(rec.display_cell("work_year"), "2024");
    }

    #[test]
    fn test_from_row_missing_column() {
        let mut cells = full_row(CellValue::Integer(1));
        cells.remove("company_size");
        let err = SalaryRecord::from_row(7, cells).unwrap_err();
        assert_eq!(
            err,
            LoadError::MissingColumn {
                row: 7,
                column: "company_size"
            }
        );
    }

    #[test]
    fn test_from_row_rejects_bad_salary() {
        let err = SalaryRecord::from_row(3, full_row(CellValue::from("lots"))).unwrap_err();
        assert!(matches!(err, LoadError::NonNumericSalary { row: 3, .. }));

        let err = SalaryRecord::from_row(4, full_row(CellValue::Float(-1.0))).unwrap_err();
        assert!(matches!(err, LoadError::NegativeSalary { row: 4, .. }));
    }

    #[test]
    fn test_from_row_rejects_non_finite_salary() {
        for (row, text) in [(5, "inf"), (6, "-inf"), (7, "NaN")] {
            let salary = CellValue::infer(text);
            assert!(matches!(salary, CellValue::Float(_)), "{text} parses as a float");
            let err = SalaryRecord::from_row(row, full_row(salary)).unwrap_err();
            assert!(
                matches!(err, LoadError::NonFiniteSalary { row: r, .. } if r == row),
                "{text}: {err}"
            );
        }
    }

    #[test]
    fn test_dataset_unique_values() {
        let ds = SalaryDataset::from_records(vec![
            record(2024, "senior", "remote", "M", 100.0, "A", "USA"),
            record(2023, "mid", "remote", "L", 200.0, "B", "USA"),
            record(2024, "senior", "on-site", "S", 300.0, "A", "BRA"),
        ]);
        assert_eq!(ds.len(), 3);
        let years: Vec<_> = ds.unique_values(FilterColumn::WorkYear).iter().cloned().collect();
        assert_eq!(years, vec![CellValue::Integer(2023), CellValue::Integer(2024)]);
        assert_eq!(ds.unique_values(FilterColumn::CompanySize).len(), 3);
        assert_eq!(ds.column_names().len(), REQUIRED_COLUMNS.len());
    }

    #[test]
    fn test_empty_dataset_has_empty_value_sets() {
        let ds = SalaryDataset::from_records(Vec::new());
        assert!(ds.is_empty());
        for col in FilterColumn::ALL {
            assert!(ds.unique_values(col).is_empty());
        }
    }
}
