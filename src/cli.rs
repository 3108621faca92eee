use std::path::PathBuf;

use clap::Parser;
use clap::builder::RangedU64ValueParser;

use crate::data::filter::FilterSelection;
use crate::data::model::{CellValue, FilterColumn, SalaryDataset};
use crate::data::report::ReportConfig;

#[derive(Parser, Debug)]
#[command(name = "salary-dash")]
#[command(author, version, about = "Filter salary records and explore aggregate metrics")]
pub struct Args {
    /// Salary dataset to open (.csv, .json, .parquet)
    pub path: Option<PathBuf>,

    /// Print the dashboard report as JSON instead of opening the window
    #[arg(long, requires = "path")]
    pub report: bool,

    /// Work years to keep (repeatable; default: all)
    #[arg(long = "year", value_name = "YEAR")]
    pub years: Vec<String>,

    /// Experience levels to keep (repeatable; default: all)
    #[arg(long = "experience", value_name = "LEVEL")]
    pub experience: Vec<String>,

    /// Remote ratios / work modalities to keep (repeatable; default: all)
    #[arg(long = "remote", value_name = "RATIO")]
    pub remote: Vec<String>,

    /// Company sizes to keep (repeatable; default: all)
    #[arg(long = "size", value_name = "SIZE")]
    pub size: Vec<String>,

    /// Job title broken down per country
    #[arg(long, default_value = "Data Scientist")]
    pub focus_job: String,

    /// Number of job titles in the top-jobs chart
    #[arg(long, default_value = "10", value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub top: usize,

    /// Number of salary histogram bins
    #[arg(long, default_value = "30", value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub bins: usize,
}

impl Args {
    pub fn report_config(&self) -> ReportConfig {
        ReportConfig {
            top_jobs_limit: self.top,
            histogram_bins: self.bins,
            focus_job_title: self.focus_job.clone(),
        }
    }

    fn values_for(&self, column: FilterColumn) -> &[String] {
        match column {
            FilterColumn::WorkYear => &self.years,
            FilterColumn::ExperienceLevel => &self.experience,
            FilterColumn::RemoteRatio => &self.remote,
            FilterColumn::CompanySize => &self.size,
        }
    }

    /// Columns given on the command line are restricted to those values;
    /// the rest keep every distinct value of the dataset.
    pub fn selection(&self, dataset: &SalaryDataset) -> FilterSelection {
        let mut selection = FilterSelection::all(dataset);
        for col in FilterColumn::ALL {
            let raw = self.values_for(col);
            if raw.is_empty() {
                continue;
            }
            let values: Vec<CellValue> = raw.iter().map(|v| CellValue::infer(v.trim())).collect();
            for v in &values {
                if !dataset.unique_values(col).contains(v) {
                    log::warn!("{col} value '{v}' does not occur in the dataset");
                }
            }
            selection.set(col, values);
        }
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn dataset() -> SalaryDataset {
        SalaryDataset::from_records(vec![
            record(2023, "junior", "remoto", "S", 1.0, "A", "BRA"),
            record(2024, "senior", "hibrido", "L", 2.0, "B", "USA"),
        ])
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["salary-dash"]).unwrap();
        assert_eq!(args.report_config(), ReportConfig::default());
        assert_eq!(args.selection(&dataset()), FilterSelection::all(&dataset()));
        assert!(!args.report);
    }

    #[test]
    fn test_repeatable_filters() {
        let args = Args::try_parse_from([
            "salary-dash",
            "data.csv",
            "--report",
            "--year",
            "2024",
            "--year",
            "2030",
            "--size",
            "L",
            "--top",
            "5",
        ])
        .unwrap();
        let sel = args.selection(&dataset());
        assert!(sel.is_selected(FilterColumn::WorkYear, &CellValue::Integer(2024)));
        assert!(sel.is_selected(FilterColumn::WorkYear, &CellValue::Integer(2030)));
        assert!(!sel.is_selected(FilterColumn::WorkYear, &CellValue::Integer(2023)));
        assert_eq!(sel.values(FilterColumn::CompanySize).len(), 1);
        assert_eq!(sel.values(FilterColumn::ExperienceLevel).len(), 2);
        assert_eq!(args.report_config().top_jobs_limit, 5);
    }

    #[test]
    fn test_zero_bins_or_top_rejected() {
        assert!(Args::try_parse_from(["salary-dash", "--bins", "0"]).is_err());
        assert!(Args::try_parse_from(["salary-dash", "--top", "0"]).is_err());

        let args = Args::try_parse_from(["salary-dash", "--bins", "1", "--top", "1"]).unwrap();
        assert_eq!(args.report_config().histogram_bins, 1);
        assert_eq!(args.report_config().top_jobs_limit, 1);
    }

    #[test]
    fn test_report_requires_path() {
        assert!(Args::try_parse_from(["salary-dash", "--report"]).is_err());
    }
}
