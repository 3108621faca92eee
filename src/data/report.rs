use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::model::{CellValue, SalaryRecord};

// ---------------------------------------------------------------------------
// Report configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportConfig {
    /// How many job titles the "top jobs" chart keeps.
    pub top_jobs_limit: usize,
    /// Number of equal-width bins in the salary histogram.
    pub histogram_bins: usize,
    /// Job title whose salaries are broken down per country.
    pub focus_job_title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_jobs_limit: 10,
            histogram_bins: 30,
            focus_job_title: "Data Scientist".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// The four scalar cards at the top of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeadlineMetrics {
    pub average_salary: f64,
    pub max_salary: f64,
    pub total_entries: usize,
    pub most_frequent_job: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobAverage {
    pub job_title: String,
    pub average_salary: f64,
}

/// One histogram bin covering `[lower, upper)` (the last bin is closed).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModalityShare {
    pub modality: CellValue,
    pub count: usize,
    /// Share of the subset in percent (0–100).
    pub percent: f64,
}

impl ModalityShare {
    /// "percent + label" text shown on the donut slice.
    pub fn label(&self) -> String {
        format!("{:.1}% {}", self.percent, self.modality)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryAverage {
    pub iso3: String,
    pub average_salary: f64,
}

/// Everything the presentation layer needs for one filter state.
///
/// Chart datasets are `None` when the filtered subset is empty, which the UI
/// renders as a "no data" notice.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardReport {
    pub metrics: HeadlineMetrics,
    pub top_jobs: Option<Vec<JobAverage>>,
    pub salary_histogram: Option<Vec<HistogramBin>>,
    pub work_modality: Option<Vec<ModalityShare>>,
    pub focus_job_title: String,
    pub focus_job_by_country: Option<Vec<CountryAverage>>,
}

impl DashboardReport {
    /// Recompute every aggregate from scratch for the given subset.
    pub fn build(subset: &[&SalaryRecord], config: &ReportConfig) -> Self {
        let report = DashboardReport {
            metrics: headline_metrics(subset),
            top_jobs: top_jobs_by_average(subset, config.top_jobs_limit),
            salary_histogram: salary_histogram(subset, config.histogram_bins),
            work_modality: work_modality(subset),
            focus_job_title: config.focus_job_title.clone(),
            focus_job_by_country: average_by_country(subset, &config.focus_job_title),
        };
        log::debug!(
            "Report rebuilt: {} entries, avg {:.2}, max {:.2}",
            report.metrics.total_entries,
            report.metrics.average_salary,
            report.metrics.max_salary
        );
        report
    }
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

/// Mean, max, count and most frequent job title. All zero / empty on an
/// empty subset.
pub fn headline_metrics(subset: &[&SalaryRecord]) -> HeadlineMetrics {
    if subset.is_empty() {
        return HeadlineMetrics::default();
    }

    let total: f64 = subset.iter().map(|r| r.salary_in_usd).sum();
    let max_salary = subset
        .iter()
        .map(|r| r.salary_in_usd)
        .fold(f64::NEG_INFINITY, f64::max);

    HeadlineMetrics {
        average_salary: total / subset.len() as f64,
        max_salary,
        total_entries: subset.len(),
        most_frequent_job: most_frequent_job(subset),
    }
}

/// Mode of `job_title`. Among equally frequent titles the one that appears
/// first in the subset wins.
fn most_frequent_job(subset: &[&SalaryRecord]) -> String {
    // title → (count, first position)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (pos, rec) in subset.iter().enumerate() {
        counts.entry(rec.job_title.as_str()).or_insert((0, pos)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (ca, pa)), (_, (cb, pb))| ca.cmp(cb).then(pb.cmp(pa)))
        .map(|(title, _)| title.to_string())
        .unwrap_or_default()
}

/// Group `(key, salary)` pairs and average each group. Keys come back sorted.
fn group_means<'a, I>(pairs: I) -> BTreeMap<&'a str, f64>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut acc: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for (key, salary) in pairs {
        let slot = acc.entry(key).or_insert((0.0, 0));
        slot.0 += salary;
        slot.1 += 1;
    }
    acc.into_iter()
        .map(|(key, (sum, n))| (key, sum / n as f64))
        .collect()
}

/// The `limit` job titles with the highest mean salary, returned in
/// ascending order of mean so a horizontal bar chart reads bottom-up.
pub fn top_jobs_by_average(subset: &[&SalaryRecord], limit: usize) -> Option<Vec<JobAverage>> {
    if subset.is_empty() {
        return None;
    }

    let mut jobs: Vec<JobAverage> = group_means(
        subset
            .iter()
            .map(|r| (r.job_title.as_str(), r.salary_in_usd)),
    )
    .into_iter()
    .map(|(title, avg)| JobAverage {
        job_title: title.to_string(),
        average_salary: avg,
    })
    .collect();

    // Stable sorts: ties keep title order.
    jobs.sort_by(|a, b| b.average_salary.total_cmp(&a.average_salary));
    jobs.truncate(limit);
    jobs.sort_by(|a, b| a.average_salary.total_cmp(&b.average_salary));
    Some(jobs)
}

/// Split the observed salary range into `bins` equal-width bins and count
/// the records in each. Every record lands in exactly one bin.
pub fn salary_histogram(subset: &[&SalaryRecord], bins: usize) -> Option<Vec<HistogramBin>> {
    if subset.is_empty() || bins == 0 {
        return None;
    }

    let (min, max) = subset.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
        (lo.min(r.salary_in_usd), hi.max(r.salary_in_usd))
    });
    let width = (max - min) / bins as f64;

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for rec in subset {
        let idx = if width > 0.0 {
            (((rec.salary_in_usd - min) / width).floor() as usize).min(bins - 1)
        } else {
            0
        };
        out[idx].count += 1;
    }
    Some(out)
}

/// Record count and percentage per `remote_ratio` value, largest first.
pub fn work_modality(subset: &[&SalaryRecord]) -> Option<Vec<ModalityShare>> {
    if subset.is_empty() {
        return None;
    }

    let mut counts: BTreeMap<&CellValue, usize> = BTreeMap::new();
    for rec in subset {
        *counts.entry(&rec.remote_ratio).or_default() += 1;
    }

    let total = subset.len() as f64;
    let mut shares: Vec<ModalityShare> = counts
        .into_iter()
        .map(|(modality, count)| ModalityShare {
            modality: modality.clone(),
            count,
            percent: count as f64 * 100.0 / total,
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    Some(shares)
}

/// Mean salary per residence country for one job title.
///
/// `None` when the subset itself is empty; an empty list when the subset has
/// rows but none with this title.
pub fn average_by_country(subset: &[&SalaryRecord], job_title: &str) -> Option<Vec<CountryAverage>> {
    if subset.is_empty() {
        return None;
    }

    let averages = group_means(
        subset
            .iter()
            .filter(|r| r.job_title == job_title)
            .map(|r| (r.employee_residence_iso3.as_str(), r.salary_in_usd)),
    )
    .into_iter()
    .map(|(iso3, avg)| CountryAverage {
        iso3: iso3.to_string(),
        average_salary: avg,
    })
    .collect();
    Some(averages)
}
