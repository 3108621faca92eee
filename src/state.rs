use std::path::Path;

use crate::color::ColorMap;
use crate::data::filter::{FilterSelection, filtered_indices};
use crate::data::loader;
use crate::data::model::{CellValue, FilterColumn, SalaryDataset};
use crate::data::report::{DashboardReport, ReportConfig};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<SalaryDataset>,

    /// Per-column filter selections.
    pub filters: FilterSelection,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Aggregates over the visible records.
    pub report: DashboardReport,

    pub report_config: ReportConfig,

    /// Stable colours for the work-modality chart.
    pub modality_colors: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl AppState {
    pub fn with_config(report_config: ReportConfig) -> Self {
        Self {
            report: DashboardReport {
                focus_job_title: report_config.focus_job_title.clone(),
                ..Default::default()
            },
            report_config,
            ..Default::default()
        }
    }

    /// Ingest a newly loaded dataset with every filter value selected.
    pub fn set_dataset(&mut self, dataset: SalaryDataset) {
        self.filters = FilterSelection::all(&dataset);
        self.modality_colors = Some(ColorMap::new(
            dataset.unique_values(FilterColumn::RemoteRatio),
        ));
        self.dataset = Some(dataset);
        self.status_message = None;
        self.loading = false;
        self.refilter();
    }

    /// Load a file, keeping the previous dataset on failure.
    pub fn open_path(&mut self, path: &Path) {
        self.loading = true;
        match loader::load_file(path) {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                self.loading = false;
            }
        }
    }

    /// Recompute `visible_indices` and the report after a filter change.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        self.visible_indices = filtered_indices(ds, &self.filters);
        let records = ds.records();
        let subset: Vec<_> = self.visible_indices.iter().map(|&i| &records[i]).collect();
        self.report = DashboardReport::build(&subset, &self.report_config);
        log::debug!(
            "{} of {} records visible after filter change",
            self.visible_indices.len(),
            ds.len()
        );
    }

    /// Toggle a single value in a column's filter.
    pub fn toggle_filter_value(&mut self, column: FilterColumn, value: &CellValue) {
        self.filters.toggle(column, value);
        self.refilter();
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: FilterColumn) {
        if let Some(ds) = &self.dataset {
            self.filters.select_all(column, ds);
            self.refilter();
        }
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: FilterColumn) {
        self.filters.select_none(column);
        self.refilter();
    }
}
