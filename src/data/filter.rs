use std::collections::{BTreeMap, BTreeSet};

use super::model::{CellValue, FilterColumn, SalaryDataset, SalaryRecord};

// ---------------------------------------------------------------------------
// Filter selection: which values are allowed per filter column
// ---------------------------------------------------------------------------

/// Allowed values for each of the four filter columns.
///
/// Every column always has a set. An empty set means "nothing selected", so
/// no record passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    selected: BTreeMap<FilterColumn, BTreeSet<CellValue>>,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self::none()
    }
}

impl FilterSelection {
    /// Every distinct value of the dataset selected (i.e., show everything).
    pub fn all(dataset: &SalaryDataset) -> Self {
        let selected = FilterColumn::ALL
            .iter()
            .map(|&col| (col, dataset.unique_values(col).clone()))
            .collect();
        FilterSelection { selected }
    }

    /// Nothing selected in any column.
    pub fn none() -> Self {
        let selected = FilterColumn::ALL
            .iter()
            .map(|&col| (col, BTreeSet::new()))
            .collect();
        FilterSelection { selected }
    }

    pub fn values(&self, column: FilterColumn) -> &BTreeSet<CellValue> {
        &self.selected[&column]
    }

    pub fn is_selected(&self, column: FilterColumn, value: &CellValue) -> bool {
        self.values(column).contains(value)
    }

    /// Replace a column's selection wholesale.
    pub fn set<I>(&mut self, column: FilterColumn, values: I)
    where
        I: IntoIterator<Item = CellValue>,
    {
        self.selected.insert(column, values.into_iter().collect());
    }

    /// Flip a single value in a column's selection.
    pub fn toggle(&mut self, column: FilterColumn, value: &CellValue) {
        let selected = self.selected.entry(column).or_default();
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
    }

    pub fn select_all(&mut self, column: FilterColumn, dataset: &SalaryDataset) {
        self.set(column, dataset.unique_values(column).iter().cloned());
    }

    pub fn select_none(&mut self, column: FilterColumn) {
        self.selected.insert(column, BTreeSet::new());
    }

    /// Whether a record satisfies every column constraint.
    pub fn matches(&self, record: &SalaryRecord) -> bool {
        FilterColumn::ALL
            .iter()
            .all(|&col| self.is_selected(col, col.value_of(record)))
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Return indices of records that pass all column filters, in dataset order.
///
/// A record passes when, for each of the four filter columns, its value is in
/// the selected set. An empty set therefore hides everything; a selected
/// value the dataset never contains simply matches nothing.
pub fn filtered_indices(dataset: &SalaryDataset, selection: &FilterSelection) -> Vec<usize> {
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// The filtered subset itself, borrowing from the dataset.
pub fn filter<'a>(dataset: &'a SalaryDataset, selection: &FilterSelection) -> Vec<&'a SalaryRecord> {
    dataset
        .records()
        .iter()
        .filter(|rec| selection.matches(rec))
        .collect()
}
