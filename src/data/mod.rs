/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SalaryDataset
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ SalaryDataset │  Vec<SalaryRecord>, distinct filter values
///   └───────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  four set-membership selections → filtered subset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  report   │  metrics + chart datasets for the UI
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod report;
