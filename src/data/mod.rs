/// Data layer: core types, loading, and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → LaunchDataset
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ LaunchDataset  │  Vec<LaunchRecord>, sites, payload bounds
///   └───────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  (dataset, selection) → pie counts / scatter points
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
