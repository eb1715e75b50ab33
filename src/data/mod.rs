/// Data layer: core types, loading, caching and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet  (fixed path or upload)
///        │
///        ▼
///   ┌──────────┐     ┌───────────┐
///   │  loader   │◄───►│   cache   │  keyed by path+mtime or upload hash
///   └──────────┘     └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  ordered rows of CellValue, named columns
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  Timepoint ≤ bound, then category == selected
///   └──────────┘
/// ```

pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
