/// Data layer: core types, loading, cleaning, caching and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ cleaner   │  dedup, coerce, range-check, sort → CleanedDataset
///   └──────────┘
///        │  (memoized per source identity by `cache`)
///        ▼
///   ┌──────────┐
///   │  filter   │  date range → FilteredView (+ chart columns, summary)
///   └──────────┘
/// ```

pub mod cache;
pub mod cleaner;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
