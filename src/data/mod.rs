/// Data layer: raw tables, loading, column resolution and normalization.
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
///   │  columns  │  headers → timestamp / temperature / humidity
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  coerce, drop nulls, sort → Vec<Reading>
///   └───────────┘
/// ```

pub mod columns;
pub mod loader;
pub mod model;
pub mod normalize;
