/// Data layer: reference tables, loading, and export.
///
/// Architecture:
/// ```text
///  built-in tables        .csv / .json / .parquet
///        │                        │
///        ▼                        ▼
///   ┌──────────┐            ┌──────────┐
///   │ catalog  │            │  loader   │  parse file → Bandpass
///   └──────────┘            └──────────┘
///        │                        │
///        ▼                        ▼
///   LineCatalog, presets      Bandpass (sampled curve)
///        │
///        ▼
///   lines.csv export
/// ```

pub mod catalog;
pub mod loader;
pub mod model;
