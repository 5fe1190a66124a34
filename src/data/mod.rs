/// Data layer: core types, loading, and background tasks.
///
/// Architecture:
/// ```text
///  .json / .csv / .parquet   (file or http)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch bytes → parse → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   task    │  worker thread + cancel flag, polled every frame
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record>, label index
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod task;
