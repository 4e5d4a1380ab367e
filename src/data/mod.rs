/// Data layer: core types, geometry, loading, and the formula chain.
///
/// Architecture:
/// ```text
///  thickness, diameter (mm)         sweep .txt  (f;|Z|;-φ)
///        │                                │
///        ▼                                ▼
///   ┌──────────┐                    ┌──────────┐
///   │ geometry  │  S, C0            │  loader   │  parse file → MeasurementTable
///   └──────────┘                    └──────────┘
///        │                                │
///        └──────────────┬─────────────────┘
///                       ▼
///                ┌────────────┐
///                │ transform   │  row-wise map → DerivedTable (+ singularities)
///                └────────────┘
/// ```

pub mod geometry;
pub mod loader;
pub mod model;
pub mod transform;
