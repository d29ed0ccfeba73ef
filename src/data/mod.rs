/// Data layer: identifiers, raw grid data, and the on-disk readers.
///
/// Architecture:
/// ```text
///  LHAPDF_DATA_PATH / prefixes        pdfsets.index
///        │                                 │
///        ▼                                 ▼
///   ┌──────────┐                     ┌──────────┐
///   │   path    │  set name → dir    │  index    │  lhaid → set name
///   └──────────┘                     └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  .info + _NNNN.dat (or .json) → RawSet
///   └──────────┘
/// ```

pub mod index;
pub mod loader;
pub mod model;
pub mod path;
