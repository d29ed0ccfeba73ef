//! Boundary-aware grid interpolation for LHAPDF-style PDF sets.
//!
//! Sets are selected by a public identifier (name or numeric LHAPDF id),
//! loaded once through a [`GridSource`], and evaluated at `(x, Q)` points:
//!
//! ```no_run
//! use gridpdf::GridInterpolator;
//!
//! let pdfs = GridInterpolator::discover()?;
//! let set = pdfs.load("NNPDF40_nnlo_as_01180")?;
//! let xg = pdfs.evaluate(&set, 21, 0, &[[1e-3, 10.0], [1e-3, 1e9]])?;
//! assert!(xg[0].is_finite());
//! assert!(xg[1].is_nan()); // beyond the Q grid: undefined, not extrapolated
//! # Ok::<(), gridpdf::PdfError>(())
//! ```

pub mod data;
pub mod error;
pub mod grid;
pub mod interpolator;
pub mod set;
pub mod source;

pub use data::model::{Metadata, MetadataValue, RawBlock, RawMember, RawSet, SetId};
pub use data::path::DataPath;
pub use error::{GridError, PdfError, SourceError};
pub use grid::{Axis, Grid, Interpolation, Scale, Subgrids};
pub use interpolator::GridInterpolator;
pub use set::{Member, MemberKind, PdfSet};
pub use source::{GridSource, LhaDirectory, MemorySource};

/// Value returned for points outside a grid's domain. Test with
/// `f64::is_nan`, never with `==`.
pub const UNDEFINED: f64 = f64::NAN;
