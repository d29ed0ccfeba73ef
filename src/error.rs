use std::path::PathBuf;

use thiserror::Error;

use crate::data::model::SetId;

// ---------------------------------------------------------------------------
// Grid construction errors
// ---------------------------------------------------------------------------

/// Invariant violations detected while building an [`Axis`](crate::grid::Axis)
/// or a [`Grid`](crate::grid::Grid).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("axis needs at least 2 nodes, got {0}")]
    TooFewNodes(usize),

    #[error("axis coordinate {index} is not finite ({value})")]
    NotFinite { index: usize, value: f64 },

    #[error("axis is not strictly increasing at node {index} ({prev} -> {value})")]
    NotMonotonic { index: usize, prev: f64, value: f64 },

    #[error("log-scaled axis requires positive coordinates, node {index} is {value}")]
    NonPositive { index: usize, value: f64 },

    #[error("grid needs at least one axis")]
    NoAxes,

    #[error("grid shape {shape:?} needs {expected} values, got {actual}")]
    ShapeMismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    #[error("no subgrids given")]
    NoBlocks,

    #[error("subgrids have mixed dimensionality ({expected} vs {actual})")]
    MixedDimensions { expected: usize, actual: usize },

    #[error("subgrid {index} starts at {start} before the previous one ends at {prev_end}")]
    Overlap {
        index: usize,
        prev_end: f64,
        start: f64,
    },
}

// ---------------------------------------------------------------------------
// Grid-data provider errors
// ---------------------------------------------------------------------------

/// Failures reported by a [`GridSource`](crate::source::GridSource).
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no PDF set matches '{0}'")]
    NotFound(SetId),

    #[error("{0}")]
    Corrupt(String),

    #[error("no LHAPDF data directory found; set LHAPDF_DATA_PATH")]
    NoDataPath,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Public API errors
// ---------------------------------------------------------------------------

/// Errors surfaced by [`GridInterpolator`](crate::GridInterpolator).
///
/// Off-grid points are deliberately absent: they evaluate to NaN.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF set '{0}' not found")]
    NotFound(SetId),

    #[error("PDF set '{set}' has corrupt grid data: {reason}")]
    CorruptData { set: String, reason: String },

    #[error("PDF set '{set}' has no flavor {flavor}")]
    UnknownFlavor { set: String, flavor: i32 },

    #[error("PDF set '{set}' has {available} members, member {member} requested")]
    MemberOutOfRange {
        set: String,
        member: usize,
        available: usize,
    },

    #[error("query point {index} has {actual} coordinates, grid has {expected} axes")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("no LHAPDF data directory found; set LHAPDF_DATA_PATH")]
    NoDataPath,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PdfError {
    /// Attach the set name to a provider failure.
    pub(crate) fn from_source(set: &str, err: SourceError) -> Self {
        match err {
            SourceError::NotFound(id) => PdfError::NotFound(id),
            SourceError::Corrupt(reason) => PdfError::CorruptData {
                set: set.to_string(),
                reason,
            },
            SourceError::NoDataPath => PdfError::NoDataPath,
            SourceError::Io { path, source } => PdfError::Io { path, source },
        }
    }
}

pub type Result<T, E = PdfError> = std::result::Result<T, E>;
