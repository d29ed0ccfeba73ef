use crate::error::GridError;

use super::{Grid, Interpolation};

/// Grids stacked along their last axis, as in the Q blocks of an LHA member.
///
/// Interpolation never crosses a block boundary: a point is evaluated inside
/// the first block whose domain contains it.
#[derive(Debug, Clone, PartialEq)]
pub struct Subgrids {
    blocks: Vec<Grid>,
}

impl Subgrids {
    /// Blocks must share dimensionality and be ordered along the last axis;
    /// neighbouring blocks may share their boundary coordinate.
    pub fn new(blocks: Vec<Grid>) -> Result<Self, GridError> {
        let Some(first) = blocks.first() else {
            return Err(GridError::NoBlocks);
        };
        let ndim = first.ndim();

        for (index, pair) in blocks.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.ndim() != ndim {
                return Err(GridError::MixedDimensions {
                    expected: ndim,
                    actual: next.ndim(),
                });
            }
            let prev_end = prev.axes()[ndim - 1].max();
            let start = next.axes()[ndim - 1].min();
            if start < prev_end {
                return Err(GridError::Overlap {
                    index: index + 1,
                    prev_end,
                    start,
                });
            }
        }

        Ok(Subgrids { blocks })
    }

    pub fn single(grid: Grid) -> Self {
        Subgrids { blocks: vec![grid] }
    }

    pub fn ndim(&self) -> usize {
        self.blocks[0].ndim()
    }

    pub fn blocks(&self) -> &[Grid] {
        &self.blocks
    }

    /// Block used for `point`, if any contains it.
    pub fn block_for(&self, point: &[f64]) -> Option<&Grid> {
        self.blocks.iter().find(|grid| grid.contains(point))
    }

    /// NaN when no block contains `point`.
    pub fn interpolate(&self, point: &[f64], scheme: Interpolation) -> f64 {
        self.block_for(point)
            .map_or(crate::UNDEFINED, |grid| grid.interpolate(point, scheme))
    }
}
