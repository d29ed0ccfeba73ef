use serde::{Deserialize, Serialize};

use crate::error::GridError;

// ---------------------------------------------------------------------------
// Scale – coordinate transform applied before interpolating along an axis
// ---------------------------------------------------------------------------

/// How an axis is interpolated: directly, or in `ln(coordinate)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    #[default]
    Linear,
    Log,
}

impl Scale {
    #[inline]
    fn apply(self, v: f64) -> f64 {
        match self {
            Scale::Linear => v,
            Scale::Log => v.ln(),
        }
    }
}

// ---------------------------------------------------------------------------
// Cell – location of a query coordinate on an axis
// ---------------------------------------------------------------------------

/// Lower node index of the bracketing interval and the fractional position
/// inside it, measured in the axis' scaled coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub index: usize,
    pub t: f64,
}

// ---------------------------------------------------------------------------
// Axis
// ---------------------------------------------------------------------------

/// A strictly increasing list of sample coordinates along one dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    nodes: Vec<f64>,
    /// `nodes` after applying `scale`.
    knots: Vec<f64>,
    scale: Scale,
}

impl Axis {
    /// Validate `nodes` and build the axis.
    ///
    /// Requires at least two finite, strictly increasing coordinates, all
    /// positive when `scale` is [`Scale::Log`].
    pub fn new(nodes: Vec<f64>, scale: Scale) -> Result<Self, GridError> {
        if nodes.len() < 2 {
            return Err(GridError::TooFewNodes(nodes.len()));
        }
        for (index, &value) in nodes.iter().enumerate() {
            if !value.is_finite() {
                return Err(GridError::NotFinite { index, value });
            }
            if scale == Scale::Log && value <= 0.0 {
                return Err(GridError::NonPositive { index, value });
            }
            if index > 0 && value <= nodes[index - 1] {
                return Err(GridError::NotMonotonic {
                    index,
                    prev: nodes[index - 1],
                    value,
                });
            }
        }

        let knots = nodes.iter().map(|&v| scale.apply(v)).collect();
        Ok(Axis {
            nodes,
            knots,
            scale,
        })
    }

    pub fn linear(nodes: Vec<f64>) -> Result<Self, GridError> {
        Self::new(nodes, Scale::Linear)
    }

    pub fn log(nodes: Vec<f64>) -> Result<Self, GridError> {
        Self::new(nodes, Scale::Log)
    }

    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    pub(crate) fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Number of nodes (always at least 2).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn min(&self) -> f64 {
        self.nodes[0]
    }

    pub fn max(&self) -> f64 {
        self.nodes[self.nodes.len() - 1]
    }

    /// Closed-interval membership. NaN is never contained.
    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min() && v <= self.max()
    }

    /// Find the interval containing `v` by binary search.
    ///
    /// Returns `None` outside `[min, max]`. The upper boundary maps onto the
    /// last interval with `t == 1`, so every node is reproduced exactly.
    pub fn locate(&self, v: f64) -> Option<Cell> {
        if !self.contains(v) {
            return None;
        }
        let above = self.nodes.partition_point(|&n| n <= v);
        let index = above.saturating_sub(1).min(self.nodes.len() - 2);

        let u = self.scale.apply(v);
        let (u0, u1) = (self.knots[index], self.knots[index + 1]);
        let t = if v == self.nodes[index] {
            0.0
        } else if v == self.nodes[index + 1] {
            1.0
        } else {
            (u - u0) / (u1 - u0)
        };
        Some(Cell { index, t })
    }
}
