/// Grid engine: axes, n-dimensional grids and their interpolation.
///
/// Architecture:
/// ```text
///   Axis (per dimension)       values (row-major)
///        │                           │
///        └────────────┬──────────────┘
///                     ▼
///               ┌──────────┐
///               │   Grid    │  locate cell per axis → local scheme
///               └──────────┘
///                     │  one per Q block
///                     ▼
///               ┌──────────┐
///               │ Subgrids  │  pick the block containing the point
///               └──────────┘
/// ```
///
/// Points outside the domain evaluate to NaN. There is no extrapolation.
pub mod axis;
pub mod hermite;
pub mod subgrids;

pub use axis::{Axis, Cell, Scale};
pub use subgrids::Subgrids;

use crate::error::GridError;
use hermite::{lerp, node_slope, HermiteSpan};

// ---------------------------------------------------------------------------
// Interpolation scheme
// ---------------------------------------------------------------------------

/// Local scheme applied inside a cell, identical for every cell of a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Multilinear.
    Linear,
    /// Tensor-product cubic Hermite with finite-difference slopes.
    #[default]
    Cubic,
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// Scalar values sampled on the Cartesian product of its axes.
///
/// Values are stored row-major: the last axis varies fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    axes: Vec<Axis>,
    values: Vec<f64>,
    strides: Vec<usize>,
}

impl Grid {
    pub fn new(axes: Vec<Axis>, values: Vec<f64>) -> Result<Self, GridError> {
        if axes.is_empty() {
            return Err(GridError::NoAxes);
        }
        let shape: Vec<usize> = axes.iter().map(Axis::len).collect();
        let expected: usize = shape.iter().product();
        if values.len() != expected {
            return Err(GridError::ShapeMismatch {
                shape,
                expected,
                actual: values.len(),
            });
        }

        let mut strides = vec![1; axes.len()];
        for dim in (0..axes.len() - 1).rev() {
            strides[dim] = strides[dim + 1] * shape[dim + 1];
        }

        Ok(Grid {
            axes,
            values,
            strides,
        })
    }

    pub fn ndim(&self) -> usize {
        self.axes.len()
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(Axis::len).collect()
    }

    /// Stored sample at a node index tuple.
    pub fn value_at(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.ndim() {
            return None;
        }
        let mut offset = 0;
        for ((&i, axis), &stride) in index.iter().zip(&self.axes).zip(&self.strides) {
            if i >= axis.len() {
                return None;
            }
            offset += i * stride;
        }
        Some(self.values[offset])
    }

    /// Whether `point` lies inside the closed domain on every axis.
    pub fn contains(&self, point: &[f64]) -> bool {
        point.len() == self.ndim()
            && point
                .iter()
                .zip(&self.axes)
                .all(|(&v, axis)| axis.contains(v))
    }

    /// Interpolate at `point`.
    ///
    /// Returns NaN when the point is off-grid on any axis or has the wrong
    /// number of coordinates; never extrapolates.
    pub fn interpolate(&self, point: &[f64], scheme: Interpolation) -> f64 {
        if point.len() != self.ndim() {
            return crate::UNDEFINED;
        }
        let mut cells = Vec::with_capacity(self.ndim());
        for (&v, axis) in point.iter().zip(&self.axes) {
            match axis.locate(v) {
                Some(cell) => cells.push(cell),
                None => return crate::UNDEFINED,
            }
        }
        self.reduce(&cells, 0, 0, scheme)
    }

    /// Collapse dimension `dim` given the fixed offset of the outer ones.
    fn reduce(&self, cells: &[Cell], dim: usize, offset: usize, scheme: Interpolation) -> f64 {
        if dim == self.ndim() {
            return self.values[offset];
        }
        let Cell { index, t } = cells[dim];
        let stride = self.strides[dim];
        let at = |k: usize| self.reduce(cells, dim + 1, offset + k * stride, scheme);

        match scheme {
            Interpolation::Linear => lerp(at(index), at(index + 1), t),
            Interpolation::Cubic => {
                let axis = &self.axes[dim];
                let lo = index.saturating_sub(1);
                let hi = (index + 2).min(axis.len() - 1);
                let knots = &axis.knots()[lo..=hi];

                let mut window = [0.0; 4];
                for (slot, k) in window.iter_mut().zip(lo..=hi) {
                    *slot = at(k);
                }
                let window = &window[..knots.len()];

                let local = index - lo;
                HermiteSpan {
                    h: knots[local + 1] - knots[local],
                    y0: window[local],
                    y1: window[local + 1],
                    d0: node_slope(knots, window, local),
                    d1: node_slope(knots, window, local + 1),
                }
                .eval(t)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// 3 × 4 grid of f(x, y) = x + 10 y.
    fn plane() -> Grid {
        let xs = vec![0.0, 1.0, 2.0];
        let ys = vec![0.0, 0.5, 1.0, 2.0];
        let values = xs
            .iter()
            .flat_map(|x| ys.iter().map(move |y| x + 10.0 * y))
            .collect();
        Grid::new(
            vec![Axis::linear(xs).unwrap(), Axis::linear(ys).unwrap()],
            values,
        )
        .unwrap()
    }

    #[test]
    fn rejects_wrong_value_count() {
        let axes = vec![
            Axis::linear(vec![0.0, 1.0]).unwrap(),
            Axis::linear(vec![0.0, 1.0, 2.0]).unwrap(),
        ];
        assert_eq!(
            Grid::new(axes, vec![0.0; 5]),
            Err(GridError::ShapeMismatch {
                shape: vec![2, 3],
                expected: 6,
                actual: 5
            })
        );
        assert_eq!(Grid::new(Vec::new(), Vec::new()), Err(GridError::NoAxes));
    }

    #[test]
    fn row_major_layout() {
        let grid = plane();
        assert_eq!(grid.shape(), vec![3, 4]);
        assert_eq!(grid.value_at(&[2, 3]), Some(22.0));
        assert_eq!(grid.value_at(&[1, 1]), Some(6.0));
        assert_eq!(grid.value_at(&[3, 0]), None);
        assert_eq!(grid.value_at(&[0]), None);
    }

    #[test]
    fn exact_at_every_node() {
        let grid = plane();
        for scheme in [Interpolation::Linear, Interpolation::Cubic] {
            for (i, &x) in grid.axes()[0].nodes().iter().enumerate() {
                for (j, &y) in grid.axes()[1].nodes().iter().enumerate() {
                    let stored = grid.value_at(&[i, j]).unwrap();
                    assert_relative_eq!(
                        grid.interpolate(&[x, y], scheme),
                        stored,
                        epsilon = 1e-12
                    );
                }
            }
        }
    }

    #[test]
    fn both_schemes_reproduce_planes() {
        let grid = plane();
        for scheme in [Interpolation::Linear, Interpolation::Cubic] {
            assert_relative_eq!(grid.interpolate(&[0.25, 1.5], scheme), 15.25, epsilon = 1e-12);
            assert_relative_eq!(grid.interpolate(&[1.75, 0.1], scheme), 2.75, epsilon = 1e-12);
        }
    }

    #[test]
    fn cubic_tracks_smooth_functions_better() {
        let xs: Vec<f64> = (0..=8).map(|i| i as f64 * 0.25).collect();
        let f = |x: f64| (x * 1.3).sin();
        let grid = Grid::new(
            vec![Axis::linear(xs.clone()).unwrap()],
            xs.iter().map(|&x| f(x)).collect(),
        )
        .unwrap();

        let x = 1.1;
        let linear = (grid.interpolate(&[x], Interpolation::Linear) - f(x)).abs();
        let cubic = (grid.interpolate(&[x], Interpolation::Cubic) - f(x)).abs();
        assert!(cubic < linear, "cubic {cubic} vs linear {linear}");
    }

    #[test]
    fn off_grid_points_are_nan() {
        let grid = plane();
        assert!(grid.interpolate(&[-0.1, 1.0], Interpolation::Cubic).is_nan());
        assert!(grid.interpolate(&[1.0, 2.5], Interpolation::Linear).is_nan());
        assert!(grid.interpolate(&[f64::NAN, 1.0], Interpolation::Cubic).is_nan());
        assert!(grid.interpolate(&[1.0], Interpolation::Cubic).is_nan());
        assert!(!grid.contains(&[2.0, 2.1]));
        assert!(grid.contains(&[2.0, 2.0]));
    }

    #[test]
    fn two_node_axes_fall_back_to_linear() {
        let grid = Grid::new(vec![Axis::linear(vec![0.0, 4.0]).unwrap()], vec![1.0, 9.0]).unwrap();
        assert_relative_eq!(grid.interpolate(&[1.0], Interpolation::Cubic), 3.0, epsilon = 1e-12);
    }
}
