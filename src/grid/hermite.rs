//! Cubic Hermite primitives shared by the tensor-product cubic scheme.
//!
//! Given values `y0, y1` and slopes `d0, d1` at the ends of an interval of
//! width `h` in scaled coordinates:
//!
//! ```text
//! p(t) = h00(t)*y0 + h10(t)*h*d0 + h01(t)*y1 + h11(t)*h*d1
//!
//! h00(t) = 2t³ - 3t² + 1
//! h10(t) = t³ - 2t² + t
//! h01(t) = -2t³ + 3t²
//! h11(t) = t³ - t²
//! ```
//!
//! Node slopes come from finite differences: one-sided at the first and last
//! node of an axis, the mean of the two adjacent secants elsewhere.

/// One interval of a Hermite cubic.
#[derive(Debug, Clone, Copy)]
pub struct HermiteSpan {
    pub h: f64,
    pub y0: f64,
    pub y1: f64,
    pub d0: f64,
    pub d1: f64,
}

impl HermiteSpan {
    /// Evaluate at fractional position `t` in `[0, 1]`.
    #[inline]
    pub fn eval(&self, t: f64) -> f64 {
        let t2 = t * t;
        let t3 = t2 * t;

        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * self.y0 + h10 * self.h * self.d0 + h01 * self.y1 + h11 * self.h * self.d1
    }
}

/// Linear blend written so both ends are reproduced exactly.
#[inline]
pub fn lerp(y0: f64, y1: f64, t: f64) -> f64 {
    (1.0 - t) * y0 + t * y1
}

/// Finite-difference slope at `knots[k]`.
///
/// `knots` and `values` are a contiguous window of the axis; the window's
/// first and last entries are treated as axis edges, so callers must pass a
/// window that only ends where the axis does, or never ask for a slope there.
pub fn node_slope(knots: &[f64], values: &[f64], k: usize) -> f64 {
    let n = knots.len();
    debug_assert!(n >= 2 && values.len() == n && k < n);

    let secant = |a: usize| (values[a + 1] - values[a]) / (knots[a + 1] - knots[a]);
    if k == 0 {
        secant(0)
    } else if k == n - 1 {
        secant(n - 2)
    } else {
        0.5 * (secant(k - 1) + secant(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn span_reproduces_endpoints() {
        let span = HermiteSpan {
            h: 0.7,
            y0: 1.25,
            y1: -3.5,
            d0: 4.0,
            d1: -2.0,
        };
        assert_eq!(span.eval(0.0), 1.25);
        assert_eq!(span.eval(1.0), -3.5);
    }

    #[test]
    fn span_is_exact_for_cubics() {
        // f(u) = u³ on [1, 2]
        let f = |u: f64| u * u * u;
        let df = |u: f64| 3.0 * u * u;
        let span = HermiteSpan {
            h: 1.0,
            y0: f(1.0),
            y1: f(2.0),
            d0: df(1.0),
            d1: df(2.0),
        };
        assert_relative_eq!(span.eval(0.3), f(1.3), epsilon = 1e-12);
    }

    #[test]
    fn slopes_match_linear_data() {
        let knots = [0.0, 1.0, 3.0, 4.0];
        let values = [1.0, 3.0, 7.0, 9.0];
        for k in 0..4 {
            assert_relative_eq!(node_slope(&knots, &values, k), 2.0);
        }
    }

    #[test]
    fn lerp_hits_both_ends() {
        assert_eq!(lerp(0.1, 0.3, 0.0), 0.1);
        assert_eq!(lerp(0.1, 0.3, 1.0), 0.3);
    }
}
