//! Natural cubic spline interpolation

use crate::error::{LmfdbError, Result};

/// Natural cubic spline through a set of points
///
/// Second derivatives vanish at both ends. Outside the sample range the end
/// cubic pieces are extended.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivatives at the knots
    m: Vec<f64>,
}

impl CubicSpline {
    /// Fit a spline; the points are sorted by abscissa first
    ///
    /// Needs at least two points with distinct abscissas.
    pub fn new(points: &[(f64, f64)]) -> Result<Self> {
        let mut points: Vec<(f64, f64)> = points
            .iter()
            .copied()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        points.dedup_by(|a, b| a.0 == b.0);
        if points.len() < 2 {
            return Err(LmfdbError::PlotError(format!(
                "spline needs at least 2 distinct points, got {}",
                points.len()
            )));
        }

        let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
        let m = second_derivatives(&xs, &ys);
        Ok(CubicSpline { xs, ys, m })
    }

    /// Interpolated value at `x`
    pub fn eval(&self, x: f64) -> f64 {
        let n = self.xs.len();
        // index of the interval [xs[i], xs[i+1]] containing x
        let i = match self.xs.partition_point(|&xi| xi <= x) {
            0 => 0,
            p if p >= n => n - 2,
            p => p - 1,
        };
        let h = self.xs[i + 1] - self.xs[i];
        let a = (self.xs[i + 1] - x) / h;
        let b = (x - self.xs[i]) / h;
        a * self.ys[i]
            + b * self.ys[i + 1]
            + ((a * a * a - a) * self.m[i] + (b * b * b - b) * self.m[i + 1]) * h * h / 6.0
    }

    /// Sample at `start, start + step, ...` strictly below `end`
    pub fn sample(&self, start: f64, end: f64, step: f64) -> Vec<(f64, f64)> {
        frange(start, end, step)
            .map(|x| (x, self.eval(x)))
            .collect()
    }
}

/// `start, start + step, ...` strictly below `end`
pub fn frange(start: f64, end: f64, step: f64) -> impl Iterator<Item = f64> {
    let n = if step > 0.0 && end > start {
        ((end - start) / step - 1e-9).ceil().max(0.0) as usize
    } else {
        0
    };
    (0..n).map(move |i| start + i as f64 * step)
}

/// Solve the tridiagonal system for a natural spline
fn second_derivatives(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let mut m = vec![0.0; n];
    if n < 3 {
        return m;
    }
    let mut diag = vec![0.0; n];
    let mut rhs = vec![0.0; n];
    let mut upper = vec![0.0; n];
    for i in 1..n - 1 {
        let h0 = xs[i] - xs[i - 1];
        let h1 = xs[i + 1] - xs[i];
        let lower = h0 / 6.0;
        diag[i] = (h0 + h1) / 3.0;
        upper[i] = h1 / 6.0;
        rhs[i] = (ys[i + 1] - ys[i]) / h1 - (ys[i] - ys[i - 1]) / h0;
        if i > 1 {
            let w = lower / diag[i - 1];
            diag[i] -= w * upper[i - 1];
            rhs[i] -= w * rhs[i - 1];
        }
    }
    for i in (1..n - 1).rev() {
        m[i] = (rhs[i] - upper[i] * m[i + 1]) / diag[i];
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolates_knots() {
        let points = [(0.0, 1.0), (1.0, 3.0), (2.0, 2.0), (3.0, -1.0)];
        let spline = CubicSpline::new(&points).unwrap();
        for (x, y) in points {
            assert!((spline.eval(x) - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reproduces_lines() {
        let points: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, 2.0 * i as f64 - 1.0)).collect();
        let spline = CubicSpline::new(&points).unwrap();
        assert!((spline.eval(4.5) - 8.0).abs() < 1e-12);
        assert!((spline.eval(-1.0) + 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_smooth_function_accuracy() {
        let points: Vec<(f64, f64)> = frange(0.0, 6.3, 0.1).map(|x| (x, x.sin())).collect();
        let spline = CubicSpline::new(&points).unwrap();
        assert!((spline.eval(3.05) - 3.05f64.sin()).abs() < 1e-4);
    }

    #[test]
    fn test_unsorted_input() {
        let spline = CubicSpline::new(&[(2.0, 4.0), (0.0, 0.0), (1.0, 1.0)]).unwrap();
        assert!((spline.eval(1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_too_few_points() {
        assert!(CubicSpline::new(&[(1.0, 1.0)]).is_err());
        assert!(CubicSpline::new(&[(1.0, 1.0), (1.0, 2.0)]).is_err());
    }

    #[test]
    fn test_frange_excludes_end() {
        let xs: Vec<f64> = frange(-1.0, 1.0, 0.5).collect();
        assert_eq!(xs, vec![-1.0, -0.5, 0.0, 0.5]);
        assert_eq!(frange(-30.0, 30.0, 0.05).count(), 1200);
        assert_eq!(frange(1.0, 0.0, 0.1).count(), 0);
    }
}
