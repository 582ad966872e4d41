//! Numeric backend: Hardy Z functions and zero search
//!
//! The built-in backend evaluates the Riemann zeta function on the critical
//! line with Borwein's alternating series for the Dirichlet eta function.
//! Other families rely on stored zeros and plot points.

use num_complex::Complex64;
use std::f64::consts::PI;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Real-valued function on the critical line whose zeros are the zeros of L
pub trait HardyZ: Send + Sync + fmt::Debug {
    /// `Z(t)`, real for real `t`
    fn z(&self, t: f64) -> f64;
}

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_13,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// Complex log-gamma for `Re(z) >= 0.5`, Lanczos approximation
fn ln_gamma_right(z: Complex64) -> Complex64 {
    let z = z - 1.0;
    let mut x = Complex64::new(LANCZOS_COEFFICIENTS[0], 0.0);
    for (i, &c) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
        x += c / (z + i as f64);
    }
    let t = z + LANCZOS_G + 0.5;
    0.5 * (2.0 * PI).ln() + (z + 0.5) * t.ln() - t + x.ln()
}

/// Complex log-gamma up to multiples of `2πi`
pub fn ln_gamma(z: Complex64) -> Complex64 {
    if z.re >= 0.5 {
        ln_gamma_right(z)
    } else {
        ln_gamma_right(z + 1.0) - z.ln()
    }
}

/// Riemann-Siegel theta, modulo `2π`
pub fn riemann_siegel_theta(t: f64) -> f64 {
    ln_gamma(Complex64::new(0.25, t / 2.0)).im - t / 2.0 * PI.ln()
}

/// Riemann zeta on the critical strip through the eta function
#[derive(Debug, Clone)]
pub struct RiemannZetaBackend {
    /// Borwein weights `d_0 ..= d_n`
    weights: Vec<f64>,
}

impl Default for RiemannZetaBackend {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RiemannZetaBackend {
    /// Backend using `terms` terms of the alternating series
    pub fn new(terms: usize) -> Self {
        let n = terms as f64;
        let mut weights = Vec::with_capacity(terms + 1);
        let mut term = 1.0;
        let mut sum = 0.0;
        for i in 0..=terms {
            sum += term;
            weights.push(sum);
            let i = i as f64;
            term *= 4.0 * (n + i) * (n - i) / ((2.0 * i + 1.0) * (2.0 * i + 2.0));
        }
        RiemannZetaBackend { weights }
    }

    /// Dirichlet eta function `sum (-1)^(k-1) k^-s`
    pub fn eta(&self, s: Complex64) -> Complex64 {
        let n = self.weights.len() - 1;
        let dn = self.weights[n];
        let mut acc = Complex64::new(0.0, 0.0);
        for k in 0..n {
            let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
            let base = Complex64::new((k + 1) as f64, 0.0);
            acc += sign * (self.weights[k] - dn) / base.powc(s);
        }
        -acc / dn
    }

    /// Riemann zeta for `s != 1` with `Re(s) > 0`
    pub fn zeta(&self, s: Complex64) -> Complex64 {
        let two = Complex64::new(2.0, 0.0);
        self.eta(s) / (1.0 - two.powc(1.0 - s))
    }
}

impl HardyZ for RiemannZetaBackend {
    fn z(&self, t: f64) -> f64 {
        let zeta = self.zeta(Complex64::new(0.5, t));
        (Complex64::from_polar(1.0, riemann_siegel_theta(t)) * zeta).re
    }
}

const BISECTION_STEPS: usize = 60;

fn bisect(f: &dyn HardyZ, mut lo: f64, mut hi: f64, mut f_lo: f64) -> f64 {
    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        let f_mid = f.z(mid);
        if f_mid == 0.0 {
            return mid;
        }
        if (f_mid < 0.0) == (f_lo < 0.0) {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1e-12 {
            break;
        }
    }
    0.5 * (lo + hi)
}

fn round_zero(z: f64) -> f64 {
    (z * 1e9).round() / 1e9
}

/// Zeros located by sign changes of `Z` on a grid over `[lower, upper]`
///
/// Stops early once `time_allowed` has elapsed, returning what was found.
pub fn heuristic_zeros(
    f: &dyn HardyZ,
    lower: f64,
    upper: f64,
    step: f64,
    time_allowed: Duration,
) -> Vec<f64> {
    let started = Instant::now();
    let mut zeros = Vec::new();
    let mut t = lower;
    let mut value = f.z(t);
    while t < upper {
        if started.elapsed() > time_allowed {
            warn!("zero scan stopped at t = {:.2} after {:?}", t, time_allowed);
            break;
        }
        let next = t + step;
        let next_value = f.z(next);
        if value == 0.0 {
            zeros.push(round_zero(t));
        } else if (value < 0.0) != (next_value < 0.0) && next_value != 0.0 {
            zeros.push(round_zero(bisect(f, t, next, value)));
        }
        t = next;
        value = next_value;
    }
    debug!("found {} zeros in [{}, {}]", zeros.len(), lower, upper);
    zeros
}

/// Scan outward from 0 in direction `dir` until `count` zeros are found
fn zeros_in_direction(
    f: &dyn HardyZ,
    count: usize,
    dir: f64,
    limit: f64,
    deadline: Instant,
) -> Vec<f64> {
    const STEP: f64 = 0.05;
    let mut zeros = Vec::with_capacity(count);
    let mut t = 0.0;
    let mut value = f.z(t);
    while zeros.len() < count && t.abs() < limit && Instant::now() < deadline {
        let next = t + dir * STEP;
        let next_value = f.z(next);
        if (value < 0.0) != (next_value < 0.0) && next_value != 0.0 {
            let (lo, hi, f_lo) = if dir > 0.0 {
                (t, next, value)
            } else {
                (next, t, next_value)
            };
            zeros.push(round_zero(bisect(f, lo, hi, f_lo)));
        }
        t = next;
        value = next_value;
    }
    zeros
}

/// The first `count` zeros above 0, and below 0 too when `do_negative`
///
/// Results are sorted. The search gives up at `|t| = limit` or when
/// `time_allowed` has elapsed.
pub fn counted_zeros(
    f: &dyn HardyZ,
    count: usize,
    do_negative: bool,
    limit: f64,
    time_allowed: Duration,
) -> Vec<f64> {
    let deadline = Instant::now() + time_allowed;
    let mut zeros = zeros_in_direction(f, count, 1.0, limit, deadline);
    if do_negative {
        zeros.extend(zeros_in_direction(f, count, -1.0, limit, deadline));
    }
    zeros.sort_by(|a, b| a.total_cmp(b));
    zeros
}
