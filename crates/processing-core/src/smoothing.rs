//! Trajectory smoothing with a Savitzky-Golay filter.
//!
//! Each sample is replaced by the value of a low-order polynomial fitted by
//! least squares to the window around it. This suppresses tracking jitter
//! while keeping the shape of fast, genuine movements (peaks are not
//! flattened the way a moving average flattens them).
//!
//! Missing samples split a series into runs; each run is smoothed on its own
//! and runs shorter than the window pass through unchanged. Near the ends of
//! a run the polynomial fitted to the first/last full window is evaluated at
//! the edge positions.

use pawtrace_model::params::AnalysisParams;
use pawtrace_model::sample::{Sample, Trajectory};

/// Savitzky-Golay smoother applied to x and y independently.
#[derive(Debug, Clone)]
pub struct TrajectorySmoother {
    window: usize,
    polyorder: usize,
}

impl TrajectorySmoother {
    /// Create a smoother with the given window length and polynomial order.
    pub fn new(window: usize, polyorder: usize) -> Self {
        Self { window, polyorder }
    }

    /// Build a smoother from run parameters.
    pub fn from_params(params: &AnalysisParams) -> Self {
        Self::new(params.smoothing_window, params.smoothing_polyorder)
    }

    /// Smooth both axes of a trajectory.
    pub fn smooth(&self, trajectory: &Trajectory) -> Trajectory {
        let xs = self.smooth_series(&trajectory.xs());
        let ys = self.smooth_series(&trajectory.ys());

        let samples = trajectory
            .samples()
            .iter()
            .zip(xs.into_iter().zip(ys))
            .map(|(s, (x, y))| Sample { x, y, ..*s })
            .collect();
        trajectory.with_samples(samples)
    }

    /// Smooth a series with gaps, one contiguous run at a time.
    pub fn smooth_series(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        let Some(kernel) = SavGolKernel::new(self.window, self.polyorder) else {
            tracing::warn!(
                window = self.window,
                polyorder = self.polyorder,
                "invalid smoothing configuration; passing series through"
            );
            return values.to_vec();
        };

        let mut out = values.to_vec();
        let mut i = 0;
        while i < values.len() {
            if values[i].is_none() {
                i += 1;
                continue;
            }
            let start = i;
            while i < values.len() && values[i].is_some() {
                i += 1;
            }
            let run: Vec<f64> = values[start..i].iter().flatten().copied().collect();
            for (slot, v) in out[start..i].iter_mut().zip(kernel.apply(&run)) {
                *slot = Some(v);
            }
        }
        out
    }
}

impl Default for TrajectorySmoother {
    fn default() -> Self {
        Self::new(7, 2)
    }
}

/// Precomputed convolution weights for every position in a window.
struct SavGolKernel {
    window: usize,
    /// `weights[p]` evaluates the fit at window position `p`.
    weights: Vec<Vec<f64>>,
}

impl SavGolKernel {
    fn new(window: usize, polyorder: usize) -> Option<Self> {
        if window == 0 || window % 2 == 0 || polyorder >= window {
            return None;
        }
        let half = (window / 2) as f64;
        let weights = (0..window)
            .map(|p| fit_weights(window, polyorder, p as f64 - half))
            .collect::<Option<Vec<_>>>()?;
        Some(Self { window, weights })
    }

    fn apply(&self, run: &[f64]) -> Vec<f64> {
        let n = run.len();
        if n < self.window {
            return run.to_vec();
        }

        let half = self.window / 2;
        let dot = |w: &[f64], slice: &[f64]| w.iter().zip(slice).map(|(a, b)| a * b).sum::<f64>();

        let mut out = Vec::with_capacity(n);
        let head = &run[..self.window];
        for p in 0..half {
            out.push(dot(&self.weights[p], head));
        }
        for i in half..n - half {
            out.push(dot(&self.weights[half], &run[i - half..=i + half]));
        }
        let tail = &run[n - self.window..];
        for p in half + 1..self.window {
            out.push(dot(&self.weights[p], tail));
        }
        out
    }
}

/// Least-squares weights that evaluate a `polyorder` fit over a centered
/// window at offset `at` from the window center.
fn fit_weights(window: usize, polyorder: usize, at: f64) -> Option<Vec<f64>> {
    let half = (window / 2) as f64;
    let terms = polyorder + 1;
    let offsets: Vec<f64> = (0..window).map(|j| j as f64 - half).collect();

    // Normal matrix J^T J with J[j][k] = offset_j^k.
    let mut normal = vec![vec![0.0; terms]; terms];
    for (r, row) in normal.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = offsets.iter().map(|t| t.powi((r + c) as i32)).sum();
        }
    }
    let rhs: Vec<f64> = (0..terms).map(|k| at.powi(k as i32)).collect();
    let coeffs = solve(normal, rhs)?;

    Some(
        offsets
            .iter()
            .map(|t| {
                coeffs
                    .iter()
                    .enumerate()
                    .map(|(k, c)| c * t.powi(k as i32))
                    .sum()
            })
            .collect(),
    )
}

/// Solve a small dense system by Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}
