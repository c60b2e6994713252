//! # Windowed Spline
//!
//! Smooths a sampled one-dimensional signal with a chain of overlapping, low-degree
//! least-squares polynomials and evaluates the result, or its derivatives, at
//! arbitrary abscissas.
//!
//! The samples are cut into windows of `window_size` consecutive points, each
//! sharing `intersected_values` points with the next. Every window gets its own
//! polynomial fit. Where two windows overlap, their values are blended with a
//! weight that moves from the earlier to the later segment across the overlap,
//! so the curve has no jumps at the joins. Derivatives are blended the same way;
//! they are not guaranteed to be continuous.
//!
//! ## Features
//!
//! - Two-phase lifecycle: validate with [`WindowedSpline::new`], fit into an
//!   immutable [`FittedSpline`]
//! - Smooth (`tanh`) or linear blending inside overlaps
//! - Fast proportional segment lookup for evenly sampled data, with a binary-search fallback
//! - Derivatives of any order
//! - Optional `parallel` feature fitting segments and sampling the curve with rayon
//!
//! ## Example
//!
//! ```rust
//! use windowed_spline::{SplineConfig, WindowedSpline};
//!
//! let x: Vec<f64> = (0..50).map(|i| i as f64 * 0.02).collect();
//! let y: Vec<f64> = x.iter().map(|t| t * t).collect();
//!
//! let config = SplineConfig::new(5, 3, 3).expect("Invalid parameters");
//! let curve = WindowedSpline::new(config, x, y)
//!     .and_then(|s| s.fit())
//!     .expect("Fit failed");
//!
//! let velocity = curve.derivative(0.5, 1).unwrap();
//! assert!((velocity - 1.0).abs() < 1e-6);
//! ```

mod csv_utils;
mod curve;
mod error;
mod polynomial;
mod spline;

pub use csv_utils::{read_columns_from, read_csv_column, read_csv_columns};
pub use curve::{blend_ratio, FittedSpline, Segment};
pub use error::{Result, SplineError};
pub use polynomial::Polynomial;
pub use spline::{BlendMode, SearchStrategy, SplineConfig, TailWindow, WindowedSpline};

/// Fits a windowed spline with the default parameters.
///
/// Uses windows of 5 samples sharing 3 with their neighbour and cubic segments,
/// which suits densely sampled trajectories.
///
/// # Arguments
///
/// * `x` - Abscissas, assumed non-decreasing
/// * `y` - Ordinates
///
/// # Example
///
/// ```rust
/// use windowed_spline::fit;
///
/// let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
/// let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
/// let curve = fit(&x, &y).unwrap();
/// assert!((curve.value(7.5).unwrap() - 16.0).abs() < 1e-9);
/// ```
pub fn fit(x: &[f64], y: &[f64]) -> Result<FittedSpline> {
    WindowedSpline::new(SplineConfig::default(), x.to_vec(), y.to_vec())?.fit()
}

/// Evaluates the `order`-th derivative of a default-parameter fit at each query point.
///
/// # Returns
///
/// A Result containing one value per query abscissa, or an error
pub fn derivative(x: &[f64], y: &[f64], queries: &[f64], order: usize) -> Result<Vec<f64>> {
    fit(x, y)?.sample(queries, order)
}
