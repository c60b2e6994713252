use std::f64::consts::PI;
use std::ops::Range;

use log::debug;

use crate::error::{Result, SplineError};
use crate::polynomial::Polynomial;
use crate::spline::{BlendMode, SearchStrategy, SplineConfig};

/// Minimum number of segments scanned by the proportional search
const MIN_SEARCH_WINDOW: usize = 10;
/// The proportional search scans about 3% of the segments
const SEARCH_WINDOW_DIVISOR: usize = 33;

/// One fitted window: its polynomial and the abscissa range it is valid on.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    poly: Polynomial,
    bounds: (f64, f64),
    samples: Range<usize>,
}

impl Segment {
    pub(crate) fn new(poly: Polynomial, bounds: (f64, f64), samples: Range<usize>) -> Self {
        Self {
            poly,
            bounds,
            samples,
        }
    }

    /// The fitted polynomial
    pub fn polynomial(&self) -> &Polynomial {
        &self.poly
    }

    /// Coefficients in raw `x`, highest power first
    pub fn coefficients(&self) -> Vec<f64> {
        self.poly.power_coefficients()
    }

    /// `(x_lo, x_hi)`: abscissas at the window's first and (clamped) last sample
    pub fn bounds(&self) -> (f64, f64) {
        self.bounds
    }

    /// Sample indices the least-squares solve used
    pub fn samples(&self) -> Range<usize> {
        self.samples.clone()
    }

    /// Evaluates this segment alone, with no blending
    pub fn eval(&self, x: f64, order: usize) -> f64 {
        self.poly.eval_derivative(x, order)
    }

    fn lo(&self) -> f64 {
        self.bounds.0
    }

    fn hi(&self) -> f64 {
        self.bounds.1
    }
}

/// Weight given to the later of two overlapping segments.
///
/// `t` is the linear position inside the overlap, 0 at its start and 1 at its end.
/// The smooth mode never reaches exactly 0 or 1, so a small step remains where
/// blending starts and stops.
pub fn blend_ratio(t: f64, mode: BlendMode) -> f64 {
    match mode {
        BlendMode::Linear => t,
        BlendMode::Smooth => ((2.0 * PI * (t - 0.5)).tanh() + 1.0) / 2.0,
    }
}

/// An immutable, fitted windowed spline.
///
/// Produced by [`WindowedSpline::fit`](crate::WindowedSpline::fit). Evaluation only
/// reads the segment table, so a `FittedSpline` can be shared between threads.
#[derive(Debug, Clone)]
pub struct FittedSpline {
    config: SplineConfig,
    segments: Vec<Segment>,
    domain: (f64, f64),
}

impl FittedSpline {
    pub(crate) fn new(config: SplineConfig, segments: Vec<Segment>, domain: (f64, f64)) -> Self {
        debug_assert!(!segments.is_empty());
        Self {
            config,
            segments,
            domain,
        }
    }

    /// Returns the configuration the spline was fitted with
    pub fn config(&self) -> &SplineConfig {
        &self.config
    }

    /// The segment table
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false: a fitted spline holds at least one segment
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// First and last sample abscissas
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Value of the curve at `x`, using the configured blend mode.
    pub fn value(&self, x: f64) -> Result<f64> {
        self.value_with(x, 0, self.config.blend)
    }

    /// `order`-th derivative of the curve at `x`, using the configured blend mode.
    pub fn derivative(&self, x: f64, order: usize) -> Result<f64> {
        self.value_with(x, order, self.config.blend)
    }

    /// Evaluates the curve, or its `order`-th derivative, at `x`.
    ///
    /// Queries at or beyond the outer bounds use the first or last segment alone.
    /// Inside the domain the covering segment is located, and if `x` lies past the
    /// start of the next segment both are evaluated and mixed by [`blend_ratio`].
    /// The blend weights are applied to each segment's derivative; the weight's own
    /// slope is not included.
    ///
    /// # Arguments
    ///
    /// * `x` - Query abscissa
    /// * `order` - Derivative order (0 for the value)
    /// * `blend` - Weighting used inside overlaps
    pub fn value_with(&self, x: f64, order: usize, blend: BlendMode) -> Result<f64> {
        if x.is_nan() {
            return Err(SplineError::InvalidParameter(
                "query abscissa is NaN".to_string(),
            ));
        }

        let first = &self.segments[0];
        let last = &self.segments[self.segments.len() - 1];
        if x <= first.lo() {
            return Ok(first.eval(x, order));
        }
        if x >= last.hi() {
            return Ok(last.eval(x, order));
        }

        let i = self.locate(x)?;
        let current = &self.segments[i];
        let mut y = current.eval(x, order);

        if let Some(next) = self.segments.get(i + 1) {
            if x > next.lo() {
                // x > next.lo and x <= current.hi, so the span is positive
                let t = (x - next.lo()) / (current.hi() - next.lo());
                let ratio = blend_ratio(t, blend);
                y = y * (1.0 - ratio) + next.eval(x, order) * ratio;
            }
        }

        Ok(y)
    }

    /// Index of the first segment whose upper bound is at or past `x`.
    ///
    /// Queries outside the domain map to the first or last segment.
    pub fn locate(&self, x: f64) -> Result<usize> {
        let n = self.segments.len();
        if x <= self.segments[0].lo() {
            return Ok(0);
        }
        if x >= self.segments[n - 1].hi() {
            return Ok(n - 1);
        }

        match self.config.search {
            SearchStrategy::Binary => Ok(self.binary_search(x)),
            SearchStrategy::Proportional => {
                let scanned = self.search_window(x);
                self.scan(x, scanned.clone())
                    .ok_or(SplineError::SearchWindowTooSmall { x, scanned })
            }
            SearchStrategy::Guided => {
                let scanned = self.search_window(x);
                match self.scan(x, scanned.clone()) {
                    Some(i) => Ok(i),
                    None => {
                        debug!(
                            "proportional scan missed x = {} in segments {:?}, binary search",
                            x, scanned
                        );
                        Ok(self.binary_search(x))
                    }
                }
            }
        }
    }

    /// Segment indices scanned around the proportional index estimate
    fn search_window(&self, x: f64) -> Range<usize> {
        let n = self.segments.len();
        let width = (n / SEARCH_WINDOW_DIVISOR).max(MIN_SEARCH_WINDOW).min(n);

        let (x0, x1) = self.domain;
        let frac = (x - x0) / (x1 - x0);
        // Float to int casts saturate, and NaN maps to 0
        let estimate = (frac * n as f64) as usize;

        let start = estimate.saturating_sub(width / 2).min(n - width);
        start..start + width
    }

    fn scan(&self, x: f64, mut range: Range<usize>) -> Option<usize> {
        let start = range.start;
        let i = range.find(|&i| self.segments[i].hi() >= x)?;

        // A hit at the window start is only valid if the preceding segment ends before x
        if i == start && i > 0 && self.segments[i - 1].hi() >= x {
            return None;
        }
        Some(i)
    }

    fn binary_search(&self, x: f64) -> usize {
        self.segments
            .partition_point(|s| s.hi() < x)
            .min(self.segments.len() - 1)
    }

    /// Evaluates the curve, or its `order`-th derivative, at every query abscissa.
    #[cfg(not(feature = "parallel"))]
    pub fn sample(&self, xs: &[f64], order: usize) -> Result<Vec<f64>> {
        xs.iter().map(|&x| self.derivative(x, order)).collect()
    }

    /// Evaluates the curve, or its `order`-th derivative, at every query abscissa.
    #[cfg(feature = "parallel")]
    pub fn sample(&self, xs: &[f64], order: usize) -> Result<Vec<f64>> {
        use rayon::prelude::*;

        xs.par_iter().map(|&x| self.derivative(x, order)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spline::WindowedSpline;
    use approx::assert_abs_diff_eq;

    fn linspace(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 / (n - 1) as f64).collect()
    }

    fn fitted(config: SplineConfig, x: Vec<f64>, y: Vec<f64>) -> FittedSpline {
        WindowedSpline::new(config, x, y).unwrap().fit().unwrap()
    }

    #[test]
    fn test_blend_ratio_endpoints() {
        assert_eq!(blend_ratio(0.0, BlendMode::Linear), 0.0);
        assert_eq!(blend_ratio(1.0, BlendMode::Linear), 1.0);
        assert_abs_diff_eq!(blend_ratio(0.5, BlendMode::Smooth), 0.5, epsilon = 1e-15);

        // tanh saturates but never reaches the endpoints
        let low = blend_ratio(0.0, BlendMode::Smooth);
        assert!(low > 0.0 && low < 0.002);
        let high = blend_ratio(1.0, BlendMode::Smooth);
        assert!(high < 1.0 && high > 0.998);
    }

    #[test]
    fn test_search_window_is_clamped() {
        let x = linspace(100);
        let curve = fitted(SplineConfig::default(), x.clone(), x);

        assert_eq!(curve.search_window(0.001), 0..10);
        assert_eq!(curve.search_window(0.5), 20..30);
        assert_eq!(curve.search_window(0.999), 40..50);
    }

    #[test]
    fn test_search_strategies_agree_on_uniform_grid() {
        let x = linspace(300);
        let y: Vec<f64> = x.iter().map(|v| v.cos()).collect();
        let proportional = fitted(
            SplineConfig::default().with_search(SearchStrategy::Proportional),
            x.clone(),
            y.clone(),
        );
        let binary = fitted(
            SplineConfig::default().with_search(SearchStrategy::Binary),
            x,
            y,
        );

        for k in 1..1000 {
            let q = k as f64 / 1000.0;
            assert_eq!(proportional.locate(q).unwrap(), binary.locate(q).unwrap());
        }
    }

    #[test]
    fn test_sample_matches_pointwise_evaluation() {
        let x = linspace(200);
        let y: Vec<f64> = x.iter().map(|v| (3.0 * v).sin()).collect();
        let curve = fitted(SplineConfig::default(), x, y);

        let queries: Vec<f64> = (0..=1000).map(|k| k as f64 / 800.0 - 0.1).collect();
        for order in 0..3 {
            let pointwise: Vec<f64> = queries
                .iter()
                .map(|&q| curve.derivative(q, order).unwrap())
                .collect();
            assert_eq!(curve.sample(&queries, order).unwrap(), pointwise);
        }
    }

    #[test]
    fn test_locate_outside_domain() {
        let x = linspace(50);
        let curve = fitted(SplineConfig::default(), x.clone(), x);

        assert_eq!(curve.locate(-3.0).unwrap(), 0);
        assert_eq!(curve.locate(7.0).unwrap(), curve.len() - 1);
    }

    #[test]
    fn test_nan_query_is_rejected() {
        let x = linspace(50);
        let curve = fitted(SplineConfig::default(), x.clone(), x);
        assert!(matches!(
            curve.value(f64::NAN),
            Err(SplineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_derivative_past_degree_vanishes() {
        let x = linspace(60);
        let y: Vec<f64> = x.iter().map(|v| v.exp()).collect();
        let curve = fitted(SplineConfig::default(), x, y);

        for &q in &[-0.5, 0.0, 0.37, 0.8, 1.0, 2.0] {
            assert_eq!(curve.derivative(q, 4).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_extrapolation_uses_derivative_order() {
        let x = linspace(40);
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v * v).collect();
        let curve = fitted(SplineConfig::default(), x, y);

        assert_abs_diff_eq!(curve.derivative(-1.0, 1).unwrap(), -6.0, epsilon = 1e-6);
        assert_abs_diff_eq!(curve.derivative(2.0, 1).unwrap(), 12.0, epsilon = 1e-6);
        assert_abs_diff_eq!(curve.derivative(2.0, 2).unwrap(), 6.0, epsilon = 1e-6);
    }
}
