use std::ops::Range;

use log::{debug, trace};

use crate::curve::{FittedSpline, Segment};
use crate::error::{Result, SplineError};
use crate::polynomial::{count_distinct, Polynomial};

/// How two overlapping segments are weighted inside their shared abscissa range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Weight grows linearly across the overlap
    Linear,
    /// S-shaped `tanh` weight, flat near both ends of the overlap
    #[default]
    Smooth,
}

/// Strategy used to find the segment covering a query abscissa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStrategy {
    /// Scan a few segments around an index estimated from the query's relative
    /// position. Assumes a near-constant sampling rate and fails otherwise.
    Proportional,
    /// Proportional scan, falling back to binary search when the scan misses
    #[default]
    Guided,
    /// Binary search over the segment bounds
    Binary,
}

/// Treatment of the last windows, whose upper index is clamped to the array end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TailWindow {
    /// Fit a shortened window on its own samples while they determine the degree;
    /// otherwise shift it back onto a full window of samples ending at the
    /// clamped index. Its bounds are left untouched.
    #[default]
    Shift,
    /// Fit only the clamped samples; a window too short for the degree fails
    Clamp,
}

/// Configuration for a windowed spline fit.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineConfig {
    /// Number of consecutive samples per local fit
    pub window_size: usize,
    /// Polynomial degree of each segment
    pub degree: usize,
    /// Number of samples shared by two consecutive windows
    pub intersected_values: usize,
    /// Default blending used by `value` and `derivative`
    pub blend: BlendMode,
    /// Segment lookup strategy
    pub search: SearchStrategy,
    /// Handling of clamped windows at the array end
    pub tail: TailWindow,
}

impl SplineConfig {
    /// Creates a new configuration with validation
    pub fn new(window_size: usize, degree: usize, intersected_values: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(SplineError::InvalidParameter(
                "window size must be at least 1".to_string(),
            ));
        }
        if degree >= window_size {
            return Err(SplineError::InvalidParameter(format!(
                "degree ({}) must be less than window size ({})",
                degree, window_size
            )));
        }
        if intersected_values >= window_size {
            return Err(SplineError::InvalidParameter(format!(
                "intersected values ({}) must be less than window size ({})",
                intersected_values, window_size
            )));
        }

        Ok(Self {
            window_size,
            degree,
            intersected_values,
            blend: BlendMode::default(),
            search: SearchStrategy::default(),
            tail: TailWindow::default(),
        })
    }

    /// Stride between the start indices of consecutive windows
    pub fn offset(&self) -> usize {
        self.window_size - self.intersected_values
    }

    /// Sets the default blend mode
    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    /// Sets the segment lookup strategy
    pub fn with_search(mut self, search: SearchStrategy) -> Self {
        self.search = search;
        self
    }

    /// Sets the tail window handling
    pub fn with_tail(mut self, tail: TailWindow) -> Self {
        self.tail = tail;
        self
    }

    fn validate(&self) -> Result<()> {
        // Fields are public, so re-check before use
        Self::new(self.window_size, self.degree, self.intersected_values).map(|_| ())
    }
}

impl Default for SplineConfig {
    fn default() -> Self {
        Self {
            window_size: 5,
            degree: 3,
            intersected_values: 3,
            blend: BlendMode::Smooth,
            search: SearchStrategy::Guided,
            tail: TailWindow::Shift,
        }
    }
}

/// Samples and parameters of a spline that has not been fitted yet.
///
/// Construction validates everything that can be checked up front. Fitting is a
/// separate step that produces an immutable [`FittedSpline`].
///
/// # Example
///
/// ```rust
/// use windowed_spline::{SplineConfig, WindowedSpline};
///
/// let x: Vec<f64> = (0..100).map(|i| i as f64 / 99.0).collect();
/// let y: Vec<f64> = x.iter().map(|v| (2.0 * std::f64::consts::PI * v).sin()).collect();
///
/// let config = SplineConfig::new(5, 3, 3).expect("valid parameters");
/// let spline = WindowedSpline::new(config, x, y).expect("valid samples");
/// assert_eq!(spline.segment_count(), 50);
///
/// let curve = spline.fit().expect("fit succeeds");
/// assert!(curve.value(0.5).unwrap().abs() < 0.01);
/// ```
#[derive(Debug, Clone)]
pub struct WindowedSpline {
    config: SplineConfig,
    x: Vec<f64>,
    y: Vec<f64>,
    segments: usize,
}

impl WindowedSpline {
    /// Validates the configuration against the samples.
    ///
    /// # Arguments
    ///
    /// * `config` - Fit parameters
    /// * `x` - Abscissas, assumed non-decreasing
    /// * `y` - Ordinates, same length as `x`
    pub fn new(config: SplineConfig, x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        config.validate()?;

        if x.len() != y.len() {
            return Err(SplineError::InvalidParameter(format!(
                "x has {} samples but y has {}",
                x.len(),
                y.len()
            )));
        }
        if y.len() < 2 {
            return Err(SplineError::InvalidParameter(format!(
                "at least 2 samples are required, got {}",
                y.len()
            )));
        }

        let segments = y.len() / config.offset();
        if segments == 0 {
            return Err(SplineError::InvalidParameter(format!(
                "{} samples cannot form a segment with stride {}",
                y.len(),
                config.offset()
            )));
        }

        Ok(Self {
            config,
            x,
            y,
            segments,
        })
    }

    /// Returns the configuration
    pub fn config(&self) -> &SplineConfig {
        &self.config
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.y.len()
    }

    /// Always false: construction rejects empty samples
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Number of segments the fit will produce, `floor(len / offset)`
    pub fn segment_count(&self) -> usize {
        self.segments
    }

    /// Half-open sample range of segment `index`, with the upper index clamped to `len - 1`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= segment_count()`.
    pub fn window(&self, index: usize) -> Range<usize> {
        assert!(index < self.segments, "segment index {} out of range", index);
        let lower = index * self.config.offset();
        let upper = (lower + self.config.window_size).min(self.y.len() - 1);
        lower..upper
    }

    /// Range of samples the least-squares solve of segment `index` actually uses
    fn fit_range(&self, index: usize) -> Range<usize> {
        let window = self.window(index);
        let underdetermined = window.len() < self.config.window_size
            && count_distinct(&self.x[window.clone()]) < self.config.degree + 1;

        match self.config.tail {
            TailWindow::Shift if underdetermined => {
                window.end.saturating_sub(self.config.window_size)..window.end
            }
            _ => window,
        }
    }

    fn fit_segment(&self, index: usize) -> Result<Segment> {
        let window = self.window(index);
        let samples = self.fit_range(index);

        let poly = Polynomial::fit(
            &self.x[samples.clone()],
            &self.y[samples.clone()],
            self.config.degree,
        )
        .map_err(|reason| SplineError::FitFailure {
            segment: index,
            samples: samples.clone(),
            reason,
        })?;

        trace!(
            "segment {}: samples {:?}, bounds [{}, {}]",
            index,
            samples,
            self.x[window.start],
            self.x[window.end]
        );

        Ok(Segment::new(
            poly,
            (self.x[window.start], self.x[window.end]),
            samples,
        ))
    }

    /// Fits every segment and returns the queryable curve.
    ///
    /// Each call recomputes all segments from the samples. On failure no curve is
    /// produced, so callers never see a partially fitted table.
    pub fn fit(&self) -> Result<FittedSpline> {
        let segments = self.fit_segments()?;

        debug!(
            "fitted {} segments (window {}, degree {}, stride {}) over {} samples",
            segments.len(),
            self.config.window_size,
            self.config.degree,
            self.config.offset(),
            self.y.len()
        );

        Ok(FittedSpline::new(
            self.config.clone(),
            segments,
            (self.x[0], self.x[self.x.len() - 1]),
        ))
    }

    #[cfg(not(feature = "parallel"))]
    fn fit_segments(&self) -> Result<Vec<Segment>> {
        (0..self.segments).map(|i| self.fit_segment(i)).collect()
    }

    #[cfg(feature = "parallel")]
    fn fit_segments(&self) -> Result<Vec<Segment>> {
        use rayon::prelude::*;

        (0..self.segments)
            .into_par_iter()
            .map(|i| self.fit_segment(i))
            .collect()
    }
}
