use nalgebra::{DMatrix, DVector};

/// A polynomial fitted to one window of samples.
///
/// Coefficients are stored highest power first in the local variable
/// `t = (x - center) / scale`, where `center` and `scale` are the midpoint and
/// half-width of the window's abscissas. Use [`Polynomial::power_coefficients`]
/// to get the same polynomial expressed in raw `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coeffs: Vec<f64>,
    center: f64,
    scale: f64,
}

impl Polynomial {
    /// Fits a polynomial of degree `degree` to `(x, y)` by least squares.
    ///
    /// The Vandermonde matrix is built on the centered and scaled abscissas and the
    /// normal equations `A^T A c = A^T y` are solved with an LU decomposition.
    /// Returns a description of the problem when the system is degenerate.
    pub(crate) fn fit(x: &[f64], y: &[f64], degree: usize) -> Result<Self, String> {
        if x.len() != y.len() {
            return Err(format!("{} abscissas but {} ordinates", x.len(), y.len()));
        }
        if x.is_empty() {
            return Err("window holds no samples".to_string());
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err("window holds non-finite samples".to_string());
        }

        let distinct = count_distinct(x);
        if distinct < degree + 1 {
            return Err(format!(
                "{} distinct abscissas cannot determine a degree {} polynomial",
                distinct, degree
            ));
        }

        let (lo, hi) = x
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let center = 0.5 * (lo + hi);
        let half_width = 0.5 * (hi - lo);
        let scale = if half_width > 0.0 { half_width } else { 1.0 };

        let num_points = x.len();
        let mut vandermonde = DMatrix::<f64>::zeros(num_points, degree + 1);
        for i in 0..num_points {
            let t = (x[i] - center) / scale;
            for j in 0..=degree {
                vandermonde[(i, j)] = t.powi(j as i32);
            }
        }

        let ata = vandermonde.transpose() * &vandermonde;
        let aty = vandermonde.transpose() * DVector::from_column_slice(y);

        let ascending = ata
            .lu()
            .solve(&aty)
            .ok_or_else(|| "normal equations are singular".to_string())?;

        if ascending.iter().any(|c| !c.is_finite()) {
            return Err("least-squares solve produced non-finite coefficients".to_string());
        }

        Ok(Self {
            coeffs: ascending.iter().rev().copied().collect(),
            center,
            scale,
        })
    }

    /// The zero polynomial, centered on `center` with unit scale
    pub(crate) fn zero(center: f64) -> Self {
        Self {
            coeffs: vec![0.0],
            center,
            scale: 1.0,
        }
    }

    /// Degree of the stored coefficient vector
    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    /// Coefficients in the local variable, highest power first
    pub fn coefficients(&self) -> &[f64] {
        &self.coeffs
    }

    /// Abscissa mapped to `t = 0`
    pub fn center(&self) -> f64 {
        self.center
    }

    /// Abscissa distance mapped to `t = 1`
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Evaluates the polynomial at `x` with Horner's scheme.
    pub fn eval(&self, x: f64) -> f64 {
        let t = (x - self.center) / self.scale;
        self.coeffs.iter().fold(0.0, |acc, &c| acc * t + c)
    }

    /// Returns the `order`-th derivative with respect to `x`.
    ///
    /// Differentiating past the degree yields the zero polynomial.
    pub fn derivative(&self, order: usize) -> Polynomial {
        if order == 0 {
            return self.clone();
        }
        if order > self.degree() {
            return Polynomial::zero(self.center);
        }

        let mut coeffs = self.coeffs.clone();
        for _ in 0..order {
            let n = coeffs.len() - 1;
            // d/dx = (1 / scale) d/dt
            coeffs = coeffs[..n]
                .iter()
                .enumerate()
                .map(|(i, &c)| c * (n - i) as f64 / self.scale)
                .collect();
        }

        Polynomial {
            coeffs,
            center: self.center,
            scale: self.scale,
        }
    }

    /// Evaluates the `order`-th derivative at `x` without allocating when `order == 0`.
    pub fn eval_derivative(&self, x: f64, order: usize) -> f64 {
        if order == 0 {
            self.eval(x)
        } else {
            self.derivative(order).eval(x)
        }
    }

    /// Coefficients expanded in raw `x`, highest power first.
    ///
    /// This matches the layout returned by a classic `polyfit`, at the cost of the
    /// conditioning the local representation provides.
    pub fn power_coefficients(&self) -> Vec<f64> {
        let degree = self.degree();
        let mut ascending = vec![0.0; degree + 1];

        for (k, &a) in self.coeffs.iter().rev().enumerate() {
            // a * ((x - center) / scale)^k, expanded binomially
            let a_k = a / self.scale.powi(k as i32);
            let mut binomial = 1.0;
            for j in 0..=k {
                if j > 0 {
                    binomial = binomial * (k - j + 1) as f64 / j as f64;
                }
                ascending[j] += a_k * binomial * (-self.center).powi((k - j) as i32);
            }
        }

        ascending.reverse();
        ascending
    }
}

pub(crate) fn count_distinct(x: &[f64]) -> usize {
    let mut sorted = x.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup();
    sorted.len()
}
