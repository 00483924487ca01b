//! Single-parameter nonlinear least squares (Levenberg-Marquardt).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegressionError {
    #[error("need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[error("{xs} abscissae but {ys} ordinates")]
    LengthMismatch { xs: usize, ys: usize },
    #[error("no convergence within {iterations} iterations (last parameter {parameter})")]
    IterationLimit { iterations: usize, parameter: f64 },
    #[error("model is insensitive to the parameter at {parameter}")]
    SingularJacobian { parameter: f64 },
    #[error("residuals became non-finite at parameter {parameter}")]
    NonFinite { parameter: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveFitOptions {
    pub initial: f64,
    pub max_iterations: usize,
    /// Relative tolerance on both the parameter step and the RSS reduction.
    pub tolerance: f64,
}

impl Default for CurveFitOptions {
    fn default() -> Self {
        Self {
            initial: 1.0,
            max_iterations: 400,
            tolerance: f64::EPSILON.sqrt(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveFit {
    pub parameter: f64,
    /// Covariance of the parameter, `RSS / (n - 1) / (J^T J)`.
    pub variance: f64,
    pub residual_sum_squares: f64,
    pub iterations: usize,
}

fn residual_sum_squares<F>(xs: &[f64], ys: &[f64], model: &F, parameter: f64) -> f64
where
    F: Fn(f64, f64) -> f64,
{
    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| {
            let r = y - model(x, parameter);
            r * r
        })
        .sum()
}

/// Gradient `J^T r` and Gauss-Newton curvature `J^T J` at `parameter`.
fn normal_terms<F, D>(xs: &[f64], ys: &[f64], model: &F, derivative: &D, parameter: f64) -> (f64, f64)
where
    F: Fn(f64, f64) -> f64,
    D: Fn(f64, f64) -> f64,
{
    xs.iter().zip(ys).fold((0.0, 0.0), |(g, h), (&x, &y)| {
        let j = derivative(x, parameter);
        (g + j * (y - model(x, parameter)), h + j * j)
    })
}

/// Fits `y = model(x, p)` over the single parameter `p`.
///
/// `derivative(x, p)` must return `d model / d p`.
pub fn fit_single_parameter<F, D>(
    xs: &[f64],
    ys: &[f64],
    model: F,
    derivative: D,
    options: CurveFitOptions,
) -> Result<CurveFit, RegressionError>
where
    F: Fn(f64, f64) -> f64,
    D: Fn(f64, f64) -> f64,
{
    if xs.len() != ys.len() {
        return Err(RegressionError::LengthMismatch {
            xs: xs.len(),
            ys: ys.len(),
        });
    }
    if xs.len() < 2 {
        return Err(RegressionError::InsufficientData {
            required: 2,
            actual: xs.len(),
        });
    }

    let tol = options.tolerance;
    let mut parameter = options.initial;
    let mut rss = residual_sum_squares(xs, ys, &model, parameter);
    if !rss.is_finite() {
        return Err(RegressionError::NonFinite { parameter });
    }

    let mut lambda = 1e-3;
    let mut converged = false;
    let mut iterations = 0;

    while iterations < options.max_iterations {
        iterations += 1;

        let (gradient, curvature) = normal_terms(xs, ys, &model, &derivative, parameter);
        if !curvature.is_finite() || curvature == 0.0 {
            return Err(RegressionError::SingularJacobian { parameter });
        }
        if gradient == 0.0 {
            converged = true;
            break;
        }

        let step = gradient / (curvature * (1.0 + lambda));
        let candidate = parameter + step;
        let candidate_rss = residual_sum_squares(xs, ys, &model, candidate);
        let small_step = step.abs() <= tol * (parameter.abs() + tol);

        if candidate_rss.is_finite() && candidate_rss <= rss {
            let reduction = rss - candidate_rss;
            parameter = candidate;
            rss = candidate_rss;
            lambda = (lambda / 10.0).max(1e-12);
            if small_step || reduction <= tol * rss {
                converged = true;
                break;
            }
        } else {
            // Rejected; shrink the step. Once even the damped step is negligible
            // the current parameter is the minimum we can reach.
            if small_step {
                converged = true;
                break;
            }
            lambda *= 10.0;
        }
    }

    if !converged {
        return Err(RegressionError::IterationLimit {
            iterations,
            parameter,
        });
    }

    let (_, curvature) = normal_terms(xs, ys, &model, &derivative, parameter);
    if !curvature.is_finite() || curvature == 0.0 {
        return Err(RegressionError::SingularJacobian { parameter });
    }
    let dof = (xs.len() - 1) as f64;
    Ok(CurveFit {
        parameter,
        variance: rss / dof / curvature,
        residual_sum_squares: rss,
        iterations,
    })
}
