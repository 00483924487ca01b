pub mod matrix;
pub mod regression;
pub mod stats;

pub use matrix::MatrixHelper;
pub use regression::{fit_single_parameter, CurveFit, CurveFitOptions, RegressionError};
pub use stats::StatsHelper;
