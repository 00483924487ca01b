use crate::prelude::{SafetyError, SafetyResult};
use ndarray::{Array2, ArrayView2};

pub struct MatrixHelper;

impl MatrixHelper {
    /// Element-wise `rhs - lhs`. Shapes must match exactly; nothing is broadcast.
    pub fn difference(lhs: ArrayView2<f64>, rhs: ArrayView2<f64>) -> SafetyResult<Array2<f64>> {
        if lhs.dim() != rhs.dim() {
            return Err(SafetyError::ShapeMismatch {
                expected: lhs.dim(),
                found: rhs.dim(),
            });
        }
        Ok(&rhs - &lhs)
    }

    pub fn to_rows(matrix: ArrayView2<f64>) -> Vec<Vec<f64>> {
        matrix.outer_iter().map(|row| row.to_vec()).collect()
    }
}
