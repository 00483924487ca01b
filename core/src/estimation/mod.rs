pub mod dataset;
pub mod drag_fit;

pub use dataset::{EmpiricalDataset, Observation};
pub use drag_fit::{
    fit_dataset, model_rms_error, predicted_velocity, CombinedEstimate, DatasetFit,
    DragCoefficientEstimator, FailurePolicy, FitReport, FitSettings,
};
