//! Loan approval prediction service.
//!
//! A pretrained random-forest pipeline is loaded once at startup and served
//! behind `POST /api/loan/v1/predict`; `GET /` previews the reference dataset.

pub mod config;
pub mod dataset;
pub mod error;
pub mod inference;
pub mod models;
pub mod routes;
pub mod validation;

pub use config::ServiceConfig;
pub use dataset::ReferenceDataset;
pub use error::ApiError;
pub use inference::{predict_application, Classifier, ForestPipeline, InferenceError};
pub use models::{LoanApplication, PredictionResult};
pub use routes::{configure, AppState};
pub use validation::{validate_application, ValidationError};
