//! Client side of the loan approval service: the guided form, raw JSON
//! submission and rendering of decisions.

pub mod client;
pub mod form;
pub mod render;
pub mod session;
pub mod settings;

pub use client::{ClientError, Decision, LoanClient};
pub use form::ApplicantForm;
pub use settings::{ClientSettings, ProbabilityFormat};
