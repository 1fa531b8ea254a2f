pub mod aggregate;
pub mod catalog;
pub mod engine;
pub mod layout;
pub mod narrative;
pub mod parser;
pub mod pipeline;
pub mod report;

pub use crate::domain::model::{AssessmentOutcome, RawSubmission};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
