//! Domain models and error types shared by the pipeline stages.

pub mod errors;
pub mod model;
