pub mod cleaner;
pub mod combiner;
pub mod counter;
pub mod engine;
pub mod pipeline;

pub use crate::domain::model::{CleanOutcome, Classification, CountOutcome, RunReport, VariantRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
