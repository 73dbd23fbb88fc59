pub mod debug_sink;
pub mod etl;
pub mod extract;
pub mod load;
pub mod pipeline;
pub mod transform;

pub use crate::domain::model::{EnrichedRecord, FetchOutcome, Record, RunSummary};
pub use crate::domain::ports::{DocumentStore, Pipeline, Storage};
pub use crate::utils::error::Result;
