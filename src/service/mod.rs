pub mod columns;
pub mod expander;
pub mod extractor;
pub mod flattener;
pub mod job;
pub mod pipeline;
pub mod translator;

pub use columns::normalize_columns;
pub use expander::{expand_order, expand_products};
pub use extractor::{ExtractionOutcome, ExtractionStats, OrderExtractor};
pub use flattener::{flatten, FlattenOptions, ScalarArrayPolicy};
pub use job::{run_extraction_job, JobReport};
pub use pipeline::{BatchOutcome, OrderPipeline};
pub use translator::translate_keys;
