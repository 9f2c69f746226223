pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod storage;
pub mod vision;

pub use config::AppConfig;
pub use error::{ExtractError, JobError, MappingError, PipelineError, StorageError};
pub use models::{FlatRecord, MappingTables, NormalizedTable, RunContext};
pub use service::{OrderExtractor, OrderPipeline};
pub use vision::{OpenAiVisionClient, VisionModel};
