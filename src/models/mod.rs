pub mod mapping;
pub mod order;
pub mod run;
pub mod table;

pub use mapping::{MappingTables, SynonymRule};
pub use order::{is_blank, scalar_to_text, FlatRecord, ImageSource, PathMetadata, PRODUCT_LIST_KEY};
pub use run::RunContext;
pub use table::{BatchStats, NormalizedTable};
