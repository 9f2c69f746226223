pub mod csv_export;
pub mod json_store;
pub mod scanner;

pub use csv_export::write_table_csv;
pub use json_store::{load_orders_json, save_orders_json};
pub use scanner::{is_image_file, scan_images};
