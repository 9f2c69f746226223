pub mod client;
pub mod response;

pub use client::{OpenAiVisionClient, VisionModel};
pub use response::{collect_orders, parse_model_response, strip_code_fence};
