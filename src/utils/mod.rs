pub mod formatter;

pub use formatter::{ResponseFormat, ResponseFormatter, pretty_body, pretty_json};
