pub mod formats;
pub mod json_utils;
pub mod table;
pub mod xml;

pub use formats::{convert_formats, format_content, format_json, minify_json, JsonFormatOptions};
pub use table::json_to_csv;
