pub mod extract_document;
pub mod prompt;

pub use extract_document::extract_document;
pub use prompt::{build_extraction_prompt, parse_extracted_fields};
