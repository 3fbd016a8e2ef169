//! Extraction prompt construction and response parsing.

use openai_client::strip_code_blocks;
use serde_json::{Map, Value};
use tracing::warn;

/// Build the instruction sent with the document.
///
/// With `fields`, the model extracts exactly those keys. Without, it picks the
/// relevant fields itself.
pub fn build_extraction_prompt(description: &str, fields: Option<&[String]>) -> String {
    let field_clause = match fields.filter(|f| !f.is_empty()) {
        Some(fields) => format!(
            "From the provided document, extract the following specific fields: {}.",
            fields.join(", ")
        ),
        None => "From the provided document, decide which data fields are relevant and extract all of them."
            .to_string(),
    };

    let description = description.trim();
    let description_line = if description.is_empty() {
        String::new()
    } else {
        format!("\nDocument description: {}\n", description)
    };

    format!(
        "You are an expert data extractor. {field_clause}\n{description_line}\n\
Return the extracted data as a single flat JSON object where keys are the field names \
and values are the extracted values. If a field is not found, set its value to null.\n\
Do not include any other text or formatting, only the JSON object."
    )
}

/// Parse the model's response text into a field map.
///
/// Empty, unparsable, or non-object responses yield an empty map.
pub fn parse_extracted_fields(text: &str) -> Map<String, Value> {
    let body = strip_code_blocks(text);
    if body.is_empty() {
        warn!("Model returned an empty response");
        return Map::new();
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(fields)) => fields,
        Ok(other) => {
            warn!(kind = json_kind(&other), "Model response is not a JSON object");
            Map::new()
        }
        Err(e) => {
            warn!(error = %e, response = %body, "Failed to parse model response as JSON");
            Map::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
