//! Visual style generation prompts and result validation.

use crate::ai_json::parse_ai_json;
use crate::error::CoreError;

/// System prompt for style generation calls.
pub const STYLE_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant that generates JSON configuration for visual styles.";

/// Sampling temperature for style generation.
pub const STYLE_TEMPERATURE: f32 = 0.7;

/// Build the user prompt asking for a style configuration.
pub fn build_style_prompt(description: &str) -> String {
    format!(
        "Create a visual style configuration for the following description.\n\
         Return ONLY a JSON object with the fields \"name\", \"description\", \
         \"color_palette\" (array of hex colors), \"lighting\", \"rendering\" and \
         \"prompt_keywords\" (array of strings).\n\n\
         Description:\n{}",
        description.trim()
    )
}

/// Validate a style description before sending it to the model.
pub fn validate_style_description(description: &str) -> Result<(), CoreError> {
    if description.trim().is_empty() {
        return Err(CoreError::Validation(
            "description must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Parse model output into a style object. Arrays and scalars are rejected.
pub fn parse_style(raw: &str) -> Result<serde_json::Value, CoreError> {
    let object: serde_json::Map<String, serde_json::Value> = parse_ai_json(raw)?;
    Ok(serde_json::Value::Object(object))
}
