//! Synchronous visual style generation.

use dramagen_core::error::CoreError;
use dramagen_core::providers::{GenerateOptions, ResponseFormat, TextGenerator};
use dramagen_core::style::{
    build_style_prompt, parse_style, validate_style_description, STYLE_SYSTEM_PROMPT,
    STYLE_TEMPERATURE,
};

/// Ask the text model for a style configuration and return it as a JSON object.
pub async fn generate_style(
    text: &dyn TextGenerator,
    description: &str,
) -> Result<serde_json::Value, CoreError> {
    validate_style_description(description)?;

    let options = GenerateOptions::default()
        .with_temperature(STYLE_TEMPERATURE)
        .with_response_format(ResponseFormat::JsonObject);

    let raw = text
        .generate(
            &build_style_prompt(description),
            Some(STYLE_SYSTEM_PROMPT),
            &options,
        )
        .await?;

    parse_style(&raw).inspect_err(|e| {
        tracing::warn!(error = %e, %raw, "Style output could not be parsed");
    })
}
