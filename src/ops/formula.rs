//! Formula extraction: image → `{latex, explanation}`.
//!
//! The one operation with a machine-readable contract. The vision model is
//! asked for a bare JSON object; the response is unfenced (models sometimes
//! wrap JSON in ``` fences regardless of instructions) and parsed strictly.
//! A response that does not parse as JSON is a fatal
//! [`LensError::MalformedResult`] — no partial result is ever surfaced, and
//! the parse failure is not retried (the model already "succeeded" at the
//! transport level; asking again would spend tokens on the same confusion).

use crate::error::LensError;
use crate::gateway::{ContentPart, Gateway, Message};
use crate::pipeline::polish;
use crate::prompts::FORMULA_SYSTEM_PROMPT;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A successfully extracted formula. Both fields are trimmed; a field the
/// model omitted is the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaResult {
    pub latex: String,
    pub explanation: String,
}

#[derive(Deserialize)]
struct RawFormula {
    #[serde(default)]
    latex: String,
    #[serde(default)]
    explanation: String,
}

/// Extract and explain the formula in an image (base64 data URI).
pub async fn extract_formula(
    gateway: &Gateway,
    image_data_uri: &str,
) -> Result<FormulaResult, LensError> {
    let messages = [
        Message::system(FORMULA_SYSTEM_PROMPT),
        Message::user_parts(vec![
            ContentPart::text("Extract the formula from this image."),
            ContentPart::image(image_data_uri),
        ]),
    ];

    let mut options = gateway.options();
    options.json_response = true;

    let raw = gateway.complete_vision(&messages, &options).await?;
    let result = parse_formula(&raw)?;
    info!("extracted formula ({} chars of LaTeX)", result.latex.len());
    Ok(result)
}

/// Parse the model's reply into a [`FormulaResult`].
fn parse_formula(raw: &str) -> Result<FormulaResult, LensError> {
    let unfenced = polish::strip_outer_fences(raw);
    let parsed: RawFormula =
        serde_json::from_str(unfenced.trim()).map_err(|e| LensError::MalformedResult {
            detail: format!("expected a JSON object with latex/explanation: {e}"),
        })?;
    Ok(FormulaResult {
        latex: parsed.latex.trim().to_string(),
        explanation: parsed.explanation.trim().to_string(),
    })
}
