//! Chart analysis: chart image → four-part markdown narrative.

use crate::error::LensError;
use crate::gateway::{ContentPart, Gateway, Message};
use crate::pipeline::polish;
use crate::prompts::CHART_SYSTEM_PROMPT;
use tracing::info;

/// Analyze a chart image (base64 data URI) into a fixed four-part markdown
/// answer: description, axes/legend, trends, conclusion.
pub async fn analyze_chart(gateway: &Gateway, image_data_uri: &str) -> Result<String, LensError> {
    let messages = [
        Message::system(CHART_SYSTEM_PROMPT),
        Message::user_parts(vec![
            ContentPart::text("Analyze this chart."),
            ContentPart::image(image_data_uri),
        ]),
    ];

    let raw = gateway.complete_vision(&messages, &gateway.options()).await?;
    info!("chart analysis returned {} chars", raw.len());
    Ok(polish::clean_markdown(&raw))
}
