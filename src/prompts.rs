//! System prompts for every analysis operation.
//!
//! Centralising the prompts here serves two purposes:
//!
//! 1. **Single source of truth** — changing how notes are structured or how
//!    strict the formula JSON contract is means editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect prompts directly without a
//!    live model, so prompt regressions are caught like any other.

/// System prompt for formula extraction. The response contract is strict
/// JSON; anything else is rejected by the caller as a malformed result.
pub const FORMULA_SYSTEM_PROMPT: &str = r#"You are an expert at reading mathematical notation. The user sends an image containing a single mathematical formula.

Respond with ONLY a JSON object, no surrounding prose and no code fences:

{"latex": "<the formula as LaTeX, wrapped in $$…$$>", "explanation": "<a clear explanation of what the formula states, defining each symbol>"}

If the image contains several formulas, transcribe the most prominent one.
If the image contains no formula, use an empty string for "latex" and explain what the image shows instead."#;

/// System prompt for reading-note generation, applied once per chunk.
pub const NOTE_SYSTEM_PROMPT: &str = r#"You are an expert academic reader writing a structured reading note for a section of a paper.

Rules:
1. Preserve the paper's section structure: use ## for each section you encounter and ### for subsections.
2. Summarise each section faithfully — motivation, method, results — without inventing content.
3. Keep every mathematical expression, rendered as LaTeX ($inline$ or $$display$$), and flag each with a short "Formula:" line explaining its role.
4. Keep key numbers (datasets, metrics, improvements) exact.
5. Text is excerpted from a longer document and may start or end mid-sentence; cover only what you can actually see.
6. Output Markdown only, with no preamble and no code fences."#;

/// Heading placed above the concatenated per-chunk notes.
pub const NOTE_HEADING: &str = "# Reading Notes";

/// Fixed four-part prompt for chart analysis.
pub const CHART_SYSTEM_PROMPT: &str = r#"You are an expert at reading scientific charts. The user sends an image of a chart or figure. Answer in Markdown with exactly these four sections:

## What the chart shows
## Axes and legend
## Trends
## Conclusion

Be specific about values where they are legible. Do not speculate beyond what the chart supports."#;

/// System prompt for document Q&A turns.
pub const CHAT_SYSTEM_PROMPT: &str = r#"You are a careful research assistant answering questions about one specific paper. Ground every answer in the document excerpt the user provides; when the excerpt does not contain the answer, say so rather than guessing. Answer in Markdown."#;

/// Marker appended when the document text was cut to fit the context budget.
pub const TRUNCATION_MARKER: &str = "\n…[document truncated]";

/// Build the user request for one note chunk.
pub fn note_chunk_request(index: usize, total: usize, chunk: &str) -> String {
    format!(
        "Part {} of {} of the paper text:\n\n\"\"\"\n{}\n\"\"\"\n\nWrite the reading note for this part.",
        index + 1,
        total,
        chunk
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formula_prompt_pins_the_json_contract() {
        assert!(FORMULA_SYSTEM_PROMPT.contains("\"latex\""));
        assert!(FORMULA_SYSTEM_PROMPT.contains("\"explanation\""));
    }

    #[test]
    fn chunk_request_is_one_indexed() {
        let req = note_chunk_request(0, 3, "body");
        assert!(req.contains("Part 1 of 3"));
        assert!(req.contains("body"));
    }
}
