//! Deterministic cleanup of model-produced text.
//!
//! Even well-prompted models occasionally wrap their whole answer in
//! ` ```markdown ` / ` ```json ` fences despite being told not to, emit
//! CRLF line endings, or pad output with stray blank lines. These cheap
//! string rules fix the quirks without touching content, keeping the
//! prompts focused on *what to produce* rather than formatting edge-cases.
//! Each rule is a pure `&str → String` function, independently testable.

use once_cell::sync::Lazy;
use regex::Regex;

/// Clean a markdown answer (notes, chart analyses, chat replies).
///
/// Rules, in order: strip an outer code fence, normalise line endings, trim
/// trailing whitespace per line, collapse runs of blank lines, end with
/// exactly one newline.
pub fn clean_markdown(input: &str) -> String {
    let s = strip_outer_fences(input);
    let s = normalise_line_endings(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: strip an outer code fence ────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[a-zA-Z]*\s*\n(.*?)\n?```\s*$").unwrap());

/// Remove a fence wrapping the *entire* payload (any language tag —
/// `markdown`, `json`, or none). Fences inside the body are left alone.
/// Also used by formula extraction to unwrap fenced JSON before parsing.
pub fn strip_outer_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule 2: normalise line endings ───────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: trim trailing whitespace per line ────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: collapse excessive blank lines ───────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

// ── Rule 5: end with a single newline ────────────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{}\n", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_fence() {
        let input = "```markdown\n# Title\n\nBody\n```";
        assert_eq!(strip_outer_fences(input), "# Title\n\nBody");
    }

    #[test]
    fn strips_json_fence() {
        let input = "```json\n{\"latex\": \"$x$\"}\n```";
        assert_eq!(strip_outer_fences(input), "{\"latex\": \"$x$\"}");
    }

    #[test]
    fn inner_fences_survive() {
        let input = "Text\n\n```rust\nfn main() {}\n```\n\nMore";
        assert_eq!(strip_outer_fences(input), input);
    }

    #[test]
    fn clean_markdown_normalises() {
        let input = "```markdown\n# A  \r\n\r\n\r\n\r\n\r\nB\n```";
        assert_eq!(clean_markdown(input), "# A\n\n\nB\n");
    }

    #[test]
    fn whitespace_only_becomes_single_newline() {
        assert_eq!(clean_markdown("   \n \n"), "\n");
    }
}
