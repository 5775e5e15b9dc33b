use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Tokenizer control markers such as `<|endoftext|>`
fn special_token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<\|[A-Za-z0-9_]+\|>").expect("valid regex"))
}

fn inline_space_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[ \t]+").expect("valid regex"))
}

fn blank_lines_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\n[ \t]*(\n[ \t]*)+\n").expect("valid regex"))
}

/// Normalize raw document or transcript text
///
/// Line endings become `\n`, control characters and tokenizer special-token
/// markers are removed, runs of spaces/tabs collapse to one space and more
/// than one blank line collapses to a single blank line.
pub fn normalize_text(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n").replace('\r', "\n");

    let text: String = text
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    let stripped = special_token_pattern().replace_all(&text, "");
    if stripped.len() != text.len() {
        debug!("Removed special token markers from input");
    }

    let collapsed = inline_space_pattern().replace_all(&stripped, " ");

    let lines: Vec<&str> = collapsed.split('\n').map(|line| line.trim_end()).collect();
    let joined = lines.join("\n");

    blank_lines_pattern()
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}
