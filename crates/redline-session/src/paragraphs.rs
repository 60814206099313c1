//! Paragraph splitting for the fan-out.

/// Split text on blank lines into trimmed, non-empty paragraphs.
/// Text without blank lines is audited as a single paragraph.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let chunks: Vec<String> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(str::to_string)
        .collect();

    if !chunks.is_empty() {
        return chunks;
    }

    let stripped = text.trim();
    if stripped.is_empty() {
        Vec::new()
    } else {
        vec![stripped.to_string()]
    }
}
