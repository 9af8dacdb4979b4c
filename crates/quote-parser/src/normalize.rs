/// Split raw OCR text into cleaned lines.
///
/// Non-breaking spaces count as whitespace, whitespace runs collapse to one
/// space, lines are trimmed and empty ones dropped. Reading order is kept.
pub fn normalize_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(normalize_line)
        .filter(|line| !line.is_empty())
        .collect()
}

fn normalize_line(line: &str) -> String {
    line.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
