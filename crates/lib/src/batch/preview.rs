/// Whitespace as a JavaScript `\s` sees it: Unicode White_Space without
/// U+0085, plus the byte order mark U+FEFF.
fn is_preview_space(ch: char) -> bool {
    ch == '\u{FEFF}' || (ch != '\u{0085}' && ch.is_whitespace())
}

/// Collapse every whitespace run to one space and keep the first `limit`
/// UTF-16 code units.
///
/// Leading and trailing whitespace is collapsed, not trimmed. A character
/// outside the Basic Multilingual Plane counts as two units; one that would
/// straddle the limit is dropped rather than split.
pub fn make_preview(text: &str, limit: usize) -> String {
    let mut out = String::with_capacity(limit.min(text.len()));
    let mut units = 0;
    let mut in_space = false;

    for ch in text.chars() {
        let ch = if is_preview_space(ch) {
            if in_space {
                continue;
            }
            in_space = true;
            ' '
        } else {
            in_space = false;
            ch
        };
        units += ch.len_utf16();
        if units > limit {
            break;
        }
        out.push(ch);
    }
    out
}
