//! Per-line classification: spans, indentation and structural signatures.

use crate::sourcemap::ByteRange;

/// Which fence character opened a fenced code block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceSig {
    Backticks,
    Tildes,
}

/// One classified source line.
#[derive(Debug, Clone)]
pub struct LineClass {
    /// Byte offset of the line start.
    pub start: usize,
    /// Byte offset just past the line's newline (or end of input).
    pub end: usize,
    /// Byte offset of the end of the text, excluding `\r\n` / `\n`.
    pub text_end: usize,
    /// Leading whitespace in columns; a tab advances to the next multiple
    /// of four.
    pub indent: usize,
    /// Leading whitespace in bytes.
    pub indent_bytes: usize,
    pub blank: bool,
}

impl LineClass {
    pub fn span(&self) -> ByteRange {
        ByteRange::new(self.start, self.end - self.start)
    }
}

/// Splits the source into classified lines, preserving byte offsets.
pub fn classify_lines(source: &str) -> Vec<LineClass> {
    let mut lines = Vec::new();
    let mut start = 0;
    while start < source.len() {
        let (mut text_end, end) = match source[start..].find('\n') {
            Some(p) => (start + p, start + p + 1),
            None => (source.len(), source.len()),
        };
        if text_end > start && source.as_bytes()[text_end - 1] == b'\r' {
            text_end -= 1;
        }
        let text = &source[start..text_end];
        let (indent, indent_bytes) = measure_indent(text);
        lines.push(LineClass {
            start,
            end,
            text_end,
            indent,
            indent_bytes,
            blank: text.trim().is_empty(),
        });
        start = end;
    }
    lines
}

fn measure_indent(text: &str) -> (usize, usize) {
    let mut cols = 0;
    for (idx, ch) in text.char_indices() {
        match ch {
            ' ' => cols += 1,
            '\t' => cols = (cols / 4 + 1) * 4,
            _ => return (cols, idx),
        }
    }
    (cols, text.len())
}

/// Drops up to `cols` columns of leading whitespace from a line.
///
/// A tab straddling the target column is consumed whole.
pub fn strip_columns(text: &str, cols: usize) -> &str {
    let mut col = 0;
    for (idx, ch) in text.char_indices() {
        if col >= cols {
            return &text[idx..];
        }
        match ch {
            ' ' => col += 1,
            '\t' => col = (col / 4 + 1) * 4,
            _ => return &text[idx..],
        }
    }
    ""
}

// ── Structural signatures, checked against the text after indentation ──

/// ATX header: 1–6 `#` followed by whitespace or end of line.
pub fn atx_level(rem: &str) -> Option<u8> {
    let hashes = rem.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    match rem.as_bytes().get(hashes) {
        None | Some(b' ') | Some(b'\t') => Some(hashes as u8),
        _ => None,
    }
}

/// The header text: hashes and any ATX closing sequence stripped.
pub fn header_text(rem: &str) -> &str {
    let body = rem.trim_start_matches('#').trim();
    body.trim_end_matches('#').trim_end()
}

/// Horizontal rule: three or more of the same `-` / `*` / `_`, spaces
/// allowed between them.
pub fn is_hrule(rem: &str) -> bool {
    let mut marker = None;
    let mut count = 0;
    for ch in rem.chars() {
        match ch {
            ' ' | '\t' => {}
            '-' | '*' | '_' => {
                if marker.get_or_insert(ch) != &ch {
                    return false;
                }
                count += 1;
            }
            _ => return false,
        }
    }
    count >= 3
}

/// Fenced code opener/closer: three or more backticks or tildes.
pub fn fence(rem: &str) -> Option<FenceSig> {
    if rem.starts_with("```") {
        Some(FenceSig::Backticks)
    } else if rem.starts_with("~~~") {
        Some(FenceSig::Tildes)
    } else {
        None
    }
}

/// Whether a fence line closes a fence opened with `sig`.
pub fn closes_fence(rem: &str, sig: FenceSig) -> bool {
    let marker = match sig {
        FenceSig::Backticks => '`',
        FenceSig::Tildes => '~',
    };
    let run = rem.chars().take_while(|&c| c == marker).count();
    run >= 3 && rem[run..].trim().is_empty()
}

pub fn is_quote(rem: &str) -> bool {
    rem.starts_with('>')
}

/// Blockquote prefix length in bytes (`>` plus one optional space).
pub fn quote_prefix_len(rem: &str) -> usize {
    if rem.starts_with("> ") {
        2
    } else if rem.starts_with('>') {
        1
    } else {
        0
    }
}

/// List marker (`-`/`+`/`*` or `N.`), returning the byte offset of the
/// item's content within `rem`.
pub fn list_marker(rem: &str) -> Option<usize> {
    let bytes = rem.as_bytes();
    let marker_end = match bytes.first() {
        Some(b'-') | Some(b'+') | Some(b'*') => 1,
        Some(b'0'..=b'9') => {
            let digits = rem.bytes().take_while(|b| b.is_ascii_digit()).count();
            if bytes.get(digits) == Some(&b'.') {
                digits + 1
            } else {
                return None;
            }
        }
        _ => return None,
    };
    match bytes.get(marker_end) {
        None => Some(marker_end),
        Some(b' ') | Some(b'\t') => {
            let spaces = rem[marker_end..]
                .bytes()
                .take_while(|&b| b == b' ' || b == b'\t')
                .count();
            Some(marker_end + spaces)
        }
        _ => None,
    }
}

pub fn is_html_open(rem: &str) -> bool {
    rem.starts_with('<')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_offsets_and_indent() {
        let lines = classify_lines("a\n  b\n\n\tc");
        assert_eq!(lines.len(), 4);
        assert_eq!((lines[0].start, lines[0].end), (0, 2));
        assert_eq!(lines[1].indent, 2);
        assert_eq!(lines[1].indent_bytes, 2);
        assert!(lines[2].blank);
        assert_eq!(lines[3].indent, 4);
        assert_eq!(lines[3].indent_bytes, 1);
    }

    #[test]
    fn crlf_is_excluded_from_text() {
        let lines = classify_lines("ab\r\ncd");
        assert_eq!(lines[0].text_end, 2);
        assert_eq!(lines[0].end, 4);
    }

    #[test]
    fn atx_levels() {
        assert_eq!(atx_level("# Title"), Some(1));
        assert_eq!(atx_level("### Title"), Some(3));
        assert_eq!(atx_level("######"), Some(6));
        assert_eq!(atx_level("#######"), None);
        assert_eq!(atx_level("#Title"), None);
        assert_eq!(atx_level("Title"), None);
    }

    #[test]
    fn header_text_strips_closing_hashes() {
        assert_eq!(header_text("## GET ##"), "GET");
        assert_eq!(header_text("# /resource"), "/resource");
    }

    #[test]
    fn hrules() {
        assert!(is_hrule("---"));
        assert!(is_hrule("* * *"));
        assert!(is_hrule("____"));
        assert!(!is_hrule("--"));
        assert!(!is_hrule("-*-"));
        assert!(!is_hrule("--- x"));
    }

    #[test]
    fn list_markers() {
        assert_eq!(list_marker("+ item"), Some(2));
        assert_eq!(list_marker("-   item"), Some(4));
        assert_eq!(list_marker("12. item"), Some(4));
        assert_eq!(list_marker("+"), Some(1));
        assert_eq!(list_marker("+item"), None);
        assert_eq!(list_marker("12 items"), None);
        assert_eq!(list_marker("text"), None);
    }

    #[test]
    fn fences() {
        assert_eq!(fence("```rust"), Some(FenceSig::Backticks));
        assert_eq!(fence("~~~"), Some(FenceSig::Tildes));
        assert_eq!(fence("``"), None);
        assert!(closes_fence("```", FenceSig::Backticks));
        assert!(!closes_fence("``` rust", FenceSig::Backticks));
    }

    #[test]
    fn strip_columns_handles_tabs() {
        assert_eq!(strip_columns("        x", 8), "x");
        assert_eq!(strip_columns("    x", 8), "x");
        assert_eq!(strip_columns("\tx", 4), "x");
        assert_eq!(strip_columns("  \tx", 4), "x");
    }
}
