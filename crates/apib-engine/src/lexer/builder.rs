//! Block construction over classified lines.
//!
//! `BlockBuilder` walks the line list recursively, one nesting level at a
//! time. `base` is the column where the current level's content starts;
//! content indented four or more columns past it is an indented code block,
//! list item children live at `base + 4`.

use crate::blocks::{Block, BlockKind};
use crate::sourcemap::SourceMap;

use super::classify::{
    FenceSig, LineClass, atx_level, classify_lines, closes_fence, fence, header_text, is_hrule,
    is_html_open, is_quote, list_marker, quote_prefix_len, strip_columns,
};

pub struct BlockBuilder<'a> {
    source: &'a str,
    lines: Vec<LineClass>,
    out: Vec<Block>,
}

impl<'a> BlockBuilder<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            lines: classify_lines(source),
            out: Vec::new(),
        }
    }

    pub fn build(mut self) -> Vec<Block> {
        let end = self.lines.len();
        self.blocks(0, end, 0);
        self.out
    }

    /// The line's text without its newline.
    fn text(&self, i: usize) -> &'a str {
        let lc = &self.lines[i];
        &self.source[lc.start..lc.text_end]
    }

    /// The line's text after leading whitespace.
    fn rem(&self, i: usize) -> &'a str {
        let lc = &self.lines[i];
        &self.source[lc.start + lc.indent_bytes..lc.text_end]
    }

    /// Union of the byte spans of lines `i..j`.
    fn span_of(&self, i: usize, j: usize) -> SourceMap {
        let mut span = SourceMap::new();
        for lc in &self.lines[i..j] {
            span.append(lc.span());
        }
        span
    }

    fn blocks(&mut self, mut i: usize, end: usize, base: usize) {
        while i < end {
            if self.lines[i].blank {
                i += 1;
                continue;
            }
            if self.lines[i].indent >= base + 4 {
                i = self.indented_code(i, end, base + 4);
                continue;
            }
            let rem = self.rem(i);
            if base == 0
                && let Some(level) = atx_level(rem)
            {
                let span = self.span_of(i, i + 1);
                self.out
                    .push(Block::new(BlockKind::Header, header_text(rem), level, span));
                i += 1;
                continue;
            }
            if is_hrule(rem) {
                let span = self.span_of(i, i + 1);
                self.out.push(Block::new(BlockKind::HRule, "", 0, span));
                i += 1;
                continue;
            }
            if let Some(sig) = fence(rem) {
                i = self.fenced_code(i, end, base, sig);
                continue;
            }
            if is_quote(rem) {
                i = self.quote(i, end);
                continue;
            }
            if list_marker(rem).is_some() {
                i = self.list(i, end, base);
                continue;
            }
            if base == 0 && is_html_open(rem) {
                i = self.html(i, end);
                continue;
            }
            i = self.paragraph(i, end, base);
        }
    }

    /// Indented code: consecutive lines at `required` columns or deeper,
    /// interior blank lines allowed. Content is de-indented by `required`
    /// columns, newlines preserved, no trailing newline.
    fn indented_code(&mut self, i: usize, end: usize, required: usize) -> usize {
        let start = i;
        let mut content: Vec<&str> = Vec::new();
        let mut j = i;
        while j < end {
            if self.lines[j].blank {
                let mut k = j;
                while k < end && self.lines[k].blank {
                    k += 1;
                }
                if k < end && self.lines[k].indent >= required {
                    content.extend(std::iter::repeat_n("", k - j));
                    j = k;
                    continue;
                }
                break;
            }
            if self.lines[j].indent < required {
                break;
            }
            content.push(strip_columns(self.text(j), required));
            j += 1;
        }
        let span = self.span_of(start, j);
        self.out
            .push(Block::new(BlockKind::Code, content.join("\n"), 0, span));
        j
    }

    fn fenced_code(&mut self, i: usize, end: usize, base: usize, sig: FenceSig) -> usize {
        let start = i;
        let mut content: Vec<&str> = Vec::new();
        let mut j = i + 1;
        while j < end {
            if !self.lines[j].blank && closes_fence(self.rem(j), sig) {
                j += 1;
                let span = self.span_of(start, j);
                self.out
                    .push(Block::new(BlockKind::Code, content.join("\n"), 0, span));
                return j;
            }
            content.push(strip_columns(self.text(j), base));
            j += 1;
        }
        // unterminated fence: emit what was gathered
        let span = self.span_of(start, j);
        self.out
            .push(Block::new(BlockKind::Code, content.join("\n"), 0, span));
        j
    }

    fn quote(&mut self, i: usize, end: usize) -> usize {
        let mut j = i;
        let mut content: Vec<&str> = Vec::new();
        while j < end && !self.lines[j].blank && is_quote(self.rem(j)) {
            let rem = self.rem(j);
            content.push(&rem[quote_prefix_len(rem)..]);
            j += 1;
        }
        let span = self.span_of(i, j);
        self.out
            .push(Block::marker(BlockKind::QuoteBegin, SourceMap::new()));
        self.out.push(Block::new(
            BlockKind::Paragraph,
            content.join("\n"),
            0,
            span.clone(),
        ));
        self.out.push(Block::new(BlockKind::QuoteEnd, "", 0, span));
        j
    }

    fn html(&mut self, i: usize, end: usize) -> usize {
        let mut j = i;
        let mut content: Vec<&str> = Vec::new();
        while j < end && !self.lines[j].blank {
            content.push(self.text(j));
            j += 1;
        }
        let span = self.span_of(i, j);
        self.out
            .push(Block::new(BlockKind::Html, content.join("\n"), 0, span));
        j
    }

    fn paragraph(&mut self, i: usize, end: usize, base: usize) -> usize {
        let mut j = i;
        let mut content: Vec<&str> = Vec::new();
        while j < end && !self.lines[j].blank {
            if j > i && self.stops_paragraph(j, base) {
                break;
            }
            content.push(self.rem(j));
            j += 1;
        }
        let span = self.span_of(i, j);
        self.out
            .push(Block::new(BlockKind::Paragraph, content.join("\n"), 0, span));
        j
    }

    fn stops_paragraph(&self, j: usize, base: usize) -> bool {
        let rem = self.rem(j);
        (base == 0 && atx_level(rem).is_some())
            || is_hrule(rem)
            || fence(rem).is_some()
            || is_quote(rem)
            || list_marker(rem).is_some()
    }

    /// A list at `base`: markers within `[base, base + 4)`, item children at
    /// `base + 4`.
    fn list(&mut self, i: usize, end: usize, base: usize) -> usize {
        self.out
            .push(Block::marker(BlockKind::ListBegin, SourceMap::new()));
        let mut cur = i;
        let mut span = SourceMap::new();
        loop {
            let item_end = self.item_extent(cur, end, base);
            self.item(cur, item_end, base);
            span.extend(&self.span_of(cur, item_end));
            cur = item_end;
            while cur < end && self.lines[cur].blank {
                cur += 1;
            }
            if cur >= end || self.lines[cur].indent >= base + 4 || self.lines[cur].indent < base {
                break;
            }
            if list_marker(self.rem(cur)).is_none() {
                break;
            }
        }
        self.out.push(Block::new(BlockKind::ListEnd, "", 0, span));
        cur
    }

    /// Lines belonging to the item starting at `i`: the marker line plus
    /// following lines indented past `base + 4`, with blank runs included
    /// only when more item content follows.
    fn item_extent(&self, i: usize, end: usize, base: usize) -> usize {
        let mut j = i + 1;
        while j < end {
            if self.lines[j].blank {
                let mut k = j;
                while k < end && self.lines[k].blank {
                    k += 1;
                }
                if k < end && self.lines[k].indent >= base + 4 {
                    j = k;
                    continue;
                }
                break;
            }
            if self.lines[j].indent < base + 4 {
                break;
            }
            j += 1;
        }
        j
    }

    fn item(&mut self, i: usize, item_end: usize, base: usize) {
        self.out
            .push(Block::marker(BlockKind::ListItemBegin, SourceMap::new()));
        let marker_rem = self.rem(i);
        let content_off = list_marker(marker_rem).unwrap_or(0);
        let first_text = &marker_rem[content_off..];
        let span = self.span_of(i, item_end);

        let tight = !self.lines[i..item_end].iter().any(|l| l.blank);
        if tight {
            // Signature and plain continuation lines ride on the end marker;
            // a nested list is emitted between the item's begin/end pair.
            let mut content: Vec<&str> = vec![first_text];
            let mut j = i + 1;
            while j < item_end && list_marker(self.rem(j)).is_none() {
                content.push(strip_columns(self.text(j), base + 4));
                j += 1;
            }
            self.blocks(j, item_end, base + 4);
            self.out.push(Block::new(
                BlockKind::ListItemEnd,
                content.join("\n"),
                0,
                span,
            ));
        } else {
            // Loose item: the signature line seeds a paragraph, the rest of
            // the item parses as ordinary blocks one level deeper.
            let mut content: Vec<&str> = vec![first_text];
            let mut j = i + 1;
            while j < item_end && !self.lines[j].blank && !self.stops_paragraph(j, base + 4) {
                content.push(self.rem(j));
                j += 1;
            }
            let para_span = self.span_of(i, j);
            self.out.push(Block::new(
                BlockKind::Paragraph,
                content.join("\n"),
                0,
                para_span,
            ));
            self.blocks(j, item_end, base + 4);
            self.out
                .push(Block::new(BlockKind::ListItemEnd, "", 0, span));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(blocks: &[Block]) -> Vec<BlockKind> {
        blocks.iter().map(|b| b.kind).collect()
    }

    fn lex(source: &str) -> Vec<Block> {
        BlockBuilder::new(source).build()
    }

    #[test]
    fn empty_input_produces_no_blocks() {
        assert!(lex("").is_empty());
        assert!(lex("\n\n").is_empty());
    }

    #[test]
    fn header_paragraph_hrule() {
        let blocks = lex("# /1\ntext\n\n---\n");
        assert_eq!(
            kinds(&blocks),
            vec![BlockKind::Header, BlockKind::Paragraph, BlockKind::HRule]
        );
        assert_eq!(blocks[0].content, "/1");
        assert_eq!(blocks[0].level, 1);
        assert_eq!(blocks[1].content, "text");
    }

    #[test]
    fn header_spans_cover_their_lines() {
        let blocks = lex("# /1\ntext\n");
        assert_eq!(blocks[0].span.ranges()[0].location, 0);
        assert_eq!(blocks[0].span.ranges()[0].length, 5);
        assert_eq!(blocks[1].span.ranges()[0].location, 5);
    }

    #[test]
    fn indented_code_is_deindented_verbatim() {
        let blocks = lex("    {\n        \"a\": 1\n    }\n");
        assert_eq!(kinds(&blocks), vec![BlockKind::Code]);
        assert_eq!(blocks[0].content, "{\n    \"a\": 1\n}");
    }

    #[test]
    fn fenced_code_keeps_content() {
        let blocks = lex("```\nCode 1\n```\n");
        assert_eq!(kinds(&blocks), vec![BlockKind::Code]);
        assert_eq!(blocks[0].content, "Code 1");
    }

    #[test]
    fn tight_single_line_item_rides_on_end_marker() {
        let blocks = lex("+ Request D\n");
        assert_eq!(
            kinds(&blocks),
            vec![
                BlockKind::ListBegin,
                BlockKind::ListItemBegin,
                BlockKind::ListItemEnd,
                BlockKind::ListEnd,
            ]
        );
        assert_eq!(blocks[2].content, "Request D");
    }

    #[test]
    fn tight_item_with_nested_list_emits_nested_blocks_first() {
        let blocks = lex("+ Values\n    + `1`\n    + `2`\n");
        assert_eq!(
            kinds(&blocks),
            vec![
                BlockKind::ListBegin,
                BlockKind::ListItemBegin,
                BlockKind::ListBegin,
                BlockKind::ListItemBegin,
                BlockKind::ListItemEnd,
                BlockKind::ListItemBegin,
                BlockKind::ListItemEnd,
                BlockKind::ListEnd,
                BlockKind::ListItemEnd,
                BlockKind::ListEnd,
            ]
        );
        assert_eq!(blocks[4].content, "`1`");
        assert_eq!(blocks[6].content, "`2`");
        assert_eq!(blocks[8].content, "Values");
    }

    #[test]
    fn loose_item_carries_paragraph_and_code_children() {
        let blocks = lex("+ Headers\n\n        X-Header: 42\n");
        assert_eq!(
            kinds(&blocks),
            vec![
                BlockKind::ListBegin,
                BlockKind::ListItemBegin,
                BlockKind::Paragraph,
                BlockKind::Code,
                BlockKind::ListItemEnd,
                BlockKind::ListEnd,
            ]
        );
        assert_eq!(blocks[2].content, "Headers");
        assert_eq!(blocks[3].content, "X-Header: 42");
        assert!(blocks[4].content.is_empty());
    }

    #[test]
    fn loose_item_with_nested_loose_item() {
        let blocks = lex("+ Response 200\n    + Body\n\n            Code 1\n");
        assert_eq!(
            kinds(&blocks),
            vec![
                BlockKind::ListBegin,
                BlockKind::ListItemBegin,
                BlockKind::Paragraph, // Response 200
                BlockKind::ListBegin,
                BlockKind::ListItemBegin,
                BlockKind::Paragraph, // Body
                BlockKind::Code,
                BlockKind::ListItemEnd,
                BlockKind::ListEnd,
                BlockKind::ListItemEnd,
                BlockKind::ListEnd,
            ]
        );
        assert_eq!(blocks[2].content, "Response 200");
        assert_eq!(blocks[5].content, "Body");
        assert_eq!(blocks[6].content, "Code 1");
    }

    #[test]
    fn blank_separated_items_stay_within_one_list() {
        let blocks = lex("+ A\n\n+ B\n");
        assert_eq!(
            kinds(&blocks),
            vec![
                BlockKind::ListBegin,
                BlockKind::ListItemBegin,
                BlockKind::ListItemEnd,
                BlockKind::ListItemBegin,
                BlockKind::ListItemEnd,
                BlockKind::ListEnd,
            ]
        );
        assert_eq!(blocks[2].content, "A");
        assert_eq!(blocks[4].content, "B");
    }

    #[test]
    fn list_followed_by_paragraph_closes_first() {
        let blocks = lex("+ A\n+ B\n\np1\n");
        assert_eq!(
            kinds(&blocks),
            vec![
                BlockKind::ListBegin,
                BlockKind::ListItemBegin,
                BlockKind::ListItemEnd,
                BlockKind::ListItemBegin,
                BlockKind::ListItemEnd,
                BlockKind::ListEnd,
                BlockKind::Paragraph,
            ]
        );
        assert_eq!(blocks[6].content, "p1");
    }

    #[test]
    fn quote_blocks_are_bracketed() {
        let blocks = lex("> quoted\n> text\n");
        assert_eq!(
            kinds(&blocks),
            vec![
                BlockKind::QuoteBegin,
                BlockKind::Paragraph,
                BlockKind::QuoteEnd,
            ]
        );
        assert_eq!(blocks[1].content, "quoted\ntext");
    }

    #[test]
    fn begin_end_markers_balance() {
        let source = "# /1\n+ Request A\n\n    + Body\n\n            {}\n\n+ B\n";
        let blocks = lex(source);
        let mut depth = 0i32;
        for block in &blocks {
            match block.kind {
                BlockKind::ListBegin | BlockKind::ListItemBegin | BlockKind::QuoteBegin => {
                    depth += 1
                }
                BlockKind::ListEnd | BlockKind::ListItemEnd | BlockKind::QuoteEnd => depth -= 1,
                _ => {}
            }
            assert!(depth >= 0);
        }
        assert_eq!(depth, 0);
    }

    #[test]
    fn spans_cover_a_subset_of_the_input() {
        let source = "# A\n\n+ item\n\n        code\n";
        for block in lex(source) {
            for range in block.span.ranges() {
                assert!(range.end() <= source.len());
            }
        }
    }

    #[test]
    fn metadata_style_paragraph_stays_one_block() {
        let blocks = lex("FORMAT: 1A\nHOST: http://example.com\n\n# API\n");
        assert_eq!(kinds(&blocks), vec![BlockKind::Paragraph, BlockKind::Header]);
        assert_eq!(blocks[0].content, "FORMAT: 1A\nHOST: http://example.com");
    }
}
