//! List navigation and shared section-parsing utilities.
//!
//! The free functions are pure cursor arithmetic over the block stream; the
//! `Parser` methods additionally emit warnings (foreign-block skipping,
//! description absorption, preformatted asset extraction).

use crate::blocks::{BlockKind, BlockStream};
use crate::report::AnnotationCode;
use crate::sourcemap::SourceMap;

use super::classifier::{SectionKind, classify_list_item};
use super::{Abort, Parsed, Parser};

/// Splits content at the first newline: the signature line and the rest.
pub fn extract_first_line(content: &str) -> (&str, Option<&str>) {
    match content.find('\n') {
        Some(pos) => (&content[..pos], Some(&content[pos + 1..])),
        None => (content, None),
    }
}

/// Skips the begin markers of a list / list item to its first payload block.
pub fn first_content_block(stream: &BlockStream<'_>, pos: usize) -> usize {
    let mut cur = pos;
    if stream.kind(cur) == Some(BlockKind::ListBegin) {
        cur += 1;
    }
    if stream.kind(cur) == Some(BlockKind::ListItemBegin) {
        cur += 1;
    }
    cur
}

/// The block carrying a list item's signature line.
///
/// Usually the first content block; for a tight item whose children lead
/// with a nested list, the signature rides on the item's end marker just
/// past the nested list's close.
pub fn name_block(stream: &BlockStream<'_>, pos: usize) -> usize {
    let cur = first_content_block(stream, pos);
    if stream.kind(cur) != Some(BlockKind::ListBegin) {
        return cur;
    }
    let end = stream.skip_to_section_end(cur, BlockKind::ListBegin, BlockKind::ListEnd);
    if end < stream.len() { end + 1 } else { end }
}

/// Consumes a `ListItemEnd` and any trailing `ListEnd`, tolerating absence.
pub fn close_list_item(stream: &BlockStream<'_>, pos: usize) -> usize {
    let mut cur = pos;
    if stream.kind(cur) == Some(BlockKind::ListItemEnd) {
        cur += 1;
    }
    if stream.kind(cur) == Some(BlockKind::ListEnd) {
        cur += 1;
    }
    cur
}

/// Appends an asset fragment, inserting a newline between fragments.
pub fn push_asset(asset: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    if !asset.is_empty() && !asset.ends_with('\n') {
        asset.push('\n');
    }
    asset.push_str(text);
}

/// Accumulates a section description: the text pieces and the source spans
/// they were read from.
///
/// Paragraph pieces use the block's (de-indented) content; other blocks keep
/// their raw source text so lists, quotes and code in descriptions survive
/// verbatim.
#[derive(Debug, Default)]
pub(crate) struct DescriptionAccum {
    pub text: String,
    pub sm: SourceMap,
}

impl DescriptionAccum {
    pub fn push(&mut self, text: &str, span: &SourceMap) {
        let piece = text.trim_end();
        if !piece.trim().is_empty() {
            if !self.text.is_empty() {
                self.text.push_str("\n\n");
            }
            self.text.push_str(piece);
        }
        self.sm.extend(span);
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.sm.is_empty()
    }

    pub fn finish(self) -> (String, SourceMap) {
        (self.text, self.sm)
    }
}

impl Parser<'_> {
    /// Bounds of the list item introduced at `pos` (which may sit at the
    /// enclosing `ListBegin`): the item's begin marker and its matching end
    /// marker.
    pub(crate) fn item_bounds(&mut self, pos: usize) -> Parsed<(usize, usize)> {
        let item_begin = if self.stream.kind(pos) == Some(BlockKind::ListBegin) {
            pos + 1
        } else {
            pos
        };
        let close =
            self.stream
                .skip_to_section_end(item_begin, BlockKind::ListItemBegin, BlockKind::ListItemEnd);
        if close >= self.stream.len() {
            self.report.fail(
                AnnotationCode::BusinessError,
                "mismatched Markdown list structure",
                self.stream.span(item_begin),
            );
            return Err(Abort);
        }
        Ok((item_begin, close))
    }

    /// Warns about and skips a block no section parser recognized.
    pub(crate) fn foreign_block(&mut self, pos: usize) -> usize {
        match self.stream.kind(pos) {
            Some(BlockKind::ListItemBegin) => {
                let end = self.stream.skip_to_section_end(
                    pos,
                    BlockKind::ListItemBegin,
                    BlockKind::ListItemEnd,
                );
                self.report.warn(
                    AnnotationCode::IgnoringWarning,
                    "ignoring unrecognized list item",
                    self.stream.span(end),
                );
                close_list_item(&self.stream, end)
            }
            Some(BlockKind::ListBegin) => {
                let end =
                    self.stream
                        .skip_to_section_end(pos, BlockKind::ListBegin, BlockKind::ListEnd);
                self.report.warn(
                    AnnotationCode::IgnoringWarning,
                    "ignoring unrecognized list",
                    self.stream.span(end),
                );
                close_list_item(&self.stream, end)
            }
            Some(BlockKind::QuoteBegin) => {
                let end =
                    self.stream
                        .skip_to_section_end(pos, BlockKind::QuoteBegin, BlockKind::QuoteEnd);
                self.report.warn(
                    AnnotationCode::IgnoringWarning,
                    "ignoring unrecognized block, check indentation",
                    self.stream.span(end),
                );
                (end + 1).min(self.stream.len())
            }
            _ => {
                self.report.warn(
                    AnnotationCode::IgnoringWarning,
                    "ignoring unrecognized block, check indentation",
                    self.stream.span(pos),
                );
                pos + 1
            }
        }
    }

    /// Absorbs one block (or bracketed run) into a description.
    pub(crate) fn absorb_description(
        &mut self,
        pos: usize,
        parent: SectionKind,
        desc: &mut DescriptionAccum,
    ) -> usize {
        match self.stream.kind(pos) {
            Some(BlockKind::ListBegin) => self.skip_description_list(pos, parent, desc),
            Some(BlockKind::QuoteBegin) => {
                let end =
                    self.stream
                        .skip_to_section_end(pos, BlockKind::QuoteBegin, BlockKind::QuoteEnd);
                let span = self.stream.span(end);
                desc.push(&span.map_source(self.source), &span);
                (end + 1).min(self.stream.len())
            }
            Some(BlockKind::ListItemBegin) => {
                let end = self.stream.skip_to_section_end(
                    pos,
                    BlockKind::ListItemBegin,
                    BlockKind::ListItemEnd,
                );
                let span = self.stream.span(end);
                desc.push(&span.map_source(self.source), &span);
                close_list_item(&self.stream, end)
            }
            Some(BlockKind::Paragraph) => {
                if let Some(block) = self.stream.get(pos) {
                    desc.push(&block.content, &block.span);
                }
                pos + 1
            }
            Some(_) => {
                let span = self.stream.span(pos);
                desc.push(&span.map_source(self.source), &span);
                pos + 1
            }
            None => pos,
        }
    }

    /// Absorbs a whole list into a description, warning about any item that
    /// would have introduced a recognized section.
    fn skip_description_list(
        &mut self,
        pos: usize,
        parent: SectionKind,
        desc: &mut DescriptionAccum,
    ) -> usize {
        let list_end = self
            .stream
            .skip_to_section_end(pos, BlockKind::ListBegin, BlockKind::ListEnd);
        let mut cur = pos + 1;
        while cur < list_end {
            if self.stream.kind(cur) == Some(BlockKind::ListItemBegin) {
                let section = classify_list_item(&self.stream, cur, parent);
                let item_end = self.stream.skip_to_section_end(
                    cur,
                    BlockKind::ListItemBegin,
                    BlockKind::ListItemEnd,
                );
                if section != SectionKind::Undefined {
                    self.report.warn(
                        AnnotationCode::IgnoringWarning,
                        format!(
                            "ignoring {} in description, description should not end with list",
                            section.name()
                        ),
                        self.stream.span(item_end),
                    );
                }
                cur = item_end + 1;
            } else {
                cur += 1;
            }
        }
        let span = self.stream.span(list_end);
        desc.push(&span.map_source(self.source), &span);
        (list_end + 1).min(self.stream.len())
    }

    /// Extracts a preformatted asset (Body, Schema, Headers payload) from a
    /// list item.
    ///
    /// The signature line is dropped; trailing content on the signature
    /// block, and any non-`Code` child, is mapped back from the original
    /// source (indentation preserved) and adopted with a
    /// `FormattingWarning`. A section with no content at all gets the same
    /// warning.
    pub(crate) fn preformatted_asset(
        &mut self,
        pos: usize,
        section: SectionKind,
    ) -> Parsed<(String, SourceMap, usize)> {
        let (item_begin, item_close) = self.item_bounds(pos)?;
        let first = first_content_block(&self.stream, item_begin);
        let name_pos = name_block(&self.stream, item_begin);
        let message = format!(
            "{} content is expected to be preformatted code block",
            section.name()
        );
        let mut asset = String::new();
        let mut sm = SourceMap::new();
        let mut warned = false;

        if let Some(block) = self.stream.get(name_pos) {
            let (_, rest) = extract_first_line(&block.content);
            if let Some(rest) = rest
                && !rest.trim().is_empty()
            {
                push_asset(&mut asset, rest);
                sm.extend(&block.span);
                self.report.warn(
                    AnnotationCode::FormattingWarning,
                    message.as_str(),
                    block.span.clone(),
                );
                warned = true;
            }
        }

        let mut cur = if name_pos == first { name_pos + 1 } else { first };
        while cur < item_close {
            match self.stream.kind(cur) {
                Some(BlockKind::Code) => {
                    let block = self.stream.get(cur).ok_or(Abort)?;
                    push_asset(&mut asset, &block.content);
                    sm.extend(&block.span);
                    cur += 1;
                }
                Some(BlockKind::QuoteBegin) => {
                    let end = self.stream.skip_to_section_end(
                        cur,
                        BlockKind::QuoteBegin,
                        BlockKind::QuoteEnd,
                    );
                    cur = self.adopt_mapped(end, &message, &mut asset, &mut sm);
                    warned = true;
                }
                Some(BlockKind::ListBegin) => {
                    let end = self.stream.skip_to_section_end(
                        cur,
                        BlockKind::ListBegin,
                        BlockKind::ListEnd,
                    );
                    cur = self.adopt_mapped(end, &message, &mut asset, &mut sm);
                    warned = true;
                }
                Some(_) => {
                    cur = self.adopt_mapped(cur, &message, &mut asset, &mut sm);
                    warned = true;
                }
                None => break,
            }
        }

        if asset.is_empty() && !warned {
            self.report.warn(
                AnnotationCode::FormattingWarning,
                message.as_str(),
                self.stream.span(name_pos),
            );
        }
        Ok((asset, sm, close_list_item(&self.stream, item_close)))
    }

    /// Adopts a non-code block's original source text as asset content.
    fn adopt_mapped(
        &mut self,
        pos: usize,
        message: &str,
        asset: &mut String,
        sm: &mut SourceMap,
    ) -> usize {
        let span = self.stream.span(pos);
        push_asset(asset, &span.map_source(self.source));
        sm.extend(&span);
        self.report
            .warn(AnnotationCode::FormattingWarning, message, span);
        pos + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer;
    use pretty_assertions::assert_eq;

    #[test]
    fn extract_first_line_splits_at_newline() {
        assert_eq!(extract_first_line("one"), ("one", None));
        assert_eq!(extract_first_line("one\ntwo\nthree"), ("one", Some("two\nthree")));
        assert_eq!(extract_first_line("one\n"), ("one", Some("")));
    }

    #[test]
    fn name_block_of_a_loose_item_is_its_paragraph() {
        let blocks = lexer::lex("+ Headers\n\n        X: 1\n");
        let stream = BlockStream::new(&blocks);
        let pos = name_block(&stream, 0);
        assert_eq!(stream.get(pos).unwrap().content, "Headers");
    }

    #[test]
    fn name_block_of_a_tight_item_sits_past_its_nested_list() {
        let blocks = lexer::lex("+ Values\n    + `1`\n");
        let stream = BlockStream::new(&blocks);
        let pos = name_block(&stream, 0);
        let block = stream.get(pos).unwrap();
        assert_eq!(block.kind, BlockKind::ListItemEnd);
        assert_eq!(block.content, "Values");
    }

    #[test]
    fn close_list_item_tolerates_absence() {
        let blocks = lexer::lex("+ A\n+ B\n");
        let stream = BlockStream::new(&blocks);
        // position of A's ListItemEnd
        let end = stream.skip_to_section_end(1, BlockKind::ListItemBegin, BlockKind::ListItemEnd);
        // eats the item end, stops before the next item begin
        assert_eq!(close_list_item(&stream, end), end + 1);
        assert_eq!(stream.kind(end + 1), Some(BlockKind::ListItemBegin));
    }

    #[test]
    fn push_asset_separates_fragments() {
        let mut asset = String::new();
        push_asset(&mut asset, "a");
        push_asset(&mut asset, "b");
        assert_eq!(asset, "a\nb");
        push_asset(&mut asset, "");
        assert_eq!(asset, "a\nb");
    }
}
