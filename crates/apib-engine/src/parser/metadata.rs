//! Metadata parsing from the document's leading paragraph.

use crate::ast::KeyValuePair;
use crate::blocks::BlockKind;
use crate::sourcemap::SourceMap;

use super::Parser;

impl Parser<'_> {
    /// Parses `KEY: VALUE` metadata from the block at `pos`.
    ///
    /// Applies only when the block is a paragraph and *every* line matches;
    /// a partial match leaves the whole paragraph to the description. Keys
    /// carry no whitespace, values are trimmed.
    pub(crate) fn parse_metadata(&mut self, pos: usize) -> (Vec<KeyValuePair>, Vec<SourceMap>, usize) {
        let Some(block) = self.stream.get(pos) else {
            return (Vec::new(), Vec::new(), pos);
        };
        if block.kind != BlockKind::Paragraph {
            return (Vec::new(), Vec::new(), pos);
        }
        let mut metadata = Vec::new();
        let mut spans = Vec::new();
        for line in block.content.lines() {
            let Some((key, value)) = line.split_once(':') else {
                return (Vec::new(), Vec::new(), pos);
            };
            let key = key.trim();
            if key.is_empty() || key.chars().any(char::is_whitespace) {
                return (Vec::new(), Vec::new(), pos);
            }
            metadata.push(KeyValuePair::new(key, value.trim()));
            spans.push(block.span.clone());
        }
        if metadata.is_empty() {
            return (Vec::new(), Vec::new(), pos);
        }
        (metadata, spans, pos + 1)
    }
}

#[cfg(test)]
mod tests {
    use crate::{ParseOptions, parse};
    use pretty_assertions::assert_eq;

    #[test]
    fn leading_key_value_paragraph_becomes_metadata() {
        let result = parse(
            "FORMAT: 1A\nHOST: http://example.com\n\n# API\n",
            ParseOptions::default(),
        );
        let metadata = &result.node.metadata;
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata[0].name, "FORMAT");
        assert_eq!(metadata[0].value, "1A");
        assert_eq!(metadata[1].name, "HOST");
        assert_eq!(metadata[1].value, "http://example.com");
        assert_eq!(result.node.name, "API");
    }

    #[test]
    fn partially_matching_paragraph_stays_in_description() {
        let result = parse("Note: first line\nbut not this one\n", ParseOptions::default());
        assert!(result.node.metadata.is_empty());
        assert!(result.node.description.contains("Note: first line"));
    }

    #[test]
    fn keys_with_spaces_disqualify_the_block() {
        let result = parse("Not metadata: value\n", ParseOptions::default());
        assert!(result.node.metadata.is_empty());
    }
}
