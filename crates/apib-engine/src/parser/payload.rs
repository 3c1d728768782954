//! Request / Response / Model payload parsing.

use crate::ast::{KeyValuePair, Payload};
use crate::blocks::BlockKind;
use crate::report::AnnotationCode;
use crate::sourcemap::PayloadSourceMap;

use super::classifier::{
    PayloadSignature, SectionKind, classify, model_signature, request_signature,
    response_signature,
};
use super::helpers::{
    DescriptionAccum, close_list_item, extract_first_line, first_content_block, name_block,
    push_asset,
};
use super::{Parsed, Parser};

pub(crate) struct ParsedPayload {
    pub payload: Payload,
    pub sm: PayloadSourceMap,
    pub next: usize,
}

/// Whether a response status code calls for a message body.
fn status_implies_body(name: &str) -> bool {
    match name.parse::<u32>() {
        Ok(code) => !(100..200).contains(&code) && code != 204 && code != 304,
        Err(_) => true,
    }
}

impl Parser<'_> {
    /// Parses a payload list item (`section` is `Request`, `Response` or
    /// `Model`).
    ///
    /// The signature's media type becomes a `Content-Type` header. A
    /// request/response whose name matches a Symbol Table entry inherits the
    /// model's headers and assets and records the reference; explicitly
    /// nested sections still override. A direct `Code` child (no `Body`
    /// item) is adopted as the body — the abbreviated form.
    pub(crate) fn parse_payload(
        &mut self,
        pos: usize,
        section: SectionKind,
        resource_name: &str,
        scope_headers: &[KeyValuePair],
    ) -> Parsed<ParsedPayload> {
        let (item_begin, item_close) = self.item_bounds(pos)?;
        let first = first_content_block(&self.stream, item_begin);
        let name_pos = name_block(&self.stream, item_begin);

        let mut payload = Payload::default();
        let mut sm = PayloadSourceMap::default();
        let mut signature = PayloadSignature::default();
        let mut desc = DescriptionAccum::default();

        if let Some(block) = self.stream.get(name_pos) {
            let (line, rest) = extract_first_line(&block.content);
            signature = match section {
                SectionKind::Request => request_signature(line),
                SectionKind::Response => response_signature(line),
                _ => model_signature(line),
            }
            .unwrap_or_default();
            sm.name = block.span.clone();
            if let Some(rest) = rest
                && !rest.trim().is_empty()
            {
                // remainder of the signature block opens the description
                desc.push(rest, &block.span);
            }
        }

        payload.name = if section == SectionKind::Model && signature.name.is_empty() {
            resource_name.to_string()
        } else {
            signature.name
        };
        if let Some(media_type) = signature.media_type
            && !media_type.is_empty()
        {
            payload.headers.push(KeyValuePair::new("Content-Type", media_type));
            sm.headers.push(sm.name.clone());
        }

        if section != SectionKind::Model
            && !payload.name.is_empty()
            && let Some(model) = self.symbols.get(&payload.name).cloned()
        {
            for header in model.headers {
                if !payload
                    .headers
                    .iter()
                    .any(|h| h.name.eq_ignore_ascii_case(&header.name))
                {
                    payload.headers.push(header);
                }
            }
            payload.body = model.body;
            payload.schema = model.schema;
            payload.symbol_reference = Some(payload.name.clone());
        }

        let mut in_description = true;
        let mut body_seen = false;
        let mut schema_seen = false;
        let mut cur = if name_pos == first { name_pos + 1 } else { first };
        while cur < item_close {
            match classify(&self.stream, cur, section) {
                SectionKind::Headers => {
                    in_description = false;
                    cur = self.parse_headers(cur, scope_headers, &mut payload.headers, &mut sm.headers)?;
                }
                SectionKind::Parameters => {
                    in_description = false;
                    cur = self.parse_parameters(cur, &mut payload.parameters, &mut sm.parameters)?;
                }
                SectionKind::Body => {
                    in_description = false;
                    let (asset, asset_sm, next) =
                        self.preformatted_asset(cur, SectionKind::Body)?;
                    if !body_seen && payload.symbol_reference.is_some() {
                        payload.body = asset;
                    } else {
                        push_asset(&mut payload.body, &asset);
                    }
                    sm.body.extend(&asset_sm);
                    body_seen = true;
                    cur = next;
                }
                SectionKind::Schema => {
                    in_description = false;
                    let (asset, asset_sm, next) =
                        self.preformatted_asset(cur, SectionKind::Schema)?;
                    if !schema_seen && payload.symbol_reference.is_some() {
                        payload.schema = asset;
                    } else {
                        push_asset(&mut payload.schema, &asset);
                    }
                    sm.schema.extend(&asset_sm);
                    schema_seen = true;
                    cur = next;
                }
                SectionKind::Undefined => match self.stream.kind(cur) {
                    Some(BlockKind::Code) => {
                        // abbreviated body asset
                        if let Some(block) = self.stream.get(cur) {
                            if !body_seen && payload.symbol_reference.is_some() {
                                payload.body = block.content.clone();
                            } else {
                                push_asset(&mut payload.body, &block.content);
                            }
                            sm.body.extend(&block.span);
                            body_seen = true;
                        }
                        cur += 1;
                    }
                    _ if in_description => {
                        cur = self.absorb_description(cur, section, &mut desc);
                    }
                    _ => cur = self.foreign_block(cur),
                },
                _ => cur = self.foreign_block(cur),
            }
        }

        (payload.description, sm.description) = desc.finish();

        if section == SectionKind::Response
            && !body_seen
            && !schema_seen
            && payload.symbol_reference.is_none()
            && payload.body.is_empty()
            && payload.schema.is_empty()
            && status_implies_body(&payload.name)
        {
            self.report.warn(
                AnnotationCode::EmptyDefinitionWarning,
                format!("empty message-body for response '{}'", payload.name),
                self.stream.span(name_pos),
            );
        }

        Ok(ParsedPayload {
            payload,
            sm,
            next: close_list_item(&self.stream, item_close),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::status_implies_body;
    use crate::report::AnnotationCode;
    use crate::{ParseOptions, parse};
    use pretty_assertions::assert_eq;

    #[test]
    fn statuses_without_bodies() {
        assert!(!status_implies_body("204"));
        assert!(!status_implies_body("304"));
        assert!(!status_implies_body("100"));
        assert!(status_implies_body("200"));
        assert!(status_implies_body("404"));
        assert!(status_implies_body(""));
    }

    #[test]
    fn response_with_nested_body_asset() {
        let source = "# /1\n\n## GET\n\n+ Response 200\n    + Body\n\n            Code 1\n";
        let result = parse(source, ParseOptions::default());
        assert_eq!(result.report.error_code(), 0);
        let action = &result.node.resource_groups[0].resources[0].actions[0];
        let response = &action.examples[0].responses[0];
        assert_eq!(response.name, "200");
        assert_eq!(response.body, "Code 1");
    }

    #[test]
    fn media_type_becomes_content_type_header() {
        let source = "# /1\n\n## GET\n\n+ Response 200 (application/json)\n\n        {}\n";
        let result = parse(source, ParseOptions::default());
        let response = &result.node.resource_groups[0].resources[0].actions[0].examples[0]
            .responses[0];
        assert_eq!(response.headers.len(), 1);
        assert_eq!(response.headers[0].name, "Content-Type");
        assert_eq!(response.headers[0].value, "application/json");
        assert_eq!(response.body, "{}");
    }

    #[test]
    fn empty_response_that_implies_a_body_warns() {
        let source = "# /1\n\n## GET\n\n+ Response 200\n";
        let result = parse(source, ParseOptions::default());
        assert!(
            result
                .report
                .warnings
                .iter()
                .any(|w| w.code == AnnotationCode::EmptyDefinitionWarning)
        );
    }

    #[test]
    fn response_204_without_body_stays_silent() {
        let source = "# /1\n\n## DELETE\n\n+ Response 204\n";
        let result = parse(source, ParseOptions::default());
        assert_eq!(result.report.warnings.len(), 0);
    }

    #[test]
    fn payload_description_absorbs_paragraphs() {
        let source = "# /1\n\n## GET\n\n+ Response 200\n\n    A response description.\n\n    + Body\n\n            hi\n";
        let result = parse(source, ParseOptions::default());
        let response = &result.node.resource_groups[0].resources[0].actions[0].examples[0]
            .responses[0];
        assert_eq!(response.description, "A response description.");
        assert_eq!(response.body, "hi");
    }
}
