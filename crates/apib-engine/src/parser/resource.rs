//! The resource section: heading signature, scoped headers/parameters,
//! model, and nested actions.

use crate::ast::{Payload, Resource};
use crate::blocks::BlockKind;
use crate::report::AnnotationCode;
use crate::sourcemap::{PayloadSourceMap, ResourceSourceMap};

use super::classifier::{SectionKind, action_signature, classify, resource_signature};
use super::helpers::DescriptionAccum;
use super::{Abort, Parsed, Parser};

pub(crate) struct ParsedResource {
    pub resource: Resource,
    pub sm: ResourceSourceMap,
    pub next: usize,
}

impl Parser<'_> {
    /// Parses a resource starting at its heading.
    ///
    /// The heading is either `<URI>` / `<Name> [<URI>]`, or
    /// `<METHOD> <URI>` — an endpoint defined by a single action. The
    /// section ends at the next resource/group heading, at a
    /// shallower-or-equal unrecognized header, or at a horizontal rule
    /// (consumed).
    pub(crate) fn parse_resource(&mut self, pos: usize) -> Parsed<ParsedResource> {
        let Some(header) = self.stream.get(pos) else {
            return Err(Abort);
        };
        let level = header.level;

        let mut resource = Resource::default();
        let mut sm = ResourceSourceMap::default();

        if let Some(signature) = resource_signature(&header.content) {
            if signature.uri_template.is_empty() {
                self.report.fail(
                    AnnotationCode::BusinessError,
                    "expected resource URI template",
                    header.span.clone(),
                );
                return Err(Abort);
            }
            resource.name = signature.name;
            resource.uri_template = signature.uri_template;
            sm.name = header.span.clone();
            sm.uri_template = header.span.clone();
        } else if let Some(signature) = action_signature(&header.content)
            && let Some(uri_template) = signature.uri_template
        {
            // endpoint defined by a single action
            resource.uri_template = uri_template;
            sm.uri_template = header.span.clone();
            self.check_uri(&resource.uri_template, pos);
            let parsed = self.parse_action(pos, "", &[])?;
            if let Some((model, model_sm)) = parsed.model {
                self.set_model(&mut resource, &mut sm, model, model_sm, pos);
            }
            resource.actions.push(parsed.action);
            sm.actions.push(parsed.sm);
            return Ok(ParsedResource {
                resource,
                sm,
                next: parsed.next,
            });
        } else {
            self.report.fail(
                AnnotationCode::BusinessError,
                "expected resource URI template",
                header.span.clone(),
            );
            return Err(Abort);
        }

        self.check_uri(&resource.uri_template, pos);

        let mut desc = DescriptionAccum::default();
        let mut in_description = true;
        let mut cur = pos + 1;
        while cur < self.stream.len() {
            match classify(&self.stream, cur, SectionKind::Resource) {
                SectionKind::Resource | SectionKind::ResourceGroup => break,
                SectionKind::Terminator => {
                    cur += 1;
                    break;
                }
                SectionKind::Action => {
                    let is_endpoint = self
                        .stream
                        .get(cur)
                        .and_then(|b| action_signature(&b.content))
                        .map(|s| s.uri_template.is_some())
                        .unwrap_or(false);
                    if is_endpoint {
                        break;
                    }
                    in_description = false;
                    let parsed = self.parse_action(cur, &resource.name, &resource.headers)?;
                    if let Some((model, model_sm)) = parsed.model {
                        self.set_model(&mut resource, &mut sm, model, model_sm, cur);
                    }
                    resource.actions.push(parsed.action);
                    sm.actions.push(parsed.sm);
                    cur = parsed.next;
                }
                SectionKind::Headers => {
                    in_description = false;
                    cur = self.parse_headers(cur, &[], &mut resource.headers, &mut sm.headers)?;
                }
                SectionKind::Parameters => {
                    in_description = false;
                    cur = self.parse_parameters(cur, &mut resource.parameters, &mut sm.parameters)?;
                }
                SectionKind::Model => {
                    in_description = false;
                    let parsed = self.parse_payload(
                        cur,
                        SectionKind::Model,
                        &resource.name,
                        &resource.headers,
                    )?;
                    self.set_model(&mut resource, &mut sm, parsed.payload, parsed.sm, cur);
                    cur = parsed.next;
                }
                SectionKind::Undefined => {
                    if let Some(block) = self.stream.get(cur)
                        && block.kind == BlockKind::Header
                        && block.level <= level
                    {
                        break;
                    }
                    if in_description {
                        cur = self.absorb_description(cur, SectionKind::Resource, &mut desc);
                    } else {
                        cur = self.foreign_block(cur);
                    }
                }
                _ => cur = self.foreign_block(cur),
            }
        }

        (resource.description, sm.description) = desc.finish();
        Ok(ParsedResource {
            resource,
            sm,
            next: cur,
        })
    }

    fn check_uri(&mut self, uri_template: &str, pos: usize) {
        if !uri_template.starts_with('/') {
            self.report.warn(
                AnnotationCode::UriWarning,
                format!("URI template '{uri_template}' should start with '/'"),
                self.stream.span(pos),
            );
        }
    }

    /// Attaches a model payload to the resource; the latest definition wins.
    fn set_model(
        &mut self,
        resource: &mut Resource,
        sm: &mut ResourceSourceMap,
        model: Payload,
        model_sm: PayloadSourceMap,
        pos: usize,
    ) {
        if resource.model.is_some() {
            let shown = if model.name.is_empty() {
                resource.uri_template.clone()
            } else {
                model.name.clone()
            };
            self.report.warn(
                AnnotationCode::RedefinitionWarning,
                format!("overshadowing previous model definition for '{shown}'"),
                self.stream.span(pos),
            );
        }
        resource.model = Some(model);
        sm.model = Some(model_sm);
    }
}

#[cfg(test)]
mod tests {
    use crate::report::AnnotationCode;
    use crate::{ParseOptions, parse};
    use pretty_assertions::assert_eq;

    #[test]
    fn bare_uri_heading() {
        let result = parse("# /resource\n", ParseOptions::default());
        let resource = &result.node.resource_groups[0].resources[0];
        assert_eq!(resource.uri_template, "/resource");
        assert_eq!(resource.name, "");
    }

    #[test]
    fn named_heading_with_bracketed_uri() {
        let result = parse("# Notes [/notes/{id}]\n", ParseOptions::default());
        let resource = &result.node.resource_groups[0].resources[0];
        assert_eq!(resource.name, "Notes");
        assert_eq!(resource.uri_template, "/notes/{id}");
    }

    #[test]
    fn uri_not_starting_with_slash_warns() {
        let result = parse("# Notes [notes]\n", ParseOptions::default());
        assert!(
            result
                .report
                .warnings
                .iter()
                .any(|w| w.code == AnnotationCode::UriWarning)
        );
    }

    #[test]
    fn description_absorbs_lists_and_paragraphs() {
        let source = "# /1\n+ A\n+ B\n\np1\n";
        let result = parse(source, ParseOptions::default());
        assert_eq!(result.report.error_code(), 0);
        assert_eq!(result.report.warnings.len(), 0);
        let resource = &result.node.resource_groups[0].resources[0];
        assert!(resource.description.contains("+ A"));
        assert!(resource.description.contains("p1"));
        assert!(resource.actions.is_empty());
    }

    #[test]
    fn hrule_terminates_the_resource() {
        let result = parse("# /1\n---\nA\n", ParseOptions::default());
        assert_eq!(result.report.error_code(), 0);
        assert_eq!(result.report.warnings.len(), 0);
        let resource = &result.node.resource_groups[0].resources[0];
        assert_eq!(resource.uri_template, "/1");
        assert_eq!(resource.description, "");
        assert!(resource.actions.is_empty());
    }

    #[test]
    fn endpoint_defined_by_action_header() {
        let source = "# GET /ping\n\n+ Response 200\n\n        pong\n";
        let result = parse(source, ParseOptions::default());
        let resource = &result.node.resource_groups[0].resources[0];
        assert_eq!(resource.uri_template, "/ping");
        assert_eq!(resource.actions.len(), 1);
        assert_eq!(resource.actions[0].method, "GET");
    }

    #[test]
    fn model_is_attached_to_the_resource() {
        let source = "# /message\n\n+ Model (text/plain)\n\n        Hello World\n";
        let result = parse(source, ParseOptions::default());
        let resource = &result.node.resource_groups[0].resources[0];
        let model = resource.model.as_ref().unwrap();
        assert_eq!(model.body, "Hello World");
        assert_eq!(model.headers[0].value, "text/plain");
    }
}
