//! The HTTP method section: description, parameters, headers and
//! transaction examples.

use crate::ast::{Action, KeyValuePair, Payload, TransactionExample};
use crate::blocks::BlockKind;
use crate::report::AnnotationCode;
use crate::sourcemap::{ActionSourceMap, PayloadSourceMap, TransactionExampleSourceMap};

use super::classifier::{SectionKind, action_signature, classify};
use super::helpers::DescriptionAccum;
use super::{Parsed, Parser};

pub(crate) struct ParsedAction {
    pub action: Action,
    pub sm: ActionSourceMap,
    /// A model defined inside the action; merged into the enclosing
    /// resource.
    pub model: Option<(Payload, PayloadSourceMap)>,
    pub next: usize,
}

impl Parser<'_> {
    /// Parses an action starting at its method header.
    ///
    /// Consecutive requests and their responses form one transaction
    /// example; a request arriving after the current example already has
    /// responses opens a new example. The section ends at the next header
    /// of equal-or-shallower depth, at any resource/group/action header, or
    /// at a horizontal rule (left for the resource to consume).
    pub(crate) fn parse_action(
        &mut self,
        pos: usize,
        resource_name: &str,
        scope_headers: &[KeyValuePair],
    ) -> Parsed<ParsedAction> {
        let Some(header) = self.stream.get(pos) else {
            return Err(super::Abort);
        };
        let signature = action_signature(&header.content).unwrap_or_default();
        let level = header.level;

        let mut action = Action {
            method: signature.method,
            ..Default::default()
        };
        let mut sm = ActionSourceMap {
            method: header.span.clone(),
            name: header.span.clone(),
            ..Default::default()
        };
        let mut model = None;
        let mut desc = DescriptionAccum::default();
        let mut in_description = true;

        let mut cur = pos + 1;
        while cur < self.stream.len() {
            match classify(&self.stream, cur, SectionKind::Action) {
                SectionKind::Resource
                | SectionKind::ResourceGroup
                | SectionKind::Action
                | SectionKind::Terminator => break,
                SectionKind::Parameters => {
                    in_description = false;
                    cur = self.parse_parameters(cur, &mut action.parameters, &mut sm.parameters)?;
                }
                SectionKind::Headers => {
                    in_description = false;
                    cur = self.parse_headers(cur, scope_headers, &mut action.headers, &mut sm.headers)?;
                }
                SectionKind::Request => {
                    in_description = false;
                    let parsed =
                        self.parse_payload(cur, SectionKind::Request, resource_name, scope_headers)?;
                    self.append_request(&mut action, &mut sm, parsed.payload, parsed.sm);
                    cur = parsed.next;
                }
                SectionKind::Response => {
                    in_description = false;
                    let parsed =
                        self.parse_payload(cur, SectionKind::Response, resource_name, scope_headers)?;
                    self.append_response(&mut action, &mut sm, parsed.payload, parsed.sm);
                    cur = parsed.next;
                }
                SectionKind::Model => {
                    in_description = false;
                    let parsed =
                        self.parse_payload(cur, SectionKind::Model, resource_name, scope_headers)?;
                    model = Some((parsed.payload, parsed.sm));
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
                        cur = self.absorb_description(cur, SectionKind::Action, &mut desc);
                    } else {
                        cur = self.foreign_block(cur);
                    }
                }
                _ => cur = self.foreign_block(cur),
            }
        }

        (action.description, sm.description) = desc.finish();

        // requests without a single response; a bare description-only action
        // stays silent
        if !action.examples.is_empty() && action.examples.iter().all(|e| e.responses.is_empty()) {
            self.report.warn(
                AnnotationCode::EmptyDefinitionWarning,
                format!("no response defined for '{}'", action.method),
                self.stream.span(pos),
            );
        }

        Ok(ParsedAction {
            action,
            sm,
            model,
            next: cur,
        })
    }

    fn append_request(
        &mut self,
        action: &mut Action,
        sm: &mut ActionSourceMap,
        payload: Payload,
        payload_sm: PayloadSourceMap,
    ) {
        let needs_new_example = action
            .examples
            .last()
            .map(|example| !example.responses.is_empty())
            .unwrap_or(true);
        if needs_new_example {
            action.examples.push(TransactionExample::default());
            sm.examples.push(TransactionExampleSourceMap::default());
        }
        let example = action.examples.last_mut().unwrap();
        if example.requests.iter().any(|r| r.name == payload.name) {
            self.report.warn(
                AnnotationCode::AmbiguityWarning,
                format!("duplicate request '{}' within one example", payload.name),
                payload_sm.name.clone(),
            );
        }
        example.requests.push(payload);
        sm.examples.last_mut().unwrap().requests.push(payload_sm);
    }

    fn append_response(
        &mut self,
        action: &mut Action,
        sm: &mut ActionSourceMap,
        payload: Payload,
        payload_sm: PayloadSourceMap,
    ) {
        if action.examples.is_empty() {
            action.examples.push(TransactionExample::default());
            sm.examples.push(TransactionExampleSourceMap::default());
        }
        let example = action.examples.last_mut().unwrap();
        if example.responses.iter().any(|r| r.name == payload.name) {
            self.report.warn(
                AnnotationCode::RedefinitionWarning,
                format!("duplicate response '{}' within one example", payload.name),
                payload_sm.name.clone(),
            );
        }
        example.responses.push(payload);
        sm.examples.last_mut().unwrap().responses.push(payload_sm);
    }
}
