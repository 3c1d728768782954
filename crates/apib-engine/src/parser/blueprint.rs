//! Top-level parsing: metadata, API name, description, resource groups, and
//! the symbol pre-pass.

use crate::ast::{Blueprint, Payload, ResourceGroup};
use crate::blocks::BlockKind;
use crate::report::AnnotationCode;
use crate::sourcemap::{BlueprintSourceMap, ResourceGroupSourceMap, SourceMap};

use super::classifier::{
    SectionKind, action_signature, classify, classify_header, classify_list_item, group_signature,
    resource_signature,
};
use super::helpers::DescriptionAccum;
use super::Parser;

impl Parser<'_> {
    /// Parses the whole document.
    ///
    /// Best effort: a fatal condition aborts its subtree and the loop
    /// resynchronizes at the next section heading; a second fatal condition
    /// terminates parsing.
    pub(crate) fn parse_blueprint(&mut self) -> (Blueprint, BlueprintSourceMap) {
        self.collect_symbols();

        let mut blueprint = Blueprint::default();
        let mut sm = BlueprintSourceMap::default();

        let (metadata, metadata_sm, mut pos) = self.parse_metadata(0);
        blueprint.metadata = metadata;
        sm.metadata = metadata_sm;

        if let Some(block) = self.stream.get(pos)
            && block.kind == BlockKind::Header
            && block.level == 1
            && classify_header(&block.content) == SectionKind::Undefined
        {
            blueprint.name = block.content.trim().to_string();
            sm.name = block.span.clone();
            pos += 1;
        }
        if self.options.require_blueprint_name && blueprint.name.is_empty() {
            self.report.fail(
                AnnotationCode::BusinessError,
                "expected API name, e.g. '# <API Name>'",
                self.stream.span(0),
            );
        }

        let mut desc = DescriptionAccum::default();
        while pos < self.stream.len() {
            match classify(&self.stream, pos, SectionKind::Undefined) {
                SectionKind::Resource | SectionKind::ResourceGroup | SectionKind::Action => break,
                _ => pos = self.absorb_description(pos, SectionKind::Undefined, &mut desc),
            }
        }
        (blueprint.description, sm.description) = desc.finish();

        let mut tail = DescriptionAccum::default();
        while pos < self.stream.len() {
            match classify(&self.stream, pos, SectionKind::Undefined) {
                SectionKind::ResourceGroup => {
                    Self::flush_tail_description(&mut blueprint, &mut sm, &mut tail);
                    let (name, span) = match self.stream.get(pos) {
                        Some(block) => (
                            group_signature(&block.content).unwrap_or_default(),
                            block.span.clone(),
                        ),
                        None => (String::new(), SourceMap::new()),
                    };
                    blueprint.resource_groups.push(ResourceGroup {
                        name,
                        ..Default::default()
                    });
                    sm.resource_groups.push(ResourceGroupSourceMap {
                        name: span,
                        ..Default::default()
                    });
                    pos += 1;
                }
                section @ (SectionKind::Resource | SectionKind::Action) => {
                    let has_uri = section == SectionKind::Resource
                        || self
                            .stream
                            .get(pos)
                            .and_then(|b| action_signature(&b.content))
                            .map(|s| s.uri_template.is_some())
                            .unwrap_or(false);
                    if !has_uri {
                        self.report.fail(
                            AnnotationCode::BusinessError,
                            "expected resource URI template",
                            self.stream.span(pos),
                        );
                        self.aborts += 1;
                        if self.aborts >= 2 {
                            break;
                        }
                        pos += 1;
                        continue;
                    }
                    Self::flush_tail_description(&mut blueprint, &mut sm, &mut tail);
                    if blueprint.resource_groups.is_empty() {
                        blueprint.resource_groups.push(ResourceGroup::default());
                        sm.resource_groups.push(ResourceGroupSourceMap::default());
                    }
                    match self.parse_resource(pos) {
                        Ok(parsed) => {
                            let group = blueprint.resource_groups.last_mut().unwrap();
                            group.resources.push(parsed.resource);
                            sm.resource_groups
                                .last_mut()
                                .unwrap()
                                .resources
                                .push(parsed.sm);
                            pos = parsed.next;
                        }
                        Err(_) => {
                            self.aborts += 1;
                            if self.aborts >= 2 {
                                break;
                            }
                            pos += 1;
                        }
                    }
                }
                _ => pos = self.absorb_description(pos, SectionKind::Undefined, &mut tail),
            }
        }
        Self::flush_tail_description(&mut blueprint, &mut sm, &mut tail);

        (blueprint, sm)
    }

    /// Appends stray top-level content to the current group's description,
    /// or the blueprint's when no group exists yet.
    fn flush_tail_description(
        blueprint: &mut Blueprint,
        sm: &mut BlueprintSourceMap,
        desc: &mut DescriptionAccum,
    ) {
        if desc.is_empty() {
            return;
        }
        let (text, span) = std::mem::take(desc).finish();
        let (target, target_sm) = match (
            blueprint.resource_groups.last_mut(),
            sm.resource_groups.last_mut(),
        ) {
            (Some(group), Some(group_sm)) => (&mut group.description, &mut group_sm.description),
            _ => (&mut blueprint.description, &mut sm.description),
        };
        if !text.is_empty() {
            if !target.is_empty() {
                target.push_str("\n\n");
            }
            target.push_str(&text);
        }
        target_sm.extend(&span);
    }

    /// Shallow pre-pass over the block stream registering every model
    /// section in the symbol table. Payloads are parsed with a scratch
    /// report (the resource parsers re-parse them in document order);
    /// duplicate symbols are reported here.
    fn collect_symbols(&mut self) {
        let mut resource_name = String::new();
        let mut pos = 0;
        while pos < self.stream.len() {
            match self.stream.kind(pos) {
                Some(BlockKind::Header) => {
                    if let Some(block) = self.stream.get(pos)
                        && let Some(signature) = resource_signature(&block.content)
                    {
                        resource_name = signature.name;
                    }
                }
                Some(BlockKind::ListItemBegin) => {
                    if classify_list_item(&self.stream, pos, SectionKind::Resource)
                        == SectionKind::Model
                    {
                        let scratch = std::mem::take(&mut self.report);
                        let parsed =
                            self.parse_payload(pos, SectionKind::Model, &resource_name, &[]);
                        self.report = scratch;
                        if let Ok(parsed) = parsed {
                            self.register_symbol(parsed.payload, parsed.sm.name);
                        }
                    }
                }
                _ => {}
            }
            pos += 1;
        }
    }

    /// Registers a model payload under its symbol name.
    ///
    /// A redefinition warns; when the two definitions carry distinct assets
    /// it is a `BusinessError`. The latest definition wins either way.
    fn register_symbol(&mut self, payload: Payload, span: SourceMap) {
        let name = payload.name.clone();
        if name.is_empty() {
            return;
        }
        if let Some(existing) = self.symbols.get(&name) {
            let distinct = existing.body != payload.body || existing.schema != payload.schema;
            self.report.warn(
                AnnotationCode::RedefinitionWarning,
                format!("symbol '{name}' already defined"),
                span.clone(),
            );
            if distinct {
                self.report.fail(
                    AnnotationCode::BusinessError,
                    format!("duplicate definition of model '{name}'"),
                    span,
                );
            }
        }
        self.symbols.insert(name, payload);
    }
}
