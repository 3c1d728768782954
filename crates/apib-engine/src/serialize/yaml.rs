//! Hand-rolled YAML emitter.
//!
//! Two-space indent per level, `- ` sequence items with the first key
//! inline. A string is double-quoted when it contains a reserved character,
//! a newline or a double quote; embedded quotes and newlines are escaped.

use crate::ast::{
    AST_VERSION, Action, Blueprint, KeyValuePair, Parameter, ParameterUse, Payload, Resource,
    ResourceGroup, TransactionExample,
};
use crate::sourcemap::{
    ActionSourceMap, BlueprintSourceMap, PayloadSourceMap, ResourceGroupSourceMap,
    ResourceSourceMap, SourceMap, TransactionExampleSourceMap,
};

use super::key;

const RESERVED_CHARACTERS: &str = "#-[]:|>!*&%@`,{}?'";

fn needs_quotation(value: &str) -> bool {
    value
        .chars()
        .any(|c| c == '"' || c == '\n' || RESERVED_CHARACTERS.contains(c))
}

fn escaped(value: &str) -> String {
    value.replace('"', "\\\"").replace('\n', "\\n")
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

/// `key: value` with quoting; a bare `key:` when the value is empty.
fn scalar(out: &mut String, level: usize, name: &str, value: &str) {
    indent(out, level);
    scalar_inline(out, name, value);
}

fn scalar_inline(out: &mut String, name: &str, value: &str) {
    out.push_str(name);
    out.push(':');
    if !value.is_empty() {
        out.push(' ');
        if needs_quotation(value) {
            out.push('"');
            out.push_str(&escaped(value));
            out.push('"');
        } else {
            out.push_str(value);
        }
    }
    out.push('\n');
}

/// Serializes a blueprint AST to YAML.
pub fn serialize_yaml(blueprint: &Blueprint) -> String {
    let mut out = String::new();
    scalar(&mut out, 0, key::AST_VERSION, AST_VERSION);

    scalar(&mut out, 0, key::METADATA, "");
    for entry in &blueprint.metadata {
        scalar(&mut out, 1, &entry.name, "");
        scalar(&mut out, 2, key::VALUE, &entry.value);
    }

    scalar(&mut out, 0, key::NAME, &blueprint.name);
    scalar(&mut out, 0, key::DESCRIPTION, &blueprint.description);

    scalar(&mut out, 0, key::RESOURCE_GROUPS, "");
    for group in &blueprint.resource_groups {
        write_group(&mut out, group);
    }
    out
}

fn write_group(out: &mut String, group: &ResourceGroup) {
    out.push_str("- ");
    scalar_inline(out, key::NAME, &group.name);
    scalar(out, 1, key::DESCRIPTION, &group.description);
    scalar(out, 1, key::RESOURCES, "");
    for resource in &group.resources {
        write_resource(out, resource);
    }
}

fn write_resource(out: &mut String, resource: &Resource) {
    indent(out, 1);
    out.push_str("- ");
    scalar_inline(out, key::NAME, &resource.name);
    scalar(out, 2, key::DESCRIPTION, &resource.description);
    scalar(out, 2, key::URI_TEMPLATE, &resource.uri_template);

    scalar(out, 2, key::MODEL, "");
    if let Some(model) = &resource.model {
        write_payload_fields(out, 3, model);
    }

    scalar(out, 2, key::PARAMETERS, "");
    write_parameters(out, 2, &resource.parameters);

    scalar(out, 2, key::HEADERS, "");
    write_headers(out, 2, &resource.headers);

    scalar(out, 2, key::ACTIONS, "");
    for action in &resource.actions {
        write_action(out, action);
    }
}

fn write_action(out: &mut String, action: &Action) {
    indent(out, 2);
    out.push_str("- ");
    scalar_inline(out, key::NAME, &action.name);
    scalar(out, 3, key::DESCRIPTION, &action.description);
    scalar(out, 3, key::METHOD, &action.method);

    scalar(out, 3, key::PARAMETERS, "");
    write_parameters(out, 3, &action.parameters);

    scalar(out, 3, key::HEADERS, "");
    write_headers(out, 3, &action.headers);

    scalar(out, 3, key::EXAMPLES, "");
    for example in &action.examples {
        write_example(out, example);
    }
}

fn write_example(out: &mut String, example: &TransactionExample) {
    indent(out, 3);
    out.push_str("- ");
    scalar_inline(out, key::NAME, &example.name);
    scalar(out, 4, key::DESCRIPTION, &example.description);

    scalar(out, 4, key::REQUESTS, "");
    for request in &example.requests {
        write_payload_item(out, 4, request);
    }

    scalar(out, 4, key::RESPONSES, "");
    for response in &example.responses {
        write_payload_item(out, 4, response);
    }
}

fn write_payload_item(out: &mut String, level: usize, payload: &Payload) {
    indent(out, level);
    out.push_str("- ");
    scalar_inline(out, key::NAME, &payload.name);
    write_payload_rest(out, level + 1, payload);
}

fn write_payload_fields(out: &mut String, level: usize, payload: &Payload) {
    scalar(out, level, key::NAME, &payload.name);
    write_payload_rest(out, level, payload);
}

fn write_payload_rest(out: &mut String, level: usize, payload: &Payload) {
    scalar(out, level, key::DESCRIPTION, &payload.description);

    scalar(out, level, key::PARAMETERS, "");
    write_parameters(out, level, &payload.parameters);

    scalar(out, level, key::HEADERS, "");
    write_headers(out, level, &payload.headers);

    scalar(out, level, key::BODY, &payload.body);
    scalar(out, level, key::SCHEMA, &payload.schema);
    if let Some(reference) = &payload.symbol_reference {
        scalar(out, level, key::SYMBOL_REFERENCE, reference);
    }
}

fn write_headers(out: &mut String, level: usize, headers: &[KeyValuePair]) {
    for header in headers {
        scalar(out, level + 1, &header.name, "");
        scalar(out, level + 2, key::VALUE, &header.value);
    }
}

fn write_parameters(out: &mut String, level: usize, parameters: &[Parameter]) {
    for parameter in parameters {
        indent(out, level);
        out.push_str("- ");
        scalar_inline(out, key::NAME, &parameter.name);
        scalar(out, level + 1, key::DESCRIPTION, &parameter.description);
        scalar(out, level + 1, key::TYPE, &parameter.parameter_type);
        scalar(
            out,
            level + 1,
            key::REQUIRED,
            if parameter.required { "true" } else { "false" },
        );
        scalar(out, level + 1, key::DEFAULT_VALUE, &parameter.default_value);
        scalar(out, level + 1, key::EXAMPLE_VALUE, &parameter.example_value);
        scalar(
            out,
            level + 1,
            key::USE,
            match parameter.use_flag {
                ParameterUse::Required => "required",
                ParameterUse::Optional => "optional",
            },
        );
        scalar(out, level + 1, key::VALUES, "");
        for value in &parameter.values {
            indent(out, level + 2);
            out.push_str("- ");
            if needs_quotation(value) {
                out.push('"');
                out.push_str(&escaped(value));
                out.push('"');
            } else {
                out.push_str(value);
            }
            out.push('\n');
        }
    }
}

// ── Source-map rendering ──

fn ranges(out: &mut String, level: usize, name: &str, map: &SourceMap) {
    indent(out, level);
    out.push_str(name);
    out.push_str(": ");
    out.push_str(&flow_ranges(map));
    out.push('\n');
}

fn flow_ranges(map: &SourceMap) -> String {
    let inner: Vec<String> = map
        .ranges()
        .iter()
        .map(|r| format!("[{}, {}]", r.location, r.length))
        .collect();
    format!("[{}]", inner.join(", "))
}

fn range_list(out: &mut String, level: usize, name: &str, maps: &[SourceMap]) {
    indent(out, level);
    out.push_str(name);
    out.push_str(":\n");
    for map in maps {
        indent(out, level + 1);
        out.push_str("- ");
        out.push_str(&flow_ranges(map));
        out.push('\n');
    }
}

/// Serializes the AST-shaped source map to YAML.
pub fn serialize_sourcemap_yaml(map: &BlueprintSourceMap) -> String {
    let mut out = String::new();
    ranges(&mut out, 0, key::NAME, &map.name);
    ranges(&mut out, 0, key::DESCRIPTION, &map.description);
    range_list(&mut out, 0, key::METADATA, &map.metadata);
    out.push_str(key::RESOURCE_GROUPS);
    out.push_str(":\n");
    for group in &map.resource_groups {
        write_group_sm(&mut out, group);
    }
    out
}

fn write_group_sm(out: &mut String, group: &ResourceGroupSourceMap) {
    out.push_str("- ");
    scalar_free(out, key::NAME, &group.name);
    ranges(out, 1, key::DESCRIPTION, &group.description);
    indent(out, 1);
    out.push_str(key::RESOURCES);
    out.push_str(":\n");
    for resource in &group.resources {
        write_resource_sm(out, resource);
    }
}

fn write_resource_sm(out: &mut String, resource: &ResourceSourceMap) {
    indent(out, 1);
    out.push_str("- ");
    scalar_free(out, key::NAME, &resource.name);
    ranges(out, 2, key::DESCRIPTION, &resource.description);
    ranges(out, 2, key::URI_TEMPLATE, &resource.uri_template);
    if let Some(model) = &resource.model {
        indent(out, 2);
        out.push_str(key::MODEL);
        out.push_str(":\n");
        write_payload_sm_fields(out, 3, model);
    }
    range_list(out, 2, key::PARAMETERS, &resource.parameters);
    range_list(out, 2, key::HEADERS, &resource.headers);
    indent(out, 2);
    out.push_str(key::ACTIONS);
    out.push_str(":\n");
    for action in &resource.actions {
        write_action_sm(out, action);
    }
}

fn write_action_sm(out: &mut String, action: &ActionSourceMap) {
    indent(out, 2);
    out.push_str("- ");
    scalar_free(out, key::NAME, &action.name);
    ranges(out, 3, key::DESCRIPTION, &action.description);
    ranges(out, 3, key::METHOD, &action.method);
    range_list(out, 3, key::PARAMETERS, &action.parameters);
    range_list(out, 3, key::HEADERS, &action.headers);
    indent(out, 3);
    out.push_str(key::EXAMPLES);
    out.push_str(":\n");
    for example in &action.examples {
        write_example_sm(out, example);
    }
}

fn write_example_sm(out: &mut String, example: &TransactionExampleSourceMap) {
    indent(out, 3);
    out.push_str("- ");
    scalar_free(out, key::NAME, &example.name);
    ranges(out, 4, key::DESCRIPTION, &example.description);
    indent(out, 4);
    out.push_str(key::REQUESTS);
    out.push_str(":\n");
    for request in &example.requests {
        write_payload_sm_item(out, 4, request);
    }
    indent(out, 4);
    out.push_str(key::RESPONSES);
    out.push_str(":\n");
    for response in &example.responses {
        write_payload_sm_item(out, 4, response);
    }
}

fn write_payload_sm_item(out: &mut String, level: usize, payload: &PayloadSourceMap) {
    indent(out, level);
    out.push_str("- ");
    scalar_free(out, key::NAME, &payload.name);
    write_payload_sm_rest(out, level + 1, payload);
}

fn write_payload_sm_fields(out: &mut String, level: usize, payload: &PayloadSourceMap) {
    ranges(out, level, key::NAME, &payload.name);
    write_payload_sm_rest(out, level, payload);
}

fn write_payload_sm_rest(out: &mut String, level: usize, payload: &PayloadSourceMap) {
    ranges(out, level, key::DESCRIPTION, &payload.description);
    range_list(out, level, key::PARAMETERS, &payload.parameters);
    range_list(out, level, key::HEADERS, &payload.headers);
    ranges(out, level, key::BODY, &payload.body);
    ranges(out, level, key::SCHEMA, &payload.schema);
}

/// A `key: ranges` pair written right after a `- ` item marker.
fn scalar_free(out: &mut String, name: &str, map: &SourceMap) {
    out.push_str(name);
    out.push_str(": ");
    out.push_str(&flow_ranges(map));
    out.push('\n');
}
