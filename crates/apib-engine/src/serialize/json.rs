//! JSON serialization over the AST's serde derives.

use serde::Serialize;
use serde_json::{Value, json};

use crate::ast::{AST_VERSION, Blueprint};
use crate::sourcemap::{
    ActionSourceMap, BlueprintSourceMap, PayloadSourceMap, SourceMap,
    TransactionExampleSourceMap,
};

use super::SerializeError;

#[derive(Serialize)]
struct Root<'a> {
    ast_version: &'static str,
    #[serde(flatten)]
    blueprint: &'a Blueprint,
}

/// Serializes a blueprint AST to pretty-printed JSON, `ast_version` first.
pub fn serialize_json(blueprint: &Blueprint) -> Result<String, SerializeError> {
    let mut out = serde_json::to_string_pretty(&Root {
        ast_version: AST_VERSION,
        blueprint,
    })?;
    out.push('\n');
    Ok(out)
}

/// Re-parses serialized JSON into an AST. Unknown keys (such as
/// `ast_version`) are ignored.
pub fn deserialize_json(text: &str) -> Result<Blueprint, SerializeError> {
    Ok(serde_json::from_str(text)?)
}

fn ranges_value(map: &SourceMap) -> Value {
    Value::Array(
        map.ranges()
            .iter()
            .map(|r| json!([r.location, r.length]))
            .collect(),
    )
}

fn range_list_value(maps: &[SourceMap]) -> Value {
    Value::Array(maps.iter().map(ranges_value).collect())
}

fn payload_sm_value(payload: &PayloadSourceMap) -> Value {
    json!({
        "name": ranges_value(&payload.name),
        "description": ranges_value(&payload.description),
        "parameters": range_list_value(&payload.parameters),
        "headers": range_list_value(&payload.headers),
        "body": ranges_value(&payload.body),
        "schema": ranges_value(&payload.schema),
    })
}

fn example_sm_value(example: &TransactionExampleSourceMap) -> Value {
    json!({
        "name": ranges_value(&example.name),
        "description": ranges_value(&example.description),
        "requests": example.requests.iter().map(payload_sm_value).collect::<Vec<_>>(),
        "responses": example.responses.iter().map(payload_sm_value).collect::<Vec<_>>(),
    })
}

fn action_sm_value(action: &ActionSourceMap) -> Value {
    json!({
        "name": ranges_value(&action.name),
        "description": ranges_value(&action.description),
        "method": ranges_value(&action.method),
        "parameters": range_list_value(&action.parameters),
        "headers": range_list_value(&action.headers),
        "examples": action.examples.iter().map(example_sm_value).collect::<Vec<_>>(),
    })
}

/// Serializes the AST-shaped source map to pretty-printed JSON.
pub fn serialize_sourcemap_json(map: &BlueprintSourceMap) -> Result<String, SerializeError> {
    let groups: Vec<Value> = map
        .resource_groups
        .iter()
        .map(|group| {
            json!({
                "name": ranges_value(&group.name),
                "description": ranges_value(&group.description),
                "resources": group.resources.iter().map(|resource| json!({
                    "name": ranges_value(&resource.name),
                    "description": ranges_value(&resource.description),
                    "uriTemplate": ranges_value(&resource.uri_template),
                    "model": resource.model.as_ref().map(payload_sm_value),
                    "parameters": range_list_value(&resource.parameters),
                    "headers": range_list_value(&resource.headers),
                    "actions": resource.actions.iter().map(action_sm_value).collect::<Vec<_>>(),
                })).collect::<Vec<_>>(),
            })
        })
        .collect();
    let root = json!({
        "name": ranges_value(&map.name),
        "description": ranges_value(&map.description),
        "metadata": range_list_value(&map.metadata),
        "resourceGroups": groups,
    });
    let mut out = serde_json::to_string_pretty(&root)?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ast_version_leads_the_document() {
        let json = serialize_json(&Blueprint::default()).unwrap();
        assert!(json.trim_start().starts_with("{\n  \"ast_version\": \"2.0\""));
    }

    #[test]
    fn json_round_trips_structurally() {
        let blueprint = Blueprint {
            name: "API".into(),
            description: "desc".into(),
            ..Default::default()
        };
        let json = serialize_json(&blueprint).unwrap();
        let reparsed = deserialize_json(&json).unwrap();
        assert_eq!(blueprint, reparsed);
    }
}
