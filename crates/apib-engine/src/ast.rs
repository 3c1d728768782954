//! The Blueprint abstract syntax tree.
//!
//! All nodes are plain owned records created during parsing and handed to
//! their parent; nothing is shared and no cycles occur. The serde derives
//! carry the fixed JSON key vocabulary (`uriTemplate`, `resourceGroups`, …),
//! so serializing and re-parsing the JSON yields structurally identical
//! nodes.

use serde::{Deserialize, Serialize};

/// Version of the serialized AST layout.
pub const AST_VERSION: &str = "2.0";

/// A `KEY: VALUE` entry (metadata, HTTP headers).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValuePair {
    pub name: String,
    pub value: String,
}

impl KeyValuePair {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Top-level parse product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub metadata: Vec<KeyValuePair>,
    pub name: String,
    pub description: String,
    pub resource_groups: Vec<ResourceGroup>,
}

/// A `# Group <Name>` section, or the anonymous group wrapping bare
/// resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroup {
    pub name: String,
    pub description: String,
    pub resources: Vec<Resource>,
}

/// A resource heading with its URI template and children.
///
/// `uri_template` is non-empty for every successfully parsed resource. When
/// `model` is present its name is the resource name unless the model carried
/// an explicit symbol name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub name: String,
    pub uri_template: String,
    pub description: String,
    pub model: Option<Payload>,
    pub parameters: Vec<Parameter>,
    pub headers: Vec<KeyValuePair>,
    pub actions: Vec<Action>,
}

/// One HTTP method section inside a resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub name: String,
    pub method: String,
    pub description: String,
    pub parameters: Vec<Parameter>,
    pub headers: Vec<KeyValuePair>,
    pub examples: Vec<TransactionExample>,
}

/// Requests and the responses they elicit, in definition order.
///
/// A request arriving after the current example already holds responses
/// opens a new example.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionExample {
    pub name: String,
    pub description: String,
    pub requests: Vec<Payload>,
    pub responses: Vec<Payload>,
}

/// A request, response, or model payload.
///
/// At most one of `body` / `symbol_reference` is populated from a direct
/// definition; a resolved reference copies the referenced model's assets and
/// records the name in `symbol_reference`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub name: String,
    pub description: String,
    pub parameters: Vec<Parameter>,
    pub headers: Vec<KeyValuePair>,
    pub body: String,
    pub schema: String,
    pub symbol_reference: Option<String>,
}

/// Whether a URI parameter must be supplied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterUse {
    #[default]
    Optional,
    Required,
}

/// One entry of a `+ Parameters` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub parameter_type: String,
    pub required: bool,
    pub default_value: String,
    pub example_value: String,
    pub values: Vec<String>,
    #[serde(rename = "use")]
    pub use_flag: ParameterUse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_keys_use_the_fixed_vocabulary() {
        let mut resource = Resource {
            uri_template: "/1".into(),
            ..Default::default()
        };
        resource.actions.push(Action {
            method: "GET".into(),
            ..Default::default()
        });
        let json = serde_json::to_value(&resource).unwrap();
        assert!(json.get("uriTemplate").is_some());
        assert!(json.get("actions").is_some());
        assert!(json["actions"][0].get("examples").is_some());
    }

    #[test]
    fn parameter_type_and_use_are_renamed() {
        let parameter = Parameter {
            name: "id".into(),
            parameter_type: "number".into(),
            required: true,
            use_flag: ParameterUse::Required,
            ..Default::default()
        };
        let json = serde_json::to_value(&parameter).unwrap();
        assert_eq!(json["type"], "number");
        assert_eq!(json["use"], "required");
    }
}
