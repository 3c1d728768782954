//! AST serializers.
//!
//! Deterministic tree walks over the parsed [`Blueprint`] emitting YAML or
//! JSON with a fixed key vocabulary. The YAML emitter is hand-rolled because
//! the output contract pins the exact quoting rules; JSON rides on the AST's
//! serde derives.

pub mod json;
pub mod yaml;

use crate::ast::Blueprint;

/// Output format selected on the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Renders the AST in the requested format.
pub fn serialize(blueprint: &Blueprint, format: Format) -> Result<String, SerializeError> {
    match format {
        Format::Yaml => Ok(yaml::serialize_yaml(blueprint)),
        Format::Json => json::serialize_json(blueprint),
    }
}

/// The fixed serialization key vocabulary.
pub(crate) mod key {
    pub const AST_VERSION: &str = "ast_version";
    pub const METADATA: &str = "metadata";
    pub const NAME: &str = "name";
    pub const VALUE: &str = "value";
    pub const DESCRIPTION: &str = "description";
    pub const RESOURCE_GROUPS: &str = "resourceGroups";
    pub const RESOURCES: &str = "resources";
    pub const URI_TEMPLATE: &str = "uriTemplate";
    pub const MODEL: &str = "model";
    pub const PARAMETERS: &str = "parameters";
    pub const HEADERS: &str = "headers";
    pub const ACTIONS: &str = "actions";
    pub const METHOD: &str = "method";
    pub const EXAMPLES: &str = "examples";
    pub const REQUESTS: &str = "requests";
    pub const RESPONSES: &str = "responses";
    pub const BODY: &str = "body";
    pub const SCHEMA: &str = "schema";
    pub const SYMBOL_REFERENCE: &str = "symbolReference";
    pub const TYPE: &str = "type";
    pub const REQUIRED: &str = "required";
    pub const DEFAULT_VALUE: &str = "defaultValue";
    pub const EXAMPLE_VALUE: &str = "exampleValue";
    pub const VALUES: &str = "values";
    pub const USE: &str = "use";
}
