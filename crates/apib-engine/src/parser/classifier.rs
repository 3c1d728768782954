//! Section classification and signature grammar.
//!
//! [`classify`] decides which section a block introduces given the parent
//! section; it is pure and never advances the cursor. Keyword matching for
//! list-item sections is case-insensitive; HTTP methods match uppercase only
//! and the `Group` header keyword is case-sensitive.

use std::sync::LazyLock;

use regex::Regex;

use crate::blocks::{BlockKind, BlockStream};

use super::helpers::{extract_first_line, name_block};

/// The section a block introduces, or `Undefined` for description content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Undefined,
    ResourceGroup,
    Resource,
    Action,
    Headers,
    Parameters,
    Values,
    Body,
    Schema,
    Request,
    Response,
    Model,
    Terminator,
}

impl SectionKind {
    /// Lower-case section name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            SectionKind::Undefined => "section",
            SectionKind::ResourceGroup => "group",
            SectionKind::Resource => "resource",
            SectionKind::Action => "action",
            SectionKind::Headers => "headers",
            SectionKind::Parameters => "parameters",
            SectionKind::Values => "values",
            SectionKind::Body => "body",
            SectionKind::Schema => "schema",
            SectionKind::Request => "request",
            SectionKind::Response => "response",
            SectionKind::Model => "model",
            SectionKind::Terminator => "terminator",
        }
    }
}

const HTTP_METHODS: &str = "GET|POST|PUT|DELETE|OPTIONS|PATCH|HEAD|TRACE|CONNECT|LINK|UNLINK";

static METHOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^({HTTP_METHODS})\s*$")).unwrap());
static METHOD_URI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^({HTTP_METHODS})\s+(\S+)\s*$")).unwrap());
static URI_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(/\S*)\s*$").unwrap());
static NAMED_RESOURCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*\S)\s+\[([^\[\]]*)\]\s*$").unwrap());
static GROUP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Group\s+(.*\S)\s*$").unwrap());

static HEADERS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^headers\s*$").unwrap());
static PARAMETERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^parameters\s*$").unwrap());
static VALUES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^values\s*$").unwrap());
static BODY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^body\s*$").unwrap());
static SCHEMA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^schema\s*$").unwrap());
static REQUEST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^request(?:\s+(.*?))?(?:\s*\(([^()]*)\))?\s*$").unwrap());
static RESPONSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^response(?:\s+(\d+))?(?:\s*\(([^()]*)\))?\s*$").unwrap());
static MODEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:(.*\S)\s+)?model(?:\s*\(([^()]*)\))?\s*$").unwrap());
static PARAMETER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\S+)\s*(?:\(([^()]*)\))?\s*(?:-\s*)?(.*)$").unwrap());

/// Classifies the block at `pos` in the context of `parent`.
pub fn classify(stream: &BlockStream<'_>, pos: usize, parent: SectionKind) -> SectionKind {
    match stream.kind(pos) {
        Some(BlockKind::Header) => {
            let content = stream.get(pos).map(|b| b.content.as_str()).unwrap_or("");
            classify_header(content)
        }
        Some(BlockKind::HRule) => SectionKind::Terminator,
        Some(BlockKind::ListBegin) | Some(BlockKind::ListItemBegin) => {
            classify_list_item(stream, pos, parent)
        }
        _ => SectionKind::Undefined,
    }
}

/// Classifies a header block by its content alone.
pub fn classify_header(content: &str) -> SectionKind {
    let trimmed = content.trim();
    if METHOD_RE.is_match(trimmed) || METHOD_URI_RE.is_match(trimmed) {
        SectionKind::Action
    } else if GROUP_RE.is_match(trimmed) {
        SectionKind::ResourceGroup
    } else if URI_RE.is_match(trimmed) || NAMED_RESOURCE_RE.is_match(trimmed) {
        SectionKind::Resource
    } else {
        SectionKind::Undefined
    }
}

/// Classifies a list (item) by the first line of its name block.
///
/// `Values` is only recognized under `Parameters`; `Body`/`Schema` only
/// inside a payload; `Request`/`Response` only under an action and `Model`
/// only at resource scope — anywhere else the keyword is plain content.
pub fn classify_list_item(stream: &BlockStream<'_>, pos: usize, parent: SectionKind) -> SectionKind {
    let name_pos = name_block(stream, pos);
    let Some(block) = stream.get(name_pos) else {
        return SectionKind::Undefined;
    };
    let (first, _) = extract_first_line(&block.content);
    let line = first.trim();

    let payload_scope = matches!(
        parent,
        SectionKind::Request | SectionKind::Response | SectionKind::Model
    );
    if HEADERS_RE.is_match(line) {
        return SectionKind::Headers;
    }
    if PARAMETERS_RE.is_match(line) {
        return SectionKind::Parameters;
    }
    if parent == SectionKind::Parameters && VALUES_RE.is_match(line) {
        return SectionKind::Values;
    }
    if payload_scope && BODY_RE.is_match(line) {
        return SectionKind::Body;
    }
    if payload_scope && SCHEMA_RE.is_match(line) {
        return SectionKind::Schema;
    }
    if parent == SectionKind::Action {
        if REQUEST_RE.is_match(line) {
            return SectionKind::Request;
        }
        if RESPONSE_RE.is_match(line) {
            return SectionKind::Response;
        }
    }
    if matches!(parent, SectionKind::Resource | SectionKind::Action) && MODEL_RE.is_match(line) {
        return SectionKind::Model;
    }
    SectionKind::Undefined
}

// ── Signatures ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSignature {
    pub name: String,
    pub uri_template: String,
}

/// `<URI>` or `<Name> [<URI>]` from a resource header.
pub fn resource_signature(content: &str) -> Option<ResourceSignature> {
    let trimmed = content.trim();
    if let Some(caps) = URI_RE.captures(trimmed) {
        return Some(ResourceSignature {
            name: String::new(),
            uri_template: caps[1].to_string(),
        });
    }
    NAMED_RESOURCE_RE.captures(trimmed).map(|caps| ResourceSignature {
        name: caps[1].to_string(),
        uri_template: caps[2].to_string(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSignature {
    pub method: String,
    pub uri_template: Option<String>,
}

/// `<METHOD>` or `<METHOD> <URI>` from an action header.
pub fn action_signature(content: &str) -> Option<ActionSignature> {
    let trimmed = content.trim();
    if let Some(caps) = METHOD_RE.captures(trimmed) {
        return Some(ActionSignature {
            method: caps[1].to_string(),
            uri_template: None,
        });
    }
    METHOD_URI_RE.captures(trimmed).map(|caps| ActionSignature {
        method: caps[1].to_string(),
        uri_template: Some(caps[2].to_string()),
    })
}

/// The group name from a `Group <Name>` header.
pub fn group_signature(content: &str) -> Option<String> {
    GROUP_RE
        .captures(content.trim())
        .map(|caps| caps[1].to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadSignature {
    pub name: String,
    pub media_type: Option<String>,
}

fn payload_signature(re: &Regex, line: &str) -> Option<PayloadSignature> {
    re.captures(line.trim()).map(|caps| PayloadSignature {
        name: caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default(),
        media_type: caps.get(2).map(|m| m.as_str().trim().to_string()),
    })
}

/// `Request [<name>] [(<media-type>)]`.
pub fn request_signature(line: &str) -> Option<PayloadSignature> {
    payload_signature(&REQUEST_RE, line)
}

/// `Response [<status>] [(<media-type>)]`.
pub fn response_signature(line: &str) -> Option<PayloadSignature> {
    payload_signature(&RESPONSE_RE, line)
}

/// `[<symbol>] Model [(<media-type>)]`; an empty name means the resource
/// name is the symbol.
pub fn model_signature(line: &str) -> Option<PayloadSignature> {
    payload_signature(&MODEL_RE, line)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSignature {
    pub name: String,
    pub attributes: Vec<String>,
    pub description: String,
}

/// `name (type, required|optional, default=…) - description`.
pub fn parameter_signature(line: &str) -> Option<ParameterSignature> {
    PARAMETER_RE.captures(line.trim()).map(|caps| ParameterSignature {
        name: caps[1].to_string(),
        attributes: caps
            .get(2)
            .map(|m| {
                m.as_str()
                    .split(',')
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty())
                    .collect()
            })
            .unwrap_or_default(),
        description: caps.get(3).map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
    })
}
