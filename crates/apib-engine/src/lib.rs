//! # apib-engine
//!
//! Parser for API Blueprint, a structured Markdown dialect describing HTTP
//! APIs. Input is a UTF-8 buffer; output is a typed AST (the [`Blueprint`])
//! plus a [`Report`] of warnings and an optional error, each carrying byte
//! spans into the source.
//!
//! Two stages:
//!
//! 1. The [`lexer`] turns the text into a flat sequence of typed Markdown
//!    blocks with balanced begin/end markers ([`blocks`]).
//! 2. The [`parser`] walks that sequence by recursive descent, selecting
//!    section parsers through a block classifier, and builds the AST.
//!
//! A pre-pass over model sections fills the [`SymbolTable`]; request and
//! response payloads can then be defined by reference to a named model.
//! The [`serialize`] module renders the AST (and the optional AST-shaped
//! source map) as YAML or JSON.
//!
//! ```
//! use apib_engine::{ParseOptions, parse};
//!
//! let result = parse("# GET /ping\n\n+ Response 200\n\n        pong\n", ParseOptions::default());
//! assert_eq!(result.report.error_code(), 0);
//! let resource = &result.node.resource_groups[0].resources[0];
//! assert_eq!(resource.uri_template, "/ping");
//! assert_eq!(resource.actions[0].method, "GET");
//! ```

pub mod ast;
pub mod blocks;
pub mod lexer;
pub mod parser;
pub mod report;
pub mod serialize;
pub mod sourcemap;
pub mod symbols;

pub use ast::{
    Action, Blueprint, KeyValuePair, Parameter, ParameterUse, Payload, Resource, ResourceGroup,
    TransactionExample,
};
pub use report::{Annotation, AnnotationCode, Report};
pub use sourcemap::{BlueprintSourceMap, ByteRange, SourceMap};
pub use symbols::SymbolTable;

use blocks::BlockStream;

/// Option bit: a missing top-level API name is a `BusinessError`.
pub const REQUIRE_BLUEPRINT_NAME_OPTION: u32 = 1 << 0;
/// Option bit: populate the AST-shaped source map in the result.
pub const EXPORT_SOURCEMAP_OPTION: u32 = 1 << 1;

/// Recognized parser options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub require_blueprint_name: bool,
    pub export_sourcemap: bool,
}

impl ParseOptions {
    /// Builds options from the public bitmask surface.
    pub fn from_bits(bits: u32) -> Self {
        Self {
            require_blueprint_name: bits & REQUIRE_BLUEPRINT_NAME_OPTION != 0,
            export_sourcemap: bits & EXPORT_SOURCEMAP_OPTION != 0,
        }
    }
}

/// Everything one parse invocation produces.
#[derive(Debug)]
pub struct ParseResult {
    pub node: Blueprint,
    /// Present iff [`ParseOptions::export_sourcemap`] was set.
    pub source_map: Option<BlueprintSourceMap>,
    pub report: Report,
}

/// Parses an API Blueprint document.
pub fn parse(source: &str, options: ParseOptions) -> ParseResult {
    parse_with_symbols(source, options, &SymbolTable::new())
}

/// Parses with a pre-populated symbol table (copied before mutation), used
/// to detect symbols redefined across documents.
pub fn parse_with_symbols(
    source: &str,
    options: ParseOptions,
    symbols: &SymbolTable,
) -> ParseResult {
    let lexed = lexer::lex(source);
    let stream = BlockStream::new(&lexed);
    let mut parser = parser::Parser::new(source, stream, options, symbols.clone());
    let (node, source_map) = parser.parse_blueprint();
    let mut report = parser.report;
    report.sort_warnings();
    ParseResult {
        node,
        source_map: options.export_sourcemap.then_some(source_map),
        report,
    }
}
