//! End-to-end parses of representative blueprint documents.

use apib_engine::{ParseOptions, Payload, SymbolTable, parse, parse_with_symbols};
use pretty_assertions::assert_eq;

#[test]
fn punctuation_in_identifiers() {
    let source = "# Parcel's sticker @#!$%^&*=-?><,.~`\"' [/]\n";
    let result = parse(source, ParseOptions::default());

    assert_eq!(result.report.error_code(), 0);
    assert!(result.report.warnings.is_empty());

    let groups = &result.node.resource_groups;
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].resources.len(), 1);
    let resource = &groups[0].resources[0];
    assert_eq!(resource.name, "Parcel's sticker @#!$%^&*=-?><,.~`\"'");
    assert_eq!(resource.uri_template, "/");
    assert!(resource.actions.is_empty());
}

#[test]
fn non_ascii_characters_in_identifiers() {
    let source = "# Категории [/]\n";
    let result = parse(source, ParseOptions::default());

    assert_eq!(result.report.error_code(), 0);
    assert!(result.report.warnings.is_empty());

    let resource = &result.node.resource_groups[0].resources[0];
    assert_eq!(resource.name, "Категории");
    assert_eq!(resource.uri_template, "/");
    assert!(resource.actions.is_empty());
}

#[test]
fn multi_method_resource() {
    let source = "\
# /1
A

## GET
B

+ Response 200
    + Body

            Code 1

## HEAD
C

+ Response 200
    + Body

+ Request D

## PUT
E
";
    let result = parse(source, ParseOptions::default());
    assert_eq!(result.report.error_code(), 0);
    assert_eq!(result.report.warnings.len(), 1);
    assert!(
        result.report.warnings[0]
            .message
            .contains("content is expected to be preformatted code block")
    );

    let resource = &result.node.resource_groups[0].resources[0];
    assert_eq!(resource.uri_template, "/1");
    assert_eq!(resource.description, "A");
    assert_eq!(resource.actions.len(), 3);

    let get = &resource.actions[0];
    assert_eq!(get.method, "GET");
    assert_eq!(get.description, "B");
    assert!(get.examples[0].requests.is_empty());
    assert_eq!(get.examples[0].responses.len(), 1);
    assert_eq!(get.examples[0].responses[0].name, "200");
    assert_eq!(get.examples[0].responses[0].body, "Code 1");

    let head = &resource.actions[1];
    assert_eq!(head.method, "HEAD");
    assert_eq!(head.description, "C");
    let head_requests: Vec<&Payload> =
        head.examples.iter().flat_map(|e| e.requests.iter()).collect();
    let head_responses: Vec<&Payload> =
        head.examples.iter().flat_map(|e| e.responses.iter()).collect();
    assert_eq!(head_requests.len(), 1);
    assert_eq!(head_requests[0].name, "D");
    assert_eq!(head_responses.len(), 1);
    assert_eq!(head_responses[0].name, "200");
    assert_eq!(head_responses[0].body, "");

    let put = &resource.actions[2];
    assert_eq!(put.method, "PUT");
    assert_eq!(put.description, "E");
    assert!(put.examples.is_empty());
}

#[test]
fn action_redefining_a_resource_header() {
    let source = "\
# /1

+ Headers

        X-Header: A

## GET

+ Headers

        X-Header: B

+ Response 200

        ok
";
    let result = parse(source, ParseOptions::default());
    assert_eq!(result.report.error_code(), 0);
    assert_eq!(result.report.warnings.len(), 1);
    assert_eq!(result.report.warnings[0].code.value(), 4);

    let resource = &result.node.resource_groups[0].resources[0];
    assert_eq!(resource.headers[0].value, "A");
    let action = &resource.actions[0];
    assert_eq!(action.headers.len(), 1);
    assert_eq!(action.headers[0].name, "X-Header");
    assert_eq!(action.headers[0].value, "B");
}

#[test]
fn resource_finalized_by_terminator() {
    let result = parse("# /1\n---\nA\n", ParseOptions::default());
    assert_eq!(result.report.error_code(), 0);
    assert!(result.report.warnings.is_empty());

    let groups = &result.node.resource_groups;
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].resources.len(), 1);
    let resource = &groups[0].resources[0];
    assert_eq!(resource.uri_template, "/1");
    assert_eq!(resource.description, "");
    assert!(resource.actions.is_empty());
}

#[test]
fn symbol_redefined_across_parses_is_fatal() {
    let source = "# /resource\n+ Super Model (text/plain)\n\n          {...}\n";

    let mut symbols = SymbolTable::new();
    symbols.insert("Super", Payload::default());

    let result = parse_with_symbols(source, ParseOptions::default(), &symbols);
    assert_ne!(result.report.error_code(), 0);
}

#[test]
fn symbol_defined_once_parses_cleanly() {
    let source = "# /resource\n+ Super Model (text/plain)\n\n          {...}\n";
    let result = parse(source, ParseOptions::default());
    assert_eq!(result.report.error_code(), 0);

    let resource = &result.node.resource_groups[0].resources[0];
    let model = resource.model.as_ref().unwrap();
    assert_eq!(model.name, "Super");
    assert_eq!(model.headers[0].name, "Content-Type");
    assert_eq!(model.headers[0].value, "text/plain");
    assert!(model.body.contains("{...}"));
}

#[test]
fn response_defined_by_model_reference() {
    let source = "\
# Message [/message]

+ Message Model (text/plain)

        Hello World

## GET

+ Response Message
";
    // "Response Message" carries no numeric status, so the item is plain
    // description content; reference resolution is exercised through a
    // request below
    let result = parse(source, ParseOptions::default());
    assert_eq!(result.report.error_code(), 0);

    let request_source = "\
# Message [/message]

+ Message Model (text/plain)

        Hello World

## POST

+ Request Message

+ Response 204
";
    let result = parse(request_source, ParseOptions::default());
    assert_eq!(result.report.error_code(), 0);
    let action = &result.node.resource_groups[0].resources[0].actions[0];
    let request = &action.examples[0].requests[0];
    assert_eq!(request.symbol_reference.as_deref(), Some("Message"));
    assert_eq!(request.body, "Hello World");
    assert!(
        request
            .headers
            .iter()
            .any(|h| h.name == "Content-Type" && h.value == "text/plain")
    );
}
