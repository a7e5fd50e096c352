//! End-to-end pipeline tests: text through the tokenizer and parser to
//! a value tree, and back out through the writer.

use pretty_assertions::assert_eq;

use jsonkit_core::{parse, stringify, Error, Value};

// =============================================================================
// Parsing complete documents
// =============================================================================

#[test]
fn alice_document() {
    let root = parse(concat!(
        "{\n",
        "  name: 'Alice',\n",
        "  age: 18,\n",
        "  happy: true,\n",
        "  weight: 55.5,\n",
        "  friends: ['Bob', 'Carol'],\n",
        "  address: {city: 'Lyon', zip: '69000'}\n",
        "}",
    ))
    .unwrap();

    assert_eq!(root.len().unwrap(), 6);
    assert_eq!(root.get("name").unwrap().to_text().unwrap(), "Alice");
    assert_eq!(root.get("age").unwrap().to_integer().unwrap(), 18);
    assert!(root.get("happy").unwrap().to_bool().unwrap());
    assert_eq!(root.get("weight").unwrap().to_number().unwrap(), 55.5);

    let friends = root.get("friends").unwrap();
    assert_eq!(friends.len().unwrap(), 2);
    assert_eq!(friends.at(0).unwrap().to_text().unwrap(), "Bob");

    let address = root.get("address").unwrap();
    assert_eq!(address.get("city").unwrap().to_text().unwrap(), "Lyon");
}

#[test]
fn mixed_array() {
    let root = parse("[1, 2, [true, false], {}, 3.14]").unwrap();
    assert_eq!(root.len().unwrap(), 5);
    assert!(root.at(2).unwrap().is_array());
    assert!(root.at(3).unwrap().is_object());
}

#[test]
fn escape_string() {
    let root = parse(r#"['\'\n\r\t\"\\']"#).unwrap();
    assert_eq!(root.at(0).unwrap().to_text().unwrap(), "'\n\r\t\"\\");
}

#[test]
fn strict_json_input_is_accepted() {
    let root = parse(r#"{"items": [null, true, -5, 0.5], "name": "x"}"#).unwrap();
    assert!(root.get("items").unwrap().at(0).unwrap().is_null());
    assert_eq!(root.get("items").unwrap().at(2).unwrap().to_integer().unwrap(), -5);
    assert_eq!(root.get("name").unwrap().to_text().unwrap(), "x");
}

// =============================================================================
// Canonical output
// =============================================================================

#[test]
fn canonical_text_for_a_nested_document() {
    let root = parse("{b: [1, 2], a: {c: 1}, empty: {}}").unwrap();

    assert_eq!(
        stringify(&root).unwrap(),
        concat!(
            "{\n",
            "  \"a\": {\n",
            "    \"c\": 1\n",
            "  },\n",
            "  \"b\": [1, 2],\n",
            "  \"empty\": {}\n",
            "}",
        )
    );
}

#[test]
fn stringify_then_parse_is_identity() {
    let root = parse(concat!(
        "{name: 'Alice', age: 18, happy: true, weight: 55.5,\n",
        " tags: [1, 'two', 3.0, null], nested: {deep: [{}, []]}}",
    ))
    .unwrap();

    let text = stringify(&root).unwrap();
    let reparsed = parse(&text).unwrap();
    assert_eq!(reparsed, root);
    assert_eq!(stringify(&reparsed).unwrap(), text);
}

// =============================================================================
// Failure modes
// =============================================================================

#[test]
fn structural_errors_are_fatal() {
    assert!(parse("[}").is_err());
    assert!(parse("{a: }").is_err());
    assert!(parse("{a 1}").is_err());
    assert!(matches!(parse("{a: 1"), Err(Error::UnexpectedEnd)));
    assert!(matches!(parse("{} []"), Err(Error::TrailingContent)));
}

#[test]
fn lexical_errors_are_fatal() {
    assert!(parse("[.5]").is_err());
    assert!(parse("[1.2.3]").is_err());
    assert!(parse("['open\n']").is_err());
    assert!(parse(r#"["\q"]"#).is_err());
}

#[test]
fn programmatic_tree_round_trips() {
    let root = Value::default();
    root.entry("server").unwrap().insert("port", 8080).unwrap();
    root.entry("server").unwrap().insert("tls", true).unwrap();
    let hosts = Value::array();
    hosts.push("alpha").unwrap();
    hosts.push("beta").unwrap();
    root.insert("hosts", hosts).unwrap();

    let text = stringify(&root).unwrap();
    assert_eq!(parse(&text).unwrap(), root);
}
