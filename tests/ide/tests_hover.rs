//! Hover tests for the IDE layer.

use futures::executor::block_on;
use qute::ide::{HoverResult, HoverSettings, SharedSettings};
use qute::{CancellationToken, LineCol, LineColRange};

use crate::helpers::fixtures;
use crate::helpers::{FakeJavaProvider, TEMPLATE_URI, cursor, host_with_settings};

fn hover_with(provider: FakeJavaProvider, marked: &str, settings: SharedSettings) -> Option<HoverResult> {
    let (text, position) = cursor(marked);
    let (host, _) = host_with_settings(provider, &text, settings);
    let cancel = CancellationToken::new();
    block_on(host.analysis().hover(TEMPLATE_URI, position, &cancel)).unwrap()
}

fn hover(marked: &str) -> Option<HoverResult> {
    hover_with(fixtures::provider(), marked, SharedSettings::default())
}

fn markdown() -> SharedSettings {
    SharedSettings {
        hover: HoverSettings {
            markdown_supported: true,
        },
        ..SharedSettings::default()
    }
}

#[test]
fn test_hover_declared_object() {
    let result = hover("{@org.acme.Item item}{it|em.name}").unwrap();
    assert_eq!(result.contents, "org.acme.Item");
    assert_eq!(
        result.range,
        LineColRange::new(LineCol::new(0, 22), LineCol::new(0, 26))
    );
}

#[test]
fn test_hover_field_with_javadoc() {
    let provider = fixtures::provider().with_javadoc("name", "The display name.");
    let result = hover_with(provider, "{@org.acme.Item item}{item.na|me}", SharedSettings::default()).unwrap();
    assert_eq!(result.contents, "name : String\nThe display name.");
}

#[test]
fn test_hover_markdown() {
    let result = hover_with(fixtures::provider(), "{@org.acme.Item item}{item.na|me}", markdown()).unwrap();
    assert_eq!(result.contents, "```java\nname : String\n```");
}

#[test]
fn test_hover_getter_property() {
    let result = hover("{@org.acme.Item item}{item.a|ge}").unwrap();
    assert_eq!(result.contents, "getAge() : int");
}

#[test]
fn test_hover_builtin_resolver() {
    let result = hover("{@org.acme.Item item}{item.ra|w}").unwrap();
    assert!(result.contents.starts_with("raw() : T\n"), "got {}", result.contents);
    assert!(result.contents.ends_with("Source: io.quarkus.qute.ValueResolvers"));
}

#[test]
fn test_hover_loop_metadata() {
    let result = hover("{@java.util.List<org.acme.Item> items}{#for item in items}{cou|nt}{/for}").unwrap();
    assert_eq!(result.contents, "count : java.lang.Integer\n1-based index");
}

#[test]
fn test_hover_loop_alias() {
    let result = hover("{@java.util.List<org.acme.Item> items}{#for item in items}{it|em}{/for}").unwrap();
    assert_eq!(result.contents, "org.acme.Item");
}

#[test]
fn test_hover_unknown_member() {
    assert!(hover("{@org.acme.Item item}{item.na|m}").is_none());
}

#[test]
fn test_hover_outside_expression() {
    assert!(hover("Hel|lo {@org.acme.Item item}").is_none());
}
