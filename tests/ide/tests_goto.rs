//! Go-to-definition tests for the IDE layer.

use futures::executor::block_on;
use qute::hir::{DataModelProject, DataModelTemplate};
use qute::ide::{GotoResult, GotoTarget, SharedSettings};
use qute::{CancellationToken, LineCol, LineColRange};

use crate::helpers::fixtures::{self, item_extensions};
use crate::helpers::{FakeJavaProvider, PROJECT, TEMPLATE_URI, cursor, host_with_settings};

fn goto_with(provider: FakeJavaProvider, marked: &str) -> GotoResult {
    let (text, position) = cursor(marked);
    let (host, _) = host_with_settings(provider, &text, SharedSettings::default());
    let cancel = CancellationToken::new();
    block_on(host.analysis().goto_definition(TEMPLATE_URI, position, &cancel)).unwrap()
}

fn goto(marked: &str) -> GotoResult {
    goto_with(fixtures::provider(), marked)
}

fn template_target(start: u32, end: u32) -> GotoTarget {
    GotoTarget::Template {
        uri: TEMPLATE_URI.into(),
        range: LineColRange::new(LineCol::new(0, start), LineCol::new(0, end)),
    }
}

fn java_target(source_type: &str, member: Option<&str>) -> GotoTarget {
    GotoTarget::JavaElement {
        source_type: source_type.into(),
        member: member.map(Into::into),
        project_uri: PROJECT.into(),
    }
}

#[test]
fn test_goto_declaration_alias() {
    let result = goto("{@org.acme.Item item}{|item.name}");
    assert_eq!(result.targets, vec![template_target(16, 20)]);
}

#[test]
fn test_goto_java_field() {
    let result = goto("{@org.acme.Item item}{item.na|me}");
    assert_eq!(result.targets, vec![java_target("org.acme.Item", Some("name"))]);
}

#[test]
fn test_goto_getter_uses_java_name() {
    let result = goto("{@org.acme.Item item}{item.a|ge}");
    assert_eq!(result.targets, vec![java_target("org.acme.Item", Some("getAge"))]);
}

#[test]
fn test_goto_template_extension() {
    let provider = fixtures::provider().with_data_model(item_extensions());
    let result = goto_with(provider, "{@org.acme.Item item}{item.discounted|Price(10)}");
    assert_eq!(
        result.targets,
        vec![java_target("org.acme.ItemExtensions", Some("discountedPrice"))]
    );
}

#[test]
fn test_goto_declared_type() {
    let result = goto("{@org.acme.It|em item}{item.name}");
    assert_eq!(result.targets, vec![java_target("org.acme.Item", None)]);
}

#[test]
fn test_goto_loop_alias() {
    let result = goto("{@java.util.List<org.acme.Item> items}{#for item in items}{ite|m.name}{/for}");
    assert_eq!(result.targets, vec![template_target(44, 48)]);
}

#[test]
fn test_goto_checked_template_parameter() {
    let mut checked =
        DataModelTemplate::new("items", "org.acme.ItemResource$Templates").with_parameter("item", "org.acme.Item");
    checked.source_method = Some("items".into());
    let provider = fixtures::provider().with_data_model(DataModelProject::default().with_template(checked));
    let result = goto_with(provider, "{it|em.name}");
    assert_eq!(
        result.targets,
        vec![java_target("org.acme.ItemResource$Templates", Some("items"))]
    );
}

#[test]
fn test_goto_unknown_name() {
    assert!(goto("{unkn|own}").is_empty());
}
