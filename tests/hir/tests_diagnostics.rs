//! Template validation tests.

use futures::executor::block_on;
use qute::hir::{Diagnostic, NativeModeSettings, Severity, UnknownPropertyData, codes};
use qute::ide::SharedSettings;
use qute::{CancellationToken, LineCol, LineColRange};

use crate::helpers::fixtures::{self, special_item};
use crate::helpers::{TEMPLATE_URI, host_with, host_with_settings};

fn diagnostics(text: &str) -> Vec<Diagnostic> {
    let (host, _) = host_with(fixtures::provider(), text);
    let cancel = CancellationToken::new();
    block_on(host.analysis().diagnostics(TEMPLATE_URI, &cancel)).unwrap()
}

fn range(start: u32, end: u32) -> LineColRange {
    LineColRange::new(LineCol::new(0, start), LineCol::new(0, end))
}

#[test]
fn test_valid_template_has_no_diagnostics() {
    let diagnostics = diagnostics("{@org.acme.Item item}{item.name}{item.age}{item.getAge()}");
    assert!(diagnostics.is_empty(), "unexpected: {diagnostics:?}");
}

#[test]
fn test_unknown_property() {
    let diagnostics = diagnostics("{@org.acme.Item item}{item.nam}");
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert!(diagnostic.has_code(codes::UNKNOWN_PROPERTY));
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(diagnostic.range, range(27, 30));

    let data: UnknownPropertyData = serde_json::from_value(diagnostic.data.clone().unwrap()).unwrap();
    assert_eq!(data.property, "nam");
    assert_eq!(data.signature, "org.acme.Item");
}

#[test]
fn test_undefined_variable() {
    let diagnostics = diagnostics("{@org.acme.Item item}{unknown.name}");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].has_code(codes::UNDEFINED_VARIABLE));
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert_eq!(diagnostics[0].range, range(22, 29));
}

#[test]
fn test_unknown_method() {
    let diagnostics = diagnostics("{@org.acme.Item item}{item.discounted(10)}");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].has_code(codes::UNKNOWN_METHOD));
}

#[test]
fn test_loop_alias_is_bound() {
    let diagnostics =
        diagnostics("{@java.util.List<org.acme.Item> items}{#for item in items}{item.name}{count}{/for}");
    assert!(diagnostics.is_empty(), "unexpected: {diagnostics:?}");
}

#[test]
fn test_unresolved_receiver_stops_validation() {
    let diagnostics = diagnostics("{@org.acme.Missing thing}{thing.name.length}");
    assert!(diagnostics.is_empty(), "unexpected: {diagnostics:?}");
}

#[test]
fn test_loop_alias_unbound_in_else_block() {
    let diagnostics =
        diagnostics("{@java.util.List<org.acme.Item> items}{#for item in items}{#else}{item}{/for}");
    assert_eq!(diagnostics.len(), 1, "got {diagnostics:?}");
    assert!(diagnostics[0].has_code(codes::UNDEFINED_VARIABLE));
}

#[test]
fn test_else_if_condition_is_validated() {
    let diagnostics = diagnostics("{@org.acme.Item item}{#if item.name??}a{#else if item.nam}b{/if}");
    assert_eq!(diagnostics.len(), 1, "got {diagnostics:?}");
    assert!(diagnostics[0].has_code(codes::UNKNOWN_PROPERTY));
}

#[test]
fn test_native_mode_resolves_inherited_members() {
    let settings = SharedSettings {
        native: NativeModeSettings { enabled: true },
        ..SharedSettings::default()
    };
    let text = "{@org.acme.SpecialItem item}{item.badge}{item.name}{item.age}";
    let (host, _) = host_with_settings(fixtures::provider().with_type(special_item()), text, settings);
    let cancel = CancellationToken::new();
    let diagnostics = block_on(host.analysis().diagnostics(TEMPLATE_URI, &cancel)).unwrap();
    assert!(diagnostics.is_empty(), "unexpected: {diagnostics:?}");
}
