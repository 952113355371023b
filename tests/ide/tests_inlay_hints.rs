//! Inlay hint tests.

use std::sync::Arc;

use futures::executor::block_on;
use qute::ide::{AnalysisHost, InlayHint, InlayHintSettings, JAVA_DEFINITION_COMMAND, SharedSettings};
use qute::{CancellationToken, LineCol, LineColRange};

use crate::helpers::fixtures;
use crate::helpers::{TEMPLATE_URI, host_with_settings};

const LOOP: &str = "{@java.util.List<org.acme.Item> items}{#for item in items}{#let label=item.name}{/let}{/for}";

fn hints_with(text: &str, range: Option<LineColRange>, settings: SharedSettings) -> Vec<InlayHint> {
    let (host, _) = host_with_settings(fixtures::provider(), text, settings);
    let cancel = CancellationToken::new();
    block_on(host.analysis().inlay_hints(TEMPLATE_URI, range, &cancel)).unwrap()
}

fn hints(text: &str) -> Vec<InlayHint> {
    hints_with(text, None, SharedSettings::default())
}

#[test]
fn test_loop_alias_and_let_hints() {
    let hints = hints(LOOP);
    let rendered: Vec<(LineCol, String)> = hints.iter().map(|h| (h.position, h.label_text())).collect();
    assert_eq!(
        rendered,
        vec![
            (LineCol::new(0, 48), ": Item".to_string()),
            (LineCol::new(0, 69), ": String".to_string()),
        ]
    );
    assert_eq!(hints[0].label.len(), 1);
}

#[test]
fn test_type_links_when_client_opens_java_types() {
    let settings = SharedSettings {
        commands: vec![JAVA_DEFINITION_COMMAND.to_string()],
        ..SharedSettings::default()
    };
    let hints = hints_with(LOOP, None, settings);
    let label = &hints[0].label;
    assert_eq!(label.len(), 2);
    assert_eq!(label[0].value, ": ");
    assert_eq!(label[1].value, "Item");
    let command = label[1].command.as_ref().unwrap();
    assert_eq!(command.command, JAVA_DEFINITION_COMMAND);
    assert_eq!(command.arguments[0]["sourceType"], "org.acme.Item");
}

#[test]
fn test_unresolved_type_has_no_hint() {
    let hints = hints("{@java.util.List<org.acme.Missing> items}{#for item in items}{/for}");
    assert!(hints.is_empty(), "got {hints:?}");
}

#[test]
fn test_range_limits_sections() {
    let text = "{@java.util.List<org.acme.Item> items}\n{#for item in items}\n{/for}";
    let first_line = LineColRange::new(LineCol::new(0, 0), LineCol::new(0, 38));
    assert!(hints_with(text, Some(first_line), SharedSettings::default()).is_empty());

    let second_line = LineColRange::new(LineCol::new(1, 0), LineCol::new(1, 20));
    let hints = hints_with(text, Some(second_line), SharedSettings::default());
    assert_eq!(hints.len(), 1);
    assert_eq!(hints[0].position, LineCol::new(1, 10));
}

#[test]
fn test_disabled_hints() {
    let settings = SharedSettings {
        inlay_hint: InlayHintSettings {
            enabled: true,
            show_section_parameter_type: false,
        },
        ..SharedSettings::default()
    };
    assert!(hints_with(LOOP, None, settings).is_empty());
}

#[test]
fn test_template_without_project_has_no_hints() {
    let mut host = AnalysisHost::new(Arc::new(fixtures::provider()));
    host.set_document(TEMPLATE_URI, LOOP, None);
    let cancel = CancellationToken::new();
    let hints = block_on(host.analysis().inlay_hints(TEMPLATE_URI, None, &cancel)).unwrap();
    assert!(hints.is_empty());
}

#[test]
fn test_cancelled_hints() {
    let (host, _) = host_with_settings(fixtures::provider(), LOOP, SharedSettings::default());
    let cancel = CancellationToken::new();
    cancel.cancel();
    assert!(block_on(host.analysis().inlay_hints(TEMPLATE_URI, None, &cancel)).is_err());
}
