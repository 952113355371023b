//! Quick fix tests for unknown properties.

use futures::executor::block_on;
use qute::hir::{Diagnostic, MemberType, NativeModeSettings, codes};
use qute::ide::{
    AnalysisHost, CodeAction, CodeActionResolveData, CodeActionSettings, SharedSettings,
};
use qute::{CancellationToken, LineCol};

use crate::helpers::fixtures::{self, item_ignoring_age};
use crate::helpers::{FakeJavaProvider, JAVA_SOURCE_URI, TEMPLATE_URI, host_with_settings};

fn unknown_properties(host: &AnalysisHost) -> Vec<Diagnostic> {
    let cancel = CancellationToken::new();
    block_on(host.analysis().diagnostics(TEMPLATE_URI, &cancel))
        .unwrap()
        .into_iter()
        .filter(|d| d.has_code(codes::UNKNOWN_PROPERTY))
        .collect()
}

fn quick_fixes(provider: FakeJavaProvider, text: &str, settings: SharedSettings) -> Vec<CodeAction> {
    let (host, _) = host_with_settings(provider, text, settings);
    let diagnostics = unknown_properties(&host);
    assert_eq!(diagnostics.len(), 1, "expected one unknown property in {text}");
    let cancel = CancellationToken::new();
    block_on(host.analysis().code_actions(TEMPLATE_URI, &diagnostics, &cancel)).unwrap()
}

fn titles(actions: &[CodeAction]) -> Vec<&str> {
    actions.iter().map(|a| a.title.as_str()).collect()
}

fn lazy() -> SharedSettings {
    SharedSettings {
        code_action: CodeActionSettings {
            resolve_supported: true,
            data_supported: true,
        },
        ..SharedSettings::default()
    }
}

#[test]
fn test_unknown_property_fixes() {
    let provider = fixtures::provider().with_extension_class("org.acme.ItemExtensions");
    let actions = quick_fixes(provider, "{@org.acme.Item item}{item.nam}", SharedSettings::default());
    assert_eq!(
        titles(&actions),
        vec![
            "Replace with `name`.",
            "Create public field `nam` in `org.acme.Item`.",
            "Create getter `getNam()` in `org.acme.Item`.",
            "Create template extension `nam()` in class `org.acme.ItemExtensions`.",
            "Create template extension `nam()` in a new template extensions class.",
        ]
    );
    assert!(actions.iter().all(|a| a.kind.as_str() == "quickfix"));
}

#[test]
fn test_replace_edits_the_property() {
    let actions = quick_fixes(fixtures::provider(), "{@org.acme.Item item}{item.nam}", SharedSettings::default());
    let replace = &actions[0];
    let edit = replace.edit.as_ref().unwrap();
    assert_eq!(edit.changes.len(), 1);
    assert_eq!(edit.changes[0].uri, TEMPLATE_URI);
    let text_edit = &edit.changes[0].edits[0];
    assert_eq!(text_edit.new_text, "name");
    assert_eq!(text_edit.range.start, LineCol::new(0, 27));
    assert_eq!(text_edit.range.end, LineCol::new(0, 30));
}

#[test]
fn test_eager_fixes_fetch_generated_edits() {
    let provider = fixtures::provider().with_extension_class("org.acme.ItemExtensions");
    let (host, provider) =
        host_with_settings(provider, "{@org.acme.Item item}{item.nam}", SharedSettings::default());
    let diagnostics = unknown_properties(&host);
    let cancel = CancellationToken::new();
    let actions = block_on(host.analysis().code_actions(TEMPLATE_URI, &diagnostics, &cancel)).unwrap();

    assert!(actions.iter().all(CodeAction::is_resolved));
    assert!(actions.iter().all(|a| a.data.is_none()));
    assert_eq!(actions[1].edit.as_ref().unwrap().changes[0].uri, JAVA_SOURCE_URI);

    let generated: Vec<MemberType> = provider.generated().iter().map(|p| p.member_type).collect();
    assert_eq!(
        generated,
        vec![
            MemberType::Field,
            MemberType::Getter,
            MemberType::AppendTemplateExtension,
            MemberType::CreateTemplateExtension,
        ]
    );
    let append = &provider.generated()[2];
    assert_eq!(append.template_class.as_deref(), Some("org.acme.ItemExtensions"));
    assert_eq!(append.missing_property, "nam");
    assert_eq!(append.java_type, "org.acme.Item");
}

#[test]
fn test_lazy_fixes_carry_resolve_data() {
    let (host, provider) = host_with_settings(fixtures::provider(), "{@org.acme.Item item}{item.nam}", lazy());
    let diagnostics = unknown_properties(&host);
    let cancel = CancellationToken::new();
    let analysis = host.analysis();
    let actions = block_on(analysis.code_actions(TEMPLATE_URI, &diagnostics, &cancel)).unwrap();

    // The rename is computed locally and needs no resolution.
    assert!(actions[0].is_resolved());
    let field = actions[1].clone();
    assert!(!field.is_resolved());
    assert!(provider.generated().is_empty());

    let data: CodeActionResolveData = serde_json::from_value(field.data.clone().unwrap()).unwrap();
    assert_eq!(data.uri, TEMPLATE_URI);
    assert_eq!(data.params.member_type, MemberType::Field);

    let resolved = block_on(analysis.resolve_code_action(field)).unwrap();
    assert!(resolved.is_resolved());
    assert_eq!(provider.generated().len(), 1);
}

#[test]
fn test_resolve_without_data_fails() {
    let (host, _) = host_with_settings(fixtures::provider(), "{@org.acme.Item item}{item.nam}", lazy());
    let diagnostics = unknown_properties(&host);
    let action = CodeAction::quick_fix("Create public field `nam` in `org.acme.Item`.", &diagnostics[0]);
    assert!(block_on(host.analysis().resolve_code_action(action)).is_err());
}

#[test]
fn test_binary_type_gets_no_source_fixes() {
    let actions = quick_fixes(
        fixtures::provider(),
        "{@java.lang.String text}{text.emptyy}",
        SharedSettings::default(),
    );
    assert_eq!(
        titles(&actions),
        vec![
            "Replace with `empty`.",
            "Create template extension `emptyy()` in a new template extensions class.",
        ]
    );
}

#[test]
fn test_native_mode_limits_renames() {
    let text = "{@org.acme.Item item}{item.ag}";
    let provider = || fixtures::provider().with_type(item_ignoring_age());

    let actions = quick_fixes(provider(), text, SharedSettings::default());
    assert!(titles(&actions).contains(&"Replace with `age`."));

    let native = SharedSettings {
        native: NativeModeSettings { enabled: true },
        ..SharedSettings::default()
    };
    let actions = quick_fixes(provider(), text, native);
    assert!(!titles(&actions).iter().any(|t| t.starts_with("Replace with")));
}

#[test]
fn test_other_diagnostics_are_ignored() {
    let (host, _) = host_with_settings(fixtures::provider(), "{unknown}", SharedSettings::default());
    let cancel = CancellationToken::new();
    let analysis = host.analysis();
    let diagnostics = block_on(analysis.diagnostics(TEMPLATE_URI, &cancel)).unwrap();
    assert!(!diagnostics.is_empty());
    let actions = block_on(analysis.code_actions(TEMPLATE_URI, &diagnostics, &cancel)).unwrap();
    assert!(actions.is_empty());
}
