//! Code completion tests for the IDE layer.

use futures::executor::block_on;
use qute::hir::NativeModeSettings;
use qute::ide::{CompletionKind, CompletionList, InsertTextFormat, SharedSettings};
use qute::{CancellationToken, LineCol, LineColRange};

use crate::helpers::fixtures::{self, item_extensions, item_ignoring_age, special_item};
use crate::helpers::{FakeJavaProvider, TEMPLATE_URI, cursor, host_with_settings};

fn complete_with(provider: FakeJavaProvider, marked: &str, settings: SharedSettings) -> CompletionList {
    let (text, position) = cursor(marked);
    let (host, _) = host_with_settings(provider, &text, settings);
    let cancel = CancellationToken::new();
    block_on(host.analysis().completions(TEMPLATE_URI, position, &cancel)).unwrap()
}

fn complete(marked: &str) -> CompletionList {
    complete_with(fixtures::provider(), marked, SharedSettings::default())
}

fn filter_texts(list: &CompletionList) -> Vec<&str> {
    list.items.iter().filter_map(|item| item.filter_text.as_deref()).collect()
}

fn native() -> SharedSettings {
    SharedSettings {
        native: NativeModeSettings { enabled: true },
        ..SharedSettings::default()
    }
}

// =============================================================================
// MEMBER PARTS
// =============================================================================

#[test]
fn test_members_after_dot() {
    let list = complete("{@org.acme.Item item}{item.|}");
    let labels = list.labels();
    assert!(labels.contains(&"name : String"), "got {labels:?}");
    assert!(labels.contains(&"age : int"), "got {labels:?}");
    assert!(labels.contains(&"getAge() : int"), "got {labels:?}");
    assert!(labels.contains(&"discount(int percent) : BigDecimal"), "got {labels:?}");

    let name = list.find("name : String").unwrap();
    assert_eq!(name.kind, CompletionKind::Field);
    let edit = name.text_edit.as_ref().unwrap();
    assert_eq!(edit.new_text, "name");
    assert_eq!(edit.range, LineColRange::empty(LineCol::new(0, 27)));

    assert_eq!(list.find("age : int").unwrap().kind, CompletionKind::Property);
    assert_eq!(list.find("getAge() : int").unwrap().kind, CompletionKind::Method);
}

#[test]
fn test_members_include_builtin_resolvers() {
    let list = complete("{@org.acme.Item item}{item.|}");
    let names = filter_texts(&list);
    for expected in ["or", "ifTruthy", "raw", "safe"] {
        assert!(names.contains(&expected), "missing {expected} in {names:?}");
    }
    assert!(!names.contains(&"?:"));
    // List resolvers do not apply to Item.
    assert!(!names.contains(&"orEmpty"));
}

#[test]
fn test_partial_member_is_replaced() {
    let list = complete("{@org.acme.Item item}{item.na|}");
    let edit = list.find("name : String").unwrap().text_edit.clone().unwrap();
    assert_eq!(edit.range, LineColRange::new(LineCol::new(0, 27), LineCol::new(0, 29)));
}

#[test]
fn test_method_snippets() {
    let settings = SharedSettings {
        completion: qute::ide::CompletionSettings {
            snippets_supported: true,
            markdown_supported: false,
        },
        ..SharedSettings::default()
    };
    let list = complete_with(fixtures::provider(), "{@org.acme.Item item}{item.|}", settings);
    let discount = list.find("discount(int percent) : BigDecimal").unwrap();
    assert_eq!(discount.insert_text_format, InsertTextFormat::Snippet);
    assert_eq!(discount.insert_text(), "discount(${1:percent})$0");

    let get_age = list.find("getAge() : int").unwrap();
    assert_eq!(get_age.insert_text_format, InsertTextFormat::PlainText);

    // Resolvers whose only parameter is the receiver still get parentheses.
    let raw = list.find("raw() : T").unwrap();
    assert_eq!(raw.insert_text(), "raw()$0");
    assert_eq!(raw.insert_text_format, InsertTextFormat::Snippet);
}

#[test]
fn test_infix_keeps_single_parameter_members() {
    let provider = fixtures::provider().with_data_model(item_extensions());
    let list = complete_with(provider, "{@org.acme.Item item}{item |}", SharedSettings::default());
    let names = filter_texts(&list);
    assert!(names.contains(&"discount"), "got {names:?}");
    assert!(names.contains(&"discountedPrice"), "got {names:?}");
    assert!(names.contains(&"or"), "got {names:?}");
    assert!(names.contains(&"ifTruthy"), "got {names:?}");
    assert!(!names.contains(&"between"));
    assert!(!names.contains(&"raw"));
    assert!(!names.contains(&"safe"));
    assert!(!names.contains(&"name"));
    assert!(!names.contains(&"getAge"));
}

#[test]
fn test_template_extension_label_skips_receiver() {
    let provider = fixtures::provider().with_data_model(item_extensions());
    let list = complete_with(provider, "{@org.acme.Item item}{item.|}", SharedSettings::default());
    let extension = list.find("discountedPrice(int percent) : BigDecimal").unwrap();
    assert_eq!(extension.kind, CompletionKind::Function);
    assert_eq!(extension.detail.as_deref(), Some("org.acme.ItemExtensions"));
}

#[test]
fn test_unknown_receiver_has_no_members() {
    let list = complete("{@org.acme.Missing thing}{thing.|}");
    assert!(list.is_empty(), "got {:?}", list.labels());
}

// =============================================================================
// NATIVE MODE
// =============================================================================

#[test]
fn test_native_mode_hides_ignored_members() {
    let provider = fixtures::provider().with_type(item_ignoring_age());
    let list = complete_with(provider, "{@org.acme.Item item}{item.|}", native());
    let labels = list.labels();
    assert!(labels.contains(&"name : String"), "got {labels:?}");
    assert!(!labels.contains(&"age : int"), "got {labels:?}");
    assert!(!labels.contains(&"getAge() : int"), "got {labels:?}");
}

#[test]
fn test_ignored_members_visible_outside_native_mode() {
    let provider = fixtures::provider().with_type(item_ignoring_age());
    let list = complete_with(provider, "{@org.acme.Item item}{item.|}", SharedSettings::default());
    assert!(list.find("getAge() : int").is_some());
}

#[test]
fn test_native_mode_hides_unregistered_types() {
    let list = complete_with(fixtures::provider(), "{@org.acme.Item item}{item.|}", native());
    assert!(list.find("name : String").is_none());
}

#[test]
fn test_native_mode_keeps_members_inherited_from_unannotated_types() {
    let provider = fixtures::provider().with_type(special_item());
    let list = complete_with(provider, "{@org.acme.SpecialItem item}{item.|}", native());
    let labels = list.labels();
    assert!(labels.contains(&"badge : String"), "got {labels:?}");
    assert!(labels.contains(&"name : String"), "got {labels:?}");
    assert!(labels.contains(&"getAge() : int"), "got {labels:?}");
}

// =============================================================================
// OBJECT PARTS
// =============================================================================

#[test]
fn test_loop_alias_and_metadata() {
    let list = complete("{@java.util.List<org.acme.Item> items}{#for item in items}{|}{/for}");
    let labels = list.labels();
    assert!(labels.contains(&"item"), "got {labels:?}");
    assert!(labels.contains(&"items"), "got {labels:?}");
    assert_eq!(list.find("count").unwrap().kind, CompletionKind::Keyword);
    assert_eq!(list.find("count").unwrap().sort_text.as_deref(), Some("Zacount"));
}

#[test]
fn test_loop_metadata_hidden_outside_loop() {
    let list = complete("{@java.util.List<org.acme.Item> items}{#for item in items}{/for}{|}");
    let labels = list.labels();
    assert!(labels.contains(&"items"), "got {labels:?}");
    assert!(!labels.contains(&"count"), "got {labels:?}");
    assert!(!labels.contains(&"item"), "got {labels:?}");
}

#[test]
fn test_loop_alias_hidden_in_else_block() {
    let list = complete("{@java.util.List<org.acme.Item> items}{#for item in items}{item.name}{#else}{|}{/for}");
    let labels = list.labels();
    assert!(labels.contains(&"items"), "got {labels:?}");
    assert!(!labels.contains(&"item"), "got {labels:?}");
    assert!(!labels.contains(&"count"), "got {labels:?}");
}

// =============================================================================
// CASE VALUES
// =============================================================================

#[test]
fn test_enum_case_values() {
    let list = complete("{@org.acme.Color color}{#when color}{#is |}{/when}");
    let labels = list.labels();
    for expected in [
        "not : Operator",
        "ne : Operator",
        "!= : Operator",
        "in : Operator",
        "ni : Operator",
        "!in : Operator",
        "RED : Color",
        "GREEN : Color",
        "BLUE : Color",
    ] {
        assert!(labels.contains(&expected), "missing {expected} in {labels:?}");
    }
    assert!(!labels.contains(&"gt : Operator"));
}

#[test]
fn test_case_after_multi_operator_offers_constants_only() {
    let list = complete("{@org.acme.Color color}{#when color}{#is in RED |}{/when}");
    let labels = list.labels();
    assert!(labels.contains(&"GREEN : Color"), "got {labels:?}");
    assert!(!labels.contains(&"RED : Color"), "got {labels:?}");
    assert!(!labels.iter().any(|l| l.ends_with(": Operator")), "got {labels:?}");
}

// =============================================================================
// EDGE CASES
// =============================================================================

#[test]
fn test_plain_text_has_no_completions() {
    let list = complete("Hello |world");
    assert!(list.is_empty());
}

#[test]
fn test_cancelled_completion() {
    let (text, position) = cursor("{@org.acme.Item item}{item.|}");
    let (host, _) = host_with_settings(fixtures::provider(), &text, SharedSettings::default());
    let cancel = CancellationToken::new();
    cancel.cancel();
    assert!(block_on(host.analysis().completions(TEMPLATE_URI, position, &cancel)).is_err());
}
