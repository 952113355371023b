//! Java type cache and hierarchy tests.

use std::sync::Arc;

use futures::executor::block_on;
use qute::CancellationToken;
use qute::hir::{
    HierarchyMembers, JavaDataModelCache, JavaTypeFilter, ResolvedJavaTypeInfo, TypeLookup,
    load_hierarchy,
};

use crate::helpers::fixtures::{self, ITEM};
use crate::helpers::{FakeJavaProvider, PROJECT};

fn cache(provider: FakeJavaProvider) -> (JavaDataModelCache, Arc<FakeJavaProvider>) {
    let provider = Arc::new(provider);
    (JavaDataModelCache::new(provider.clone()), provider)
}

// =============================================================================
// MEMOIZATION
// =============================================================================

#[test]
fn test_concurrent_lookups_share_one_request() {
    let (cache, provider) = cache(fixtures::provider());
    let (first, second) = block_on(async {
        futures::join!(
            cache.resolve_java_type(ITEM, PROJECT),
            cache.resolve_java_type(ITEM, PROJECT)
        )
    });
    let (first, second) = (first.unwrap(), second.unwrap());
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(provider.type_calls(), 1);
}

#[test]
fn test_resolved_type_is_reused() {
    let (cache, provider) = cache(fixtures::provider());
    block_on(cache.resolve_java_type(ITEM, PROJECT));
    assert!(matches!(
        cache.peek_java_type(ITEM, PROJECT),
        TypeLookup::Resolved(Some(_))
    ));
    block_on(cache.resolve_java_type(ITEM, PROJECT));
    assert_eq!(provider.type_calls(), 1);
}

#[test]
fn test_unresolved_type_is_remembered() {
    let (cache, provider) = cache(fixtures::provider());
    assert!(block_on(cache.resolve_java_type("org.acme.Missing", PROJECT)).is_none());
    assert!(block_on(cache.resolve_java_type("org.acme.Missing", PROJECT)).is_none());
    assert_eq!(provider.type_calls(), 1);
}

#[test]
fn test_invalidate_drops_project_types() {
    let (cache, provider) = cache(fixtures::provider());
    block_on(cache.resolve_java_type(ITEM, PROJECT));
    cache.invalidate(PROJECT);
    block_on(cache.resolve_java_type(ITEM, PROJECT));
    assert_eq!(provider.type_calls(), 2);
}

#[test]
fn test_generic_types_share_raw_lookup() {
    let (cache, provider) = cache(fixtures::provider());
    let items = block_on(cache.resolve_java_type("java.util.List<org.acme.Item>", PROJECT)).unwrap();
    let names = block_on(cache.resolve_java_type("java.util.List<java.lang.String>", PROJECT)).unwrap();
    assert_eq!(items.iterable_of.as_deref(), Some(ITEM));
    assert_eq!(names.iterable_of.as_deref(), Some("java.lang.String"));
    assert_eq!(provider.type_calls(), 1);
}

#[test]
fn test_array_types_need_no_provider() {
    let (cache, provider) = cache(fixtures::provider());
    let array = block_on(cache.resolve_java_type("org.acme.Item[]", PROJECT)).unwrap();
    assert_eq!(array.iterable_of.as_deref(), Some(ITEM));
    assert_eq!(provider.type_calls(), 0);
}

#[test]
fn test_provider_failure_is_unknown_type() {
    let (cache, _) = cache(fixtures::provider());
    assert!(block_on(cache.resolve_java_type(ITEM, "file:///projects/other")).is_none());
}

#[test]
fn test_empty_project_never_reaches_provider() {
    let (cache, provider) = cache(fixtures::provider());
    assert!(block_on(cache.resolve_java_type(ITEM, "")).is_none());
    assert_eq!(provider.type_calls(), 0);
}

// =============================================================================
// HIERARCHY
// =============================================================================

#[test]
fn test_cyclic_hierarchy_terminates() {
    let provider = FakeJavaProvider::new()
        .with_type(ResolvedJavaTypeInfo::new("org.acme.A").with_extended_type("org.acme.B"))
        .with_type(ResolvedJavaTypeInfo::new("org.acme.B").with_extended_type("org.acme.A"));
    let (cache, _) = cache(provider);
    let cancel = CancellationToken::new();
    let hierarchy = block_on(async {
        let a = cache.resolve_java_type("org.acme.A", PROJECT).await.unwrap();
        load_hierarchy(&cache, a, PROJECT, &JavaTypeFilter::unrestricted(), &cancel).await
    })
    .unwrap();
    let signatures: Vec<&str> = hierarchy.iter().map(|t| t.signature.as_str()).collect();
    assert_eq!(signatures, vec!["org.acme.A", "org.acme.B"]);
}

#[test]
fn test_subtype_field_shadows_ancestor() {
    let provider = FakeJavaProvider::new()
        .with_type(
            ResolvedJavaTypeInfo::new("org.acme.Child")
                .with_field("foo", "java.lang.String")
                .with_extended_type("org.acme.Parent"),
        )
        .with_type(
            ResolvedJavaTypeInfo::new("org.acme.Parent")
                .with_field("foo", "int")
                .with_field("bar", "int"),
        );
    let (cache, _) = cache(provider);
    let cancel = CancellationToken::new();
    let hierarchy = block_on(async {
        let child = cache.resolve_java_type("org.acme.Child", PROJECT).await.unwrap();
        load_hierarchy(&cache, child, PROJECT, &JavaTypeFilter::unrestricted(), &cancel).await
    })
    .unwrap();
    let members = HierarchyMembers::collect(&hierarchy, &JavaTypeFilter::unrestricted());
    let fields: Vec<(&str, &str)> = members
        .fields
        .iter()
        .map(|(owner, field)| (field.name.as_str(), owner.signature.as_str()))
        .collect();
    assert_eq!(fields, vec![("foo", "org.acme.Child"), ("bar", "org.acme.Parent")]);
}

#[test]
fn test_cancelled_hierarchy_load() {
    let (cache, _) = cache(fixtures::provider());
    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = block_on(async {
        let item = cache.resolve_java_type(ITEM, PROJECT).await.unwrap();
        load_hierarchy(&cache, item, PROJECT, &JavaTypeFilter::unrestricted(), &cancel).await
    });
    assert!(result.is_err());
}
