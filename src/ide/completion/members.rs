//! Member candidates of a receiver type: fields, getters, methods and
//! value resolvers.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::snippet::{MethodSnippet, method_snippet};
use super::{CompletionCollector, CompletionItem, CompletionKind};
use crate::base::{Cancelled, LineColRange};
use crate::hir::{
    HierarchyMembers, JavaMethodInfo, MethodValueResolver, ResolvedJavaTypeInfo, TypeResolver,
    hierarchy_resolvers, simple_type_name,
};
use crate::ide::settings::SharedSettings;
use crate::syntax::NodeId;

/// Complete the member written after `receiver`.
pub(super) async fn complete_member_part(
    resolver: &TypeResolver<'_>,
    receiver: NodeId,
    range: LineColRange,
    infix: bool,
    settings: &SharedSettings,
    collector: &mut CompletionCollector,
) -> Result<(), Cancelled> {
    let Some(ty) = resolver.part_type(receiver).await? else {
        return Ok(());
    };
    let hierarchy = resolver.hierarchy(ty).await?;
    let members = HierarchyMembers::collect(&hierarchy, resolver.filter());
    let mut names = FxHashSet::default();
    add_declared_members(&members, range, infix, settings, &mut names, collector);

    let resolvers =
        hierarchy_resolvers(resolver.cache(), &hierarchy, resolver.project_uri(), resolver.cancel())
            .await?;
    for value_resolver in &resolvers {
        if !value_resolver.has_valid_name() {
            continue;
        }
        if infix && value_resolver.user_parameters().len() != 1 {
            continue;
        }
        collector.add(resolver_item(value_resolver, "", range, infix, settings));
    }
    Ok(())
}

/// Declared fields and methods of a loaded hierarchy.
///
/// `names` holds the names already offered; a field or getter property whose
/// name is taken is skipped, and every offered property name is recorded.
pub(super) fn add_declared_members(
    members: &HierarchyMembers,
    range: LineColRange,
    infix: bool,
    settings: &SharedSettings,
    names: &mut FxHashSet<String>,
    collector: &mut CompletionCollector,
) {
    if !infix {
        for (owner, field) in &members.fields {
            if !names.insert(field.name.to_string()) {
                continue;
            }
            collector.add(
                CompletionItem::new(field.simple_signature(), CompletionKind::Field)
                    .with_filter_text(field.name.as_str())
                    .with_detail(owner.signature.as_str())
                    .with_edit(range, field.name.as_str()),
            );
        }
    }

    for (owner, method) in &members.methods {
        if infix && method.parameters.len() != 1 {
            continue;
        }
        if !infix {
            if let Some(property) = method.getter_name() {
                if names.insert(property.to_string()) {
                    collector.add(property_item(owner, method, &property, range));
                }
            }
        }
        collector.add(method_item(owner, method, range, infix, settings));
    }
}

fn property_item(
    owner: &Arc<ResolvedJavaTypeInfo>,
    method: &JavaMethodInfo,
    property: &str,
    range: LineColRange,
) -> CompletionItem {
    let label = format!("{property} : {}", simple_type_name(&method.return_type));
    CompletionItem::new(label, CompletionKind::Property)
        .with_filter_text(property)
        .with_detail(owner.signature.as_str())
        .with_edit(range, property)
}

fn method_item(
    owner: &Arc<ResolvedJavaTypeInfo>,
    method: &JavaMethodInfo,
    range: LineColRange,
    infix: bool,
    settings: &SharedSettings,
) -> CompletionItem {
    let snippets = settings.completion.snippets_supported;
    let insert = method_snippet(
        &MethodSnippet {
            name: &method.name,
            parameters: &method.parameters,
            skip: 0,
            match_any: false,
            infix,
        },
        snippets,
    );
    CompletionItem::new(method.simple_signature(), CompletionKind::Method)
        .with_filter_text(method.name.as_str())
        .with_detail(owner.signature.as_str())
        .with_edit(range, insert)
        .with_snippet(snippets && method.has_parameters())
}

/// Virtual method candidate; the receiver parameter is not written by the
/// template author and is left out of the label. `prefix` is prepended to
/// the label and the inserted text (`config:`).
pub(super) fn resolver_item(
    resolver: &MethodValueResolver,
    prefix: &str,
    range: LineColRange,
    infix: bool,
    settings: &SharedSettings,
) -> CompletionItem {
    let snippets = settings.completion.snippets_supported;
    let skip = usize::from(resolver.namespace.is_none());
    let mut method = resolver.method.clone();
    method.name = resolver.name().into();
    let label = format!("{prefix}{}", method.simple_signature_skipping(skip));
    let snippet = method_snippet(
        &MethodSnippet {
            name: resolver.name(),
            parameters: &resolver.method.parameters,
            skip,
            match_any: resolver.is_match_any(),
            infix,
        },
        snippets,
    );
    let mut item = CompletionItem::new(label, CompletionKind::Function)
        .with_filter_text(format!("{prefix}{}", resolver.name()))
        .with_detail(resolver.source_type.as_str())
        .with_edit(range, format!("{prefix}{snippet}"))
        .with_snippet(snippets && (resolver.is_match_any() || resolver.method.has_parameters()));
    item.sort_text = Some(format!("Zc{}", item.label).into());
    if let Some(description) = &resolver.description {
        item = item.with_documentation(description.as_str());
    }
    item
}
