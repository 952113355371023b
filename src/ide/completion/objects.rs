//! Root-level candidates: names bound by enclosing sections, template
//! declarations, globals, namespace resolvers and section tags.

use rustc_hash::FxHashSet;

use super::case::complete_case_values;
use super::members::{add_declared_members, resolver_item};
use super::snippet::{SECTION_SNIPPETS, strip_placeholders};
use super::{CompletionCollector, CompletionItem, CompletionKind};
use crate::base::{Cancelled, LineColRange, TextSize};
use crate::hir::{
    HierarchyMembers, TypeResolver, USER_TAG_SPECIALS, ValueResolver, simple_type_name,
};
use crate::ide::settings::SharedSettings;
use crate::syntax::{NodeId, SectionKind, Template};

/// Namespace whose names are the template's own data.
const DATA_NAMESPACE: &str = "data";

pub(super) struct ObjectPartRequest<'r> {
    pub(super) namespace: Option<&'r str>,
    /// Node whose enclosing sections define the scope.
    pub(super) anchor: NodeId,
    pub(super) offset: TextSize,
    pub(super) range: LineColRange,
}

pub(super) async fn complete_object_part(
    resolver: &TypeResolver<'_>,
    request: &ObjectPartRequest<'_>,
    settings: &SharedSettings,
    collector: &mut CompletionCollector,
) -> Result<(), Cancelled> {
    let template = resolver.template();
    let range = request.range;
    let case = case_section_of(template, request.anchor);

    if let Some(namespace) = request.namespace {
        if case.is_none() {
            if namespace == DATA_NAMESPACE {
                add_template_data(resolver, range, collector);
            } else {
                add_namespace_resolvers(resolver, namespace, false, range, settings, collector).await;
            }
        }
        return Ok(());
    }

    let mut names = FxHashSet::default();
    add_scope_names(resolver, request, case, settings, &mut names, collector).await?;

    if template.is_user_tag() {
        for &(name, description) in USER_TAG_SPECIALS {
            if names.insert(name.to_string()) {
                collector.add(keyword_item(name, description, range));
            }
        }
    }

    if case.is_none() {
        add_template_data(resolver, range, collector);
        add_global_variables(resolver, range, collector).await;
        for namespace in resolver.cache().namespaces(resolver.project_uri()).await {
            if namespace == DATA_NAMESPACE {
                continue;
            }
            add_namespace_resolvers(resolver, &namespace, true, range, settings, collector).await;
        }
    }
    Ok(())
}

/// Case block owning `anchor`: the block itself or the block whose start
/// tag holds the expression.
fn case_section_of(template: &Template, anchor: NodeId) -> Option<NodeId> {
    let is_case = |id: NodeId| template.section(id).is_some_and(|s| s.kind == SectionKind::Case);
    if is_case(anchor) {
        return Some(anchor);
    }
    template.owner_section(anchor).filter(|&owner| is_case(owner))
}

/// Names bound by the sections enclosing the anchor, innermost first. A
/// name is offered once, so inner declarations shadow outer ones.
async fn add_scope_names(
    resolver: &TypeResolver<'_>,
    request: &ObjectPartRequest<'_>,
    case: Option<NodeId>,
    settings: &SharedSettings,
    names: &mut FxHashSet<String>,
    collector: &mut CompletionCollector,
) -> Result<(), Cancelled> {
    let template = resolver.template();
    let range = request.range;
    let sections = template.scope_sections(request.anchor);
    let case_selector = case.and_then(|_| sections.first().copied());
    for section_id in sections {
        let Some(section) = template.section(section_id) else { continue };
        match section.kind {
            SectionKind::For | SectionKind::Each => {
                // Neither metadata nor the alias exist in the `{#else}` block.
                if section.is_in_else_block(request.offset) {
                    continue;
                }
                for metadata in section.metadata() {
                    if names.insert(metadata.name.to_string()) {
                        collector.add(keyword_item(metadata.name, metadata.description, range));
                    }
                }
                if let Some((alias, _)) = template.loop_alias(section_id) {
                    if names.insert(alias.to_string()) {
                        collector.add(reference_item(&alias, range));
                    }
                }
            }
            SectionKind::Let | SectionKind::Set | SectionKind::If => {
                let optional_only = section.kind == SectionKind::If;
                for parameter in section.parameters.iter().filter_map(|&p| template.parameter(p)) {
                    if optional_only && !parameter.optional {
                        continue;
                    }
                    if names.insert(parameter.name.to_string()) {
                        collector.add(reference_item(&parameter.name, range));
                    }
                }
            }
            SectionKind::With => {
                let Some(subject) = template.subject_expression(section_id) else { continue };
                let Some(signature) = resolver.expression_signature(subject).await? else { continue };
                let Some(ty) = resolver.resolve_java_type(&signature).await else { continue };
                let hierarchy = resolver.hierarchy(ty).await?;
                let members = HierarchyMembers::collect(&hierarchy, resolver.filter());
                add_declared_members(&members, range, false, settings, names, collector);
            }
            SectionKind::When | SectionKind::Switch => {
                if let (Some(case), Some(selector)) = (case, case_selector) {
                    if selector == section_id {
                        complete_case_values(resolver, selector, case, request.offset, range, names, collector)
                            .await?;
                    }
                }
            }
            SectionKind::Case | SectionKind::Custom => {}
        }
    }
    Ok(())
}

/// Parameter declaration aliases and checked template parameters.
fn add_template_data(resolver: &TypeResolver<'_>, range: LineColRange, collector: &mut CompletionCollector) {
    for (_, declaration) in resolver.template().parameter_declarations() {
        if let Some(alias) = &declaration.alias {
            collector.add(reference_item(alias, range).with_detail(declaration.java_type.as_str()));
        }
    }
    if let Some(data_model) = resolver.data_model_template() {
        for parameter in &data_model.template.parameters {
            collector.add(reference_item(&parameter.key, range).with_detail(parameter.source_type.as_str()));
        }
    }
}

async fn add_global_variables(
    resolver: &TypeResolver<'_>,
    range: LineColRange,
    collector: &mut CompletionCollector,
) {
    for global in resolver.cache().global_variables(resolver.project_uri()).await {
        let kind = match global {
            ValueResolver::Field(_) => CompletionKind::Field,
            ValueResolver::Method(_) => CompletionKind::Method,
        };
        let name = global.name();
        collector.add(
            CompletionItem::new(name, kind)
                .with_detail(simple_type_name(global.java_type()))
                .with_sort_text(format!("Zb{name}"))
                .with_edit(range, name),
        );
    }
}

/// Resolvers of `namespace`. Written without a namespace yet, labels and
/// inserted text carry the `namespace:` prefix.
async fn add_namespace_resolvers(
    resolver: &TypeResolver<'_>,
    namespace: &str,
    with_prefix: bool,
    range: LineColRange,
    settings: &SharedSettings,
    collector: &mut CompletionCollector,
) {
    let prefix = if with_prefix { format!("{namespace}:") } else { String::new() };
    for value_resolver in resolver.cache().namespace_resolvers(namespace, resolver.project_uri()).await {
        let item = match &value_resolver {
            ValueResolver::Method(method) => match &method.named {
                Some(named) => {
                    let label = format!("{prefix}{named}");
                    CompletionItem::new(label.as_str(), CompletionKind::Field)
                        .with_filter_text(label.as_str())
                        .with_detail(method.source_type.as_str())
                        .with_sort_text(format!("Zb{label}"))
                        .with_edit(range, label)
                }
                None => resolver_item(method, &prefix, range, false, settings),
            },
            ValueResolver::Field(field) => {
                let label = format!(
                    "{prefix}{} : {}",
                    field.name,
                    simple_type_name(&field.type_signature)
                );
                let insert = format!("{prefix}{}", field.name);
                CompletionItem::new(label.as_str(), CompletionKind::Field)
                    .with_filter_text(insert.as_str())
                    .with_detail(field.source_type.as_str())
                    .with_sort_text(format!("Zb{label}"))
                    .with_edit(range, insert)
            }
        };
        collector.add(item);
    }
}

/// Section tag proposals after `{#`.
pub(super) fn complete_section_tags(
    range: LineColRange,
    settings: &SharedSettings,
    collector: &mut CompletionCollector,
) {
    let snippets = settings.completion.snippets_supported;
    for snippet in SECTION_SNIPPETS {
        let body = if snippets {
            snippet.body.to_string()
        } else {
            strip_placeholders(snippet.body)
        };
        collector.add(
            CompletionItem::new(snippet.tag, CompletionKind::Snippet)
                .with_filter_text(snippet.tag)
                .with_documentation(snippet.description)
                .with_edit(range, body)
                .with_snippet(snippets),
        );
    }
}

fn reference_item(name: &str, range: LineColRange) -> CompletionItem {
    CompletionItem::new(name, CompletionKind::Reference).with_edit(range, name)
}

/// Loop metadata and implicit names, in the `Za` sort tier.
fn keyword_item(name: &str, description: &str, range: LineColRange) -> CompletionItem {
    CompletionItem::new(name, CompletionKind::Keyword)
        .with_detail(description)
        .with_sort_text(format!("Za{name}"))
        .with_edit(range, name)
}
