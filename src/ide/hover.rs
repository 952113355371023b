//! Hover information for expression parts.

use smol_str::SmolStr;

use super::settings::SharedSettings;
use crate::base::{Cancelled, LineColRange, TextSize};
use crate::hir::{
    Binding, DocumentationFormat, JavadocParams, MemberRef, TypeResolver, ValueResolver,
};
use crate::syntax::{ExpressionCursor, NodeId, PartKind};

/// Result of a hover request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoverResult {
    /// The hover content, markdown when the client renders it.
    pub contents: String,
    /// Range of the hovered part.
    pub range: LineColRange,
}

/// Hover content for the part at `offset`.
pub async fn hover(
    resolver: &TypeResolver<'_>,
    offset: TextSize,
    settings: &SharedSettings,
) -> Result<Option<HoverResult>, Cancelled> {
    let template = resolver.template();
    let Some(ExpressionCursor::Part(part_id)) = template.expression_cursor_at(offset) else {
        return Ok(None);
    };
    let Some(part) = template.part(part_id) else {
        return Ok(None);
    };
    let markdown = settings.hover.markdown_supported;

    let contents = match &part.kind {
        PartKind::Object { literal: Some(java_type) } => Some(code_block(java_type, markdown)),
        PartKind::Object { literal: None } => object_hover(resolver, part_id, &part.name, markdown).await?,
        PartKind::Method(call) if call.operator => None,
        PartKind::Property | PartKind::Method(_) => match resolver.resolve_member(part_id).await? {
            Some((_, member)) => Some(member_hover(resolver, &member, markdown).await),
            None => None,
        },
    };
    Ok(contents.map(|contents| HoverResult {
        contents,
        range: template.line_col_range(part.name_range),
    }))
}

async fn object_hover(
    resolver: &TypeResolver<'_>,
    part_id: NodeId,
    name: &str,
    markdown: bool,
) -> Result<Option<String>, Cancelled> {
    let template = resolver.template();
    let namespace = template.parts_of(part_id).and_then(|(_, p)| p.namespace.clone());
    if let Some(namespace) = namespace {
        let found = resolver
            .cache()
            .namespace_resolvers(&namespace, resolver.project_uri())
            .await
            .into_iter()
            .find(|r| r.matches(name));
        return Ok(found.map(|r| resolver_hover(&r, markdown)));
    }

    let Some(binding) = resolver.resolve_binding(name, part_id).await? else {
        return Ok(None);
    };
    if let Binding::LoopMetadata { metadata, .. } = &binding {
        let signature = format!("{} : {}", metadata.name, metadata.java_type);
        return Ok(Some(with_documentation(code_block(&signature, markdown), metadata.description, markdown)));
    }
    if let Binding::GlobalVariable(global) = &binding {
        return Ok(Some(resolver_hover(global, markdown)));
    }
    Ok(resolver
        .binding_signature(&binding)
        .await?
        .map(|signature| code_block(&signature, markdown)))
}

async fn member_hover(resolver: &TypeResolver<'_>, member: &MemberRef, markdown: bool) -> String {
    let signature = member.signature();
    let mut contents = code_block(&signature, markdown);
    if let MemberRef::Resolver(value_resolver) = member {
        if let Some(description) = &value_resolver.description {
            contents = with_documentation(contents, description, markdown);
        }
        return with_documentation(contents, &source_line(&value_resolver.source_type, markdown), markdown);
    }
    let params = JavadocParams {
        source_type: SmolStr::new(member.source_type()),
        project_uri: SmolStr::new(resolver.project_uri()),
        member_name: SmolStr::new(member.name()),
        signature,
        format: if markdown {
            DocumentationFormat::Markdown
        } else {
            DocumentationFormat::PlainText
        },
    };
    match resolver.cache().javadoc(&params).await {
        Some(doc) if !doc.trim().is_empty() => with_documentation(contents, &doc, markdown),
        _ => contents,
    }
}

fn resolver_hover(value_resolver: &ValueResolver, markdown: bool) -> String {
    let mut contents = code_block(&value_resolver.signature(), markdown);
    if let ValueResolver::Method(method) = value_resolver {
        if let Some(description) = &method.description {
            contents = with_documentation(contents, description, markdown);
        }
    }
    with_documentation(contents, &source_line(value_resolver.source_type(), markdown), markdown)
}

fn source_line(source_type: &str, markdown: bool) -> String {
    if markdown {
        format!("Source: `{source_type}`")
    } else {
        format!("Source: {source_type}")
    }
}

fn code_block(text: &str, markdown: bool) -> String {
    if markdown {
        format!("```java\n{text}\n```")
    } else {
        text.to_string()
    }
}

fn with_documentation(mut contents: String, documentation: &str, markdown: bool) -> String {
    contents.push_str(if markdown { "\n\n" } else { "\n" });
    contents.push_str(documentation);
    contents
}
