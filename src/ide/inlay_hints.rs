//! Inlay hints — inferred Java types of section parameters.
//!
//! ```text
//! {#for item: Item in items}
//! {#let name: String=item.name}
//! {#if item.owner??: User}
//! ```
//!
//! ## Design
//!
//! Hint sites are collected by a walk over sections, pruned where a section
//! lies outside the requested range. Each site's type is a future over the
//! shared cache; a pass polls every future once without blocking. Sites
//! still waiting on the provider are awaited together and the pass is
//! rendered again, so a hint never blocks the others.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use serde::Serialize;
use smol_str::SmolStr;
use tracing::debug;

use super::settings::{JAVA_DEFINITION_COMMAND, SharedSettings};
use crate::base::{Cancelled, LineCol, TextRange, TextSize, check_cancelled};
use crate::hir::{ResolvedJavaTypeInfo, TypeResolver, simple_type_name};
use crate::syntax::{NodeId, SectionKind, Template};

/// Upper bound on render passes waiting for pending types.
const MAX_PASSES: usize = 4;

/// Kind of inlay hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlayHintKind {
    /// Type annotation hint (e.g., `: Item`)
    Type,
    /// Parameter name hint
    Parameter,
}

impl InlayHintKind {
    pub fn to_lsp(&self) -> u32 {
        match self {
            InlayHintKind::Type => 1,
            InlayHintKind::Parameter => 2,
        }
    }
}

/// A client command attached to a hint label.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub title: String,
    pub command: String,
    pub arguments: Vec<serde_json::Value>,
}

/// Arguments of the "open Java type" command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaDefinitionParams {
    pub source_type: SmolStr,
    pub project_uri: SmolStr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlayHintLabelPart {
    pub value: String,
    pub tooltip: Option<String>,
    pub command: Option<Command>,
}

impl InlayHintLabelPart {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            tooltip: None,
            command: None,
        }
    }
}

/// An inlay hint to display in the editor.
#[derive(Debug, Clone, PartialEq)]
pub struct InlayHint {
    /// Position right after the parameter name.
    pub position: LineCol,
    pub label: Vec<InlayHintLabelPart>,
    pub kind: InlayHintKind,
    pub padding_left: bool,
    pub padding_right: bool,
}

impl InlayHint {
    /// Label parts joined, as shown by clients without label parts.
    pub fn label_text(&self) -> String {
        self.label.iter().map(|part| part.value.as_str()).collect()
    }
}

/// A parameter whose type is shown.
#[derive(Debug, Clone, Copy)]
struct HintSite {
    /// Hint offset in the template.
    offset: TextSize,
    /// Expression typed for the hint.
    expression: NodeId,
    /// Hint shows the element type of the expression.
    iterable: bool,
    /// Unresolved types render as `?`.
    optional: bool,
}

/// Get inlay hints for the resolver's template.
///
/// `range` limits the sections visited; `None` covers the whole template.
pub async fn inlay_hints(
    resolver: &TypeResolver<'_>,
    range: Option<TextRange>,
    settings: &SharedSettings,
) -> Result<Vec<InlayHint>, Cancelled> {
    let template = resolver.template();
    if !settings.inlay_hint.enabled
        || !settings.inlay_hint.show_section_parameter_type
        || resolver.project_uri().is_empty()
    {
        return Ok(Vec::new());
    }
    let range = range.unwrap_or_else(|| TextRange::up_to(TextSize::of(template.text())));
    let mut sites = Vec::new();
    collect_sites(template, template.children(), range, &mut sites);
    let command_links = settings.is_command_supported(JAVA_DEFINITION_COMMAND);

    let mut pass = 1;
    loop {
        check_cancelled(resolver.cancel())?;
        let mut hints = Vec::new();
        let mut pending: Vec<BoxFuture<'_, Result<Option<Arc<ResolvedJavaTypeInfo>>, Cancelled>>> = Vec::new();
        for site in &sites {
            let mut future = site_type(resolver, *site).boxed();
            match (&mut future).now_or_never() {
                Some(ty) => {
                    if let Some(hint) = render(resolver, site, ty?.as_deref(), command_links) {
                        hints.push(hint);
                    }
                }
                None => pending.push(future),
            }
        }
        if pending.is_empty() || pass == MAX_PASSES {
            debug!(uri = template.uri(), hints = hints.len(), pending = pending.len(), pass, "inlay hints");
            return Ok(hints);
        }
        for result in join_all(pending).await {
            result?;
        }
        pass += 1;
    }
}

fn collect_sites(template: &Template, nodes: &[NodeId], range: TextRange, sites: &mut Vec<HintSite>) {
    for &id in nodes {
        let Some(section) = template.section(id) else { continue };
        if template.node(id).range.intersect(range).is_none() {
            continue;
        }
        if range.contains_range(section.start_tag) {
            section_sites(template, id, sites);
        }
        collect_sites(template, &section.children, range, sites);
    }
}

fn section_sites(template: &Template, id: NodeId, sites: &mut Vec<HintSite>) {
    let Some(section) = template.section(id) else { return };
    match section.kind {
        SectionKind::For => {
            let alias = template.loop_alias(id).and_then(|(_, parameter)| parameter);
            if let (Some(parameter), Some(expression)) = (alias, template.loop_iterable(id)) {
                sites.push(HintSite {
                    offset: template.node(parameter).range.end(),
                    expression,
                    iterable: true,
                    optional: false,
                });
            }
        }
        SectionKind::If | SectionKind::Let | SectionKind::Set | SectionKind::Custom => {
            let optional_only = section.kind == SectionKind::If;
            for &parameter_id in &section.parameters {
                let Some(parameter) = template.parameter(parameter_id) else { continue };
                if optional_only && !parameter.optional {
                    continue;
                }
                let Some(expression) = parameter.expression else { continue };
                let offset = if parameter.has_value() {
                    parameter.name_range.end()
                } else {
                    template.node(parameter_id).range.end()
                };
                sites.push(HintSite {
                    offset,
                    expression,
                    iterable: false,
                    optional: parameter.optional,
                });
            }
        }
        SectionKind::Each
        | SectionKind::With
        | SectionKind::When
        | SectionKind::Switch
        | SectionKind::Case => {}
    }
}

async fn site_type(
    resolver: &TypeResolver<'_>,
    site: HintSite,
) -> Result<Option<Arc<ResolvedJavaTypeInfo>>, Cancelled> {
    let Some(signature) = resolver.expression_signature(site.expression).await? else {
        return Ok(None);
    };
    let signature = if site.iterable {
        resolver.element_type(&signature).await.unwrap_or(signature)
    } else {
        signature
    };
    Ok(resolver.resolve_java_type(&signature).await)
}

fn render(
    resolver: &TypeResolver<'_>,
    site: &HintSite,
    ty: Option<&ResolvedJavaTypeInfo>,
    command_links: bool,
) -> Option<InlayHint> {
    let label = match ty {
        Some(ty) => {
            let name = simple_type_name(&ty.signature);
            if command_links {
                vec![InlayHintLabelPart::new(": "), java_type_part(name, ty, resolver.project_uri())]
            } else {
                vec![InlayHintLabelPart::new(format!(": {name}"))]
            }
        }
        None if site.optional => vec![InlayHintLabelPart::new(": ?")],
        None => return None,
    };
    Some(InlayHint {
        position: resolver.template().line_index().line_col(site.offset),
        label,
        kind: InlayHintKind::Type,
        padding_left: false,
        padding_right: false,
    })
}

/// Clickable type name opening the Java type.
fn java_type_part(name: String, ty: &ResolvedJavaTypeInfo, project_uri: &str) -> InlayHintLabelPart {
    let params = JavaDefinitionParams {
        source_type: ty.signature.clone(),
        project_uri: SmolStr::new(project_uri),
    };
    let command = Command {
        title: format!("Open `{}` Java type.", ty.signature),
        command: JAVA_DEFINITION_COMMAND.to_string(),
        arguments: serde_json::to_value(&params).into_iter().collect(),
    };
    InlayHintLabelPart {
        value: name,
        tooltip: Some(command.title.clone()),
        command: Some(command),
    }
}
