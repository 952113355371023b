//! Quick fixes for unknown properties.
//!
//! ```text
//! {item.nam}   UnknownProperty on `nam`
//!   Replace with `name`.
//!   Create public field `nam` in `org.acme.Item`.
//!   Create getter `getNam()` in `org.acme.Item`.
//!   Create template extension `nam()` in class `org.acme.ItemExtensions`.
//!   Create template extension `nam()` in a new template extensions class.
//! ```
//!
//! ## Design
//!
//! Renames are computed locally from the receiver's visible members. Fixes
//! that generate Java source go through the provider: eagerly for clients
//! that cannot resolve code actions, lazily otherwise. A lazy fix carries a
//! [`CodeActionResolveData`] token that [`resolve_code_action`] turns into
//! an edit.

use std::sync::Arc;

use futures::future::join_all;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;
use tracing::debug;

use super::settings::SharedSettings;
use crate::base::{Cancelled, TextEdit, TextSize, WorkspaceEdit, check_cancelled};
use crate::hir::{
    Diagnostic, GenerateMissingMemberParams, HierarchyMembers, JavaDataModelCache, MemberType,
    ResolvedJavaTypeInfo, TypeResolver, codes, hierarchy_resolvers,
};
use crate::syntax::{NodeId, NodeKind, PartKind, Template};

// ============================================================================
// CODE ACTION TYPES
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CodeActionKind {
    QuickFix,
}

impl CodeActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeActionKind::QuickFix => "quickfix",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CodeAction {
    pub title: String,
    pub kind: CodeActionKind,
    /// Diagnostics fixed by this action.
    pub diagnostics: Vec<Diagnostic>,
    pub edit: Option<WorkspaceEdit>,
    /// Resolution token of a lazy action.
    pub data: Option<serde_json::Value>,
}

impl CodeAction {
    pub fn quick_fix(title: impl Into<String>, diagnostic: &Diagnostic) -> Self {
        Self {
            title: title.into(),
            kind: CodeActionKind::QuickFix,
            diagnostics: vec![diagnostic.clone()],
            edit: None,
            data: None,
        }
    }

    pub fn with_edit(mut self, edit: WorkspaceEdit) -> Self {
        self.edit = Some(edit);
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.edit.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeActionResolverKind {
    GenerateMissingMember,
}

/// Token carried by a lazy code action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeActionResolveData {
    /// Template the action was computed for.
    pub uri: SmolStr,
    pub resolver_kind: CodeActionResolverKind,
    pub params: GenerateMissingMemberParams,
}

#[derive(Debug, Error)]
pub enum CodeActionResolveError {
    #[error("code action has no resolve data")]
    MissingData,
    #[error("invalid code action resolve data: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// QUICK FIXES
// ============================================================================

/// Quick fixes for `diagnostics` of the resolver's template.
///
/// Only [`codes::UNKNOWN_PROPERTY`] diagnostics get fixes; the others are
/// skipped.
pub async fn code_actions(
    resolver: &TypeResolver<'_>,
    diagnostics: &[Diagnostic],
    settings: &SharedSettings,
) -> Result<Vec<CodeAction>, Cancelled> {
    let mut actions = Vec::new();
    let mut pending = Vec::new();
    for diagnostic in diagnostics {
        check_cancelled(resolver.cancel())?;
        if diagnostic.has_code(codes::UNKNOWN_PROPERTY) {
            unknown_property_fixes(resolver, diagnostic, settings, &mut actions, &mut pending).await?;
        }
    }

    if !pending.is_empty() {
        let cache = resolver.cache();
        let edits = join_all(
            pending
                .iter()
                .map(|(_, params)| cache.generate_missing_member(params)),
        )
        .await;
        for ((index, _), edit) in pending.iter().zip(edits) {
            actions[*index].edit = edit;
        }
    }
    debug!(uri = resolver.template().uri(), actions = actions.len(), "code actions");
    Ok(actions)
}

/// Fixes waiting for a generated edit: action index and request.
type PendingEdits = Vec<(usize, GenerateMissingMemberParams)>;

async fn unknown_property_fixes(
    resolver: &TypeResolver<'_>,
    diagnostic: &Diagnostic,
    settings: &SharedSettings,
    actions: &mut Vec<CodeAction>,
    pending: &mut PendingEdits,
) -> Result<(), Cancelled> {
    let template = resolver.template();
    let Some(offset) = template.offset_at(diagnostic.range.start) else {
        debug!(uri = template.uri(), range = ?diagnostic.range, "diagnostic outside the template");
        return Ok(());
    };
    let Some(part_id) = property_part_at(template, offset) else {
        return Ok(());
    };
    let Some(ty) = resolver.receiver_type(part_id).await? else {
        return Ok(());
    };
    let Some(property) = template.part(part_id).map(|p| p.name.clone()) else {
        return Ok(());
    };

    for candidate in similar_names(resolver, &ty, &property).await? {
        let edit = TextEdit::replace(diagnostic.range, candidate.as_str());
        actions.push(
            CodeAction::quick_fix(format!("Replace with `{candidate}`."), diagnostic)
                .with_edit(WorkspaceEdit::single(template.uri(), edit)),
        );
    }

    let project_uri = SmolStr::new(resolver.project_uri());
    let mut fixes = Vec::new();
    if !ty.binary {
        fixes.push((
            format!("Create public field `{property}` in `{}`.", ty.signature),
            MemberType::Field,
            None,
        ));
        fixes.push((
            format!("Create getter `get{}()` in `{}`.", capitalize(&property), ty.signature),
            MemberType::Getter,
            None,
        ));
    }
    for class in resolver.cache().template_extension_classes(&project_uri).await.iter() {
        fixes.push((
            format!("Create template extension `{property}()` in class `{class}`."),
            MemberType::AppendTemplateExtension,
            Some(class.clone()),
        ));
    }
    fixes.push((
        format!("Create template extension `{property}()` in a new template extensions class."),
        MemberType::CreateTemplateExtension,
        None,
    ));

    for (title, member_type, template_class) in fixes {
        let params = GenerateMissingMemberParams {
            member_type,
            missing_property: property.clone(),
            java_type: ty.signature.clone(),
            project_uri: project_uri.clone(),
            template_class,
        };
        let mut action = CodeAction::quick_fix(title, diagnostic);
        if settings.code_action.is_lazy() {
            let data = CodeActionResolveData {
                uri: SmolStr::new(template.uri()),
                resolver_kind: CodeActionResolverKind::GenerateMissingMember,
                params,
            };
            action.data = serde_json::to_value(&data).ok();
        } else {
            pending.push((actions.len(), params));
        }
        actions.push(action);
    }
    Ok(())
}

/// Property part whose name starts at `offset`.
fn property_part_at(template: &Template, offset: TextSize) -> Option<NodeId> {
    template.nodes().find_map(|(id, node)| match &node.kind {
        NodeKind::ExpressionPart(part)
            if matches!(part.kind, PartKind::Property) && part.name_range.start() == offset =>
        {
            Some(id)
        }
        _ => None,
    })
}

/// Visible property names of `ty` and its resolvers close to `property`.
async fn similar_names(
    resolver: &TypeResolver<'_>,
    ty: &Arc<ResolvedJavaTypeInfo>,
    property: &str,
) -> Result<Vec<SmolStr>, Cancelled> {
    let hierarchy = resolver.hierarchy(ty.clone()).await?;
    let members = HierarchyMembers::collect(&hierarchy, resolver.filter());
    let mut names: IndexSet<SmolStr> = members.property_names().collect();

    let resolvers =
        hierarchy_resolvers(resolver.cache(), &hierarchy, resolver.project_uri(), resolver.cancel()).await?;
    for value_resolver in &resolvers {
        if !value_resolver.has_valid_name() || !value_resolver.user_parameters().is_empty() {
            continue;
        }
        names.insert(SmolStr::new(value_resolver.name()));
        if let Some(getter) = value_resolver.getter_name() {
            names.insert(getter);
        }
    }
    Ok(names.into_iter().filter(|name| is_similar(property, name)).collect())
}

/// Case-insensitive edit distance within a third of the longer name.
pub fn is_similar(name: &str, candidate: &str) -> bool {
    if name == candidate {
        return false;
    }
    let name = name.to_lowercase();
    let candidate = candidate.to_lowercase();
    let longest = name.chars().count().max(candidate.chars().count());
    levenshtein_distance(&name, &candidate) <= (longest / 3).max(1)
}

fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1: Vec<char> = s1.chars().collect();
    let s2: Vec<char> = s2.chars().collect();
    if s1.is_empty() {
        return s2.len();
    }
    if s2.is_empty() {
        return s1.len();
    }

    let mut prev_row: Vec<usize> = (0..=s2.len()).collect();
    let mut curr_row = vec![0; s2.len() + 1];
    for (i, c1) in s1.iter().enumerate() {
        curr_row[0] = i + 1;
        for (j, c2) in s2.iter().enumerate() {
            let cost = usize::from(c1 != c2);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }
    prev_row[s2.len()]
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// Fill the edit of a lazy code action.
///
/// A provider that cannot generate the member leaves the action without an
/// edit.
pub async fn resolve_code_action(
    cache: &JavaDataModelCache,
    mut action: CodeAction,
) -> Result<CodeAction, CodeActionResolveError> {
    let data = action.data.take().ok_or(CodeActionResolveError::MissingData)?;
    let data: CodeActionResolveData = serde_json::from_value(data)?;
    match data.resolver_kind {
        CodeActionResolverKind::GenerateMissingMember => {
            action.edit = cache.generate_missing_member(&data.params).await;
            if action.edit.is_none() {
                debug!(
                    uri = %data.uri,
                    member = %data.params.missing_property,
                    "no edit generated for code action"
                );
            }
        }
    }
    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("nam", "name", true)]
    #[case("NAME", "name", true)]
    #[case("nmae", "name", false)]
    #[case("nme", "name", true)]
    #[case("a", "b", true)]
    #[case("price", "name", false)]
    #[case("nam", "nam", false)]
    fn test_is_similar(#[case] name: &str, #[case] candidate: &str, #[case] similar: bool) {
        assert_eq!(is_similar(name, candidate), similar);
    }

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("name", "name"), 0);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("nam"), "Nam");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_resolve_data_round_trips_through_json() {
        let data = CodeActionResolveData {
            uri: "file:///p/src/main/resources/templates/items.html".into(),
            resolver_kind: CodeActionResolverKind::GenerateMissingMember,
            params: GenerateMissingMemberParams {
                member_type: MemberType::Getter,
                missing_property: "nam".into(),
                java_type: "org.acme.Item".into(),
                project_uri: "p".into(),
                template_class: None,
            },
        };
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["resolverKind"], "GenerateMissingMember");
        assert_eq!(value["params"]["missingProperty"], "nam");
        let back: CodeActionResolveData = serde_json::from_value(value).unwrap();
        assert_eq!(back, data);
    }
}
