//! Go-to-definition implementation.

use smol_str::SmolStr;

use crate::base::{Cancelled, LineColRange, TextRange, TextSize};
use crate::hir::{Binding, MemberRef, TypeResolver, ValueResolver, raw_type};
use crate::syntax::{ExpressionCursor, NodeId, NodeKind, PartKind, Template};

/// Result of a go-to-definition request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GotoResult {
    /// The targets to jump to.
    pub targets: Vec<GotoTarget>,
}

impl GotoResult {
    /// Create an empty result (no targets found).
    pub fn empty() -> Self {
        Self {
            targets: Vec::new(),
        }
    }

    /// Create a result with a single target.
    pub fn single(target: GotoTarget) -> Self {
        Self {
            targets: vec![target],
        }
    }

    /// Create a result with multiple targets.
    pub fn multiple(targets: Vec<GotoTarget>) -> Self {
        Self { targets }
    }

    /// Check if any targets were found.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// A target location for go-to-definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GotoTarget {
    /// A declaration in a template.
    Template {
        uri: SmolStr,
        range: LineColRange,
    },
    /// A Java type or member, located by the client through the Java
    /// type provider.
    JavaElement {
        /// Declaring class.
        source_type: SmolStr,
        /// Field or method name, `None` for the type itself.
        member: Option<SmolStr>,
        project_uri: SmolStr,
    },
}

/// Find the definition of the name at `offset`.
pub async fn goto_definition(resolver: &TypeResolver<'_>, offset: TextSize) -> Result<GotoResult, Cancelled> {
    let template = resolver.template();
    if let Some(java_type) = declared_type_at(template, offset) {
        return Ok(GotoResult::single(java_element(resolver, raw_type(&java_type), None)));
    }

    let Some(ExpressionCursor::Part(part_id)) = template.expression_cursor_at(offset) else {
        return Ok(GotoResult::empty());
    };
    let Some(part) = template.part(part_id) else {
        return Ok(GotoResult::empty());
    };
    let target = match &part.kind {
        PartKind::Object { literal: Some(_) } => None,
        PartKind::Object { literal: None } => object_target(resolver, part_id, &part.name).await?,
        PartKind::Method(call) if call.operator => None,
        PartKind::Property | PartKind::Method(_) => resolver
            .resolve_member(part_id)
            .await?
            .map(|(_, member)| member_target(resolver, &member)),
    };
    Ok(target.map(GotoResult::single).unwrap_or_else(GotoResult::empty))
}

/// Java type of the parameter declaration under `offset`.
fn declared_type_at(template: &Template, offset: TextSize) -> Option<SmolStr> {
    let contains = |range: TextRange| range.start() <= offset && offset <= range.end();
    template
        .parameter_declarations()
        .find(|(_, decl)| contains(decl.java_type_range) || decl.alias_range.is_some_and(contains))
        .map(|(_, decl)| decl.java_type.clone())
}

async fn object_target(
    resolver: &TypeResolver<'_>,
    part_id: NodeId,
    name: &str,
) -> Result<Option<GotoTarget>, Cancelled> {
    let template = resolver.template();
    let namespace = template.parts_of(part_id).and_then(|(_, p)| p.namespace.clone());
    if let Some(namespace) = namespace {
        let found = resolver
            .cache()
            .namespace_resolvers(&namespace, resolver.project_uri())
            .await
            .into_iter()
            .find(|r| r.matches(name));
        return Ok(found.map(|r| value_resolver_target(resolver, &r)));
    }

    let Some(binding) = resolver.resolve_binding(name, part_id).await? else {
        return Ok(None);
    };
    let target = match binding {
        Binding::LoopAlias {
            parameter: Some(parameter),
            ..
        }
        | Binding::SectionParameter { parameter, .. } => template
            .parameter(parameter)
            .map(|p| template_target(template, p.name_range)),
        Binding::LoopAlias { section, .. } | Binding::LoopMetadata { section, .. } => template
            .section(section)
            .map(|s| template_target(template, s.tag_range)),
        Binding::SubjectMember { member, .. } => Some(member_target(resolver, &member)),
        Binding::ParameterDeclaration(id) => match &template.node(id).kind {
            NodeKind::ParameterDeclaration(decl) => {
                Some(template_target(template, decl.alias_range.unwrap_or(decl.java_type_range)))
            }
            _ => None,
        },
        Binding::CheckedTemplate(parameter) => {
            let source = resolver.data_model_template().map(|t| &t.template);
            Some(match source {
                Some(checked) => java_element(resolver, &checked.source_type, checked.source_method.clone()),
                None => java_element(resolver, raw_type(&parameter.source_type), None),
            })
        }
        Binding::GlobalVariable(global) => Some(value_resolver_target(resolver, &global)),
        Binding::UserTagSpecial(_) => None,
    };
    Ok(target)
}

fn member_target(resolver: &TypeResolver<'_>, member: &MemberRef) -> GotoTarget {
    let java_name = match member {
        MemberRef::Field { field, .. } => field.name.clone(),
        MemberRef::Method { method, .. } => method.name.clone(),
        MemberRef::Resolver(value_resolver) => value_resolver.method.name.clone(),
    };
    java_element(resolver, member.source_type(), Some(java_name))
}

fn value_resolver_target(resolver: &TypeResolver<'_>, value_resolver: &ValueResolver) -> GotoTarget {
    let java_name = match value_resolver {
        ValueResolver::Field(field) => field.name.clone(),
        ValueResolver::Method(method) => method.method.name.clone(),
    };
    java_element(resolver, value_resolver.source_type(), Some(java_name))
}

fn java_element(resolver: &TypeResolver<'_>, source_type: &str, member: Option<SmolStr>) -> GotoTarget {
    GotoTarget::JavaElement {
        source_type: SmolStr::new(source_type),
        member,
        project_uri: SmolStr::new(resolver.project_uri()),
    }
}

fn template_target(template: &Template, range: TextRange) -> GotoTarget {
    GotoTarget::Template {
        uri: SmolStr::new(template.uri()),
        range: template.line_col_range(range),
    }
}
