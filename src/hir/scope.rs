//! Name binding and type inference over a template.
//!
//! ## Design
//!
//! [`TypeResolver`] bundles what every request needs to type an expression:
//! the cache, the template, its project, the visibility filter and the
//! cancellation token. Lookups recurse through receiver chains, loop
//! iterables and section parameters, so the recursive entry points return
//! boxed futures.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use smol_str::SmolStr;
use tracing::trace;

use super::cache::JavaDataModelCache;
use super::filter::{JavaTypeFilter, NativeModeSettings};
use super::java::ResolvedJavaTypeInfo;
use super::members::{MemberRef, find_method, find_property, hierarchy_resolvers, load_hierarchy};
use super::resolvers::{DataModelParameter, ExtendedDataModelTemplate, ValueResolver};
use crate::base::{CancellationToken, Cancelled, TextSize, check_cancelled};
use crate::syntax::{NodeId, NodeKind, PartKind, SectionKind, SectionMetadata, Template};

/// Implicit variables of a user tag template.
pub const USER_TAG_SPECIALS: &[(&str, &str)] = &[
    ("it", "Object passed as the first unnamed parameter of the tag."),
    ("nested-content", "Content nested in the tag invocation."),
];

/// What a root-level name refers to.
#[derive(Clone, Debug, PartialEq)]
pub enum Binding {
    /// `item` of `{#for item in items}`, `it` of `{#each}`.
    LoopAlias {
        section: NodeId,
        parameter: Option<NodeId>,
    },
    LoopMetadata {
        section: NodeId,
        metadata: &'static SectionMetadata,
    },
    /// `let`/`set` parameter or optional `if` parameter.
    SectionParameter { section: NodeId, parameter: NodeId },
    /// Member of a `with`/`when`/`switch` subject.
    SubjectMember {
        section: NodeId,
        subject_type: SmolStr,
        member: MemberRef,
    },
    ParameterDeclaration(NodeId),
    CheckedTemplate(DataModelParameter),
    GlobalVariable(ValueResolver),
    UserTagSpecial(&'static str),
}

pub struct TypeResolver<'a> {
    cache: &'a JavaDataModelCache,
    template: &'a Template,
    project_uri: &'a str,
    filter: JavaTypeFilter,
    data_model_template: Option<ExtendedDataModelTemplate>,
    cancel: &'a CancellationToken,
}

impl<'a> TypeResolver<'a> {
    pub async fn new(
        cache: &'a JavaDataModelCache,
        template: &'a Template,
        settings: &NativeModeSettings,
        cancel: &'a CancellationToken,
    ) -> TypeResolver<'a> {
        let project_uri = template.project_uri().unwrap_or_default();
        let filter = cache.java_type_filter(template, settings).await;
        let data_model_template = cache.data_model_template(template).await;
        Self {
            cache,
            template,
            project_uri,
            filter,
            data_model_template,
            cancel,
        }
    }

    pub fn cache(&self) -> &'a JavaDataModelCache {
        self.cache
    }

    pub fn template(&self) -> &'a Template {
        self.template
    }

    pub fn project_uri(&self) -> &'a str {
        self.project_uri
    }

    pub fn filter(&self) -> &JavaTypeFilter {
        &self.filter
    }

    pub fn cancel(&self) -> &'a CancellationToken {
        self.cancel
    }

    pub fn data_model_template(&self) -> Option<&ExtendedDataModelTemplate> {
        self.data_model_template.as_ref()
    }

    pub async fn resolve_java_type(&self, signature: &str) -> Option<Arc<ResolvedJavaTypeInfo>> {
        self.cache.resolve_java_type(signature, self.project_uri).await
    }

    /// `ty` and its ancestors, depth-first.
    pub async fn hierarchy(
        &self,
        ty: Arc<ResolvedJavaTypeInfo>,
    ) -> Result<Vec<Arc<ResolvedJavaTypeInfo>>, Cancelled> {
        load_hierarchy(self.cache, ty, self.project_uri, &self.filter, self.cancel).await
    }

    pub async fn find_member(
        &self,
        ty: Arc<ResolvedJavaTypeInfo>,
        name: &str,
        method: bool,
    ) -> Result<Option<MemberRef>, Cancelled> {
        let hierarchy = self.hierarchy(ty).await?;
        let resolvers =
            hierarchy_resolvers(self.cache, &hierarchy, self.project_uri, self.cancel).await?;
        Ok(if method {
            find_method(&hierarchy, &resolvers, name, &self.filter)
        } else {
            find_property(&hierarchy, &resolvers, name, &self.filter)
        })
    }

    // ========================================================================
    // BINDINGS
    // ========================================================================

    /// Bind a root-level name as seen from `node`.
    ///
    /// Enclosing sections are searched innermost first, so nested
    /// declarations shadow outer ones. Neither the loop alias nor loop
    /// metadata is visible in the `{#else}` block of its loop.
    pub async fn resolve_binding(&self, name: &str, node: NodeId) -> Result<Option<Binding>, Cancelled> {
        check_cancelled(self.cancel)?;
        let template = self.template;
        let offset = template.node(node).range.start();
        for section_id in template.scope_sections(node) {
            if let Some(binding) = self.section_binding(name, section_id, offset).await? {
                trace!(name, ?section_id, "bound by section");
                return Ok(Some(binding));
            }
        }

        let declared = template
            .parameter_declarations()
            .find(|(_, decl)| decl.alias.as_deref() == Some(name));
        if let Some((id, _)) = declared {
            return Ok(Some(Binding::ParameterDeclaration(id)));
        }

        if let Some(parameter) = self
            .data_model_template
            .as_ref()
            .and_then(|t| t.template.parameter(name))
        {
            return Ok(Some(Binding::CheckedTemplate(parameter.clone())));
        }

        let global = self
            .cache
            .global_variables(self.project_uri)
            .await
            .into_iter()
            .find(|g| g.name() == name);
        if let Some(global) = global {
            return Ok(Some(Binding::GlobalVariable(global)));
        }

        if template.is_user_tag() {
            if let Some(&(special, _)) = USER_TAG_SPECIALS.iter().find(|(n, _)| *n == name) {
                return Ok(Some(Binding::UserTagSpecial(special)));
            }
        }
        Ok(None)
    }

    async fn section_binding(
        &self,
        name: &str,
        section_id: NodeId,
        offset: TextSize,
    ) -> Result<Option<Binding>, Cancelled> {
        let template = self.template;
        let Some(section) = template.section(section_id) else {
            return Ok(None);
        };
        let parameter_named = |optional: bool| {
            section.parameters.iter().copied().find(|&p| {
                template.parameter(p).is_some_and(|param| {
                    param.name == name && if optional { param.optional } else { param.has_value() }
                })
            })
        };
        let binding = match section.kind {
            SectionKind::For | SectionKind::Each => {
                if section.is_in_else_block(offset) {
                    return Ok(None);
                }
                if let Some((alias, parameter)) = template.loop_alias(section_id) {
                    if alias == name {
                        return Ok(Some(Binding::LoopAlias {
                            section: section_id,
                            parameter,
                        }));
                    }
                }
                section
                    .metadata()
                    .iter()
                    .find(|m| m.name == name)
                    .map(|metadata| Binding::LoopMetadata {
                        section: section_id,
                        metadata,
                    })
            }
            SectionKind::Let | SectionKind::Set | SectionKind::If => {
                parameter_named(section.kind == SectionKind::If).map(|parameter| {
                    Binding::SectionParameter {
                        section: section_id,
                        parameter,
                    }
                })
            }
            SectionKind::With | SectionKind::When | SectionKind::Switch => {
                let Some(subject) = template.subject_expression(section_id) else {
                    return Ok(None);
                };
                let Some(subject_type) = self.expression_signature(subject).await? else {
                    return Ok(None);
                };
                let Some(ty) = self.resolve_java_type(&subject_type).await else {
                    return Ok(None);
                };
                self.find_member(ty, name, false)
                    .await?
                    .map(|member| Binding::SubjectMember {
                        section: section_id,
                        subject_type,
                        member,
                    })
            }
            SectionKind::Case | SectionKind::Custom => None,
        };
        Ok(binding)
    }

    /// Java type of a binding.
    pub async fn binding_signature(&self, binding: &Binding) -> Result<Option<SmolStr>, Cancelled> {
        let template = self.template;
        Ok(match binding {
            Binding::LoopAlias { section, .. } => {
                let Some(iterable) = template.loop_iterable(*section) else {
                    return Ok(None);
                };
                match self.expression_signature(iterable).await? {
                    Some(signature) => self.element_type(&signature).await,
                    None => None,
                }
            }
            Binding::LoopMetadata { metadata, .. } => Some(SmolStr::new_static(metadata.java_type)),
            Binding::SectionParameter { parameter, .. } => {
                match template.parameter(*parameter).and_then(|p| p.expression) {
                    Some(expression) => self.expression_signature(expression).await?,
                    None => None,
                }
            }
            Binding::SubjectMember {
                subject_type,
                member,
                ..
            } => Some(member.java_type(subject_type)),
            Binding::ParameterDeclaration(id) => match &template.node(*id).kind {
                NodeKind::ParameterDeclaration(decl) => Some(decl.java_type.clone()),
                _ => None,
            },
            Binding::CheckedTemplate(parameter) => Some(parameter.source_type.clone()),
            Binding::GlobalVariable(global) => Some(SmolStr::new(global.java_type())),
            Binding::UserTagSpecial(_) => Some(SmolStr::new_static(super::java::JAVA_LANG_OBJECT)),
        })
    }

    /// Element type produced by iterating values of type `signature`.
    pub async fn element_type(&self, signature: &str) -> Option<SmolStr> {
        if let Some(element) = signature.strip_suffix("[]") {
            return Some(SmolStr::new(element.trim()));
        }
        if matches!(signature, "int" | "java.lang.Integer" | "long" | "java.lang.Long") {
            return Some(SmolStr::new_static("java.lang.Integer"));
        }
        self.resolve_java_type(signature).await?.iterable_of.clone()
    }

    // ========================================================================
    // TYPE INFERENCE
    // ========================================================================

    /// Java type of an expression: the type of its last part.
    pub fn expression_signature(&self, expression: NodeId) -> BoxFuture<'_, Result<Option<SmolStr>, Cancelled>> {
        async move {
            check_cancelled(self.cancel)?;
            let template = self.template;
            let last = template
                .expression(expression)
                .and_then(|e| e.parts.last())
                .and_then(|&parts| template.parts(parts))
                .and_then(|parts| parts.parts.last().copied());
            match last {
                Some(part) => self.part_signature(part).await,
                None => Ok(None),
            }
        }
        .boxed()
    }

    /// Java type of an expression part, walking the receiver chain.
    pub fn part_signature(&self, part_id: NodeId) -> BoxFuture<'_, Result<Option<SmolStr>, Cancelled>> {
        async move {
            check_cancelled(self.cancel)?;
            let template = self.template;
            let Some(part) = template.part(part_id) else {
                return Ok(None);
            };
            if let PartKind::Object { literal } = part.kind {
                if let Some(literal) = literal {
                    return Ok(Some(SmolStr::new_static(literal)));
                }
                let namespace = template.parts_of(part_id).and_then(|(_, p)| p.namespace.clone());
                if let Some(namespace) = namespace {
                    let resolver = self
                        .cache
                        .namespace_resolvers(&namespace, self.project_uri)
                        .await
                        .into_iter()
                        .find(|r| r.matches(&part.name));
                    return Ok(resolver.map(|r| SmolStr::new(r.java_type())));
                }
                return match self.resolve_binding(&part.name, part_id).await? {
                    Some(binding) => self.binding_signature(&binding).await,
                    None => Ok(None),
                };
            }

            Ok(self.resolve_member(part_id).await?.map(|(receiver, member)| member.java_type(&receiver)))
        }
        .boxed()
    }

    /// Member selected by a property or method part, with the receiver type
    /// signature it was resolved against.
    pub async fn resolve_member(&self, part_id: NodeId) -> Result<Option<(SmolStr, MemberRef)>, Cancelled> {
        let Some(receiver) = self.receiver_type(part_id).await? else {
            return Ok(None);
        };
        let Some(part) = self.template.part(part_id) else {
            return Ok(None);
        };
        let is_method = matches!(part.kind, PartKind::Method(_));
        let signature = receiver.signature.clone();
        Ok(self
            .find_member(receiver, &part.name, is_method)
            .await?
            .map(|member| (signature, member)))
    }

    /// Resolved type of the part before `part_id`.
    pub async fn receiver_type(&self, part_id: NodeId) -> Result<Option<Arc<ResolvedJavaTypeInfo>>, Cancelled> {
        let Some(previous) = self.template.previous_part(part_id) else {
            return Ok(None);
        };
        self.part_type(previous).await
    }

    pub async fn part_type(&self, part_id: NodeId) -> Result<Option<Arc<ResolvedJavaTypeInfo>>, Cancelled> {
        match self.part_signature(part_id).await? {
            Some(signature) => Ok(self.resolve_java_type(&signature).await),
            None => Ok(None),
        }
    }
}
