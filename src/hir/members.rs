//! Member lookup across a Java type hierarchy.
//!
//! The hierarchy is loaded once per request as a depth-first pre-order list
//! (the type itself, then each extended type and its ancestors in
//! declaration order). A visited set keyed by signature makes cyclic graphs
//! terminate and keeps a type reached through several paths at its first
//! position. Collections built over that list let the first declaration of
//! a name win.

use std::sync::Arc;

use futures::future::join_all;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::trace;

use super::cache::JavaDataModelCache;
use super::filter::{AccessRule, JavaTypeFilter};
use super::java::{
    JAVA_LANG_OBJECT, JavaFieldInfo, JavaMethodInfo, ResolvedJavaTypeInfo, is_type_variable,
    type_arguments,
};
use super::resolvers::MethodValueResolver;
use crate::base::{CancellationToken, Cancelled, check_cancelled};

/// Load `root` and its ancestors in depth-first pre-order.
///
/// Ancestors of a type whose superclasses the filter ignores are skipped.
pub async fn load_hierarchy(
    cache: &JavaDataModelCache,
    root: Arc<ResolvedJavaTypeInfo>,
    project_uri: &str,
    filter: &JavaTypeFilter,
    cancel: &CancellationToken,
) -> Result<Vec<Arc<ResolvedJavaTypeInfo>>, Cancelled> {
    let mut order = Vec::new();
    let mut visited = FxHashSet::default();
    let mut stack = vec![root];
    while let Some(ty) = stack.pop() {
        check_cancelled(cancel)?;
        if !visited.insert(ty.signature.clone()) {
            trace!(signature = %ty.signature, "type already visited");
            continue;
        }
        order.push(ty.clone());
        if filter.is_ignore_superclasses(&ty) || ty.extended_types.is_empty() {
            continue;
        }
        let ancestors = join_all(
            ty.extended_types
                .iter()
                .map(|signature| cache.resolve_java_type(signature, project_uri)),
        )
        .await;
        stack.extend(ancestors.into_iter().rev().flatten());
    }
    Ok(order)
}

/// A member reachable from a receiver type.
#[derive(Clone, Debug, PartialEq)]
pub enum MemberRef {
    Field {
        owner: Arc<ResolvedJavaTypeInfo>,
        field: JavaFieldInfo,
    },
    Method {
        owner: Arc<ResolvedJavaTypeInfo>,
        method: JavaMethodInfo,
    },
    Resolver(MethodValueResolver),
}

impl MemberRef {
    pub fn name(&self) -> &str {
        match self {
            MemberRef::Field { field, .. } => &field.name,
            MemberRef::Method { method, .. } => &method.name,
            MemberRef::Resolver(resolver) => resolver.name(),
        }
    }

    /// Declaring class (the extension class for resolvers).
    pub fn source_type(&self) -> &str {
        match self {
            MemberRef::Field { owner, .. } | MemberRef::Method { owner, .. } => &owner.signature,
            MemberRef::Resolver(resolver) => &resolver.source_type,
        }
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self, MemberRef::Resolver(_))
    }

    /// Type of the member when read from a receiver of type `receiver`.
    ///
    /// Type variables resolve against the receiver: the first type argument
    /// for declared members, the receiver itself for resolvers whose return
    /// type repeats the receiver parameter type.
    pub fn java_type(&self, receiver: &str) -> SmolStr {
        let declared = match self {
            MemberRef::Field { field, .. } => &field.type_signature,
            MemberRef::Method { method, .. } => &method.return_type,
            MemberRef::Resolver(resolver) => {
                let ret = &resolver.method.return_type;
                if resolver.receiver_type() == Some(ret.as_str()) {
                    return SmolStr::new(receiver);
                }
                ret
            }
        };
        if is_type_variable(declared) {
            let argument = type_arguments(receiver).first().copied().unwrap_or(JAVA_LANG_OBJECT);
            return SmolStr::new(argument);
        }
        declared.clone()
    }

    /// `name : String`, `getName() : String`.
    pub fn signature(&self) -> String {
        match self {
            MemberRef::Field { field, .. } => field.simple_signature(),
            MemberRef::Method { method, .. } => method.simple_signature(),
            MemberRef::Resolver(resolver) => {
                let skip = usize::from(resolver.namespace.is_none());
                resolver.method.simple_signature_skipping(skip)
            }
        }
    }
}

/// Whether a declared method can be called from a template.
pub fn is_valid_method(owner: &ResolvedJavaTypeInfo, method: &JavaMethodInfo) -> bool {
    !owner.invalid_methods.contains_key(&method.name)
}

/// Declared members visible through a hierarchy, deduplicated.
#[derive(Clone, Debug, Default)]
pub struct HierarchyMembers {
    /// First field per name.
    pub fields: Vec<(Arc<ResolvedJavaTypeInfo>, JavaFieldInfo)>,
    /// First method per full signature.
    pub methods: Vec<(Arc<ResolvedJavaTypeInfo>, JavaMethodInfo)>,
}

impl HierarchyMembers {
    pub fn collect(hierarchy: &[Arc<ResolvedJavaTypeInfo>], filter: &JavaTypeFilter) -> Self {
        let rule = root_rule(hierarchy, filter);
        let mut members = Self::default();
        let mut field_names = FxHashSet::default();
        let mut method_signatures = FxHashSet::default();
        for ty in hierarchy {
            for field in &ty.fields {
                if !rule.field_accessibility(field).is_allowed() {
                    continue;
                }
                if field_names.insert(field.name.clone()) {
                    members.fields.push((ty.clone(), field.clone()));
                }
            }
            for method in &ty.methods {
                if !is_valid_method(ty, method) || !rule.method_accessibility(method).is_allowed() {
                    continue;
                }
                if method_signatures.insert(method.signature()) {
                    members.methods.push((ty.clone(), method.clone()));
                }
            }
        }
        members
    }

    /// Property names: fields plus getter-derived names.
    pub fn property_names(&self) -> impl Iterator<Item = SmolStr> + '_ {
        self.fields.iter().map(|(_, f)| f.name.clone()).chain(
            self.methods
                .iter()
                .filter_map(|(_, m)| m.getter_name()),
        )
    }
}

/// Access rule of the receiver, the first type of `hierarchy`.
fn root_rule(hierarchy: &[Arc<ResolvedJavaTypeInfo>], filter: &JavaTypeFilter) -> AccessRule {
    hierarchy
        .first()
        .map_or_else(AccessRule::unrestricted, |root| filter.access_rule(root))
}

/// Property lookup: field, then no-arg method or getter, then resolvers.
pub fn find_property(
    hierarchy: &[Arc<ResolvedJavaTypeInfo>],
    resolvers: &[MethodValueResolver],
    name: &str,
    filter: &JavaTypeFilter,
) -> Option<MemberRef> {
    let rule = root_rule(hierarchy, filter);
    for ty in hierarchy {
        let field = ty
            .fields
            .iter()
            .find(|f| f.name == name && rule.field_accessibility(f).is_allowed());
        if let Some(field) = field {
            return Some(MemberRef::Field {
                owner: ty.clone(),
                field: field.clone(),
            });
        }
        let method = ty.methods.iter().find(|m| {
            !m.has_parameters()
                && (m.name == name || m.getter_name().is_some_and(|getter| getter == name))
                && is_valid_method(ty, m)
                && rule.method_accessibility(m).is_allowed()
        });
        if let Some(method) = method {
            return Some(MemberRef::Method {
                owner: ty.clone(),
                method: method.clone(),
            });
        }
    }
    resolvers
        .iter()
        .find(|r| {
            r.user_parameters().is_empty()
                && (r.name() == name || r.getter_name().is_some_and(|getter| getter == name))
        })
        .cloned()
        .map(MemberRef::Resolver)
}

/// Method lookup by exact name. The first declaration wins, so overloads
/// are not told apart.
pub fn find_method(
    hierarchy: &[Arc<ResolvedJavaTypeInfo>],
    resolvers: &[MethodValueResolver],
    name: &str,
    filter: &JavaTypeFilter,
) -> Option<MemberRef> {
    let rule = root_rule(hierarchy, filter);
    for ty in hierarchy {
        let method = ty
            .methods
            .iter()
            .find(|m| m.name == name && is_valid_method(ty, m) && rule.method_accessibility(m).is_allowed());
        if let Some(method) = method {
            return Some(MemberRef::Method {
                owner: ty.clone(),
                method: method.clone(),
            });
        }
    }
    resolvers
        .iter()
        .find(|r| r.name() == name)
        .cloned()
        .map(MemberRef::Resolver)
}

/// Resolvers applicable to any type of the hierarchy, deduplicated.
pub async fn hierarchy_resolvers(
    cache: &JavaDataModelCache,
    hierarchy: &[Arc<ResolvedJavaTypeInfo>],
    project_uri: &str,
    cancel: &CancellationToken,
) -> Result<Vec<MethodValueResolver>, Cancelled> {
    let mut resolvers: Vec<MethodValueResolver> = Vec::new();
    for ty in hierarchy {
        check_cancelled(cancel)?;
        for resolver in cache.resolvers_for(&ty.signature, project_uri).await {
            if !resolvers.contains(&resolver) {
                resolvers.push(resolver);
            }
        }
    }
    Ok(resolvers)
}
