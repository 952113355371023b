//! HIR — the Java side of a template.
//!
//! This module connects parsed templates to the host project's Java data
//! model:
//! - [`JavaTypeProvider`] - the external introspection capability
//! - [`JavaDataModelCache`] - per-project memoized lookups
//! - [`JavaTypeFilter`] - native mode visibility policy
//! - [`TypeResolver`] - scope bindings and expression type inference
//! - [`check_template`] - template validation
//!
//! ## Design
//!
//! Lookups that may reach the provider are async and return `Option`:
//! `None` means "unknown type", never "retry". Cancellation is the only
//! error that crosses this module's boundary.

mod cache;
mod diagnostics;
mod filter;
mod java;
mod members;
mod provider;
mod resolvers;
mod scope;

pub use cache::{JavaDataModelCache, JavaTypeFuture, TypeLookup};
pub use diagnostics::{
    Diagnostic, DiagnosticCollector, Severity, UnknownPropertyData, check_template, codes,
};
pub use filter::{
    AccessRule, JavaTypeAccessibility, JavaTypeFilter, MemberAccessibility, NativeModeSettings,
    RestrictedAccess,
};
pub use java::{
    InvalidMethodReason, JAVA_LANG_OBJECT, JavaFieldInfo, JavaMethodInfo, JavaParameterInfo,
    JavaTypeKind, RegisterForReflectionAnnotation, ResolvedJavaTypeInfo, TemplateDataAnnotation,
    is_type_variable, raw_type, simple_type_name, type_arguments,
};
pub use members::{
    HierarchyMembers, MemberRef, find_method, find_property, hierarchy_resolvers, is_valid_method,
    load_hierarchy,
};
pub use provider::{
    DocumentationFormat, GenerateMissingMemberParams, JavaTypeProvider, JavadocParams, MemberType,
    ProviderError,
};
pub use resolvers::{
    DataModelParameter, DataModelProject, DataModelTemplate, ExtendedDataModelTemplate,
    FieldValueResolver, MATCH_ANY, MethodValueResolver, ProjectDataModel, ValueResolver,
    ValueResolverKind, builtin_resolvers,
};
pub use scope::{Binding, TypeResolver, USER_TAG_SPECIALS};
