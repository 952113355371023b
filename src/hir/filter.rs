//! Member visibility policy.
//!
//! In native (reflection-free) mode only types the build knows about can be
//! reached from a template: types used by checked-template parameters, and
//! types annotated `@TemplateData` or `@RegisterForReflection`. Outside
//! native mode everything is visible.

use std::sync::Arc;

use regex::Regex;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tracing::trace;

use super::java::{
    JavaFieldInfo, JavaMethodInfo, RegisterForReflectionAnnotation, ResolvedJavaTypeInfo, raw_type,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeModeSettings {
    pub enabled: bool,
}

/// Rule that grants access to a type in native mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RestrictedAccess {
    TemplateData,
    RegisterForReflection,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JavaTypeAccessibility {
    AllowedWithoutRestriction,
    Restricted(RestrictedAccess),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberAccessibility {
    Allowed,
    /// Excluded by `@TemplateData(ignore = ...)`.
    Ignored,
    /// Not registered for reflection.
    IgnoredByReflection,
}

impl MemberAccessibility {
    pub fn is_allowed(self) -> bool {
        self == MemberAccessibility::Allowed
    }
}

/// Visibility policy for one template.
#[derive(Clone, Debug, Default)]
pub struct JavaTypeFilter {
    native: bool,
    native_types: Arc<FxHashSet<SmolStr>>,
}

impl JavaTypeFilter {
    /// Filter that allows everything.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn native(native_types: Arc<FxHashSet<SmolStr>>) -> Self {
        Self {
            native: true,
            native_types,
        }
    }

    pub fn is_native(&self) -> bool {
        self.native
    }

    /// `None` when the type is not registered for native mode.
    pub fn accessibility(&self, ty: &ResolvedJavaTypeInfo) -> Option<JavaTypeAccessibility> {
        if !self.native || self.native_types.contains(raw_type(&ty.signature)) {
            return Some(JavaTypeAccessibility::AllowedWithoutRestriction);
        }
        if !ty.template_data.is_empty() {
            return Some(JavaTypeAccessibility::Restricted(RestrictedAccess::TemplateData));
        }
        if ty.register_for_reflection.is_some() {
            return Some(JavaTypeAccessibility::Restricted(
                RestrictedAccess::RegisterForReflection,
            ));
        }
        trace!(signature = %ty.signature, "type not registered for native mode");
        None
    }

    /// Rule for the members reachable from a receiver of type `root`.
    ///
    /// The rule is decided by the receiver alone and applies unchanged to
    /// members inherited from its ancestors.
    pub fn access_rule(&self, root: &ResolvedJavaTypeInfo) -> AccessRule {
        let accessibility = self.accessibility(root);
        let mut rule = AccessRule {
            accessibility,
            ignore: Vec::new(),
            reflection: None,
        };
        if let Some(JavaTypeAccessibility::Restricted(access)) = accessibility {
            rule.ignore = root
                .template_data
                .iter()
                .flat_map(|annotation| annotation.ignore.iter())
                .map(IgnorePattern::compile)
                .collect();
            if access == RestrictedAccess::RegisterForReflection {
                rule.reflection = root.register_for_reflection.clone();
            }
        }
        rule
    }

    /// Whether ancestors of `ty` must not be walked.
    pub fn is_ignore_superclasses(&self, ty: &ResolvedJavaTypeInfo) -> bool {
        self.native && ty.template_data.iter().any(|annotation| annotation.ignore_superclasses)
    }
}

/// Member visibility decided once per receiver type.
#[derive(Clone, Debug)]
pub struct AccessRule {
    accessibility: Option<JavaTypeAccessibility>,
    ignore: Vec<IgnorePattern>,
    reflection: Option<RegisterForReflectionAnnotation>,
}

impl AccessRule {
    pub fn unrestricted() -> Self {
        Self {
            accessibility: Some(JavaTypeAccessibility::AllowedWithoutRestriction),
            ignore: Vec::new(),
            reflection: None,
        }
    }

    pub fn accessibility(&self) -> Option<JavaTypeAccessibility> {
        self.accessibility
    }

    pub fn field_accessibility(&self, field: &JavaFieldInfo) -> MemberAccessibility {
        self.member_accessibility(&field.name, |r| r.fields)
    }

    pub fn method_accessibility(&self, method: &JavaMethodInfo) -> MemberAccessibility {
        self.member_accessibility(&method.name, |r| r.methods)
    }

    fn member_accessibility(
        &self,
        name: &str,
        registered: impl Fn(&RegisterForReflectionAnnotation) -> bool,
    ) -> MemberAccessibility {
        match self.accessibility {
            None => MemberAccessibility::IgnoredByReflection,
            Some(JavaTypeAccessibility::AllowedWithoutRestriction) => MemberAccessibility::Allowed,
            Some(JavaTypeAccessibility::Restricted(_)) => {
                if self.ignore.iter().any(|pattern| pattern.matches(name)) {
                    return MemberAccessibility::Ignored;
                }
                match &self.reflection {
                    Some(annotation) if !registered(annotation) => {
                        MemberAccessibility::IgnoredByReflection
                    }
                    _ => MemberAccessibility::Allowed,
                }
            }
        }
    }
}

/// `@TemplateData(ignore)` entry: a regular expression matched against the
/// whole member name, or the literal name when it does not compile.
#[derive(Clone, Debug)]
enum IgnorePattern {
    Regex(Regex),
    Literal(SmolStr),
}

impl IgnorePattern {
    fn compile(pattern: &SmolStr) -> Self {
        match Regex::new(&format!("^(?:{pattern})$")) {
            Ok(regex) => IgnorePattern::Regex(regex),
            Err(err) => {
                trace!(%pattern, %err, "ignore pattern is not a regular expression");
                IgnorePattern::Literal(pattern.clone())
            }
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            IgnorePattern::Regex(regex) => regex.is_match(name),
            IgnorePattern::Literal(literal) => literal == name,
        }
    }
}
