//! Java data model: the resolved shape of host types.
//!
//! These values come from the Java type provider and are immutable once
//! built; the cache shares them behind `Arc`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

pub const JAVA_LANG_OBJECT: &str = "java.lang.Object";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JavaTypeKind {
    #[default]
    Class,
    Interface,
    Enum,
}

/// Why a declared method cannot be used from a template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvalidMethodReason {
    /// Declared by `java.lang.Object`.
    FromObject,
    VoidReturn,
    Static,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaFieldInfo {
    pub name: SmolStr,
    pub type_signature: SmolStr,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaParameterInfo {
    pub name: SmolStr,
    pub type_signature: SmolStr,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaMethodInfo {
    pub name: SmolStr,
    #[serde(default)]
    pub parameters: Vec<JavaParameterInfo>,
    pub return_type: SmolStr,
}

impl JavaFieldInfo {
    pub fn new(name: impl Into<SmolStr>, type_signature: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            type_signature: type_signature.into(),
        }
    }

    /// `name : String`
    pub fn simple_signature(&self) -> String {
        format!("{} : {}", self.name, simple_type_name(&self.type_signature))
    }
}

impl JavaParameterInfo {
    pub fn new(name: impl Into<SmolStr>, type_signature: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            type_signature: type_signature.into(),
        }
    }
}

impl JavaMethodInfo {
    pub fn new(name: impl Into<SmolStr>, return_type: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: return_type.into(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<SmolStr>, ty: impl Into<SmolStr>) -> Self {
        self.parameters.push(JavaParameterInfo::new(name, ty));
        self
    }

    pub fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }

    /// Property name of a getter: `getName()` gives `name`, `isActive()`
    /// gives `active`. Methods with parameters are never getters.
    pub fn getter_name(&self) -> Option<SmolStr> {
        if self.has_parameters() {
            return None;
        }
        let rest = self
            .name
            .strip_prefix("get")
            .or_else(|| self.name.strip_prefix("is"))?;
        let mut chars = rest.chars();
        let first = chars.next()?;
        if !first.is_uppercase() {
            return None;
        }
        let mut property = String::with_capacity(rest.len());
        property.extend(first.to_lowercase());
        property.push_str(chars.as_str());
        Some(SmolStr::new(property))
    }

    /// Full signature used to deduplicate overrides:
    /// `getName(java.lang.String prefix) : java.lang.String`.
    pub fn signature(&self) -> String {
        self.render(self.parameters.iter(), str::to_string)
    }

    /// Label signature with simple type names: `getName(String prefix) : String`.
    pub fn simple_signature(&self) -> String {
        self.render(self.parameters.iter(), simple_type_name)
    }

    /// Simple signature without the first `skip` parameters.
    pub fn simple_signature_skipping(&self, skip: usize) -> String {
        self.render(self.parameters.iter().skip(skip), simple_type_name)
    }

    fn render<'a>(
        &self,
        params: impl Iterator<Item = &'a JavaParameterInfo>,
        ty: impl Fn(&str) -> String,
    ) -> String {
        let params: Vec<String> = params
            .map(|p| format!("{} {}", ty(&p.type_signature), p.name))
            .collect();
        format!("{}({}) : {}", self.name, params.join(", "), ty(&self.return_type))
    }
}

/// `@TemplateData` declared on (or targeting) a type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TemplateDataAnnotation {
    /// Regular expressions of member names to ignore.
    pub ignore: Vec<SmolStr>,
    pub ignore_superclasses: bool,
    pub properties: bool,
}

/// `@RegisterForReflection` declared on a type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterForReflectionAnnotation {
    pub fields: bool,
    pub methods: bool,
}

impl Default for RegisterForReflectionAnnotation {
    fn default() -> Self {
        Self {
            fields: true,
            methods: true,
        }
    }
}

/// The resolved shape of a Java type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolvedJavaTypeInfo {
    pub signature: SmolStr,
    /// Compiled type (no source to edit).
    pub binary: bool,
    pub kind: JavaTypeKind,
    pub fields: Vec<JavaFieldInfo>,
    pub methods: Vec<JavaMethodInfo>,
    pub invalid_methods: FxHashMap<SmolStr, InvalidMethodReason>,
    /// Superclass and interfaces.
    pub extended_types: Vec<SmolStr>,
    /// Element type when the type is iterable.
    pub iterable_of: Option<SmolStr>,
    pub template_data: Vec<TemplateDataAnnotation>,
    pub register_for_reflection: Option<RegisterForReflectionAnnotation>,
}

impl ResolvedJavaTypeInfo {
    pub fn new(signature: impl Into<SmolStr>) -> Self {
        Self {
            signature: signature.into(),
            ..Self::default()
        }
    }

    pub fn with_field(mut self, name: &str, ty: &str) -> Self {
        self.fields.push(JavaFieldInfo::new(name, ty));
        self
    }

    pub fn with_method(mut self, method: JavaMethodInfo) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_invalid_method(mut self, name: &str, reason: InvalidMethodReason) -> Self {
        self.invalid_methods.insert(SmolStr::new(name), reason);
        self
    }

    pub fn with_extended_type(mut self, signature: &str) -> Self {
        self.extended_types.push(SmolStr::new(signature));
        self
    }

    pub fn with_kind(mut self, kind: JavaTypeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_iterable_of(mut self, element: &str) -> Self {
        self.iterable_of = Some(SmolStr::new(element));
        self
    }

    pub fn with_template_data(mut self, annotation: TemplateDataAnnotation) -> Self {
        self.template_data.push(annotation);
        self
    }

    pub fn with_register_for_reflection(mut self, annotation: RegisterForReflectionAnnotation) -> Self {
        self.register_for_reflection = Some(annotation);
        self
    }

    pub fn binary(mut self) -> Self {
        self.binary = true;
        self
    }

    pub fn is_enum(&self) -> bool {
        self.kind == JavaTypeKind::Enum
    }

    pub fn is_iterable(&self) -> bool {
        self.iterable_of.is_some()
    }

    pub fn simple_name(&self) -> String {
        simple_type_name(&self.signature)
    }

    pub fn field(&self, name: &str) -> Option<&JavaFieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// First method with this exact name. Ambiguous on overloads.
    pub fn find_method(&self, name: &str) -> Option<&JavaMethodInfo> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Element type of an array signature: `org.acme.Item[]`.
    pub fn array(signature: &str, element: &str) -> Self {
        Self {
            signature: SmolStr::new(signature),
            binary: true,
            iterable_of: Some(SmolStr::new(element)),
            ..Self::default()
        }
    }

    /// Specialize a raw generic type with the arguments of `signature`
    /// (`java.util.List<org.acme.Item>`).
    pub fn parameterized(&self, signature: &str) -> Self {
        let mut ty = self.clone();
        ty.signature = SmolStr::new(signature);
        if ty.iterable_of.is_some() {
            ty.iterable_of = type_arguments(signature).first().map(|arg| SmolStr::new(*arg));
        }
        ty
    }
}

// ============================================================================
// SIGNATURE HELPERS
// ============================================================================

/// `java.util.List<org.acme.Item>` gives `java.util.List`.
pub fn raw_type(signature: &str) -> &str {
    let signature = signature.trim();
    match signature.find('<') {
        Some(i) => &signature[..i],
        None => signature,
    }
}

/// Top-level type arguments: `java.util.Map<K, java.util.List<V>>` gives
/// `["K", "java.util.List<V>"]`.
pub fn type_arguments(signature: &str) -> Vec<&str> {
    let (Some(open), Some(close)) = (signature.find('<'), signature.rfind('>')) else {
        return Vec::new();
    };
    if close <= open {
        return Vec::new();
    }
    let inner = &signature[open + 1..close];
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                args.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    args.push(inner[start..].trim());
    args
}

/// Drop package qualifiers everywhere in a signature:
/// `java.util.List<org.acme.Item>` gives `List<Item>`.
pub fn simple_type_name(signature: &str) -> String {
    let mut out = String::with_capacity(signature.len());
    let mut segment_start = 0;
    let flush = |out: &mut String, segment: &str| {
        out.push_str(segment.rsplit('.').next().unwrap_or(segment));
    };
    for (i, c) in signature.char_indices() {
        if matches!(c, '<' | '>' | ',' | '[' | ']' | ' ' | '?') {
            flush(&mut out, &signature[segment_start..i]);
            out.push(c);
            segment_start = i + c.len_utf8();
        }
    }
    flush(&mut out, &signature[segment_start..]);
    out
}

/// Type variables such as `T`, `K`, `V`, `E`.
pub fn is_type_variable(signature: &str) -> bool {
    let signature = signature.trim();
    !signature.is_empty()
        && signature.len() <= 2
        && signature.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && !signature.contains('.')
}
