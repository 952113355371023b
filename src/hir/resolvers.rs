//! Value resolvers and the project data model.
//!
//! A value resolver is a virtual member: a template extension method, an
//! injected bean, a template global or a namespace resolver such as
//! `config:*`. Resolvers are not declared on the receiver type but behave
//! as if they were.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::java::{JAVA_LANG_OBJECT, JavaMethodInfo, JavaParameterInfo, is_type_variable, raw_type};

/// Match name of a resolver accepting any member name (`config:foo`).
pub const MATCH_ANY: &str = "*";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueResolverKind {
    #[default]
    BuiltIn,
    TemplateExtension,
    InjectedBean,
    TemplateGlobal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValueResolver {
    pub name: SmolStr,
    pub type_signature: SmolStr,
    pub source_type: SmolStr,
    #[serde(default)]
    pub namespace: Option<SmolStr>,
    #[serde(default)]
    pub kind: ValueResolverKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodValueResolver {
    pub method: JavaMethodInfo,
    pub source_type: SmolStr,
    #[serde(default)]
    pub namespace: Option<SmolStr>,
    /// Name override (`@TemplateExtension(matchName = ...)`, `@Named`).
    #[serde(default)]
    pub named: Option<SmolStr>,
    #[serde(default)]
    pub match_name: Option<SmolStr>,
    #[serde(default)]
    pub kind: ValueResolverKind,
    #[serde(default)]
    pub description: Option<SmolStr>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ValueResolver {
    Field(FieldValueResolver),
    Method(MethodValueResolver),
}

impl FieldValueResolver {
    pub fn new(name: &str, type_signature: &str, source_type: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            type_signature: SmolStr::new(type_signature),
            source_type: SmolStr::new(source_type),
            namespace: None,
            kind: ValueResolverKind::BuiltIn,
        }
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(SmolStr::new(namespace));
        self
    }

    pub fn with_kind(mut self, kind: ValueResolverKind) -> Self {
        self.kind = kind;
        self
    }
}

impl MethodValueResolver {
    pub fn new(method: JavaMethodInfo, source_type: &str) -> Self {
        Self {
            method,
            source_type: SmolStr::new(source_type),
            namespace: None,
            named: None,
            match_name: None,
            kind: ValueResolverKind::BuiltIn,
            description: None,
        }
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(SmolStr::new(namespace));
        self
    }

    pub fn with_named(mut self, named: &str) -> Self {
        self.named = Some(SmolStr::new(named));
        self
    }

    pub fn with_match_name(mut self, match_name: &str) -> Self {
        self.match_name = Some(SmolStr::new(match_name));
        self
    }

    pub fn with_kind(mut self, kind: ValueResolverKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(SmolStr::new(description));
        self
    }

    /// Name used in templates.
    pub fn name(&self) -> &str {
        self.named
            .as_deref()
            .or(self.match_name.as_deref().filter(|m| *m != MATCH_ANY))
            .unwrap_or(&self.method.name)
    }

    pub fn is_match_any(&self) -> bool {
        self.match_name.as_deref() == Some(MATCH_ANY)
    }

    /// Parameters written by the template author. Without a namespace the
    /// first Java parameter is the receiver.
    pub fn user_parameters(&self) -> &[JavaParameterInfo] {
        match self.namespace {
            Some(_) => &self.method.parameters,
            None => self.method.parameters.get(1..).unwrap_or_default(),
        }
    }

    pub fn receiver_type(&self) -> Option<&str> {
        match self.namespace {
            Some(_) => None,
            None => self.method.parameters.first().map(|p| p.type_signature.as_str()),
        }
    }

    /// Whether the resolver applies to receivers of type `signature`.
    pub fn applies_to(&self, signature: &str) -> bool {
        let Some(receiver) = self.receiver_type() else {
            return false;
        };
        let receiver = raw_type(receiver);
        receiver == JAVA_LANG_OBJECT
            || is_type_variable(receiver)
            || receiver == raw_type(signature)
    }

    pub fn getter_name(&self) -> Option<SmolStr> {
        if !self.user_parameters().is_empty() {
            return None;
        }
        JavaMethodInfo::new(self.name(), "").getter_name()
    }

    /// Whether the name is a Java identifier, as opposed to an operator
    /// (`?:`, `||`) or the match-any sentinel.
    pub fn has_valid_name(&self) -> bool {
        !self.is_match_any() && is_valid_name(self.name())
    }
}

impl ValueResolver {
    pub fn name(&self) -> &str {
        match self {
            ValueResolver::Field(field) => &field.name,
            ValueResolver::Method(method) => method.name(),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        match self {
            ValueResolver::Field(field) => field.namespace.as_deref(),
            ValueResolver::Method(method) => method.namespace.as_deref(),
        }
    }

    pub fn source_type(&self) -> &str {
        match self {
            ValueResolver::Field(field) => &field.source_type,
            ValueResolver::Method(method) => &method.source_type,
        }
    }

    pub fn kind(&self) -> ValueResolverKind {
        match self {
            ValueResolver::Field(field) => field.kind,
            ValueResolver::Method(method) => method.kind,
        }
    }

    /// Java type produced when the resolver is evaluated.
    pub fn java_type(&self) -> &str {
        match self {
            ValueResolver::Field(field) => &field.type_signature,
            ValueResolver::Method(method) => &method.method.return_type,
        }
    }

    pub fn as_method(&self) -> Option<&MethodValueResolver> {
        match self {
            ValueResolver::Method(method) => Some(method),
            ValueResolver::Field(_) => None,
        }
    }

    /// Whether `name` selects this resolver.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            ValueResolver::Field(field) => field.name == name,
            ValueResolver::Method(method) => {
                method.is_match_any()
                    || method.name() == name
                    || method.getter_name().is_some_and(|getter| getter == name)
            }
        }
    }

    /// `String name` or `getName(String prefix) : String`.
    pub fn signature(&self) -> String {
        match self {
            ValueResolver::Field(field) => {
                format!("{} : {}", field.name, super::java::simple_type_name(&field.type_signature))
            }
            ValueResolver::Method(method) => method.method.simple_signature(),
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c == '$' || unicode_ident::is_xid_start(c))
        && chars.all(|c| c == '$' || unicode_ident::is_xid_continue(c))
}

// ============================================================================
// DATA MODEL PROJECT
// ============================================================================

/// Parameter injected into a checked template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataModelParameter {
    pub key: SmolStr,
    pub source_type: SmolStr,
}

/// A checked template: `@CheckedTemplate` method or `Template` field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataModelTemplate {
    /// Template id (`ItemResource/items`).
    pub template_uri: SmolStr,
    pub source_type: SmolStr,
    #[serde(default)]
    pub source_method: Option<SmolStr>,
    #[serde(default)]
    pub parameters: Vec<DataModelParameter>,
}

impl DataModelTemplate {
    pub fn new(template_uri: &str, source_type: &str) -> Self {
        Self {
            template_uri: SmolStr::new(template_uri),
            source_type: SmolStr::new(source_type),
            source_method: None,
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, key: &str, source_type: &str) -> Self {
        self.parameters.push(DataModelParameter {
            key: SmolStr::new(key),
            source_type: SmolStr::new(source_type),
        });
        self
    }

    pub fn parameter(&self, key: &str) -> Option<&DataModelParameter> {
        self.parameters.iter().find(|p| p.key == key)
    }
}

/// A checked template plus the Java types usable without reflection
/// registration in native mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedDataModelTemplate {
    pub template: DataModelTemplate,
    pub native_types: FxHashSet<SmolStr>,
}

impl ExtendedDataModelTemplate {
    pub fn new(template: DataModelTemplate) -> Self {
        let native_types = template
            .parameters
            .iter()
            .map(|p| SmolStr::new(raw_type(&p.source_type)))
            .collect();
        Self {
            template,
            native_types,
        }
    }
}

/// Data model declared by a project.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataModelProject {
    pub templates: Vec<DataModelTemplate>,
    pub value_resolvers: Vec<ValueResolver>,
}

impl DataModelProject {
    pub fn with_template(mut self, template: DataModelTemplate) -> Self {
        self.templates.push(template);
        self
    }

    pub fn with_resolver(mut self, resolver: ValueResolver) -> Self {
        self.value_resolvers.push(resolver);
        self
    }

    pub fn find_template(&self, template_id: &str) -> Option<&DataModelTemplate> {
        self.templates.iter().find(|t| t.template_uri == template_id)
    }
}

/// [`DataModelProject`] indexed for lookups, built-in resolvers included.
#[derive(Clone, Debug, Default)]
pub struct ProjectDataModel {
    pub project: DataModelProject,
    /// Resolvers bound to a receiver type.
    pub type_resolvers: Vec<MethodValueResolver>,
    pub namespace_resolvers: IndexMap<SmolStr, Vec<ValueResolver>>,
    pub global_variables: Vec<ValueResolver>,
}

impl ProjectDataModel {
    pub fn new(project: DataModelProject) -> Self {
        let mut model = Self::default();
        for resolver in builtin_resolvers().into_iter().chain(project.value_resolvers.iter().cloned()) {
            if let Some(namespace) = resolver.namespace() {
                model
                    .namespace_resolvers
                    .entry(SmolStr::new(namespace))
                    .or_default()
                    .push(resolver);
                continue;
            }
            match resolver {
                ValueResolver::Method(method) if method.kind != ValueResolverKind::TemplateGlobal => {
                    model.type_resolvers.push(method)
                }
                global => model.global_variables.push(global),
            }
        }
        model.project = project;
        model
    }
}

/// Resolvers every Qute project has.
pub fn builtin_resolvers() -> Vec<ValueResolver> {
    const SOURCE: &str = "io.quarkus.qute.ValueResolvers";
    let any = |name: &str, ret: &str| JavaMethodInfo::new(name, ret).with_parameter("base", "T");
    let list = |name: &str| {
        JavaMethodInfo::new(name, "java.util.List<T>").with_parameter("list", "java.util.List<T>")
    };
    let method = |info: JavaMethodInfo, description: &str| {
        ValueResolver::Method(MethodValueResolver::new(info, SOURCE).with_description(description))
    };
    vec![
        method(list("orEmpty"), "Outputs an empty list if the previous part is not resolved or resolves to null."),
        method(
            any("or", "T").with_parameter("other", "T"),
            "Outputs the default value if the previous part is not resolved or resolves to null.",
        ),
        method(
            any("?:", "T").with_parameter("other", "T"),
            "Outputs the default value if the previous part is not resolved or resolves to null.",
        ),
        method(
            any("ifTruthy", "T").with_parameter("value", "T"),
            "Outputs the value if the previous part is truthy.",
        ),
        method(
            list("take").with_parameter("n", "int"),
            "Returns the first `n` elements from the given list.",
        ),
        method(
            list("takeLast").with_parameter("n", "int"),
            "Returns the last `n` elements from the given list.",
        ),
        method(any("raw", "T"), "Marks the object so that character escape is not needed."),
        method(any("safe", "T"), "Marks the object so that character escape is not needed."),
        ValueResolver::Method(
            MethodValueResolver::new(
                JavaMethodInfo::new("getConfigProperty", JAVA_LANG_OBJECT)
                    .with_parameter("propertyName", "java.lang.String"),
                "io.quarkus.qute.runtime.extensions.ConfigTemplateExtensions",
            )
            .with_namespace("config")
            .with_match_name(MATCH_ANY),
        ),
        ValueResolver::Method(
            MethodValueResolver::new(
                JavaMethodInfo::new("property", JAVA_LANG_OBJECT)
                    .with_parameter("propertyName", "java.lang.String"),
                "io.quarkus.qute.runtime.extensions.ConfigTemplateExtensions",
            )
            .with_namespace("config"),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(name: &str) -> MethodValueResolver {
        builtin_resolvers()
            .into_iter()
            .filter_map(|r| match r {
                ValueResolver::Method(m) => Some(m),
                ValueResolver::Field(_) => None,
            })
            .find(|m| m.name() == name)
            .unwrap()
    }

    #[test]
    fn test_user_parameters_skip_receiver() {
        assert_eq!(resolver("or").user_parameters().len(), 1);
        assert_eq!(resolver("orEmpty").user_parameters().len(), 0);
        assert_eq!(resolver("property").user_parameters().len(), 1);
    }

    #[test]
    fn test_applies_to() {
        assert!(resolver("or").applies_to("org.acme.Item"));
        assert!(resolver("take").applies_to("java.util.List<org.acme.Item>"));
        assert!(!resolver("take").applies_to("org.acme.Item"));
        assert!(!resolver("property").applies_to("org.acme.Item"));
    }

    #[test]
    fn test_valid_names() {
        assert!(resolver("or").has_valid_name());
        assert!(!resolver("?:").has_valid_name());
        let config_any = builtin_resolvers()
            .into_iter()
            .filter_map(|r| r.as_method().cloned())
            .find(MethodValueResolver::is_match_any)
            .unwrap();
        assert!(!config_any.has_valid_name());
        assert_eq!(config_any.name(), "getConfigProperty");
    }

    #[test]
    fn test_project_data_model_indexing() {
        let project = DataModelProject::default()
            .with_resolver(ValueResolver::Field(
                FieldValueResolver::new("bean", "org.acme.Bean", "org.acme.Beans")
                    .with_namespace("inject")
                    .with_kind(ValueResolverKind::InjectedBean),
            ))
            .with_resolver(ValueResolver::Field(
                FieldValueResolver::new("today", "java.time.LocalDate", "org.acme.Globals")
                    .with_kind(ValueResolverKind::TemplateGlobal),
            ));
        let model = ProjectDataModel::new(project);
        assert_eq!(model.namespace_resolvers["inject"].len(), 1);
        assert_eq!(model.namespace_resolvers["config"].len(), 2);
        assert_eq!(model.global_variables.len(), 1);
        assert!(model.type_resolvers.iter().any(|r| r.name() == "orEmpty"));
    }

    #[test]
    fn test_match_any_matches_every_name() {
        let config = ProjectDataModel::new(DataModelProject::default());
        let resolvers = &config.namespace_resolvers["config"];
        assert!(resolvers.iter().any(|r| r.matches("quarkus.http.port")));
    }
}
