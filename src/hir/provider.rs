//! The Java type provider: the one capability the engine consumes from the
//! host project model.
//!
//! Every call may cross a process boundary, so the trait is async. Failures
//! are reported as [`ProviderError`] and never leave
//! [`JavaDataModelCache`](super::JavaDataModelCache): the cache logs them
//! and degrades to "unknown".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

use super::java::ResolvedJavaTypeInfo;
use super::resolvers::DataModelProject;
use crate::base::WorkspaceEdit;

/// Failure reported by a [`JavaTypeProvider`].
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("project `{0}` not found")]
    ProjectNotFound(String),
    #[error("java type provider request failed: {0}")]
    Request(String),
    #[error("java type provider unavailable")]
    Unavailable,
}

/// Kind of member the provider is asked to generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberType {
    Field,
    Getter,
    /// Add a static method to an existing template extension class.
    AppendTemplateExtension,
    /// Create a new template extension class holding the method.
    CreateTemplateExtension,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMissingMemberParams {
    pub member_type: MemberType,
    pub missing_property: SmolStr,
    /// Signature of the type receiving the member.
    pub java_type: SmolStr,
    pub project_uri: SmolStr,
    /// Target class for [`MemberType::AppendTemplateExtension`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_class: Option<SmolStr>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentationFormat {
    #[default]
    PlainText,
    Markdown,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavadocParams {
    pub source_type: SmolStr,
    pub project_uri: SmolStr,
    pub member_name: SmolStr,
    pub signature: String,
    pub format: DocumentationFormat,
}

/// Host-side Java introspection.
#[async_trait]
pub trait JavaTypeProvider: Send + Sync {
    /// Resolve a Java type by fully qualified signature. `Ok(None)` when the
    /// project has no such type.
    async fn resolve_type(
        &self,
        signature: &str,
        project_uri: &str,
    ) -> Result<Option<ResolvedJavaTypeInfo>, ProviderError>;

    /// Checked templates and value resolvers declared by the project.
    async fn data_model_project(
        &self,
        project_uri: &str,
    ) -> Result<Option<DataModelProject>, ProviderError>;

    /// Classes annotated `@TemplateExtension`.
    async fn template_extension_classes(
        &self,
        _project_uri: &str,
    ) -> Result<Vec<SmolStr>, ProviderError> {
        Ok(Vec::new())
    }

    /// Source edit creating a missing field, getter or template extension.
    async fn generate_missing_member(
        &self,
        _params: &GenerateMissingMemberParams,
    ) -> Result<Option<WorkspaceEdit>, ProviderError> {
        Ok(None)
    }

    async fn javadoc(&self, _params: &JavadocParams) -> Result<Option<String>, ProviderError> {
        Ok(None)
    }
}
