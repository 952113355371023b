//! Per-project memoized Java type resolution.
//!
//! ## Design
//!
//! Each lookup is stored as a [`Shared`] future keyed by type signature, so
//! concurrent callers asking for the same type await the same in-flight
//! request and the provider is called once. The provider is only called
//! when the future is first polled; a future built by a losing racer is
//! dropped unpolled.
//!
//! Provider failures are logged here and become `None`. Nothing above this
//! module sees a [`ProviderError`](super::ProviderError).

use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::{debug, trace, warn};

use super::filter::{JavaTypeFilter, NativeModeSettings};
use super::java::{ResolvedJavaTypeInfo, raw_type};
use super::provider::{GenerateMissingMemberParams, JavaTypeProvider, JavadocParams};
use super::resolvers::{ExtendedDataModelTemplate, MethodValueResolver, ProjectDataModel, ValueResolver};
use crate::base::WorkspaceEdit;
use crate::syntax::Template;

pub type JavaTypeFuture = Shared<BoxFuture<'static, Option<Arc<ResolvedJavaTypeInfo>>>>;
type DataModelFuture = Shared<BoxFuture<'static, Option<Arc<ProjectDataModel>>>>;
type ExtensionClassesFuture = Shared<BoxFuture<'static, Arc<[SmolStr]>>>;

/// Non-blocking view of a cached type.
#[derive(Clone)]
pub enum TypeLookup {
    Resolved(Option<Arc<ResolvedJavaTypeInfo>>),
    Pending(JavaTypeFuture),
}

#[derive(Default)]
struct ProjectStore {
    types: RwLock<FxHashMap<SmolStr, JavaTypeFuture>>,
    data_model: RwLock<Option<DataModelFuture>>,
    extension_classes: RwLock<Option<ExtensionClassesFuture>>,
}

/// Java data model cache shared by every request.
pub struct JavaDataModelCache {
    provider: Arc<dyn JavaTypeProvider>,
    projects: RwLock<FxHashMap<Arc<str>, Arc<ProjectStore>>>,
}

impl JavaDataModelCache {
    pub fn new(provider: Arc<dyn JavaTypeProvider>) -> Self {
        Self {
            provider,
            projects: RwLock::default(),
        }
    }

    pub fn provider(&self) -> &Arc<dyn JavaTypeProvider> {
        &self.provider
    }

    /// Drop everything cached for a project (rebuild, classpath change).
    pub fn invalidate(&self, project_uri: &str) {
        if self.projects.write().remove(project_uri).is_some() {
            debug!(project = project_uri, "java data model cache invalidated");
        }
    }

    fn store(&self, project_uri: &str) -> Arc<ProjectStore> {
        // Fast path: read lock
        if let Some(store) = self.projects.read().get(project_uri) {
            return store.clone();
        }
        let mut projects = self.projects.write();
        projects
            .entry(Arc::from(project_uri))
            .or_default()
            .clone()
    }

    // ========================================================================
    // JAVA TYPES
    // ========================================================================

    pub async fn resolve_java_type(
        &self,
        signature: &str,
        project_uri: &str,
    ) -> Option<Arc<ResolvedJavaTypeInfo>> {
        self.java_type_future(signature, project_uri).await
    }

    /// Peek at a cached type without waiting.
    pub fn peek_java_type(&self, signature: &str, project_uri: &str) -> TypeLookup {
        let future = self.java_type_future(signature, project_uri);
        match future.peek() {
            Some(resolved) => TypeLookup::Resolved(resolved.clone()),
            None => TypeLookup::Pending(future),
        }
    }

    /// The shared lookup future for `signature`, created on first request.
    pub fn java_type_future(&self, signature: &str, project_uri: &str) -> JavaTypeFuture {
        let signature = signature.trim();
        if signature.is_empty() || project_uri.is_empty() {
            return futures::future::ready(None).boxed().shared();
        }
        let store = self.store(project_uri);
        if let Some(future) = store.types.read().get(signature) {
            trace!(signature, "java type cache hit");
            return future.clone();
        }

        // Built outside the lock: generic types look up their raw type.
        let future = self.create_type_future(signature, project_uri);

        let mut types = store.types.write();
        types
            .entry(SmolStr::new(signature))
            .or_insert(future)
            .clone()
    }

    fn create_type_future(&self, signature: &str, project_uri: &str) -> JavaTypeFuture {
        if let Some(element) = signature.strip_suffix("[]") {
            let array = ResolvedJavaTypeInfo::array(signature, element.trim());
            return futures::future::ready(Some(Arc::new(array))).boxed().shared();
        }

        if signature.contains('<') {
            let raw = self.java_type_future(raw_type(signature), project_uri);
            let signature = signature.to_owned();
            return async move { raw.await.map(|raw| Arc::new(raw.parameterized(&signature))) }
                .boxed()
                .shared();
        }

        let provider = self.provider.clone();
        let signature = signature.to_owned();
        let project_uri = project_uri.to_owned();
        async move {
            match provider.resolve_type(&signature, &project_uri).await {
                Ok(Some(resolved)) => Some(Arc::new(resolved)),
                Ok(None) => {
                    debug!(signature = %signature, project = %project_uri, "unresolved java type");
                    None
                }
                Err(error) => {
                    warn!(
                        signature = %signature,
                        project = %project_uri,
                        %error,
                        "java type resolution failed"
                    );
                    None
                }
            }
        }
        .boxed()
        .shared()
    }

    // ========================================================================
    // DATA MODEL
    // ========================================================================

    /// Data model of a project, built-in resolvers included.
    pub async fn data_model(&self, project_uri: &str) -> Option<Arc<ProjectDataModel>> {
        if project_uri.is_empty() {
            return None;
        }
        let store = self.store(project_uri);
        let existing = store.data_model.read().clone();
        let future = match existing {
            Some(future) => future,
            None => {
                let provider = self.provider.clone();
                let project = project_uri.to_owned();
                let future = async move {
                    match provider.data_model_project(&project).await {
                        Ok(model) => Some(Arc::new(ProjectDataModel::new(model.unwrap_or_default()))),
                        Err(error) => {
                            warn!(project = %project, %error, "data model loading failed");
                            None
                        }
                    }
                }
                .boxed()
                .shared();
                store.data_model.write().get_or_insert(future).clone()
            }
        };
        future.await
    }

    /// Type resolvers applicable to receivers of `signature`.
    pub async fn resolvers_for(&self, signature: &str, project_uri: &str) -> Vec<MethodValueResolver> {
        let Some(model) = self.data_model(project_uri).await else {
            return Vec::new();
        };
        model
            .type_resolvers
            .iter()
            .filter(|resolver| resolver.applies_to(signature))
            .cloned()
            .collect()
    }

    pub async fn namespace_resolvers(&self, namespace: &str, project_uri: &str) -> Vec<ValueResolver> {
        let Some(model) = self.data_model(project_uri).await else {
            return Vec::new();
        };
        model.namespace_resolvers.get(namespace).cloned().unwrap_or_default()
    }

    /// Namespaces known to the project.
    pub async fn namespaces(&self, project_uri: &str) -> Vec<SmolStr> {
        let Some(model) = self.data_model(project_uri).await else {
            return Vec::new();
        };
        model.namespace_resolvers.keys().cloned().collect()
    }

    pub async fn global_variables(&self, project_uri: &str) -> Vec<ValueResolver> {
        let Some(model) = self.data_model(project_uri).await else {
            return Vec::new();
        };
        model.global_variables.clone()
    }

    /// Checked template declaring the parameters of `template`.
    pub async fn data_model_template(&self, template: &Template) -> Option<ExtendedDataModelTemplate> {
        let project_uri = template.project_uri()?;
        let template_id = template.template_id()?;
        let model = self.data_model(project_uri).await?;
        model
            .project
            .find_template(&template_id)
            .cloned()
            .map(ExtendedDataModelTemplate::new)
    }

    pub async fn template_extension_classes(&self, project_uri: &str) -> Arc<[SmolStr]> {
        if project_uri.is_empty() {
            return Arc::from(Vec::new());
        }
        let store = self.store(project_uri);
        let existing = store.extension_classes.read().clone();
        let future = match existing {
            Some(future) => future,
            None => {
                let provider = self.provider.clone();
                let project = project_uri.to_owned();
                let future = async move {
                    match provider.template_extension_classes(&project).await {
                        Ok(classes) => Arc::from(classes),
                        Err(error) => {
                            warn!(project = %project, %error, "template extension classes lookup failed");
                            Arc::from(Vec::new())
                        }
                    }
                }
                .boxed()
                .shared();
                store.extension_classes.write().get_or_insert(future).clone()
            }
        };
        future.await
    }

    /// Visibility policy for `template`.
    pub async fn java_type_filter(
        &self,
        template: &Template,
        settings: &NativeModeSettings,
    ) -> JavaTypeFilter {
        if !settings.enabled {
            return JavaTypeFilter::unrestricted();
        }
        let native_types = self
            .data_model_template(template)
            .await
            .map(|t| t.native_types)
            .unwrap_or_default();
        JavaTypeFilter::native(Arc::new(native_types))
    }

    // ========================================================================
    // PASS-THROUGH REQUESTS
    // ========================================================================

    pub async fn generate_missing_member(
        &self,
        params: &GenerateMissingMemberParams,
    ) -> Option<WorkspaceEdit> {
        match self.provider.generate_missing_member(params).await {
            Ok(edit) => edit,
            Err(error) => {
                warn!(
                    member = %params.missing_property,
                    signature = %params.java_type,
                    %error,
                    "member generation failed"
                );
                None
            }
        }
    }

    pub async fn javadoc(&self, params: &JavadocParams) -> Option<String> {
        match self.provider.javadoc(params).await {
            Ok(doc) => doc,
            Err(error) => {
                warn!(
                    member = %params.member_name,
                    signature = %params.source_type,
                    %error,
                    "javadoc lookup failed"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::{DataModelProject, ProviderError};
    use async_trait::async_trait;
    use futures::executor::block_on;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl JavaTypeProvider for CountingProvider {
        async fn resolve_type(
            &self,
            signature: &str,
            _project_uri: &str,
        ) -> Result<Option<ResolvedJavaTypeInfo>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match signature {
                "org.acme.Broken" => Err(ProviderError::Request("boom".into())),
                "java.util.List" => Ok(Some(ResolvedJavaTypeInfo::new("java.util.List").with_iterable_of("E"))),
                _ => Ok(Some(ResolvedJavaTypeInfo::new(signature))),
            }
        }

        async fn data_model_project(
            &self,
            _project_uri: &str,
        ) -> Result<Option<DataModelProject>, ProviderError> {
            Ok(None)
        }
    }

    fn cache() -> (Arc<CountingProvider>, JavaDataModelCache) {
        let provider = Arc::new(CountingProvider::default());
        (provider.clone(), JavaDataModelCache::new(provider))
    }

    #[test]
    fn test_memoized_per_project() {
        let (provider, cache) = cache();
        block_on(async {
            assert!(cache.resolve_java_type("org.acme.Item", "p").await.is_some());
            assert!(cache.resolve_java_type("org.acme.Item", "p").await.is_some());
            assert!(cache.resolve_java_type("org.acme.Item", "q").await.is_some());
        });
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_provider_failure_is_none() {
        let (_, cache) = cache();
        assert!(block_on(cache.resolve_java_type("org.acme.Broken", "p")).is_none());
    }

    #[test]
    fn test_empty_project_short_circuits() {
        let (provider, cache) = cache();
        assert!(block_on(cache.resolve_java_type("org.acme.Item", "")).is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_generic_and_array_types() {
        let (_, cache) = cache();
        let list = block_on(cache.resolve_java_type("java.util.List<org.acme.Item>", "p")).unwrap();
        assert_eq!(list.iterable_of.as_deref(), Some("org.acme.Item"));

        let array = block_on(cache.resolve_java_type("org.acme.Item[]", "p")).unwrap();
        assert_eq!(array.iterable_of.as_deref(), Some("org.acme.Item"));
    }

    #[test]
    fn test_peek_before_and_after_resolution() {
        let (_, cache) = cache();
        assert!(matches!(cache.peek_java_type("org.acme.Item", "p"), TypeLookup::Pending(_)));
        block_on(cache.resolve_java_type("org.acme.Item", "p"));
        assert!(matches!(
            cache.peek_java_type("org.acme.Item", "p"),
            TypeLookup::Resolved(Some(_))
        ));
    }

    #[test]
    fn test_invalidate_drops_entries() {
        let (provider, cache) = cache();
        block_on(cache.resolve_java_type("org.acme.Item", "p"));
        cache.invalidate("p");
        block_on(cache.resolve_java_type("org.acme.Item", "p"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }
}
