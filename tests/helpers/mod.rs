//! Shared test helpers: an in-memory Java type provider and host builders.

pub mod fixtures;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::Poll;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use qute::base::{LineCol, LineColRange, TextEdit, WorkspaceEdit};
use qute::hir::{
    DataModelProject, GenerateMissingMemberParams, JavaTypeProvider, JavadocParams, ProviderError,
    ResolvedJavaTypeInfo,
};
use qute::ide::{AnalysisHost, SharedSettings};

pub const PROJECT: &str = "file:///projects/acme";
pub const TEMPLATE_URI: &str = "file:///projects/acme/src/main/resources/templates/items.html";
pub const JAVA_SOURCE_URI: &str = "file:///projects/acme/src/main/java/org/acme/Item.java";

/// Java type provider backed by a map.
///
/// Each call yields once before answering, like a provider across a
/// process boundary, and every type lookup is counted.
#[derive(Default)]
pub struct FakeJavaProvider {
    types: FxHashMap<String, ResolvedJavaTypeInfo>,
    data_model: Option<DataModelProject>,
    extension_classes: Vec<SmolStr>,
    javadocs: FxHashMap<String, String>,
    type_calls: AtomicUsize,
    generated: Mutex<Vec<GenerateMissingMemberParams>>,
}

impl FakeJavaProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, ty: ResolvedJavaTypeInfo) -> Self {
        self.types.insert(ty.signature.to_string(), ty);
        self
    }

    pub fn with_data_model(mut self, project: DataModelProject) -> Self {
        self.data_model = Some(project);
        self
    }

    pub fn with_extension_class(mut self, class: &str) -> Self {
        self.extension_classes.push(SmolStr::new(class));
        self
    }

    pub fn with_javadoc(mut self, member: &str, doc: &str) -> Self {
        self.javadocs.insert(member.to_string(), doc.to_string());
        self
    }

    /// Number of `resolve_type` calls received.
    pub fn type_calls(&self) -> usize {
        self.type_calls.load(Ordering::SeqCst)
    }

    /// Members whose generation was requested.
    pub fn generated(&self) -> Vec<GenerateMissingMemberParams> {
        self.generated.lock().clone()
    }
}

async fn yield_once() {
    let mut yielded = false;
    futures::future::poll_fn(|cx| {
        if yielded {
            Poll::Ready(())
        } else {
            yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    })
    .await
}

#[async_trait]
impl JavaTypeProvider for FakeJavaProvider {
    async fn resolve_type(
        &self,
        signature: &str,
        project_uri: &str,
    ) -> Result<Option<ResolvedJavaTypeInfo>, ProviderError> {
        self.type_calls.fetch_add(1, Ordering::SeqCst);
        yield_once().await;
        if project_uri != PROJECT {
            return Err(ProviderError::ProjectNotFound(project_uri.to_string()));
        }
        Ok(self.types.get(signature).cloned())
    }

    async fn data_model_project(&self, _project_uri: &str) -> Result<Option<DataModelProject>, ProviderError> {
        yield_once().await;
        Ok(self.data_model.clone())
    }

    async fn template_extension_classes(&self, _project_uri: &str) -> Result<Vec<SmolStr>, ProviderError> {
        Ok(self.extension_classes.clone())
    }

    async fn generate_missing_member(
        &self,
        params: &GenerateMissingMemberParams,
    ) -> Result<Option<WorkspaceEdit>, ProviderError> {
        self.generated.lock().push(params.clone());
        let position = LineCol::new(3, 0);
        let edit = TextEdit::replace(
            LineColRange::empty(position),
            format!("public String {};\n", params.missing_property),
        );
        Ok(Some(WorkspaceEdit::single(JAVA_SOURCE_URI, edit)))
    }

    async fn javadoc(&self, params: &JavadocParams) -> Result<Option<String>, ProviderError> {
        Ok(self.javadocs.get(params.member_name.as_str()).cloned())
    }
}

/// Host with one open template of [`PROJECT`].
pub fn host_with(provider: FakeJavaProvider, text: &str) -> (AnalysisHost, Arc<FakeJavaProvider>) {
    host_with_settings(provider, text, SharedSettings::default())
}

pub fn host_with_settings(
    provider: FakeJavaProvider,
    text: &str,
    settings: SharedSettings,
) -> (AnalysisHost, Arc<FakeJavaProvider>) {
    let provider = Arc::new(provider);
    let mut host = AnalysisHost::new(provider.clone());
    host.set_settings(settings);
    host.set_document(TEMPLATE_URI, text, Some(PROJECT));
    (host, provider)
}

/// Split `text` at the `|` cursor marker.
pub fn cursor(text: &str) -> (String, LineCol) {
    let offset = text.find('|').expect("cursor marker");
    let before = &text[..offset];
    let line = before.matches('\n').count() as u32;
    let line_start = before.rfind('\n').map_or(0, |nl| nl + 1);
    let col = before[line_start..].encode_utf16().count() as u32;
    (text.replacen('|', "", 1), LineCol::new(line, col))
}
