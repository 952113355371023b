//! AnalysisHost and Analysis — Unified state management for IDE features.
//!
//! The `AnalysisHost` owns all mutable state and provides `Analysis` snapshots
//! for querying. This pattern ensures consistent reads across multiple queries.
//!
//! ## Usage
//!
//! ```ignore
//! let mut host = AnalysisHost::new(provider);
//!
//! // Apply document changes
//! host.set_document(uri, text, Some(project_uri));
//!
//! // Get a snapshot for queries
//! let analysis = host.analysis();
//! let items = analysis.completions(uri, LineCol::new(0, 6), &cancel).await?;
//! let hints = analysis.inlay_hints(uri, None, &cancel).await?;
//! ```
//!
//! A position outside the document, or a document that is not open, gives
//! an empty result.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use super::code_actions::{self, CodeAction, CodeActionResolveError};
use super::completion::{self, CompletionList};
use super::goto::{self, GotoResult};
use super::hover::{self, HoverResult};
use super::inlay_hints::{self, InlayHint};
use super::settings::SharedSettings;
use crate::base::{
    CancellationToken, Cancelled, LineCol, LineColRange, TextRange, TextSize, check_cancelled,
};
use crate::hir::{Diagnostic, JavaDataModelCache, JavaTypeProvider, TypeResolver, check_template};
use crate::syntax::Template;

/// Owns all mutable state for the IDE layer.
///
/// Apply changes via `set_document()` and `remove_document()`,
/// then get a consistent snapshot via `analysis()`.
pub struct AnalysisHost {
    /// Open templates by document uri.
    templates: FxHashMap<Arc<str>, Arc<Template>>,
    /// Java data model shared by every template of every project.
    cache: Arc<JavaDataModelCache>,
    settings: SharedSettings,
}

impl AnalysisHost {
    /// Create a new AnalysisHost resolving Java types through `provider`.
    pub fn new(provider: Arc<dyn JavaTypeProvider>) -> Self {
        Self {
            templates: FxHashMap::default(),
            cache: Arc::new(JavaDataModelCache::new(provider)),
            settings: SharedSettings::default(),
        }
    }

    /// Set the content of a document, parsing it and storing the result.
    pub fn set_document(&mut self, uri: &str, text: &str, project_uri: Option<&str>) {
        let template = Template::parse(uri, text, project_uri.map(Arc::from));
        self.templates.insert(Arc::from(uri), Arc::new(template));
    }

    /// Remove a document from storage.
    pub fn remove_document(&mut self, uri: &str) {
        self.templates.remove(uri);
    }

    /// Check if a document is open.
    pub fn has_document(&self, uri: &str) -> bool {
        self.templates.contains_key(uri)
    }

    /// The project metadata changed (rebuild, classpath): forget every
    /// cached Java type of the project.
    pub fn project_changed(&self, project_uri: &str) {
        self.cache.invalidate(project_uri);
    }

    pub fn set_settings(&mut self, settings: SharedSettings) {
        self.settings = settings;
    }

    pub fn settings(&self) -> &SharedSettings {
        &self.settings
    }

    pub fn cache(&self) -> &Arc<JavaDataModelCache> {
        &self.cache
    }

    /// Get a read-only snapshot for querying.
    pub fn analysis(&self) -> Analysis<'_> {
        Analysis { host: self }
    }
}

/// A read-only view of the host's templates and Java data model.
pub struct Analysis<'a> {
    host: &'a AnalysisHost,
}

impl<'a> Analysis<'a> {
    /// Get the parsed template of an open document.
    pub fn template(&self, uri: &str) -> Option<&'a Template> {
        self.host.templates.get(uri).map(|t| t.as_ref())
    }

    pub fn settings(&self) -> &'a SharedSettings {
        &self.host.settings
    }

    /// Completion candidates at `position`.
    pub async fn completions(
        &self,
        uri: &str,
        position: LineCol,
        cancel: &CancellationToken,
    ) -> Result<CompletionList, Cancelled> {
        check_cancelled(cancel)?;
        let Some((template, offset)) = self.offset(uri, position) else {
            return Ok(CompletionList::empty());
        };
        let resolver = self.resolver(template, cancel).await;
        completion::completions(&resolver, offset, self.settings()).await
    }

    /// Hover content at `position`.
    pub async fn hover(
        &self,
        uri: &str,
        position: LineCol,
        cancel: &CancellationToken,
    ) -> Result<Option<HoverResult>, Cancelled> {
        check_cancelled(cancel)?;
        let Some((template, offset)) = self.offset(uri, position) else {
            return Ok(None);
        };
        let resolver = self.resolver(template, cancel).await;
        hover::hover(&resolver, offset, self.settings()).await
    }

    /// Definition of the name at `position`.
    pub async fn goto_definition(
        &self,
        uri: &str,
        position: LineCol,
        cancel: &CancellationToken,
    ) -> Result<GotoResult, Cancelled> {
        check_cancelled(cancel)?;
        let Some((template, offset)) = self.offset(uri, position) else {
            return Ok(GotoResult::empty());
        };
        let resolver = self.resolver(template, cancel).await;
        goto::goto_definition(&resolver, offset).await
    }

    /// Inlay hints of the sections within `range`, or the whole document.
    pub async fn inlay_hints(
        &self,
        uri: &str,
        range: Option<LineColRange>,
        cancel: &CancellationToken,
    ) -> Result<Vec<InlayHint>, Cancelled> {
        check_cancelled(cancel)?;
        let Some(template) = self.document(uri) else {
            return Ok(Vec::new());
        };
        let range = match range {
            Some(range) => match text_range(template, range) {
                Some(range) => Some(range),
                None => return Ok(Vec::new()),
            },
            None => None,
        };
        let resolver = self.resolver(template, cancel).await;
        inlay_hints::inlay_hints(&resolver, range, self.settings()).await
    }

    /// Validate a document against the Java data model.
    pub async fn diagnostics(&self, uri: &str, cancel: &CancellationToken) -> Result<Vec<Diagnostic>, Cancelled> {
        check_cancelled(cancel)?;
        let Some(template) = self.document(uri) else {
            return Ok(Vec::new());
        };
        let resolver = self.resolver(template, cancel).await;
        check_template(&resolver).await
    }

    /// Quick fixes for diagnostics previously reported on `uri`.
    pub async fn code_actions(
        &self,
        uri: &str,
        diagnostics: &[Diagnostic],
        cancel: &CancellationToken,
    ) -> Result<Vec<CodeAction>, Cancelled> {
        check_cancelled(cancel)?;
        let Some(template) = self.document(uri) else {
            return Ok(Vec::new());
        };
        let resolver = self.resolver(template, cancel).await;
        code_actions::code_actions(&resolver, diagnostics, self.settings()).await
    }

    /// Compute the edit of a lazy code action.
    pub async fn resolve_code_action(&self, action: CodeAction) -> Result<CodeAction, CodeActionResolveError> {
        code_actions::resolve_code_action(&self.host.cache, action).await
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn document(&self, uri: &str) -> Option<&'a Template> {
        let template = self.template(uri);
        if template.is_none() {
            debug!(uri, "document is not open");
        }
        template
    }

    fn offset(&self, uri: &str, position: LineCol) -> Option<(&'a Template, TextSize)> {
        let template = self.document(uri)?;
        match template.offset_at(position) {
            Some(offset) => Some((template, offset)),
            None => {
                debug!(uri, %position, "position outside the document");
                None
            }
        }
    }

    async fn resolver<'r>(&self, template: &'r Template, cancel: &'r CancellationToken) -> TypeResolver<'r>
    where
        'a: 'r,
    {
        let cache: &'a JavaDataModelCache = &self.host.cache;
        TypeResolver::new(cache, template, &self.host.settings.native, cancel).await
    }
}

/// Byte range of an editor range; the end is clamped to the text.
fn text_range(template: &Template, range: LineColRange) -> Option<TextRange> {
    let Some(start) = template.offset_at(range.start) else {
        debug!(uri = template.uri(), start = %range.start, "range outside the document");
        return None;
    };
    let end = template
        .offset_at(range.end)
        .unwrap_or_else(|| template.line_index().text_len())
        .max(start);
    Some(TextRange::new(start, end))
}
