//! IDE features — High-level APIs for LSP handlers.
//!
//! This module provides the interface between the semantic model (HIR)
//! and the LSP server. Each function corresponds to an LSP request.
//!
//! ## Design Principles
//!
//! 1. **Explicit inputs**: each entry point takes a [`TypeResolver`](crate::hir::TypeResolver),
//!    an offset and the [`SharedSettings`] of the request
//! 2. **No LSP types**: Uses our own types, converted at LSP boundary
//! 3. **Composable**: Built on top of HIR queries
//!
//! ## Usage
//!
//! The recommended way to use this module is through `AnalysisHost`:
//!
//! ```ignore
//! use qute::ide::AnalysisHost;
//!
//! let mut host = AnalysisHost::new(provider);
//! host.set_document(uri, "{@org.acme.Item item}{item.}", Some(project_uri));
//!
//! let analysis = host.analysis();
//! let items = analysis.completions(uri, LineCol::new(0, 27), &cancel).await?;
//! ```

mod analysis;
mod code_actions;
mod completion;
mod goto;
mod hover;
mod inlay_hints;
mod settings;

pub use analysis::{Analysis, AnalysisHost};
pub use code_actions::{
    CodeAction, CodeActionKind, CodeActionResolveData, CodeActionResolveError,
    CodeActionResolverKind, code_actions, is_similar, resolve_code_action,
};
pub use completion::{
    CompletionCaseResult, CompletionContext, CompletionItem, CompletionKind, CompletionList,
    InsertTextFormat, MethodSnippet, SECTION_SNIPPETS, SectionSnippet, classify,
    completion_case_result, completions, method_snippet, strip_placeholders,
};
pub use goto::{GotoResult, GotoTarget, goto_definition};
pub use hover::{HoverResult, hover};
pub use inlay_hints::{
    Command, InlayHint, InlayHintKind, InlayHintLabelPart, JavaDefinitionParams, inlay_hints,
};
pub use settings::{
    CodeActionSettings, CompletionSettings, HoverSettings, InlayHintSettings,
    JAVA_DEFINITION_COMMAND, SharedSettings,
};
