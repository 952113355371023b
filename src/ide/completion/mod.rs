//! Completion — context classification and candidate collection.
//!
//! ## Design
//!
//! [`classify`] maps a cursor offset to a [`CompletionContext`] using only
//! the node model. Candidate collection then resolves types through the
//! [`TypeResolver`]:
//! - object parts: scope bindings, globals, namespace resolvers
//!   ([`objects`])
//! - member parts: fields, methods and resolvers of the receiver type
//!   ([`members`])
//! - `{#is}`/`{#case}` values: operators and enum constants ([`case`])
//!
//! Candidates are keyed by label in insertion order; the first candidate
//! for a label wins.

mod case;
mod members;
mod objects;
mod snippet;

use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::debug;

use super::settings::SharedSettings;
use crate::base::{Cancelled, LineColRange, TextEdit, TextRange, TextSize};
use crate::hir::TypeResolver;
use crate::syntax::{ExpressionCursor, NodeId, PartKind, Template};

pub use case::{CompletionCaseResult, completion_case_result};
pub use snippet::{MethodSnippet, SECTION_SNIPPETS, SectionSnippet, method_snippet, strip_placeholders};

// ============================================================================
// COMPLETION ITEMS
// ============================================================================

/// Kind of completion item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompletionKind {
    Method,
    /// Virtual method contributed by a value resolver.
    Function,
    Field,
    Property,
    Keyword,
    Snippet,
    /// Template-declared name: loop alias, `let` parameter, declaration.
    Reference,
    Operator,
}

impl CompletionKind {
    /// Convert to LSP completion item kind number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            CompletionKind::Method => 2,
            CompletionKind::Function => 3,
            CompletionKind::Field => 5,
            CompletionKind::Property => 10,
            CompletionKind::Keyword => 14,
            CompletionKind::Snippet => 15,
            CompletionKind::Reference => 18,
            CompletionKind::Operator => 24,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InsertTextFormat {
    #[default]
    PlainText,
    Snippet,
}

impl InsertTextFormat {
    pub fn to_lsp(&self) -> u32 {
        match self {
            InsertTextFormat::PlainText => 1,
            InsertTextFormat::Snippet => 2,
        }
    }
}

/// A completion suggestion.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionItem {
    pub label: Arc<str>,
    pub kind: CompletionKind,
    /// Detail text (shown after label).
    pub detail: Option<Arc<str>>,
    pub documentation: Option<Arc<str>>,
    pub filter_text: Option<Arc<str>>,
    /// Sort key; candidates without one sort by label.
    pub sort_text: Option<Arc<str>>,
    pub text_edit: Option<TextEdit>,
    pub insert_text_format: InsertTextFormat,
}

impl CompletionItem {
    pub fn new(label: impl Into<Arc<str>>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            documentation: None,
            filter_text: None,
            sort_text: None,
            text_edit: None,
            insert_text_format: InsertTextFormat::PlainText,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<Arc<str>>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_documentation(mut self, doc: impl Into<Arc<str>>) -> Self {
        self.documentation = Some(doc.into());
        self
    }

    pub fn with_filter_text(mut self, text: impl Into<Arc<str>>) -> Self {
        self.filter_text = Some(text.into());
        self
    }

    pub fn with_sort_text(mut self, text: impl Into<Arc<str>>) -> Self {
        self.sort_text = Some(text.into());
        self
    }

    /// Replace `range` with `new_text` on accept.
    pub fn with_edit(mut self, range: LineColRange, new_text: impl Into<String>) -> Self {
        self.text_edit = Some(TextEdit::replace(range, new_text));
        self
    }

    pub fn with_snippet(mut self, snippet: bool) -> Self {
        self.insert_text_format = if snippet {
            InsertTextFormat::Snippet
        } else {
            InsertTextFormat::PlainText
        };
        self
    }

    /// Text inserted when the item is accepted.
    pub fn insert_text(&self) -> &str {
        self.text_edit
            .as_ref()
            .map(|edit| edit.new_text.as_str())
            .unwrap_or(&self.label)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompletionList {
    pub items: Vec<CompletionItem>,
    pub is_incomplete: bool,
}

impl CompletionList {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, label: &str) -> Option<&CompletionItem> {
        self.items.iter().find(|item| &*item.label == label)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.items.iter().map(|item| &*item.label).collect()
    }
}

/// Candidates keyed by label, first insertion wins.
#[derive(Debug, Default)]
pub(crate) struct CompletionCollector {
    items: IndexMap<Arc<str>, CompletionItem>,
}

impl CompletionCollector {
    pub(crate) fn add(&mut self, item: CompletionItem) -> bool {
        if self.items.contains_key(&item.label) {
            return false;
        }
        self.items.insert(item.label.clone(), item);
        true
    }

    pub(crate) fn finish(self) -> CompletionList {
        CompletionList {
            items: self.items.into_values().collect(),
            is_incomplete: false,
        }
    }
}

// ============================================================================
// CONTEXT CLASSIFICATION
// ============================================================================

/// What kind of candidate the cursor asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompletionContext {
    /// Root of an expression (`{|}`, `{ite|m}`, `{inject:|}`, an argument).
    ObjectPart {
        namespace: Option<SmolStr>,
        /// Part being replaced.
        part: Option<NodeId>,
        /// Node whose enclosing sections define the scope.
        anchor: NodeId,
    },
    /// Member of the part before the cursor (`{item.|}`, `{item |}`).
    MemberPart {
        parts: NodeId,
        /// Part being replaced.
        part: Option<NodeId>,
        /// Receiver part.
        receiver: NodeId,
        infix: bool,
    },
    /// Tag name right after `{#`.
    SectionTag(NodeId),
    None,
}

/// Classify `offset`. First matching rule wins.
pub fn classify(template: &Template, offset: TextSize) -> CompletionContext {
    let Some(cursor) = template.expression_cursor_at(offset) else {
        return CompletionContext::None;
    };
    match cursor {
        ExpressionCursor::Gap {
            expression,
            parts: None,
        } => CompletionContext::ObjectPart {
            namespace: None,
            part: None,
            anchor: expression,
        },
        ExpressionCursor::Part(part_id) => classify_part(template, part_id, offset),
        ExpressionCursor::Gap {
            expression,
            parts: Some(parts_id),
        } => classify_gap(template, expression, parts_id, offset),
        ExpressionCursor::SectionParameters(section) => {
            if template.char_before(offset).is_some_and(char::is_whitespace) {
                CompletionContext::ObjectPart {
                    namespace: None,
                    part: None,
                    anchor: section,
                }
            } else {
                CompletionContext::None
            }
        }
        ExpressionCursor::SectionTag(section) => CompletionContext::SectionTag(section),
    }
}

fn classify_part(template: &Template, part_id: NodeId, offset: TextSize) -> CompletionContext {
    let Some(part) = template.part(part_id) else {
        return CompletionContext::None;
    };
    let Some((parts_id, parts)) = template.parts_of(part_id) else {
        return CompletionContext::None;
    };
    let member = |infix| match template.previous_part(part_id) {
        Some(receiver) => CompletionContext::MemberPart {
            parts: parts_id,
            part: Some(part_id),
            receiver,
            infix,
        },
        None => CompletionContext::None,
    };
    match &part.kind {
        PartKind::Object { .. } => CompletionContext::ObjectPart {
            namespace: parts.namespace.clone(),
            part: Some(part_id),
            anchor: part_id,
        },
        PartKind::Property => member(false),
        PartKind::Method(call) if call.in_parameters(offset) => CompletionContext::ObjectPart {
            namespace: None,
            part: None,
            anchor: part_id,
        },
        PartKind::Method(call) => member(call.infix),
    }
}

fn classify_gap(
    template: &Template,
    expression: NodeId,
    parts_id: NodeId,
    offset: TextSize,
) -> CompletionContext {
    let Some(parts) = template.parts(parts_id) else {
        return CompletionContext::None;
    };
    let previous = template.part_before(parts_id, offset);
    match template.char_before(offset) {
        Some(':') => CompletionContext::ObjectPart {
            namespace: parts.namespace.clone(),
            part: None,
            anchor: expression,
        },
        Some('.') => match previous {
            Some(receiver) => CompletionContext::MemberPart {
                parts: parts_id,
                part: None,
                receiver,
                infix: false,
            },
            None => CompletionContext::None,
        },
        Some(' ') => {
            let Some(receiver) = previous else {
                return CompletionContext::None;
            };
            if template.part(receiver).is_some_and(|p| p.is_operator()) {
                CompletionContext::ObjectPart {
                    namespace: None,
                    part: None,
                    anchor: expression,
                }
            } else {
                CompletionContext::MemberPart {
                    parts: parts_id,
                    part: None,
                    receiver,
                    infix: true,
                }
            }
        }
        _ => CompletionContext::None,
    }
}

// ============================================================================
// ENTRY POINT
// ============================================================================

/// Completion candidates at `offset`.
///
/// An unmatched context yields an empty list. Cancellation aborts without a
/// partial result.
pub async fn completions(
    resolver: &TypeResolver<'_>,
    offset: TextSize,
    settings: &SharedSettings,
) -> Result<CompletionList, Cancelled> {
    let template = resolver.template();
    let context = classify(template, offset);
    debug!(uri = template.uri(), ?offset, ?context, "completion context");
    let mut collector = CompletionCollector::default();
    match context {
        CompletionContext::ObjectPart {
            namespace,
            part,
            anchor,
        } => {
            let range = replace_range(template, part, offset);
            let request = objects::ObjectPartRequest {
                namespace: namespace.as_deref(),
                anchor,
                offset,
                range,
            };
            objects::complete_object_part(resolver, &request, settings, &mut collector).await?;
        }
        CompletionContext::MemberPart {
            part,
            receiver,
            infix,
            ..
        } => {
            let range = replace_range(template, part, offset);
            members::complete_member_part(resolver, receiver, range, infix, settings, &mut collector)
                .await?;
        }
        CompletionContext::SectionTag(section) => {
            let Some(s) = template.section(section) else {
                return Ok(CompletionList::empty());
            };
            let range = template.line_col_range(TextRange::new(s.tag_range.start(), offset));
            objects::complete_section_tags(range, settings, &mut collector);
        }
        CompletionContext::None => {}
    }
    Ok(collector.finish())
}

fn replace_range(template: &Template, part: Option<NodeId>, offset: TextSize) -> LineColRange {
    let range = match part {
        Some(part) => template.node(part).range,
        None => TextRange::empty(offset),
    };
    template.line_col_range(range)
}
