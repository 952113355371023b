//! Diagnostics — template validation against the Java data model.
//!
//! Every expression is walked part by part: the object part must be bound,
//! each following part must be a member of its receiver's type. The walk
//! stops at the first part whose type is unknown, so one mistake yields one
//! diagnostic.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tracing::debug;

use super::scope::TypeResolver;
use crate::base::{Cancelled, LineColRange, check_cancelled};
use crate::syntax::{NodeId, PartKind, SectionKind};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub range: LineColRange,
    pub severity: Severity,
    /// One of [`codes`].
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    /// Payload consumed by code actions.
    pub data: Option<serde_json::Value>,
}

impl Diagnostic {
    pub fn error(range: LineColRange, message: impl Into<Arc<str>>) -> Self {
        Self {
            range,
            severity: Severity::Error,
            code: None,
            message: message.into(),
            data: None,
        }
    }

    pub fn warning(range: LineColRange, message: impl Into<Arc<str>>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(range, message)
        }
    }

    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}

/// Data attached to an [`codes::UNKNOWN_PROPERTY`] diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnknownPropertyData {
    pub property: SmolStr,
    /// Receiver type signature.
    pub signature: SmolStr,
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

pub mod codes {
    /// Object part bound to nothing.
    pub const UNDEFINED_VARIABLE: &str = "UndefinedVariable";
    /// Property part not found on its receiver type.
    pub const UNKNOWN_PROPERTY: &str = "UnknownProperty";
    /// Method part not found on its receiver type.
    pub const UNKNOWN_METHOD: &str = "UnknownMethod";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during validation.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count()
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

// ============================================================================
// TEMPLATE VALIDATION
// ============================================================================

/// Validate every expression of the resolver's template.
pub async fn check_template(resolver: &TypeResolver<'_>) -> Result<Vec<Diagnostic>, Cancelled> {
    let template = resolver.template();
    let mut collector = DiagnosticCollector::new();
    let expressions: Vec<NodeId> = template.expressions().map(|(id, _)| id).collect();
    for expression in expressions {
        check_cancelled(resolver.cancel())?;
        let in_case = template
            .owner_section(expression)
            .and_then(|s| template.section(s))
            .is_some_and(|s| s.kind == SectionKind::Case);
        if in_case {
            continue;
        }
        check_expression(resolver, expression, &mut collector).await?;
    }
    debug!(
        uri = template.uri(),
        errors = collector.error_count(),
        warnings = collector.warning_count(),
        "template validated"
    );
    Ok(collector.take())
}

async fn check_expression(
    resolver: &TypeResolver<'_>,
    expression: NodeId,
    collector: &mut DiagnosticCollector,
) -> Result<(), Cancelled> {
    let template = resolver.template();
    let Some(expr) = template.expression(expression) else {
        return Ok(());
    };
    for &parts_id in &expr.parts {
        let Some(parts) = template.parts(parts_id) else { continue };
        for &part_id in &parts.parts {
            let Some(part) = template.part(part_id) else { break };
            let range = template.line_col_range(part.name_range);
            match &part.kind {
                PartKind::Object { literal: Some(_) } => {}
                PartKind::Object { literal: None } => {
                    if parts.namespace.is_some() {
                        break;
                    }
                    if resolver.resolve_binding(&part.name, part_id).await?.is_none() {
                        if !template.is_user_tag() {
                            collector.add(
                                Diagnostic::warning(
                                    range,
                                    format!("`{}` cannot be resolved to an object.", part.name),
                                )
                                .with_code(codes::UNDEFINED_VARIABLE),
                            );
                        }
                        break;
                    }
                }
                PartKind::Method(call) if call.operator => break,
                PartKind::Property | PartKind::Method(_) => {
                    let Some(receiver) = resolver.receiver_type(part_id).await? else {
                        break;
                    };
                    let is_method = matches!(part.kind, PartKind::Method(_));
                    if resolver.find_member(receiver.clone(), &part.name, is_method).await?.is_some() {
                        continue;
                    }
                    let diagnostic = if is_method {
                        Diagnostic::error(
                            range,
                            format!(
                                "`{}` cannot be resolved or is not a method of `{}` Java type.",
                                part.name, receiver.signature
                            ),
                        )
                        .with_code(codes::UNKNOWN_METHOD)
                    } else {
                        let data = UnknownPropertyData {
                            property: part.name.clone(),
                            signature: receiver.signature.clone(),
                        };
                        let diagnostic = Diagnostic::error(
                            range,
                            format!(
                                "`{}` cannot be resolved or is not a field of `{}` Java type.",
                                part.name, receiver.signature
                            ),
                        )
                        .with_code(codes::UNKNOWN_PROPERTY);
                        match serde_json::to_value(&data) {
                            Ok(value) => diagnostic.with_data(value),
                            Err(_) => diagnostic,
                        }
                    };
                    collector.add(diagnostic);
                    break;
                }
            }
        }
    }
    Ok(())
}
