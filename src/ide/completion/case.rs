//! `{#is}` / `{#case}` values of an enum subject: comparison operators and
//! enum constants.

use rustc_hash::FxHashSet;

use super::{CompletionCollector, CompletionItem, CompletionKind};
use crate::base::{Cancelled, LineColRange, TextSize};
use crate::hir::{HierarchyMembers, TypeResolver};
use crate::syntax::{CASE_OPERATORS, CaseOperator, NodeId, Template};

/// What a case block accepts at the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionCaseResult {
    /// First value of an empty block: an operator or a constant.
    AllOperatorAndField,
    /// Before a single existing value.
    AllOperator,
    /// After an operator.
    FieldOnly,
    /// Before several existing values, which only multi operators accept.
    MultiOperatorOnly,
    None,
}

/// Classify `offset` against the parameters of a case block.
pub fn completion_case_result(template: &Template, case: NodeId, offset: TextSize) -> CompletionCaseResult {
    let Some(section) = template.section(case) else {
        return CompletionCaseResult::None;
    };
    let params = &section.parameters;
    let triggered = params.iter().position(|&p| {
        let range = template.node(p).range;
        range.start() <= offset && offset <= range.end()
    });
    let (index, after) = match triggered {
        Some(index) => (index, params.len() - index - 1),
        None => {
            let index = params
                .iter()
                .filter(|&&p| template.node(p).range.end() < offset)
                .count();
            (index, params.len() - index)
        }
    };

    if index == 0 {
        return match after {
            0 => CompletionCaseResult::AllOperatorAndField,
            1 => CompletionCaseResult::AllOperator,
            _ => CompletionCaseResult::MultiOperatorOnly,
        };
    }
    let first = params
        .first()
        .and_then(|&p| template.parameter(p))
        .and_then(|p| CaseOperator::find(&p.name));
    match first {
        Some(operator) if operator.multi => CompletionCaseResult::FieldOnly,
        Some(_) if index == 1 => CompletionCaseResult::FieldOnly,
        _ => CompletionCaseResult::None,
    }
}

/// Offer case values for `case`, whose `when`/`switch` is `selector`.
///
/// Only enum subjects get candidates. Names in `existing` and values already
/// written in the block are not offered again.
pub(super) async fn complete_case_values(
    resolver: &TypeResolver<'_>,
    selector: NodeId,
    case: NodeId,
    offset: TextSize,
    range: LineColRange,
    existing: &FxHashSet<String>,
    collector: &mut CompletionCollector,
) -> Result<(), Cancelled> {
    let template = resolver.template();
    let Some(subject) = template.subject_expression(selector) else {
        return Ok(());
    };
    let Some(signature) = resolver.expression_signature(subject).await? else {
        return Ok(());
    };
    let Some(ty) = resolver.resolve_java_type(&signature).await else {
        return Ok(());
    };
    if !ty.is_enum() {
        return Ok(());
    }

    let mut existing = existing.clone();
    if let Some(section) = template.section(case) {
        existing.extend(
            section
                .parameters
                .iter()
                .filter_map(|&p| template.parameter(p))
                .map(|p| p.name.to_string()),
        );
    }

    let (operators, fields, multi_only) = match completion_case_result(template, case, offset) {
        CompletionCaseResult::AllOperatorAndField => (true, true, false),
        CompletionCaseResult::AllOperator => (true, false, false),
        CompletionCaseResult::FieldOnly => (false, true, false),
        CompletionCaseResult::MultiOperatorOnly => (true, false, true),
        CompletionCaseResult::None => return Ok(()),
    };

    if operators {
        for operator in CASE_OPERATORS.iter().filter(|op| op.for_enum) {
            if multi_only && !operator.multi {
                continue;
            }
            collector.add(
                CompletionItem::new(format!("{} : Operator", operator.name), CompletionKind::Operator)
                    .with_filter_text(operator.name)
                    .with_documentation(operator.description)
                    .with_edit(range, operator.name),
            );
        }
    }

    if fields {
        let hierarchy = resolver.hierarchy(ty).await?;
        let members = HierarchyMembers::collect(&hierarchy, resolver.filter());
        for (_, field) in &members.fields {
            if existing.contains(field.name.as_str()) {
                continue;
            }
            collector.add(
                CompletionItem::new(field.simple_signature(), CompletionKind::Field)
                    .with_filter_text(field.name.as_str())
                    .with_edit(range, field.name.as_str()),
            );
        }
    }
    Ok(())
}
