//! Expression payloads: `{item.name}`, `{inject:bean.list.size()}`,
//! `{item.name ?: 'n/a'}`.
//!
//! An [`Expression`] owns [`Parts`]; a `Parts` is an optional namespace
//! followed by one Object part and a chain of Property/Method parts, each
//! referencing the part before it as receiver.

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::NodeId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expression {
    /// `ExpressionParts` children.
    pub parts: Vec<NodeId>,
    /// Set when the expression is the value of a section parameter.
    pub owner_parameter: Option<NodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parts {
    pub namespace: Option<SmolStr>,
    pub namespace_range: Option<TextRange>,
    /// `ExpressionPart` children in chain order.
    pub parts: Vec<NodeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Part {
    pub kind: PartKind,
    pub name: SmolStr,
    pub name_range: TextRange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PartKind {
    Object {
        /// Java type of a literal object part (`'abc'`, `12`, `true`).
        literal: Option<&'static str>,
    },
    Property,
    Method(MethodCall),
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct MethodCall {
    /// Argument expressions.
    pub args: Vec<NodeId>,
    pub open_paren: Option<TextSize>,
    pub close_paren: Option<TextSize>,
    /// Invoked with whitespace (`item.name or 'x'`).
    pub infix: bool,
    /// Name is an operator token (`?:`, `||`).
    pub operator: bool,
}

impl MethodCall {
    /// Whether `offset` falls between the parentheses of the call.
    pub fn in_parameters(&self, offset: TextSize) -> bool {
        match (self.open_paren, self.close_paren) {
            (Some(open), Some(close)) => open < offset && offset <= close,
            (Some(open), None) => open < offset,
            _ => false,
        }
    }
}

impl Part {
    pub fn is_object(&self) -> bool {
        matches!(self.kind, PartKind::Object { .. })
    }

    pub fn method(&self) -> Option<&MethodCall> {
        match &self.kind {
            PartKind::Method(call) => Some(call),
            _ => None,
        }
    }

    pub fn is_operator(&self) -> bool {
        self.method().is_some_and(|call| call.operator)
    }

    pub fn literal_type(&self) -> Option<&'static str> {
        match self.kind {
            PartKind::Object { literal } => literal,
            _ => None,
        }
    }
}

/// Java type of a literal token, `None` for identifiers.
pub fn literal_java_type(text: &str) -> Option<&'static str> {
    let first = text.chars().next()?;
    if first == '\'' || first == '"' {
        return Some("java.lang.String");
    }
    match text {
        "true" | "false" => return Some("java.lang.Boolean"),
        "null" => return Some("java.lang.Object"),
        _ => {}
    }
    if !(first.is_ascii_digit() || first == '-') {
        return None;
    }
    let last = text.chars().last()?;
    let ty = match last {
        'l' | 'L' => "java.lang.Long",
        'f' | 'F' => "java.lang.Float",
        'd' | 'D' => "java.lang.Double",
        _ if text.contains('.') => "java.lang.Double",
        _ => "java.lang.Integer",
    };
    Some(ty)
}
