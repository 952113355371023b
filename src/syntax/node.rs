//! Node arena entries.

use std::fmt;

use smol_str::SmolStr;
use text_size::TextRange;

use super::expression::{Expression, Part, Parts};
use super::section::Section;

/// Index of a node in its [`Template`](super::Template) arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub range: TextRange,
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Text,
    Section(Section),
    Expression(Expression),
    ExpressionParts(Parts),
    ExpressionPart(Part),
    Parameter(Parameter),
    ParameterDeclaration(ParameterDeclaration),
}

/// A section parameter: `item`, `in`, `name=item.name`, `item.active??`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub name: SmolStr,
    pub name_range: TextRange,
    pub value: Option<SmolStr>,
    pub value_range: Option<TextRange>,
    /// Written with a `??` suffix.
    pub optional: bool,
    /// Expression parsed from the value, or from the name when the
    /// parameter itself is an expression (`{#if item.active}`).
    pub expression: Option<NodeId>,
}

impl Parameter {
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

/// `{@org.acme.Item item}`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterDeclaration {
    pub java_type: SmolStr,
    pub java_type_range: TextRange,
    pub alias: Option<SmolStr>,
    pub alias_range: Option<TextRange>,
}
