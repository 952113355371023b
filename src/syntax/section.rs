//! Section payloads: `{#for}`, `{#if}`, `{#let}`, `{#when}`/`{#is}`, user tags.

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::NodeId;

/// Closed set of section kinds. Unknown tags are user tags ([`SectionKind::Custom`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SectionKind {
    For,
    Each,
    If,
    Let,
    Set,
    With,
    When,
    Switch,
    /// `{#is}` / `{#case}` blocks of a `when`/`switch`.
    Case,
    Custom,
}

impl SectionKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "for" => SectionKind::For,
            "each" => SectionKind::Each,
            "if" => SectionKind::If,
            "let" => SectionKind::Let,
            "set" => SectionKind::Set,
            "with" => SectionKind::With,
            "when" => SectionKind::When,
            "switch" => SectionKind::Switch,
            "is" | "case" => SectionKind::Case,
            _ => SectionKind::Custom,
        }
    }

    pub fn is_loop(self) -> bool {
        matches!(self, SectionKind::For | SectionKind::Each)
    }

    pub fn is_case_selector(self) -> bool {
        matches!(self, SectionKind::When | SectionKind::Switch)
    }

    /// Tags that split this section into blocks instead of opening a child.
    pub fn block_labels(self) -> &'static [&'static str] {
        match self {
            SectionKind::For | SectionKind::Each | SectionKind::If => &["else"],
            SectionKind::When | SectionKind::Switch => &["is", "case", "else"],
            SectionKind::Case => &["is", "case", "else"],
            _ => &[],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub tag: SmolStr,
    pub tag_range: TextRange,
    /// The whole `{#tag ...}` start tag.
    pub start_tag: TextRange,
    /// Offset right after the last parameter character (before `}` or `/}`).
    pub params_end: TextSize,
    /// `Parameter` children.
    pub parameters: Vec<NodeId>,
    pub children: Vec<NodeId>,
    /// Start of the `{#else}` block of a loop or `if`.
    pub else_offset: Option<TextSize>,
    pub end_tag: Option<TextRange>,
    pub self_closing: bool,
}

impl Section {
    /// Whether `offset` lies inside the start tag, after `{#`.
    pub fn in_start_tag(&self, offset: TextSize) -> bool {
        self.tag_range.start() <= offset && offset <= self.params_end
    }

    pub fn is_in_else_block(&self, offset: TextSize) -> bool {
        self.else_offset.is_some_and(|start| offset >= start)
    }

    /// Metadata names the section exposes to its body.
    pub fn metadata(&self) -> &'static [SectionMetadata] {
        if self.kind.is_loop() { LOOP_METADATA } else { &[] }
    }
}

/// A named value a section exposes to nested scopes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionMetadata {
    pub name: &'static str,
    pub java_type: &'static str,
    pub description: &'static str,
}

pub const LOOP_METADATA: &[SectionMetadata] = &[
    SectionMetadata { name: "count", java_type: "java.lang.Integer", description: "1-based index" },
    SectionMetadata { name: "index", java_type: "java.lang.Integer", description: "zero-based index" },
    SectionMetadata { name: "indexParity", java_type: "java.lang.String", description: "outputs `odd` or `even` based on the zero-based index value" },
    SectionMetadata { name: "hasNext", java_type: "java.lang.Boolean", description: "`true` if the iteration has more elements" },
    SectionMetadata { name: "isOdd", java_type: "java.lang.Boolean", description: "`true` if the zero-based index is odd" },
    SectionMetadata { name: "odd", java_type: "java.lang.Boolean", description: "`true` if the zero-based index is odd" },
    SectionMetadata { name: "isEven", java_type: "java.lang.Boolean", description: "`true` if the zero-based index is even" },
    SectionMetadata { name: "even", java_type: "java.lang.Boolean", description: "`true` if the zero-based index is even" },
    SectionMetadata { name: "isFirst", java_type: "java.lang.Boolean", description: "`true` if the current iteration is the first one" },
    SectionMetadata { name: "first", java_type: "java.lang.Boolean", description: "`true` if the current iteration is the first one" },
    SectionMetadata { name: "isLast", java_type: "java.lang.Boolean", description: "`true` if the current iteration is the last one" },
    SectionMetadata { name: "last", java_type: "java.lang.Boolean", description: "`true` if the current iteration is the last one" },
];

/// Alias bound by `{#each}`.
pub const EACH_ALIAS: &str = "it";

/// Comparison operator usable as the first parameter of a case block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaseOperator {
    pub name: &'static str,
    /// Accepts several values (`{#is in RED GREEN}`).
    pub multi: bool,
    /// Meaningful for enum subjects.
    pub for_enum: bool,
    pub description: &'static str,
}

pub const CASE_OPERATORS: &[CaseOperator] = &[
    CaseOperator { name: "not", multi: false, for_enum: true, description: "Is not equal to" },
    CaseOperator { name: "ne", multi: false, for_enum: true, description: "Is not equal to" },
    CaseOperator { name: "!=", multi: false, for_enum: true, description: "Is not equal to" },
    CaseOperator { name: "gt", multi: false, for_enum: false, description: "Is greater than" },
    CaseOperator { name: ">", multi: false, for_enum: false, description: "Is greater than" },
    CaseOperator { name: "ge", multi: false, for_enum: false, description: "Is greater than or equal to" },
    CaseOperator { name: ">=", multi: false, for_enum: false, description: "Is greater than or equal to" },
    CaseOperator { name: "lt", multi: false, for_enum: false, description: "Is less than" },
    CaseOperator { name: "<", multi: false, for_enum: false, description: "Is less than" },
    CaseOperator { name: "le", multi: false, for_enum: false, description: "Is less than or equal to" },
    CaseOperator { name: "<=", multi: false, for_enum: false, description: "Is less than or equal to" },
    CaseOperator { name: "in", multi: true, for_enum: true, description: "Is in" },
    CaseOperator { name: "ni", multi: true, for_enum: true, description: "Is not in" },
    CaseOperator { name: "!in", multi: true, for_enum: true, description: "Is not in" },
];

impl CaseOperator {
    pub fn find(name: &str) -> Option<&'static CaseOperator> {
        CASE_OPERATORS.iter().find(|op| op.name == name)
    }
}
