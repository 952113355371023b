//! Qute template syntax: tolerant parser and node model.
//!
//! ## Design
//!
//! Nodes live in an arena owned by [`Template`] and refer to each other by
//! [`NodeId`]. Parent links are plain ids, so the tree has a single owner
//! and can be shared read-only across requests. Each node category is a
//! closed enum ([`NodeKind`], [`SectionKind`], [`PartKind`]) matched
//! exhaustively at traversal sites.

mod expression;
mod lexer;
mod node;
mod parser;
mod section;
mod template;

pub use expression::{Expression, MethodCall, Part, PartKind, Parts, literal_java_type};
pub use node::{Node, NodeId, NodeKind, Parameter, ParameterDeclaration};
pub use section::{
    CASE_OPERATORS, CaseOperator, EACH_ALIAS, LOOP_METADATA, Section, SectionKind, SectionMetadata,
};
pub use template::{ExpressionCursor, Template};
