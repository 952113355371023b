//! The parsed template: node arena plus identity and position queries.

use std::sync::Arc;

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::expression::{Expression, Part, Parts};
use super::node::{Node, NodeId, NodeKind, Parameter, ParameterDeclaration};
use super::parser;
use super::section::{EACH_ALIAS, Section, SectionKind};
use crate::base::{LineCol, LineColRange, LineIndex};

const TEMPLATES_ROOT: &str = "src/main/resources/templates/";
const TAGS_DIR: &str = "templates/tags/";

/// A parsed Qute template.
///
/// Owns its text and every node. A document change produces a new
/// `Template`; nodes are never patched in place.
#[derive(Clone, Debug)]
pub struct Template {
    uri: Arc<str>,
    project_uri: Option<Arc<str>>,
    text: Arc<str>,
    line_index: LineIndex,
    nodes: Vec<Node>,
    children: Vec<NodeId>,
}

/// Where an offset sits relative to expressions and section start tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpressionCursor {
    /// Inside an expression part.
    Part(NodeId),
    /// Inside an expression but not on any part (after `.`, `:`, a space).
    Gap {
        expression: NodeId,
        parts: Option<NodeId>,
    },
    /// Inside a section start tag, outside any parameter expression.
    SectionParameters(NodeId),
    /// On the tag name right after `{#`.
    SectionTag(NodeId),
}

impl Template {
    pub fn parse(
        uri: impl Into<Arc<str>>,
        text: impl Into<Arc<str>>,
        project_uri: Option<Arc<str>>,
    ) -> Self {
        let text = text.into();
        let parsed = parser::parse(&text);
        Self {
            uri: uri.into(),
            project_uri,
            line_index: LineIndex::new(&text),
            text,
            nodes: parsed.nodes,
            children: parsed.children,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn project_uri(&self) -> Option<&str> {
        self.project_uri.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// Top-level nodes.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index() as usize]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId::new(i as u32), node))
    }

    /// Template id used by checked templates: the path below
    /// `src/main/resources/templates/` without extension.
    pub fn template_id(&self) -> Option<SmolStr> {
        let path = &self.uri[self.uri.find(TEMPLATES_ROOT)? + TEMPLATES_ROOT.len()..];
        let id = match path.rfind('.') {
            Some(dot) if !path[dot..].contains('/') => &path[..dot],
            _ => path,
        };
        Some(SmolStr::new(id))
    }

    /// Templates below `templates/tags/` define user tags.
    pub fn is_user_tag(&self) -> bool {
        self.uri.contains(TAGS_DIR)
    }

    /// Convert an editor position, `None` when it lies outside the text.
    pub fn offset_at(&self, pos: LineCol) -> Option<TextSize> {
        self.line_index.offset(pos)
    }

    pub fn line_col_range(&self, range: TextRange) -> LineColRange {
        self.line_index.range(range)
    }

    pub fn text_at(&self, range: TextRange) -> &str {
        &self.text[range]
    }

    /// Character right before `offset`.
    pub fn char_before(&self, offset: TextSize) -> Option<char> {
        let offset = usize::from(offset);
        self.text.get(..offset)?.chars().next_back()
    }

    // ========================================================================
    // TYPED ACCESSORS
    // ========================================================================

    pub fn section(&self, id: NodeId) -> Option<&Section> {
        match &self.node(id).kind {
            NodeKind::Section(section) => Some(section),
            _ => None,
        }
    }

    pub fn expression(&self, id: NodeId) -> Option<&Expression> {
        match &self.node(id).kind {
            NodeKind::Expression(expression) => Some(expression),
            _ => None,
        }
    }

    pub fn parts(&self, id: NodeId) -> Option<&Parts> {
        match &self.node(id).kind {
            NodeKind::ExpressionParts(parts) => Some(parts),
            _ => None,
        }
    }

    pub fn part(&self, id: NodeId) -> Option<&Part> {
        match &self.node(id).kind {
            NodeKind::ExpressionPart(part) => Some(part),
            _ => None,
        }
    }

    pub fn parameter(&self, id: NodeId) -> Option<&Parameter> {
        match &self.node(id).kind {
            NodeKind::Parameter(parameter) => Some(parameter),
            _ => None,
        }
    }

    pub fn parameter_declarations(&self) -> impl Iterator<Item = (NodeId, &ParameterDeclaration)> {
        self.nodes().filter_map(|(id, node)| match &node.kind {
            NodeKind::ParameterDeclaration(decl) => Some((id, decl)),
            _ => None,
        })
    }

    /// Every expression node, including section parameter values and
    /// method arguments.
    pub fn expressions(&self) -> impl Iterator<Item = (NodeId, &Expression)> {
        self.nodes().filter_map(|(id, node)| match &node.kind {
            NodeKind::Expression(expression) => Some((id, expression)),
            _ => None,
        })
    }

    pub fn sections(&self) -> impl Iterator<Item = (NodeId, &Section)> {
        self.nodes().filter_map(|(id, node)| match &node.kind {
            NodeKind::Section(section) => Some((id, section)),
            _ => None,
        })
    }

    // ========================================================================
    // STRUCTURE
    // ========================================================================

    /// `Parts` node owning a part.
    pub fn parts_of(&self, part: NodeId) -> Option<(NodeId, &Parts)> {
        let parent = self.node(part).parent?;
        self.parts(parent).map(|parts| (parent, parts))
    }

    /// The receiver of a property or method part.
    pub fn previous_part(&self, part: NodeId) -> Option<NodeId> {
        let (_, parts) = self.parts_of(part)?;
        let index = parts.parts.iter().position(|&p| p == part)?;
        index.checked_sub(1).map(|i| parts.parts[i])
    }

    /// Last part of `parts` ending at or before `offset`.
    pub fn part_before(&self, parts: NodeId, offset: TextSize) -> Option<NodeId> {
        self.parts(parts)?
            .parts
            .iter()
            .rev()
            .copied()
            .find(|&p| self.node(p).range.end() <= offset)
    }

    /// Outermost expression containing `node` (method arguments and infix
    /// operands belong to the expression of their call).
    pub fn root_expression(&self, node: NodeId) -> Option<NodeId> {
        let mut current = Some(node);
        let mut root = None;
        while let Some(id) = current {
            match &self.node(id).kind {
                NodeKind::Expression(_) => root = Some(id),
                NodeKind::ExpressionParts(_) | NodeKind::ExpressionPart(_) => {}
                _ => break,
            }
            current = self.node(id).parent;
        }
        root
    }

    /// Section whose start tag declares the parameter owning `node`, if any.
    pub fn owner_section(&self, node: NodeId) -> Option<NodeId> {
        let expression = self.root_expression(node)?;
        let parameter = self.expression(expression)?.owner_parameter?;
        self.node(parameter).parent
    }

    /// Enclosing sections of `node`, innermost first.
    ///
    /// A section's own parameters are not in its scope, so for a node inside
    /// a start tag the walk begins at the owning section's parent.
    pub fn scope_sections(&self, node: NodeId) -> Vec<NodeId> {
        let start = match &self.node(node).kind {
            NodeKind::Section(_) | NodeKind::Parameter(_) => self.parent_section_of(node),
            _ => match self.owner_section(node) {
                Some(owner) => self.parent_section_of(owner),
                None => self.parent_section_of(node),
            },
        };
        let mut sections = Vec::new();
        let mut current = start;
        while let Some(id) = current {
            sections.push(id);
            current = self.parent_section_of(id);
        }
        sections
    }

    fn parent_section_of(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.node(node).parent;
        while let Some(id) = current {
            if self.section(id).is_some() {
                return Some(id);
            }
            current = self.node(id).parent;
        }
        None
    }

    /// Alias bound by a loop section and the parameter declaring it.
    pub fn loop_alias(&self, section: NodeId) -> Option<(SmolStr, Option<NodeId>)> {
        let s = self.section(section)?;
        match s.kind {
            SectionKind::For => {
                let first = *s.parameters.first()?;
                Some((self.parameter(first)?.name.clone(), Some(first)))
            }
            SectionKind::Each => Some((SmolStr::new_static(EACH_ALIAS), None)),
            _ => None,
        }
    }

    /// Expression producing the values iterated by a loop section.
    pub fn loop_iterable(&self, section: NodeId) -> Option<NodeId> {
        let s = self.section(section)?;
        let param = match s.kind {
            SectionKind::For => s
                .parameters
                .iter()
                .skip_while(|&&p| self.parameter(p).is_none_or(|p| p.name != "in"))
                .nth(1)?,
            SectionKind::Each => s.parameters.first()?,
            _ => return None,
        };
        self.parameter(*param)?.expression
    }

    /// Subject expression of a `with`, `when` or `switch` section.
    pub fn subject_expression(&self, section: NodeId) -> Option<NodeId> {
        let s = self.section(section)?;
        match s.kind {
            SectionKind::With | SectionKind::When | SectionKind::Switch => {
                self.parameter(*s.parameters.first()?)?.expression
            }
            _ => None,
        }
    }

    // ========================================================================
    // POSITION
    // ========================================================================

    /// Classify `offset` against expressions and section start tags.
    ///
    /// Returns `None` in plain text.
    pub fn expression_cursor_at(&self, offset: TextSize) -> Option<ExpressionCursor> {
        self.cursor_in(&self.children, offset)
    }

    fn cursor_in(&self, nodes: &[NodeId], offset: TextSize) -> Option<ExpressionCursor> {
        for &id in nodes {
            let node = self.node(id);
            match &node.kind {
                NodeKind::Expression(_) if contains_inclusive(node.range, offset) => {
                    return Some(self.cursor_in_expression(id, offset));
                }
                NodeKind::Section(section) => {
                    if section.in_start_tag(offset) {
                        return Some(self.cursor_in_start_tag(id, section, offset));
                    }
                    if node.range.contains(offset) {
                        // `{#else if}` conditions live in the section body.
                        if let Some(expression) = self.parameter_expression_at(section, offset) {
                            return Some(self.cursor_in_expression(expression, offset));
                        }
                        if let Some(found) = self.cursor_in(&section.children, offset) {
                            return Some(found);
                        }
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn cursor_in_start_tag(&self, id: NodeId, section: &Section, offset: TextSize) -> ExpressionCursor {
        if offset <= section.tag_range.end() {
            return ExpressionCursor::SectionTag(id);
        }
        match self.parameter_expression_at(section, offset) {
            Some(expression) => self.cursor_in_expression(expression, offset),
            None => ExpressionCursor::SectionParameters(id),
        }
    }

    fn parameter_expression_at(&self, section: &Section, offset: TextSize) -> Option<NodeId> {
        section
            .parameters
            .iter()
            .filter_map(|&param| self.parameter(param)?.expression)
            .find(|&expression| contains_inclusive(self.node(expression).range, offset))
    }

    fn cursor_in_expression(&self, expression: NodeId, offset: TextSize) -> ExpressionCursor {
        let parts_ids = self
            .expression(expression)
            .map(|e| e.parts.as_slice())
            .unwrap_or_default();

        for &parts_id in parts_ids {
            let Some(parts) = self.parts(parts_id) else { continue };
            for &part_id in &parts.parts {
                if let Some(call) = self.part(part_id).and_then(Part::method) {
                    for &arg in &call.args {
                        if contains_inclusive(self.node(arg).range, offset) {
                            return self.cursor_in_expression(arg, offset);
                        }
                    }
                }
                if contains_inclusive(self.node(part_id).range, offset) {
                    return ExpressionCursor::Part(part_id);
                }
            }
        }

        let parts = parts_ids
            .iter()
            .rev()
            .copied()
            .find(|&p| self.node(p).range.start() <= offset);
        ExpressionCursor::Gap { expression, parts }
    }
}

fn contains_inclusive(range: TextRange, offset: TextSize) -> bool {
    range.start() <= offset && offset <= range.end()
}
