//! Tolerant template parser.
//!
//! Never fails: unterminated tags run to the next `{` or to the end of the
//! text, unmatched end tags are ignored, and sections left open at the end
//! of the text are closed there. Expression content goes through the
//! [`lexer`](super::lexer).

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::expression::{Expression, MethodCall, Part, PartKind, Parts, literal_java_type};
use super::lexer::{ExprToken, Token, tokenize};
use super::node::{Node, NodeId, NodeKind, Parameter, ParameterDeclaration};
use super::section::{CaseOperator, Section, SectionKind};

/// User tags whose parameters name templates or slots, not expressions.
const NON_EXPRESSION_TAGS: &[&str] = &["include", "insert", "fragment", "capture"];

/// Operators that may appear as standalone `{#if}` parameters.
const IF_OPERATORS: &[&str] = &[
    "!", "&&", "||", "and", "or", "==", "eq", "is", "!=", "ne", ">", "gt", ">=", "ge", "<", "lt",
    "<=", "le",
];

pub(super) struct Parsed {
    pub nodes: Vec<Node>,
    pub children: Vec<NodeId>,
}

pub(super) fn parse(text: &str) -> Parsed {
    let mut parser = Parser {
        text,
        nodes: Vec::new(),
        children: Vec::new(),
        stack: Vec::new(),
    };
    parser.run();
    Parsed {
        nodes: parser.nodes,
        children: parser.children,
    }
}

struct Parser<'t> {
    text: &'t str,
    nodes: Vec<Node>,
    children: Vec<NodeId>,
    /// Open sections, innermost last.
    stack: Vec<NodeId>,
}

fn size(offset: usize) -> TextSize {
    TextSize::from(offset as u32)
}

fn range(start: usize, end: usize) -> TextRange {
    TextRange::new(size(start), size(end))
}

impl<'t> Parser<'t> {
    // ========================================================================
    // TEMPLATE SCANNER
    // ========================================================================

    fn run(&mut self) {
        let bytes = self.text.as_bytes();
        let len = bytes.len();
        let mut pos = 0;
        let mut text_start = 0;

        while pos < len {
            if bytes[pos] == b'\\' && bytes.get(pos + 1) == Some(&b'{') {
                pos += 2;
                continue;
            }
            if bytes[pos] != b'{' {
                pos += 1;
                continue;
            }
            let next = bytes.get(pos + 1).copied();
            if next.is_some_and(|c| c.is_ascii_whitespace()) {
                pos += 1;
                continue;
            }

            self.flush_text(text_start, pos);
            let end = match next {
                Some(b'!') => self.comment(pos),
                Some(b'#') => self.section_start(pos),
                Some(b'/') => self.section_end(pos),
                Some(b'@') => self.parameter_declaration(pos),
                _ => self.expression(pos),
            };
            pos = end;
            text_start = end;
        }
        self.flush_text(text_start, len);

        while let Some(open) = self.stack.pop() {
            self.close(open, size(len), None);
        }
    }

    fn alloc(&mut self, range: TextRange, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(Node { range, parent, kind });
        id
    }

    fn current(&self) -> Option<NodeId> {
        self.stack.last().copied()
    }

    fn attach(&mut self, id: NodeId) {
        match self.current() {
            Some(parent) => {
                if let NodeKind::Section(section) = &mut self.nodes[parent.index() as usize].kind {
                    section.children.push(id);
                }
            }
            None => self.children.push(id),
        }
    }

    fn section_mut(&mut self, id: NodeId) -> Option<&mut Section> {
        match &mut self.nodes[id.index() as usize].kind {
            NodeKind::Section(section) => Some(section),
            _ => None,
        }
    }

    fn section_kind(&self, id: NodeId) -> Option<SectionKind> {
        match &self.nodes[id.index() as usize].kind {
            NodeKind::Section(section) => Some(section.kind),
            _ => None,
        }
    }

    fn flush_text(&mut self, start: usize, end: usize) {
        if start < end {
            let id = self.alloc(range(start, end), self.current(), NodeKind::Text);
            self.attach(id);
        }
    }

    /// Find the end of a tag opened before `from`.
    ///
    /// Returns `(content_end, tag_end)`: the offset of `}` and the offset
    /// after it. An unterminated tag ends before the next `{`.
    fn find_tag_end(&self, from: usize) -> (usize, usize) {
        let bytes = self.text.as_bytes();
        let mut quote: Option<u8> = None;
        let mut i = from;
        while i < bytes.len() {
            let c = bytes[i];
            match quote {
                Some(q) if c == q || c == b'\n' => quote = None,
                Some(_) => {}
                None => match c {
                    b'\'' | b'"' => quote = Some(c),
                    b'}' => return (i, i + 1),
                    b'{' => return (i, i),
                    _ => {}
                },
            }
            i += 1;
        }
        (bytes.len(), bytes.len())
    }

    fn comment(&mut self, pos: usize) -> usize {
        let end = self.text[pos + 2..]
            .find("!}")
            .map(|i| pos + 2 + i + 2)
            .unwrap_or(self.text.len());
        let id = self.alloc(range(pos, end), self.current(), NodeKind::Text);
        self.attach(id);
        end
    }

    fn expression(&mut self, pos: usize) -> usize {
        let (content_end, tag_end) = self.find_tag_end(pos + 1);
        let text = self.text;
        let content = &text[pos + 1..content_end];
        let id = self.parse_expression(content, pos + 1, self.current(), None);
        self.attach(id);
        tag_end
    }

    fn parameter_declaration(&mut self, pos: usize) -> usize {
        let text = self.text;
        let (content_end, tag_end) = self.find_tag_end(pos + 2);
        let content = &text[pos + 2..content_end];
        let lead = content.len() - content.trim_start().len();
        let body = content.trim();
        let body_start = pos + 2 + lead;

        // The type may carry generics with spaces: split on the last
        // whitespace outside angle brackets.
        let mut depth = 0i32;
        let mut split = None;
        for (i, c) in body.char_indices() {
            match c {
                '<' => depth += 1,
                '>' => depth -= 1,
                c if c.is_whitespace() && depth <= 0 => split = Some(i),
                _ => {}
            }
        }
        let (java_type, java_type_range, alias, alias_range) = match split {
            Some(i) => {
                let ty = body[..i].trim_end();
                let raw_alias = body[i..].trim_start();
                let alias_start = body_start + body.len() - raw_alias.len();
                let alias = raw_alias.split('=').next().unwrap_or(raw_alias).trim_end();
                (
                    ty,
                    range(body_start, body_start + ty.len()),
                    Some(SmolStr::new(alias)),
                    Some(range(alias_start, alias_start + alias.len())),
                )
            }
            None => (body, range(body_start, body_start + body.len()), None, None),
        };

        let declaration = ParameterDeclaration {
            java_type: SmolStr::new(java_type),
            java_type_range,
            alias,
            alias_range,
        };
        let id = self.alloc(
            range(pos, tag_end),
            self.current(),
            NodeKind::ParameterDeclaration(declaration),
        );
        self.attach(id);
        tag_end
    }

    // ========================================================================
    // SECTIONS
    // ========================================================================

    fn section_start(&mut self, pos: usize) -> usize {
        let text = self.text;
        let (content_end, tag_end) = self.find_tag_end(pos + 2);
        let content = &text[pos + 2..content_end];
        let trimmed = content.trim_end();
        let self_closing = trimmed.ends_with('/');
        let params_end = if self_closing {
            pos + 2 + trimmed.len() - 1
        } else {
            content_end
        };

        let tag_len = content
            .find(|c: char| c.is_whitespace() || c == '/')
            .unwrap_or(content.len());
        let tag = &content[..tag_len];
        let tag_range = range(pos + 2, pos + 2 + tag_len);

        let mut kind = SectionKind::from_tag(tag);
        if let Some(top) = self.current() {
            let top_kind = self.section_kind(top);
            let is_label = top_kind.is_some_and(|k| k.block_labels().contains(&tag));
            match top_kind {
                Some(SectionKind::For | SectionKind::Each | SectionKind::If) if is_label => {
                    if let Some(section) = self.section_mut(top) {
                        section.else_offset.get_or_insert(size(pos));
                    }
                    if top_kind == Some(SectionKind::If) {
                        self.else_if_condition(top, pos + 2 + tag_len, params_end);
                    }
                    return tag_end;
                }
                Some(SectionKind::Case) if is_label => {
                    self.stack.pop();
                    self.close(top, size(pos), None);
                    kind = SectionKind::Case;
                }
                Some(SectionKind::When | SectionKind::Switch) if is_label => {
                    kind = SectionKind::Case;
                }
                _ => {}
            }
        }

        let section = Section {
            kind,
            tag: SmolStr::new(tag),
            tag_range,
            start_tag: range(pos, tag_end),
            params_end: size(params_end.max(pos + 2 + tag_len)),
            parameters: Vec::new(),
            children: Vec::new(),
            else_offset: None,
            end_tag: None,
            self_closing,
        };
        let id = self.alloc(range(pos, tag_end), self.current(), NodeKind::Section(section));
        self.attach(id);

        let params_start = pos + 2 + tag_len;
        if params_start < params_end {
            self.parse_parameters(id, kind, tag, params_start, params_end);
        }

        if !self_closing {
            self.stack.push(id);
        }
        tag_end
    }

    /// `{#else if cond}`: the condition joins the parameters of the
    /// enclosing `if`.
    fn else_if_condition(&mut self, section: NodeId, start: usize, end: usize) {
        let text = self.text;
        let rest = text.get(start..end).unwrap_or_default();
        let lead = rest.len() - rest.trim_start().len();
        let Some(condition) = rest[lead..].strip_prefix("if") else {
            return;
        };
        if condition.starts_with(char::is_whitespace) {
            self.parse_parameters(section, SectionKind::If, "if", start + lead + 2, end);
        }
    }

    fn section_end(&mut self, pos: usize) -> usize {
        let text = self.text;
        let (content_end, tag_end) = self.find_tag_end(pos + 2);
        let name = text[pos + 2..content_end].trim();

        let target = if name.is_empty() {
            let top = self.stack.len().checked_sub(1);
            // `{/}` inside a case block closes the enclosing when/switch.
            match top {
                Some(i) if i > 0 && self.section_kind(self.stack[i]) == Some(SectionKind::Case) => {
                    Some(i - 1)
                }
                other => other,
            }
        } else {
            self.stack.iter().rposition(|&id| {
                matches!(&self.nodes[id.index() as usize].kind,
                    NodeKind::Section(section) if section.tag == name)
            })
        };

        let Some(target) = target else {
            // Unmatched end tag: keep it as text.
            let id = self.alloc(range(pos, tag_end), self.current(), NodeKind::Text);
            self.attach(id);
            return tag_end;
        };

        while self.stack.len() > target + 1 {
            if let Some(inner) = self.stack.pop() {
                self.close(inner, size(pos), None);
            }
        }
        if let Some(section) = self.stack.pop() {
            self.close(section, size(tag_end), Some(range(pos, tag_end)));
        }
        tag_end
    }

    fn close(&mut self, id: NodeId, end: TextSize, end_tag: Option<TextRange>) {
        let node = &mut self.nodes[id.index() as usize];
        let start = node.range.start();
        node.range = TextRange::new(start, end.max(start));
        if let NodeKind::Section(section) = &mut node.kind {
            section.end_tag = end_tag;
        }
    }

    // ========================================================================
    // PARAMETERS
    // ========================================================================

    fn parse_parameters(
        &mut self,
        section: NodeId,
        kind: SectionKind,
        tag: &str,
        start: usize,
        end: usize,
    ) {
        let text = self.text;
        let raw_params = split_parameters(&text[start..end], start);
        let mut previous: Option<&str> = None;
        let mut ids = Vec::with_capacity(raw_params.len());

        for (index, (raw, raw_start)) in raw_params.iter().enumerate() {
            let raw = *raw;
            let raw_start = *raw_start;
            let (name, value) = match assignment_index(raw) {
                Some(eq) => (&raw[..eq], Some((&raw[eq + 1..], raw_start + eq + 1))),
                None => (raw, None),
            };
            let optional = name.ends_with("??");
            let name = name.strip_suffix("??").unwrap_or(name);
            let name_range = range(raw_start, raw_start + name.len());

            let is_expression = match kind {
                _ if value.is_some() => false,
                SectionKind::For => previous == Some("in"),
                SectionKind::Each | SectionKind::With | SectionKind::When | SectionKind::Switch => {
                    index == 0
                }
                SectionKind::If => !IF_OPERATORS.contains(&name),
                SectionKind::Case => CaseOperator::find(name).is_none(),
                SectionKind::Custom => !NON_EXPRESSION_TAGS.contains(&tag),
                SectionKind::Let | SectionKind::Set => false,
            };

            let parameter = Parameter {
                name: SmolStr::new(name),
                name_range,
                value: value.map(|(v, _)| SmolStr::new(v)),
                value_range: value.map(|(v, s)| range(s, s + v.len())),
                optional,
                expression: None,
            };
            let param_range = range(raw_start, raw_start + raw.len());
            let id = self.alloc(param_range, Some(section), NodeKind::Parameter(parameter));

            let expression = match value {
                Some((v, s)) if !v.is_empty() => Some(self.parse_expression(v, s, Some(id), Some(id))),
                _ if is_expression && !name.is_empty() => {
                    Some(self.parse_expression(name, raw_start, Some(id), Some(id)))
                }
                _ => None,
            };
            if let NodeKind::Parameter(p) = &mut self.nodes[id.index() as usize].kind {
                p.expression = expression;
            }
            ids.push(id);
            previous = Some(name);
        }

        if let Some(section) = self.section_mut(section) {
            section.parameters.extend(ids);
        }
    }

    // ========================================================================
    // EXPRESSIONS
    // ========================================================================

    fn parse_expression(
        &mut self,
        src: &'t str,
        start: usize,
        parent: Option<NodeId>,
        owner_parameter: Option<NodeId>,
    ) -> NodeId {
        let tokens = tokenize(src, size(start));
        self.expression_from_tokens(&tokens, range(start, start + src.len()), parent, owner_parameter)
    }

    fn expression_from_tokens(
        &mut self,
        tokens: &[Token<'t>],
        range: TextRange,
        parent: Option<NodeId>,
        owner_parameter: Option<NodeId>,
    ) -> NodeId {
        let expression = Expression {
            parts: Vec::new(),
            owner_parameter,
        };
        let id = self.alloc(range, parent, NodeKind::Expression(expression));
        if let Some(parts) = self.parse_parts(tokens, id) {
            if let NodeKind::Expression(e) = &mut self.nodes[id.index() as usize].kind {
                e.parts.push(parts);
            }
        }
        id
    }

    fn alloc_part(&mut self, parent: NodeId, token: &Token<'t>, kind: PartKind) -> NodeId {
        let part = Part {
            kind,
            name: SmolStr::new(token.text),
            name_range: token.range,
        };
        self.alloc(token.range, Some(parent), NodeKind::ExpressionPart(part))
    }

    fn parse_parts(&mut self, tokens: &[Token<'t>], expression: NodeId) -> Option<NodeId> {
        let start = tokens.iter().find(|t| t.kind != ExprToken::Whitespace)?.range.start();
        let parts_id = self.alloc(
            TextRange::empty(start),
            Some(expression),
            NodeKind::ExpressionParts(Parts {
                namespace: None,
                namespace_range: None,
                parts: Vec::new(),
            }),
        );

        let mut namespace: Option<(SmolStr, TextRange)> = None;
        let mut chain: Vec<NodeId> = Vec::new();
        let mut expect_member = false;
        let mut pending_space = false;
        let mut end = start;
        let mut i = 0;

        while i < tokens.len() {
            let token = tokens[i];
            match token.kind {
                ExprToken::Whitespace => {
                    if !chain.is_empty() {
                        pending_space = true;
                    }
                    i += 1;
                }
                ExprToken::Dot if !pending_space => {
                    expect_member = !chain.is_empty();
                    i += 1;
                }
                _ if chain.is_empty() => {
                    if !token.kind.is_primary() {
                        i += 1;
                        continue;
                    }
                    let next_is_colon = tokens.get(i + 1).is_some_and(|t| t.kind == ExprToken::Colon);
                    if namespace.is_none() && token.kind == ExprToken::Ident && next_is_colon {
                        namespace = Some((SmolStr::new(token.text), token.range));
                        end = tokens[i + 1].range.end();
                        i += 2;
                        continue;
                    }
                    let literal = match token.kind {
                        ExprToken::Ident | ExprToken::Star => None,
                        _ => literal_java_type(token.text),
                    };
                    let id = self.alloc_part(parts_id, &token, PartKind::Object { literal });
                    chain.push(id);
                    end = token.range.end();
                    i += 1;
                }
                ExprToken::Ident | ExprToken::Star if expect_member => {
                    expect_member = false;
                    let has_call = tokens.get(i + 1).is_some_and(|t| t.kind == ExprToken::LParen);
                    if has_call {
                        let id = self.alloc_part(parts_id, &token, PartKind::Method(MethodCall::default()));
                        let (call, next, call_end) = self.parse_call(tokens, i + 1, id);
                        let node = &mut self.nodes[id.index() as usize];
                        node.range = TextRange::new(token.range.start(), call_end);
                        if let NodeKind::ExpressionPart(part) = &mut node.kind {
                            part.kind = PartKind::Method(call);
                        }
                        chain.push(id);
                        end = call_end;
                        i = next;
                    } else {
                        let id = self.alloc_part(parts_id, &token, PartKind::Property);
                        chain.push(id);
                        end = token.range.end();
                        i += 1;
                    }
                }
                ExprToken::Ident | ExprToken::Operator if pending_space => {
                    pending_space = false;
                    expect_member = false;
                    let call = MethodCall {
                        infix: true,
                        operator: token.kind == ExprToken::Operator,
                        ..MethodCall::default()
                    };
                    let id = self.alloc_part(parts_id, &token, PartKind::Method(call));
                    chain.push(id);
                    end = token.range.end();

                    let mut j = i + 1;
                    while tokens.get(j).is_some_and(|t| t.kind == ExprToken::Whitespace) {
                        j += 1;
                    }
                    let arg_start = j;
                    let mut depth = 0usize;
                    while j < tokens.len() {
                        match tokens[j].kind {
                            ExprToken::LParen => depth += 1,
                            ExprToken::RParen => depth = depth.saturating_sub(1),
                            ExprToken::Whitespace if depth == 0 => break,
                            _ => {}
                        }
                        j += 1;
                    }
                    if arg_start < j {
                        let arg = &tokens[arg_start..j];
                        let arg_range = TextRange::new(arg[0].range.start(), arg[arg.len() - 1].range.end());
                        let arg_id = self.expression_from_tokens(arg, arg_range, Some(id), None);
                        if let NodeKind::ExpressionPart(Part { kind: PartKind::Method(call), .. }) =
                            &mut self.nodes[id.index() as usize].kind
                        {
                            call.args.push(arg_id);
                        }
                        end = arg_range.end();
                    }
                    i = j;
                }
                _ => i += 1,
            }
        }

        if chain.is_empty() && namespace.is_none() {
            // Nothing but operators or stray punctuation: keep an empty Parts
            // so the expression still has a node at its start.
            return Some(parts_id);
        }

        let node = &mut self.nodes[parts_id.index() as usize];
        node.range = TextRange::new(start, end.max(start));
        if let NodeKind::ExpressionParts(parts) = &mut node.kind {
            if let Some((name, ns_range)) = namespace {
                parts.namespace = Some(name);
                parts.namespace_range = Some(ns_range);
            }
            parts.parts = chain;
        }
        Some(parts_id)
    }

    /// Parse `( arg, arg )` starting at the `(` token.
    ///
    /// Returns the call, the index of the first token after it, and the end
    /// offset of the call.
    fn parse_call(
        &mut self,
        tokens: &[Token<'t>],
        lparen: usize,
        part: NodeId,
    ) -> (MethodCall, usize, TextSize) {
        let mut call = MethodCall {
            open_paren: Some(tokens[lparen].range.start()),
            ..MethodCall::default()
        };
        let mut depth = 0usize;
        let mut arg_start = lparen + 1;
        let mut j = lparen + 1;
        let mut end = tokens[lparen].range.end();

        while j < tokens.len() {
            match tokens[j].kind {
                ExprToken::LParen => depth += 1,
                ExprToken::RParen if depth == 0 => {
                    self.push_argument(&mut call, &tokens[arg_start..j], part);
                    call.close_paren = Some(tokens[j].range.start());
                    return (call, j + 1, tokens[j].range.end());
                }
                ExprToken::RParen => depth -= 1,
                ExprToken::Comma if depth == 0 => {
                    self.push_argument(&mut call, &tokens[arg_start..j], part);
                    arg_start = j + 1;
                }
                _ => {}
            }
            end = tokens[j].range.end();
            j += 1;
        }
        self.push_argument(&mut call, &tokens[arg_start..], part);
        (call, j, end)
    }

    fn push_argument(&mut self, call: &mut MethodCall, tokens: &[Token<'t>], part: NodeId) {
        let Some(first) = tokens.iter().position(|t| t.kind != ExprToken::Whitespace) else {
            return;
        };
        let last = tokens
            .iter()
            .rposition(|t| t.kind != ExprToken::Whitespace)
            .unwrap_or(first);
        let slice = &tokens[first..=last];
        let arg_range = TextRange::new(slice[0].range.start(), slice[slice.len() - 1].range.end());
        let id = self.expression_from_tokens(slice, arg_range, Some(part), None);
        call.args.push(id);
    }
}

/// Split section parameters on whitespace outside quotes and parentheses.
fn split_parameters(src: &str, base: usize) -> Vec<(&str, usize)> {
    let mut params = Vec::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut start: Option<usize> = None;

    for (i, c) in src.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    start.get_or_insert(i);
                }
                '(' => {
                    depth += 1;
                    start.get_or_insert(i);
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    start.get_or_insert(i);
                }
                c if c.is_whitespace() && depth == 0 => {
                    if let Some(s) = start.take() {
                        params.push((&src[s..i], base + s));
                    }
                }
                _ => {
                    start.get_or_insert(i);
                }
            },
        }
    }
    if let Some(s) = start {
        params.push((&src[s..], base + s));
    }
    params
}

/// Index of the `=` of a `name=value` parameter, ignoring comparison operators.
fn assignment_index(raw: &str) -> Option<usize> {
    let bytes = raw.as_bytes();
    let mut quote: Option<u8> = None;
    for (i, &c) in bytes.iter().enumerate() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                b'\'' | b'"' | b'(' => return None,
                b'=' => {
                    let prev = i.checked_sub(1).map(|p| bytes[p]);
                    let next = bytes.get(i + 1).copied();
                    let comparison = matches!(prev, Some(b'=' | b'!' | b'<' | b'>'))
                        || next == Some(b'=');
                    if !comparison && i > 0 {
                        return Some(i);
                    }
                    if next == Some(b'=') {
                        return None;
                    }
                }
                _ => {}
            },
        }
    }
    None
}
