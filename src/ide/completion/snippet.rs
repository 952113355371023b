//! Snippet text for method and section tag candidates.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::hir::JavaParameterInfo;

/// `${1:name}` placeholders and `$0` tab stops.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{\d+:([^}]*)\}|\$\d+").expect("valid regex"));

/// Shape of the method being rendered.
#[derive(Clone, Copy, Debug)]
pub struct MethodSnippet<'a> {
    pub name: &'a str,
    /// Declared Java parameters, receiver included.
    pub parameters: &'a [JavaParameterInfo],
    /// Leading parameters the template author does not write.
    pub skip: usize,
    /// `*` resolver: the member name is itself the argument.
    pub match_any: bool,
    pub infix: bool,
}

/// Insert text of a method candidate.
///
/// With snippet support, each parameter becomes a numbered placeholder
/// and a final `$0` tab stop is appended.
pub fn method_snippet(method: &MethodSnippet<'_>, snippets_supported: bool) -> String {
    let mut snippet = String::new();
    if method.match_any {
        let name = method
            .parameters
            .first()
            .map(|p| p.name.as_str())
            .unwrap_or(method.name);
        if snippets_supported {
            placeholder(&mut snippet, 1, name);
            snippet.push_str("$0");
        } else {
            snippet.push_str(name);
        }
        return snippet;
    }

    snippet.push_str(method.name);
    // A resolver taking only its receiver is still called: `orEmpty()`.
    if method.parameters.is_empty() {
        return snippet;
    }
    snippet.push(if method.infix { ' ' } else { '(' });
    for (i, parameter) in method.parameters.iter().skip(method.skip).enumerate() {
        if i > 0 {
            snippet.push_str(", ");
        }
        if snippets_supported {
            placeholder(&mut snippet, i + 1, &parameter.name);
        } else {
            snippet.push_str(&parameter.name);
        }
    }
    if !method.infix {
        snippet.push(')');
    }
    if snippets_supported {
        snippet.push_str("$0");
    }
    snippet
}

fn placeholder(out: &mut String, index: usize, name: &str) {
    let _ = write!(out, "${{{index}:{name}}}");
}

/// Plain text rendering of a snippet, for clients without snippet support.
pub fn strip_placeholders(snippet: &str) -> String {
    PLACEHOLDER.replace_all(snippet, "$1").into_owned()
}

/// Section tag proposal offered after `{#`.
#[derive(Clone, Copy, Debug)]
pub struct SectionSnippet {
    pub tag: &'static str,
    pub body: &'static str,
    pub description: &'static str,
}

pub const SECTION_SNIPPETS: &[SectionSnippet] = &[
    SectionSnippet {
        tag: "for",
        body: "for ${1:item} in ${2:items}}\n\t{${1:item}.${3:name}}$0\n{/for}",
        description: "Loop section with alias",
    },
    SectionSnippet {
        tag: "each",
        body: "each ${1:items}}\n\t{it.${2:name}}$0\n{/each}",
        description: "Loop section with implicit alias",
    },
    SectionSnippet {
        tag: "if",
        body: "if ${1:condition}}\n\t$0\n{/if}",
        description: "If section",
    },
    SectionSnippet {
        tag: "let",
        body: "let ${1:name}=${2:value}}\n\t$0\n{/let}",
        description: "Let section",
    },
    SectionSnippet {
        tag: "set",
        body: "set ${1:name}=${2:value}}\n\t$0\n{/set}",
        description: "Set section",
    },
    SectionSnippet {
        tag: "with",
        body: "with ${1:item}}\n\t{${2:name}}$0\n{/with}",
        description: "With section",
    },
    SectionSnippet {
        tag: "when",
        body: "when ${1:value}}\n\t{#is ${2:case}}$0\n{/when}",
        description: "When section",
    },
    SectionSnippet {
        tag: "switch",
        body: "switch ${1:value}}\n\t{#case ${2:case}}$0\n{/switch}",
        description: "Switch section",
    },
    SectionSnippet {
        tag: "include",
        body: "include ${1:base} /}$0",
        description: "Include section",
    },
    SectionSnippet {
        tag: "insert",
        body: "insert ${1:body}}${2:default content}{/insert}$0",
        description: "Insert section",
    },
];
