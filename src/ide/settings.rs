//! Client capabilities and user preferences handed to each request.
//!
//! Settings are plain values: an entry point reads the settings it is
//! given and nothing else, so requests made with different capabilities
//! never interfere.

use serde::{Deserialize, Serialize};

use crate::hir::NativeModeSettings;

/// Command opening a Java type in the client, used by inlay hint links.
pub const JAVA_DEFINITION_COMMAND: &str = "qute.command.java.definition";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SharedSettings {
    pub completion: CompletionSettings,
    pub hover: HoverSettings,
    pub inlay_hint: InlayHintSettings,
    pub code_action: CodeActionSettings,
    /// Command ids the client can execute.
    pub commands: Vec<String>,
    pub native: NativeModeSettings,
}

impl SharedSettings {
    /// Parse LSP initialization options.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn is_command_supported(&self, command: &str) -> bool {
        self.commands.iter().any(|c| c == command)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompletionSettings {
    pub snippets_supported: bool,
    pub markdown_supported: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HoverSettings {
    pub markdown_supported: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InlayHintSettings {
    pub enabled: bool,
    pub show_section_parameter_type: bool,
}

impl Default for InlayHintSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            show_section_parameter_type: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CodeActionSettings {
    /// The client resolves code action edits lazily.
    pub resolve_supported: bool,
    pub data_supported: bool,
}

impl CodeActionSettings {
    pub fn is_lazy(&self) -> bool {
        self.resolve_supported && self.data_supported
    }
}
