//! Text edits exchanged with editors and the Java type provider.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::LineColRange;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub range: LineColRange,
    pub new_text: String,
}

impl TextEdit {
    pub fn replace(range: LineColRange, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }
}

/// Edits to one document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEdit {
    pub uri: SmolStr,
    pub edits: Vec<TextEdit>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceEdit {
    pub changes: Vec<DocumentEdit>,
}

impl WorkspaceEdit {
    pub fn single(uri: impl Into<SmolStr>, edit: TextEdit) -> Self {
        Self {
            changes: vec![DocumentEdit {
                uri: uri.into(),
                edits: vec![edit],
            }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.iter().all(|change| change.edits.is_empty())
    }
}
