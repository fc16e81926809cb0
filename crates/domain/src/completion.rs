use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a completion candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionKind {
    Keyword,
    Function,
    Alias,
    Column,
    Table,
    View,
    SubQueryView,
    SubQueryColumn,
    Change,
    User,
    Database,
}

impl fmt::Display for CompletionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Keyword => "Keyword",
            Self::Function => "Function",
            Self::Alias => "Alias",
            Self::Column => "Column",
            Self::Table => "Table",
            Self::View => "View",
            Self::SubQueryView => "Sub Query View",
            Self::SubQueryColumn => "Sub Query Column",
            Self::Change => "Change",
            Self::User => "User",
            Self::Database => "Database",
        };
        write!(f, "{}", label)
    }
}

/// Candidate surfaced to the protocol layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionItem {
    pub label: String,
    pub kind: CompletionKind,
    pub detail: String,
}

impl CompletionItem {
    pub fn new(label: impl Into<String>, kind: CompletionKind, detail: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: detail.into(),
        }
    }
}
