use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Add,
    Remove,
}

impl Action {
    /// Checkbox state the action leads to.
    pub fn checked(self) -> bool {
        matches!(self, Action::Add)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Remove => "remove",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The request could not be sent or did not complete.
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-2xx status.
    #[error("server rejected request with status {status}")]
    ServerRejected { status: u16 },
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

/// An entry of the current listing as rendered by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingEntry {
    #[serde(alias = "full_path")]
    pub path: String,
    #[serde(default)]
    pub is_dir: bool,
}

impl ListingEntry {
    pub fn file(path: impl Into<String>) -> Self {
        Self { path: path.into(), is_dir: false }
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self { path: path.into(), is_dir: true }
    }
}

/// A listing entry together with its displayed checkbox state.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SelectableItem {
    pub path: String,
    pub is_dir: bool,
    pub selected: bool,
}

/// Published by the synchronizer for renderers to follow.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SelectionEvent {
    /// Optimistic toggle applied before the request was sent.
    Toggled { path: String, selected: bool, count: usize },
    /// The server acknowledged the change and the set was updated.
    Committed { action: Action, path: String, count: usize },
    /// The request failed and the optimistic toggle was undone.
    RolledBack { path: String, selected: bool, count: usize, error: String },
    /// The whole set was replaced, e.g. after a delete submission.
    Reset { count: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkSelectReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: Vec<(String, SyncError)>,
}

impl BulkSelectReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
