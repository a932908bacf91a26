//! View-local state of the user directory.
//!
//! Everything here is transient: it lives in the browser's session and is
//! dropped on page reload.

use serde::{Deserialize, Serialize};
use user_directory_core::{Company, CreationDraft, EditSession, User, UserId};

/// A message shown above the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Notice {
    /// Input was rejected locally; nothing was sent.
    Blocking(String),
    /// A request failed.
    Error(String),
}

impl Notice {
    /// Notice text.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Blocking(message) | Self::Error(message) => message,
        }
    }

    /// Short kind label, used as a CSS modifier.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Blocking(_) => "blocking",
            Self::Error(_) => "error",
        }
    }
}

/// Display mode of a table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMode {
    Viewing,
    Editing,
}

/// Everything the directory view owns between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    /// Last successful user list read.
    pub users: Vec<User>,
    /// Last successful company list read.
    pub companies: Vec<Company>,
    pub creation: CreationDraft,
    /// The single active edit session, if any.
    pub edit: Option<EditSession>,
    pub notice: Option<Notice>,
}

impl ViewState {
    /// Find a cached user by ID.
    #[must_use]
    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|u| &u.id == id)
    }

    /// Mode of the row for `id`. At most one row is ever `Editing`.
    #[must_use]
    pub fn row_mode(&self, id: &UserId) -> RowMode {
        match &self.edit {
            Some(session) if session.targets(id) => RowMode::Editing,
            _ => RowMode::Viewing,
        }
    }
}
