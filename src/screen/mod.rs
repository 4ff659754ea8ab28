mod client;
pub mod parser;
mod registry;
mod session;
mod tail;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{CommandRunner, ProcessRunner, ScreenClient};
pub use registry::ScreenRegistry;
pub use session::Screen;
pub use tail::LogTailer;

use serde::{Deserialize, Serialize};

/// Fields of one session line in `screen -ls` output.
///
/// Which variant is produced depends only on how many fields follow the
/// name, never on their content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionInfo {
    /// `\t<id>.<name>\t(<status>)`
    Undated { id: String, status: String },
    /// `\t<id>.<name>\t(<date>)\t(<status>)`
    Dated {
        id: String,
        date: String,
        status: String,
    },
}

impl SessionInfo {
    pub fn id(&self) -> &str {
        match self {
            Self::Undated { id, .. } | Self::Dated { id, .. } => id,
        }
    }

    pub fn status(&self) -> &str {
        match self {
            Self::Undated { status, .. } | Self::Dated { status, .. } => status,
        }
    }

    pub fn date(&self) -> Option<&str> {
        match self {
            Self::Undated { .. } => None,
            Self::Dated { date, .. } => Some(date),
        }
    }

    pub fn state(&self) -> SessionState {
        SessionState::from_label(self.status())
    }
}

/// A named session as seen in one listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub name: String,
    #[serde(flatten)]
    pub info: SessionInfo,
}

/// Coarse classification of screen's status label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionState {
    /// A single client is attached
    Attached,
    /// No client is attached
    Detached,
    /// Multiuser session with at least one client attached
    MultiAttached,
    /// Socket left behind by a dead session
    Dead,
    #[default]
    Unknown,
}

impl SessionState {
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_ascii_lowercase();

        if label.contains("dead") {
            return Self::Dead;
        }

        match label.strip_prefix("multi,").map(str::trim) {
            Some("attached") => Self::MultiAttached,
            Some("detached") => Self::Detached,
            Some(_) => Self::Unknown,
            None => match label.as_str() {
                "attached" => Self::Attached,
                "detached" => Self::Detached,
                _ => Self::Unknown,
            },
        }
    }
}
