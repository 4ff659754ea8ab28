use std::collections::BTreeSet;

use tracing::debug;

use super::client::ScreenClient;
use super::session::Screen;
use super::SessionEntry;
use crate::error::Result;

/// Entry point for discovering and creating screen sessions
#[derive(Clone, Default)]
pub struct ScreenRegistry {
    client: ScreenClient,
}

impl ScreenRegistry {
    pub fn new(client: ScreenClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ScreenClient {
        &self.client
    }

    /// Names of all running sessions
    pub fn list_names(&self) -> Result<BTreeSet<String>> {
        self.client.list_session_names()
    }

    /// A handle for every running session.
    ///
    /// Names are taken from a single listing up front; handles are built
    /// as the iterator is consumed and do not query screen themselves.
    pub fn list_screens(&self) -> Result<impl Iterator<Item = Screen>> {
        let names = self.list_names()?;
        debug!(count = names.len(), "listed screen sessions");
        let client = self.client.clone();
        Ok(names
            .into_iter()
            .map(move |name| Screen::new(name, client.clone())))
    }

    /// Structured listing: id, status and date of every session
    pub fn list_sessions(&self) -> Result<Vec<SessionEntry>> {
        self.client.list_sessions()
    }

    /// Handle for `name` without touching screen
    pub fn screen(&self, name: impl Into<String>) -> Screen {
        Screen::new(name, self.client.clone())
    }

    /// Handle for `name`, creating the session if it is not running
    pub fn create(&self, name: impl Into<String>) -> Result<Screen> {
        Screen::open(name, self.client.clone())
    }
}
