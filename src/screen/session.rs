use std::fmt;
use std::fs::OpenOptions;

use tracing::info;

use super::client::ScreenClient;
use super::parser;
use super::tail::LogTailer;
use super::{SessionInfo, SessionState};
use crate::error::{Result, ScreenError};

/// Local view of a named screen session.
///
/// Holding a `Screen` does not mean the session exists: it is created by
/// [`Screen::initialize`] and destroyed by [`Screen::kill`], and anything
/// outside this process may create or kill it in between. Existence and
/// status are therefore re-queried on every call.
pub struct Screen {
    name: String,
    id: Option<String>,
    info: Option<SessionInfo>,
    logs: Option<LogTailer>,
    client: ScreenClient,
}

impl Screen {
    pub fn new(name: impl Into<String>, client: ScreenClient) -> Self {
        Self {
            name: name.into(),
            id: None,
            info: None,
            logs: None,
            client,
        }
    }

    /// Handle for `name`, creating the session if it is not running yet
    pub fn open(name: impl Into<String>, client: ScreenClient) -> Result<Self> {
        let mut screen = Self::new(name, client);
        screen.initialize(false)?;
        Ok(screen)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the session is in the current listing
    pub fn exists(&self) -> Result<bool> {
        Ok(self.client.list_session_names()?.contains(&self.name))
    }

    /// Session id (pid) assigned by screen; fetched once, then cached
    pub fn id(&mut self) -> Result<String> {
        if let Some(id) = &self.id {
            return Ok(id.clone());
        }
        Ok(self.refresh()?.id().to_string())
    }

    /// Current status label, always re-fetched
    pub fn status(&mut self) -> Result<String> {
        Ok(self.refresh()?.status().to_string())
    }

    /// Creation date, if this screen version reports one; always re-fetched
    pub fn date(&mut self) -> Result<Option<String>> {
        Ok(self.refresh()?.date().map(str::to_string))
    }

    pub fn state(&mut self) -> Result<SessionState> {
        Ok(self.refresh()?.state())
    }

    /// Fresh listing fields for this session
    pub fn info(&mut self) -> Result<SessionInfo> {
        self.refresh().cloned()
    }

    /// Info from the last successful query, without asking screen
    pub fn last_info(&self) -> Option<&SessionInfo> {
        self.info.as_ref()
    }

    fn refresh(&mut self) -> Result<&SessionInfo> {
        let raw = self.client.list_raw()?;
        let info = parser::parse_session_info(&raw, &self.name)?;
        self.id = Some(info.id().to_string());
        Ok(self.info.insert(info))
    }

    /// Create the session unless it is already running. `force` creates a
    /// new one regardless, which leaves two sessions sharing the name.
    pub fn initialize(&mut self, force: bool) -> Result<()> {
        if force || !self.exists()? {
            self.id = None;
            self.info = None;
            info!(session = %self.name, force, "creating screen session");
            self.client.create_session(&self.name)?;
        }
        Ok(())
    }

    /// Type each command into the session followed by a carriage return
    pub fn send_commands<I, S>(&self, commands: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.check_exists()?;
        for command in commands {
            let input = format!("{}\r", command.as_ref());
            self.client.send_directive(&self.name, &["stuff", input.as_str()])?;
        }
        Ok(())
    }

    /// Send Ctrl-C
    pub fn interrupt(&self) -> Result<()> {
        self.directives(&[&["stuff", "\u{3}"]])
    }

    /// Quit the session and every program running in it
    pub fn kill(&self) -> Result<()> {
        info!(session = %self.name, "killing screen session");
        self.directives(&[&["quit"]])
    }

    pub fn detach(&self) -> Result<()> {
        self.check_exists()?;
        self.client.detach_session(&self.name)
    }

    /// Turn on screen's logging for this session and start tailing the file.
    ///
    /// The first chunk of a fresh tailer is always empty and is consumed
    /// here, so the first chunk a caller sees is new output.
    pub fn enable_logs(&mut self) -> Result<()> {
        let path = self.client.config().log_path(&self.name)?;
        OpenOptions::new().create(true).append(true).open(&path)?;
        let mut tailer = LogTailer::new(&path)?;
        tailer.next_chunk()?;

        let logfile = path.to_string_lossy().into_owned();
        self.directives(&[&["logfile", logfile.as_str()], &["log", "on"]])?;

        info!(session = %self.name, path = %path.display(), "logging enabled");
        self.logs = Some(tailer);
        Ok(())
    }

    pub fn disable_logs(&mut self) -> Result<()> {
        self.directives(&[&["log", "off"]])?;
        self.logs = None;
        info!(session = %self.name, "logging disabled");
        Ok(())
    }

    /// Tailer over the session log while logging is enabled
    pub fn logs(&mut self) -> Option<&mut LogTailer> {
        self.logs.as_mut()
    }

    /// Share the session with another unix user.
    ///
    /// Two separate directives: if granting access fails, multiuser mode
    /// stays on.
    pub fn add_user_access(&self, user: &str) -> Result<()> {
        self.directives(&[&["multiuser", "on"], &["acladd", user]])
    }

    /// Run raw screen commands (see `man screen`) against this session.
    ///
    /// Each command is split on whitespace into the `-X` arguments, except
    /// for `stuff`, whose remainder is passed as a single argument.
    pub fn screen_commands<I, S>(&self, commands: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.check_exists()?;
        for command in commands {
            let directive = split_directive(command.as_ref());
            self.client.send_directive(&self.name, &directive)?;
        }
        Ok(())
    }

    fn directives(&self, directives: &[&[&str]]) -> Result<()> {
        self.check_exists()?;
        for directive in directives {
            self.client.send_directive(&self.name, directive)?;
        }
        Ok(())
    }

    fn check_exists(&self) -> Result<()> {
        if self.exists()? {
            Ok(())
        } else {
            Err(ScreenError::SessionNotFound(self.name.clone()))
        }
    }
}

fn split_directive(command: &str) -> Vec<&str> {
    let command = command.trim();
    match command.split_once(char::is_whitespace) {
        Some(("stuff", rest)) => vec!["stuff", unquote(rest.trim_start())],
        _ => command.split_whitespace().collect(),
    }
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Screen '{}'>", self.name)
    }
}

impl fmt::Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Screen")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("logging", &self.logs.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScreenConfig;
    use crate::screen::testing::FakeRunner;

    const RUNNING: &str = "There is a screen on:\n\t4242.worker\t(Detached)\n1 Socket in /run/screen/S-elle.\n";

    #[test]
    fn test_exists_follows_listing() {
        let (runner, client) = FakeRunner::client("No Sockets found.\n");
        let screen = Screen::new("worker", client);
        assert!(!screen.exists().unwrap());

        runner.set_listing(RUNNING);
        assert!(screen.exists().unwrap());

        runner.set_listing("");
        assert!(!screen.exists().unwrap());
    }

    #[test]
    fn test_new_does_not_create() {
        let (runner, client) = FakeRunner::client("");
        let _screen = Screen::new("worker", client);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_initialize_skips_existing_session() {
        let (runner, client) = FakeRunner::client(RUNNING);
        let mut screen = Screen::new("worker", client);
        screen.initialize(false).unwrap();
        assert_eq!(runner.count(&["-Udm"]), 0);
    }

    #[test]
    fn test_initialize_force_always_creates() {
        let (runner, client) = FakeRunner::client(RUNNING);
        let mut screen = Screen::new("worker", client);
        screen.initialize(true).unwrap();
        assert_eq!(runner.calls(), vec![vec!["-Udm", "worker"]]);
    }

    #[test]
    fn test_open_creates_missing_session() {
        let (runner, client) = FakeRunner::client("");
        let screen = Screen::open("worker", client).unwrap();
        assert_eq!(runner.count(&["-Udm", "worker"]), 1);
        assert_eq!(screen.name(), "worker");
    }

    #[test]
    fn test_id_and_status() {
        let (runner, client) = FakeRunner::client(RUNNING);
        let mut screen = Screen::new("worker", client);
        assert_eq!(screen.id().unwrap(), "4242");
        assert_eq!(screen.status().unwrap(), "Detached");
        assert_eq!(screen.date().unwrap(), None);

        runner.set_listing("\t4242.worker\t(10/19/2026 10:00:00 AM)\t(Attached)\n");
        assert_eq!(screen.status().unwrap(), "Attached");
        assert_eq!(screen.state().unwrap(), SessionState::Attached);
        assert_eq!(screen.date().unwrap().as_deref(), Some("10/19/2026 10:00:00 AM"));
    }

    #[test]
    fn test_id_is_cached_status_is_not() {
        let (runner, client) = FakeRunner::client(RUNNING);
        let mut screen = Screen::new("worker", client);
        assert_eq!(screen.id().unwrap(), "4242");

        runner.set_listing("");
        assert_eq!(screen.id().unwrap(), "4242");
        assert!(matches!(
            screen.status().unwrap_err(),
            ScreenError::SessionNotFound(_)
        ));
    }

    #[test]
    fn test_send_commands_on_missing_session() {
        let (runner, client) = FakeRunner::client("\t1.other\t(Detached)\n");
        let screen = Screen::new("worker", client);
        let err = screen.send_commands(["ls -la"]).unwrap_err();
        assert!(matches!(err, ScreenError::SessionNotFound(name) if name == "worker"));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_send_commands_stuffs_each_line() {
        let (runner, client) = FakeRunner::client(RUNNING);
        let screen = Screen::new("worker", client);
        screen.send_commands(["cd /tmp", "make"]).unwrap();
        assert_eq!(
            runner.calls(),
            vec![
                vec!["-r", "worker", "-p", "0", "-X", "stuff", "cd /tmp\r"],
                vec!["-r", "worker", "-p", "0", "-X", "stuff", "make\r"],
            ]
        );
    }

    #[test]
    fn test_interrupt_kill_detach() {
        let (runner, client) = FakeRunner::client(RUNNING);
        let screen = Screen::new("worker", client);
        screen.interrupt().unwrap();
        screen.detach().unwrap();
        screen.kill().unwrap();
        assert_eq!(
            runner.calls(),
            vec![
                vec!["-r", "worker", "-p", "0", "-X", "stuff", "\u{3}"],
                vec!["-d", "worker"],
                vec!["-r", "worker", "-p", "0", "-X", "quit"],
            ]
        );
    }

    #[test]
    fn test_detach_missing_session() {
        let (runner, client) = FakeRunner::client("");
        let screen = Screen::new("worker", client);
        assert!(screen.detach().is_err());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_add_user_access() {
        let (runner, client) = FakeRunner::client(RUNNING);
        let screen = Screen::new("worker", client);
        screen.add_user_access("bob").unwrap();
        assert_eq!(runner.count(&["-r", "worker", "-p", "0", "-X", "multiuser", "on"]), 1);
        assert_eq!(runner.count(&["-r", "worker", "-p", "0", "-X", "acladd", "bob"]), 1);
    }

    #[test]
    fn test_logs_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScreenConfig {
            log_dir: dir.path().to_path_buf(),
            ..ScreenConfig::default()
        };
        let (runner, client) = FakeRunner::client_with(RUNNING, config);
        let mut screen = Screen::new("worker", client);
        assert!(screen.logs().is_none());

        screen.enable_logs().unwrap();
        let log_path = dir.path().join("worker");
        assert!(log_path.exists());
        assert_eq!(runner.count(&["-r", "worker", "-p", "0", "-X", "logfile"]), 1);
        assert_eq!(runner.count(&["-r", "worker", "-p", "0", "-X", "log", "on"]), 1);

        std::fs::write(&log_path, "$ make\nok\n").unwrap();
        let tailer = screen.logs().unwrap();
        assert_eq!(tailer.next_chunk().unwrap(), "$ make\nok\n");
        assert_eq!(tailer.next_chunk().unwrap(), "");

        screen.disable_logs().unwrap();
        assert!(screen.logs().is_none());
        assert_eq!(runner.count(&["-r", "worker", "-p", "0", "-X", "log", "off"]), 1);
    }

    #[test]
    fn test_logs_not_enabled_when_file_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScreenConfig {
            log_dir: dir.path().join("missing"),
            ..ScreenConfig::default()
        };
        let (runner, client) = FakeRunner::client_with(RUNNING, config);
        let mut screen = Screen::new("worker", client);

        assert!(matches!(screen.enable_logs().unwrap_err(), ScreenError::Io(_)));
        assert!(screen.logs().is_none());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_split_directive() {
        assert_eq!(split_directive("log on"), vec!["log", "on"]);
        assert_eq!(split_directive("stuff \"a b\r\""), vec!["stuff", "a b\r"]);
        assert_eq!(split_directive("quit"), vec!["quit"]);
    }

    #[test]
    fn test_display() {
        let (_runner, client) = FakeRunner::client("");
        assert_eq!(Screen::new("worker", client).to_string(), "<Screen 'worker'>");
    }
}
