//! Drive GNU screen sessions by shelling out to `screen`.
//!
//! [`ScreenRegistry`] discovers sessions, [`Screen`] sends directives to one
//! of them, and [`LogTailer`] follows a session's log file. Everything is
//! synchronous and re-queries screen on demand; nothing is pushed.

pub mod config;
pub mod error;
pub mod screen;

pub use config::ScreenConfig;
pub use error::{Result, ScreenError};
pub use screen::{
    CommandRunner, LogTailer, ProcessRunner, Screen, ScreenClient, ScreenRegistry, SessionEntry,
    SessionInfo, SessionState,
};
