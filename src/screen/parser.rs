use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::warn;

use super::{SessionEntry, SessionInfo};
use crate::error::{Result, ScreenError};

/// `<ws><id>.<name>` followed by the tab-separated parenthesized fields.
/// The name runs up to the first tab and may itself contain dots.
static RE_SESSION_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<id>[^.\s]+)\.(?P<name>[^\t]+)(?P<fields>(?:\t[^\t]*)*)$").unwrap()
});

/// Session lines always carry a tab; headers and footers never do
fn session_lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines()
        .map(|line| line.trim_end_matches(['\r', '\n']))
        .filter(|line| line.contains('\t'))
}

/// Name part of a session line: everything after the id segment, up to the first tab
fn line_name(line: &str) -> Option<&str> {
    let (_, rest) = line.split_once('.')?;
    let name = rest.split('\t').next().unwrap_or_default();
    (!name.is_empty()).then_some(name)
}

/// Extract the set of session names from `screen -ls` output
pub fn parse_names(raw: &str) -> BTreeSet<String> {
    session_lines(raw)
        .filter_map(line_name)
        .map(str::to_string)
        .collect()
}

/// Parse the listing line of exactly one session.
///
/// Lines are matched on full name equality so that `web` never picks up
/// `web.old`. No match is `SessionNotFound`; several matches are
/// `AmbiguousSession`.
pub fn parse_session_info(raw: &str, name: &str) -> Result<SessionInfo> {
    let matches: Vec<&str> = session_lines(raw)
        .filter(|line| line_name(line) == Some(name))
        .collect();

    match matches.as_slice() {
        [] => Err(ScreenError::SessionNotFound(name.to_string())),
        [line] => parse_line(line).map(|entry| entry.info),
        many => Err(ScreenError::AmbiguousSession {
            name: name.to_string(),
            count: many.len(),
        }),
    }
}

/// Parse every session line of `screen -ls` output, in listing order.
/// Malformed lines are logged and skipped.
pub fn parse_listing(raw: &str) -> Vec<SessionEntry> {
    session_lines(raw)
        .filter(|line| line_name(line).is_some())
        .filter_map(|line| match parse_line(line) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(line, %err, "skipping malformed session line");
                None
            }
        })
        .collect()
}

/// Parse a single session line.
///
/// The shape is decided by field count only: one trailing field is the
/// status, two are the date and the status.
pub fn parse_line(line: &str) -> Result<SessionEntry> {
    let caps = RE_SESSION_LINE
        .captures(line)
        .ok_or_else(|| parse_error(line, "expected '<id>.<name>'"))?;

    let id = caps["id"].to_string();
    let name = caps["name"].to_string();
    let fields: Vec<&str> = caps["fields"].split('\t').skip(1).map(str::trim).collect();

    let info = match fields.as_slice() {
        [status] => SessionInfo::Undated {
            id,
            status: unwrap_parens(line, status)?,
        },
        [date, status] => SessionInfo::Dated {
            id,
            date: unwrap_parens(line, date)?,
            status: unwrap_parens(line, status)?,
        },
        other => {
            return Err(parse_error(
                line,
                &format!("expected 1 or 2 fields after the name, found {}", other.len()),
            ))
        }
    };

    Ok(SessionEntry { name, info })
}

fn unwrap_parens(line: &str, field: &str) -> Result<String> {
    field
        .strip_prefix('(')
        .and_then(|f| f.strip_suffix(')'))
        .map(str::to_string)
        .ok_or_else(|| parse_error(line, &format!("field {:?} is not parenthesized", field)))
}

fn parse_error(line: &str, reason: &str) -> ScreenError {
    ScreenError::Parse {
        line: line.to_string(),
        reason: reason.to_string(),
    }
}
