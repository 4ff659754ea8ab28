use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Polls a file and hands out whatever was appended since the last poll.
///
/// Each call stats the file once. Growth yields the new bytes, shrinking
/// (truncation or rotation) yields the whole current content, no change
/// yields an empty string. It never blocks or sleeps: pacing is up to the
/// caller, and stopping is just not calling again.
#[derive(Debug)]
pub struct LogTailer {
    path: PathBuf,
    offset: u64,
}

impl LogTailer {
    /// Start tailing at the file's current end
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let offset = std::fs::metadata(&path)?.len();
        Ok(Self { path, offset })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte offset the next read starts from
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn next_chunk(&mut self) -> Result<String> {
        let size = std::fs::metadata(&self.path)?.len();
        if size == self.offset {
            return Ok(String::new());
        }

        let start = if size > self.offset { self.offset } else { 0 };

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(start))?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;

        // A character cut in half by the writer is left for the next poll
        let complete = complete_len(&buf);
        self.offset = start + complete as u64;
        Ok(String::from_utf8_lossy(&buf[..complete]).into_owned())
    }
}

/// Length of `buf` without a trailing, incomplete UTF-8 sequence.
/// Invalid bytes in the middle count as complete and decode lossily.
fn complete_len(buf: &[u8]) -> usize {
    let mut pos = 0;
    loop {
        match std::str::from_utf8(&buf[pos..]) {
            Ok(_) => return buf.len(),
            Err(e) => match e.error_len() {
                None => return pos + e.valid_up_to(),
                Some(bad) => pos += e.valid_up_to() + bad,
            },
        }
    }
}

impl Iterator for LogTailer {
    type Item = Result<String>;

    /// Never returns `None`
    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_chunk())
    }
}
