//! Sink: spec.md §2.7 and §6. A write target is either a regular file, opened once
//! and written to with whole-buffer writes, or the in-process console, which forces
//! single-threaded operation (spec.md §4.6 "Console sink constraint").

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::OpenMode;
use crate::error::WriteError;

/// Where a write's output goes.
pub enum Destination {
    /// A real file at this path.
    Path(PathBuf),
    /// The in-process console (stdout). An empty filename in the original maps to
    /// this variant.
    Console,
}

pub(crate) enum Sink {
    File { file: File, path: String },
    Console,
}

impl Sink {
    pub(crate) fn open(dest: &Destination, mode: OpenMode) -> Result<Self, WriteError> {
        match dest {
            Destination::Console => Ok(Sink::Console),
            Destination::Path(path) => {
                let existed = path.exists();
                let mut options = OpenOptions::new();
                options.write(true).create(true);
                match mode {
                    OpenMode::Truncate => {
                        options.truncate(true);
                    }
                    OpenMode::Append => {
                        options.append(true);
                    }
                }
                let file = options.open(path).map_err(|source| WriteError::OpenFailed {
                    path: path_to_string(path),
                    existed,
                    source,
                })?;
                Ok(Sink::File {
                    file,
                    path: path_to_string(path),
                })
            }
        }
    }

    /// True when writes through this sink must be serialized to a single thread.
    pub(crate) fn forces_single_thread(&self) -> bool {
        matches!(self, Sink::Console)
    }

    /// Commits one finished buffer. For a file, a single `write_all` call; for the
    /// console, the buffer is written as text (the console layer does its own line
    /// ending translation -- spec.md §9's preserved "row terminator on console"
    /// behavior is enforced by callers always using `\n` when encoding for this sink,
    /// not here).
    pub(crate) fn write_buffer(&mut self, data: &[u8]) -> Result<(), WriteError> {
        match self {
            Sink::File { file, path } => file.write_all(data).map_err(|source| WriteError::WriteFailed {
                path: path.clone(),
                source,
            }),
            Sink::Console => {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(data)
                    .and_then(|_| stdout.flush())
                    .map_err(|source| WriteError::WriteFailed {
                        path: String::new(),
                        source,
                    })
            }
        }
    }

    /// Closes the sink exactly once. A no-op for the console pseudo-sink.
    ///
    /// `sync_all` before drop is the idiomatic Rust stand-in for catching a deferred
    /// close error: a plain `drop(file)` discards any error the final flush would
    /// have surfaced, which is the one case `WriteError::CloseFailed` exists for.
    pub(crate) fn close(self) -> Result<(), WriteError> {
        match self {
            Sink::File { file, path } => file.sync_all().map_err(|source| WriteError::CloseFailed { path, source }),
            Sink::Console => Ok(()),
        }
    }
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
