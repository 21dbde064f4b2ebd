use std::io;

/// Every failure mode the engine can surface, all terminal for the write in progress.
///
/// Worker threads never construct these directly: they record a failure into shared
/// state, and the coordinating thread turns that into one of these once every worker
/// has exited the parallel region.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("columns have mismatched lengths: column {index} has {found} rows, column 0 has {expected}")]
    ShapeMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("column {index}'s kind is not supported")]
    UnsupportedColumnKind { index: usize },

    #[error("failed to open '{path}' for writing: {source}")]
    OpenFailed {
        path: String,
        existed: bool,
        #[source]
        source: io::Error,
    },

    #[error("one or more worker threads failed to allocate their buffer (out of memory)")]
    OutOfMemory,

    #[error("write to '{path}' failed: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("closing '{path}' failed: {source}")]
    CloseFailed {
        path: String,
        #[source]
        source: io::Error,
    },
}
