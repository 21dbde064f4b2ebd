//! High-throughput parallel writer for column-oriented tables to delimited text,
//! modeled on data.table's `fwrite()` (see `examples/original_source/src/fwrite.c`).
//!
//! The write proceeds in three stages: validate the table's shape and compute the
//! line-length bound `L` ([`linebound`]), emit the header in one shot, then dispatch
//! the body to the ordered parallel writer ([`parallel`]) or a single-threaded path
//! when the destination forces it.

pub mod config;
pub mod encode;
pub mod error;
pub mod format;
pub mod linebound;
mod parallel;
pub mod sink;
pub mod table;
pub mod trace;

use std::sync::Mutex;

pub use config::{OpenMode, QuoteMethod, QuoteMode, WriteOptions};
pub use error::WriteError;
pub use sink::Destination;
pub use table::{Column, RowNames, Table, NA_INT32, NA_INT64};

use format::string;
use sink::Sink;
use tracing::instrument;

/// Writes every row of `table` to `dest` according to `opts`.
///
/// On success, the destination holds a header (if `opts.col_names`), followed by
/// one line per row, each terminated by `opts.row_sep`. On failure, the
/// destination's prior contents are undefined beyond "some prefix of rows, or
/// none, was written" -- workers downstream of a failure stop producing new
/// output but earlier in-flight batches may have already landed.
#[instrument(skip(table, opts), fields(n_rows = table.n_rows(), n_cols = table.n_cols()))]
pub fn write_csv(table: &Table, opts: &WriteOptions, dest: Destination) -> Result<(), WriteError> {
    let mut sink = Sink::open(&dest, opts.open_mode)?;

    let mut body_result = write_header(table, opts, &mut sink);
    if body_result.is_ok() && table.n_rows() > 0 {
        let locked = Mutex::new(sink);
        body_result = parallel::run(table, opts, &locked, opts.show_progress);
        sink = locked.into_inner().unwrap();
    }

    if opts.show_progress {
        parallel::clear_progress_line();
    }

    // Close unconditionally, even after a body failure, so the file descriptor is
    // always released; a body error still takes priority when both fail.
    let close_result = sink.close();
    body_result.and(close_result)
}

#[instrument(skip(table, opts, sink), fields(n_cols = table.n_cols()))]
fn write_header(table: &Table, opts: &WriteOptions, sink: &mut Sink) -> Result<(), WriteError> {
    if !opts.col_names {
        return Ok(());
    }

    let bound = linebound::header_line_bound(table);
    let mut buf = vec![0u8; bound];
    let mut pos = 0;

    if table.row_names().is_some() {
        // The row-names column's header cell is an empty string, quoted iff
        // `quote != NEVER` -- mirrors `encode::write_row_name`'s `RowNames::Implicit`
        // quoting decision so the header and data rows agree (spec.md §4.4).
        let row_name_quote = if opts.quote == QuoteMode::Never {
            QuoteMode::Never
        } else {
            QuoteMode::Always
        };
        string::write_string(&mut buf, &mut pos, "", opts.col_sep, row_name_quote, opts.qmethod);
        buf[pos] = opts.col_sep;
        pos += 1;
    }
    if let Some(names) = table.col_names() {
        for name in names {
            string::write_string(&mut buf, &mut pos, name, opts.col_sep, QuoteMode::Auto, opts.qmethod);
            buf[pos] = opts.col_sep;
            pos += 1;
        }
    }
    pos -= 1; // back up onto the trailing col_sep
    buf[pos..pos + opts.row_sep.len()].copy_from_slice(&opts.row_sep);
    pos += opts.row_sep.len();

    sink.write_buffer(&buf[..pos])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{QuoteMethod, QuoteMode};
    use crate::table::{Column, RowNames};

    fn table() -> Table {
        Table::new(vec![
            Column::Int32(vec![1, 2, 3]),
            Column::String(vec![
                Some("a".to_string()),
                Some("b,c".to_string()),
                None,
            ]),
        ])
        .unwrap()
        .with_col_names(vec!["id".to_string(), "label".to_string()])
    }

    #[test]
    fn writes_header_and_rows_to_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let opts = WriteOptions::default().na_str("NA");
        write_csv(&table(), &opts, Destination::Path(path.clone())).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "id,label\n1,a\n2,\"b,c\"\n3,NA\n");
    }

    #[test]
    fn zero_row_table_writes_only_the_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let t = Table::new(vec![Column::Int32(vec![])])
            .unwrap()
            .with_col_names(vec!["id".to_string()]);
        write_csv(&t, &WriteOptions::default(), Destination::Path(path.clone())).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "id\n");
    }

    #[test]
    fn no_header_when_col_names_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let opts = WriteOptions::default().col_names(false).na_str("NA");
        write_csv(&table(), &opts, Destination::Path(path.clone())).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "1,a\n2,\"b,c\"\n3,NA\n");
    }

    #[test]
    fn shape_mismatch_is_rejected_before_any_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let err = Table::new(vec![
            Column::Int32(vec![1, 2]),
            Column::Int32(vec![1, 2, 3]),
        ])
        .unwrap_err();
        assert!(matches!(err, WriteError::ShapeMismatch { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn row_names_header_cell_is_blank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let t = Table::new(vec![Column::Int32(vec![10, 20])])
            .unwrap()
            .with_col_names(vec!["v".to_string()])
            .with_row_names(RowNames::Implicit);
        write_csv(&t, &WriteOptions::default(), Destination::Path(path.clone())).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "\"\",v\n\"1\",10\n\"2\",20\n");
    }

    #[test]
    fn row_names_header_cell_is_unquoted_under_quote_never() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let t = Table::new(vec![Column::Int32(vec![10, 20])])
            .unwrap()
            .with_col_names(vec!["v".to_string()])
            .with_row_names(RowNames::Implicit);
        let opts = WriteOptions::default().quote(QuoteMode::Never);
        write_csv(&t, &opts, Destination::Path(path.clone())).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, ",v\n1,10\n2,20\n");
    }

    #[test]
    fn custom_separators_are_honored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let opts = WriteOptions::default()
            .col_sep(b'\t')
            .row_sep(b"\r\n".to_vec())
            .quote(QuoteMode::Never)
            .qmethod(QuoteMethod::Double);
        write_csv(&table(), &opts, Destination::Path(path.clone())).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "id\tlabel\r\n1\ta\r\n2\tb,c\r\n3\t\r\n");
    }
}
