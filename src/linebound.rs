//! Line-bound calculator: spec.md §4.5, ported from the `lineLenMax` accumulation in
//! `writefile()` in `examples/original_source/src/fwrite.c`.
//!
//! Computes `L`, a hard upper bound in bytes on any single serialized row, before any
//! row is emitted. Buffers are sized from `L` and never grown or bounds-checked per
//! byte in the hot path, so this bound must never be exceeded at runtime.

use tracing::instrument;

use crate::config::WriteOptions;
use crate::format::string::worst_case_width;
use crate::table::{Column, RowNames, Table};

/// Upper bound on the byte length of any single data row.
#[instrument(skip(table, opts), fields(n_cols = table.n_cols()))]
pub fn row_line_bound(table: &Table, opts: &WriteOptions) -> usize {
    let mut bound = 2; // worst-case row terminator width (\r\n)

    if let Some(row_names) = table.row_names() {
        bound += row_names.widest_text(table.n_rows()) + 1 /* leading col_sep */ + 2 /* optional quotes */;
    }

    for column in table.columns() {
        bound += column_bound(column);
        bound += 1; // trailing column separator
    }

    let _ = opts; // reserved: col_sep/dec_sep don't change the byte budget, only content
    bound
}

fn column_bound(column: &Column) -> usize {
    match column {
        Column::Bool(_) => 5, // width of "FALSE"
        Column::Int32(_) => 11,
        Column::Int64(_) | Column::Double(_) => 25, // 15 sig figs, sign, dec, e, sign, 3-digit exp, safety
        Column::Factor { levels, .. } => {
            let widest = levels.iter().map(|s| s.len()).max().unwrap_or(0);
            worst_case_width(widest)
        }
        Column::String(values) => {
            let widest = values
                .iter()
                .map(|s| s.as_ref().map(|s| s.len()).unwrap_or(0))
                .max()
                .unwrap_or(0);
            worst_case_width(widest)
        }
    }
}

/// Upper bound on the byte length of the header row, when one is requested.
#[instrument(skip(table), fields(n_cols = table.n_cols()))]
pub fn header_line_bound(table: &Table) -> usize {
    let mut bound = 2;
    if table.row_names().is_some() {
        bound += 2 /* quotes around an empty row-name header cell */ + 1;
    }
    if let Some(names) = table.col_names() {
        for name in names {
            bound += worst_case_width(name.len()) + 1;
        }
    }
    bound
}
