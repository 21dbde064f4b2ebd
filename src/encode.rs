//! Row encoder: spec.md §4.4, ported from the three branches (`sameType==REALSXP`,
//! `sameType==INTSXP`, mixed) of the batch loop in `writefile()` in
//! `examples/original_source/src/fwrite.c`.

use crate::config::{QuoteMode, WriteOptions};
use crate::format::{float, int, string};
use crate::table::{Column, RowNames, Table, NA_INT32, NA_INT64};

/// Encodes rows `[start, end)` into `buf` starting at `*pos`, choosing the fastest
/// applicable path. The two specialized fast paths (all-`DOUBLE`, all-`INT32`, no
/// row-names) must be byte-identical to the general path; tests in this module and
/// in `linebound.rs` check that invariant.
pub fn encode_batch(
    table: &Table,
    start: usize,
    end: usize,
    opts: &WriteOptions,
    buf: &mut [u8],
    pos: &mut usize,
) {
    if opts.turbo && table.is_all_double() {
        for row in start..end {
            encode_row_all_double(table, row, opts, buf, pos);
        }
    } else if opts.turbo && table.is_all_int32() {
        for row in start..end {
            encode_row_all_int32(table, row, opts, buf, pos);
        }
    } else {
        for row in start..end {
            encode_row(table, row, opts, buf, pos);
        }
    }
}

fn encode_row_all_double(table: &Table, row: usize, opts: &WriteOptions, buf: &mut [u8], pos: &mut usize) {
    for column in table.columns() {
        let Column::Double(values) = column else {
            unreachable!("is_all_double guarantees every column is DOUBLE")
        };
        float::write_float(buf, pos, values[row], opts.dec_sep, &opts.na_str);
        buf[*pos] = opts.col_sep;
        *pos += 1;
    }
    finish_row(buf, pos, opts);
}

fn encode_row_all_int32(table: &Table, row: usize, opts: &WriteOptions, buf: &mut [u8], pos: &mut usize) {
    for column in table.columns() {
        let Column::Int32(values) = column else {
            unreachable!("is_all_int32 guarantees every column is INT32")
        };
        write_int32_cell(values[row], opts, buf, pos);
        buf[*pos] = opts.col_sep;
        *pos += 1;
    }
    finish_row(buf, pos, opts);
}

/// General path: row-names (if any) followed by a per-cell kind dispatch.
pub fn encode_row(table: &Table, row: usize, opts: &WriteOptions, buf: &mut [u8], pos: &mut usize) {
    if let Some(row_names) = table.row_names() {
        write_row_name(row_names, row, opts, buf, pos);
        buf[*pos] = opts.col_sep;
        *pos += 1;
    }
    for column in table.columns() {
        write_cell(column, row, opts, buf, pos);
        buf[*pos] = opts.col_sep;
        *pos += 1;
    }
    finish_row(buf, pos, opts);
}

fn write_row_name(row_names: &RowNames, row: usize, opts: &WriteOptions, buf: &mut [u8], pos: &mut usize) {
    match row_names {
        RowNames::Implicit => {
            let quoted = opts.quote != QuoteMode::Never;
            if quoted {
                buf[*pos] = b'"';
                *pos += 1;
            }
            int::write_int(buf, pos, (row + 1) as i64);
            if quoted {
                buf[*pos] = b'"';
                *pos += 1;
            }
        }
        RowNames::Explicit(names) => {
            string::write_string(buf, pos, &names[row], opts.col_sep, opts.quote, opts.qmethod);
        }
    }
}

fn write_cell(column: &Column, row: usize, opts: &WriteOptions, buf: &mut [u8], pos: &mut usize) {
    match column {
        Column::Bool(values) => match values[row] {
            None => write_na(buf, pos, opts),
            Some(true) => write_literal(buf, pos, b"TRUE"),
            Some(false) => write_literal(buf, pos, b"FALSE"),
        },
        Column::Int32(values) => write_int32_cell(values[row], opts, buf, pos),
        Column::Int64(values) => {
            let v = values[row];
            if v == NA_INT64 {
                write_na(buf, pos, opts);
            } else if opts.turbo {
                int::write_int(buf, pos, v);
            } else {
                int::write_int_fallback(buf, pos, v);
            }
        }
        Column::Double(values) => {
            let v = values[row];
            if opts.turbo {
                float::write_float(buf, pos, v, opts.dec_sep, &opts.na_str);
            } else {
                float::write_float_fallback(buf, pos, v, &opts.na_str);
            }
        }
        Column::Factor { codes, levels } => {
            let code = codes[row];
            if code == 0 || code == NA_INT32 {
                write_na(buf, pos, opts);
            } else {
                string::write_string(
                    buf,
                    pos,
                    &levels[(code - 1) as usize],
                    opts.col_sep,
                    opts.quote,
                    opts.qmethod,
                );
            }
        }
        Column::String(values) => match &values[row] {
            None => write_na(buf, pos, opts),
            Some(s) => string::write_string(buf, pos, s, opts.col_sep, opts.quote, opts.qmethod),
        },
    }
}

fn write_int32_cell(v: i32, opts: &WriteOptions, buf: &mut [u8], pos: &mut usize) {
    if v == NA_INT32 {
        write_na(buf, pos, opts);
    } else if opts.turbo {
        int::write_int(buf, pos, v as i64);
    } else {
        int::write_int_fallback(buf, pos, v as i64);
    }
}

fn write_na(buf: &mut [u8], pos: &mut usize, opts: &WriteOptions) {
    buf[*pos..*pos + opts.na_str.len()].copy_from_slice(&opts.na_str);
    *pos += opts.na_str.len();
}

fn write_literal(buf: &mut [u8], pos: &mut usize, lit: &[u8]) {
    buf[*pos..*pos + lit.len()].copy_from_slice(lit);
    *pos += lit.len();
}

/// Overwrites the trailing column separator with the row terminator.
fn finish_row(buf: &mut [u8], pos: &mut usize, opts: &WriteOptions) {
    *pos -= 1; // back up onto the last col_sep
    let row_sep = &opts.row_sep;
    buf[*pos..*pos + row_sep.len()].copy_from_slice(row_sep);
    *pos += row_sep.len();
}
