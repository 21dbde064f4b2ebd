//! The `ColumnView` capability spec.md §9 describes: a host-agnostic binding of
//! column data. Since this crate has no host runtime to bind against, the binding
//! *is* this module -- `Column` and `Table` own their data directly.

use crate::error::WriteError;
use tracing::instrument;

/// Sentinel for a missing `INT32` value, matching R's `NA_INTEGER` convention.
pub const NA_INT32: i32 = i32::MIN;

/// Sentinel for a missing `INT64`-overlay value, matching the `bit64`/data.table
/// `NAINT64` convention. See DESIGN.md for why this exact value was chosen.
pub const NA_INT64: i64 = i64::MIN;

#[cfg(test)]
static_assertions::const_assert_eq!(NA_INT32, i32::MIN);
#[cfg(test)]
static_assertions::const_assert_eq!(NA_INT64, i64::MIN);

#[cfg(test)]
static_assertions::assert_impl_all!(Table: Send, Sync);
#[cfg(test)]
static_assertions::assert_impl_all!(Column: Send, Sync);

/// A single homogeneous, typed column. Every variant's `Vec` shares one length `N`
/// with every other column in its `Table`.
#[derive(Debug, Clone)]
pub enum Column {
    Bool(Vec<Option<bool>>),
    Int32(Vec<i32>),
    /// `INT64` overlay. A value equal to [`NA_INT64`] is missing.
    Int64(Vec<i64>),
    /// `DOUBLE`. Any `NaN` is missing.
    Double(Vec<f64>),
    /// `FACTOR`: 1-based indices into `levels`. A code of `0` or [`NA_INT32`] is missing.
    Factor { codes: Vec<i32>, levels: Vec<String> },
    /// `STRING`. `None` is the missing token, kept distinct from the text value `"NA"`.
    String(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Bool(v) => v.len(),
            Column::Int32(v) => v.len(),
            Column::Int64(v) => v.len(),
            Column::Double(v) => v.len(),
            Column::Factor { codes, .. } => codes.len(),
            Column::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Widest level/value in bytes, used by the line-bound calculator. `0` for
    /// columns with no notion of per-value text width.
    pub fn widest_text(&self) -> usize {
        match self {
            Column::Factor { levels, .. } => levels.iter().map(|s| s.len()).max().unwrap_or(0),
            Column::String(v) => v
                .iter()
                .map(|s| s.as_ref().map(|s| s.len()).unwrap_or(0))
                .max()
                .unwrap_or(0),
            _ => 0,
        }
    }
}

/// How the row-identifier column, if requested, is populated.
#[derive(Debug, Clone)]
pub enum RowNames {
    /// `1..N` printed as plain integers.
    Implicit,
    /// An explicit caller-supplied label per row.
    Explicit(Vec<String>),
}

impl RowNames {
    pub fn widest_text(&self, n_rows: usize) -> usize {
        match self {
            RowNames::Implicit => {
                if n_rows == 0 {
                    1
                } else {
                    ((n_rows as f64).log10().floor() as usize) + 1
                }
            }
            RowNames::Explicit(v) => v.iter().map(|s| s.len()).max().unwrap_or(0),
        }
    }
}

/// An ordered sequence of equal-length columns, plus optional names.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
    col_names: Option<Vec<String>>,
    row_names: Option<RowNames>,
}

impl Table {
    /// Builds a table, validating that every column shares the first column's length.
    #[instrument(skip(columns), fields(n_cols = columns.len()))]
    pub fn new(columns: Vec<Column>) -> Result<Self, WriteError> {
        let n_rows = columns.first().map(|c| c.len()).unwrap_or(0);
        for (index, col) in columns.iter().enumerate() {
            if col.len() != n_rows {
                return Err(WriteError::ShapeMismatch {
                    index,
                    expected: n_rows,
                    found: col.len(),
                });
            }
        }
        Ok(Table {
            columns,
            n_rows,
            col_names: None,
            row_names: None,
        })
    }

    pub fn with_col_names(mut self, names: Vec<String>) -> Self {
        self.col_names = Some(names);
        self
    }

    pub fn with_row_names(mut self, row_names: RowNames) -> Self {
        self.row_names = Some(row_names);
        self
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn col_names(&self) -> Option<&[String]> {
        self.col_names.as_deref()
    }

    pub fn row_names(&self) -> Option<&RowNames> {
        self.row_names.as_ref()
    }

    /// True when every column is `DOUBLE` and no row-names column is requested --
    /// the fast path from spec.md §4.4.
    pub fn is_all_double(&self) -> bool {
        self.row_names.is_none() && self.columns.iter().all(|c| matches!(c, Column::Double(_)))
    }

    /// True when every column is plain `INT32` (not a factor) and no row-names
    /// column is requested -- the other fast path from spec.md §4.4.
    pub fn is_all_int32(&self) -> bool {
        self.row_names.is_none() && self.columns.iter().all(|c| matches!(c, Column::Int32(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_lengths() {
        let err = Table::new(vec![
            Column::Int32(vec![1, 2, 3]),
            Column::Int32(vec![1, 2]),
        ])
        .unwrap_err();
        match err {
            WriteError::ShapeMismatch {
                index,
                expected,
                found,
            } => {
                assert_eq!(index, 1);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn detects_fast_paths() {
        let t = Table::new(vec![Column::Double(vec![1.0, 2.0])]).unwrap();
        assert!(t.is_all_double());
        assert!(!t.is_all_int32());

        let t = Table::new(vec![Column::Int32(vec![1, 2])]).unwrap();
        assert!(t.is_all_int32());
        assert!(!t.is_all_double());

        let t = Table::new(vec![Column::Int32(vec![1, 2])])
            .unwrap()
            .with_row_names(RowNames::Implicit);
        assert!(!t.is_all_int32());
    }

    #[test]
    fn implicit_row_name_width() {
        assert_eq!(RowNames::Implicit.widest_text(9), 1);
        assert_eq!(RowNames::Implicit.widest_text(10), 2);
        assert_eq!(RowNames::Implicit.widest_text(999), 3);
    }
}
