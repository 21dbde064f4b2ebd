//! The configuration surface for one write: everything in it is immutable for the
//! duration of a single [`crate::write_csv`] call.

/// How string fields get quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteMode {
    /// Never surround a field with quotes, even if it contains `col_sep` or `\n`.
    Never,
    /// Always surround string fields with quotes.
    Always,
    /// Quote a field iff it contains `col_sep` or `\n`. The default.
    Auto,
}

/// How an embedded quote character is escaped inside a quoted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteMethod {
    /// Backslash-escape `"` and `\`.
    Escape,
    /// Double every `"`.
    Double,
}

/// Whether a write opens its target file in append or truncate mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Truncate,
    Append,
}

#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Single byte between fields.
    pub col_sep: u8,
    /// Byte sequence ending each row, e.g. `b"\n"` or `b"\r\n"`.
    pub row_sep: Vec<u8>,
    /// Single byte used as the decimal point in numeric output.
    pub dec_sep: u8,
    /// Byte sequence emitted for any missing value.
    pub na_str: Vec<u8>,
    pub quote: QuoteMode,
    pub qmethod: QuoteMethod,
    pub open_mode: OpenMode,
    pub row_names: bool,
    pub col_names: bool,
    /// When true, use the hand-rolled formatters from `src/format`. When false, fall
    /// back to the platform's formatted-I/O-equivalent rendering for numeric columns
    /// (see [`crate::format::float::write_float_fallback`] and
    /// [`crate::format::int::write_int_fallback`]).
    pub turbo: bool,
    /// Desired worker thread count. Forced to 1 when writing to the console sink.
    pub threads: usize,
    /// Emit a periodic progress line to the console while writing.
    pub show_progress: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            col_sep: b',',
            row_sep: b"\n".to_vec(),
            dec_sep: b'.',
            na_str: Vec::new(),
            quote: QuoteMode::Auto,
            qmethod: QuoteMethod::Escape,
            open_mode: OpenMode::Truncate,
            row_names: false,
            col_names: true,
            turbo: true,
            threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            show_progress: false,
        }
    }
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn col_sep(mut self, b: u8) -> Self {
        self.col_sep = b;
        self
    }

    pub fn row_sep(mut self, sep: impl Into<Vec<u8>>) -> Self {
        self.row_sep = sep.into();
        self
    }

    pub fn dec_sep(mut self, b: u8) -> Self {
        self.dec_sep = b;
        self
    }

    pub fn na_str(mut self, na: impl Into<Vec<u8>>) -> Self {
        self.na_str = na.into();
        self
    }

    pub fn quote(mut self, q: QuoteMode) -> Self {
        self.quote = q;
        self
    }

    pub fn qmethod(mut self, m: QuoteMethod) -> Self {
        self.qmethod = m;
        self
    }

    pub fn open_mode(mut self, m: OpenMode) -> Self {
        self.open_mode = m;
        self
    }

    pub fn row_names(mut self, yes: bool) -> Self {
        self.row_names = yes;
        self
    }

    pub fn col_names(mut self, yes: bool) -> Self {
        self.col_names = yes;
        self
    }

    pub fn turbo(mut self, yes: bool) -> Self {
        self.turbo = yes;
        self
    }

    pub fn threads(mut self, n: usize) -> Self {
        self.threads = n.max(1);
        self
    }

    pub fn show_progress(mut self, yes: bool) -> Self {
        self.show_progress = yes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let opts = WriteOptions::default();
        assert_eq!(opts.col_sep, b',');
        assert_eq!(opts.row_sep, b"\n");
        assert_eq!(opts.dec_sep, b'.');
        assert_eq!(opts.na_str, b"");
        assert_eq!(opts.quote, QuoteMode::Auto);
        assert_eq!(opts.qmethod, QuoteMethod::Escape);
        assert!(!opts.row_names);
        assert!(opts.col_names);
        assert!(opts.turbo);
    }

    #[test]
    fn builder_overrides_stick() {
        let opts = WriteOptions::new()
            .col_sep(b';')
            .na_str("NA")
            .quote(QuoteMode::Always)
            .threads(4);
        assert_eq!(opts.col_sep, b';');
        assert_eq!(opts.na_str, b"NA");
        assert_eq!(opts.quote, QuoteMode::Always);
        assert_eq!(opts.threads, 4);
    }
}
