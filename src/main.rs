//! Thin demo binary: builds a small synthetic table from a handful of flags and
//! hands it to [`fwrite::write_csv`]. Not part of the library's core scope --
//! exists so the crate is runnable and testable end-to-end (spec.md §6).

use std::path::PathBuf;

use clap::Parser;

use fwrite::{Column, Destination, Table, WriteOptions};

#[derive(Parser)]
#[command(name = "fwrite", about = "Write a synthetic table as delimited text")]
struct Args {
    /// Output path. Omit (or pass `-`) to write to the console instead.
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Number of synthetic rows to generate.
    #[arg(short, long, default_value_t = 1_000)]
    rows: usize,

    /// Worker thread count (ignored when writing to the console).
    #[arg(short, long)]
    threads: Option<usize>,

    /// Field separator byte.
    #[arg(long, default_value = ",")]
    sep: char,

    /// Show a progress line while writing.
    #[arg(long)]
    progress: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    fwrite::trace::init();

    let args = Args::parse();
    let table = synthetic_table(args.rows);

    let mut opts = WriteOptions::new()
        .col_sep(args.sep as u8)
        .show_progress(args.progress);
    if let Some(threads) = args.threads {
        opts = opts.threads(threads);
    }

    let dest = if args.output == "-" {
        Destination::Console
    } else {
        Destination::Path(PathBuf::from(args.output))
    };

    fwrite::write_csv(&table, &opts, dest)?;
    Ok(())
}

fn synthetic_table(n: usize) -> Table {
    let ids: Vec<i32> = (0..n as i32).collect();
    let values: Vec<f64> = (0..n).map(|i| (i as f64) * 1.000_1 - 500.0).collect();
    let labels: Vec<Option<String>> = (0..n)
        .map(|i| {
            if i != 0 && i % 37 == 0 {
                None
            } else {
                Some(format!("row-{i}"))
            }
        })
        .collect();

    Table::new(vec![
        Column::Int32(ids),
        Column::Double(values),
        Column::String(labels),
    ])
    .expect("synthetic columns share one length by construction")
    .with_col_names(vec!["id".to_string(), "value".to_string(), "label".to_string()])
}
