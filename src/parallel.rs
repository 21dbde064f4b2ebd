//! Parallel batch writer: spec.md §4.6, ported from the
//! `#pragma omp parallel ... #pragma omp for ordered schedule(dynamic)` region in
//! `writefile()` in `examples/original_source/src/fwrite.c`.
//!
//! Workers claim batches dynamically from a shared counter (standing in for OpenMP's
//! `schedule(dynamic)`) and commit to the sink through a strict-ascending ticket lock
//! (standing in for `#pragma omp ordered`) -- one of the three equivalent ordered-
//! emission models spec.md §9 allows. Grounded on the teacher's `thread_pool.rs`
//! (removed in the final trim, see DESIGN.md), which distributed dynamic work over a
//! fixed worker set with a completion `Condvar`; this writer additionally needs
//! commits to land in strict batch order, which that pool had no notion of, so a
//! `std::thread::scope` fan-out plus a dedicated ticket lock replaces it rather than
//! layering ordering on top of a channel-based pool.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, instrument};

use crate::config::WriteOptions;
use crate::encode::encode_batch;
use crate::error::WriteError;
use crate::sink::Sink;
use crate::table::Table;

const BUF_TARGET: usize = 1024 * 1024;

/// Strict-ascending turnstile: batch `k` may enter its ordered section only once
/// batch `k - 1` has left it.
struct OrderedBarrier {
    next: Mutex<usize>,
    cvar: Condvar,
}

impl OrderedBarrier {
    fn new() -> Self {
        OrderedBarrier {
            next: Mutex::new(0),
            cvar: Condvar::new(),
        }
    }

    fn wait_turn(&self, batch: usize) {
        let mut guard = self.next.lock().unwrap();
        while *guard != batch {
            guard = self.cvar.wait(guard).unwrap();
        }
    }

    fn advance(&self) {
        let mut guard = self.next.lock().unwrap();
        *guard += 1;
        self.cvar.notify_all();
    }
}

enum FailureReason {
    OutOfMemory,
    Write(io::Error),
}

struct Shared {
    failed: AtomicBool,
    reason: Mutex<Option<FailureReason>>,
}

impl Shared {
    fn record(&self, reason: FailureReason) {
        // First failure wins; later ones (e.g. every other thread's buffer failing
        // to allocate after the first already has) are dropped.
        let mut guard = self.reason.lock().unwrap();
        if guard.is_none() {
            *guard = Some(reason);
        }
        self.failed.store(true, Ordering::SeqCst);
    }

    fn is_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }
}

/// Writes every data row of `table` to `sink` in parallel, preserving row order.
/// `sink` is locked for the duration of each ordered commit only.
#[instrument(skip(table, opts, sink, progress))]
pub(crate) fn run(
    table: &Table,
    opts: &WriteOptions,
    sink: &Mutex<Sink>,
    progress: bool,
) -> Result<(), WriteError> {
    let n_rows = table.n_rows();
    if n_rows == 0 {
        return Ok(());
    }

    let line_bound = crate::linebound::row_line_bound(table, opts);
    let buf_size = BUF_TARGET.max(line_bound);
    let rows_per_batch = (buf_size / line_bound).max(1);
    let num_batches = n_rows.div_ceil(rows_per_batch);

    let console_forced = sink.lock().unwrap().forces_single_thread();
    let n_threads = if console_forced { 1 } else { opts.threads.max(1) }.min(num_batches);

    debug!(
        num_batches,
        rows_per_batch,
        buf_size,
        n_threads,
        "starting parallel batch write"
    );

    let next_batch = AtomicUsize::new(0);
    let barrier = OrderedBarrier::new();
    let shared = Shared {
        failed: AtomicBool::new(false),
        reason: Mutex::new(None),
    };
    let start = Instant::now();
    let next_progress_at = Mutex::new(start + Duration::from_secs(2));
    let hint = Duration::from_secs(1);

    std::thread::scope(|scope| {
        for worker_index in 0..n_threads {
            let next_batch = &next_batch;
            let barrier = &barrier;
            let shared = &shared;
            let sink = &sink;
            let next_progress_at = &next_progress_at;
            scope.spawn(move || {
                worker_loop(
                    table,
                    opts,
                    buf_size,
                    line_bound,
                    rows_per_batch,
                    n_rows,
                    num_batches,
                    n_threads,
                    next_batch,
                    barrier,
                    shared,
                    sink,
                    worker_index,
                    progress,
                    start,
                    hint,
                    next_progress_at,
                );
            });
        }
    });

    match shared.reason.into_inner().unwrap() {
        Some(FailureReason::OutOfMemory) => Err(WriteError::OutOfMemory),
        Some(FailureReason::Write(source)) => Err(WriteError::WriteFailed {
            path: sink_path(sink),
            source,
        }),
        None => Ok(()),
    }
}

#[allow(clippy::too_many_arguments)]
#[instrument(skip_all, fields(worker_index, num_batches))]
fn worker_loop(
    table: &Table,
    opts: &WriteOptions,
    buf_size: usize,
    line_bound: usize,
    rows_per_batch: usize,
    n_rows: usize,
    num_batches: usize,
    n_threads: usize,
    next_batch: &AtomicUsize,
    barrier: &OrderedBarrier,
    shared: &Shared,
    sink: &Mutex<Sink>,
    worker_index: usize,
    progress: bool,
    start: Instant,
    hint: Duration,
    next_progress_at: &Mutex<Instant>,
) {
    let mut buffer: Vec<u8> = Vec::new();
    if buffer.try_reserve_exact(buf_size).is_err() {
        shared.record(FailureReason::OutOfMemory);
        // Still participate in every ordered section so no other thread deadlocks
        // waiting on a batch this thread claimed but can't produce.
    } else {
        buffer.resize(buf_size, 0);
    }

    loop {
        let batch = next_batch.fetch_add(1, Ordering::SeqCst);
        if batch >= num_batches {
            return;
        }
        if shared.is_failed() {
            // Not a `break`: still claim and pass through every remaining batch so
            // the ordered barrier's sequence isn't left permanently stuck on us.
            barrier.wait_turn(batch);
            barrier.advance();
            continue;
        }

        let row_start = batch * rows_per_batch;
        let row_end = (row_start + rows_per_batch).min(n_rows);
        let mut len = 0usize;
        if !buffer.is_empty() {
            encode_batch(table, row_start, row_end, opts, &mut buffer, &mut len);
            debug_assert!(
                len <= (row_end - row_start) * line_bound,
                "batch exceeded its proven line bound"
            );
        }

        barrier.wait_turn(batch);
        if !shared.is_failed() {
            let mut guard = sink.lock().unwrap();
            if let Err(err) = guard.write_buffer(&buffer[..len]) {
                if let WriteError::WriteFailed { source, .. } = err {
                    shared.record(FailureReason::Write(source));
                }
            }
            drop(guard);

            if progress && worker_index == 0 {
                maybe_print_progress(row_end, n_rows, n_threads, start, hint, next_progress_at);
            }
        }
        barrier.advance();
    }
}

fn maybe_print_progress(
    rows_done: usize,
    n_rows: usize,
    n_threads: usize,
    start: Instant,
    hint: Duration,
    next_progress_at: &Mutex<Instant>,
) {
    let now = Instant::now();
    if now < start + Duration::from_secs(2) {
        return;
    }
    let mut next = next_progress_at.lock().unwrap();
    if now < *next {
        return;
    }
    *next = now + hint;
    drop(next);

    let elapsed = now.saturating_duration_since(start).as_secs();
    let pct = 100.0 * rows_done as f64 / n_rows as f64;
    let eta = if rows_done > 0 {
        ((n_rows - rows_done) as f64 * (elapsed as f64 / rows_done as f64)) as u64
    } else {
        0
    };
    eprint!(
        "\rWritten {pct:.1}% of {n_rows} rows in {elapsed} secs using {n_threads} thread{}. ETA {eta} secs.",
        if n_threads == 1 { "" } else { "s" }
    );
}

/// Clears the progress line left on the console by [`maybe_print_progress`].
pub(crate) fn clear_progress_line() {
    eprint!("\r{}\r", " ".repeat(84));
}

fn sink_path(sink: &Mutex<Sink>) -> String {
    match &*sink.lock().unwrap() {
        Sink::File { path, .. } => path.clone(),
        Sink::Console => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpenMode;
    use crate::sink::Destination;
    use crate::table::Column;

    fn make_table(n: usize) -> Table {
        Table::new(vec![
            Column::Int32((0..n as i32).collect()),
            Column::Double((0..n).map(|i| i as f64 * 1.5).collect()),
        ])
        .unwrap()
    }

    #[test]
    fn determinism_across_thread_counts() {
        let table = make_table(5_000);
        let dir = tempfile::tempdir().unwrap();

        let mut outputs = Vec::new();
        for threads in [1usize, 2, 8] {
            let path = dir.path().join(format!("out_{threads}.csv"));
            let opts = WriteOptions::default().threads(threads);
            let sink = Mutex::new(
                Sink::open(&Destination::Path(path.clone()), OpenMode::Truncate).unwrap(),
            );
            run(&table, &opts, &sink, false).unwrap();
            sink.into_inner().unwrap().close().unwrap();
            outputs.push(std::fs::read(&path).unwrap());
        }
        assert_eq!(outputs[0], outputs[1]);
        assert_eq!(outputs[0], outputs[2]);
    }

    #[test]
    fn every_row_within_its_bound() {
        let table = make_table(257);
        let opts = WriteOptions::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let sink = Mutex::new(Sink::open(&Destination::Path(path.clone()), OpenMode::Truncate).unwrap());
        run(&table, &opts, &sink, false).unwrap();
        sink.into_inner().unwrap().close().unwrap();

        let bound = crate::linebound::row_line_bound(&table, &opts);
        let content = std::fs::read_to_string(&path).unwrap();
        for line in content.split_inclusive('\n') {
            assert!(line.len() <= bound, "line {line:?} exceeded bound {bound}");
        }
    }

    #[test]
    fn empty_table_writes_nothing() {
        let table = Table::new(vec![Column::Int32(vec![])]).unwrap();
        let opts = WriteOptions::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let sink = Mutex::new(Sink::open(&Destination::Path(path.clone()), OpenMode::Truncate).unwrap());
        run(&table, &opts, &sink, false).unwrap();
        sink.into_inner().unwrap().close().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"");
    }
}
