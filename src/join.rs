//! Relational joins between two tables
//!
//! Every join runs as a single-producer/single-consumer pipeline: one scoped
//! thread enumerates matched rows and hands them over a rendezvous channel,
//! one at a time, to the calling thread, which appends them to the result
//! table. Dropping the sender is the end-of-stream marker. The result table
//! has a single owner, so no locking is involved.

use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use log::debug;
use rustc_hash::FxHashMap;

use crate::table::Table;

/// Join `left` and `right` on an arbitrary row predicate (nested loop).
///
/// For every left row, in order, every right row is tested in order; each
/// matching pair yields `left_row ++ right_row`. The result has
/// `left.column_count() + right.column_count()` columns, rows in left-major,
/// right-minor order, without deduplication.
pub fn join<F>(left: &Table, right: &Table, predicate: F) -> Table
where
    F: Fn(&[String], &[String]) -> bool + Send,
{
    debug!(
        "nested-loop join: {} x {} rows",
        left.row_count(),
        right.row_count()
    );
    let (tx, rx) = bounded(0);
    thread::scope(|s| {
        s.spawn(move || {
            for l in left.rows() {
                for r in right.rows() {
                    if predicate(l, r) && tx.send(concat(l, r)).is_err() {
                        return;
                    }
                }
            }
        });
        collect(left.column_count() + right.column_count(), rx)
    })
}

/// Like [`join`], but every left row appears in the result at least once: a
/// left row that matches no right row yields one row padded with
/// `right.column_count()` empty cells. Right rows with no match contribute
/// nothing.
pub fn left_join<F>(left: &Table, right: &Table, predicate: F) -> Table
where
    F: Fn(&[String], &[String]) -> bool + Send,
{
    debug!(
        "left outer join: {} x {} rows",
        left.row_count(),
        right.row_count()
    );
    let (tx, rx) = bounded(0);
    thread::scope(|s| {
        s.spawn(move || {
            for l in left.rows() {
                let mut matched = 0usize;
                for r in right.rows() {
                    if predicate(l, r) {
                        if tx.send(concat(l, r)).is_err() {
                            return;
                        }
                        matched += 1;
                    }
                }
                if matched == 0 {
                    let padding = vec![String::new(); right.column_count()];
                    if tx.send(concat(l, &padding)).is_err() {
                        return;
                    }
                }
            }
        });
        collect(left.column_count() + right.column_count(), rx)
    })
}

/// Equality join driven by per-side key extraction.
///
/// A multi-map is built over the table with more rows (a tie treats the right
/// table as the build side) and probed with the other, so each input is
/// scanned once. Whichever side is used for the build, emitted rows are
/// always `left_row ++ right_row`. Rows without a partner on the other side
/// are dropped. Faster than [`join`] for equality conditions, at the cost of
/// the temporary map.
pub fn hash_join<L, R>(left: &Table, right: &Table, left_key: L, right_key: R) -> Table
where
    L: Fn(&[String]) -> String + Send,
    R: Fn(&[String]) -> String + Send,
{
    let (tx, rx) = bounded(0);
    thread::scope(|s| {
        s.spawn(move || {
            if left.row_count() > right.row_count() {
                debug!(
                    "hash join: building over left ({} rows), probing right ({} rows)",
                    left.row_count(),
                    right.row_count()
                );
                probe(right, left, right_key, left_key, false, &tx);
            } else {
                debug!(
                    "hash join: building over right ({} rows), probing left ({} rows)",
                    right.row_count(),
                    left.row_count()
                );
                probe(left, right, left_key, right_key, true, &tx);
            }
        });
        collect(left.column_count() + right.column_count(), rx)
    })
}

/// Build the multi-map over `larger`, probe with `smaller`, and emit one row
/// per match in bucket insertion order. `smaller_is_left` restores the
/// external left-before-right column order.
fn probe<KS, KL>(
    smaller: &Table,
    larger: &Table,
    small_key: KS,
    large_key: KL,
    smaller_is_left: bool,
    tx: &Sender<Vec<String>>,
) where
    KS: Fn(&[String]) -> String,
    KL: Fn(&[String]) -> String,
{
    let mut buckets: FxHashMap<String, Vec<&[String]>> = FxHashMap::default();
    for row in larger.rows() {
        buckets.entry(large_key(row)).or_default().push(row);
    }
    for s_row in smaller.rows() {
        if let Some(bucket) = buckets.get(&small_key(s_row)) {
            for l_row in bucket {
                let row = if smaller_is_left {
                    concat(s_row, l_row)
                } else {
                    concat(l_row, s_row)
                };
                if tx.send(row).is_err() {
                    return;
                }
            }
        }
    }
}

fn concat(l: &[String], r: &[String]) -> Vec<String> {
    let mut row = Vec::with_capacity(l.len() + r.len());
    row.extend_from_slice(l);
    row.extend_from_slice(r);
    row
}

/// Drain the pipeline into the result table. A wrongly-sized row here is a
/// bug in the producer, not a caller error.
fn collect(ncol: usize, rx: Receiver<Vec<String>>) -> Table {
    let mut joined = Table::new(ncol).expect("joined tables have columns");
    for row in rx {
        joined.append_row(row).expect("joined row width corrupted");
    }
    joined
}
