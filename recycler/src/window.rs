//! Interval math along one scroll axis.

use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::Window;

/// Returns `true` when the item interval `[start, end]` intersects `window`.
///
/// An item intersects when either edge lies strictly inside the window, when it spans the
/// whole window, or when it has zero length and sits exactly on a window boundary.
pub fn intersects(window: &Window, start: f64, end: f64) -> bool {
    is_in_bounds(window, start)
        || is_in_bounds(window, end)
        || spans_window(window, start, end)
        || is_zero_length_on_edge(window, start, end)
}

fn is_in_bounds(window: &Window, bound: f64) -> bool {
    window.start < bound && window.end > bound
}

fn spans_window(window: &Window, start: f64, end: f64) -> bool {
    window.start >= start && window.end <= end
}

fn is_zero_length_on_edge(window: &Window, start: f64, end: f64) -> bool {
    start == end && (window.start == start || window.end == end)
}

/// Writes the elements of sorted `a` that are missing from sorted `b` into `out`.
///
/// Both inputs must be sorted ascending and duplicate-free; `out` stays sorted.
pub(crate) fn sorted_difference(a: &[usize], b: &[usize], out: &mut Vec<usize>) {
    out.clear();
    let mut j = 0usize;
    for &x in a {
        while j < b.len() && b[j] < x {
            j += 1;
        }
        if j >= b.len() || b[j] != x {
            out.push(x);
        }
    }
}

/// Returns the smallest index whose value is `>= target`.
///
/// `value_at` must be non-decreasing over `0..count`. When every value is below `target` the
/// last index is returned, so the result always points at an existing item when `count > 0`.
pub(crate) fn closest_higher_value_index(
    count: usize,
    target: f64,
    value_at: impl Fn(usize) -> f64,
) -> usize {
    if count == 0 {
        return 0;
    }
    let mut lo = 0usize;
    let mut hi = count;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        match value_at(mid).partial_cmp(&target) {
            Some(Ordering::Less) => lo = mid + 1,
            _ => hi = mid,
        }
    }
    lo.min(count - 1)
}
