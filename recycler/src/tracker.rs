use alloc::vec::Vec;

use crate::TrackerSnapshot;
use crate::window::{closest_higher_value_index, intersects, sorted_difference};
use crate::{Dimension, IndexChange, Layout, Orientation, Window, WindowUpdate};

/// Offsets above this are located with a binary search instead of a linear scan.
pub const DEFAULT_BINARY_SEARCH_THRESHOLD: f64 = 5000.0;

// Skips items whose trailing edge sits exactly on the viewport's leading edge.
const LOGICAL_VISIBILITY_BIAS: f64 = 0.001;

/// Computes which indexes are visible and engaged for a scroll offset.
///
/// The tracker keeps the last visible and engaged sets (both sorted) and reports what entered
/// and left on every recomputation. Recomputation is driven by the caller:
/// - [`ViewabilityTracker::init`] for the first fit
/// - [`ViewabilityTracker::update_offset`] on scroll
/// - [`ViewabilityTracker::force_refresh`] / [`ViewabilityTracker::force_refresh_with_offset`]
///   after the layout table changed
///
/// Each of these returns a [`WindowUpdate`] that must be applied by the owner.
///
/// Layouts must be contiguous along the scroll axis and non-decreasing in their leading edge.
#[derive(Clone, Debug)]
pub struct ViewabilityTracker {
    current_offset: f64,
    max_offset: f64,
    actual_offset: f64,
    render_ahead_offset: f64,
    visible_window: Window,
    engaged_window: Window,
    orientation: Orientation,
    window_bound: f64,
    visible_indexes: Vec<usize>,
    engaged_indexes: Vec<usize>,
    layouts: Vec<Layout>,
    binary_search_threshold: f64,
}

impl ViewabilityTracker {
    pub fn new(render_ahead_offset: f64, initial_offset: f64) -> Self {
        Self {
            current_offset: initial_offset.max(0.0),
            max_offset: 0.0,
            actual_offset: 0.0,
            render_ahead_offset: render_ahead_offset.max(0.0),
            visible_window: Window::default(),
            engaged_window: Window::default(),
            orientation: Orientation::Vertical,
            window_bound: 0.0,
            visible_indexes: Vec::new(),
            engaged_indexes: Vec::new(),
            layouts: Vec::new(),
            binary_search_threshold: DEFAULT_BINARY_SEARCH_THRESHOLD,
        }
    }

    /// Re-applies the render-ahead margin and the offset used by the first fit.
    pub fn configure(&mut self, render_ahead_offset: f64, initial_offset: f64) {
        self.render_ahead_offset = render_ahead_offset.max(0.0);
        self.current_offset = initial_offset.max(0.0);
    }

    /// Performs the first window computation at the configured offset.
    pub fn init(&mut self) -> WindowUpdate {
        let offset = self.clamp_offset(self.current_offset);
        vdebug!(offset, layouts = self.layouts.len(), "ViewabilityTracker::init");
        self.current_offset = offset;
        self.update_tracking_windows(offset);
        let first = self.find_first_visible_index_optimally();
        self.fit_and_update(first)
    }

    /// Replaces the layout table. `max_offset` is the content extent along the scroll axis.
    ///
    /// The previous allocation is reused.
    pub fn set_layouts(&mut self, layouts: &[Layout], max_offset: f64) {
        self.layouts.clear();
        self.layouts.extend_from_slice(layouts);
        self.max_offset = max_offset.max(0.0);
    }

    pub fn set_dimensions(&mut self, dimension: Dimension, orientation: Orientation) {
        self.set_viewport_extent(dimension.main(orientation), orientation);
    }

    pub fn set_viewport_extent(&mut self, extent: f64, orientation: Orientation) {
        self.orientation = orientation;
        self.window_bound = extent.max(0.0);
    }

    /// Recomputes the windows at the current offset.
    ///
    /// The returned flag is `true` when the current offset sits at or past
    /// `content extent - viewport extent`, i.e. the content shrank under the scroll position and
    /// the caller should reissue a scroll to the last actual offset.
    pub fn force_refresh(&mut self) -> (bool, WindowUpdate) {
        let should_force_scroll = self.current_offset >= self.max_offset - self.window_bound;
        let update = self.force_refresh_with_offset(self.current_offset);
        (should_force_scroll, update)
    }

    /// Recomputes the windows anchored at `offset`, even if it equals the current offset.
    pub fn force_refresh_with_offset(&mut self, offset: f64) -> WindowUpdate {
        let offset = self.clamp_offset(offset);
        self.apply_offset(offset, true)
    }

    /// Moves the tracker to `offset + correction`, clamped into `[0, content extent]`.
    ///
    /// When `is_actual` is set, `offset` (without correction) is recorded as the last device
    /// scroll position. Nothing is recomputed if the clamped offset did not change.
    pub fn update_offset(&mut self, offset: f64, correction: f64, is_actual: bool) -> WindowUpdate {
        if is_actual {
            self.actual_offset = offset;
        }
        let offset = self.clamp_offset(offset + correction);
        self.apply_offset(offset, false)
    }

    /// The last scroll position reported by the device.
    pub fn last_actual_offset(&self) -> f64 {
        self.actual_offset
    }

    pub fn set_actual_offset(&mut self, actual_offset: f64) {
        self.actual_offset = actual_offset;
    }

    /// The logically corrected offset the windows were last computed at.
    pub fn last_offset(&self) -> f64 {
        self.current_offset
    }

    pub fn render_ahead_offset(&self) -> f64 {
        self.render_ahead_offset
    }

    /// Changes the render-ahead margin and recomputes at the current offset.
    pub fn update_render_ahead_offset(&mut self, render_ahead_offset: f64) -> WindowUpdate {
        self.render_ahead_offset = render_ahead_offset.max(0.0);
        self.force_refresh_with_offset(self.current_offset)
    }

    pub fn binary_search_threshold(&self) -> f64 {
        self.binary_search_threshold
    }

    pub fn set_binary_search_threshold(&mut self, threshold: f64) {
        self.binary_search_threshold = threshold.max(0.0);
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn max_offset(&self) -> f64 {
        self.max_offset
    }

    pub fn window_bound(&self) -> f64 {
        self.window_bound
    }

    pub fn visible_window(&self) -> Window {
        self.visible_window
    }

    pub fn engaged_window(&self) -> Window {
        self.engaged_window
    }

    pub fn visible_indexes(&self) -> &[usize] {
        &self.visible_indexes
    }

    pub fn engaged_indexes(&self) -> &[usize] {
        &self.engaged_indexes
    }

    pub fn layout_count(&self) -> usize {
        self.layouts.len()
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            offset: self.current_offset,
            actual_offset: self.actual_offset,
            render_ahead_offset: self.render_ahead_offset,
            visible_window: self.visible_window,
            engaged_window: self.engaged_window,
            visible_indexes: self.visible_indexes.clone(),
            engaged_indexes: self.engaged_indexes.clone(),
        }
    }

    /// Returns the first index intersecting the visible window, moved back to the smallest index
    /// sharing its leading edge (e.g. the first column of a grid row).
    pub fn find_first_logically_visible_index(&self) -> usize {
        if self.layouts.is_empty() {
            return 0;
        }
        let relevant = self.find_first_visible_index_using_bs(LOGICAL_VISIBILITY_BIAS);
        let leading = self.layouts[relevant].start(self.orientation);
        let mut result = relevant;
        for i in (0..relevant).rev() {
            if self.layouts[i].start(self.orientation) != leading {
                break;
            }
            result = i;
        }
        result
    }

    fn clamp_offset(&self, offset: f64) -> f64 {
        offset.max(0.0).min(self.max_offset)
    }

    fn apply_offset(&mut self, offset: f64, force: bool) -> WindowUpdate {
        if !force && self.current_offset == offset {
            return WindowUpdate::default();
        }
        vtrace!(offset, force, "ViewabilityTracker::apply_offset");
        self.current_offset = offset;
        self.update_tracking_windows(offset);
        let start = match self.visible_indexes.first() {
            Some(&i) if i < self.layouts.len() => i,
            _ => self.find_first_visible_index_optimally(),
        };
        self.fit_and_update(start)
    }

    fn update_tracking_windows(&mut self, offset: f64) {
        self.engaged_window = Window {
            start: (offset - self.render_ahead_offset).max(0.0),
            end: offset + self.window_bound + self.render_ahead_offset,
        };
        self.visible_window = Window {
            start: offset,
            end: offset + self.window_bound,
        };
    }

    fn find_first_visible_index_optimally(&self) -> usize {
        if self.current_offset > self.binary_search_threshold {
            self.find_first_visible_index_using_bs(0.0)
        } else if self.current_offset > 0.0 {
            self.find_first_visible_index_linearly()
        } else {
            0
        }
    }

    fn find_first_visible_index_linearly(&self) -> usize {
        self.layouts
            .iter()
            .position(|l| {
                intersects(
                    &self.visible_window,
                    l.start(self.orientation),
                    l.end(self.orientation),
                )
            })
            .unwrap_or(0)
    }

    fn find_first_visible_index_using_bs(&self, bias: f64) -> usize {
        let orientation = self.orientation;
        closest_higher_value_index(
            self.layouts.len(),
            self.visible_window.start + bias,
            |i| self.layouts[i].end(orientation),
        )
    }

    fn fit_and_update(&mut self, start_index: usize) -> WindowUpdate {
        let mut visible = Vec::new();
        let mut engaged = Vec::new();
        self.fit_backward(&mut visible, &mut engaged, start_index);
        visible.reverse();
        engaged.reverse();
        self.fit_forward(&mut visible, &mut engaged, start_index.saturating_add(1));
        self.diff_and_store(visible, engaged)
    }

    // Walks down from `start_index` (inclusive). Output is in descending order.
    fn fit_backward(&self, visible: &mut Vec<usize>, engaged: &mut Vec<usize>, start_index: usize) {
        if start_index >= self.layouts.len() {
            return;
        }
        let mut located = false;
        for i in (0..=start_index).rev() {
            if self.check_intersection_and_report(i, visible, engaged) {
                located = true;
            } else if located {
                break;
            }
        }
    }

    fn fit_forward(&self, visible: &mut Vec<usize>, engaged: &mut Vec<usize>, start_index: usize) {
        let mut located = false;
        for i in start_index..self.layouts.len() {
            if self.check_intersection_and_report(i, visible, engaged) {
                located = true;
            } else if located {
                break;
            }
        }
    }

    fn check_intersection_and_report(
        &self,
        index: usize,
        visible: &mut Vec<usize>,
        engaged: &mut Vec<usize>,
    ) -> bool {
        let layout = &self.layouts[index];
        let start = layout.start(self.orientation);
        let end = layout.end(self.orientation);
        if intersects(&self.visible_window, start, end) {
            visible.push(index);
            engaged.push(index);
            true
        } else if intersects(&self.engaged_window, start, end) {
            engaged.push(index);
            true
        } else {
            false
        }
    }

    fn diff_and_store(&mut self, visible: Vec<usize>, engaged: Vec<usize>) -> WindowUpdate {
        let update = WindowUpdate {
            engaged: diff(&engaged, &self.engaged_indexes),
            visible: diff(&visible, &self.visible_indexes),
        };
        #[cfg(feature = "tracing")]
        if let Some(change) = &update.engaged {
            vtrace!(
                entering = change.entering.len(),
                leaving = change.leaving.len(),
                engaged = change.all.len(),
                "engaged set changed"
            );
        }
        self.visible_indexes = visible;
        self.engaged_indexes = engaged;
        update
    }
}

fn diff(new_items: &[usize], old_items: &[usize]) -> Option<IndexChange> {
    let mut entering = Vec::new();
    let mut leaving = Vec::new();
    sorted_difference(new_items, old_items, &mut entering);
    sorted_difference(old_items, new_items, &mut leaving);
    if entering.is_empty() && leaving.is_empty() {
        return None;
    }
    Some(IndexChange {
        all: new_items.to_vec(),
        entering,
        leaving,
    })
}
