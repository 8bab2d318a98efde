use crate::window::{closest_higher_value_index, intersects, sorted_difference};
use crate::*;

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() % span)
    }
}

struct ListLayout {
    sizes: Vec<f64>,
    cross: f64,
    orientation: Orientation,
    layouts: Vec<Layout>,
    extent: f64,
}

impl ListLayout {
    fn fixed(count: usize, size: f64) -> Self {
        Self::new(vec![size; count], Orientation::Vertical)
    }

    fn new(sizes: Vec<f64>, orientation: Orientation) -> Self {
        Self {
            sizes,
            cross: 100.0,
            orientation,
            layouts: Vec::new(),
            extent: 0.0,
        }
    }
}

impl LayoutManager for ListLayout {
    fn relayout_from_index(&mut self, _start_index: usize, item_count: usize) {
        self.layouts.clear();
        let mut offset = 0.0;
        for &size in self.sizes.iter().take(item_count) {
            let layout = match self.orientation {
                Orientation::Vertical => Layout::new(0.0, offset, self.cross, size),
                Orientation::Horizontal => Layout::new(offset, 0.0, size, self.cross),
            };
            self.layouts.push(layout);
            offset += size;
        }
        self.extent = offset;
    }

    fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    fn content_dimension(&self) -> Dimension {
        match self.orientation {
            Orientation::Vertical => Dimension::new(self.cross, self.extent),
            Orientation::Horizontal => Dimension::new(self.extent, self.cross),
        }
    }

    fn override_layout(&mut self, index: usize, dimension: Dimension) -> bool {
        let Some(size) = self.sizes.get_mut(index) else {
            return false;
        };
        let next = dimension.main(self.orientation);
        let changed = *size != next;
        *size = next;
        changed
    }
}

#[derive(Default)]
struct Recorder {
    stack_changes: usize,
    last_stack: Vec<(RenderKey, usize)>,
    scrolls: Vec<Point>,
    visible: Vec<IndexChange>,
}

impl RenderListener for Recorder {
    fn on_render_stack_changed(&mut self, render_stack: &RenderStack) {
        self.stack_changes += 1;
        self.last_stack = render_stack.sorted_by_index(usize::MAX);
    }

    fn on_scroll_request(&mut self, offset: Point) {
        self.scrolls.push(offset);
    }

    fn on_visible_indices_changed(&mut self, change: &IndexChange) {
        self.visible.push(change.clone());
    }
}

fn stacked(sizes: &[f64]) -> (Vec<Layout>, f64) {
    let mut layouts = Vec::with_capacity(sizes.len());
    let mut offset = 0.0;
    for &size in sizes {
        layouts.push(Layout::new(0.0, offset, 100.0, size));
        offset += size;
    }
    (layouts, offset)
}

fn tracker_for(sizes: &[f64], viewport: f64, render_ahead: f64, offset: f64) -> ViewabilityTracker {
    let (layouts, total) = stacked(sizes);
    let mut t = ViewabilityTracker::new(render_ahead, offset);
    t.set_layouts(&layouts, total);
    t.set_viewport_extent(viewport, Orientation::Vertical);
    t
}

fn expected_intersecting(sizes: &[f64], start: f64, end: f64) -> Vec<usize> {
    let mut out = Vec::new();
    let mut offset = 0.0;
    for (i, &size) in sizes.iter().enumerate() {
        if offset < end && offset + size > start {
            out.push(i);
        }
        offset += size;
    }
    out
}

fn mounted(
    count: usize,
    size: f64,
    viewport: f64,
    render_ahead: f64,
    options: RendererOptions,
) -> VirtualRenderer<Recorder> {
    let mut r = VirtualRenderer::with_listener(options, Recorder::default());
    r.set_params_and_dimensions(
        RenderStackParams::new(count).with_render_ahead_offset(render_ahead),
        Dimension::new(100.0, viewport),
    );
    r.set_layout_manager(Box::new(ListLayout::fixed(count, size)));
    r.init().unwrap();
    r
}

fn assert_pool_disjoint_from_engaged<L: RenderListener>(r: &VirtualRenderer<L>) {
    let tracker = r.viewability_tracker().unwrap();
    for &index in tracker.engaged_indexes() {
        assert!(r.is_engaged(index));
        let key = r.key_for(index).unwrap();
        assert!(
            !r.recycle_pool().contains(&key),
            "key {key} of engaged index {index} is pooled"
        );
        assert_eq!(r.render_stack().get(&key), Some(index));
    }
}

#[test]
fn intersection_requires_an_edge_inside_or_a_span() {
    let w = Window::new(100.0, 200.0);
    assert!(intersects(&w, 50.0, 150.0));
    assert!(intersects(&w, 150.0, 250.0));
    assert!(intersects(&w, 120.0, 180.0));
    assert!(intersects(&w, 0.0, 1000.0));
    assert!(intersects(&w, 100.0, 200.0));
    assert!(!intersects(&w, 50.0, 100.0));
    assert!(!intersects(&w, 200.0, 250.0));
}

#[test]
fn zero_length_item_on_window_edge_intersects() {
    let w = Window::new(100.0, 200.0);
    assert!(intersects(&w, 100.0, 100.0));
    assert!(intersects(&w, 200.0, 200.0));
    assert!(intersects(&w, 150.0, 150.0));
    assert!(!intersects(&w, 250.0, 250.0));
}

#[test]
fn sorted_difference_keeps_order() {
    let mut out = Vec::new();
    sorted_difference(&[1, 2, 3, 7, 9], &[2, 3, 4, 9], &mut out);
    assert_eq!(out, vec![1, 7]);
    sorted_difference(&[], &[1, 2], &mut out);
    assert!(out.is_empty());
    sorted_difference(&[5, 6], &[], &mut out);
    assert_eq!(out, vec![5, 6]);
}

#[test]
fn binary_search_finds_first_value_at_or_above_target() {
    let ends = [50.0, 100.0, 150.0, 200.0];
    let at = |i: usize| ends[i];
    assert_eq!(closest_higher_value_index(4, 0.0, at), 0);
    assert_eq!(closest_higher_value_index(4, 100.0, at), 1);
    assert_eq!(closest_higher_value_index(4, 100.001, at), 2);
    assert_eq!(closest_higher_value_index(4, 500.0, at), 3);
    assert_eq!(closest_higher_value_index(0, 10.0, at), 0);
}

#[test]
fn recycle_pool_add_remove_and_take() {
    let mut pool = RecyclePool::new();
    assert_eq!(pool.get_next(), None);

    pool.add(RenderKey::Index(1));
    pool.add(RenderKey::Index(2));
    pool.add(RenderKey::Index(2));
    pool.add(RenderKey::Synthetic(0));
    assert_eq!(pool.len(), 3);

    pool.remove(&RenderKey::Index(1));
    pool.remove(&RenderKey::Index(42));
    assert_eq!(pool.len(), 2);
    assert!(!pool.contains(&RenderKey::Index(1)));
    assert!(pool.contains(&RenderKey::Index(2)));

    let mut taken = vec![pool.get_next().unwrap(), pool.get_next().unwrap()];
    taken.sort();
    assert_eq!(taken, vec![RenderKey::Index(2), RenderKey::Synthetic(0)]);
    assert!(pool.is_empty());
    assert_eq!(pool.get_next(), None);
}

#[test]
fn recycle_pool_remove_from_middle_keeps_remaining_keys() {
    let mut pool = RecyclePool::new();
    for i in 0..5 {
        pool.add(RenderKey::Index(i));
    }
    pool.remove(&RenderKey::Index(1));
    pool.remove(&RenderKey::Index(3));
    let mut rest: Vec<RenderKey> = pool.iter().copied().collect();
    rest.sort();
    assert_eq!(
        rest,
        vec![RenderKey::Index(0), RenderKey::Index(2), RenderKey::Index(4)]
    );
    for key in &rest {
        assert!(pool.contains(key));
    }
}

#[test]
fn synthetic_and_index_keys_never_collide() {
    assert_ne!(RenderKey::Index(0), RenderKey::Synthetic(0));
    assert!(RenderKey::Synthetic(3).is_synthetic());
    assert!(!RenderKey::Index(3).is_synthetic());
}

#[test]
fn first_fit_at_top_engages_visible_items() {
    let mut t = tracker_for(&[50.0; 10], 120.0, 0.0, 0.0);
    let update = t.init();

    let engaged = update.engaged.unwrap();
    assert_eq!(engaged.all, vec![0, 1, 2]);
    assert_eq!(engaged.entering, vec![0, 1, 2]);
    assert!(engaged.leaving.is_empty());
    assert_eq!(t.visible_indexes(), &[0, 1, 2]);
    assert_eq!(t.engaged_indexes(), t.visible_indexes());
}

#[test]
fn render_ahead_extends_engaged_window_on_both_sides() {
    let mut t = tracker_for(&[50.0; 10], 120.0, 60.0, 200.0);
    let _ = t.init();

    assert_eq!(t.engaged_window(), Window::new(140.0, 380.0));
    assert_eq!(t.visible_window(), Window::new(200.0, 320.0));
    assert_eq!(t.engaged_indexes(), &[2, 3, 4, 5, 6, 7]);
    assert_eq!(t.visible_indexes(), &[4, 5, 6]);
}

#[test]
fn engaged_window_start_is_clamped_at_zero() {
    let mut t = tracker_for(&[50.0; 10], 120.0, 500.0, 0.0);
    let _ = t.init();
    assert_eq!(t.engaged_window().start, 0.0);
    assert_eq!(t.engaged_indexes(), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
}

#[test]
fn jump_past_content_disengages_everything() {
    let mut t = tracker_for(&[50.0; 10], 120.0, 0.0, 0.0);
    let _ = t.init();

    let update = t.update_offset(500.0, 0.0, true);
    let engaged = update.engaged.unwrap();
    assert!(engaged.all.is_empty());
    assert!(engaged.entering.is_empty());
    assert_eq!(engaged.leaving, vec![0, 1, 2]);
    assert_eq!(update.visible.unwrap().leaving, vec![0, 1, 2]);
}

#[test]
fn jump_engages_trailing_item_when_present() {
    let mut t = tracker_for(&[50.0; 11], 120.0, 0.0, 0.0);
    let _ = t.init();

    let engaged = t.update_offset(500.0, 0.0, true).engaged.unwrap();
    assert_eq!(engaged.entering, vec![10]);
    assert_eq!(engaged.leaving, vec![0, 1, 2]);
}

#[test]
fn update_offset_is_idempotent() {
    let mut t = tracker_for(&[50.0; 100], 120.0, 0.0, 0.0);
    let _ = t.init();

    let first = t.update_offset(300.0, 0.0, true);
    assert!(first.engaged.is_some());
    let second = t.update_offset(300.0, 0.0, true);
    assert!(second.is_empty());
}

#[test]
fn update_offset_clamps_and_applies_correction() {
    let mut t = tracker_for(&[50.0; 10], 120.0, 0.0, 0.0);
    let _ = t.init();

    let _ = t.update_offset(-80.0, 0.0, true);
    assert_eq!(t.last_offset(), 0.0);
    assert_eq!(t.last_actual_offset(), -80.0);

    let _ = t.update_offset(10_000.0, 0.0, false);
    assert_eq!(t.last_offset(), 500.0);
    assert_eq!(t.last_actual_offset(), -80.0);

    let _ = t.update_offset(200.0, -40.0, true);
    assert_eq!(t.last_offset(), 160.0);
    assert_eq!(t.last_actual_offset(), 200.0);
    assert_eq!(t.visible_indexes(), &[3, 4, 5]);
}

#[test]
fn force_refresh_reports_when_content_shrank_under_offset() {
    let mut t = tracker_for(&[50.0; 100], 120.0, 0.0, 0.0);
    let _ = t.init();
    let _ = t.update_offset(1000.0, 0.0, true);

    let (should_scroll, update) = t.force_refresh();
    assert!(!should_scroll);
    assert!(update.is_empty());

    let (layouts, total) = stacked(&[50.0; 20]);
    t.set_layouts(&layouts, total);
    let (should_scroll, update) = t.force_refresh();
    assert!(should_scroll);
    assert_eq!(t.last_offset(), 1000.0);
    assert_eq!(update.engaged.unwrap().leaving, vec![20, 21, 22]);
}

#[test]
fn force_refresh_with_offset_recomputes_even_at_same_offset() {
    let mut t = tracker_for(&[50.0; 10], 120.0, 0.0, 0.0);
    let _ = t.init();

    let (layouts, total) = stacked(&[100.0; 10]);
    t.set_layouts(&layouts, total);
    let update = t.force_refresh_with_offset(0.0);
    assert_eq!(update.engaged.unwrap().leaving, vec![2]);
    assert_eq!(t.engaged_indexes(), &[0, 1]);
}

#[test]
fn large_offset_uses_binary_search_for_first_fit() {
    let mut t = tracker_for(&[50.0; 1000], 120.0, 0.0, 20_000.0);
    assert!(20_000.0 > t.binary_search_threshold());
    let _ = t.init();
    assert_eq!(t.visible_indexes(), &[400, 401, 402]);
}

#[test]
fn binary_search_threshold_is_tunable() {
    let mut linear = tracker_for(&[50.0; 1000], 120.0, 30.0, 7_500.0);
    linear.set_binary_search_threshold(f64::MAX);
    let _ = linear.init();

    let mut searched = tracker_for(&[50.0; 1000], 120.0, 30.0, 7_500.0);
    searched.set_binary_search_threshold(0.0);
    let _ = searched.init();

    assert_eq!(linear.engaged_indexes(), searched.engaged_indexes());
    assert_eq!(linear.visible_indexes(), searched.visible_indexes());
}

#[test]
fn first_logically_visible_index_walks_back_to_row_start() {
    // Three columns; the middle row has a short first cell.
    let layouts = vec![
        Layout::new(0.0, 0.0, 100.0, 50.0),
        Layout::new(100.0, 0.0, 100.0, 50.0),
        Layout::new(200.0, 0.0, 100.0, 50.0),
        Layout::new(0.0, 50.0, 100.0, 20.0),
        Layout::new(100.0, 50.0, 100.0, 50.0),
        Layout::new(200.0, 50.0, 100.0, 50.0),
        Layout::new(0.0, 100.0, 100.0, 50.0),
        Layout::new(100.0, 100.0, 100.0, 50.0),
        Layout::new(200.0, 100.0, 100.0, 50.0),
    ];
    let mut t = ViewabilityTracker::new(0.0, 75.0);
    t.set_layouts(&layouts, 150.0);
    t.set_viewport_extent(50.0, Orientation::Vertical);
    let _ = t.init();

    assert_eq!(t.find_first_logically_visible_index(), 3);

    let _ = t.update_offset(100.0, 0.0, false);
    assert_eq!(t.find_first_logically_visible_index(), 6);
}

#[test]
fn render_ahead_update_recomputes_and_clamps() {
    let mut t = tracker_for(&[50.0; 20], 120.0, 0.0, 200.0);
    let _ = t.init();
    assert_eq!(t.engaged_indexes(), &[4, 5, 6]);

    let engaged = t.update_render_ahead_offset(100.0).engaged.unwrap();
    assert_eq!(engaged.entering, vec![2, 3, 7, 8]);
    assert_eq!(t.render_ahead_offset(), 100.0);

    let _ = t.update_render_ahead_offset(-5.0);
    assert_eq!(t.render_ahead_offset(), 0.0);
    assert_eq!(t.engaged_indexes(), &[4, 5, 6]);
}

#[test]
fn horizontal_tracker_uses_x_axis() {
    let layouts: Vec<Layout> = (0..10)
        .map(|i| Layout::new(i as f64 * 50.0, 0.0, 50.0, 300.0))
        .collect();
    let mut t = ViewabilityTracker::new(0.0, 200.0);
    t.set_layouts(&layouts, 500.0);
    t.set_dimensions(Dimension::new(120.0, 300.0), Orientation::Horizontal);
    let _ = t.init();
    assert_eq!(t.visible_indexes(), &[4, 5, 6]);
}

#[test]
fn snapshot_reflects_tracker_state() {
    let mut t = tracker_for(&[50.0; 10], 120.0, 60.0, 200.0);
    let _ = t.init();
    t.set_actual_offset(210.0);
    let snap = t.snapshot();
    assert_eq!(snap.offset, 200.0);
    assert_eq!(snap.actual_offset, 210.0);
    assert_eq!(snap.render_ahead_offset, 60.0);
    assert_eq!(snap.visible_indexes, vec![4, 5, 6]);
    assert_eq!(snap.engaged_indexes, vec![2, 3, 4, 5, 6, 7]);
    assert!(snap.engaged_window.contains_window(&snap.visible_window));
}

#[test]
fn random_offsets_match_brute_force_windows() {
    let mut rng = Lcg::new(0x5eed_cafe);
    for _case in 0..20 {
        let count = rng.gen_range_u64(1, 200) as usize;
        let sizes: Vec<f64> = (0..count)
            .map(|_| rng.gen_range_u64(1, 120) as f64)
            .collect();
        let total: f64 = sizes.iter().sum();
        let viewport = rng.gen_range_u64(1, 400) as f64;
        let render_ahead = rng.gen_range_u64(0, 300) as f64;

        let mut t = tracker_for(&sizes, viewport, render_ahead, 0.0);
        t.set_binary_search_threshold(rng.gen_range_u64(0, 3000) as f64);
        let _ = t.init();

        let max = (total - viewport).max(0.0) as u64;
        for _step in 0..50 {
            let offset = rng.gen_range_u64(0, max + 1) as f64;
            let _ = t.update_offset(offset, 0.0, true);

            let visible = expected_intersecting(&sizes, offset, offset + viewport);
            let engaged = expected_intersecting(
                &sizes,
                (offset - render_ahead).max(0.0),
                offset + viewport + render_ahead,
            );
            assert_eq!(t.visible_indexes(), visible.as_slice(), "offset={offset}");
            assert_eq!(t.engaged_indexes(), engaged.as_slice(), "offset={offset}");
            assert!(
                t.visible_indexes()
                    .iter()
                    .all(|i| t.engaged_indexes().contains(i))
            );
        }
    }
}

#[test]
fn renderer_requires_params_and_layout_manager() {
    let mut r = VirtualRenderer::new(RendererOptions::new());
    assert_eq!(r.init(), Err(RecyclerError::MissingParams));
    assert_eq!(
        r.update_offset(0.0, 10.0, 0.0, true),
        Err(RecyclerError::NotInitialized)
    );
    assert_eq!(r.refresh(), Err(RecyclerError::NotInitialized));
    assert_eq!(r.refresh_with_anchor(), Err(RecyclerError::NotInitialized));

    r.set_params_and_dimensions(RenderStackParams::new(10), Dimension::new(100.0, 120.0));
    assert_eq!(r.init(), Err(RecyclerError::MissingLayoutManager));
    assert_eq!(
        r.update_offset(0.0, 100.0, 0.0, true),
        Err(RecyclerError::NotInitialized)
    );
    assert!(!r.is_tracker_running());
    assert!(r.render_stack().is_empty());

    r.set_layout_manager(Box::new(ListLayout::fixed(10, 50.0)));
    assert_eq!(r.init(), Ok(()));
}

#[test]
fn set_layout_manager_lays_out_current_item_count() {
    let mut r = VirtualRenderer::new(RendererOptions::new());
    r.set_params_and_dimensions(RenderStackParams::new(4), Dimension::new(100.0, 120.0));
    r.set_layout_manager(Box::new(ListLayout::fixed(10, 50.0)));
    assert_eq!(r.layout_manager().unwrap().layouts().len(), 4);
    assert_eq!(r.layout_dimension(), Dimension::new(100.0, 200.0));
}

#[test]
fn tracker_stays_idle_until_first_offset() {
    let mut r = mounted(10, 50.0, 120.0, 0.0, RendererOptions::new());
    assert!(!r.is_tracker_running());
    assert!(r.render_stack().is_empty());
    assert_eq!(r.listener().stack_changes, 0);

    r.update_offset(0.0, 0.0, 0.0, true).unwrap();
    assert!(r.is_tracker_running());
    assert_eq!(r.listener().stack_changes, 1);
    assert_eq!(
        r.listener().last_stack,
        vec![
            (RenderKey::Index(0), 0),
            (RenderKey::Index(1), 1),
            (RenderKey::Index(2), 2)
        ]
    );
}

#[test]
fn renderer_forwards_visible_changes() {
    let mut r = mounted(10, 50.0, 120.0, 60.0, RendererOptions::new());
    r.update_offset(0.0, 0.0, 0.0, true).unwrap();
    r.update_offset(0.0, 200.0, 0.0, true).unwrap();

    let visible = &r.listener().visible;
    assert_eq!(visible.len(), 2);
    assert_eq!(visible[0].all, vec![0, 1, 2]);
    assert_eq!(visible[1].all, vec![4, 5, 6]);
    assert_eq!(visible[1].entering, vec![4, 5, 6]);
    assert_eq!(visible[1].leaving, vec![0, 1, 2]);
}

#[test]
fn leaving_keys_return_to_the_pool() {
    let mut r = mounted(10, 50.0, 120.0, 0.0, RendererOptions::new());
    r.update_offset(0.0, 0.0, 0.0, true).unwrap();
    r.update_offset(0.0, 500.0, 0.0, true).unwrap();

    assert_eq!(r.recycle_pool().len(), 3);
    for i in 0..3 {
        assert!(r.recycle_pool().contains(&RenderKey::Index(i)));
        assert!(!r.is_engaged(i));
    }
    assert_eq!(r.listener().stack_changes, 1);
}

#[test]
fn entering_items_reuse_pooled_keys() {
    let mut r = mounted(100, 50.0, 120.0, 0.0, RendererOptions::new());
    r.update_offset(0.0, 0.0, 0.0, true).unwrap();
    r.update_offset(0.0, 1000.0, 0.0, true).unwrap();

    assert_eq!(r.render_stack().len(), 3);
    assert!(r.recycle_pool().is_empty());
    assert_eq!(r.listener().stack_changes, 2);

    let mut keys: Vec<RenderKey> = (20..23).map(|i| r.key_for(i).unwrap()).collect();
    keys.sort();
    assert_eq!(
        keys,
        vec![RenderKey::Index(0), RenderKey::Index(1), RenderKey::Index(2)]
    );
    for i in 0..3 {
        assert_eq!(r.key_for(i), None);
    }
    for i in 20..23 {
        assert_eq!(r.render_stack().get(&r.key_for(i).unwrap()), Some(i));
    }
}

#[test]
fn trailing_item_takes_a_pooled_key() {
    let mut r = mounted(11, 50.0, 120.0, 0.0, RendererOptions::new());
    r.update_offset(0.0, 0.0, 0.0, true).unwrap();
    r.update_offset(0.0, 500.0, 0.0, true).unwrap();

    let key = r.key_for(10).unwrap();
    assert!(matches!(key, RenderKey::Index(i) if i < 3));
    assert_eq!(r.recycle_pool().len(), 2);
    assert!(!r.recycle_pool().contains(&key));
    assert_eq!(r.render_stack().len(), 3);
}

#[test]
fn returning_item_gets_its_own_key_back() {
    let mut r = mounted(10, 50.0, 120.0, 0.0, RendererOptions::new());
    r.update_offset(0.0, 0.0, 0.0, true).unwrap();
    r.update_offset(0.0, 500.0, 0.0, true).unwrap();
    assert!(!r.is_engaged(0));
    assert!(r.recycle_pool().contains(&RenderKey::Index(0)));

    r.update_offset(0.0, 0.0, 0.0, true).unwrap();
    for i in 0..3 {
        assert_eq!(r.key_for(i), Some(RenderKey::Index(i)));
    }
    assert!(r.recycle_pool().is_empty());
    // No new binding was created, so nothing was republished.
    assert_eq!(r.listener().stack_changes, 1);
}

#[test]
fn taken_index_key_falls_back_to_synthetic_key() {
    let mut r = mounted(100, 50.0, 120.0, 0.0, RendererOptions::new());
    r.update_offset(0.0, 0.0, 0.0, true).unwrap();
    r.update_offset(0.0, 1000.0, 0.0, true).unwrap();

    // Every index from 0 to 42 enters at once while the pool is empty.
    r.update_render_ahead_offset(1000.0).unwrap();
    for i in 0..3 {
        assert!(r.key_for(i).unwrap().is_synthetic(), "index {i}");
    }
    for i in 3..20 {
        assert_eq!(r.key_for(i), Some(RenderKey::Index(i)));
    }

    let stack = r.render_stack().sorted_by_index(100);
    assert_eq!(stack.len(), 43);
    let mut seen = HashMap::new();
    for (key, index) in stack {
        assert!(seen.insert(key, index).is_none());
    }
    assert_pool_disjoint_from_engaged(&r);
}

#[test]
fn sync_and_get_key_is_stable_for_engaged_index() {
    let mut r = mounted(100, 50.0, 120.0, 0.0, RendererOptions::new());
    r.update_offset(0.0, 300.0, 0.0, true).unwrap();

    let key = r.key_for(7).unwrap();
    assert_eq!(r.sync_and_get_key(7), key);
    assert_eq!(r.sync_and_get_key(7), key);
    assert_eq!(r.render_stack().get(&key), Some(7));
}

#[test]
fn disabled_recycling_never_pools_keys() {
    let options = RendererOptions::new().with_disable_recycling(true);
    let mut r = mounted(100, 50.0, 120.0, 0.0, options);
    assert!(!r.is_recycling_enabled());

    r.update_offset(0.0, 0.0, 0.0, true).unwrap();
    r.update_offset(0.0, 1000.0, 0.0, true).unwrap();
    r.update_offset(0.0, 2000.0, 0.0, true).unwrap();

    assert!(r.recycle_pool().is_empty());
    assert_eq!(r.recycle_pool().clone().get_next(), None);
    assert_eq!(r.render_stack().len(), 9);
    for i in [0, 1, 2, 20, 21, 22] {
        assert!(!r.is_engaged(i));
        assert_eq!(r.key_for(i), Some(RenderKey::Index(i)));
    }
}

#[test]
fn random_scrolling_keeps_keys_stable_and_out_of_pool() {
    let mut rng = Lcg::new(42);
    let mut r = mounted(500, 37.0, 300.0, 120.0, RendererOptions::new());
    r.update_offset(0.0, 0.0, 0.0, true).unwrap();

    let mut prev: HashMap<usize, RenderKey> = HashMap::new();
    for _ in 0..300 {
        let jump = rng.gen_range_u64(0, 4) == 0;
        let current = r.viewability_tracker().unwrap().last_offset() as u64;
        let offset = if jump {
            rng.gen_range_u64(0, 18_500)
        } else {
            current.saturating_add(rng.gen_range_u64(0, 200)).saturating_sub(100)
        };
        r.update_offset(0.0, offset as f64, 0.0, true).unwrap();

        assert_pool_disjoint_from_engaged(&r);

        let engaged = r.viewability_tracker().unwrap().engaged_indexes().to_vec();
        let mut next = HashMap::new();
        for index in engaged {
            let key = r.key_for(index).unwrap();
            if let Some(&old) = prev.get(&index) {
                assert_eq!(old, key, "key of index {index} changed while engaged");
            }
            next.insert(index, key);
        }
        prev = next;
    }

    // Recycling bounds the number of slots by the largest engaged set plus the pool.
    assert!(r.render_stack().len() < 40);
}

#[test]
fn initial_render_index_takes_priority_over_offset() {
    let mut r = VirtualRenderer::with_listener(RendererOptions::new(), Recorder::default());
    r.set_params_and_dimensions(
        RenderStackParams::new(100)
            .with_render_ahead_offset(0.0)
            .with_initial_offset(10.0)
            .with_initial_render_index(Some(5)),
        Dimension::new(100.0, 120.0),
    );
    r.set_layout_manager(Box::new(ListLayout::fixed(100, 50.0)));
    r.init().unwrap();

    assert_eq!(r.params().unwrap().initial_offset, 250.0);
    assert_eq!(r.listener().scrolls, vec![Point { x: 0.0, y: 250.0 }]);

    r.start_viewability_tracker().unwrap();
    assert_eq!(
        r.viewability_tracker().unwrap().visible_indexes(),
        &[5, 6, 7]
    );
}

#[test]
fn zero_initial_offset_issues_no_scroll_request() {
    let r = mounted(10, 50.0, 120.0, 0.0, RendererOptions::new());
    assert!(r.listener().scrolls.is_empty());
}

#[test]
fn refresh_requests_scroll_when_content_shrinks() {
    let mut r = mounted(100, 50.0, 120.0, 0.0, RendererOptions::new());
    r.update_offset(0.0, 4000.0, 0.0, true).unwrap();

    r.refresh().unwrap();
    assert!(r.listener().scrolls.is_empty());

    let params = r.params().copied().unwrap().with_item_count(50);
    r.set_params_and_dimensions(params, Dimension::new(100.0, 120.0));
    r.layout_manager_mut().unwrap().relayout_from_index(0, 50);
    r.refresh().unwrap();

    assert_eq!(r.listener().scrolls, vec![Point { x: 0.0, y: 4000.0 }]);
    assert_eq!(r.viewability_tracker().unwrap().last_offset(), 2500.0);
    // Indexes past the new count are dropped without pooling their keys.
    assert!(r.recycle_pool().is_empty());
}

#[test]
fn refresh_with_anchor_keeps_first_visible_item_pinned() {
    let mut r = mounted(100, 50.0, 120.0, 0.0, RendererOptions::new());
    r.update_offset(0.0, 500.0, 0.0, true).unwrap();
    assert_eq!(
        r.viewability_tracker()
            .unwrap()
            .find_first_logically_visible_index(),
        10
    );

    r.set_layout_manager(Box::new(ListLayout::fixed(100, 100.0)));
    r.refresh_with_anchor().unwrap();

    let tracker = r.viewability_tracker().unwrap();
    assert_eq!(tracker.last_offset(), 1000.0);
    assert_eq!(tracker.visible_indexes(), &[10, 11]);
    assert_eq!(r.listener().scrolls, vec![Point { x: 0.0, y: 1000.0 }]);
    assert_pool_disjoint_from_engaged(&r);
}

#[test]
fn horizontal_renderer_reads_x_offsets() {
    let mut r = VirtualRenderer::with_listener(RendererOptions::new(), Recorder::default());
    r.set_params_and_dimensions(
        RenderStackParams::new(10)
            .with_orientation(Orientation::Horizontal)
            .with_render_ahead_offset(0.0),
        Dimension::new(120.0, 500.0),
    );
    r.set_layout_manager(Box::new(ListLayout::new(
        vec![50.0; 10],
        Orientation::Horizontal,
    )));
    r.init().unwrap();

    r.update_offset(200.0, 9999.0, 0.0, true).unwrap();
    let tracker = r.viewability_tracker().unwrap();
    assert_eq!(tracker.visible_indexes(), &[4, 5, 6]);
    assert_eq!(tracker.last_actual_offset(), 200.0);
}

#[test]
fn correction_compensates_leading_inset() {
    let mut r = mounted(100, 50.0, 120.0, 0.0, RendererOptions::new());
    r.update_offset(0.0, 340.0, -40.0, true).unwrap();
    let tracker = r.viewability_tracker().unwrap();
    assert_eq!(tracker.last_offset(), 300.0);
    assert_eq!(tracker.last_actual_offset(), 340.0);
    assert_eq!(tracker.visible_indexes(), &[6, 7, 8]);
}

#[test]
fn renderer_render_ahead_update_before_init_fails() {
    let mut r = VirtualRenderer::new(RendererOptions::new());
    assert_eq!(r.render_ahead_offset(), DEFAULT_RENDER_AHEAD_OFFSET);
    assert_eq!(
        r.update_render_ahead_offset(10.0),
        Err(RecyclerError::NotInitialized)
    );
}

#[test]
fn callback_listener_receives_notifications() {
    let stacks = Arc::new(AtomicUsize::new(0));
    let visible = Arc::new(AtomicUsize::new(0));
    let listener = CallbackListener::new()
        .with_on_render_stack_changed({
            let stacks = Arc::clone(&stacks);
            move |_| {
                stacks.fetch_add(1, Ordering::Relaxed);
            }
        })
        .with_on_visible_indices_changed({
            let visible = Arc::clone(&visible);
            move |_| {
                visible.fetch_add(1, Ordering::Relaxed);
            }
        });

    let mut r = VirtualRenderer::with_listener(RendererOptions::new(), listener);
    r.set_params_and_dimensions(
        RenderStackParams::new(100).with_render_ahead_offset(0.0),
        Dimension::new(100.0, 120.0),
    );
    r.set_layout_manager(Box::new(ListLayout::fixed(100, 50.0)));
    r.init().unwrap();

    r.update_offset(0.0, 0.0, 0.0, true).unwrap();
    r.update_offset(0.0, 0.0, 0.0, true).unwrap();
    r.update_offset(0.0, 1000.0, 0.0, true).unwrap();

    assert_eq!(stacks.load(Ordering::Relaxed), 2);
    assert_eq!(visible.load(Ordering::Relaxed), 2);
}
