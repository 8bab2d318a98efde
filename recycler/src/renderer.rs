use alloc::boxed::Box;

use crate::key::{KeyMap, KeySet};
use crate::{
    Dimension, IndexChange, LayoutManager, Orientation, Point, RecyclePool, RecyclerError,
    RenderKey, RenderListener, RenderStack, RenderStackParams, RendererOptions, Result,
    ViewabilityTracker, WindowUpdate,
};

/// Maps engaged indexes onto a small, stable set of recyclable [`RenderKey`]s.
///
/// The renderer owns one [`ViewabilityTracker`] and one [`RecyclePool`]. Offsets go in through
/// [`VirtualRenderer::update_offset`]; when the engaged set changes, keys of leaving indexes go
/// back to the pool and entering indexes draw keys from it. Whenever a new key → index binding
/// is created, the updated [`RenderStack`] is published to the [`RenderListener`].
///
/// Setup order:
/// 1. [`VirtualRenderer::set_params_and_dimensions`]
/// 2. [`VirtualRenderer::set_layout_manager`]
/// 3. [`VirtualRenderer::init`]
///
/// Operations that need the tracker return [`RecyclerError`] when called out of order.
pub struct VirtualRenderer<L = ()> {
    listener: L,
    options: RendererOptions,
    params: Option<RenderStackParams>,
    dimensions: Option<Dimension>,
    layout_manager: Option<Box<dyn LayoutManager>>,
    tracker: Option<ViewabilityTracker>,
    recycle_pool: RecyclePool,
    render_stack: RenderStack,
    stable_id_to_key: KeyMap<usize, RenderKey>,
    engaged_indexes: KeySet<usize>,
    is_tracker_running: bool,
    mark_dirty: bool,
    next_synthetic_key: u64,
}

impl VirtualRenderer<()> {
    /// Creates a renderer without a listener.
    pub fn new(options: RendererOptions) -> Self {
        Self::with_listener(options, ())
    }
}

impl<L: RenderListener> VirtualRenderer<L> {
    pub fn with_listener(options: RendererOptions, listener: L) -> Self {
        vdebug!(
            recycling = options.is_recycling_enabled(),
            "VirtualRenderer::new"
        );
        Self {
            listener,
            options,
            params: None,
            dimensions: None,
            layout_manager: None,
            tracker: None,
            recycle_pool: RecyclePool::new(),
            render_stack: RenderStack::new(),
            stable_id_to_key: KeyMap::default(),
            engaged_indexes: KeySet::default(),
            is_tracker_running: false,
            mark_dirty: false,
            next_synthetic_key: 0,
        }
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    pub fn is_recycling_enabled(&self) -> bool {
        self.options.is_recycling_enabled()
    }

    pub fn params(&self) -> Option<&RenderStackParams> {
        self.params.as_ref()
    }

    pub fn dimensions(&self) -> Option<Dimension> {
        self.dimensions
    }

    pub fn orientation(&self) -> Orientation {
        self.params.map(|p| p.orientation).unwrap_or_default()
    }

    pub fn render_stack(&self) -> &RenderStack {
        &self.render_stack
    }

    pub fn recycle_pool(&self) -> &RecyclePool {
        &self.recycle_pool
    }

    pub fn is_engaged(&self, index: usize) -> bool {
        self.engaged_indexes.contains(&index)
    }

    /// The key currently assigned to `index`, without assigning one.
    pub fn key_for(&self, index: usize) -> Option<RenderKey> {
        self.stable_id_to_key.get(&index).copied()
    }

    pub fn is_tracker_running(&self) -> bool {
        self.is_tracker_running
    }

    /// Content size of the current layout, or zero without a layout manager.
    pub fn layout_dimension(&self) -> Dimension {
        self.layout_manager
            .as_ref()
            .map(|lm| lm.content_dimension())
            .unwrap_or_default()
    }

    pub fn set_params_and_dimensions(&mut self, params: RenderStackParams, dimensions: Dimension) {
        vtrace!(
            item_count = params.item_count,
            width = dimensions.width,
            height = dimensions.height,
            "VirtualRenderer::set_params_and_dimensions"
        );
        self.params = Some(params);
        self.dimensions = Some(dimensions);
    }

    /// Installs a layout manager and lays out the current item count from scratch.
    pub fn set_layout_manager(&mut self, mut layout_manager: Box<dyn LayoutManager>) {
        if let Some(params) = &self.params {
            layout_manager.relayout_from_index(0, params.item_count);
        }
        self.layout_manager = Some(layout_manager);
    }

    pub fn layout_manager(&self) -> Option<&dyn LayoutManager> {
        self.layout_manager.as_deref()
    }

    pub fn layout_manager_mut(&mut self) -> Option<&mut (dyn LayoutManager + 'static)> {
        self.layout_manager.as_deref_mut()
    }

    pub fn viewability_tracker(&self) -> Option<&ViewabilityTracker> {
        self.tracker.as_ref()
    }

    /// Resolves the offset of the first fit.
    ///
    /// `initial_render_index` wins over `initial_offset` when a layout manager is present, and
    /// the resolved offset is written back into the params.
    pub fn initial_offset(&mut self) -> Point {
        let Some(params) = self.params.as_mut() else {
            return Point::default();
        };
        let orientation = params.orientation;
        if let (Some(index), Some(lm)) = (params.initial_render_index, &self.layout_manager) {
            let point = lm.offset_for_index(index);
            params.initial_offset = orientation.main(point.x, point.y);
            return orientation.point(params.initial_offset);
        }
        orientation.point(params.initial_offset)
    }

    /// Creates the tracker and the recycle pool and primes the tracker with the current layout.
    ///
    /// Any previous render state is discarded. A non-zero initial offset is reported through
    /// [`RenderListener::on_scroll_request`]; the first fit itself is deferred until the tracker
    /// starts (see [`VirtualRenderer::start_viewability_tracker`]).
    pub fn init(&mut self) -> Result<()> {
        let initial = self.initial_offset();
        let params = self.params.ok_or(RecyclerError::MissingParams)?;
        vdebug!(
            item_count = params.item_count,
            initial_offset = params.initial_offset,
            render_ahead = params.render_ahead_offset,
            "VirtualRenderer::init"
        );
        let mut tracker = ViewabilityTracker::new(params.render_ahead_offset, params.initial_offset);
        prime_tracker(
            &mut tracker,
            self.layout_manager.as_deref(),
            self.dimensions,
            self.params,
        )?;

        self.recycle_pool = RecyclePool::new();
        self.render_stack.clear();
        self.stable_id_to_key.clear();
        self.engaged_indexes.clear();
        self.is_tracker_running = false;
        self.tracker = Some(tracker);
        if params.initial_offset > 0.0 {
            self.listener.on_scroll_request(initial);
        }
        Ok(())
    }

    /// Runs the tracker's first fit.
    pub fn start_viewability_tracker(&mut self) -> Result<()> {
        let tracker = self.tracker.as_mut().ok_or(RecyclerError::NotInitialized)?;
        self.is_tracker_running = true;
        let update = tracker.init();
        self.apply_window_update(update);
        Ok(())
    }

    /// Forwards a scroll position to the tracker.
    ///
    /// Only the coordinate on the configured axis is used. `correction` is added to it before
    /// clamping (e.g. a negative leading inset). The tracker starts on the first call, so a list
    /// that is never scrolled never computes windows.
    pub fn update_offset(
        &mut self,
        offset_x: f64,
        offset_y: f64,
        correction: f64,
        is_actual: bool,
    ) -> Result<()> {
        let offset = self.orientation().main(offset_x, offset_y);
        let tracker = self.tracker.as_mut().ok_or(RecyclerError::NotInitialized)?;
        if !self.is_tracker_running {
            if is_actual {
                tracker.set_actual_offset(offset);
            }
            self.start_viewability_tracker()?;
        }
        let update = self
            .tracker
            .as_mut()
            .ok_or(RecyclerError::NotInitialized)?
            .update_offset(offset, correction, is_actual);
        self.apply_window_update(update);
        Ok(())
    }

    /// Re-primes the tracker with the current layout and recomputes at the current offset.
    ///
    /// If the content shrank under the scroll position, the last actual offset is requested
    /// through [`RenderListener::on_scroll_request`].
    pub fn refresh(&mut self) -> Result<()> {
        self.prepare_viewability_tracker()?;
        let tracker = self.tracker.as_mut().ok_or(RecyclerError::NotInitialized)?;
        let (should_scroll, update) = tracker.force_refresh();
        let actual = tracker.last_actual_offset();
        vtrace!(should_scroll, actual, "VirtualRenderer::refresh");
        self.apply_window_update(update);
        if should_scroll {
            let point = self.orientation().point(actual);
            self.listener.on_scroll_request(point);
        }
        Ok(())
    }

    /// Like [`VirtualRenderer::refresh`], but keeps the first logically visible item pinned to
    /// the viewport's leading edge.
    ///
    /// Use this after the layout strategy changed: the anchor is captured against the old
    /// layout, then the tracker is re-primed and scrolled to the anchor's new offset.
    pub fn refresh_with_anchor(&mut self) -> Result<()> {
        let tracker = self.tracker.as_ref().ok_or(RecyclerError::NotInitialized)?;
        let first_visible = tracker.find_first_logically_visible_index();
        self.prepare_viewability_tracker()?;

        let item_count = self.params.map(|p| p.item_count).unwrap_or(0);
        let anchor = first_visible.min(item_count.saturating_sub(1));
        let orientation = self.orientation();
        let point = self
            .layout_manager
            .as_ref()
            .map(|lm| lm.offset_for_index(anchor))
            .unwrap_or_default();
        let offset = orientation.main(point.x, point.y);
        vdebug!(anchor, offset, "VirtualRenderer::refresh_with_anchor");
        self.listener.on_scroll_request(orientation.point(offset));

        let update = self
            .tracker
            .as_mut()
            .ok_or(RecyclerError::NotInitialized)?
            .force_refresh_with_offset(offset);
        self.apply_window_update(update);
        Ok(())
    }

    pub fn render_ahead_offset(&self) -> f64 {
        match (&self.tracker, &self.params) {
            (Some(tracker), _) => tracker.render_ahead_offset(),
            (None, Some(params)) => params.render_ahead_offset,
            (None, None) => crate::DEFAULT_RENDER_AHEAD_OFFSET,
        }
    }

    /// Changes the render-ahead margin and recomputes the engaged set at the current offset.
    pub fn update_render_ahead_offset(&mut self, render_ahead_offset: f64) -> Result<()> {
        let update = self
            .tracker
            .as_mut()
            .ok_or(RecyclerError::NotInitialized)?
            .update_render_ahead_offset(render_ahead_offset);
        if let Some(params) = self.params.as_mut() {
            params.render_ahead_offset = render_ahead_offset.max(0.0);
        }
        self.apply_window_update(update);
        Ok(())
    }

    /// Returns the key for `index`, assigning one if needed.
    ///
    /// Resolution order: the index's existing key, then a key from the recycle pool (taken over
    /// from its previous index), then the index itself, then a synthetic key if the index key is
    /// already bound to another index.
    pub fn sync_and_get_key(&mut self, index: usize) -> RenderKey {
        let key = match self.stable_id_to_key.get(&index) {
            Some(&key) => key,
            None => {
                let key = match self.recycle_pool.get_next() {
                    Some(key) => {
                        if let Some(old_index) = self.render_stack.insert(key, index) {
                            if old_index != index {
                                self.stable_id_to_key.remove(&old_index);
                            }
                        }
                        key
                    }
                    None => {
                        let mut key = RenderKey::Index(index);
                        if matches!(self.render_stack.get(&key), Some(owner) if owner != index) {
                            key = self.collision_avoiding_key();
                            vdebug!(index, key = ?key, "index key is taken, using a synthetic key");
                        }
                        self.render_stack.insert(key, index);
                        key
                    }
                };
                self.mark_dirty = true;
                self.stable_id_to_key.insert(index, key);
                key
            }
        };

        if self.engaged_indexes.contains(&index) {
            self.recycle_pool.remove(&key);
        }

        if let Some(owner) = self.render_stack.get(&key) {
            if owner != index {
                vwarn!(index, owner, key = ?key, "possible stable id collision");
            }
        }
        key
    }

    fn collision_avoiding_key(&mut self) -> RenderKey {
        let key = RenderKey::Synthetic(self.next_synthetic_key);
        self.next_synthetic_key = self.next_synthetic_key.wrapping_add(1);
        key
    }

    fn prepare_viewability_tracker(&mut self) -> Result<()> {
        let tracker = self.tracker.as_mut().ok_or(RecyclerError::NotInitialized)?;
        prime_tracker(
            tracker,
            self.layout_manager.as_deref(),
            self.dimensions,
            self.params,
        )
    }

    fn apply_window_update(&mut self, update: WindowUpdate) {
        if let Some(change) = update.engaged {
            self.on_engaged_items_changed(&change);
        }
        if let Some(change) = update.visible {
            self.listener.on_visible_indices_changed(&change);
        }
    }

    fn on_engaged_items_changed(&mut self, change: &IndexChange) {
        let item_count = self.params.map(|p| p.item_count).unwrap_or(0);
        let recycle = self.options.is_recycling_enabled();
        for &index in &change.leaving {
            self.engaged_indexes.remove(&index);
            if recycle && index < item_count {
                if let Some(&key) = self.stable_id_to_key.get(&index) {
                    self.recycle_pool.add(key);
                }
            }
        }
        if self.update_render_stack(&change.entering) {
            vtrace!(
                slots = self.render_stack.len(),
                pooled = self.recycle_pool.len(),
                "render stack changed"
            );
            self.listener.on_render_stack_changed(&self.render_stack);
        }
    }

    // Reports whether any new key binding was created.
    fn update_render_stack(&mut self, entering: &[usize]) -> bool {
        self.mark_dirty = false;
        for &index in entering {
            self.engaged_indexes.insert(index);
            self.sync_and_get_key(index);
        }
        core::mem::replace(&mut self.mark_dirty, false)
    }
}

// Feeds the current layout and viewport into `tracker`, failing on the first missing input.
fn prime_tracker(
    tracker: &mut ViewabilityTracker,
    layout_manager: Option<&dyn LayoutManager>,
    dimensions: Option<Dimension>,
    params: Option<RenderStackParams>,
) -> Result<()> {
    let lm = layout_manager.ok_or(RecyclerError::MissingLayoutManager)?;
    let dimensions = dimensions.ok_or(RecyclerError::MissingDimensions)?;
    let params = params.ok_or(RecyclerError::MissingParams)?;

    let orientation = params.orientation;
    tracker.set_layouts(lm.layouts(), lm.content_dimension().main(orientation));
    tracker.set_dimensions(dimensions, orientation);
    Ok(())
}

impl<L> core::fmt::Debug for VirtualRenderer<L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualRenderer")
            .field("options", &self.options)
            .field("params", &self.params)
            .field("dimensions", &self.dimensions)
            .field("has_layout_manager", &self.layout_manager.is_some())
            .field("tracker", &self.tracker)
            .field("render_stack_len", &self.render_stack.len())
            .field("pooled", &self.recycle_pool.len())
            .field("is_tracker_running", &self.is_tracker_running)
            .finish_non_exhaustive()
    }
}
