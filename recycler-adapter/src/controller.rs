use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;

use recycler::{
    DEFAULT_RENDER_AHEAD_OFFSET, Dimension, IndexChange, Layout, Orientation, Point, RecyclerError,
    RenderKey, RenderListener, RenderStack, RenderStackParams, RendererOptions, ViewabilityTracker,
    VirtualRenderer,
};

use crate::{DataProvider, LayoutProvider};

pub type EndReachedCallback = Arc<dyn Fn() + Send + Sync>;

/// Errors returned by [`ListController`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerError {
    /// The viewport was reported with a zero width or height.
    #[error("viewport must have a non-zero width and height")]
    ZeroViewport,

    #[error(transparent)]
    Renderer(#[from] RecyclerError),
}

/// Configuration for [`ListController`].
#[derive(Clone)]
pub struct ListControllerOptions {
    pub orientation: Orientation,
    pub render_ahead_offset: f64,
    pub initial_offset: f64,
    pub initial_render_index: Option<usize>,
    pub disable_recycling: bool,

    /// Distance between the scroll surface's origin and the list's leading edge. Subtracted
    /// from every scroll offset.
    pub distance_from_window: f64,

    /// How close (in pixels) the viewport's trailing edge must get to the content's end before
    /// `on_end_reached` fires.
    pub on_end_reached_threshold: f64,
    pub on_end_reached: Option<EndReachedCallback>,

    /// Layout table to seed the first layout manager with.
    pub cached_layouts: Option<Vec<Layout>>,
}

impl Default for ListControllerOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            render_ahead_offset: DEFAULT_RENDER_AHEAD_OFFSET,
            initial_offset: 0.0,
            initial_render_index: None,
            disable_recycling: false,
            distance_from_window: 0.0,
            on_end_reached_threshold: 0.0,
            on_end_reached: None,
            cached_layouts: None,
        }
    }
}

impl ListControllerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_render_ahead_offset(mut self, render_ahead_offset: f64) -> Self {
        self.render_ahead_offset = render_ahead_offset;
        self
    }

    pub fn with_initial_offset(mut self, initial_offset: f64) -> Self {
        self.initial_offset = initial_offset;
        self
    }

    pub fn with_initial_render_index(mut self, initial_render_index: Option<usize>) -> Self {
        self.initial_render_index = initial_render_index;
        self
    }

    pub fn with_disable_recycling(mut self, disable_recycling: bool) -> Self {
        self.disable_recycling = disable_recycling;
        self
    }

    pub fn with_distance_from_window(mut self, distance_from_window: f64) -> Self {
        self.distance_from_window = distance_from_window;
        self
    }

    pub fn with_on_end_reached_threshold(mut self, threshold: f64) -> Self {
        self.on_end_reached_threshold = threshold;
        self
    }

    pub fn with_on_end_reached(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_end_reached = Some(Arc::new(f));
        self
    }

    pub fn with_cached_layouts(mut self, layouts: Vec<Layout>) -> Self {
        self.cached_layouts = Some(layouts);
        self
    }
}

impl core::fmt::Debug for ListControllerOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListControllerOptions")
            .field("orientation", &self.orientation)
            .field("render_ahead_offset", &self.render_ahead_offset)
            .field("initial_offset", &self.initial_offset)
            .field("initial_render_index", &self.initial_render_index)
            .field("disable_recycling", &self.disable_recycling)
            .field("distance_from_window", &self.distance_from_window)
            .field("on_end_reached_threshold", &self.on_end_reached_threshold)
            .field("has_on_end_reached", &self.on_end_reached.is_some())
            .finish_non_exhaustive()
    }
}

/// One slot of the render stack resolved against the current layout.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderItem {
    pub key: RenderKey,
    pub index: usize,
    pub layout: Layout,
}

// Keeps scroll requests for the host and forwards everything else.
#[derive(Debug)]
struct ControllerListener<L> {
    inner: L,
    pending_scroll: Option<Point>,
}

impl<L: RenderListener> RenderListener for ControllerListener<L> {
    fn on_render_stack_changed(&mut self, render_stack: &RenderStack) {
        self.inner.on_render_stack_changed(render_stack);
    }

    fn on_scroll_request(&mut self, offset: Point) {
        self.pending_scroll = Some(offset);
    }

    fn on_visible_indices_changed(&mut self, change: &IndexChange) {
        self.inner.on_visible_indices_changed(change);
    }
}

/// Drives a [`VirtualRenderer`] the way a list view does.
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - [`ListController::on_size_changed`] when the viewport is laid out or resized
/// - [`ListController::on_scroll`] when the scroll surface moves
/// - [`ListController::set_data`] / [`ListController::set_layout_provider`] when inputs change
/// - [`ListController::on_item_size_changed`] when a rendered item measures differently, then
///   [`ListController::apply_pending_relayout`] once per frame
///
/// Scroll positions the list wants the surface to move to are queued and drained with
/// [`ListController::take_pending_scroll`].
#[derive(Debug)]
pub struct ListController<L = ()> {
    renderer: VirtualRenderer<ControllerListener<L>>,
    options: ListControllerOptions,
    layout_provider: LayoutProvider,
    data_provider: DataProvider,
    viewport: Dimension,
    is_mounted: bool,
    pending_relayout: Option<usize>,
    end_reached_called: bool,
}

impl ListController<()> {
    pub fn new(
        options: ListControllerOptions,
        layout_provider: LayoutProvider,
        data_provider: DataProvider,
    ) -> Self {
        Self::with_listener(options, layout_provider, data_provider, ())
    }
}

impl<L: RenderListener> ListController<L> {
    pub fn with_listener(
        options: ListControllerOptions,
        layout_provider: LayoutProvider,
        data_provider: DataProvider,
        listener: L,
    ) -> Self {
        let renderer_options =
            RendererOptions::new().with_disable_recycling(options.disable_recycling);
        let listener = ControllerListener {
            inner: listener,
            pending_scroll: None,
        };
        Self {
            renderer: VirtualRenderer::with_listener(renderer_options, listener),
            options,
            layout_provider,
            data_provider,
            viewport: Dimension::default(),
            is_mounted: false,
            pending_relayout: None,
            end_reached_called: false,
        }
    }

    pub fn listener(&self) -> &L {
        &self.renderer.listener().inner
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.renderer.listener_mut().inner
    }

    pub fn options(&self) -> &ListControllerOptions {
        &self.options
    }

    pub fn orientation(&self) -> Orientation {
        self.options.orientation
    }

    pub fn layout_provider(&self) -> &LayoutProvider {
        &self.layout_provider
    }

    pub fn data_provider(&self) -> &DataProvider {
        &self.data_provider
    }

    /// Whether the first non-zero viewport size has been reported.
    pub fn is_mounted(&self) -> bool {
        self.is_mounted
    }

    /// The viewport size last passed to [`ListController::on_size_changed`].
    pub fn rendered_size(&self) -> Dimension {
        self.viewport
    }

    pub fn render_stack(&self) -> &RenderStack {
        self.renderer.render_stack()
    }

    pub fn viewability_tracker(&self) -> Option<&ViewabilityTracker> {
        self.renderer.viewability_tracker()
    }

    pub fn layout(&self, index: usize) -> Option<Layout> {
        self.renderer
            .layout_manager()
            .and_then(|lm| lm.layouts().get(index).copied())
    }

    /// Returns the key for `index`, assigning one if needed.
    pub fn sync_and_get_key(&mut self, index: usize) -> RenderKey {
        self.renderer.sync_and_get_key(index)
    }

    /// Slots to render, sorted by index. Slots bound to indexes past the data length are
    /// skipped.
    pub fn render_items(&self) -> Vec<RenderItem> {
        let Some(lm) = self.renderer.layout_manager() else {
            return Vec::new();
        };
        let layouts = lm.layouts();
        self.renderer
            .render_stack()
            .sorted_by_index(self.data_provider.len())
            .into_iter()
            .filter_map(|(key, index)| {
                layouts
                    .get(index)
                    .map(|&layout| RenderItem { key, index, layout })
            })
            .collect()
    }

    /// Reports the viewport size.
    ///
    /// The first call mounts the list. Later calls relayout when the cross axis changed and
    /// only refresh otherwise.
    pub fn on_size_changed(&mut self, dimension: Dimension) -> Result<(), ControllerError> {
        let height_changed = self.viewport.height != dimension.height;
        let width_changed = self.viewport.width != dimension.width;
        self.viewport = dimension;
        if dimension.width == 0.0 || dimension.height == 0.0 {
            return Err(ControllerError::ZeroViewport);
        }

        if !self.is_mounted {
            self.mount()?;
            self.process_on_end_reached();
            return Ok(());
        }

        let horizontal = self.options.orientation.is_horizontal();
        let cross_changed = (height_changed && width_changed)
            || (height_changed && horizontal)
            || (width_changed && !horizontal);
        if cross_changed {
            self.change_layouts()?;
        } else {
            self.sync_params();
            self.renderer.refresh()?;
        }
        Ok(())
    }

    /// Reports a scroll position of the surface.
    pub fn on_scroll(&mut self, offset_x: f64, offset_y: f64) -> Result<(), ControllerError> {
        self.renderer.update_offset(
            offset_x,
            offset_y,
            -self.options.distance_from_window,
            true,
        )?;
        self.process_on_end_reached();
        Ok(())
    }

    /// Replaces the data provider and relayouts from its first changed index.
    pub fn set_data(&mut self, data_provider: DataProvider) -> Result<(), ControllerError> {
        if data_provider.len() > self.data_provider.len() {
            self.end_reached_called = false;
        }
        let first = data_provider.first_index_to_process();
        let len = data_provider.len();
        self.data_provider = data_provider;
        if !self.is_mounted {
            return Ok(());
        }

        vdebug!(first, len, "ListController::set_data");
        self.sync_params();
        if let Some(lm) = self.renderer.layout_manager_mut() {
            lm.relayout_from_index(first, len);
        }
        self.renderer.refresh()?;
        self.process_on_end_reached();
        Ok(())
    }

    /// Switches to a new layout provider, rebuilding the layout manager.
    pub fn set_layout_provider(
        &mut self,
        layout_provider: LayoutProvider,
    ) -> Result<(), ControllerError> {
        self.layout_provider = layout_provider;
        if self.is_mounted {
            self.change_layouts()?;
        }
        Ok(())
    }

    /// Switches the scroll axis, rebuilding the layout manager.
    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<(), ControllerError> {
        if self.options.orientation == orientation {
            return Ok(());
        }
        self.options.orientation = orientation;
        if self.is_mounted {
            self.change_layouts()?;
        }
        Ok(())
    }

    /// Stores a measured size for `index`.
    ///
    /// Returns `true` when the size differs from the current layout; the relayout itself is
    /// deferred to [`ListController::apply_pending_relayout`].
    pub fn on_item_size_changed(&mut self, index: usize, dimension: Dimension) -> bool {
        let Some(lm) = self.renderer.layout_manager_mut() else {
            return false;
        };
        if !lm.override_layout(index, dimension) {
            return false;
        }
        self.request_relayout(index);
        true
    }

    /// Compares a rendered size against the layout provider's expectation for `index`.
    ///
    /// A mismatch schedules a relayout from `index` and returns `true`.
    pub fn check_dimension_discrepancy(&mut self, index: usize, dimension: Dimension) -> bool {
        let mismatch = self.layout_provider.check_dimension_discrepancy(
            dimension,
            index,
            self.viewport,
            self.options.orientation,
        );
        if mismatch {
            self.request_relayout(index);
        }
        mismatch
    }

    /// The smallest index waiting for relayout, if any.
    pub fn pending_relayout(&self) -> Option<usize> {
        self.pending_relayout
    }

    /// Relayouts from the smallest index reported since the last call and refreshes.
    ///
    /// Returns `Ok(false)` when nothing was pending or the list is not mounted yet.
    pub fn apply_pending_relayout(&mut self) -> Result<bool, ControllerError> {
        if !self.is_mounted {
            return Ok(false);
        }
        let Some(requested) = self.pending_relayout.take() else {
            return Ok(false);
        };
        let len = self.data_provider.len();
        if let Some(lm) = self.renderer.layout_manager_mut() {
            lm.relayout_from_index(requested.min(len.saturating_sub(1)), len);
        }
        self.renderer.refresh()?;
        Ok(true)
    }

    /// Queues a scroll to the leading edge of `index`.
    ///
    /// Returns `false` when there is no layout to resolve the index against.
    pub fn scroll_to_index(&mut self, index: usize) -> bool {
        let Some(lm) = self.renderer.layout_manager() else {
            vwarn!(index, "scroll_to_index called before a layout manager exists");
            return false;
        };
        let point = lm.offset_for_index(index);
        self.scroll_to_offset(point.x, point.y);
        true
    }

    /// Queues a scroll. The coordinate off the active axis is dropped.
    pub fn scroll_to_offset(&mut self, x: f64, y: f64) {
        let point = self.constrain_to_axis(Point { x, y });
        self.renderer.listener_mut().pending_scroll = Some(point);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_to_offset(0.0, 0.0);
    }

    pub fn scroll_to_end(&mut self) -> bool {
        self.scroll_to_index(self.data_provider.len().saturating_sub(1))
    }

    /// Drains the scroll position the surface should move to, if any.
    pub fn take_pending_scroll(&mut self) -> Option<Point> {
        let point = self.renderer.listener_mut().pending_scroll.take()?;
        Some(self.constrain_to_axis(point))
    }

    /// The last scroll position reported by the surface.
    pub fn current_scroll_offset(&self) -> f64 {
        self.renderer
            .viewability_tracker()
            .map(ViewabilityTracker::last_actual_offset)
            .unwrap_or(0.0)
    }

    pub fn find_approx_first_visible_index(&self) -> usize {
        self.renderer
            .viewability_tracker()
            .map(ViewabilityTracker::find_first_logically_visible_index)
            .unwrap_or(0)
    }

    pub fn content_dimension(&self) -> Dimension {
        self.renderer.layout_dimension()
    }

    pub fn render_ahead_offset(&self) -> f64 {
        self.renderer
            .viewability_tracker()
            .map(ViewabilityTracker::render_ahead_offset)
            .unwrap_or(self.options.render_ahead_offset)
    }

    /// Changes the render-ahead margin.
    ///
    /// Returns `false` if the list is not mounted yet; retry after mounting. Raising the margin
    /// over several frames spreads the cost of rendering the extra items.
    pub fn update_render_ahead_offset(&mut self, render_ahead_offset: f64) -> bool {
        if self
            .renderer
            .update_render_ahead_offset(render_ahead_offset)
            .is_err()
        {
            return false;
        }
        self.options.render_ahead_offset = render_ahead_offset.max(0.0);
        true
    }

    fn mount(&mut self) -> Result<(), ControllerError> {
        let params = RenderStackParams::new(self.data_provider.len())
            .with_orientation(self.options.orientation)
            .with_render_ahead_offset(self.options.render_ahead_offset)
            .with_initial_offset(self.options.initial_offset)
            .with_initial_render_index(self.options.initial_render_index);
        vdebug!(
            item_count = params.item_count,
            width = self.viewport.width,
            height = self.viewport.height,
            "ListController::mount"
        );
        self.renderer.set_params_and_dimensions(params, self.viewport);
        let lm = self.layout_provider.new_layout_manager(
            self.viewport,
            self.options.orientation,
            self.options.cached_layouts.take(),
        );
        self.renderer.set_layout_manager(Box::new(lm));
        self.renderer.init()?;
        self.is_mounted = true;

        let offset = self.renderer.initial_offset();
        let content = self.renderer.layout_dimension();
        let must_scroll_first = (offset.y > 0.0 && content.height > self.viewport.height)
            || (offset.x > 0.0 && content.width > self.viewport.width);
        if must_scroll_first {
            self.renderer.listener_mut().pending_scroll = Some(offset);
        } else {
            self.renderer.listener_mut().pending_scroll = None;
            self.renderer.start_viewability_tracker()?;
        }
        Ok(())
    }

    fn change_layouts(&mut self) -> Result<(), ControllerError> {
        self.sync_params();
        let lm =
            self.layout_provider
                .new_layout_manager(self.viewport, self.options.orientation, None);
        self.renderer.set_layout_manager(Box::new(lm));
        if self.layout_provider.should_refresh_with_anchoring() {
            self.renderer.refresh_with_anchor()?;
        } else {
            self.renderer.refresh()?;
        }
        Ok(())
    }

    fn sync_params(&mut self) {
        let params = self
            .renderer
            .params()
            .copied()
            .unwrap_or_default()
            .with_item_count(self.data_provider.len())
            .with_orientation(self.options.orientation);
        self.renderer.set_params_and_dimensions(params, self.viewport);
    }

    fn request_relayout(&mut self, index: usize) {
        self.pending_relayout = Some(match self.pending_relayout {
            Some(pending) => pending.min(index),
            None => index,
        });
    }

    fn constrain_to_axis(&self, point: Point) -> Point {
        match self.options.orientation {
            Orientation::Vertical => Point { x: 0.0, y: point.y },
            Orientation::Horizontal => Point { x: point.x, y: 0.0 },
        }
    }

    fn process_on_end_reached(&mut self) {
        let Some(on_end_reached) = self.options.on_end_reached.clone() else {
            return;
        };
        let Some(tracker) = self.renderer.viewability_tracker() else {
            return;
        };
        let orientation = self.options.orientation;
        let window_bound =
            self.renderer.layout_dimension().main(orientation) - self.viewport.main(orientation);
        if window_bound - tracker.last_offset() <= self.options.on_end_reached_threshold {
            if !self.end_reached_called {
                self.end_reached_called = true;
                vdebug!(offset = tracker.last_offset(), "end reached");
                on_end_reached();
            }
        } else {
            self.end_reached_called = false;
        }
    }
}
