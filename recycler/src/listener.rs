use alloc::sync::Arc;

use crate::{IndexChange, Point, RenderStack};

/// Receives the renderer's notifications.
///
/// Every method is called synchronously from inside the renderer operation that caused it, at
/// most once per trigger. All methods default to no-ops.
pub trait RenderListener {
    /// The render stack gained at least one new key → index binding.
    fn on_render_stack_changed(&mut self, render_stack: &RenderStack) {
        let _ = render_stack;
    }

    /// The consumer should move its scroll surface to `offset`.
    fn on_scroll_request(&mut self, offset: Point) {
        let _ = offset;
    }

    /// The visible index set changed.
    fn on_visible_indices_changed(&mut self, change: &IndexChange) {
        let _ = change;
    }
}

impl RenderListener for () {}

pub type RenderStackChangedCallback = Arc<dyn Fn(&RenderStack) + Send + Sync>;
pub type ScrollRequestCallback = Arc<dyn Fn(Point) + Send + Sync>;
pub type IndexChangeCallback = Arc<dyn Fn(&IndexChange) + Send + Sync>;

/// A [`RenderListener`] built from closures.
///
/// Cheap to clone: callbacks are stored in `Arc`s.
#[derive(Clone, Default)]
pub struct CallbackListener {
    pub on_render_stack_changed: Option<RenderStackChangedCallback>,
    pub on_scroll_request: Option<ScrollRequestCallback>,
    pub on_visible_indices_changed: Option<IndexChangeCallback>,
}

impl CallbackListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_on_render_stack_changed(
        mut self,
        f: impl Fn(&RenderStack) + Send + Sync + 'static,
    ) -> Self {
        self.on_render_stack_changed = Some(Arc::new(f));
        self
    }

    pub fn with_on_scroll_request(mut self, f: impl Fn(Point) + Send + Sync + 'static) -> Self {
        self.on_scroll_request = Some(Arc::new(f));
        self
    }

    pub fn with_on_visible_indices_changed(
        mut self,
        f: impl Fn(&IndexChange) + Send + Sync + 'static,
    ) -> Self {
        self.on_visible_indices_changed = Some(Arc::new(f));
        self
    }
}

impl RenderListener for CallbackListener {
    fn on_render_stack_changed(&mut self, render_stack: &RenderStack) {
        if let Some(cb) = &self.on_render_stack_changed {
            cb(render_stack);
        }
    }

    fn on_scroll_request(&mut self, offset: Point) {
        if let Some(cb) = &self.on_scroll_request {
            cb(offset);
        }
    }

    fn on_visible_indices_changed(&mut self, change: &IndexChange) {
        if let Some(cb) = &self.on_visible_indices_changed {
            cb(change);
        }
    }
}

impl core::fmt::Debug for CallbackListener {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CallbackListener")
            .field(
                "on_render_stack_changed",
                &self.on_render_stack_changed.is_some(),
            )
            .field("on_scroll_request", &self.on_scroll_request.is_some())
            .field(
                "on_visible_indices_changed",
                &self.on_visible_indices_changed.is_some(),
            )
            .finish()
    }
}
