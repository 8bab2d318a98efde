use crate::Orientation;

/// Render-ahead margin used when none is configured.
pub const DEFAULT_RENDER_AHEAD_OFFSET: f64 = 250.0;

/// Parameters of one list instance.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderStackParams {
    pub item_count: usize,
    pub orientation: Orientation,
    /// Extra distance on both sides of the viewport within which items stay engaged.
    pub render_ahead_offset: f64,
    /// Offset the first fit happens at.
    pub initial_offset: f64,
    /// When set and a layout manager is present, the offset of this index replaces
    /// `initial_offset`.
    pub initial_render_index: Option<usize>,
}

impl Default for RenderStackParams {
    fn default() -> Self {
        Self::new(0)
    }
}

impl RenderStackParams {
    pub fn new(item_count: usize) -> Self {
        Self {
            item_count,
            orientation: Orientation::Vertical,
            render_ahead_offset: DEFAULT_RENDER_AHEAD_OFFSET,
            initial_offset: 0.0,
            initial_render_index: None,
        }
    }

    pub fn with_item_count(mut self, item_count: usize) -> Self {
        self.item_count = item_count;
        self
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

    pub fn is_horizontal(&self) -> bool {
        self.orientation.is_horizontal()
    }
}

/// Behavior switches for [`crate::VirtualRenderer`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RendererOptions {
    /// Never hand the key of a disengaged index to another index.
    ///
    /// Items are still rendered progressively, but every index that was ever engaged keeps its
    /// own output slot.
    pub disable_recycling: bool,
}

impl RendererOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_disable_recycling(mut self, disable_recycling: bool) -> Self {
        self.disable_recycling = disable_recycling;
        self
    }

    pub fn is_recycling_enabled(&self) -> bool {
        !self.disable_recycling
    }
}
