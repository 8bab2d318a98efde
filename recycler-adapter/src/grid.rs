use alloc::vec::Vec;

use recycler::{Dimension, Layout, LayoutManager, Orientation};

use crate::LayoutProvider;

// Slack allowed on the cross axis before an item wraps.
const WRAP_TOLERANCE: f64 = 0.9;

/// Clamps the cross-axis size of `dimension` to the window.
pub(crate) fn clamp_to_window(
    dimension: Dimension,
    window: Dimension,
    orientation: Orientation,
) -> Dimension {
    match orientation {
        Orientation::Vertical => Dimension::new(dimension.width.min(window.width), dimension.height),
        Orientation::Horizontal => {
            Dimension::new(dimension.width, dimension.height.min(window.height))
        }
    }
}

/// Places items in rows (vertical lists) or columns (horizontal lists), wrapping when the next
/// item would overflow the window on the cross axis.
///
/// A row is as tall as its tallest item. Sizes come from the [`LayoutProvider`] unless a layout
/// was overridden with a measured size, which later relayouts keep.
#[derive(Clone, Debug)]
pub struct WrapGridLayoutManager {
    provider: LayoutProvider,
    window: Dimension,
    orientation: Orientation,
    layouts: Vec<Layout>,
    total_width: f64,
    total_height: f64,
}

impl WrapGridLayoutManager {
    pub fn new(provider: LayoutProvider, window: Dimension, orientation: Orientation) -> Self {
        Self::with_cached_layouts(provider, window, orientation, Vec::new())
    }

    /// Starts from a previously computed layout table.
    ///
    /// Cached layouts marked as overridden keep their size on relayout; the rest are recomputed.
    pub fn with_cached_layouts(
        provider: LayoutProvider,
        window: Dimension,
        orientation: Orientation,
        layouts: Vec<Layout>,
    ) -> Self {
        Self {
            provider,
            window,
            orientation,
            layouts,
            total_width: 0.0,
            total_height: 0.0,
        }
    }

    pub fn window(&self) -> Dimension {
        self.window
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn provider(&self) -> &LayoutProvider {
        &self.provider
    }

    pub fn into_layouts(self) -> Vec<Layout> {
        self.layouts
    }

    fn fits(&self, cross_cursor: f64, dimension: Dimension) -> bool {
        cross_cursor + dimension.cross(self.orientation)
            <= self.window.cross(self.orientation) + WRAP_TOLERANCE
    }

    // Index of the first item in the row holding `index - 1`.
    fn first_in_row_before(&self, index: usize) -> usize {
        (0..index)
            .rev()
            .find(|&i| self.cross_start(&self.layouts[i]) == 0.0)
            .unwrap_or(0)
    }

    fn cross_start(&self, layout: &Layout) -> f64 {
        match self.orientation {
            Orientation::Vertical => layout.x,
            Orientation::Horizontal => layout.y,
        }
    }

    fn place(&self, main: f64, cross: f64) -> (f64, f64) {
        match self.orientation {
            Orientation::Vertical => (cross, main),
            Orientation::Horizontal => (main, cross),
        }
    }
}

impl LayoutManager for WrapGridLayoutManager {
    fn relayout_from_index(&mut self, start_index: usize, item_count: usize) {
        let orientation = self.orientation;
        let start = self.first_in_row_before(start_index.min(item_count).min(self.layouts.len()));
        let (mut main_cursor, mut cross_cursor) = match self.layouts.get(start) {
            Some(layout) => (layout.start(orientation), self.cross_start(layout)),
            None => (0.0, 0.0),
        };
        let mut row_extent = 0.0_f64;

        for index in start..item_count {
            let dimension = match self.layouts.get(index) {
                Some(layout) if layout.is_overridden => layout.dimension(),
                _ => self.provider.item_size(index),
            };
            let dimension = clamp_to_window(dimension, self.window, orientation);

            if !self.fits(cross_cursor, dimension) {
                main_cursor += row_extent;
                cross_cursor = 0.0;
                row_extent = 0.0;
            }
            row_extent = row_extent.max(dimension.main(orientation));

            let (x, y) = self.place(main_cursor, cross_cursor);
            match self.layouts.get_mut(index) {
                Some(layout) => {
                    layout.x = x;
                    layout.y = y;
                    layout.width = dimension.width;
                    layout.height = dimension.height;
                }
                None => self
                    .layouts
                    .push(Layout::new(x, y, dimension.width, dimension.height)),
            }
            cross_cursor += dimension.cross(orientation);
        }
        self.layouts.truncate(item_count);

        let extent = main_cursor + row_extent;
        match orientation {
            Orientation::Vertical => {
                self.total_width = self.window.width;
                self.total_height = extent;
            }
            Orientation::Horizontal => {
                self.total_width = extent;
                self.total_height = self.window.height;
            }
        }
    }

    fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    fn content_dimension(&self) -> Dimension {
        Dimension::new(self.total_width, self.total_height)
    }

    fn override_layout(&mut self, index: usize, dimension: Dimension) -> bool {
        let Some(layout) = self.layouts.get_mut(index) else {
            return false;
        };
        let changed = layout.width != dimension.width || layout.height != dimension.height;
        layout.width = dimension.width;
        layout.height = dimension.height;
        layout.is_overridden = true;
        changed
    }
}
