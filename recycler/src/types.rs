use alloc::vec::Vec;

/// Scroll axis of a list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

impl Orientation {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Horizontal)
    }

    /// Picks the component of `(x, y)` that lies on this axis.
    pub fn main(self, x: f64, y: f64) -> f64 {
        match self {
            Self::Vertical => y,
            Self::Horizontal => x,
        }
    }

    /// Builds a point that only moves along this axis.
    pub fn point(self, offset: f64) -> Point {
        match self {
            Self::Vertical => Point { x: 0.0, y: offset },
            Self::Horizontal => Point { x: offset, y: 0.0 },
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimension {
    pub width: f64,
    pub height: f64,
}

impl Dimension {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Extent along the scroll axis.
    pub fn main(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Vertical => self.height,
            Orientation::Horizontal => self.width,
        }
    }

    /// Extent across the scroll axis.
    pub fn cross(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Vertical => self.width,
            Orientation::Horizontal => self.height,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Placement of one logical index, produced by a [`crate::LayoutManager`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layout {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Set when the size came from a measurement instead of the layout strategy.
    pub is_overridden: bool,
}

impl Layout {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            is_overridden: false,
        }
    }

    /// Leading edge along the scroll axis.
    pub fn start(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Vertical => self.y,
            Orientation::Horizontal => self.x,
        }
    }

    /// Trailing edge along the scroll axis.
    pub fn end(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Vertical => self.y + self.height,
            Orientation::Horizontal => self.x + self.width,
        }
    }

    pub fn dimension(&self) -> Dimension {
        Dimension {
            width: self.width,
            height: self.height,
        }
    }
}

/// A scalar interval along the scroll axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Window {
    pub start: f64,
    pub end: f64,
}

impl Window {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn size(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains_window(&self, other: &Window) -> bool {
        self.start <= other.start && self.end >= other.end
    }
}

/// A diff between two sorted index sets.
///
/// `all` is the new set, `entering` holds indexes only present in the new set and `leaving`
/// holds indexes only present in the old one. All three are sorted ascending.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexChange {
    pub all: Vec<usize>,
    pub entering: Vec<usize>,
    pub leaving: Vec<usize>,
}

impl IndexChange {
    pub fn is_empty(&self) -> bool {
        self.entering.is_empty() && self.leaving.is_empty()
    }
}

/// Result of one window recomputation.
///
/// Each field is `None` when the corresponding set did not change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[must_use = "engaged changes must be applied to keep the render stack in sync"]
pub struct WindowUpdate {
    pub engaged: Option<IndexChange>,
    pub visible: Option<IndexChange>,
}

impl WindowUpdate {
    pub fn is_empty(&self) -> bool {
        self.engaged.is_none() && self.visible.is_none()
    }
}
