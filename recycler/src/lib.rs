//! A headless windowing and view-recycling engine for long scrollable lists.
//!
//! For a concrete grid layout and a list-view style controller, see the `recycler-adapter`
//! crate.
//!
//! Only the part of a collection that is near the viewport gets rendered. This crate tracks
//! which logical indexes are *visible* and *engaged* (visible plus a render-ahead margin) for a
//! scroll offset, and maps engaged indexes onto a small pool of reusable identity keys so a
//! render layer can update existing output slots instead of creating new ones.
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - a [`LayoutManager`] producing the per-index layout table
//! - viewport dimensions
//! - scroll offsets
//!
//! and to render the [`RenderStack`] it receives through a [`RenderListener`].
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod error;
mod key;
mod layout;
mod listener;
mod options;
mod pool;
mod renderer;
mod stack;
mod state;
mod tracker;
mod types;
pub mod window;

#[cfg(test)]
mod tests;

pub use error::{RecyclerError, Result};
pub use key::RenderKey;
pub use layout::LayoutManager;
pub use listener::{
    CallbackListener, IndexChangeCallback, RenderListener, RenderStackChangedCallback,
    ScrollRequestCallback,
};
pub use options::{DEFAULT_RENDER_AHEAD_OFFSET, RenderStackParams, RendererOptions};
pub use pool::RecyclePool;
pub use renderer::VirtualRenderer;
pub use stack::RenderStack;
pub use state::TrackerSnapshot;
pub use tracker::{DEFAULT_BINARY_SEARCH_THRESHOLD, ViewabilityTracker};
pub use types::{
    Dimension, IndexChange, Layout, Orientation, Point, Window, WindowUpdate,
};
