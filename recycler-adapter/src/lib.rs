//! Adapter utilities for the `recycler` crate.
//!
//! The `recycler` crate is UI-agnostic and only tracks windows and recyclable keys. This crate
//! provides the pieces a list view built on it usually needs:
//!
//! - A wrapping grid [`LayoutManager`](recycler::LayoutManager) fed by per-index sizes
//! - Layout and data providers describing item sizes and data changes
//! - A [`ListController`] wiring them to a [`VirtualRenderer`](recycler::VirtualRenderer)
//!
//! This crate is intentionally framework-agnostic (no ratatui/egui bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod controller;
mod data;
mod grid;
mod provider;


pub use controller::{
    ControllerError, EndReachedCallback, ListController, ListControllerOptions, RenderItem,
};
pub use data::{DataProvider, RowChangedFn};
pub use grid::WrapGridLayoutManager;
pub use provider::{ItemSizeFn, LayoutProvider};
