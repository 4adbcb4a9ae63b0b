//! Inkpad Application
//!
//! Browser shell for the Inkpad drawing surface: finds the canvas and its
//! controls in the host page, forwards DOM events to an
//! [`inkpad_core::DrawingController`], and presents the raster.

mod config;
mod error;

pub use config::{ElementIds, MountConfig};
pub use error::MountError;

#[cfg(target_arch = "wasm32")]
mod dom;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{MountedSurface, mount, run_wasm, unmount_default};
