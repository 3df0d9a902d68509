//! Geometry, layout, and input core of a pie-menu launcher.
//!
//! Nothing here does I/O or knows about a windowing system: layouts paint into
//! a [`draw::Canvas`], touches come in as plain points, and the recognizer is a
//! trait the host implements.

mod macros;

pub mod cache;
pub mod dial;
pub mod draw;
pub mod gauge;
pub mod geom;
pub mod grid;
pub mod ink;
pub mod recognizer;
pub mod region;
pub mod sector;
pub mod transition;

pub use geom::{Point, Rect, Size};
pub use region::{Hit, Surface};
