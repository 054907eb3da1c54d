//! Consumer side of the scene graph: paint-order traversal and hit testing.
//!
//! No drawing backend lives here. Hosts implement [`Canvas`] and feed it
//! bounds from [`skx_core::resolve_bounds`].

pub mod hit;
pub mod paint;

pub use hit::{click_handler, hit_test};
pub use paint::{Canvas, paint_scene};
