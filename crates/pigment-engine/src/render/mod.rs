//! Draw commands and the per-pass data devices consume.
//!
//! Convention:
//! - Draw geometry is in logical units (top-left origin, +Y down).
//! - Every device maps logical positions the same way:
//!   `device = logical * scroll.scale - scroll.offset`,
//!   `ndc = projection * (device, 0, 1)`.

mod cmd;
mod pass;
pub(crate) mod raster;
pub(crate) mod shapes;

pub use cmd::DrawCmd;
pub use pass::{LoadAction, PassDesc, TransformUniform};
