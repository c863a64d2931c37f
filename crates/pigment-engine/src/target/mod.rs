//! Offscreen render target.
//!
//! Leaf-first:
//! - `TransformState`: scale/zoom/offset inputs and the derived projection and
//!   scroll transforms
//! - `ColorBuffer`: a zero-initialized device texture
//! - `CommandSession`: one in-flight batch of passes with begin/commit semantics
//! - `RenderTarget`: owns all of the above and orders clear/draw/commit
//!
//! Lifecycle: `Empty` (no buffer) -> `Ready` -> `Recording` (session open) ->
//! `Ready` on commit. `clear()` returns to `Ready` from any state.

mod color_buffer;
mod config;
mod encoder;
mod render_target;
mod session;
mod transform;

pub use color_buffer::ColorBuffer;
pub use config::TargetConfig;
pub use encoder::DrawEncoder;
pub use render_target::{RenderTarget, TargetState};
pub use session::CommandSession;
pub use transform::{ScrollTransform, TransformInputs, TransformState};
