//! Render backend contract.
//!
//! The engine produces a flat instance buffer; how it reaches the screen is
//! the host's business. A backend receives the buffer once per frame via
//! [`Engine::present`](crate::api::engine::Engine::present) and draws the
//! alpha group, then the additive group, honoring the buffer's blend split.

use super::instance::RenderBuffer;

pub trait Renderer {
    /// Short backend identifier for diagnostics ("webgpu", "canvas", ...).
    fn backend(&self) -> &'static str;

    /// The host surface changed size, in physical pixels.
    fn resize(&mut self, width: u32, height: u32);

    /// Draw one frame from the instance buffer.
    fn draw(&mut self, buffer: &RenderBuffer);
}
