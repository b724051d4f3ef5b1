pub mod instance;
pub mod stage;
pub mod traits;

pub use instance::{RenderBuffer, RenderInstance};
pub use stage::build_render_buffer;
pub use traits::Renderer;
