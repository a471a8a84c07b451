//! Pixel surface plus the SDL2 window the viewer presents it in

mod pixel_buffer;
mod window;

pub use pixel_buffer::PixelBuffer;
pub(crate) use pixel_buffer::write_pixel_rgba;
pub use window::{Display, InputEvent, RenderTarget};

/// Default logical orb size in points
pub const DEFAULT_SIZE: u32 = 300;
