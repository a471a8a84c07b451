use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

use super::PixelBuffer;
use crate::error::{OrbError, Result};

fn display_err(e: impl ToString) -> OrbError {
    OrbError::Display(e.to_string())
}

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    width: u32,
    height: u32,
}

/// Streaming texture at render resolution; scaled to the window on present
pub struct RenderTarget<'a> {
    texture: Texture<'a>,
    width: u32,
    height: u32,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
}

impl Display {
    /// Create a window of `width`x`height` logical points
    /// vsync=true: locked to monitor refresh (typically 60fps)
    /// vsync=false: uncapped framerate for performance testing
    pub fn with_options(
        title: &str,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<(Self, TextureCreator<WindowContext>)> {
        let sdl_context = sdl2::init().map_err(display_err)?;
        let video_subsystem = sdl_context.video().map_err(display_err)?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .allow_highdpi()
            .build()
            .map_err(display_err)?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder.build().map_err(display_err)?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump().map_err(display_err)?;

        log::debug!("window {}x{} (vsync {})", width, height, vsync);

        Ok((
            Self {
                canvas,
                event_pump,
                width,
                height,
            },
            texture_creator,
        ))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Upload `buffer` and stretch it over the whole window
    pub fn present(&mut self, target: &mut RenderTarget, buffer: &PixelBuffer) -> Result<()> {
        if (buffer.width(), buffer.height()) != (target.width, target.height) {
            return Err(OrbError::SurfaceSize {
                expected_width: target.width,
                expected_height: target.height,
                actual_width: buffer.width(),
                actual_height: buffer.height(),
            });
        }

        target
            .texture
            .update(None, buffer.as_bytes(), buffer.stride())
            .map_err(display_err)?;

        self.canvas.copy(&target.texture, None, None).map_err(display_err)?;
        self.canvas.present();
        Ok(())
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => events.push(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k),
                    repeat: false,
                    ..
                } => events.push(InputEvent::KeyDown(k)),
                _ => {},
            }
        }

        events
    }
}

impl<'a> RenderTarget<'a> {
    /// Create render target with custom resolution
    pub fn with_size(
        texture_creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::RGBA8888, width, height)
            .map_err(display_err)?;
        Ok(Self {
            texture,
            width,
            height,
        })
    }
}
