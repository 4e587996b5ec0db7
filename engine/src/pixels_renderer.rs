use pixels::Pixels;

use crate::graphics::{CpuRenderer, Renderer2d};
use crate::surface::SurfaceSize;

/// Windowed renderer: views draw into the `pixels` frame buffer through `Renderer2d`, then the
/// buffer is scaled onto the window surface on `present`.
///
/// The buffer stays at the logical size the game asked for; window resizes only change the
/// surface, and `pixels` letterboxes the buffer into it.
pub struct PixelsRenderer2d {
    pixels: Pixels,
    logical: SurfaceSize,
}

impl PixelsRenderer2d {
    pub fn new(mut pixels: Pixels, logical: SurfaceSize) -> Result<Self, pixels::Error> {
        pixels.resize_buffer(logical.width, logical.height)?;
        Ok(Self { pixels, logical })
    }

    pub fn resize_surface(&mut self, window: SurfaceSize) -> Result<(), pixels::Error> {
        if window.is_empty() {
            return Ok(());
        }
        self.pixels.resize_surface(window.width, window.height)?;
        Ok(())
    }

    /// Maps a window-space cursor position to buffer coordinates; `None` outside the buffer.
    pub fn window_pos_to_buffer(&self, pos: (f32, f32)) -> Option<(u32, u32)> {
        self.pixels
            .window_pos_to_pixel(pos)
            .ok()
            .map(|(x, y)| (x as u32, y as u32))
    }

    pub fn draw_frame<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut dyn Renderer2d) -> R,
    {
        let size = self.logical;
        let mut cpu = CpuRenderer::new(self.pixels.frame_mut(), size);
        cpu.begin_frame(size);
        f(&mut cpu)
    }

    pub fn present(&mut self) -> Result<(), pixels::Error> {
        self.pixels.render()
    }
}
