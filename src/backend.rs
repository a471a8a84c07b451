//! Pixel-evaluation backends
//!
//! A backend runs `shading::shade` once per pixel of a `PixelBuffer`. The CPU
//! backend shades rows on a dedicated rayon pool, or on the calling thread in
//! sequential mode; both produce identical bytes.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::display::{write_pixel_rgba, PixelBuffer};
use crate::error::{OrbError, Result};
use crate::reflection::ReflectionSetting;
use crate::shading::{pixel_to_uv, shade};
use crate::state::OrbState;

/// Evaluates the orb shading function over a surface
pub trait ShadingBackend: Send {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Shade every pixel of `buffer` for `state` at `time` seconds
    fn render(
        &mut self,
        state: &OrbState,
        time: f32,
        reflection: ReflectionSetting,
        buffer: &mut PixelBuffer,
    ) -> Result<()>;
}

/// Which backend to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Row-parallel on a rayon pool; `threads == 0` lets rayon pick
    Parallel { threads: usize },
    Sequential,
}

impl Default for BackendKind {
    fn default() -> Self {
        Self::Parallel { threads: 0 }
    }
}

pub fn create_backend(kind: BackendKind) -> Result<Box<dyn ShadingBackend>> {
    let backend = match kind {
        BackendKind::Parallel { threads } => CpuBackend::parallel(threads)?,
        BackendKind::Sequential => CpuBackend::sequential(),
    };
    log::info!("shading backend: {}", backend.name());
    Ok(Box::new(backend))
}

// ============================================================================
// CPU backend
// ============================================================================

pub struct CpuBackend {
    pool: Option<ThreadPool>,
}

impl CpuBackend {
    /// Build a backend with its own pool of `threads` workers.
    /// Fails if the pool cannot be created.
    pub fn parallel(threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("orb-shade-{}", i))
            .build()
            .map_err(|e| OrbError::Backend(e.to_string()))?;
        log::debug!("shading pool started with {} threads", pool.current_num_threads());
        Ok(Self { pool: Some(pool) })
    }

    /// Shade on the calling thread
    pub fn sequential() -> Self {
        Self { pool: None }
    }
}

impl ShadingBackend for CpuBackend {
    fn name(&self) -> &str {
        if self.pool.is_some() {
            "cpu-parallel"
        } else {
            "cpu-sequential"
        }
    }

    fn render(
        &mut self,
        state: &OrbState,
        time: f32,
        reflection: ReflectionSetting,
        buffer: &mut PixelBuffer,
    ) -> Result<()> {
        let (width, height) = (buffer.width(), buffer.height());
        if width == 0 || height == 0 {
            return Ok(());
        }
        let stride = buffer.stride();
        let rows = buffer.as_bytes_mut();
        let shade_row = |(y, row): (usize, &mut [u8])| {
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let uv = pixel_to_uv(x as u32, y as u32, width, height);
                let [r, g, b, a] = shade(uv, state, time, reflection).to_bytes();
                write_pixel_rgba(px, r, g, b, a);
            }
        };

        match &self.pool {
            Some(pool) => pool.install(|| {
                rows.par_chunks_exact_mut(stride).enumerate().for_each(shade_row);
            }),
            None => rows.chunks_exact_mut(stride).enumerate().for_each(shade_row),
        }
        Ok(())
    }
}
