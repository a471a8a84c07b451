//! Error type for the orb boundary layers
//!
//! The shading math itself never fails; these variants cover the places where
//! the orb meets the host: backends, files, windows and the remote channel.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrbError {
    /// The host could not provide a pixel-evaluation facility.
    /// Terminal for the orb instance that hit it.
    #[error("shading backend unavailable: {0}")]
    Backend(String),

    /// A frame was requested after the orb was stopped
    #[error("orb has been stopped")]
    Stopped,

    #[error("surface is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    SurfaceSize {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("unknown preset '{0}' (expected idle, listening, thinking, speaking or asleep)")]
    UnknownPreset(String),

    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config format error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("display error: {0}")]
    Display(String),

    #[error("remote control error: {0}")]
    Remote(String),
}

pub type Result<T> = std::result::Result<T, OrbError>;
