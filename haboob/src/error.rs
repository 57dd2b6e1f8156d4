use glam::UVec2;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Invalid configuration, caught before anything gets dispatched.
///
/// Kernels themselves never fail - whatever they can't handle gets masked,
/// clamped or saturated - so all the preconditions they rely on are checked
/// here, once per dispatch.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// Simpson's rule needs an even, non-zero number of intervals
    #[error("iteration count must be even and non-zero, got {0}")]
    InvalidIterations(u32),

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },

    #[error("{name} must be finite")]
    NonFinite { name: &'static str },

    #[error("volume transform is not invertible")]
    SingularTransform,

    #[error("{name} must not be empty")]
    EmptySize { name: &'static str },

    #[error("{name} has size {actual}, expected {expected}")]
    SizeMismatch {
        name: &'static str,
        expected: UVec2,
        actual: UVec2,
    },

    #[error("{name} has {actual} texels, expected {expected}")]
    TexelCount {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("anisotropy must be within (-1.0, 1.0), got {0}")]
    InvalidAnisotropy(f32),

    #[error("phase blend must be within [0.0, 1.0], got {0}")]
    InvalidPhaseBlend(f32),

    #[error("direction must not be zero")]
    ZeroDirection,

    #[error(
        "near plane ({near}) must be positive and closer than far plane \
         ({far})"
    )]
    InvalidDepthRange { near: f32, far: f32 },

    #[error("field of view must be within (0.0, pi), got {0}")]
    InvalidFov(f32),

    #[error("wavelength range {min}..{max} is invalid")]
    InvalidWavelengthRange { min: f32, max: f32 },
}

pub(crate) fn ensure_positive(name: &'static str, value: f32) -> Result<f32> {
    if !value.is_finite() {
        Err(Error::NonFinite { name })
    } else if value <= 0.0 {
        Err(Error::NonPositive { name, value })
    } else {
        Ok(value)
    }
}

pub(crate) fn ensure_non_negative(
    name: &'static str,
    value: f32,
) -> Result<f32> {
    if !value.is_finite() {
        Err(Error::NonFinite { name })
    } else if value < 0.0 {
        Err(Error::Negative { name, value })
    } else {
        Ok(value)
    }
}
