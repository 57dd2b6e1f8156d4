//! Volumetric raymarching of dust storms.
//!
//! The kernels themselves live in `haboob-gpu` (and are exposed as SPIR-V
//! entry points by `haboob-shaders`); this crate builds their parameter
//! blocks out of validated configuration and runs the very same kernels on
//! the CPU, which is what the tests (and tools comparing GPU output against
//! a reference) use.

mod camera;
mod config;
mod dispatch;
mod error;
mod optics;
mod spectral;
mod texture;
mod volume;

pub use haboob_gpu as gpu;

pub use self::camera::*;
pub use self::config::*;
pub use self::dispatch::*;
pub use self::error::*;
pub use self::optics::*;
pub use self::spectral::*;
pub use self::texture::*;
pub use self::volume::*;
