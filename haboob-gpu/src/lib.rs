//! Common structs, algorithms etc. used by Haboob's shaders and its CPU
//! reference backend.

#![cfg_attr(target_arch = "spirv", no_std)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::manual_range_contains)]

mod beer_shadow;
mod camera;
mod composite;
mod deferred;
mod dispatch;
mod integrator;
mod light;
mod march;
mod optics;
mod phase;
mod ray;
mod shadow;
mod spectral;
mod textures;
mod transmission;
mod utils;
mod volume;

pub use self::beer_shadow::*;
pub use self::camera::*;
pub use self::composite::*;
pub use self::deferred::*;
pub use self::dispatch::*;
pub use self::integrator::*;
pub use self::light::*;
pub use self::march::*;
pub use self::optics::*;
pub use self::phase::*;
pub use self::ray::*;
pub use self::shadow::*;
pub use self::spectral::*;
pub use self::textures::*;
pub use self::transmission::*;
pub use self::utils::*;
pub use self::volume::*;

pub mod prelude {
    pub use core::f32::consts::PI;

    pub use spirv_std::glam::*;
    #[cfg(target_arch = "spirv")]
    pub use spirv_std::num_traits::Float;
    pub use spirv_std::{spirv, Image, Sampler};

    pub use crate::*;
}

/// Smallest value we're willing to divide by.
pub const HABOOB_EPSILON: f32 = 0.000001;
