#![cfg_attr(target_arch = "spirv", no_std)]
#![allow(clippy::too_many_arguments)]

pub mod beer_shadow_march;
pub mod deferred_light;
pub mod march_composite;
pub mod march_volume;
