use glam::Vec3;
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{dehomogenize, MarchVolumeDispatchInfo, Ray, VolumeSampler};

/// A single sample of the density field.
#[derive(Clone, Copy, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct DensitySample {
    pub density: f32,

    /// Upper bound of density around the sample; reserved, nothing reads it
    /// yet
    pub max_density: f32,

    pub angstrom: f32,
}

impl DensitySample {
    pub fn from_texel(texel: Vec3) -> Self {
        Self {
            density: texel.x,
            max_density: texel.y,
            angstrom: texel.z,
        }
    }
}

/// Density field of the volume, sampled in world-coordinates.
pub struct DensityField<'a, V> {
    dispatch: &'a MarchVolumeDispatchInfo,
    volume: V,
}

impl<'a, V> DensityField<'a, V>
where
    V: VolumeSampler,
{
    pub fn new(dispatch: &'a MarchVolumeDispatchInfo, volume: V) -> Self {
        Self { dispatch, volume }
    }

    /// Maps a point in world-coordinates into the volume's texture
    /// coordinates (`<0.0, 1.0>` inside the volume).
    pub fn uvw(&self, pos: Vec3) -> Vec3 {
        dehomogenize(self.dispatch.volume_transform * pos.extend(1.0))
            + Vec3::splat(0.5)
    }

    /// Returns the mip level to sample from after the ray has travelled
    /// given distance.
    ///
    /// With cone tracing, the pixel's footprint widens linearly with the
    /// travelled distance and we pick the mip whose texels match that
    /// footprint; otherwise the most detailed mip is always used.
    pub fn sample_level(&self, travel_distance: f32) -> f32 {
        if self.dispatch.is_cone_traced() {
            cone_sample_level(self.dispatch, travel_distance)
        } else {
            0.0
        }
    }

    pub fn sample(&self, ray: &Ray) -> DensitySample {
        let uvw = self.uvw(ray.pos());
        let lod = self.sample_level(ray.travel_distance());

        DensitySample::from_texel(self.volume.sample(uvw, lod))
    }
}

pub fn cone_sample_level(
    dispatch: &MarchVolumeDispatchInfo,
    travel_distance: f32,
) -> f32 {
    let radius =
        dispatch.pixel_radius + dispatch.pixel_radius_delta * travel_distance;

    let texels = radius * dispatch.texel_density / dispatch.volume_size.x;

    if texels > 1.0 {
        texels.log2()
    } else {
        0.0
    }
}
