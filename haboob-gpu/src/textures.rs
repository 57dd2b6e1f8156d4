//! Texture access used by the kernels.
//!
//! Kernels don't talk to GPU images directly - instead they go through the
//! traits below, which are implemented both for SPIR-V images (here) and for
//! the CPU textures of the reference backend (in the `haboob` crate).

use glam::{UVec2, Vec2, Vec3, Vec4, Vec4Swizzles};
use spirv_std::{Image, Sampler};

pub type Tex<'a> = &'a Image!(2D, type = f32, sampled);
pub type VolumeTex<'a> = &'a Image!(3D, type = f32, sampled);
pub type TexRgba32<'a> = &'a Image!(2D, format = rgba32f, sampled = false);

/// A 3D texture sampled with a filtering sampler, at an explicit mip level.
pub trait VolumeSampler {
    fn sample(&self, uvw: Vec3, lod: f32) -> Vec3;
}

/// A 2D texture sampled with a filtering sampler, at the top mip level.
pub trait MapSampler {
    fn sample(&self, uv: Vec2) -> Vec4;
}

/// A 2D texture read texel-by-texel.
pub trait TexelReader {
    fn fetch(&self, pos: UVec2) -> Vec4;
}

impl<T> VolumeSampler for &T
where
    T: VolumeSampler,
{
    fn sample(&self, uvw: Vec3, lod: f32) -> Vec3 {
        T::sample(self, uvw, lod)
    }
}

impl<T> MapSampler for &T
where
    T: MapSampler,
{
    fn sample(&self, uv: Vec2) -> Vec4 {
        T::sample(self, uv)
    }
}

#[derive(Clone, Copy)]
pub struct SampledVolume<'a> {
    tex: VolumeTex<'a>,
    sampler: &'a Sampler,
}

impl<'a> SampledVolume<'a> {
    pub fn new(tex: VolumeTex<'a>, sampler: &'a Sampler) -> Self {
        Self { tex, sampler }
    }
}

impl VolumeSampler for SampledVolume<'_> {
    fn sample(&self, uvw: Vec3, lod: f32) -> Vec3 {
        let sample: Vec4 = self.tex.sample_by_lod(*self.sampler, uvw, lod);

        sample.xyz()
    }
}

#[derive(Clone, Copy)]
pub struct SampledMap<'a> {
    tex: Tex<'a>,
    sampler: &'a Sampler,
}

impl<'a> SampledMap<'a> {
    pub fn new(tex: Tex<'a>, sampler: &'a Sampler) -> Self {
        Self { tex, sampler }
    }
}

impl MapSampler for SampledMap<'_> {
    fn sample(&self, uv: Vec2) -> Vec4 {
        self.tex.sample_by_lod(*self.sampler, uv, 0.0)
    }
}

impl TexelReader for TexRgba32<'_> {
    fn fetch(&self, pos: UVec2) -> Vec4 {
        (*self).read(pos)
    }
}
