use glam::{ivec3, IVec3, UVec3, Vec3};
use rayon::prelude::*;

use crate::gpu::{lerp, VolumeSampler};
use crate::{Error, Result};

/// What reading outside of the volume returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AddressMode {
    /// Empty space, i.e. zero density.
    #[default]
    ClampToBorder,

    /// The nearest texel at the volume's boundary.
    ClampToEdge,
}

/// CPU counterpart of the 3D density texture, with its full mip chain.
///
/// x - density
/// y - max density (upper bound of density around the texel)
/// z - angstrom exponent
#[derive(Clone, Debug)]
pub struct Volume3d {
    label: String,
    address_mode: AddressMode,
    levels: Vec<VolumeLevel>,
}

#[derive(Clone, Debug)]
struct VolumeLevel {
    size: UVec3,
    texels: Vec<Vec3>,
}

impl VolumeLevel {
    fn index(&self, pos: UVec3) -> usize {
        ((pos.z * self.size.y + pos.y) * self.size.x + pos.x) as usize
    }

    fn texel(&self, pos: IVec3, address_mode: AddressMode) -> Vec3 {
        let max = self.size.as_ivec3() - 1;

        match address_mode {
            AddressMode::ClampToBorder => {
                if pos.cmplt(IVec3::ZERO).any() || pos.cmpgt(max).any() {
                    return Vec3::ZERO;
                }

                self.texels[self.index(pos.as_uvec3())]
            }

            AddressMode::ClampToEdge => {
                let pos = pos.clamp(IVec3::ZERO, max).as_uvec3();

                self.texels[self.index(pos)]
            }
        }
    }

    /// Trilinear filtering, with texel centers at `(i + 0.5) / size`.
    fn sample(&self, uvw: Vec3, address_mode: AddressMode) -> Vec3 {
        let pos = uvw * self.size.as_vec3() - 0.5;
        let base = pos.floor();
        let t = pos - base;
        let base = base.as_ivec3();
        let texel = |offset: IVec3| self.texel(base + offset, address_mode);

        let plane = |z: i32| {
            let top = lerp(texel(ivec3(0, 0, z)), texel(ivec3(1, 0, z)), t.x);

            let bottom =
                lerp(texel(ivec3(0, 1, z)), texel(ivec3(1, 1, z)), t.x);

            lerp(top, bottom, t.y)
        };

        lerp(plane(0), plane(1), t.z)
    }

    /// Returns the next, twice smaller level; density and angstrom get
    /// averaged, max density gets maxed.
    fn downsample(&self) -> Self {
        let size = (self.size / 2).max(UVec3::ONE);
        let mut texels = vec![Vec3::ZERO; (size.x * size.y * size.z) as usize];

        texels.par_iter_mut().enumerate().for_each(|(idx, texel)| {
            let idx = idx as u32;

            let pos = UVec3::new(
                idx % size.x,
                (idx / size.x) % size.y,
                idx / (size.x * size.y),
            );

            let mut sum = Vec3::ZERO;
            let mut max_density = 0.0f32;
            let mut count = 0.0;

            for offset in 0..8 {
                let child = 2 * pos
                    + UVec3::new(offset & 1, (offset >> 1) & 1, offset >> 2);

                if child.cmpge(self.size).any() {
                    continue;
                }

                let value = self.texels[self.index(child)];

                sum += value;
                max_density = max_density.max(value.y);
                count += 1.0;
            }

            *texel = Vec3::new(sum.x / count, max_density, sum.z / count);
        });

        Self { size, texels }
    }
}

impl Volume3d {
    pub fn new(label: impl AsRef<str>, size: UVec3) -> Result<Self> {
        Self::from_fn(label, size, |_| Vec3::ZERO)
    }

    /// Creates a volume by evaluating given function at the center of each
    /// texel, in texture coordinates.
    pub fn from_fn(
        label: impl AsRef<str>,
        size: UVec3,
        f: impl Fn(Vec3) -> Vec3 + Sync,
    ) -> Result<Self> {
        let label = label.as_ref();

        if size.cmpeq(UVec3::ZERO).any() {
            return Err(Error::EmptySize { name: "volume" });
        }

        log::debug!("Allocating volume `{label}`; size={:?}", size);

        let mut texels = vec![Vec3::ZERO; (size.x * size.y * size.z) as usize];

        texels.par_iter_mut().enumerate().for_each(|(idx, texel)| {
            let idx = idx as u32;

            let pos = UVec3::new(
                idx % size.x,
                (idx / size.x) % size.y,
                idx / (size.x * size.y),
            );

            *texel = f((pos.as_vec3() + 0.5) / size.as_vec3());
        });

        Ok(Self {
            label: label.to_owned(),
            address_mode: Default::default(),
            levels: vec![VolumeLevel { size, texels }],
        })
    }

    pub fn with_address_mode(mut self, address_mode: AddressMode) -> Self {
        self.address_mode = address_mode;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn size(&self) -> UVec3 {
        self.levels[0].size
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn level_size(&self, level: usize) -> Option<UVec3> {
        self.levels.get(level).map(|level| level.size)
    }

    /// Returns texel of the most detailed level; out-of-bounds reads are
    /// resolved according to the address mode.
    pub fn get(&self, pos: UVec3) -> Vec3 {
        self.levels[0].texel(pos.as_ivec3(), self.address_mode)
    }

    /// Overwrites texel of the most detailed level, dropping all the other
    /// levels (which are stale from now on).
    pub fn set(&mut self, pos: UVec3, value: Vec3) {
        self.levels.truncate(1);

        let level = &mut self.levels[0];

        if pos.cmplt(level.size).all() {
            let idx = level.index(pos);

            level.texels[idx] = value;
        }
    }

    /// Rebuilds the whole mip chain, down to a single texel.
    pub fn generate_mips(&mut self) {
        self.levels.truncate(1);

        while let Some(last) = self.levels.last() {
            if last.size == UVec3::ONE {
                break;
            }

            let next = last.downsample();

            self.levels.push(next);
        }

        log::debug!(
            "Generated mips for volume `{}`; levels={}",
            self.label,
            self.levels.len(),
        );
    }

    /// Returns texels of the most detailed level, ready to be uploaded into
    /// an `rgb32f` texture.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.levels[0].texels)
    }
}

impl VolumeSampler for Volume3d {
    fn sample(&self, uvw: Vec3, lod: f32) -> Vec3 {
        let max_level = (self.levels.len() - 1) as f32;
        let lod = if lod.is_nan() { 0.0 } else { lod.clamp(0.0, max_level) };
        let lo = lod.floor();
        let hi = lod.ceil();
        let sample = |level: f32| {
            self.levels[level as usize].sample(uvw, self.address_mode)
        };

        if lo == hi {
            sample(lo)
        } else {
            lerp(sample(lo), sample(hi), lod - lo)
        }
    }
}
