use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4, Vec4Swizzles};

#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct DirectionalLight {
    /// x - direction x
    /// y - direction y
    /// z - direction z
    /// w - unused
    pub direction: Vec4,

    /// x - color r
    /// y - color g
    /// z - color b
    /// w - unused
    pub diffuse: Vec4,

    /// x - color r
    /// y - color g
    /// z - color b
    /// w - unused
    pub ambient: Vec4,
}

impl DirectionalLight {
    pub fn new(direction: Vec3, diffuse: Vec3, ambient: Vec3) -> Self {
        Self {
            direction: direction.normalize().extend(0.0),
            diffuse: diffuse.extend(0.0),
            ambient: ambient.extend(0.0),
        }
    }

    pub fn direction(&self) -> Vec3 {
        self.direction.xyz()
    }

    pub fn diffuse(&self) -> Vec3 {
        self.diffuse.xyz()
    }

    pub fn ambient(&self) -> Vec3 {
        self.ambient.xyz()
    }

    /// Returns diffuse color spread across the four integration buckets.
    ///
    /// The fourth bucket describes the major lobe of CIE's X function, which
    /// is fed from the red channel (same as the first bucket).
    pub fn diffuse_buckets(&self) -> Vec4 {
        self.diffuse.xyzx()
    }

    /// See: [`Self::diffuse_buckets()`].
    pub fn ambient_buckets(&self) -> Vec4 {
        self.ambient.xyzx()
    }
}
