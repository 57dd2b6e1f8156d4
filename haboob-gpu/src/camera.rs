use bytemuck::{Pod, Zeroable};
use glam::{vec2, Mat4, Vec2, Vec3, Vec4, Vec4Swizzles};

/// Transformations of a camera - either the eye or a light.
///
/// Matrices follow the column-vector convention (`clip = m * pos`) and map
/// depth into `<0.0, 1.0>`.
#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct CameraBuffer {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
    pub inverse_view_projection: Mat4,
}

impl CameraBuffer {
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        let view_projection = projection * view;

        Self {
            view,
            projection,
            view_projection,
            inverse_view_projection: view_projection.inverse(),
        }
    }

    /// Given a point in world-coordinates, returns it in clip-coordinates.
    pub fn world_to_clip(&self, pos: Vec3) -> Vec4 {
        self.view_projection * pos.extend(1.0)
    }

    /// Given a point in world-coordinates, returns it in NDC-coordinates.
    pub fn world_to_ndc(&self, pos: Vec3) -> Vec3 {
        dehomogenize(self.world_to_clip(pos))
    }

    /// Given a point in NDC-coordinates, returns it in world-coordinates.
    pub fn ndc_to_world(&self, ndc: Vec3) -> Vec3 {
        dehomogenize(self.inverse_view_projection * ndc.extend(1.0))
    }

    /// Returns the center of the near plane, in world-coordinates.
    pub fn origin(&self) -> Vec3 {
        self.ndc_to_world(Vec3::ZERO)
    }

    /// Given a point in NDC-coordinates, returns it in texture-coordinates
    /// (`<0.0, 1.0>`, with Y pointing down).
    pub fn ndc_to_uv(ndc: Vec2) -> Vec2 {
        vec2(0.5 * ndc.x + 0.5, -0.5 * ndc.y + 0.5)
    }

    /// Inverse of [`Self::ndc_to_uv()`].
    pub fn uv_to_ndc(uv: Vec2) -> Vec2 {
        vec2(2.0 * uv.x - 1.0, 1.0 - 2.0 * uv.y)
    }
}

pub fn dehomogenize(pos: Vec4) -> Vec3 {
    pos.xyz() / pos.w
}
