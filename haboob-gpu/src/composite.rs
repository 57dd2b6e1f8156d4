use glam::{vec2, UVec2, Vec2, Vec4, Vec4Swizzles};

use crate::{MapSampler, MarchVolumeDispatchInfo};

/// Lays the marched volume over the lit scene.
pub struct MarchComposite<'a, O> {
    pub dispatch: &'a MarchVolumeDispatchInfo,

    /// Output of [`crate::VolumeMarcher`]
    pub overlay: O,
}

impl<'a, O> MarchComposite<'a, O>
where
    O: MapSampler,
{
    /// Returns the overlay's texture coordinates for given output texel.
    pub fn overlay_uv(&self, pos: UVec2) -> Vec2 {
        let uv = pos.as_vec2()
            * vec2(
                self.dispatch.output_horizontal_step,
                self.dispatch.output_vertical_step,
            );

        if self.dispatch.is_upscaled() {
            uv * 0.5
        } else {
            uv
        }
    }

    /// Returns the lit texel seen through the volume.
    pub fn blend(&self, pos: UVec2, lit: Vec4) -> Vec4 {
        let overlay = self.overlay.sample(self.overlay_uv(pos));

        (lit.xyz() * overlay.w + overlay.xyz()).extend(1.0)
    }
}
