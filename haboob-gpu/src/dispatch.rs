use bytemuck::{Pod, Zeroable};
use glam::{Mat4, UVec2, Vec3, Vec4, Vec4Swizzles};

/// Per-dispatch geometry and feature-set of a march.
///
/// Every invocation within a dispatch shares this block, so all feature
/// toggles (which used to be separate shader permutations) are decided here
/// once and merely branched upon in the kernels.
#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct MarchVolumeDispatchInfo {
    /// Maps world-coordinates into the volume's local unit cube (centered
    /// around zero, i.e. `<-0.5, 0.5>`).
    pub volume_transform: Mat4,

    /// x - volume width (in texels)
    /// y - volume height (in texels)
    /// z - volume depth (in texels)
    /// w - unused
    pub volume_size: Vec4,

    /// View step per horizontal thread
    pub output_horizontal_step: f32,

    /// View step per vertical thread
    pub output_vertical_step: f32,

    /// Distance to jump forward before marching; manual marching only
    pub initial_z_step: f32,

    /// Distance between samples; manual marching only
    pub march_z_step: f32,

    /// Number of intervals to integrate over; must be even
    pub iterations: u32,

    /// See: `Self::FLAG_*`
    pub flags: u32,

    /// See: [`DebugView`]
    pub debug_view: u32,

    /// Volume texels per world unit, multiplied by the volume's width (in
    /// texels); used by cone tracing
    pub texel_density: f32,

    /// Footprint of a pixel at the ray's origin, used by cone tracing
    pub pixel_radius: f32,

    /// Growth of the pixel's footprint per unit of travelled distance
    pub pixel_radius_delta: f32,

    /// Sharpness of the exponential shadow map comparison
    pub esm_exponent: f32,

    /// Bias of the exponential shadow map comparison
    pub esm_bias: f32,

    /// Size of the output texture (in texels)
    pub output_size: UVec2,

    pub _padding: [u32; 2],
}

impl MarchVolumeDispatchInfo {
    /// Use `initial_z_step` and `march_z_step` instead of spreading the
    /// iterations across the ray.
    pub const FLAG_MANUAL_MARCH: u32 = 1 << 0;

    /// Select density mips proportionally to the ray's footprint.
    pub const FLAG_CONE_TRACE: u32 = 1 << 1;

    /// Use the Beer shadow map for light-path optical depth.
    pub const FLAG_BSM: u32 = 1 << 2;

    /// Smooth the Beer shadow map's depth fraction to hide banding.
    pub const FLAG_BSM_IMPROVE: u32 = 1 << 3;

    /// Each marched ray averages a 2x2 block of the ray-parameter texture.
    pub const FLAG_UPSCALE: u32 = 1 << 4;

    /// Use the exponential shadow map, both in the march and in the deferred
    /// light pass; the latter additionally requires it for [`Self::FLAG_BSM`]
    /// to take effect.
    pub const FLAG_SHADOW: u32 = 1 << 5;

    pub fn has(&self, flag: u32) -> bool {
        self.flags & flag == flag
    }

    pub fn is_manual_march(&self) -> bool {
        self.has(Self::FLAG_MANUAL_MARCH)
    }

    pub fn is_cone_traced(&self) -> bool {
        self.has(Self::FLAG_CONE_TRACE)
    }

    pub fn has_bsm(&self) -> bool {
        self.has(Self::FLAG_BSM)
    }

    pub fn has_bsm_improve(&self) -> bool {
        self.has(Self::FLAG_BSM_IMPROVE)
    }

    pub fn is_upscaled(&self) -> bool {
        self.has(Self::FLAG_UPSCALE)
    }

    pub fn has_shadow(&self) -> bool {
        self.has(Self::FLAG_SHADOW)
    }

    /// Returns whether given texel belongs to the output texture; dispatches
    /// get rounded up to whole workgroups, so some invocations fall outside.
    pub fn contains(&self, pos: UVec2) -> bool {
        pos.x < self.output_size.x && pos.y < self.output_size.y
    }

    /// Returns the number of rays marched along each axis; when upscaling,
    /// that's half of the output (with the march landing in its top-left
    /// quarter).
    pub fn march_size(&self) -> UVec2 {
        if self.is_upscaled() {
            (self.output_size + UVec2::ONE) / 2
        } else {
            self.output_size
        }
    }

    /// See: [`Self::contains()`], [`Self::march_size()`].
    pub fn contains_march(&self, pos: UVec2) -> bool {
        let size = self.march_size();

        pos.x < size.x && pos.y < size.y
    }

    pub fn volume_size(&self) -> Vec3 {
        self.volume_size.xyz()
    }

    pub fn debug_view(&self) -> DebugView {
        DebugView::from_u32(self.debug_view)
    }
}

/// Diagnostic outputs which short-circuit the march's finalization.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub enum DebugView {
    #[default]
    None,

    /// Paints masked rays with an overbright color.
    Mask,

    /// Outputs integrated optical depth.
    Density,

    /// Outputs integrated absorption angstrom.
    Angstrom,

    /// Outputs the cone-tracing LOD at the ray's both ends.
    SampleLevel,

    /// Outputs the ray's total travelled distance.
    RayTravel,
}

impl DebugView {
    pub fn from_u32(val: u32) -> Self {
        match val {
            1 => Self::Mask,
            2 => Self::Density,
            3 => Self::Angstrom,
            4 => Self::SampleLevel,
            5 => Self::RayTravel,
            _ => Self::None,
        }
    }

    pub fn to_u32(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Mask => 1,
            Self::Density => 2,
            Self::Angstrom => 3,
            Self::SampleLevel => 4,
            Self::RayTravel => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_view() {
        for view in [
            DebugView::None,
            DebugView::Mask,
            DebugView::Density,
            DebugView::Angstrom,
            DebugView::SampleLevel,
            DebugView::RayTravel,
        ] {
            assert_eq!(view, DebugView::from_u32(view.to_u32()));
        }

        assert_eq!(DebugView::None, DebugView::from_u32(1234));
    }

    #[test]
    fn flags() {
        let target = MarchVolumeDispatchInfo {
            flags: MarchVolumeDispatchInfo::FLAG_BSM
                | MarchVolumeDispatchInfo::FLAG_UPSCALE,
            ..Default::default()
        };

        assert!(target.has_bsm());
        assert!(target.is_upscaled());
        assert!(!target.has_bsm_improve());
        assert!(!target.is_manual_march());
        assert!(!target.is_cone_traced());
        assert!(!target.has_shadow());
    }

    #[test]
    fn contains() {
        let target = MarchVolumeDispatchInfo {
            output_size: UVec2::new(4, 2),
            ..Default::default()
        };

        assert!(target.contains(UVec2::new(0, 0)));
        assert!(target.contains(UVec2::new(3, 1)));
        assert!(!target.contains(UVec2::new(4, 1)));
        assert!(!target.contains(UVec2::new(3, 2)));
        assert!(target.contains_march(UVec2::new(3, 1)));
    }

    #[test]
    fn march_size() {
        let mut target = MarchVolumeDispatchInfo {
            output_size: UVec2::new(5, 4),
            ..Default::default()
        };

        assert_eq!(UVec2::new(5, 4), target.march_size());

        target.flags = MarchVolumeDispatchInfo::FLAG_UPSCALE;

        assert_eq!(UVec2::new(3, 2), target.march_size());
        assert!(target.contains(UVec2::new(4, 3)));
        assert!(target.contains_march(UVec2::new(2, 1)));
        assert!(!target.contains_march(UVec2::new(3, 1)));
        assert!(!target.contains_march(UVec2::new(2, 2)));
    }
}
