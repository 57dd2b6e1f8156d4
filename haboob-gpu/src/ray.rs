use glam::{uvec2, vec4, UVec2, Vec2, Vec3, Vec4, Vec4Swizzles};

use crate::{CameraBuffer, MarchVolumeDispatchInfo, TexelReader};

#[derive(Copy, Clone, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
    travel_distance: f32,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            travel_distance: 0.0,
        }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn travel_distance(&self) -> f32 {
        self.travel_distance
    }

    /// Returns the ray's current position.
    pub fn pos(&self) -> Vec3 {
        self.origin + self.direction * self.travel_distance
    }

    /// Moves the ray forward.
    pub fn march(&mut self, distance: f32) {
        self.travel_distance += distance.max(0.0);
    }
}

/// A world-space ray bounded by two points.
#[derive(Copy, Clone, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct RaySegment {
    pub ray: Ray,
    pub start: Vec3,
    pub end: Vec3,
    pub length: f32,
}

impl RaySegment {
    /// Shortest segment we're willing to march through; anything smaller is
    /// treated as a miss.
    pub const MIN_LENGTH: f32 = 0.000001;

    /// Unprojects given ray-parameters through the camera.
    ///
    /// Returns `None` if the segment is degenerate.
    pub fn unproject(camera: &CameraBuffer, params: RayParams) -> Option<Self> {
        let ndc = params.ndc();
        let start = camera.ndc_to_world(ndc.extend(params.near_z()));
        let end = camera.ndc_to_world(ndc.extend(params.far_z()));
        let length = start.distance(end);

        if length < Self::MIN_LENGTH || length.is_nan() {
            return None;
        }

        Some(Self {
            ray: Ray::new(start, (end - start) / length),
            start,
            end,
            length,
        })
    }
}

/// A single texel of the ray-parameter texture, as produced by the
/// rasterization pass.
///
/// x - near depth (in camera's clip space)
/// y - far depth (in camera's clip space)
/// z - NDC x
/// w - NDC y
#[derive(Copy, Clone, Default, PartialEq)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct RayParams(pub Vec4);

impl RayParams {
    /// Marks rays which don't intersect the volume.
    pub const MASKED: Self = Self(Vec4::new(-1.0, -1.0, 0.0, 0.0));

    pub fn new(near_z: f32, far_z: f32, ndc: Vec2) -> Self {
        Self(vec4(near_z, far_z, ndc.x, ndc.y))
    }

    pub fn near_z(&self) -> f32 {
        self.0.x
    }

    pub fn far_z(&self) -> f32 {
        self.0.y
    }

    pub fn ndc(&self) -> Vec2 {
        self.0.zw()
    }

    pub fn is_masked(&self) -> bool {
        self.0.x < 0.0 && self.0.y < 0.0
    }

    /// Loads ray-parameters for given output texel.
    ///
    /// When upscaling, each output texel covers a 2x2 block of the ray
    /// texture; the block's rays are averaged (skipping masked ones), which
    /// loses some accuracy around edges of the volume, but quarters the
    /// number of marches. Blocks hanging off the texture's edge (for odd
    /// output sizes) reuse its last row / column.
    pub fn fetch(
        rays: &impl TexelReader,
        pos: UVec2,
        dispatch: &MarchVolumeDispatchInfo,
    ) -> Self {
        if !dispatch.is_upscaled() {
            return Self(rays.fetch(pos));
        }

        let pos = 2 * pos;
        let max = dispatch.output_size.max(UVec2::ONE) - UVec2::ONE;
        let fetch = |offset: UVec2| Self(rays.fetch((pos + offset).min(max)));

        Self::average([
            fetch(uvec2(0, 0)),
            fetch(uvec2(1, 0)),
            fetch(uvec2(0, 1)),
            fetch(uvec2(1, 1)),
        ])
    }

    pub fn average(candidates: [Self; 4]) -> Self {
        let mut sum = Vec4::ZERO;
        let mut count = 0.0;
        let mut idx = 0;

        while idx < 4 {
            let candidate = candidates[idx];

            if !candidate.is_masked() {
                sum += candidate.0;
                count += 1.0;
            }

            idx += 1;
        }

        if count > 0.0 {
            Self(sum / count)
        } else {
            Self::MASKED
        }
    }
}

/// How a ray gets marched through the volume.
#[derive(Copy, Clone, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct MarchParams {
    /// Number of intervals; the ray gets sampled `iterations + 1` times
    pub iterations: u32,

    /// Distance skipped before the first sample
    pub initial_step: f32,

    /// Distance between two consecutive samples
    pub step: f32,
}

impl MarchParams {
    pub fn new(
        dispatch: &MarchVolumeDispatchInfo,
        iterations: u32,
        segment_length: f32,
    ) -> Self {
        if dispatch.is_manual_march() {
            Self {
                iterations,
                initial_step: dispatch.initial_z_step,
                step: dispatch.march_z_step,
            }
        } else {
            Self {
                iterations,
                initial_step: 0.0,
                step: segment_length / (iterations.max(1) as f32),
            }
        }
    }

    /// Returns the distance covered between the first and the last sample.
    pub fn span(&self) -> f32 {
        self.step * (self.iterations as f32)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{vec2, vec3, Mat4};

    use super::*;

    struct Texels([Vec4; 4]);

    impl TexelReader for Texels {
        fn fetch(&self, pos: UVec2) -> Vec4 {
            self.0[(pos.y * 2 + pos.x) as usize]
        }
    }

    #[test]
    fn unproject() {
        let camera = CameraBuffer::new(
            Mat4::IDENTITY,
            Mat4::orthographic_lh(-1.0, 1.0, -1.0, 1.0, 1.0, 3.0),
        );

        let target = RaySegment::unproject(
            &camera,
            RayParams::new(0.25, 0.75, vec2(0.5, -0.5)),
        )
        .unwrap();

        assert_relative_eq!(target.start.x, 0.5, epsilon = 0.0001);
        assert_relative_eq!(target.start.y, -0.5, epsilon = 0.0001);
        assert_relative_eq!(target.start.z, 1.5, epsilon = 0.0001);
        assert_relative_eq!(target.end.z, 2.5, epsilon = 0.0001);
        assert_relative_eq!(target.length, 1.0, epsilon = 0.0001);
        assert_relative_eq!(target.ray.direction().z, 1.0, epsilon = 0.0001);
        assert_relative_eq!(
            target.ray.direction().length(),
            1.0,
            epsilon = 0.0001
        );
    }

    #[test]
    fn unproject_degenerate() {
        let camera = CameraBuffer::new(
            Mat4::IDENTITY,
            Mat4::orthographic_lh(-1.0, 1.0, -1.0, 1.0, 1.0, 3.0),
        );

        assert!(RaySegment::unproject(
            &camera,
            RayParams::new(0.5, 0.5, Vec2::ZERO)
        )
        .is_none());
    }

    #[test]
    fn march() {
        let mut target = Ray::new(vec3(1.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0));

        target.march(0.5);
        target.march(1.0);
        target.march(-3.0);

        assert_eq!(1.5, target.travel_distance());
        assert_eq!(vec3(1.0, 1.5, 0.0), target.pos());
    }

    #[test]
    fn masking() {
        assert!(RayParams::MASKED.is_masked());
        assert!(RayParams::new(-1.0, -2.0, Vec2::ONE).is_masked());
        assert!(!RayParams::new(-1.0, 0.5, Vec2::ONE).is_masked());
        assert!(!RayParams::new(0.0, 0.0, Vec2::ONE).is_masked());
    }

    #[test]
    fn fetch_upscaled() {
        let dispatch = MarchVolumeDispatchInfo {
            flags: MarchVolumeDispatchInfo::FLAG_UPSCALE,
            output_size: uvec2(2, 2),
            ..Default::default()
        };

        let rays = Texels([
            vec4(0.1, 0.5, 0.0, 0.0),
            RayParams::MASKED.0,
            vec4(0.3, 0.7, 0.3, 0.0),
            vec4(0.2, 0.6, 0.0, 0.3),
        ]);

        let target = RayParams::fetch(&rays, UVec2::ZERO, &dispatch);

        assert_relative_eq!(target.near_z(), 0.2, epsilon = 0.0001);
        assert_relative_eq!(target.far_z(), 0.6, epsilon = 0.0001);
        assert_relative_eq!(target.ndc().x, 0.1, epsilon = 0.0001);
        assert_relative_eq!(target.ndc().y, 0.1, epsilon = 0.0001);

        let rays = Texels([RayParams::MASKED.0; 4]);

        assert!(RayParams::fetch(&rays, UVec2::ZERO, &dispatch).is_masked());
    }

    /// Ray texture which, like a storage image, reads zeros outside of its
    /// bounds.
    struct Bounded {
        size: UVec2,
        texel: Vec4,
    }

    impl TexelReader for Bounded {
        fn fetch(&self, pos: UVec2) -> Vec4 {
            if pos.cmplt(self.size).all() {
                self.texel
            } else {
                Vec4::ZERO
            }
        }
    }

    #[test]
    fn fetch_upscaled_odd_size() {
        let dispatch = MarchVolumeDispatchInfo {
            flags: MarchVolumeDispatchInfo::FLAG_UPSCALE,
            output_size: uvec2(5, 5),
            ..Default::default()
        };

        let rays = Bounded {
            size: uvec2(5, 5),
            texel: vec4(0.2, 0.8, 0.9, 0.9),
        };

        assert_eq!(uvec2(3, 3), dispatch.march_size());

        // Block of the last marched texel hangs off the texture's edge
        for pos in [uvec2(2, 2), uvec2(2, 0), uvec2(0, 2)] {
            let target = RayParams::fetch(&rays, pos, &dispatch);

            assert_relative_eq!(target.near_z(), 0.2, epsilon = 0.0001);
            assert_relative_eq!(target.far_z(), 0.8, epsilon = 0.0001);
            assert_relative_eq!(target.ndc().x, 0.9, epsilon = 0.0001);
            assert_relative_eq!(target.ndc().y, 0.9, epsilon = 0.0001);
        }
    }

    #[test]
    fn fetch_full_resolution() {
        let rays = Texels([
            vec4(0.1, 0.5, 0.0, 0.0),
            vec4(0.2, 0.5, 0.0, 0.0),
            vec4(0.3, 0.5, 0.0, 0.0),
            vec4(0.4, 0.5, 0.0, 0.0),
        ]);

        let target = RayParams::fetch(
            &rays,
            uvec2(1, 1),
            &MarchVolumeDispatchInfo::default(),
        );

        assert_eq!(0.4, target.near_z());
    }

    #[test]
    fn march_params() {
        let auto = MarchParams::new(&Default::default(), 8, 4.0);

        assert_eq!(0.0, auto.initial_step);
        assert_eq!(0.5, auto.step);
        assert_eq!(4.0, auto.span());

        let manual = MarchParams::new(
            &MarchVolumeDispatchInfo {
                flags: MarchVolumeDispatchInfo::FLAG_MANUAL_MARCH,
                initial_z_step: 0.25,
                march_z_step: 0.1,
                ..Default::default()
            },
            8,
            4.0,
        );

        assert_eq!(0.25, manual.initial_step);
        assert_eq!(0.1, manual.step);
    }
}
