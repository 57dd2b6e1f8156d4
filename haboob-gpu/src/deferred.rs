use glam::{Vec3, Vec4, Vec4Swizzles};

use crate::{
    beer_lambert, CameraBuffer, DirectionalLight, F32Ext, LightSpace,
    MapSampler, MarchVolumeDispatchInfo, ShadowResolver,
};

/// A single texel of the G-buffer.
#[derive(Clone, Copy, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct GBufferTexel {
    /// x - color r
    /// y - color g
    /// z - color b
    /// w - alpha
    pub diffuse: Vec4,

    /// World-space normal
    pub normal: Vec3,

    /// World-space position
    pub position: Vec3,
}

impl GBufferTexel {
    pub fn new(diffuse: Vec4, normal: Vec4, position: Vec4) -> Self {
        Self {
            diffuse,
            normal: normal.xyz(),
            position: position.xyz(),
        }
    }
}

/// Lights opaque geometry behind (and within) the volume.
pub struct DeferredLight<'a, E, B> {
    pub light: &'a DirectionalLight,
    pub light_camera: &'a CameraBuffer,
    pub dispatch: &'a MarchVolumeDispatchInfo,

    /// Exponential shadow map, rendered from the light camera
    pub esm: E,

    /// Beer shadow map, rendered by [`crate::BeerShadowMarcher`]
    pub bsm: B,
}

impl<'a, E, B> DeferredLight<'a, E, B>
where
    E: MapSampler,
    B: MapSampler,
{
    pub fn shade(&self, texel: GBufferTexel) -> Vec4 {
        let shadow = self.shadow(texel.position);
        let cos_theta = texel.normal.dot(-self.light.direction());
        let irradiance = shadow * half_lambert(cos_theta).saturate();

        (texel.diffuse.xyz() * self.light.diffuse() * irradiance)
            .extend(texel.diffuse.w)
    }

    /// Returns how much of the light reaches given point, taking into account
    /// both opaque occluders and the volume itself.
    ///
    /// The volume's shadow is a refinement of the occluders' one, so neither
    /// applies with shadows disabled.
    pub fn shadow(&self, pos: Vec3) -> f32 {
        if !self.dispatch.has_shadow() {
            return 1.0;
        }

        let terms = LightSpace::new(self.light_camera, self.light).terms(pos);
        let shadows = ShadowResolver::new(self.dispatch, &self.esm, &self.bsm);
        let mut shadow = shadows.esm(terms);

        if self.dispatch.has_bsm() {
            shadow *= beer_lambert(shadows.bsm(terms).optical_depth);
        }

        shadow
    }
}

/// Lambertian fall-off, remapped so that surfaces facing away from the
/// light aren't pitch black.
pub fn half_lambert(cos_theta: f32) -> f32 {
    (0.5 * cos_theta + 0.5).sqr()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{vec3, vec4, Mat4, Vec2};

    use super::*;
    use crate::bsm_texel;

    struct Constant(Vec4);

    impl MapSampler for Constant {
        fn sample(&self, _: Vec2) -> Vec4 {
            self.0
        }
    }

    fn light() -> (DirectionalLight, CameraBuffer) {
        let light = DirectionalLight::new(
            Vec3::NEG_Y,
            vec3(1.0, 0.5, 0.25),
            Vec3::ZERO,
        );

        let camera = CameraBuffer::new(
            Mat4::look_at_lh(vec3(0.0, 5.0, 0.0), Vec3::ZERO, Vec3::Z),
            Mat4::orthographic_lh(-4.0, 4.0, -4.0, 4.0, 1.0, 9.0),
        );

        (light, camera)
    }

    #[test]
    fn half_lambert_range() {
        assert_eq!(1.0, half_lambert(1.0));
        assert_eq!(0.25, half_lambert(0.0));
        assert_eq!(0.0, half_lambert(-1.0));
    }

    #[test]
    fn unshadowed() {
        let (light, light_camera) = light();
        let dispatch = MarchVolumeDispatchInfo::default();

        let target = DeferredLight {
            light: &light,
            light_camera: &light_camera,
            dispatch: &dispatch,
            esm: Constant(Vec4::ZERO),
            bsm: Constant(Vec4::ZERO),
        };

        let actual = target.shade(GBufferTexel {
            diffuse: vec4(1.0, 1.0, 0.5, 0.75),
            normal: Vec3::Y,
            position: Vec3::ZERO,
        });

        assert_eq!(vec4(1.0, 0.5, 0.125, 0.75), actual);

        let actual = target.shade(GBufferTexel {
            diffuse: Vec4::ONE,
            normal: Vec3::X,
            position: Vec3::ZERO,
        });

        assert_eq!(vec4(0.25, 0.125, 0.0625, 1.0), actual);
    }

    #[test]
    fn shadowed() {
        let (light, light_camera) = light();

        let dispatch = MarchVolumeDispatchInfo {
            flags: MarchVolumeDispatchInfo::FLAG_SHADOW
                | MarchVolumeDispatchInfo::FLAG_BSM,
            esm_exponent: 100.0,
            esm_bias: 0.0,
            ..Default::default()
        };

        // Occluder far behind the point, volume of optical depth 2.0
        // spanning the whole way from the light's near plane
        let target = DeferredLight {
            light: &light,
            light_camera: &light_camera,
            dispatch: &dispatch,
            esm: Constant(Vec4::ONE),
            bsm: Constant(bsm_texel(0.0, 1.0, 2.0, 0.0)),
        };

        let actual = target.shadow(Vec3::ZERO);

        assert_relative_eq!(actual, (-2.0f32).exp(), epsilon = 0.0001);

        // Beer shadow map alone doesn't shadow anything
        let dispatch = MarchVolumeDispatchInfo {
            flags: MarchVolumeDispatchInfo::FLAG_BSM,
            ..dispatch
        };

        let target = DeferredLight {
            dispatch: &dispatch,
            ..target
        };

        assert_eq!(1.0, target.shadow(Vec3::ZERO));
    }
}
