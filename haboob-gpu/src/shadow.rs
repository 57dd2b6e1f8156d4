use glam::{vec4, Vec2, Vec3, Vec3Swizzles, Vec4, Vec4Swizzles};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{
    CameraBuffer, DirectionalLight, F32Ext, MapSampler, MarchVolumeDispatchInfo,
    HABOOB_EPSILON,
};

/// Position of a point as seen by the light.
///
/// x - shadow map's u
/// y - shadow map's v
/// z - depth (in light's clip space)
/// w - distance from the light's near plane, along the light's direction
///
/// Since the light is directional (i.e. its projection is orthographic), all
/// four terms are linear along any world-space ray - so they can be computed
/// at the ray's ends and interpolated in-between.
#[derive(Clone, Copy, Default, PartialEq)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct ShadowTerms(pub Vec4);

impl ShadowTerms {
    pub fn uv(&self) -> Vec2 {
        self.0.xy()
    }

    pub fn depth(&self) -> f32 {
        self.0.z
    }

    pub fn linear_z(&self) -> f32 {
        self.0.w
    }

    /// Returns whether the point is covered by the light's shadow maps.
    pub fn is_inside(&self) -> bool {
        let pos = self.0.xyz();

        pos.cmpge(Vec3::ZERO).all() && pos.cmple(Vec3::ONE).all()
    }
}

/// Light's point of view.
#[derive(Clone, Copy)]
pub struct LightSpace<'a> {
    camera: &'a CameraBuffer,
    origin: Vec3,
    direction: Vec3,
}

impl<'a> LightSpace<'a> {
    pub fn new(camera: &'a CameraBuffer, light: &DirectionalLight) -> Self {
        Self {
            camera,
            origin: camera.origin(),
            direction: light.direction(),
        }
    }

    pub fn terms(&self, pos: Vec3) -> ShadowTerms {
        let ndc = self.camera.world_to_ndc(pos);
        let uv = CameraBuffer::ndc_to_uv(ndc.xy());
        let linear_z = (pos - self.origin).dot(self.direction);

        ShadowTerms(vec4(uv.x, uv.y, ndc.z, linear_z))
    }

    /// Computes shadow terms at both ends of a segment and returns a function
    /// of the distance travelled from `start` towards `end`.
    pub fn span(&self, start: Vec3, end: Vec3) -> ShadowSpan {
        let length = start.distance(end);
        let start = self.terms(start);
        let end = self.terms(end);

        ShadowSpan {
            start,
            delta: (end.0 - start.0) * length.safe_recip(),
        }
    }
}

/// Shadow terms linearized along a ray.
#[derive(Clone, Copy, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct ShadowSpan {
    start: ShadowTerms,
    delta: Vec4,
}

impl ShadowSpan {
    pub fn at(&self, travel_distance: f32) -> ShadowTerms {
        ShadowTerms(self.start.0 + self.delta * travel_distance)
    }
}

/// Optical depth and angstrom exponent accumulated between a point and the
/// light, as read from the Beer shadow map.
#[derive(Clone, Copy, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct BsmCoefficients {
    pub optical_depth: f32,
    pub angstrom: f32,
}

pub struct ShadowResolver<'a, E, B> {
    dispatch: &'a MarchVolumeDispatchInfo,
    esm: E,
    bsm: B,
}

impl<'a, E, B> ShadowResolver<'a, E, B>
where
    E: MapSampler,
    B: MapSampler,
{
    pub fn new(dispatch: &'a MarchVolumeDispatchInfo, esm: E, bsm: B) -> Self {
        Self { dispatch, esm, bsm }
    }

    /// Returns the exponential shadow map's visibility of the point, from
    /// 0.0 (shadowed) to 1.0 (lit).
    pub fn esm(&self, terms: ShadowTerms) -> f32 {
        if !self.dispatch.has_shadow() || !terms.is_inside() {
            return 1.0;
        }

        let stored_depth = self.esm.sample(terms.uv()).x;

        exponential_shadow(
            stored_depth,
            terms.depth(),
            self.dispatch.esm_exponent,
            self.dispatch.esm_bias,
        )
    }

    /// Returns how much of the volume the light has to pass through before
    /// reaching the point.
    pub fn bsm(&self, terms: ShadowTerms) -> BsmCoefficients {
        if !terms.is_inside() {
            return Default::default();
        }

        let texel = self.bsm.sample(terms.uv());
        let mut fraction = ((terms.linear_z() - texel.x)
            / texel.y.max(HABOOB_EPSILON))
        .saturate();

        if self.dispatch.has_bsm_improve() {
            fraction = fraction.smoothstep();
        }

        BsmCoefficients {
            optical_depth: fraction * texel.z,
            angstrom: fraction * texel.w,
        }
    }
}

pub fn exponential_shadow(
    stored_depth: f32,
    depth: f32,
    exponent: f32,
    bias: f32,
) -> f32 {
    (exponent * (stored_depth - depth + bias)).exp().saturate()
}

/// Texel of the Beer shadow map for a light ray which misses the volume.
pub fn bsm_masked_texel() -> Vec4 {
    vec4(0.0, 1.0, 0.0, 0.0)
}

/// Builds a Beer shadow map's texel from its terms.
pub fn bsm_texel(
    min_z: f32,
    z_range: f32,
    optical_depth: f32,
    angstrom: f32,
) -> Vec4 {
    vec4(min_z, z_range, optical_depth, angstrom)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{vec3, Mat4};

    use super::*;

    struct Constant(Vec4);

    impl MapSampler for Constant {
        fn sample(&self, _: Vec2) -> Vec4 {
            self.0
        }
    }

    fn light() -> (CameraBuffer, DirectionalLight) {
        let light = DirectionalLight::new(
            vec3(0.0, -1.0, -1.0),
            Vec3::ONE,
            Vec3::ZERO,
        );

        let position = vec3(0.0, 5.0, 5.0);

        let camera = CameraBuffer::new(
            Mat4::look_at_lh(
                position,
                position + light.direction(),
                Vec3::Y,
            ),
            Mat4::orthographic_lh(-4.0, 4.0, -4.0, 4.0, 0.01, 15.0),
        );

        (camera, light)
    }

    #[test]
    fn near_plane_center() {
        let (camera, light) = light();
        let target = LightSpace::new(&camera, &light);
        let terms = target.terms(camera.origin());

        assert_relative_eq!(terms.uv().x, 0.5, epsilon = 0.0001);
        assert_relative_eq!(terms.uv().y, 0.5, epsilon = 0.0001);
        assert_relative_eq!(terms.depth(), 0.0, epsilon = 0.0001);
        assert_relative_eq!(terms.linear_z(), 0.0, epsilon = 0.0001);
    }

    #[test]
    fn linear_z() {
        let (camera, light) = light();
        let target = LightSpace::new(&camera, &light);
        let pos = camera.origin() + light.direction() * 3.0;
        let terms = target.terms(pos);

        assert_relative_eq!(terms.linear_z(), 3.0, epsilon = 0.0001);
        assert_relative_eq!(terms.depth(), 3.0 / 14.99, epsilon = 0.0001);
    }

    #[test]
    fn uv_round_trip() {
        let (camera, light) = light();
        let target = LightSpace::new(&camera, &light);

        for pos in [
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, -2.0, 0.5),
            vec3(-3.0, 1.0, 2.0),
        ] {
            let ndc = camera.world_to_ndc(pos);
            let uv = target.terms(pos).uv();
            let actual = CameraBuffer::uv_to_ndc(uv);

            assert_relative_eq!(actual.x, ndc.x, epsilon = 0.0001);
            assert_relative_eq!(actual.y, ndc.y, epsilon = 0.0001);
        }
    }

    #[test]
    fn span() {
        let (camera, light) = light();
        let target = LightSpace::new(&camera, &light);
        let start = vec3(-1.0, 0.0, 0.0);
        let end = vec3(1.0, 1.0, 2.0);
        let span = target.span(start, end);
        let mid = span.at(start.distance(end) * 0.5);
        let expected = target.terms((start + end) * 0.5);

        for i in 0..4 {
            assert_relative_eq!(mid.0[i], expected.0[i], epsilon = 0.0001);
        }
    }

    #[test]
    fn esm() {
        let dispatch = MarchVolumeDispatchInfo {
            flags: MarchVolumeDispatchInfo::FLAG_SHADOW,
            esm_exponent: 100.0,
            esm_bias: 0.05,
            ..Default::default()
        };

        let target = ShadowResolver::new(
            &dispatch,
            Constant(Vec4::splat(0.5)),
            Constant(Vec4::ZERO),
        );

        // In front of the occluder
        assert_eq!(1.0, target.esm(ShadowTerms(vec4(0.5, 0.5, 0.3, 0.0))));

        // Way behind the occluder
        assert!(target.esm(ShadowTerms(vec4(0.5, 0.5, 0.9, 0.0))) < 0.0001);

        // Outside of the shadow map
        assert_eq!(1.0, target.esm(ShadowTerms(vec4(1.5, 0.5, 0.9, 0.0))));
        assert_eq!(1.0, target.esm(ShadowTerms(vec4(0.5, 0.5, -0.1, 0.0))));

        let dispatch = MarchVolumeDispatchInfo {
            flags: 0,
            ..dispatch
        };

        let target = ShadowResolver::new(
            &dispatch,
            Constant(Vec4::splat(0.5)),
            Constant(Vec4::ZERO),
        );

        assert_eq!(1.0, target.esm(ShadowTerms(vec4(0.5, 0.5, 0.9, 0.0))));
    }

    #[test]
    fn bsm() {
        let dispatch = MarchVolumeDispatchInfo::default();

        let target = ShadowResolver::new(
            &dispatch,
            Constant(Vec4::ZERO),
            Constant(bsm_texel(2.0, 4.0, 8.0, 1.0)),
        );

        let actual = target.bsm(ShadowTerms(vec4(0.5, 0.5, 0.5, 3.0)));

        assert_relative_eq!(actual.optical_depth, 2.0);
        assert_relative_eq!(actual.angstrom, 0.25);

        let actual = target.bsm(ShadowTerms(vec4(0.5, 0.5, 0.5, 1.0)));

        assert_eq!(0.0, actual.optical_depth);

        let actual = target.bsm(ShadowTerms(vec4(0.5, 0.5, 0.5, 10.0)));

        assert_eq!(8.0, actual.optical_depth);
        assert_eq!(1.0, actual.angstrom);
    }

    #[test]
    fn bsm_degenerate_range() {
        let dispatch = MarchVolumeDispatchInfo {
            flags: MarchVolumeDispatchInfo::FLAG_BSM_IMPROVE,
            ..Default::default()
        };

        let target = ShadowResolver::new(
            &dispatch,
            Constant(Vec4::ZERO),
            Constant(bsm_texel(2.0, 0.0, 8.0, 1.0)),
        );

        let actual = target.bsm(ShadowTerms(vec4(0.5, 0.5, 0.5, 2.5)));

        assert!(actual.optical_depth.is_finite());
        assert_eq!(8.0, actual.optical_depth);
    }
}
