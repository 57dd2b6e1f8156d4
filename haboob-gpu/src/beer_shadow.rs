use glam::Vec4;

use crate::{
    bsm_masked_texel, bsm_texel, BasicOptics, CameraBuffer, DebugView,
    DensityField, Integrator, MarchParams, MarchVolumeDispatchInfo, RayParams,
    RaySegment, VolumeSampler,
};

/// Output of light rays which miss the volume, when visualizing the mask.
pub const BSM_MASKED_DEBUG_OUTPUT: Vec4 = Vec4::new(0.0, 0.0, 100.0, 1.0);

/// Renders the Beer shadow map: for each light ray, how deep (starting from
/// the light's near plane) the ray enters the volume, how long it stays
/// inside and how much optical depth it accumulates in the meantime.
///
/// Light rays are marched twice as densely as view rays, since each texel of
/// the map gets reused by many samples along many view rays.
pub struct BeerShadowMarcher<'a, V> {
    pub light_camera: &'a CameraBuffer,
    pub dispatch: &'a MarchVolumeDispatchInfo,
    pub optics: &'a BasicOptics,
    pub volume: V,
}

impl<'a, V> BeerShadowMarcher<'a, V>
where
    V: VolumeSampler,
{
    /// Returns the map's texel; see: [`crate::bsm_texel()`].
    pub fn march(&self, params: RayParams) -> Vec4 {
        if params.is_masked() {
            return self.masked();
        }

        let segment = match RaySegment::unproject(self.light_camera, params) {
            Some(segment) => segment,
            None => return self.masked(),
        };

        let near_plane = self
            .light_camera
            .ndc_to_world(params.ndc().extend(0.0));

        let params = MarchParams::new(
            self.dispatch,
            2 * self.dispatch.iterations,
            segment.length,
        );

        let density = DensityField::new(self.dispatch, &self.volume);
        let mut ray = segment.ray;
        let mut absorption = Integrator::default();
        let mut angstrom = Integrator::default();
        let mut iteration = 0;

        ray.march(params.initial_step);

        loop {
            let sample = density.sample(&ray);

            absorption.append(sample.density);
            angstrom.append(sample.angstrom);

            if iteration >= params.iterations {
                break;
            }

            ray.march(params.step);
            iteration += 1;
        }

        let span = params.span();

        bsm_texel(
            segment.start.distance(near_plane),
            segment.length,
            self.optics.attenuation_factor * absorption.integrate(span),
            self.optics.scatter_angstrom_exponent * angstrom.integrate(span),
        )
    }

    fn masked(&self) -> Vec4 {
        if self.dispatch.debug_view() == DebugView::Mask {
            BSM_MASKED_DEBUG_OUTPUT
        } else {
            bsm_masked_texel()
        }
    }
}
