use glam::{vec4, Vec4, Vec4Swizzles};

use crate::{
    spectral_to_rgb, transmit, BasicOptics, CameraBuffer, DebugView,
    DensityField, DirectionalLight, Integrator, Integrator4, LightSpace,
    MapSampler, MarchParams, MarchVolumeDispatchInfo, OpticalPath,
    RayParams, RaySegment, ShadowResolver, Transmission, VolumeSampler,
};

/// Output of rays which miss the volume: no light, fully transparent.
pub const MASKED_OUTPUT: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

/// Output of rays which miss the volume, when visualizing the mask.
pub const MASKED_DEBUG_OUTPUT: Vec4 = Vec4::new(100.0, 100.0, 100.0, 1.0);

/// Marches rays through the volume, integrating light scattered towards the
/// viewer and the volume's transmittance.
pub struct VolumeMarcher<'a, V, E, B> {
    pub camera: &'a CameraBuffer,
    pub light_camera: &'a CameraBuffer,
    pub light: &'a DirectionalLight,
    pub dispatch: &'a MarchVolumeDispatchInfo,
    pub optics: &'a BasicOptics,

    /// Density field; see: [`crate::DensitySample`]
    pub volume: V,

    /// Exponential shadow map, rendered from the light camera
    pub esm: E,

    /// Beer shadow map, rendered by [`crate::BeerShadowMarcher`]
    pub bsm: B,
}

impl<'a, V, E, B> VolumeMarcher<'a, V, E, B>
where
    V: VolumeSampler,
    E: MapSampler,
    B: MapSampler,
{
    /// Returns the integrated irradiance (rgb) and the background's
    /// transmittance (alpha).
    pub fn march(&self, params: RayParams) -> Vec4 {
        if params.is_masked() {
            return self.masked();
        }

        let segment = match RaySegment::unproject(self.camera, params) {
            Some(segment) => segment,
            None => return self.masked(),
        };

        let params = MarchParams::new(
            self.dispatch,
            self.dispatch.iterations,
            segment.length,
        );

        let density = DensityField::new(self.dispatch, &self.volume);
        let shadows = ShadowResolver::new(self.dispatch, &self.esm, &self.bsm);

        let shadow_span = LightSpace::new(self.light_camera, self.light)
            .span(segment.start, segment.end);

        let transmission = Transmission::new(self.optics);
        let mut ray = segment.ray;

        ray.march(params.initial_step);

        // Light is directional, so the phase is constant along the ray
        let cos_theta = ray.direction().dot(-self.light.direction());
        let diffuse = self.light.diffuse_buckets();
        let incoming = self.optics.incoming(diffuse, cos_theta);

        let ambient = self
            .optics
            .ambient(diffuse, self.light.ambient_buckets());

        let mut absorption = Integrator::default();
        let mut angstrom = Integrator::default();
        let mut irradiance = Integrator4::default();
        let mut iteration = 0;

        loop {
            let sample = density.sample(&ray);

            absorption.append(sample.density);
            angstrom.append(sample.angstrom);

            let terms = shadow_span.at(ray.travel_distance());

            let view_depth = self.optics.attenuation_factor
                * absorption.partial(params.step);

            let view_angstrom = self.optics.absorption_angstrom_exponent
                * angstrom.partial(params.step);

            let (light_depth, light_angstrom) = if self.dispatch.has_bsm() {
                let bsm = shadows.bsm(terms);

                (bsm.optical_depth, bsm.angstrom)
            } else {
                (
                    self.optics.attenuation_factor * core::f32::consts::E,
                    self.optics.scatter_angstrom_exponent
                        * core::f32::consts::E,
                )
            };

            let direct = ambient + incoming * shadows.esm(terms);

            irradiance.append(transmit(
                self.optics,
                &transmission,
                direct,
                OpticalPath {
                    view_depth,
                    view_angstrom,
                    light_depth,
                    light_angstrom,
                },
            ));

            if iteration >= params.iterations {
                break;
            }

            ray.march(params.step);
            iteration += 1;
        }

        let span = params.span();
        let optical_depth =
            self.optics.attenuation_factor * absorption.integrate(span);

        match self.dispatch.debug_view() {
            DebugView::Density => {
                return vec4(optical_depth, 0.0, 0.0, 1.0);
            }

            DebugView::Angstrom => {
                return vec4(
                    self.optics.absorption_angstrom_exponent
                        * angstrom.integrate(span),
                    0.0,
                    0.0,
                    1.0,
                );
            }

            DebugView::SampleLevel => {
                return vec4(
                    density.sample_level(params.initial_step),
                    density.sample_level(ray.travel_distance()),
                    0.0,
                    1.0,
                ) / 8.0;
            }

            DebugView::RayTravel => {
                return vec4(ray.travel_distance(), 1.0, 1.0, 1.0);
            }

            DebugView::None | DebugView::Mask => {}
        }

        // Background transmittance is the same for all wavelengths
        let background = transmission.scattered(optical_depth);

        spectral_to_rgb(self.optics, irradiance.integrate(span))
            .xyz()
            .extend(background)
    }

    fn masked(&self) -> Vec4 {
        if self.dispatch.debug_view() == DebugView::Mask {
            MASKED_DEBUG_OUTPUT
        } else {
            MASKED_OUTPUT
        }
    }
}
