use glam::{vec4, Vec4, Vec4Swizzles};

use crate::{BasicOptics, Transmission, Vec4Ext};

/// Optical depths and angstrom exponents accumulated along both paths which
/// light takes to reach the viewer.
#[derive(Clone, Copy, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct OpticalPath {
    /// Optical depth between the viewer and the sample
    pub view_depth: f32,

    /// Angstrom exponent between the viewer and the sample
    pub view_angstrom: f32,

    /// Optical depth between the sample and the light
    pub light_depth: f32,

    /// Angstrom exponent between the sample and the light
    pub light_angstrom: f32,
}

/// Returns the angstrom scaling of optical depth for given wavelengths, i.e.
/// `(wavelength / reference) ^ -angstrom`.
pub fn spectral_scatter(
    wavelengths: Vec4,
    reference_wavelength: f32,
    angstrom: f32,
) -> Vec4 {
    (wavelengths / reference_wavelength).powf_each(Vec4::splat(-angstrom))
}

/// Computes how much of given per-bucket irradiance survives travelling
/// through the path.
///
/// With spectral integration enabled, each bucket's transmission is a
/// weighted sum of transmissions of the bucket's wavelengths; otherwise the
/// transmission is the same for all buckets.
pub fn transmit(
    optics: &BasicOptics,
    transmission: &Transmission,
    irradiance: Vec4,
    path: OpticalPath,
) -> Vec4 {
    if !optics.applies_spectral() {
        return irradiance
            * transmission.direct(path.view_depth)
            * transmission.scattered(path.light_depth);
    }

    irradiance
        * vec4(
            transmit_bucket(optics, transmission, path, 0),
            transmit_bucket(optics, transmission, path, 1),
            transmit_bucket(optics, transmission, path, 2),
            transmit_bucket(optics, transmission, path, 3),
        )
}

fn transmit_bucket(
    optics: &BasicOptics,
    transmission: &Transmission,
    path: OpticalPath,
    bucket: usize,
) -> f32 {
    let wavelengths = optics.spectral_wavelengths.col(bucket);

    let view = transmission.direct4(
        path.view_depth
            * spectral_scatter(
                wavelengths,
                optics.reference_wavelength,
                path.view_angstrom,
            ),
    );

    let light = transmission.scattered4(
        path.light_depth
            * spectral_scatter(
                wavelengths,
                optics.reference_wavelength,
                path.light_angstrom,
            ),
    );

    (view * light).dot(optics.spectral_weights.col(bucket))
}

/// Converts integrated buckets into linear RGB.
pub fn spectral_to_rgb(optics: &BasicOptics, buckets: Vec4) -> Vec4 {
    if optics.applies_spectral() {
        (optics.spectral_to_rgb * buckets).xyz().extend(0.0)
    } else {
        buckets.xyz().extend(0.0)
    }
}
