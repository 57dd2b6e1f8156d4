use glam::{vec4, Mat3, Mat4, Vec4};

use crate::gpu::Integrator;
use crate::{Error, Result};

/// One lobe of an analytic, multi-lobe fit of the CIE 1931 colour matching
/// functions, evaluated over wavelengths normalized by 800 nm.
#[derive(Clone, Copy, Debug)]
struct CieLobe {
    scale: f32,
    exponent_scale: f32,
    wavelength_scale: f32,
    wavelength_offset: f32,

    /// Whether the lobe is a Gaussian in log-wavelength (skewed) rather than
    /// in wavelength
    skewed: bool,
}

impl CieLobe {
    const RED_MINOR: Self = Self::skewed(0.398, 35.35534, 0.78895, 0.56223);
    const RED_MAJOR: Self = Self::skewed(1.132, 15.29706, -1.07599, 1.7996);
    const GREEN: Self = Self {
        scale: 1.011,
        exponent_scale: 1.0,
        wavelength_scale: 12.2602,
        wavelength_offset: -8.52237,
        skewed: false,
    };
    const BLUE: Self = Self::skewed(2.06, 5.65685, 4.43459, -1.47339);

    const fn skewed(
        scale: f32,
        exponent_scale: f32,
        wavelength_scale: f32,
        wavelength_offset: f32,
    ) -> Self {
        Self {
            scale,
            exponent_scale,
            wavelength_scale,
            wavelength_offset,
            skewed: true,
        }
    }

    fn eval(&self, wavelength: f32) -> f32 {
        let x = self.wavelength_scale * wavelength / 800.0
            + self.wavelength_offset;

        let x = if self.skewed {
            if x <= 0.0 {
                return 0.0;
            }

            x.ln()
        } else {
            x
        };

        self.scale * (-(self.exponent_scale * x).powi(2)).exp()
    }
}

/// CIE 1931 `x̄` at given wavelength (in nanometers).
pub fn cie_x(wavelength: f32) -> f32 {
    CieLobe::RED_MINOR.eval(wavelength) + CieLobe::RED_MAJOR.eval(wavelength)
}

/// CIE 1931 `ȳ` at given wavelength (in nanometers).
pub fn cie_y(wavelength: f32) -> f32 {
    CieLobe::GREEN.eval(wavelength)
}

/// CIE 1931 `z̄` at given wavelength (in nanometers).
pub fn cie_z(wavelength: f32) -> f32 {
    CieLobe::BLUE.eval(wavelength)
}

/// Returns `∫ȳ` over the visible spectrum; normalizes spectral weights so
/// that a flat, unit spectrum has unit luminance.
pub fn cie_y_integral() -> f32 {
    const MIN: u32 = 360;
    const MAX: u32 = 830;

    let mut integrator = Integrator::default();

    for wavelength in MIN..=MAX {
        integrator.append(cie_y(wavelength as f32));
    }

    integrator.integrate((MAX - MIN) as f32)
}

/// Range of wavelengths (in nanometers) covered by a single bucket.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WavelengthRange {
    pub min: f32,
    pub max: f32,
}

impl WavelengthRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Returns four wavelengths spread evenly across the range, each in the
    /// middle of its quarter.
    pub fn samples(&self) -> Vec4 {
        let step = self.step();

        Vec4::new(0.5, 1.5, 2.5, 3.5) * step + Vec4::splat(self.min)
    }

    /// Returns the width of a quarter of the range.
    pub fn step(&self) -> f32 {
        0.25 * (self.max - self.min)
    }
}

/// Wavelengths integrated by each of the four buckets.
///
/// Buckets are laid out as `(X1, Y, Z, X2)`, where X1 and X2 are the minor
/// (blue) and major (red) lobes of CIE's X function.
#[derive(Clone, Debug, PartialEq)]
pub struct SpectralConfig {
    pub x_minor: WavelengthRange,
    pub y: WavelengthRange,
    pub z: WavelengthRange,
    pub x_major: WavelengthRange,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            x_minor: WavelengthRange::new(385.0, 505.0),
            y: WavelengthRange::new(430.0, 690.0),
            z: WavelengthRange::new(380.0, 510.0),
            x_major: WavelengthRange::new(500.0, 690.0),
        }
    }
}

/// Matrices consumed by [`crate::gpu::transmit()`] and
/// [`crate::gpu::spectral_to_rgb()`].
#[derive(Clone, Copy, Debug)]
pub struct SpectralMatrices {
    pub wavelengths: Mat4,
    pub weights: Mat4,
    pub to_rgb: Mat4,
}

impl SpectralConfig {
    pub fn build(&self) -> Result<SpectralMatrices> {
        let buckets = [self.x_minor, self.y, self.z, self.x_major];

        for range in &buckets {
            if !(range.min > 0.0 && range.max > range.min) {
                return Err(Error::InvalidWavelengthRange {
                    min: range.min,
                    max: range.max,
                });
            }
        }

        let lobes: [fn(f32) -> f32; 4] = [
            |w| CieLobe::RED_MINOR.eval(w),
            cie_y,
            cie_z,
            |w| CieLobe::RED_MAJOR.eval(w),
        ];

        let norm = cie_y_integral();
        let mut wavelengths = [Vec4::ZERO; 4];
        let mut weights = [Vec4::ZERO; 4];

        for (bucket, (range, lobe)) in buckets.iter().zip(lobes).enumerate() {
            let samples = range.samples();
            let step = range.step();

            wavelengths[bucket] = samples;

            weights[bucket] = vec4(
                lobe(samples.x),
                lobe(samples.y),
                lobe(samples.z),
                lobe(samples.w),
            ) * step
                / norm;
        }

        log::debug!(
            "Building spectral matrices; wavelengths={:?}, weights={:?}",
            wavelengths,
            weights,
        );

        Ok(SpectralMatrices {
            wavelengths: Mat4::from_cols(
                wavelengths[0],
                wavelengths[1],
                wavelengths[2],
                wavelengths[3],
            ),
            weights: Mat4::from_cols(
                weights[0], weights[1], weights[2], weights[3],
            ),
            to_rgb: buckets_to_rgb(),
        })
    }
}

/// Returns a matrix which folds both lobes of X back together and converts
/// CIE XYZ into linear sRGB (D65).
pub fn buckets_to_rgb() -> Mat4 {
    let xyz_to_rgb = Mat3::from_cols_array(&[
        3.2406, -0.9689, 0.0557, //
        -1.5372, 1.8758, -0.2040, //
        -0.4986, 0.0415, 1.0570,
    ]);

    Mat4::from_cols(
        xyz_to_rgb.x_axis.extend(0.0),
        xyz_to_rgb.y_axis.extend(0.0),
        xyz_to_rgb.z_axis.extend(0.0),
        xyz_to_rgb.x_axis.extend(0.0),
    )
}
