use glam::{Mat4, Vec3, Vec3Swizzles};

use crate::gpu::BasicOptics;
use crate::{
    ensure_non_negative, ensure_positive, Error, Result, SpectralConfig,
};

/// Physical properties of the dust.
///
/// Per-channel terms are given in RGB and get spread across the integration
/// buckets when building; see: [`crate::gpu::BasicOptics`].
#[derive(Clone, Debug)]
pub struct OpticsConfig {
    /// Henyey-Greenstein anisotropy of the forward lobe, per channel
    pub anisotropic_forward: Vec3,

    /// Henyey-Greenstein anisotropy of the backward lobe, per channel
    pub anisotropic_backward: Vec3,

    /// Blend between the forward (0.0) and backward (1.0) lobe, per channel
    pub phase_blend: Vec3,

    pub scatter_angstrom_exponent: f32,
    pub absorption_angstrom_exponent: f32,
    pub attenuation_factor: f32,
    pub powder_coefficient: f32,
    pub ambient_fraction: f32,

    /// Wavelength (in nanometers) at which angstrom exponents are neutral
    pub reference_wavelength: f32,

    pub beer: bool,
    pub powder: bool,
    pub henyey_greenstein: bool,

    /// Integrates several wavelengths per bucket when present
    pub spectral: Option<SpectralConfig>,
}

impl Default for OpticsConfig {
    fn default() -> Self {
        Self {
            anisotropic_forward: Vec3::new(0.6, 0.55, 0.5),
            anisotropic_backward: Vec3::splat(-0.3),
            phase_blend: Vec3::splat(0.2),
            scatter_angstrom_exponent: 0.5,
            absorption_angstrom_exponent: 1.0,
            attenuation_factor: 1.0,
            powder_coefficient: 2.0,
            ambient_fraction: 0.25,
            reference_wavelength: 550.0,
            beer: true,
            powder: false,
            henyey_greenstein: true,
            spectral: Some(Default::default()),
        }
    }
}

impl OpticsConfig {
    pub fn with_attenuation(mut self, attenuation_factor: f32) -> Self {
        self.attenuation_factor = attenuation_factor;
        self
    }

    pub fn with_powder(mut self, coefficient: f32) -> Self {
        self.powder = true;
        self.powder_coefficient = coefficient;
        self
    }

    pub fn with_spectral(mut self, spectral: SpectralConfig) -> Self {
        self.spectral = Some(spectral);
        self
    }

    pub fn without_spectral(mut self) -> Self {
        self.spectral = None;
        self
    }

    /// Uses the isotropic phase function instead of Henyey-Greenstein's.
    pub fn isotropic(mut self) -> Self {
        self.henyey_greenstein = false;
        self
    }

    pub fn build(&self) -> Result<BasicOptics> {
        for g in [self.anisotropic_forward, self.anisotropic_backward] {
            for g in g.to_array() {
                if !(g > -1.0 && g < 1.0) {
                    return Err(Error::InvalidAnisotropy(g));
                }
            }
        }

        for blend in self.phase_blend.to_array() {
            if !(0.0..=1.0).contains(&blend) {
                return Err(Error::InvalidPhaseBlend(blend));
            }
        }

        ensure_positive("reference wavelength", self.reference_wavelength)?;
        ensure_non_negative("attenuation factor", self.attenuation_factor)?;
        ensure_non_negative("powder coefficient", self.powder_coefficient)?;
        ensure_non_negative("ambient fraction", self.ambient_fraction)?;

        for (name, value) in [
            ("scatter angstrom exponent", self.scatter_angstrom_exponent),
            (
                "absorption angstrom exponent",
                self.absorption_angstrom_exponent,
            ),
        ] {
            if !value.is_finite() {
                return Err(Error::NonFinite { name });
            }
        }

        let mut flags = 0;

        if self.beer {
            flags |= BasicOptics::FLAG_APPLY_BEER;
        }

        if self.powder {
            flags |= BasicOptics::FLAG_APPLY_POWDER;
        }

        if self.henyey_greenstein {
            flags |= BasicOptics::FLAG_APPLY_HG;
        }

        let (wavelengths, weights, to_rgb) = match &self.spectral {
            Some(spectral) => {
                flags |= BasicOptics::FLAG_APPLY_SPECTRAL;

                let matrices = spectral.build()?;

                (matrices.wavelengths, matrices.weights, matrices.to_rgb)
            }

            None => (Mat4::ZERO, Mat4::ZERO, Mat4::IDENTITY),
        };

        log::debug!(
            "Building optics; attenuation={}, angstrom=({}, {}), flags={:#b}",
            self.attenuation_factor,
            self.scatter_angstrom_exponent,
            self.absorption_angstrom_exponent,
            flags,
        );

        Ok(BasicOptics {
            anisotropic_forward: self.anisotropic_forward.xyzx(),
            anisotropic_backward: self.anisotropic_backward.xyzx(),
            phase_blend: self.phase_blend.xyzx(),
            scatter_angstrom_exponent: self.scatter_angstrom_exponent,
            absorption_angstrom_exponent: self.absorption_angstrom_exponent,
            attenuation_factor: self.attenuation_factor,
            powder_coefficient: self.powder_coefficient,
            ambient_fraction: self.ambient_fraction,
            reference_wavelength: self.reference_wavelength,
            flags,
            _padding: 0,
            spectral_wavelengths: wavelengths,
            spectral_weights: weights,
            spectral_to_rgb: to_rgb,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{vec3, vec4, Vec4, Vec4Swizzles};

    use super::*;
    use crate::gpu::{self, OpticalPath, Transmission};

    #[test]
    fn build() {
        let actual = OpticsConfig::default().build().unwrap();

        assert_eq!(vec4(0.6, 0.55, 0.5, 0.6), actual.anisotropic_forward);
        assert!(actual.applies_beer());
        assert!(!actual.applies_powder());
        assert!(actual.applies_hg());
        assert!(actual.applies_spectral());
        assert_eq!(550.0, actual.reference_wavelength);
    }

    #[test]
    fn build_plain() {
        let actual = OpticsConfig::default()
            .without_spectral()
            .isotropic()
            .with_powder(3.0)
            .build()
            .unwrap();

        assert!(!actual.applies_spectral());
        assert!(!actual.applies_hg());
        assert!(actual.applies_powder());
        assert_eq!(3.0, actual.powder_coefficient);
        assert_eq!(Vec4::splat(gpu::ISOTROPIC_PHASE), actual.phase(0.3));
    }

    #[test]
    fn invalid() {
        let config = OpticsConfig {
            anisotropic_backward: vec3(0.0, -1.0, 0.0),
            ..Default::default()
        };

        assert_eq!(Error::InvalidAnisotropy(-1.0), config.build().unwrap_err());

        let config = OpticsConfig {
            phase_blend: vec3(0.0, 0.5, 1.5),
            ..Default::default()
        };

        assert_eq!(Error::InvalidPhaseBlend(1.5), config.build().unwrap_err());

        assert_eq!(
            Error::Negative {
                name: "attenuation factor",
                value: -0.5
            },
            OpticsConfig::default()
                .with_attenuation(-0.5)
                .build()
                .unwrap_err(),
        );

        let config = OpticsConfig {
            reference_wavelength: 0.0,
            ..Default::default()
        };

        assert_eq!(
            Error::NonPositive {
                name: "reference wavelength",
                value: 0.0
            },
            config.build().unwrap_err(),
        );
    }

    #[test]
    fn spectral_transmission_of_clear_air() {
        let optics = OpticsConfig::default().build().unwrap();
        let transmission = Transmission::new(&optics);

        let buckets = gpu::transmit(
            &optics,
            &transmission,
            Vec4::ONE,
            OpticalPath::default(),
        );

        let rgb = gpu::spectral_to_rgb(&optics, buckets).xyz();

        assert_relative_eq!(rgb.x, 1.225, epsilon = 0.01);
        assert_relative_eq!(rgb.y, 0.939, epsilon = 0.01);
        assert_relative_eq!(rgb.z, 0.906, epsilon = 0.01);
    }

    #[test]
    fn spectral_reddening() {
        // Dust scatters short wavelengths more, so light travelling through
        // it gets redder
        let optics = OpticsConfig {
            scatter_angstrom_exponent: 1.5,
            ..Default::default()
        }
        .build()
        .unwrap();

        let transmission = Transmission::new(&optics);

        let buckets = gpu::transmit(
            &optics,
            &transmission,
            Vec4::ONE,
            OpticalPath {
                light_depth: 1.0,
                light_angstrom: 1.5,
                ..Default::default()
            },
        );

        let rgb = gpu::spectral_to_rgb(&optics, buckets).xyz();

        assert!(rgb.x / rgb.z > 1.225 / 0.906);
    }
}
