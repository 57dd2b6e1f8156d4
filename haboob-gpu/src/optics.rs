use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use crate::{henyey_greenstein4, ISOTROPIC_PHASE};

/// Physical properties of the medium.
///
/// Vectors are laid out per integration bucket (see:
/// [`crate::DirectionalLight::diffuse_buckets()`]).
#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct BasicOptics {
    /// Henyey-Greenstein anisotropy of the forward-scattering lobe
    pub anisotropic_forward: Vec4,

    /// Henyey-Greenstein anisotropy of the backward-scattering lobe
    pub anisotropic_backward: Vec4,

    /// Blend between the forward (0.0) and backward (1.0) lobe
    pub phase_blend: Vec4,

    pub scatter_angstrom_exponent: f32,
    pub absorption_angstrom_exponent: f32,

    /// Scales optical depth
    pub attenuation_factor: f32,

    /// Scales optical depth of the Beer-Powder term
    pub powder_coefficient: f32,

    /// Fraction of the light's ambient color which reaches the medium
    pub ambient_fraction: f32,

    /// Wavelength (in nanometers) at which angstrom exponents are neutral
    pub reference_wavelength: f32,

    /// See: `Self::FLAG_*`
    pub flags: u32,

    pub _padding: u32,

    /// Column `k` contains wavelengths (in nanometers) sampled for the
    /// `k`-th bucket
    pub spectral_wavelengths: Mat4,

    /// Column `k` contains weights of wavelengths sampled for the `k`-th
    /// bucket
    pub spectral_weights: Mat4,

    /// Converts integrated buckets into linear RGB
    pub spectral_to_rgb: Mat4,
}

impl BasicOptics {
    /// Use Beer-Lambert's law instead of the cheaper `1 / (1 + d)`.
    pub const FLAG_APPLY_BEER: u32 = 1 << 0;

    /// Apply the Beer-Powder approximation to the view path.
    pub const FLAG_APPLY_POWDER: u32 = 1 << 1;

    /// Use the Henyey-Greenstein phase function instead of the isotropic one.
    pub const FLAG_APPLY_HG: u32 = 1 << 2;

    /// Integrate transmission across several wavelengths per bucket.
    pub const FLAG_APPLY_SPECTRAL: u32 = 1 << 3;

    pub fn has(&self, flag: u32) -> bool {
        self.flags & flag == flag
    }

    pub fn applies_beer(&self) -> bool {
        self.has(Self::FLAG_APPLY_BEER)
    }

    pub fn applies_powder(&self) -> bool {
        self.has(Self::FLAG_APPLY_POWDER)
    }

    pub fn applies_hg(&self) -> bool {
        self.has(Self::FLAG_APPLY_HG)
    }

    pub fn applies_spectral(&self) -> bool {
        self.has(Self::FLAG_APPLY_SPECTRAL)
    }

    /// Returns the per-bucket phase for given cosine of the scattering angle.
    pub fn phase(&self, cos_theta: f32) -> Vec4 {
        if self.applies_hg() {
            let forward =
                henyey_greenstein4(cos_theta, self.anisotropic_forward);

            let backward =
                henyey_greenstein4(cos_theta, self.anisotropic_backward);

            forward + (backward - forward) * self.phase_blend
        } else {
            Vec4::splat(ISOTROPIC_PHASE)
        }
    }

    /// Returns per-bucket ambient irradiance reaching the medium.
    pub fn ambient(&self, diffuse: Vec4, ambient: Vec4) -> Vec4 {
        diffuse * ambient * self.ambient_fraction
    }

    /// Returns per-bucket light scattered towards the viewer.
    pub fn incoming(&self, diffuse: Vec4, cos_theta: f32) -> Vec4 {
        self.phase(cos_theta) * diffuse
    }
}
