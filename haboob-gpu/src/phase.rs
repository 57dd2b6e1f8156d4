use core::f32::consts::PI;

use glam::{vec4, Vec4};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

/// Phase of a medium which scatters light equally in all directions.
pub const ISOTROPIC_PHASE: f32 = 1.0 / (4.0 * PI);

/// Henyey-Greenstein phase function.
///
/// `cos_theta` is the cosine of the angle between the view direction and
/// the direction towards the light; `g` is the anisotropy, from `-1.0`
/// (back-scattering) through `0.0` (isotropic) up to `1.0`
/// (forward-scattering).
pub fn henyey_greenstein(cos_theta: f32, g: f32) -> f32 {
    let g2 = g * g;
    let denom = 1.0 + g2 - 2.0 * g * cos_theta;

    (1.0 - g2) / (4.0 * PI * denom.max(0.0).powf(1.5))
}

pub fn henyey_greenstein4(cos_theta: f32, g: Vec4) -> Vec4 {
    vec4(
        henyey_greenstein(cos_theta, g.x),
        henyey_greenstein(cos_theta, g.y),
        henyey_greenstein(cos_theta, g.z),
        henyey_greenstein(cos_theta, g.w),
    )
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::Integrator;

    /// Integrates the phase function over the unit sphere.
    fn sphere_integral(g: f32) -> f32 {
        let n = 4096;
        let mut target = Integrator::default();

        for i in 0..=n {
            let cos_theta = -1.0 + 2.0 * (i as f32) / (n as f32);

            target.append(henyey_greenstein(cos_theta, g));
        }

        2.0 * PI * target.integrate(2.0)
    }

    #[test]
    fn isotropic() {
        assert_relative_eq!(henyey_greenstein(0.7, 0.0), ISOTROPIC_PHASE);
        assert_relative_eq!(henyey_greenstein(-0.2, 0.0), ISOTROPIC_PHASE);
    }

    #[test]
    fn normalization() {
        let mut rng = StdRng::seed_from_u64(1234);

        for _ in 0..32 {
            let g = rng.gen_range(-0.8..0.8);

            assert_relative_eq!(sphere_integral(g), 1.0, epsilon = 0.001);
        }
    }

    #[test]
    fn anisotropy() {
        assert!(henyey_greenstein(1.0, 0.6) > henyey_greenstein(-1.0, 0.6));
        assert!(henyey_greenstein(1.0, -0.6) < henyey_greenstein(-1.0, -0.6));

        let actual = henyey_greenstein4(0.5, vec4(0.0, 0.2, -0.2, 0.9));

        assert_eq!(henyey_greenstein(0.5, 0.2), actual.y);
        assert_eq!(henyey_greenstein(0.5, 0.9), actual.w);
    }
}
