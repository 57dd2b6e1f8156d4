use glam::{vec4, Vec4};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::BasicOptics;

/// Beer-Lambert's law: fraction of light which survives given optical depth.
pub fn beer_lambert(depth: f32) -> f32 {
    (-depth).exp()
}

/// Cheaper, rational fall-off with a similar shape to [`beer_lambert()`].
pub fn cheap_transmission(depth: f32) -> f32 {
    1.0 / (1.0 + depth.max(0.0))
}

/// Transmission laws selected by the medium's optics.
#[derive(Clone, Copy, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct Transmission {
    beer: bool,
    powder: bool,
    powder_coefficient: f32,
}

impl Transmission {
    pub fn new(optics: &BasicOptics) -> Self {
        Self {
            beer: optics.applies_beer(),
            powder: optics.applies_powder(),
            powder_coefficient: optics.powder_coefficient,
        }
    }

    /// Transmission along paths which don't receive the Beer-Powder
    /// correction: the light path and the background.
    pub fn scattered(&self, depth: f32) -> f32 {
        if self.beer {
            beer_lambert(depth)
        } else {
            cheap_transmission(depth)
        }
    }

    /// Transmission along the view path.
    pub fn direct(&self, depth: f32) -> f32 {
        let transmission = self.scattered(depth);

        if self.powder {
            transmission - self.scattered(self.powder_coefficient * depth)
        } else {
            transmission
        }
    }

    pub fn scattered4(&self, depth: Vec4) -> Vec4 {
        vec4(
            self.scattered(depth.x),
            self.scattered(depth.y),
            self.scattered(depth.z),
            self.scattered(depth.w),
        )
    }

    pub fn direct4(&self, depth: Vec4) -> Vec4 {
        vec4(
            self.direct(depth.x),
            self.direct(depth.y),
            self.direct(depth.z),
            self.direct(depth.w),
        )
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn beer_lambert_limits() {
        assert_eq!(1.0, beer_lambert(0.0));
        assert_eq!(1.0, cheap_transmission(0.0));
        assert!(beer_lambert(100.0) < 0.0001);
        assert!(cheap_transmission(100000.0) < 0.0001);
        assert_eq!(0.0, beer_lambert(f32::INFINITY));
        assert_eq!(0.0, cheap_transmission(f32::INFINITY));
    }

    #[test]
    fn beer_lambert_is_monotonic() {
        let mut prev = (beer_lambert(0.0), cheap_transmission(0.0));

        for i in 1..200 {
            let depth = 0.05 * (i as f32);
            let curr = (beer_lambert(depth), cheap_transmission(depth));

            assert!(curr.0 < prev.0, "depth={}", depth);
            assert!(curr.1 < prev.1, "depth={}", depth);

            prev = curr;
        }
    }

    #[test]
    fn powder() {
        let optics = BasicOptics {
            powder_coefficient: 2.0,
            flags: BasicOptics::FLAG_APPLY_BEER
                | BasicOptics::FLAG_APPLY_POWDER,
            ..Default::default()
        };

        let target = Transmission::new(&optics);

        assert_eq!(0.0, target.direct(0.0));
        assert_eq!(1.0, target.scattered(0.0));

        assert_relative_eq!(
            target.direct(0.5),
            (-0.5f32).exp() - (-1.0f32).exp(),
            epsilon = 0.0001
        );

        assert_relative_eq!(
            target.scattered(0.5),
            (-0.5f32).exp(),
            epsilon = 0.0001
        );
    }

    #[test]
    fn cheap() {
        let target = Transmission::new(&BasicOptics::default());

        assert_eq!(0.5, target.direct(1.0));
        assert_eq!(0.5, target.scattered(1.0));
        assert_eq!(Vec4::splat(0.5), target.direct4(Vec4::ONE));
    }
}
