#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

pub trait F32Ext
where
    Self: Sized,
{
    fn sqr(self) -> Self;
    fn saturate(self) -> Self;
    fn smoothstep(self) -> Self;
    fn safe_recip(self) -> Self;
}

impl F32Ext for f32 {
    fn sqr(self) -> Self {
        self * self
    }

    fn saturate(self) -> Self {
        self.clamp(0.0, 1.0)
    }

    /// Hermite interpolation of `self` (saturated) between 0.0 and 1.0.
    fn smoothstep(self) -> Self {
        let t = self.saturate();

        t * t * (3.0 - 2.0 * t)
    }

    fn safe_recip(self) -> Self {
        1.0 / self.max(crate::HABOOB_EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothstep() {
        assert_eq!(0.0, (-1.0f32).smoothstep());
        assert_eq!(0.0, 0.0f32.smoothstep());
        assert_eq!(0.5, 0.5f32.smoothstep());
        assert_eq!(1.0, 1.0f32.smoothstep());
        assert_eq!(1.0, 2.0f32.smoothstep());
        assert!(0.25f32.smoothstep() < 0.25);
        assert!(0.75f32.smoothstep() > 0.75);
    }
}
