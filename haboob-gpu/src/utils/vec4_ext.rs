use glam::{vec4, Vec4};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

/// Component-wise transcendental functions, which `glam` doesn't provide for
/// every target we compile to.
pub trait Vec4Ext
where
    Self: Sized,
{
    fn powf_each(self, exponent: Self) -> Self;
}

impl Vec4Ext for Vec4 {
    fn powf_each(self, exponent: Self) -> Self {
        vec4(
            self.x.powf(exponent.x),
            self.y.powf(exponent.y),
            self.z.powf(exponent.z),
            self.w.powf(exponent.w),
        )
    }
}
