use glam::{ivec2, IVec2, UVec2, Vec2, Vec4};

use crate::gpu::{lerp, MapSampler, TexelReader};
use crate::{Error, Result};

/// CPU counterpart of a 2D `rgba32f` texture.
///
/// Reads outside of the texture are clamped to its edge, same as with the
/// samplers the kernels get bound on the GPU.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture2d {
    label: String,
    size: UVec2,
    texels: Vec<Vec4>,
}

impl Texture2d {
    pub fn new(label: impl AsRef<str>, size: UVec2) -> Result<Self> {
        Self::filled(label, size, Vec4::ZERO)
    }

    pub fn filled(
        label: impl AsRef<str>,
        size: UVec2,
        value: Vec4,
    ) -> Result<Self> {
        let label = label.as_ref();

        if size.x == 0 || size.y == 0 {
            return Err(Error::EmptySize { name: "texture" });
        }

        log::debug!("Allocating texture `{label}`; size={:?}", size);

        Ok(Self {
            label: label.to_owned(),
            size,
            texels: vec![value; (size.x * size.y) as usize],
        })
    }

    /// Creates a texture out of texels laid out row by row.
    pub fn from_texels(
        label: impl AsRef<str>,
        size: UVec2,
        texels: Vec<Vec4>,
    ) -> Result<Self> {
        let label = label.as_ref();
        let expected = (size.x * size.y) as usize;

        if expected == 0 {
            return Err(Error::EmptySize { name: "texture" });
        }

        if texels.len() != expected {
            return Err(Error::TexelCount {
                name: label.to_owned(),
                expected,
                actual: texels.len(),
            });
        }

        log::debug!("Allocating texture `{label}`; size={:?}", size);

        Ok(Self {
            label: label.to_owned(),
            size,
            texels,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn get(&self, pos: UVec2) -> Vec4 {
        self.texel(pos.as_ivec2())
    }

    pub fn set(&mut self, pos: UVec2, value: Vec4) {
        if pos.x < self.size.x && pos.y < self.size.y {
            self.texels[(pos.y * self.size.x + pos.x) as usize] = value;
        }
    }

    pub fn texels(&self) -> &[Vec4] {
        &self.texels
    }

    pub fn texels_mut(&mut self) -> &mut [Vec4] {
        &mut self.texels
    }

    /// Returns texels ready to be uploaded into an `rgba32f` texture.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    /// Ensures the texture has given size.
    pub fn expect_size(
        &self,
        name: &'static str,
        expected: UVec2,
    ) -> Result<()> {
        if self.size == expected {
            Ok(())
        } else {
            Err(Error::SizeMismatch {
                name,
                expected,
                actual: self.size,
            })
        }
    }

    fn texel(&self, pos: IVec2) -> Vec4 {
        let pos = pos.clamp(IVec2::ZERO, self.size.as_ivec2() - 1);

        self.texels[(pos.y as u32 * self.size.x + pos.x as u32) as usize]
    }
}

impl TexelReader for Texture2d {
    fn fetch(&self, pos: UVec2) -> Vec4 {
        self.get(pos)
    }
}

/// Bilinear filtering, with texel centers at `(i + 0.5) / size`.
impl MapSampler for Texture2d {
    fn sample(&self, uv: Vec2) -> Vec4 {
        let pos = uv * self.size.as_vec2() - 0.5;
        let base = pos.floor();
        let t = pos - base;
        let base = base.as_ivec2();

        let top = lerp(
            self.texel(base),
            self.texel(base + ivec2(1, 0)),
            t.x,
        );

        let bottom = lerp(
            self.texel(base + ivec2(0, 1)),
            self.texel(base + ivec2(1, 1)),
            t.x,
        );

        lerp(top, bottom, t.y)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec2, vec4};

    use super::*;

    fn texture() -> Texture2d {
        Texture2d::from_texels(
            "test",
            uvec2(2, 2),
            vec![
                Vec4::splat(0.0),
                Vec4::splat(1.0),
                Vec4::splat(2.0),
                Vec4::splat(3.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn get_set() {
        let mut target = Texture2d::new("test", uvec2(3, 2)).unwrap();

        target.set(uvec2(2, 1), vec4(1.0, 2.0, 3.0, 4.0));
        target.set(uvec2(5, 5), Vec4::ONE);

        assert_eq!(vec4(1.0, 2.0, 3.0, 4.0), target.get(uvec2(2, 1)));
        assert_eq!(vec4(1.0, 2.0, 3.0, 4.0), target.get(uvec2(7, 9)));
        assert_eq!(Vec4::ZERO, target.fetch(uvec2(0, 0)));
        assert_eq!(6 * 16, target.as_bytes().len());
    }

    #[test]
    fn bilinear() {
        let target = texture();

        assert_eq!(Vec4::splat(0.0), target.sample(vec2(0.25, 0.25)));
        assert_eq!(Vec4::splat(3.0), target.sample(vec2(0.75, 0.75)));
        assert_eq!(Vec4::splat(1.5), target.sample(vec2(0.5, 0.5)));

        let actual = target.sample(vec2(0.5, 0.25));

        assert_relative_eq!(actual.x, 0.5);
    }

    #[test]
    fn clamp_to_edge() {
        let target = texture();

        assert_eq!(Vec4::splat(0.0), target.sample(vec2(-1.0, -1.0)));
        assert_eq!(Vec4::splat(3.0), target.sample(vec2(2.0, 2.0)));
        assert_eq!(Vec4::splat(1.0), target.sample(vec2(5.0, 0.0)));
    }

    #[test]
    fn invalid() {
        assert_eq!(
            Error::EmptySize { name: "texture" },
            Texture2d::new("test", uvec2(0, 4)).unwrap_err(),
        );

        assert_eq!(
            Error::TexelCount {
                name: "test".into(),
                expected: 4,
                actual: 1,
            },
            Texture2d::from_texels("test", uvec2(2, 2), vec![Vec4::ZERO])
                .unwrap_err(),
        );

        assert_eq!(
            Error::SizeMismatch {
                name: "rays",
                expected: uvec2(4, 4),
                actual: uvec2(2, 2),
            },
            texture().expect_size("rays", uvec2(4, 4)).unwrap_err(),
        );
    }
}
