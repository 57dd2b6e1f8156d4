use std::f32::consts::PI;

use glam::{vec2, Mat4, UVec2, Vec2, Vec3};

use crate::{ensure_positive, gpu, Error, Result};

/// Eye camera the volume is looked at through.
#[derive(Clone, Debug)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,

    /// Vertical field of view, in radians
    pub fov_y: f32,

    /// Width divided by height
    pub aspect_ratio: f32,

    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: PI / 4.0,
            aspect_ratio: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl PerspectiveCamera {
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_target(mut self, target: Vec3) -> Self {
        self.target = target;
        self
    }

    pub fn with_fov_y(mut self, fov_y: f32) -> Self {
        self.fov_y = fov_y;
        self
    }

    /// Sets the aspect ratio to match given output size.
    pub fn with_viewport(mut self, size: UVec2) -> Self {
        self.aspect_ratio = size.x as f32 / size.y.max(1) as f32;
        self
    }

    pub fn with_depth_range(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn build(&self) -> Result<gpu::CameraBuffer> {
        if !(self.fov_y > 0.0 && self.fov_y < PI) {
            return Err(Error::InvalidFov(self.fov_y));
        }

        ensure_positive("aspect ratio", self.aspect_ratio)?;
        validate_depth_range(self.near, self.far)?;

        let forward = (self.target - self.position)
            .try_normalize()
            .ok_or(Error::ZeroDirection)?;

        let up = orthogonal_up(forward, self.up);

        log::debug!(
            "Building perspective camera; position={:?}, forward={:?}",
            self.position,
            forward,
        );

        Ok(gpu::CameraBuffer::new(
            Mat4::look_at_lh(self.position, self.position + forward, up),
            Mat4::perspective_lh(
                self.fov_y,
                self.aspect_ratio,
                self.near,
                self.far,
            ),
        ))
    }

    /// Returns the radius of a pixel's footprint at the near plane and its
    /// growth per unit of distance; see: [`crate::ConeTracing`].
    pub fn pixel_footprint(&self, output_height: u32) -> Vec2 {
        let delta = (0.5 * self.fov_y).tan() / output_height.max(1) as f32;

        vec2(self.near * delta, delta)
    }
}

/// Orthographic camera rendering the light's shadow maps.
///
/// Its view spans `far * width / height` by `far * height / width` world
/// units, so that square shadow maps cover a square of the scene as deep as
/// the camera reaches.
#[derive(Clone, Debug)]
pub struct LightCamera {
    /// Direction the light travels in
    pub direction: Vec3,

    pub position: Vec3,

    /// Size of the shadow maps (in texels)
    pub map_size: UVec2,

    pub near: f32,
    pub far: f32,
}

impl Default for LightCamera {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.0, -1.0, -1.0),
            position: Vec3::new(0.0, 0.0, -1.0),
            map_size: UVec2::splat(1024),
            near: 0.01,
            far: 15.0,
        }
    }
}

impl LightCamera {
    pub fn with_direction(mut self, direction: Vec3) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_map_size(mut self, map_size: UVec2) -> Self {
        self.map_size = map_size;
        self
    }

    pub fn with_depth_range(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Returns the world-space size of the camera's view.
    pub fn extent(&self) -> Vec2 {
        let width = self.map_size.x as f32;
        let height = self.map_size.y as f32;

        vec2(self.far * width / height, self.far * height / width)
    }

    pub fn build(&self) -> Result<gpu::CameraBuffer> {
        if self.map_size.x == 0 || self.map_size.y == 0 {
            return Err(Error::EmptySize { name: "shadow map" });
        }

        validate_depth_range(self.near, self.far)?;

        let forward =
            self.direction.try_normalize().ok_or(Error::ZeroDirection)?;

        let up = orthogonal_up(forward, Vec3::Y);
        let half = 0.5 * self.extent();

        log::debug!(
            "Building light camera; position={:?}, forward={:?}, extent={:?}",
            self.position,
            forward,
            2.0 * half,
        );

        Ok(gpu::CameraBuffer::new(
            Mat4::look_at_lh(self.position, self.position + forward, up),
            Mat4::orthographic_lh(
                -half.x, half.x, -half.y, half.y, self.near, self.far,
            ),
        ))
    }

    /// Builds the light itself, shining along this camera.
    pub fn light(
        &self,
        diffuse: Vec3,
        ambient: Vec3,
    ) -> Result<gpu::DirectionalLight> {
        let direction =
            self.direction.try_normalize().ok_or(Error::ZeroDirection)?;

        Ok(gpu::DirectionalLight::new(direction, diffuse, ambient))
    }
}

fn validate_depth_range(near: f32, far: f32) -> Result<()> {
    if near > 0.0 && far > near && far.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidDepthRange { near, far })
    }
}

/// Returns `bias` made orthogonal to `forward`; when they are (nearly)
/// parallel, Z is used as the bias instead.
fn orthogonal_up(forward: Vec3, bias: Vec3) -> Vec3 {
    let right = forward.cross(bias);

    let right = if right.length_squared() > 0.000001 {
        right
    } else {
        forward.cross(Vec3::Z)
    };

    right.cross(forward).normalize()
}
