use glam::{Mat4, UVec2, UVec3, Vec3};

use crate::gpu::{DebugView, MarchVolumeDispatchInfo};
use crate::{
    ensure_non_negative, ensure_positive, Error, PerspectiveCamera, Result,
};

/// Where the volume sits in the world and how many texels it has.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeGeometry {
    /// Maps world-coordinates into the volume's local unit cube
    world_to_local: Mat4,

    size: UVec3,
}

impl VolumeGeometry {
    /// Creates a volume filling given axis-aligned box.
    pub fn from_bounds(min: Vec3, max: Vec3, size: UVec3) -> Result<Self> {
        let extent = max - min;

        if !extent.is_finite() || extent.cmple(Vec3::ZERO).any() {
            return Err(Error::SingularTransform);
        }

        let world_to_local = Mat4::from_scale(extent.recip())
            * Mat4::from_translation(-0.5 * (min + max));

        Self::from_world_to_local(world_to_local, size)
    }

    /// Creates a volume whose unit cube (centered around zero) gets placed
    /// in the world by given transform.
    pub fn from_local_to_world(
        local_to_world: Mat4,
        size: UVec3,
    ) -> Result<Self> {
        ensure_invertible(local_to_world)?;

        Self::from_world_to_local(local_to_world.inverse(), size)
    }

    pub fn from_world_to_local(
        world_to_local: Mat4,
        size: UVec3,
    ) -> Result<Self> {
        ensure_invertible(world_to_local)?;

        if size.cmpeq(UVec3::ZERO).any() {
            return Err(Error::EmptySize { name: "volume" });
        }

        Ok(Self {
            world_to_local,
            size,
        })
    }

    pub fn world_to_local(&self) -> Mat4 {
        self.world_to_local
    }

    pub fn size(&self) -> UVec3 {
        self.size
    }

    /// Returns how many of the volume's texels fit in a single world unit
    /// along its local X axis.
    pub fn texels_per_unit(&self) -> f32 {
        self.size.x as f32 * self.world_to_local.row(0).truncate().length()
    }
}

fn ensure_invertible(transform: Mat4) -> Result<()> {
    let det = transform.determinant();

    if det.is_finite() && det.abs() > f32::EPSILON {
        Ok(())
    } else {
        Err(Error::SingularTransform)
    }
}

/// How samples get spread along rays.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Stepping {
    /// Iterations get spread evenly across each ray's segment.
    #[default]
    Auto,

    /// Rays skip `initial_step` and then advance by `step` per iteration,
    /// regardless of the segment's length.
    Manual { initial_step: f32, step: f32 },
}

/// Parameters of cone tracing, i.e. of picking coarser density mips as
/// pixels' footprints widen with distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConeTracing {
    pub pixel_radius: f32,
    pub pixel_radius_delta: f32,

    /// See: [`MarchVolumeDispatchInfo::texel_density`]
    pub texel_density: f32,
}

impl ConeTracing {
    /// Derives cone parameters from the camera rays get cast from.
    pub fn from_camera(
        camera: &PerspectiveCamera,
        output_size: UVec2,
        geometry: &VolumeGeometry,
    ) -> Self {
        let footprint = camera.pixel_footprint(output_size.y);

        Self {
            pixel_radius: footprint.x,
            pixel_radius_delta: footprint.y,
            texel_density: geometry.texels_per_unit()
                * geometry.size().x as f32,
        }
    }
}

/// How light-path optical depth is estimated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BeerShadowMode {
    /// Light travels through a constant, pessimistic optical depth.
    Disabled,

    /// Light-path optical depth is read from the Beer shadow map.
    Enabled,

    /// Like [`Self::Enabled`], with the depth fraction smoothed to hide
    /// banding.
    #[default]
    Smoothed,
}

/// Exponential shadow map's comparison parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EsmParams {
    pub exponent: f32,
    pub bias: f32,
}

impl Default for EsmParams {
    fn default() -> Self {
        Self {
            exponent: 100.0,
            bias: 0.05,
        }
    }
}

/// Configuration of a single march dispatch.
#[derive(Clone, Debug)]
pub struct MarchConfig {
    geometry: VolumeGeometry,
    output_size: UVec2,
    iterations: u32,
    stepping: Stepping,
    cone_tracing: Option<ConeTracing>,
    beer_shadow: BeerShadowMode,
    shadow: Option<EsmParams>,
    upscale: bool,
    debug_view: DebugView,
}

impl MarchConfig {
    pub const DEFAULT_ITERATIONS: u32 = 10;

    /// Creates a configuration marching given volume into an output texture
    /// of given size; ray-parameter textures and the lit buffer must have
    /// the same size.
    pub fn new(geometry: VolumeGeometry, output_size: UVec2) -> Self {
        Self {
            geometry,
            output_size,
            iterations: Self::DEFAULT_ITERATIONS,
            stepping: Default::default(),
            cone_tracing: None,
            beer_shadow: Default::default(),
            shadow: Some(Default::default()),
            upscale: false,
            debug_view: DebugView::None,
        }
    }

    pub fn with_output_size(mut self, output_size: UVec2) -> Self {
        self.output_size = output_size;
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_stepping(mut self, stepping: Stepping) -> Self {
        self.stepping = stepping;
        self
    }

    pub fn with_cone_tracing(mut self, cone_tracing: ConeTracing) -> Self {
        self.cone_tracing = Some(cone_tracing);
        self
    }

    pub fn without_cone_tracing(mut self) -> Self {
        self.cone_tracing = None;
        self
    }

    pub fn with_beer_shadow(mut self, mode: BeerShadowMode) -> Self {
        self.beer_shadow = mode;
        self
    }

    pub fn with_shadow(mut self, shadow: EsmParams) -> Self {
        self.shadow = Some(shadow);
        self
    }

    pub fn without_shadow(mut self) -> Self {
        self.shadow = None;
        self
    }

    /// Marches at half the resolution of the output, averaging 2x2 blocks of
    /// rays.
    pub fn with_upscale(mut self, upscale: bool) -> Self {
        self.upscale = upscale;
        self
    }

    pub fn with_debug_view(mut self, debug_view: DebugView) -> Self {
        self.debug_view = debug_view;
        self
    }

    pub fn geometry(&self) -> &VolumeGeometry {
        &self.geometry
    }

    pub fn output_size(&self) -> UVec2 {
        self.output_size
    }

    pub fn build(&self) -> Result<MarchVolumeDispatchInfo> {
        if self.iterations == 0 || self.iterations % 2 != 0 {
            return Err(Error::InvalidIterations(self.iterations));
        }

        if self.output_size.cmpeq(UVec2::ZERO).any() {
            return Err(Error::EmptySize { name: "output" });
        }

        let mut flags = 0;

        let (initial_z_step, march_z_step) = match self.stepping {
            Stepping::Auto => (0.0, 0.0),

            Stepping::Manual { initial_step, step } => {
                flags |= MarchVolumeDispatchInfo::FLAG_MANUAL_MARCH;

                (
                    ensure_non_negative("initial step", initial_step)?,
                    ensure_positive("march step", step)?,
                )
            }
        };

        let cone = if let Some(cone) = self.cone_tracing {
            flags |= MarchVolumeDispatchInfo::FLAG_CONE_TRACE;

            ensure_non_negative("pixel radius", cone.pixel_radius)?;
            ensure_non_negative("pixel radius delta", cone.pixel_radius_delta)?;
            ensure_positive("texel density", cone.texel_density)?;

            cone
        } else {
            ConeTracing {
                pixel_radius: 0.0,
                pixel_radius_delta: 0.0,
                texel_density: 0.0,
            }
        };

        match self.beer_shadow {
            BeerShadowMode::Disabled => {}
            BeerShadowMode::Enabled => {
                flags |= MarchVolumeDispatchInfo::FLAG_BSM;
            }
            BeerShadowMode::Smoothed => {
                flags |= MarchVolumeDispatchInfo::FLAG_BSM
                    | MarchVolumeDispatchInfo::FLAG_BSM_IMPROVE;
            }
        }

        let esm = if let Some(esm) = self.shadow {
            flags |= MarchVolumeDispatchInfo::FLAG_SHADOW;

            ensure_positive("esm exponent", esm.exponent)?;

            if !esm.bias.is_finite() {
                return Err(Error::NonFinite { name: "esm bias" });
            }

            esm
        } else {
            EsmParams {
                exponent: 0.0,
                bias: 0.0,
            }
        };

        if self.upscale {
            flags |= MarchVolumeDispatchInfo::FLAG_UPSCALE;
        }

        if self.debug_view != DebugView::None {
            log::warn!(
                "March is configured with a debug view; view={:?}",
                self.debug_view
            );
        }

        if self.iterations > 512 {
            log::warn!(
                "March is configured with a lot of iterations; iterations={}",
                self.iterations
            );
        }

        log::debug!(
            "Building march dispatch; output_size={:?}, iterations={}, \
             flags={:#b}",
            self.output_size,
            self.iterations,
            flags,
        );

        Ok(MarchVolumeDispatchInfo {
            volume_transform: self.geometry.world_to_local,
            volume_size: self.geometry.size.as_vec3().extend(0.0),
            output_horizontal_step: 1.0 / self.output_size.x as f32,
            output_vertical_step: 1.0 / self.output_size.y as f32,
            initial_z_step,
            march_z_step,
            iterations: self.iterations,
            flags,
            debug_view: self.debug_view.to_u32(),
            texel_density: cone.texel_density,
            pixel_radius: cone.pixel_radius,
            pixel_radius_delta: cone.pixel_radius_delta,
            esm_exponent: esm.exponent,
            esm_bias: esm.bias,
            output_size: self.output_size,
            _padding: Default::default(),
        })
    }
}
