//! CPU reference backend: runs the very same kernels the shaders do, one
//! invocation per texel, rows in parallel.

use glam::{uvec2, UVec2, Vec4};
use rayon::prelude::*;

use crate::gpu::{
    self, BeerShadowMarcher, DeferredLight, GBufferTexel, MarchComposite,
    RayParams, VolumeMarcher,
};
use crate::{Result, Texture2d, Volume3d};

/// Runs given kernel once per texel of a fresh texture.
pub fn dispatch_2d(
    label: &str,
    size: UVec2,
    kernel: impl Fn(UVec2) -> Vec4 + Sync,
) -> Result<Texture2d> {
    let mut output = Texture2d::new(label, size)?;

    log::debug!("Dispatching `{label}`; size={:?}", size);

    output
        .texels_mut()
        .par_chunks_mut(size.x as usize)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, texel) in row.iter_mut().enumerate() {
                *texel = kernel(uvec2(x as u32, y as u32));
            }
        });

    Ok(output)
}

/// Runs given kernel once per texel of an existing texture, replacing each
/// texel with what the kernel returns for it.
pub fn dispatch_2d_in_place(
    texture: &mut Texture2d,
    kernel: impl Fn(UVec2, Vec4) -> Vec4 + Sync,
) {
    let size = texture.size();

    log::debug!(
        "Dispatching `{}` in place; size={:?}",
        texture.label(),
        size
    );

    texture
        .texels_mut()
        .par_chunks_mut(size.x as usize)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, texel) in row.iter_mut().enumerate() {
                *texel = kernel(uvec2(x as u32, y as u32), *texel);
            }
        });
}

/// Parameters and resources shared by the volume passes.
#[derive(Clone, Copy)]
pub struct MarchInputs<'a> {
    pub camera: &'a gpu::CameraBuffer,
    pub light_camera: &'a gpu::CameraBuffer,
    pub light: &'a gpu::DirectionalLight,
    pub dispatch: &'a gpu::MarchVolumeDispatchInfo,
    pub optics: &'a gpu::BasicOptics,
    pub volume: &'a Volume3d,
}

/// Deferred renderer's G-buffer; all channels are in world-space.
#[derive(Clone, Copy)]
pub struct GBuffer<'a> {
    pub diffuse: &'a Texture2d,
    pub normal: &'a Texture2d,
    pub position: &'a Texture2d,
}

/// Marches the volume as seen by the camera; see: [`gpu::VolumeMarcher`].
///
/// Returns texture of the dispatch's output size, with each texel containing
/// scattered light (rgb) and transmittance (alpha); when upscaling, the
/// march lands in the texture's top-left quarter.
pub fn march_volume(
    inputs: &MarchInputs,
    rays: &Texture2d,
    esm: &Texture2d,
    bsm: &Texture2d,
) -> Result<Texture2d> {
    let dispatch = inputs.dispatch;

    rays.expect_size("rays", dispatch.output_size)?;

    let marcher = VolumeMarcher {
        camera: inputs.camera,
        light_camera: inputs.light_camera,
        light: inputs.light,
        dispatch,
        optics: inputs.optics,
        volume: inputs.volume,
        esm,
        bsm,
    };

    dispatch_2d("march_volume", dispatch.output_size, |pos| {
        if dispatch.contains_march(pos) {
            marcher.march(RayParams::fetch(rays, pos, dispatch))
        } else {
            gpu::MASKED_OUTPUT
        }
    })
}

/// Renders the Beer shadow map; see: [`gpu::BeerShadowMarcher`].
///
/// `rays` are the volume's ray parameters as seen by the light camera and
/// `dispatch` describes the shadow map (rather than the eye's output).
pub fn march_beer_shadow(
    inputs: &MarchInputs,
    rays: &Texture2d,
) -> Result<Texture2d> {
    let dispatch = inputs.dispatch;

    rays.expect_size("light rays", dispatch.output_size)?;

    let marcher = BeerShadowMarcher {
        light_camera: inputs.light_camera,
        dispatch,
        optics: inputs.optics,
        volume: inputs.volume,
    };

    dispatch_2d("beer_shadow_march", dispatch.output_size, |pos| {
        if dispatch.contains_march(pos) {
            marcher.march(RayParams::fetch(rays, pos, dispatch))
        } else {
            gpu::bsm_masked_texel()
        }
    })
}

/// Lights the G-buffer; see: [`gpu::DeferredLight`].
pub fn light_deferred(
    inputs: &MarchInputs,
    gbuffer: GBuffer,
    esm: &Texture2d,
    bsm: &Texture2d,
) -> Result<Texture2d> {
    let dispatch = inputs.dispatch;

    gbuffer.diffuse.expect_size("diffuse", dispatch.output_size)?;
    gbuffer.normal.expect_size("normal", dispatch.output_size)?;
    gbuffer.position.expect_size("position", dispatch.output_size)?;

    let pass = DeferredLight {
        light: inputs.light,
        light_camera: inputs.light_camera,
        dispatch,
        esm,
        bsm,
    };

    dispatch_2d("deferred_light", dispatch.output_size, |pos| {
        pass.shade(GBufferTexel::new(
            gbuffer.diffuse.get(pos),
            gbuffer.normal.get(pos),
            gbuffer.position.get(pos),
        ))
    })
}

/// Lays the marched volume over the lit buffer; see:
/// [`gpu::MarchComposite`].
pub fn composite_march(
    dispatch: &gpu::MarchVolumeDispatchInfo,
    overlay: &Texture2d,
    lit: &mut Texture2d,
) -> Result<()> {
    lit.expect_size("lit", dispatch.output_size)?;

    let pass = MarchComposite { dispatch, overlay };

    dispatch_2d_in_place(lit, |pos, texel| pass.blend(pos, texel));

    Ok(())
}
