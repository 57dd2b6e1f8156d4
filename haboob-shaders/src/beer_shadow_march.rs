use haboob_gpu::prelude::*;

#[spirv(compute(threads(16, 16)))]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(descriptor_set = 0, binding = 0, uniform)]
    light_camera: &CameraBuffer,
    #[spirv(descriptor_set = 0, binding = 1, uniform)]
    dispatch: &MarchVolumeDispatchInfo,
    #[spirv(descriptor_set = 0, binding = 2, uniform)] optics: &BasicOptics,
    #[spirv(descriptor_set = 1, binding = 0)] volume_tex: VolumeTex,
    #[spirv(descriptor_set = 1, binding = 1)] volume_sampler: &Sampler,
    #[spirv(descriptor_set = 1, binding = 2)] rays: TexRgba32,
    #[spirv(descriptor_set = 1, binding = 3)] output: TexRgba32,
) {
    let screen_pos = global_id.xy();

    if !dispatch.contains_march(screen_pos) {
        return;
    }

    let marcher = BeerShadowMarcher {
        light_camera,
        dispatch,
        optics,
        volume: SampledVolume::new(volume_tex, volume_sampler),
    };

    let texel = marcher.march(RayParams::fetch(&rays, screen_pos, dispatch));

    unsafe {
        output.write(screen_pos, texel);
    }
}
