use haboob_gpu::prelude::*;

#[spirv(compute(threads(16, 16)))]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(descriptor_set = 0, binding = 0, uniform)] camera: &CameraBuffer,
    #[spirv(descriptor_set = 0, binding = 1, uniform)]
    light_camera: &CameraBuffer,
    #[spirv(descriptor_set = 0, binding = 2, uniform)]
    light: &DirectionalLight,
    #[spirv(descriptor_set = 0, binding = 3, uniform)]
    dispatch: &MarchVolumeDispatchInfo,
    #[spirv(descriptor_set = 0, binding = 4, uniform)] optics: &BasicOptics,
    #[spirv(descriptor_set = 1, binding = 0)] volume_tex: VolumeTex,
    #[spirv(descriptor_set = 1, binding = 1)] volume_sampler: &Sampler,
    #[spirv(descriptor_set = 1, binding = 2)] esm_tex: Tex,
    #[spirv(descriptor_set = 1, binding = 3)] bsm_tex: Tex,
    #[spirv(descriptor_set = 1, binding = 4)] shadow_sampler: &Sampler,
    #[spirv(descriptor_set = 1, binding = 5)] rays: TexRgba32,
    #[spirv(descriptor_set = 1, binding = 6)] output: TexRgba32,
) {
    let screen_pos = global_id.xy();

    if !dispatch.contains_march(screen_pos) {
        return;
    }

    let marcher = VolumeMarcher {
        camera,
        light_camera,
        light,
        dispatch,
        optics,
        volume: SampledVolume::new(volume_tex, volume_sampler),
        esm: SampledMap::new(esm_tex, shadow_sampler),
        bsm: SampledMap::new(bsm_tex, shadow_sampler),
    };

    let color = marcher.march(RayParams::fetch(&rays, screen_pos, dispatch));

    unsafe {
        output.write(screen_pos, color);
    }
}
