use haboob_gpu::prelude::*;

#[spirv(compute(threads(8, 8)))]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(descriptor_set = 0, binding = 0, uniform)]
    light: &DirectionalLight,
    #[spirv(descriptor_set = 0, binding = 1, uniform)]
    light_camera: &CameraBuffer,
    #[spirv(descriptor_set = 0, binding = 2, uniform)]
    dispatch: &MarchVolumeDispatchInfo,
    #[spirv(descriptor_set = 1, binding = 0)] diffuse_tex: TexRgba32,
    #[spirv(descriptor_set = 1, binding = 1)] normal_tex: TexRgba32,
    #[spirv(descriptor_set = 1, binding = 2)] world_tex: TexRgba32,
    #[spirv(descriptor_set = 1, binding = 3)] esm_tex: Tex,
    #[spirv(descriptor_set = 1, binding = 4)] bsm_tex: Tex,
    #[spirv(descriptor_set = 1, binding = 5)] shadow_sampler: &Sampler,
    #[spirv(descriptor_set = 1, binding = 6)] output: TexRgba32,
) {
    let screen_pos = global_id.xy();

    if !dispatch.contains(screen_pos) {
        return;
    }

    let texel = GBufferTexel::new(
        diffuse_tex.read(screen_pos),
        normal_tex.read(screen_pos),
        world_tex.read(screen_pos),
    );

    let pass = DeferredLight {
        light,
        light_camera,
        dispatch,
        esm: SampledMap::new(esm_tex, shadow_sampler),
        bsm: SampledMap::new(bsm_tex, shadow_sampler),
    };

    unsafe {
        output.write(screen_pos, pass.shade(texel));
    }
}
