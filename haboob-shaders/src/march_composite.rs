use haboob_gpu::prelude::*;

#[spirv(compute(threads(8, 8)))]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(descriptor_set = 0, binding = 0, uniform)]
    dispatch: &MarchVolumeDispatchInfo,
    #[spirv(descriptor_set = 1, binding = 0)] overlay_tex: Tex,
    #[spirv(descriptor_set = 1, binding = 1)] overlay_sampler: &Sampler,
    #[spirv(descriptor_set = 1, binding = 2)] lit: TexRgba32,
) {
    let screen_pos = global_id.xy();

    if !dispatch.contains(screen_pos) {
        return;
    }

    let pass = MarchComposite {
        dispatch,
        overlay: SampledMap::new(overlay_tex, overlay_sampler),
    };

    let color = pass.blend(screen_pos, lit.read(screen_pos));

    unsafe {
        lit.write(screen_pos, color);
    }
}
