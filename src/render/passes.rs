use crate::{
    assets::store::PreparedAssetStore,
    compile::plan::{CompositePass, Pass, RenderPlan, ScenePass, SurfaceDesc, SurfaceId},
    foundation::error::{MotionError, MotionResult},
    render::backend::FrameRGBA,
};

pub trait PassBackend {
    fn ensure_surface(&mut self, id: SurfaceId, desc: &SurfaceDesc) -> MotionResult<()>;

    fn exec_scene(&mut self, pass: &ScenePass, assets: &PreparedAssetStore) -> MotionResult<()>;

    fn exec_composite(
        &mut self,
        pass: &CompositePass,
        assets: &PreparedAssetStore,
    ) -> MotionResult<()>;

    fn readback_rgba8(
        &mut self,
        surface: SurfaceId,
        plan: &RenderPlan,
        assets: &PreparedAssetStore,
    ) -> MotionResult<FrameRGBA>;
}

pub fn execute_plan<B: PassBackend + ?Sized>(
    backend: &mut B,
    plan: &RenderPlan,
    assets: &PreparedAssetStore,
) -> MotionResult<FrameRGBA> {
    for (idx, desc) in plan.surfaces.iter().enumerate() {
        let id = SurfaceId(
            idx.try_into()
                .map_err(|_| MotionError::evaluation("surface id overflow"))?,
        );
        backend.ensure_surface(id, desc)?;
    }

    for pass in &plan.passes {
        match pass {
            Pass::Scene(p) => backend.exec_scene(p, assets)?,
            Pass::Composite(p) => backend.exec_composite(p, assets)?,
        }
    }

    backend.readback_rgba8(plan.final_surface, plan, assets)
}
