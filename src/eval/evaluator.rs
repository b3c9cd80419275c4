use crate::{
    animation::anim::SampleCtx,
    composition::model::{Clip, Composition, TransitionSpec},
    effects::transitions::{TransitionKind, parse_transition},
    foundation::core::{FrameIndex, FrameRange},
    foundation::error::{MotionError, MotionResult},
    layout::solver::LayoutOffsets,
    plot::camera::CameraState,
};

/// Fully evaluated frame graph before compilation.
#[derive(Clone, Debug)]
pub struct EvaluatedGraph {
    pub frame: FrameIndex,
    /// Camera state sampled for this frame, when the composition has a rig.
    pub camera: Option<CameraState>,
    /// Visible clip nodes in painter's order.
    pub nodes: Vec<EvaluatedClipNode>,
}

/// Evaluated clip node consumed by the compiler.
#[derive(Clone, Debug)]
pub struct EvaluatedClipNode {
    pub clip_id: String,
    /// Referenced composition asset key.
    pub asset: String,
    /// Absolute z-order after track and clip offsets.
    pub z: i32,
    pub transform: kurbo::Affine,
    /// Intrinsic opacity in `[0, 1]`; entrance/exit fades are applied later at
    /// composite time.
    pub opacity: f64,
    /// Sampled scalar driver for parametric assets.
    pub param: f64,
    pub enter: Option<ResolvedTransition>,
    pub exit: Option<ResolvedTransition>,
}

/// Transition state resolved for a specific frame.
#[derive(Clone, Copy, Debug)]
pub struct ResolvedTransition {
    pub kind: TransitionKind,
    /// Progress in `[0, 1]` over the transition window.
    pub progress: f64,
}

/// Stateless evaluator from composition timeline to frame graph.
pub struct Evaluator;

impl Evaluator {
    /// Evaluate one frame using default (zero) layout offsets.
    #[tracing::instrument(skip(comp))]
    pub fn eval_frame(comp: &Composition, frame: FrameIndex) -> MotionResult<EvaluatedGraph> {
        Self::eval_frame_with_layout_impl(comp, frame, &LayoutOffsets::default(), true)
    }

    /// Evaluate one frame with precomputed layout offsets.
    #[tracing::instrument(skip(comp, layout))]
    pub fn eval_frame_with_layout(
        comp: &Composition,
        frame: FrameIndex,
        layout: &LayoutOffsets,
    ) -> MotionResult<EvaluatedGraph> {
        Self::eval_frame_with_layout_impl(comp, frame, layout, true)
    }

    pub(crate) fn eval_frame_with_layout_unchecked(
        comp: &Composition,
        frame: FrameIndex,
        layout: &LayoutOffsets,
    ) -> MotionResult<EvaluatedGraph> {
        Self::eval_frame_with_layout_impl(comp, frame, layout, false)
    }

    fn eval_frame_with_layout_impl(
        comp: &Composition,
        frame: FrameIndex,
        layout: &LayoutOffsets,
        validate_comp: bool,
    ) -> MotionResult<EvaluatedGraph> {
        if validate_comp {
            comp.validate()?;
        }
        if frame.0 >= comp.duration.0 {
            return Err(MotionError::evaluation("frame is out of bounds"));
        }

        let camera = match &comp.camera {
            Some(rig) => {
                let ctx = SampleCtx {
                    frame,
                    fps: comp.fps,
                    clip_local: frame,
                };
                Some(CameraState {
                    phi: rig.phi.sample(ctx)?,
                    theta: rig.theta.sample(ctx)?,
                    zoom: rig.zoom.sample(ctx)?,
                })
            }
            None => None,
        };

        let mut nodes_with_key: Vec<((i32, usize, u64, String), EvaluatedClipNode)> = Vec::new();

        for (track_index, track) in comp.tracks.iter().enumerate() {
            for (clip_index, clip) in track.clips.iter().enumerate() {
                if !clip.range.contains(frame) {
                    continue;
                }

                let node = eval_clip(
                    comp,
                    clip,
                    frame,
                    track.z_base,
                    layout.offset_for(track_index, clip_index),
                )?;
                let sort_key = (
                    node.z,
                    track_index,
                    clip.range.start.0,
                    node.clip_id.clone(),
                );
                nodes_with_key.push((sort_key, node));
            }
        }

        nodes_with_key.sort_by(|a, b| a.0.cmp(&b.0));
        let nodes = nodes_with_key.into_iter().map(|(_, n)| n).collect();

        Ok(EvaluatedGraph {
            frame,
            camera,
            nodes,
        })
    }
}

fn eval_clip(
    comp: &Composition,
    clip: &Clip,
    frame: FrameIndex,
    track_z_base: i32,
    layout_offset: crate::foundation::core::Vec2,
) -> MotionResult<EvaluatedClipNode> {
    let clip_local = FrameIndex(frame.0 - clip.range.start.0);
    let ctx = SampleCtx {
        frame,
        fps: comp.fps,
        clip_local,
    };

    let opacity = clip.props.opacity.sample(ctx)?.clamp(0.0, 1.0);
    let param = clip.props.param.sample(ctx)?;
    let transform = kurbo::Affine::translate((layout_offset.x, layout_offset.y))
        * clip.props.transform.sample(ctx)?.to_affine();

    Ok(EvaluatedClipNode {
        clip_id: clip.id.clone(),
        asset: clip.asset.clone(),
        z: track_z_base + clip.z_offset,
        transform,
        opacity,
        param,
        enter: resolve_transition_in(clip, frame)?,
        exit: resolve_transition_out(clip, frame)?,
    })
}

fn resolve_transition_in(clip: &Clip, frame: FrameIndex) -> MotionResult<Option<ResolvedTransition>> {
    let Some(spec) = clip.transition_in.as_ref() else {
        return Ok(None);
    };
    resolve_transition_window(
        spec,
        frame,
        clip.range,
        clip.range.start,
        TransitionEdge::In,
    )
}

fn resolve_transition_out(
    clip: &Clip,
    frame: FrameIndex,
) -> MotionResult<Option<ResolvedTransition>> {
    let Some(spec) = clip.transition_out.as_ref() else {
        return Ok(None);
    };
    resolve_transition_window(spec, frame, clip.range, clip.range.end, TransitionEdge::Out)
}

#[derive(Clone, Copy, Debug)]
enum TransitionEdge {
    In,
    Out,
}

fn resolve_transition_window(
    spec: &TransitionSpec,
    frame: FrameIndex,
    clip_range: FrameRange,
    edge_frame: FrameIndex,
    edge: TransitionEdge,
) -> MotionResult<Option<ResolvedTransition>> {
    if spec.duration_frames == 0 {
        return Ok(None);
    }

    let clip_len = clip_range.len_frames();
    if clip_len == 0 {
        return Ok(None);
    }
    let dur = spec.duration_frames.min(clip_len);

    let (window_start, window_end_excl) = match edge {
        TransitionEdge::In => {
            let start = edge_frame.0;
            let end = start.saturating_add(dur);
            (FrameIndex(start), FrameIndex(end))
        }
        TransitionEdge::Out => {
            let end = edge_frame.0;
            let start = end.saturating_sub(dur);
            (FrameIndex(start), FrameIndex(end))
        }
    };

    if !(window_start.0 <= frame.0 && frame.0 < window_end_excl.0) {
        return Ok(None);
    }

    let denom = dur.saturating_sub(1);
    let t = if denom == 0 {
        1.0
    } else {
        let offset = frame.0 - window_start.0;
        (offset as f64) / (denom as f64)
    };
    let progress = spec.ease.apply(t).clamp(0.0, 1.0);

    Ok(Some(ResolvedTransition {
        kind: parse_transition(spec)?,
        progress,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::anim::Anim;
    use crate::animation::ease::Ease;
    use crate::composition::model::tests_support::path_only_comp;
    use crate::composition::model::{CameraRig, TransitionSpec};

    #[test]
    fn visibility_respects_frame_range() {
        let comp = path_only_comp();
        assert_eq!(
            Evaluator::eval_frame(&comp, FrameIndex(4)).unwrap().nodes.len(),
            1
        );
        assert_eq!(
            Evaluator::eval_frame(&comp, FrameIndex(5)).unwrap().nodes.len(),
            2
        );
        assert_eq!(
            Evaluator::eval_frame(&comp, FrameIndex(14)).unwrap().nodes.len(),
            2
        );
        assert_eq!(
            Evaluator::eval_frame(&comp, FrameIndex(15)).unwrap().nodes.len(),
            1
        );
    }

    #[test]
    fn out_of_bounds_frame_is_an_error() {
        let comp = path_only_comp();
        assert!(Evaluator::eval_frame(&comp, FrameIndex(20)).is_err());
    }

    #[test]
    fn opacity_is_clamped() {
        let mut comp = path_only_comp();
        comp.tracks[0].clips[0].props.opacity = Anim::constant(2.0);
        let g = Evaluator::eval_frame(&comp, FrameIndex(0)).unwrap();
        assert_eq!(g.nodes[0].opacity, 1.0);
    }

    #[test]
    fn z_orders_nodes() {
        let comp = path_only_comp();
        let g = Evaluator::eval_frame(&comp, FrameIndex(10)).unwrap();
        assert_eq!(g.nodes[0].clip_id, "c0");
        assert_eq!(g.nodes[1].clip_id, "c1");
    }

    #[test]
    fn transition_progress_boundaries() {
        let tr = TransitionSpec {
            kind: "fade".to_string(),
            duration_frames: 3,
            ease: Ease::Linear,
            params: serde_json::Value::Null,
        };
        let mut comp = path_only_comp();
        comp.tracks[0].clips[1].transition_in = Some(tr.clone());
        comp.tracks[0].clips[1].transition_out = Some(tr);

        // Clip c1 spans [5, 15).
        let g0 = Evaluator::eval_frame(&comp, FrameIndex(5)).unwrap();
        assert_eq!(g0.nodes[1].enter.unwrap().progress, 0.0);

        let g_last_in = Evaluator::eval_frame(&comp, FrameIndex(7)).unwrap();
        assert_eq!(g_last_in.nodes[1].enter.unwrap().progress, 1.0);

        let g_out0 = Evaluator::eval_frame(&comp, FrameIndex(12)).unwrap();
        assert_eq!(g_out0.nodes[1].exit.unwrap().progress, 0.0);

        let g_out_last = Evaluator::eval_frame(&comp, FrameIndex(14)).unwrap();
        assert_eq!(g_out_last.nodes[1].exit.unwrap().progress, 1.0);

        let g_mid = Evaluator::eval_frame(&comp, FrameIndex(9)).unwrap();
        assert!(g_mid.nodes[1].enter.is_none());
        assert!(g_mid.nodes[1].exit.is_none());
    }

    #[test]
    fn camera_state_is_sampled_per_frame() {
        let mut comp = path_only_comp();
        comp.camera = Some(CameraRig {
            phi: Anim::constant(1.2),
            theta: Anim::ramp(0.0, 1.0, 0, 10, Ease::Linear),
            zoom: Anim::constant(0.7),
        });
        let g0 = Evaluator::eval_frame(&comp, FrameIndex(0)).unwrap();
        let g5 = Evaluator::eval_frame(&comp, FrameIndex(5)).unwrap();
        assert_eq!(g0.camera.unwrap().theta, 0.0);
        assert_eq!(g5.camera.unwrap().theta, 0.5);
        assert_eq!(g5.camera.unwrap().phi, 1.2);
    }
}
