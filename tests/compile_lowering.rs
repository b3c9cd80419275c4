//! Parametric and 3D assets lower at compile time with no font IO.

use std::collections::BTreeMap;

use mathmotion::{
    Anim, Asset, Axes2D, CameraRig, Canvas, ClipBuilder, CompositionBuilder, DrawOp, Ease, Fps,
    FrameIndex, FrameRange, HistogramAsset, Mesh3Asset, Pass, PolylineAsset, PreparedAssetStore,
    TangentAsset, TrackBuilder, compile_frame, math::functions::{Curve1, Field2},
    Evaluator,
};

fn axes() -> Axes2D {
    Axes2D::new([0.0, 60.0], [0.0, 50.0], [100.0, 100.0, 800.0, 400.0])
}

fn data_comp() -> mathmotion::Composition {
    let mut assets = BTreeMap::new();
    assets.insert(
        "tangent".to_string(),
        Asset::Tangent(TangentAsset {
            curve: Curve1::Polyline {
                points: vec![[0.0, 0.0], [20.0, 24.0], [40.0, 30.0], [60.0, 50.0]],
            },
            axes: axes(),
            dt: 0.1,
            half_len: 15.0,
            width_px: 3.0,
            dot_radius_px: 6.0,
            color_rgba8: [252, 98, 85, 255],
            label: None,
        }),
    );
    assets.insert(
        "hist".to_string(),
        Asset::Histogram(HistogramAsset {
            samples: vec![3.0, 3.1, 3.2, 3.5, 3.5, 3.6, 3.9, 4.0],
            bins: 7,
            range: [2.8, 4.2],
            axes: Axes2D::new([2.8, 4.2], [0.0, 20.0], [950.0, 100.0, 300.0, 400.0]),
            max_bar_value: 15.0,
            bar_width_frac: 0.9,
            color_rgba8: [131, 193, 103, 255],
        }),
    );
    assets.insert(
        "trace".to_string(),
        Asset::Polyline(PolylineAsset {
            points_px: (0..50).map(|i| [100.0 + i as f64 * 4.0, 300.0]).collect(),
            width_px: 4.0,
            color_rgba8: [88, 196, 221, 255],
        }),
    );
    assets.insert(
        "mesh".to_string(),
        Asset::Mesh3(Mesh3Asset {
            field: Field2::SADDLE,
            u_range: [-2.0, 2.0],
            v_range: [-2.0, 2.0],
            resolution: [8, 8],
            scale: [1.0, 1.0, 0.3],
            colors: [[41, 171, 202, 200], [35, 107, 142, 200]],
        }),
    );

    let mut builder = CompositionBuilder::new(
        Fps::new(30, 1).unwrap(),
        Canvas {
            width: 1280,
            height: 720,
        },
        FrameIndex(60),
    )
    .camera(CameraRig::fixed(1.2, -1.0, 0.7));
    for (key, asset) in assets {
        builder = builder.asset(key, asset).unwrap();
    }

    let full = FrameRange::new(FrameIndex(0), FrameIndex(60)).unwrap();
    let track = TrackBuilder::new("main")
        .clip(
            ClipBuilder::new("c_mesh", "mesh", full)
                .build()
                .unwrap(),
        )
        .clip(
            ClipBuilder::new("c_tan", "tangent", full)
                .z_offset(1)
                .param(Anim::ramp(5.0, 55.0, 0, 60, Ease::Linear))
                .build()
                .unwrap(),
        )
        .clip(
            ClipBuilder::new("c_hist", "hist", full)
                .z_offset(2)
                .param(Anim::ramp(0.0, 8.0, 0, 60, Ease::Linear))
                .build()
                .unwrap(),
        )
        .clip(
            ClipBuilder::new("c_trace", "trace", full)
                .z_offset(3)
                .param(Anim::ramp(0.0, 49.0, 0, 60, Ease::Linear))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    builder.track(track).build().unwrap()
}

fn scene_ops(plan: &mathmotion::RenderPlan) -> Vec<&DrawOp> {
    plan.passes
        .iter()
        .filter_map(|p| match p {
            Pass::Scene(s) => Some(&s.ops),
            Pass::Composite(_) => None,
        })
        .flatten()
        .collect()
}

#[test]
fn parametric_assets_lower_to_expected_ops() {
    let comp = data_comp();
    let assets = PreparedAssetStore::prepare(&comp, ".").unwrap();

    let eval = Evaluator::eval_frame(&comp, FrameIndex(30)).unwrap();
    let plan = compile_frame(&comp, &eval, &assets).unwrap();

    let ops = scene_ops(&plan);
    // Mesh quads (64) + tangent line & dot (2) + histogram bars (1 path)
    // + polyline trace (1).
    assert_eq!(ops.len(), 64 + 2 + 1 + 1);

    let strokes = ops
        .iter()
        .filter(|op| matches!(op, DrawOp::StrokePath { .. }))
        .count();
    // Tangent line and polyline trace.
    assert_eq!(strokes, 2);
}

#[test]
fn histogram_grows_with_its_driver() {
    let comp = data_comp();
    let assets = PreparedAssetStore::prepare(&comp, ".").unwrap();

    // param ~ 1 at frame 8: a single sample -> one bar.
    let eval = Evaluator::eval_frame(&comp, FrameIndex(8)).unwrap();
    let hist_node = eval.nodes.iter().find(|n| n.asset == "hist").unwrap();
    assert!(hist_node.param >= 1.0 && hist_node.param < 2.0);
    let plan = compile_frame(&comp, &eval, &assets).unwrap();
    assert!(!scene_ops(&plan).is_empty());
}

#[test]
fn tangent_moves_between_frames() {
    let comp = data_comp();
    let assets = PreparedAssetStore::prepare(&comp, ".").unwrap();

    let positions: Vec<String> = [10u64, 50u64]
        .iter()
        .map(|&f| {
            let eval = Evaluator::eval_frame(&comp, FrameIndex(f)).unwrap();
            let plan = compile_frame(&comp, &eval, &assets).unwrap();
            let ops = scene_ops(&plan);
            let tangent_line = ops
                .iter()
                .find(|op| matches!(op, DrawOp::StrokePath { .. }))
                .unwrap();
            match tangent_line {
                DrawOp::StrokePath { path, .. } => path.to_svg(),
                _ => unreachable!(),
            }
        })
        .collect();
    assert_ne!(positions[0], positions[1]);
}

#[test]
fn camera_motion_changes_mesh_projection() {
    let mut comp = data_comp();
    comp.camera = Some(CameraRig {
        phi: Anim::constant(1.2),
        theta: Anim::ramp(-1.0, 0.2, 0, 60, Ease::Linear),
        zoom: Anim::constant(0.7),
    });
    let assets = PreparedAssetStore::prepare(&comp, ".").unwrap();

    let path_at = |f: u64| {
        let eval = Evaluator::eval_frame(&comp, FrameIndex(f)).unwrap();
        let plan = compile_frame(&comp, &eval, &assets).unwrap();
        let ops = scene_ops(&plan);
        let DrawOp::FillPath { path, .. } = ops[0] else {
            panic!("expected mesh quad first");
        };
        path.to_svg()
    };
    assert_ne!(path_at(0), path_at(59));
}
