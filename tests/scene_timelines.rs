//! Scene-level checks that need no font IO: building, validation, evaluation
//! at timeline landmarks, and build determinism.

use mathmotion::{Evaluator, FrameIndex, scenes};

#[test]
fn all_scenes_build_and_evaluate_at_landmarks() {
    for scene in scenes::all() {
        let comp = (scene.build)()
            .unwrap_or_else(|e| panic!("scene '{}' failed to build: {e}", scene.name));

        let landmarks = [0, comp.duration.0 / 4, comp.duration.0 / 2, comp.duration.0 - 1];
        for frame in landmarks {
            let g = Evaluator::eval_frame(&comp, FrameIndex(frame)).unwrap_or_else(|e| {
                panic!("scene '{}' failed to evaluate frame {frame}: {e}", scene.name)
            });
            assert_eq!(g.camera.is_some(), comp.camera.is_some());
        }

        // Something must be on screen by the midpoint of every scene.
        let mid = Evaluator::eval_frame(&comp, FrameIndex(comp.duration.0 / 2)).unwrap();
        assert!(
            !mid.nodes.is_empty(),
            "scene '{}' shows nothing at its midpoint",
            scene.name
        );
    }
}

#[test]
fn scene_builds_are_deterministic() {
    for scene in scenes::all() {
        let a = serde_json::to_string(&(scene.build)().unwrap()).unwrap();
        let b = serde_json::to_string(&(scene.build)().unwrap()).unwrap();
        assert_eq!(a, b, "scene '{}' builds are not reproducible", scene.name);
    }
}

#[test]
fn three_d_scenes_carry_cameras_and_flat_scenes_do_not() {
    let with_camera = ["gradient-vectors", "partial-derivatives", "saddle-point"];
    for scene in scenes::all() {
        let comp = (scene.build)().unwrap();
        let expect_camera = with_camera.contains(&scene.name);
        assert_eq!(
            comp.camera.is_some(),
            expect_camera,
            "scene '{}' camera presence mismatch",
            scene.name
        );
    }
}

#[test]
fn scenes_end_with_settled_frames() {
    // Every scene closes on a wait, so the final frame must not sit inside an
    // entrance window of any visible clip.
    for scene in scenes::all() {
        let comp = (scene.build)().unwrap();
        let g = Evaluator::eval_frame(&comp, FrameIndex(comp.duration.0 - 1)).unwrap();
        for node in &g.nodes {
            assert!(
                node.enter.is_none(),
                "scene '{}' clip '{}' is still entering at the final frame",
                scene.name,
                node.clip_id
            );
        }
    }
}
