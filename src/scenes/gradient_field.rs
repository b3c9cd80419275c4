use crate::{
    composition::model::{Arrow3Asset, Asset, Composition, Dot3Asset, Mesh3Asset},
    foundation::core::Transform2D,
    foundation::error::MotionResult,
    math::functions::Field2,
    plot::camera::{CameraState, Projector},
    scene::script::EnterKind,
    scenes::{base_script, centered_x, palette, space, text},
};

const PHI: f64 = 70.0 * std::f64::consts::PI / 180.0;
const THETA: f64 = -60.0 * std::f64::consts::PI / 180.0;
const ZOOM: f64 = 0.7;

/// Math-to-world scale: 6 units of x/y across 7 world units, 20 units of f
/// across 5.
const SCALE: [f64; 3] = [7.0 / 6.0, 7.0 / 6.0, 0.25];

fn surface() -> Asset {
    Asset::Mesh3(Mesh3Asset {
        field: Field2::PARABOLOID,
        u_range: [-3.0, 3.0],
        v_range: [-3.0, 3.0],
        resolution: [24, 24],
        scale: SCALE,
        colors: [
            crate::scenes::palette::with_alpha(palette::BLUE_D, 178),
            crate::scenes::palette::with_alpha(palette::BLUE_E, 178),
        ],
    })
}

fn grad_arrow(x: f64, y: f64, arrow_scale: f64, width_px: f64) -> Asset {
    let field = Field2::PARABOLOID;
    let z = field.eval(x, y);
    let [gx, gy] = field.gradient(x, y);
    Asset::Arrow3(Arrow3Asset {
        start: space::scaled([x, y, z], SCALE),
        end: space::scaled([x + arrow_scale * gx, y + arrow_scale * gy, z], SCALE),
        width_px,
        head_len: 0.3,
        color_rgba8: palette::YELLOW,
    })
}

fn surface_dot(x: f64, y: f64, radius_px: f64) -> Asset {
    Asset::Dot3(Dot3Asset {
        at: space::scaled([x, y, Field2::PARABOLOID.eval(x, y)], SCALE),
        radius_px,
        color_rgba8: palette::RED,
    })
}

pub fn build() -> MotionResult<Composition> {
    let mut s = base_script(4);
    let stage = s.track("space", 0);
    let hud = s.track("hud", 10);
    s.camera(PHI, THETA, ZOOM);

    // Title.
    let title_str = "The Gradient Vector";
    let title = s.spawn(
        hud,
        "title",
        text(title_str, 38.0, palette::WHITE),
        Transform2D::at(centered_x(title_str, 38.0), 26.0),
    )?;
    s.show(&[title], EnterKind::Write, 1.0);
    s.wait(1.0);

    // Axes and their labels (labels pinned where the initial camera puts the tips).
    let axes = s.spawn(
        stage,
        "axes3",
        Asset::Line3(space::axes3(
            [-3.0, 3.0],
            [-3.0, 3.0],
            [0.0, 20.0],
            SCALE,
            2.0,
            palette::WHITE,
        )),
        Transform2D::default(),
    )?;
    s.show(&[axes], EnterKind::Create, 1.0);

    let pr = Projector::new(
        CameraState {
            phi: PHI,
            theta: THETA,
            zoom: ZOOM,
        },
        crate::scenes::CANVAS.width,
        crate::scenes::CANVAS.height,
    );
    let (x_tip, _) = pr.project(space::scaled([3.4, 0.0, 0.0], SCALE));
    let (y_tip, _) = pr.project(space::scaled([0.0, 3.4, 0.0], SCALE));
    let (z_tip, _) = pr.project(space::scaled([0.0, 0.0, 21.0], SCALE));
    let x_label = s.spawn(
        hud,
        "x_label",
        text("x", 26.0, palette::WHITE),
        Transform2D::at(x_tip.x, x_tip.y),
    )?;
    let y_label = s.spawn(
        hud,
        "y_label",
        text("y", 26.0, palette::WHITE),
        Transform2D::at(y_tip.x, y_tip.y),
    )?;
    let z_label = s.spawn(
        hud,
        "z_label",
        text("f", 26.0, palette::WHITE),
        Transform2D::at(z_tip.x, z_tip.y - 24.0),
    )?;
    s.play(0.7, |p| {
        p.enter(x_label, EnterKind::Write);
        p.enter(y_label, EnterKind::Write);
        p.enter(z_label, EnterKind::Write);
    });
    s.wait(0.5);

    let func_label = s.spawn(
        hud,
        "func_label",
        text("f(x,y) = x² + y²", 34.0, palette::BLUE),
        Transform2D::at(60.0, 110.0),
    )?;
    s.show(&[func_label], EnterKind::Write, 1.0);

    let mesh = s.spawn(stage, "surface", surface(), Transform2D::default())?;
    s.show(&[mesh], EnterKind::Create, 2.0);
    s.wait(2.0);

    // One gradient, examined closely.
    s.hide(&[title], 0.5);
    let grad_title_str = "Gradient at point (2, 1)";
    let grad_title = s.spawn(
        hud,
        "grad_title",
        text(grad_title_str, 30.0, palette::YELLOW),
        Transform2D::at(centered_x(grad_title_str, 30.0), 660.0),
    )?;
    s.show(&[grad_title], EnterKind::Write, 1.0);

    let probe = s.spawn(stage, "probe", surface_dot(2.0, 1.0, 7.0), Transform2D::default())?;
    s.show(&[probe], EnterKind::FadeIn, 0.5);
    s.wait(1.0);

    let arrow = s.spawn(
        stage,
        "arrow",
        grad_arrow(2.0, 1.0, 0.5, 4.0),
        Transform2D::default(),
    )?;
    s.show(&[arrow], EnterKind::Create, 1.5);
    s.wait(2.0);

    let formula = s.spawn(
        hud,
        "formula",
        text("∇f = [2x, 2y]", 34.0, palette::YELLOW),
        Transform2D::at(940.0, 140.0),
    )?;
    s.show(&[formula], EnterKind::Write, 1.0);
    s.wait(1.0);

    let values = s.spawn(
        hud,
        "values",
        text("∇f(2,1) = [4, 2]", 30.0, palette::YELLOW),
        Transform2D::at(940.0, 186.0),
    )?;
    s.show(&[values], EnterKind::Write, 1.0);
    s.wait(2.0);

    let explanation = s.spawn(
        hud,
        "explanation",
        text("Points toward steepest ascent", 24.0, palette::GREEN),
        Transform2D::at(940.0, 230.0),
    )?;
    s.show(&[explanation], EnterKind::Write, 1.0);
    s.wait(3.0);

    s.hide(&[probe, arrow, grad_title, formula, values, explanation], 1.0);

    // Many gradients at once.
    let multi_title_str = "Gradient at multiple points";
    let multi_title = s.spawn(
        hud,
        "multi_title",
        text(multi_title_str, 30.0, palette::PURPLE),
        Transform2D::at(centered_x(multi_title_str, 30.0), 660.0),
    )?;
    s.show(&[multi_title], EnterKind::Write, 1.0);

    let sample_points: [(f64, f64); 8] = [
        (1.5, 1.5),
        (-1.5, 1.5),
        (-1.5, -1.5),
        (1.5, -1.5),
        (2.0, 0.0),
        (0.0, 2.0),
        (-2.0, 0.0),
        (0.0, -2.0),
    ];

    let mut dots = Vec::new();
    let mut arrows = Vec::new();
    for (i, &(x, y)) in sample_points.iter().enumerate() {
        dots.push(s.spawn(
            stage,
            format!("multi_dot{i}"),
            surface_dot(x, y, 5.0),
            Transform2D::default(),
        )?);
        arrows.push(s.spawn(
            stage,
            format!("multi_arrow{i}"),
            grad_arrow(x, y, 0.4, 3.0),
            Transform2D::default(),
        )?);
    }

    // Lagged entrances.
    for &d in &dots {
        s.show(&[d], EnterKind::FadeIn, 0.2);
    }
    s.wait(1.0);
    for &a in &arrows {
        s.show(&[a], EnterKind::Create, 0.2);
    }
    s.wait(2.0);

    s.hide(&[multi_title], 0.5);

    let insight = s.spawn(
        hud,
        "insight",
        text("All gradients point away from center (uphill)", 26.0, palette::GREEN),
        Transform2D::at(640.0, 600.0),
    )?;
    s.show(&[insight], EnterKind::Write, 1.0);
    s.wait(3.0);

    // The flat spot at the origin.
    s.hide(&[insight], 0.5);
    let center_text = s.spawn(
        hud,
        "center_text",
        text("At center (0,0): gradient = [0, 0]", 26.0, palette::RED),
        Transform2D::at(640.0, 600.0),
    )?;
    let center_dot = s.spawn(stage, "center_dot", surface_dot(0.0, 0.0, 9.0), Transform2D::default())?;
    s.play(1.0, |p| {
        p.enter(center_text, EnterKind::Write);
        p.enter(center_dot, EnterKind::FadeIn);
    });
    s.wait(2.0);

    let flat_text = s.spawn(
        hud,
        "flat_text",
        text("Flat point = minimum", 26.0, palette::RED),
        Transform2D::at(640.0, 636.0),
    )?;
    s.show(&[flat_text], EnterKind::Write, 1.0);
    s.wait(3.0);

    s.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::evaluator::Evaluator;
    use crate::foundation::core::FrameIndex;

    #[test]
    fn scene_has_camera_and_eight_sample_arrows() {
        let comp = build().unwrap();
        assert!(comp.camera.is_some());
        let arrows = comp
            .tracks
            .iter()
            .flat_map(|t| &t.clips)
            .filter(|c| c.asset.starts_with("multi_arrow"))
            .count();
        assert_eq!(arrows, 8);
    }

    #[test]
    fn surface_is_visible_for_the_rest_of_the_scene() {
        let comp = build().unwrap();
        let mesh = comp
            .tracks
            .iter()
            .flat_map(|t| &t.clips)
            .find(|c| c.asset == "surface")
            .unwrap();
        assert_eq!(mesh.range.end.0, comp.duration.0);
        let g = Evaluator::eval_frame(&comp, FrameIndex(comp.duration.0 - 1)).unwrap();
        assert!(g.nodes.iter().any(|n| n.asset == "surface"));
        assert!(g.camera.is_some());
    }
}
