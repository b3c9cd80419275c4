use crate::{
    composition::model::{Asset, Composition, Dot3Asset, Mesh3Asset},
    foundation::core::Transform2D,
    foundation::error::MotionResult,
    math::functions::Field2,
    scene::script::EnterKind,
    scenes::{base_script, centered_x, palette, space, text},
};

const PHI: f64 = 65.0 * std::f64::consts::PI / 180.0;
const THETA: f64 = -60.0 * std::f64::consts::PI / 180.0;
const ZOOM: f64 = 0.8;
const SCALE: [f64; 3] = [7.0 / 6.0, 7.0 / 6.0, 0.25];

pub fn build() -> MotionResult<Composition> {
    let mut s = base_script(5);
    let stage = s.track("space", 0);
    let slices = s.track("slices", 5);
    let hud = s.track("hud", 10);
    s.camera(PHI, THETA, ZOOM);

    let field = Field2::PARABOLOID;

    let title_str = "Partial Derivatives Visualization";
    let title = s.spawn(
        hud,
        "title",
        text(title_str, 38.0, palette::WHITE),
        Transform2D::at(centered_x(title_str, 38.0), 26.0),
    )?;
    s.show(&[title], EnterKind::Write, 1.0);
    s.wait(1.0);

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
    s.wait(1.0);

    let func_label = s.spawn(
        hud,
        "func_label",
        text("f(x,y) = x² + y²", 34.0, palette::BLUE),
        Transform2D::at(60.0, 110.0),
    )?;
    s.show(&[func_label], EnterKind::Write, 1.0);

    let mesh = s.spawn(
        stage,
        "surface",
        Asset::Mesh3(Mesh3Asset {
            field,
            u_range: [-3.0, 3.0],
            v_range: [-3.0, 3.0],
            resolution: [25, 25],
            scale: SCALE,
            colors: [
                palette::with_alpha(palette::BLUE_D, 153),
                palette::with_alpha(palette::BLUE_E, 153),
            ],
        }),
        Transform2D::default(),
    )?;
    s.show(&[mesh], EnterKind::Create, 2.0);
    s.wait(2.0);

    // Part 1: fix y = 1, vary x.
    s.hide(&[title], 0.5);
    let title_x_str = "Fix y = 1, vary x";
    let title_x = s.spawn(
        hud,
        "title_x",
        text(title_x_str, 30.0, palette::YELLOW),
        Transform2D::at(centered_x(title_x_str, 30.0), 660.0),
    )?;
    s.show(&[title_x], EnterKind::Write, 1.0);

    let wall_x = s.spawn(
        slices,
        "wall_x",
        Asset::Line3(space::wall_grid_at_y(
            1.0,
            [-3.0, 3.0],
            [0.0, 10.0],
            2.0,
            SCALE,
            2.0,
            palette::with_alpha(palette::YELLOW, 140),
        )),
        Transform2D::default(),
    )?;
    s.show(&[wall_x], EnterKind::Create, 1.0);

    let curve_x = s.spawn(
        slices,
        "curve_x",
        Asset::Line3(crate::composition::model::Line3Asset {
            polylines: vec![space::slice_along_x(field, 1.0, [-3.0, 3.0], 61, SCALE)],
            width_px: 6.0,
            color_rgba8: palette::YELLOW,
        }),
        Transform2D::default(),
    )?;
    s.show(&[curve_x], EnterKind::Create, 2.0);
    s.play(1.0, |p| p.opacity(mesh, 0.17));
    s.wait(2.0);

    let formula_x = s.spawn(
        hud,
        "formula_x",
        text("∂f/∂x = 2x", 34.0, palette::YELLOW),
        Transform2D::at(960.0, 150.0),
    )?;
    s.show(&[formula_x], EnterKind::Write, 1.0);
    s.wait(2.0);

    s.play(2.0, |p| p.camera_to(70f64.to_radians(), -75f64.to_radians(), None));
    s.wait(2.0);

    s.play(1.0, |p| {
        p.fade_out(curve_x);
        p.fade_out(wall_x);
        p.fade_out(title_x);
        p.fade_out(formula_x);
        p.opacity(mesh, 1.0);
    });

    s.play(2.0, |p| p.camera_to(PHI, THETA, None));

    // Part 2: fix x = 1, vary y.
    let title_y_str = "Fix x = 1, vary y";
    let title_y = s.spawn(
        hud,
        "title_y",
        text(title_y_str, 30.0, palette::GREEN),
        Transform2D::at(centered_x(title_y_str, 30.0), 660.0),
    )?;
    s.show(&[title_y], EnterKind::Write, 1.0);

    let wall_y = s.spawn(
        slices,
        "wall_y",
        Asset::Line3(space::wall_grid_at_x(
            1.0,
            [-3.0, 3.0],
            [0.0, 10.0],
            2.0,
            SCALE,
            2.0,
            palette::with_alpha(palette::GREEN, 140),
        )),
        Transform2D::default(),
    )?;
    s.show(&[wall_y], EnterKind::Create, 1.0);

    let curve_y = s.spawn(
        slices,
        "curve_y",
        Asset::Line3(crate::composition::model::Line3Asset {
            polylines: vec![space::slice_along_y(field, 1.0, [-3.0, 3.0], 61, SCALE)],
            width_px: 6.0,
            color_rgba8: palette::GREEN,
        }),
        Transform2D::default(),
    )?;
    s.show(&[curve_y], EnterKind::Create, 2.0);
    s.play(1.0, |p| p.opacity(mesh, 0.17));
    s.wait(2.0);

    let formula_y = s.spawn(
        hud,
        "formula_y",
        text("∂f/∂y = 2y", 34.0, palette::GREEN),
        Transform2D::at(960.0, 150.0),
    )?;
    s.show(&[formula_y], EnterKind::Write, 1.0);
    s.wait(2.0);

    s.play(2.0, |p| p.camera_to(70f64.to_radians(), -45f64.to_radians(), None));
    s.wait(2.0);

    s.play(1.0, |p| {
        p.fade_out(curve_y);
        p.fade_out(wall_y);
        p.fade_out(title_y);
        p.fade_out(formula_y);
        p.opacity(mesh, 1.0);
    });

    s.play(2.0, |p| p.camera_to(PHI, THETA, None));

    // Part 3: both slices together.
    let title_both_str = "Both partial derivatives";
    let title_both = s.spawn(
        hud,
        "title_both",
        text(title_both_str, 30.0, palette::PURPLE),
        Transform2D::at(centered_x(title_both_str, 30.0), 660.0),
    )?;
    s.show(&[title_both], EnterKind::Write, 1.0);

    let wall_x2 = s.spawn(
        slices,
        "wall_x2",
        Asset::Line3(space::wall_grid_at_y(
            1.0,
            [-3.0, 3.0],
            [0.0, 10.0],
            2.0,
            SCALE,
            2.0,
            palette::with_alpha(palette::YELLOW, 140),
        )),
        Transform2D::default(),
    )?;
    let wall_y2 = s.spawn(
        slices,
        "wall_y2",
        Asset::Line3(space::wall_grid_at_x(
            1.0,
            [-3.0, 3.0],
            [0.0, 10.0],
            2.0,
            SCALE,
            2.0,
            palette::with_alpha(palette::GREEN, 140),
        )),
        Transform2D::default(),
    )?;
    s.play(1.0, |p| {
        p.enter(wall_x2, EnterKind::Create);
        p.enter(wall_y2, EnterKind::Create);
    });

    let curve_x2 = s.spawn(
        slices,
        "curve_x2",
        Asset::Line3(crate::composition::model::Line3Asset {
            polylines: vec![space::slice_along_x(field, 1.0, [-3.0, 3.0], 61, SCALE)],
            width_px: 5.0,
            color_rgba8: palette::YELLOW,
        }),
        Transform2D::default(),
    )?;
    let curve_y2 = s.spawn(
        slices,
        "curve_y2",
        Asset::Line3(crate::composition::model::Line3Asset {
            polylines: vec![space::slice_along_y(field, 1.0, [-3.0, 3.0], 61, SCALE)],
            width_px: 5.0,
            color_rgba8: palette::GREEN,
        }),
        Transform2D::default(),
    )?;
    s.play(2.0, |p| {
        p.enter(curve_x2, EnterKind::Create);
        p.enter(curve_y2, EnterKind::Create);
    });
    s.play(1.0, |p| p.opacity(mesh, 0.17));

    // The slices cross at (1, 1, 2).
    let crossing = s.spawn(
        slices,
        "crossing",
        Asset::Dot3(Dot3Asset {
            at: space::scaled([1.0, 1.0, field.eval(1.0, 1.0)], SCALE),
            radius_px: 8.0,
            color_rgba8: palette::RED,
        }),
        Transform2D::default(),
    )?;
    s.show(&[crossing], EnterKind::FadeIn, 0.5);
    s.wait(1.0);

    let both_x = s.spawn(
        hud,
        "both_x",
        text("∂f/∂x = 2x", 30.0, palette::YELLOW),
        Transform2D::at(960.0, 150.0),
    )?;
    let both_y = s.spawn(
        hud,
        "both_y",
        text("∂f/∂y = 2y", 30.0, palette::GREEN),
        Transform2D::at(960.0, 196.0),
    )?;
    s.play(1.0, |p| {
        p.enter(both_x, EnterKind::Write);
        p.enter(both_y, EnterKind::Write);
    });

    // A slow look around both slices.
    s.play(8.0, |p| p.camera_orbit(0.96));
    s.wait(2.0);

    s.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::anim::SampleCtx;
    use crate::foundation::core::{FrameIndex, Fps};

    #[test]
    fn surface_dims_while_slices_are_highlighted() {
        let comp = build().unwrap();
        let mesh = comp
            .tracks
            .iter()
            .flat_map(|t| &t.clips)
            .find(|c| c.asset == "surface")
            .unwrap();
        let crate::animation::anim::Anim::Keyframes(kf) = &mesh.props.opacity else {
            panic!("expected keyframed opacity");
        };
        let values: Vec<f64> = kf.keys.iter().map(|k| k.value).collect();
        assert!(values.contains(&0.17));
        assert!(values.contains(&1.0));
    }

    #[test]
    fn camera_returns_to_base_between_parts_then_orbits() {
        let comp = build().unwrap();
        let cam = comp.camera.as_ref().unwrap();
        let last = comp.duration.0 - 1;
        let ctx = SampleCtx {
            frame: FrameIndex(last),
            fps: Fps::new(30, 1).unwrap(),
            clip_local: FrameIndex(last),
        };
        // After the 8s ambient orbit the azimuth has advanced past the base angle.
        let theta_end = cam.theta.sample(ctx).unwrap();
        assert!(theta_end > THETA);
    }
}
