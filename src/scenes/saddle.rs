use crate::{
    composition::model::{Asset, Composition, Dot3Asset, Edges, LayoutAlignX, LayoutAlignY, Line3Asset, Mesh3Asset},
    foundation::core::Transform2D,
    foundation::error::MotionResult,
    math::functions::Field2,
    scene::script::EnterKind,
    scenes::{base_script, centered_x, palette, space, text},
};

const PHI: f64 = 70.0 * std::f64::consts::PI / 180.0;
const THETA: f64 = -60.0 * std::f64::consts::PI / 180.0;
const ZOOM: f64 = 0.7;
/// x/y span 6 units over 7 world units; f spans -10..10 over 6.
const SCALE: [f64; 3] = [7.0 / 6.0, 7.0 / 6.0, 0.3];

pub fn build() -> MotionResult<Composition> {
    let mut s = base_script(6);
    let stage = s.track("space", 0);
    let slices = s.track("slices", 5);
    let hud = s.track("hud", 10);
    let formulas = s.vstack_track(
        "formulas",
        20,
        8.0,
        Edges {
            right: 60.0,
            top: 150.0,
            ..Edges::default()
        },
        LayoutAlignX::End,
        LayoutAlignY::Start,
    );
    s.camera(PHI, THETA, ZOOM);

    let field = Field2::SADDLE;

    let title_str = "Saddle Point: f(x,y) = x² - y²";
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
            [-10.0, 10.0],
            SCALE,
            2.0,
            palette::WHITE,
        )),
        Transform2D::default(),
    )?;
    s.show(&[axes], EnterKind::Create, 1.0);
    s.wait(0.5);

    let mesh = s.spawn(
        stage,
        "surface",
        Asset::Mesh3(Mesh3Asset {
            field,
            u_range: [-2.5, 2.5],
            v_range: [-2.5, 2.5],
            resolution: [26, 26],
            scale: SCALE,
            colors: [
                palette::with_alpha(palette::BLUE_D, 191),
                palette::with_alpha(palette::BLUE_E, 191),
            ],
        }),
        Transform2D::default(),
    )?;
    s.show(&[mesh], EnterKind::Create, 3.0);
    s.wait(2.0);

    // The critical point at the origin.
    s.hide(&[title], 0.5);
    let critical_str = "Critical point at (0, 0)";
    let critical_title = s.spawn(
        hud,
        "critical_title",
        text(critical_str, 30.0, palette::RED),
        Transform2D::at(centered_x(critical_str, 30.0), 26.0),
    )?;
    s.show(&[critical_title], EnterKind::Write, 1.0);

    let critical_dot = s.spawn(
        stage,
        "critical_dot",
        Asset::Dot3(Dot3Asset {
            at: [0.0, 0.0, 0.0],
            radius_px: 11.0,
            color_rgba8: palette::RED,
        }),
        Transform2D::default(),
    )?;
    s.show(&[critical_dot], EnterKind::FadeIn, 0.5);
    s.wait(2.0);

    // Along x the surface curves up.
    s.hide(&[critical_title], 0.5);
    let x_slice_str = "Along x-axis: curves UP";
    let x_slice_title = s.spawn(
        hud,
        "x_slice_title",
        text(x_slice_str, 28.0, palette::YELLOW),
        Transform2D::at(centered_x(x_slice_str, 28.0), 26.0),
    )?;
    s.show(&[x_slice_title], EnterKind::Write, 1.0);

    let x_curve = s.spawn(
        slices,
        "x_curve",
        Asset::Line3(Line3Asset {
            polylines: vec![space::slice_along_x(field, 0.0, [-2.5, 2.5], 61, SCALE)],
            width_px: 7.0,
            color_rgba8: palette::YELLOW,
        }),
        Transform2D::default(),
    )?;
    s.show(&[x_curve], EnterKind::Create, 2.0);

    let x_formula = s.spawn(
        hud,
        "x_formula",
        text("f(x, 0) = x²", 32.0, palette::YELLOW),
        Transform2D::at(980.0, 150.0),
    )?;
    s.show(&[x_formula], EnterKind::Write, 1.0);
    s.wait(3.0);

    s.hide(&[x_curve, x_slice_title, x_formula], 1.0);

    // Along y it curves down.
    let y_slice_str = "Along y-axis: curves DOWN";
    let y_slice_title = s.spawn(
        hud,
        "y_slice_title",
        text(y_slice_str, 28.0, palette::GREEN),
        Transform2D::at(centered_x(y_slice_str, 28.0), 26.0),
    )?;
    s.show(&[y_slice_title], EnterKind::Write, 1.0);

    let y_curve = s.spawn(
        slices,
        "y_curve",
        Asset::Line3(Line3Asset {
            polylines: vec![space::slice_along_y(field, 0.0, [-2.5, 2.5], 61, SCALE)],
            width_px: 7.0,
            color_rgba8: palette::GREEN,
        }),
        Transform2D::default(),
    )?;
    s.show(&[y_curve], EnterKind::Create, 2.0);

    let y_formula = s.spawn(
        hud,
        "y_formula",
        text("f(0, y) = -y²", 32.0, palette::GREEN),
        Transform2D::at(980.0, 150.0),
    )?;
    s.show(&[y_formula], EnterKind::Write, 1.0);
    s.wait(3.0);

    s.hide(&[y_slice_title, y_formula], 1.0);

    // Both directions at once.
    let both_str = "Saddle: UP and DOWN at same point";
    let both_title = s.spawn(
        hud,
        "both_title",
        text(both_str, 28.0, palette::PURPLE),
        Transform2D::at(centered_x(both_str, 28.0), 26.0),
    )?;
    s.show(&[both_title], EnterKind::Write, 1.0);

    let x_curve_final = s.spawn(
        slices,
        "x_curve_final",
        Asset::Line3(Line3Asset {
            polylines: vec![space::slice_along_x(field, 0.0, [-2.5, 2.5], 61, SCALE)],
            width_px: 6.0,
            color_rgba8: palette::YELLOW,
        }),
        Transform2D::default(),
    )?;
    s.show(&[x_curve_final], EnterKind::Create, 1.0);
    s.wait(1.0);

    let formula_lines: [(&str, f32, [u8; 4]); 4] = [
        ("f(x, 0) = x²", 28.0, palette::YELLOW),
        ("(minimum along x)", 20.0, palette::YELLOW),
        ("f(0, y) = -y²", 28.0, palette::GREEN),
        ("(maximum along y)", 20.0, palette::GREEN),
    ];
    let mut formula_handles = Vec::new();
    for (i, (content, size, color)) in formula_lines.iter().enumerate() {
        formula_handles.push(s.spawn(
            formulas,
            format!("formula{i}"),
            text(*content, *size, *color),
            Transform2D::default(),
        )?);
    }
    s.play(1.0, |p| {
        for &h in &formula_handles {
            p.enter(h, EnterKind::Write);
        }
    });
    s.wait(2.0);

    // Rotate to appreciate the shape.
    s.hide(&[both_title], 0.5);
    let rotate_str = "The Saddle / Pringles Chip Shape";
    let rotate_title = s.spawn(
        hud,
        "rotate_title",
        text(rotate_str, 30.0, palette::PURPLE),
        Transform2D::at(centered_x(rotate_str, 30.0), 26.0),
    )?;
    s.show(&[rotate_title], EnterKind::Write, 1.0);

    s.play(8.0, |p| p.camera_orbit(1.2));
    s.wait(2.0);

    s.finish()
}
