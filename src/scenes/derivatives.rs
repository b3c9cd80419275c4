use std::f64::consts::FRAC_PI_2;

use crate::{
    composition::model::{Asset, Composition, Edges, LayoutAlignX, LayoutAlignY, TangentAsset, TangentLabel},
    foundation::core::Transform2D,
    foundation::error::MotionResult,
    math::calculus::tangent_segment,
    math::functions::Curve1,
    plot::axes::{Axes2D, line_path},
    scene::script::EnterKind,
    scenes::{FONT, base_script, centered_x, dot, palette, stroke, text},
};

/// A driving trip's distance-vs-time profile: fast start, traffic in the
/// middle, medium speed at the end.
fn distance_curve() -> Curve1 {
    Curve1::Polyline {
        points: vec![[0.0, 0.0], [20.0, 24.0], [40.0, 30.0], [60.0, 50.0]],
    }
}

pub fn build() -> MotionResult<Composition> {
    let mut s = base_script(1);
    let plot = s.track("plot", 0);
    let notes = s.track("notes", 10);
    let summary = s.vstack_track(
        "summary",
        20,
        10.0,
        Edges {
            left: 760.0,
            top: 240.0,
            ..Edges::default()
        },
        LayoutAlignX::Start,
        LayoutAlignY::Start,
    );

    let axes = Axes2D::new([0.0, 60.0], [0.0, 50.0], [190.0, 150.0, 900.0, 440.0]);
    let curve = distance_curve();

    // Title.
    let title_str = "Understanding Derivatives";
    let title = s.spawn(
        notes,
        "title",
        text(title_str, 40.0, palette::WHITE),
        Transform2D::at(centered_x(title_str, 40.0), 26.0),
    )?;
    s.show(&[title], EnterKind::Write, 1.0);
    s.wait(1.0);

    // Axes with labels.
    let frame = s.spawn(
        plot,
        "axes",
        stroke(&axes.frame_path(10.0, 10.0, 5.0), 2.0, palette::WHITE),
        Transform2D::default(),
    )?;
    let x_label = s.spawn(
        plot,
        "x_label",
        text("Time (minutes)", 26.0, palette::WHITE),
        Transform2D::at(560.0, 614.0),
    )?;
    let y_label = s.spawn(
        plot,
        "y_label",
        text("Distance (km)", 26.0, palette::WHITE),
        Transform2D {
            rotation_rad: -FRAC_PI_2,
            ..Transform2D::at(120.0, 480.0)
        },
    )?;
    s.play(1.0, |p| {
        p.enter(frame, EnterKind::Create);
        p.enter(x_label, EnterKind::Write);
        p.enter(y_label, EnterKind::Write);
    });
    s.wait(1.0);

    // The trip curve.
    let graph = s.spawn(
        plot,
        "graph",
        stroke(&axes.plot(&curve, [0.0, 60.0], 121), 4.0, palette::BLUE),
        Transform2D::default(),
    )?;
    s.show(&[graph], EnterKind::Create, 1.0);
    s.wait(2.0);

    // Probe point at t = 30 and the tangent there.
    let t_point = 30.0;
    let probe = s.spawn(
        plot,
        "probe",
        dot(7.0, palette::RED),
        Transform2D::at(
            axes.x_to_px(t_point),
            axes.y_to_px(curve.eval(t_point)),
        ),
    )?;
    s.show(&[probe], EnterKind::FadeIn, 0.5);
    s.wait(1.0);

    let (tl, tr) = tangent_segment(&curve, t_point, 0.1, 15.0, 0.0, 60.0);
    let static_tangent = s.spawn(
        plot,
        "static_tangent",
        stroke(
            &line_path(axes.to_px(tl[0], tl[1]), axes.to_px(tr[0], tr[1])),
            3.0,
            palette::RED,
        ),
        Transform2D::default(),
    )?;
    s.show(&[static_tangent], EnterKind::Create, 1.0);
    s.wait(1.0);

    // Rise/run triangle at the probe point.
    let base = 10.0;
    let slope = crate::math::calculus::central_difference(&curve, t_point, 0.1);
    let p0 = axes.to_px(t_point, curve.eval(t_point));
    let p1 = axes.to_px(t_point + base, curve.eval(t_point));
    let p2 = axes.to_px(t_point + base, curve.eval(t_point) + slope * base);

    let run_edge = s.spawn(
        notes,
        "run_edge",
        stroke(&line_path(p0, p1), 2.0, palette::ORANGE),
        Transform2D::default(),
    )?;
    let rise_edge = s.spawn(
        notes,
        "rise_edge",
        stroke(&line_path(p1, p2), 2.0, palette::ORANGE),
        Transform2D::default(),
    )?;
    let dt_label = s.spawn(
        notes,
        "dt_label",
        text("dt", 22.0, palette::ORANGE),
        Transform2D::at((p0.x + p1.x) * 0.5 - 10.0, p1.y + 8.0),
    )?;
    let dx_label = s.spawn(
        notes,
        "dx_label",
        text("dx", 22.0, palette::ORANGE),
        Transform2D::at(p1.x + 10.0, (p1.y + p2.y) * 0.5 - 10.0),
    )?;
    s.play(1.0, |p| {
        p.enter(run_edge, EnterKind::Create);
        p.enter(rise_edge, EnterKind::Create);
        p.enter(dt_label, EnterKind::Write);
        p.enter(dx_label, EnterKind::Write);
    });
    s.wait(1.0);

    let slope_label = s.spawn(
        notes,
        "slope_label",
        text("slope = dx/dt", 24.0, palette::RED),
        Transform2D::at(p2.x - 40.0, p2.y - 36.0),
    )?;
    s.show(&[slope_label], EnterKind::Write, 1.0);
    s.wait(2.0);

    s.hide(
        &[
            run_edge,
            rise_edge,
            dt_label,
            dx_label,
            slope_label,
            static_tangent,
            probe,
        ],
        1.0,
    );

    // Slide the tangent along the whole curve with a live speed readout.
    let slide_str = "Derivative: the tangent line along the curve";
    let slide_text = s.spawn(
        notes,
        "slide_text",
        text(slide_str, 30.0, palette::PURPLE),
        Transform2D::at(centered_x(slide_str, 30.0), 84.0),
    )?;
    s.show(&[slide_text], EnterKind::Write, 1.0);

    let tangent = s.spawn(
        plot,
        "tangent",
        Asset::Tangent(TangentAsset {
            curve: distance_curve(),
            axes,
            dt: 0.1,
            half_len: 15.0,
            width_px: 3.0,
            dot_radius_px: 6.0,
            color_rgba8: palette::RED,
            label: Some(TangentLabel {
                prefix: "Speed: ".to_string(),
                suffix: " km/h".to_string(),
                decimals: 0,
                value_scale: 60.0,
                font_source: FONT.to_string(),
                size_px: 22.0,
                offset_px: [18.0, -34.0],
                color_rgba8: palette::RED,
            }),
        }),
        Transform2D::default(),
    )?;
    s.show(&[tangent], EnterKind::Appear, 0.1);
    s.play(8.0, |p| p.param(tangent, 5.0, 55.0));
    s.wait(2.0);

    s.hide(&[tangent, slide_text], 1.0);

    // Closing summary.
    let lines: [(&str, f32, [u8; 4]); 5] = [
        ("The derivative reveals:", 30.0, palette::YELLOW),
        ("Rate of change at every moment", 26.0, palette::WHITE),
        ("Steep slope = Fast speed", 24.0, palette::GREEN),
        ("Gentle slope = Slow speed", 24.0, palette::BLUE),
        ("Flat slope = Stopped", 24.0, palette::RED),
    ];
    let mut handles = Vec::new();
    for (i, (content, size, color)) in lines.iter().enumerate() {
        handles.push(s.spawn(
            summary,
            format!("summary{i}"),
            text(*content, *size, *color),
            Transform2D::default(),
        )?);
    }
    s.play(1.5, |p| {
        for &h in &handles {
            p.enter(h, EnterKind::Write);
        }
    });
    s.wait(3.0);

    s.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::evaluator::Evaluator;
    use crate::foundation::core::FrameIndex;

    #[test]
    fn tangent_clip_covers_the_slide_window() {
        let comp = build().unwrap();
        let clip = comp
            .tracks
            .iter()
            .flat_map(|t| &t.clips)
            .find(|c| c.asset == "tangent")
            .unwrap();
        // Eight seconds of slide plus the settle and fade.
        assert!(clip.range.len_frames() >= 8 * 30);
    }

    #[test]
    fn evaluates_at_landmark_frames() {
        let comp = build().unwrap();
        for frame in [0, comp.duration.0 / 2, comp.duration.0 - 1] {
            let g = Evaluator::eval_frame(&comp, FrameIndex(frame)).unwrap();
            assert!(!g.nodes.is_empty());
        }
    }
}
