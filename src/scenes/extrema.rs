use crate::{
    composition::model::{Composition, Edges, LayoutAlignX, LayoutAlignY},
    foundation::core::Transform2D,
    foundation::error::MotionResult,
    math::functions::Curve1,
    plot::axes::Axes2D,
    scenes::{base_script, centered_x, dot, palette, stroke, text},
};

struct Bowl {
    title: &'static str,
    title_color: [u8; 4],
    subtitle: &'static str,
    subtitle_color: [u8; 4],
    curve: Curve1,
    curve_color: [u8; 4],
    y_range: [f64; 2],
    point_color: [u8; 4],
    point_label_below: bool,
    formulas: [(&'static str, f32, [u8; 4]); 4],
}

/// Still frame: minimum of 2 + x^2.
pub fn build_up() -> MotionResult<Composition> {
    build_bowl(&Bowl {
        title: "f(x) = 2 + x²",
        title_color: palette::BLUE,
        subtitle: "Minimum at x = 0",
        subtitle_color: palette::GREEN,
        curve: Curve1::quadratic(2.0, 0.0, 1.0),
        curve_color: palette::BLUE,
        y_range: [0.0, 12.0],
        point_color: palette::RED,
        point_label_below: true,
        formulas: [
            ("f(x) = 2 + x²", 28.0, palette::BLUE),
            ("f'(x) = 2x", 24.0, palette::WHITE),
            ("f''(x) = 2 > 0", 24.0, palette::GREEN),
            ("Concave up: Minimum", 20.0, palette::GREEN),
        ],
    })
}

/// Still frame: maximum of 2 - x^2.
pub fn build_down() -> MotionResult<Composition> {
    build_bowl(&Bowl {
        title: "f(x) = 2 - x²",
        title_color: palette::RED,
        subtitle: "Maximum at x = 0",
        subtitle_color: palette::ORANGE,
        curve: Curve1::quadratic(2.0, 0.0, -1.0),
        curve_color: palette::RED,
        y_range: [-8.0, 4.0],
        point_color: palette::YELLOW,
        point_label_below: false,
        formulas: [
            ("f(x) = 2 - x²", 28.0, palette::RED),
            ("f'(x) = -2x", 24.0, palette::WHITE),
            ("f''(x) = -2 < 0", 24.0, palette::ORANGE),
            ("Concave down: Maximum", 20.0, palette::ORANGE),
        ],
    })
}

fn build_bowl(bowl: &Bowl) -> MotionResult<Composition> {
    let mut s = base_script(7);
    let plot = s.track("plot", 0);
    let notes = s.track("notes", 10);
    let formulas = s.vstack_track(
        "formulas",
        20,
        8.0,
        Edges {
            right: 70.0,
            top: 130.0,
            ..Edges::default()
        },
        LayoutAlignX::End,
        LayoutAlignY::Start,
    );

    let axes = Axes2D::new([-3.0, 3.0], bowl.y_range, [240.0, 120.0, 800.0, 440.0]);

    // Everything is on screen from the first frame; the scene is a held still.
    let title = s.add_now(
        notes,
        "title",
        text(bowl.title, 40.0, bowl.title_color),
        Transform2D::at(centered_x(bowl.title, 40.0), 606.0),
    )?;
    let subtitle = s.add_now(
        notes,
        "subtitle",
        text(bowl.subtitle, 28.0, bowl.subtitle_color),
        Transform2D::at(centered_x(bowl.subtitle, 28.0), 656.0),
    )?;

    let frame = s.add_now(
        plot,
        "axes",
        stroke(&axes.frame_path(1.0, 2.0, 5.0), 2.0, palette::WHITE),
        Transform2D::default(),
    )?;
    let x_label = s.add_now(
        plot,
        "x_label",
        text("x", 26.0, palette::WHITE),
        Transform2D::at(axes.x_to_px(3.0) + 16.0, axes.y_to_px(0.0f64.clamp(bowl.y_range[0], bowl.y_range[1])) - 12.0),
    )?;
    let y_label = s.add_now(
        plot,
        "y_label",
        text("f(x)", 26.0, palette::WHITE),
        Transform2D::at(axes.x_to_px(0.0) + 14.0, axes.rect_px[1] - 12.0),
    )?;

    let graph = s.add_now(
        plot,
        "graph",
        stroke(
            &axes.plot(&bowl.curve, [-2.5, 2.5], 101),
            4.0,
            bowl.curve_color,
        ),
        Transform2D::default(),
    )?;

    // Critical point at (0, 2).
    let critical = s.add_now(
        plot,
        "critical",
        dot(8.0, bowl.point_color),
        Transform2D::at(axes.x_to_px(0.0), axes.y_to_px(2.0)),
    )?;
    let label_y = if bowl.point_label_below {
        axes.y_to_px(2.0) + 18.0
    } else {
        axes.y_to_px(2.0) - 44.0
    };
    let point_label = s.add_now(
        plot,
        "point_label",
        text("(0, 2)", 24.0, bowl.point_color),
        Transform2D::at(axes.x_to_px(0.0) - 30.0, label_y),
    )?;

    for (i, (content, size, color)) in bowl.formulas.iter().enumerate() {
        s.add_now(
            formulas,
            format!("formula{i}"),
            text(*content, *size, *color),
            Transform2D::default(),
        )?;
    }

    let _ = (title, subtitle, frame, x_label, y_label, graph, critical, point_label);

    // Hold the still for a few seconds of output video.
    s.wait(4.0);
    s.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::evaluator::Evaluator;
    use crate::foundation::core::FrameIndex;

    #[test]
    fn stills_are_fully_populated_from_frame_zero() {
        for build in [build_up, build_down] {
            let comp = build().unwrap();
            let g = Evaluator::eval_frame(&comp, FrameIndex(0)).unwrap();
            // Axes, labels, graph, point, point label, title, subtitle, 4 formulas.
            assert_eq!(g.nodes.len(), 12);
            for n in &g.nodes {
                assert!(n.enter.is_none());
            }
        }
    }

    #[test]
    fn critical_point_sits_at_two() {
        let comp = build_up().unwrap();
        let crate::composition::model::Asset::Path(_) = &comp.assets["critical"] else {
            panic!("expected path dot");
        };
        // The curve evaluates to 2 at the critical point for both bowls.
        assert_eq!(Curve1::quadratic(2.0, 0.0, 1.0).eval(0.0), 2.0);
        assert_eq!(Curve1::quadratic(2.0, 0.0, -1.0).eval(0.0), 2.0);
    }
}
