use kurbo::Rect;

use crate::{
    animation::ease::Ease,
    composition::model::Composition,
    effects::transitions::GrowFrom,
    foundation::core::{Transform2D, Vec2},
    foundation::error::MotionResult,
    plot::axes::rect_path,
    scene::script::EnterKind,
    scenes::{base_script, centered_x, fill, palette, stroke, text},
};

/// Geometric proof that d(x^2)/dx = 2x: grow the square by dx on two sides and
/// watch the dx^2 corner vanish.
pub fn build() -> MotionResult<Composition> {
    let mut s = base_script(2);
    let shapes = s.track("shapes", 0);
    let labels = s.track("labels", 10);

    // Square of side `x`, centered a little left of the canvas middle.
    let side = 300.0;
    let dx = 22.0;
    let sq = Rect::new(470.0, 190.0, 470.0 + side, 190.0 + side);

    let title_str = "Why x² becomes 2x";
    let title = s.spawn(
        labels,
        "title",
        text(title_str, 44.0, palette::WHITE),
        Transform2D::at(centered_x(title_str, 44.0), 26.0),
    )?;
    s.show(&[title], EnterKind::Write, 1.0);
    s.wait(1.0);

    // Original square with side labels and its area.
    let square = s.spawn(
        shapes,
        "square",
        fill(&rect_path(sq), palette::with_alpha(palette::YELLOW, 178)),
        Transform2D::default(),
    )?;
    let side_left = s.spawn(
        labels,
        "side_left",
        text("x", 34.0, palette::WHITE),
        Transform2D::at(sq.x0 - 36.0, sq.center().y - 20.0),
    )?;
    let side_bottom = s.spawn(
        labels,
        "side_bottom",
        text("x", 34.0, palette::WHITE),
        Transform2D::at(sq.center().x - 8.0, sq.y1 + 12.0),
    )?;
    let area = s.spawn(
        labels,
        "area",
        text("x²", 38.0, palette::YELLOW),
        Transform2D::at(sq.center().x - 18.0, sq.center().y - 24.0),
    )?;
    s.play(1.0, |p| {
        p.enter(square, EnterKind::Create);
        p.enter(side_left, EnterKind::Write);
        p.enter(side_bottom, EnterKind::Write);
        p.enter(area, EnterKind::Write);
    });
    s.wait(1.0);

    // Two x*dx strips and the dx^2 corner.
    let right_strip = s.spawn(
        shapes,
        "right_strip",
        fill(
            &rect_path(Rect::new(sq.x1, sq.y0, sq.x1 + dx, sq.y1)),
            palette::with_alpha(palette::BLUE, 178),
        ),
        Transform2D::default(),
    )?;
    let top_strip = s.spawn(
        shapes,
        "top_strip",
        fill(
            &rect_path(Rect::new(sq.x0, sq.y0 - dx, sq.x1, sq.y0)),
            palette::with_alpha(palette::BLUE, 178),
        ),
        Transform2D::default(),
    )?;
    let corner = s.spawn(
        shapes,
        "corner",
        fill(
            &rect_path(Rect::new(sq.x1, sq.y0 - dx, sq.x1 + dx, sq.y0)),
            palette::with_alpha(palette::RED, 204),
        ),
        Transform2D::default(),
    )?;
    let dx_right = s.spawn(
        labels,
        "dx_right",
        text("dx", 28.0, palette::BLUE),
        Transform2D::at(sq.x1 + dx + 10.0, sq.center().y - 16.0),
    )?;
    let dx_top = s.spawn(
        labels,
        "dx_top",
        text("dx", 28.0, palette::BLUE),
        Transform2D::at(sq.center().x - 14.0, sq.y0 - dx - 34.0),
    )?;
    s.play(2.0, |p| {
        p.enter(right_strip, EnterKind::Grow(GrowFrom::Left));
        p.enter(top_strip, EnterKind::Grow(GrowFrom::Bottom));
        p.enter(corner, EnterKind::Grow(GrowFrom::Center));
        p.enter(dx_right, EnterKind::Write);
        p.enter(dx_top, EnterKind::Write);
    });

    let right_label = s.spawn(
        labels,
        "right_label",
        text("x·dx", 24.0, palette::WHITE),
        Transform2D {
            rotation_rad: -std::f64::consts::FRAC_PI_2,
            ..Transform2D::at(sq.x1 + dx * 0.5 + 8.0, sq.center().y + 30.0)
        },
    )?;
    let top_label = s.spawn(
        labels,
        "top_label",
        text("x·dx", 24.0, palette::WHITE),
        Transform2D::at(sq.center().x - 26.0, sq.y0 - dx - 4.0),
    )?;
    let corner_label = s.spawn(
        labels,
        "corner_label",
        text("dx²", 22.0, palette::WHITE),
        Transform2D::at(sq.x1 + 1.0, sq.y0 - dx - 2.0),
    )?;
    s.play(1.0, |p| {
        p.enter(right_label, EnterKind::Write);
        p.enter(top_label, EnterKind::Write);
        p.enter(corner_label, EnterKind::Write);
    });
    s.wait(2.0);

    // Expanded binomial.
    let formula_str = "(x+dx)² = x² + 2x·dx + dx²";
    let formula = s.spawn(
        labels,
        "formula",
        text(formula_str, 34.0, palette::WHITE),
        Transform2D::at(centered_x(formula_str, 34.0), 640.0),
    )?;
    s.show(&[formula], EnterKind::Write, 1.0);
    s.wait(2.0);

    // The corner shrinks away.
    let vanish = s.spawn(
        labels,
        "vanish",
        text("dx² → 0", 28.0, palette::RED),
        Transform2D::at(sq.x1 + dx + 44.0, sq.y0 - dx - 8.0),
    )?;
    s.show(&[vanish], EnterKind::Write, 1.0);
    s.play(1.5, |p| {
        let corner_center = Vec2::new(sq.x1 + dx * 0.5, sq.y0 - dx * 0.5);
        p.tween(
            corner,
            Transform2D {
                scale: Vec2::new(0.2, 0.2),
                anchor: corner_center,
                ..Transform2D::default()
            },
            Ease::InOutQuad,
        );
        p.opacity(corner, 0.2);
        p.opacity(corner_label, 0.3);
    });
    s.hide(&[corner, corner_label, vanish], 0.7);
    s.wait(1.0);

    s.hide(&[formula], 0.7);

    // Final result with a surrounding box; the strips brighten.
    let result_str = "d(x²)/dx = 2x·dx/dx = 2x";
    let result_x = centered_x(result_str, 38.0);
    let result = s.spawn(
        labels,
        "result",
        text(result_str, 38.0, palette::GREEN),
        Transform2D::at(result_x, 636.0),
    )?;
    s.show(&[result], EnterKind::Write, 1.0);

    let box_w = crate::scenes::approx_text_width(result_str, 38.0);
    let result_box = s.spawn(
        labels,
        "result_box",
        stroke(
            &rect_path(Rect::new(
                result_x - 14.0,
                622.0,
                result_x + box_w + 14.0,
                690.0,
            )),
            3.0,
            palette::GREEN,
        ),
        Transform2D::default(),
    )?;
    s.show(&[result_box], EnterKind::Create, 1.0);

    s.play(1.0, |p| {
        p.opacity(right_strip, 1.0);
        p.opacity(top_strip, 1.0);
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
    fn corner_leaves_before_the_result_appears() {
        let comp = build().unwrap();
        let corner = comp
            .tracks
            .iter()
            .flat_map(|t| &t.clips)
            .find(|c| c.asset == "corner")
            .unwrap();
        let result = comp
            .tracks
            .iter()
            .flat_map(|t| &t.clips)
            .find(|c| c.asset == "result")
            .unwrap();
        assert!(corner.range.end.0 <= result.range.start.0);
    }

    #[test]
    fn strips_grow_from_their_attached_edges() {
        let comp = build().unwrap();
        let right = comp
            .tracks
            .iter()
            .flat_map(|t| &t.clips)
            .find(|c| c.asset == "right_strip")
            .unwrap();
        let tr = right.transition_in.as_ref().unwrap();
        assert_eq!(tr.kind, "grow");
        assert_eq!(tr.params["from"], "left");

        // Mid-growth frames evaluate cleanly.
        let mid = right.range.start.0 + 10;
        Evaluator::eval_frame(&comp, FrameIndex(mid)).unwrap();
    }
}
