use crate::{
    animation::ease::Ease,
    composition::model::Composition,
    foundation::core::{Transform2D, Vec2},
    foundation::error::MotionResult,
    math::descent::{DescentConfig, descent_trace},
    math::functions::Curve1,
    plot::axes::{Axes2D, line_path},
    scene::script::{EnterKind, Handle},
    scenes::{base_script, centered_x, dot, palette, text, stroke},
};

struct Variant {
    title: &'static str,
    title_color: [u8; 4],
    dot_color: [u8; 4],
    y_max: f64,
    descent: DescentConfig,
    step_secs: f64,
    pause_secs: f64,
    conclusion: [&'static str; 2],
    conclusion_color: [u8; 4],
    pulse_at_end: bool,
}

pub fn build_too_big() -> MotionResult<Composition> {
    build_variant(&Variant {
        title: "Learning Rate: Too Large",
        title_color: palette::RED,
        dot_color: palette::RED,
        y_max: 20.0,
        descent: DescentConfig {
            start: 4.0,
            learning_rate: 0.99,
            max_steps: 20,
            clamp_abs: Some(4.5),
            stop_threshold: None,
        },
        step_secs: 0.4,
        pause_secs: 0.2,
        conclusion: ["Overshoots and oscillates!", "Never converges to minimum"],
        conclusion_color: palette::RED,
        pulse_at_end: true,
    })
}

pub fn build_too_small() -> MotionResult<Composition> {
    build_variant(&Variant {
        title: "Learning Rate: Too Small",
        title_color: palette::ORANGE,
        dot_color: palette::ORANGE,
        y_max: 25.0,
        descent: DescentConfig {
            start: 4.0,
            learning_rate: 0.005,
            max_steps: 50,
            clamp_abs: None,
            stop_threshold: None,
        },
        step_secs: 0.2,
        pause_secs: 0.1,
        conclusion: [
            "Tiny steps, painfully slow!",
            "Still far from minimum after 50 iterations",
        ],
        conclusion_color: palette::ORANGE,
        pulse_at_end: false,
    })
}

pub fn build_just_right() -> MotionResult<Composition> {
    build_variant(&Variant {
        title: "Learning Rate: Just Right",
        title_color: palette::GREEN,
        dot_color: palette::GREEN,
        y_max: 25.0,
        descent: DescentConfig {
            start: 4.0,
            learning_rate: 0.1,
            max_steps: 20,
            clamp_abs: None,
            stop_threshold: Some(0.05),
        },
        step_secs: 0.3,
        pause_secs: 0.15,
        conclusion: ["Smooth convergence!", "Reaches minimum efficiently"],
        conclusion_color: palette::GREEN,
        pulse_at_end: false,
    })
}

fn build_variant(v: &Variant) -> MotionResult<Composition> {
    let mut s = base_script(3);
    let plot = s.track("plot", 0);
    let steps = s.track("steps", 10);
    let notes = s.track("notes", 20);

    let axes = Axes2D::new([-5.0, 5.0], [0.0, v.y_max], [190.0, 140.0, 900.0, 440.0]);
    let loss = Curve1::quadratic(0.0, 0.0, 1.0); // L(w) = w^2

    let title = s.spawn(
        notes,
        "title",
        text(v.title, 40.0, v.title_color),
        Transform2D::at(centered_x(v.title, 40.0), 26.0),
    )?;
    s.show(&[title], EnterKind::Write, 1.0);
    s.wait(1.0);

    // Loss surface.
    let frame = s.spawn(
        plot,
        "axes",
        stroke(&axes.frame_path(1.0, 5.0, 5.0), 2.0, palette::WHITE),
        Transform2D::default(),
    )?;
    let w_label = s.spawn(
        plot,
        "w_label",
        text("w", 28.0, palette::WHITE),
        Transform2D::at(axes.x_to_px(5.0) + 14.0, axes.y_to_px(0.0) - 14.0),
    )?;
    let l_label = s.spawn(
        plot,
        "l_label",
        text("L", 28.0, palette::WHITE),
        Transform2D::at(axes.x_to_px(0.0) - 34.0, axes.y_to_px(v.y_max) - 6.0),
    )?;
    s.play(1.0, |p| {
        p.enter(frame, EnterKind::Create);
        p.enter(w_label, EnterKind::Write);
        p.enter(l_label, EnterKind::Write);
    });

    let graph = s.spawn(
        plot,
        "graph",
        stroke(&axes.plot(&loss, [-4.5, 4.5], 91), 3.0, palette::BLUE),
        Transform2D::default(),
    )?;
    s.show(&[graph], EnterKind::Create, 1.0);

    let min_dot = s.spawn(
        plot,
        "min_dot",
        dot(8.0, palette::GREEN),
        Transform2D::at(axes.x_to_px(0.0), axes.y_to_px(0.0)),
    )?;
    let min_label = s.spawn(
        plot,
        "min_label",
        text("Minimum", 24.0, palette::GREEN),
        Transform2D::at(axes.x_to_px(0.0) - 50.0, axes.y_to_px(0.0) + 16.0),
    )?;
    s.play(0.7, |p| {
        p.enter(min_dot, EnterKind::FadeIn);
        p.enter(min_label, EnterKind::Write);
    });
    s.wait(1.0);

    // The descent itself, one dot and one step segment per iteration.
    let trace = descent_trace(v.descent);
    let mut dots: Vec<(Handle, Vec2)> = Vec::with_capacity(trace.len());

    let start_at = axes.to_px(trace[0].w, trace[0].loss);
    let start_dot = s.spawn(
        steps,
        "step_dot0",
        dot(7.0, v.dot_color),
        Transform2D::at(start_at.x, start_at.y),
    )?;
    s.show(&[start_dot], EnterKind::FadeIn, 0.4);
    dots.push((start_dot, start_at.to_vec2()));

    for (i, pair) in trace.windows(2).enumerate() {
        let from = axes.to_px(pair[0].w, pair[0].loss);
        let to = axes.to_px(pair[1].w, pair[1].loss);

        let seg = s.spawn(
            steps,
            format!("step_seg{i}"),
            stroke(&line_path(from, to), 2.0, palette::YELLOW),
            Transform2D::default(),
        )?;
        let step_dot = s.spawn(
            steps,
            format!("step_dot{}", i + 1),
            dot(5.5, v.dot_color),
            Transform2D::at(to.x, to.y),
        )?;
        s.play(v.step_secs, |p| {
            p.enter(seg, EnterKind::Create);
            p.enter(step_dot, EnterKind::FadeIn);
        });
        dots.push((step_dot, to.to_vec2()));
        s.wait(v.pause_secs);
    }

    // Conclusion in the upper-right corner.
    let line0 = s.spawn(
        notes,
        "conclusion0",
        text(v.conclusion[0], 26.0, v.conclusion_color),
        Transform2D::at(850.0, 120.0),
    )?;
    let line1 = s.spawn(
        notes,
        "conclusion1",
        text(v.conclusion[1], 22.0, v.conclusion_color),
        Transform2D::at(850.0, 154.0),
    )?;
    s.play(1.0, |p| {
        p.enter(line0, EnterKind::Write);
        p.enter(line1, EnterKind::Write);
    });
    s.wait(3.0);

    if v.pulse_at_end {
        // Highlight the bouncing pattern by pulsing every dot. Dots are circle
        // paths centered on their local origin, so scaling keeps them in place.
        s.play(0.5, |p| {
            for &(d, at) in &dots {
                p.tween(d, pulse(at, 1.5), Ease::InOutQuad);
            }
        });
        s.play(0.5, |p| {
            for &(d, at) in &dots {
                p.tween(d, pulse(at, 1.0), Ease::InOutQuad);
            }
        });
        s.wait(2.0);
    }

    s.finish()
}

fn pulse(at: Vec2, factor: f64) -> Transform2D {
    Transform2D {
        translate: at,
        scale: Vec2::new(factor, factor),
        ..Transform2D::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clips_of<'a>(comp: &'a Composition, prefix: &str) -> Vec<&'a crate::composition::model::Clip> {
        comp.tracks
            .iter()
            .flat_map(|t| &t.clips)
            .filter(|c| c.asset.starts_with(prefix))
            .collect()
    }

    #[test]
    fn too_big_shows_all_twenty_steps() {
        let comp = build_too_big().unwrap();
        assert_eq!(clips_of(&comp, "step_seg").len(), 20);
        assert_eq!(clips_of(&comp, "step_dot").len(), 21);
    }

    #[test]
    fn too_small_shows_fifty_steps() {
        let comp = build_too_small().unwrap();
        assert_eq!(clips_of(&comp, "step_seg").len(), 50);
    }

    #[test]
    fn just_right_stops_early() {
        let comp = build_just_right().unwrap();
        let segs = clips_of(&comp, "step_seg").len();
        assert!(segs > 5 && segs < 20);
    }

    #[test]
    fn steps_appear_in_timeline_order() {
        let comp = build_too_big().unwrap();
        let segs = clips_of(&comp, "step_seg");
        for pair in segs.windows(2) {
            assert!(pair[0].range.start.0 < pair[1].range.start.0);
        }
    }
}
