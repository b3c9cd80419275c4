use crate::{
    composition::model::{
        Asset, Composition, CounterAsset, HistogramAsset, PolylineAsset, ValueMap,
    },
    foundation::core::Transform2D,
    foundation::error::MotionResult,
    math::stats::{dice_sample_means, running_averages},
    plot::axes::{Axes2D, dashed_line_path, line_path},
    scene::script::EnterKind,
    scenes::{FONT, base_script, centered_x, palette, stroke, text},
};

const NUM_SAMPLES: usize = 300;
const DICE_PER_SAMPLE: usize = 20;
const EXPECTED: f64 = 3.5;
const SEED: u64 = 123;

pub fn build() -> MotionResult<Composition> {
    let mut s = base_script(SEED);
    let frame_track = s.track("frames", 0);
    let data_track = s.track("data", 10);
    let notes = s.track("notes", 20);

    // Left panel: running average; right panel: histogram of sample means.
    let lln_axes = Axes2D::new([0.0, 300.0], [2.8, 4.2], [90.0, 190.0, 500.0, 360.0]);
    let clt_axes = Axes2D::new([2.8, 4.2], [0.0, 20.0], [700.0, 190.0, 500.0, 360.0]);

    // Deterministic simulation, baked at build time.
    let means = dice_sample_means(SEED, NUM_SAMPLES, DICE_PER_SAMPLE);
    let running = running_averages(&means);

    let title_str = "Law of Large Numbers vs Central Limit Theorem";
    let title = s.spawn(
        notes,
        "title",
        text(title_str, 34.0, palette::WHITE),
        Transform2D::at(centered_x(title_str, 34.0), 26.0),
    )?;
    s.show(&[title], EnterKind::Write, 1.0);
    s.wait(1.0);

    let divider = s.spawn(
        frame_track,
        "divider",
        stroke(
            &line_path(
                kurbo::Point::new(640.0, 110.0),
                kurbo::Point::new(640.0, 680.0),
            ),
            2.0,
            palette::WHITE,
        ),
        Transform2D::default(),
    )?;
    s.show(&[divider], EnterKind::Create, 0.7);
    s.wait(1.0);

    // Left: axes, labels, the expected-value line.
    let lln_frame = s.spawn(
        frame_track,
        "lln_axes",
        stroke(&lln_axes.frame_path(20.0, 0.4, 4.0), 2.0, palette::WHITE),
        Transform2D::default(),
    )?;
    let lln_x_label = s.spawn(
        notes,
        "lln_x_label",
        text("Number of Samples", 20.0, palette::WHITE),
        Transform2D::at(250.0, 580.0),
    )?;
    let lln_y_label = s.spawn(
        notes,
        "lln_y_label",
        text("Running Average", 20.0, palette::WHITE),
        Transform2D {
            rotation_rad: -std::f64::consts::FRAC_PI_2,
            ..Transform2D::at(48.0, 470.0)
        },
    )?;
    s.play(1.0, |p| {
        p.enter(lln_frame, EnterKind::Create);
        p.enter(lln_x_label, EnterKind::Write);
        p.enter(lln_y_label, EnterKind::Write);
    });

    let expected_line = s.spawn(
        frame_track,
        "expected_line",
        stroke(
            &dashed_line_path(
                lln_axes.to_px(0.0, EXPECTED),
                lln_axes.to_px(300.0, EXPECTED),
                8.0,
                6.0,
            ),
            2.0,
            palette::YELLOW,
        ),
        Transform2D::default(),
    )?;
    let expected_label = s.spawn(
        notes,
        "expected_label",
        text("Expected: 3.5", 18.0, palette::YELLOW),
        Transform2D::at(
            lln_axes.x_to_px(80.0),
            lln_axes.y_to_px(EXPECTED) - 26.0,
        ),
    )?;
    s.play(1.0, |p| {
        p.enter(expected_line, EnterKind::Create);
        p.enter(expected_label, EnterKind::Write);
    });

    // Right: histogram axes.
    let clt_frame = s.spawn(
        frame_track,
        "clt_axes",
        stroke(&clt_axes.frame_path(0.2, 5.0, 4.0), 2.0, palette::WHITE),
        Transform2D::default(),
    )?;
    let clt_x_label = s.spawn(
        notes,
        "clt_x_label",
        text("Average Value", 20.0, palette::WHITE),
        Transform2D::at(880.0, 580.0),
    )?;
    let clt_y_label = s.spawn(
        notes,
        "clt_y_label",
        text("Frequency", 20.0, palette::WHITE),
        Transform2D {
            rotation_rad: -std::f64::consts::FRAC_PI_2,
            ..Transform2D::at(662.0, 440.0)
        },
    )?;
    s.play(1.0, |p| {
        p.enter(clt_frame, EnterKind::Create);
        p.enter(clt_x_label, EnterKind::Write);
        p.enter(clt_y_label, EnterKind::Write);
    });

    // The running-average trace, its live readout, and the growing histogram,
    // all driven over the same fifteen seconds.
    let points_px: Vec<[f64; 2]> = running
        .iter()
        .enumerate()
        .map(|(i, avg)| {
            let p = lln_axes.to_px(i as f64, *avg);
            [p.x, p.y]
        })
        .collect();
    let avg_line = s.spawn(
        data_track,
        "avg_line",
        Asset::Polyline(PolylineAsset {
            points_px,
            width_px: 4.0,
            color_rgba8: palette::BLUE,
        }),
        Transform2D::default(),
    )?;

    let counter = s.spawn(
        data_track,
        "counter",
        Asset::Counter(CounterAsset {
            prefix: "Current: ".to_string(),
            suffix: String::new(),
            decimals: 3,
            map: ValueMap::Series {
                values: running.clone(),
            },
            font_source: FONT.to_string(),
            size_px: 26.0,
            color_rgba8: palette::BLUE,
        }),
        Transform2D::at(200.0, 136.0),
    )?;

    let histogram = s.spawn(
        data_track,
        "histogram",
        Asset::Histogram(HistogramAsset {
            samples: means.clone(),
            bins: 12,
            range: [2.8, 4.2],
            axes: clt_axes,
            max_bar_value: 15.0,
            bar_width_frac: 0.9,
            color_rgba8: palette::with_alpha(palette::GREEN, 178),
        }),
        Transform2D::default(),
    )?;

    s.show(&[avg_line, counter, histogram], EnterKind::Appear, 0.2);
    s.play(15.0, |p| {
        p.param(avg_line, 1.0, (NUM_SAMPLES - 1) as f64);
        p.param(counter, 0.0, (NUM_SAMPLES - 1) as f64);
        p.param(histogram, 0.0, NUM_SAMPLES as f64);
    });
    s.wait(1.0);

    // Conclusions under each panel.
    let lln_conclusion = s.spawn(
        notes,
        "lln_conclusion",
        text("Converges to 3.5", 22.0, palette::BLUE),
        Transform2D::at(250.0, 630.0),
    )?;
    let clt_conclusion = s.spawn(
        notes,
        "clt_conclusion",
        text("Bell Curve!", 22.0, palette::GREEN),
        Transform2D::at(900.0, 630.0),
    )?;
    s.play(1.0, |p| {
        p.enter(lln_conclusion, EnterKind::Write);
        p.enter(clt_conclusion, EnterKind::Write);
    });
    s.wait(3.0);

    s.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::evaluator::Evaluator;
    use crate::foundation::core::FrameIndex;

    fn clip<'a>(comp: &'a Composition, asset: &str) -> &'a crate::composition::model::Clip {
        comp.tracks
            .iter()
            .flat_map(|t| &t.clips)
            .find(|c| c.asset == asset)
            .unwrap()
    }

    #[test]
    fn seeded_simulation_is_reproducible() {
        let a = build().unwrap();
        let b = build().unwrap();
        let Asset::Histogram(ha) = &a.assets["histogram"] else {
            panic!("expected histogram asset");
        };
        let Asset::Histogram(hb) = &b.assets["histogram"] else {
            panic!("expected histogram asset");
        };
        assert_eq!(ha.samples, hb.samples);
        assert_eq!(ha.samples.len(), NUM_SAMPLES);
    }

    #[test]
    fn drivers_ramp_across_fifteen_seconds() {
        let comp = build().unwrap();
        let line = clip(&comp, "avg_line");
        let start = line.range.start.0;

        // At the start of the ramp only a point or two is visible; at the end,
        // the whole trace.
        let g0 = Evaluator::eval_frame(&comp, FrameIndex(start)).unwrap();
        let n0 = g0.nodes.iter().find(|n| n.asset == "avg_line").unwrap();
        assert!(n0.param <= 1.0);

        // After the ramp the driver holds at the last sample index.
        let g1 = Evaluator::eval_frame(&comp, FrameIndex(comp.duration.0 - 1)).unwrap();
        let n1 = g1.nodes.iter().find(|n| n.asset == "avg_line").unwrap();
        assert!((n1.param - (NUM_SAMPLES - 1) as f64).abs() < 1e-9);
    }

    #[test]
    fn running_average_ends_near_expectation() {
        let comp = build().unwrap();
        let Asset::Counter(c) = &comp.assets["counter"] else {
            panic!("expected counter asset");
        };
        let ValueMap::Series { values } = &c.map else {
            panic!("expected series map");
        };
        assert!((values[values.len() - 1] - EXPECTED).abs() < 0.1);
    }
}
