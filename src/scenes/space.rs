//! Shared world-space geometry helpers for the 3D scenes.

use crate::composition::model::Line3Asset;
use crate::math::functions::Field2;

pub(crate) fn scaled(p: [f64; 3], s: [f64; 3]) -> [f64; 3] {
    [p[0] * s[0], p[1] * s[1], p[2] * s[2]]
}

/// The three coordinate axes as one stroked bundle.
pub(crate) fn axes3(
    x_range: [f64; 2],
    y_range: [f64; 2],
    z_range: [f64; 2],
    scale: [f64; 3],
    width_px: f64,
    color: [u8; 4],
) -> Line3Asset {
    Line3Asset {
        polylines: vec![
            vec![
                scaled([x_range[0], 0.0, 0.0], scale),
                scaled([x_range[1], 0.0, 0.0], scale),
            ],
            vec![
                scaled([0.0, y_range[0], 0.0], scale),
                scaled([0.0, y_range[1], 0.0], scale),
            ],
            vec![
                scaled([0.0, 0.0, z_range[0]], scale),
                scaled([0.0, 0.0, z_range[1]], scale),
            ],
        ],
        width_px,
        color_rgba8: color,
    }
}

/// Surface slice at fixed y: the curve (t, y0, f(t, y0)).
pub(crate) fn slice_along_x(
    field: Field2,
    y_fixed: f64,
    x_range: [f64; 2],
    samples: usize,
    scale: [f64; 3],
) -> Vec<[f64; 3]> {
    sample_curve(samples, x_range, |t| {
        scaled([t, y_fixed, field.eval(t, y_fixed)], scale)
    })
}

/// Surface slice at fixed x: the curve (x0, t, f(x0, t)).
pub(crate) fn slice_along_y(
    field: Field2,
    x_fixed: f64,
    y_range: [f64; 2],
    samples: usize,
    scale: [f64; 3],
) -> Vec<[f64; 3]> {
    sample_curve(samples, y_range, |t| {
        scaled([x_fixed, t, field.eval(x_fixed, t)], scale)
    })
}

fn sample_curve(samples: usize, range: [f64; 2], f: impl Fn(f64) -> [f64; 3]) -> Vec<[f64; 3]> {
    let n = samples.max(2);
    (0..n)
        .map(|i| {
            let t = range[0] + (range[1] - range[0]) * (i as f64 / (n - 1) as f64);
            f(t)
        })
        .collect()
}

/// Gridded wall in the plane y = y_fixed: verticals at unit x steps and
/// horizontals at `z_step` height steps.
pub(crate) fn wall_grid_at_y(
    y_fixed: f64,
    x_range: [f64; 2],
    z_range: [f64; 2],
    z_step: f64,
    scale: [f64; 3],
    width_px: f64,
    color: [u8; 4],
) -> Line3Asset {
    let mut polylines = Vec::new();
    let mut x = x_range[0];
    while x <= x_range[1] + 1e-9 {
        polylines.push(vec![
            scaled([x, y_fixed, z_range[0]], scale),
            scaled([x, y_fixed, z_range[1]], scale),
        ]);
        x += 1.0;
    }
    let mut z = z_range[0];
    while z <= z_range[1] + 1e-9 {
        polylines.push(vec![
            scaled([x_range[0], y_fixed, z], scale),
            scaled([x_range[1], y_fixed, z], scale),
        ]);
        z += z_step;
    }
    Line3Asset {
        polylines,
        width_px,
        color_rgba8: color,
    }
}

/// Gridded wall in the plane x = x_fixed.
pub(crate) fn wall_grid_at_x(
    x_fixed: f64,
    y_range: [f64; 2],
    z_range: [f64; 2],
    z_step: f64,
    scale: [f64; 3],
    width_px: f64,
    color: [u8; 4],
) -> Line3Asset {
    let mut polylines = Vec::new();
    let mut y = y_range[0];
    while y <= y_range[1] + 1e-9 {
        polylines.push(vec![
            scaled([x_fixed, y, z_range[0]], scale),
            scaled([x_fixed, y, z_range[1]], scale),
        ]);
        y += 1.0;
    }
    let mut z = z_range[0];
    while z <= z_range[1] + 1e-9 {
        polylines.push(vec![
            scaled([x_fixed, y_range[0], z], scale),
            scaled([x_fixed, y_range[1], z], scale),
        ]);
        z += z_step;
    }
    Line3Asset {
        polylines,
        width_px,
        color_rgba8: color,
    }
}
