use kurbo::BezPath;

use crate::{
    compile::plan::DrawOp,
    composition::model::{Arrow3Asset, Dot3Asset, Line3Asset, Mesh3Asset},
    eval::evaluator::EvaluatedClipNode,
    foundation::core::Rgba8Premul,
    plot::axes::circle_path,
    plot::camera::Projector,
};

/// Lower a checkerboard surface mesh into depth-sorted filled quads.
///
/// Quads are included in u-major sweep order up to `reveal`, then painted
/// far-to-near so nearer patches occlude farther ones.
pub fn lower_mesh3(
    a: &Mesh3Asset,
    pr: &Projector,
    reveal: f64,
    node: &EvaluatedClipNode,
    opacity: f32,
) -> Vec<DrawOp> {
    let nu = a.resolution[0] as usize;
    let nv = a.resolution[1] as usize;
    let total = nu * nv;
    let visible = ((reveal.clamp(0.0, 1.0) * total as f64).ceil() as usize).min(total);
    if visible == 0 {
        return Vec::new();
    }

    let world = |u: f64, v: f64| -> [f64; 3] {
        [
            u * a.scale[0],
            v * a.scale[1],
            a.field.eval(u, v) * a.scale[2],
        ]
    };
    let du = (a.u_range[1] - a.u_range[0]) / nu as f64;
    let dv = (a.v_range[1] - a.v_range[0]) / nv as f64;

    let mut quads = Vec::with_capacity(visible);
    for i in 0..nu {
        for j in 0..nv {
            let sweep = i * nv + j;
            if sweep >= visible {
                continue;
            }
            let u0 = a.u_range[0] + i as f64 * du;
            let v0 = a.v_range[0] + j as f64 * dv;
            let corners = [
                world(u0, v0),
                world(u0 + du, v0),
                world(u0 + du, v0 + dv),
                world(u0, v0 + dv),
            ];

            let mut depth = 0.0;
            let mut path = BezPath::new();
            for (k, &c) in corners.iter().enumerate() {
                let (pt, d) = pr.project(c);
                depth += d * 0.25;
                if k == 0 {
                    path.move_to(pt);
                } else {
                    path.line_to(pt);
                }
            }
            path.close_path();

            let color = a.colors[(i + j) % 2];
            quads.push((depth, path, color));
        }
    }

    // Painter order: far first.
    quads.sort_by(|x, y| x.0.total_cmp(&y.0));

    quads
        .into_iter()
        .map(|(_, path, color)| DrawOp::FillPath {
            path,
            transform: node.transform,
            color: Rgba8Premul::from_straight_rgba(color[0], color[1], color[2], color[3]),
            opacity,
            z: node.z,
        })
        .collect()
}

pub fn lower_line3(
    a: &Line3Asset,
    pr: &Projector,
    reveal: f64,
    node: &EvaluatedClipNode,
    opacity: f32,
) -> Vec<DrawOp> {
    let mut path = BezPath::new();
    for polyline in &a.polylines {
        for (i, &p) in polyline.iter().enumerate() {
            let (pt, _) = pr.project(p);
            if i == 0 {
                path.move_to(pt);
            } else {
                path.line_to(pt);
            }
        }
    }
    vec![DrawOp::StrokePath {
        path,
        width_px: a.width_px,
        reveal: reveal as f32,
        transform: node.transform,
        color: Rgba8Premul::from_straight_rgba(
            a.color_rgba8[0],
            a.color_rgba8[1],
            a.color_rgba8[2],
            a.color_rgba8[3],
        ),
        opacity,
        z: node.z,
    }]
}

pub fn lower_arrow3(
    a: &Arrow3Asset,
    pr: &Projector,
    reveal: f64,
    node: &EvaluatedClipNode,
    opacity: f32,
) -> Vec<DrawOp> {
    let dir = [
        a.end[0] - a.start[0],
        a.end[1] - a.start[1],
        a.end[2] - a.start[2],
    ];
    let len = (dir[0] * dir[0] + dir[1] * dir[1] + dir[2] * dir[2]).sqrt();
    if len <= 0.0 {
        return Vec::new();
    }
    let head_len = a.head_len.min(len * 0.5);
    let t = (len - head_len) / len;
    let base = [
        a.start[0] + dir[0] * t,
        a.start[1] + dir[1] * t,
        a.start[2] + dir[2] * t,
    ];

    let (p_start, _) = pr.project(a.start);
    let (p_base, _) = pr.project(base);
    let (p_tip, _) = pr.project(a.end);

    let color = Rgba8Premul::from_straight_rgba(
        a.color_rgba8[0],
        a.color_rgba8[1],
        a.color_rgba8[2],
        a.color_rgba8[3],
    );

    let mut shaft = BezPath::new();
    shaft.move_to(p_start);
    shaft.line_to(p_base);

    // Flat screen-space head: a triangle spanning the projected head length.
    let axis = p_tip - p_base;
    let axis_len = axis.hypot();
    let mut ops = vec![DrawOp::StrokePath {
        path: shaft,
        width_px: a.width_px,
        reveal: reveal as f32,
        transform: node.transform,
        color,
        opacity,
        z: node.z,
    }];
    if axis_len > 1e-6 && reveal >= 1.0 {
        let half = kurbo::Vec2::new(-axis.y, axis.x) * 0.35;
        let mut head = BezPath::new();
        head.move_to(p_tip);
        head.line_to(p_base + half);
        head.line_to(p_base - half);
        head.close_path();
        ops.push(DrawOp::FillPath {
            path: head,
            transform: node.transform,
            color,
            opacity,
            z: node.z,
        });
    }
    ops
}

pub fn lower_dot3(
    a: &Dot3Asset,
    pr: &Projector,
    node: &EvaluatedClipNode,
    opacity: f32,
) -> Vec<DrawOp> {
    let (pt, _) = pr.project(a.at);
    vec![DrawOp::FillPath {
        path: circle_path(pt, a.radius_px),
        transform: node.transform,
        color: Rgba8Premul::from_straight_rgba(
            a.color_rgba8[0],
            a.color_rgba8[1],
            a.color_rgba8[2],
            a.color_rgba8[3],
        ),
        opacity,
        z: node.z,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::Affine;
    use crate::math::functions::Field2;
    use crate::plot::camera::CameraState;

    fn node() -> EvaluatedClipNode {
        EvaluatedClipNode {
            clip_id: "c".into(),
            asset: "a".into(),
            z: 0,
            transform: Affine::IDENTITY,
            opacity: 1.0,
            param: 0.0,
            enter: None,
            exit: None,
        }
    }

    fn projector() -> Projector {
        Projector::new(
            CameraState {
                phi: 70f64.to_radians(),
                theta: -60f64.to_radians(),
                zoom: 0.7,
            },
            1280,
            720,
        )
    }

    fn mesh() -> Mesh3Asset {
        Mesh3Asset {
            field: Field2::PARABOLOID,
            u_range: [-3.0, 3.0],
            v_range: [-3.0, 3.0],
            resolution: [10, 10],
            scale: [1.0, 1.0, 0.25],
            colors: [[40, 90, 200, 230], [30, 70, 170, 230]],
        }
    }

    #[test]
    fn mesh_emits_one_quad_per_cell() {
        let ops = lower_mesh3(&mesh(), &projector(), 1.0, &node(), 1.0);
        assert_eq!(ops.len(), 100);
    }

    #[test]
    fn mesh_reveal_limits_quads() {
        let ops = lower_mesh3(&mesh(), &projector(), 0.25, &node(), 1.0);
        assert_eq!(ops.len(), 25);
        assert!(lower_mesh3(&mesh(), &projector(), 0.0, &node(), 1.0).is_empty());
    }

    #[test]
    fn arrow_has_shaft_and_head() {
        let a = Arrow3Asset {
            start: [2.0, 1.0, 5.0],
            end: [4.0, 2.0, 5.0],
            width_px: 3.0,
            head_len: 0.3,
            color_rgba8: [255, 210, 0, 255],
        };
        let ops = lower_arrow3(&a, &projector(), 1.0, &node(), 1.0);
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], DrawOp::StrokePath { .. }));
        assert!(matches!(ops[1], DrawOp::FillPath { .. }));

        // While still drawing in, the head is withheld.
        let partial = lower_arrow3(&a, &projector(), 0.5, &node(), 1.0);
        assert_eq!(partial.len(), 1);
    }

    #[test]
    fn line3_projects_every_point_and_subpath() {
        let a = Line3Asset {
            polylines: vec![
                vec![[0.0, 0.0, 0.0], [1.0, 0.0, 1.0], [2.0, 0.0, 4.0]],
                vec![[0.0, 1.0, 0.0], [0.0, 2.0, 0.0]],
            ],
            width_px: 4.0,
            color_rgba8: [255, 255, 0, 255],
        };
        let ops = lower_line3(&a, &projector(), 1.0, &node(), 1.0);
        let DrawOp::StrokePath { path, .. } = &ops[0] else {
            panic!("expected stroke");
        };
        assert_eq!(path.elements().len(), 5);
    }
}
