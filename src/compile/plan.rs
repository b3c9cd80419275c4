use kurbo::Shape;

use crate::{
    assets::store::{AssetId, PreparedAsset, PreparedAssetStore},
    compile::lower3,
    composition::model::{Asset, Composition, PaintStyle},
    effects::transitions::{GrowFrom, TransitionKind},
    eval::evaluator::{EvaluatedClipNode, EvaluatedGraph},
    foundation::core::{Affine, BezPath, Canvas, Rect, Rgba8Premul},
    foundation::error::{MotionError, MotionResult},
    math::stats,
    plot::axes::{circle_path, polyline_path, rect_path},
    plot::camera::Projector,
};

/// Backend-agnostic render plan for a single frame.
///
/// A plan consists of surface declarations, a sequence of passes, and the final
/// surface to read back. Each visible node draws into its own surface; a single
/// composite pass then overs the layers onto surface 0 in painter order.
#[derive(Clone, Debug)]
pub struct RenderPlan {
    pub canvas: Canvas,
    pub surfaces: Vec<SurfaceDesc>,
    pub passes: Vec<Pass>,
    pub final_surface: SurfaceId,
}

#[derive(Clone, Debug)]
pub enum Pass {
    Scene(ScenePass),
    Composite(CompositePass),
}

#[derive(Clone, Debug)]
pub struct ScenePass {
    pub target: SurfaceId,
    pub ops: Vec<DrawOp>,
    pub clear_to_transparent: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Rgba8Premul,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceDesc {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

#[derive(Clone, Debug)]
pub struct CompositePass {
    pub target: SurfaceId,
    pub ops: Vec<CompositeOp>,
}

#[derive(Clone, Copy, Debug)]
pub enum CompositeOp {
    Over { src: SurfaceId, opacity: f32 },
}

/// Draw operation emitted by the compiler.
#[derive(Clone, Debug)]
pub enum DrawOp {
    FillPath {
        path: BezPath,
        transform: Affine,
        color: Rgba8Premul,
        opacity: f32,
        z: i32,
    },
    StrokePath {
        path: BezPath,
        width_px: f64,
        /// Arc-length fraction of the path revealed, for draw-in animations.
        reveal: f32,
        transform: Affine,
        color: Rgba8Premul,
        opacity: f32,
        z: i32,
    },
    Text {
        asset: AssetId,
        transform: Affine,
        opacity: f32,
        /// Fraction of glyphs revealed, for write-in animations.
        reveal: f32,
        z: i32,
    },
    /// Text whose content changes per frame (counters, tangent labels); laid
    /// out and cached by the backend.
    Label {
        font: AssetId,
        text: String,
        size_px: f32,
        color: Rgba8Premul,
        transform: Affine,
        opacity: f32,
        z: i32,
    },
}

/// Per-node reveal/grow/fade state folded out of entrance and exit transitions.
#[derive(Clone, Copy, Debug)]
struct NodeFx {
    layer_opacity: f32,
    reveal: f64,
    grow: Option<(GrowFrom, f64)>,
}

impl NodeFx {
    fn resolve(node: &EvaluatedClipNode) -> Self {
        let mut fx = Self {
            layer_opacity: 1.0,
            reveal: 1.0,
            grow: None,
        };
        if let Some(tr) = node.enter {
            match tr.kind {
                TransitionKind::Fade => fx.layer_opacity *= tr.progress as f32,
                TransitionKind::Draw | TransitionKind::Write => fx.reveal = tr.progress,
                TransitionKind::Grow { from } => fx.grow = Some((from, tr.progress)),
            }
        }
        if let Some(tr) = node.exit {
            match tr.kind {
                TransitionKind::Fade => fx.layer_opacity *= (1.0 - tr.progress) as f32,
                TransitionKind::Draw | TransitionKind::Write => {
                    fx.reveal = fx.reveal.min(1.0 - tr.progress)
                }
                TransitionKind::Grow { from } => fx.grow = Some((from, 1.0 - tr.progress)),
            }
        }
        fx
    }
}

#[tracing::instrument(skip_all, fields(frame = eval.frame.0))]
pub fn compile_frame(
    comp: &Composition,
    eval: &EvaluatedGraph,
    assets: &PreparedAssetStore,
) -> MotionResult<RenderPlan> {
    struct Layer {
        surface: SurfaceId,
        opacity: f32,
    }

    let mut surfaces = Vec::<SurfaceDesc>::new();
    surfaces.push(SurfaceDesc {
        width: comp.canvas.width,
        height: comp.canvas.height,
        format: PixelFormat::Rgba8Premul,
    });

    let projector = eval
        .camera
        .map(|state| Projector::new(state, comp.canvas.width, comp.canvas.height));

    let mut scene_passes = Vec::<Pass>::with_capacity(eval.nodes.len());
    let mut layers = Vec::<Layer>::with_capacity(eval.nodes.len());

    for node in &eval.nodes {
        let fx = NodeFx::resolve(node);
        let opacity = (node.opacity as f32).clamp(0.0, 1.0);
        if opacity <= 0.0 || fx.layer_opacity <= 0.0 {
            continue;
        }
        if fx.reveal <= 0.0 {
            continue;
        }

        let asset = comp.assets.get(&node.asset).ok_or_else(|| {
            MotionError::evaluation(format!("unknown asset key '{}'", node.asset))
        })?;

        let ops = lower_node(comp, node, asset, &fx, opacity, projector.as_ref(), assets)?;
        if ops.is_empty() {
            continue;
        }

        let surf_id = SurfaceId(surfaces.len() as u32);
        surfaces.push(SurfaceDesc {
            width: comp.canvas.width,
            height: comp.canvas.height,
            format: PixelFormat::Rgba8Premul,
        });
        scene_passes.push(Pass::Scene(ScenePass {
            target: surf_id,
            ops,
            clear_to_transparent: true,
        }));
        layers.push(Layer {
            surface: surf_id,
            opacity: fx.layer_opacity.clamp(0.0, 1.0),
        });
    }

    let composite_ops = layers
        .iter()
        .filter(|l| l.opacity > 0.0)
        .map(|l| CompositeOp::Over {
            src: l.surface,
            opacity: l.opacity,
        })
        .collect::<Vec<_>>();

    Ok(RenderPlan {
        canvas: comp.canvas,
        surfaces,
        passes: {
            let mut out = scene_passes;
            out.push(Pass::Composite(CompositePass {
                target: SurfaceId(0),
                ops: composite_ops,
            }));
            out
        },
        final_surface: SurfaceId(0),
    })
}

fn lower_node(
    comp: &Composition,
    node: &EvaluatedClipNode,
    asset: &Asset,
    fx: &NodeFx,
    opacity: f32,
    projector: Option<&Projector>,
    assets: &PreparedAssetStore,
) -> MotionResult<Vec<DrawOp>> {
    let mut ops = Vec::new();

    match asset {
        Asset::Path(_) => {
            let id = assets.id_for_key(&node.asset)?;
            let PreparedAsset::Path(prepared) = assets.get(id)? else {
                return Err(MotionError::evaluation("AssetId is not a PreparedPath"));
            };
            let transform = node.transform * grow_affine(fx.grow, &prepared.path.bounding_box());
            let color = straight_color(prepared.color_rgba8);
            match prepared.style {
                PaintStyle::Fill => {
                    // Draw reveals are an outline concept; fills fall back to a
                    // fade so a mis-tagged transition still degrades gracefully.
                    let o = if fx.reveal < 1.0 {
                        opacity * fx.reveal as f32
                    } else {
                        opacity
                    };
                    ops.push(DrawOp::FillPath {
                        path: prepared.path.clone(),
                        transform,
                        color,
                        opacity: o,
                        z: node.z,
                    });
                }
                PaintStyle::Stroke { width_px } => {
                    ops.push(DrawOp::StrokePath {
                        path: prepared.path.clone(),
                        width_px,
                        reveal: fx.reveal as f32,
                        transform,
                        color,
                        opacity,
                        z: node.z,
                    });
                }
            }
        }
        Asset::Text(_) => {
            let id = assets.id_for_key(&node.asset)?;
            let (w, h) = assets.intrinsic_size_for_key(&node.asset);
            let bbox = Rect::new(0.0, 0.0, w, h);
            ops.push(DrawOp::Text {
                asset: id,
                transform: node.transform * grow_affine(fx.grow, &bbox),
                opacity,
                reveal: fx.reveal as f32,
                z: node.z,
            });
        }
        Asset::Counter(a) => {
            let id = assets.id_for_key(&node.asset)?;
            let value = a.map.apply(node.param);
            let text = format!("{}{:.*}{}", a.prefix, a.decimals as usize, value, a.suffix);
            ops.push(DrawOp::Label {
                font: id,
                text,
                size_px: a.size_px,
                color: straight_color(a.color_rgba8),
                transform: node.transform,
                opacity,
                z: node.z,
            });
        }
        Asset::Histogram(a) => {
            let n = (node.param.round().max(0.0) as usize).min(a.samples.len());
            let counts = stats::histogram(&a.samples[..n], a.bins as usize, a.range[0], a.range[1]);
            let max = counts.iter().copied().max().unwrap_or(0).max(1);
            let bin_w = (a.range[1] - a.range[0]) / f64::from(a.bins);
            let base_px = a.axes.y_to_px(a.axes.y_range[0]);

            let mut bars = BezPath::new();
            for (j, &count) in counts.iter().enumerate() {
                if count == 0 {
                    continue;
                }
                let center = a.range[0] + (j as f64 + 0.5) * bin_w;
                let half_w = bin_w * a.bar_width_frac * 0.5;
                let height_val =
                    a.axes.y_range[0] + (f64::from(count) / f64::from(max)) * a.max_bar_value;
                let x0 = a.axes.x_to_px(center - half_w);
                let x1 = a.axes.x_to_px(center + half_w);
                let y1 = a.axes.y_to_px(height_val);
                for el in rect_path(Rect::new(x0, y1, x1, base_px)).elements() {
                    bars.push(*el);
                }
            }
            if !bars.elements().is_empty() {
                ops.push(DrawOp::FillPath {
                    path: bars,
                    transform: node.transform,
                    color: straight_color(a.color_rgba8),
                    opacity,
                    z: node.z,
                });
            }
        }
        Asset::Polyline(a) => {
            let last = (node.param.floor().max(0.0) as usize).min(a.points_px.len() - 1);
            if last >= 1 {
                let visible: Vec<kurbo::Point> = a.points_px[..=last]
                    .iter()
                    .map(|p| kurbo::Point::new(p[0], p[1]))
                    .collect();
                ops.push(DrawOp::StrokePath {
                    path: polyline_path(&visible),
                    width_px: a.width_px,
                    reveal: fx.reveal as f32,
                    transform: node.transform,
                    color: straight_color(a.color_rgba8),
                    opacity,
                    z: node.z,
                });
            }
        }
        Asset::Tangent(a) => {
            let t = node.param;
            if t < a.axes.x_range[0] || t > a.axes.x_range[1] {
                return Ok(ops);
            }
            let (l, r) = crate::math::calculus::tangent_segment(
                &a.curve,
                t,
                a.dt,
                a.half_len,
                a.axes.x_range[0],
                a.axes.x_range[1],
            );
            let mut line = BezPath::new();
            line.move_to(a.axes.to_px(l[0], l[1]));
            line.line_to(a.axes.to_px(r[0], r[1]));
            ops.push(DrawOp::StrokePath {
                path: line,
                width_px: a.width_px,
                reveal: fx.reveal as f32,
                transform: node.transform,
                color: straight_color(a.color_rgba8),
                opacity,
                z: node.z,
            });

            let at = a.axes.to_px(t, a.curve.eval(t));
            ops.push(DrawOp::FillPath {
                path: circle_path(at, a.dot_radius_px),
                transform: node.transform,
                color: straight_color(a.color_rgba8),
                opacity,
                z: node.z,
            });

            if let Some(label) = &a.label {
                let id = assets.id_for_key(&node.asset)?;
                let slope = crate::math::calculus::central_difference(&a.curve, t, a.dt);
                let value = slope * label.value_scale;
                let text = format!(
                    "{}{:.*}{}",
                    label.prefix, label.decimals as usize, value, label.suffix
                );
                ops.push(DrawOp::Label {
                    font: id,
                    text,
                    size_px: label.size_px,
                    color: straight_color(label.color_rgba8),
                    transform: node.transform
                        * Affine::translate((at.x + label.offset_px[0], at.y + label.offset_px[1])),
                    opacity,
                    z: node.z,
                });
            }
        }
        Asset::Mesh3(a) => {
            let pr = require_projector(projector)?;
            ops.extend(lower3::lower_mesh3(a, pr, fx.reveal, node, opacity));
        }
        Asset::Line3(a) => {
            let pr = require_projector(projector)?;
            ops.extend(lower3::lower_line3(a, pr, fx.reveal, node, opacity));
        }
        Asset::Arrow3(a) => {
            let pr = require_projector(projector)?;
            ops.extend(lower3::lower_arrow3(a, pr, fx.reveal, node, opacity));
        }
        Asset::Dot3(a) => {
            let pr = require_projector(projector)?;
            ops.extend(lower3::lower_dot3(a, pr, node, opacity));
        }
    }

    Ok(ops)
}

fn require_projector(projector: Option<&Projector>) -> MotionResult<&Projector> {
    projector.ok_or_else(|| MotionError::evaluation("3D asset evaluated without a camera"))
}

fn straight_color(rgba: [u8; 4]) -> Rgba8Premul {
    Rgba8Premul::from_straight_rgba(rgba[0], rgba[1], rgba[2], rgba[3])
}

/// Affine for grow transitions: scale about an edge or the center of `bbox`.
fn grow_affine(grow: Option<(GrowFrom, f64)>, bbox: &Rect) -> Affine {
    let Some((from, progress)) = grow else {
        return Affine::IDENTITY;
    };
    let p = progress.clamp(0.0, 1.0);
    let (anchor, sx, sy) = match from {
        GrowFrom::Center => (bbox.center(), p, p),
        GrowFrom::Left => (kurbo::Point::new(bbox.x0, bbox.center().y), p, 1.0),
        GrowFrom::Right => (kurbo::Point::new(bbox.x1, bbox.center().y), p, 1.0),
        GrowFrom::Top => (kurbo::Point::new(bbox.center().x, bbox.y0), 1.0, p),
        GrowFrom::Bottom => (kurbo::Point::new(bbox.center().x, bbox.y1), 1.0, p),
    };
    Affine::translate(anchor.to_vec2())
        * Affine::scale_non_uniform(sx, sy)
        * Affine::translate(-anchor.to_vec2())
}
