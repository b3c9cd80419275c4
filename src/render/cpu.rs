use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    assets::store::{AssetId, PreparedAsset, PreparedAssetStore, TextBrushRgba8, TextLayoutEngine},
    compile::plan::{CompositeOp, DrawOp, SurfaceDesc, SurfaceId},
    foundation::core::Rgba8Premul,
    foundation::error::{MotionError, MotionResult},
    plot::paths::trim_path_prefix,
    render::backend::{FrameRGBA, RenderBackend, RenderSettings},
    render::passes::PassBackend,
};

pub struct CpuBackend {
    settings: RenderSettings,
    surfaces: HashMap<SurfaceId, CpuSurface>,
    font_cache: HashMap<AssetId, vello_cpu::peniko::FontData>,
    label_cache: HashMap<LabelKey, Arc<parley::Layout<TextBrushRgba8>>>,
    text_engine: TextLayoutEngine,
}

struct CpuSurface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct LabelKey {
    font: AssetId,
    size_bits: u32,
    color: [u8; 4],
    text: String,
}

impl CpuBackend {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            surfaces: HashMap::new(),
            font_cache: HashMap::new(),
            label_cache: HashMap::new(),
            text_engine: TextLayoutEngine::new(),
        }
    }
}

impl PassBackend for CpuBackend {
    fn ensure_surface(&mut self, id: SurfaceId, desc: &SurfaceDesc) -> MotionResult<()> {
        let width_u16: u16 = desc
            .width
            .try_into()
            .map_err(|_| MotionError::evaluation("surface width exceeds u16"))?;
        let height_u16: u16 = desc
            .height
            .try_into()
            .map_err(|_| MotionError::evaluation("surface height exceeds u16"))?;

        match self.surfaces.get_mut(&id) {
            Some(surface) => {
                if surface.width != width_u16 || surface.height != height_u16 {
                    *surface = CpuSurface {
                        width: width_u16,
                        height: height_u16,
                        pixmap: vello_cpu::Pixmap::new(width_u16, height_u16),
                    };
                }
            }
            None => {
                self.surfaces.insert(
                    id,
                    CpuSurface {
                        width: width_u16,
                        height: height_u16,
                        pixmap: vello_cpu::Pixmap::new(width_u16, height_u16),
                    },
                );
            }
        }

        if id == SurfaceId(0) {
            let premul = self
                .settings
                .clear_rgba
                .map(|[r, g, b, a]| premul_rgba8(r, g, b, a))
                .unwrap_or([0, 0, 0, 0]);
            let s = self
                .surfaces
                .get_mut(&SurfaceId(0))
                .ok_or_else(|| MotionError::evaluation("surface 0 missing"))?;
            clear_pixmap(&mut s.pixmap, premul);
        }
        Ok(())
    }

    fn exec_scene(
        &mut self,
        pass: &crate::compile::plan::ScenePass,
        assets: &PreparedAssetStore,
    ) -> MotionResult<()> {
        let mut surface = self.surfaces.remove(&pass.target).ok_or_else(|| {
            MotionError::evaluation(format!(
                "scene target surface {:?} was not initialized",
                pass.target
            ))
        })?;

        if pass.clear_to_transparent {
            clear_pixmap(&mut surface.pixmap, [0, 0, 0, 0]);
        }

        let mut ctx = vello_cpu::RenderContext::new(surface.width, surface.height);
        for op in &pass.ops {
            draw_op(self, &mut ctx, op, assets)?;
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut surface.pixmap);
        self.surfaces.insert(pass.target, surface);
        Ok(())
    }

    fn exec_composite(
        &mut self,
        pass: &crate::compile::plan::CompositePass,
        _assets: &PreparedAssetStore,
    ) -> MotionResult<()> {
        let mut dst = self.surfaces.remove(&pass.target).ok_or_else(|| {
            MotionError::evaluation(format!(
                "composite target surface {:?} was not initialized",
                pass.target
            ))
        })?;

        for op in &pass.ops {
            match *op {
                CompositeOp::Over { src, opacity } => {
                    let src = self.surfaces.get(&src).ok_or_else(|| {
                        MotionError::evaluation(format!(
                            "composite src surface {src:?} was not initialized"
                        ))
                    })?;
                    crate::render::composite::over_in_place(
                        dst.pixmap.data_as_u8_slice_mut(),
                        src.pixmap.data_as_u8_slice(),
                        opacity,
                    )?;
                }
            }
        }
        self.surfaces.insert(pass.target, dst);
        Ok(())
    }

    fn readback_rgba8(
        &mut self,
        surface: SurfaceId,
        plan: &crate::compile::plan::RenderPlan,
        _assets: &PreparedAssetStore,
    ) -> MotionResult<FrameRGBA> {
        let s = self.surfaces.get(&surface).ok_or_else(|| {
            MotionError::evaluation(format!("readback surface {surface:?} was not initialized"))
        })?;
        let frame_data = s.pixmap.data_as_u8_slice().to_vec();
        let surface_cap = plan.surfaces.len() as u32;
        self.surfaces.retain(|id, _| id.0 < surface_cap);

        Ok(FrameRGBA {
            width: plan.canvas.width,
            height: plan.canvas.height,
            data: frame_data,
            premultiplied: true,
        })
    }
}

impl RenderBackend for CpuBackend {
    fn worker_render_settings(&self) -> Option<RenderSettings> {
        Some(self.settings.clone())
    }
}

fn premul_rgba8(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    let af = (a as u16) + 1;
    let premul = |c: u8| -> u8 { (((c as u16) * af) >> 8) as u8 };
    [premul(r), premul(g), premul(b), a]
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn draw_op(
    backend: &mut CpuBackend,
    ctx: &mut vello_cpu::RenderContext,
    op: &DrawOp,
    assets: &PreparedAssetStore,
) -> MotionResult<()> {
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

    match op {
        DrawOp::FillPath {
            path,
            transform,
            color,
            opacity,
            z: _,
        } => {
            ctx.set_transform(affine_to_cpu(*transform));
            ctx.set_paint(color_to_cpu(*color));
            if *opacity < 1.0 {
                ctx.push_opacity_layer(*opacity);
            }
            let cpu_path = bezpath_to_cpu(path);
            ctx.fill_path(&cpu_path);
            if *opacity < 1.0 {
                ctx.pop_layer();
            }
            Ok(())
        }
        DrawOp::StrokePath {
            path,
            width_px,
            reveal,
            transform,
            color,
            opacity,
            z: _,
        } => {
            let visible = if *reveal < 1.0 {
                trim_path_prefix(path, f64::from(*reveal))
            } else {
                path.clone()
            };
            if visible.elements().is_empty() {
                return Ok(());
            }

            // Expand the stroke into a fill outline so the raster stage only
            // ever sees fills.
            let style = kurbo::Stroke::new(*width_px)
                .with_caps(kurbo::Cap::Round)
                .with_join(kurbo::Join::Round);
            let outline = kurbo::stroke(
                visible.elements().iter().copied(),
                &style,
                &kurbo::StrokeOpts::default(),
                0.25,
            );

            ctx.set_transform(affine_to_cpu(*transform));
            ctx.set_paint(color_to_cpu(*color));
            if *opacity < 1.0 {
                ctx.push_opacity_layer(*opacity);
            }
            let cpu_path = bezpath_to_cpu(&outline);
            ctx.fill_path(&cpu_path);
            if *opacity < 1.0 {
                ctx.pop_layer();
            }
            Ok(())
        }
        DrawOp::Text {
            asset,
            transform,
            opacity,
            reveal,
            z: _,
        } => {
            let prepared = assets.get(*asset)?;
            let PreparedAsset::Text(t) = prepared else {
                return Err(MotionError::evaluation("AssetId is not a PreparedText"));
            };
            let font = backend.font_for_asset(*asset, assets)?;
            let layout = t.layout.clone();
            draw_layout(ctx, &font, &layout, *transform, *opacity, *reveal);
            Ok(())
        }
        DrawOp::Label {
            font,
            text,
            size_px,
            color,
            transform,
            opacity,
            z: _,
        } => {
            let font_data = backend.font_for_asset(*font, assets)?;
            let layout = backend.label_layout(*font, text, *size_px, *color, assets)?;
            draw_layout(ctx, &font_data, &layout, *transform, *opacity, 1.0);
            Ok(())
        }
    }
}

fn draw_layout(
    ctx: &mut vello_cpu::RenderContext,
    font: &vello_cpu::peniko::FontData,
    layout: &parley::Layout<TextBrushRgba8>,
    transform: crate::foundation::core::Affine,
    opacity: f32,
    reveal: f32,
) {
    ctx.set_transform(affine_to_cpu(transform));

    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }

    // Write-in reveals whole glyphs, left to right across the layout.
    let total: usize = glyph_count(layout);
    let mut budget = if reveal >= 1.0 {
        usize::MAX
    } else {
        ((f64::from(reveal.clamp(0.0, 1.0)) * total as f64).ceil()) as usize
    };

    'lines: for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };

            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));

            let take = run.glyphs().count().min(budget);
            if take == 0 {
                break 'lines;
            }
            let glyphs = run.glyphs().take(take).map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
            budget = budget.saturating_sub(take);
            if budget == 0 {
                break 'lines;
            }
        }
    }

    if opacity < 1.0 {
        ctx.pop_layer();
    }
}

fn glyph_count(layout: &parley::Layout<TextBrushRgba8>) -> usize {
    let mut total = 0usize;
    for line in layout.lines() {
        for item in line.items() {
            if let parley::layout::PositionedLayoutItem::GlyphRun(run) = item {
                total += run.glyphs().count();
            }
        }
    }
    total
}

fn affine_to_cpu(a: crate::foundation::core::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn color_to_cpu(c: Rgba8Premul) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn point_to_cpu(p: crate::foundation::core::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &crate::foundation::core::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

impl CpuBackend {
    fn font_for_asset(
        &mut self,
        id: AssetId,
        assets: &PreparedAssetStore,
    ) -> MotionResult<vello_cpu::peniko::FontData> {
        if let Some(font) = self.font_cache.get(&id) {
            return Ok(font.clone());
        }

        let font_bytes = match assets.get(id)? {
            PreparedAsset::Text(t) => t.font_bytes.as_ref().clone(),
            PreparedAsset::Font(f) => f.font_bytes.as_ref().clone(),
            PreparedAsset::Path(_) => {
                return Err(MotionError::evaluation("AssetId has no font data"));
            }
        };
        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);
        self.font_cache.insert(id, font.clone());
        Ok(font)
    }

    fn label_layout(
        &mut self,
        font: AssetId,
        text: &str,
        size_px: f32,
        color: Rgba8Premul,
        assets: &PreparedAssetStore,
    ) -> MotionResult<Arc<parley::Layout<TextBrushRgba8>>> {
        let key = LabelKey {
            font,
            size_bits: size_px.to_bits(),
            color: [color.r, color.g, color.b, color.a],
            text: text.to_string(),
        };
        if let Some(layout) = self.label_cache.get(&key) {
            return Ok(layout.clone());
        }

        let font_bytes = match assets.get(font)? {
            PreparedAsset::Text(t) => t.font_bytes.clone(),
            PreparedAsset::Font(f) => f.font_bytes.clone(),
            PreparedAsset::Path(_) => {
                return Err(MotionError::evaluation("AssetId has no font data"));
            }
        };
        let brush = TextBrushRgba8 {
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        };
        let layout = Arc::new(self.text_engine.layout_plain(
            text,
            font_bytes.as_slice(),
            size_px,
            brush,
            None,
        )?);
        self.label_cache.insert(key, layout.clone());
        Ok(layout)
    }
}
