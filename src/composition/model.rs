use std::collections::BTreeMap;

use crate::{
    animation::anim::Anim,
    animation::ease::Ease,
    effects::transitions::parse_transition,
    foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Transform2D},
    foundation::error::{MotionError, MotionResult},
    math::functions::{Curve1, Field2},
    plot::axes::Axes2D,
};

/// A complete timeline composition.
///
/// A composition is a pure data model: built programmatically (usually through
/// [`crate::scene::SceneScript`] or the builders in [`crate::composition::dsl`]),
/// serializable via Serde, and rendered by the pipeline in
/// [`crate::render::pipeline`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Composition {
    pub fps: Fps,
    pub canvas: Canvas,
    /// Total composition duration in frames.
    pub duration: FrameIndex,
    /// Asset table keyed by stable user-facing asset keys.
    pub assets: BTreeMap<String, Asset>,
    pub tracks: Vec<Track>,
    /// Orbit camera rig; required when any 3D asset is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraRig>,
    /// Seed for the deterministic simulations baked in at scene build time.
    pub seed: u64,
}

/// Animated orbit camera: polar angle `phi` (radians from +z), azimuth `theta`
/// and a zoom multiplier.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CameraRig {
    pub phi: Anim<f64>,
    pub theta: Anim<f64>,
    pub zoom: Anim<f64>,
}

impl CameraRig {
    pub fn fixed(phi: f64, theta: f64, zoom: f64) -> Self {
        Self {
            phi: Anim::constant(phi),
            theta: Anim::constant(theta),
            zoom: Anim::constant(zoom),
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Track {
    pub name: String,
    /// Base z-order applied to all clips in this track.
    pub z_base: i32,
    #[serde(default)]
    pub layout_mode: LayoutMode,
    /// Gap in pixels between stacked items.
    #[serde(default)]
    pub layout_gap_px: f64,
    #[serde(default)]
    pub layout_padding: Edges,
    #[serde(default)]
    pub layout_align_x: LayoutAlignX,
    #[serde(default)]
    pub layout_align_y: LayoutAlignY,
    pub clips: Vec<Clip>,
}

/// Auto-layout mode for clips within a track.
///
/// `VStack` is the formula-box/caption-stack layout; everything else is placed
/// through clip transforms.
#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub enum LayoutMode {
    #[default]
    Absolute,
    VStack,
}

/// Padding edges in pixels.
#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct Edges {
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub right: f64,
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub bottom: f64,
}

#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub enum LayoutAlignX {
    #[default]
    Start,
    Center,
    End,
}

#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub enum LayoutAlignY {
    #[default]
    Start,
    Center,
    End,
}

/// A clip places an asset on the timeline and specifies how it is rendered.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Clip {
    pub id: String,
    /// Asset key into [`Composition::assets`].
    pub asset: String,
    /// Timeline placement range `[start, end)`.
    pub range: FrameRange,
    pub props: ClipProps,
    /// Per-clip z-order offset added on top of the track base.
    pub z_offset: i32,
    /// Entrance animation resolved over a window at the clip start.
    pub transition_in: Option<TransitionSpec>,
    /// Exit animation resolved over a window at the clip end.
    pub transition_out: Option<TransitionSpec>,
}

/// Per-clip animated render properties.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ClipProps {
    pub transform: Anim<Transform2D>,
    /// Clamped to `[0, 1]` at evaluation time.
    pub opacity: Anim<f64>,
    /// Generic scalar driver consumed by parametric assets (tangent abscissa,
    /// visible sample count, counter input).
    pub param: Anim<f64>,
}

impl Default for ClipProps {
    fn default() -> Self {
        Self {
            transform: Anim::constant(Transform2D::default()),
            opacity: Anim::constant(1.0),
            param: Anim::constant(0.0),
        }
    }
}

/// An asset referenced by clips.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum Asset {
    /// Shaped text block.
    Text(TextAsset),
    /// Static 2D geometry as SVG path data.
    Path(PathAsset),
    /// Live decimal readout driven by the clip `param`.
    Counter(CounterAsset),
    /// Histogram re-binned per frame from a sample prefix.
    Histogram(HistogramAsset),
    /// Data polyline revealed point by point.
    Polyline(PolylineAsset),
    /// Tangent line + marker sliding along a curve.
    Tangent(TangentAsset),
    /// Checkerboard surface mesh over a quadric field (3D).
    Mesh3(Mesh3Asset),
    /// 3D polyline (slice curves, wall grids, 3D axes).
    Line3(Line3Asset),
    /// 3D arrow with a flat head (gradient vectors).
    Arrow3(Arrow3Asset),
    /// Screen-facing marker at a 3D point.
    Dot3(Dot3Asset),
}

impl Asset {
    pub fn is_3d(&self) -> bool {
        matches!(
            self,
            Self::Mesh3(_) | Self::Line3(_) | Self::Arrow3(_) | Self::Dot3(_)
        )
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TextAsset {
    pub text: String,
    /// Relative path to the font file.
    pub font_source: String,
    pub size_px: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width_px: Option<f32>,
    /// Straight-alpha RGBA8.
    #[serde(default = "default_color_rgba8")]
    pub color_rgba8: [u8; 4],
}

fn default_color_rgba8() -> [u8; 4] {
    [255, 255, 255, 255]
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum PaintStyle {
    Fill,
    Stroke { width_px: f64 },
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PathAsset {
    /// SVG path `d` attribute string, in local pixel coordinates.
    pub svg_path_d: String,
    pub style: PaintStyle,
    #[serde(default = "default_color_rgba8")]
    pub color_rgba8: [u8; 4],
}

/// Maps the clip `param` to the displayed counter value.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum ValueMap {
    Affine { scale: f64, offset: f64 },
    /// `value = values[round(param)]`, clamped to the series bounds.
    Series { values: Vec<f64> },
}

impl ValueMap {
    pub fn apply(&self, param: f64) -> f64 {
        match self {
            Self::Affine { scale, offset } => scale * param + offset,
            Self::Series { values } => {
                if values.is_empty() {
                    return 0.0;
                }
                let idx = (param.round().max(0.0) as usize).min(values.len() - 1);
                values[idx]
            }
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CounterAsset {
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    pub decimals: u8,
    pub map: ValueMap,
    pub font_source: String,
    pub size_px: f32,
    #[serde(default = "default_color_rgba8")]
    pub color_rgba8: [u8; 4],
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct HistogramAsset {
    /// Precomputed sample values (seeded simulation output).
    pub samples: Vec<f64>,
    pub bins: u32,
    /// Value range covered by the bins.
    pub range: [f64; 2],
    pub axes: Axes2D,
    /// Bar height in axis units for the fullest bin.
    pub max_bar_value: f64,
    /// Bar width as a fraction of the bin width.
    pub bar_width_frac: f64,
    #[serde(default = "default_color_rgba8")]
    pub color_rgba8: [u8; 4],
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PolylineAsset {
    /// Pre-mapped screen-space points; the clip `param` selects the visible
    /// prefix (in points).
    pub points_px: Vec<[f64; 2]>,
    pub width_px: f64,
    #[serde(default = "default_color_rgba8")]
    pub color_rgba8: [u8; 4],
}

/// Live label attached to the tangent marker.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TangentLabel {
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    pub decimals: u8,
    /// Multiplier applied to the slope before display (unit conversion).
    pub value_scale: f64,
    pub font_source: String,
    pub size_px: f32,
    pub offset_px: [f64; 2],
    #[serde(default = "default_color_rgba8")]
    pub color_rgba8: [u8; 4],
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TangentAsset {
    pub curve: Curve1,
    pub axes: Axes2D,
    /// Central-difference probe step.
    pub dt: f64,
    /// Half length of the tangent segment, in x axis units.
    pub half_len: f64,
    pub width_px: f64,
    pub dot_radius_px: f64,
    #[serde(default = "default_color_rgba8")]
    pub color_rgba8: [u8; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<TangentLabel>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Mesh3Asset {
    pub field: Field2,
    pub u_range: [f64; 2],
    pub v_range: [f64; 2],
    /// Quad resolution along u and v.
    pub resolution: [u32; 2],
    /// Math-to-world scale for (u, v, f(u, v)).
    pub scale: [f64; 3],
    /// Two-tone checkerboard colors, straight-alpha RGBA8.
    pub colors: [[u8; 4]; 2],
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Line3Asset {
    /// World-space polylines, each with at least two points (a single curve, or
    /// a bundle such as a wall grid).
    pub polylines: Vec<Vec<[f64; 3]>>,
    pub width_px: f64,
    #[serde(default = "default_color_rgba8")]
    pub color_rgba8: [u8; 4],
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Arrow3Asset {
    pub start: [f64; 3],
    pub end: [f64; 3],
    pub width_px: f64,
    /// Arrow head length in world units.
    pub head_len: f64,
    #[serde(default = "default_color_rgba8")]
    pub color_rgba8: [u8; 4],
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Dot3Asset {
    pub at: [f64; 3],
    pub radius_px: f64,
    #[serde(default = "default_color_rgba8")]
    pub color_rgba8: [u8; 4],
}

/// Entrance/exit animation attached to a clip edge.
///
/// Kinds: `fade`, `draw`, `write`, `grow` (see
/// [`crate::effects::transitions`]).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TransitionSpec {
    pub kind: String,
    pub duration_frames: u64,
    pub ease: Ease,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
}

impl TransitionSpec {
    pub fn validate(&self) -> MotionResult<()> {
        if self.duration_frames == 0 {
            return Err(MotionError::validation(
                "transition duration_frames must be > 0",
            ));
        }
        parse_transition(self).map(|_| ())
    }
}

impl Composition {
    /// Validate composition invariants and asset/clip references.
    pub fn validate(&self) -> MotionResult<()> {
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(MotionError::validation("fps must have num>0 and den>0"));
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(MotionError::validation("canvas width/height must be > 0"));
        }
        if self.duration.0 == 0 {
            return Err(MotionError::validation("duration must be > 0 frames"));
        }

        if let Some(cam) = &self.camera {
            cam.phi.validate()?;
            cam.theta.validate()?;
            cam.zoom.validate()?;
        }

        for track in &self.tracks {
            if track.name.trim().is_empty() {
                return Err(MotionError::validation("track name must be non-empty"));
            }
            if !track.layout_gap_px.is_finite() || track.layout_gap_px < 0.0 {
                return Err(MotionError::validation(
                    "track layout_gap_px must be finite and >= 0",
                ));
            }
            for (name, value) in [
                ("left", track.layout_padding.left),
                ("right", track.layout_padding.right),
                ("top", track.layout_padding.top),
                ("bottom", track.layout_padding.bottom),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(MotionError::validation(format!(
                        "track layout_padding.{name} must be finite and >= 0",
                    )));
                }
            }

            for clip in &track.clips {
                let Some(asset) = self.assets.get(&clip.asset) else {
                    return Err(MotionError::validation(format!(
                        "clip '{}' references missing asset key '{}'",
                        clip.id, clip.asset
                    )));
                };
                if asset.is_3d() && self.camera.is_none() {
                    return Err(MotionError::validation(format!(
                        "clip '{}' uses a 3D asset but the composition has no camera",
                        clip.id
                    )));
                }
                if clip.range.start.0 > clip.range.end.0 {
                    return Err(MotionError::validation(format!(
                        "clip '{}' has invalid range (start > end)",
                        clip.id
                    )));
                }
                if clip.range.end.0 > self.duration.0 {
                    return Err(MotionError::validation(format!(
                        "clip '{}' range exceeds composition duration",
                        clip.id
                    )));
                }

                clip.props.opacity.validate()?;
                clip.props.transform.validate()?;
                clip.props.param.validate()?;

                if let Some(tr) = &clip.transition_in {
                    tr.validate()?;
                }
                if let Some(tr) = &clip.transition_out {
                    tr.validate()?;
                }
            }
        }

        for (key, asset) in &self.assets {
            if key.trim().is_empty() {
                return Err(MotionError::validation("asset key must be non-empty"));
            }
            validate_asset(key, asset)?;
        }

        Ok(())
    }
}

fn validate_asset(key: &str, asset: &Asset) -> MotionResult<()> {
    match asset {
        Asset::Text(a) => {
            if a.text.trim().is_empty() {
                return Err(MotionError::validation(format!(
                    "text asset '{key}' must have non-empty text"
                )));
            }
            validate_rel_source(&a.font_source, "text asset font_source")?;
            validate_size_px(a.size_px, "text asset size_px")?;
            if let Some(w) = a.max_width_px
                && (!w.is_finite() || w <= 0.0)
            {
                return Err(MotionError::validation(
                    "text asset max_width_px must be finite and > 0 when set",
                ));
            }
        }
        Asset::Path(a) => {
            if a.svg_path_d.trim().is_empty() {
                return Err(MotionError::validation(format!(
                    "path asset '{key}' svg_path_d must be non-empty"
                )));
            }
            if let PaintStyle::Stroke { width_px } = a.style
                && (!width_px.is_finite() || width_px <= 0.0)
            {
                return Err(MotionError::validation(
                    "path asset stroke width must be finite and > 0",
                ));
            }
        }
        Asset::Counter(a) => {
            validate_rel_source(&a.font_source, "counter asset font_source")?;
            validate_size_px(a.size_px, "counter asset size_px")?;
            if let ValueMap::Series { values } = &a.map
                && values.is_empty()
            {
                return Err(MotionError::validation(
                    "counter Series map must be non-empty",
                ));
            }
        }
        Asset::Histogram(a) => {
            a.axes.validate()?;
            if a.bins == 0 {
                return Err(MotionError::validation("histogram bins must be > 0"));
            }
            if !(a.range[1] > a.range[0]) {
                return Err(MotionError::validation("histogram range must be increasing"));
            }
            if !(a.bar_width_frac > 0.0 && a.bar_width_frac <= 1.0) {
                return Err(MotionError::validation(
                    "histogram bar_width_frac must be in (0, 1]",
                ));
            }
        }
        Asset::Polyline(a) => {
            if a.points_px.len() < 2 {
                return Err(MotionError::validation(
                    "polyline asset needs at least two points",
                ));
            }
            if !(a.width_px > 0.0) {
                return Err(MotionError::validation("polyline width must be > 0"));
            }
        }
        Asset::Tangent(a) => {
            a.curve.validate()?;
            a.axes.validate()?;
            if !(a.dt > 0.0) {
                return Err(MotionError::validation("tangent dt must be > 0"));
            }
            if !(a.half_len > 0.0) {
                return Err(MotionError::validation("tangent half_len must be > 0"));
            }
            if let Some(label) = &a.label {
                validate_rel_source(&label.font_source, "tangent label font_source")?;
                validate_size_px(label.size_px, "tangent label size_px")?;
            }
        }
        Asset::Mesh3(a) => {
            a.field.validate()?;
            if a.resolution[0] == 0 || a.resolution[1] == 0 {
                return Err(MotionError::validation("mesh resolution must be > 0"));
            }
            if !(a.u_range[1] > a.u_range[0]) || !(a.v_range[1] > a.v_range[0]) {
                return Err(MotionError::validation("mesh ranges must be increasing"));
            }
        }
        Asset::Line3(a) => {
            if a.polylines.is_empty() || a.polylines.iter().any(|p| p.len() < 2) {
                return Err(MotionError::validation(
                    "line3 asset needs polylines of at least two points",
                ));
            }
        }
        Asset::Arrow3(a) => {
            if a.start == a.end {
                return Err(MotionError::validation(
                    "arrow3 start and end must be distinct",
                ));
            }
        }
        Asset::Dot3(a) => {
            if !(a.radius_px > 0.0) {
                return Err(MotionError::validation("dot3 radius must be > 0"));
            }
        }
    }
    Ok(())
}

fn validate_size_px(size_px: f32, field: &str) -> MotionResult<()> {
    if !size_px.is_finite() || size_px <= 0.0 {
        return Err(MotionError::validation(format!(
            "{field} must be finite and > 0"
        )));
    }
    Ok(())
}

fn validate_rel_source(source: &str, field: &str) -> MotionResult<()> {
    if source.trim().is_empty() {
        return Err(MotionError::validation(format!("{field} must be non-empty")));
    }
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(MotionError::validation(format!(
            "{field} must be a relative path"
        )));
    }
    for part in s.split('/') {
        if part == ".." {
            return Err(MotionError::validation(format!(
                "{field} must not contain '..'"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests_support {
    use super::*;

    /// Minimal valid composition containing only inline path assets, so tests
    /// can run without touching the filesystem.
    pub(crate) fn path_only_comp() -> Composition {
        let mut assets = BTreeMap::new();
        assets.insert(
            "p0".to_string(),
            Asset::Path(PathAsset {
                svg_path_d: "M10,10 L54,10 L54,54 L10,54 Z".to_string(),
                style: PaintStyle::Fill,
                color_rgba8: [255, 255, 255, 255],
            }),
        );
        assets.insert(
            "p1".to_string(),
            Asset::Path(PathAsset {
                svg_path_d: "M0,0 L40,0 L40,40 Z".to_string(),
                style: PaintStyle::Stroke { width_px: 3.0 },
                color_rgba8: [255, 210, 0, 255],
            }),
        );
        Composition {
            fps: Fps::new(30, 1).unwrap(),
            canvas: Canvas {
                width: 128,
                height: 128,
            },
            duration: FrameIndex(20),
            assets,
            tracks: vec![Track {
                name: "main".to_string(),
                z_base: 0,
                layout_mode: LayoutMode::Absolute,
                layout_gap_px: 0.0,
                layout_padding: Edges::default(),
                layout_align_x: LayoutAlignX::Start,
                layout_align_y: LayoutAlignY::Start,
                clips: vec![
                    Clip {
                        id: "c0".to_string(),
                        asset: "p0".to_string(),
                        range: FrameRange::new(FrameIndex(0), FrameIndex(20)).unwrap(),
                        props: ClipProps::default(),
                        z_offset: 0,
                        transition_in: None,
                        transition_out: None,
                    },
                    Clip {
                        id: "c1".to_string(),
                        asset: "p1".to_string(),
                        range: FrameRange::new(FrameIndex(5), FrameIndex(15)).unwrap(),
                        props: ClipProps {
                            transform: Anim::constant(crate::foundation::core::Transform2D::at(
                                30.0, 30.0,
                            )),
                            ..ClipProps::default()
                        },
                        z_offset: 1,
                        transition_in: None,
                        transition_out: None,
                    },
                ],
            }],
            camera: None,
            seed: 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::Vec2;

    pub(crate) fn basic_comp() -> Composition {
        let mut assets = BTreeMap::new();
        assets.insert(
            "p0".to_string(),
            Asset::Path(PathAsset {
                svg_path_d: "M0,0 L120,0 L120,120 L0,120 Z".to_string(),
                style: PaintStyle::Fill,
                color_rgba8: [255, 255, 0, 255],
            }),
        );
        Composition {
            fps: Fps::new(30, 1).unwrap(),
            canvas: Canvas {
                width: 1280,
                height: 720,
            },
            duration: FrameIndex(60),
            assets,
            tracks: vec![Track {
                name: "main".to_string(),
                z_base: 0,
                layout_mode: LayoutMode::Absolute,
                layout_gap_px: 0.0,
                layout_padding: Edges::default(),
                layout_align_x: LayoutAlignX::Start,
                layout_align_y: LayoutAlignY::Start,
                clips: vec![Clip {
                    id: "c0".to_string(),
                    asset: "p0".to_string(),
                    range: FrameRange::new(FrameIndex(0), FrameIndex(60)).unwrap(),
                    props: ClipProps {
                        transform: Anim::constant(Transform2D {
                            translate: Vec2::new(10.0, 20.0),
                            ..Transform2D::default()
                        }),
                        ..ClipProps::default()
                    },
                    z_offset: 0,
                    transition_in: Some(TransitionSpec {
                        kind: "fade".to_string(),
                        duration_frames: 10,
                        ease: Ease::Linear,
                        params: serde_json::Value::Null,
                    }),
                    transition_out: None,
                }],
            }],
            camera: None,
            seed: 123,
        }
    }

    #[test]
    fn json_roundtrip() {
        let comp = basic_comp();
        let s = serde_json::to_string_pretty(&comp).unwrap();
        let de: Composition = serde_json::from_str(&s).unwrap();
        assert_eq!(de.canvas.width, 1280);
        assert_eq!(de.assets.len(), 1);
        de.validate().unwrap();
    }

    #[test]
    fn validate_rejects_missing_asset() {
        let mut comp = basic_comp();
        comp.tracks[0].clips[0].asset = "missing".to_string();
        assert!(comp.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_bounds_range() {
        let mut comp = basic_comp();
        comp.tracks[0].clips[0].range = FrameRange {
            start: FrameIndex(0),
            end: FrameIndex(999),
        };
        assert!(comp.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_transition_kind() {
        let mut comp = basic_comp();
        comp.tracks[0].clips[0].transition_in = Some(TransitionSpec {
            kind: "explode".to_string(),
            duration_frames: 5,
            ease: Ease::Linear,
            params: serde_json::Value::Null,
        });
        assert!(comp.validate().is_err());
    }

    #[test]
    fn validate_requires_camera_for_3d_assets() {
        let mut comp = basic_comp();
        comp.assets.insert(
            "d0".to_string(),
            Asset::Dot3(Dot3Asset {
                at: [0.0, 0.0, 0.0],
                radius_px: 4.0,
                color_rgba8: [255, 0, 0, 255],
            }),
        );
        comp.tracks[0].clips.push(Clip {
            id: "c1".to_string(),
            asset: "d0".to_string(),
            range: FrameRange::new(FrameIndex(0), FrameIndex(10)).unwrap(),
            props: ClipProps::default(),
            z_offset: 1,
            transition_in: None,
            transition_out: None,
        });
        assert!(comp.validate().is_err());

        comp.camera = Some(CameraRig::fixed(1.2, -1.0, 0.7));
        comp.validate().unwrap();
    }

    #[test]
    fn value_map_series_clamps() {
        let m = ValueMap::Series {
            values: vec![1.0, 2.0, 3.0],
        };
        assert_eq!(m.apply(-5.0), 1.0);
        assert_eq!(m.apply(1.2), 2.0);
        assert_eq!(m.apply(99.0), 3.0);
    }
}
