//! Mathmotion is a programmatic math-animation rendering engine with a library
//! of built-in educational scenes (derivatives, gradient descent, gradients and
//! partial derivatives, the law of large numbers, extrema and saddle points).
//!
//! # Pipeline overview
//!
//! 1. **Scene build**: a scene script produces a pure-data [`Composition`]
//! 2. **Evaluate**: `Composition + FrameIndex -> EvaluatedGraph` (what is
//!    visible, with sampled transforms, drivers and transition progress)
//! 3. **Compile**: `EvaluatedGraph -> RenderPlan` (parametric and 3D assets are
//!    lowered per frame into concrete 2D draw ops)
//! 4. **Render**: `RenderPlan -> FrameRGBA` (CPU backend on `vello_cpu`)
//! 5. **Encode** (optional): stream frames to the system `ffmpeg` binary
//!
//! Key constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: evaluation and compilation are pure and
//!   stable for a given input, simulations are seeded.
//! - **No IO in renderers**: fonts are front-loaded in [`PreparedAssetStore`].
//! - **Premultiplied RGBA8** end-to-end.
#![forbid(unsafe_code)]

mod animation;
mod assets;
mod compile;
mod composition;
mod effects;
mod encode;
mod eval;
mod foundation;
mod layout;
mod plot;
mod render;
mod scene;

pub mod math;
pub mod scenes;

pub use animation::anim::{Anim, InterpMode, Keyframe, Keyframes, Lerp, LoopMode, SampleCtx};
pub use animation::ease::Ease;
pub use animation::ops::{delay, loop_, mix, reverse, sequence, speed, stagger};
pub use assets::store::{
    AssetId, AssetKey, PreparedAsset, PreparedAssetStore, PreparedFont, PreparedPath, PreparedText,
    TextBrushRgba8, TextLayoutEngine, normalize_rel_path,
};
pub use compile::fingerprint::{FrameFingerprint, fingerprint_eval};
pub use compile::plan::{
    CompositeOp, CompositePass, DrawOp, Pass, PixelFormat, RenderPlan, ScenePass, SurfaceDesc,
    SurfaceId, compile_frame,
};
pub use composition::dsl::{ClipBuilder, CompositionBuilder, TrackBuilder};
pub use composition::model::{
    Arrow3Asset, Asset, CameraRig, Clip, ClipProps, Composition, CounterAsset, Dot3Asset, Edges,
    HistogramAsset, LayoutAlignX, LayoutAlignY, LayoutMode, Line3Asset, Mesh3Asset, PaintStyle,
    PathAsset, PolylineAsset, TangentAsset, TangentLabel, TextAsset, Track, TransitionSpec,
    ValueMap,
};
pub use effects::transitions::{GrowFrom, TransitionKind, parse_transition};
pub use encode::ffmpeg::{
    EncodeConfig, FfmpegEncoder, default_mp4_config, ensure_parent_dir, is_ffmpeg_on_path,
};
pub use eval::evaluator::{EvaluatedClipNode, EvaluatedGraph, Evaluator, ResolvedTransition};
pub use foundation::core::{
    Affine, BezPath, Canvas, Fps, FrameIndex, FrameRange, Point, Rect, Rgba8Premul, Transform2D,
    Vec2,
};
pub use foundation::error::{MotionError, MotionResult};
pub use layout::solver::{LayoutOffsets, resolve_layout_offsets};
pub use plot::axes::{Axes2D, circle_path, dashed_line_path, line_path, polyline_path, rect_path};
pub use plot::camera::{CameraState, Projector};
pub use plot::paths::{path_length, trim_path_prefix};
pub use render::backend::{FrameRGBA, RenderBackend, RenderSettings};
pub use render::cpu::CpuBackend;
pub use render::passes::{PassBackend, execute_plan};
pub use render::pipeline::{
    RenderStats, RenderThreading, RenderToMp4Opts, render_frame, render_frames,
    render_frames_with_stats, render_to_mp4, render_to_mp4_with_stats,
};
pub use scene::script::{EnterKind, Handle, Play, SceneScript, TrackId};
