use std::collections::BTreeMap;

use crate::{
    animation::anim::{Anim, InterpMode, Keyframe, Keyframes},
    animation::ease::Ease,
    composition::dsl::{ClipBuilder, CompositionBuilder, TrackBuilder},
    composition::model::{
        Asset, CameraRig, Composition, Edges, LayoutAlignX, LayoutAlignY, LayoutMode,
        TransitionSpec,
    },
    effects::transitions::GrowFrom,
    foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Transform2D},
    foundation::error::{MotionError, MotionResult},
};

/// Entrance animation kinds used by scene scripts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnterKind {
    /// Appear instantly, no transition.
    Appear,
    FadeIn,
    /// Progressive outline draw (plots, axes, step segments).
    Create,
    /// Glyph-by-glyph text reveal.
    Write,
    /// Scale up from an edge or the center.
    Grow(GrowFrom),
}

/// Handle to a scripted object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Handle(usize);

/// Identifier of a script track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackId(usize);

struct TrackSpec {
    name: String,
    z_base: i32,
    layout_mode: LayoutMode,
    layout_gap_px: f64,
    layout_padding: Edges,
    layout_align_x: LayoutAlignX,
    layout_align_y: LayoutAlignY,
}

struct ClipSpec {
    track: usize,
    key: String,
    z: i32,
    appear: Option<u64>,
    vanish: Option<u64>,
    enter: Option<TransitionSpec>,
    exit: Option<TransitionSpec>,
    transform_keys: Vec<Keyframe<Transform2D>>,
    opacity_keys: Vec<Keyframe<f64>>,
    param_keys: Vec<Keyframe<f64>>,
    last_transform: Transform2D,
    last_opacity: f64,
    last_param: f64,
}

struct CameraChannel {
    keys: Vec<Keyframe<f64>>,
    last: f64,
}

impl CameraChannel {
    fn new(value: f64) -> Self {
        Self {
            keys: Vec::new(),
            last: value,
        }
    }

    fn ramp_to(&mut self, value: f64, start: u64, end: u64, ease: Ease) {
        self.keys.push(Keyframe {
            frame: FrameIndex(start),
            value: self.last,
            ease,
        });
        self.keys.push(Keyframe {
            frame: FrameIndex(end),
            value,
            ease: Ease::Linear,
        });
        self.last = value;
    }

    fn build(self) -> Anim<f64> {
        if self.keys.is_empty() {
            Anim::constant(self.last)
        } else {
            Anim::Keyframes(Keyframes {
                keys: self.keys,
                mode: InterpMode::Linear,
                default: None,
            })
        }
    }
}

struct CameraSpec {
    phi: CameraChannel,
    theta: CameraChannel,
    zoom: CameraChannel,
}

/// Sequential scene scripting over a frame cursor.
///
/// Objects are spawned (hidden), then brought in, moved and removed by timed
/// plays, each advancing the cursor. `finish` assembles the final validated
/// [`Composition`].
pub struct SceneScript {
    fps: Fps,
    canvas: Canvas,
    seed: u64,
    cursor: u64,
    assets: BTreeMap<String, Asset>,
    tracks: Vec<TrackSpec>,
    clips: Vec<ClipSpec>,
    camera: Option<CameraSpec>,
}

impl SceneScript {
    pub fn new(fps: Fps, canvas: Canvas, seed: u64) -> Self {
        Self {
            fps,
            canvas,
            seed,
            cursor: 0,
            assets: BTreeMap::new(),
            tracks: Vec::new(),
            clips: Vec::new(),
            camera: None,
        }
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn now(&self) -> u64 {
        self.cursor
    }

    pub fn frames(&self, secs: f64) -> u64 {
        self.fps.secs_to_frames_floor(secs).max(1)
    }

    pub fn track(&mut self, name: impl Into<String>, z_base: i32) -> TrackId {
        self.tracks.push(TrackSpec {
            name: name.into(),
            z_base,
            layout_mode: LayoutMode::Absolute,
            layout_gap_px: 0.0,
            layout_padding: Edges::default(),
            layout_align_x: LayoutAlignX::Start,
            layout_align_y: LayoutAlignY::Start,
        });
        TrackId(self.tracks.len() - 1)
    }

    /// Track whose clips stack vertically (formula boxes, caption stacks).
    pub fn vstack_track(
        &mut self,
        name: impl Into<String>,
        z_base: i32,
        gap_px: f64,
        padding: Edges,
        align_x: LayoutAlignX,
        align_y: LayoutAlignY,
    ) -> TrackId {
        self.tracks.push(TrackSpec {
            name: name.into(),
            z_base,
            layout_mode: LayoutMode::VStack,
            layout_gap_px: gap_px,
            layout_padding: padding,
            layout_align_x: align_x,
            layout_align_y: align_y,
        });
        TrackId(self.tracks.len() - 1)
    }

    pub fn camera(&mut self, phi: f64, theta: f64, zoom: f64) {
        self.camera = Some(CameraSpec {
            phi: CameraChannel::new(phi),
            theta: CameraChannel::new(theta),
            zoom: CameraChannel::new(zoom),
        });
    }

    /// Register an object, hidden until a play brings it in.
    pub fn spawn(
        &mut self,
        track: TrackId,
        key: impl Into<String>,
        asset: Asset,
        at: Transform2D,
    ) -> MotionResult<Handle> {
        let key = key.into();
        if self.assets.contains_key(&key) {
            return Err(MotionError::validation(format!(
                "duplicate asset key '{key}'"
            )));
        }
        self.assets.insert(key.clone(), asset);
        self.clips.push(ClipSpec {
            track: track.0,
            key,
            z: self.clips.len() as i32,
            appear: None,
            vanish: None,
            enter: None,
            exit: None,
            transform_keys: Vec::new(),
            opacity_keys: Vec::new(),
            param_keys: Vec::new(),
            last_transform: at,
            last_opacity: 1.0,
            last_param: 0.0,
        });
        Ok(Handle(self.clips.len() - 1))
    }

    /// Register and make visible immediately, without a transition.
    pub fn add_now(
        &mut self,
        track: TrackId,
        key: impl Into<String>,
        asset: Asset,
        at: Transform2D,
    ) -> MotionResult<Handle> {
        let h = self.spawn(track, key, asset, at)?;
        self.clips[h.0].appear = Some(self.cursor);
        Ok(h)
    }

    pub fn wait(&mut self, secs: f64) {
        self.cursor += self.frames(secs);
    }

    /// Timed play: all animations recorded in the closure run simultaneously
    /// over `secs`, then the cursor advances.
    pub fn play(&mut self, secs: f64, f: impl FnOnce(&mut Play<'_>)) {
        let dur = self.frames(secs);
        let mut play = Play {
            script: self,
            duration: dur,
        };
        f(&mut play);
        self.cursor += dur;
    }

    /// Shorthand for a play that only brings objects in.
    pub fn show(&mut self, items: &[Handle], kind: EnterKind, secs: f64) {
        self.play(secs, |p| {
            for &h in items {
                p.enter(h, kind);
            }
        });
    }

    /// Shorthand for a play that only fades objects out.
    pub fn hide(&mut self, items: &[Handle], secs: f64) {
        self.play(secs, |p| {
            for &h in items {
                p.fade_out(h);
            }
        });
    }

    pub fn finish(self) -> MotionResult<Composition> {
        let duration = self.cursor.max(1);

        let mut builder = CompositionBuilder::new(self.fps, self.canvas, FrameIndex(duration))
            .seed(self.seed);
        if let Some(cam) = self.camera {
            builder = builder.camera(CameraRig {
                phi: cam.phi.build(),
                theta: cam.theta.build(),
                zoom: cam.zoom.build(),
            });
        }
        for (key, asset) in &self.assets {
            // Objects spawned but never shown carry no clip; their assets are
            // still registered so keep validation strict by only adding used keys.
            let used = self
                .clips
                .iter()
                .any(|c| c.appear.is_some() && c.key == *key);
            if used {
                builder = builder.asset(key.clone(), asset.clone())?;
            }
        }

        let mut track_builders: Vec<TrackBuilder> = self
            .tracks
            .into_iter()
            .map(|t| {
                TrackBuilder::new(t.name)
                    .z_base(t.z_base)
                    .layout_mode(t.layout_mode)
                    .layout_gap_px(t.layout_gap_px)
                    .layout_padding(t.layout_padding)
                    .layout_align(t.layout_align_x, t.layout_align_y)
            })
            .collect();

        for (idx, spec) in self.clips.into_iter().enumerate() {
            let Some(appear) = spec.appear else {
                continue;
            };
            let end = spec.vanish.unwrap_or(duration).min(duration);
            let range = FrameRange::new(FrameIndex(appear), FrameIndex(end))?;

            let transform = if spec.transform_keys.is_empty() {
                Anim::constant(spec.last_transform)
            } else {
                Anim::Keyframes(Keyframes {
                    keys: spec.transform_keys,
                    mode: InterpMode::Linear,
                    default: None,
                })
            };
            let opacity = if spec.opacity_keys.is_empty() {
                Anim::constant(spec.last_opacity)
            } else {
                Anim::Keyframes(Keyframes {
                    keys: spec.opacity_keys,
                    mode: InterpMode::Linear,
                    default: None,
                })
            };
            let param = if spec.param_keys.is_empty() {
                Anim::constant(spec.last_param)
            } else {
                Anim::Keyframes(Keyframes {
                    keys: spec.param_keys,
                    mode: InterpMode::Linear,
                    default: None,
                })
            };

            let mut clip = ClipBuilder::new(format!("clip{idx}_{}", spec.key), spec.key, range)
                .z_offset(spec.z)
                .transform(transform)
                .opacity(opacity)
                .param(param);
            if let Some(tr) = spec.enter {
                clip = clip.transition_in(tr);
            }
            if let Some(tr) = spec.exit {
                clip = clip.transition_out(tr);
            }

            let built = clip.build()?;
            let track = track_builders
                .get_mut(spec.track)
                .ok_or_else(|| MotionError::validation("clip references unknown track"))?;
            take_mut_track(track, built);
        }

        for track in track_builders {
            builder = builder.track(track.build()?);
        }
        builder.build()
    }
}

fn take_mut_track(track: &mut TrackBuilder, clip: crate::composition::model::Clip) {
    // TrackBuilder is a by-value builder; shuffle the clip in through a swap.
    let placeholder = TrackBuilder::new("placeholder");
    let current = std::mem::replace(track, placeholder);
    *track = current.clip(clip);
}

/// Recorder for one timed play.
pub struct Play<'a> {
    script: &'a mut SceneScript,
    duration: u64,
}

impl Play<'_> {
    fn clip(&mut self, h: Handle) -> &mut ClipSpec {
        &mut self.script.clips[h.0]
    }

    fn cursor(&self) -> u64 {
        self.script.cursor
    }

    /// Bring an object in with the given entrance over this play's window.
    pub fn enter(&mut self, h: Handle, kind: EnterKind) {
        let at = self.cursor();
        let dur = self.duration;
        let clip = self.clip(h);
        clip.appear = Some(at);
        clip.enter = match kind {
            EnterKind::Appear => None,
            EnterKind::FadeIn => Some(TransitionSpec {
                kind: "fade".to_string(),
                duration_frames: dur,
                ease: Ease::Linear,
                params: serde_json::Value::Null,
            }),
            EnterKind::Create => Some(TransitionSpec {
                kind: "draw".to_string(),
                duration_frames: dur,
                ease: Ease::InOutQuad,
                params: serde_json::Value::Null,
            }),
            EnterKind::Write => Some(TransitionSpec {
                kind: "write".to_string(),
                duration_frames: dur,
                ease: Ease::InOutQuad,
                params: serde_json::Value::Null,
            }),
            EnterKind::Grow(from) => Some(TransitionSpec {
                kind: "grow".to_string(),
                duration_frames: dur,
                ease: Ease::OutQuad,
                params: serde_json::json!({ "from": grow_from_str(from) }),
            }),
        };
    }

    /// Fade an object out; it leaves the timeline at the end of this play.
    pub fn fade_out(&mut self, h: Handle) {
        let end = self.cursor() + self.duration;
        let dur = self.duration;
        let clip = self.clip(h);
        clip.vanish = Some(end);
        clip.exit = Some(TransitionSpec {
            kind: "fade".to_string(),
            duration_frames: dur,
            ease: Ease::Linear,
            params: serde_json::Value::Null,
        });
    }

    /// Tween the object's transform to `to` over this play.
    pub fn tween(&mut self, h: Handle, to: Transform2D, ease: Ease) {
        let at = self.cursor();
        let dur = self.duration;
        let clip = self.clip(h);
        let appear = clip.appear.unwrap_or(at);
        let start_local = at.saturating_sub(appear);
        let from = clip.last_transform;
        clip.transform_keys.push(Keyframe {
            frame: FrameIndex(start_local),
            value: from,
            ease,
        });
        clip.transform_keys.push(Keyframe {
            frame: FrameIndex(start_local + dur),
            value: to,
            ease: Ease::Linear,
        });
        clip.last_transform = to;
    }

    /// Animate the object's opacity to `to` over this play.
    pub fn opacity(&mut self, h: Handle, to: f64) {
        let at = self.cursor();
        let dur = self.duration;
        let clip = self.clip(h);
        let appear = clip.appear.unwrap_or(at);
        let start_local = at.saturating_sub(appear);
        let from = clip.last_opacity;
        clip.opacity_keys.push(Keyframe {
            frame: FrameIndex(start_local),
            value: from,
            ease: Ease::Linear,
        });
        clip.opacity_keys.push(Keyframe {
            frame: FrameIndex(start_local + dur),
            value: to,
            ease: Ease::Linear,
        });
        clip.last_opacity = to;
    }

    /// Ramp the object's scalar driver from `from` to `to` over this play.
    pub fn param(&mut self, h: Handle, from: f64, to: f64) {
        let at = self.cursor();
        let dur = self.duration;
        let clip = self.clip(h);
        let appear = clip.appear.unwrap_or(at);
        let start_local = at.saturating_sub(appear);
        clip.param_keys.push(Keyframe {
            frame: FrameIndex(start_local),
            value: from,
            ease: Ease::Linear,
        });
        clip.param_keys.push(Keyframe {
            frame: FrameIndex(start_local + dur),
            value: to,
            ease: Ease::Linear,
        });
        clip.last_param = to;
    }

    /// Move the camera to new spherical angles (and optionally zoom).
    pub fn camera_to(&mut self, phi: f64, theta: f64, zoom: Option<f64>) {
        let start = self.cursor();
        let end = start + self.duration;
        let Some(cam) = self.script.camera.as_mut() else {
            return;
        };
        cam.phi.ramp_to(phi, start, end, Ease::InOutQuad);
        cam.theta.ramp_to(theta, start, end, Ease::InOutQuad);
        if let Some(z) = zoom {
            cam.zoom.ramp_to(z, start, end, Ease::InOutQuad);
        }
    }

    /// Ambient rotation: advance the azimuth linearly by `delta_theta`.
    pub fn camera_orbit(&mut self, delta_theta: f64) {
        let start = self.cursor();
        let end = start + self.duration;
        let Some(cam) = self.script.camera.as_mut() else {
            return;
        };
        let target = cam.theta.last + delta_theta;
        cam.theta.ramp_to(target, start, end, Ease::Linear);
    }
}

fn grow_from_str(from: GrowFrom) -> &'static str {
    match from {
        GrowFrom::Center => "center",
        GrowFrom::Left => "left",
        GrowFrom::Right => "right",
        GrowFrom::Top => "top",
        GrowFrom::Bottom => "bottom",
    }
}
