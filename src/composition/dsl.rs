use std::collections::BTreeMap;

use crate::{
    animation::anim::Anim,
    composition::model::{
        Asset, CameraRig, Clip, ClipProps, Composition, Edges, LayoutAlignX, LayoutAlignY,
        LayoutMode, Track, TransitionSpec,
    },
    foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Transform2D},
    foundation::error::{MotionError, MotionResult},
};

pub struct CompositionBuilder {
    fps: Fps,
    canvas: Canvas,
    duration: FrameIndex,
    seed: u64,
    camera: Option<CameraRig>,
    assets: BTreeMap<String, Asset>,
    tracks: Vec<Track>,
}

impl CompositionBuilder {
    pub fn new(fps: Fps, canvas: Canvas, duration: FrameIndex) -> Self {
        Self {
            fps,
            canvas,
            duration,
            seed: 0,
            camera: None,
            assets: BTreeMap::new(),
            tracks: Vec::new(),
        }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn camera(mut self, rig: CameraRig) -> Self {
        self.camera = Some(rig);
        self
    }

    pub fn asset(mut self, key: impl Into<String>, asset: Asset) -> MotionResult<Self> {
        let key = key.into();
        if self.assets.contains_key(&key) {
            return Err(MotionError::validation(format!(
                "duplicate asset key '{key}'"
            )));
        }
        self.assets.insert(key, asset);
        Ok(self)
    }

    pub fn track(mut self, track: Track) -> Self {
        self.tracks.push(track);
        self
    }

    pub fn build(self) -> MotionResult<Composition> {
        let comp = Composition {
            fps: self.fps,
            canvas: self.canvas,
            duration: self.duration,
            assets: self.assets,
            tracks: self.tracks,
            camera: self.camera,
            seed: self.seed,
        };
        comp.validate()?;
        Ok(comp)
    }
}

pub struct TrackBuilder {
    name: String,
    z_base: i32,
    layout_mode: LayoutMode,
    layout_gap_px: f64,
    layout_padding: Edges,
    layout_align_x: LayoutAlignX,
    layout_align_y: LayoutAlignY,
    clips: Vec<Clip>,
}

impl TrackBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            z_base: 0,
            layout_mode: LayoutMode::Absolute,
            layout_gap_px: 0.0,
            layout_padding: Edges::default(),
            layout_align_x: LayoutAlignX::Start,
            layout_align_y: LayoutAlignY::Start,
            clips: Vec::new(),
        }
    }

    pub fn z_base(mut self, z: i32) -> Self {
        self.z_base = z;
        self
    }

    pub fn clip(mut self, clip: Clip) -> Self {
        self.clips.push(clip);
        self
    }

    pub fn layout_mode(mut self, mode: LayoutMode) -> Self {
        self.layout_mode = mode;
        self
    }

    pub fn layout_gap_px(mut self, gap: f64) -> Self {
        self.layout_gap_px = gap;
        self
    }

    pub fn layout_padding(mut self, padding: Edges) -> Self {
        self.layout_padding = padding;
        self
    }

    pub fn layout_align(mut self, x: LayoutAlignX, y: LayoutAlignY) -> Self {
        self.layout_align_x = x;
        self.layout_align_y = y;
        self
    }

    pub fn build(self) -> MotionResult<Track> {
        if self.name.trim().is_empty() {
            return Err(MotionError::validation("track name must be non-empty"));
        }
        Ok(Track {
            name: self.name,
            z_base: self.z_base,
            layout_mode: self.layout_mode,
            layout_gap_px: self.layout_gap_px,
            layout_padding: self.layout_padding,
            layout_align_x: self.layout_align_x,
            layout_align_y: self.layout_align_y,
            clips: self.clips,
        })
    }
}

pub struct ClipBuilder {
    id: String,
    asset_key: String,
    range: FrameRange,
    z_offset: i32,
    opacity: Anim<f64>,
    transform: Anim<Transform2D>,
    param: Anim<f64>,
    transition_in: Option<TransitionSpec>,
    transition_out: Option<TransitionSpec>,
}

impl ClipBuilder {
    pub fn new(id: impl Into<String>, asset_key: impl Into<String>, range: FrameRange) -> Self {
        Self {
            id: id.into(),
            asset_key: asset_key.into(),
            range,
            z_offset: 0,
            opacity: Anim::constant(1.0),
            transform: Anim::constant(Transform2D::default()),
            param: Anim::constant(0.0),
            transition_in: None,
            transition_out: None,
        }
    }

    pub fn z_offset(mut self, z: i32) -> Self {
        self.z_offset = z;
        self
    }

    pub fn opacity(mut self, a: Anim<f64>) -> Self {
        self.opacity = a;
        self
    }

    pub fn transform(mut self, t: Anim<Transform2D>) -> Self {
        self.transform = t;
        self
    }

    pub fn param(mut self, p: Anim<f64>) -> Self {
        self.param = p;
        self
    }

    pub fn transition_in(mut self, tr: TransitionSpec) -> Self {
        self.transition_in = Some(tr);
        self
    }

    pub fn transition_out(mut self, tr: TransitionSpec) -> Self {
        self.transition_out = Some(tr);
        self
    }

    pub fn build(self) -> MotionResult<Clip> {
        if self.id.trim().is_empty() {
            return Err(MotionError::validation("clip id must be non-empty"));
        }
        if self.asset_key.trim().is_empty() {
            return Err(MotionError::validation("clip asset key must be non-empty"));
        }
        self.opacity.validate()?;
        self.transform.validate()?;
        self.param.validate()?;

        Ok(Clip {
            id: self.id,
            asset: self.asset_key,
            range: self.range,
            props: ClipProps {
                transform: self.transform,
                opacity: self.opacity,
                param: self.param,
            },
            z_offset: self.z_offset,
            transition_in: self.transition_in,
            transition_out: self.transition_out,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::ease::Ease;
    use crate::composition::model::{PaintStyle, PathAsset};
    use crate::foundation::core::Vec2;

    #[test]
    fn builders_create_expected_structure() {
        let clip = ClipBuilder::new(
            "c0",
            "p0",
            FrameRange::new(FrameIndex(0), FrameIndex(30)).unwrap(),
        )
        .opacity(Anim::constant(0.5))
        .transform(Anim::constant(Transform2D {
            translate: Vec2::new(1.0, 2.0),
            ..Transform2D::default()
        }))
        .transition_in(TransitionSpec {
            kind: "fade".to_string(),
            duration_frames: 10,
            ease: Ease::Linear,
            params: serde_json::Value::Null,
        })
        .build()
        .unwrap();

        let track = TrackBuilder::new("main").clip(clip).build().unwrap();

        let comp = CompositionBuilder::new(
            Fps::new(30, 1).unwrap(),
            Canvas {
                width: 640,
                height: 360,
            },
            FrameIndex(30),
        )
        .asset(
            "p0",
            Asset::Path(PathAsset {
                svg_path_d: "M0,0 L10,0 L10,10 Z".to_string(),
                style: PaintStyle::Fill,
                color_rgba8: [255, 255, 255, 255],
            }),
        )
        .unwrap()
        .track(track)
        .build()
        .unwrap();

        assert_eq!(comp.assets.len(), 1);
        assert_eq!(comp.tracks.len(), 1);
    }

    #[test]
    fn duplicate_asset_key_is_rejected() {
        let builder = CompositionBuilder::new(
            Fps::new(30, 1).unwrap(),
            Canvas {
                width: 640,
                height: 360,
            },
            FrameIndex(1),
        )
        .asset(
            "p0",
            Asset::Path(PathAsset {
                svg_path_d: "M0,0 L1,1".to_string(),
                style: PaintStyle::Stroke { width_px: 2.0 },
                color_rgba8: [255, 255, 255, 255],
            }),
        )
        .unwrap();
        assert!(
            builder
                .asset(
                    "p0",
                    Asset::Path(PathAsset {
                        svg_path_d: "M0,0 L2,2".to_string(),
                        style: PaintStyle::Fill,
                        color_rgba8: [255, 255, 255, 255],
                    }),
                )
                .is_err()
        );
    }
}
