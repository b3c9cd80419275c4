use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;

use crate::{
    composition::model::{self, PaintStyle},
    foundation::core::BezPath,
    foundation::error::{MotionError, MotionResult},
    foundation::math::Fnv1a64,
};

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Prepared text asset: shaped layout plus backing font data.
#[derive(Clone)]
pub struct PreparedText {
    pub layout: Arc<parley::Layout<TextBrushRgba8>>,
    pub font_bytes: Arc<Vec<u8>>,
    pub font_family: String,
}

impl std::fmt::Debug for PreparedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedText")
            .field("layout_ptr", &Arc::as_ptr(&self.layout))
            .field("font_bytes_len", &self.font_bytes.len())
            .field("font_family", &self.font_family)
            .finish()
    }
}

/// Prepared vector path asset parsed from SVG path data.
#[derive(Clone, Debug)]
pub struct PreparedPath {
    pub path: BezPath,
    pub style: PaintStyle,
    pub color_rgba8: [u8; 4],
}

/// Raw font bytes for labels laid out at render time (counters, tangent labels).
#[derive(Clone)]
pub struct PreparedFont {
    pub font_bytes: Arc<Vec<u8>>,
}

impl std::fmt::Debug for PreparedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedFont")
            .field("font_bytes_len", &self.font_bytes.len())
            .finish()
    }
}

/// Union of prepared asset kinds consumed by compiler and renderers.
///
/// Only IO-bearing assets are prepared here; parametric and 3D assets carry
/// their data inline in the composition and are lowered at compile time.
#[derive(Clone, Debug)]
pub enum PreparedAsset {
    Text(PreparedText),
    Path(PreparedPath),
    Font(PreparedFont),
}

/// Stable hashed identifier used for prepared assets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AssetId(pub(crate) u64);

impl AssetId {
    pub fn from_u64(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Normalized identity key used to derive deterministic [`AssetId`] values.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AssetKey {
    pub norm_path: String,
    pub params: Vec<(String, String)>,
}

impl AssetKey {
    pub fn new(norm_path: String, mut params: Vec<(String, String)>) -> Self {
        params.sort();
        Self { norm_path, params }
    }
}

/// Immutable store of prepared assets keyed by composition asset keys.
///
/// Front-loads all filesystem IO (font files) so evaluation, compilation and
/// rendering stay deterministic and IO-free.
#[derive(Clone, Debug)]
pub struct PreparedAssetStore {
    root: PathBuf,
    ids_by_key: HashMap<String, AssetId>,
    assets_by_id: HashMap<AssetId, PreparedAsset>,
}

impl PreparedAssetStore {
    pub fn prepare(comp: &model::Composition, root: impl Into<PathBuf>) -> MotionResult<Self> {
        let root = root.into();
        let mut out = Self {
            root,
            ids_by_key: HashMap::new(),
            assets_by_id: HashMap::new(),
        };

        let mut text_engine = TextLayoutEngine::new();
        for (asset_key, asset) in &comp.assets {
            let Some((kind, key)) = out.key_for(asset)? else {
                continue; // inline data asset, nothing to prepare
            };
            let id = Self::hash_id_for_key(kind, &key);

            let prepared = match asset {
                model::Asset::Text(a) => {
                    let font_bytes = out.read_bytes(&key.norm_path)?;
                    let brush = TextBrushRgba8 {
                        r: a.color_rgba8[0],
                        g: a.color_rgba8[1],
                        b: a.color_rgba8[2],
                        a: a.color_rgba8[3],
                    };
                    let layout = text_engine.layout_plain(
                        &a.text,
                        font_bytes.as_slice(),
                        a.size_px,
                        brush,
                        a.max_width_px,
                    )?;
                    let family = text_engine
                        .last_family_name()
                        .unwrap_or_else(|| "unknown".to_string());
                    PreparedAsset::Text(PreparedText {
                        layout: Arc::new(layout),
                        font_bytes: Arc::new(font_bytes),
                        font_family: family,
                    })
                }
                model::Asset::Path(a) => PreparedAsset::Path(PreparedPath {
                    path: parse_svg_path(&a.svg_path_d)?,
                    style: a.style,
                    color_rgba8: a.color_rgba8,
                }),
                model::Asset::Counter(_) | model::Asset::Tangent(_) => {
                    let font_bytes = out.read_bytes(&key.norm_path)?;
                    PreparedAsset::Font(PreparedFont {
                        font_bytes: Arc::new(font_bytes),
                    })
                }
                _ => continue,
            };

            out.ids_by_key.insert(asset_key.clone(), id);
            out.assets_by_id.insert(id, prepared);
        }

        Ok(out)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn id_for_key(&self, key: &str) -> MotionResult<AssetId> {
        self.ids_by_key
            .get(key)
            .copied()
            .ok_or_else(|| MotionError::evaluation(format!("unknown asset key '{key}'")))
    }

    pub fn get(&self, id: AssetId) -> MotionResult<&PreparedAsset> {
        self.assets_by_id
            .get(&id)
            .ok_or_else(|| MotionError::evaluation(format!("unknown AssetId {}", id.as_u64())))
    }

    /// Intrinsic pixel size used by the stack layout solver. Parametric and 3D
    /// assets occupy no intrinsic space.
    pub fn intrinsic_size_for_key(&self, key: &str) -> (f64, f64) {
        let Ok(id) = self.id_for_key(key) else {
            return (0.0, 0.0);
        };
        match self.assets_by_id.get(&id) {
            Some(PreparedAsset::Text(t)) => {
                let mut w = 0.0f64;
                let mut h = 0.0f64;
                for line in t.layout.lines() {
                    let m = line.metrics();
                    w = w.max(f64::from(m.advance));
                    h += f64::from(m.ascent + m.descent + m.leading);
                }
                (w.max(1.0), h.max(1.0))
            }
            Some(PreparedAsset::Path(p)) => {
                use kurbo::Shape;
                let bbox = p.path.bounding_box();
                (bbox.width().max(1.0), bbox.height().max(1.0))
            }
            _ => (0.0, 0.0),
        }
    }

    fn key_for(&self, asset: &model::Asset) -> MotionResult<Option<(u8, AssetKey)>> {
        let out = match asset {
            model::Asset::Text(a) => {
                let norm_path = normalize_rel_path(&a.font_source)?;
                let mut params = vec![
                    ("text".to_string(), a.text.clone()),
                    (
                        "size_px_bits".to_string(),
                        format!("0x{:08x}", a.size_px.to_bits()),
                    ),
                    (
                        "color_rgba8".to_string(),
                        format!(
                            "#{:02x}{:02x}{:02x}{:02x}",
                            a.color_rgba8[0], a.color_rgba8[1], a.color_rgba8[2], a.color_rgba8[3]
                        ),
                    ),
                ];
                if let Some(w) = a.max_width_px {
                    params.push((
                        "max_width_px_bits".to_string(),
                        format!("0x{:08x}", w.to_bits()),
                    ));
                }
                Some((b'T', AssetKey::new(norm_path, params)))
            }
            model::Asset::Path(a) => Some((
                b'P',
                AssetKey::new(
                    "inline:path".to_string(),
                    vec![
                        ("svg_path_d".to_string(), a.svg_path_d.clone()),
                        ("style".to_string(), format!("{:?}", a.style)),
                        (
                            "color_rgba8".to_string(),
                            format!(
                                "#{:02x}{:02x}{:02x}{:02x}",
                                a.color_rgba8[0],
                                a.color_rgba8[1],
                                a.color_rgba8[2],
                                a.color_rgba8[3]
                            ),
                        ),
                    ],
                ),
            )),
            model::Asset::Counter(a) => Some((
                b'F',
                AssetKey::new(normalize_rel_path(&a.font_source)?, vec![]),
            )),
            model::Asset::Tangent(a) => match &a.label {
                Some(label) => Some((
                    b'F',
                    AssetKey::new(normalize_rel_path(&label.font_source)?, vec![]),
                )),
                None => None,
            },
            _ => None,
        };
        Ok(out)
    }

    fn hash_id_for_key(kind_tag: u8, key: &AssetKey) -> AssetId {
        let mut hasher = Fnv1a64::new_default();
        hasher.write_u8(kind_tag);
        hasher.write_bytes(key.norm_path.as_bytes());
        hasher.write_u8(0);
        for (k, v) in &key.params {
            hasher.write_bytes(k.as_bytes());
            hasher.write_u8(0);
            hasher.write_bytes(v.as_bytes());
            hasher.write_u8(0);
        }
        AssetId(hasher.finish())
    }

    fn read_bytes(&self, norm_path: &str) -> MotionResult<Vec<u8>> {
        let path = self.root.join(Path::new(norm_path));
        std::fs::read(&path)
            .with_context(|| format!("read asset bytes from '{}'", path.display()))
            .map_err(MotionError::from)
    }
}

/// Normalize and validate composition-relative asset paths.
pub fn normalize_rel_path(source: &str) -> MotionResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(MotionError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(MotionError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(MotionError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(MotionError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

fn parse_svg_path(d: &str) -> MotionResult<BezPath> {
    let d = d.trim();
    if d.is_empty() {
        return Err(MotionError::validation(
            "path asset svg_path_d must be non-empty",
        ));
    }

    BezPath::from_svg(d).map_err(|e| MotionError::validation(format!("invalid svg_path_d: {e}")))
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    last_family_name: Option<String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            last_family_name: None,
        }
    }

    pub fn last_family_name(&self) -> Option<String> {
        self.last_family_name.clone()
    }

    /// Shape and lay out plain text using provided font bytes and styling.
    pub fn layout_plain(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        brush: TextBrushRgba8,
        max_width_px: Option<f32>,
    ) -> MotionResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(MotionError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            MotionError::validation("no font families registered from font bytes")
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| MotionError::validation("registered font family has no name"))?
            .to_string();
        self.last_family_name = Some(family_name.clone());

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        if let Some(w) = max_width_px {
            layout.break_all_lines(Some(w));
            layout.align(
                Some(w),
                parley::Alignment::Start,
                parley::AlignmentOptions::default(),
            );
        } else {
            layout.break_all_lines(None);
        }

        Ok(layout)
    }
}
