use crate::{
    assets::store::PreparedAssetStore,
    composition::model::{Composition, LayoutAlignX, LayoutAlignY, LayoutMode, Track},
    foundation::core::Vec2,
    foundation::error::MotionResult,
};

/// Precomputed per-clip translation offsets for stacked tracks.
#[derive(Clone, Debug, Default)]
pub struct LayoutOffsets {
    per_track: Vec<Vec<Vec2>>,
}

impl LayoutOffsets {
    pub fn offset_for(&self, track_idx: usize, clip_idx: usize) -> Vec2 {
        self.per_track
            .get(track_idx)
            .and_then(|v| v.get(clip_idx))
            .copied()
            .unwrap_or_else(|| Vec2::new(0.0, 0.0))
    }
}

pub fn resolve_layout_offsets(
    comp: &Composition,
    assets: &PreparedAssetStore,
) -> MotionResult<LayoutOffsets> {
    let mut per_track = Vec::<Vec<Vec2>>::with_capacity(comp.tracks.len());
    for track in &comp.tracks {
        per_track.push(resolve_track_offsets(comp, track, assets));
    }
    Ok(LayoutOffsets { per_track })
}

fn resolve_track_offsets(comp: &Composition, track: &Track, assets: &PreparedAssetStore) -> Vec<Vec2> {
    let mut offsets = vec![Vec2::new(0.0, 0.0); track.clips.len()];
    if track.layout_mode == LayoutMode::Absolute || track.clips.is_empty() {
        return offsets;
    }

    let sizes: Vec<(f64, f64)> = track
        .clips
        .iter()
        .map(|clip| assets.intrinsic_size_for_key(&clip.asset))
        .collect();

    let x0 = track.layout_padding.left;
    let y0 = track.layout_padding.top;
    let avail_w =
        (comp.canvas.width as f64 - track.layout_padding.left - track.layout_padding.right)
            .max(0.0);
    let avail_h =
        (comp.canvas.height as f64 - track.layout_padding.top - track.layout_padding.bottom)
            .max(0.0);

    match track.layout_mode {
        LayoutMode::Absolute => {}
        LayoutMode::VStack => {
            let total_h = sizes.iter().map(|(_, h)| *h).sum::<f64>()
                + (track.clips.len().saturating_sub(1) as f64) * track.layout_gap_px;
            let mut y = y0 + align_offset(avail_h, total_h, track.layout_align_y);
            for (idx, &(w, h)) in sizes.iter().enumerate() {
                let x = x0 + align_offset(avail_w, w, track.layout_align_x);
                offsets[idx] = Vec2::new(x, y);
                y += h + track.layout_gap_px;
            }
        }
    }
    offsets
}

fn align_offset<A: Into<AlignKind>>(container: f64, content: f64, align: A) -> f64 {
    let rem = (container - content).max(0.0);
    match align.into() {
        AlignKind::Start => 0.0,
        AlignKind::Center => rem * 0.5,
        AlignKind::End => rem,
    }
}

enum AlignKind {
    Start,
    Center,
    End,
}

impl From<LayoutAlignX> for AlignKind {
    fn from(value: LayoutAlignX) -> Self {
        match value {
            LayoutAlignX::Start => AlignKind::Start,
            LayoutAlignX::Center => AlignKind::Center,
            LayoutAlignX::End => AlignKind::End,
        }
    }
}

impl From<LayoutAlignY> for AlignKind {
    fn from(value: LayoutAlignY) -> Self {
        match value {
            LayoutAlignY::Start => AlignKind::Start,
            LayoutAlignY::Center => AlignKind::Center,
            LayoutAlignY::End => AlignKind::End,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::model::tests_support::path_only_comp;

    #[test]
    fn absolute_tracks_have_zero_offsets() {
        let comp = path_only_comp();
        let store = PreparedAssetStore::prepare(&comp, ".").unwrap();
        let offsets = resolve_layout_offsets(&comp, &store).unwrap();
        assert_eq!(offsets.offset_for(0, 0), Vec2::new(0.0, 0.0));
        assert_eq!(offsets.offset_for(0, 1), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn vstack_stacks_downward_with_gap() {
        let mut comp = path_only_comp();
        comp.tracks[0].layout_mode = LayoutMode::VStack;
        comp.tracks[0].layout_gap_px = 6.0;
        let store = PreparedAssetStore::prepare(&comp, ".").unwrap();
        let offsets = resolve_layout_offsets(&comp, &store).unwrap();

        let first = offsets.offset_for(0, 0);
        let second = offsets.offset_for(0, 1);
        // First path is 44px tall (bbox of the square at 10..54).
        assert_eq!(first.y, 0.0);
        assert_eq!(second.y, 44.0 + 6.0);
    }

    #[test]
    fn vstack_end_alignment_pushes_right() {
        let mut comp = path_only_comp();
        comp.tracks[0].layout_mode = LayoutMode::VStack;
        comp.tracks[0].layout_align_x = LayoutAlignX::End;
        comp.tracks[0].layout_padding.right = 8.0;
        let store = PreparedAssetStore::prepare(&comp, ".").unwrap();
        let offsets = resolve_layout_offsets(&comp, &store).unwrap();

        // Canvas 128 wide, 8 right padding, first path 44 wide.
        let first = offsets.offset_for(0, 0);
        assert_eq!(first.x, 128.0 - 8.0 - 44.0);
    }

    #[test]
    fn missing_intrinsic_sizes_degrade_to_zero() {
        let comp = path_only_comp();
        let store = PreparedAssetStore::prepare(&comp, ".").unwrap();
        assert_eq!(store.intrinsic_size_for_key("nope"), (0.0, 0.0));
    }
}
