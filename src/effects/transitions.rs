use crate::{
    composition::model::TransitionSpec,
    foundation::error::{MotionError, MotionResult},
};

/// Edge geometry grows from during a `grow` transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrowFrom {
    Center,
    Left,
    Right,
    Top,
    Bottom,
}

/// Entrance/exit animation kinds.
///
/// `Fade` scales layer opacity, `Draw` reveals geometry by arc length (or quad
/// sweep for meshes), `Write` reveals text glyph by glyph, `Grow` scales from an
/// edge or the center.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    Fade,
    Draw,
    Write,
    Grow { from: GrowFrom },
}

pub fn parse_transition_kind_params(
    kind: &str,
    params: &serde_json::Value,
) -> MotionResult<TransitionKind> {
    let kind = kind.trim().to_ascii_lowercase();
    if kind.is_empty() {
        return Err(MotionError::validation("transition kind must be non-empty"));
    }

    match kind.as_str() {
        "fade" => Ok(TransitionKind::Fade),
        "draw" => Ok(TransitionKind::Draw),
        "write" => Ok(TransitionKind::Write),
        "grow" => {
            let params = if params.is_null() {
                None
            } else {
                Some(
                    params
                        .as_object()
                        .ok_or_else(|| MotionError::validation("grow params must be an object"))?,
                )
            };

            let from = match params.and_then(|p| p.get("from")).and_then(|v| v.as_str()) {
                None => GrowFrom::Center,
                Some(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "center" => GrowFrom::Center,
                    "left" => GrowFrom::Left,
                    "right" => GrowFrom::Right,
                    "top" => GrowFrom::Top,
                    "bottom" => GrowFrom::Bottom,
                    other => {
                        return Err(MotionError::validation(format!(
                            "unknown grow.from '{other}'"
                        )));
                    }
                },
            };

            Ok(TransitionKind::Grow { from })
        }
        _ => Err(MotionError::validation(format!(
            "unknown transition kind '{kind}'"
        ))),
    }
}

pub fn parse_transition(spec: &TransitionSpec) -> MotionResult<TransitionKind> {
    parse_transition_kind_params(&spec.kind, &spec.params)
}
