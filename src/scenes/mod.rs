//! Built-in educational scenes.
//!
//! Each scene builds a validated [`Composition`] through [`SceneScript`]; the
//! CLI renders them by name. Fonts resolve against the assets root
//! (`fonts/DejaVuSans.ttf` by default).

use kurbo::BezPath;

use crate::{
    composition::model::{Asset, Composition, PaintStyle, PathAsset, TextAsset},
    foundation::core::{Canvas, Fps},
    foundation::error::MotionResult,
    scene::script::SceneScript,
};

mod derivatives;
mod extrema;
mod gradient_field;
mod law_of_large_numbers;
mod learning_rate;
mod partials;
mod saddle;
mod space;
mod square_area;

pub(crate) const FONT: &str = "fonts/DejaVuSans.ttf";

pub(crate) const CANVAS: Canvas = Canvas {
    width: 1280,
    height: 720,
};

/// Straight-alpha RGBA8 palette shared by the scenes.
pub(crate) mod palette {
    pub const WHITE: [u8; 4] = [255, 255, 255, 255];
    pub const BLUE: [u8; 4] = [88, 196, 221, 255];
    pub const BLUE_D: [u8; 4] = [41, 171, 202, 255];
    pub const BLUE_E: [u8; 4] = [35, 107, 142, 255];
    pub const RED: [u8; 4] = [252, 98, 85, 255];
    pub const GREEN: [u8; 4] = [131, 193, 103, 255];
    pub const YELLOW: [u8; 4] = [255, 255, 0, 255];
    pub const ORANGE: [u8; 4] = [255, 134, 47, 255];
    pub const PURPLE: [u8; 4] = [154, 114, 172, 255];

    pub const fn with_alpha(color: [u8; 4], a: u8) -> [u8; 4] {
        [color[0], color[1], color[2], a]
    }
}

/// A named scene the CLI can render.
#[derive(Clone, Copy)]
pub struct SceneDef {
    pub name: &'static str,
    pub summary: &'static str,
    pub build: fn() -> MotionResult<Composition>,
}

pub fn all() -> Vec<SceneDef> {
    vec![
        SceneDef {
            name: "derivatives",
            summary: "Distance vs time, tangent slope sliding along the curve",
            build: derivatives::build,
        },
        SceneDef {
            name: "square-derivative",
            summary: "Geometric proof that d(x^2)/dx = 2x",
            build: square_area::build,
        },
        SceneDef {
            name: "learning-rate-too-big",
            summary: "Gradient descent with alpha = 0.99 oscillates",
            build: learning_rate::build_too_big,
        },
        SceneDef {
            name: "learning-rate-too-small",
            summary: "Gradient descent with alpha = 0.005 crawls",
            build: learning_rate::build_too_small,
        },
        SceneDef {
            name: "learning-rate-just-right",
            summary: "Gradient descent with alpha = 0.1 converges",
            build: learning_rate::build_just_right,
        },
        SceneDef {
            name: "gradient-vectors",
            summary: "Gradient arrows on the paraboloid x^2 + y^2",
            build: gradient_field::build,
        },
        SceneDef {
            name: "partial-derivatives",
            summary: "Axis slices of x^2 + y^2 and both partials",
            build: partials::build,
        },
        SceneDef {
            name: "law-of-large-numbers",
            summary: "Running dice average vs the histogram of sample means",
            build: law_of_large_numbers::build,
        },
        SceneDef {
            name: "bowl-shapes-up",
            summary: "Minimum of 2 + x^2 (still frame)",
            build: extrema::build_up,
        },
        SceneDef {
            name: "bowl-shapes-down",
            summary: "Maximum of 2 - x^2 (still frame)",
            build: extrema::build_down,
        },
        SceneDef {
            name: "saddle-point",
            summary: "The saddle x^2 - y^2, up along x and down along y",
            build: saddle::build,
        },
    ]
}

pub fn by_name(name: &str) -> Option<SceneDef> {
    all().into_iter().find(|s| s.name == name)
}

pub(crate) fn base_script(seed: u64) -> SceneScript {
    SceneScript::new(Fps { num: 30, den: 1 }, CANVAS, seed)
}

pub(crate) fn text(content: impl Into<String>, size_px: f32, color: [u8; 4]) -> Asset {
    Asset::Text(TextAsset {
        text: content.into(),
        font_source: FONT.to_string(),
        size_px,
        max_width_px: None,
        color_rgba8: color,
    })
}

pub(crate) fn stroke(path: &BezPath, width_px: f64, color: [u8; 4]) -> Asset {
    Asset::Path(PathAsset {
        svg_path_d: path.to_svg(),
        style: PaintStyle::Stroke { width_px },
        color_rgba8: color,
    })
}

pub(crate) fn fill(path: &BezPath, color: [u8; 4]) -> Asset {
    Asset::Path(PathAsset {
        svg_path_d: path.to_svg(),
        style: PaintStyle::Fill,
        color_rgba8: color,
    })
}

/// Filled dot centered on the local origin, positioned via the clip transform
/// so scale pulses stay centered.
pub(crate) fn dot(radius_px: f64, color: [u8; 4]) -> Asset {
    fill(
        &crate::plot::axes::circle_path(kurbo::Point::ZERO, radius_px),
        color,
    )
}

/// Rough advance-width estimate used to center text without shaping it.
pub(crate) fn approx_text_width(content: &str, size_px: f32) -> f64 {
    let longest = content
        .lines()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);
    longest as f64 * f64::from(size_px) * 0.52
}

/// X position that roughly centers `content` on the canvas.
pub(crate) fn centered_x(content: &str, size_px: f32) -> f64 {
    (f64::from(CANVAS.width) - approx_text_width(content, size_px)) * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_names_are_unique() {
        let scenes = all();
        for (i, a) in scenes.iter().enumerate() {
            for b in &scenes[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
        assert!(by_name("derivatives").is_some());
        assert!(by_name("nope").is_none());
    }

    #[test]
    fn every_scene_builds_and_validates() {
        for scene in all() {
            let comp = (scene.build)().unwrap_or_else(|e| {
                panic!("scene '{}' failed to build: {e}", scene.name);
            });
            comp.validate()
                .unwrap_or_else(|e| panic!("scene '{}' failed validation: {e}", scene.name));
            assert!(comp.duration.0 > 0);
        }
    }
}
