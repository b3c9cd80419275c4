use kurbo::{BezPath, Circle, Point, Rect, Shape};

use crate::foundation::error::{MotionError, MotionResult};
use crate::math::functions::Curve1;

/// Mapping from math coordinates to screen pixels for one 2D plot panel.
///
/// `rect_px` is the plot area `[x, y, w, h]` in screen pixels (y down); value
/// space maps into it with the y axis flipped so larger values sit higher.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Axes2D {
    pub x_range: [f64; 2],
    pub y_range: [f64; 2],
    pub rect_px: [f64; 4],
}

impl Axes2D {
    pub fn new(x_range: [f64; 2], y_range: [f64; 2], rect_px: [f64; 4]) -> Self {
        Self {
            x_range,
            y_range,
            rect_px,
        }
    }

    pub fn validate(&self) -> MotionResult<()> {
        if !(self.x_range[1] > self.x_range[0]) || !(self.y_range[1] > self.y_range[0]) {
            return Err(MotionError::validation("Axes2D ranges must be increasing"));
        }
        if !(self.rect_px[2] > 0.0) || !(self.rect_px[3] > 0.0) {
            return Err(MotionError::validation("Axes2D rect must have positive size"));
        }
        Ok(())
    }

    pub fn x_to_px(&self, x: f64) -> f64 {
        let t = (x - self.x_range[0]) / (self.x_range[1] - self.x_range[0]);
        self.rect_px[0] + t * self.rect_px[2]
    }

    pub fn y_to_px(&self, y: f64) -> f64 {
        let t = (y - self.y_range[0]) / (self.y_range[1] - self.y_range[0]);
        self.rect_px[1] + (1.0 - t) * self.rect_px[3]
    }

    /// Value coordinates to pixel point (the `c2p` of this crate).
    pub fn to_px(&self, x: f64, y: f64) -> Point {
        Point::new(self.x_to_px(x), self.y_to_px(y))
    }

    /// Axis lines with tick marks and small arrow tips.
    ///
    /// Each axis is drawn on its zero line when zero lies in range, otherwise on
    /// the low edge of the plot area.
    pub fn frame_path(&self, x_step: f64, y_step: f64, tick_px: f64) -> BezPath {
        let y_axis_x = if self.x_range[0] <= 0.0 && 0.0 <= self.x_range[1] {
            self.x_to_px(0.0)
        } else {
            self.rect_px[0]
        };
        let x_axis_y = if self.y_range[0] <= 0.0 && 0.0 <= self.y_range[1] {
            self.y_to_px(0.0)
        } else {
            self.rect_px[1] + self.rect_px[3]
        };

        let mut p = BezPath::new();

        // Axis lines.
        p.move_to((self.rect_px[0], x_axis_y));
        p.line_to((self.rect_px[0] + self.rect_px[2], x_axis_y));
        p.move_to((y_axis_x, self.rect_px[1] + self.rect_px[3]));
        p.line_to((y_axis_x, self.rect_px[1]));

        // Arrow tips.
        let tip = tick_px * 1.6;
        p.move_to((self.rect_px[0] + self.rect_px[2] - tip, x_axis_y - tip * 0.6));
        p.line_to((self.rect_px[0] + self.rect_px[2], x_axis_y));
        p.line_to((self.rect_px[0] + self.rect_px[2] - tip, x_axis_y + tip * 0.6));
        p.move_to((y_axis_x - tip * 0.6, self.rect_px[1] + tip));
        p.line_to((y_axis_x, self.rect_px[1]));
        p.line_to((y_axis_x + tip * 0.6, self.rect_px[1] + tip));

        // Ticks.
        if x_step > 0.0 {
            let mut x = (self.x_range[0] / x_step).ceil() * x_step;
            while x <= self.x_range[1] {
                let px = self.x_to_px(x);
                p.move_to((px, x_axis_y - tick_px));
                p.line_to((px, x_axis_y + tick_px));
                x += x_step;
            }
        }
        if y_step > 0.0 {
            let mut y = (self.y_range[0] / y_step).ceil() * y_step;
            while y <= self.y_range[1] {
                let py = self.y_to_px(y);
                p.move_to((y_axis_x - tick_px, py));
                p.line_to((y_axis_x + tick_px, py));
                y += y_step;
            }
        }

        p
    }

    /// Sample `curve` over `x_range` into a screen-space polyline.
    pub fn plot(&self, curve: &Curve1, x_range: [f64; 2], samples: usize) -> BezPath {
        let n = samples.max(2);
        let mut p = BezPath::new();
        for i in 0..n {
            let t = i as f64 / (n - 1) as f64;
            let x = x_range[0] + t * (x_range[1] - x_range[0]);
            let pt = self.to_px(x, curve.eval(x));
            if i == 0 {
                p.move_to(pt);
            } else {
                p.line_to(pt);
            }
        }
        p
    }
}

pub fn line_path(from: Point, to: Point) -> BezPath {
    let mut p = BezPath::new();
    p.move_to(from);
    p.line_to(to);
    p
}

pub fn polyline_path(points: &[Point]) -> BezPath {
    let mut p = BezPath::new();
    for (i, pt) in points.iter().enumerate() {
        if i == 0 {
            p.move_to(*pt);
        } else {
            p.line_to(*pt);
        }
    }
    p
}

/// Straight dashed segment from `from` to `to`.
pub fn dashed_line_path(from: Point, to: Point, dash_px: f64, gap_px: f64) -> BezPath {
    let mut p = BezPath::new();
    let d = to - from;
    let len = d.hypot();
    if len <= 0.0 || dash_px <= 0.0 {
        return p;
    }
    let dir = d / len;
    let step = dash_px + gap_px.max(0.0);
    let mut at = 0.0;
    while at < len {
        let end = (at + dash_px).min(len);
        p.move_to(from + dir * at);
        p.line_to(from + dir * end);
        at += step;
    }
    p
}

pub fn circle_path(center: Point, radius_px: f64) -> BezPath {
    Circle::new(center, radius_px).to_path(0.1)
}

pub fn rect_path(rect: Rect) -> BezPath {
    rect.to_path(0.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axes() -> Axes2D {
        Axes2D::new([-5.0, 5.0], [0.0, 20.0], [100.0, 50.0, 1000.0, 500.0])
    }

    #[test]
    fn mapping_hits_corners_and_flips_y() {
        let a = axes();
        assert_eq!(a.to_px(-5.0, 0.0), Point::new(100.0, 550.0));
        assert_eq!(a.to_px(5.0, 20.0), Point::new(1100.0, 50.0));
        assert_eq!(a.to_px(0.0, 10.0), Point::new(600.0, 300.0));
    }

    #[test]
    fn plot_samples_endpoints() {
        let a = axes();
        let f = Curve1::quadratic(0.0, 0.0, 1.0);
        let p = a.plot(&f, [-4.0, 4.0], 17);
        let first = match p.elements()[0] {
            kurbo::PathEl::MoveTo(pt) => pt,
            _ => panic!("expected MoveTo"),
        };
        assert_eq!(first, a.to_px(-4.0, 16.0));
        assert_eq!(p.elements().len(), 17);
    }

    #[test]
    fn dashed_line_alternates() {
        let p = dashed_line_path(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 8.0, 4.0);
        // 100 / 12 -> 9 dashes, each MoveTo + LineTo.
        assert_eq!(p.elements().len(), 18);
    }

    #[test]
    fn validate_rejects_degenerate_ranges() {
        let a = Axes2D::new([1.0, 1.0], [0.0, 1.0], [0.0, 0.0, 10.0, 10.0]);
        assert!(a.validate().is_err());
    }
}
