use kurbo::{BezPath, ParamCurve, ParamCurveArclen, PathEl, PathSeg, Point};

const ARCLEN_ACCURACY: f64 = 0.1;

/// Total arc length of a path, close segments included.
pub fn path_length(path: &BezPath) -> f64 {
    let mut total = 0.0;
    walk_segments(path, |seg, _| {
        total += seg.arclen(ARCLEN_ACCURACY);
        true
    });
    total
}

/// Prefix of `path` covering `fraction` of its arc length.
///
/// Used for draw-in reveals: the trimmed path always starts at the original
/// start point, and at fraction 1 reproduces the full geometry.
pub fn trim_path_prefix(path: &BezPath, fraction: f64) -> BezPath {
    let fraction = fraction.clamp(0.0, 1.0);
    if fraction >= 1.0 {
        return path.clone();
    }

    let total = path_length(path);
    let mut out = BezPath::new();
    if total <= 0.0 || fraction <= 0.0 {
        return out;
    }
    let mut budget = total * fraction;

    walk_segments(path, |seg, subpath_start| {
        if subpath_start {
            out.move_to(seg.start());
        }
        let len = seg.arclen(ARCLEN_ACCURACY);
        if len <= budget {
            budget -= len;
            push_seg(&mut out, seg);
            true
        } else {
            let t = if len > 0.0 {
                seg.inv_arclen(budget, ARCLEN_ACCURACY)
            } else {
                0.0
            };
            push_seg(&mut out, seg.subsegment(0.0..t));
            false
        }
    });

    out
}

fn push_seg(out: &mut BezPath, seg: PathSeg) {
    match seg {
        PathSeg::Line(l) => out.line_to(l.p1),
        PathSeg::Quad(q) => out.quad_to(q.p1, q.p2),
        PathSeg::Cubic(c) => out.curve_to(c.p1, c.p2, c.p3),
    }
}

/// Walk path elements as concrete segments. The second callback argument is true
/// for the first segment of each subpath. Returning `false` stops the walk.
fn walk_segments(path: &BezPath, mut f: impl FnMut(PathSeg, bool) -> bool) {
    let mut start = Point::ZERO;
    let mut current = Point::ZERO;
    let mut at_subpath_start = false;
    for el in path.elements() {
        let (seg, next) = match *el {
            PathEl::MoveTo(p) => {
                start = p;
                current = p;
                at_subpath_start = true;
                continue;
            }
            PathEl::LineTo(p) => (PathSeg::Line(kurbo::Line::new(current, p)), p),
            PathEl::QuadTo(p1, p2) => (PathSeg::Quad(kurbo::QuadBez::new(current, p1, p2)), p2),
            PathEl::CurveTo(p1, p2, p3) => {
                (PathSeg::Cubic(kurbo::CubicBez::new(current, p1, p2, p3)), p3)
            }
            PathEl::ClosePath => {
                if current != start {
                    if !f(
                        PathSeg::Line(kurbo::Line::new(current, start)),
                        at_subpath_start,
                    ) {
                        return;
                    }
                    at_subpath_start = false;
                }
                current = start;
                continue;
            }
        };
        if !f(seg, at_subpath_start) {
            return;
        }
        at_subpath_start = false;
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_shape() -> BezPath {
        let mut p = BezPath::new();
        p.move_to((0.0, 0.0));
        p.line_to((10.0, 0.0));
        p.line_to((10.0, 10.0));
        p
    }

    #[test]
    fn length_of_polyline() {
        assert!((path_length(&l_shape()) - 20.0).abs() < 1e-6);
    }

    #[test]
    fn length_counts_close_segments() {
        let mut p = BezPath::new();
        p.move_to((0.0, 0.0));
        p.line_to((10.0, 0.0));
        p.line_to((10.0, 10.0));
        p.close_path();
        let len = path_length(&p);
        assert!((len - (20.0 + (200.0f64).sqrt())).abs() < 1e-6);
    }

    #[test]
    fn full_fraction_is_identity() {
        let p = l_shape();
        let t = trim_path_prefix(&p, 1.0);
        assert_eq!(p.elements().len(), t.elements().len());
    }

    #[test]
    fn half_fraction_ends_mid_path() {
        let t = trim_path_prefix(&l_shape(), 0.5);
        // First segment fully present, second cut at its start.
        let els = t.elements();
        assert!(matches!(els[0], PathEl::MoveTo(p) if p == Point::new(0.0, 0.0)));
        assert!(matches!(els[1], PathEl::LineTo(p) if p == Point::new(10.0, 0.0)));
        match els[2] {
            PathEl::LineTo(p) => {
                assert!((p.x - 10.0).abs() < 1e-6);
                assert!(p.y.abs() < 1e-6);
            }
            _ => panic!("expected trimmed LineTo"),
        }
    }

    #[test]
    fn zero_fraction_is_empty() {
        assert!(trim_path_prefix(&l_shape(), 0.0).elements().is_empty());
    }

    #[test]
    fn trim_spans_subpaths() {
        let mut p = BezPath::new();
        p.move_to((0.0, 0.0));
        p.line_to((10.0, 0.0));
        p.move_to((0.0, 5.0));
        p.line_to((10.0, 5.0));
        let t = trim_path_prefix(&p, 0.75);
        // Full first subpath plus half of the second.
        assert_eq!(t.elements().len(), 4);
        match t.elements()[3] {
            PathEl::LineTo(pt) => assert!((pt.x - 5.0).abs() < 1e-6),
            _ => panic!("expected LineTo"),
        }
    }
}
