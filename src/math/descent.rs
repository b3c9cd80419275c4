/// Configuration for a scalar gradient descent run on `L(w) = w^2`.
///
/// The gradient rule is fixed at `g(w) = 2w`. There is no divergence handling:
/// a too-large learning rate overshoots and oscillates, which is exactly what the
/// learning-rate scenes set out to show.
#[derive(Clone, Copy, Debug)]
pub struct DescentConfig {
    pub start: f64,
    pub learning_rate: f64,
    pub max_steps: usize,
    /// Positions are clamped into `[-clamp_abs, clamp_abs]` for display.
    pub clamp_abs: Option<f64>,
    /// Stop early once `|w| < threshold`.
    pub stop_threshold: Option<f64>,
}

/// One point of a descent trace: position and loss value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DescentPoint {
    pub w: f64,
    pub loss: f64,
}

pub fn gradient_step(w: f64, learning_rate: f64) -> f64 {
    w - learning_rate * 2.0 * w
}

/// Run the descent and return the ordered trace, starting point included.
pub fn descent_trace(cfg: DescentConfig) -> Vec<DescentPoint> {
    let mut out = Vec::with_capacity(cfg.max_steps + 1);
    let mut w = cfg.start;
    out.push(DescentPoint { w, loss: w * w });

    for _ in 0..cfg.max_steps {
        let mut next = gradient_step(w, cfg.learning_rate);
        if let Some(clamp) = cfg.clamp_abs {
            next = next.clamp(-clamp, clamp);
        }
        if let Some(th) = cfg.stop_threshold
            && next.abs() < th
        {
            break;
        }
        out.push(DescentPoint {
            w: next,
            loss: next * next,
        });
        w = next;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contraction_for_small_rates() {
        // |w - 2*alpha*w| < |w| whenever 0 < alpha < 1.
        for alpha in [0.005, 0.1, 0.5, 0.99] {
            for w in [-4.0, -0.5, 0.25, 4.0] {
                assert!(gradient_step(w, alpha).abs() < f64::abs(w));
            }
        }
    }

    #[test]
    fn big_rate_oscillates_without_converging() {
        let trace = descent_trace(DescentConfig {
            start: 4.0,
            learning_rate: 0.99,
            max_steps: 20,
            clamp_abs: Some(4.5),
            stop_threshold: None,
        });
        assert_eq!(trace.len(), 21);
        // Sign alternates every step.
        for pair in trace.windows(2) {
            assert!(pair[0].w * pair[1].w < 0.0);
        }
        // Magnitude never collapses toward zero.
        assert!(trace.last().unwrap().w.abs() > 2.0);
    }

    #[test]
    fn small_rate_is_monotone_and_slow() {
        let trace = descent_trace(DescentConfig {
            start: 4.0,
            learning_rate: 0.005,
            max_steps: 50,
            clamp_abs: None,
            stop_threshold: None,
        });
        assert_eq!(trace.len(), 51);
        for pair in trace.windows(2) {
            assert!(pair[1].w < pair[0].w);
            assert!(pair[1].w > 0.0);
        }
        // Still far from the minimum after 50 iterations.
        assert!(trace.last().unwrap().w > 2.0);
    }

    #[test]
    fn good_rate_converges_under_threshold() {
        let trace = descent_trace(DescentConfig {
            start: 4.0,
            learning_rate: 0.1,
            max_steps: 20,
            clamp_abs: None,
            stop_threshold: Some(0.05),
        });
        // Stops before exhausting the budget, strictly decreasing.
        assert!(trace.len() < 21);
        for pair in trace.windows(2) {
            assert!(pair[1].w.abs() < pair[0].w.abs());
        }
        // The step after the last recorded one would fall under the threshold.
        let last = trace.last().unwrap().w;
        assert!(gradient_step(last, 0.1).abs() < 0.05);
    }

    #[test]
    fn loss_matches_position() {
        let trace = descent_trace(DescentConfig {
            start: 2.0,
            learning_rate: 0.1,
            max_steps: 3,
            clamp_abs: None,
            stop_threshold: None,
        });
        for p in trace {
            assert_eq!(p.loss, p.w * p.w);
        }
    }
}
