use crate::{eval::evaluator::EvaluatedGraph, foundation::math::Fnv1a64};

/// Content hash of an evaluated frame graph.
///
/// Two frames with equal fingerprints lower to identical render plans, which is
/// what static-frame elision relies on. The frame index itself is deliberately
/// not hashed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameFingerprint {
    pub hi: u64,
    pub lo: u64,
}

pub fn fingerprint_eval(eval: &EvaluatedGraph) -> FrameFingerprint {
    let mut a = Fnv1a64::new(Fnv1a64::OFFSET_BASIS);
    let mut b = Fnv1a64::new(0x9ae1_6a3b_2f90_404f);

    let write_u64 = |x: &mut Fnv1a64, y: &mut Fnv1a64, v: u64| {
        x.write_u64(v);
        y.write_u64(v);
    };

    if let Some(cam) = eval.camera {
        write_u64(&mut a, &mut b, 1);
        write_u64(&mut a, &mut b, cam.phi.to_bits());
        write_u64(&mut a, &mut b, cam.theta.to_bits());
        write_u64(&mut a, &mut b, cam.zoom.to_bits());
    } else {
        write_u64(&mut a, &mut b, 0);
    }

    write_u64(&mut a, &mut b, eval.nodes.len() as u64);
    for node in &eval.nodes {
        for h in [&mut a, &mut b] {
            h.write_bytes(node.clip_id.as_bytes());
            h.write_u8(0);
            h.write_bytes(node.asset.as_bytes());
            h.write_u8(0);
            h.write_u64(node.z as u64);
            for c in node.transform.as_coeffs() {
                h.write_f64(c);
            }
            h.write_f64(node.opacity);
            h.write_f64(node.param);
            for tr in [&node.enter, &node.exit] {
                match tr {
                    Some(t) => {
                        h.write_u8(1);
                        h.write_bytes(format!("{:?}", t.kind).as_bytes());
                        h.write_f64(t.progress);
                    }
                    None => h.write_u8(0),
                }
            }
        }
    }

    FrameFingerprint {
        hi: a.finish(),
        lo: b.finish(),
    }
}
