//! Drift synthesis and minor-constituent inference.
//!
//! Constituent phase is carried as a complex oscillation
//! `hc = amp·exp(−i·phase)` (the atlas's sign convention) and the tide
//! height is the real part of the nodal-corrected harmonic sum. A masked
//! constituent masks every sample of its point.

use tide_common::TideInstant;
use tracing::debug;

use crate::astro::AstroAngles;
use crate::constituents::{self, Argument, NodalFamily};

/// One synthesized (point, time, tide) sample; `None` is a masked value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TideTriple {
    pub point: usize,
    pub time: usize,
    pub height: Option<f64>,
}

/// Indices into the major set used for inference.
const Q1: usize = 0;
const O1: usize = 1;
const K1: usize = 3;
const N2: usize = 4;
const M2: usize = 5;
const S2: usize = 6;
/// Names of the majors, in index order.
const MAJOR_NAMES: [&str; 8] = ["q1", "o1", "p1", "k1", "n2", "m2", "s2", "k2"];
/// Inference needs at least this many resolved majors.
const MIN_MAJORS: usize = 6;

/// One inferable minor constituent: a linear combination of two majors.
struct Minor {
    name: &'static str,
    major_a: usize,
    coeff_a: f64,
    major_b: usize,
    coeff_b: f64,
    argument: Argument,
    family: NodalFamily,
}

const fn arg(tau: i8, s: i8, h: i8, p: i8, n: i8, pp: i8, quarter_turns: i8) -> Argument {
    Argument {
        tau,
        s,
        h,
        p,
        n,
        pp,
        quarter_turns,
    }
}

/// Minor constituents estimated from the resolved majors (Ray's
/// inference coefficients).
const MINORS: &[Minor] = &[
    Minor { name: "2q1",    major_a: Q1, coeff_a: 0.263,   major_b: O1, coeff_b: -0.0252, argument: arg(1, -3, 0, 2, 0, 0, -1), family: NodalFamily::O1 },
    Minor { name: "sigma1", major_a: Q1, coeff_a: 0.297,   major_b: O1, coeff_b: -0.0264, argument: arg(1, -3, 2, 0, 0, 0, -1), family: NodalFamily::O1 },
    Minor { name: "rho1",   major_a: Q1, coeff_a: 0.164,   major_b: O1, coeff_b: 0.0048,  argument: arg(1, -2, 2, -1, 0, 0, -1), family: NodalFamily::O1 },
    Minor { name: "m1",     major_a: O1, coeff_a: 0.0140,  major_b: K1, coeff_b: 0.0101,  argument: arg(1, 0, 0, -1, 0, 0, 1),  family: NodalFamily::M1 },
    Minor { name: "m1",     major_a: O1, coeff_a: 0.0389,  major_b: K1, coeff_b: 0.0282,  argument: arg(1, 0, 0, 1, 0, 0, 1),   family: NodalFamily::M1 },
    Minor { name: "chi1",   major_a: O1, coeff_a: 0.0064,  major_b: K1, coeff_b: 0.0060,  argument: arg(1, 0, 2, -1, 0, 0, 1),  family: NodalFamily::J1 },
    Minor { name: "pi1",    major_a: O1, coeff_a: 0.0030,  major_b: K1, coeff_b: 0.0171,  argument: arg(1, 1, -3, 0, 0, 1, -1), family: NodalFamily::Unity },
    Minor { name: "phi1",   major_a: O1, coeff_a: -0.0015, major_b: K1, coeff_b: 0.0152,  argument: arg(1, 1, 2, 0, 0, 0, 1),   family: NodalFamily::Unity },
    Minor { name: "theta1", major_a: O1, coeff_a: -0.0065, major_b: K1, coeff_b: 0.0155,  argument: arg(1, 2, -2, 1, 0, 0, 1),  family: NodalFamily::J1 },
    Minor { name: "j1",     major_a: O1, coeff_a: -0.0389, major_b: K1, coeff_b: 0.0836,  argument: arg(1, 2, 0, -1, 0, 0, 1),  family: NodalFamily::J1 },
    Minor { name: "oo1",    major_a: O1, coeff_a: -0.0431, major_b: K1, coeff_b: 0.0613,  argument: arg(1, 3, 0, 0, 0, 0, 1),   family: NodalFamily::Oo1 },
    Minor { name: "2n2",    major_a: N2, coeff_a: 0.264,   major_b: M2, coeff_b: -0.0253, argument: arg(2, -2, 0, 2, 0, 0, 0),  family: NodalFamily::M2 { power: 1.0 } },
    Minor { name: "mu2",    major_a: N2, coeff_a: 0.298,   major_b: M2, coeff_b: -0.0264, argument: arg(2, -2, 2, 0, 0, 0, 0),  family: NodalFamily::M2 { power: 1.0 } },
    Minor { name: "nu2",    major_a: N2, coeff_a: 0.165,   major_b: M2, coeff_b: 0.00487, argument: arg(2, -1, 2, -1, 0, 0, 0), family: NodalFamily::M2 { power: 1.0 } },
    Minor { name: "la2",    major_a: M2, coeff_a: 0.0040,  major_b: S2, coeff_b: 0.0074,  argument: arg(2, 1, -2, 1, 0, 0, 2),  family: NodalFamily::M2 { power: 1.0 } },
    Minor { name: "l2",     major_a: M2, coeff_a: 0.0131,  major_b: S2, coeff_b: 0.0326,  argument: arg(2, 1, 0, -1, 0, 0, 2),  family: NodalFamily::L2 },
    Minor { name: "l2",     major_a: M2, coeff_a: 0.0033,  major_b: S2, coeff_b: 0.0082,  argument: arg(2, 1, 0, -1, 0, 0, 0),  family: NodalFamily::L2 },
    Minor { name: "t2",     major_a: S2, coeff_a: 0.0585,  major_b: S2, coeff_b: 0.0,     argument: arg(2, 2, -3, 0, 0, 1, 0),  family: NodalFamily::Unity },
];

/// Complex oscillation from amplitude and phase (degrees), phase
/// negated per the atlas convention.
fn oscillation(amp: f64, phase_deg: f64) -> (f64, f64) {
    let cph = -phase_deg.to_radians();
    (amp * cph.cos(), amp * cph.sin())
}

/// `Re(hc·exp(i·theta))` for `theta` in degrees.
fn harmonic_term(hc: (f64, f64), theta_deg: f64) -> f64 {
    let th = theta_deg.to_radians();
    hc.0 * th.cos() - hc.1 * th.sin()
}

/// Synthesize the major-constituent tide height for one point at each
/// instant, in the units of the input amplitudes.
///
/// Returns all-masked output when any constituent of the point is
/// masked (an extrapolation failure taints the whole point).
pub fn drift(
    times: &[TideInstant],
    amplitude: &[Option<f64>],
    phase_deg: &[Option<f64>],
    constituents: &[String],
) -> Vec<Option<f64>> {
    if amplitude.iter().any(Option::is_none) || phase_deg.iter().any(Option::is_none) {
        return vec![None; times.len()];
    }

    let mut resolved = Vec::with_capacity(constituents.len());
    for (k, name) in constituents.iter().enumerate() {
        let (Some(amp), Some(ph)) = (amplitude[k], phase_deg[k]) else {
            continue;
        };
        match constituents::lookup(name) {
            Some(c) => resolved.push((c, oscillation(amp, ph))),
            None => debug!(constituent = %name, "unknown constituent skipped"),
        }
    }

    times
        .iter()
        .map(|t| {
            let angles = AstroAngles::at(t);
            let mut height = 0.0;
            for (c, hc) in &resolved {
                let (f, u) = angles.nodal_correction(c.family);
                let v = angles.equilibrium_argument(&c.argument);
                height += f * harmonic_term(*hc, v + u);
            }
            Some(height)
        })
        .collect()
}

/// Infer the contribution of minor constituents from the resolved
/// majors.
///
/// Minors already present in `constituents` are excluded — the atlas
/// resolves them directly. When fewer than [`MIN_MAJORS`] majors are
/// present no inference is possible and the correction is zero.
pub fn infer_minor(
    times: &[TideInstant],
    amplitude: &[Option<f64>],
    phase_deg: &[Option<f64>],
    constituents: &[String],
) -> Vec<f64> {
    let names: Vec<String> = constituents
        .iter()
        .map(|n| {
            let n = n.to_lowercase();
            if n == "lambda2" {
                "la2".to_string()
            } else {
                n
            }
        })
        .collect();

    let mut majors = [(0.0, 0.0); 8];
    let mut found = 0;
    for (i, major) in MAJOR_NAMES.iter().enumerate() {
        if let Some(j) = names.iter().position(|n| n.as_str() == *major) {
            if let (Some(a), Some(p)) = (amplitude[j], phase_deg[j]) {
                majors[i] = oscillation(a, p);
                found += 1;
            }
        }
    }
    if found < MIN_MAJORS {
        debug!(found, "too few major constituents, minor inference skipped");
        return vec![0.0; times.len()];
    }

    let active: Vec<&Minor> = MINORS
        .iter()
        .filter(|m| !names.iter().any(|n| n.as_str() == m.name))
        .collect();

    times
        .iter()
        .map(|t| {
            let angles = AstroAngles::at(t);
            let mut height = 0.0;
            for m in &active {
                let za = majors[m.major_a];
                let zb = majors[m.major_b];
                let hc = (
                    m.coeff_a * za.0 + m.coeff_b * zb.0,
                    m.coeff_a * za.1 + m.coeff_b * zb.1,
                );
                let (f, u) = angles.nodal_correction(m.family);
                let v = angles.equilibrium_argument(&m.argument);
                height += f * harmonic_term(hc, v + u);
            }
            height
        })
        .collect()
}

/// Synthesize tide heights for every (point, time) combination.
///
/// `amplitude`/`phase_deg` are `[point][constituent]` with matching
/// masks. Output is a flat table of triples, point-major, one per
/// requested combination — not a dense matrix.
pub fn synthesize_drift(
    times: &[TideInstant],
    amplitude: &[Vec<Option<f64>>],
    phase_deg: &[Vec<Option<f64>>],
    constituents: &[String],
) -> Vec<TideTriple> {
    let mut out = Vec::with_capacity(amplitude.len() * times.len());
    for (point, (amp, ph)) in amplitude.iter().zip(phase_deg.iter()).enumerate() {
        let major = drift(times, amp, ph, constituents);
        let minor = infer_minor(times, amp, ph, constituents);
        for (time, (height, extra)) in major.into_iter().zip(minor).enumerate() {
            out.push(TideTriple {
                point,
                time,
                height: height.map(|h| h + extra),
            });
        }
    }
    out
}
