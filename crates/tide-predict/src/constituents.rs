//! Harmonic constituent table.
//!
//! Each constituent's mean argument is a Doodson-style integer
//! combination of the astronomical variables (τ, s, h, p, N, p′) plus a
//! constant offset in quarter turns. Nodal modulation is grouped into
//! the classic Schureman correction families.

/// Doodson coefficients against (τ, s, h, p, N, p′).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argument {
    pub tau: i8,
    pub s: i8,
    pub h: i8,
    pub p: i8,
    pub n: i8,
    pub pp: i8,
    /// Constant offset in multiples of 90°.
    pub quarter_turns: i8,
}

/// Nodal correction family applied to a constituent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodalFamily {
    /// Solar constituents: no lunar-node modulation.
    Unity,
    Mm,
    Mf,
    O1,
    K1,
    J1,
    Oo1,
    M1,
    /// f(M2) raised to a power; covers overtides and most lunar
    /// semidiurnals (power 1), compounds (2, 3, 4) and M3 (1.5).
    M2 { power: f64 },
    K2,
    L2,
    /// Compound M2·K2 (MKS2).
    M2K2,
}

/// A named constituent with its argument, nodal family, and angular
/// speed in degrees per hour.
#[derive(Debug, Clone, Copy)]
pub struct Constituent {
    pub name: &'static str,
    pub argument: Argument,
    pub family: NodalFamily,
    pub speed_deg_per_hour: f64,
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

/// The constituents resolvable by the FES2014 atlas.
pub const CONSTITUENTS: &[Constituent] = &[
    // Long period
    Constituent { name: "sa",    argument: arg(0, 0, 1, 0, 0, 0, 0),   family: NodalFamily::Unity,            speed_deg_per_hour: 0.0410686 },
    Constituent { name: "ssa",   argument: arg(0, 0, 2, 0, 0, 0, 0),   family: NodalFamily::Unity,            speed_deg_per_hour: 0.0821373 },
    Constituent { name: "mm",    argument: arg(0, 1, 0, -1, 0, 0, 0),  family: NodalFamily::Mm,               speed_deg_per_hour: 0.5443747 },
    Constituent { name: "msf",   argument: arg(0, 2, -2, 0, 0, 0, 0),  family: NodalFamily::M2 { power: 1.0 }, speed_deg_per_hour: 1.0158958 },
    Constituent { name: "mf",    argument: arg(0, 2, 0, 0, 0, 0, 0),   family: NodalFamily::Mf,               speed_deg_per_hour: 1.0980331 },
    Constituent { name: "mtm",   argument: arg(0, 3, 0, -1, 0, 0, 0),  family: NodalFamily::Mf,               speed_deg_per_hour: 1.6424078 },
    Constituent { name: "msqm",  argument: arg(0, 4, -2, 0, 0, 0, 0),  family: NodalFamily::Mf,               speed_deg_per_hour: 2.1139287 },
    // Diurnal
    Constituent { name: "q1",    argument: arg(1, -2, 0, 1, 0, 0, -1), family: NodalFamily::O1,               speed_deg_per_hour: 13.3986609 },
    Constituent { name: "o1",    argument: arg(1, -1, 0, 0, 0, 0, -1), family: NodalFamily::O1,               speed_deg_per_hour: 13.9430356 },
    Constituent { name: "p1",    argument: arg(1, 1, -2, 0, 0, 0, -1), family: NodalFamily::Unity,            speed_deg_per_hour: 14.9589314 },
    Constituent { name: "s1",    argument: arg(1, 1, -1, 0, 0, 0, 2),  family: NodalFamily::Unity,            speed_deg_per_hour: 15.0 },
    Constituent { name: "k1",    argument: arg(1, 1, 0, 0, 0, 0, 1),   family: NodalFamily::K1,               speed_deg_per_hour: 15.0410686 },
    Constituent { name: "j1",    argument: arg(1, 2, 0, -1, 0, 0, 1),  family: NodalFamily::J1,               speed_deg_per_hour: 15.5854433 },
    // Semidiurnal
    Constituent { name: "eps2",  argument: arg(2, -3, 2, 1, 0, 0, 0),  family: NodalFamily::M2 { power: 1.0 }, speed_deg_per_hour: 27.4238337 },
    Constituent { name: "2n2",   argument: arg(2, -2, 0, 2, 0, 0, 0),  family: NodalFamily::M2 { power: 1.0 }, speed_deg_per_hour: 27.8953548 },
    Constituent { name: "mu2",   argument: arg(2, -2, 2, 0, 0, 0, 0),  family: NodalFamily::M2 { power: 1.0 }, speed_deg_per_hour: 27.9682084 },
    Constituent { name: "n2",    argument: arg(2, -1, 0, 1, 0, 0, 0),  family: NodalFamily::M2 { power: 1.0 }, speed_deg_per_hour: 28.4397295 },
    Constituent { name: "nu2",   argument: arg(2, -1, 2, -1, 0, 0, 0), family: NodalFamily::M2 { power: 1.0 }, speed_deg_per_hour: 28.5125831 },
    Constituent { name: "m2",    argument: arg(2, 0, 0, 0, 0, 0, 0),   family: NodalFamily::M2 { power: 1.0 }, speed_deg_per_hour: 28.9841042 },
    Constituent { name: "mks2",  argument: arg(2, 0, 2, 0, 0, 0, 0),   family: NodalFamily::M2K2,             speed_deg_per_hour: 29.0662415 },
    Constituent { name: "la2",   argument: arg(2, 1, -2, 1, 0, 0, 2),  family: NodalFamily::M2 { power: 1.0 }, speed_deg_per_hour: 29.4556253 },
    Constituent { name: "l2",    argument: arg(2, 1, 0, -1, 0, 0, 2),  family: NodalFamily::L2,               speed_deg_per_hour: 29.5284789 },
    Constituent { name: "t2",    argument: arg(2, 2, -3, 0, 0, 1, 0),  family: NodalFamily::Unity,            speed_deg_per_hour: 29.9589333 },
    Constituent { name: "s2",    argument: arg(2, 2, -2, 0, 0, 0, 0),  family: NodalFamily::Unity,            speed_deg_per_hour: 30.0 },
    Constituent { name: "r2",    argument: arg(2, 2, -1, 0, 0, -1, 2), family: NodalFamily::Unity,            speed_deg_per_hour: 30.0410667 },
    Constituent { name: "k2",    argument: arg(2, 2, 0, 0, 0, 0, 0),   family: NodalFamily::K2,               speed_deg_per_hour: 30.0821373 },
    // Short period
    Constituent { name: "m3",    argument: arg(3, 0, 0, 0, 0, 0, 0),   family: NodalFamily::M2 { power: 1.5 }, speed_deg_per_hour: 43.4761563 },
    Constituent { name: "n4",    argument: arg(4, -2, 0, 2, 0, 0, 0),  family: NodalFamily::M2 { power: 2.0 }, speed_deg_per_hour: 56.8794590 },
    Constituent { name: "mn4",   argument: arg(4, -1, 0, 1, 0, 0, 0),  family: NodalFamily::M2 { power: 2.0 }, speed_deg_per_hour: 57.4238337 },
    Constituent { name: "m4",    argument: arg(4, 0, 0, 0, 0, 0, 0),   family: NodalFamily::M2 { power: 2.0 }, speed_deg_per_hour: 57.9682084 },
    Constituent { name: "ms4",   argument: arg(4, 2, -2, 0, 0, 0, 0),  family: NodalFamily::M2 { power: 1.0 }, speed_deg_per_hour: 58.9841042 },
    Constituent { name: "s4",    argument: arg(4, 4, -4, 0, 0, 0, 0),  family: NodalFamily::Unity,            speed_deg_per_hour: 60.0 },
    Constituent { name: "m6",    argument: arg(6, 0, 0, 0, 0, 0, 0),   family: NodalFamily::M2 { power: 3.0 }, speed_deg_per_hour: 86.9523127 },
    Constituent { name: "m8",    argument: arg(8, 0, 0, 0, 0, 0, 0),   family: NodalFamily::M2 { power: 4.0 }, speed_deg_per_hour: 115.9364169 },
];

/// Look up a constituent by (case-insensitive) name.
pub fn lookup(name: &str) -> Option<&'static Constituent> {
    let lower = name.to_lowercase();
    // "lambda2" appears in some file sets for la2
    let lower = if lower == "lambda2" { "la2".to_string() } else { lower };
    CONSTITUENTS.iter().find(|c| c.name == lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("M2").unwrap().name, "m2");
        assert_eq!(lookup("lambda2").unwrap().name, "la2");
        assert!(lookup("x9").is_none());
    }

    #[test]
    fn test_table_covers_fes_set() {
        assert_eq!(CONSTITUENTS.len(), 34);
    }

    #[test]
    fn test_speed_matches_argument_rate() {
        // Argument rates of the astronomical variables, deg/hour
        let tau_rate = 14.4920521;
        let s_rate = 0.5490165;
        let h_rate = 0.0410686;
        let p_rate = 0.0046418;
        for c in CONSTITUENTS {
            let a = c.argument;
            let rate = a.tau as f64 * tau_rate
                + a.s as f64 * s_rate
                + a.h as f64 * h_rate
                + a.p as f64 * p_rate;
            assert!(
                (rate - c.speed_deg_per_hour).abs() < 1e-4,
                "{}: table speed {} vs argument rate {}",
                c.name,
                c.speed_deg_per_hour,
                rate
            );
        }
    }
}
