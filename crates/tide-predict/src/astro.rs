//! Astronomical arguments and nodal corrections.
//!
//! Mean longitudes follow the Meeus polynomial expressions evaluated in
//! Terrestrial Time; nodal factors and angles follow the Schureman
//! correction families. All angles are handled in degrees except where
//! noted.

use tide_common::TideInstant;

use crate::constituents::{Argument, NodalFamily};

/// Astronomical variables at one instant, in degrees.
#[derive(Debug, Clone, Copy)]
pub struct AstroAngles {
    /// 15° × fractional hour of day (UT).
    pub t1: f64,
    /// Mean longitude of the moon.
    pub s: f64,
    /// Mean longitude of the sun.
    pub h: f64,
    /// Mean longitude of the lunar perigee.
    pub p: f64,
    /// Mean longitude of the ascending lunar node.
    pub n: f64,
    /// Mean longitude of the solar perigee.
    pub pp: f64,
}

impl AstroAngles {
    /// Evaluate the astronomical variables for an instant; longitudes in
    /// Terrestrial Time, the hour angle in UT.
    pub fn at(instant: &TideInstant) -> Self {
        let t = (instant.mjd_tt() - 51544.5) / 36525.0;
        Self {
            t1: 15.0 * instant.hour_ut(),
            s: norm(218.3164477 + 481267.88123421 * t - 0.0015786 * t * t),
            h: norm(280.46646 + 36000.76983 * t + 0.0003032 * t * t),
            p: norm(83.3532465 + 4069.0137287 * t - 0.0103200 * t * t),
            n: norm(125.04452 - 1934.136261 * t + 0.0020708 * t * t),
            pp: norm(282.93734098 + 1.71945766667 * t + 0.00045688 * t * t),
        }
    }

    /// Equilibrium argument of a constituent, degrees.
    pub fn equilibrium_argument(&self, a: &Argument) -> f64 {
        let tau = self.t1 - self.s + self.h;
        norm(a.tau as f64 * tau
            + a.s as f64 * self.s
            + a.h as f64 * self.h
            + a.p as f64 * self.p
            + a.n as f64 * self.n
            + a.pp as f64 * self.pp
            + a.quarter_turns as f64 * 90.0)
    }

    /// Nodal amplitude factor `f` and phase correction `u` (degrees) for
    /// a correction family.
    pub fn nodal_correction(&self, family: NodalFamily) -> (f64, f64) {
        let n = self.n.to_radians();
        let p = self.p.to_radians();
        let (sinn, cosn) = n.sin_cos();
        let (sin2n, cos2n) = (2.0 * n).sin_cos();
        let sin3n = (3.0 * n).sin();

        match family {
            NodalFamily::Unity => (1.0, 0.0),
            NodalFamily::Mm => (1.0 - 0.130 * cosn, 0.0),
            NodalFamily::Mf => (
                1.043 + 0.414 * cosn,
                -23.7 * sinn + 2.7 * sin2n - 0.4 * sin3n,
            ),
            NodalFamily::O1 => (
                1.009 + 0.187 * cosn - 0.015 * cos2n,
                10.8 * sinn - 1.3 * sin2n + 0.2 * sin3n,
            ),
            NodalFamily::K1 => (
                1.006 + 0.115 * cosn - 0.009 * cos2n,
                -8.9 * sinn + 0.7 * sin2n,
            ),
            NodalFamily::J1 => (
                1.013 + 0.168 * cosn - 0.017 * cos2n,
                -12.9 * sinn + 1.3 * sin2n,
            ),
            NodalFamily::Oo1 => (
                1.287 + 0.640 * cosn + 0.134 * cos2n,
                -36.7 * sinn + 4.0 * sin2n,
            ),
            NodalFamily::M1 => {
                let fr = 2.0 * p.cos() + 0.4 * (p - n).cos();
                let fi = p.sin() + 0.2 * (p - n).sin();
                (fr.hypot(fi), fi.atan2(fr).to_degrees())
            }
            NodalFamily::M2 { power } => {
                let f = 1.0004 - 0.0373 * cosn + 0.0002 * cos2n;
                (f.powf(power), power * -2.1 * sinn)
            }
            NodalFamily::K2 => (
                1.024 + 0.286 * cosn + 0.008 * cos2n,
                -17.7 * sinn + 0.7 * sin2n,
            ),
            NodalFamily::L2 => {
                let fr = 1.0
                    - 0.2505 * (2.0 * p).cos()
                    - 0.1102 * (2.0 * p - n).cos()
                    - 0.0156 * (2.0 * p - 2.0 * n).cos()
                    - 0.037 * cosn;
                let fi = -0.2505 * (2.0 * p).sin()
                    - 0.1102 * (2.0 * p - n).sin()
                    - 0.0156 * (2.0 * p - 2.0 * n).sin()
                    - 0.037 * sinn;
                (fr.hypot(fi), fi.atan2(fr).to_degrees())
            }
            NodalFamily::M2K2 => {
                let (fm, um) = self.nodal_correction(NodalFamily::M2 { power: 1.0 });
                let (fk, uk) = self.nodal_correction(NodalFamily::K2);
                (fm * fk, um + uk)
            }
        }
    }
}

/// Normalize an angle into [0, 360).
fn norm(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constituents;
    use chrono::{TimeZone, Utc};

    fn angles_at(y: i32, mo: u32, d: u32, h: u32) -> AstroAngles {
        let instant =
            TideInstant::from_utc(Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap());
        AstroAngles::at(&instant)
    }

    #[test]
    fn test_s2_argument_is_solar_clock() {
        // S2's argument is 30° per UT hour from midnight
        let s2 = constituents::lookup("s2").unwrap();
        let a0 = angles_at(2020, 6, 1, 0).equilibrium_argument(&s2.argument);
        let a6 = angles_at(2020, 6, 1, 6).equilibrium_argument(&s2.argument);
        assert!(a0.abs() < 1e-6 || (a0 - 360.0).abs() < 1e-6, "a0 = {a0}");
        assert!((a6 - 180.0).abs() < 1e-6, "a6 = {a6}");
    }

    #[test]
    fn test_solar_constituents_have_unit_nodal_factor() {
        let angles = angles_at(2015, 3, 10, 12);
        let (f, u) = angles.nodal_correction(NodalFamily::Unity);
        assert_eq!((f, u), (1.0, 0.0));
    }

    #[test]
    fn test_m2_nodal_factor_range() {
        // f(M2) stays within ~[0.963, 1.038] over the nodal cycle
        for year in 2000..2019 {
            let (f, u) = angles_at(year, 1, 1, 0).nodal_correction(NodalFamily::M2 { power: 1.0 });
            assert!(f > 0.95 && f < 1.05, "f = {f}");
            assert!(u.abs() < 3.0, "u = {u}");
        }
    }

    #[test]
    fn test_compound_factor_is_power() {
        let angles = angles_at(2012, 7, 1, 3);
        let (f1, u1) = angles.nodal_correction(NodalFamily::M2 { power: 1.0 });
        let (f2, u2) = angles.nodal_correction(NodalFamily::M2 { power: 2.0 });
        assert!((f2 - f1 * f1).abs() < 1e-12);
        assert!((u2 - 2.0 * u1).abs() < 1e-12);
    }

    #[test]
    fn test_moon_longitude_j2000() {
        // At J2000 the lunar mean longitude is ≈ 218.32°
        let instant =
            TideInstant::from_utc(Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap());
        let angles = AstroAngles::at(&instant);
        assert!((angles.s - 218.32).abs() < 0.1, "s = {}", angles.s);
    }
}
