//! Threshold-switching memristor models.
//!
//! The state equation is shared by every variant:
//!
//! ```text
//! dx/dt = G_set(V1)   * B_set(x)   / tau_s
//!       - G_reset(V1) * B_reset(x) / tau_r
//! ```
//!
//! where `G_*` are sigmoid gates on the product of the distances from a
//! threshold pair and `B_*` blend the boundary behaviour at `x = 0` and
//! `x = 1`. Variants differ in how the gate widths are parameterized and in
//! the current-voltage relation.

use serde::{Deserialize, Serialize};

use mn_core::units::{constants::thermal_voltage, k};

use crate::common::{check_finite, exp, require_finite, require_positive};
use crate::error::DeviceResult;
use crate::traits::{Memristor, MemristorResponse};

/// Threshold pairs, time constants and blend shape shared by all variants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchingDynamics {
    /// Positive set threshold (V)
    pub vth_p: f64,
    /// Negative set threshold (V)
    pub vth_n: f64,
    /// Positive hold threshold (V)
    pub vh_p: f64,
    /// Negative hold threshold (V)
    pub vh_n: f64,
    /// Set time constant (s)
    pub tau_s: f64,
    /// Reset time constant (s)
    pub tau_r: f64,
    /// Blend steepness
    pub a: f64,
    /// Set blend offset
    pub ds: f64,
    /// Reset blend offset
    pub dr: f64,
}

impl Default for SwitchingDynamics {
    fn default() -> Self {
        Self {
            vth_p: 0.267,
            vth_n: -0.119,
            vh_p: 0.08,
            vh_n: -0.006,
            tau_s: 1.2e-7,
            tau_r: 1.3e-7,
            a: 2.0,
            ds: 0.05,
            dr: 0.5,
        }
    }
}

impl SwitchingDynamics {
    pub fn validate(&self) -> DeviceResult<()> {
        require_finite(self.vth_p, "memristor vth_p")?;
        require_finite(self.vth_n, "memristor vth_n")?;
        require_finite(self.vh_p, "memristor vh_p")?;
        require_finite(self.vh_n, "memristor vh_n")?;
        require_positive(self.tau_s, "memristor tau_s")?;
        require_positive(self.tau_r, "memristor tau_r")?;
        require_finite(self.a, "memristor a")?;
        require_finite(self.ds, "memristor ds")?;
        require_finite(self.dr, "memristor dr")?;
        Ok(())
    }

    /// State rate for gate widths `vs` (set) and `vr` (reset).
    fn state_rate(&self, v1: f64, v2: f64, vs: f64, vr: f64) -> DeviceResult<f64> {
        let set = (1.0 / self.tau_s) * set_gate(self, v1, vs)? * set_blend(self, v2)?;
        let reset = (1.0 / self.tau_r) * reset_gate(self, v1, vr)? * reset_blend(self, v2)?;
        Ok(set - reset)
    }
}

fn set_gate(d: &SwitchingDynamics, v1: f64, vs: f64) -> DeviceResult<f64> {
    let arg = -1.0 / (vs * vs) * (v1 - d.vth_p) * (v1 - d.vth_n);
    Ok(1.0 / (1.0 + exp(arg, "set gate")?))
}

fn reset_gate(d: &SwitchingDynamics, v1: f64, vr: f64) -> DeviceResult<f64> {
    let arg = -1.0 / (vr * vr) * (v1 - d.vh_n) * (v1 - d.vh_p);
    Ok(1.0 - 1.0 / (1.0 + exp(arg, "reset gate")?))
}

fn set_blend(d: &SwitchingDynamics, v2: f64) -> DeviceResult<f64> {
    let low = 1.0 - 1.0 / exp(d.a * v2 + d.ds, "set blend")?;
    let high = 1.0 - 1.0 / exp(d.a * (1.0 - v2), "set blend")?;
    Ok(low * (1.0 - v2) + v2 * high)
}

fn reset_blend(d: &SwitchingDynamics, v2: f64) -> DeviceResult<f64> {
    let low = 1.0 - 1.0 / exp(d.a * v2, "reset blend")?;
    let high = 1.0 - 1.0 / exp(d.a * (1.0 - v2) + d.dr, "reset blend")?;
    Ok(low * (1.0 - v2) + v2 * high)
}

/// Polarity-dependent threshold switch with explicit gate widths.
///
/// `I = V1*x/Ron_p + Ilk` for `V1 > 0`, `I = V1*x/Ron_n - Ilk` otherwise.
/// The jump of `2*Ilk` at `V1 = 0` is part of the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AndTsParams {
    /// On resistance for positive bias (ohm)
    pub ron_p: f64,
    /// On resistance for negative bias (ohm)
    pub ron_n: f64,
    /// Leakage current (A)
    pub ilk: f64,
    /// Set gate width (V)
    pub vs: f64,
    /// Reset gate width (V)
    pub vr: f64,
    #[serde(flatten)]
    pub dynamics: SwitchingDynamics,
}

impl Default for AndTsParams {
    fn default() -> Self {
        Self {
            ron_p: 806.0,
            ron_n: 1434.0,
            ilk: 1e-12,
            vs: 0.0099,
            vr: 0.0175,
            dynamics: SwitchingDynamics::default(),
        }
    }
}

impl AndTsParams {
    pub fn validate(&self) -> DeviceResult<()> {
        require_positive(self.ron_p, "memristor ron_p")?;
        require_positive(self.ron_n, "memristor ron_n")?;
        require_finite(self.ilk, "memristor ilk")?;
        require_positive(self.vs, "memristor vs")?;
        require_positive(self.vr, "memristor vr")?;
        self.dynamics.validate()
    }

    fn current(&self, v1: f64, v2: f64) -> f64 {
        if v1 > 0.0 {
            v1 * v2 / self.ron_p + self.ilk
        } else {
            v1 * v2 / self.ron_n - self.ilk
        }
    }
}

/// Threshold switch whose gate widths scale with the thermal voltage.
///
/// Gate widths are `n_set*kT/q` and `n_reset*kT/q`. The current is
/// `V1 * g(x)` with `g` interpolating linearly between `1/Roff` and `1/Ron`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalParams {
    /// Fully-set resistance (ohm)
    pub ron: f64,
    /// Fully-reset resistance (ohm)
    pub roff: f64,
    /// Device temperature (K)
    pub temperature_k: f64,
    /// Set gate ideality factor
    pub n_set: f64,
    /// Reset gate ideality factor
    pub n_reset: f64,
    #[serde(flatten)]
    pub dynamics: SwitchingDynamics,
}

impl Default for ThermalParams {
    fn default() -> Self {
        Self {
            ron: 806.0,
            roff: 1.0e6,
            temperature_k: 300.0,
            n_set: 0.383,
            n_reset: 0.677,
            dynamics: SwitchingDynamics::default(),
        }
    }
}

impl ThermalParams {
    pub fn validate(&self) -> DeviceResult<()> {
        require_positive(self.ron, "memristor ron")?;
        require_positive(self.roff, "memristor roff")?;
        require_positive(self.temperature_k, "memristor temperature_k")?;
        require_positive(self.n_set, "memristor n_set")?;
        require_positive(self.n_reset, "memristor n_reset")?;
        self.dynamics.validate()
    }

    /// Set and reset gate widths (V).
    pub fn gate_widths(&self) -> (f64, f64) {
        let vt = thermal_voltage(k(self.temperature_k)).value;
        (self.n_set * vt, self.n_reset * vt)
    }

    fn conductance(&self, v2: f64) -> f64 {
        v2 / self.ron + (1.0 - v2) / self.roff
    }
}

/// Configuration-selected memristor variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MemristorModel {
    AndTs(AndTsParams),
    Thermal(ThermalParams),
}

impl Default for MemristorModel {
    fn default() -> Self {
        MemristorModel::AndTs(AndTsParams::default())
    }
}

impl MemristorModel {
    /// Polarity-branching variant with reference parameters.
    pub fn and_ts() -> Self {
        MemristorModel::AndTs(AndTsParams::default())
    }

    /// Thermal-voltage variant with reference parameters.
    pub fn thermal() -> Self {
        MemristorModel::Thermal(ThermalParams::default())
    }

    pub fn validate(&self) -> DeviceResult<()> {
        match self {
            MemristorModel::AndTs(p) => p.validate(),
            MemristorModel::Thermal(p) => p.validate(),
        }
    }
}

impl Memristor for MemristorModel {
    fn name(&self) -> &str {
        match self {
            MemristorModel::AndTs(_) => "AndTs",
            MemristorModel::Thermal(_) => "Thermal",
        }
    }

    fn evaluate(&self, v1: f64, v2: f64) -> DeviceResult<MemristorResponse> {
        let (current, state_rate) = match self {
            MemristorModel::AndTs(p) => (
                p.current(v1, v2),
                p.dynamics.state_rate(v1, v2, p.vs, p.vr)?,
            ),
            MemristorModel::Thermal(p) => {
                let (vs, vr) = p.gate_widths();
                (
                    v1 * p.conductance(v2),
                    p.dynamics.state_rate(v1, v2, vs, vr)?,
                )
            }
        };
        Ok(MemristorResponse {
            current: check_finite(current, "memristor current")?,
            state_rate: check_finite(state_rate, "memristor state rate")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_ts_current_jumps_by_twice_leak_at_zero() {
        let p = AndTsParams::default();
        let m = MemristorModel::AndTs(p);
        let eps = 1e-15;
        for x in [0.0, 0.3, 1.0] {
            let pos = m.evaluate(eps, x).unwrap().current;
            let neg = m.evaluate(-eps, x).unwrap().current;
            assert!(((pos - neg) - 2.0 * p.ilk).abs() < 1e-17, "x={x}");
        }
        // V1 = 0 takes the negative branch
        assert_eq!(m.evaluate(0.0, 0.5).unwrap().current, -p.ilk);
    }

    #[test]
    fn and_ts_uses_polarity_resistances() {
        let p = AndTsParams::default();
        let m = MemristorModel::AndTs(p);
        let i_pos = m.evaluate(0.2, 1.0).unwrap().current;
        let i_neg = m.evaluate(-0.2, 1.0).unwrap().current;
        assert_eq!(i_pos, 0.2 * 1.0 / 806.0 + 1e-12);
        assert_eq!(i_neg, -0.2 * 1.0 / 1434.0 - 1e-12);
    }

    #[test]
    fn thermal_current_has_no_branch() {
        let m = MemristorModel::thermal();
        assert_eq!(m.evaluate(0.0, 0.7).unwrap().current, 0.0);
        let pos = m.evaluate(0.1, 0.7).unwrap().current;
        let neg = m.evaluate(-0.1, 0.7).unwrap().current;
        assert_eq!(pos, -neg);
    }

    #[test]
    fn thermal_conductance_interpolates_between_limits() {
        let p = ThermalParams::default();
        assert_eq!(p.conductance(1.0), 1.0 / p.ron);
        assert_eq!(p.conductance(0.0), 1.0 / p.roff);
    }

    #[test]
    fn thermal_widths_near_explicit_widths_at_room_temperature() {
        let (vs, vr) = ThermalParams::default().gate_widths();
        assert!((vs - 0.0099).abs() < 1e-4);
        assert!((vr - 0.0175).abs() < 1e-4);
    }

    #[test]
    fn strong_positive_bias_sets_device() {
        let m = MemristorModel::and_ts();
        let r = m.evaluate(0.5, 0.2).unwrap();
        assert!(r.state_rate > 0.0);
    }

    #[test]
    fn bias_inside_hold_window_resets_device() {
        let m = MemristorModel::and_ts();
        let r = m.evaluate(0.03, 0.8).unwrap();
        assert!(r.state_rate < 0.0);
    }

    #[test]
    fn state_rate_matches_reference_expression() {
        let p = AndTsParams::default();
        let d = p.dynamics;
        let (v1, v2): (f64, f64) = (0.15, 0.4);
        let expected = (1.0 / d.tau_s)
            * (1.0 / (1.0 + (-1.0 / (p.vs * p.vs) * (v1 - d.vth_p) * (v1 - d.vth_n)).exp()))
            * ((1.0 - 1.0 / (d.a * v2 + d.ds).exp()) * (1.0 - v2)
                + v2 * (1.0 - 1.0 / (d.a * (1.0 - v2)).exp()))
            - (1.0 / d.tau_r)
                * (1.0 - 1.0 / (1.0 + (-1.0 / (p.vr * p.vr) * (v1 - d.vh_n) * (v1 - d.vh_p)).exp()))
                * ((1.0 - 1.0 / (d.a * v2).exp()) * (1.0 - v2)
                    + v2 * (1.0 - 1.0 / (d.a * (1.0 - v2) + d.dr).exp()));
        let got = MemristorModel::AndTs(p).evaluate(v1, v2).unwrap().state_rate;
        assert_eq!(got, expected);
    }

    #[test]
    fn narrow_gate_overflow_is_reported() {
        let p = AndTsParams {
            vs: 1e-4,
            ..AndTsParams::default()
        };
        // Midway between the set thresholds the gate exponent is ~3.7e6
        let err = MemristorModel::AndTs(p).evaluate(0.074, 0.5).unwrap_err();
        assert!(matches!(
            err,
            crate::DeviceError::ExpOverflow { what: "set gate", .. }
        ));
    }

    #[test]
    fn validate_rejects_nonpositive_resistance() {
        let p = AndTsParams {
            ron_n: 0.0,
            ..AndTsParams::default()
        };
        assert!(MemristorModel::AndTs(p).validate().is_err());
        assert!(MemristorModel::thermal().validate().is_ok());
    }
}
