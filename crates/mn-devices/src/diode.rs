//! Tunnel diode model: diode, tunneling and excess-current terms.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::{check_finite, exp, require_finite, require_positive};
use crate::error::{DeviceError, DeviceResult};
use crate::traits::LeakageDevice;

/// Scaling of the voltage inside the diode exponentials.
///
/// Both forms produce `Is * (exp(x) - exp(-x))`; they differ only in how
/// `x` is derived from the voltage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form")]
pub enum DiodeExponent {
    /// `x = e / vt`, with `vt` a thermal-voltage-like constant (V).
    ThermalVoltage { vt: f64 },
    /// `x = b * e`, with `b` in 1/V.
    Linear { b: f64 },
}

impl DiodeExponent {
    fn scaled(&self, e: f64) -> f64 {
        match *self {
            DiodeExponent::ThermalVoltage { vt } => e / vt,
            DiodeExponent::Linear { b } => b * e,
        }
    }

    fn validate(&self) -> DeviceResult<()> {
        match *self {
            DiodeExponent::ThermalVoltage { vt } => require_positive(vt, "diode vt"),
            DiodeExponent::Linear { b } => require_positive(b, "diode b"),
        }
    }
}

/// Tunnel diode parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TunnelDiodeParams {
    /// Saturation current (A)
    pub is: f64,
    /// Exponent scaling of the diode term
    pub exponent: DiodeExponent,
    /// Peak voltage (V)
    pub vp: f64,
    /// Peak current (A)
    pub ip: f64,
    /// Valley/excess current amplitude (A), may be negative
    pub iv: f64,
    /// Excess-current slope factor (1/V)
    pub d: f64,
    /// Excess-current offset voltage (V)
    pub e: f64,
}

impl TunnelDiodeParams {
    /// Check that every parameter is usable.
    pub fn validate(&self) -> DeviceResult<()> {
        require_finite(self.is, "diode is")?;
        if self.is < 0.0 {
            return Err(DeviceError::InvalidParam { what: "diode is" });
        }
        self.exponent.validate()?;
        require_positive(self.vp, "diode vp")?;
        require_finite(self.ip, "diode ip")?;
        require_finite(self.iv, "diode iv")?;
        require_finite(self.d, "diode d")?;
        require_finite(self.e, "diode e")?;
        Ok(())
    }
}

/// Catalog of measured tunnel diode parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DiodePreset {
    /// GI403 fit with thermal-voltage exponent.
    #[default]
    #[serde(rename = "GI403")]
    Gi403,
    /// GI401 fit with linear exponent.
    #[serde(rename = "GI401")]
    Gi401,
    #[serde(rename = "GI401A")]
    Gi401A,
    #[serde(rename = "GI403A")]
    Gi403A,
    #[serde(rename = "BD4")]
    Bd4,
    #[serde(rename = "BD5")]
    Bd5,
}

impl DiodePreset {
    pub const ALL: [DiodePreset; 6] = [
        DiodePreset::Gi403,
        DiodePreset::Gi401,
        DiodePreset::Gi401A,
        DiodePreset::Gi403A,
        DiodePreset::Bd4,
        DiodePreset::Bd5,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DiodePreset::Gi403 => "GI403",
            DiodePreset::Gi401 => "GI401",
            DiodePreset::Gi401A => "GI401A",
            DiodePreset::Gi403A => "GI403A",
            DiodePreset::Bd4 => "BD4",
            DiodePreset::Bd5 => "BD5",
        }
    }

    pub fn params(&self) -> TunnelDiodeParams {
        match self {
            DiodePreset::Gi403 => TunnelDiodeParams {
                is: 1.15e-7,
                exponent: DiodeExponent::ThermalVoltage { vt: 1.0 / 15.0 },
                vp: 0.09,
                ip: 2.1e-5,
                iv: -3e-6,
                d: 26.0,
                e: 0.14,
            },
            DiodePreset::Gi401 => TunnelDiodeParams {
                is: 1.15e-7,
                exponent: DiodeExponent::Linear { b: 15.0 },
                vp: 0.09,
                ip: 2.1e-5,
                iv: -3e-6,
                d: 26.0,
                e: 0.14,
            },
            DiodePreset::Gi401A => TunnelDiodeParams {
                is: 1.16e-7,
                exponent: DiodeExponent::ThermalVoltage { vt: 0.066 },
                vp: 0.090,
                ip: 2.17e-5,
                iv: -3.22e-6,
                d: 26.0,
                e: 0.14,
            },
            DiodePreset::Gi403A => TunnelDiodeParams {
                is: 1.10e-7,
                exponent: DiodeExponent::ThermalVoltage { vt: 0.059 },
                vp: 0.037,
                ip: 6.40e-5,
                iv: 6.00e-6,
                d: 20.0,
                e: 0.09,
            },
            DiodePreset::Bd4 => TunnelDiodeParams {
                is: 1.00e-8,
                exponent: DiodeExponent::ThermalVoltage { vt: 0.047 },
                vp: 0.040,
                ip: 4.80e-5,
                iv: 2.00e-6,
                d: 24.0,
                e: 0.15,
            },
            DiodePreset::Bd5 => TunnelDiodeParams {
                is: 1.00e-8,
                exponent: DiodeExponent::ThermalVoltage { vt: 0.049 },
                vp: 0.033,
                ip: 1.48e-5,
                iv: 1.00e-6,
                d: 13.0,
                e: 0.07,
            },
        }
    }
}

impl fmt::Display for DiodePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DiodePreset {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiodePreset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| DeviceError::UnknownDevice {
                name: s.to_string(),
            })
    }
}

/// Tunnel diode: `I(e) = I_diode(e) + I_tunnel(e) + I_excess(e)`.
#[derive(Debug, Clone)]
pub struct TunnelDiode {
    name: String,
    pub params: TunnelDiodeParams,
}

impl TunnelDiode {
    /// Create a diode from an explicit parameter set.
    pub fn new(name: String, params: TunnelDiodeParams) -> DeviceResult<Self> {
        params.validate()?;
        Ok(Self { name, params })
    }

    /// Create a diode from a catalog entry.
    pub fn from_preset(preset: DiodePreset) -> Self {
        Self {
            name: preset.name().to_string(),
            params: preset.params(),
        }
    }
}

impl LeakageDevice for TunnelDiode {
    fn name(&self) -> &str {
        &self.name
    }

    fn current(&self, v: f64) -> DeviceResult<f64> {
        let p = &self.params;
        let i = diode_term(p, v)? + tunnel_term(p, v)? + excess_term(p, v);
        check_finite(i, "diode current")
    }
}

fn diode_term(p: &TunnelDiodeParams, e: f64) -> DeviceResult<f64> {
    let x = p.exponent.scaled(e);
    Ok(p.is * (exp(x, "diode term")? - exp(-x, "diode term")?))
}

fn tunnel_term(p: &TunnelDiodeParams, e: f64) -> DeviceResult<f64> {
    Ok(p.ip / p.vp * e * exp(-(e - p.vp) / p.vp, "tunnel term")?)
}

fn excess_term(p: &TunnelDiodeParams, e: f64) -> f64 {
    p.iv * ((p.d * (e - p.e)).atan() + (p.d * (e + p.e)).atan())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_current_at_origin_for_every_preset() {
        for preset in DiodePreset::ALL {
            let diode = TunnelDiode::from_preset(preset);
            assert_eq!(diode.current(0.0).unwrap(), 0.0, "{preset}");
        }
    }

    #[test]
    fn exponent_forms_agree_when_b_is_inverse_vt() {
        let gi403 = TunnelDiode::from_preset(DiodePreset::Gi403);
        let gi401 = TunnelDiode::from_preset(DiodePreset::Gi401);
        for v in [-0.3, -0.05, 0.02, 0.09, 0.25, 0.4] {
            let a = gi403.current(v).unwrap();
            let b = gi401.current(v).unwrap();
            assert!((a - b).abs() <= 1e-15, "v={v}: {a} vs {b}");
        }
    }

    #[test]
    fn tunneling_peak_near_vp() {
        let p = DiodePreset::Gi403.params();
        let at_peak = tunnel_term(&p, p.vp).unwrap();
        assert!((at_peak - p.ip).abs() < 1e-18);
        assert!(tunnel_term(&p, 0.5 * p.vp).unwrap() < at_peak);
        assert!(tunnel_term(&p, 2.0 * p.vp).unwrap() < at_peak);
    }

    #[test]
    fn excess_term_is_odd_and_bounded() {
        let p = DiodePreset::Gi403.params();
        for v in [0.01, 0.1, 1.0, 10.0] {
            assert_eq!(excess_term(&p, v), -excess_term(&p, -v));
            assert!(excess_term(&p, v).abs() <= p.iv.abs() * std::f64::consts::PI);
        }
    }

    #[test]
    fn overflow_reported_for_extreme_voltage() {
        let diode = TunnelDiode::from_preset(DiodePreset::Gi403);
        let err = diode.current(60.0).unwrap_err();
        assert!(matches!(err, DeviceError::ExpOverflow { what: "diode term", .. }));
    }

    #[test]
    fn preset_name_roundtrip() {
        for preset in DiodePreset::ALL {
            assert_eq!(preset.name().parse::<DiodePreset>().unwrap(), preset);
        }
        assert_eq!("bd5".parse::<DiodePreset>().unwrap(), DiodePreset::Bd5);
        assert!("1N4148".parse::<DiodePreset>().is_err());
    }

    #[test]
    fn new_rejects_bad_params() {
        let mut p = DiodePreset::Bd4.params();
        p.vp = 0.0;
        assert!(TunnelDiode::new("bad".into(), p).is_err());

        let mut p = DiodePreset::Bd4.params();
        p.exponent = DiodeExponent::ThermalVoltage { vt: -0.05 };
        assert!(TunnelDiode::new("bad".into(), p).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn diode_and_excess_terms_are_odd(v in -2.0_f64..2.0_f64) {
            let p = DiodePreset::Gi403.params();
            prop_assert_eq!(diode_term(&p, v).unwrap(), -diode_term(&p, -v).unwrap());
            prop_assert_eq!(excess_term(&p, v), -excess_term(&p, -v));
        }
    }
}
