//! Memristor-coupled neuron circuit as a two-state vector field.
//!
//! State `y = (Vc, XSV)`: capacitor voltage and memristor state. The capacitor
//! integrates the injected current minus the memristor and tunnel diode
//! currents:
//!
//! ```text
//! Vd = Vc + U2,  Vm = Vc + U1
//! dVc/dt  = (Iin(t) - I_mem(Vm, XSV) - I_d(Vd)) / C1
//! dXSV/dt = memristor state rate at (Vm, XSV)
//! ```

use nalgebra::DVector;
use uom::si::capacitance::farad;
use uom::si::electric_potential::volt;

use mn_core::units::{Capacitance, Voltage, farads, volts};
use mn_devices::{DiodePreset, LeakageDevice, Memristor, MemristorModel, TunnelDiode};
use mn_signals::InputSignal;

use crate::error::{SimError, SimResult};
use crate::model::VectorField;

/// Row of `Vc` in the state vector.
pub const VC: usize = 0;
/// Row of `XSV` in the state vector.
pub const XSV: usize = 1;

/// Neuron circuit: capacitor, tunnel diode and memristor with bias offsets.
#[derive(Debug, Clone)]
pub struct NeuronCircuit<D = TunnelDiode, M = MemristorModel> {
    pub diode: D,
    pub memristor: M,
    capacitance: Capacitance,
    u1: Voltage,
    u2: Voltage,
}

impl Default for NeuronCircuit {
    /// GI403 diode, AndTs memristor, `C1 = 22 nF`, `U1 = 0`, `U2 = -40 mV`.
    fn default() -> Self {
        Self {
            diode: TunnelDiode::from_preset(DiodePreset::Gi403),
            memristor: MemristorModel::and_ts(),
            capacitance: farads(22e-9),
            u1: volts(0.0),
            u2: volts(-0.04),
        }
    }
}

impl<D: LeakageDevice, M: Memristor> NeuronCircuit<D, M> {
    pub fn new(
        diode: D,
        memristor: M,
        capacitance: Capacitance,
        u1: Voltage,
        u2: Voltage,
    ) -> SimResult<Self> {
        let c = capacitance.get::<farad>();
        if !(c.is_finite() && c > 0.0) {
            return Err(SimError::InvalidArg {
                what: "capacitance must be positive",
            });
        }
        if !u1.get::<volt>().is_finite() || !u2.get::<volt>().is_finite() {
            return Err(SimError::InvalidArg {
                what: "bias offsets must be finite",
            });
        }
        Ok(Self {
            diode,
            memristor,
            capacitance,
            u1,
            u2,
        })
    }

    pub fn capacitance(&self) -> Capacitance {
        self.capacitance
    }

    /// Memristor bias offset `U1`.
    pub fn u1(&self) -> Voltage {
        self.u1
    }

    /// Diode bias offset `U2`.
    pub fn u2(&self) -> Voltage {
        self.u2
    }

    /// Device currents `(I_mem, I_d)` at the given state.
    pub fn branch_currents(&self, vc: f64, xsv: f64) -> SimResult<(f64, f64)> {
        let vm = vc + self.u1.get::<volt>();
        let vd = vc + self.u2.get::<volt>();
        let i_mem = self.memristor.evaluate(vm, xsv)?.current;
        let i_d = self.diode.current(vd)?;
        Ok((i_mem, i_d))
    }
}

impl<D: LeakageDevice, M: Memristor> VectorField for NeuronCircuit<D, M> {
    type Context = dyn InputSignal;

    fn dim(&self) -> usize {
        2
    }

    fn rhs(&self, y: &DVector<f64>, t: f64, input: &dyn InputSignal) -> SimResult<DVector<f64>> {
        let (vc, xsv) = (y[VC], y[XSV]);
        let vd = vc + self.u2.get::<volt>();
        let vm = vc + self.u1.get::<volt>();
        let i_d = self.diode.current(vd)?;
        let mem = self.memristor.evaluate(vm, xsv)?;
        let dvc = (input.current(t) - mem.current - i_d) / self.capacitance.get::<farad>();
        Ok(DVector::from_vec(vec![dvc, mem.state_rate]))
    }
}
