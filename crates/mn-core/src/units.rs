// mn-core/src/units.rs

use uom::si::f64::{
    Capacitance as UomCapacitance, ElectricCurrent as UomElectricCurrent,
    ElectricPotential as UomElectricPotential, ElectricalResistance as UomElectricalResistance,
    Frequency as UomFrequency, ThermodynamicTemperature as UomThermodynamicTemperature,
    Time as UomTime,
};

// Public canonical unit types (SI, f64)
pub type Capacitance = UomCapacitance;
pub type Current = UomElectricCurrent;
pub type Frequency = UomFrequency;
pub type Resistance = UomElectricalResistance;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;
pub type Voltage = UomElectricPotential;

#[inline]
pub fn volts(v: f64) -> Voltage {
    use uom::si::electric_potential::volt;
    Voltage::new::<volt>(v)
}

#[inline]
pub fn amps(v: f64) -> Current {
    use uom::si::electric_current::ampere;
    Current::new::<ampere>(v)
}

#[inline]
pub fn farads(v: f64) -> Capacitance {
    use uom::si::capacitance::farad;
    Capacitance::new::<farad>(v)
}

#[inline]
pub fn ohms(v: f64) -> Resistance {
    use uom::si::electrical_resistance::ohm;
    Resistance::new::<ohm>(v)
}

#[inline]
pub fn hertz(v: f64) -> Frequency {
    use uom::si::frequency::hertz;
    Frequency::new::<hertz>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

pub mod constants {
    use super::*;

    /// Boltzmann constant (J/K), exact SI value.
    pub const K_B: f64 = 1.380_649e-23;

    /// Elementary charge (C), exact SI value.
    pub const Q_E: f64 = 1.602_176_634e-19;

    /// Thermal voltage kT/q at the given temperature.
    #[inline]
    pub fn thermal_voltage(t: Temperature) -> Voltage {
        volts(K_B * t.value / Q_E)
    }
}
