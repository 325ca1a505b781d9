//! End-to-end integration of the neuron circuit.

use mn_core::units::{farads, volts};
use mn_devices::{DiodePreset, MemristorModel, TunnelDiode};
use mn_signals::{Analytic, InputSignal, Signal, Waveform};
use mn_sim::{IntegratorType, NeuronCircuit, SimError, TimeGrid, solve_ode};
use nalgebra::DVector;

fn sine_drive() -> Waveform {
    Waveform::Sine {
        offset: 35e-6,
        amplitude: 1e-6,
        frequency: 1000.0,
        phase: 0.0,
    }
}

fn sine_signal() -> Signal {
    Signal::Analytic(Analytic::new(sine_drive()).expect("sine is deterministic"))
}

#[test]
fn origin_is_fixed_point_without_offsets() {
    let circuit = NeuronCircuit::new(
        TunnelDiode::from_preset(DiodePreset::Gi403),
        MemristorModel::and_ts(),
        farads(22e-9),
        volts(0.0),
        volts(0.0),
    )
    .expect("valid circuit");
    let grid = TimeGrid::uniform(0.0, 5e-8, 201).expect("valid grid");
    let y0 = DVector::zeros(2);
    let zero: &(dyn InputSignal + 'static) = &|_t: f64| 0.0;

    let traj = solve_ode(&circuit, &y0, &grid, IntegratorType::RK1, zero).expect("run succeeds");

    assert_eq!(traj.len(), 201);
    for i in 0..traj.len() {
        let y = traj.state(i);
        // The memristor leak of 1e-12 A keeps Vc jittering at the pV level.
        assert!(y[0].abs() < 1e-8, "Vc at {i}: {}", y[0]);
        assert!(y[1].abs() < 1e-12, "XSV at {i}: {}", y[1]);
    }
}

#[test]
fn sine_drive_stays_finite_for_a_thousand_heun_steps() {
    let circuit = NeuronCircuit::default();
    let grid = TimeGrid::uniform(0.0, 5e-8, 1001).expect("valid grid");
    let y0 = DVector::from_vec(vec![0.2, 0.2]);
    let input: &(dyn InputSignal + 'static) = &sine_signal();

    let traj = solve_ode(&circuit, &y0, &grid, IntegratorType::RK2, input).expect("run succeeds");

    assert_eq!(traj.len(), 1001);
    let vc = traj.component(0);
    assert!(vc.iter().all(|v| v.is_finite() && v.abs() < 10.0));
    assert!(traj.component(1).iter().all(|x| x.is_finite()));
}

#[test]
fn reruns_are_bit_identical() {
    let circuit = NeuronCircuit::default();
    let grid = TimeGrid::uniform(0.0, 5e-8, 500).expect("valid grid");
    let y0 = DVector::from_vec(vec![0.2, 0.2]);
    let input: &(dyn InputSignal + 'static) = &sine_signal();

    for method in IntegratorType::ALL {
        let a = solve_ode(&circuit, &y0, &grid, method, input).expect("first run");
        let b = solve_ode(&circuit, &y0, &grid, method, input).expect("second run");
        assert_eq!(a, b, "{method}");
    }
}

#[test]
fn methods_agree_on_short_horizon() {
    let circuit = NeuronCircuit::default();
    let grid = TimeGrid::uniform(0.0, 1e-9, 200).expect("valid grid");
    let y0 = DVector::from_vec(vec![0.2, 0.2]);
    let input: &(dyn InputSignal + 'static) = &sine_signal();

    let reference = solve_ode(&circuit, &y0, &grid, IntegratorType::RK4, input)
        .expect("reference run")
        .last_state();
    for method in [IntegratorType::RK1, IntegratorType::RK2, IntegratorType::RK8] {
        let end = solve_ode(&circuit, &y0, &grid, method, input)
            .expect("run succeeds")
            .last_state();
        assert!((end[0] - reference[0]).abs() < 1e-3, "{method}: {end}");
    }
}

#[test]
fn device_overflow_aborts_with_step_context() {
    let circuit = NeuronCircuit::default();
    let grid = TimeGrid::uniform(0.0, 5e-8, 10).expect("valid grid");
    // A huge injected current drives Vc far outside the diode's range.
    let surge: &(dyn InputSignal + 'static) = &|_t: f64| 1e3;
    let y0 = DVector::from_vec(vec![0.2, 0.2]);

    let err = solve_ode(&circuit, &y0, &grid, IntegratorType::RK1, surge).unwrap_err();

    match &err {
        SimError::StepFailed { step, state, .. } => {
            assert!(*step > 0);
            assert_eq!(state.len(), 2);
            assert!(matches!(err.root(), SimError::Device(_)));
        }
        other => panic!("expected StepFailed, got {other:?}"),
    }
}
