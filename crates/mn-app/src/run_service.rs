//! Run execution and caching service.

use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use mn_project::Scenario;
use mn_results::{RunManifest, RunStore, TimeseriesRecord};
use mn_signals::InputSignal;
use mn_sim::{SimProgress, VC, XSV, run_sim};

use crate::compile::{CompiledScenario, compile_scenario};
use crate::error::AppResult;
use crate::progress::{RunProgressEvent, RunStage, SimulationProgress};
use crate::scenario_service;

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub solver_version: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            solver_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub scenario_path: &'a Path,
    pub options: RunOptions,
}

/// Wall-clock breakdown of a run.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub compile_time_s: f64,
    pub solve_time_s: f64,
    pub save_time_s: f64,
    pub load_cache_time_s: f64,
    pub total_time_s: f64,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub timing: RunTimingSummary,
}

/// Recorded output of one integration.
#[derive(Debug, Clone)]
pub struct SimulationOutput {
    pub records: Vec<TimeseriesRecord>,
    pub total_steps: usize,
    pub decimation: usize,
    pub xsv_excursions: usize,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
    simulation: Option<SimulationProgress>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent {
            stage,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            message,
            simulation,
        });
    }
}

/// Integrate a compiled scenario and turn the decimated trajectory into
/// `(t, v, x, i)` records.
///
/// XSV is left unclamped; samples outside `[0, 1]` are counted and logged.
pub fn simulate(
    compiled: &CompiledScenario,
    progress: Option<&mut dyn FnMut(SimProgress)>,
) -> AppResult<SimulationOutput> {
    let input: &(dyn InputSignal + 'static) = &compiled.signal;
    let trajectory = run_sim(
        &compiled.circuit,
        &compiled.y0,
        &compiled.options,
        input,
        progress,
    )?;

    let total_steps = compiled.options.total_steps()?;
    let decimation = compiled.options.decimation_factor(total_steps);

    let records: Vec<TimeseriesRecord> = trajectory
        .times()
        .iter()
        .enumerate()
        .map(|(k, &t)| {
            let state = trajectory.states().column(k);
            TimeseriesRecord {
                t,
                v: state[VC],
                x: state[XSV],
                i: input.current(t),
            }
        })
        .collect();

    let xsv_excursions = records.iter().filter(|r| !r.xsv_in_range()).count();
    if xsv_excursions > 0 {
        warn!(
            xsv_excursions,
            recorded = records.len(),
            "memristor state left [0, 1]"
        );
    }

    Ok(SimulationOutput {
        records,
        total_steps,
        decimation,
        xsv_excursions,
    })
}

/// Execute or load a run based on request.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    ensure_run_with_progress(request, None)
}

/// Execute or load a run and stream progress events.
pub fn ensure_run_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();

    emit_progress(
        &mut progress_cb,
        RunStage::LoadingScenario,
        started,
        Some("Loading scenario".to_string()),
        None,
    );
    let scenario = scenario_service::load_scenario(request.scenario_path)?;
    info!(scenario = %scenario.name, path = %request.scenario_path.display(), "loaded scenario");

    emit_progress(
        &mut progress_cb,
        RunStage::CheckingCache,
        started,
        Some("Checking run cache".to_string()),
        None,
    );
    let run_id = mn_results::compute_run_id(&scenario, &request.options.solver_version)?;
    let store = RunStore::for_scenario(request.scenario_path)?;

    if request.options.use_cache && store.has_run(&run_id) {
        emit_progress(
            &mut progress_cb,
            RunStage::LoadingCachedResult,
            started,
            Some("Loading cached run".to_string()),
            None,
        );

        let load_started = Instant::now();
        let manifest = store.load_manifest(&run_id)?;
        timing.load_cache_time_s = load_started.elapsed().as_secs_f64();
        timing.total_time_s = started.elapsed().as_secs_f64();
        info!(%run_id, "reusing cached run");

        emit_progress(
            &mut progress_cb,
            RunStage::Completed,
            started,
            Some("Loaded cached run".to_string()),
            None,
        );

        return Ok(RunResponse {
            run_id,
            manifest,
            loaded_from_cache: true,
            timing,
        });
    }

    let manifest = execute_run(
        &scenario,
        &store,
        &run_id,
        &request.options.solver_version,
        &mut progress_cb,
        started,
        &mut timing,
    )?;
    timing.total_time_s = started.elapsed().as_secs_f64();

    emit_progress(
        &mut progress_cb,
        RunStage::Completed,
        started,
        Some(format!("Stored {} points", manifest.points)),
        None,
    );

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        timing,
    })
}

fn execute_run(
    scenario: &Scenario,
    store: &RunStore,
    run_id: &str,
    solver_version: &str,
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    started: Instant,
    timing: &mut RunTimingSummary,
) -> AppResult<RunManifest> {
    emit_progress(
        progress_cb,
        RunStage::Compiling,
        started,
        Some("Compiling circuit and drive".to_string()),
        None,
    );
    let compile_started = Instant::now();
    let compiled = compile_scenario(scenario)?;
    timing.compile_time_s = compile_started.elapsed().as_secs_f64();

    info!(
        method = %compiled.options.integrator,
        dt = compiled.options.dt,
        t_end = compiled.options.t_end,
        "simulating"
    );
    let solve_started = Instant::now();
    let output = {
        let mut forward = |p: SimProgress| {
            emit_progress(
                progress_cb,
                RunStage::Simulating,
                started,
                None,
                Some(p.into()),
            )
        };
        simulate(&compiled, Some(&mut forward))?
    };
    timing.solve_time_s = solve_started.elapsed().as_secs_f64();
    info!(
        steps = output.total_steps,
        points = output.records.len(),
        solve_time_s = timing.solve_time_s,
        "simulation finished"
    );

    emit_progress(
        progress_cb,
        RunStage::SavingResults,
        started,
        Some("Saving results".to_string()),
        None,
    );
    let manifest = RunManifest {
        run_id: run_id.to_string(),
        scenario_name: scenario.name.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        solver_version: solver_version.to_string(),
        method: compiled.options.integrator.to_string(),
        dt_s: compiled.options.dt,
        t_end_s: compiled.options.t_end,
        total_steps: output.total_steps,
        decimation: output.decimation,
        points: output.records.len(),
        xsv_excursions: output.xsv_excursions,
    };
    let save_started = Instant::now();
    store.save_run(&manifest, &output.records)?;
    timing.save_time_s = save_started.elapsed().as_secs_f64();
    info!(%run_id, points = manifest.points, "saved run");

    Ok(manifest)
}

/// Stored runs next to a scenario file, most recent first.
pub fn list_runs(scenario_path: &Path, scenario_name: Option<&str>) -> AppResult<Vec<RunManifest>> {
    let store = RunStore::for_scenario(scenario_path)?;

    let mut runs = store.list_runs(scenario_name)?;
    runs.reverse();
    Ok(runs)
}

/// Load a specific run.
pub fn load_run(
    scenario_path: &Path,
    run_id: &str,
) -> AppResult<(RunManifest, Vec<TimeseriesRecord>)> {
    let store = RunStore::for_scenario(scenario_path)?;

    let manifest = store.load_manifest(run_id)?;
    let records = store.load_timeseries(run_id)?;

    Ok((manifest, records))
}
