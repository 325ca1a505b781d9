use mn_sim::SimProgress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    LoadingScenario,
    CheckingCache,
    LoadingCachedResult,
    Compiling,
    Simulating,
    SavingResults,
    Completed,
}

impl RunStage {
    pub fn label(&self) -> &'static str {
        match self {
            RunStage::LoadingScenario => "loading scenario",
            RunStage::CheckingCache => "checking cache",
            RunStage::LoadingCachedResult => "loading cached run",
            RunStage::Compiling => "compiling",
            RunStage::Simulating => "simulating",
            RunStage::SavingResults => "saving results",
            RunStage::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimulationProgress {
    pub sim_time_s: f64,
    pub t_end_s: f64,
    pub fraction_complete: f64,
    pub step: usize,
    pub total_steps: usize,
}

impl From<SimProgress> for SimulationProgress {
    fn from(p: SimProgress) -> Self {
        Self {
            sim_time_s: p.sim_time,
            t_end_s: p.t_end,
            fraction_complete: p.fraction_complete,
            step: p.step,
            total_steps: p.total_steps,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub simulation: Option<SimulationProgress>,
}
