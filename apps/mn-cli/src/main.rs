use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use mn_app::{
    AppResult, RunOptions, RunProgressEvent, RunRequest, RunStage, Variable, query, run_service,
    scenario_service,
};
use mn_devices::{DiodeExponent, DiodePreset, Memristor, MemristorModel};

#[derive(Parser)]
#[command(name = "mn-cli")]
#[command(about = "Memristive neuron circuit simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a scenario file
    Validate {
        /// Path to the scenario YAML (or JSON) file
        scenario_path: PathBuf,
    },
    /// List the tunnel diode catalog and memristor variants
    Devices,
    /// Run a scenario (reuses a cached run when inputs are unchanged)
    Run {
        /// Path to the scenario YAML (or JSON) file
        scenario_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// List stored runs next to a scenario file
    Runs {
        /// Path to the scenario YAML (or JSON) file
        scenario_path: PathBuf,
        /// Only list runs of this scenario name
        #[arg(long)]
        name: Option<String>,
    },
    /// Show details of a stored run
    ShowRun {
        /// Path to the scenario YAML (or JSON) file
        scenario_path: PathBuf,
        /// Run ID to display
        run_id: String,
    },
    /// Export a run as CSV
    Export {
        /// Path to the scenario YAML (or JSON) file
        scenario_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Columns to export (v, x, i); all when omitted
        #[arg(short, long, value_delimiter = ',')]
        columns: Vec<String>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Devices => cmd_devices(),
        Commands::Run {
            scenario_path,
            no_cache,
        } => cmd_run(&scenario_path, !no_cache),
        Commands::Runs {
            scenario_path,
            name,
        } => cmd_runs(&scenario_path, name.as_deref()),
        Commands::ShowRun {
            scenario_path,
            run_id,
        } => cmd_show_run(&scenario_path, &run_id),
        Commands::Export {
            scenario_path,
            run_id,
            columns,
            output,
        } => cmd_export(&scenario_path, &run_id, &columns, output.as_deref()),
    }
}

fn cmd_validate(scenario_path: &Path) -> AppResult<()> {
    let scenario = scenario_service::load_scenario(scenario_path)?;
    let summary = scenario_service::summarize(&scenario)?;

    println!("✓ Scenario '{}' is valid", summary.name);
    if let Some(description) = &summary.description {
        println!("  {}", description);
    }
    println!("  Diode:     {}", summary.diode);
    println!("  Memristor: {}", summary.memristor);
    println!("  Signal:    {}", summary.signal);
    println!(
        "  Solver:    {}  dt={:e}s  t_end={:e}s  steps={}  max_points={}",
        summary.method, summary.dt_s, summary.t_end_s, summary.total_steps, summary.max_points
    );
    if let Some(seed) = summary.seed {
        println!("  Seed:      {}", seed);
    }
    Ok(())
}

fn cmd_devices() -> AppResult<()> {
    println!("Tunnel diodes:");
    println!(
        "  {:<8} {:>10} {:>14} {:>8} {:>10} {:>10} {:>6} {:>6}",
        "name", "Is (A)", "exponent", "Vp (V)", "Ip (A)", "Iv (A)", "D", "E"
    );
    for preset in DiodePreset::ALL {
        let p = preset.params();
        let exponent = match p.exponent {
            DiodeExponent::ThermalVoltage { vt } => format!("Vt={:.4}", vt),
            DiodeExponent::Linear { b } => format!("b={}", b),
        };
        println!(
            "  {:<8} {:>10.3e} {:>14} {:>8.3} {:>10.3e} {:>10.3e} {:>6} {:>6}",
            preset.name(),
            p.is,
            exponent,
            p.vp,
            p.ip,
            p.iv,
            p.d,
            p.e
        );
    }

    println!("\nMemristors:");
    for model in [MemristorModel::and_ts(), MemristorModel::thermal()] {
        match model {
            MemristorModel::AndTs(p) => println!(
                "  {:<8} Ron+={} Ohm  Ron-={} Ohm  Ilk={:e} A  Vs={} V  Vr={} V",
                model.name(),
                p.ron_p,
                p.ron_n,
                p.ilk,
                p.vs,
                p.vr
            ),
            MemristorModel::Thermal(p) => {
                let (vs, vr) = p.gate_widths();
                println!(
                    "  {:<8} Ron={} Ohm  Roff={:e} Ohm  T={} K  Vs={:.4} V  Vr={:.4} V",
                    model.name(),
                    p.ron,
                    p.roff,
                    p.temperature_k,
                    vs,
                    vr
                )
            }
        }
    }
    Ok(())
}

fn cmd_run(scenario_path: &Path, use_cache: bool) -> AppResult<()> {
    let request = RunRequest {
        scenario_path,
        options: RunOptions {
            use_cache,
            ..RunOptions::default()
        },
    };

    let mut render = |event: RunProgressEvent| render_cli_progress(&event);
    let response = run_service::ensure_run_with_progress(&request, Some(&mut render))?;
    clear_progress_line();

    if response.loaded_from_cache {
        println!("✓ Loaded cached run {}", response.run_id);
    } else {
        println!("✓ Run {} complete", response.run_id);
    }

    let manifest = &response.manifest;
    println!(
        "  {} steps with {}, {} points stored (decimation {})",
        manifest.total_steps, manifest.method, manifest.points, manifest.decimation
    );
    if manifest.xsv_excursions > 0 {
        println!(
            "  ⚠ memristor state outside [0, 1] at {} recorded points",
            manifest.xsv_excursions
        );
    }

    let timing = &response.timing;
    println!("\nTiming summary:");
    if response.loaded_from_cache {
        println!("  Cache load: {:.3}s", timing.load_cache_time_s);
    } else {
        println!("  Compile: {:.3}s", timing.compile_time_s);
        println!("  Solve:   {:.3}s", timing.solve_time_s);
        println!("  Save:    {:.3}s", timing.save_time_s);
    }
    println!("  Total:   {:.3}s", timing.total_time_s);
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (event.stage, &event.simulation) {
        (RunStage::Simulating, Some(s)) => {
            let width = 28usize;
            let filled = ((s.fraction_complete * width as f64).round() as usize).min(width);
            print!(
                "\r[{}{}] {:>6.2}%  t={:.4e}/{:.4e}s  step={}/{}  elapsed={:.1}s",
                "#".repeat(filled),
                "-".repeat(width - filled),
                s.fraction_complete * 100.0,
                s.sim_time_s,
                s.t_end_s,
                s.step,
                s.total_steps,
                event.elapsed_wall_s
            );
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{:<100}", line);
        }
    }
    let _ = io::stdout().flush();
}

fn cmd_runs(scenario_path: &Path, name: Option<&str>) -> AppResult<()> {
    let runs = run_service::list_runs(scenario_path, name)?;

    if runs.is_empty() {
        println!("No stored runs found");
    } else {
        println!("Stored runs:");
        for manifest in runs {
            println!(
                "  {}  {}  {} ({}, {} points)",
                manifest.run_id,
                manifest.timestamp,
                manifest.scenario_name,
                manifest.method,
                manifest.points
            );
        }
    }
    Ok(())
}

fn cmd_show_run(scenario_path: &Path, run_id: &str) -> AppResult<()> {
    let (manifest, records) = run_service::load_run(scenario_path, run_id)?;
    let summary = query::get_run_summary(&records)?;

    println!("Run {}", manifest.run_id);
    println!("  Scenario:   {}", manifest.scenario_name);
    println!("  Created:    {}", manifest.timestamp);
    println!("  Solver:     {} v{}", manifest.method, manifest.solver_version);
    println!(
        "  Grid:       dt={:e}s  t_end={:e}s  steps={}",
        manifest.dt_s, manifest.t_end_s, manifest.total_steps
    );
    println!(
        "  Records:    {} (decimation {})",
        summary.record_count, manifest.decimation
    );
    println!(
        "  Time range: {:.4e} - {:.4e} s",
        summary.time_range.0, summary.time_range.1
    );
    println!(
        "  Vc range:   {:.4} - {:.4} V",
        summary.v_range.0, summary.v_range.1
    );
    println!(
        "  XSV range:  {:.4} - {:.4}",
        summary.x_range.0, summary.x_range.1
    );
    println!(
        "  Iin range:  {:.4e} - {:.4e} A",
        summary.i_range.0, summary.i_range.1
    );
    if summary.xsv_excursions > 0 {
        println!("  XSV outside [0, 1]: {} points", summary.xsv_excursions);
    }
    Ok(())
}

fn cmd_export(
    scenario_path: &Path,
    run_id: &str,
    columns: &[String],
    output: Option<&Path>,
) -> AppResult<()> {
    let vars = columns
        .iter()
        .map(|c| c.parse::<Variable>())
        .collect::<AppResult<Vec<_>>>()?;

    let (_manifest, records) = run_service::load_run(scenario_path, run_id)?;
    let csv = query::to_csv(&records, &vars);

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} data points to {}",
            records.len(),
            path.display()
        );
    } else {
        print!("{}", csv);
    }

    Ok(())
}
