//! Endonasal Simulator - headless diagnostics
//!
//! Runs a scripted medial wall procedure through the simulation engine and
//! reports phase changes, coaching triggers, complications and the final
//! score. Rendering, webcam tracking and audio live in the host application.
//!
//! CLI Usage:
//!   cargo run                                  # Default scenario and seed
//!   cargo run -- -s acromegaly --seed 7        # Choose scenario and seed
//!   cargo run -- --jitter 0.01 --export        # Noisy tracking, write CSV/JSON

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Result};
use endonasal_simulator::{
    config::Parameters,
    export::{export_session_json, CsvExporter},
    geometry::Side,
    simulation::{SimulationEngine, SimulationSession, TickInput},
    state::TumorScenario,
    surgery::{remission_prediction, LevelDefinition},
    tracking::ScriptedHandTrack,
};

/// Command line options
struct Options {
    scenario: String,
    level_id: u32,
    seed: u64,
    jitter: f32,
    params_dir: Option<PathBuf>,
    export: bool,
    export_dir: PathBuf,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            scenario: "nfa".to_string(),
            level_id: 2,
            seed: 42,
            jitter: 0.0,
            params_dir: None,
            export: false,
            export_dir: PathBuf::from("exports"),
        }
    }
}

fn scenario_by_name(name: &str) -> Result<TumorScenario> {
    match name {
        "cushing" => Ok(TumorScenario::cushing_disease()),
        "acromegaly" => Ok(TumorScenario::acromegaly()),
        "nfa" => Ok(TumorScenario::non_functioning_macroadenoma()),
        other => bail!("unknown scenario '{}' (expected cushing, acromegaly or nfa)", other),
    }
}

/// Run the scripted procedure and print a report
fn run_diagnostics(options: &Options) -> Result<()> {
    println!("=== Endonasal Simulator - Procedure Diagnostics ===\n");

    let params = match &options.params_dir {
        Some(dir) => Parameters::load_from_dir(dir),
        None => Parameters::load_or_default(),
    };
    let scenario = scenario_by_name(&options.scenario)?;
    let Some(level) = LevelDefinition::by_id(options.level_id) else {
        bail!("unknown level {}", options.level_id);
    };

    println!("Level: {} (target {:.0} s)", level.name, level.target_time_sec);
    println!(
        "Scenario: {} (Knosp {}, {:?})",
        scenario.name,
        scenario.knosp_grade.label(),
        scenario.tumor_type
    );
    println!("Seed: {}, jitter σ: {}", options.seed, options.jitter);

    let engine = SimulationEngine::new(params, level, options.seed);
    let mut session = SimulationSession::new(engine, scenario);
    let mut track = ScriptedHandTrack::medial_wall_procedure().with_jitter(options.jitter, options.seed);
    let total = track.len();

    let mut csv = if options.export {
        Some(CsvExporter::new(&options.export_dir, 0.1)?)
    } else {
        None
    };

    println!("\n--- Running {} ticks ---\n", total);

    let start_time = Instant::now();
    while let Some(sample) = track.next_sample() {
        if let Some(tool) = sample.tool_change {
            session.select_tool(tool);
        }
        let result = session.tick(&TickInput::new(sample.hand));
        let state = session.state();

        if let Some(previous) = result.report.previous_step {
            println!(
                "  t={:6.2}s  phase {} -> {} (depth {:.0}%)",
                state.elapsed_sec,
                previous.as_str(),
                state.step.as_str(),
                state.endoscope.insertion_depth
            );
        }
        if let Some(trigger) = &result.trigger {
            println!(
                "  t={:6.2}s  [{}] {}: {}",
                state.elapsed_sec,
                trigger.severity.as_str(),
                trigger.rule_id,
                trigger.message
            );
        }
        for complication in &result.report.new_complications {
            println!(
                "  t={:6.2}s  COMPLICATION {} ({})",
                state.elapsed_sec,
                complication.kind.id(),
                complication.severity.as_str()
            );
        }

        if let Some(exporter) = csv.as_mut() {
            exporter.maybe_record(state)?;
        }
    }
    let elapsed = start_time.elapsed();

    let state = session.state();
    let scoring = session.engine().scoring();
    let breakdown = scoring.breakdown(
        &state.level,
        state.extent_of_resection,
        &state.complications,
        state.elapsed_sec,
    );

    println!("\n=== Results ===");
    println!("Wall time: {:.2?} ({:.0} ticks/s)", elapsed, total as f32 / elapsed.as_secs_f32().max(1e-9));
    println!("Simulated time: {:.2} s", state.elapsed_sec);
    println!("Final phase: {}", state.step.as_str());
    println!();
    for objective in &state.level.objectives {
        println!(
            "  [{}] {} ({:.0}/{:.0})",
            if objective.completed { "x" } else { " " },
            objective.description,
            objective.current_value,
            objective.target_value
        );
    }
    println!();
    println!(
        "Wall integrity: left {:.2}, right {:.2}",
        state.wall.integrity(Side::Left),
        state.wall.integrity(Side::Right)
    );
    println!("Blood level: {:.1}", state.blood_level);
    println!("Complications: {}", state.complications.len());
    println!("Extent of resection: {:.1}%", state.extent_of_resection);
    println!(
        "Remission estimate: {:.0}%",
        remission_prediction(&state.scenario, state.extent_of_resection, &state.wall) * 100.0
    );
    println!();
    println!(
        "Score: {} (objectives {:.1} + extent {:.1} + time {:.1} - penalty {:.1} + technique {:.1})",
        breakdown.total,
        breakdown.objective_points,
        breakdown.extent_points,
        breakdown.time_points,
        breakdown.complication_penalty,
        breakdown.technique_points
    );

    println!("\n=== Benchmarks ===");
    for benchmark in scoring.benchmarks(&state.level, state.extent_of_resection, state.elapsed_sec) {
        println!(
            "{} {}: {:.1} (expert {:.1})",
            if benchmark.meets_expert() { "✓" } else { "⚠️ " },
            benchmark.metric,
            benchmark.value,
            benchmark.expert_value
        );
    }

    if let Some(exporter) = csv {
        let path = exporter.finish()?;
        println!("\nCSV written to {}", path.display());
    }
    if options.export {
        let path = export_session_json(&session, &options.export_dir)?;
        println!("Summary written to {}", path.display());
    }

    Ok(())
}

/// Parse CLI arguments
fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-s" | "--scenario" => {
                i += 1;
                if let Some(value) = args.get(i) {
                    options.scenario = value.clone();
                }
            }
            "-l" | "--level" => {
                i += 1;
                if let Some(value) = args.get(i) {
                    options.level_id = value.parse().unwrap_or(2);
                }
            }
            "--seed" => {
                i += 1;
                if let Some(value) = args.get(i) {
                    options.seed = value.parse().unwrap_or(42);
                }
            }
            "-j" | "--jitter" => {
                i += 1;
                if let Some(value) = args.get(i) {
                    options.jitter = value.parse().unwrap_or(0.0);
                }
            }
            "-p" | "--params" => {
                i += 1;
                if let Some(value) = args.get(i) {
                    options.params_dir = Some(PathBuf::from(value));
                }
            }
            "-e" | "--export" => options.export = true,
            "-o" | "--export-dir" => {
                i += 1;
                if let Some(value) = args.get(i) {
                    options.export_dir = PathBuf::from(value);
                    options.export = true;
                }
            }
            "--help" | "-h" => {
                println!("Endonasal Simulator");
                println!();
                println!("Usage: endonasal-simulator [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --scenario NAME   cushing | acromegaly | nfa (default: nfa)");
                println!("  -l, --level N         Level id (default: 2)");
                println!("  --seed N              Bleed and jitter seed (default: 42)");
                println!("  -j, --jitter S        Tracking noise σ in hand units (default: 0)");
                println!("  -p, --params DIR      Parameter directory (default: data/parameters)");
                println!("  -e, --export          Write CSV time series and JSON summary");
                println!("  -o, --export-dir DIR  Export directory (default: exports)");
                println!("  --help, -h            Show this help");
                std::process::exit(0);
            }
            other => log::warn!("Ignoring unknown argument '{}'", other),
        }
        i += 1;
    }

    options
}

fn main() -> Result<()> {
    env_logger::init();

    let options = parse_args();
    run_diagnostics(&options)
}
