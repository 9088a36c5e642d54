//! holdfast: run and validate territory-capture scenarios from the terminal.
//!
//! Usage:
//!   holdfast run --scenario mojave.json --ticks 600
//!   holdfast run --realtime --snapshots
//!   holdfast validate --scenario mojave.json

mod console;
mod game_loop;

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;

use log::info;

use holdfast_core::events::PointEvent;
use holdfast_core::state::TerritorySnapshot;
use holdfast_sim::presence::ActorPresence;
use holdfast_sim::scenario::Scenario;
use holdfast_sim::SimulationEngine;

use crate::game_loop::{spawn_game_loop, LoopCommand};

const DEFAULT_TICKS: u64 = 600;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "validate" => cmd_validate(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "holdfast: territory capture simulator\n\
         \n\
         Commands:\n\
         \n\
         run       Simulate a scenario and print events as JSON lines\n\
         \n\
           --scenario <path>  Scenario JSON file (default: built-in frontline demo)\n\
           --ticks <N>        Stop after N ticks (default: 600)\n\
           --realtime         Tick at wall-clock speed; reads pause/resume/speed <x> on stdin\n\
           --snapshots        Print every territory snapshot instead of just events\n\
         \n\
         validate  Check a scenario file without running it\n\
         \n\
           --scenario <path>  Scenario JSON file\n\
         \n\
         Logging follows RUST_LOG (default: info).\n"
    );
}

fn parse_scenario_path(args: &[String]) -> Option<PathBuf> {
    for i in 0..args.len() {
        if args[i] == "--scenario" && i + 1 < args.len() {
            return Some(PathBuf::from(&args[i + 1]));
        }
    }
    None
}

fn parse_ticks(args: &[String], default: u64) -> u64 {
    for i in 0..args.len() {
        if args[i] == "--ticks" && i + 1 < args.len() {
            if let Ok(n) = args[i + 1].parse::<u64>() {
                return n;
            }
        }
    }
    default
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}

fn load_scenario(args: &[String]) -> Scenario {
    let Some(path) = parse_scenario_path(args) else {
        info!("no --scenario given, using the built-in frontline demo");
        return Scenario::frontline();
    };
    match Scenario::load(&path) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

// --- Run command ---

fn cmd_run(args: &[String]) {
    let scenario = load_scenario(args);
    let ticks = parse_ticks(args, DEFAULT_TICKS);
    let snapshots = has_flag(args, "--snapshots");

    let engine = match SimulationEngine::from_scenario(&scenario) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    info!(
        "running {} points and {} actors for {ticks} ticks",
        scenario.points.len(),
        scenario.actors.len()
    );

    if has_flag(args, "--realtime") {
        run_realtime(engine, ticks, snapshots);
    } else {
        run_headless(engine, ticks, snapshots);
    }
}

fn run_headless(mut engine: SimulationEngine, ticks: u64, snapshots: bool) {
    let mut presence = ActorPresence;
    for _ in 0..ticks {
        engine.move_actors();
        let snapshot = engine.tick(&mut presence);
        emit(&snapshot, snapshots);
    }
    info!("finished at tick {}", engine.time().tick);
}

fn run_realtime(engine: SimulationEngine, ticks: u64, snapshots: bool) {
    let game_loop = match spawn_game_loop(engine, Some(ticks)) {
        Ok(game_loop) => game_loop,
        Err(e) => {
            eprintln!("Error: failed to start game loop: {e}");
            process::exit(1);
        }
    };

    // Operator console. Detached: it blocks on stdin until the process exits.
    let commands = game_loop.commands.clone();
    let console = std::thread::Builder::new()
        .name("holdfast-console".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                match console::parse_command(&line) {
                    Some(command) => {
                        if commands.send(command).is_err() {
                            break;
                        }
                    }
                    None => eprintln!("Unknown console command: {}", line.trim()),
                }
            }
        });
    if let Err(e) = console {
        log::warn!("operator console unavailable: {e}");
    }

    for snapshot in game_loop.snapshots.iter() {
        emit(&snapshot, snapshots);
    }
    let _ = game_loop.commands.send(LoopCommand::Shutdown);
    game_loop.join();
}

/// Announce this tick's events and print them (or the whole snapshot) as JSON.
fn emit(snapshot: &TerritorySnapshot, full: bool) {
    for event in &snapshot.events {
        info!("[tick {}] {}", snapshot.time.tick, event.announcement());
    }

    let lines: Vec<serde_json::Result<String>> = if full {
        vec![serde_json::to_string(snapshot)]
    } else {
        snapshot.events.iter().map(event_line).collect()
    };
    for line in lines {
        match line {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("failed to serialize output: {e}"),
        }
    }
}

fn event_line(event: &PointEvent) -> serde_json::Result<String> {
    serde_json::to_string(event)
}

// --- Validate command ---

fn cmd_validate(args: &[String]) {
    let Some(path) = parse_scenario_path(args) else {
        eprintln!("Error: --scenario <path> is required");
        process::exit(1);
    };

    match Scenario::load(&path) {
        Ok(scenario) => {
            println!(
                "{}: OK ({} points, {} actors)",
                path.display(),
                scenario.points.len(),
                scenario.actors.len()
            );
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
