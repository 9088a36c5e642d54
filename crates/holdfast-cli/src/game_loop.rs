//! Real-time driver: runs the engine on its own thread, one tick per tick
//! interval divided by the time scale, and streams snapshots back.
//!
//! Commands arrive via `mpsc` channel and are queued on the engine at the
//! next tick boundary.

use std::io;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use holdfast_core::commands::SimCommand;
use holdfast_core::state::TerritorySnapshot;
use holdfast_sim::presence::ActorPresence;
use holdfast_sim::SimulationEngine;

/// Messages accepted by the game loop thread.
#[derive(Debug, Clone)]
pub enum LoopCommand {
    Sim(SimCommand),
    Shutdown,
}

/// Handles to a running game loop.
pub struct GameLoop {
    pub commands: mpsc::Sender<LoopCommand>,
    pub snapshots: mpsc::Receiver<TerritorySnapshot>,
    handle: JoinHandle<()>,
}

impl GameLoop {
    /// Wait for the loop thread to finish.
    pub fn join(self) {
        if self.handle.join().is_err() {
            log::error!("game loop thread panicked");
        }
    }
}

/// Spawns the game loop in a new thread. It stops after `max_ticks`
/// simulated ticks (if given), on `Shutdown`, or once either channel closes.
pub fn spawn_game_loop(engine: SimulationEngine, max_ticks: Option<u64>) -> io::Result<GameLoop> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<LoopCommand>();
    let (snap_tx, snap_rx) = mpsc::channel::<TerritorySnapshot>();

    let handle = std::thread::Builder::new()
        .name("holdfast-game-loop".into())
        .spawn(move || run_game_loop(engine, cmd_rx, snap_tx, max_ticks))?;

    Ok(GameLoop {
        commands: cmd_tx,
        snapshots: snap_rx,
        handle,
    })
}

/// Wall-clock time one tick should take at the given speed. Near-zero
/// speeds fall back to the nominal interval.
pub fn effective_tick_duration(tick_interval_secs: f64, time_scale: f64) -> Duration {
    let nominal = Duration::from_secs_f64(tick_interval_secs);
    if time_scale > 0.001 {
        nominal.div_f64(time_scale)
    } else {
        nominal
    }
}

fn run_game_loop(
    mut engine: SimulationEngine,
    cmd_rx: mpsc::Receiver<LoopCommand>,
    snap_tx: mpsc::Sender<TerritorySnapshot>,
    max_ticks: Option<u64>,
) {
    let mut presence = ActorPresence;
    let mut next_tick_time = Instant::now();

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(LoopCommand::Sim(cmd)) => engine.queue_command(cmd),
                Ok(LoopCommand::Shutdown) => return,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return,
            }
        }

        // 2. Advance one tick (the engine handles pause itself)
        engine.move_actors();
        let snapshot = engine.tick(&mut presence);
        let done = max_ticks.is_some_and(|max| snapshot.time.tick >= max);

        if snap_tx.send(snapshot).is_err() || done {
            return;
        }

        // 3. Sleep until next tick, adjusting for time_scale
        let tick_duration = effective_tick_duration(engine.tick_interval(), engine.time_scale());
        next_tick_time += tick_duration;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > tick_duration * 2 {
            // Too far behind; don't try to catch up
            next_tick_time = now;
        }
    }
}
