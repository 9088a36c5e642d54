//! Operator console: one command per stdin line while running in real time.

use holdfast_core::commands::SimCommand;

use crate::game_loop::LoopCommand;

/// Parse `pause`, `resume`, `speed <x>` or `quit`. Case-insensitive.
pub fn parse_command(line: &str) -> Option<LoopCommand> {
    let mut words = line.split_whitespace();
    let verb = words.next()?.to_ascii_lowercase();
    let command = match verb.as_str() {
        "pause" => LoopCommand::Sim(SimCommand::Pause),
        "resume" => LoopCommand::Sim(SimCommand::Resume),
        "speed" => {
            let scale = words.next()?.parse::<f64>().ok()?;
            LoopCommand::Sim(SimCommand::SetTimeScale { scale })
        }
        "quit" | "exit" => LoopCommand::Shutdown,
        _ => return None,
    };
    if words.next().is_some() {
        return None;
    }
    Some(command)
}
