use std::str::FromStr;

use clap::Args;
use minidesk_core::{BoardDriver, Config, TileBoard};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use tracing::debug;

use super::{block_on, print_event, stdin_lines};

#[derive(Args)]
pub struct BoardArgs {
    /// Seed for tile placement; random when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Do not spawn tiles automatically
    #[arg(long)]
    manual: bool,
}

/// A line typed on stdin during a board session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoardCommand {
    Spawn,
    Move(usize, usize),
    Reset,
    Status,
    Show,
    Quit,
}

impl FromStr for BoardCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or_else(|| "empty command".to_string())?;
        let mut index = |name: &str| -> Result<usize, String> {
            words
                .next()
                .ok_or_else(|| format!("missing {name} cell"))?
                .parse::<usize>()
                .map_err(|e| format!("invalid {name} cell: {e}"))
        };

        let cmd = match verb {
            "spawn" => BoardCommand::Spawn,
            "move" | "m" => {
                let from = index("source")?;
                let to = index("target")?;
                BoardCommand::Move(from, to)
            }
            "reset" => BoardCommand::Reset,
            "status" | "s" => BoardCommand::Status,
            "show" => BoardCommand::Show,
            "quit" | "q" | "exit" => BoardCommand::Quit,
            other => return Err(format!("unknown command: {other}")),
        };
        Ok(cmd)
    }
}

pub fn run(args: BoardArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    debug!(seed = ?args.seed, manual = args.manual, "board session starting");
    let rng = match args.seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::from_entropy(),
    };

    block_on(async move {
        let (driver, mut events) = BoardDriver::with_tick(config.tile_board(), rng, config.board_tick());
        let mut lines = stdin_lines();

        // The board opens with one tile already placed.
        print_event(&driver.spawn_tile())?;
        if !args.manual {
            driver.start();
        }

        loop {
            tokio::select! {
                Some(event) = events.recv() => print_event(&event)?,
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if line.trim().is_empty() {
                        continue;
                    }
                    let cmd = match line.parse::<BoardCommand>() {
                        Ok(cmd) => cmd,
                        Err(msg) => {
                            eprintln!("error: {msg}");
                            continue;
                        }
                    };
                    match cmd {
                        BoardCommand::Quit => break,
                        BoardCommand::Spawn => print_event(&driver.spawn_tile())?,
                        BoardCommand::Move(from, to) => print_event(&driver.move_tile(from, to))?,
                        BoardCommand::Reset => print_event(&driver.reset())?,
                        BoardCommand::Status => print_event(&driver.snapshot())?,
                        BoardCommand::Show => {
                            for row in driver.read(TileBoard::render_rows) {
                                println!("{row}");
                            }
                        }
                    }
                }
            }
        }

        driver.stop();
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_moves() {
        assert_eq!("move 3 4".parse(), Ok(BoardCommand::Move(3, 4)));
        assert_eq!("m 0 24".parse(), Ok(BoardCommand::Move(0, 24)));
        assert!("move 3".parse::<BoardCommand>().is_err());
        assert!("move a b".parse::<BoardCommand>().is_err());
    }

    #[test]
    fn parses_simple_verbs() {
        assert_eq!("spawn".parse(), Ok(BoardCommand::Spawn));
        assert_eq!(" status ".parse(), Ok(BoardCommand::Status));
        assert!("".parse::<BoardCommand>().is_err());
    }
}
