use std::str::FromStr;

use clap::Args;
use minidesk_core::{Config, Mode, TimerDriver};
use tracing::debug;

use super::{block_on, print_event, stdin_lines};

#[derive(Args)]
pub struct TimerArgs {
    /// Focus length in minutes (overrides config)
    #[arg(long)]
    focus: Option<i64>,
    /// Short rest length in minutes (overrides config)
    #[arg(long)]
    short_rest: Option<i64>,
    /// Long rest length in minutes (overrides config)
    #[arg(long)]
    long_rest: Option<i64>,
}

/// A line typed on stdin during a timer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerCommand {
    Toggle,
    Start,
    Pause,
    Mode(Mode),
    Duration(Mode, i64),
    Reset,
    Status,
    Quit,
}

impl FromStr for TimerCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or_else(|| "empty command".to_string())?;
        let mode = |word: Option<&str>| -> Result<Mode, String> {
            word.ok_or_else(|| "missing mode".to_string())?
                .parse::<Mode>()
                .map_err(|e| e.to_string())
        };

        let cmd = match verb {
            "toggle" | "t" => TimerCommand::Toggle,
            "start" => TimerCommand::Start,
            "pause" => TimerCommand::Pause,
            "mode" => TimerCommand::Mode(mode(words.next())?),
            "duration" => {
                let m = mode(words.next())?;
                let minutes = words
                    .next()
                    .ok_or_else(|| "missing minutes".to_string())?
                    .parse::<i64>()
                    .map_err(|e| format!("invalid minutes: {e}"))?;
                TimerCommand::Duration(m, minutes)
            }
            "reset" => TimerCommand::Reset,
            "status" | "s" => TimerCommand::Status,
            "quit" | "q" | "exit" => TimerCommand::Quit,
            other => return Err(format!("unknown command: {other}")),
        };
        Ok(cmd)
    }
}

pub fn run(args: TimerArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut timer = config.interval_timer();
    for (mode, minutes) in [
        (Mode::Focus, args.focus),
        (Mode::ShortRest, args.short_rest),
        (Mode::LongRest, args.long_rest),
    ] {
        if let Some(minutes) = minutes {
            timer.set_duration(mode, minutes);
        }
    }

    debug!(durations = ?timer.durations(), "timer session starting");
    block_on(async move {
        let (driver, mut events) = TimerDriver::new(timer);
        let mut lines = stdin_lines();
        print_event(&driver.snapshot())?;

        loop {
            tokio::select! {
                Some(event) = events.recv() => print_event(&event)?,
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if line.trim().is_empty() {
                        continue;
                    }
                    let cmd = match line.parse::<TimerCommand>() {
                        Ok(cmd) => cmd,
                        Err(msg) => {
                            eprintln!("error: {msg}");
                            continue;
                        }
                    };
                    let event = match cmd {
                        TimerCommand::Quit => break,
                        TimerCommand::Toggle => driver.toggle_run(),
                        TimerCommand::Start => driver.start().unwrap_or_else(|| driver.snapshot()),
                        TimerCommand::Pause => driver.pause().unwrap_or_else(|| driver.snapshot()),
                        TimerCommand::Mode(mode) => driver.select_mode(mode),
                        TimerCommand::Duration(mode, minutes) => driver.set_duration(mode, minutes),
                        TimerCommand::Reset => driver.reset(),
                        TimerCommand::Status => driver.snapshot(),
                    };
                    print_event(&event)?;
                }
            }
        }

        driver.shutdown();
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
