pub mod board;
pub mod config;
pub mod cost;
pub mod timer;

use std::error::Error;
use std::future::Future;

use minidesk_core::Event;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Print one event as a JSON line on stdout.
pub fn print_event(event: &Event) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

/// Run an interactive session on a single-threaded runtime.
pub fn block_on<F>(session: F) -> Result<(), Box<dyn Error>>
where
    F: Future<Output = Result<(), Box<dyn Error>>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session)
}

pub type StdinLines = tokio::io::Lines<BufReader<tokio::io::Stdin>>;

pub fn stdin_lines() -> StdinLines {
    BufReader::new(tokio::io::stdin()).lines()
}
