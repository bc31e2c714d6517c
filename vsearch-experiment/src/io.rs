//! Seams between the trial engine and the outside world.
//!
//! The engine never draws, polls a keyboard or writes a file itself. It drives
//! these traits, and the application decides what sits behind them.

use std::time::Duration;

use anyhow::Result;
use vsearch_core::{KeyPress, MessageScreen, SearchItem, TrialRecord};

/// Presents displays synchronously.
pub trait Renderer {
    /// Clears the display and holds it blank for `duration`.
    fn blank(&mut self, duration: Duration) -> Result<()>;

    /// Shows a search array. Returns once it is on screen.
    fn show_search(&mut self, items: &[SearchItem]) -> Result<()>;

    /// Shows a full-screen message. Waiting for input is the caller's job.
    fn show_message(&mut self, screen: &MessageScreen) -> Result<()>;
}

/// Blocks until one of the permitted symbols is pressed.
pub trait ResponseSource {
    /// Arms a timer and waits, without timeout, for a symbol in `allowed`.
    /// The returned elapsed time is measured from arming.
    fn wait_for(&mut self, allowed: &[String]) -> Result<KeyPress>;
}

/// Append-oriented storage for trial records.
pub trait DataSink {
    fn append(&mut self, record: &TrialRecord) -> Result<()>;

    /// Makes everything appended so far durable. Called once per block.
    fn flush(&mut self) -> Result<()>;
}

/// In-memory sink, useful for tests and dry runs.
impl DataSink for Vec<TrialRecord> {
    fn append(&mut self, record: &TrialRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
