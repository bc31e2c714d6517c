//! Scripted collaborators for exercising the runner and session without a
//! display. Public so integration tests and dry runs can share them.

use std::collections::VecDeque;
use std::time::Duration;

use anyhow::{Result, anyhow};
use vsearch_core::{KeyPress, MessageScreen, SearchItem};
use vsearch_timing::TimestampSource;

use crate::io::{Renderer, ResponseSource};

/// Everything a [`RecordingRenderer`] was asked to show, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum Shown {
    Blank(Duration),
    Search(Vec<SearchItem>),
    Message(MessageScreen),
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub shown: Vec<Shown>,
}

impl RecordingRenderer {
    pub fn searches(&self) -> usize {
        self.shown
            .iter()
            .filter(|s| matches!(s, Shown::Search(_)))
            .count()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.shown
            .iter()
            .filter_map(|s| match s {
                Shown::Message(m) => Some(m.text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn blank(&mut self, duration: Duration) -> Result<()> {
        self.shown.push(Shown::Blank(duration));
        Ok(())
    }
    fn show_search(&mut self, items: &[SearchItem]) -> Result<()> {
        self.shown.push(Shown::Search(items.to_vec()));
        Ok(())
    }
    fn show_message(&mut self, screen: &MessageScreen) -> Result<()> {
        self.shown.push(Shown::Message(screen.clone()));
        Ok(())
    }
}

/// Replays a fixed list of key presses. Presses outside the permitted
/// alphabet are skipped, as a real keyboard poll would ignore them.
#[derive(Debug, Default)]
pub struct ScriptedResponses {
    script: VecDeque<KeyPress>,
    /// Alphabets passed to each `wait_for` call
    pub requests: Vec<Vec<String>>,
}

impl ScriptedResponses {
    pub fn new<I>(presses: I) -> Self
    where
        I: IntoIterator<Item = KeyPress>,
    {
        Self {
            script: presses.into_iter().collect(),
            requests: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl ResponseSource for ScriptedResponses {
    fn wait_for(&mut self, allowed: &[String]) -> Result<KeyPress> {
        self.requests.push(allowed.to_vec());
        while let Some(press) = self.script.pop_front() {
            if allowed.contains(&press.symbol) {
                return Ok(press);
            }
        }
        Err(anyhow!("response script exhausted"))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedTimestamp(pub f64);

impl TimestampSource for FixedTimestamp {
    fn now_secs(&self) -> f64 {
        self.0
    }
}
