//! Headless sessions: a display that draws nothing and an observer that
//! answers from what that display was last asked to show. Used to pilot a
//! configuration end to end, including the data files, without a monitor.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use rand::Rng;
use tracing::{info, trace};
use vsearch_core::{KeyPress, MessageScreen, SearchItem, TrialRecord};
use vsearch_experiment::{DataSink, Renderer, ResponseSource, SearchDesign, TrialBuilder};

/// Response model of the simulated participant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverParams {
    /// Probability of pressing the correct key, clamped to `0.0..=1.0`
    pub accuracy: f64,
    pub base_rt_ms: f64,
    /// Added per item on the display
    pub slope_ms: f64,
    /// Uniform noise of up to this much either way
    pub jitter_ms: f64,
}

impl Default for ObserverParams {
    fn default() -> Self {
        Self {
            accuracy: 0.95,
            base_rt_ms: 450.0,
            slope_ms: 25.0,
            jitter_ms: 60.0,
        }
    }
}

type SharedScreen = Rc<RefCell<Option<Vec<SearchItem>>>>;

/// Renderer half of a simulation. ITIs are not slept.
pub struct SimulatedDisplay {
    screen: SharedScreen,
    idle: Duration,
}

impl SimulatedDisplay {
    /// Blank time that a real session would have spent waiting.
    pub fn idle(&self) -> Duration {
        self.idle
    }
}

impl Renderer for SimulatedDisplay {
    fn blank(&mut self, duration: Duration) -> Result<()> {
        self.screen.replace(None);
        self.idle += duration;
        Ok(())
    }

    fn show_search(&mut self, items: &[SearchItem]) -> Result<()> {
        self.screen.replace(Some(items.to_vec()));
        Ok(())
    }

    fn show_message(&mut self, screen: &MessageScreen) -> Result<()> {
        trace!(text = %screen.text.lines().next().unwrap_or_default(), "message");
        self.screen.replace(None);
        Ok(())
    }
}

/// Response half of a simulation.
pub struct SimulatedObserver<R> {
    screen: SharedScreen,
    builder: TrialBuilder,
    continue_key: String,
    params: ObserverParams,
    rng: R,
}

impl<R: Rng> SimulatedObserver<R> {
    fn rt_for(&mut self, set_size: usize) -> Duration {
        let p = &self.params;
        let jitter = if p.jitter_ms > 0.0 {
            self.rng.random_range(-p.jitter_ms..=p.jitter_ms)
        } else {
            0.0
        };
        let ms = (p.base_rt_ms + p.slope_ms * set_size as f64 + jitter).max(0.0);
        Duration::from_secs_f64(ms / 1000.0)
    }

    fn respond_to_search(&mut self, items: &[SearchItem]) -> Result<KeyPress> {
        let target = items
            .iter()
            .find(|item| item.stimulus.is_target())
            .ok_or_else(|| anyhow!("search display has no target"))?;
        let correct = self
            .builder
            .key_for_rotation(target.rotation)
            .ok_or_else(|| anyhow!("no key for target rotation {}", target.rotation))?
            .to_string();

        let symbol = if self.rng.random_bool(self.params.accuracy) {
            correct
        } else {
            let wrong: Vec<&String> = self
                .builder
                .keys()
                .iter()
                .filter(|k| **k != correct)
                .collect();
            match wrong.len() {
                0 => correct,
                n => wrong[self.rng.random_range(0..n)].clone(),
            }
        };
        Ok(KeyPress::new(symbol, self.rt_for(items.len())))
    }
}

impl<R: Rng> ResponseSource for SimulatedObserver<R> {
    fn wait_for(&mut self, allowed: &[String]) -> Result<KeyPress> {
        let showing = self.screen.borrow().clone();
        match showing {
            Some(items) => self.respond_to_search(&items),
            None if allowed.contains(&self.continue_key) => {
                Ok(KeyPress::new(self.continue_key.clone(), Duration::ZERO))
            }
            None => Err(anyhow!("asked for {allowed:?} with nothing to respond to")),
        }
    }
}

/// A display and an observer that share one screen.
pub fn simulated_pair<R: Rng>(
    design: &SearchDesign,
    params: ObserverParams,
    rng: R,
) -> (SimulatedDisplay, SimulatedObserver<R>) {
    let screen = SharedScreen::default();
    let params = ObserverParams {
        accuracy: params.accuracy.clamp(0.0, 1.0),
        ..params
    };
    let display = SimulatedDisplay {
        screen: Rc::clone(&screen),
        idle: Duration::ZERO,
    };
    let observer = SimulatedObserver {
        screen,
        builder: design.builder().clone(),
        continue_key: design.config().continue_key.clone(),
        params,
        rng,
    };
    (display, observer)
}

/// Passes records through to another sink while keeping a running score.
pub struct ScoringSink<K> {
    inner: K,
    trials: usize,
    correct: usize,
    rt_total_ms: f64,
}

impl<K: DataSink> ScoringSink<K> {
    pub fn new(inner: K) -> Self {
        Self {
            inner,
            trials: 0,
            correct: 0,
            rt_total_ms: 0.0,
        }
    }

    pub fn into_inner(self) -> K {
        self.inner
    }

    pub fn accuracy(&self) -> Option<f64> {
        (self.trials > 0).then(|| self.correct as f64 / self.trials as f64)
    }

    pub fn mean_rt_ms(&self) -> Option<f64> {
        (self.trials > 0).then(|| self.rt_total_ms / self.trials as f64)
    }

    pub fn log_summary(&self) {
        match (self.accuracy(), self.mean_rt_ms()) {
            (Some(acc), Some(rt)) => info!(
                trials = self.trials,
                correct = self.correct,
                "accuracy {:.1}%, mean RT {:.0} ms",
                acc * 100.0,
                rt
            ),
            _ => info!("no trials recorded"),
        }
    }
}

impl<K: DataSink> DataSink for ScoringSink<K> {
    fn append(&mut self, record: &TrialRecord) -> Result<()> {
        self.trials += 1;
        if record.is_correct() {
            self.correct += 1;
        }
        self.rt_total_ms += record.rt_ms;
        self.inner.append(record)
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }
}
