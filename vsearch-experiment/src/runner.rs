use std::time::Duration;

use tracing::debug;
use vsearch_core::{Trial, TrialRecord};
use vsearch_timing::TimestampSource;

use crate::error::Result;
use crate::io::{Renderer, ResponseSource};

/// How a single trial ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TrialOutcome {
    Completed(TrialRecord),
    /// The quit key was pressed. No record exists for this trial.
    Quit,
}

/// Drives one trial: blank interval, search display, response, scoring.
#[derive(Debug, Clone)]
pub struct TrialRunner {
    subject: String,
    iti: Duration,
    alphabet: Vec<String>,
    quit_key: String,
}

impl TrialRunner {
    pub fn new(
        subject: impl Into<String>,
        iti: Duration,
        response_keys: Vec<String>,
        quit_key: impl Into<String>,
    ) -> Self {
        let quit_key = quit_key.into();
        let mut alphabet = response_keys;
        alphabet.push(quit_key.clone());
        Self {
            subject: subject.into(),
            iti,
            alphabet,
            quit_key,
        }
    }

    pub fn quit_key(&self) -> &str {
        &self.quit_key
    }

    pub fn run_trial<D, S, T>(
        &self,
        trial: &Trial,
        block_index: usize,
        trial_index: usize,
        renderer: &mut D,
        responses: &mut S,
        timestamps: &T,
    ) -> Result<TrialOutcome>
    where
        D: Renderer + ?Sized,
        S: ResponseSource + ?Sized,
        T: TimestampSource + ?Sized,
    {
        renderer.blank(self.iti)?;
        renderer.show_search(&trial.items())?;

        let press = responses.wait_for(&self.alphabet)?;
        if press.symbol == self.quit_key {
            debug!(block_index, trial_index, "quit during response wait");
            return Ok(TrialOutcome::Quit);
        }

        let acc = u8::from(press.symbol == trial.cresp);
        let rt_ms = press.elapsed.as_secs_f64() * 1000.0;
        debug!(
            block_index,
            trial_index,
            set_size = trial.set_size,
            resp = %press.symbol,
            cresp = %trial.cresp,
            rt_ms,
            acc,
            "trial complete"
        );

        Ok(TrialOutcome::Completed(TrialRecord {
            subject: self.subject.clone(),
            block: block_index,
            trial: trial_index,
            timestamp: timestamps.now_secs(),
            set_size: trial.set_size,
            rt_ms,
            cresp: trial.cresp.clone(),
            resp: press.symbol,
            acc,
            location_tested: trial.test_location,
            locations: trial.locations_json()?,
            rotations: trial.rotations_json()?,
            stimuli: trial.stimuli_list(),
        }))
    }
}
