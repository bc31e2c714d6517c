use rand::Rng;
use tracing::{debug, info, info_span};
use vsearch_core::MessageScreen;
use vsearch_timing::TimestampSource;

use crate::config::SearchDesign;
use crate::error::Result;
use crate::io::{DataSink, Renderer, ResponseSource};
use crate::runner::{TrialOutcome, TrialRunner};

/// How a whole session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Finished {
        trials: usize,
    },
    /// Quit key pressed. `trial` is `None` when quitting from a message screen.
    Aborted {
        block: Option<usize>,
        trial: Option<usize>,
        trials: usize,
    },
}

/// Runs every block of a design for one participant: instructions, blocks
/// separated by breaks, then the end screen.
#[derive(Debug, Clone)]
pub struct Session<'a> {
    design: &'a SearchDesign,
    runner: TrialRunner,
    continue_alphabet: Vec<String>,
}

impl<'a> Session<'a> {
    pub fn new(design: &'a SearchDesign, subject: impl Into<String>) -> Self {
        let config = design.config();
        Self {
            design,
            runner: design.runner(subject),
            continue_alphabet: vec![config.continue_key.clone(), config.quit_key.clone()],
        }
    }

    pub fn run<R, D, S, K, T>(
        &self,
        rng: &mut R,
        renderer: &mut D,
        responses: &mut S,
        sink: &mut K,
        timestamps: &T,
    ) -> Result<SessionOutcome>
    where
        R: Rng + ?Sized,
        D: Renderer + ?Sized,
        S: ResponseSource + ?Sized,
        K: DataSink + ?Sized,
        T: TimestampSource + ?Sized,
    {
        let blocks = self.design.number_of_blocks();
        let mut completed = 0;

        renderer.show_message(&self.design.loading_screen())?;
        for screen in self.design.instruction_screens() {
            if !self.present(&screen, renderer, responses)? {
                return Ok(SessionOutcome::Aborted {
                    block: None,
                    trial: None,
                    trials: completed,
                });
            }
        }

        for block_index in 0..blocks {
            let _span = info_span!("block", block = block_index).entered();
            let block = self.design.assembler().build_block(rng)?;
            info!(trials = block.len(), "starting block {}/{}", block_index + 1, blocks);

            for (trial_index, trial) in block.iter().enumerate() {
                match self.runner.run_trial(
                    trial,
                    block_index,
                    trial_index,
                    renderer,
                    responses,
                    timestamps,
                )? {
                    TrialOutcome::Completed(record) => {
                        sink.append(&record)?;
                        completed += 1;
                    }
                    TrialOutcome::Quit => {
                        sink.flush()?;
                        info!(trial = trial_index, completed, "session terminated by quit key");
                        return Ok(SessionOutcome::Aborted {
                            block: Some(block_index),
                            trial: Some(trial_index),
                            trials: completed,
                        });
                    }
                }
            }

            sink.flush()?;
            debug!("block flushed");

            if block_index + 1 != blocks
                && !self.present(&self.design.break_screen(), renderer, responses)?
            {
                return Ok(SessionOutcome::Aborted {
                    block: Some(block_index),
                    trial: None,
                    trials: completed,
                });
            }
        }

        if !self.present(&self.design.end_screen(), renderer, responses)? {
            return Ok(SessionOutcome::Aborted {
                block: None,
                trial: None,
                trials: completed,
            });
        }
        info!(trials = completed, "session finished");
        Ok(SessionOutcome::Finished { trials: completed })
    }

    /// Shows a message screen. Returns `false` if the quit key was pressed
    /// while waiting on it.
    fn present<D, S>(
        &self,
        screen: &MessageScreen,
        renderer: &mut D,
        responses: &mut S,
    ) -> Result<bool>
    where
        D: Renderer + ?Sized,
        S: ResponseSource + ?Sized,
    {
        renderer.show_message(screen)?;
        if !screen.wait_for_input {
            return Ok(true);
        }
        let press = responses.wait_for(&self.continue_alphabet)?;
        Ok(press.symbol != self.runner.quit_key())
    }
}
