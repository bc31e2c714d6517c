use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;
use vsearch_core::Trial;

use crate::error::{ConfigError, SamplingError};
use crate::trial::TrialBuilder;

/// Produces blocks with an exact number of trials per set size, in shuffled
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockAssembler {
    builder: TrialBuilder,
    set_sizes: Vec<usize>,
    trials_per_block: usize,
    trials_per_set_size: usize,
}

impl BlockAssembler {
    pub fn new(
        trials_per_block: usize,
        set_sizes: Vec<usize>,
        builder: TrialBuilder,
    ) -> Result<Self, ConfigError> {
        if set_sizes.is_empty() {
            return Err(ConfigError::NoSetSizes);
        }
        if set_sizes.contains(&0) {
            return Err(ConfigError::ZeroSetSize);
        }
        if trials_per_block % set_sizes.len() != 0 {
            return Err(ConfigError::UnevenBlock {
                trials_per_block,
                set_sizes: set_sizes.len(),
            });
        }
        Ok(Self {
            builder,
            trials_per_set_size: trials_per_block / set_sizes.len(),
            set_sizes,
            trials_per_block,
        })
    }

    pub fn builder(&self) -> &TrialBuilder {
        &self.builder
    }

    pub fn set_sizes(&self) -> &[usize] {
        &self.set_sizes
    }

    pub fn trials_per_block(&self) -> usize {
        self.trials_per_block
    }

    pub fn trials_per_set_size(&self) -> usize {
        self.trials_per_set_size
    }

    pub fn build_block<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Trial>, SamplingError> {
        let mut trials = Vec::with_capacity(self.trials_per_block);
        for &set_size in &self.set_sizes {
            for _ in 0..self.trials_per_set_size {
                trials.push(self.builder.build_trial(set_size, rng)?);
            }
        }
        trials.shuffle(rng);
        debug!(trials = trials.len(), "assembled block");
        Ok(trials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::LocationSampler;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashMap;
    use vsearch_core::Orientation;

    fn builder() -> TrialBuilder {
        TrialBuilder::new(
            LocationSampler::new(6.0, 2.0, None).unwrap(),
            Orientation::ALL.to_vec(),
            Orientation::ALL.iter().map(|o| o.name().to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn exact_counts_per_set_size() {
        let assembler = BlockAssembler::new(20, vec![2, 6, 10, 14, 18], builder()).unwrap();
        let mut rng = StdRng::seed_from_u64(21);
        let block = assembler.build_block(&mut rng).unwrap();
        assert_eq!(block.len(), 20);

        let mut counts: HashMap<usize, usize> = HashMap::new();
        for trial in &block {
            *counts.entry(trial.set_size).or_default() += 1;
        }
        assert_eq!(counts.len(), 5);
        assert!(counts.values().all(|&c| c == 4), "{counts:?}");
    }

    #[test]
    fn order_is_shuffled() {
        let assembler = BlockAssembler::new(20, vec![2, 6, 10, 14, 18], builder()).unwrap();
        let mut rng = StdRng::seed_from_u64(22);
        let sorted_blocks = (0..20)
            .map(|_| assembler.build_block(&mut rng).unwrap())
            .filter(|block| block.windows(2).all(|w| w[0].set_size <= w[1].set_size))
            .count();
        // A sorted order out of 20!/(4!^5) arrangements should essentially never occur.
        assert_eq!(sorted_blocks, 0);
    }

    #[test]
    fn rejects_uneven_split_before_building() {
        assert_eq!(
            BlockAssembler::new(10, vec![2, 6, 10], builder()).unwrap_err(),
            ConfigError::UnevenBlock {
                trials_per_block: 10,
                set_sizes: 3
            }
        );
        assert_eq!(
            BlockAssembler::new(10, vec![], builder()).unwrap_err(),
            ConfigError::NoSetSizes
        );
        assert_eq!(
            BlockAssembler::new(10, vec![0, 2], builder()).unwrap_err(),
            ConfigError::ZeroSetSize
        );
    }

    #[test]
    fn same_seed_same_block() {
        let assembler = BlockAssembler::new(10, vec![2, 6, 10, 14, 18], builder()).unwrap();
        let a = assembler.build_block(&mut StdRng::seed_from_u64(5)).unwrap();
        let b = assembler.build_block(&mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(a, b);
    }
}
