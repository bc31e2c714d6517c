use rand::Rng;
use vsearch_core::{Orientation, StimulusKind, Trial};

use crate::error::{ConfigError, SamplingError};
use crate::sampler::LocationSampler;

/// Builds single search trials from a sampler and an orientation-to-key map.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialBuilder {
    sampler: LocationSampler,
    orientations: Vec<Orientation>,
    keys: Vec<String>,
}

impl TrialBuilder {
    /// `orientations[i]` is answered with `keys[i]`.
    pub fn new(
        sampler: LocationSampler,
        orientations: Vec<Orientation>,
        keys: Vec<String>,
    ) -> Result<Self, ConfigError> {
        if keys.len() != orientations.len() {
            return Err(ConfigError::KeyOrientationMismatch {
                keys: keys.len(),
                orientations: orientations.len(),
            });
        }
        if orientations.is_empty() {
            return Err(ConfigError::NoOrientations);
        }
        Ok(Self {
            sampler,
            orientations,
            keys,
        })
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Response key for an item drawn at `rotation`, if that rotation belongs to
    /// a configured orientation.
    pub fn key_for_rotation(&self, rotation: u16) -> Option<&str> {
        self.orientations
            .iter()
            .position(|o| o.degrees() == rotation)
            .map(|i| self.keys[i].as_str())
    }

    pub fn build_trial<R: Rng + ?Sized>(
        &self,
        set_size: usize,
        rng: &mut R,
    ) -> Result<Trial, SamplingError> {
        if set_size == 0 {
            return Err(SamplingError::EmptyDisplay);
        }
        let test_location = rng.random_range(0..set_size);
        let locations = self.sampler.sample(set_size, rng)?;

        let orientation_idx: Vec<usize> = (0..set_size)
            .map(|_| rng.random_range(0..self.orientations.len()))
            .collect();
        let rotations = orientation_idx
            .iter()
            .map(|&i| self.orientations[i].degrees())
            .collect();
        let cresp = self.keys[orientation_idx[test_location]].clone();

        let mut stimuli: Vec<StimulusKind> = (0..set_size)
            .map(|_| StimulusKind::DISTRACTORS[rng.random_range(0..2)])
            .collect();
        stimuli[test_location] = StimulusKind::Target;

        Ok(Trial {
            set_size,
            locations,
            rotations,
            stimuli,
            test_location,
            cresp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn builder() -> TrialBuilder {
        TrialBuilder::new(
            LocationSampler::new(6.0, 2.0, None).unwrap(),
            Orientation::ALL.to_vec(),
            vec!["l".into(), "u".into(), "r".into(), "d".into()],
        )
        .unwrap()
    }

    #[test]
    fn trial_shape_and_target() {
        let builder = builder();
        let mut rng = StdRng::seed_from_u64(11);
        for set_size in [1, 2, 6, 10, 14, 18] {
            for _ in 0..20 {
                let trial = builder.build_trial(set_size, &mut rng).unwrap();
                assert_eq!(trial.set_size, set_size);
                assert_eq!(trial.locations.len(), set_size);
                assert_eq!(trial.rotations.len(), set_size);
                assert_eq!(trial.stimuli.len(), set_size);
                assert!(trial.test_location < set_size);

                let targets: Vec<usize> = trial
                    .stimuli
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.is_target())
                    .map(|(i, _)| i)
                    .collect();
                assert_eq!(targets, vec![trial.test_location]);
            }
        }
    }

    #[test]
    fn cresp_follows_target_rotation() {
        let builder = builder();
        let mut rng = StdRng::seed_from_u64(12);
        for _ in 0..100 {
            let trial = builder.build_trial(6, &mut rng).unwrap();
            let rotation = trial.rotations[trial.test_location];
            assert_eq!(builder.key_for_rotation(rotation), Some(trial.cresp.as_str()));
        }
    }

    #[test]
    fn rotations_come_from_configured_orientations() {
        let builder = TrialBuilder::new(
            LocationSampler::new(6.0, 2.0, None).unwrap(),
            vec![Orientation::Left, Orientation::Right],
            vec!["z".into(), "m".into()],
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(13);
        let trial = builder.build_trial(18, &mut rng).unwrap();
        assert!(trial.rotations.iter().all(|&r| r == 270 || r == 90));
        assert!(trial.cresp == "z" || trial.cresp == "m");
    }

    #[test]
    fn rejects_mismatched_keys() {
        let err = TrialBuilder::new(
            LocationSampler::new(6.0, 2.0, None).unwrap(),
            Orientation::ALL.to_vec(),
            vec!["a".into(), "b".into(), "c".into()],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::KeyOrientationMismatch {
                keys: 3,
                orientations: 4
            }
        );
    }

    #[test]
    fn exhaustion_propagates() {
        let builder = TrialBuilder::new(
            LocationSampler::new(1.0, 6.0, None).unwrap(),
            Orientation::ALL.to_vec(),
            vec!["l".into(), "u".into(), "r".into(), "d".into()],
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(14);
        assert!(matches!(
            builder.build_trial(50, &mut rng),
            Err(SamplingError::Exhausted { set_size: 50, .. })
        ));
    }

    #[test]
    fn empty_display_is_an_error() {
        let mut rng = StdRng::seed_from_u64(15);
        assert_eq!(
            builder().build_trial(0, &mut rng).unwrap_err(),
            SamplingError::EmptyDisplay
        );
    }
}
