use rand::Rng;
use tracing::trace;
use vsearch_core::{Point, Quadrant};

use crate::error::{ConfigError, SamplingError};

/// Draw budget for one call to [`sample_locations`].
pub const MAX_ATTEMPTS: usize = 1000;

/// Rejection sampler for stimulus locations.
///
/// Candidates are drawn uniformly from the square `[-max_radius, max_radius]^2`,
/// not from a disk.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSampler {
    max_radius: f64,
    min_distance: f64,
    max_per_quadrant: Option<usize>,
}

impl LocationSampler {
    pub fn new(
        max_radius: f64,
        min_distance: f64,
        max_per_quadrant: Option<usize>,
    ) -> Result<Self, ConfigError> {
        for (name, value) in [("max radius", max_radius), ("min distance", min_distance)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidDistance { name, value });
            }
        }
        // Uniform draws over [-r, r] need the width 2r to be finite
        if !(2.0 * max_radius).is_finite() {
            return Err(ConfigError::InvalidDistance {
                name: "max radius",
                value: max_radius,
            });
        }
        if max_per_quadrant == Some(0) {
            return Err(ConfigError::ZeroQuadrantCap);
        }
        Ok(Self {
            max_radius,
            min_distance,
            max_per_quadrant,
        })
    }

    pub fn sample<R: Rng + ?Sized>(
        &self,
        set_size: usize,
        rng: &mut R,
    ) -> Result<Vec<Point>, SamplingError> {
        let mut locations = Vec::with_capacity(set_size);
        let mut quadrant_counts = [0usize; 4];
        let mut attempts = 0;

        while locations.len() < set_size {
            attempts += 1;
            if attempts > MAX_ATTEMPTS {
                return Err(SamplingError::Exhausted {
                    set_size,
                    accepted: locations.len(),
                    attempts: MAX_ATTEMPTS,
                });
            }

            let x = rng.random_range(-self.max_radius..=self.max_radius);
            let y = rng.random_range(-self.max_radius..=self.max_radius);
            let candidate = Point::new(x, y);

            if self.too_close(&candidate, &locations) {
                continue;
            }

            if let Some(cap) = self.max_per_quadrant {
                let quadrant = Quadrant::of(&candidate).index();
                if quadrant_counts[quadrant] >= cap {
                    continue;
                }
                quadrant_counts[quadrant] += 1;
            }
            locations.push(candidate);
        }

        trace!(set_size, attempts, "placed locations");
        Ok(locations)
    }

    fn too_close(&self, candidate: &Point, accepted: &[Point]) -> bool {
        candidate.norm() < self.min_distance
            || accepted
                .iter()
                .any(|p| candidate.distance(p) < self.min_distance)
    }
}

/// One-shot form of [`LocationSampler::sample`].
pub fn sample_locations<R: Rng + ?Sized>(
    set_size: usize,
    max_radius: f64,
    min_distance: f64,
    max_per_quadrant: Option<usize>,
    rng: &mut R,
) -> crate::Result<Vec<Point>> {
    let sampler = LocationSampler::new(max_radius, min_distance, max_per_quadrant)?;
    Ok(sampler.sample(set_size, rng)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn respects_min_distance() {
        let mut rng = StdRng::seed_from_u64(1);
        let sampler = LocationSampler::new(6.0, 2.0, None).unwrap();
        for set_size in [2, 6, 10, 14, 18] {
            let locs = sampler.sample(set_size, &mut rng).unwrap();
            assert_eq!(locs.len(), set_size);
            for (i, a) in locs.iter().enumerate() {
                assert!(a.norm() >= 2.0);
                assert!(a.x.abs() <= 6.0 && a.y.abs() <= 6.0);
                for b in &locs[i + 1..] {
                    assert!(a.distance(b) >= 2.0);
                }
            }
        }
    }

    #[test]
    fn respects_quadrant_cap() {
        let mut rng = StdRng::seed_from_u64(2);
        let sampler = LocationSampler::new(6.0, 2.0, Some(3)).unwrap();
        for _ in 0..50 {
            let locs = sampler.sample(10, &mut rng).unwrap();
            let mut counts = [0; 4];
            for p in &locs {
                counts[p.quadrant().index()] += 1;
            }
            assert!(counts.iter().all(|&c| c <= 3), "{counts:?}");
        }
    }

    #[test]
    fn impossible_packing_exhausts() {
        let mut rng = StdRng::seed_from_u64(3);
        let err = sample_locations(50, 1.0, 6.0, None, &mut rng).unwrap_err();
        match err {
            Error::Sampling(SamplingError::Exhausted {
                set_size,
                accepted,
                attempts,
            }) => {
                assert_eq!(set_size, 50);
                assert_eq!(accepted, 0);
                assert_eq!(attempts, MAX_ATTEMPTS);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn cap_exhausts_when_quadrants_are_full() {
        let mut rng = StdRng::seed_from_u64(4);
        let sampler = LocationSampler::new(6.0, 0.0, Some(1)).unwrap();
        assert!(sampler.sample(4, &mut rng).is_ok());
        assert!(matches!(
            sampler.sample(5, &mut rng),
            Err(SamplingError::Exhausted { accepted: 4, .. })
        ));
    }

    #[test]
    fn zero_set_size_is_empty() {
        let mut rng = StdRng::seed_from_u64(5);
        let sampler = LocationSampler::new(6.0, 2.0, None).unwrap();
        assert!(sampler.sample(0, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(matches!(
            LocationSampler::new(f64::NAN, 2.0, None),
            Err(ConfigError::InvalidDistance { name: "max radius", .. })
        ));
        assert!(matches!(
            LocationSampler::new(6.0, -1.0, None),
            Err(ConfigError::InvalidDistance { name: "min distance", .. })
        ));
        assert_eq!(
            LocationSampler::new(6.0, 2.0, Some(0)),
            Err(ConfigError::ZeroQuadrantCap)
        );
    }

    #[test]
    fn rejects_radius_whose_span_overflows() {
        assert!(matches!(
            LocationSampler::new(f64::MAX, 2.0, None),
            Err(ConfigError::InvalidDistance { name: "max radius", .. })
        ));
        // Huge radii with a finite span still sample
        let sampler = LocationSampler::new(1e300, 0.0, None).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(sampler.sample(3, &mut rng).unwrap().len(), 3);
    }

    #[test]
    fn same_seed_same_locations() {
        let sampler = LocationSampler::new(6.0, 2.0, None).unwrap();
        let a = sampler.sample(10, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = sampler.sample(10, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }
}
