use std::ops::{Range, RangeInclusive};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::params::{GenerationParameters, MAX_OCTAVES};

// Optional policy that rerolls octave count and persistence on every
// regeneration. The generator itself stays deterministic; this only
// rewrites the parameters handed to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRandomizer {
    pub octaves: RangeInclusive<u32>,
    pub persistence: Range<f64>,
}

impl Default for ParameterRandomizer {
    fn default() -> Self {
        Self {
            octaves: 2..=4,
            persistence: 0.25..0.75,
        }
    }
}

impl ParameterRandomizer {
    pub fn validate(&self) -> Result<()> {
        if self.octaves.is_empty() || *self.octaves.start() < 1 || *self.octaves.end() > MAX_OCTAVES {
            return Err(ConfigError::Randomizer(format!("octaves {:?}", self.octaves)).into());
        }
        let p = &self.persistence;
        if p.is_empty() || !(p.start > 0.0) || !p.end.is_finite() {
            return Err(ConfigError::Randomizer(format!("persistence {:?}", p)).into());
        }
        Ok(())
    }

    pub fn apply<R: Rng>(
        &self,
        params: &GenerationParameters,
        rng: &mut R,
    ) -> Result<GenerationParameters> {
        self.validate()?;
        let rolled = GenerationParameters {
            octaves: rng.gen_range(self.octaves.clone()),
            persistence: rng.gen_range(self.persistence.clone()),
            ..*params
        };
        rolled.validate()?;
        Ok(rolled)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::ParameterRandomizer;
    use crate::params::GenerationParameters;

    #[test]
    fn stays_in_ranges() {
        let randomizer = ParameterRandomizer::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let base = GenerationParameters::default();
        for _ in 0..200 {
            let p = randomizer.apply(&base, &mut rng).unwrap();
            assert!((2..=4).contains(&p.octaves));
            assert!(p.persistence >= 0.25 && p.persistence < 0.75);
            assert!(p.validate().is_ok());
            // everything else is untouched
            assert_eq!(p.seed, base.seed);
            assert_eq!(p.amplitude, base.amplitude);
            assert_eq!(p.frequency, base.frequency);
        }
    }

    #[test]
    fn same_seed_same_rolls() {
        let randomizer = ParameterRandomizer::default();
        let base = GenerationParameters::default();
        let mut a = ChaCha8Rng::seed_from_u64(11);
        let mut b = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..10 {
            assert_eq!(
                randomizer.apply(&base, &mut a).unwrap(),
                randomizer.apply(&base, &mut b).unwrap()
            );
        }
    }

    #[test]
    fn rejects_empty_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let base = GenerationParameters::default();
        let bad_octaves = ParameterRandomizer {
            octaves: 0..=3,
            ..Default::default()
        };
        assert!(bad_octaves.apply(&base, &mut rng).unwrap_err().is_config());
        let bad_persistence = ParameterRandomizer {
            persistence: 0.5..0.5,
            ..Default::default()
        };
        assert!(bad_persistence.apply(&base, &mut rng).is_err());
    }
}
