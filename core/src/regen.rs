// Change-driven regeneration of a terrain surface.

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{ConfigError, Result};
use crate::heightfield::HeightfieldGenerator;
use crate::params::GenerationParameters;
use crate::randomize::ParameterRandomizer;
use crate::splat::MaterialClassifier;
use crate::surface::TerrainSurface;

// What one regeneration produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RegenerationReport {
    // Parameters as the caller passed them.
    pub requested: GenerationParameters,
    // Parameters actually used, after any randomization.
    pub effective: GenerationParameters,
    pub heightfield_time: Duration,
    pub classify_time: Duration,
}

// Rebuilds a surface's heights and material map when the caller's
// parameters change.
//
// Borrowing the surface mutably for the whole call means a surface never
// has two generations in flight. Each field is computed in full before it
// is installed.
pub struct Regenerator {
    classifier: MaterialClassifier,
    randomizer: Option<(ParameterRandomizer, ChaCha8Rng)>,
    applied: Option<GenerationParameters>,
}

impl Default for Regenerator {
    fn default() -> Self {
        Self::new(MaterialClassifier::default())
    }
}

impl Regenerator {
    pub fn new(classifier: MaterialClassifier) -> Self {
        Self {
            classifier,
            randomizer: None,
            applied: None,
        }
    }

    // Reroll octaves and persistence on every regeneration from a
    // ChaCha stream seeded with `seed`.
    pub fn with_randomizer(mut self, randomizer: ParameterRandomizer, seed: u64) -> Self {
        self.randomizer = Some((randomizer, ChaCha8Rng::seed_from_u64(seed)));
        self
    }

    pub fn classifier(&self) -> &MaterialClassifier {
        &self.classifier
    }

    pub fn last_applied(&self) -> Option<&GenerationParameters> {
        self.applied.as_ref()
    }

    // Forget the last snapshot so the next check regenerates.
    pub fn invalidate(&mut self) {
        self.applied = None;
    }

    pub fn needs_regeneration(&self, params: &GenerationParameters) -> bool {
        self.applied.as_ref() != Some(params)
    }

    pub fn regenerate_if_changed<S: TerrainSurface + Sync>(
        &mut self,
        surface: &mut S,
        params: &GenerationParameters,
    ) -> Result<Option<RegenerationReport>> {
        if !self.needs_regeneration(params) {
            return Ok(None);
        }
        self.regenerate(surface, params).map(Some)
    }

    pub fn regenerate<S: TerrainSurface + Sync>(
        &mut self,
        surface: &mut S,
        params: &GenerationParameters,
    ) -> Result<RegenerationReport> {
        match self.run(surface, params) {
            Ok(report) => {
                log::info!(
                    "Regenerated terrain: {}x{} heights in {:.2} ms, {}x{}x{} material map in {:.2} ms ({} octaves, persistence {:.3})",
                    surface.heightmap_width(),
                    surface.heightmap_height(),
                    report.heightfield_time.as_secs_f64() * 1000.0,
                    surface.alphamap_width(),
                    surface.alphamap_height(),
                    surface.alphamap_layers(),
                    report.classify_time.as_secs_f64() * 1000.0,
                    report.effective.octaves,
                    report.effective.persistence,
                );
                self.applied = Some(*params);
                Ok(report)
            }
            Err(e) => {
                log::warn!("Terrain regeneration rejected: {e}");
                Err(e)
            }
        }
    }

    fn run<S: TerrainSurface + Sync>(
        &mut self,
        surface: &mut S,
        params: &GenerationParameters,
    ) -> Result<RegenerationReport> {
        params.validate()?;
        let effective = match &mut self.randomizer {
            Some((randomizer, rng)) => randomizer.apply(params, rng)?,
            None => *params,
        };

        let (hm_width, hm_height) = (surface.heightmap_width(), surface.heightmap_height());
        let (alpha_width, alpha_height) = (surface.alphamap_width(), surface.alphamap_height());
        let layers = surface.alphamap_layers();
        let required = self.classifier.rules().required_layers().max(1);
        if layers < required {
            return Err(ConfigError::NotEnoughLayers {
                required,
                available: layers,
            }
            .into());
        }
        if alpha_width == 0 || alpha_height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: alpha_width,
                height: alpha_height,
            }
            .into());
        }

        let start = Instant::now();
        let heights = HeightfieldGenerator::new(&effective)?.generate(hm_width, hm_height)?;
        let heightfield_time = start.elapsed();

        surface.set_size([
            effective.width as f32,
            effective.amplitude,
            effective.height as f32,
        ]);
        surface.set_heights(0, 0, heights)?;

        let start = Instant::now();
        let weights =
            self.classifier
                .classify(&*surface, &effective, alpha_width, alpha_height, layers)?;
        let classify_time = start.elapsed();
        surface.set_alphamaps(0, 0, weights)?;

        Ok(RegenerationReport {
            requested: *params,
            effective,
            heightfield_time,
            classify_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Regenerator;
    use crate::error::TerrainError;
    use crate::params::GenerationParameters;
    use crate::randomize::ParameterRandomizer;
    use crate::splat::{MaterialClassifier, MaterialLayer, RuleTable, ThresholdRule};
    use crate::surface::{HeightSource, MemorySurface, TerrainSurface};

    fn surface() -> MemorySurface {
        MemorySurface::new((33, 33), (16, 16), 3)
    }

    #[test]
    fn first_check_always_regenerates() {
        let mut regen = Regenerator::default();
        let mut surface = surface();
        let params = GenerationParameters::default();
        assert!(regen.needs_regeneration(&params));
        assert!(regen.regenerate_if_changed(&mut surface, &params).unwrap().is_some());
        assert_eq!(regen.last_applied(), Some(&params));
        assert!(!regen.needs_regeneration(&params));
        assert!(regen.regenerate_if_changed(&mut surface, &params).unwrap().is_none());
    }

    #[test]
    fn any_parameter_change_is_detected() {
        let mut regen = Regenerator::default();
        let mut surface = surface();
        let params = GenerationParameters::default();
        regen.regenerate(&mut surface, &params).unwrap();

        let changed = [
            GenerationParameters { amplitude: 30.0, ..params },
            GenerationParameters { width: 100, ..params },
            GenerationParameters { frequency: 5.0, ..params },
            GenerationParameters { texture_scale: 0.5, ..params },
            GenerationParameters { seed: 1, ..params },
        ];
        for p in &changed {
            assert!(regen.needs_regeneration(p));
        }
        regen.invalidate();
        assert!(regen.needs_regeneration(&params));
    }

    #[test]
    fn installs_size_heights_and_weights() {
        let mut regen = Regenerator::default();
        let mut surface = surface();
        let params = GenerationParameters {
            width: 120,
            height: 80,
            amplitude: 40.0,
            ..Default::default()
        };
        regen.regenerate(&mut surface, &params).unwrap();
        assert_eq!(surface.size(), [120.0, 40.0, 80.0]);
        assert!(surface.heights().iter().any(|&h| h != 0.0));
        for row in 0..surface.alphamap_height() {
            for col in 0..surface.alphamap_width() {
                let sum: f32 = surface.alphamap(row, col).iter().sum();
                assert!((sum - 1.0).abs() < 1e-5);
            }
        }
        assert!(surface.get_height(5, 5) <= 40.0);
    }

    #[test]
    fn failed_regeneration_keeps_previous_snapshot() {
        let mut regen = Regenerator::default();
        let mut surface = surface();
        let good = GenerationParameters::default();
        regen.regenerate(&mut surface, &good).unwrap();
        let before = surface.heights().to_vec();

        let bad = GenerationParameters { octaves: 0, ..good };
        assert!(regen.regenerate(&mut surface, &bad).unwrap_err().is_config());
        assert_eq!(regen.last_applied(), Some(&good));
        assert_eq!(surface.heights(), before.as_slice());
    }

    #[test]
    fn normalization_failure_leaves_material_map_alone() {
        let mut surface = surface();
        Regenerator::default()
            .regenerate(&mut surface, &GenerationParameters::default())
            .unwrap();
        let before = surface.weight_field().unwrap();

        // every non-negative height clears the rule and zeroes the only weight
        let zero_sum = RuleTable {
            baseline: vec![0.5, 0.0, 0.0],
            rules: vec![ThresholdRule::new(-1.0, &[(MaterialLayer::Grass, 0.0)])],
        };
        let mut regen = Regenerator::new(MaterialClassifier::new(zero_sum));
        let params = GenerationParameters {
            seed: 3,
            ..Default::default()
        };
        let err = regen.regenerate(&mut surface, &params).unwrap_err();
        assert!(matches!(err, TerrainError::Normalization { sum: 0.0, .. }));
        assert_eq!(surface.weight_field().unwrap(), before);
        assert_eq!(regen.last_applied(), None);
        assert!(regen.needs_regeneration(&params));
    }

    #[test]
    fn too_few_layers_rejected_before_work() {
        let mut regen = Regenerator::default();
        let mut surface = MemorySurface::new((9, 9), (4, 4), 2);
        let err = regen
            .regenerate(&mut surface, &GenerationParameters::default())
            .unwrap_err();
        assert!(err.is_config());
        assert!(surface.heights().iter().all(|&h| h == 0.0));
    }

    #[test]
    fn randomizer_rolls_effective_parameters() {
        let mut regen =
            Regenerator::default().with_randomizer(ParameterRandomizer::default(), 42);
        let mut surface = surface();
        let params = GenerationParameters::default();
        let report = regen.regenerate(&mut surface, &params).unwrap();
        assert_eq!(report.requested, params);
        assert!((2..=4).contains(&report.effective.octaves));
        assert!((0.25..0.75).contains(&report.effective.persistence));
        // the requested snapshot is what gets compared next time
        assert!(!regen.needs_regeneration(&params));
    }
}
