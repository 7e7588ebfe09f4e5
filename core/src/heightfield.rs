use std::time::Instant;

use rayon::prelude::*;

use crate::NoiseGenerator;
use crate::error::{ConfigError, Result};
use crate::fractal2::Fractal2D;
use crate::params::GenerationParameters;
use crate::perlin2::Perlin2D;
use crate::surface::HeightSource;
use crate::utils::{HeightMap2D, flatten2, unit_coord};

// Normalized elevation grid, values in [0, 1], indexed `[row][col]`
// with `row = y` and `col = x`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    width: usize,
    height: usize,
    map: HeightMap2D,
}

impl HeightField {
    // Wrap an existing row-major map. Every row must be the same length.
    pub fn from_rows(map: HeightMap2D) -> Result<Self> {
        let height = map.len();
        let width = map.first().map_or(0, Vec::len);
        if width == 0 || map.iter().any(|row| row.len() != width) {
            return Err(ConfigError::EmptyGrid { width, height }.into());
        }
        Ok(Self { width, height, map })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.map[row][col]
    }

    pub fn rows(&self) -> &HeightMap2D {
        &self.map
    }

    pub fn flatten(&self) -> Vec<f32> {
        flatten2(&self.map)
    }

    // View with heights multiplied by `amplitude`, the way a surface
    // reports them.
    pub fn scaled(&self, amplitude: f32) -> ScaledHeights<'_> {
        ScaledHeights {
            field: self,
            amplitude,
        }
    }
}

// World-height view over a [`HeightField`].
pub struct ScaledHeights<'a> {
    field: &'a HeightField,
    amplitude: f32,
}

impl HeightSource for ScaledHeights<'_> {
    fn heightmap_width(&self) -> usize {
        self.field.width
    }

    fn heightmap_height(&self) -> usize {
        self.field.height
    }

    fn get_height(&self, row: usize, col: usize) -> f32 {
        self.field.get(row, col) * self.amplitude
    }
}

// Fills grids with fractal Perlin noise.
pub struct HeightfieldGenerator {
    noise: Fractal2D<Perlin2D>,
}

impl HeightfieldGenerator {
    // Validates `params` and builds the octave stack they describe.
    pub fn new(params: &GenerationParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            noise: Fractal2D::new(
                Perlin2D::new(params.seed),
                params.frequency,
                params.persistence,
                params.octaves,
            ),
        })
    }

    // Normalized height of cell (x, y) on a `grid_width` x `grid_height` grid.
    #[inline]
    pub fn sample(&self, x: usize, y: usize, grid_width: usize, grid_height: usize) -> f32 {
        self.noise
            .get2(unit_coord(x, grid_width), unit_coord(y, grid_height)) as f32
    }

    pub fn generate(&self, grid_width: usize, grid_height: usize) -> Result<HeightField> {
        if grid_width == 0 || grid_height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: grid_width,
                height: grid_height,
            }
            .into());
        }

        let start = Instant::now();
        let mut map = vec![vec![0.0f32; grid_width]; grid_height];
        // rows are independent, each worker owns one
        map.par_iter_mut().enumerate().for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = self.sample(x, y, grid_width, grid_height);
            }
        });

        log::debug!(
            "Generated {}x{} heightfield ({} octaves) in {:.2} ms",
            grid_width,
            grid_height,
            self.noise.octaves(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(HeightField {
            width: grid_width,
            height: grid_height,
            map,
        })
    }
}

// One-shot heightfield generation.
pub fn generate(
    params: &GenerationParameters,
    grid_width: usize,
    grid_height: usize,
) -> Result<HeightField> {
    HeightfieldGenerator::new(params)?.generate(grid_width, grid_height)
}

#[cfg(test)]
mod tests {
    use super::{HeightField, generate};
    use crate::error::{ConfigError, TerrainError};
    use crate::params::{GenerationParameters, MAX_OCTAVES};
    use crate::surface::HeightSource;
    use crate::{NoiseGenerator, Perlin2D};

    fn params(octaves: u32) -> GenerationParameters {
        GenerationParameters {
            frequency: 4.0,
            octaves,
            persistence: 0.5,
            seed: 2025,
            ..Default::default()
        }
    }

    #[test]
    fn dimensions_follow_grid() {
        let field = generate(&params(3), 17, 9).unwrap();
        assert_eq!(field.width(), 17);
        assert_eq!(field.height(), 9);
        assert_eq!(field.rows().len(), 9);
        assert!(field.rows().iter().all(|row| row.len() == 17));
    }

    #[test]
    fn deterministic_bits() {
        let a = generate(&params(4), 33, 21).unwrap();
        let b = generate(&params(4), 33, 21).unwrap();
        let bits = |f: &HeightField| f.flatten().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn values_in_unit_range() {
        for octaves in 1..=6 {
            for persistence in [0.25, 0.5, 0.75, 1.5] {
                let p = GenerationParameters {
                    persistence,
                    ..params(octaves)
                };
                let field = generate(&p, 40, 25).unwrap();
                for v in field.flatten() {
                    assert!((0.0..=1.0 + 1e-6).contains(&v), "height {v} out of range");
                }
            }
        }
    }

    #[test]
    fn single_octave_is_raw_noise() {
        let p = params(1);
        let field = generate(&p, 30, 20).unwrap();
        let raw = Perlin2D::new(p.seed);
        for y in 0..20 {
            for x in 0..30 {
                let expected = raw.get2(
                    x as f64 / 30.0 * p.frequency,
                    y as f64 / 20.0 * p.frequency,
                ) as f32;
                assert_eq!(field.get(y, x).to_bits(), expected.to_bits());
            }
        }
    }

    #[test]
    fn single_octave_ignores_persistence() {
        let a = generate(&GenerationParameters { persistence: 0.3, ..params(1) }, 16, 16).unwrap();
        let b = generate(&GenerationParameters { persistence: 0.9, ..params(1) }, 16, 16).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_zero_octaves_before_work() {
        let err = generate(&params(0), 8, 8).unwrap_err();
        assert_eq!(err, TerrainError::Config(ConfigError::NoOctaves(0)));
    }

    #[test]
    fn rejects_octave_stacks_that_would_overflow() {
        let err = generate(&params(1100), 8, 8).unwrap_err();
        assert!(matches!(
            err,
            TerrainError::Config(ConfigError::TooManyOctaves { octaves: 1100, .. })
        ));

        let p = GenerationParameters {
            persistence: 1e200,
            ..params(3)
        };
        assert!(matches!(
            generate(&p, 8, 8).unwrap_err(),
            TerrainError::Config(ConfigError::OctaveWeightOverflow { .. })
        ));
    }

    #[test]
    fn deepest_accepted_stack_stays_finite() {
        for persistence in [0.5, 1.5] {
            let p = GenerationParameters {
                persistence,
                ..params(MAX_OCTAVES)
            };
            let field = generate(&p, 24, 24).unwrap();
            for v in field.flatten() {
                assert!((0.0..=1.0 + 1e-6).contains(&v), "height {v} out of range");
            }
        }
    }

    #[test]
    fn rejects_empty_grid() {
        assert!(generate(&params(2), 0, 8).unwrap_err().is_config());
        assert!(generate(&params(2), 8, 0).unwrap_err().is_config());
    }

    #[test]
    fn scaled_view_multiplies_by_amplitude() {
        let field = HeightField::from_rows(vec![vec![0.0, 0.5], vec![1.0, 0.25]]).unwrap();
        let view = field.scaled(20.0);
        assert_eq!(view.heightmap_width(), 2);
        assert_eq!(view.heightmap_height(), 2);
        assert_eq!(view.get_height(0, 1), 10.0);
        assert_eq!(view.get_height(1, 1), 5.0);
    }

    #[test]
    fn from_rows_rejects_ragged() {
        assert!(HeightField::from_rows(vec![vec![0.0, 0.5], vec![1.0]]).is_err());
        assert!(HeightField::from_rows(Vec::new()).is_err());
    }
}
