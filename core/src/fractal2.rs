use crate::NoiseGenerator;

// Frequency growth per octave
pub const LACUNARITY: f64 = 2.0;

// Fractal Brownian motion over any unit-range 2D noise
pub struct Fractal2D<N> {
    base: N,
    frequency: f64,   // frequency of the first octave
    persistence: f64, // amplitude scaling per octave
    octaves: u32,
}

impl<N: NoiseGenerator> Fractal2D<N> {
    pub fn new(base: N, frequency: f64, persistence: f64, octaves: u32) -> Self {
        Self {
            base,
            frequency,
            persistence,
            octaves,
        }
    }

    pub fn base(&self) -> &N {
        &self.base
    }

    pub fn octaves(&self) -> u32 {
        self.octaves
    }
}

impl<N: NoiseGenerator> NoiseGenerator for Fractal2D<N> {
    // Sum `octaves` layers of the base noise, each at twice the frequency
    // and `persistence` times the amplitude of the previous one, divided by
    // the largest sum the weights allow so the result stays in [0, 1].
    // With a single octave this is exactly base.get2(x * frequency, y * frequency).
    fn get2(&self, x: f64, y: f64) -> f64 {
        let mut amplitude = 1.0;
        let mut freq = self.frequency;
        let mut total = 0.0;
        let mut max_amp = 0.0;

        for _ in 0..self.octaves {
            total += self.base.get2(x * freq, y * freq) * amplitude;
            max_amp += amplitude;
            amplitude *= self.persistence;
            freq *= LACUNARITY;
        }

        // only an empty stack (octaves == 0) leaves max_amp at zero;
        // GenerationParameters::validate rejects that before a generator exists
        if max_amp > 0.0 { total / max_amp } else { 0.0 }
    }
}
