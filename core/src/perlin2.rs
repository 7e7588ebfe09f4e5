use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::NoiseGenerator;

// 2D gradient (Perlin) noise over a seeded lattice
pub struct Perlin2D {
    seed: u64,
    perm: [u8; 512], // permutation table (256 duplicated)
}

impl Perlin2D {
    pub fn new(seed: u64) -> Self {
        // shuffle 0..=255 with a seeded ChaCha stream so every platform
        // builds the same lattice for the same seed
        let mut p: Vec<u8> = (0..=255).collect();
        p.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));

        // Duplicate into an array of length 512
        // so perm[perm[xi] + yi] never needs a modulo
        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = p[i & 255];
        }

        Self { seed, perm }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    // Fade function as defined by Ken Perlin: 6t^5 − 15t^4 + 10t^3
    // First and second derivatives are zero at t=0 and t=1,
    // so neighbouring lattice cells join without creases
    #[inline]
    fn fade(t: f64) -> f64 {
        t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
    }

    #[inline]
    fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + t * (b - a)
    }

    // Pick one of the four diagonal gradients from the low bits of the hash
    // and dot it with the offset (x, y)
    #[inline]
    fn grad(hash: u8, x: f64, y: f64) -> f64 {
        let h = hash & 0x3;
        let u = if (h & 1) == 0 { x } else { -x };
        let v = if (h & 2) == 0 { y } else { -y };
        u + v
    }

    // Raw single‐octave Perlin noise at (x, y)
    // Returns in range [−1, 1]
    pub fn noise(&self, x: f64, y: f64) -> f64 {
        let x0 = x.floor();
        let y0 = y.floor();
        // Unit square that contains the point
        let xi = (x0 as i64 & 255) as usize;
        let yi = (y0 as i64 & 255) as usize;
        // Position inside the square
        let xf = x - x0;
        let yf = y - y0;
        let u = Self::fade(xf);
        let v = Self::fade(yf);

        // Hash the four corners
        let a = self.perm[xi] as usize;
        let b = self.perm[xi + 1] as usize;
        let aa = self.perm[a + yi];
        let ab = self.perm[a + yi + 1];
        let ba = self.perm[b + yi];
        let bb = self.perm[b + yi + 1];

        let x1 = Self::lerp(Self::grad(aa, xf, yf), Self::grad(ba, xf - 1.0, yf), u);
        let x2 = Self::lerp(
            Self::grad(ab, xf, yf - 1.0),
            Self::grad(bb, xf - 1.0, yf - 1.0),
            u,
        );
        Self::lerp(x1, x2, v)
    }
}

impl NoiseGenerator for Perlin2D {
    // Raw noise remapped from [−1, 1] to [0, 1]
    fn get2(&self, x: f64, y: f64) -> f64 {
        ((self.noise(x, y) + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::NoiseGenerator;

    use super::Perlin2D;

    #[test]
    fn perlin2_determinism() {
        let p1 = Perlin2D::new(1234);
        let p2 = Perlin2D::new(1234);
        // Same seed ⇒ same output
        let a = p1.get2(10.5, 3.7);
        let b = p2.get2(10.5, 3.7);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn perlin2_seed_changes_lattice() {
        let p1 = Perlin2D::new(1);
        let p2 = Perlin2D::new(2);
        let differs = (0..64).any(|i| {
            let t = i as f64 * 0.37 + 0.13;
            p1.get2(t, t * 0.5) != p2.get2(t, t * 0.5)
        });
        assert!(differs);
    }

    #[test]
    // Stays within [0.0, 1.0]
    fn perlin2_range() {
        let p = Perlin2D::new(0);
        for i in 0..400 {
            let x = (i % 20) as f64 * 0.731 + 0.05;
            let y = (i / 20) as f64 * 1.337 + 0.11;
            let raw = p.noise(x, y);
            assert!((-1.0..=1.0).contains(&raw), "raw {raw} out of range");
            let v = p.get2(x, y);
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn perlin2_zero_on_lattice_points() {
        // Every gradient dotted with a zero offset vanishes
        let p = Perlin2D::new(99);
        for &(x, y) in &[(0.0, 0.0), (3.0, 7.0), (255.0, 1.0), (300.0, 12.0)] {
            assert_eq!(p.noise(x, y), 0.0);
            assert_eq!(p.get2(x, y), 0.5);
        }
    }

    #[test]
    fn perlin2_continuous_across_cells() {
        let p = Perlin2D::new(7);
        let eps = 1e-7;
        for i in 1..10 {
            let edge = i as f64;
            let left = p.noise(edge - eps, 0.42);
            let right = p.noise(edge + eps, 0.42);
            assert!((left - right).abs() < 1e-5);
        }
    }
}
