//! Diamond-square height synthesis over a `(W+1) × (W+1)` corner grid.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tessera_geom::TilePos;

/// Source of per-sample jitter in `[-1, 1)`.
pub trait Jitter {
    fn next_signed(&mut self) -> f32;
}

/// Seeded ChaCha8 stream; the draw order fully determines the field.
pub struct SeededJitter {
    rng: ChaCha8Rng,
}

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Jitter for SeededJitter {
    #[inline]
    fn next_signed(&mut self) -> f32 {
        self.rng.random::<f32>() * 2.0 - 1.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    width: usize,
    samples: Vec<f32>,
    min: f32,
    max: f32,
}

impl HeightField {
    /// Allocates a zeroed field for a square map of `tiles_per_side` tiles.
    pub fn new(tiles_per_side: usize) -> Self {
        let width = tiles_per_side + 1;
        Self {
            width,
            samples: vec![0.0; width * width],
            min: 0.0,
            max: 0.0,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[inline]
    pub fn min(&self) -> f32 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> f32 {
        self.max
    }

    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        x * self.width + y
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.samples[self.idx(x, y)]
    }

    #[inline]
    pub fn sample(&self, corner: TilePos) -> f32 {
        debug_assert!(corner.x >= 0 && corner.y >= 0);
        self.get(corner.x as usize, corner.y as usize)
    }

    /// Integer terrain level of a corner sample.
    #[inline]
    pub fn level_at(&self, corner: TilePos, max_level: i32) -> i32 {
        normalize_height(self.sample(corner), self.min, self.max, max_level)
    }

    /// Overwrites the field with explicit samples; used by tooling and tests
    /// that need a hand-shaped terrain. Min/max are recomputed.
    pub fn from_samples(tiles_per_side: usize, samples: Vec<f32>) -> Self {
        let width = tiles_per_side + 1;
        assert_eq!(samples.len(), width * width, "height sample count mismatch");
        let (min, max) = samples
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        Self {
            width,
            samples,
            min,
            max,
        }
    }
}

/// `floor(clamp(unlerp(min, max, h) * max_level))` with the top level pinned
/// to `max_level - 1`. A flat field maps everything to level 0.
pub fn normalize_height(h: f32, min: f32, max: f32, max_level: i32) -> i32 {
    let span = max - min;
    if span <= 0.0 || max_level <= 0 {
        return 0;
    }
    let mut v = (h - min) / span * max_level as f32;
    if v >= max_level as f32 {
        v = (max_level - 1) as f32;
    }
    if v < 0.0 {
        v = 0.0;
    }
    v.floor() as i32
}

struct DiamondSquare<'a, J: Jitter> {
    field: &'a mut HeightField,
    jitter: &'a mut J,
    min: f32,
    max: f32,
}

impl<'a, J: Jitter> DiamondSquare<'a, J> {
    #[inline]
    fn wrap(&self, v: i64) -> usize {
        v.rem_euclid(self.field.width as i64) as usize
    }

    #[inline]
    fn read(&self, x: i64, y: i64) -> f32 {
        let (x, y) = (self.wrap(x), self.wrap(y));
        self.field.get(x, y)
    }

    #[inline]
    fn write(&mut self, x: usize, y: usize, value: f32) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        let i = self.field.idx(x, y);
        self.field.samples[i] = value;
    }

    fn seed_corners(&mut self) {
        let last = self.field.width - 1;
        let corners = [(0, 0), (last, 0), (0, last), (last, last)];
        let first = self.jitter.next_signed();
        self.min = first;
        self.max = first;
        self.write(corners[0].0, corners[0].1, first);
        for &(x, y) in &corners[1..] {
            let v = self.jitter.next_signed();
            self.write(x, y, v);
        }
    }

    /// Passes start at `size = W` (the tile count, one less than the grid
    /// width) and halve until `half` reaches zero.
    fn run(&mut self, roughness: f32) {
        let width = self.field.width;
        let mut size = width - 1;
        let mut roughness = roughness;
        loop {
            let half = size / 2;
            if half < 1 {
                break;
            }
            let mut x = half;
            while x < width {
                let mut y = half;
                while y < width {
                    self.diamond(x, y, half, roughness);
                    y += size;
                }
                x += size;
            }
            size = half;
            roughness /= 2.0;
        }
    }

    fn diamond(&mut self, x: usize, y: usize, half: usize, roughness: f32) {
        let (xi, yi, hi) = (x as i64, y as i64, half as i64);
        let avg = (self.read(xi + hi, yi - hi)
            + self.read(xi - hi, yi + hi)
            + self.read(xi + hi, yi + hi)
            + self.read(xi - hi, yi - hi))
            / 4.0;
        let value = avg + self.jitter.next_signed() * roughness;
        self.write(x, y, value);

        self.square(xi - hi, yi, hi, roughness);
        self.square(xi + hi, yi, hi, roughness);
        self.square(xi, yi - hi, hi, roughness);
        self.square(xi, yi + hi, hi, roughness);
    }

    fn square(&mut self, x: i64, y: i64, half: i64, roughness: f32) {
        let width = self.field.width as i64;
        if x < 0 || y < 0 || x >= width || y >= width {
            return;
        }
        let mut sum = 0.0;
        let mut count = 0u32;
        for (nx, ny) in [(x - half, y), (x + half, y), (x, y - half), (x, y + half)] {
            if nx >= 0 && nx < width && ny >= 0 && ny < width {
                sum += self.read(nx, ny);
                count += 1;
            }
        }
        if count == 0 {
            return;
        }
        let value = sum / count as f32 + self.jitter.next_signed() * roughness;
        self.write(x as usize, y as usize, value);
    }
}

/// Fills `field` in place and records its running min/max.
pub fn generate_diamond_square<J: Jitter>(field: &mut HeightField, roughness: f32, jitter: &mut J) {
    let mut ds = DiamondSquare {
        field,
        jitter,
        min: 0.0,
        max: 0.0,
    };
    ds.seed_corners();
    ds.run(roughness);
    ds.field.min = ds.min;
    ds.field.max = ds.max;
    log::debug!(
        target: "terrain",
        "diamond-square width={} roughness={:.3} range=[{:.4}, {:.4}]",
        ds.field.width,
        roughness,
        ds.min,
        ds.max
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(f32);
    impl Jitter for Constant {
        fn next_signed(&mut self) -> f32 {
            self.0
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-6
    }

    #[test]
    fn three_by_three_exact_values() {
        let mut f = HeightField::new(2);
        generate_diamond_square(&mut f, 1.0, &mut Constant(0.5));
        let edge = 7.0 / 6.0;
        let expect = [0.5, edge, 0.5, edge, 1.0, edge, 0.5, edge, 0.5];
        for (got, want) in f.samples().iter().zip(expect.iter()) {
            assert!(approx(*got, *want), "got {} want {}", got, want);
        }
        assert!(approx(f.min(), 0.5));
        assert!(approx(f.max(), edge));
    }

    #[test]
    fn every_sample_is_written() {
        let mut f = HeightField::new(16);
        generate_diamond_square(&mut f, 1.0, &mut Constant(1.0));
        assert!(f.samples().iter().all(|&v| v > 0.0));
    }

    #[test]
    fn same_seed_same_field() {
        let mut a = HeightField::new(32);
        let mut b = HeightField::new(32);
        generate_diamond_square(&mut a, 0.25, &mut SeededJitter::new(7));
        generate_diamond_square(&mut b, 0.25, &mut SeededJitter::new(7));
        assert_eq!(a, b);
        let mut c = HeightField::new(32);
        generate_diamond_square(&mut c, 0.25, &mut SeededJitter::new(8));
        assert_ne!(a.samples(), c.samples());
    }

    #[test]
    fn seeded_field_matches_recorded_samples() {
        let mut f = HeightField::new(4);
        generate_diamond_square(&mut f, 0.25, &mut SeededJitter::new(34543));
        #[rustfmt::skip]
        let expect: [f32; 25] = [
            -0.177819967, 0.0302983224, 0.173411548, 0.0125526711, -0.0608980656,
            -0.0382600576, 0.0156654269, 0.123465821, 0.149187714, 0.00261616707,
            0.318830013, 0.202729657, 0.194855958, 0.341293812, 0.181207985,
            0.445786685, 0.558786273, 0.630934477, 0.57974273, 0.477780879,
            0.598874927, 0.780139685, 0.816000164, 0.901255012, 0.993448377,
        ];
        for (i, (got, want)) in f.samples().iter().zip(expect.iter()).enumerate() {
            assert!(approx(*got, *want), "sample {}: got {} want {}", i, got, want);
        }
        assert!(approx(f.min(), -0.177819967));
        assert!(approx(f.max(), 0.993448377));
    }

    #[test]
    fn min_max_bound_every_sample() {
        let mut f = HeightField::new(32);
        generate_diamond_square(&mut f, 0.5, &mut SeededJitter::new(99));
        for &v in f.samples() {
            assert!(v >= f.min() && v <= f.max());
        }
        assert!(f.samples().iter().any(|&v| v == f.min()));
        assert!(f.samples().iter().any(|&v| v == f.max()));
    }

    #[test]
    fn normalization_boundaries() {
        assert_eq!(normalize_height(-2.0, -2.0, 3.0, 5), 0);
        assert_eq!(normalize_height(3.0, -2.0, 3.0, 5), 4);
        assert_eq!(normalize_height(0.5, -2.0, 3.0, 5), 2);
        assert_eq!(normalize_height(9.0, -2.0, 3.0, 5), 4);
        assert_eq!(normalize_height(-9.0, -2.0, 3.0, 5), 0);
        assert_eq!(normalize_height(1.0, 1.0, 1.0, 5), 0);
    }
}
