// 2D height map: row‐major Vec<Vec<f32>>
// access as `map[y][x]`.
pub type HeightMap2D = Vec<Vec<f32>>;

// flatten a 2D height map (row‐major) into a single Vec<f32>
// For converting to an image buffer in the preview
pub fn flatten2(map: &HeightMap2D) -> Vec<f32> {
    map.iter().flat_map(|row| row.iter().cloned()).collect()
}

// Position of cell `i` along an axis of `extent` cells, in [0, 1)
#[inline]
pub fn unit_coord(i: usize, extent: usize) -> f64 {
    i as f64 / extent as f64
}

// Nearest cell of an `extent`-cell axis for a unit coordinate.
// Ties round to even like the engine's RoundToInt, and the result is
// clamped so `unit` close to 1 never indexes past the last cell.
#[inline]
pub fn nearest_index(unit: f64, extent: usize) -> usize {
    let last = extent.saturating_sub(1);
    let idx = (unit * extent as f64).round_ties_even();
    if idx <= 0.0 {
        0
    } else {
        (idx as usize).min(last)
    }
}

// Map cell `i` of a `from`-cell axis onto the nearest cell of a `to`-cell axis
#[inline]
pub fn resample_index(i: usize, from: usize, to: usize) -> usize {
    nearest_index(unit_coord(i, from), to)
}
