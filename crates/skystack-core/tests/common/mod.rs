#![allow(dead_code)]

use ndarray::Array2;

use skystack_core::frame::Frame;
use skystack_core::star::{StarRecord, StarTable};

/// Small deterministic generator so synthetic noise is reproducible.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(6364136223846793005).wrapping_add(1))
    }

    /// Uniform in [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 40) as f32) / (1u64 << 24) as f32
    }
}

/// Add a circular Gaussian star centred at (x, y) = (column, row).
pub fn add_star(data: &mut Array2<f32>, x: f64, y: f64, amplitude: f64, sigma: f64) {
    let (h, w) = data.dim();
    let reach = (6.0 * sigma).ceil() as isize;
    let cx = x.round() as isize;
    let cy = y.round() as isize;
    for row in (cy - reach).max(0)..(cy + reach + 1).min(h as isize) {
        for col in (cx - reach).max(0)..(cx + reach + 1).min(w as isize) {
            let dx = col as f64 - x;
            let dy = row as f64 - y;
            let v = amplitude * (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp();
            data[[row as usize, col as usize]] += v as f32;
        }
    }
}

/// Flat background plus Gaussian stars plus uniform noise in [-noise, noise).
///
/// `stars` are (x, y, amplitude).
pub fn star_field(
    h: usize,
    w: usize,
    background: f32,
    stars: &[(f64, f64, f64)],
    sigma: f64,
    noise: f32,
    seed: u64,
) -> Frame {
    let mut data = Array2::<f32>::from_elem((h, w), background);
    for &(x, y, amplitude) in stars {
        add_star(&mut data, x, y, amplitude, sigma);
    }
    if noise > 0.0 {
        let mut rng = Lcg::new(seed);
        for v in data.iter_mut() {
            *v += (rng.next_f32() * 2.0 - 1.0) * noise;
        }
    }
    Frame::new(data)
}

pub fn flat_frame(h: usize, w: usize, value: f32) -> Frame {
    Frame::new(Array2::from_elem((h, w), value))
}

/// Star table from (x, y) pairs; ids start at 1, peak and flux are constant.
pub fn table_at(positions: &[(f64, f64)]) -> StarTable {
    let records = positions
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| StarRecord::new(i as u32 + 1, x, y, 5000.0, 50_000.0))
        .collect();
    StarTable::new(records).unwrap()
}

/// Square grid of star positions starting at `origin` with the given spacing.
pub fn grid(origin: f64, spacing: f64, per_side: usize) -> Vec<(f64, f64)> {
    let mut positions = Vec::with_capacity(per_side * per_side);
    for j in 0..per_side {
        for i in 0..per_side {
            positions.push((origin + i as f64 * spacing, origin + j as f64 * spacing));
        }
    }
    positions
}
