//! Subsets of the dealiased physical grid at which the GKE terms are evaluated
//!
//! Separations are sampled at every point up to a fine threshold, every fourth point up to a
//! coarse threshold and every eighth beyond, then mirrored onto the negative separations.

use {
    crate::parameters::Sampling,
    core::f64::consts::PI,
    serde::{Deserialize, Serialize},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WavenumberMap {
    /// Streamwise realified indices in `0..2*nxd`
    pub imx: Vec<usize>,
    /// Spanwise indices in `0..nzd`
    pub imz: Vec<usize>,
}

impl WavenumberMap {
    pub fn new(nxd: usize, nzd: usize, alfa0: f64, beta0: f64, sampling: &Sampling) -> Self {
        let dx = PI / alfa0 / nxd as f64;
        let dz = 2.0 * PI / beta0 / nzd as f64;

        WavenumberMap {
            imx: mirrored(
                sampled(nxd, dx, sampling.streamwise, sampling.coarse),
                2 * nxd,
            ),
            imz: mirrored(
                sampled(nzd / 2, dz, sampling.spanwise, sampling.coarse),
                nzd,
            ),
        }
    }

    pub fn mx(&self) -> usize {
        self.imx.len()
    }

    pub fn mz(&self) -> usize {
        self.imz.len()
    }
}

/// Ascending indices from zero up to and including `half`
fn sampled(half: usize, spacing: f64, fine: f64, coarse: f64) -> Vec<usize> {
    let mut indices = vec![];

    let mut i = 0;
    while i < half {
        indices.push(i);
        let distance = i as f64 * spacing;
        i += if distance <= fine {
            1
        } else if distance <= coarse {
            4
        } else {
            8
        };
    }

    if indices.last().map_or(true, |&last| last < half) {
        indices.push(half);
    }

    indices
}

/// Appends the mirror images `(period - i) mod period` of the interior indices in reverse order
fn mirrored(mut indices: Vec<usize>, period: usize) -> Vec<usize> {
    let m = indices.len();
    for i in 1..m.saturating_sub(1) {
        let k = indices[m - i - 1];
        indices.push((period - k) % period);
    }
    indices
}
