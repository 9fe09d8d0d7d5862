//! Stretched wall-normal grid and its five-point derivative stencils

use {
    crate::{dns::DnsInput, offset::OffsetVec},
    faer::{linalg::solvers::Solve, Mat},
    serde::{Deserialize, Serialize},
};

/// Five-point stencil whose first point is the plane `first`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stencil {
    pub first: isize,
    pub coefficients: [f64; 5],
}

impl Stencil {
    /// Coefficient of the point `first + 2 + i`, `i` in `-2..=2`
    pub fn coefficient(&self, i: isize) -> f64 {
        self.coefficients[(i + 2) as usize]
    }

    pub fn apply(&self, f: &OffsetVec<f64>) -> f64 {
        self.coefficients
            .iter()
            .enumerate()
            .map(|(c, d)| d * f[self.first + c as isize])
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub ny: usize,
    /// Wall-normal coordinates, ghost points included
    pub y: OffsetVec<f64>,
    /// First derivative stencils
    pub d1: OffsetVec<Stencil>,
    /// Second derivative stencils
    pub d2: OffsetVec<Stencil>,
}

impl Grid {
    pub fn new(dns: &DnsInput) -> Self {
        let ny = dns.ny as isize;
        let (ymin, ymax, a) = (dns.ymin, dns.ymax, dns.a);

        let y = OffsetVec::from_fn(-1..=ny + 1, |i| {
            ymin + 0.5
                * (ymax - ymin)
                * ((a * ((2 * i) as f64 / ny as f64 - 1.0)).tanh() / a.tanh()
                    + 0.5 * (ymax - ymin))
        });

        let stencils = OffsetVec::from_fn(-1..=ny + 1, |iy| stencils_at(&y, ny, iy));

        Grid {
            ny: dns.ny,
            d1: OffsetVec::from_fn(-1..=ny + 1, |iy| stencils[iy].0),
            d2: OffsetVec::from_fn(-1..=ny + 1, |iy| stencils[iy].1),
            y,
        }
    }

    /// First derivative of a wall-normal profile at plane `iy`
    pub fn derivative(&self, f: &OffsetVec<f64>, iy: isize) -> f64 {
        self.d1[iy].apply(f)
    }

    /// Second derivative of a wall-normal profile at plane `iy`
    pub fn second_derivative(&self, f: &OffsetVec<f64>, iy: isize) -> f64 {
        self.d2[iy].apply(f)
    }
}

/// First and second derivative stencils at plane `iy`, shifted inwards near the walls
fn stencils_at(y: &OffsetVec<f64>, ny: isize, iy: isize) -> (Stencil, Stencil) {
    let shift = if iy < 1 { 1 - iy } else { 0 } - if iy > ny - 1 { iy - ny + 1 } else { 0 };
    let first = iy - 2 + shift;

    // row r holds the (4-r)th powers of the distances
    let m = Mat::from_fn(5, 5, |r, c| (y[first + c as isize] - y[iy]).powi(4 - r as i32));
    // first derivative picks the linear term, second twice the quadratic one
    let rhs = Mat::from_fn(5, 2, |r, c| match (r, c) {
        (3, 0) => 1.0,
        (2, 1) => 2.0,
        _ => 0.0,
    });
    let x = m.partial_piv_lu().solve(&rhs);

    let column = |c: usize| {
        let mut coefficients = [0.0; 5];
        for (r, d) in coefficients.iter_mut().enumerate() {
            *d = x[(r, c)];
        }
        Stencil {
            first,
            coefficients,
        }
    };

    (column(0), column(1))
}
