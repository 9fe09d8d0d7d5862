//! One-dimensional Fourier transforms over dealiased lines
//!
//! Spanwise lines of length `nzd` use the complex pair `ift` (unnormalised synthesis) and `fft`
//! (analysis scaled by `1/nzd`). Streamwise lines hold `nxd` half-complex coefficients of a real
//! signal of length `2*nxd`, the Nyquist coefficient packed into the imaginary part of the
//! zeroth. `rft` synthesises the `2*nxd` real samples into the same storage ("realified", sample
//! `j` being the real part of element `j/2` for even `j` and the imaginary part otherwise) and
//! `hft` analyses them back.

#[cfg(test)]
mod test;

use {
    realfft::{ComplexToReal, RealFftPlanner, RealToComplex},
    rustfft::{num_complex::Complex64, Fft, FftPlanner},
    std::{fmt, sync::Arc},
};

/// Transform sizes must factor into these primes
const RADICES: [usize; 2] = [2, 3];

/// Whether `n` is a size the transforms are laid out for
pub fn fft_fit(n: usize) -> bool {
    if n == 0 {
        return false;
    }
    let mut n = n;
    for &r in RADICES.iter() {
        while n % r == 0 {
            n /= r;
        }
    }
    n == 1
}

/// Smallest transform size strictly greater than `n`
pub fn next_fit(n: usize) -> usize {
    let mut m = n + 1;
    while !fft_fit(m) {
        m += 1;
    }
    m
}

/// Dealiased streamwise size for `nx` retained modes
pub fn dealiased_nxd(nx: usize) -> usize {
    next_fit((3 * nx / 2).saturating_sub(1))
}

/// Dealiased spanwise size for `nz` retained modes on each side
pub fn dealiased_nzd(nz: usize) -> usize {
    next_fit((3 * nz).saturating_sub(1))
}

/// Folded slot of spanwise wavenumber `iz` in a line of length `nzd`
pub fn fold(iz: isize, nzd: usize) -> usize {
    iz.rem_euclid(nzd as isize) as usize
}

/// Realified sample `j` of a streamwise line, wrapping `j` modulo twice the line length
pub fn realified(line: &[Complex64], j: usize) -> f64 {
    let j = j % (2 * line.len());
    let c = line[j / 2];
    if j % 2 == 0 {
        c.re
    } else {
        c.im
    }
}

pub fn realified_mut(line: &mut [Complex64], j: usize) -> &mut f64 {
    let j = j % (2 * line.len());
    let c = &mut line[j / 2];
    if j % 2 == 0 {
        &mut c.re
    } else {
        &mut c.im
    }
}

#[derive(Clone)]
pub struct Transforms {
    nxd: usize,
    nzd: usize,
    z_inverse: Arc<dyn Fft<f64>>,
    z_forward: Arc<dyn Fft<f64>>,
    /// Real transforms of length `2*nxd`
    x_inverse: Arc<dyn ComplexToReal<f64>>,
    x_forward: Arc<dyn RealToComplex<f64>>,
}

impl fmt::Debug for Transforms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transforms")
            .field("nxd", &self.nxd)
            .field("nzd", &self.nzd)
            .finish()
    }
}

impl Transforms {
    pub fn new(nxd: usize, nzd: usize) -> Self {
        let mut planner = FftPlanner::new();
        let mut real_planner = RealFftPlanner::new();

        Transforms {
            nxd,
            nzd,
            z_inverse: planner.plan_fft_inverse(nzd),
            z_forward: planner.plan_fft_forward(nzd),
            x_inverse: real_planner.plan_fft_inverse(2 * nxd),
            x_forward: real_planner.plan_fft_forward(2 * nxd),
        }
    }

    pub fn nxd(&self) -> usize {
        self.nxd
    }

    pub fn nzd(&self) -> usize {
        self.nzd
    }

    /// Spanwise synthesis, unnormalised
    pub fn ift(&self, line: &mut [Complex64]) {
        assert_eq!(line.len(), self.nzd);
        self.z_inverse.process(line);
    }

    /// Spanwise analysis, scaled by `1/nzd`
    pub fn fft(&self, line: &mut [Complex64]) {
        assert_eq!(line.len(), self.nzd);
        self.z_forward.process(line);
        let scale = 1.0 / self.nzd as f64;
        line.iter_mut().for_each(|c| *c *= scale);
    }

    /// Streamwise synthesis of the real signal, stored realified in place
    pub fn rft(&self, line: &mut [Complex64]) {
        let n = self.nxd;
        assert_eq!(line.len(), n);

        let mut spectrum = self.x_inverse.make_input_vec();
        spectrum[0] = Complex64::new(line[0].re, 0.0);
        spectrum[1..n].copy_from_slice(&line[1..n]);
        spectrum[n] = Complex64::new(line[0].im, 0.0);

        let mut samples = self.x_inverse.make_output_vec();
        let result = self.x_inverse.process(&mut spectrum, &mut samples);
        debug_assert!(result.is_ok(), "{:?}", result);

        for (c, pair) in line.iter_mut().zip(samples.chunks_exact(2)) {
            *c = Complex64::new(pair[0], pair[1]);
        }
    }

    /// Streamwise analysis of a realified line, scaled by `1/(2*nxd)`
    pub fn hft(&self, line: &mut [Complex64]) {
        let n = self.nxd;
        assert_eq!(line.len(), n);

        let mut samples = (0..2 * n)
            .map(|j| realified(line, j))
            .collect::<Vec<_>>();
        let mut spectrum = self.x_forward.make_output_vec();
        let result = self.x_forward.process(&mut samples, &mut spectrum);
        debug_assert!(result.is_ok(), "{:?}", result);

        let scale = 1.0 / (2 * n) as f64;
        line[0] = Complex64::new(spectrum[0].re * scale, spectrum[n].re * scale);
        for k in 1..n {
            line[k] = spectrum[k] * scale;
        }
    }
}
