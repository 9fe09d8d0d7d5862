//! Immutable state of a run, built once from the solver input and the run parameters

use {
    crate::{
        dns::DnsInput,
        error::{Error, Result},
        grid::Grid,
        parameters::Sampling,
        statistics::Statistics,
        store::BlockLayout,
        transform::{dealiased_nxd, dealiased_nzd, Transforms},
        wavenumbers::WavenumberMap,
    },
    log::info,
};

#[derive(Debug)]
pub struct Context {
    pub dns: DnsInput,
    pub grid: Grid,
    pub statistics: Statistics,
    pub transforms: Transforms,
    pub map: WavenumberMap,
    pub layout: BlockLayout,
}

impl Context {
    pub fn new(dns: DnsInput, statistics: Statistics, sampling: &Sampling) -> Result<Self> {
        let (nxd, nzd) = (dealiased_nxd(dns.nx), dealiased_nzd(dns.nz));
        if nxd <= dns.nx || nzd < 2 * dns.nz + 1 {
            return Err(Error::Parameters(format!(
                "dealiased grid {}x{} cannot hold nx={} nz={}",
                nxd, nzd, dns.nx, dns.nz
            )));
        }

        let planes = statistics.planes().range();
        if planes != (-1..=dns.ny as isize + 1) {
            return Err(Error::Parameters(format!(
                "statistics cover planes {:?}, expected -1..={}",
                planes,
                dns.ny + 1
            )));
        }

        let map = WavenumberMap::new(nxd, nzd, dns.alfa0, dns.beta0, sampling);
        let layout = BlockLayout::new(dns.ny, map.mx(), map.mz());

        Ok(Context {
            grid: Grid::new(&dns),
            transforms: Transforms::new(nxd, nzd),
            dns,
            statistics,
            map,
            layout,
        })
    }

    pub fn ny(&self) -> usize {
        self.dns.ny
    }

    pub fn nx(&self) -> usize {
        self.dns.nx
    }

    pub fn nz(&self) -> usize {
        self.dns.nz
    }

    pub fn nxd(&self) -> usize {
        self.transforms.nxd()
    }

    pub fn nzd(&self) -> usize {
        self.transforms.nzd()
    }

    pub fn mx(&self) -> usize {
        self.map.mx()
    }

    pub fn mz(&self) -> usize {
        self.map.mz()
    }

    /// Friction Reynolds number of the mean profile, from the average shear at the two walls
    pub fn friction_reynolds(&self) -> f64 {
        let u = self.statistics.profile(|s| s.mean.u);
        let ny = self.ny() as isize;
        let shear = 0.5 * (self.grid.derivative(&u, 0).abs() + self.grid.derivative(&u, ny).abs());
        let half_height = 0.5 * (self.dns.ymax - self.dns.ymin);
        (shear / self.dns.ni).sqrt() * half_height
    }

    /// Largest departure of the stored `Uy` and `Uyy` from the grid derivatives of `U`
    pub fn gradient_mismatch(&self) -> (f64, f64) {
        let u = self.statistics.profile(|s| s.mean.u);
        (0..=self.ny() as isize).fold((0.0, 0.0), |(dy, dyy), iy| {
            let mean = &self.statistics.plane(iy).mean;
            (
                f64::max(dy, (mean.uy - self.grid.derivative(&u, iy)).abs()),
                f64::max(dyy, (mean.uyy - self.grid.second_derivative(&u, iy)).abs()),
            )
        })
    }

    pub fn log_summary(&self, iproc: usize) {
        let ny = self.ny() as isize;
        info!(
            "[{}] nxd={} nzd={} mx={} mz={}",
            iproc,
            self.nxd(),
            self.nzd(),
            self.mx(),
            self.mz()
        );
        info!(
            "[{}] wall spacing {:.3e}, centreline spacing {:.3e}",
            iproc,
            self.grid.y[1] - self.grid.y[0],
            self.grid.y[ny / 2 + 1] - self.grid.y[ny / 2]
        );

        let (dy, dyy) = self.gradient_mismatch();
        info!(
            "[{}] Re_tau={:.2}, mean gradients within {:.3e} (Uy) and {:.3e} (Uyy) of the grid",
            iproc,
            self.friction_reynolds(),
            dy,
            dyy
        );
    }
}
