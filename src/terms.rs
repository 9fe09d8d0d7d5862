//! Generalized Kolmogorov Equation terms assembled from the correlations of one plane pair


use {
    crate::{
        context::Context,
        correlation::{
            Pair::{self, OneOne, OneTwo, TwoOne, TwoTwo},
            Product::{self, *},
        },
        transform::{fold, realified, realified_mut},
        workers::{read, write, Worker},
        workspace::{Workspace, ENERGY, GRADIENT_X, GRADIENT_Z},
    },
    ndarray::{aview1, s, Array4, Axis},
    rustfft::{num_complex::Complex64, num_traits::Zero},
    serde::{Deserialize, Serialize},
};

/// Terms at one `(IY2, jx, jz)` cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GkeTerms {
    /// Flux components in x, y and z
    pub phi_r: [f64; 3],
    /// Flux in the mid-point wall-normal coordinate
    pub phi_c: f64,
    pub scale_ener: f64,
    pub scale_prod: f64,
}

impl GkeTerms {
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.phi_r[0],
            self.phi_r[1],
            self.phi_r[2],
            self.phi_c,
            self.scale_ener,
            self.scale_prod,
        ]
    }

    pub fn from_array(a: [f64; 6]) -> Self {
        GkeTerms {
            phi_r: [a[0], a[1], a[2]],
            phi_c: a[3],
            scale_ener: a[4],
            scale_prod: a[5],
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        let mut a = self.to_array();
        a.iter_mut().for_each(|x| *x *= factor);
        Self::from_array(a)
    }
}

/// The `(IY1, sig, IY2)` unit being accumulated
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    /// Plane of the block, `IY2 - IY1`
    pub plane: usize,
    /// Replica sign, `+1` or `-1`
    pub sig: f64,
    /// Physical planes of the two replicas
    pub iy1: isize,
    pub iy2: isize,
}

/// Realified samples of the correlations at one separation and its mirror image
struct Separation<'a> {
    r: &'a Array4<Complex64>,
    ix: usize,
    iz: usize,
    ixm: usize,
    izm: usize,
}

impl<'a> Separation<'a> {
    /// `ix` indexes the realified streamwise samples, `iz` the spanwise points
    fn new(r: &'a Array4<Complex64>, ix: usize, iz: usize) -> Self {
        let nxd2 = 2 * r.len_of(Axis(2));
        let nzd = r.len_of(Axis(3));
        Separation {
            r,
            ix,
            iz,
            ixm: (nxd2 - ix) % nxd2,
            izm: (nzd - iz) % nzd,
        }
    }

    fn at(&self, f: Product, pair: Pair, iz: usize, ix: usize) -> f64 {
        let c = self.r[[pair.index(), f.index(), ix / 2, iz]];
        if ix % 2 == 0 {
            c.re
        } else {
            c.im
        }
    }

    fn transfer(&self, f: Product, g: Product) -> f64 {
        let (ix, iz, ixm, izm) = (self.ix, self.iz, self.ixm, self.izm);
        self.at(f, OneTwo, iz, ix) - self.at(f, TwoOne, izm, ixm) + 2.0 * self.at(g, OneTwo, iz, ix)
            - 2.0 * self.at(g, TwoOne, izm, ixm)
            + self.at(f, TwoTwo, 0, 0)
            - self.at(f, OneOne, 0, 0)
    }

    fn centre(&self, f: Product, g: Product) -> f64 {
        let (ix, iz, ixm, izm) = (self.ix, self.iz, self.ixm, self.izm);
        self.at(f, OneTwo, iz, ix) + self.at(f, TwoOne, izm, ixm)
            - 2.0 * self.at(g, OneTwo, iz, ix)
            - 2.0 * self.at(g, TwoOne, izm, ixm)
            + self.at(f, TwoTwo, 0, 0)
            + self.at(f, OneOne, 0, 0)
    }

    /// Second order structure function
    fn energy(&self, f: Product) -> f64 {
        let (ix, iz, ixm, izm) = (self.ix, self.iz, self.ixm, self.izm);
        self.at(f, TwoTwo, 0, 0) + self.at(f, OneOne, 0, 0)
            - self.at(f, OneTwo, iz, ix)
            - self.at(f, TwoOne, izm, ixm)
    }

    fn energy_difference(&self, f: Product) -> f64 {
        let (ix, iz, ixm, izm) = (self.ix, self.iz, self.ixm, self.izm);
        self.at(f, TwoTwo, 0, 0) - self.at(f, OneOne, 0, 0) - self.at(f, OneTwo, iz, ix)
            + self.at(f, TwoOne, izm, ixm)
    }
}

/// Adds the flux, energy and production terms of `cell` at this worker's streamwise modes
pub fn assemble(worker: &Worker, ctx: &Context, ws: &Workspace, cell: Cell) {
    let s1 = ctx.statistics.plane(cell.iy1);
    let s2 = ctx.statistics.plane(cell.iy2);
    let (m1, m2) = (&s1.mean, &s2.mean);
    let g: f64 = (0..3)
        .map(|i| s1.balance.psdiss[i] + s2.balance.psdiss[i])
        .sum();
    let sig = cell.sig;

    let rows = worker.partition(ctx.mx());
    let mut cells = read(&ws.block)
        .slice(s![cell.plane, rows.clone(), ..])
        .to_owned();
    {
        let r = read(&ws.correlations);
        for (local, jx) in rows.clone().enumerate() {
            for (jz, &iz) in ctx.map.imz.iter().enumerate() {
                let s = Separation::new(&r, ctx.map.imx[jx], iz);
                let t = &mut cells[[local, jz]];

                t.phi_r[0] += s.transfer(UuU, UuU) + s.transfer(VvU, UvV) + s.transfer(WwU, UwW);
                t.phi_r[1] +=
                    sig * (s.transfer(UuV, UvU) + s.transfer(VvV, VvV) + s.transfer(WwV, VwW));
                t.phi_r[2] += s.transfer(UuW, UwU) + s.transfer(VvW, VwV) + s.transfer(WwW, WwW);

                let e = s.energy(Uu) + s.energy(Vv) + s.energy(Ww);
                t.scale_ener += e;
                t.phi_r[0] += e * (m2.u - m1.u);
                t.phi_r[2] += e * (m2.w - m1.w);

                t.phi_c += 0.5 * sig * (s.centre(UuV, UvU) + s.centre(VvV, VvV) + s.centre(WwV, VwW));
                t.phi_c += 2.0 * sig * s.energy(Pv);

                t.scale_prod -= s.energy(Uv) * (m1.uy + m2.uy)
                    + s.energy_difference(Uv) * (m2.uy - m1.uy)
                    + g;
            }
        }
    }
    write(&ws.block)
        .slice_mut(s![cell.plane, rows, ..])
        .assign(&cells);
}

/// Subtracts the viscous diffusion of the structure function along x and z
pub fn dissipation(worker: &Worker, ctx: &Context, ws: &Workspace, cell: Cell) {
    let (nx, nz) = (ctx.nx(), ctx.nz());
    let (nxd, nzd) = (ctx.nxd(), ctx.nzd());
    let t = &ctx.transforms;

    let mut lines = vec![];
    {
        let r = read(&ws.correlations);
        for iz in worker.partition(nzd) {
            let mut line = vec![Complex64::zero(); nxd];
            for j in 0..2 * nxd {
                let s = Separation::new(&r, j, iz);
                *realified_mut(&mut line, j) = s.energy(Uu) + s.energy(Vv) + s.energy(Ww);
            }
            t.hft(&mut line);
            lines.push((iz, line));
        }
    }
    {
        let mut energy = write(&ws.energy);
        for (iz, line) in &lines {
            energy.slice_mut(s![ENERGY, .., *iz]).assign(&aview1(line));
        }
    }
    worker.sync();

    let mut lines = vec![];
    {
        let energy = read(&ws.energy);
        for ix in worker.partition(nx + 1) {
            let mut line = energy.slice(s![ENERGY, ix, ..]).to_vec();
            t.fft(&mut line);
            for c in line.iter_mut().take(nzd - nz).skip(nz + 1) {
                *c = Complex64::zero();
            }

            let kx = ctx.dns.alfa0 * ix as f64;
            let mut dx = line
                .iter()
                .map(|c| Complex64::new(0.0, kx) * c)
                .collect::<Vec<_>>();
            let mut dz = line
                .iter()
                .enumerate()
                .map(|(iz, c)| Complex64::new(0.0, ctx.dns.beta0 * wavenumber(iz, nzd)) * c)
                .collect::<Vec<_>>();
            t.ift(&mut dx);
            t.ift(&mut dz);
            lines.push((ix, dx, dz));
        }
    }
    {
        let mut energy = write(&ws.energy);
        for (ix, dx, dz) in &lines {
            energy.slice_mut(s![GRADIENT_X, *ix, ..]).assign(&aview1(dx));
            energy.slice_mut(s![GRADIENT_Z, *ix, ..]).assign(&aview1(dz));
        }
        if worker.is_leader() {
            for &k in &[GRADIENT_X, GRADIENT_Z] {
                energy
                    .slice_mut(s![k, nx + 1.., ..])
                    .fill(Complex64::zero());
            }
        }
    }
    worker.sync();

    let mut lines = vec![];
    {
        let energy = read(&ws.energy);
        for iz in worker.partition(nzd) {
            for &k in &[GRADIENT_X, GRADIENT_Z] {
                let mut line = energy.slice(s![k, .., iz]).to_vec();
                t.rft(&mut line);
                lines.push((k, iz, line));
            }
        }
    }
    {
        let mut energy = write(&ws.energy);
        for (k, iz, line) in &lines {
            energy.slice_mut(s![*k, .., *iz]).assign(&aview1(line));
        }
    }
    worker.sync();

    let rows = worker.partition(ctx.mx());
    let scale = 2.0 * ctx.dns.ni;
    let mut corrections = vec![];
    {
        let energy = read(&ws.energy);
        let columns = ctx
            .map
            .imz
            .iter()
            .map(|&iz| {
                (
                    energy.slice(s![GRADIENT_X, .., iz]).to_vec(),
                    energy.slice(s![GRADIENT_Z, .., iz]).to_vec(),
                )
            })
            .collect::<Vec<_>>();
        for jx in rows.clone() {
            let ix = ctx.map.imx[jx];
            for (gx, gz) in &columns {
                corrections.push((realified(gx, ix), realified(gz, ix)));
            }
        }
    }
    {
        let mut block = write(&ws.block);
        let mut plane = block.slice_mut(s![cell.plane, rows, ..]);
        for (t, (dx, dz)) in plane.iter_mut().zip(corrections) {
            t.phi_r[0] -= scale * dx;
            t.phi_r[2] -= scale * dz;
        }
    }
    worker.sync();
}

/// Signed wavenumber of spanwise slot `iz`
fn wavenumber(iz: usize, nzd: usize) -> f64 {
    let k = if iz <= nzd / 2 {
        iz as isize
    } else {
        iz as isize - nzd as isize
    };
    debug_assert_eq!(fold(k, nzd), iz);
    k as f64
}
