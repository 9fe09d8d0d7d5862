//! Dealiased quadratic products of one replica plane
//!
//! The velocity components are padded to the dealiased grid, synthesised along z then x,
//! multiplied pointwise and analysed back, keeping only the retained modes.

use {
    crate::{
        context::Context,
        transform::{fold, realified, realified_mut},
        workers::{read, write, Worker},
        workspace::Workspace,
    },
    ndarray::{aview1, s},
    rustfft::{num_complex::Complex64, num_traits::Zero},
};

pub const U: usize = 0;
pub const V: usize = 1;
pub const W: usize = 2;

/// Slots of the quadratic products
pub const UU: usize = 0;
pub const VV: usize = 1;
pub const WW: usize = 2;
pub const UV: usize = 3;
pub const UW: usize = 4;
pub const VW: usize = 5;

/// Velocity components multiplied into each quadratic slot
pub const QUADRATIC: [(usize, usize); 6] = [(U, U), (V, V), (W, W), (U, V), (U, W), (V, W)];

/// Fills the quadratic products of replica `replica`, returning once every worker has finished
pub fn convolve(worker: &Worker, ctx: &Context, ws: &Workspace, replica: usize) {
    let (nx, nz) = (ctx.nx(), ctx.nz() as isize);
    let (nxd, nzd) = (ctx.nxd(), ctx.nzd());
    let t = &ctx.transforms;
    let rows = worker.partition(nx + 1);

    let mut lines = Vec::with_capacity(3 * rows.len());
    {
        let plane = read(&ws.replicas[replica]);
        for ix in rows.clone() {
            for c in 0..3 {
                let mut line = vec![Complex64::zero(); nzd];
                for iz in -nz..=nz {
                    line[fold(iz, nzd)] = plane.velocity[[ix, (iz + nz) as usize, c]];
                }
                t.ift(&mut line);
                lines.push((c, ix, line));
            }
        }
    }
    {
        let mut physical = write(&ws.physical);
        for (c, ix, line) in &lines {
            physical.slice_mut(s![*c, *ix, ..]).assign(&aview1(line));
        }
        if worker.is_leader() {
            physical
                .slice_mut(s![0..3, nx + 1.., ..])
                .fill(Complex64::zero());
        }
    }
    worker.sync();

    let columns = worker.partition(nzd);
    let mut products = Vec::with_capacity(columns.len());
    {
        let physical = read(&ws.physical);
        for iz in columns {
            let mut uvw = (U..=W)
                .map(|c| physical.slice(s![c, .., iz]).to_vec())
                .collect::<Vec<_>>();
            uvw.iter_mut().for_each(|line| t.rft(line));

            let mut column = vec![vec![Complex64::zero(); nxd]; QUADRATIC.len()];
            for (line, &(a, b)) in column.iter_mut().zip(QUADRATIC.iter()) {
                for j in 0..2 * nxd {
                    *realified_mut(line, j) = realified(&uvw[a], j) * realified(&uvw[b], j);
                }
                t.hft(line);
            }
            products.push((iz, column));
        }
    }
    {
        let mut physical = write(&ws.physical);
        for (iz, column) in &products {
            for (k, line) in column.iter().enumerate() {
                physical.slice_mut(s![k, .., *iz]).assign(&aview1(line));
            }
        }
    }
    worker.sync();

    let mut lines = Vec::with_capacity(QUADRATIC.len() * rows.len());
    {
        let physical = read(&ws.physical);
        for ix in rows {
            for k in 0..QUADRATIC.len() {
                let mut line = physical.slice(s![k, ix, ..]).to_vec();
                t.fft(&mut line);
                lines.push((k, ix, line));
            }
        }
    }
    {
        let mut quadratic = write(&ws.products[replica]);
        for (k, ix, line) in &lines {
            for iz in -nz..=nz {
                quadratic[[*k, *ix, (iz + nz) as usize]] = line[fold(iz, nzd)];
            }
        }
    }
    worker.sync();
}
