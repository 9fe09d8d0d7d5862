//! Buffers shared by the workers of one sweep

use {
    crate::{
        context::Context,
        convolution::QUADRATIC,
        correlation::{Pair, Product},
        snapshot::Plane,
        terms::GkeTerms,
    },
    ndarray::{Array3, Array4},
    rustfft::num_complex::Complex64,
    std::sync::RwLock,
};

/// Slots of the structure function buffer
pub const GRADIENT_X: usize = 0;
pub const ENERGY: usize = 1;
pub const GRADIENT_Z: usize = 2;

pub struct Workspace {
    /// Planes `iy1` and `iy2`, mean removed
    pub replicas: [RwLock<Plane>; 2],
    /// Quadratic products of each replica, `(slot, ix, iz+nz)`
    pub products: [RwLock<Array3<Complex64>>; 2],
    /// Padded fields while they are multiplied, `(slot, ix, iz)` over the dealiased grid
    pub physical: RwLock<Array3<Complex64>>,
    /// `(pair, product, ix, iz)` over the dealiased grid
    pub correlations: RwLock<Array4<Complex64>>,
    /// Structure function and its two gradients
    pub energy: RwLock<Array3<Complex64>>,
    /// Accumulated terms of the block, `(IY2-IY1, jx, jz)`
    pub block: RwLock<Array3<GkeTerms>>,
}

impl Workspace {
    pub fn new(ctx: &Context) -> Self {
        let (nx, nz) = (ctx.nx(), ctx.nz());
        let (nxd, nzd) = (ctx.nxd(), ctx.nzd());
        let products = || RwLock::new(Array3::zeros((QUADRATIC.len(), nx + 1, 2 * nz + 1)));

        Workspace {
            replicas: [
                RwLock::new(Plane::zeros(nx, nz)),
                RwLock::new(Plane::zeros(nx, nz)),
            ],
            products: [products(), products()],
            physical: RwLock::new(Array3::zeros((QUADRATIC.len(), nxd, nzd))),
            correlations: RwLock::new(Array4::zeros((
                Pair::ALL.len(),
                Product::ALL.len(),
                nxd,
                nzd,
            ))),
            energy: RwLock::new(Array3::zeros((3, nxd, nzd))),
            block: RwLock::new(Array3::default((0, ctx.mx(), ctx.mz()))),
        }
    }
}
