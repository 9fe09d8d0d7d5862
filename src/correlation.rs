//! Second and third order correlations between the two replica planes
//!
//! Each product multiplies the conjugate of a factor of the first replica of a pair by a
//! velocity component of the second, then synthesises the result along z and x so that the
//! realified samples hold the correlation at every separation.

use {
    crate::{
        context::Context,
        convolution::{U, UU, UV, UW, V, VV, VW, W, WW},
        transform::fold,
        workers::{read, write, Worker},
        workspace::Workspace,
    },
    ndarray::{aview1, s},
    rustfft::{num_complex::Complex64, num_traits::Zero},
};

/// First factor of a correlation product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Factor {
    Velocity(usize),
    Pressure,
    /// Slot of the replica's quadratic products
    Quadratic(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Product {
    Uu,
    Vv,
    Ww,
    Uv,
    Pv,
    UuU,
    UuV,
    UuW,
    VvU,
    VvV,
    VvW,
    WwU,
    WwV,
    WwW,
    UvU,
    UvV,
    UwU,
    UwW,
    VwV,
    VwW,
}

impl Product {
    pub const ALL: [Product; 20] = [
        Product::Uu,
        Product::Vv,
        Product::Ww,
        Product::Uv,
        Product::Pv,
        Product::UuU,
        Product::UuV,
        Product::UuW,
        Product::VvU,
        Product::VvV,
        Product::VvW,
        Product::WwU,
        Product::WwV,
        Product::WwW,
        Product::UvU,
        Product::UvV,
        Product::UwU,
        Product::UwW,
        Product::VwV,
        Product::VwW,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Factor from the first replica and velocity component from the second
    pub fn factors(self) -> (Factor, usize) {
        use Factor::*;

        match self {
            Product::Uu => (Velocity(U), U),
            Product::Vv => (Velocity(V), V),
            Product::Ww => (Velocity(W), W),
            Product::Uv => (Velocity(U), V),
            Product::Pv => (Pressure, V),
            Product::UuU => (Quadratic(UU), U),
            Product::UuV => (Quadratic(UU), V),
            Product::UuW => (Quadratic(UU), W),
            Product::VvU => (Quadratic(VV), U),
            Product::VvV => (Quadratic(VV), V),
            Product::VvW => (Quadratic(VV), W),
            Product::WwU => (Quadratic(WW), U),
            Product::WwV => (Quadratic(WW), V),
            Product::WwW => (Quadratic(WW), W),
            Product::UvU => (Quadratic(UV), U),
            Product::UvV => (Quadratic(UV), V),
            Product::UwU => (Quadratic(UW), U),
            Product::UwW => (Quadratic(UW), W),
            Product::VwV => (Quadratic(VW), V),
            Product::VwW => (Quadratic(VW), W),
        }
    }
}

/// Ordered pair of replicas `(i1, i2)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pair {
    OneOne,
    OneTwo,
    TwoOne,
    TwoTwo,
}

impl Pair {
    pub const ALL: [Pair; 4] = [Pair::OneOne, Pair::OneTwo, Pair::TwoOne, Pair::TwoTwo];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Zero-based replica slots
    pub fn replicas(self) -> (usize, usize) {
        match self {
            Pair::OneOne => (0, 0),
            Pair::OneTwo => (0, 1),
            Pair::TwoOne => (1, 0),
            Pair::TwoTwo => (1, 1),
        }
    }
}

/// Fills every correlation product of every replica pair with its realified physical samples
pub fn correlate(worker: &Worker, ctx: &Context, ws: &Workspace) {
    let (nx, nz) = (ctx.nx(), ctx.nz() as isize);
    let nzd = ctx.nzd();
    let t = &ctx.transforms;

    for pair in Pair::ALL.iter() {
        let (i1, i2) = pair.replicas();
        let p = pair.index();

        let mut lines = Vec::with_capacity(Product::ALL.len());
        {
            let replicas = [read(&ws.replicas[0]), read(&ws.replicas[1])];
            let quadratic = read(&ws.products[i1]);
            let (first, second) = (&replicas[i1], &replicas[i2]);

            for ix in worker.partition(nx + 1) {
                for product in Product::ALL.iter() {
                    let (factor, b) = product.factors();
                    let mut line = vec![Complex64::zero(); nzd];
                    for iz in -nz..=nz {
                        let c = (iz + nz) as usize;
                        let a = match factor {
                            Factor::Velocity(k) => first.velocity[[ix, c, k]],
                            Factor::Pressure => first.pressure[[ix, c]],
                            Factor::Quadratic(k) => quadratic[[k, ix, c]],
                        };
                        line[fold(iz, nzd)] = a.conj() * second.velocity[[ix, c, b]];
                    }
                    t.ift(&mut line);
                    lines.push((product.index(), ix, line));
                }
            }
        }
        {
            let mut r = write(&ws.correlations);
            for (k, ix, line) in &lines {
                r.slice_mut(s![p, *k, *ix, ..]).assign(&aview1(line));
            }
            if worker.is_leader() {
                r.slice_mut(s![p, .., nx + 1.., ..]).fill(Complex64::zero());
            }
        }
        worker.sync();

        let mut lines = Vec::with_capacity(Product::ALL.len());
        {
            let r = read(&ws.correlations);
            for iz in worker.partition(nzd) {
                for k in 0..Product::ALL.len() {
                    let mut line = r.slice(s![p, k, .., iz]).to_vec();
                    t.rft(&mut line);
                    lines.push((k, iz, line));
                }
            }
        }
        {
            let mut r = write(&ws.correlations);
            for (k, iz, line) in &lines {
                r.slice_mut(s![p, *k, .., *iz]).assign(&aview1(line));
            }
        }
    }
    worker.sync();
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::{
            convolution::convolve,
            test::{context, cosine_plane},
            transform::realified,
            workers::{exclusive, WorkerPool},
        },
        approx::assert_abs_diff_eq,
        core::f64::consts::PI,
        std::collections::HashSet,
    };

    #[test]
    fn labels_are_distinct() {
        let factors = Product::ALL
            .iter()
            .map(|p| format!("{:?}", p.factors()))
            .collect::<HashSet<_>>();
        assert_eq!(factors.len(), Product::ALL.len());

        for (i, p) in Product::ALL.iter().enumerate() {
            assert_eq!(p.index(), i);
        }
        assert_eq!(Pair::TwoOne.replicas(), (1, 0));
        assert_eq!(Pair::TwoTwo.index(), 3);
    }

    #[test]
    fn cosine_correlation() {
        // u1 = a1 cos(beta0 z) and u2 = a2 cos(beta0 z) correlate as a1 a2 cos(beta0 r)/2
        let ctx = context(4, 2, 2);
        let mut ws = Workspace::new(&ctx);
        let (a1, a2) = (1.5, -0.5);
        *exclusive(&mut ws.replicas[0]) = cosine_plane(a1, 0.0);
        *exclusive(&mut ws.replicas[1]) = cosine_plane(a2, 0.0);

        WorkerPool::new(3).unwrap().run(|worker| {
            convolve(worker, &ctx, &ws, 0);
            convolve(worker, &ctx, &ws, 1);
            correlate(worker, &ctx, &ws);
        });

        let r = read(&ws.correlations);
        let nzd = ctx.nzd();
        for iz in 0..nzd {
            let expected = 0.5 * a1 * a2 * (2.0 * PI * iz as f64 / nzd as f64).cos();
            let line = r
                .slice(s![Pair::OneTwo.index(), Product::Uu.index(), .., iz])
                .to_vec();
            for j in 0..2 * ctx.nxd() {
                assert_abs_diff_eq!(realified(&line, j), expected, epsilon = 1.0E-13);
            }
        }

        let line = r
            .slice(s![Pair::TwoTwo.index(), Product::Uu.index(), .., 0])
            .to_vec();
        assert_abs_diff_eq!(realified(&line, 0), 0.5 * a2 * a2, epsilon = 1.0E-13);

        // no v anywhere
        for pair in Pair::ALL.iter() {
            for product in &[Product::Uv, Product::Pv, Product::UuV, Product::UvU] {
                assert!(r
                    .slice(s![pair.index(), product.index(), .., ..])
                    .iter()
                    .all(|c| *c == Complex64::zero()));
            }
        }
    }
}
