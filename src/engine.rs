//! Sweeps over snapshot files and wall-normal blocks, accumulating the GKE terms on disk

use {
    crate::{
        context::Context,
        convolution::convolve,
        correlation::correlate,
        error::{Error, Result},
        snapshot::Snapshot,
        store::{normalize, BlockStore},
        terms::{assemble, dissipation, Cell, GkeTerms},
        workers::{exclusive, write, WorkerPool},
        workspace::Workspace,
    },
    log::{debug, info},
    ndarray::Array3,
    std::{mem, ops::RangeInclusive, path::Path, time::Instant},
};

/// Position of this process among those sharing the blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranks {
    pub iproc: usize,
    pub nproc: usize,
}

impl Ranks {
    pub fn new(iproc: usize, nproc: usize) -> Result<Self> {
        if iproc == 0 || iproc > nproc {
            return Err(Error::Parameters(format!(
                "rank {} outside 1..={}",
                iproc, nproc
            )));
        }
        Ok(Ranks { iproc, nproc })
    }

    pub fn single() -> Self {
        Ranks { iproc: 1, nproc: 1 }
    }

    /// Blocks of `-1..=ny/2` handled by this rank
    pub fn blocks(&self, ny: usize) -> RangeInclusive<isize> {
        let n = ny as isize / 2 + 2;
        let (iproc, nproc) = (self.iproc as isize, self.nproc as isize);
        -1 + (iproc - 1) * n / nproc..=iproc * n / nproc - 2
    }
}

pub struct Engine<'a> {
    ctx: &'a Context,
    pool: WorkerPool,
    workspace: Workspace,
    ranks: Ranks,
    symmetry: bool,
}

impl<'a> Engine<'a> {
    pub fn new(ctx: &'a Context, ranks: Ranks, workers: usize, symmetry: bool) -> Result<Self> {
        Ok(Engine {
            ctx,
            pool: WorkerPool::new(workers)?,
            workspace: Workspace::new(ctx),
            ranks,
            symmetry,
        })
    }

    /// Replica signs averaged over each snapshot
    fn signs(&self) -> &'static [f64] {
        if self.symmetry {
            &[1.0, -1.0]
        } else {
            &[1.0]
        }
    }

    /// Factor turning the sums over `files` snapshots into averages
    pub fn normalization(&self, files: usize) -> f64 {
        1.0 / (self.signs().len() * files) as f64
    }

    /// Accumulates the snapshots `files` of `directory` into `store`, normalising on the last
    pub fn run<P: AsRef<Path>>(
        &mut self,
        directory: P,
        files: &[usize],
        store: &mut BlockStore,
    ) -> Result<()> {
        let iproc = self.ranks.iproc;
        let blocks = self.ranks.blocks(self.ctx.ny());
        let factor = self.normalization(files.len());

        info!(
            "[{}] Blocks {:?} of {} files with {} workers",
            iproc,
            blocks,
            files.len(),
            self.pool.workers()
        );

        for (n, &index) in files.iter().enumerate() {
            let start = Instant::now();
            let snapshot = Snapshot::load(directory.as_ref(), index, &self.ctx.dns)?;
            info!(
                "[{}] Read snapshot {} in {:.3}s",
                iproc,
                index,
                start.elapsed().as_secs_f64()
            );

            for iy1 in blocks.clone() {
                let start = Instant::now();

                let mut block = if n == 0 {
                    Array3::default(self.ctx.layout.block_shape(iy1))
                } else {
                    store.read(iy1)?
                };

                for &sig in self.signs() {
                    block = self.sweep(&snapshot, iy1, sig, block);
                }

                if n + 1 == files.len() {
                    normalize(&mut block, factor);
                }
                store.write(iy1, &block)?;

                info!(
                    "[{}] File {} block {} done in {:.3}s",
                    iproc,
                    index,
                    iy1,
                    start.elapsed().as_secs_f64()
                );
            }
        }

        store.flush()?;
        info!("[{}] Written {}", iproc, store.path().display());

        Ok(())
    }

    /// Adds replica `sig` of block `iy1` of one snapshot to `block`
    pub fn sweep(
        &mut self,
        snapshot: &Snapshot,
        iy1: isize,
        sig: f64,
        block: Array3<GkeTerms>,
    ) -> Array3<GkeTerms> {
        let start = Instant::now();
        let ctx = self.ctx;
        let ny = ctx.ny() as isize;
        let reflect = |iy: isize| if sig > 0.0 { iy } else { ny - iy };

        let first = reflect(iy1);
        let mut plane = snapshot.plane(first);
        plane.remove_mean(&ctx.statistics.plane(first).mean);
        *exclusive(&mut self.workspace.replicas[0]) = plane;
        *exclusive(&mut self.workspace.block) = block;

        let ws = &self.workspace;
        let iproc = self.ranks.iproc;
        self.pool.run(|worker| {
            convolve(worker, ctx, ws, 0);

            for iy2 in iy1..=ny - iy1 {
                let second = reflect(iy2);
                if worker.is_leader() {
                    let mut plane = snapshot.plane(second);
                    plane.remove_mean(&ctx.statistics.plane(second).mean);
                    *write(&ws.replicas[1]) = plane;
                }
                worker.sync();

                convolve(worker, ctx, ws, 1);
                correlate(worker, ctx, ws);

                let cell = Cell {
                    plane: (iy2 - iy1) as usize,
                    sig,
                    iy1: first,
                    iy2: second,
                };
                assemble(worker, ctx, ws, cell);
                dissipation(worker, ctx, ws, cell);

                if worker.is_leader() {
                    debug!("[{}] IY1={} sig={} IY2={}", iproc, iy1, sig, iy2);
                }
            }
        });

        info!(
            "[{}] Sweep IY1={} sig={} in {:.3}s",
            iproc,
            iy1,
            sig,
            start.elapsed().as_secs_f64()
        );

        mem::take(exclusive(&mut self.workspace.block))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rank_partition() {
        assert_eq!(Ranks::single().blocks(4), -1..=2);
        assert_eq!(Ranks::new(1, 2).unwrap().blocks(4), -1..=0);
        assert_eq!(Ranks::new(2, 2).unwrap().blocks(4), 1..=2);

        // every block is covered exactly once
        for &(ny, nproc) in &[(100, 7), (64, 3), (6, 4), (9, 2)] {
            let blocks = (1..=nproc)
                .flat_map(|iproc| Ranks::new(iproc, nproc).unwrap().blocks(ny))
                .collect::<Vec<_>>();
            assert_eq!(blocks, (-1..=ny as isize / 2).collect::<Vec<_>>());
        }
    }

    #[test]
    fn rejects_bad_ranks() {
        assert!(Ranks::new(0, 2).is_err());
        assert!(Ranks::new(3, 2).is_err());
    }
}
