//! Disk image holding the accumulated GKE terms between snapshot files
//!
//! Block `IY1` holds the planes `IY2 = IY1..=ny-IY1`, each an `mx` by `mz` array of records.
//! Blocks follow each other in order of `IY1`, starting with `IY1 = -1`. A block is read back
//! before it is updated with a later file and written whole once it has been updated, so every
//! rank only ever touches the blocks of its own `IY1` range.

use {
    crate::{
        constants::GKE_RECORD,
        error::{Error, Result},
        offset::OffsetVec,
        terms::GkeTerms,
    },
    byteorder::{ByteOrder, LittleEndian},
    ndarray::Array3,
    std::{
        fs::{File, OpenOptions},
        io::{Read, Seek, SeekFrom, Write},
        path::{Path, PathBuf},
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct BlockLayout {
    ny: usize,
    mx: usize,
    mz: usize,
    /// First plane of each block, counted from the start of the image
    startpos: OffsetVec<u64>,
}

impl BlockLayout {
    pub fn new(ny: usize, mx: usize, mz: usize) -> Self {
        let half = ny as isize / 2;
        let mut next = 0;
        let startpos = OffsetVec::from_fn(-1..=half + 1, |iy| {
            let start = next;
            next += (ny as isize - 2 * iy + 1).max(0) as u64;
            start
        });

        BlockLayout {
            ny,
            mx,
            mz,
            startpos,
        }
    }

    /// Range of blocks in the image
    pub fn blocks(&self) -> std::ops::RangeInclusive<isize> {
        -1..=self.ny as isize / 2
    }

    /// Number of planes in block `iy1`
    pub fn planes(&self, iy1: isize) -> usize {
        (self.ny as isize - 2 * iy1 + 1) as usize
    }

    pub fn block_shape(&self, iy1: isize) -> (usize, usize, usize) {
        (self.planes(iy1), self.mx, self.mz)
    }

    /// Byte offset of the record at `(plane, jx, jz)` of block `iy1`
    pub fn offset(&self, iy1: isize, plane: usize, jx: usize, jz: usize) -> u64 {
        ((self.startpos[iy1] + plane as u64) * (self.mx * self.mz) as u64
            + (jx * self.mz + jz) as u64)
            * GKE_RECORD as u64
    }

    pub fn block_bytes(&self, iy1: isize) -> usize {
        self.planes(iy1) * self.mx * self.mz * GKE_RECORD
    }

    /// Size of the complete image
    pub fn total_bytes(&self) -> u64 {
        self.startpos[self.startpos.hi()] * (self.mx * self.mz * GKE_RECORD) as u64
    }
}

/// Scales every term of a block, once all files have been accumulated
pub fn normalize(block: &mut Array3<GkeTerms>, factor: f64) {
    block.mapv_inplace(|t| t.scaled(factor));
}

pub struct BlockStore {
    file: File,
    path: PathBuf,
    layout: BlockLayout,
}

impl BlockStore {
    /// Opens the image at `path` for update, creating it if absent
    pub fn open<P: AsRef<Path>>(path: P, layout: BlockLayout) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .map_err(|e| Error::Open {
                path: path.clone(),
                source: e,
            })?;

        Ok(BlockStore { file, path, layout })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads back block `iy1` as written by `write`
    pub fn read(&mut self, iy1: isize) -> Result<Array3<GkeTerms>> {
        let offset = self.layout.offset(iy1, 0, 0, 0);
        let mut bytes = vec![0u8; self.layout.block_bytes(iy1)];

        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|e| Error::io(&self.path, offset, e))?;
        self.file
            .read_exact(&mut bytes)
            .map_err(|e| Error::io(&self.path, offset, e))?;

        let (_, mx, mz) = self.layout.block_shape(iy1);
        Ok(Array3::from_shape_fn(
            self.layout.block_shape(iy1),
            |(plane, jx, jz)| {
                let start = ((plane * mx + jx) * mz + jz) * GKE_RECORD;
                let mut a = [0.0; 6];
                LittleEndian::read_f64_into(&bytes[start..start + GKE_RECORD], &mut a);
                GkeTerms::from_array(a)
            },
        ))
    }

    pub fn write(&mut self, iy1: isize, block: &Array3<GkeTerms>) -> Result<()> {
        let offset = self.layout.offset(iy1, 0, 0, 0);
        let expected = self.layout.block_shape(iy1);
        if block.dim() != expected {
            return Err(Error::Parameters(format!(
                "block {} has shape {:?}, expected {:?}",
                iy1,
                block.dim(),
                expected
            )));
        }

        let mut bytes = vec![0u8; self.layout.block_bytes(iy1)];
        for (record, t) in bytes.chunks_exact_mut(GKE_RECORD).zip(block.iter()) {
            LittleEndian::write_f64_into(&t.to_array(), record);
        }

        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|e| Error::io(&self.path, offset, e))?;
        self.file
            .write_all(&bytes)
            .map_err(|e| Error::io(&self.path, offset, e))
    }

    pub fn flush(&mut self) -> Result<()> {
        let len = self.layout.total_bytes();
        self.file
            .sync_data()
            .map_err(|e| Error::io(&self.path, len, e))
    }
}
