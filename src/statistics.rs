//! Per-plane mean profile and balance statistics from `uiuj.bin`
//!
//! The file holds three consecutive arrays over the planes `-1..=ny+1`: the mean terms, the mean
//! kinetic energy budget and the Reynolds stress balance. Each record is a packed sequence of
//! little-endian doubles.

use {
    crate::{
        constants::{BALANCE_RECORD, MEAN_RECORD, MKE_RECORD},
        error::{read_file, Error, Result},
        offset::OffsetVec,
    },
    serde::{de::DeserializeOwned, Deserialize, Serialize},
    std::path::Path,
};

#[cfg(test)]
use std::{
    fs::File,
    io::{BufWriter, Write},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeanTerms {
    pub u: f64,
    pub w: f64,
    pub uy: f64,
    pub wy: f64,
    pub uyy: f64,
    pub wyy: f64,
    pub p: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MkeTerms {
    pub pump: f64,
    pub produv: f64,
    pub prodvw: f64,
    pub ttrsp: f64,
    pub vdiff: f64,
    pub diss_u: f64,
    pub diss_w: f64,
    pub phi_ttrsp: f64,
    pub phi_vdiff: f64,
}

/// Reynolds stress budget, components ordered `uu, vv, ww, uv, uw, vw`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub var: [f64; 6],
    pub prod: [f64; 6],
    pub psdiss: [f64; 6],
    pub ttrsp: [f64; 6],
    pub vdiff: [f64; 6],
    pub pstrain: [f64; 6],
    pub ptrsp: [f64; 6],
    pub phi_ttrsp: [f64; 6],
    pub phi_vdiff: [f64; 6],
    pub phi_ptrsp: [f64; 6],
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaneStatistics {
    pub mean: MeanTerms,
    pub mke: MkeTerms,
    pub balance: Balance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    planes: OffsetVec<PlaneStatistics>,
}

impl Statistics {
    pub fn new(planes: OffsetVec<PlaneStatistics>) -> Self {
        Statistics { planes }
    }

    /// Reads the statistics of every plane of a channel with `ny` intervals
    pub fn read<P: AsRef<Path>>(path: P, ny: usize) -> Result<Self> {
        let path = path.as_ref();
        let bytes = read_file(path)?;

        let n = ny + 3;
        let mke_base = n * MEAN_RECORD;
        let balance_base = mke_base + n * MKE_RECORD;

        let mut planes = Vec::with_capacity(n);
        for slot in 0..n {
            planes.push(PlaneStatistics {
                mean: decode(&bytes, slot * MEAN_RECORD, path)?,
                mke: decode(&bytes, mke_base + slot * MKE_RECORD, path)?,
                balance: decode(&bytes, balance_base + slot * BALANCE_RECORD, path)?,
            });
        }

        let mut planes = planes.into_iter();
        Ok(Statistics {
            planes: OffsetVec::from_fn(-1..=ny as isize + 1, |_| {
                planes.next().unwrap_or_default()
            }),
        })
    }

    /// Writes the statistics in the layout `read` expects
    #[cfg(test)]
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut w = BufWriter::new(file);

        let planes = self.planes.as_slice();
        let mut offset = 0;
        for p in planes {
            encode(&mut w, &p.mean, offset, path)?;
            offset += MEAN_RECORD;
        }
        for p in planes {
            encode(&mut w, &p.mke, offset, path)?;
            offset += MKE_RECORD;
        }
        for p in planes {
            encode(&mut w, &p.balance, offset, path)?;
            offset += BALANCE_RECORD;
        }

        w.flush().map_err(|e| Error::io(path, offset as u64, e))
    }

    pub fn plane(&self, iy: isize) -> &PlaneStatistics {
        &self.planes[iy]
    }

    pub fn planes(&self) -> &OffsetVec<PlaneStatistics> {
        &self.planes
    }

    /// Wall-normal profile of one statistic
    pub fn profile<F: Fn(&PlaneStatistics) -> f64>(&self, f: F) -> OffsetVec<f64> {
        OffsetVec::from_fn(self.planes.range(), |iy| f(&self.planes[iy]))
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8], offset: usize, path: &Path) -> Result<T> {
    let record = bytes.get(offset..).unwrap_or(&[]);
    bincode::deserialize(record).map_err(|e| match *e {
        bincode::ErrorKind::Io(e) => Error::io(path, offset as u64, e),
        e => Error::unrecognized(path, offset as u64, &e.to_string()),
    })
}

#[cfg(test)]
fn encode<W: Write, T: Serialize>(w: &mut W, value: &T, offset: usize, path: &Path) -> Result<()> {
    bincode::serialize_into(w, value).map_err(|e| match *e {
        bincode::ErrorKind::Io(e) => Error::io(path, offset as u64, e),
        e => Error::unrecognized(path, offset as u64, &e.to_string()),
    })
}

#[cfg(test)]
mod test {
    use {
        super::*,
        approx::assert_abs_diff_eq,
        byteorder::{ByteOrder, LittleEndian},
        std::fs,
        tempdir::TempDir,
    };

    fn profile(ny: usize) -> Statistics {
        Statistics::new(OffsetVec::from_fn(-1..=ny as isize + 1, |iy| {
            let y = iy as f64;
            let mut balance = Balance::default();
            balance.psdiss = [y, 2.0 * y, 3.0 * y, 0.0, 0.0, -y];
            balance.phi_ptrsp[5] = 100.0 + y;
            PlaneStatistics {
                mean: MeanTerms {
                    u: y,
                    w: -y,
                    uy: 1.0,
                    wy: -1.0,
                    uyy: 0.0,
                    wyy: 0.0,
                    p: 0.5 * y,
                },
                mke: MkeTerms {
                    pump: 10.0 + y,
                    ..MkeTerms::default()
                },
                balance,
            }
        }))
    }

    #[test]
    fn record_sizes_match_layout() {
        assert_eq!(
            bincode::serialized_size(&MeanTerms::default()).unwrap() as usize,
            MEAN_RECORD
        );
        assert_eq!(
            bincode::serialized_size(&MkeTerms::default()).unwrap() as usize,
            MKE_RECORD
        );
        assert_eq!(
            bincode::serialized_size(&Balance::default()).unwrap() as usize,
            BALANCE_RECORD
        );
    }

    #[test]
    fn plane_offsets() {
        let dir = TempDir::new("channel-gke").unwrap();
        let path = dir.path().join("uiuj.bin");
        let ny = 4;
        profile(ny).write(&path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 7 * (MEAN_RECORD + MKE_RECORD + BALANCE_RECORD));

        // U of plane iy sits at (iy+1)*56
        assert_abs_diff_eq!(LittleEndian::read_f64(&bytes[3 * MEAN_RECORD..]), 2.0);
        // pump of plane 0 follows the whole mean array
        assert_abs_diff_eq!(
            LittleEndian::read_f64(&bytes[7 * MEAN_RECORD + MKE_RECORD..]),
            10.0
        );
        // last double of the last balance record
        assert_abs_diff_eq!(LittleEndian::read_f64(&bytes[bytes.len() - 8..]), 105.0);
    }

    #[test]
    fn read_back() {
        let dir = TempDir::new("channel-gke").unwrap();
        let path = dir.path().join("uiuj.bin");
        let written = profile(6);
        written.write(&path).unwrap();

        let read = Statistics::read(&path, 6).unwrap();
        assert_eq!(read, written);
        assert_abs_diff_eq!(read.plane(-1).mean.u, -1.0);
        assert_abs_diff_eq!(read.plane(7).balance.psdiss[2], 21.0);
    }

    #[test]
    fn truncated_file() {
        let dir = TempDir::new("channel-gke").unwrap();
        let path = dir.path().join("uiuj.bin");
        profile(4).write(&path).unwrap();
        fs::OpenOptions::new()
            .write(true)
            .open(&path)
            .unwrap()
            .set_len(100)
            .unwrap();

        match Statistics::read(&path, 4) {
            Err(Error::EndOfFile { offset, .. }) => {
                assert_eq!(offset as usize, 7 * MEAN_RECORD)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unreadable_file() {
        let dir = TempDir::new("channel-gke").unwrap();
        let path = dir.path().join("uiuj.bin");
        fs::create_dir(&path).unwrap();

        match Statistics::read(&path, 4) {
            Err(Error::Stream { offset, .. }) => assert_eq!(offset, 0),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn wall_normal_profile() {
        let u = profile(4).profile(|s| s.mean.u + s.mke.pump);
        assert_eq!(u.range(), -1..=5);
        assert_abs_diff_eq!(u[-1], 8.0);
        assert_abs_diff_eq!(u[5], 20.0);
    }
}
