//! Velocity and pressure snapshots of the whole channel
//!
//! `Dati.cart.<N>.fld` holds a header followed by `(u, v, w)` for every `(iy, ix, iz)` with
//! `iy` in `-1..=ny+1`, `ix` in `0..=nx` and `iz` in `-nz..=nz`, the last index varying fastest.
//! `pField<N>.fld` holds one pressure value per cell in the same order without a header.

use {
    crate::{
        constants::{COMPLEX_BYTES, VELOCITY_HEADER, VELOCITY_RECORD},
        dns::DnsInput,
        error::{read_file, Error, Result},
        statistics::MeanTerms,
    },
    byteorder::{ByteOrder, LittleEndian},
    ndarray::{Array2, Array3, Array4, Axis},
    rustfft::num_complex::Complex64,
    std::path::{Path, PathBuf},
};

#[cfg(test)]
use std::{
    fs::File,
    io::{BufWriter, Write},
};

pub fn velocity_path<P: AsRef<Path>>(directory: P, index: usize) -> PathBuf {
    directory.as_ref().join(format!("Dati.cart.{}.fld", index))
}

pub fn pressure_path<P: AsRef<Path>>(directory: P, index: usize) -> PathBuf {
    directory.as_ref().join(format!("pField{}.fld", index))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    ny: usize,
    nx: usize,
    nz: usize,
    /// `(iy+1, ix, iz+nz, component)`
    pub velocity: Array4<Complex64>,
    /// `(iy+1, ix, iz+nz)`
    pub pressure: Array3<Complex64>,
}

/// One wall-normal plane of a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    /// `(ix, iz+nz, component)`
    pub velocity: Array3<Complex64>,
    /// `(ix, iz+nz)`
    pub pressure: Array2<Complex64>,
}

impl Snapshot {
    pub fn zeros(ny: usize, nx: usize, nz: usize) -> Self {
        Snapshot {
            ny,
            nx,
            nz,
            velocity: Array4::zeros((ny + 3, nx + 1, 2 * nz + 1, 3)),
            pressure: Array3::zeros((ny + 3, nx + 1, 2 * nz + 1)),
        }
    }

    /// Reads snapshot `index` from `directory`
    pub fn load<P: AsRef<Path>>(directory: P, index: usize, dns: &DnsInput) -> Result<Self> {
        let mut snapshot = Self::zeros(dns.ny, dns.nx, dns.nz);
        let cells = snapshot.pressure.len();

        let path = velocity_path(&directory, index);
        let bytes = read_exact_len(&path, VELOCITY_HEADER as usize, cells, VELOCITY_RECORD)?;
        snapshot
            .velocity
            .iter_mut()
            .zip(bytes[VELOCITY_HEADER as usize..].chunks_exact(COMPLEX_BYTES))
            .for_each(|(v, b)| *v = decode(b));

        let path = pressure_path(&directory, index);
        let bytes = read_exact_len(&path, 0, cells, COMPLEX_BYTES)?;
        snapshot
            .pressure
            .iter_mut()
            .zip(bytes.chunks_exact(COMPLEX_BYTES))
            .for_each(|(p, b)| *p = decode(b));

        Ok(snapshot)
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Array slot of spanwise wavenumber `iz`
    pub fn column(&self, iz: isize) -> usize {
        (iz + self.nz as isize) as usize
    }

    /// Array slot of wall-normal plane `iy`
    pub fn slot(&self, iy: isize) -> usize {
        (iy + 1) as usize
    }

    /// Copy of plane `iy`
    pub fn plane(&self, iy: isize) -> Plane {
        let s = self.slot(iy);
        Plane {
            velocity: self.velocity.index_axis(Axis(0), s).to_owned(),
            pressure: self.pressure.index_axis(Axis(0), s).to_owned(),
        }
    }
}

#[cfg(test)]
impl Snapshot {
    /// Writes the snapshot as `index` in `directory`, with a zeroed header
    pub fn save<P: AsRef<Path>>(&self, directory: P, index: usize) -> Result<()> {
        let header = vec![0u8; VELOCITY_HEADER as usize];
        write_values(
            &velocity_path(&directory, index),
            &header,
            self.velocity.iter(),
        )?;
        write_values(&pressure_path(&directory, index), &[], self.pressure.iter())
    }

    pub fn set_velocity(&mut self, iy: isize, ix: usize, iz: isize, uvw: [Complex64; 3]) {
        let (s, c) = (self.slot(iy), self.column(iz));
        for (i, v) in uvw.iter().enumerate() {
            self.velocity[[s, ix, c, i]] = *v;
        }
    }

    pub fn set_pressure(&mut self, iy: isize, ix: usize, iz: isize, p: Complex64) {
        let (s, c) = (self.slot(iy), self.column(iz));
        self.pressure[[s, ix, c]] = p;
    }
}

impl Plane {
    pub fn zeros(nx: usize, nz: usize) -> Self {
        Plane {
            velocity: Array3::zeros((nx + 1, 2 * nz + 1, 3)),
            pressure: Array2::zeros((nx + 1, 2 * nz + 1)),
        }
    }

    /// Highest spanwise wavenumber held
    pub fn nz(&self) -> usize {
        self.pressure.ncols() / 2
    }

    /// Subtracts the mean profile from the real part of the `(0, 0)` mode
    pub fn remove_mean(&mut self, mean: &MeanTerms) {
        let c = self.nz();
        self.velocity[[0, c, 0]].re -= mean.u;
        self.velocity[[0, c, 2]].re -= mean.w;
        self.pressure[[0, c]].re -= mean.p;
    }
}

fn decode(b: &[u8]) -> Complex64 {
    Complex64::new(LittleEndian::read_f64(&b[..8]), LittleEndian::read_f64(&b[8..16]))
}

/// Reads `path`, which must hold at least `header` bytes and `records` records of `record` bytes
fn read_exact_len(path: &Path, header: usize, records: usize, record: usize) -> Result<Vec<u8>> {
    let bytes = read_file(path)?;

    let len = bytes.len();
    if len < header + records * record {
        let reached = if len < header {
            len
        } else {
            header + (len - header) / record * record
        };
        return Err(Error::EndOfFile {
            path: path.to_path_buf(),
            offset: reached as u64,
        });
    }

    Ok(bytes)
}

#[cfg(test)]
fn write_values<'a, I: Iterator<Item = &'a Complex64>>(
    path: &Path,
    header: &[u8],
    values: I,
) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::Open {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut w = BufWriter::new(file);

    let mut offset = header.len() as u64;
    w.write_all(header).map_err(|e| Error::io(path, 0, e))?;

    let mut buf = [0u8; COMPLEX_BYTES];
    for v in values {
        LittleEndian::write_f64(&mut buf[..8], v.re);
        LittleEndian::write_f64(&mut buf[8..], v.im);
        w.write_all(&buf).map_err(|e| Error::io(path, offset, e))?;
        offset += COMPLEX_BYTES as u64;
    }

    w.flush().map_err(|e| Error::io(path, offset, e))
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::test::dns_input,
        approx::assert_abs_diff_eq,
        std::fs::{self, OpenOptions},
        tempdir::TempDir,
    };

    fn numbered(ny: usize, nx: usize, nz: usize) -> Snapshot {
        let mut s = Snapshot::zeros(ny, nx, nz);
        for iy in -1..=ny as isize + 1 {
            for ix in 0..=nx {
                for iz in -(nz as isize)..=nz as isize {
                    let tag = (100 * iy + 10 * ix as isize + iz) as f64;
                    s.set_velocity(
                        iy,
                        ix,
                        iz,
                        [
                            Complex64::new(tag, 0.1),
                            Complex64::new(tag, 0.2),
                            Complex64::new(tag, 0.3),
                        ],
                    );
                    s.set_pressure(iy, ix, iz, Complex64::new(-tag, 0.4));
                }
            }
        }
        s
    }

    #[test]
    fn record_order() {
        let dir = TempDir::new("channel-gke").unwrap();
        let (ny, nx, nz) = (4, 2, 2);
        numbered(ny, nx, nz).save(dir.path(), 20).unwrap();

        let bytes = fs::read(velocity_path(dir.path(), 20)).unwrap();
        let cells = (ny + 3) * (nx + 1) * (2 * nz + 1);
        assert_eq!(bytes.len(), VELOCITY_HEADER as usize + cells * VELOCITY_RECORD);

        // (iy=-1, ix=0, iz=-2) comes first, then iz=-1
        let first = VELOCITY_HEADER as usize;
        assert_abs_diff_eq!(LittleEndian::read_f64(&bytes[first..]), -102.0);
        assert_abs_diff_eq!(LittleEndian::read_f64(&bytes[first + 40..]), 0.3);
        assert_abs_diff_eq!(
            LittleEndian::read_f64(&bytes[first + VELOCITY_RECORD..]),
            -101.0
        );

        let bytes = fs::read(pressure_path(dir.path(), 20)).unwrap();
        assert_eq!(bytes.len(), cells * COMPLEX_BYTES);
        assert_abs_diff_eq!(LittleEndian::read_f64(&bytes[bytes.len() - 16..]), -522.0);
    }

    #[test]
    fn load_saved() {
        let dir = TempDir::new("channel-gke").unwrap();
        let saved = numbered(4, 2, 2);
        saved.save(dir.path(), 22).unwrap();

        let loaded = Snapshot::load(dir.path(), 22, &dns_input(4, 2, 2)).unwrap();
        assert_eq!(loaded, saved);

        let plane = loaded.plane(3);
        assert_abs_diff_eq!(plane.velocity[[1, 0, 2]].re, 308.0);
        assert_abs_diff_eq!(plane.pressure[[2, 4]].re, -322.0);
    }

    #[test]
    fn mean_leaves_other_modes() {
        let mut plane = numbered(4, 2, 2).plane(1);
        let before = plane.clone();
        plane.remove_mean(&MeanTerms {
            u: 100.0,
            w: 50.0,
            p: -100.0,
            ..MeanTerms::default()
        });

        assert_abs_diff_eq!(plane.velocity[[0, 2, 0]].re, 0.0);
        assert_abs_diff_eq!(plane.velocity[[0, 2, 1]].re, 100.0);
        assert_abs_diff_eq!(plane.velocity[[0, 2, 2]].re, 50.0);
        assert_abs_diff_eq!(plane.velocity[[0, 2, 0]].im, 0.1);
        assert_abs_diff_eq!(plane.pressure[[0, 2]].re, 0.0);

        plane.velocity[[0, 2, 0]] = before.velocity[[0, 2, 0]];
        plane.velocity[[0, 2, 2]] = before.velocity[[0, 2, 2]];
        plane.pressure[[0, 2]] = before.pressure[[0, 2]];
        assert_eq!(plane, before);
    }

    #[test]
    fn short_pressure_file() {
        let dir = TempDir::new("channel-gke").unwrap();
        numbered(4, 2, 2).save(dir.path(), 24).unwrap();

        let path = pressure_path(dir.path(), 24);
        OpenOptions::new()
            .write(true)
            .open(&path)
            .unwrap()
            .set_len(40)
            .unwrap();

        match Snapshot::load(dir.path(), 24, &dns_input(4, 2, 2)) {
            Err(Error::EndOfFile { path: p, offset }) => {
                assert_eq!(p, path);
                assert_eq!(offset, 32);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn missing_file() {
        let dir = TempDir::new("channel-gke").unwrap();
        assert!(matches!(
            Snapshot::load(dir.path(), 26, &dns_input(4, 2, 2)),
            Err(Error::Open { .. })
        ));
    }

    #[test]
    fn unreadable_file() {
        let dir = TempDir::new("channel-gke").unwrap();
        fs::create_dir(velocity_path(dir.path(), 28)).unwrap();

        match Snapshot::load(dir.path(), 28, &dns_input(4, 2, 2)) {
            Err(Error::Stream { path, offset, .. }) => {
                assert_eq!(path, velocity_path(dir.path(), 28));
                assert_eq!(offset, 0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
