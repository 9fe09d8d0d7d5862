/// Threads sharing each sweep unless configured otherwise
pub const DEFAULT_WORKERS: usize = 32;

/// Bytes preceding the first record of a velocity snapshot
pub const VELOCITY_HEADER: u64 = 1024;

pub const COMPLEX_BYTES: usize = 16;
/// u, v and w of one (iy, ix, iz) cell
pub const VELOCITY_RECORD: usize = 3 * COMPLEX_BYTES;

/// `U, W, Uy, Wy, Uyy, Wyy, P`
pub const MEAN_RECORD: usize = 7 * 8;
/// Nine mean kinetic energy budget terms
pub const MKE_RECORD: usize = 9 * 8;
/// Ten six-component balance terms
pub const BALANCE_RECORD: usize = 10 * 6 * 8;

/// `phiR[3], phiC, scaleENER, scalePROD`
pub const GKE_RECORD: usize = 6 * 8;
