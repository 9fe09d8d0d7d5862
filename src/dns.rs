//! Reader for the solver's `dns.in` input file
//!
//! Records are `key = value` pairs consumed in a fixed order. Whitespace, including line breaks,
//! is free around keys and `=`, and a `!` at the start of a record comments out the rest of its
//! line.

use {
    crate::error::{Error, Result},
    log::info,
    std::{
        fs,
        path::{Path, PathBuf},
        str::FromStr,
    },
};

/// Value given to the optional mean-flow records when they are absent
pub const UNSET: f64 = -99.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DnsInput {
    /// Number of wall-normal intervals
    pub ny: usize,
    /// Highest streamwise wavenumber index
    pub nx: usize,
    /// Highest spanwise wavenumber index
    pub nz: usize,
    /// Fundamental streamwise wavenumber
    pub alfa0: f64,
    /// Fundamental spanwise wavenumber
    pub beta0: f64,
    pub ymin: f64,
    pub ymax: f64,
    /// Hyperbolic tangent stretching parameter
    pub a: f64,
    /// Kinematic viscosity, the reciprocal of the Reynolds number in the file
    pub ni: f64,
    /// Reciprocal of the Prandtl number in the file
    pub pr: f64,
    pub gr: f64,

    pub meanpx: f64,
    pub meanflowx: f64,
    pub meanpz: f64,
    pub meanflowz: f64,

    pub u_conv: f64,
    pub w_conv: f64,
    pub u0: f64,
    pub un: f64,
    pub w0: f64,
    pub wn: f64,
    pub t0: f64,
    pub tn: f64,

    pub deltat: f64,
    pub cflmax: f64,

    pub t_max: f64,
    pub time_from_restart: bool,
    pub dt_field: f64,
    pub dt_save: f64,
    pub restart_file: Option<String>,
}

impl DnsInput {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&text, path)
    }

    /// Parses the contents of an input file, `path` only being used in error reports
    ///
    /// Records are `name = value` pairs read in this fixed order, `!` starting a comment:
    ///
    /// 1. `ny nx nz alfa0 beta0 ymin ymax a ni pr gr`, where `ni` and `pr` are reciprocals
    /// 2. optionally `meanpx` or `meanflowx`, then `meanpz` or `meanflowz`
    /// 3. `u_conv w_conv u0 un w0 wn t0 tn`
    /// 4. `deltat` or `cflmax`
    /// 5. `t_max` and the `time_from_restart` flag (`T`/`F`, `Y`/`N`)
    /// 6. `dt_field dt_save`, then an optional `restart_file` taking the rest of its line
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let mut s = Scanner::new(text, path);

        let ny = s.expect("ny")?;
        let nx = s.expect("nx")?;
        let nz = s.expect("nz")?;
        let alfa0 = s.expect("alfa0")?;
        let beta0 = s.expect("beta0")?;
        let ymin = s.expect("ymin")?;
        let ymax = s.expect("ymax")?;
        let a = s.expect("a")?;
        let ni = 1.0 / s.expect::<f64>("ni")?;
        let pr = 1.0 / s.expect::<f64>("pr")?;
        let gr = s.expect("gr")?;

        let (mut meanpx, mut meanflowx) = (UNSET, UNSET);
        let (mut meanpz, mut meanflowz) = (UNSET, UNSET);
        s.alternatives(&mut [("meanpx", &mut meanpx), ("meanflowx", &mut meanflowx)])?;
        s.alternatives(&mut [("meanpz", &mut meanpz), ("meanflowz", &mut meanflowz)])?;

        let u_conv = s.expect("u_conv")?;
        let w_conv = s.expect("w_conv")?;
        let u0 = s.expect("u0")?;
        let un = s.expect("un")?;
        let w0 = s.expect("w0")?;
        let wn = s.expect("wn")?;
        let t0 = s.expect("t0")?;
        let tn = s.expect("tn")?;

        let (mut deltat, mut cflmax) = (0.0, 0.0);
        s.alternatives(&mut [("deltat", &mut deltat), ("cflmax", &mut cflmax)])?;

        let t_max = s.expect("t_max")?;
        let time_from_restart = s.expect_flag("time_from_restart")?;
        let dt_field = s.expect("dt_field")?;
        let dt_save = s.expect("dt_save")?;
        let restart_file = s.line("restart_file");

        if ny < 2 || nx == 0 || nz == 0 {
            return Err(Error::Parameters(format!(
                "grid ny={} nx={} nz={} is too small",
                ny, nx, nz
            )));
        }

        Ok(DnsInput {
            ny,
            nx,
            nz,
            alfa0,
            beta0,
            ymin,
            ymax,
            a,
            ni,
            pr,
            gr,
            meanpx,
            meanflowx,
            meanpz,
            meanflowz,
            u_conv,
            w_conv,
            u0,
            un,
            w0,
            wn,
            t0,
            tn,
            deltat,
            cflmax,
            t_max,
            time_from_restart,
            dt_field,
            dt_save,
            restart_file,
        })
    }

    /// Logs the input the way the solver echoes it
    pub fn log_summary(&self, nproc: usize, workers: usize) {
        info!("nproc={}\tnsmp={}", nproc, workers);
        info!("nx={}\tnz={}\tny={}", self.nx, self.nz, self.ny);
        info!(
            "meanflowx={}\tmeanpx={}\tmeanflowz={}\tmeanpz={}",
            self.meanflowx, self.meanpx, self.meanflowz, self.meanpz
        );
        info!(
            "ymin={}\tymax={}\ta={}\talfa0={}\tbeta0={}\t1/ni={}\t1/pr={}",
            self.ymin,
            self.ymax,
            self.a,
            self.alfa0,
            self.beta0,
            1.0 / self.ni,
            1.0 / self.pr
        );
        info!(
            "u_conv={}\tu0={}\tun={}\tw_conv={}\tw0={}\twn={}\tt0={}\ttn={}",
            self.u_conv, self.u0, self.un, self.w_conv, self.w0, self.wn, self.t0, self.tn
        );
        info!(
            "deltat={}\tcflmax={}\tt_max={}\tdt_save={}\tdt_field={}",
            self.deltat, self.cflmax, self.t_max, self.dt_save, self.dt_field
        );
    }
}

/// Cursor over `name = value` records, following the order in which [`DnsInput::parse`] asks
/// for them
struct Scanner<'a> {
    text: &'a str,
    pos: usize,
    path: PathBuf,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, path: &Path) -> Self {
        Scanner {
            text,
            pos: 0,
            path: path.to_path_buf(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Moves to the start of the next record, skipping `!` comments
    fn skip_blank(&mut self) {
        loop {
            self.skip_whitespace();
            if !self.rest().starts_with('!') {
                break;
            }
            match self.rest().find('\n') {
                Some(n) => self.pos += n + 1,
                None => self.pos = self.text.len(),
            }
        }
    }

    /// Matches `key =` at the next record, leaving the position after `=` on success
    fn key(&mut self, key: &str) -> bool {
        let start = self.pos;
        self.skip_blank();
        if self.rest().starts_with(key) {
            self.pos += key.len();
            self.skip_whitespace();
            if self.rest().starts_with('=') {
                self.pos += 1;
                self.skip_whitespace();
                return true;
            }
        }
        self.pos = start;
        false
    }

    fn token(&mut self) -> &'a str {
        let rest = self.rest();
        let n = rest
            .find(|c: char| c.is_whitespace() || c == '!')
            .unwrap_or_else(|| rest.len());
        self.pos += n;
        &rest[..n]
    }

    fn unrecognized(&self) -> Error {
        Error::unrecognized(&self.path, self.pos as u64, self.rest())
    }

    fn value<T: FromStr>(&mut self) -> Result<T> {
        let start = self.pos;
        let token = self.token();
        token.parse().map_err(|_| {
            self.pos = start;
            self.unrecognized()
        })
    }

    fn expect<T: FromStr>(&mut self, key: &str) -> Result<T> {
        if !self.key(key) {
            self.skip_blank();
            return Err(self.unrecognized());
        }
        self.value()
    }

    /// Consumes any number of records among `keys`, in any order
    fn alternatives(&mut self, keys: &mut [(&str, &mut f64)]) -> Result<()> {
        'records: loop {
            for (key, slot) in keys.iter_mut() {
                if self.key(key) {
                    **slot = self.value()?;
                    continue 'records;
                }
            }
            return Ok(());
        }
    }

    fn expect_flag(&mut self, key: &str) -> Result<bool> {
        if !self.key(key) {
            self.skip_blank();
            return Err(self.unrecognized());
        }
        let start = self.pos;
        let token = self.token();
        match token.chars().next() {
            Some('T') | Some('Y') | Some('t') | Some('y') => Ok(true),
            Some('F') | Some('N') | Some('f') | Some('n') => Ok(false),
            _ => {
                self.pos = start;
                Err(self.unrecognized())
            }
        }
    }

    /// Takes the remainder of the line after `key =`, if that record is present
    fn line(&mut self, key: &str) -> Option<String> {
        if !self.key(key) {
            return None;
        }
        let rest = self.rest();
        let line = rest.lines().next().unwrap_or("").trim_end();
        self.pos += line.len();
        Some(line.to_string())
    }
}
