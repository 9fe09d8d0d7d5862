use {
    crate::{
        constants::DEFAULT_WORKERS,
        error::{Error, Result},
    },
    serde::Deserialize,
    std::path::PathBuf,
};

/// Run parameters
#[derive(Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Parameters {
    pub input: Input,
    /// Path of the GKE term image
    pub output: PathBuf,
    pub snapshots: Snapshots,
    pub sampling: Sampling,
    /// Number of threads sharing each sweep
    pub workers: usize,
    /// Average each snapshot with its wall reflection
    pub symmetry: bool,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            input: Input::default(),
            output: PathBuf::from("gke.bin"),
            snapshots: Snapshots::default(),
            sampling: Sampling::default(),
            workers: DEFAULT_WORKERS,
            symmetry: true,
        }
    }
}

impl Parameters {
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::Parameters("at least one worker is required".into()));
        }
        if self.snapshots.step == 0 || self.snapshots.first > self.snapshots.last {
            return Err(Error::Parameters(format!(
                "empty snapshot set {}..={} step {}",
                self.snapshots.first, self.snapshots.last, self.snapshots.step
            )));
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Input {
    /// Directory holding the snapshots, the solver input and the statistics
    pub directory: PathBuf,
    /// Solver input file, relative to `directory`
    pub dns: PathBuf,
    /// Mean and balance statistics, relative to `directory`
    pub statistics: PathBuf,
}

impl Default for Input {
    fn default() -> Self {
        Input {
            directory: PathBuf::from("."),
            dns: PathBuf::from("dns.in"),
            statistics: PathBuf::from("uiuj.bin"),
        }
    }
}

#[derive(Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Snapshots {
    /// Index of the first snapshot file
    pub first: usize,
    /// Index of the last snapshot file
    pub last: usize,
    /// Increment between snapshot indices
    pub step: usize,
}

impl Snapshots {
    pub fn indices(&self) -> Vec<usize> {
        (self.first..=self.last).step_by(self.step.max(1)).collect()
    }
}

impl Default for Snapshots {
    fn default() -> Self {
        Snapshots {
            first: 20,
            last: 36,
            step: 2,
        }
    }
}

#[derive(Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Sampling {
    /// Streamwise separation up to which every grid point is kept
    pub streamwise: f64,
    /// Spanwise separation up to which every grid point is kept
    pub spanwise: f64,
    /// Separation up to which every fourth grid point is kept, every eighth beyond
    pub coarse: f64,
}

impl Default for Sampling {
    fn default() -> Self {
        Sampling {
            streamwise: 0.2,
            spanwise: 0.2,
            coarse: 0.5,
        }
    }
}
