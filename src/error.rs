use {
    std::{
        fs::File,
        io::{self, Read},
        path::{Path, PathBuf},
    },
    thiserror::Error,
};

pub type Result<T> = std::result::Result<T, Error>;

/// Every fault here is fatal to the run; callers propagate it to `main`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Error in opening {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{source} in {} at byte {offset}", .path.display())]
    Stream {
        path: PathBuf,
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("End of file in {} at byte {offset}", .path.display())]
    EndOfFile { path: PathBuf, offset: u64 },

    #[error("Unrecognized input \"{found}\" in {} at byte {offset}", .path.display())]
    Unrecognized {
        path: PathBuf,
        offset: u64,
        found: String,
    },

    #[error("Invalid parameters: {0}")]
    Parameters(String),
}

impl Error {
    /// Maps an I/O error raised at `offset` of `path`, treating a short read as end of file.
    pub fn io<P: Into<PathBuf>>(path: P, offset: u64, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::UnexpectedEof {
            Error::EndOfFile { path, offset }
        } else {
            Error::Stream {
                path,
                offset,
                source,
            }
        }
    }

    /// Captures at most ten bytes of the offending input.
    pub fn unrecognized<P: Into<PathBuf>>(path: P, offset: u64, input: &str) -> Self {
        Error::Unrecognized {
            path: path.into(),
            offset,
            found: input.chars().take(10).collect(),
        }
    }
}

/// Reads the whole of `path`, a failure after opening being reported at the bytes already read
pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path).map_err(|e| Error::Open {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut bytes = vec![];
    match file.read_to_end(&mut bytes) {
        Ok(_) => Ok(bytes),
        Err(e) => Err(Error::io(path, bytes.len() as u64, e)),
    }
}
