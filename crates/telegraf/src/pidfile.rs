//! Process id file written once run mode has started.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The pidfile could not be written.
#[derive(Debug, Error)]
#[error("Unable to create pidfile: {source}")]
pub struct PidfileError {
    /// Requested pidfile path.
    pub path: PathBuf,
    /// Underlying I/O failure.
    #[source]
    pub source: io::Error,
}

/// Creates or truncates `path` and writes `pid` followed by a newline. The
/// handle is closed before returning.
pub(crate) fn write_pidfile(path: &Path, pid: u32) -> Result<(), PidfileError> {
    let error = |source| PidfileError {
        path: path.to_path_buf(),
        source,
    };
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    let mut file = options.open(path).map_err(error)?;
    writeln!(file, "{pid}").map_err(error)?;
    file.sync_all().map_err(error)
}
