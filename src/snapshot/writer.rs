//! JSON state writer

use crate::core::error::StateRejectedError;
use crate::snapshot::{Snapshot, StateAcceptor};
use anyhow::Result;
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

enum Target {
    Stream(Box<dyn Write + Send>),
    /// Opened on each accepted snapshot, never before
    File(PathBuf),
}

/// Hands snapshots over as pretty-printed JSON, one document per snapshot
///
/// A stream target gets every snapshot appended; a file target always
/// holds the last accepted one.
pub struct JsonStateWriter {
    target: Mutex<Target>,
}

impl JsonStateWriter {
    pub fn new<W: Write + Send + 'static>(out: W) -> Self {
        Self {
            target: Mutex::new(Target::Stream(Box::new(out))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    /// Write state to the file at `path`
    ///
    /// Only the parent directory is checked here. The file itself is not
    /// created or truncated until a snapshot is accepted.
    pub fn to_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        if !parent.is_dir() {
            anyhow::bail!("Cannot write {}: {} is not a directory", path.display(), parent.display());
        }
        Ok(Self {
            target: Mutex::new(Target::File(path.to_path_buf())),
        })
    }
}

#[async_trait]
impl StateAcceptor for JsonStateWriter {
    async fn accept_state(&self, snapshot: &Snapshot) -> Result<(), StateRejectedError> {
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| StateRejectedError::new(format!("could not encode snapshot: {}", e)))?;

        let mut target = self.target.lock().await;
        let written = match &mut *target {
            Target::Stream(out) => writeln!(out, "{}", json).and_then(|_| out.flush()),
            Target::File(path) => std::fs::write(path, format!("{}\n", json)),
        };
        written.map_err(|e| StateRejectedError::new(format!("could not write state: {}", e)))
    }
}
