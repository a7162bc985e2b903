use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use showwatch_core::WatchTarget;
use showwatch_logging::watch_debug;
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read state file {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("malformed state file {path:?}: {source}")]
    Format {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize state: {0}")]
    Serialize(serde_json::Error),
    #[error("failed to write state file {path:?}: {source}")]
    Write { path: PathBuf, source: PersistError },
}

/// Durable record of the tracked targets.
pub trait StateStore: Send + Sync {
    fn load(&self) -> Result<Vec<WatchTarget>, StateError>;
    fn save(&self, targets: &[WatchTarget]) -> Result<(), StateError>;
}

/// Pretty-printed JSON array of targets, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> Result<Vec<WatchTarget>, StateError> {
        let content = fs::read_to_string(&self.path).map_err(|source| StateError::Read {
            path: self.path.clone(),
            source,
        })?;
        let targets: Vec<WatchTarget> =
            serde_json::from_str(&content).map_err(|source| StateError::Format {
                path: self.path.clone(),
                source,
            })?;
        watch_debug!("Loaded {} targets from {:?}", targets.len(), self.path);
        Ok(targets)
    }

    fn save(&self, targets: &[WatchTarget]) -> Result<(), StateError> {
        let content = to_pretty_json(targets).map_err(StateError::Serialize)?;
        AtomicFileWriter::new(&self.path)
            .write(&content)
            .map_err(|source| StateError::Write {
                path: self.path.clone(),
                source,
            })?;
        watch_debug!("Saved {} targets to {:?}", targets.len(), self.path);
        Ok(())
    }
}

fn to_pretty_json(targets: &[WatchTarget]) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    targets.serialize(&mut serializer)?;
    // serde_json only ever emits valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
