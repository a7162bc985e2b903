//! Single-instance guard for scheduled runs.
//!
//! The lock is a file holding the owner's pid, created exclusively. A lock
//! older than the stale threshold is assumed abandoned and replaced.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use showwatch_logging::{watch_debug, watch_warn};

/// Held for the lifetime of a run; removes the lock file on drop.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

#[derive(Debug)]
pub enum LockStatus {
    Acquired(RunLock),
    Held { holder: String, age: Duration },
}

impl RunLock {
    pub fn acquire(path: &Path, stale_after: Duration) -> io::Result<LockStatus> {
        if let Some(lock) = Self::try_create(path)? {
            return Ok(LockStatus::Acquired(lock));
        }

        let age = lock_age(path)?;
        if age >= stale_after {
            watch_warn!(
                "Replacing stale lock {:?} ({}s old)",
                path,
                age.as_secs()
            );
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err),
            }
            if let Some(lock) = Self::try_create(path)? {
                return Ok(LockStatus::Acquired(lock));
            }
        }

        let holder = fs::read_to_string(path)
            .map(|raw| raw.trim().to_string())
            .unwrap_or_default();
        Ok(LockStatus::Held { holder, age })
    }

    fn try_create(path: &Path) -> io::Result<Option<Self>> {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(mut file) => {
                writeln!(file, "{}", process::id())?;
                watch_debug!("Acquired lock {:?}", path);
                Ok(Some(Self {
                    path: path.to_path_buf(),
                }))
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        // A run that outlived the stale threshold may have lost the lock.
        let owner = fs::read_to_string(&self.path).unwrap_or_default();
        if owner.trim() != process::id().to_string() {
            watch_warn!(
                "Lock {:?} was taken over (holder {:?}); leaving it in place",
                self.path,
                owner.trim()
            );
            return;
        }
        if let Err(err) = fs::remove_file(&self.path) {
            watch_warn!("Failed to remove lock {:?}: {}", self.path, err);
        }
    }
}

fn lock_age(path: &Path) -> io::Result<Duration> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(modified.elapsed().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{LockStatus, RunLock};

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn second_acquire_sees_holder_until_release() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bms.lock");

        let first = match RunLock::acquire(&path, HOUR).unwrap() {
            LockStatus::Acquired(lock) => lock,
            other => panic!("expected lock, got {other:?}"),
        };
        match RunLock::acquire(&path, HOUR).unwrap() {
            LockStatus::Held { holder, .. } => {
                assert_eq!(holder, std::process::id().to_string())
            }
            other => panic!("expected held, got {other:?}"),
        }

        drop(first);
        assert!(!path.exists());
        assert!(matches!(
            RunLock::acquire(&path, HOUR).unwrap(),
            LockStatus::Acquired(_)
        ));
    }

    #[test]
    fn stale_lock_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bms.lock");
        std::fs::write(&path, "4242\n").unwrap();

        match RunLock::acquire(&path, Duration::ZERO).unwrap() {
            LockStatus::Acquired(_lock) => {
                let owner = std::fs::read_to_string(&path).unwrap();
                assert_eq!(owner.trim(), std::process::id().to_string());
            }
            other => panic!("expected stale lock replaced, got {other:?}"),
        }
    }

    #[test]
    fn superseded_holder_leaves_new_lock_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bms.lock");

        let first = match RunLock::acquire(&path, HOUR).unwrap() {
            LockStatus::Acquired(lock) => lock,
            other => panic!("expected lock, got {other:?}"),
        };
        // Another process replaces the lock once it is considered stale.
        std::fs::write(&path, "4242\n").unwrap();

        drop(first);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "4242\n");
        match RunLock::acquire(&path, HOUR).unwrap() {
            LockStatus::Held { holder, .. } => assert_eq!(holder, "4242"),
            other => panic!("expected held, got {other:?}"),
        }
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent").join("bms.lock");
        assert!(RunLock::acquire(&path, HOUR).is_err());
    }
}
