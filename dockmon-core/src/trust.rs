//! Persisted host-key trust store with trust-on-first-use semantics
//!
//! The store maps hostnames to SHA-256 public-key fingerprints, one
//! record per line. Lookup is a pure in-memory function returning an
//! explicit [`TrustDecision`]; the learn side effect appends to the
//! backing file and is durable before the caller proceeds.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised by the persisted trust store.
///
/// Both are fatal configuration errors, not trust decisions.
#[derive(Debug, Error)]
pub enum TrustStoreError {
    /// Backing file exists but could not be read
    #[error("failed to read trust store '{path}': {source}")]
    Read {
        /// Path that was attempted
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },
    /// A learned record could not be persisted
    #[error("failed to append to trust store '{path}': {source}")]
    Append {
        /// Path that was attempted
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of verifying a presented host key against the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustDecision {
    /// Hostname is known and the fingerprint matches
    Accept,
    /// Hostname is unknown; first-use trust applies
    Learn,
    /// Hostname is known with a *different* fingerprint, a potential
    /// man-in-the-middle signal that is never silently upgraded
    Reject {
        /// Fingerprint on record for this hostname
        recorded: String,
        /// Fingerprint the server presented
        presented: String,
    },
}

/// In-memory view of the persisted host-key records
#[derive(Debug)]
pub struct TrustStore {
    path: PathBuf,
    records: HashMap<String, String>,
}

impl TrustStore {
    /// Loads the record set from `path`.
    ///
    /// A missing file yields an empty store (nothing learned yet).
    /// Malformed lines are skipped with a warning. Duplicate hostnames
    /// keep the first record seen, matching the at-most-one invariant.
    ///
    /// # Errors
    ///
    /// Returns [`TrustStoreError::Read`] if the file exists but cannot
    /// be read.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, TrustStoreError> {
        let path = path.into();
        let mut records = HashMap::new();

        match std::fs::read_to_string(&path) {
            Ok(text) => {
                for line in text.lines() {
                    let mut fields = line.split_whitespace();
                    match (fields.next(), fields.next(), fields.next()) {
                        (Some(host), Some(fingerprint), None) => {
                            records
                                .entry(host.to_string())
                                .or_insert_with(|| fingerprint.to_string());
                        }
                        (None, ..) => {} // blank line
                        _ => {
                            tracing::warn!(path = %path.display(), line, "skipping malformed trust record");
                        }
                    }
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(TrustStoreError::Read { path, source });
            }
        }

        tracing::debug!(path = %path.display(), hosts = records.len(), "trust store loaded");
        Ok(Self { path, records })
    }

    /// Decides whether a presented fingerprint is trusted for `hostname`.
    ///
    /// Pure lookup with no side effects; persistence of a `Learn`
    /// decision happens separately in [`TrustStore::learn`].
    #[must_use]
    pub fn verify(&self, hostname: &str, fingerprint: &str) -> TrustDecision {
        match self.records.get(hostname) {
            None => TrustDecision::Learn,
            Some(recorded) if recorded == fingerprint => TrustDecision::Accept,
            Some(recorded) => TrustDecision::Reject {
                recorded: recorded.clone(),
                presented: fingerprint.to_string(),
            },
        }
    }

    /// Records a first-use fingerprint for `hostname`.
    ///
    /// The record is appended to the backing file and synced to disk
    /// before the in-memory map is updated, so a crash cannot leave a
    /// connection trusted without a durable record. A second
    /// verification of the same host within this process sees the
    /// learned key.
    ///
    /// # Errors
    ///
    /// Returns [`TrustStoreError::Append`] if the record cannot be
    /// persisted; the caller must not proceed with the connection.
    pub fn learn(&mut self, hostname: &str, fingerprint: &str) -> Result<(), TrustStoreError> {
        let append = |path: &Path| -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            writeln!(file, "{hostname} {fingerprint}")?;
            file.sync_all()
        };

        append(&self.path).map_err(|source| TrustStoreError::Append {
            path: self.path.clone(),
            source,
        })?;

        self.records
            .insert(hostname.to_string(), fingerprint.to_string());
        tracing::info!(host = hostname, fingerprint, "learned new host key");
        Ok(())
    }

    /// Number of known hosts
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no host has been learned yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &Path) -> TrustStore {
        TrustStore::load(dir.join("known_hosts")).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(store.is_empty());
    }

    #[test]
    fn test_learn_then_accept() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());

        assert_eq!(store.verify("host1", "SHA256:abc"), TrustDecision::Learn);
        store.learn("host1", "SHA256:abc").unwrap();
        assert_eq!(store.verify("host1", "SHA256:abc"), TrustDecision::Accept);
    }

    #[test]
    fn test_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.learn("host1", "SHA256:abc").unwrap();

        assert_eq!(
            store.verify("host1", "SHA256:def"),
            TrustDecision::Reject {
                recorded: "SHA256:abc".to_string(),
                presented: "SHA256:def".to_string(),
            }
        );
    }

    #[test]
    fn test_learned_record_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.learn("host1", "SHA256:abc").unwrap();
        drop(store);

        let store = store_in(dir.path());
        assert_eq!(store.verify("host1", "SHA256:abc"), TrustDecision::Accept);
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("known_hosts");
        std::fs::write(
            &path,
            "host1 SHA256:abc\nonly-one-field\nhost2 SHA256:def extra junk\n\nhost3 SHA256:ghi\n",
        )
        .unwrap();

        let store = TrustStore::load(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.verify("host1", "SHA256:abc"), TrustDecision::Accept);
        assert_eq!(store.verify("host3", "SHA256:ghi"), TrustDecision::Accept);
        assert_eq!(store.verify("host2", "SHA256:def"), TrustDecision::Learn);
    }

    #[test]
    fn test_duplicate_host_keeps_first_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("known_hosts");
        std::fs::write(&path, "host1 SHA256:abc\nhost1 SHA256:def\n").unwrap();

        let store = TrustStore::load(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.verify("host1", "SHA256:abc"), TrustDecision::Accept);
    }

    #[test]
    fn test_learn_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("known_hosts");
        let mut store = TrustStore::load(&path).unwrap();
        store.learn("host1", "SHA256:abc").unwrap();
        assert!(path.exists());
    }
}
