// common/src/session_store.rs
use parking_lot::Mutex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::descriptor::ServiceDescriptor;
use crate::error::{UploaderError, UploaderResult};
use crate::models::session::SessionRecord;

/// Durable home of the single session document.
///
/// Every write replaces the whole document through a temp file and a rename,
/// so a reader sees either the previous record or the new one.
pub struct SessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored record. Absent or unreadable documents load as empty.
    pub fn load(&self) -> SessionRecord {
        let _guard = self.lock.lock();
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Could not read session document {}: {}", self.path.display(), e);
                }
                return SessionRecord::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Ignoring malformed session document: {}", e);
                SessionRecord::default()
            }
        }
    }

    /// Overwrite the stored record, forcing its environment fields from the
    /// current descriptor. Returns the record as written.
    pub fn save(&self, record: SessionRecord, descriptor: &ServiceDescriptor) -> UploaderResult<SessionRecord> {
        let record = record.with_environment(descriptor);
        let body = serde_json::to_vec_pretty(&record)
            .map_err(|e| UploaderError::Storage(e.to_string()))?;

        let _guard = self.lock.lock();
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&body)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        tracing::debug!("Session document written to {}", self.path.display());
        Ok(record)
    }

    /// Read-modify-write. The last writer wins; there is no locking across calls.
    pub fn update<F>(&self, descriptor: &ServiceDescriptor, f: F) -> UploaderResult<SessionRecord>
    where
        F: FnOnce(SessionRecord) -> SessionRecord,
    {
        let current = self.load();
        self.save(f(current), descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> ServiceDescriptor {
        ServiceDescriptor {
            api_key: "current-key".to_string(),
            level_server_url: "https://levels.example.com".to_string(),
        }
    }

    #[test]
    fn test_load_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nothing.json"));
        assert_eq!(store.load(), SessionRecord::default());
    }

    #[test]
    fn test_load_malformed_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(SessionStore::new(&path).load(), SessionRecord::default());
    }

    #[test]
    fn test_save_then_load_forces_environment() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));
        let record = SessionRecord {
            email: "a@x.com".to_string(),
            local_id: "uid-1".to_string(),
            id_token: "tok".to_string(),
            refresh_token: "ref".to_string(),
            owner_username: "Alice".to_string(),
            server_url: "https://forged.example".to_string(),
            api_key: "forged".to_string(),
        };

        store.save(record.clone(), &descriptor()).unwrap();
        let loaded = store.load();

        assert_eq!(
            loaded,
            SessionRecord {
                server_url: "https://levels.example.com".to_string(),
                api_key: "current-key".to_string(),
                ..record
            }
        );
    }

    #[test]
    fn test_update_merges_into_stored_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store
            .save(SessionRecord { email: "a@x.com".to_string(), ..Default::default() }, &descriptor())
            .unwrap();

        let updated = store
            .update(&descriptor(), |r| SessionRecord { owner_username: "bob".to_string(), ..r })
            .unwrap();

        assert_eq!(updated.email, "a@x.com");
        assert_eq!(store.load().owner_username, "bob");
    }
}
