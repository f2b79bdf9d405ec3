//! Durable single-value storage for the agent's bearer credential.

use crate::error::{PushError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const TOKEN_FILE: &str = "auth_token";
const APP_DIR: &str = "nimbus-agent";

/// File-backed credential store, scoped per agent installation.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Resolves (creating if absent) the per-user configuration directory.
    pub fn open() -> Result<Self> {
        let base = dirs::config_dir().ok_or_else(|| {
            PushError::StorageUnavailable(std::io::Error::new(
                ErrorKind::NotFound,
                "no per-user configuration directory on this platform",
            ))
        })?;
        let dir = base.join(APP_DIR);
        fs::create_dir_all(&dir).map_err(PushError::StorageUnavailable)?;
        Ok(Self::at_dir(dir))
    }

    /// Pins the store to an explicit directory. The directory must exist.
    pub fn at_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(TOKEN_FILE),
        }
    }

    /// Overwrites the stored credential.
    ///
    /// File mode is tightened to owner read/write only; a chmod failure is
    /// logged but does not fail the save.
    pub fn save(&self, token: &str) -> Result<()> {
        fs::write(&self.path, token).map_err(PushError::WriteFailure)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)) {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to restrict credential file mode");
            }
        }

        tracing::debug!(path = %self.path.display(), "saved auth token");
        Ok(())
    }

    /// Reads the stored credential verbatim.
    pub fn load(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(token) => Ok(token),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(PushError::CredentialMissing),
            Err(e) => Err(PushError::ReadFailure(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_round_trips_verbatim() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = TokenStore::at_dir(tmp.path());

        store.save("  tok-with-spaces \n").expect("save");
        assert_eq!(store.load().expect("load"), "  tok-with-spaces \n");
    }

    #[test]
    fn load_without_prior_save_is_credential_missing() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = TokenStore::at_dir(tmp.path());

        assert!(matches!(store.load(), Err(PushError::CredentialMissing)));
    }

    #[test]
    fn save_overwrites_previous_credential() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = TokenStore::at_dir(tmp.path());

        store.save("tok-old").expect("save old");
        store.save("tok-new").expect("save new");
        assert_eq!(store.load().expect("load"), "tok-new");
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_read_write_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().expect("tempdir");
        let store = TokenStore::at_dir(tmp.path());
        store.save("tok-a").expect("save");

        let mode = std::fs::metadata(tmp.path().join("auth_token"))
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
