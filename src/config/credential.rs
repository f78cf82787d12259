//! API key storage.
//!
//! The key lives in `<config dir>/credentials`, readable only by the owner.
//! It is resolved once per run: environment first, then the file, then the
//! interactive first-run setup in [`crate::ui::setup`].

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zeroize::{Zeroize, Zeroizing};

use super::ENV_API_KEY;
use crate::error::Result;

pub const CREDENTIALS_FILE: &str = "credentials";

/// An API key that never exposes its value in logs or debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    inner: String,
}

impl Credential {
    /// Returns `None` for empty or whitespace-only keys.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let mut key: String = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            key.zeroize();
            return None;
        }
        let inner = trimmed.to_string();
        key.zeroize();
        Some(Self { inner })
    }

    /// The raw key, for the authorization header only.
    pub fn expose(&self) -> &str {
        &self.inner
    }

    /// Key length (safe to log).
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential([REDACTED])")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED API KEY]")
    }
}

impl Drop for Credential {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

/// Where the active credential came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    File(PathBuf),
    Setup(PathBuf),
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(CREDENTIALS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored key, `None` when the file is absent or blank.
    pub fn load(&self) -> Result<Option<Credential>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = Zeroizing::new(fs::read_to_string(&self.path)?);
        Ok(Credential::new(raw.as_str()))
    }

    /// Persist the key with owner-only permissions (atomic replace).
    pub fn save(&self, credential: &Credential) -> Result<()> {
        ensure_private_dir(&self.path)?;

        let tmp = self.path.with_extension("tmp");
        let data = Zeroizing::new(format!("{}\n", credential.expose()));
        write_private(&tmp, data.as_bytes())?;
        fs::rename(&tmp, &self.path)?;

        info!("credential saved to {}", self.path.display());
        Ok(())
    }

    /// Environment variable first, then the credentials file.
    pub fn resolve(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<(Credential, CredentialSource)>> {
        if let Some(credential) = lookup(ENV_API_KEY).and_then(Credential::new) {
            debug!("using credential from {}", ENV_API_KEY);
            return Ok(Some((credential, CredentialSource::Environment)));
        }
        Ok(self.load()?.map(|credential| {
            debug!(len = credential.len(), "using stored credential");
            (credential, CredentialSource::File(self.path.clone()))
        }))
    }
}

fn ensure_private_dir(path: &Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() || parent.exists() {
        return Ok(());
    }
    fs::create_dir_all(parent)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(parent, fs::Permissions::from_mode(0o700))?;
    }
    Ok(())
}

fn write_private(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    // mode() only applies on creation; tighten a stale temp file as well
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(data)?;
    file.sync_all()
}
