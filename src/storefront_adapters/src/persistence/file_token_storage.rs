use std::{
    fs, io,
    path::{Path, PathBuf},
};

use storefront_core::{BearerToken, TokenStorage, TokenStorageError};

/// Keeps the bearer token in a single file.
///
/// Writes go through a sibling temporary file and a rename, so a crash never
/// leaves half a token behind.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<BearerToken>, TokenStorageError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(TokenStorageError::Io(e.to_string())),
        };
        let raw =
            String::from_utf8(bytes).map_err(|e| TokenStorageError::Corrupt(e.to_string()))?;
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        BearerToken::parse(raw)
            .map(Some)
            .map_err(|e| TokenStorageError::Corrupt(e.to_string()))
    }

    #[tracing::instrument(name = "FileTokenStorage::store", skip(self, token), fields(path = %self.path.display()))]
    fn store(&self, token: &BearerToken) -> Result<(), TokenStorageError> {
        let io_error = |e: io::Error| TokenStorageError::Io(e.to_string());
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let staging = self.staging_path();
        fs::write(&staging, token.expose()).map_err(io_error)?;
        restrict_permissions(&staging).map_err(io_error)?;
        fs::rename(&staging, &self.path).map_err(io_error)
    }

    fn clear(&self) -> Result<(), TokenStorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TokenStorageError::Io(e.to_string())),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}
