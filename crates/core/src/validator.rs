//! Security checks for directories and filenames
//!
//! Every path the rename engine touches goes through [`PathValidator`] first:
//! directories are checked for existence, permissions and whitelist membership,
//! and filenames are rejected if they could escape the directory.

use crate::error::{Error, Result, ResultExt};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Validates directories against an optional whitelist and filenames against
/// traversal and injection rules
#[derive(Debug, Clone, Default)]
pub struct PathValidator {
    whitelist: Option<Vec<PathBuf>>,
}

impl PathValidator {
    /// Create a validator without a whitelist
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator that only accepts directories inside `whitelist`
    pub fn with_whitelist(whitelist: Vec<PathBuf>) -> Self {
        Self {
            whitelist: Some(whitelist),
        }
    }

    /// Configured whitelist, if any
    pub fn whitelist(&self) -> Option<&[PathBuf]> {
        self.whitelist.as_deref()
    }

    /// Check that `path` is an existing, readable and writable directory that
    /// falls inside the whitelist
    ///
    /// Returns the symlink-resolved directory on success.
    pub fn validate_directory(&self, path: &Path) -> Result<PathBuf> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::DirectoryNotFound(path.to_path_buf()))
            }
            Err(e) => {
                return Err(Error::with_context(
                    format!("Failed to inspect {}", path.display()),
                    e,
                ))
            }
        };

        if !metadata.is_dir() {
            return Err(Error::NotADirectory(path.to_path_buf()));
        }

        if !is_readable(path) {
            return Err(Error::NoReadPermission(path.to_path_buf()));
        }

        if !is_writable(path, &metadata) {
            return Err(Error::NoWritePermission(path.to_path_buf()));
        }

        let resolved = fs::canonicalize(path)
            .context(format!("Failed to resolve {}", path.display()))?;

        if let Some(whitelist) = &self.whitelist {
            let allowed = whitelist
                .iter()
                .map(|entry| resolve_lenient(entry))
                .any(|entry| is_within(&resolved, &entry));

            if !allowed {
                warn!("Rejected directory outside whitelist: {}", path.display());
                return Err(Error::OutsideWhitelist(path.to_path_buf()));
            }
        }

        debug!("Validated directory: {}", resolved.display());
        Ok(resolved)
    }

    /// Reject filenames that are empty, contain separators or control
    /// characters, or look like traversal attempts
    pub fn sanitize_filename(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::EmptyFilename);
        }

        if name.contains('\0') {
            return Err(Error::invalid_filename("Contains null bytes"));
        }

        if name.contains('/') || name.contains('\\') {
            return Err(Error::invalid_filename("Contains path separators"));
        }

        let trimmed = name.trim();
        if trimmed == "."
            || trimmed == ".."
            || trimmed.starts_with("..")
            || name.contains("/..")
            || name.contains("..\\")
        {
            return Err(Error::invalid_filename("Path traversal attempt"));
        }

        if name.contains("...") {
            return Err(Error::invalid_filename("Invalid dot sequence"));
        }

        if name.chars().any(|c| (c as u32) < 32) {
            return Err(Error::invalid_filename("Contains control characters"));
        }

        Ok(())
    }

    /// Check that `file` resolves to `directory` itself or something inside it
    pub fn validate_within_directory(file: &Path, directory: &Path) -> Result<()> {
        let resolved_file =
            fs::canonicalize(file).context(format!("Failed to resolve {}", file.display()))?;
        let resolved_dir = fs::canonicalize(directory)
            .context(format!("Failed to resolve {}", directory.display()))?;

        if is_within(&resolved_file, &resolved_dir) {
            Ok(())
        } else {
            Err(Error::invalid_filename("Resolves outside directory"))
        }
    }
}

/// Component-wise containment, so `/allowed-other` is never inside `/allowed`
fn is_within(candidate: &Path, root: &Path) -> bool {
    candidate == root || candidate.starts_with(root)
}

/// Resolve symlinks where possible, keeping the path as given otherwise
fn resolve_lenient(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(unix)]
fn access(path: &Path, mode: libc::c_int) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    match CString::new(path.as_os_str().as_bytes()) {
        // SAFETY: `c_path` is a valid NUL-terminated string for the duration of the call.
        Ok(c_path) => unsafe { libc::access(c_path.as_ptr(), mode) == 0 },
        Err(_) => false,
    }
}

#[cfg(unix)]
fn is_readable(path: &Path) -> bool {
    access(path, libc::R_OK | libc::X_OK)
}

#[cfg(unix)]
fn is_writable(path: &Path, _metadata: &fs::Metadata) -> bool {
    access(path, libc::W_OK | libc::X_OK)
}

#[cfg(not(unix))]
fn is_readable(path: &Path) -> bool {
    fs::read_dir(path).is_ok()
}

#[cfg(not(unix))]
fn is_writable(_path: &Path, metadata: &fs::Metadata) -> bool {
    !metadata.permissions().readonly()
}
