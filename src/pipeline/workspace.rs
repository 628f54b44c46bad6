//! pipeline::workspace — per-bin working directories.
//!
//! Purpose
//! -------
//! Give every time bin a directory (`time_<start>_<stop>`) for the
//! intermediate products its backends write, and clean up afterwards unless
//! the caller asked to keep them.
//!
//! Key behaviors
//! -------------
//! - With a `savedir`, the root is created if missing and everything under
//!   it is kept.
//! - Without one, the root is a `tempfile::TempDir` under `savedir_prefix`
//!   (or the system temp dir); each [`BinDir`] is removed when dropped and
//!   the root when the [`Workspace`] is dropped, on success and on error
//!   alike.
use crate::{
    binning::TimeBin,
    pipeline::errors::{VariabilityError, VariabilityResult},
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

const TEMP_PREFIX: &str = "variability_";

#[derive(Debug)]
enum Root {
    Persistent(PathBuf),
    Temporary(TempDir),
}

#[derive(Debug)]
pub struct Workspace {
    root: Root,
}

impl Workspace {
    /// Errors
    /// ------
    /// - [`VariabilityError::Io`] when a directory cannot be created.
    pub fn new(savedir: Option<&Path>, savedir_prefix: Option<&Path>) -> VariabilityResult<Self> {
        let root = match savedir {
            Some(dir) => {
                fs::create_dir_all(dir).map_err(|e| VariabilityError::io(dir, e))?;
                Root::Persistent(dir.to_path_buf())
            }
            None => {
                let parent =
                    savedir_prefix.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir);
                fs::create_dir_all(&parent).map_err(|e| VariabilityError::io(&parent, e))?;
                let tmp = tempfile::Builder::new()
                    .prefix(TEMP_PREFIX)
                    .tempdir_in(&parent)
                    .map_err(|e| VariabilityError::io(&parent, e))?;
                Root::Temporary(tmp)
            }
        };
        log::debug!("variability workspace at {}", Self::root_of(&root).display());
        Ok(Self { root })
    }

    fn root_of(root: &Root) -> &Path {
        match root {
            Root::Persistent(path) => path,
            Root::Temporary(tmp) => tmp.path(),
        }
    }

    pub fn root(&self) -> &Path {
        Self::root_of(&self.root)
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self.root, Root::Persistent(_))
    }

    /// Create (or reuse) the directory of `bin`.
    ///
    /// Errors
    /// ------
    /// - [`VariabilityError::Io`] when the directory cannot be created.
    pub fn bin_dir(&self, bin: &TimeBin) -> VariabilityResult<BinDir> {
        let path = self.root().join(bin.label());
        fs::create_dir_all(&path).map_err(|e| VariabilityError::io(&path, e))?;
        Ok(BinDir { path, keep: self.is_persistent() })
    }
}

/// Directory of one bin; removed on drop unless persistent.
#[derive(Debug)]
pub struct BinDir {
    path: PathBuf,
    keep: bool,
}

impl BinDir {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for BinDir {
    fn drop(&mut self) {
        if self.keep || !self.path.exists() {
            return;
        }
        log::debug!("removing {}", self.path.display());
        if let Err(err) = fs::remove_dir_all(&self.path) {
            log::warn!("failed to remove {}: {err}", self.path.display());
        }
    }
}
