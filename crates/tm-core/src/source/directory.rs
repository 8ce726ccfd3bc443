//! Filesystem directory medium

use super::{Medium, ScriptSource};
use crate::error::{CoreError, CoreResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Scripts stored as regular files in one directory.
///
/// Only direct children are listed; subdirectories are not descended into.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Open `root`, which must exist and be a directory
    pub fn open(root: &Path) -> CoreResult<Self> {
        if !root.exists() {
            return Err(CoreError::NotFound {
                location: root.display().to_string(),
            });
        }
        if !root.is_dir() {
            return Err(CoreError::UnsupportedMedium {
                location: root.display().to_string(),
                reason: "path exists but is not a directory".to_string(),
            });
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> CoreError {
        CoreError::IoWithPath {
            path: path.display().to_string(),
            source,
        }
    }
}

impl ScriptSource for DirectorySource {
    fn medium(&self) -> Medium {
        Medium::Directory
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn entries(&self) -> CoreResult<Vec<String>> {
        let read_dir = fs::read_dir(&self.root).map_err(|e| self.io_error(&self.root, e))?;

        let mut names = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| self.io_error(&self.root, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => log::debug!("Ignoring non UTF-8 file name {:?}", raw),
            }
        }
        Ok(names)
    }

    fn read(&self, filename: &str) -> CoreResult<String> {
        let path = self.root.join(filename);
        if !path.is_file() {
            return Err(CoreError::MissingScript {
                filename: filename.to_string(),
            });
        }
        let bytes = fs::read(&path).map_err(|e| self.io_error(&path, e))?;
        String::from_utf8(bytes).map_err(|_| CoreError::InvalidEncoding {
            filename: filename.to_string(),
        })
    }
}
