//! Packaged archive medium backed by `rust-embed`

use super::{Medium, ScriptSource};
use crate::error::{CoreError, CoreResult};
use rust_embed::RustEmbed;
use std::marker::PhantomData;

/// Scripts compiled into the binary under a folder prefix.
///
/// The archive keeps no directory entries, so a prefix with no files under it
/// is reported as not found rather than empty.
pub struct EmbeddedSource<E> {
    prefix: String,
    _archive: PhantomData<fn() -> E>,
}

impl<E: RustEmbed> EmbeddedSource<E> {
    /// Open the folder `prefix` inside archive `E` (`""` for its root)
    pub fn open(prefix: &str) -> CoreResult<Self> {
        let source = Self {
            prefix: prefix.trim_matches('/').to_string(),
            _archive: PhantomData,
        };
        if !E::iter().any(|path| source.strip(&path).is_some()) {
            return Err(CoreError::NotFound {
                location: source.location(),
            });
        }
        Ok(source)
    }

    /// Remainder of `path` below the prefix, if it lies under it
    fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        if self.prefix.is_empty() {
            Some(path)
        } else {
            path.strip_prefix(self.prefix.as_str())?.strip_prefix('/')
        }
    }

    fn full_path(&self, filename: &str) -> String {
        if self.prefix.is_empty() {
            filename.to_string()
        } else {
            format!("{}/{}", self.prefix, filename)
        }
    }
}

impl<E: RustEmbed> ScriptSource for EmbeddedSource<E> {
    fn medium(&self) -> Medium {
        Medium::Embedded
    }

    fn location(&self) -> String {
        format!("embedded:{}", self.prefix)
    }

    fn entries(&self) -> CoreResult<Vec<String>> {
        Ok(E::iter()
            .filter_map(|path| {
                self.strip(&path)
                    .filter(|rest| !rest.is_empty() && !rest.contains('/'))
                    .map(String::from)
            })
            .collect())
    }

    fn read(&self, filename: &str) -> CoreResult<String> {
        let file = E::get(&self.full_path(filename)).ok_or_else(|| CoreError::MissingScript {
            filename: filename.to_string(),
        })?;
        String::from_utf8(file.data.into_owned()).map_err(|_| CoreError::InvalidEncoding {
            filename: filename.to_string(),
        })
    }
}
