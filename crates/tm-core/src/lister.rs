//! Script discovery over any [`ScriptSource`]

use crate::error::{CoreError, CoreResult};
use crate::script::{MigrationScript, ScriptDescriptor};
use crate::source::ScriptSource;
use crate::version::VersionParser;

/// Lists versioned scripts from a source in apply order
pub struct ResourceLister {
    source: Box<dyn ScriptSource>,
    parser: VersionParser,
}

impl ResourceLister {
    /// Create a lister over `source`, accepting names that `parser` matches
    pub fn new(source: Box<dyn ScriptSource>, parser: VersionParser) -> Self {
        Self { source, parser }
    }

    /// The underlying source
    pub fn source(&self) -> &dyn ScriptSource {
        self.source.as_ref()
    }

    /// List every versioned script, ascending by version.
    ///
    /// Entries that do not follow the naming pattern are skipped. Two scripts
    /// carrying the same version fail with [`CoreError::DuplicateVersion`].
    pub fn list(&self) -> CoreResult<Vec<ScriptDescriptor>> {
        let mut scripts = Vec::new();
        for filename in self.source.entries()? {
            if !self.parser.matches(&filename) {
                log::debug!(
                    "Ignoring '{}' in {}: not a versioned .{} script",
                    filename,
                    self.source.location(),
                    self.parser.extension()
                );
                continue;
            }
            let version = self.parser.extract(&filename)?;
            scripts.push(ScriptDescriptor { version, filename });
        }

        // Filename as tiebreaker keeps the duplicate report stable.
        scripts.sort_by(|a, b| {
            a.version
                .cmp(&b.version)
                .then_with(|| a.filename.cmp(&b.filename))
        });

        if let Some(pair) = scripts.windows(2).find(|w| w[0].version == w[1].version) {
            return Err(CoreError::DuplicateVersion {
                version: pair[0].version,
                first: pair[0].filename.clone(),
                second: pair[1].filename.clone(),
            });
        }

        Ok(scripts)
    }

    /// Read the script behind `descriptor`
    pub fn load(&self, descriptor: &ScriptDescriptor) -> CoreResult<MigrationScript> {
        let raw_text = self.source.read(&descriptor.filename)?;
        Ok(MigrationScript::new(descriptor, raw_text))
    }
}

#[cfg(test)]
#[path = "lister_test.rs"]
mod tests;
