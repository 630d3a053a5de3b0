use std::fs;
use std::path::{Path, PathBuf};

use dblink_core::err::{ConnectorError, Context, Result};
use dblink_logging::debug;

/// Suffix of the driver artifacts loaded into the bridge class path
const ARTIFACT_SUFFIX: &str = ".jar";

/// The ordered set of driver artifacts resolved from a configured path
#[derive(Debug, Clone, PartialEq)]
pub struct DriverArtifactSet {
    artifacts: Vec<PathBuf>,
}

impl DriverArtifactSet {
    /// Resolves the driver artifacts named by the supplied path.
    ///
    /// A directory resolves to its direct children with the artifact suffix
    /// (case-insensitive), sorted so the set is deterministic for the same
    /// directory contents. A regular file resolves to itself.
    pub fn resolve(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConnectorError::ConfigInvalid(format!(
                "driver path does not exist: {}",
                path.display()
            ))
            .into());
        }

        if !path.is_dir() {
            return Ok(Self {
                artifacts: vec![path.to_path_buf()],
            });
        }

        let entries =
            fs::read_dir(path).context(format!("Failed to read files in {}", path.display()))?;

        let mut artifacts = vec![];
        for entry in entries {
            let file = entry.context("Failed to read directory entry")?.path();

            let is_artifact = file.is_file()
                && file
                    .file_name()
                    .map(|name| {
                        name.to_string_lossy()
                            .to_lowercase()
                            .ends_with(ARTIFACT_SUFFIX)
                    })
                    .unwrap_or(false);

            if is_artifact {
                artifacts.push(file);
            }
        }

        if artifacts.is_empty() {
            return Err(ConnectorError::ConfigInvalid(format!(
                "no driver artifacts found in {}",
                path.display()
            ))
            .into());
        }

        artifacts.sort();
        debug!("Resolved driver artifacts: {:?}", artifacts);

        Ok(Self { artifacts })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.artifacts
    }

    /// The artifacts joined into a JVM class path string
    pub fn class_path(&self) -> String {
        self.artifacts
            .iter()
            .map(|path| path.to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join(":")
    }
}
