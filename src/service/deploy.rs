//! Static resource deployment seam
//!
//! Controls that ship static assets (stylesheets, scripts) deploy them once
//! at application start. Deployment is idempotent: a resource already
//! present at the target is skipped.

use crate::utils::{Result, TrellisError};
use std::fs;
use std::path::PathBuf;

/// Copies named resources into a deployment target, skipping existing files
pub trait ResourceDeployer: Send + Sync {
    /// Deploy `contents` as `name` under `target_dir` if not already present
    fn deploy(&self, name: &str, contents: &[u8], target_dir: &str) -> Result<()>;
}

/// Deployer writing resources below a filesystem root
#[derive(Debug)]
pub struct FileResourceDeployer {
    root: PathBuf,
}

impl FileResourceDeployer {
    /// Create a deployer rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ResourceDeployer for FileResourceDeployer {
    fn deploy(&self, name: &str, contents: &[u8], target_dir: &str) -> Result<()> {
        if name.is_empty() || name.contains("..") {
            return Err(TrellisError::Deploy(format!(
                "illegal resource name '{}'",
                name
            )));
        }
        let dir = self.root.join(target_dir);
        let target = dir.join(name);
        if target.exists() {
            log::debug!("resource {} already deployed", target.display());
            return Ok(());
        }
        fs::create_dir_all(&dir)?;
        fs::write(&target, contents)?;
        log::info!("deployed resource {}", target.display());
        Ok(())
    }
}
