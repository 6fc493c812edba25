//! Per-job scratch directory under the render temp root.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use tempfile::TempDir;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::RenderError;

pub struct Workspace {
    job_id: Uuid,
    dir: TempDir,
}

impl Workspace {
    /// Creates `<root>/compile_<timestamp>_<job>_XXXXXX`, creating `root` if needed.
    pub async fn create(root: &Path, job_id: Uuid) -> Result<Self, RenderError> {
        tokio::fs::create_dir_all(root)
            .await
            .map_err(RenderError::io(format!("creating temp root {}", root.display())))?;

        let prefix = format!(
            "compile_{}_{}_",
            Utc::now().format("%Y%m%d%H%M%S"),
            job_id.simple()
        );
        let root = root.to_path_buf();
        let dir = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new().prefix(&prefix).tempdir_in(root)
        })
        .await
        .map_err(|e| RenderError::Worker(e.to_string()))?
        .map_err(RenderError::io("creating workspace"))?;

        debug!(job_id = %job_id, path = %dir.path().display(), "Workspace created");
        Ok(Self { job_id, dir })
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Deletes the directory after `grace` on a detached task; failures are only logged.
    pub fn schedule_cleanup(self, grace: Duration) {
        let Workspace { job_id, dir } = self;
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let path = dir.path().to_path_buf();
            match tokio::task::spawn_blocking(move || dir.close()).await {
                Ok(Ok(())) => debug!(job_id = %job_id, "Workspace removed"),
                Ok(Err(e)) => {
                    warn!(job_id = %job_id, path = %path.display(), "Could not remove workspace: {e}")
                }
                Err(e) => warn!(job_id = %job_id, "Workspace cleanup task failed: {e}"),
            }
        });
    }
}
