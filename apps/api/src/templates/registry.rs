//! Locates template sources inside the template store and stages their assets.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::RenderError;
use crate::templates::config::TemplateConfig;

pub struct TemplateRegistry {
    store_dir: PathBuf,
}

impl TemplateRegistry {
    pub fn new(store_dir: impl Into<PathBuf>) -> Self {
        Self {
            store_dir: store_dir.into(),
        }
    }

    /// `<store>/<mainFile>`, or the first `.tex` sibling sharing the main file's stem.
    pub fn resolve_main_file(&self, config: &TemplateConfig) -> Result<PathBuf, RenderError> {
        let main_file = &config.metadata.main_file;
        let path = self.store_dir.join(main_file);
        if path.is_file() {
            return Ok(path);
        }

        let dir = path.parent().unwrap_or(&self.store_dir);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let available = list_tex_files(dir);

        if !stem.is_empty() {
            if let Some(alt) = available.iter().find(|name| name.starts_with(&stem)) {
                debug!(
                    template_id = %config.template_id,
                    requested = %main_file,
                    resolved = %alt,
                    "Main file resolved by stem"
                );
                return Ok(dir.join(alt));
            }
        }

        Err(RenderError::TemplateFileNotFound {
            template_id: config.template_id.clone(),
            file: main_file.clone(),
            available,
        })
    }

    /// Copies every non-hidden regular file next to `main_path` into `workspace`.
    pub async fn copy_assets(&self, main_path: &Path, workspace: &Path) -> Result<usize, RenderError> {
        let Some(dir) = main_path.parent() else {
            return Ok(0);
        };
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(RenderError::io("listing template assets"))?;

        let mut copied = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(RenderError::io("listing template assets"))?
        {
            let name = entry.file_name();
            if name.to_string_lossy().starts_with('.') {
                continue;
            }
            let file_type = entry
                .file_type()
                .await
                .map_err(RenderError::io("inspecting template assets"))?;
            if !file_type.is_file() {
                continue;
            }
            tokio::fs::copy(entry.path(), workspace.join(&name))
                .await
                .map_err(RenderError::io(format!(
                    "copying asset {}",
                    name.to_string_lossy()
                )))?;
            copied += 1;
        }
        Ok(copied)
    }
}

/// File name for the generated source: whitespace and anything outside
/// `[A-Za-z0-9._-]` become `_`.
pub fn generated_file_name(main_file: &str) -> String {
    let base = Path::new(main_file)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "main.tex".to_string());
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn list_tex_files(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tex"))
        .collect();
    files.sort();
    files
}
