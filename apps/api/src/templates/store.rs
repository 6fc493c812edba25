//! Template Config Store: loads, validates, and caches `<templateId>.config.json`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{FieldError, RenderError};
use crate::templates::config::{TemplateConfig, TemplateFeatures, TemplateSummary};
use crate::templates::validation::validate_config;

const CONFIG_SUFFIX: &str = ".config.json";

/// Constructed once at startup and shared through `AppState`.
pub struct TemplateConfigStore {
    config_dir: PathBuf,
    cache: DashMap<String, Arc<TemplateConfig>>,
}

impl TemplateConfigStore {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            cache: DashMap::new(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Loads and validates a config, serving repeated lookups from the cache.
    ///
    /// Two concurrent first loads of the same id may both read the file; both
    /// insert equal values, so the race is benign.
    pub fn load_config(&self, template_id: &str) -> Result<Arc<TemplateConfig>, RenderError> {
        if let Some(cached) = self.cache.get(template_id) {
            return Ok(Arc::clone(cached.value()));
        }

        if !is_valid_id(template_id) {
            return Err(RenderError::ConfigNotFound {
                template_id: template_id.to_string(),
            });
        }

        let path = self.config_dir.join(format!("{template_id}{CONFIG_SUFFIX}"));
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RenderError::ConfigNotFound {
                    template_id: template_id.to_string(),
                })
            }
            Err(e) => return Err(RenderError::io(format!("reading {}", path.display()))(e)),
        };

        let config = Arc::new(parse_config(template_id, &raw)?);
        debug!(template_id, "Loaded template config");
        self.cache
            .insert(template_id.to_string(), Arc::clone(&config));
        Ok(config)
    }

    pub fn template_features(&self, template_id: &str) -> Result<TemplateFeatures, RenderError> {
        Ok(self.load_config(template_id)?.features)
    }

    /// Summaries of every loadable config, sorted by file name. Broken configs are skipped.
    pub fn available_templates(&self) -> Result<Vec<TemplateSummary>, RenderError> {
        let entries = match std::fs::read_dir(&self.config_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(dir = %self.config_dir.display(), "Template config directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(RenderError::io("listing template configs")(e)),
        };

        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                name.strip_suffix(CONFIG_SUFFIX).map(str::to_string)
            })
            .collect();
        ids.sort();

        let summaries = ids
            .into_iter()
            .filter_map(|id| match self.load_config(&id) {
                Ok(config) => Some(TemplateSummary::from(config.as_ref())),
                Err(e) => {
                    warn!(template_id = %id, kind = e.kind(), "Skipping template: {e}");
                    None
                }
            })
            .collect();
        Ok(summaries)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Returns whether an entry was evicted.
    pub fn clear_template_cache(&self, template_id: &str) -> bool {
        self.cache.remove(template_id).is_some()
    }
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn parse_config(template_id: &str, raw: &str) -> Result<TemplateConfig, RenderError> {
    let invalid = |errors| RenderError::ConfigInvalid {
        template_id: template_id.to_string(),
        errors,
    };

    let doc: Value = serde_json::from_str(raw)
        .map_err(|e| invalid(vec![FieldError::new("$", format!("invalid JSON: {e}"))]))?;

    let errors = validate_config(&doc);
    if !errors.is_empty() {
        return Err(invalid(errors));
    }

    let config: TemplateConfig = serde_json::from_value(doc)
        .map_err(|e| invalid(vec![FieldError::new("$", e.to_string())]))?;

    if config.template_id != template_id {
        return Err(RenderError::ConfigIdMismatch {
            file_stem: template_id.to_string(),
            declared: config.template_id,
        });
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_config(id: &str) -> Value {
        json!({
            "templateId": id,
            "metadata": { "name": format!("{id} template"), "mainFile": format!("{id}/main.tex") },
            "features": { "supportsFonts": true }
        })
    }

    fn make_store(files: &[(&str, String)]) -> (tempfile::TempDir, TemplateConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in files {
            std::fs::write(dir.path().join(name), body).unwrap();
        }
        let store = TemplateConfigStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_load_valid_config() {
        let (_dir, store) = make_store(&[("alpha.config.json", make_config("alpha").to_string())]);
        let config = store.load_config("alpha").unwrap();
        assert_eq!(config.metadata.name, "alpha template");
        assert!(config.features.supports_fonts);
        assert!(!config.features.supports_custom_colors);
    }

    #[test]
    fn test_missing_config_is_not_found() {
        let (_dir, store) = make_store(&[]);
        let err = store.load_config("ghost").unwrap_err();
        assert_eq!(err.kind(), "config_not_found");
    }

    #[test]
    fn test_path_like_ids_are_not_found() {
        let (_dir, store) = make_store(&[]);
        for id in ["../secret", "a/b", "", "x.y"] {
            assert_eq!(store.load_config(id).unwrap_err().kind(), "config_not_found");
        }
    }

    #[test]
    fn test_id_mismatch() {
        let (_dir, store) = make_store(&[("alpha.config.json", make_config("beta").to_string())]);
        match store.load_config("alpha").unwrap_err() {
            RenderError::ConfigIdMismatch {
                file_stem,
                declared,
            } => {
                assert_eq!(file_stem, "alpha");
                assert_eq!(declared, "beta");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_syntax_error_is_single_field_error() {
        let (_dir, store) = make_store(&[("alpha.config.json", "{ not json".to_string())]);
        match store.load_config("alpha").unwrap_err() {
            RenderError::ConfigInvalid { errors, .. } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].path, "$");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_cache_and_invalidation() {
        let (dir, store) = make_store(&[("alpha.config.json", make_config("alpha").to_string())]);
        let first = store.load_config("alpha").unwrap();

        let mut changed = make_config("alpha");
        changed["metadata"]["name"] = json!("Renamed");
        std::fs::write(dir.path().join("alpha.config.json"), changed.to_string()).unwrap();

        let cached = store.load_config("alpha").unwrap();
        assert!(Arc::ptr_eq(&first, &cached));

        assert!(store.clear_template_cache("alpha"));
        assert!(!store.clear_template_cache("alpha"));
        assert_eq!(store.load_config("alpha").unwrap().metadata.name, "Renamed");

        store.clear_cache();
        assert!(!store.clear_template_cache("alpha"));
    }

    #[test]
    fn test_available_templates_sorted_and_skips_broken() {
        let (_dir, store) = make_store(&[
            ("zeta.config.json", make_config("zeta").to_string()),
            ("alpha.config.json", make_config("alpha").to_string()),
            ("broken.config.json", json!({ "templateId": "broken" }).to_string()),
            ("notes.txt", "ignored".to_string()),
        ]);
        let ids: Vec<String> = store
            .available_templates()
            .unwrap()
            .into_iter()
            .map(|s| s.template_id)
            .collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_template_features() {
        let (_dir, store) = make_store(&[("alpha.config.json", make_config("alpha").to_string())]);
        let features = store.template_features("alpha").unwrap();
        assert!(features.supports_fonts);
        assert!(!features.supports_color_schemes);
    }
}
