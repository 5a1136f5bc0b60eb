//! Unpacked extension loading
//!
//! Each extension lives in `<root>/<extension id>/manifest.json`, with
//! optional locale messages under `_locales/<default_locale>/messages.json`.

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use crate::error::ExtensionError;
use crate::registry::ExtensionRegistry;
use crate::runtime::{ContentScript, ExtensionRuntime, RunAt};
use crate::Result;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Deserialize)]
struct Manifest {
    name: String,
    version: String,
    #[serde(default)]
    default_locale: Option<String>,
    #[serde(default)]
    content_scripts: Vec<ManifestContentScript>,
    #[serde(default)]
    background: Option<ManifestBackground>,
}

/// Manifest keys are snake_case, unlike what preloads receive
#[derive(Debug, Deserialize)]
struct ManifestContentScript {
    matches: Vec<String>,
    #[serde(default)]
    js: Vec<String>,
    #[serde(default)]
    css: Vec<String>,
    #[serde(default)]
    run_at: RunAt,
    #[serde(default)]
    all_frames: bool,
}

#[derive(Debug, Deserialize)]
struct ManifestBackground {
    page: Option<String>,
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|source| ExtensionError::InvalidManifest {
        path: path.display().to_string(),
        source,
    })
}

impl ExtensionRuntime {
    /// Build a runtime from an unpacked extension directory. The directory
    /// name is the extension id.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let extension_id = dir
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| ExtensionRegistry::is_valid_id(name))
            .ok_or_else(|| ExtensionError::InvalidId(dir.display().to_string()))?
            .to_string();

        let manifest_path = dir.join(MANIFEST_FILE);
        let raw = read_json(&manifest_path)?;
        let manifest: Manifest =
            serde_json::from_value(raw.clone()).map_err(|source| ExtensionError::InvalidManifest {
                path: manifest_path.display().to_string(),
                source,
            })?;

        let messages = match &manifest.default_locale {
            Some(locale) => {
                let path = dir.join("_locales").join(locale).join("messages.json");
                if path.exists() {
                    read_json(&path)?
                } else {
                    Value::Object(Default::default())
                }
            }
            None => Value::Object(Default::default()),
        };

        Ok(Self {
            extension_id,
            name: manifest.name,
            version: manifest.version,
            manifest: raw,
            messages,
            content_scripts: manifest
                .content_scripts
                .into_iter()
                .map(|script| ContentScript {
                    matches: script.matches,
                    js: script.js,
                    css: script.css,
                    run_at: script.run_at,
                    all_frames: script.all_frames,
                })
                .collect(),
            background_path: manifest.background.and_then(|background| background.page),
            background_page: None,
        })
    }
}

impl ExtensionRegistry {
    /// Install every extension under `root`. A missing root is empty;
    /// extensions that fail to load are skipped.
    pub fn load_dir(&self, root: &Path) -> Result<usize> {
        if !root.exists() {
            return Ok(0);
        }

        let mut dirs: Vec<_> = std::fs::read_dir(root)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        dirs.sort();

        let mut loaded = 0;
        for dir in dirs {
            match ExtensionRuntime::from_dir(&dir).and_then(|runtime| self.install(runtime)) {
                Ok(()) => loaded += 1,
                Err(e) => {
                    tracing::warn!(path = %dir.display(), error = %e, "Skipping extension");
                }
            }
        }

        tracing::info!(root = %root.display(), loaded, "Loaded extensions");
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_extension(root: &Path, id: &str, manifest: &str) {
        let dir = root.join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(MANIFEST_FILE), manifest).unwrap();
    }

    #[test]
    fn test_from_dir_reads_manifest_and_messages() {
        let root = tempfile::tempdir().unwrap();
        write_extension(
            root.path(),
            "grammar",
            r#"{
                "name": "Grammar",
                "version": "2.1.0",
                "default_locale": "en",
                "background": {"page": "background.html"},
                "content_scripts": [
                    {"matches": ["https://mail.google.com/*"], "js": ["cs.js"], "run_at": "document_start"}
                ]
            }"#,
        );
        let locale = root.path().join("grammar/_locales/en");
        fs::create_dir_all(&locale).unwrap();
        fs::write(locale.join("messages.json"), r#"{"title": {"message": "Grammar"}}"#).unwrap();

        let runtime = ExtensionRuntime::from_dir(&root.path().join("grammar")).unwrap();
        assert_eq!(runtime.extension_id, "grammar");
        assert_eq!(runtime.version, "2.1.0");
        assert_eq!(runtime.manifest["name"], "Grammar");
        assert_eq!(runtime.messages["title"]["message"], "Grammar");
        assert_eq!(runtime.background_path.as_deref(), Some("background.html"));
        assert_eq!(runtime.content_scripts.len(), 1);
        assert_eq!(runtime.content_scripts[0].run_at, RunAt::DocumentStart);
    }

    #[test]
    fn test_load_dir_skips_broken_extensions() {
        let root = tempfile::tempdir().unwrap();
        write_extension(root.path(), "good", r#"{"name": "Good", "version": "1"}"#);
        write_extension(root.path(), "broken", "{not json");
        write_extension(root.path(), "Bad Id", r#"{"name": "Bad", "version": "1"}"#);

        let registry = ExtensionRegistry::new();
        assert_eq!(registry.load_dir(root.path()).unwrap(), 1);
        assert!(registry.has_runtime("good"));
        assert!(!registry.has_runtime("broken"));
    }

    #[test]
    fn test_missing_root_is_empty() {
        let root = tempfile::tempdir().unwrap();
        let registry = ExtensionRegistry::new();
        assert_eq!(registry.load_dir(&root.path().join("extensions")).unwrap(), 0);
        assert!(registry.is_empty());
    }
}
