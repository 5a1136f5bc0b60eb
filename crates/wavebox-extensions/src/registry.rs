//! Extension registry
//!
//! In-memory map of extension id -> runtime.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

use crate::error::ExtensionError;
use crate::runtime::{ContentScriptGuestConfig, ExtensionRuntime, RuntimeConfig};
use crate::{Result, EXTENSION_PROTOCOL};

pub struct ExtensionRegistry {
    runtimes: Arc<RwLock<HashMap<String, ExtensionRuntime>>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self {
            runtimes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Ids double as the host of extension URLs, so they must be a plain
    /// lowercase host label.
    pub fn is_valid_id(extension_id: &str) -> bool {
        !extension_id.is_empty()
            && extension_id.len() <= 63
            && extension_id
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    }

    pub fn install(&self, runtime: ExtensionRuntime) -> Result<()> {
        if !Self::is_valid_id(&runtime.extension_id) {
            return Err(ExtensionError::InvalidId(runtime.extension_id));
        }

        tracing::info!(
            extension_id = %runtime.extension_id,
            name = %runtime.name,
            version = %runtime.version,
            "Installed extension runtime"
        );

        self.runtimes
            .write()
            .insert(runtime.extension_id.clone(), runtime);
        Ok(())
    }

    pub fn uninstall(&self, extension_id: &str) -> Option<ExtensionRuntime> {
        let removed = self.runtimes.write().remove(extension_id);
        if removed.is_some() {
            tracing::info!(extension_id = %extension_id, "Removed extension runtime");
        }
        removed
    }

    pub fn get(&self, extension_id: &str) -> Option<ExtensionRuntime> {
        self.runtimes.read().get(extension_id).cloned()
    }

    pub fn list(&self) -> Vec<ExtensionRuntime> {
        let mut runtimes: Vec<ExtensionRuntime> = self.runtimes.read().values().cloned().collect();
        runtimes.sort_by(|a, b| a.extension_id.cmp(&b.extension_id));
        runtimes
    }

    pub fn has_runtime(&self, extension_id: &str) -> bool {
        self.runtimes.read().contains_key(extension_id)
    }

    pub fn content_script_runtime_config(&self, extension_id: &str) -> Option<RuntimeConfig> {
        self.runtimes
            .read()
            .get(extension_id)
            .map(ExtensionRuntime::runtime_config)
    }

    pub fn background_page_id(&self, extension_id: &str) -> Option<u32> {
        self.runtimes
            .read()
            .get(extension_id)
            .and_then(|runtime| runtime.background_page)
    }

    pub fn set_background_page(&self, extension_id: &str, contents_id: Option<u32>) -> Result<()> {
        let mut runtimes = self.runtimes.write();
        let runtime = runtimes
            .get_mut(extension_id)
            .ok_or_else(|| ExtensionError::NotFound(extension_id.to_string()))?;
        runtime.background_page = contents_id;
        Ok(())
    }

    /// Forget a content context that hosted background pages. Returns the
    /// extensions it was hosting.
    pub fn clear_background_page(&self, contents_id: u32) -> Vec<String> {
        let mut cleared: Vec<String> = self
            .runtimes
            .write()
            .values_mut()
            .filter(|runtime| runtime.background_page == Some(contents_id))
            .map(|runtime| {
                runtime.background_page = None;
                runtime.extension_id.clone()
            })
            .collect();
        cleared.sort();
        cleared
    }

    /// Content script configs for every runtime that injects into guests
    pub fn content_script_guest_configs(&self) -> Vec<ContentScriptGuestConfig> {
        let mut configs: Vec<ContentScriptGuestConfig> = self
            .runtimes
            .read()
            .values()
            .filter(|runtime| !runtime.content_scripts.is_empty())
            .map(|runtime| ContentScriptGuestConfig {
                extension_id: runtime.extension_id.clone(),
                content_scripts: runtime.content_scripts.clone(),
            })
            .collect();
        configs.sort_by(|a, b| a.extension_id.cmp(&b.extension_id));
        configs
    }

    pub fn extension_url(extension_id: &str, path: &str) -> Result<Url> {
        if !Self::is_valid_id(extension_id) {
            return Err(ExtensionError::InvalidId(extension_id.to_string()));
        }
        let base = Url::parse(&format!("{}://{}/", EXTENSION_PROTOCOL, extension_id))?;
        Ok(base.join(path.trim_start_matches('/'))?)
    }

    pub fn len(&self) -> usize {
        self.runtimes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.runtimes.read().is_empty()
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ExtensionRegistry {
    fn clone(&self) -> Self {
        Self {
            runtimes: Arc::clone(&self.runtimes),
        }
    }
}
