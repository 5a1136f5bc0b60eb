//! Extension runtime data structures

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunAt {
    DocumentStart,
    #[default]
    DocumentIdle,
    DocumentEnd,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentScript {
    /// Match patterns the script is injected into
    pub matches: Vec<String>,
    #[serde(default)]
    pub js: Vec<String>,
    #[serde(default)]
    pub css: Vec<String>,
    #[serde(default)]
    pub run_at: RunAt,
    #[serde(default)]
    pub all_frames: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionRuntime {
    pub extension_id: String,
    pub name: String,
    pub version: String,
    /// Raw manifest, passed through to content scripts
    pub manifest: serde_json::Value,
    /// Locale messages for `chrome.i18n`
    #[serde(default)]
    pub messages: serde_json::Value,
    #[serde(default)]
    pub content_scripts: Vec<ContentScript>,
    /// Page the manifest declares as its background page
    #[serde(default)]
    pub background_path: Option<String>,
    /// Content context id hosting the background page, once it is running
    #[serde(default)]
    pub background_page: Option<u32>,
}

impl ExtensionRuntime {
    pub fn new(extension_id: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            extension_id: extension_id.into(),
            name: name.into(),
            version: version.into(),
            manifest: serde_json::Value::Object(Default::default()),
            messages: serde_json::Value::Object(Default::default()),
            content_scripts: Vec::new(),
            background_path: None,
            background_page: None,
        }
    }

    pub fn with_content_script(mut self, script: ContentScript) -> Self {
        self.content_scripts.push(script);
        self
    }

    pub fn with_background_path(mut self, path: impl Into<String>) -> Self {
        self.background_path = Some(path.into());
        self
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            extension_id: self.extension_id.clone(),
            manifest: self.manifest.clone(),
            messages: self.messages.clone(),
        }
    }
}

/// What a content script needs to stand up its `chrome.runtime` shim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub extension_id: String,
    pub manifest: serde_json::Value,
    pub messages: serde_json::Value,
}

/// Content scripts a guest page should evaluate for one extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentScriptGuestConfig {
    pub extension_id: String,
    pub content_scripts: Vec<ContentScript>,
}
