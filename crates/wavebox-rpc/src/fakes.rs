//! In-memory collaborators for router tests

use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use wavebox_extensions::{ContentScriptGuestConfig, ExtensionRegistry, RuntimeConfig};
use wavebox_settings::{NotificationPermission, ProxySettings};

use crate::error::RpcError;
use crate::payload::{OpenExternalOptions, PackageManager, ReadingItem, RecentItem};
use crate::router::RpcRouter;
use crate::services::{
    ContentHost, ExtensionRuntimes, ExternalOpener, LinkOpener, NotificationPermissions,
    PlatformInfo, Relauncher, Services, SettingsProvider, UpdateCapabilities, UserProvider,
};
use crate::session::SessionId;
use crate::Result;

#[derive(Default)]
pub(crate) struct Fake {
    /// Every fallible call errors while set
    pub fail: AtomicBool,
    pub proxy: Mutex<ProxySettings>,
    pub proxy_writes: Mutex<Vec<ProxySettings>>,
    pub extensions: ExtensionRegistry,
    pub urls: Mutex<HashMap<SessionId, String>>,
    pub host_urls: Mutex<HashMap<SessionId, String>>,
    pub destroyed: Mutex<HashSet<SessionId>>,
    pub sent: Mutex<Vec<(SessionId, String, Value)>>,
    pub opened_links: Mutex<Vec<(SessionId, String, String)>>,
    pub opened_external: Mutex<Vec<String>>,
    /// `None` makes the lookup fail
    pub package_manager: Mutex<Option<PackageManager>>,
    pub relaunches: AtomicUsize,
    pub probes: AtomicUsize,
}

impl Fake {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn router(self: &Arc<Self>) -> RpcRouter {
        RpcRouter::new(Services {
            settings: self.clone(),
            user: self.clone(),
            extensions: self.clone(),
            notifications: self.clone(),
            host: self.clone(),
            links: self.clone(),
            shell: self.clone(),
            updates: self.clone(),
            relauncher: self.clone(),
            platform: PlatformInfo {
                platform: "testos".to_string(),
                arch: "x64".to_string(),
                os_release: "1.0".to_string(),
            },
        })
    }

    pub fn set_url(&self, session: SessionId, url: &str) {
        self.urls.lock().insert(session, url.to_string());
    }

    pub fn set_host_url(&self, session: SessionId, url: &str) {
        self.host_urls.lock().insert(session, url.to_string());
    }

    pub fn destroy(&self, session: SessionId) {
        self.destroyed.lock().insert(session);
    }

    /// Wait until a deferred reply has checked the sender's liveness
    pub async fn wait_for_probe(&self) {
        for _ in 0..500 {
            if self.probes.load(Ordering::SeqCst) > 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("deferred reply never probed the sender");
    }

    /// Wait for a reply sent from a thread outside any runtime
    pub fn wait_for_reply_blocking(&self) {
        for _ in 0..500 {
            if !self.sent.lock().is_empty() {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("deferred reply never arrived");
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RpcError::Provider("forced failure".to_string()));
        }
        Ok(())
    }
}

impl SettingsProvider for Fake {
    fn launch_settings(&self) -> Result<Value> {
        self.check()?;
        Ok(json!({"app": {"proxyMode": "disabled"}}))
    }

    fn proxy_settings(&self) -> Result<ProxySettings> {
        self.check()?;
        Ok(self.proxy.lock().clone())
    }

    fn set_proxy_settings(&self, proxy: ProxySettings) -> Result<()> {
        self.check()?;
        self.proxy_writes.lock().push(proxy);
        Ok(())
    }
}

impl UserProvider for Fake {
    fn launch_settings(&self) -> Result<Value> {
        self.check()?;
        Ok(json!({"clientId": "client-1", "analyticsEnabled": true}))
    }
}

impl ExtensionRuntimes for Fake {
    fn has_runtime(&self, extension_id: &str) -> Result<bool> {
        self.check()?;
        Ok(self.extensions.has_runtime(extension_id))
    }

    fn content_script_runtime_config(&self, extension_id: &str) -> Result<Option<RuntimeConfig>> {
        self.check()?;
        Ok(self.extensions.content_script_runtime_config(extension_id))
    }

    fn background_page_id(&self, extension_id: &str) -> Result<Option<SessionId>> {
        self.check()?;
        Ok(self.extensions.background_page_id(extension_id).map(SessionId))
    }

    fn content_script_guest_configs(&self) -> Result<Vec<ContentScriptGuestConfig>> {
        self.check()?;
        Ok(self.extensions.content_script_guest_configs())
    }
}

impl NotificationPermissions for Fake {
    fn permission_for(&self, _session: SessionId, url: Option<&str>) -> Result<NotificationPermission> {
        self.check()?;
        Ok(match url {
            Some(_) => NotificationPermission::Granted,
            None => NotificationPermission::Default,
        })
    }
}

impl ContentHost for Fake {
    fn url(&self, session: SessionId) -> Option<String> {
        self.urls.lock().get(&session).cloned()
    }

    fn host_url(&self, session: SessionId) -> Option<String> {
        self.host_urls.lock().get(&session).cloned()
    }

    fn is_destroyed(&self, session: SessionId) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.destroyed.lock().contains(&session)
    }

    fn send(&self, session: SessionId, channel: &str, payload: Value) -> Result<()> {
        self.sent.lock().push((session, channel.to_string(), payload));
        Ok(())
    }
}

impl LinkOpener for Fake {
    fn open_recent_link(&self, session: SessionId, service_id: &str, item: &RecentItem) -> Result<()> {
        self.check()?;
        self.opened_links
            .lock()
            .push((session, service_id.to_string(), item.url.clone()));
        Ok(())
    }

    fn open_reading_queue_link(
        &self,
        session: SessionId,
        service_id: &str,
        item: &ReadingItem,
    ) -> Result<()> {
        self.check()?;
        self.opened_links
            .lock()
            .push((session, service_id.to_string(), item.url.clone()));
        Ok(())
    }
}

impl ExternalOpener for Fake {
    fn open_external(&self, url: &str, _options: &OpenExternalOptions) -> Result<()> {
        self.check()?;
        self.opened_external.lock().push(url.to_string());
        Ok(())
    }
}

impl UpdateCapabilities for Fake {
    fn os_package_manager(&self) -> Result<PackageManager> {
        (*self.package_manager.lock())
            .ok_or_else(|| RpcError::Provider("package manager lookup failed".to_string()))
    }

    fn autoupdater_supported(&self) -> bool {
        true
    }
}

impl Relauncher for Fake {
    fn relaunch(&self) {
        self.relaunches.fetch_add(1, Ordering::SeqCst);
    }
}

/// Counts ERROR events
struct ErrorCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn error_subscriber(count: Arc<AtomicUsize>) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry().with(ErrorCounter(count))
}

/// Run `f` and report how many errors it logged on this thread
pub(crate) fn capture_errors<T>(f: impl FnOnce() -> T) -> (T, usize) {
    let count = Arc::new(AtomicUsize::new(0));
    let out = tracing::subscriber::with_default(error_subscriber(Arc::clone(&count)), f);
    (out, count.load(Ordering::SeqCst))
}

/// Count errors logged on this thread until the guard drops. Covers tasks
/// polled by a current-thread runtime.
pub(crate) fn count_errors() -> (DefaultGuard, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let guard = tracing::subscriber::set_default(error_subscriber(Arc::clone(&count)));
    (guard, count)
}
