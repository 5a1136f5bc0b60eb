//! Channel handlers
//!
//! One function per channel. Handlers decode their arguments, consult the
//! injected services and either return the response or arrange for it to
//! be delivered later. They never check the connection registry; the
//! router has already done so by the time they run.

use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::runtime::Handle;
use url::Url;

use wavebox_extensions::EXTENSION_PROTOCOL;
use wavebox_settings::ProxySettings;

use crate::channel::Channel;
use crate::error::RpcError;
use crate::payload::{
    Args, ExtensionPreloadConfig, GuestPreloadConfig, OpenExternalOptions, PackageManager,
    ReadingItem, RecentItem, SetProxyArgs, UpdaterConfig,
};
use crate::router::{Response, RELAUNCH_DELAY};
use crate::services::{ContentHost, Relauncher, Services, UpdateCapabilities};
use crate::session::SessionId;
use crate::Result;

/// Everything a handler may touch for one request
pub struct HandlerContext<'a> {
    pub channel: Channel,
    pub services: &'a Services,
}

impl<'a> HandlerContext<'a> {
    fn args<'v>(&self, values: &'v [Value]) -> Args<'v> {
        Args::new(self.channel, values)
    }
}

pub type Handler = fn(&HandlerContext<'_>, SessionId, &[Value]) -> Result<Response>;

/// The fixed channel -> handler table
pub(crate) fn table() -> [(Channel, Handler); 9] {
    [
        (Channel::GetGuestPreloadConfig, get_guest_preload_config),
        (
            Channel::GetExtensionContentScriptPreloadConfig,
            get_extension_content_script_preload_config,
        ),
        (
            Channel::GetExtensionHostedPreloadConfig,
            get_extension_hosted_preload_config,
        ),
        (Channel::OpenRecentLink, open_recent_link),
        (Channel::OpenReadingQueueLink, open_reading_queue_link),
        (Channel::OpenExternal, open_external),
        (Channel::GetUpdaterConfig, get_updater_config),
        (Channel::GetProxySettings, get_proxy_settings),
        (Channel::SetProxySettings, set_proxy_settings),
    ]
}

fn is_blank_url(url: &str) -> bool {
    let url = url.trim();
    url.is_empty() || url == "about:blank"
}

/// The page URL, or the URL the context was created for while the page is
/// still blank
fn resolved_url(host: &dyn ContentHost, session: SessionId, current: Option<String>) -> Option<String> {
    current
        .filter(|url| !is_blank_url(url))
        .or_else(|| host.host_url(session))
        .filter(|url| !is_blank_url(url))
}

// === Preload ===

fn get_guest_preload_config(
    ctx: &HandlerContext<'_>,
    sender: SessionId,
    values: &[Value],
) -> Result<Response> {
    let current_url: Option<String> = ctx.args(values).optional(0, "currentUrl")?;
    let services = ctx.services;

    let initial_host_url = resolved_url(services.host.as_ref(), sender, current_url);
    let notification_permission = services
        .notifications
        .permission_for(sender, initial_host_url.as_deref())?;

    let config = GuestPreloadConfig {
        launch_settings: services.settings.launch_settings()?,
        launch_user_settings: services.user.launch_settings()?,
        extensions: services.extensions.content_script_guest_configs()?,
        initial_host_url,
        notification_permission,
        paths: Map::new(),
        platform: services.platform.platform.clone(),
        arch: services.platform.arch.clone(),
        os_release: services.platform.os_release.clone(),
    };

    Ok(Response::Value(serde_json::to_value(config)?))
}

fn extension_preload_config(
    services: &Services,
    sender: SessionId,
    extension_id: String,
) -> Result<ExtensionPreloadConfig> {
    if !services.extensions.has_runtime(&extension_id)? {
        return Ok(ExtensionPreloadConfig::without_runtime(extension_id));
    }

    let runtime_config = services
        .extensions
        .content_script_runtime_config(&extension_id)?;
    let background_page = services.extensions.background_page_id(&extension_id)?;

    Ok(ExtensionPreloadConfig {
        extension_id,
        has_runtime: true,
        runtime_config,
        is_background_page: Some(background_page == Some(sender)),
    })
}

fn get_extension_content_script_preload_config(
    ctx: &HandlerContext<'_>,
    sender: SessionId,
    values: &[Value],
) -> Result<Response> {
    let extension_id = ctx.args(values).string(0, "extensionId")?;
    let config = extension_preload_config(ctx.services, sender, extension_id)?;
    Ok(Response::Value(serde_json::to_value(config)?))
}

fn get_extension_hosted_preload_config(
    ctx: &HandlerContext<'_>,
    sender: SessionId,
    values: &[Value],
) -> Result<Response> {
    let extension_id = ctx.args(values).string(0, "extensionId")?;
    let host = ctx.services.host.as_ref();

    let url = resolved_url(host, sender, host.url(sender))
        .ok_or(RpcError::UnknownSession(sender))?;
    let parsed = Url::parse(&url)?;

    // A hosted page asking about an extension it isn't served from
    if parsed.scheme() != EXTENSION_PROTOCOL || parsed.host_str() != Some(extension_id.as_str()) {
        tracing::warn!(
            session = %sender,
            extension_id = %extension_id,
            url = %url,
            "Hosted extension page does not match requested extension"
        );
        let config = ExtensionPreloadConfig::without_runtime(extension_id);
        return Ok(Response::Value(serde_json::to_value(config)?));
    }

    let config = extension_preload_config(ctx.services, sender, extension_id)?;
    Ok(Response::Value(serde_json::to_value(config)?))
}

// === Links ===

fn open_recent_link(ctx: &HandlerContext<'_>, sender: SessionId, values: &[Value]) -> Result<Response> {
    let args = ctx.args(values);
    let service_id = args.string(0, "serviceId")?;
    let item: RecentItem = args.required(1, "recentItem")?;
    Url::parse(&item.url)?;

    ctx.services.links.open_recent_link(sender, &service_id, &item)?;
    Ok(Response::Empty)
}

fn open_reading_queue_link(
    ctx: &HandlerContext<'_>,
    sender: SessionId,
    values: &[Value],
) -> Result<Response> {
    let args = ctx.args(values);
    let service_id = args.string(0, "serviceId")?;
    let item: ReadingItem = args.required(1, "readingItem")?;
    Url::parse(&item.url)?;

    ctx.services
        .links
        .open_reading_queue_link(sender, &service_id, &item)?;
    Ok(Response::Empty)
}

fn open_external(ctx: &HandlerContext<'_>, sender: SessionId, values: &[Value]) -> Result<Response> {
    let args = ctx.args(values);
    let url = Url::parse(&args.string(0, "url")?)?;
    let options: OpenExternalOptions = args.optional(1, "options")?.unwrap_or_default();

    tracing::debug!(session = %sender, url = %url, "Opening external url");
    ctx.services.shell.open_external(url.as_str(), &options)?;
    Ok(Response::Empty)
}

// === Updates ===

fn get_updater_config(ctx: &HandlerContext<'_>, sender: SessionId, values: &[Value]) -> Result<Response> {
    let reply_channel = ctx.args(values).string(0, "replyChannel")?;
    let channel = ctx.channel;
    let host = Arc::clone(&ctx.services.host);
    let updates = Arc::clone(&ctx.services.updates);

    let Ok(runtime) = Handle::try_current() else {
        // Lookup shells out, so it never runs on the caller's thread
        let fallback_host = Arc::clone(&host);
        let fallback_reply = reply_channel.clone();
        let spawned = std::thread::Builder::new()
            .name("wavebox-updater-config".to_string())
            .spawn(move || {
                let config = updater_config(channel, updates.as_ref(), updates.os_package_manager());
                deliver_reply(host.as_ref(), sender, &reply_channel, config);
            });
        if let Err(e) = spawned {
            tracing::error!(channel = %channel, error = %e, "Failed to start package manager lookup");
            deliver_reply(fallback_host.as_ref(), sender, &fallback_reply, UpdaterConfig::fallback());
        }
        return Ok(Response::Empty);
    };

    runtime.spawn(async move {
        let lookup = {
            let updates = Arc::clone(&updates);
            tokio::task::spawn_blocking(move || updates.os_package_manager()).await
        };

        let config = match lookup {
            Ok(lookup) => updater_config(channel, updates.as_ref(), lookup),
            Err(e) => {
                tracing::error!(channel = %channel, error = %e, "Package manager lookup aborted");
                UpdaterConfig::fallback()
            }
        };

        deliver_reply(host.as_ref(), sender, &reply_channel, config);
    });

    Ok(Response::Empty)
}

fn updater_config(
    channel: Channel,
    updates: &dyn UpdateCapabilities,
    lookup: Result<PackageManager>,
) -> UpdaterConfig {
    match lookup {
        Ok(os_package_manager) => UpdaterConfig {
            os_package_manager,
            autoupdater_supported_platform: updates.autoupdater_supported(),
        },
        Err(e) => {
            tracing::error!(channel = %channel, error = %e, "Failed to respond, replying with fallback");
            UpdaterConfig::fallback()
        }
    }
}

/// Send a deferred reply unless the session went away in the meantime
fn deliver_reply(host: &dyn ContentHost, session: SessionId, reply_channel: &str, config: UpdaterConfig) {
    if host.is_destroyed(session) {
        tracing::debug!(session = %session, reply_channel = %reply_channel, "Dropping reply for closed session");
        return;
    }

    let payload = match serde_json::to_value(config) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode deferred reply");
            return;
        }
    };

    if let Err(e) = host.send(session, reply_channel, payload) {
        tracing::warn!(session = %session, reply_channel = %reply_channel, error = %e, "Failed to deliver reply");
    }
}

// === Proxy ===

fn get_proxy_settings(ctx: &HandlerContext<'_>, _sender: SessionId, _values: &[Value]) -> Result<Response> {
    let proxy = ctx.services.settings.proxy_settings()?;
    Ok(Response::Value(serde_json::to_value(proxy)?))
}

fn set_proxy_settings(ctx: &HandlerContext<'_>, sender: SessionId, values: &[Value]) -> Result<Response> {
    let args = SetProxyArgs::decode(&ctx.args(values))?;

    ctx.services.settings.set_proxy_settings(ProxySettings {
        proxy_mode: args.mode,
        proxy_server: args.server,
        proxy_port: args.port,
    })?;

    tracing::info!(session = %sender, mode = %args.mode, "Proxy settings changed, relaunching");
    schedule_relaunch(Arc::clone(&ctx.services.relauncher));
    Ok(Response::Empty)
}

fn schedule_relaunch(relauncher: Arc<dyn Relauncher>) {
    if let Ok(runtime) = Handle::try_current() {
        runtime.spawn(async move {
            tokio::time::sleep(RELAUNCH_DELAY).await;
            relauncher.relaunch();
        });
        return;
    }

    let spawned = std::thread::Builder::new()
        .name("wavebox-relaunch".to_string())
        .spawn(move || {
            std::thread::sleep(RELAUNCH_DELAY);
            relauncher.relaunch();
        });
    if let Err(e) = spawned {
        tracing::error!(error = %e, "Failed to schedule relaunch");
    }
}
