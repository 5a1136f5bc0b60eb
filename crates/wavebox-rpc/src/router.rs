//! Dispatch façade
//!
//! Owns the connection registry and the handler table. `dispatch` is the
//! only entry point the shell calls for incoming requests.

use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::channel::Channel;
use crate::handlers::{self, Handler, HandlerContext};
use crate::services::Services;
use crate::session::{ConnectionRegistry, SessionId};

/// Delay between applying new proxy settings and relaunching
pub const RELAUNCH_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Returned to the caller as the call's value
    Value(Value),
    /// Nothing to return (fire-and-forget, or the reply comes later)
    Empty,
}

impl Response {
    pub fn into_value(self) -> Option<Value> {
        match self {
            Response::Value(value) => Some(value),
            Response::Empty => None,
        }
    }
}

pub struct RpcRouter {
    registry: ConnectionRegistry,
    handlers: HashMap<Channel, Handler>,
    services: Services,
}

impl RpcRouter {
    pub fn new(services: Services) -> Self {
        Self::with_registry(services, ConnectionRegistry::new())
    }

    pub fn with_registry(services: Services, registry: ConnectionRegistry) -> Self {
        let handlers: HashMap<Channel, Handler> = handlers::table().into_iter().collect();

        tracing::debug!(channels = handlers.len(), "Registered rpc handlers");

        Self {
            registry,
            handlers,
            services,
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Allow a session to call privileged channels
    pub fn connect(&self, session: SessionId) {
        if self.registry.connect(session) {
            tracing::debug!(session = %session, "Connected rpc session");
        }
    }

    pub fn disconnect(&self, session: SessionId) {
        if self.registry.disconnect(session) {
            tracing::debug!(session = %session, "Disconnected rpc session");
        }
    }

    pub fn is_connected(&self, session: SessionId) -> bool {
        self.registry.is_connected(session)
    }

    /// Route a request by channel name. Never fails: unknown channels get
    /// no response, everything else gets a response or the channel's
    /// fallback.
    pub fn dispatch(&self, channel_name: &str, sender: SessionId, args: &[Value]) -> Response {
        match channel_name.parse::<Channel>() {
            Ok(channel) => self.dispatch_channel(channel, sender, args),
            Err(()) => {
                tracing::warn!(channel = %channel_name, session = %sender, "Ignoring unknown rpc channel");
                Response::Empty
            }
        }
    }

    pub fn dispatch_channel(&self, channel: Channel, sender: SessionId, args: &[Value]) -> Response {
        if channel.is_privileged() && !self.registry.is_connected(sender) {
            tracing::debug!(channel = %channel, session = %sender, "Ignoring request from unconnected session");
            return channel.fallback();
        }

        let Some(handler) = self.handlers.get(&channel) else {
            tracing::error!(channel = %channel, "No handler registered");
            return channel.fallback();
        };

        let ctx = HandlerContext {
            channel,
            services: &self.services,
        };

        match handler(&ctx, sender, args) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    channel = %channel,
                    session = %sender,
                    error = %e,
                    "Failed to respond, replying with fallback"
                );
                channel.fallback()
            }
        }
    }
}
