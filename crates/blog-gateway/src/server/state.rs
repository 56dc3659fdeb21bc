//! Shared state handed to every request handler.

use std::sync::Arc;

use crate::auth::HandshakeAuth;
use crate::channels::ChannelContext;
use crate::connection::StreamRegistry;
use crate::dispatch::EventDispatcher;
use blog_service::ServiceContext;

/// Everything a handler needs, cloneable per request
#[derive(Clone)]
pub struct GatewayState {
    services: Arc<ServiceContext>,
    /// Local fan-out of topic events to sessions
    registry: Arc<StreamRegistry>,
    /// Broker to registry bridge
    dispatcher: Arc<EventDispatcher>,
    /// Handshake authenticator
    auth: Arc<HandshakeAuth>,
}

impl GatewayState {
    pub fn new(
        services: ServiceContext,
        registry: Arc<StreamRegistry>,
        dispatcher: Arc<EventDispatcher>,
        auth: Arc<HandshakeAuth>,
    ) -> Self {
        Self {
            services: Arc::new(services),
            registry,
            dispatcher,
            auth,
        }
    }

    pub fn registry(&self) -> &StreamRegistry {
        &self.registry
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    pub fn auth(&self) -> &HandshakeAuth {
        &self.auth
    }

    /// Borrow the dependencies channels operate on
    pub fn channel_context(&self) -> ChannelContext<'_> {
        ChannelContext {
            registry: &self.registry,
            dispatcher: self.dispatcher.as_ref(),
            services: &self.services,
        }
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
