//! Gateway state
//!
//! Application state shared by every connection task.

use std::sync::Arc;

use room_common::AppConfig;
use room_service::ServiceContext;

use crate::broadcast::RoomSequencer;
use crate::connection::ConnectionRegistry;

/// Gateway application state
#[derive(Clone)]
pub struct GatewayState {
    /// Service context with stores, presence, and id generation
    service_context: Arc<ServiceContext>,
    /// Live connections and room subscriptions
    registry: Arc<ConnectionRegistry>,
    /// Per-room ordering of accepted mutations
    sequencer: Arc<RoomSequencer>,
    config: Arc<AppConfig>,
}

impl GatewayState {
    pub fn new(
        service_context: ServiceContext,
        registry: Arc<ConnectionRegistry>,
        config: AppConfig,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            registry,
            sequencer: Arc::new(RoomSequencer::new()),
            config: Arc::new(config),
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn sequencer(&self) -> &RoomSequencer {
        &self.sequencer
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("registry", &self.registry)
            .field("sequencer", &self.sequencer)
            .field("config", &"AppConfig")
            .finish()
    }
}
