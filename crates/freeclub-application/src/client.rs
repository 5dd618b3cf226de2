//! Wires the client layers together from one configuration.

use crate::assignment_service::AssignmentService;
use crate::session_store::SessionStore;
use crate::visibility_service::VisibilityService;
use anyhow::Context;
use freeclub_core::Result;
use freeclub_core::authorization::AuthorizationPolicy;
use freeclub_core::config::ClientConfig;
use freeclub_core::session::{KeyValueStore, SessionHandle};
use freeclub_infrastructure::{ClubPaths, ConfigService, FileKeyValueStore};
use freeclub_interaction::{HttpTransport, ResourceGateway, ReqwestTransport};
use std::sync::Arc;

/// Entry point for a front end: one session, one gateway, one assignment cache.
pub struct ClubClient {
    config: ClientConfig,
    gateway: ResourceGateway,
    session: SessionStore,
    assignments: AssignmentService,
    visibility: VisibilityService,
}

impl ClubClient {
    /// Builds the client over the given transport and storage, then restores
    /// any persisted session.
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        config.validate()?;

        let gateway = ResourceGateway::new(transport, SessionHandle::new())
            .with_request_timeout(config.request_timeout())
            .with_assignments_ttl(config.assignments_ttl());
        let session = SessionStore::new(gateway.clone(), storage, config.login_timeout())
            .with_logout_on_unauthorized(config.logout_on_unauthorized);
        let assignments = AssignmentService::new(gateway.clone());
        let visibility = VisibilityService::new(gateway.clone(), assignments.clone());

        session.restore();
        tracing::debug!(api_url = config.base_url(), "club client ready");

        Ok(Self {
            config,
            gateway,
            session,
            assignments,
            visibility,
        })
    }

    /// Builds the client against the configured backend with file-backed
    /// session storage.
    pub fn from_config(config: ClientConfig) -> anyhow::Result<Self> {
        let storage_dir = match &config.storage_dir {
            Some(dir) => dir.clone(),
            None => ClubPaths::session_dir().context("cannot resolve session directory")?,
        };
        let transport = Arc::new(ReqwestTransport::new(config.base_url()));
        let storage = Arc::new(FileKeyValueStore::new(storage_dir));
        Ok(Self::new(config, transport, storage)?)
    }

    /// Loads the configuration file (with environment overrides) and builds
    /// the client from it.
    pub fn load() -> anyhow::Result<Self> {
        let config = ConfigService::new()
            .get_config()
            .context("failed to load client configuration")?;
        Self::from_config(config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn gateway(&self) -> &ResourceGateway {
        &self.gateway
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn assignments(&self) -> &AssignmentService {
        &self.assignments
    }

    pub fn visibility(&self) -> &VisibilityService {
        &self.visibility
    }

    pub fn policy(&self) -> AuthorizationPolicy {
        AuthorizationPolicy::new()
    }
}
