use std::sync::Arc;

use crate::application::services::{LinkService, RedirectResolver};
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::abuse_guard::AbuseGuard;

/// Shared handles injected into every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub redirect_resolver: Arc<RedirectResolver>,
    pub store: Arc<dyn LinkRepository>,
    /// Name of the store backend, reported by `/health`.
    pub store_backend: &'static str,
    pub abuse_guard: Arc<dyn AbuseGuard>,
    pub behind_proxy: bool,
    /// Include error debug detail (`stack`) in JSON error bodies.
    pub expose_error_details: bool,
}

impl AppState {
    /// Wires services around one store and one abuse guard.
    pub fn new(
        store: Arc<dyn LinkRepository>,
        store_backend: &'static str,
        abuse_guard: Arc<dyn AbuseGuard>,
        link_service: LinkService,
    ) -> Self {
        Self {
            redirect_resolver: Arc::new(RedirectResolver::new(store.clone())),
            link_service: Arc::new(link_service),
            store,
            store_backend,
            abuse_guard,
            behind_proxy: false,
            expose_error_details: true,
        }
    }

    pub fn with_behind_proxy(mut self, behind_proxy: bool) -> Self {
        self.behind_proxy = behind_proxy;
        self
    }

    pub fn with_error_details(mut self, expose: bool) -> Self {
        self.expose_error_details = expose;
        self
    }
}
