//! Shared dependencies handed to every container.

use crate::{
    config::AppConfig, diagnostics::Diagnostics, routes::Navigator, session::SessionProvider,
    store::Store,
};
use std::sync::Arc;

/// Capabilities a container needs from the outside world.
/// Built once by the application shell and cloned into each screen.
#[derive(Clone)]
pub struct ContainerContext {
    /// Remote bill API
    pub store: Arc<dyn Store>,
    /// Connected user lookup
    pub session: Arc<dyn SessionProvider>,
    /// Screen transitions
    pub navigator: Arc<dyn Navigator>,
    /// Diagnostic side channel
    pub diagnostics: Arc<dyn Diagnostics>,
    /// Application settings
    pub config: Arc<AppConfig>,
}

impl ContainerContext {
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        session: Arc<dyn SessionProvider>,
        navigator: Arc<dyn Navigator>,
        diagnostics: Arc<dyn Diagnostics>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            store,
            session,
            navigator,
            diagnostics,
            config,
        }
    }
}
