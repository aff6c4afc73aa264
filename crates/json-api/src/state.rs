//! Shared request state

use std::sync::Arc;

use rigforge_app::context::AppContext;

/// Injected into every request's depot by the root router.
#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,
}

impl State {
    #[must_use]
    pub(crate) fn from_app_context(app: AppContext) -> Arc<Self> {
        Arc::new(Self { app })
    }
}
