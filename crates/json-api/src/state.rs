//! State

use bookstore_app::context::AppContext;

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,
    /// Keep internal error causes in 500 response details.
    pub(crate) debug_errors: bool,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext, debug_errors: bool) -> Self {
        Self { app, debug_errors }
    }
}
