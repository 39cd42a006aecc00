//! Application Config

use bookstore_app::{context::AppOptions, domain::orders::TransitionPolicy};
use clap::Args;

/// Order lifecycle and error-reporting settings.
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Order status transition checking (strict, permissive)
    #[arg(long, env = "ORDER_TRANSITION_POLICY", default_value_t = TransitionPolicy::Strict)]
    pub order_transition_policy: TransitionPolicy,

    /// Include internal error causes in 500 responses
    #[arg(long, env = "DEBUG_ERRORS", default_value_t = false)]
    pub debug_errors: bool,
}

impl AppConfig {
    /// Service options derived from these settings.
    #[must_use]
    pub fn app_options(&self, max_connections: u32) -> AppOptions {
        AppOptions {
            max_connections,
            transition_policy: self.order_transition_policy,
        }
    }
}
