//! Internal error reporting.
//!
//! Persistence and other unexpected failures are always logged with their
//! cause, and the cause travels on the error as its detail. The
//! [`redact_internal_errors`] hoop removes that detail from server errors
//! unless the injected [`State`] has debug errors enabled.

use std::{fmt::Display, sync::Arc};

use salvo::{http::ResBody, prelude::*};
use tracing::error;

use crate::state::State;

/// Log `source` and build a 500 carrying it as detail.
pub(crate) fn internal_error(context: &str, source: &dyn Display) -> StatusError {
    error!("{context}: {source}");

    StatusError::internal_server_error().detail(format!("{context}: {source}"))
}

fn redact(res: &mut Response, debug_errors: bool) {
    if debug_errors {
        return;
    }

    if let ResBody::Error(error) = &mut res.body
        && error.code.is_server_error()
    {
        error.detail = None;
    }
}

/// Strip server error details from the response unless debugging.
#[handler]
pub(crate) async fn redact_internal_errors(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    ctrl.call_next(req, depot, res).await;

    let debug_errors = depot
        .obtain::<Arc<State>>()
        .is_ok_and(|state| state.debug_errors);

    redact(res, debug_errors);
}
