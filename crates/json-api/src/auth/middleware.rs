//! Bearer token middleware.

use std::sync::Arc;

use bookstore_app::{auth::AuthServiceError, domain::users::records::Actor};
use salvo::{http::header::AUTHORIZATION, prelude::*};

use crate::{errors::internal_error, extensions::*, state::State};

/// Reject the request unless it carries a valid bearer token.
#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(token) = extract_bearer_token(req) else {
        res.render(StatusError::unauthorized().brief("Missing or invalid Authorization header"));
        ctrl.skip_rest();

        return;
    };

    match authenticate(depot, token).await {
        Ok(actor) => {
            depot.insert_actor(actor);
            ctrl.call_next(req, depot, res).await;
        }
        Err(status) => {
            res.render(status);
            ctrl.skip_rest();
        }
    }
}

/// Resolve the caller when a token is present. Requests without an
/// `Authorization` header continue anonymously; a bad token is still rejected.
#[salvo::handler]
pub(crate) async fn optional(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if req.headers().get(AUTHORIZATION).is_none() {
        ctrl.call_next(req, depot, res).await;

        return;
    }

    let Some(token) = extract_bearer_token(req) else {
        res.render(StatusError::unauthorized().brief("Missing or invalid Authorization header"));
        ctrl.skip_rest();

        return;
    };

    match authenticate(depot, token).await {
        Ok(actor) => {
            depot.insert_actor(actor);
            ctrl.call_next(req, depot, res).await;
        }
        Err(status) => {
            res.render(status);
            ctrl.skip_rest();
        }
    }
}

async fn authenticate(depot: &Depot, token: &str) -> Result<Actor, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    match state.app.auth.authenticate_bearer(token).await {
        Ok(actor) => Ok(actor),
        Err(AuthServiceError::NotFound | AuthServiceError::UnknownUser) => {
            Err(StatusError::unauthorized().brief("Invalid API token"))
        }
        Err(AuthServiceError::Sql(source)) => {
            Err(internal_error("failed to validate api token", &source))
        }
        Err(AuthServiceError::Token(source)) => {
            Err(internal_error("failed to process api token", &source))
        }
    }
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}

#[cfg(test)]
mod tests {
    use bookstore_app::{
        auth::MockAuthService,
        domain::users::records::{Role, UserUuid},
    };
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{TestState, service_with_state};

    use super::*;

    #[salvo::handler]
    async fn echo_actor(depot: &mut Depot, res: &mut Response) {
        let actor = depot
            .optional_actor()
            .map_or_else(|| "anonymous".to_string(), |actor| actor.user.to_string());

        res.render(actor);
    }

    fn make_service(auth: MockAuthService, required: bool) -> Service {
        let route = if required {
            Router::new().hoop(handler).get(echo_actor)
        } else {
            Router::new().hoop(optional).get(echo_actor)
        };

        service_with_state(TestState::new().auth(auth), route)
    }

    fn strict_auth() -> MockAuthService {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer().never();

        auth
    }

    #[tokio::test]
    async fn missing_authorization_header_returns_401() {
        let res = TestClient::get("http://example.com")
            .send(&make_service(strict_auth(), true))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn non_bearer_authorization_header_returns_401() {
        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Basic abc123", true)
            .send(&make_service(strict_auth(), true))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn invalid_token_returns_401() {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .once()
            .withf(|token| token == "bk_abc")
            .return_once(|_| Err(AuthServiceError::NotFound));

        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Bearer bk_abc", true)
            .send(&make_service(auth, true))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn valid_token_injects_actor() -> TestResult {
        let actor = Actor::new(UserUuid::new(), Role::Customer);

        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .once()
            .withf(|token| token == "bk_abc")
            .return_once(move |_| Ok(actor));

        let mut res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "bearer bk_abc", true)
            .send(&make_service(auth, true))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(res.take_string().await?, actor.user.to_string());

        Ok(())
    }

    #[tokio::test]
    async fn optional_auth_allows_anonymous_requests() -> TestResult {
        let mut res = TestClient::get("http://example.com")
            .send(&make_service(strict_auth(), false))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(res.take_string().await?, "anonymous");

        Ok(())
    }

    #[tokio::test]
    async fn optional_auth_still_rejects_bad_tokens() {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .once()
            .return_once(|_| Err(AuthServiceError::NotFound));

        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Bearer bk_nope", true)
            .send(&make_service(auth, false))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));
    }
}
