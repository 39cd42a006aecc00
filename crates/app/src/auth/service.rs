//! Auth service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgPool;
use tracing::warn;

use crate::{
    auth::{
        ApiTokenUuid, AuthServiceError, IssuedApiToken, format_api_token,
        generate_api_token_secret, hash_api_token, parse_api_token,
        repository::PgAuthRepository,
    },
    domain::users::records::{Actor, UserUuid},
};

#[derive(Debug, Clone)]
pub struct PgAuthService {
    repository: PgAuthRepository,
}

impl PgAuthService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PgAuthRepository::new(pool),
        }
    }

    /// Issue a new API token for the given user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthServiceError::UnknownUser`] if the user does not exist, or a storage
    /// error if the insert fails.
    pub async fn issue_api_token(&self, user: UserUuid) -> Result<IssuedApiToken, AuthServiceError> {
        let secret = generate_api_token_secret();
        let token = format_api_token(&secret);

        let record = self
            .repository
            .create_api_token(ApiTokenUuid::new(), user, &hash_api_token(&secret))
            .await?;

        Ok(IssuedApiToken { token, record })
    }

    /// Revoke a token. Returns `true` if the token was active.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn revoke_api_token(&self, token: ApiTokenUuid) -> Result<bool, AuthServiceError> {
        Ok(self.repository.revoke_api_token(token).await?)
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Actor, AuthServiceError> {
        let secret = parse_api_token(bearer_token).map_err(|_invalid| AuthServiceError::NotFound)?;

        let owner = self
            .repository
            .find_actor_by_token_hash(&hash_api_token(&secret))
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        // Best-effort metadata update; auth success should not depend on this write.
        if let Err(source) = self.repository.touch_api_token_last_used(owner.token).await {
            warn!(token_uuid = %owner.token, "failed to record token usage: {source}");
        }

        Ok(owner.actor)
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a bearer token to the calling user and role.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Actor, AuthServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{domain::users::records::Role, test::TestContext};

    use super::*;

    #[tokio::test]
    async fn issued_token_authenticates_as_its_owner() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_actor(Role::Seller).await;

        let issued = ctx.auth.issue_api_token(seller.user).await?;
        let actor = ctx.auth.authenticate_bearer(&issued.token).await?;

        assert_eq!(actor, seller);
        assert_eq!(issued.record.user_uuid, seller.user);

        Ok(())
    }

    #[tokio::test]
    async fn revoked_token_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let customer = ctx.create_actor(Role::Customer).await;

        let issued = ctx.auth.issue_api_token(customer.user).await?;

        assert!(ctx.auth.revoke_api_token(issued.record.uuid).await?);
        assert!(
            !ctx.auth.revoke_api_token(issued.record.uuid).await?,
            "second revoke should report the token as already inactive"
        );

        let result = ctx.auth.authenticate_bearer(&issued.token).await;

        assert!(
            matches!(result, Err(AuthServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn malformed_and_unknown_tokens_are_rejected() {
        let ctx = TestContext::new().await;

        let unknown = format_api_token(&generate_api_token_secret());

        for token in ["garbage", "bk_1234", unknown.as_str()] {
            let result = ctx.auth.authenticate_bearer(token).await;

            assert!(
                matches!(result, Err(AuthServiceError::NotFound)),
                "expected NotFound for {token}, got {result:?}"
            );
        }
    }

    #[tokio::test]
    async fn issuing_for_unknown_user_fails() {
        let ctx = TestContext::new().await;

        let result = ctx.auth.issue_api_token(UserUuid::new()).await;

        assert!(
            matches!(result, Err(AuthServiceError::UnknownUser)),
            "expected UnknownUser, got {result:?}"
        );
    }
}
