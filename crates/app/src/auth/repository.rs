//! Auth repository.

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    auth::{ApiTokenRecord, ApiTokenUuid},
    database::try_get_variant,
    domain::users::records::{Actor, Role, UserUuid},
};

const CREATE_API_TOKEN_SQL: &str = include_str!("sql/create_api_token.sql");
const FIND_ACTOR_BY_TOKEN_HASH_SQL: &str = include_str!("sql/find_actor_by_token_hash.sql");
const TOUCH_API_TOKEN_SQL: &str = include_str!("sql/touch_api_token.sql");
const REVOKE_API_TOKEN_SQL: &str = include_str!("sql/revoke_api_token.sql");

#[derive(Debug, Clone)]
pub(crate) struct PgAuthRepository {
    pool: PgPool,
}

/// Token row joined with its owner.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TokenOwner {
    pub(crate) token: ApiTokenUuid,
    pub(crate) actor: Actor,
}

impl PgAuthRepository {
    #[must_use]
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn create_api_token(
        &self,
        token: ApiTokenUuid,
        user: UserUuid,
        token_hash: &str,
    ) -> Result<ApiTokenRecord, sqlx::Error> {
        query_as::<Postgres, ApiTokenRecord>(CREATE_API_TOKEN_SQL)
            .bind(token.into_uuid())
            .bind(user.into_uuid())
            .bind(token_hash)
            .fetch_one(&self.pool)
            .await
    }

    pub(crate) async fn find_actor_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<TokenOwner>, sqlx::Error> {
        query_as::<Postgres, TokenOwner>(FIND_ACTOR_BY_TOKEN_HASH_SQL)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
    }

    pub(crate) async fn touch_api_token_last_used(
        &self,
        token: ApiTokenUuid,
    ) -> Result<(), sqlx::Error> {
        query(TOUCH_API_TOKEN_SQL)
            .bind(token.into_uuid())
            .execute(&self.pool)
            .await
            .map(|_| ())
    }

    pub(crate) async fn revoke_api_token(&self, token: ApiTokenUuid) -> Result<bool, sqlx::Error> {
        let rows_affected = query(REVOKE_API_TOKEN_SQL)
            .bind(token.into_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}

impl<'r> FromRow<'r, PgRow> for ApiTokenRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ApiTokenUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            last_used_at: row
                .try_get::<Option<SqlxTimestamp>, _>("last_used_at")?
                .map(SqlxTimestamp::to_jiff),
            revoked_at: row
                .try_get::<Option<SqlxTimestamp>, _>("revoked_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for TokenOwner {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let role: Role = try_get_variant(row, "role")?;

        Ok(Self {
            token: ApiTokenUuid::from_uuid(row.try_get::<Uuid, _>("token_uuid")?),
            actor: Actor::new(UserUuid::from_uuid(row.try_get("user_uuid")?), role),
        })
    }
}
