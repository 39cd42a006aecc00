//! Auth records.

use jiff::Timestamp;

use crate::{domain::users::records::UserUuid, uuids::TypedUuid};

/// API Token UUID
pub type ApiTokenUuid = TypedUuid<ApiTokenRecord>;

/// Stored API token metadata. The raw token is never persisted.
#[derive(Debug, Clone)]
pub struct ApiTokenRecord {
    pub uuid: ApiTokenUuid,
    pub user_uuid: UserUuid,
    pub created_at: Timestamp,
    pub last_used_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
}

/// A freshly issued token; `token` is only ever shown once.
#[derive(Debug)]
pub struct IssuedApiToken {
    pub token: String,
    pub record: ApiTokenRecord,
}
