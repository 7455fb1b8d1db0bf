use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    config::{AppConfig, Env},
    models::{Role, User},
    repository::RepositoryState,
};

/// Header accepted by the local development bypass.
pub const DEV_USER_HEADER: &str = "x-user-email";

/// Claims
///
/// Payload expected inside a bearer JWT. Tokens are issued elsewhere; this service
/// only validates them.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's email, which is also the ownership key on contacts.
    pub sub: String,
    /// Expiration Time (exp).
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// Principal
///
/// The authenticated caller on whose behalf an operation runs. The role is read
/// from the user record on every request, never from the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Principal {
    pub email: String,
    pub role: Role,
}

impl Principal {
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            role: user.role,
        }
    }
}

/// Principal Extractor Implementation
///
/// Makes `Principal` usable as a handler argument. Resolution order:
/// 1. Local bypass: in `Env::Local`, an `x-user-email` header naming an active user.
/// 2. Bearer token: HS256 JWT validated against `AppConfig::jwt_secret`, expiry enforced.
/// 3. DB lookup: the token subject must still be an active user.
///
/// Rejection: `401` on any authentication failure, `500` if the user lookup itself fails.
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            if let Some(email) = parts
                .headers
                .get(DEV_USER_HEADER)
                .and_then(|value| value.to_str().ok())
            {
                if let Some(user) = lookup_user(&repo, email).await? {
                    return Ok(user.into());
                }
            }
        }
        // Production, or a bypass header that did not resolve: fall through to JWT.

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            tracing::debug!("rejected bearer token: {:?}", e.kind());
            StatusCode::UNAUTHORIZED
        })?;

        // A valid token for a user that has since been removed is still rejected.
        let user = lookup_user(&repo, &token_data.claims.sub)
            .await?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(user.into())
    }
}

async fn lookup_user(repo: &RepositoryState, email: &str) -> Result<Option<User>, StatusCode> {
    repo.get_user(email).await.map_err(|e| {
        tracing::error!("user lookup failed: {:?}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}
