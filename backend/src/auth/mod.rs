use std::sync::Arc;

use axum::{
    RequestPartsExt, async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use gymdesk_core::domain::value_objects::enums::roles::Role;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::axum_http::error_responses::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub gym_id: Option<String>,
    pub role: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: usize,
}

/// Verification key for access tokens, installed as a router `Extension`.
#[derive(Clone)]
pub struct AuthKeys {
    decoding: DecodingKey,
}

impl AuthKeys {
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(jwt_secret.as_bytes()),
        }
    }

    pub fn validate(&self, token: &str) -> anyhow::Result<Claims> {
        let validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        let token_data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| anyhow::anyhow!("JWT validation failed: {}", e))?;

        Ok(token_data.claims)
    }
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub gym_id: Option<Uuid>,
    pub role: Role,
    pub email: Option<String>,
}

impl AuthUser {
    pub fn is_platform_admin(&self) -> bool {
        self.role == Role::PlatformAdmin
    }

    /// The caller's tenant. Platform admins carry none.
    pub fn require_gym(&self) -> Result<Uuid, AppError> {
        self.gym_id
            .ok_or_else(|| AppError::Forbidden("no gym is attached to this account".to_string()))
    }

    /// Platform admins pass every role check.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if self.is_platform_admin() || allowed.contains(&self.role) {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "role {} may not perform this action",
            self.role
        )))
    }

    fn from_claims(claims: Claims) -> anyhow::Result<Self> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| anyhow::anyhow!("Invalid user ID in token"))?;
        let gym_id = claims
            .gym_id
            .as_deref()
            .map(Uuid::parse_str)
            .transpose()
            .map_err(|_| anyhow::anyhow!("Invalid gym ID in token"))?;
        let role = Role::from_str(&claims.role)
            .ok_or_else(|| anyhow::anyhow!("Unknown role in token"))?;

        if role != Role::PlatformAdmin && gym_id.is_none() {
            anyhow::bail!("Tenant token without gym ID");
        }

        Ok(Self {
            user_id,
            gym_id,
            role,
            email: claims.email,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let keys = parts
            .extensions
            .get::<Arc<AuthKeys>>()
            .cloned()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("AuthKeys extension missing")))?;

        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|err| {
                debug!(error = %err, "auth: missing or malformed bearer header");
                AppError::Unauthorized
            })?;

        let claims = keys.validate(bearer.token()).map_err(|err| {
            debug!(error = %err, "auth: token rejected");
            AppError::Unauthorized
        })?;

        AuthUser::from_claims(claims).map_err(|err| {
            debug!(error = %err, "auth: claims rejected");
            AppError::Unauthorized
        })
    }
}

#[cfg(test)]
pub mod test_support;

#[cfg(test)]
mod tests;
