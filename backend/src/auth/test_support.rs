use std::sync::Arc;

use axum::{Extension, Router};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use super::{AuthKeys, Claims};

pub const TEST_SECRET: &str = "routertestsecretthatisdefinitelylongenough";

pub fn bearer(role: &str, gym_id: Option<Uuid>) -> String {
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        gym_id: gym_id.map(|id| id.to_string()),
        role: role.to_string(),
        email: None,
        exp: 9_999_999_999,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    format!("Bearer {token}")
}

pub fn with_auth(router: Router) -> Router {
    router.layer(Extension(Arc::new(AuthKeys::new(TEST_SECRET))))
}
