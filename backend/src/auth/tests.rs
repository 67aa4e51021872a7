use super::*;
use axum::{
    Extension, Router,
    body::Body,
    http::{Request, StatusCode, header::AUTHORIZATION},
    routing::get,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use tower::ServiceExt;

const SECRET: &str = "supersecretjwtsecretforunittesting123";

fn token(secret: &str, role: &str, gym_id: Option<Uuid>, exp: usize) -> String {
    let claims = Claims {
        sub: "123e4567-e89b-12d3-a456-426614174000".to_string(),
        gym_id: gym_id.map(|id| id.to_string()),
        role: role.to_string(),
        email: Some("owner@example.com".to_string()),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

async fn whoami(auth: AuthUser) -> String {
    format!("{}:{}", auth.role, auth.require_gym().map(|g| g.to_string()).unwrap_or_default())
}

fn app() -> Router {
    Router::new()
        .route("/whoami", get(whoami))
        .layer(Extension(Arc::new(AuthKeys::new(SECRET))))
}

async fn call(authorization: Option<String>) -> (StatusCode, String) {
    let mut request = Request::builder().uri("/whoami");
    if let Some(value) = authorization {
        request = request.header(AUTHORIZATION, value);
    }

    let response = app()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn valid_owner_token_yields_tenant() {
    let gym_id = Uuid::new_v4();
    let (status, body) = call(Some(format!(
        "Bearer {}",
        token(SECRET, "owner", Some(gym_id), 9999999999)
    )))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, format!("owner:{gym_id}"));
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let (status, _) = call(Some(format!(
        "Bearer {}",
        token(SECRET, "owner", Some(Uuid::new_v4()), 1)
    )))
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_signature_is_unauthorized() {
    let (status, _) = call(Some(format!(
        "Bearer {}",
        token("wrongsecret", "owner", Some(Uuid::new_v4()), 9999999999)
    )))
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_header_is_unauthorized() {
    let (status, body) = call(None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("\"code\":401"));
}

#[tokio::test]
async fn staff_token_without_gym_is_rejected() {
    let (status, _) = call(Some(format!(
        "Bearer {}",
        token(SECRET, "staff", None, 9999999999)
    )))
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[test]
fn platform_admin_passes_role_checks_but_has_no_gym() {
    let admin = AuthUser {
        user_id: Uuid::new_v4(),
        gym_id: None,
        role: Role::PlatformAdmin,
        email: None,
    };

    assert!(admin.require_role(&[Role::Owner]).is_ok());
    assert!(matches!(admin.require_gym(), Err(AppError::Forbidden(_))));
}

#[test]
fn staff_cannot_do_owner_only_actions() {
    let staff = AuthUser {
        user_id: Uuid::new_v4(),
        gym_id: Some(Uuid::new_v4()),
        role: Role::Staff,
        email: None,
    };

    assert!(staff.require_role(&[Role::Owner, Role::Staff]).is_ok());
    assert!(matches!(
        staff.require_role(&[Role::Owner]),
        Err(AppError::Forbidden(_))
    ));
}
