mod common;

use viptask_backend::error::AppError;
use viptask_backend::models::{LoginRequest, RegisterRequest};
use viptask_backend::services::{AuthService, LedgerService, UserService, VipService};
use viptask_backend::utils::JwtService;

fn jwt() -> JwtService {
    JwtService::new("test-secret", 3600, 86_400)
}

#[tokio::test]
async fn register_login_refresh_cycle() {
    let conn = common::setup_db().await;
    let service = AuthService::new(conn.clone(), jwt());

    let registered = service
        .register(RegisterRequest {
            username: "alice".to_string(),
            password: "hunter22".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(registered.username, "alice");
    assert!(!registered.access_token.is_empty());

    let logged_in = service
        .login(LoginRequest {
            username: "alice".to_string(),
            password: "hunter22".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(logged_in.user_id, registered.user_id);

    let refreshed = service.refresh(&logged_in.refresh_token).await.unwrap();
    assert_eq!(refreshed.user_id, registered.user_id);

    // access token 不能当 refresh token 用
    let err = service.refresh(&logged_in.access_token).await.unwrap_err();
    assert!(matches!(err, AppError::AuthError(_) | AppError::JwtError(_)));
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let conn = common::setup_db().await;
    let service = AuthService::new(conn.clone(), jwt());

    let request = RegisterRequest {
        username: "bob".to_string(),
        password: "hunter22".to_string(),
    };
    service.register(request).await.unwrap();

    let err = service
        .register(RegisterRequest {
            username: "bob".to_string(),
            password: "other-pass".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let conn = common::setup_db().await;
    let service = AuthService::new(conn.clone(), jwt());

    service
        .register(RegisterRequest {
            username: "carol".to_string(),
            password: "hunter22".to_string(),
        })
        .await
        .unwrap();

    let err = service
        .login(LoginRequest {
            username: "carol".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AuthError(_)));
}

#[tokio::test]
async fn profile_reflects_balance_derived_tier() {
    let conn = common::setup_db().await;
    let vip = VipService::new(conn.clone());
    let profile_service = UserService::new(conn.clone(), vip);
    let ledger = LedgerService::new(conn.clone());

    let user = common::create_user(&conn, "dave", 0).await;

    let profile = profile_service.get_profile(user.id).await.unwrap();
    let bronze = profile.vip_level.expect("zero balance still maps to BRONZE");
    assert_eq!(bronze.name, "BRONZE");

    // 充到 $100 升 SILVER
    ledger
        .apply(viptask_backend::services::LedgerEntry::new(
            user.id,
            viptask_backend::entities::TransactionType::Deposit,
            10_000,
            "test:topup".to_string(),
        ))
        .await
        .unwrap();

    let profile = profile_service.get_profile(user.id).await.unwrap();
    assert_eq!(profile.user.balance_cents, 10_000);
    assert_eq!(profile.vip_level.unwrap().name, "SILVER");
}
