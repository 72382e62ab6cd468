mod common;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use viptask_backend::entities::{
    fund_request_entity as fund_requests, transaction_entity as transactions,
    user_entity as users, FundDirection, FundRequestStatus, TransactionType,
};
use viptask_backend::error::AppError;
use viptask_backend::services::{FinanceService, LedgerService};

fn build_service(conn: &sea_orm::DatabaseConnection) -> FinanceService {
    FinanceService::new(conn.clone(), LedgerService::new(conn.clone()))
}

async fn balance_of(conn: &sea_orm::DatabaseConnection, user_id: i64) -> i64 {
    users::Entity::find_by_id(user_id)
        .one(conn)
        .await
        .unwrap()
        .unwrap()
        .balance_cents
}

#[tokio::test]
async fn deposit_credits_on_approval_only() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);
    let user = common::create_user(&conn, "alice", 0).await;
    let admin = common::create_admin(&conn, "root").await;

    let request = service
        .create_request(user.id, FundDirection::Deposit, 10_000)
        .await
        .unwrap();
    assert_eq!(request.status, FundRequestStatus::Pending);
    // 申请阶段不触账
    assert_eq!(balance_of(&conn, user.id).await, 0);

    let approved = service
        .approve(request.id, admin.id, Some("ok".to_string()))
        .await
        .unwrap();
    assert_eq!(approved.status, FundRequestStatus::Approved);
    assert_eq!(approved.reviewed_by, Some(admin.id));
    assert_eq!(balance_of(&conn, user.id).await, 10_000);

    let txn = transactions::Entity::find()
        .filter(transactions::Column::UserId.eq(user.id))
        .one(&conn)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(txn.txn_type, TransactionType::Deposit);
    assert_eq!(txn.idempotency_key, format!("fund_approve:{}", request.id));
}

#[tokio::test]
async fn double_approval_posts_once() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);
    let user = common::create_user(&conn, "bob", 0).await;
    let admin = common::create_admin(&conn, "root").await;

    let request = service
        .create_request(user.id, FundDirection::Deposit, 5_000)
        .await
        .unwrap();
    service.approve(request.id, admin.id, None).await.unwrap();

    let err = service.approve(request.id, admin.id, None).await.unwrap_err();
    assert!(matches!(err, AppError::StateConflict(_)));

    assert_eq!(balance_of(&conn, user.id).await, 5_000);
    let rows = transactions::Entity::find()
        .filter(transactions::Column::UserId.eq(user.id))
        .count(&conn)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn withdrawal_debits_at_approval_with_guard() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);
    let ledger = LedgerService::new(conn.clone());
    let user = common::create_user(&conn, "carol", 8_000).await;
    let admin = common::create_admin(&conn, "root").await;

    let request = service
        .create_request(user.id, FundDirection::Withdrawal, 6_000)
        .await
        .unwrap();

    // 申请后余额被其他路径花掉, 审批时守卫生效
    ledger
        .apply(viptask_backend::services::LedgerEntry::new(
            user.id,
            TransactionType::Withdrawal,
            -5_000,
            "test:spend".to_string(),
        ))
        .await
        .unwrap();

    let err = service.approve(request.id, admin.id, None).await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientFunds { .. }));

    // 审批失败整体回滚, 申请停在 pending 可再审
    let reloaded = fund_requests::Entity::find_by_id(request.id)
        .one(&conn)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status, FundRequestStatus::Pending);
    assert_eq!(balance_of(&conn, user.id).await, 3_000);
}

#[tokio::test]
async fn withdrawal_over_balance_is_rejected_at_creation() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);
    let user = common::create_user(&conn, "dave", 1_000).await;

    let err = service
        .create_request(user.id, FundDirection::Withdrawal, 2_000)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientFunds { .. }));
}

#[tokio::test]
async fn rejection_never_touches_balance() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);
    let user = common::create_user(&conn, "erin", 4_000).await;
    let admin = common::create_admin(&conn, "root").await;

    let request = service
        .create_request(user.id, FundDirection::Withdrawal, 4_000)
        .await
        .unwrap();
    let rejected = service
        .reject(request.id, admin.id, Some("suspicious".to_string()))
        .await
        .unwrap();

    assert_eq!(rejected.status, FundRequestStatus::Rejected);
    assert_eq!(rejected.review_note, Some("suspicious".to_string()));
    assert_eq!(balance_of(&conn, user.id).await, 4_000);

    let rows = transactions::Entity::find()
        .filter(transactions::Column::UserId.eq(user.id))
        .count(&conn)
        .await
        .unwrap();
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);
    let user = common::create_user(&conn, "frank", 0).await;

    let err = service
        .create_request(user.id, FundDirection::Deposit, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let err = service
        .create_request(user.id, FundDirection::Deposit, -100)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}
