mod common;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use viptask_backend::entities::{transaction_entity as transactions, user_entity as users};
use viptask_backend::entities::{TransactionStatus, TransactionType};
use viptask_backend::error::AppError;
use viptask_backend::models::AdjustBalanceRequest;
use viptask_backend::services::{LedgerEntry, LedgerService};

#[tokio::test]
async fn apply_updates_balance_and_keeps_chain() {
    let conn = common::setup_db().await;
    let ledger = LedgerService::new(conn.clone());
    let user = common::create_user(&conn, "alice", 0).await;

    let first = ledger
        .apply(LedgerEntry::new(
            user.id,
            TransactionType::Deposit,
            10_000,
            "test:deposit:1".to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(first.balance_before, 0);
    assert_eq!(first.balance_after, 10_000);
    assert_eq!(first.status, TransactionStatus::Posted);

    let second = ledger
        .apply(LedgerEntry::new(
            user.id,
            TransactionType::Withdrawal,
            -2_500,
            "test:withdraw:1".to_string(),
        ))
        .await
        .unwrap();
    // 流水链: 上一条的 after 是下一条的 before
    assert_eq!(second.balance_before, 10_000);
    assert_eq!(second.balance_after, 7_500);

    let reloaded = users::Entity::find_by_id(user.id)
        .one(&conn)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.balance_cents, 7_500);
}

#[tokio::test]
async fn replayed_key_returns_original_without_double_posting() {
    let conn = common::setup_db().await;
    let ledger = LedgerService::new(conn.clone());
    let user = common::create_user(&conn, "bob", 0).await;

    let entry = LedgerEntry::new(
        user.id,
        TransactionType::Deposit,
        5_000,
        "test:replay".to_string(),
    );
    let first = ledger.apply(entry.clone()).await.unwrap();
    let replay = ledger.apply(entry).await.unwrap();

    // 重放命中同一条流水, 余额只动一次
    assert_eq!(first.id, replay.id);

    let reloaded = users::Entity::find_by_id(user.id)
        .one(&conn)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.balance_cents, 5_000);

    let rows = transactions::Entity::find()
        .filter(transactions::Column::UserId.eq(user.id))
        .count(&conn)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn debit_below_zero_is_rejected() {
    let conn = common::setup_db().await;
    let ledger = LedgerService::new(conn.clone());
    let user = common::create_user(&conn, "carol", 1_000).await;

    let err = ledger
        .apply(LedgerEntry::new(
            user.id,
            TransactionType::Withdrawal,
            -1_500,
            "test:overdraw".to_string(),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientFunds { .. }));

    // 失败不留痕
    let reloaded = users::Entity::find_by_id(user.id)
        .one(&conn)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.balance_cents, 1_000);
    let rows = transactions::Entity::find()
        .filter(transactions::Column::UserId.eq(user.id))
        .count(&conn)
        .await
        .unwrap();
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn admin_adjust_may_go_negative_when_allowed() {
    let conn = common::setup_db().await;
    let ledger = LedgerService::new(conn.clone());
    let user = common::create_user(&conn, "dave", 200).await;
    let admin = common::create_admin(&conn, "root").await;

    // 未显式允许时仍被负余额守卫拦下
    let err = ledger
        .admin_adjust(
            user.id,
            AdjustBalanceRequest {
                amount_cents: -500,
                idempotency_key: "adjust:guarded".to_string(),
                description: None,
                allow_negative: false,
            },
            admin.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientFunds { .. }));

    let txn = ledger
        .admin_adjust(
            user.id,
            AdjustBalanceRequest {
                amount_cents: -500,
                idempotency_key: "adjust:allowed".to_string(),
                description: Some("correction".to_string()),
                allow_negative: true,
            },
            admin.id,
        )
        .await
        .unwrap();
    assert_eq!(txn.txn_type, TransactionType::Adjustment);
    assert_eq!(txn.balance_after, -300);
    assert_eq!(txn.created_by, Some(admin.id));
}

#[tokio::test]
async fn zero_amount_adjustment_is_rejected() {
    let conn = common::setup_db().await;
    let ledger = LedgerService::new(conn.clone());
    let user = common::create_user(&conn, "erin", 0).await;
    let admin = common::create_admin(&conn, "root").await;

    let err = ledger
        .admin_adjust(
            user.id,
            AdjustBalanceRequest {
                amount_cents: 0,
                idempotency_key: "adjust:zero".to_string(),
                description: None,
                allow_negative: false,
            },
            admin.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}
