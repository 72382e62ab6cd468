mod common;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use viptask_backend::entities::{
    transaction_entity as transactions, user_entity as users, wheel_spin_entity as spins,
    TransactionType,
};
use viptask_backend::error::AppError;
use viptask_backend::services::{LedgerService, WheelService};

fn build_service(conn: &sea_orm::DatabaseConnection) -> WheelService {
    WheelService::new(conn.clone(), LedgerService::new(conn.clone()))
}

#[tokio::test]
async fn spin_consumes_a_free_spin_and_records_result() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);
    let user = common::create_user(&conn, "alice", 0).await;
    common::set_free_spins(&conn, user.id, 1).await;

    // 只保留谢谢参与, 结果可断言且不触账
    common::keep_only_prize(&conn, "Thank You").await;

    let result = service.spin(user.id).await.unwrap();
    assert_eq!(result.prize.name, "Thank You");
    assert_eq!(result.prize.value_cents, 0);
    assert_eq!(result.free_spins_remaining, 0);

    let reloaded = users::Entity::find_by_id(user.id)
        .one(&conn)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.free_spins, 0);
    assert_eq!(reloaded.balance_cents, 0);

    // 非现金奖品不产生流水
    let txn_rows = transactions::Entity::find()
        .filter(transactions::Column::UserId.eq(user.id))
        .count(&conn)
        .await
        .unwrap();
    assert_eq!(txn_rows, 0);
}

#[tokio::test]
async fn spin_without_free_spins_is_rejected_cleanly() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);
    let user = common::create_user(&conn, "bob", 0).await;

    let err = service.spin(user.id).await.unwrap_err();
    assert!(matches!(err, AppError::NoFreeSpins));

    // 失败不留抽奖记录
    let spin_rows = spins::Entity::find()
        .filter(spins::Column::UserId.eq(user.id))
        .count(&conn)
        .await
        .unwrap();
    assert_eq!(spin_rows, 0);
}

#[tokio::test]
async fn cash_prize_credits_balance_in_same_unit() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);
    let user = common::create_user(&conn, "carol", 0).await;
    common::set_free_spins(&conn, user.id, 2).await;

    common::keep_only_prize(&conn, "Cash $0.50").await;

    let result = service.spin(user.id).await.unwrap();
    assert_eq!(result.prize.value_cents, 50);
    assert_eq!(result.free_spins_remaining, 1);

    let reloaded = users::Entity::find_by_id(user.id)
        .one(&conn)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.balance_cents, 50);

    // 奖金流水的幂等键由抽奖记录派生
    let txn = transactions::Entity::find()
        .filter(transactions::Column::UserId.eq(user.id))
        .one(&conn)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(txn.txn_type, TransactionType::Reward);
    assert_eq!(txn.idempotency_key, format!("wheel_prize:{}", result.spin_id));
}

#[tokio::test]
async fn remaining_spins_come_from_the_decremented_row() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);
    let user = common::create_user(&conn, "dave", 0).await;
    common::set_free_spins(&conn, user.id, 3).await;
    common::keep_only_prize(&conn, "Thank You").await;

    // 每次响应的剩余次数都等于扣减后的行值
    for expected in [2i64, 1, 0] {
        let result = service.spin(user.id).await.unwrap();
        assert_eq!(result.free_spins_remaining, expected);

        let reloaded = users::Entity::find_by_id(user.id)
            .one(&conn)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.free_spins, expected);
    }
}

#[tokio::test]
async fn records_are_listed_for_owner_only() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);
    let alice = common::create_user(&conn, "alice", 0).await;
    let bob = common::create_user(&conn, "bob", 0).await;
    common::set_free_spins(&conn, alice.id, 1).await;
    common::keep_only_prize(&conn, "Thank You").await;

    service.spin(alice.id).await.unwrap();

    let query = viptask_backend::models::WheelRecordQuery {
        page: None,
        per_page: None,
    };
    let alice_page = service.list_records(alice.id, &query).await.unwrap();
    assert_eq!(alice_page.pagination.total, 1);
    let bob_page = service.list_records(bob.id, &query).await.unwrap();
    assert_eq!(bob_page.pagination.total, 0);
}
