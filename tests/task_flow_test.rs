mod common;

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use viptask_backend::entities::{
    task_product_entity as task_products, task_run_entity as task_runs,
    transaction_entity as transactions, user_entity as users, TaskRunState, TransactionType,
};
use viptask_backend::error::AppError;
use viptask_backend::models::ApprovalSettings;
use viptask_backend::services::{CatalogService, LedgerService, TaskRunService, VipService};

fn build_service(conn: &sea_orm::DatabaseConnection) -> TaskRunService {
    TaskRunService::new(
        conn.clone(),
        LedgerService::new(conn.clone()),
        VipService::new(conn.clone()),
        CatalogService::new(conn.clone()),
    )
}

fn manual_review() -> ApprovalSettings {
    ApprovalSettings {
        auto_approve_all: false,
        auto_approve_threshold_cents: None,
    }
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
async fn bronze_user_gets_reward_quote_but_cannot_cover_deposit() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);

    // 余额 $0 -> BRONZE (0.50%), 组内唯一商品 $100
    let user = common::create_user(&conn, "alice", 0).await;
    let bronze = common::vip_level_by_name(&conn, "BRONZE").await;
    common::create_group_with_products(&conn, bronze.id, &[10_000]).await;
    let task = common::create_task(&conn, "review widget", 0).await;

    let run = service.start(user.id, task.id, None, None).await.unwrap();
    assert_eq!(run.state, TaskRunState::Assigned);
    assert_eq!(run.assigned_price_cents, 10_000);
    assert_eq!(run.commission_rate_bp, 50);
    assert_eq!(run.reward_amount_cents, 50);
    assert_eq!(run.total_refund_cents, 10_050);

    // 押金 $100 付不起, 提交失败且状态不变
    let err = service
        .submit(run.id, user.id, &manual_review())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientFunds { .. }));

    let reloaded = task_runs::Entity::find_by_id(run.id)
        .one(&conn)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.state, TaskRunState::Assigned);
    assert_eq!(balance_of(&conn, user.id).await, 0);
}

#[tokio::test]
async fn silver_user_full_cycle_pays_commission() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);

    // 余额 $150 -> SILVER (0.60%), 商品 $150
    let user = common::create_user(&conn, "bob", 15_000).await;
    let silver = common::vip_level_by_name(&conn, "SILVER").await;
    common::create_group_with_products(&conn, silver.id, &[15_000]).await;
    let task = common::create_task(&conn, "review gadget", 0).await;

    let run = service.start(user.id, task.id, None, None).await.unwrap();
    assert_eq!(run.reward_amount_cents, 90);

    let submitted = service
        .submit(run.id, user.id, &manual_review())
        .await
        .unwrap();
    assert!(!submitted.auto_approved);
    assert_eq!(submitted.run.state, TaskRunState::Submitted);
    assert_eq!(balance_of(&conn, user.id).await, 0);

    let admin = common::create_admin(&conn, "root").await;
    let completed = service.complete(run.id, Some(admin.id)).await.unwrap();
    assert_eq!(completed.state, TaskRunState::Completed);
    assert_eq!(completed.approved_by, Some(admin.id));

    // 返还流水也记录审批人
    let reward = transactions::Entity::find()
        .filter(transactions::Column::UserId.eq(user.id))
        .filter(transactions::Column::TxnType.eq(TransactionType::Reward))
        .one(&conn)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reward.created_by, Some(admin.id));

    // 本金回来 + $0.90 佣金, 计数器各 +1
    assert_eq!(balance_of(&conn, user.id).await, 15_090);
    let reloaded = users::Entity::find_by_id(user.id)
        .one(&conn)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.completed_orders, 1);
    assert_eq!(reloaded.free_spins, 1);
}

#[tokio::test]
async fn double_completion_pays_exactly_once() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);

    let user = common::create_user(&conn, "carol", 15_000).await;
    let silver = common::vip_level_by_name(&conn, "SILVER").await;
    common::create_group_with_products(&conn, silver.id, &[15_000]).await;
    let task = common::create_task(&conn, "review thing", 0).await;

    let run = service.start(user.id, task.id, None, None).await.unwrap();
    service
        .submit(run.id, user.id, &manual_review())
        .await
        .unwrap();

    service.complete(run.id, Some(1)).await.unwrap();
    let err = service.complete(run.id, Some(2)).await.unwrap_err();
    assert!(matches!(err, AppError::StateConflict(_)));

    // Reward 流水只有一条
    let reward_rows = transactions::Entity::find()
        .filter(transactions::Column::UserId.eq(user.id))
        .filter(transactions::Column::TxnType.eq(TransactionType::Reward))
        .count(&conn)
        .await
        .unwrap();
    assert_eq!(reward_rows, 1);
    assert_eq!(balance_of(&conn, user.id).await, 15_090);
}

#[tokio::test]
async fn economics_are_frozen_at_start() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);

    let user = common::create_user(&conn, "dave", 15_000).await;
    let silver = common::vip_level_by_name(&conn, "SILVER").await;
    let products = common::create_group_with_products(&conn, silver.id, &[15_000]).await;
    let task = common::create_task(&conn, "review stuff", 0).await;

    let run = service.start(user.id, task.id, None, None).await.unwrap();

    // 接单后商品涨价, 不影响已冻结的快照
    let mut am: task_products::ActiveModel = products[0].clone().into();
    am.base_price_cents = Set(99_999);
    am.update(&conn).await.unwrap();

    service
        .submit(run.id, user.id, &manual_review())
        .await
        .unwrap();
    service.complete(run.id, None).await.unwrap();

    assert_eq!(balance_of(&conn, user.id).await, 15_090);
}

#[tokio::test]
async fn cancel_after_submit_reverses_deposit() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);

    let user = common::create_user(&conn, "erin", 15_000).await;
    let silver = common::vip_level_by_name(&conn, "SILVER").await;
    common::create_group_with_products(&conn, silver.id, &[15_000]).await;
    let task = common::create_task(&conn, "review item", 0).await;

    let run = service.start(user.id, task.id, None, None).await.unwrap();
    service
        .submit(run.id, user.id, &manual_review())
        .await
        .unwrap();
    assert_eq!(balance_of(&conn, user.id).await, 0);

    let cancelled = service
        .cancel(run.id, Some("changed my mind".to_string()), None)
        .await
        .unwrap();
    assert_eq!(cancelled.state, TaskRunState::Cancelled);
    assert_eq!(cancelled.cancelled_by, None);

    // 押金原路冲正, 佣金不发
    assert_eq!(balance_of(&conn, user.id).await, 15_000);
    let reversal_rows = transactions::Entity::find()
        .filter(transactions::Column::UserId.eq(user.id))
        .filter(transactions::Column::TxnType.eq(TransactionType::Reversal))
        .count(&conn)
        .await
        .unwrap();
    assert_eq!(reversal_rows, 1);

    // 终态不可再取消
    let err = service.cancel(run.id, None, None).await.unwrap_err();
    assert!(matches!(err, AppError::StateConflict(_)));
}

#[tokio::test]
async fn auto_approval_completes_on_submit() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);

    let user = common::create_user(&conn, "frank", 15_000).await;
    let silver = common::vip_level_by_name(&conn, "SILVER").await;
    common::create_group_with_products(&conn, silver.id, &[15_000]).await;
    let task = common::create_task(&conn, "review doodad", 0).await;

    let run = service.start(user.id, task.id, None, None).await.unwrap();
    let settings = ApprovalSettings {
        auto_approve_all: true,
        auto_approve_threshold_cents: None,
    };
    let result = service.submit(run.id, user.id, &settings).await.unwrap();

    assert!(result.auto_approved);
    assert_eq!(result.run.state, TaskRunState::Completed);
    // 系统审批: 无审批人
    let reloaded = task_runs::Entity::find_by_id(run.id)
        .one(&conn)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.approved_by, None);
    assert_eq!(balance_of(&conn, user.id).await, 15_090);
}

#[tokio::test]
async fn start_replays_on_client_idempotency_key() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);

    let user = common::create_user(&conn, "grace", 15_000).await;
    let silver = common::vip_level_by_name(&conn, "SILVER").await;
    common::create_group_with_products(&conn, silver.id, &[15_000]).await;
    let task = common::create_task(&conn, "review trinket", 0).await;

    let key = Some("client-key-123".to_string());
    let first = service
        .start(user.id, task.id, None, key.clone())
        .await
        .unwrap();
    let replay = service.start(user.id, task.id, None, key).await.unwrap();

    assert_eq!(first.id, replay.id);
    let run_count = task_runs::Entity::find()
        .filter(task_runs::Column::UserId.eq(user.id))
        .count(&conn)
        .await
        .unwrap();
    assert_eq!(run_count, 1);
}

#[tokio::test]
async fn client_key_replay_is_scoped_to_its_owner() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);

    let owner = common::create_user(&conn, "kate", 15_000).await;
    let other = common::create_user(&conn, "leo", 15_000).await;
    let silver = common::vip_level_by_name(&conn, "SILVER").await;
    common::create_group_with_products(&conn, silver.id, &[15_000]).await;
    let task = common::create_task(&conn, "review bauble", 0).await;

    let key = Some("client-key-shared".to_string());
    let first = service
        .start(owner.id, task.id, None, key.clone())
        .await
        .unwrap();
    assert_eq!(first.user_id, owner.id);

    // 他人携带同一键不能重放出别人的运行
    let err = service.start(other.id, task.id, None, key).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let other_runs = task_runs::Entity::find()
        .filter(task_runs::Column::UserId.eq(other.id))
        .count(&conn)
        .await
        .unwrap();
    assert_eq!(other_runs, 0);
}

#[tokio::test]
async fn admin_cancellation_records_the_acting_admin() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);

    let user = common::create_user(&conn, "nancy", 15_000).await;
    let silver = common::vip_level_by_name(&conn, "SILVER").await;
    common::create_group_with_products(&conn, silver.id, &[15_000]).await;
    let task = common::create_task(&conn, "review gewgaw", 0).await;

    let run = service.start(user.id, task.id, None, None).await.unwrap();
    service
        .submit(run.id, user.id, &manual_review())
        .await
        .unwrap();

    let admin = common::create_admin(&conn, "root").await;
    let cancelled = service
        .cancel(run.id, Some("policy violation".to_string()), Some(admin.id))
        .await
        .unwrap();

    // 取消操作人单独记录, 不占用审批人字段
    assert_eq!(cancelled.cancelled_by, Some(admin.id));
    assert_eq!(cancelled.approved_by, None);
    assert_eq!(balance_of(&conn, user.id).await, 15_000);
}

#[tokio::test]
async fn tier_threshold_blocks_low_balance_users() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);

    // 任务要求 SILVER 门槛 ($100), 余额 $0 只有 BRONZE
    let user = common::create_user(&conn, "henry", 0).await;
    let bronze = common::vip_level_by_name(&conn, "BRONZE").await;
    common::create_group_with_products(&conn, bronze.id, &[10_000]).await;
    let task = common::create_task(&conn, "premium review", 10_000).await;

    let err = service.start(user.id, task.id, None, None).await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientTier(_)));
}

#[tokio::test]
async fn unconfigured_tier_has_no_shop_group() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);

    // BRONZE 没有绑定商店组: 硬失败, 不降级到其他组
    let user = common::create_user(&conn, "ivan", 0).await;
    let task = common::create_task(&conn, "orphan task", 0).await;

    let err = service.start(user.id, task.id, None, None).await.unwrap_err();
    assert!(matches!(err, AppError::NoShopGroupConfigured));
}

#[tokio::test]
async fn submit_by_other_user_is_forbidden() {
    let conn = common::setup_db().await;
    let service = build_service(&conn);

    let owner = common::create_user(&conn, "judy", 15_000).await;
    let other = common::create_user(&conn, "mallory", 15_000).await;
    let silver = common::vip_level_by_name(&conn, "SILVER").await;
    common::create_group_with_products(&conn, silver.id, &[15_000]).await;
    let task = common::create_task(&conn, "review gizmo", 0).await;

    let run = service.start(owner.id, task.id, None, None).await.unwrap();
    let err = service
        .submit(run.id, other.id, &manual_review())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotOwner));
}
