use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::StatementBuilder;

/// 用户表 (余额/完成单数/免费抽奖次数)
#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    Role,
    BalanceCents,
    CompletedOrders,
    FreeSpins,
    CreatedAt,
    UpdatedAt,
}

/// VIP 等级配置表
#[derive(DeriveIden)]
enum VipLevels {
    Table,
    Id,
    Name,
    MinBalanceCents,
    CommissionRateBp,
    MaxOrders,
    AutoApproveLimitCents,
    IsActive,
    SortOrder,
    CreatedAt,
    UpdatedAt,
}

/// 商店组 (VIP 等级与商品池的绑定)
#[derive(DeriveIden)]
enum ShopGroups {
    Table,
    Id,
    Name,
    VipLevelId,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

/// 任务商品表
#[derive(DeriveIden)]
enum TaskProducts {
    Table,
    Id,
    ShopGroupId,
    Name,
    BasePriceCents,
    Stock,
    VipLevelId,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

/// 任务定义表
#[derive(DeriveIden)]
enum Tasks {
    Table,
    Id,
    Title,
    RequiredMinBalanceCents,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

/// 任务执行记录 (状态机)
#[derive(DeriveIden)]
enum TaskRuns {
    Table,
    Id,
    UserId,
    TaskId,
    TaskProductId,
    State,
    AssignedPriceCents,
    CommissionRateBp,
    RewardAmountCents,
    TotalRefundCents,
    IdempotencyKey,
    SubmittedAt,
    CompletedAt,
    ApprovedBy,
    CancelledBy,
    CancelReason,
    CreatedAt,
    UpdatedAt,
}

/// 账本流水表 (append-only)
#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    UserId,
    TxnType,
    AmountCents,
    BalanceBefore,
    BalanceAfter,
    Status,
    IdempotencyKey,
    ReferenceId,
    CreatedBy,
    Description,
    Metadata,
    CreatedAt,
}

/// 平台设置 (自动审批策略, 单行)
#[derive(DeriveIden)]
enum PlatformSettings {
    Table,
    Id,
    AutoApproveAll,
    AutoApproveThresholdCents,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 初始化核心表结构并写入 VIP 等级与平台设置种子数据。
///
/// 约定:
/// - 金额一律为美分 (BigInteger)
/// - 比率一律为 basis points (1% = 100bp)
/// - 枚举列统一存字符串, 保证 Postgres / SQLite 均可运行
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Username).string_len(64).not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(16)
                            .not_null()
                            .default("user"),
                    )
                    .col(
                        ColumnDef::new(Users::BalanceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::CompletedOrders)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::FreeSpins)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_username_unique")
                    .table(Users::Table)
                    .col(Users::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // VIP 等级表
        manager
            .create_table(
                Table::create()
                    .table(VipLevels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VipLevels::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VipLevels::Name).string_len(64).not_null())
                    .col(
                        ColumnDef::new(VipLevels::MinBalanceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(VipLevels::CommissionRateBp)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VipLevels::MaxOrders)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(VipLevels::AutoApproveLimitCents)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(VipLevels::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(VipLevels::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(VipLevels::CreatedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(VipLevels::UpdatedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        // 商店组表
        manager
            .create_table(
                Table::create()
                    .table(ShopGroups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShopGroups::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ShopGroups::Name).string_len(64).not_null())
                    .col(
                        ColumnDef::new(ShopGroups::VipLevelId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShopGroups::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(ShopGroups::CreatedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(ShopGroups::UpdatedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_shop_groups_vip_level")
                    .table(ShopGroups::Table)
                    .col(ShopGroups::VipLevelId)
                    .to_owned(),
            )
            .await?;

        // 任务商品表
        manager
            .create_table(
                Table::create()
                    .table(TaskProducts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TaskProducts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TaskProducts::ShopGroupId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TaskProducts::Name).string_len(128).not_null())
                    .col(
                        ColumnDef::new(TaskProducts::BasePriceCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TaskProducts::Stock)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(TaskProducts::VipLevelId).big_integer().null())
                    .col(
                        ColumnDef::new(TaskProducts::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(TaskProducts::CreatedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(TaskProducts::UpdatedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_task_products_shop_group")
                    .table(TaskProducts::Table)
                    .col(TaskProducts::ShopGroupId)
                    .to_owned(),
            )
            .await?;

        // 任务定义表
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tasks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tasks::Title).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Tasks::RequiredMinBalanceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Tasks::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Tasks::CreatedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Tasks::UpdatedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        // 任务执行记录表
        manager
            .create_table(
                Table::create()
                    .table(TaskRuns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TaskRuns::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TaskRuns::UserId).big_integer().not_null())
                    .col(ColumnDef::new(TaskRuns::TaskId).big_integer().not_null())
                    .col(
                        ColumnDef::new(TaskRuns::TaskProductId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TaskRuns::State).string_len(16).not_null())
                    .col(
                        ColumnDef::new(TaskRuns::AssignedPriceCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TaskRuns::CommissionRateBp)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TaskRuns::RewardAmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TaskRuns::TotalRefundCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TaskRuns::IdempotencyKey)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TaskRuns::SubmittedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(TaskRuns::CompletedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(TaskRuns::ApprovedBy).big_integer().null())
                    .col(ColumnDef::new(TaskRuns::CancelledBy).big_integer().null())
                    .col(ColumnDef::new(TaskRuns::CancelReason).string_len(255).null())
                    .col(ColumnDef::new(TaskRuns::CreatedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(TaskRuns::UpdatedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_task_runs_user")
                    .table(TaskRuns::Table)
                    .col(TaskRuns::UserId)
                    .to_owned(),
            )
            .await?;

        // 幂等键唯一 (创建去重)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_task_runs_idempotency_key_unique")
                    .table(TaskRuns::Table)
                    .col(TaskRuns::IdempotencyKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 账本流水表
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Transactions::TxnType).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::BalanceBefore)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::BalanceAfter)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::Status)
                            .string_len(16)
                            .not_null()
                            .default("posted"),
                    )
                    .col(
                        ColumnDef::new(Transactions::IdempotencyKey)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::ReferenceId).big_integer().null())
                    .col(ColumnDef::new(Transactions::CreatedBy).big_integer().null())
                    .col(ColumnDef::new(Transactions::Description).string_len(255).null())
                    .col(ColumnDef::new(Transactions::Metadata).json().null())
                    .col(ColumnDef::new(Transactions::CreatedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_transactions_user")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .to_owned(),
            )
            .await?;

        // 幂等键全局唯一, exactly-once 的真正保障
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_transactions_idempotency_key_unique")
                    .table(Transactions::Table)
                    .col(Transactions::IdempotencyKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 平台设置表 (单行)
        manager
            .create_table(
                Table::create()
                    .table(PlatformSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlatformSettings::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PlatformSettings::AutoApproveAll)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PlatformSettings::AutoApproveThresholdCents)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(PlatformSettings::UpdatedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        // 种子数据: VIP 等级 (Bronze/Silver/Gold)
        // min_balance 单位美分, commission 单位 bp
        let insert_levels = Query::insert()
            .into_table(VipLevels::Table)
            .columns([
                VipLevels::Name,
                VipLevels::MinBalanceCents,
                VipLevels::CommissionRateBp,
                VipLevels::MaxOrders,
                VipLevels::AutoApproveLimitCents,
                VipLevels::IsActive,
                VipLevels::SortOrder,
            ])
            .values_panic([
                "BRONZE".into(),
                0i64.into(),
                50i32.into(),
                5i32.into(),
                SimpleExpr::Keyword(Keyword::Null),
                true.into(),
                1i32.into(),
            ])
            .values_panic([
                "SILVER".into(),
                10_000i64.into(),
                60i32.into(),
                10i32.into(),
                SimpleExpr::Keyword(Keyword::Null),
                true.into(),
                2i32.into(),
            ])
            .values_panic([
                "GOLD".into(),
                50_000i64.into(),
                80i32.into(),
                20i32.into(),
                SimpleExpr::Keyword(Keyword::Null),
                true.into(),
                3i32.into(),
            ])
            .to_owned();
        exec(manager, &insert_levels).await?;

        // 种子数据: 默认审批策略 (全部人工审批)
        let insert_settings = Query::insert()
            .into_table(PlatformSettings::Table)
            .columns([
                PlatformSettings::Id,
                PlatformSettings::AutoApproveAll,
            ])
            .values_panic([1i64.into(), false.into()])
            .to_owned();
        exec(manager, &insert_settings).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Table::drop().if_exists().table(PlatformSettings::Table).to_owned(),
            Table::drop().if_exists().table(Transactions::Table).to_owned(),
            Table::drop().if_exists().table(TaskRuns::Table).to_owned(),
            Table::drop().if_exists().table(Tasks::Table).to_owned(),
            Table::drop().if_exists().table(TaskProducts::Table).to_owned(),
            Table::drop().if_exists().table(ShopGroups::Table).to_owned(),
            Table::drop().if_exists().table(VipLevels::Table).to_owned(),
            Table::drop().if_exists().table(Users::Table).to_owned(),
        ] {
            manager.drop_table(table).await?;
        }
        Ok(())
    }
}

/// 构建并执行与当前后端匹配的语句 (Postgres / SQLite 通用)
async fn exec<S: StatementBuilder>(manager: &SchemaManager<'_>, stmt: &S) -> Result<(), DbErr> {
    let backend = manager.get_database_backend();
    manager.get_connection().execute(backend.build(stmt)).await?;
    Ok(())
}
