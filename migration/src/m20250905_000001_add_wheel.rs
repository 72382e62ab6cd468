use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::StatementBuilder;

/// 转盘奖品配置表
#[derive(DeriveIden)]
enum WheelPrizes {
    Table,
    Id,
    Name,
    ValueCents,
    ProbabilityBp,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

/// 用户转盘抽奖记录
#[derive(DeriveIden)]
enum WheelSpins {
    Table,
    Id,
    UserId,
    PrizeId,
    PrizeName,
    ValueCents,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 转盘奖品初始配置:
/// - Cash $0.50  40% -> 4000bp
/// - Cash $1.00  15% -> 1500bp
/// - Cash $5.00   4% ->  400bp
/// - Cash $20.00  1% ->  100bp
/// - Thank You   40% -> 4000bp (无金额)
///
/// 抽奖按权重和归一化, 不要求 bp 合计恰为 10000
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WheelPrizes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WheelPrizes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WheelPrizes::Name).string_len(64).not_null())
                    .col(
                        ColumnDef::new(WheelPrizes::ValueCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(WheelPrizes::ProbabilityBp)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WheelPrizes::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(WheelPrizes::CreatedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(WheelPrizes::UpdatedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_wheel_prizes_name_unique")
                    .table(WheelPrizes::Table)
                    .col(WheelPrizes::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WheelSpins::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WheelSpins::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WheelSpins::UserId).big_integer().not_null())
                    .col(ColumnDef::new(WheelSpins::PrizeId).big_integer().not_null())
                    .col(ColumnDef::new(WheelSpins::PrizeName).string_len(64).not_null())
                    .col(
                        ColumnDef::new(WheelSpins::ValueCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(WheelSpins::CreatedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_wheel_spins_user")
                    .table(WheelSpins::Table)
                    .col(WheelSpins::UserId)
                    .to_owned(),
            )
            .await?;

        // 不加外键: SQLite 不支持 ALTER ADD FOREIGN KEY, 且历史记录需在奖品下架后保留
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_wheel_spins_prize")
                    .table(WheelSpins::Table)
                    .col(WheelSpins::PrizeId)
                    .to_owned(),
            )
            .await?;

        let insert_prizes = Query::insert()
            .into_table(WheelPrizes::Table)
            .columns([
                WheelPrizes::Name,
                WheelPrizes::ValueCents,
                WheelPrizes::ProbabilityBp,
                WheelPrizes::IsActive,
            ])
            .values_panic(["Cash $0.50".into(), 50i64.into(), 4000i32.into(), true.into()])
            .values_panic(["Cash $1.00".into(), 100i64.into(), 1500i32.into(), true.into()])
            .values_panic(["Cash $5.00".into(), 500i64.into(), 400i32.into(), true.into()])
            .values_panic(["Cash $20.00".into(), 2000i64.into(), 100i32.into(), true.into()])
            .values_panic(["Thank You".into(), 0i64.into(), 4000i32.into(), true.into()])
            .to_owned();
        let backend = manager.get_database_backend();
        manager
            .get_connection()
            .execute(backend.build(&insert_prizes))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(WheelSpins::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(WheelPrizes::Table).to_owned())
            .await?;
        Ok(())
    }
}
