use sea_orm_migration::prelude::*;

/// 充值/提现申请表 (管理员审批队列)
#[derive(DeriveIden)]
enum FundRequests {
    Table,
    Id,
    UserId,
    Direction,
    AmountCents,
    Status,
    ReviewedBy,
    ReviewNote,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FundRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FundRequests::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FundRequests::UserId).big_integer().not_null())
                    .col(ColumnDef::new(FundRequests::Direction).string_len(16).not_null())
                    .col(
                        ColumnDef::new(FundRequests::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FundRequests::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(FundRequests::ReviewedBy).big_integer().null())
                    .col(ColumnDef::new(FundRequests::ReviewNote).string_len(255).null())
                    .col(ColumnDef::new(FundRequests::CreatedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(FundRequests::UpdatedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_fund_requests_user")
                    .table(FundRequests::Table)
                    .col(FundRequests::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_fund_requests_status")
                    .table(FundRequests::Table)
                    .col(FundRequests::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(FundRequests::Table).to_owned())
            .await?;
        Ok(())
    }
}
