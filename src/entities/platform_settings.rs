use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 平台设置 (单行, id 固定为 1)
/// 审批策略不驻留进程内, 每次请求按需加载后以值传入策略函数
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "platform_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub auto_approve_all: bool,
    pub auto_approve_threshold_cents: Option<i64>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
