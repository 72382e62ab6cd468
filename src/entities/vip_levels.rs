use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// VIP 等级配置实体
/// - min_balance_cents: 达到该余额即可获得此等级
/// - commission_rate_bp: 任务佣金比例 (basis points, 1% = 100bp)
/// - sort_order: min_balance 相同时的确定性决胜 (小者优先)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "vip_levels")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub min_balance_cents: i64,
    pub commission_rate_bp: i32,
    /// 每日/周期可接任务上限
    pub max_orders: i32,
    /// 该等级专属的自动审批上限 (NULL 表示跟随全局设置)
    pub auto_approve_limit_cents: Option<i64>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
