use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 用户转盘抽奖记录 (每条消耗一次 free_spin)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "wheel_spins")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub prize_id: i64,
    /// 奖品名称快照 (奖品配置可能后续变更)
    pub prize_name: String,
    pub value_cents: i64,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
