use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 转盘奖品配置实体
/// - probability_bp: 抽中权重 (basis points), 按权重和归一化, 不要求合计 10000
/// - value_cents: 现金奖励金额, 0 表示无金额奖品 (谢谢参与)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "wheel_prizes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub value_cents: i64,
    pub probability_bp: i32,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    /// 是否为现金奖品
    pub fn is_cash(&self) -> bool {
        self.value_cents > 0
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
